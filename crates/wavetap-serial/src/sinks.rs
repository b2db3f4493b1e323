//! Ready-made text and sample sinks.

use std::io::{self, Write};

use tracing::{info, warn};
use wavetap_core::{MarkerKind, Sample, SessionSummary, constants::PROGRESS_INTERVAL_FRAMES};

use crate::error::Result;
use crate::traits::{SampleSink, TextSink};

/// Text sink that copies spans verbatim to a writer.
///
/// Spans are written as received; no newline is added, so console output
/// looks exactly like a terminal attached to the board.
#[derive(Debug)]
pub struct ConsoleText<W: Write> {
    out: W,
    failed: bool,
}

/// Console text on standard output.
pub type StdoutText = ConsoleText<io::Stdout>;

impl ConsoleText<io::Stdout> {
    pub fn stdout() -> Self {
        Self::new(io::stdout())
    }
}

impl<W: Write> ConsoleText<W> {
    pub fn new(out: W) -> Self {
        Self { out, failed: false }
    }

    pub fn into_inner(self) -> W {
        self.out
    }
}

impl<W: Write> TextSink for ConsoleText<W> {
    fn on_text(&mut self, text: &str) {
        let result = self
            .out
            .write_all(text.as_bytes())
            .and_then(|()| self.out.flush());

        // Report a broken console once; capture continues without it.
        if let Err(e) = result
            && !self.failed
        {
            warn!("Console output failed: {}", e);
            self.failed = true;
        }
    }
}

/// Sample sink wrapper that logs capture progress.
///
/// Logs every [`PROGRESS_INTERVAL_FRAMES`] frames and once per completed
/// session, then forwards everything to the wrapped sink.
#[derive(Debug)]
pub struct ProgressReporter<S> {
    inner: S,
    interval: u64,
    frames: u64,
    samples: u64,
}

impl<S: SampleSink> ProgressReporter<S> {
    pub fn new(inner: S) -> Self {
        Self::with_interval(inner, PROGRESS_INTERVAL_FRAMES)
    }

    /// Log every `interval` frames (at least 1).
    pub fn with_interval(inner: S, interval: u64) -> Self {
        Self {
            inner,
            interval: interval.max(1),
            frames: 0,
            samples: 0,
        }
    }

    /// Frames seen in the current session.
    pub fn frames(&self) -> u64 {
        self.frames
    }

    pub fn inner(&self) -> &S {
        &self.inner
    }

    pub fn into_inner(self) -> S {
        self.inner
    }
}

impl<S: SampleSink> SampleSink for ProgressReporter<S> {
    fn on_session_flush(&mut self, session: &SessionSummary) -> Result<()> {
        info!(
            "Capture complete: {} samples from {} packets",
            session.sample_count(),
            session.frames
        );
        self.frames = 0;
        self.samples = 0;
        self.inner.on_session_flush(session)
    }

    fn on_frame(&mut self, kind: MarkerKind, samples: &[Sample]) {
        self.frames += 1;
        self.samples += samples.len() as u64;
        if self.frames % self.interval == 0 {
            info!(
                "Processed {} packets ({} samples)",
                self.frames, self.samples
            );
        }
        self.inner.on_frame(kind, samples);
    }
}
