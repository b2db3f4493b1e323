//! Poll-driven receive loop.
//!
//! The [`Receiver`] owns a byte source and a [`Demultiplexer`]. It runs one
//! cooperative loop:
//!
//! ```text
//! ┌──────────────┐  bytes   ┌───────────────┐  events   ┌─────────────────┐
//! │ ByteSource   │─────────►│ Demultiplexer │──────────►│ TextSink        │
//! │ poll()       │          │ feed + scan   │           │ SampleSink      │
//! └──────┬───────┘          └───────────────┘           └─────────────────┘
//!        │ empty: sleep idle_sleep
//!        │ SourceClosed / cancelled: flush pending session, return
//! ```
//!
//! Everything runs on the calling thread. From async code, move the receiver
//! into `tokio::task::spawn_blocking` and cancel it through the
//! [`CancellationToken`].

use std::thread;
use std::time::Duration;

use tokio_util::sync::CancellationToken;
use tracing::{debug, info, trace, warn};
use wavetap_core::{CaptureConfig, DemuxConfig, SessionSummary};
use wavetap_protocol::{DemuxEvent, DemuxStats, Demultiplexer};

use crate::error::{Result, TransportError};
use crate::traits::{ByteSource, SampleSink, TextSink};

/// Why a receive loop returned.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StopReason {
    /// The byte source reported end of stream.
    SourceClosed,

    /// The cancellation token fired.
    Cancelled,
}

/// Outcome of a finished receive loop.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ReceiveSummary {
    pub stop: StopReason,

    /// Demultiplexer counters at shutdown.
    pub stats: DemuxStats,

    /// Session flushes the sample sink rejected.
    pub sink_errors: u64,
}

/// Receive loop over a byte source.
#[derive(Debug)]
pub struct Receiver<S> {
    source: S,
    demux: Demultiplexer,
    idle_sleep: Duration,
    sink_errors: u64,
}

impl<S: ByteSource> Receiver<S> {
    /// Create a receiver with default framing and a 1 ms idle sleep.
    pub fn new(source: S) -> Self {
        Self {
            source,
            demux: Demultiplexer::new(),
            idle_sleep: CaptureConfig::default().idle_sleep(),
            sink_errors: 0,
        }
    }

    /// Create a receiver using the framing and timing from `config`.
    ///
    /// # Errors
    ///
    /// Returns `TransportError::Core` if the framing is invalid.
    pub fn with_config(source: S, config: &CaptureConfig) -> Result<Self> {
        Ok(Self {
            source,
            demux: Demultiplexer::with_config(config.demux)?,
            idle_sleep: config.idle_sleep(),
            sink_errors: 0,
        })
    }

    /// Replace the framing parameters. Drops any buffered state.
    pub fn set_demux_config(&mut self, config: DemuxConfig) -> Result<()> {
        self.demux = Demultiplexer::with_config(config)?;
        Ok(())
    }

    pub fn source(&self) -> &S {
        &self.source
    }

    pub fn source_mut(&mut self) -> &mut S {
        &mut self.source
    }

    pub fn demux(&self) -> &Demultiplexer {
        &self.demux
    }

    pub fn into_source(self) -> S {
        self.source
    }

    /// Run until the source closes or `cancel` fires.
    ///
    /// Text and frames are dispatched in stream order as they are decoded.
    /// On either stop condition a non-empty pending session is flushed to
    /// `samples` before returning; a partially received frame is dropped.
    ///
    /// # Errors
    ///
    /// A transport failure other than `SourceClosed` ends the loop with that
    /// error, after the pending session has been flushed. Sink failures do
    /// not end the loop; they are logged and counted.
    pub fn run<T, K>(
        &mut self,
        text: &mut T,
        samples: &mut K,
        cancel: &CancellationToken,
    ) -> Result<ReceiveSummary>
    where
        T: TextSink + ?Sized,
        K: SampleSink + ?Sized,
    {
        info!("Receiver started");

        let stop = loop {
            if cancel.is_cancelled() {
                info!("Receiver cancelled");
                break StopReason::Cancelled;
            }

            match self.source.poll() {
                Ok(bytes) if bytes.is_empty() => {
                    trace!("Idle poll");
                    if !self.idle_sleep.is_zero() {
                        thread::sleep(self.idle_sleep);
                    }
                }
                Ok(bytes) => self.process(&bytes, text, samples),
                Err(TransportError::SourceClosed) => {
                    info!("Byte source closed");
                    break StopReason::SourceClosed;
                }
                Err(e) => {
                    warn!("Transport failed: {}", e);
                    self.flush_pending(samples);
                    return Err(e);
                }
            }
        };

        self.flush_pending(samples);

        let summary = ReceiveSummary {
            stop,
            stats: self.demux.stats(),
            sink_errors: self.sink_errors,
        };
        info!(
            "Receiver stopped: {} frames, {} sessions, {} false markers",
            summary.stats.frames, summary.stats.sessions, summary.stats.false_markers
        );
        Ok(summary)
    }

    /// Feed one read and dispatch everything it completes.
    pub fn process<T, K>(&mut self, bytes: &[u8], text: &mut T, samples: &mut K)
    where
        T: TextSink + ?Sized,
        K: SampleSink + ?Sized,
    {
        self.demux.feed(bytes);

        while let Some(event) = self.demux.next_event() {
            match event {
                DemuxEvent::Text(span) => text.on_text(&span),
                DemuxEvent::Frame { kind, samples: decoded } => samples.on_frame(kind, &decoded),
                DemuxEvent::SessionFlushed(session) => self.deliver(&session, samples),
            }
        }
    }

    fn flush_pending<K: SampleSink + ?Sized>(&mut self, samples: &mut K) {
        if let Some(session) = self.demux.finish() {
            debug!("Flushing pending session at shutdown");
            self.deliver(&session, samples);
        }
    }

    fn deliver<K: SampleSink + ?Sized>(&mut self, session: &SessionSummary, samples: &mut K) {
        if let Err(e) = samples.on_session_flush(session) {
            self.sink_errors += 1;
            warn!(
                "Sample sink rejected session of {} samples: {}",
                session.sample_count(),
                e
            );
        }
    }
}
