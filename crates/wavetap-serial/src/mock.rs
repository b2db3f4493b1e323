//! Mock collaborators for testing and development.
//!
//! [`MockByteSource`] replays a script of reads without hardware, and
//! [`RecordingSink`] keeps everything a receive loop delivers so tests can
//! inspect it afterwards.

use std::collections::VecDeque;

use bytes::Bytes;
use wavetap_core::{MarkerKind, Sample, SessionSummary};

use crate::error::{Result, TransportError};
use crate::traits::{ByteSource, SampleSink, TextSink};

/// One scripted poll result.
#[derive(Debug, Clone, PartialEq, Eq)]
enum ScriptStep {
    Chunk(Bytes),
    Idle,
}

/// Byte source that replays scripted reads.
///
/// Each poll pops one step: a chunk of bytes or an empty (idle) read. Once
/// the script is exhausted the source reports `SourceClosed`, unless it was
/// built with [`stay_open`], in which case it idles forever.
///
/// # Examples
///
/// ```
/// use wavetap_serial::mock::MockByteSource;
/// use wavetap_serial::traits::ByteSource;
///
/// let mut source = MockByteSource::new([&b"DA"[..], &b"TA"[..]]).with_idle_polls(1);
///
/// assert_eq!(&source.poll().unwrap()[..], b"DA");
/// assert_eq!(&source.poll().unwrap()[..], b"TA");
/// assert!(source.poll().unwrap().is_empty());
/// assert!(source.poll().is_err());
/// ```
///
/// [`stay_open`]: MockByteSource::stay_open
#[derive(Debug, Default)]
pub struct MockByteSource {
    script: VecDeque<ScriptStep>,
    stay_open: bool,
    polls: usize,
}

impl MockByteSource {
    /// Create a source that returns `chunks` in order, then closes.
    pub fn new<I, B>(chunks: I) -> Self
    where
        I: IntoIterator<Item = B>,
        B: AsRef<[u8]>,
    {
        let mut source = Self::default();
        for chunk in chunks {
            source.push_chunk(chunk.as_ref());
        }
        source
    }

    /// Create a source that delivers `bytes` in reads of `chunk_size`.
    ///
    /// # Panics
    ///
    /// Panics if `chunk_size` is 0.
    pub fn chunked(bytes: &[u8], chunk_size: usize) -> Self {
        Self::new(bytes.chunks(chunk_size))
    }

    /// Append a read of `bytes` to the script.
    pub fn push_chunk(&mut self, bytes: &[u8]) {
        self.script
            .push_back(ScriptStep::Chunk(Bytes::copy_from_slice(bytes)));
    }

    /// Append an empty read to the script.
    pub fn push_idle(&mut self) {
        self.script.push_back(ScriptStep::Idle);
    }

    /// Append `count` empty reads to the script.
    pub fn with_idle_polls(mut self, count: usize) -> Self {
        for _ in 0..count {
            self.push_idle();
        }
        self
    }

    /// Idle forever after the script instead of closing.
    pub fn stay_open(mut self) -> Self {
        self.stay_open = true;
        self
    }

    /// Number of polls served so far.
    pub fn polls(&self) -> usize {
        self.polls
    }

    /// Steps not yet replayed.
    pub fn remaining(&self) -> usize {
        self.script.len()
    }
}

impl ByteSource for MockByteSource {
    fn poll(&mut self) -> Result<Bytes> {
        self.polls += 1;
        match self.script.pop_front() {
            Some(ScriptStep::Chunk(bytes)) => Ok(bytes),
            Some(ScriptStep::Idle) => Ok(Bytes::new()),
            None if self.stay_open => Ok(Bytes::new()),
            None => Err(TransportError::SourceClosed),
        }
    }
}

/// Sink that records text, frames and sessions.
///
/// Implements both [`TextSink`] and [`SampleSink`]. Can be told to fail
/// session flushes to exercise error paths.
#[derive(Debug, Default)]
pub struct RecordingSink {
    /// Text spans in arrival order.
    pub texts: Vec<String>,

    /// Frames in arrival order.
    pub frames: Vec<(MarkerKind, Vec<Sample>)>,

    /// Sessions accepted.
    pub sessions: Vec<SessionSummary>,

    fail_flushes: bool,
}

impl RecordingSink {
    pub fn new() -> Self {
        Self::default()
    }

    /// Reject every session flush with a sink error.
    pub fn failing() -> Self {
        Self {
            fail_flushes: true,
            ..Self::default()
        }
    }

    /// All recorded text, concatenated.
    pub fn text(&self) -> String {
        self.texts.concat()
    }
}

impl TextSink for RecordingSink {
    fn on_text(&mut self, text: &str) {
        self.texts.push(text.to_string());
    }
}

impl SampleSink for RecordingSink {
    fn on_session_flush(&mut self, session: &SessionSummary) -> Result<()> {
        if self.fail_flushes {
            return Err(TransportError::sink("recording sink set to fail"));
        }
        self.sessions.push(session.clone());
        Ok(())
    }

    fn on_frame(&mut self, kind: MarkerKind, samples: &[Sample]) {
        self.frames.push((kind, samples.to_vec()));
    }
}
