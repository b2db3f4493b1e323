//! Stream demultiplexer for the waveform print stream.
//!
//! The board writes its console text and its binary waveform frames to the
//! same serial port. This module separates the two: it accumulates bytes,
//! extracts lines of text and validated frames in stream order, and groups
//! frame samples into sessions closed by a `TERM` frame.
//!
//! # Stream Layout
//!
//! ```text
//! Menu:\r\n 1) Config\r\n DATA<1024 bytes>AA BB CC DD DATA<...>AABBCCDD TERM<...>AABBCCDD Done\r\n
//! └──────── text ──────────┘└──────── frame ─────────┘└──── frame ────┘└──── frame ────┘└ text ┘
//! ```
//!
//! Text has no length prefix and frames have no length field. A frame is
//! recognised by its marker and confirmed only by the trailer sitting exactly
//! one payload length after the marker.
//!
//! # Usage
//!
//! ```
//! use wavetap_core::{DemuxConfig, MarkerKind};
//! use wavetap_protocol::{DemuxEvent, Demultiplexer, Frame};
//!
//! let mut demux = Demultiplexer::with_config(DemuxConfig::with_payload_size(4)).unwrap();
//!
//! demux.feed(b"boot ok\n");
//! demux.feed(&Frame::new(MarkerKind::Data, vec![0x01u8, 0x00, 0x02, 0x00]).to_wire());
//! demux.feed(&Frame::new(MarkerKind::Terminal, vec![0x03u8, 0x00, 0x04, 0x00]).to_wire());
//!
//! let events: Vec<_> = demux.drain_events().collect();
//! assert_eq!(events[0], DemuxEvent::Text("boot ok\n".to_string()));
//! match &events[3] {
//!     DemuxEvent::SessionFlushed(session) => assert_eq!(session.samples, vec![1, 2, 3, 4]),
//!     other => panic!("unexpected event: {other:?}"),
//! }
//! ```

use std::collections::VecDeque;

use tracing::{debug, info, trace, warn};
use wavetap_core::constants::{MARKER_LEN, NEWLINE};
use wavetap_core::{DemuxConfig, MarkerKind, Result, Sample, SessionSummary};

use crate::accumulator::ByteAccumulator;
use crate::frame::{Frame, has_valid_trailer};
use crate::session::Session;
use crate::text::decode_ascii_lossy;

/// Recommended initial capacity for the event queue.
///
/// A single read usually yields a line of text or a frame or two.
const INITIAL_EVENT_QUEUE_CAPACITY: usize = 8;

/// Incremental search state for one marker kind.
///
/// Offsets are relative to the front of the buffer and shift as bytes are
/// consumed, so each buffered byte is examined once per kind no matter how
/// many units are extracted in front of it.
#[derive(Debug, Clone, Copy, Default)]
struct MarkerSearch {
    /// Offset of the next occurrence, once found.
    found: Option<usize>,

    /// Offset the next search starts from. No occurrence starts before it.
    resume: usize,

    /// Window positions compared so far.
    compared: u64,
}

impl MarkerSearch {
    /// Next occurrence of `pattern`, searching only bytes not yet examined.
    fn locate(&mut self, buffer: &ByteAccumulator, pattern: &[u8]) -> Option<usize> {
        if self.found.is_some() {
            return self.found;
        }

        let start = self.resume;
        match buffer.find_from(pattern, start) {
            Some(offset) => {
                self.compared += (offset - start + 1) as u64;
                self.found = Some(offset);
            }
            None => {
                // A marker may still start in the last MARKER_LEN - 1 bytes.
                let resume = buffer.len().saturating_sub(MARKER_LEN - 1).max(start);
                self.compared += (resume - start) as u64;
                self.resume = resume;
            }
        }
        self.found
    }

    /// Shift offsets after `n` bytes left the front of the buffer.
    fn consumed(&mut self, n: usize) {
        match self.found {
            Some(offset) if offset >= n => self.found = Some(offset - n),
            Some(_) => {
                self.found = None;
                self.resume = 0;
            }
            None => self.resume = self.resume.saturating_sub(n),
        }
    }

    fn clear(&mut self) {
        self.found = None;
        self.resume = 0;
    }
}

/// One decoded unit of the stream, in stream order.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DemuxEvent {
    /// A span of console text.
    Text(String),

    /// A validated frame was decoded and its samples added to the session.
    Frame {
        /// Marker that opened the frame.
        kind: MarkerKind,

        /// Samples decoded from the payload.
        samples: Vec<Sample>,
    },

    /// A session ended; carries every sample since the previous flush.
    SessionFlushed(SessionSummary),
}

/// Running counters of a demultiplexer.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct DemuxStats {
    /// Frames that passed trailer validation.
    pub frames: u64,

    /// Sessions flushed by a `TERM` frame or by [`Demultiplexer::finish`].
    pub sessions: u64,

    /// Text spans emitted.
    pub text_spans: u64,

    /// Marker occurrences disproved by the trailer check.
    pub false_markers: u64,

    /// Bytes removed from the buffer as text or frames.
    pub bytes_consumed: u64,
}

/// Stateful demultiplexer for mixed text/frame streams.
///
/// Bytes go in through [`feed()`]; the buffer is scanned to exhaustion on
/// every feed and the resulting [`DemuxEvent`]s are queued until taken with
/// [`next_event()`] or [`drain_events()`].
///
/// # Scan Loop
///
/// Each step extracts at most one unit from the front of the buffer:
///
/// ```text
///                      ┌──────────────────────────┐
///                      │ earliest DATA/TERM marker │
///                      └─────────────┬────────────┘
///          none                      │ at S > 0               │ at 0
///   ┌────────┴─────────┐    ┌────────┴────────┐     ┌─────────┴──────────┐
///   │ newline in first │    │ emit [0, S) as  │     │ full frame length  │
///   │ lookahead bytes? │    │ text            │     │ buffered?          │
///   └──┬───────────┬───┘    └─────────────────┘     └──┬──────────────┬──┘
///  yes │        no │                                 no │          yes │
///   emit line   buffer > flush threshold?            wait     trailer matches?
///               yes: emit lookahead bytes                   yes: frame  no: emit 1 byte
///               no:  wait                                              as text
/// ```
///
/// The scan stops at the first "wait". Bytes of a marker that is not yet
/// disproved are never discarded: the one-byte advance only happens after
/// the trailer check has failed on a complete candidate.
///
/// # Example
///
/// ```
/// use wavetap_protocol::{DemuxEvent, Demultiplexer};
///
/// let mut demux = Demultiplexer::new();
/// demux.feed(b"hello\nDATA");
///
/// assert_eq!(demux.next_event(), Some(DemuxEvent::Text("hello\n".to_string())));
/// assert_eq!(demux.buffered(), b"DATA"); // waiting for the rest of the frame
/// ```
///
/// [`feed()`]: Demultiplexer::feed
/// [`next_event()`]: Demultiplexer::next_event
/// [`drain_events()`]: Demultiplexer::drain_events
#[derive(Debug)]
pub struct Demultiplexer {
    /// Framing parameters.
    config: DemuxConfig,

    /// Received bytes not yet turned into events.
    buffer: ByteAccumulator,

    /// Samples of the current session.
    session: Session,

    /// Events ready for extraction.
    events: VecDeque<DemuxEvent>,

    /// Search state per marker kind, indexed like [`MarkerKind::ALL`].
    searches: [MarkerSearch; MarkerKind::ALL.len()],

    stats: DemuxStats,
}

impl Demultiplexer {
    /// Create a demultiplexer with the default framing (1024-byte payloads).
    pub fn new() -> Self {
        Self::build(DemuxConfig::default())
    }

    /// Create a demultiplexer with custom framing parameters.
    ///
    /// # Errors
    ///
    /// Returns `Error::InvalidConfig` if `config` fails [`DemuxConfig::validate`].
    pub fn with_config(config: DemuxConfig) -> Result<Self> {
        config.validate()?;
        Ok(Self::build(config))
    }

    fn build(config: DemuxConfig) -> Self {
        Self {
            config,
            buffer: ByteAccumulator::new(),
            session: Session::new(),
            events: VecDeque::with_capacity(INITIAL_EVENT_QUEUE_CAPACITY),
            searches: Default::default(),
            stats: DemuxStats::default(),
        }
    }

    pub fn config(&self) -> &DemuxConfig {
        &self.config
    }

    /// Feed received bytes and extract every unit they complete.
    pub fn feed(&mut self, bytes: &[u8]) {
        self.buffer.append(bytes);
        self.scan();
    }

    /// Run the scan loop until it needs more data.
    ///
    /// Returns the number of units extracted. [`feed()`] already scans, so
    /// calling this again on an unchanged buffer returns 0.
    ///
    /// [`feed()`]: Demultiplexer::feed
    pub fn scan(&mut self) -> usize {
        let mut units = 0;
        while self.try_extract_unit() {
            units += 1;
        }
        units
    }

    /// Take the next decoded event, if any.
    pub fn next_event(&mut self) -> Option<DemuxEvent> {
        self.events.pop_front()
    }

    /// Number of events ready for extraction.
    pub fn events_available(&self) -> usize {
        self.events.len()
    }

    /// Iterate over all queued events, removing them.
    ///
    /// This does not scan; events appear as bytes are [`feed()`]-ed.
    ///
    /// [`feed()`]: Demultiplexer::feed
    pub fn drain_events(&mut self) -> DrainEvents<'_> {
        DrainEvents { demux: self }
    }

    /// Bytes received but not yet consumed.
    pub fn buffered(&self) -> &[u8] {
        self.buffer.as_slice()
    }

    /// Samples of the session in progress.
    pub fn pending_samples(&self) -> &[Sample] {
        self.session.samples()
    }

    pub fn stats(&self) -> DemuxStats {
        self.stats
    }

    /// End of stream: flush the pending session and drop what is left.
    ///
    /// Returns the pending session if it holds samples. Buffered bytes (a
    /// partial frame, or text without a newline) are discarded.
    pub fn finish(&mut self) -> Option<SessionSummary> {
        if !self.buffer.is_empty() {
            warn!(
                "Discarding {} unconsumed bytes at end of stream",
                self.buffer.len()
            );
            self.buffer.clear();
            self.clear_searches();
        }

        if self.session.is_empty() {
            return None;
        }
        Some(self.take_session())
    }

    /// Discard buffered bytes, queued events, the pending session and stats.
    pub fn reset(&mut self) {
        self.buffer.clear();
        self.clear_searches();
        self.session.clear();
        self.events.clear();
        self.stats = DemuxStats::default();
    }

    /// Extract one unit from the front of the buffer.
    ///
    /// Returns `true` if the buffer shrank, `false` if more data is needed.
    fn try_extract_unit(&mut self) -> bool {
        match self.find_earliest_marker() {
            None => self.extract_text_line(),
            Some((0, kind)) => self.extract_frame(kind),
            Some((offset, _)) => {
                // Text ahead of the marker leaves now so it is reported once.
                self.emit_text(offset);
                true
            }
        }
    }

    /// Locate the earliest marker of either kind.
    fn find_earliest_marker(&mut self) -> Option<(usize, MarkerKind)> {
        let buffer = &self.buffer;
        MarkerKind::ALL
            .into_iter()
            .zip(self.searches.iter_mut())
            .filter_map(|(kind, search)| {
                search
                    .locate(buffer, &kind.marker_bytes())
                    .map(|offset| (offset, kind))
            })
            .min_by_key(|&(offset, _)| offset)
    }

    /// Drop `n` bytes from the front, keeping the marker searches in step.
    fn consume(&mut self, n: usize) {
        self.buffer.consume_front(n);
        self.searches.iter_mut().for_each(|search| search.consumed(n));
    }

    fn clear_searches(&mut self) {
        self.searches.iter_mut().for_each(MarkerSearch::clear);
    }

    /// Window positions compared by the marker searches so far.
    #[cfg(test)]
    fn marker_comparisons(&self) -> u64 {
        self.searches.iter().map(|search| search.compared).sum()
    }

    /// Handle a marker-free buffer: emit a line, or a forced chunk.
    fn extract_text_line(&mut self) -> bool {
        let window = self.buffer.len().min(self.config.text_lookahead);

        if let Some(pos) = self.buffer.as_slice()[..window]
            .iter()
            .position(|&b| b == NEWLINE)
        {
            self.emit_text(pos + 1);
            return true;
        }

        if self.buffer.len() > self.config.text_flush_threshold {
            trace!(
                "No newline or marker in {} buffered bytes, flushing {} as text",
                self.buffer.len(),
                window
            );
            self.emit_text(window);
            return true;
        }

        false
    }

    /// Handle a marker at the front of the buffer.
    fn extract_frame(&mut self, kind: MarkerKind) -> bool {
        let payload_size = self.config.payload_size;
        let frame_len = kind.frame_len(payload_size);

        if self.buffer.len() < frame_len {
            return false;
        }

        if !has_valid_trailer(&self.buffer.as_slice()[..frame_len], payload_size) {
            self.stats.false_markers += 1;
            debug!("{} marker without trailer, advancing one byte", kind);
            self.emit_text(1);
            return true;
        }

        let frame = Frame::from_wire(kind, self.buffer.split_front(frame_len));
        self.searches
            .iter_mut()
            .for_each(|search| search.consumed(frame_len));
        self.stats.bytes_consumed += frame_len as u64;
        self.accept_frame(frame);
        true
    }

    fn accept_frame(&mut self, frame: Frame) {
        let kind = frame.kind();
        let samples = frame.samples();

        self.session.extend_frame(&samples);
        self.stats.frames += 1;
        debug!("Decoded {}", frame);

        self.events.push_back(DemuxEvent::Frame { kind, samples });

        if kind.ends_session() {
            let summary = self.take_session();
            self.events.push_back(DemuxEvent::SessionFlushed(summary));
        }
    }

    fn take_session(&mut self) -> SessionSummary {
        let summary = self.session.take();
        self.stats.sessions += 1;
        info!(
            "Session complete: {} samples from {} frames",
            summary.sample_count(),
            summary.frames
        );
        summary
    }

    /// Consume `len` bytes from the front and queue them as text.
    fn emit_text(&mut self, len: usize) {
        let text = decode_ascii_lossy(&self.buffer.as_slice()[..len]);
        self.consume(len);
        self.stats.text_spans += 1;
        self.stats.bytes_consumed += len as u64;
        trace!("Text span: {:?}", text);
        self.events.push_back(DemuxEvent::Text(text));
    }
}

impl Default for Demultiplexer {
    fn default() -> Self {
        Self::new()
    }
}

/// Iterator that drains events from a [`Demultiplexer`].
///
/// Created by [`Demultiplexer::drain_events`].
pub struct DrainEvents<'a> {
    demux: &'a mut Demultiplexer,
}

impl Iterator for DrainEvents<'_> {
    type Item = DemuxEvent;

    fn next(&mut self) -> Option<Self::Item> {
        self.demux.next_event()
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        let len = self.demux.events_available();
        (len, Some(len))
    }
}

impl ExactSizeIterator for DrainEvents<'_> {
    fn len(&self) -> usize {
        self.demux.events_available()
    }
}
