//! Common test utilities for integration tests.
//!
//! Helpers here build board-style byte streams (console text interleaved with
//! frames) and collect the events a demultiplexer produces from them.
//!
//! # Helper Groups
//!
//! 1. **Stream Builders** (`*_frame`, `capture_stream`) - Produce wire bytes
//! 2. **Feeding Helpers** (`feed_*`) - Push bytes through a demultiplexer
//! 3. **Collectors** (`collect_*`) - Pull text, frames and sessions out of events
//!
//! # Usage Examples
//!
//! ```ignore
//! use crate::common;
//!
//! let stream = common::capture_stream(4, &[&[1, 2], &[3, 4]]);
//! let events = common::feed_in_chunks(&mut common::small_demux(), &stream, 3);
//! assert_eq!(common::collect_sessions(&events)[0].samples, vec![1, 2, 3, 4]);
//! ```

#![allow(dead_code)]

use wavetap_core::{DemuxConfig, MarkerKind, Sample, SessionSummary};
use wavetap_protocol::{DemuxEvent, Demultiplexer, Frame};

/// Payload size used by the small-frame helpers.
pub const SMALL_PAYLOAD: usize = 4;

/// Create a demultiplexer with 4-byte payloads.
pub fn small_demux() -> Demultiplexer {
    Demultiplexer::with_config(DemuxConfig::with_payload_size(SMALL_PAYLOAD))
        .expect("Test helper: small payload config must be valid")
}

/// Wire bytes of a `DATA` frame.
pub fn data_frame(payload: &[u8]) -> Vec<u8> {
    Frame::new(MarkerKind::Data, payload.to_vec()).to_wire().to_vec()
}

/// Wire bytes of a `TERM` frame.
pub fn term_frame(payload: &[u8]) -> Vec<u8> {
    Frame::new(MarkerKind::Terminal, payload.to_vec())
        .to_wire()
        .to_vec()
}

/// Wire bytes of a frame carrying `samples`.
pub fn sample_frame(kind: MarkerKind, samples: &[Sample]) -> Vec<u8> {
    Frame::from_samples(kind, samples).to_wire().to_vec()
}

/// A full capture: a menu banner, `DATA` frames, a final `TERM` frame and a
/// closing line, the way the board prints one waveform.
///
/// Each entry of `frames` holds the samples of one frame and must fill
/// exactly `payload_size` bytes. The last entry becomes the `TERM` frame.
pub fn capture_stream(payload_size: usize, frames: &[&[Sample]]) -> Vec<u8> {
    let mut stream = b"Menu:\r\n 2) Print\r\n".to_vec();
    for (i, samples) in frames.iter().enumerate() {
        assert_eq!(
            samples.len() * 2,
            payload_size,
            "Test helper: frame {i} does not fill the payload"
        );
        let kind = if i + 1 == frames.len() {
            MarkerKind::Terminal
        } else {
            MarkerKind::Data
        };
        stream.extend_from_slice(&sample_frame(kind, samples));
    }
    stream.extend_from_slice(b"Done\r\n");
    stream
}

/// Feed `bytes` in chunks of `chunk_size` and return every event produced.
///
/// # Panics
///
/// Panics if `chunk_size` is 0.
pub fn feed_in_chunks(
    demux: &mut Demultiplexer,
    bytes: &[u8],
    chunk_size: usize,
) -> Vec<DemuxEvent> {
    let mut events = Vec::new();
    for chunk in bytes.chunks(chunk_size) {
        demux.feed(chunk);
        events.extend(demux.drain_events());
    }
    events
}

/// Feed `bytes` split at the given offsets and return every event produced.
pub fn feed_split_at(
    demux: &mut Demultiplexer,
    bytes: &[u8],
    splits: &[usize],
) -> Vec<DemuxEvent> {
    let mut events = Vec::new();
    let mut start = 0;
    for &split in splits.iter().chain(std::iter::once(&bytes.len())) {
        let end = split.clamp(start, bytes.len());
        demux.feed(&bytes[start..end]);
        events.extend(demux.drain_events());
        start = end;
    }
    events
}

/// Concatenated text of all `Text` events.
pub fn collect_text(events: &[DemuxEvent]) -> String {
    events
        .iter()
        .filter_map(|event| match event {
            DemuxEvent::Text(text) => Some(text.as_str()),
            _ => None,
        })
        .collect()
}

/// Kinds and samples of all `Frame` events.
pub fn collect_frames(events: &[DemuxEvent]) -> Vec<(MarkerKind, Vec<Sample>)> {
    events
        .iter()
        .filter_map(|event| match event {
            DemuxEvent::Frame { kind, samples } => Some((*kind, samples.clone())),
            _ => None,
        })
        .collect()
}

/// All flushed sessions.
pub fn collect_sessions(events: &[DemuxEvent]) -> Vec<SessionSummary> {
    events
        .iter()
        .filter_map(|event| match event {
            DemuxEvent::SessionFlushed(session) => Some(session.clone()),
            _ => None,
        })
        .collect()
}

/// Events with adjacent `Text` events merged.
///
/// Chunking changes where text spans are cut but never the order of text
/// relative to frames; this is the form two runs are compared in.
pub fn normalize(events: Vec<DemuxEvent>) -> Vec<DemuxEvent> {
    let mut merged: Vec<DemuxEvent> = Vec::with_capacity(events.len());
    for event in events {
        match (merged.last_mut(), event) {
            (Some(DemuxEvent::Text(previous)), DemuxEvent::Text(text)) => previous.push_str(&text),
            (_, event) => merged.push(event),
        }
    }
    merged
}
