use crate::constants::{DATA_MARKER, MARKER_LEN, TERM_MARKER, TRAILER_LEN};
use serde::{Deserialize, Serialize};
use std::fmt;

/// A decoded waveform sample.
pub type Sample = i16;

/// Kind of frame marker found in the stream.
///
/// Both kinds share the same payload size and trailer. They differ only in
/// their 4-byte value and in whether the frame closes the current session.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum MarkerKind {
    /// `DATA`: a chunk of an ongoing capture.
    Data,

    /// `TERM`: the last chunk of a capture.
    Terminal,
}

impl MarkerKind {
    /// All marker kinds, in the order they are searched.
    pub const ALL: [MarkerKind; 2] = [MarkerKind::Data, MarkerKind::Terminal];

    /// The wire bytes of this marker.
    #[must_use]
    pub const fn marker_bytes(self) -> [u8; MARKER_LEN] {
        match self {
            Self::Data => DATA_MARKER,
            Self::Terminal => TERM_MARKER,
        }
    }

    /// Whether a frame with this marker flushes the session.
    #[must_use]
    pub const fn ends_session(self) -> bool {
        matches!(self, Self::Terminal)
    }

    /// Total wire length of a frame with this marker.
    #[must_use]
    pub const fn frame_len(self, payload_size: usize) -> usize {
        MARKER_LEN + payload_size + TRAILER_LEN
    }

    /// Identify a marker from its wire bytes.
    #[must_use]
    pub fn from_bytes(bytes: &[u8]) -> Option<Self> {
        Self::ALL
            .into_iter()
            .find(|kind| kind.marker_bytes().as_slice() == bytes)
    }
}

impl fmt::Display for MarkerKind {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match self {
            Self::Data => write!(f, "DATA"),
            Self::Terminal => write!(f, "TERM"),
        }
    }
}

/// Samples collected between two terminal markers.
///
/// This is what a session flush hands to the sample sink.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct SessionSummary {
    /// Decoded samples in stream order.
    pub samples: Vec<Sample>,

    /// Number of frames that contributed samples.
    pub frames: u64,
}

impl SessionSummary {
    /// Number of samples in the session.
    #[must_use]
    pub fn sample_count(&self) -> usize {
        self.samples.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.samples.is_empty()
    }
}
