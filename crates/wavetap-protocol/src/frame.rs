use bytes::{BufMut, Bytes, BytesMut};
use std::fmt;
use wavetap_core::{MarkerKind, Sample, constants::*};

/// A binary waveform frame.
///
/// A Frame holds the marker kind and the raw payload of one frame on the
/// wire. The marker and trailer are not stored; they are implied by the kind
/// and re-added by [`Frame::encode`].
///
/// # Wire Format
/// ```text
/// DATA  <payload: N bytes>  AA BB CC DD
/// ^^^^  ^^^^^^^^^^^^^^^^^^  ^^^^^^^^^^^
/// kind  i16 LE samples      trailer
/// ```
///
/// A marker occurrence is a frame only if the trailer sits exactly
/// `N` bytes after the marker. Anything else is marker-looking text.
///
/// # Basic Usage
/// ```
/// use wavetap_core::MarkerKind;
/// use wavetap_protocol::Frame;
///
/// let frame = Frame::new(MarkerKind::Data, vec![0x01u8, 0x00, 0x02, 0x00]);
/// assert_eq!(frame.samples(), vec![1, 2]);
///
/// let wire = frame.to_wire();
/// assert_eq!(&wire[..4], b"DATA");
/// assert_eq!(&wire[8..], &[0xAA, 0xBB, 0xCC, 0xDD]);
/// ```
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Frame {
    /// Marker that opened the frame
    kind: MarkerKind,

    /// Payload bytes between marker and trailer
    payload: Bytes,
}

impl Frame {
    /// Create a new Frame from a payload
    pub fn new(kind: MarkerKind, payload: impl Into<Bytes>) -> Self {
        Frame {
            kind,
            payload: payload.into(),
        }
    }

    /// Create a Frame whose payload encodes the given samples
    pub fn from_samples(kind: MarkerKind, samples: &[Sample]) -> Self {
        let mut payload = BytesMut::with_capacity(samples.len() * SAMPLE_SIZE);
        for &sample in samples {
            payload.put_i16_le(sample);
        }
        Self::new(kind, payload.freeze())
    }

    /// Build a Frame from the complete wire bytes of a validated frame
    ///
    /// `wire` must be `marker || payload || trailer`; only the payload is kept.
    pub(crate) fn from_wire(kind: MarkerKind, wire: Bytes) -> Self {
        let payload_end = wire.len() - TRAILER_LEN;
        Self::new(kind, wire.slice(MARKER_LEN..payload_end))
    }

    /// Get the marker kind
    pub fn kind(&self) -> MarkerKind {
        self.kind
    }

    /// Get the raw payload bytes
    pub fn payload(&self) -> &[u8] {
        &self.payload
    }

    /// Total size of the frame on the wire
    pub fn wire_len(&self) -> usize {
        self.kind.frame_len(self.payload.len())
    }

    /// Decode the payload into samples
    pub fn samples(&self) -> Vec<Sample> {
        decode_samples(&self.payload)
    }

    /// Number of samples the payload decodes to
    pub fn sample_count(&self) -> usize {
        self.payload.len() / SAMPLE_SIZE
    }

    /// Write the frame in wire format
    pub fn encode(&self, dst: &mut BytesMut) {
        dst.reserve(self.wire_len());
        dst.put_slice(&self.kind.marker_bytes());
        dst.put_slice(&self.payload);
        dst.put_slice(&FRAME_TRAILER);
    }

    /// Get the frame in wire format
    pub fn to_wire(&self) -> Bytes {
        let mut buf = BytesMut::with_capacity(self.wire_len());
        self.encode(&mut buf);
        buf.freeze()
    }
}

impl fmt::Display for Frame {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{} frame ({} bytes, {} samples)",
            self.kind,
            self.payload.len(),
            self.sample_count()
        )
    }
}

/// Check the trailer of a candidate frame
///
/// `candidate` starts at a marker and holds at least the full frame length
/// for `payload_size`. Returns `false` for shorter input.
pub fn has_valid_trailer(candidate: &[u8], payload_size: usize) -> bool {
    let trailer_start = MARKER_LEN + payload_size;
    candidate
        .get(trailer_start..trailer_start + TRAILER_LEN)
        .is_some_and(|trailer| trailer == FRAME_TRAILER)
}

/// Decode little-endian i16 samples
///
/// An unpaired trailing byte is dropped.
pub fn decode_samples(payload: &[u8]) -> Vec<Sample> {
    payload
        .chunks_exact(SAMPLE_SIZE)
        .map(|pair| i16::from_le_bytes([pair[0], pair[1]]))
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;

    #[rstest]
    #[case(&[0x01, 0x00, 0x02, 0x00], &[1, 2])]
    #[case(&[0xFF, 0xFF], &[-1])]
    #[case(&[0x00, 0x80, 0xFF, 0x7F], &[i16::MIN, i16::MAX])]
    #[case(&[0x01, 0x00, 0x02], &[1])] // odd byte dropped
    #[case(&[0x07], &[])]
    #[case(&[], &[])]
    fn test_decode_samples(#[case] payload: &[u8], #[case] expected: &[Sample]) {
        assert_eq!(decode_samples(payload), expected);
    }

    #[test]
    fn test_from_samples_encodes_little_endian() {
        let frame = Frame::from_samples(MarkerKind::Data, &[1, -2, 0x1234]);
        assert_eq!(frame.payload(), &[0x01, 0x00, 0xFE, 0xFF, 0x34, 0x12]);
        assert_eq!(frame.samples(), vec![1, -2, 0x1234]);
    }

    #[test]
    fn test_wire_layout() {
        let frame = Frame::new(MarkerKind::Terminal, vec![0u8; 4]);
        let wire = frame.to_wire();

        assert_eq!(wire.len(), 12);
        assert_eq!(frame.wire_len(), 12);
        assert_eq!(&wire[..4], b"TERM");
        assert_eq!(&wire[4..8], &[0, 0, 0, 0]);
        assert_eq!(&wire[8..], &FRAME_TRAILER);
    }

    #[test]
    fn test_from_wire_strips_marker_and_trailer() {
        let original = Frame::new(MarkerKind::Data, vec![9u8, 8, 7, 6]);
        let parsed = Frame::from_wire(MarkerKind::Data, original.to_wire());
        assert_eq!(parsed, original);
    }

    #[test]
    fn test_has_valid_trailer() {
        let wire = Frame::new(MarkerKind::Data, vec![1u8, 2, 3, 4]).to_wire();
        assert!(has_valid_trailer(&wire, 4));
        // Wrong payload size puts the trailer check at the wrong offset
        assert!(!has_valid_trailer(&wire, 2));
        // Too short
        assert!(!has_valid_trailer(&wire[..10], 4));
    }

    #[test]
    fn test_invalid_trailer() {
        let mut wire = BytesMut::from(&b"DATAxyzw"[..]);
        wire.put_slice(&[0xAA, 0xBB, 0xCC, 0x00]);
        assert!(!has_valid_trailer(&wire, 4));
    }

    #[test]
    fn test_odd_payload_sample_count() {
        let frame = Frame::new(MarkerKind::Data, vec![1u8, 0, 2]);
        assert_eq!(frame.sample_count(), 1);
        assert_eq!(frame.samples(), vec![1]);
    }

    #[test]
    fn test_display() {
        let frame = Frame::from_samples(MarkerKind::Data, &[0; 512]);
        assert_eq!(frame.to_string(), "DATA frame (1024 bytes, 512 samples)");
    }
}
