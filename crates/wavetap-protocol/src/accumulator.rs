//! Growable receive buffer with front trimming.
//!
//! The accumulator holds bytes that were received but not yet consumed by
//! the demultiplexer. Bytes leave only from the front, in receipt order.
//! Trimming advances the underlying [`BytesMut`] instead of shifting the
//! remaining bytes, so consuming a frame costs nothing proportional to the
//! rest of the buffer.

use bytes::{Buf, Bytes, BytesMut};

/// Initial buffer capacity.
///
/// Fits a few default-sized frames plus a line of console text.
const INITIAL_BUFFER_CAPACITY: usize = 4 * 1024; // 4 KB

/// Received-but-unconsumed bytes of a stream.
///
/// # Example
///
/// ```
/// use wavetap_protocol::ByteAccumulator;
///
/// let mut buffer = ByteAccumulator::new();
/// buffer.append(b"hello\nDATA");
///
/// assert_eq!(buffer.find(b"DATA"), Some(6));
/// buffer.consume_front(6);
/// assert_eq!(buffer.as_slice(), b"DATA");
/// ```
#[derive(Debug)]
pub struct ByteAccumulator {
    buf: BytesMut,
}

impl ByteAccumulator {
    pub fn new() -> Self {
        Self::with_capacity(INITIAL_BUFFER_CAPACITY)
    }

    pub fn with_capacity(capacity: usize) -> Self {
        Self {
            buf: BytesMut::with_capacity(capacity),
        }
    }

    /// Append newly received bytes at the tail.
    pub fn append(&mut self, bytes: &[u8]) {
        self.buf.extend_from_slice(bytes);
    }

    /// Discard the first `n` bytes.
    ///
    /// # Panics
    ///
    /// Panics if `n` exceeds the buffered length. Callers must never consume
    /// bytes they have not seen.
    pub fn consume_front(&mut self, n: usize) {
        assert!(
            n <= self.buf.len(),
            "consume_front({n}) past end of buffer ({} bytes)",
            self.buf.len()
        );
        self.buf.advance(n);
    }

    /// Remove the first `n` bytes and return them without copying.
    ///
    /// # Panics
    ///
    /// Panics if `n` exceeds the buffered length.
    pub fn split_front(&mut self, n: usize) -> Bytes {
        assert!(
            n <= self.buf.len(),
            "split_front({n}) past end of buffer ({} bytes)",
            self.buf.len()
        );
        self.buf.split_to(n).freeze()
    }

    /// Offset of the first occurrence of `pattern`, scanning from the front.
    pub fn find(&self, pattern: &[u8]) -> Option<usize> {
        self.find_from(pattern, 0)
    }

    /// Offset of the first occurrence of `pattern` at or after `start`.
    pub fn find_from(&self, pattern: &[u8], start: usize) -> Option<usize> {
        if start > self.buf.len() {
            return None;
        }
        if pattern.is_empty() {
            return Some(start);
        }
        self.buf[start..]
            .windows(pattern.len())
            .position(|window| window == pattern)
            .map(|pos| start + pos)
    }

    pub fn as_slice(&self) -> &[u8] {
        &self.buf
    }

    pub fn len(&self) -> usize {
        self.buf.len()
    }

    pub fn is_empty(&self) -> bool {
        self.buf.is_empty()
    }

    /// Discard everything.
    pub fn clear(&mut self) {
        self.buf.clear();
    }
}

impl Default for ByteAccumulator {
    fn default() -> Self {
        Self::new()
    }
}
