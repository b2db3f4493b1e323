//! Console text decoding.
//!
//! The board prints plain ASCII. Any other byte in a text span (noise, a
//! stray trailer byte, a disproved marker's neighbourhood) becomes
//! [`REPLACEMENT_CHAR`], one character per byte. Decoding never fails and
//! never merges bytes, so the text of a stream is the same however the
//! stream is split into spans.

use wavetap_core::constants::REPLACEMENT_CHAR;

/// Decode bytes as ASCII, replacing every non-ASCII byte.
///
/// # Example
///
/// ```
/// use wavetap_protocol::text::decode_ascii_lossy;
///
/// assert_eq!(decode_ascii_lossy(b"hello\n"), "hello\n");
/// assert_eq!(decode_ascii_lossy(&[b'o', b'k', 0xAA]), "ok\u{FFFD}");
/// ```
pub fn decode_ascii_lossy(bytes: &[u8]) -> String {
    bytes
        .iter()
        .map(|&b| {
            if b.is_ascii() {
                char::from(b)
            } else {
                REPLACEMENT_CHAR
            }
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_plain_ascii() {
        assert_eq!(decode_ascii_lossy(b"Menu:\r\n 1) Config\r\n"), "Menu:\r\n 1) Config\r\n");
    }

    #[test]
    fn test_empty() {
        assert_eq!(decode_ascii_lossy(b""), "");
    }

    #[test]
    fn test_each_invalid_byte_replaced() {
        let text = decode_ascii_lossy(&[0xAA, 0xBB, 0xCC, 0xDD]);
        assert_eq!(text.chars().count(), 4);
        assert!(text.chars().all(|c| c == REPLACEMENT_CHAR));
    }

    #[test]
    fn test_utf8_is_not_merged() {
        // "é" in UTF-8 is two bytes, each replaced on its own
        let text = decode_ascii_lossy("é".as_bytes());
        assert_eq!(text, "\u{FFFD}\u{FFFD}");
    }

    #[test]
    fn test_split_invariance() {
        let bytes = b"abc\xffdef\x80\n";
        let whole = decode_ascii_lossy(bytes);
        for split in 0..=bytes.len() {
            let (left, right) = bytes.split_at(split);
            let joined = decode_ascii_lossy(left) + &decode_ascii_lossy(right);
            assert_eq!(joined, whole);
        }
    }
}
