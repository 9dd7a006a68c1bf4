//! Scalar UTF-8 validation and byte classification
//!
//! An independent implementation of the validation contract, used as the
//! portability fallback and cross-checked against the streaming lookup-table
//! tiers. The hot case is ASCII text: the validator consumes all-ASCII
//! prefixes at decreasing word widths (8-byte then 4-byte SWAR, then single
//! bytes) and drops into per-sequence structural decoding only when a high
//! bit appears. The structural rules are the Unicode Table 3-7 boundaries:
//! `C2..DF`, `E0 A0..BF`, `ED 80..9F`, `F0 90..BF`, `F4 80..8F`.

const HIGH_BITS_64: u64 = 0x8080_8080_8080_8080;
const HIGH_BITS_32: u32 = 0x8080_8080;

/// Validate a buffer as UTF-8 without tables or intrinsics
pub fn validate_scalar(bytes: &[u8]) -> bool {
    validate_suffix(bytes).is_some()
}

/// Consume the whole buffer; `None` signals invalid input (the port of the
/// source's negative-sentinel convention)
fn validate_suffix(bytes: &[u8]) -> Option<()> {
    let mut pos = 0;
    let len = bytes.len();

    while pos < len {
        pos += ascii_prefix_len(&bytes[pos..]);
        if pos == len {
            break;
        }
        pos += validate_sequence(&bytes[pos..])?;
    }
    Some(())
}

/// Length of the longest all-ASCII prefix, scanned at decreasing widths
fn ascii_prefix_len(bytes: &[u8]) -> usize {
    let mut pos = 0;

    while bytes.len() - pos >= 8 {
        let word = u64::from_le_bytes(bytes[pos..pos + 8].try_into().unwrap());
        if word & HIGH_BITS_64 != 0 {
            break;
        }
        pos += 8;
    }
    while bytes.len() - pos >= 4 {
        let word = u32::from_le_bytes(bytes[pos..pos + 4].try_into().unwrap());
        if word & HIGH_BITS_32 != 0 {
            break;
        }
        pos += 4;
    }
    while pos < bytes.len() && bytes[pos] < 0x80 {
        pos += 1;
    }
    pos
}

#[inline]
fn is_continuation(byte: u8) -> bool {
    byte & 0xC0 == 0x80
}

/// Validate one multi-byte sequence starting at a non-ASCII byte, returning
/// its width. `None` if the lead is invalid, a continuation is malformed, or
/// the buffer ends mid-sequence.
fn validate_sequence(bytes: &[u8]) -> Option<usize> {
    debug_assert!(!bytes.is_empty() && bytes[0] >= 0x80);
    let lead = bytes[0];

    let (width, second_lo, second_hi) = match lead {
        0xC2..=0xDF => (2, 0x80, 0xBF),
        0xE0 => (3, 0xA0, 0xBF),
        0xE1..=0xEC | 0xEE..=0xEF => (3, 0x80, 0xBF),
        0xED => (3, 0x80, 0x9F),
        0xF0 => (4, 0x90, 0xBF),
        0xF1..=0xF3 => (4, 0x80, 0xBF),
        0xF4 => (4, 0x80, 0x8F),
        // Continuations, C0/C1 overlongs, and 5+ byte leads
        _ => return None,
    };

    if bytes.len() < width {
        return None;
    }
    if !(second_lo..=second_hi).contains(&bytes[1]) {
        return None;
    }
    for &byte in &bytes[2..width] {
        if !is_continuation(byte) {
            return None;
        }
    }
    Some(width)
}

/// Count bytes matching `10xxxxxx` with an 8-byte SWAR fast path
///
/// For valid UTF-8 this equals byte length minus codepoint count, which is
/// how `char_len` is derived without decoding.
pub fn count_continuation_bytes(bytes: &[u8]) -> usize {
    let mut count = 0;
    let mut chunks = bytes.chunks_exact(8);

    for chunk in &mut chunks {
        let word = u64::from_le_bytes(chunk.try_into().unwrap());
        // Bit 7 set and bit 6 clear, tested in the bit-7 position per byte.
        let top = word & HIGH_BITS_64;
        let second = (word << 1) & HIGH_BITS_64;
        count += (top & !second).count_ones() as usize;
    }
    for &byte in chunks.remainder() {
        if is_continuation(byte) {
            count += 1;
        }
    }
    count
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_ascii_prefix() {
        assert_eq!(ascii_prefix_len(b""), 0);
        assert_eq!(ascii_prefix_len(b"abc"), 3);
        assert_eq!(ascii_prefix_len(b"abcdefghijk"), 11);
        assert_eq!(ascii_prefix_len(&[b'a', b'b', 0xC3, 0xA9, b'c']), 2);
        assert_eq!(ascii_prefix_len(&[0xC3, 0xA9]), 0);
    }

    #[test]
    fn test_sequence_boundaries() {
        // Minimal and maximal sequence per width
        assert!(validate_scalar(&[0xC2, 0x80]));
        assert!(validate_scalar(&[0xDF, 0xBF]));
        assert!(validate_scalar(&[0xE0, 0xA0, 0x80]));
        assert!(validate_scalar(&[0xEF, 0xBF, 0xBF]));
        assert!(validate_scalar(&[0xF0, 0x90, 0x80, 0x80]));
        assert!(validate_scalar(&[0xF4, 0x8F, 0xBF, 0xBF]));
        // Around the surrogate gap
        assert!(validate_scalar(&[0xED, 0x9F, 0xBF]));
        assert!(validate_scalar(&[0xEE, 0x80, 0x80]));
    }

    #[test]
    fn test_rejections() {
        // Overlongs
        assert!(!validate_scalar(&[0xC0, 0x80]));
        assert!(!validate_scalar(&[0xC1, 0xBF]));
        assert!(!validate_scalar(&[0xE0, 0x9F, 0xBF]));
        assert!(!validate_scalar(&[0xF0, 0x8F, 0xBF, 0xBF]));
        // Surrogates
        assert!(!validate_scalar(&[0xED, 0xA0, 0x80]));
        assert!(!validate_scalar(&[0xED, 0xBF, 0xBF]));
        // Out of range
        assert!(!validate_scalar(&[0xF4, 0x90, 0x80, 0x80]));
        assert!(!validate_scalar(&[0xF5, 0x80, 0x80, 0x80]));
        // Lone continuation and truncation
        assert!(!validate_scalar(&[0x80]));
        assert!(!validate_scalar(&[0xE1, 0x80]));
        // 5-byte lead
        assert!(!validate_scalar(&[0xF8, 0x80, 0x80, 0x80, 0x80]));
    }

    #[test]
    fn test_mixed_content() {
        assert!(validate_scalar("ascii then \u{4e16}\u{754c} then more ascii".as_bytes()));
        assert!(validate_scalar(
            "long ascii run exceeding the widest word size before \u{1f44d}".as_bytes()
        ));
        let mut bad = b"long ascii run exceeding the widest word size".to_vec();
        bad.push(0xFF);
        assert!(!validate_scalar(&bad));
    }

    #[test]
    fn test_continuation_count() {
        assert_eq!(count_continuation_bytes(b""), 0);
        assert_eq!(count_continuation_bytes(b"hello"), 0);
        assert_eq!(count_continuation_bytes("\u{e9}".as_bytes()), 1);
        assert_eq!(count_continuation_bytes("\u{4e16}\u{754c}".as_bytes()), 4);
        // 21 bytes, 7 codepoints
        let s = "\u{0ca8}\u{0cae}\u{0cb8}\u{0ccd}\u{0c95}\u{0cbe}\u{0cb0}";
        assert_eq!(s.len(), 21);
        assert_eq!(count_continuation_bytes(s.as_bytes()), 21 - 7);
        // Fast path and remainder interplay on a long mixed string
        let long = "abc\u{e9}".repeat(20);
        assert_eq!(count_continuation_bytes(long.as_bytes()), 20);
    }
}
