//! UTF-8 width helpers.
//!
//! The editor works on raw bytes, so it needs to know how far one codepoint
//! extends from a given byte.  Widths come from the leading byte alone; any
//! byte that is not a recognised leading byte counts as width 1 so that a
//! forward scan always makes progress.

/// Width in bytes of the codepoint that starts with `byte`.
///
/// | Leading byte | Width |
/// |--------------|-------|
/// | `0xC0..=0xDF` | 2 |
/// | `0xE0..=0xEF` | 3 |
/// | `0xF0..=0xF7` | 4 |
/// | anything else | 1 |
#[inline]
pub fn forward_width(byte: u8) -> usize {
    match byte {
        0xC0..=0xDF => 2,
        0xE0..=0xEF => 3,
        0xF0..=0xF7 => 4,
        _ => 1,
    }
}

/// Width of the codepoint that ends just before `pos` in `buf`.
///
/// Walks left from `pos - 1` until it meets an ASCII byte (width 1) or a
/// leading byte of a multi-byte sequence.  Returns 0 at position 0.
pub fn backward_width(buf: &[u8], pos: usize) -> usize {
    let pos = pos.min(buf.len());
    let mut i = pos;
    while i > 0 {
        i -= 1;
        let b = buf[i];
        if b <= 0x7F {
            return 1;
        }
        if forward_width(b) > 1 {
            return pos - i;
        }
    }
    // Nothing but continuation bytes to the left.
    usize::from(pos > 0)
}

/// Number of codepoints in `bytes`, stepping by [`forward_width`].
pub fn codepoint_count(bytes: &[u8]) -> usize {
    let mut i = 0;
    let mut n = 0;
    while i < bytes.len() {
        i += forward_width(bytes[i]);
        n += 1;
    }
    n
}

/// Largest char boundary of `s` that is `<= max`.
pub fn floor_boundary(s: &str, max: usize) -> usize {
    if max >= s.len() {
        return s.len();
    }
    let mut i = max;
    while !s.is_char_boundary(i) {
        i -= 1;
    }
    i
}

/// `s` truncated to at most `max` bytes without splitting a codepoint.
pub fn truncate(s: &str, max: usize) -> &str {
    &s[..floor_boundary(s, max)]
}

// ── Tests ─────────────────────────────────────────────────────────────────────

#[cfg(test)]
mod tests {
    use super::*;

    // ── forward_width ─────────────────────────────────────────────────────────

    #[test]
    fn ascii_is_one_byte() {
        assert_eq!(forward_width(b'a'), 1);
        assert_eq!(forward_width(0x7F), 1);
    }

    #[test]
    fn leading_byte_ranges() {
        assert_eq!(forward_width(0xC3), 2); // é
        assert_eq!(forward_width(0xE2), 3); // €
        assert_eq!(forward_width(0xF0), 4); // 😀
        assert_eq!(forward_width(0xDF), 2);
        assert_eq!(forward_width(0xEF), 3);
        assert_eq!(forward_width(0xF7), 4);
    }

    #[test]
    fn continuation_and_invalid_bytes_are_one() {
        assert_eq!(forward_width(0x80), 1);
        assert_eq!(forward_width(0xBF), 1);
        assert_eq!(forward_width(0xF8), 1);
        assert_eq!(forward_width(0xFF), 1);
    }

    // ── backward_width ────────────────────────────────────────────────────────

    #[test]
    fn backward_over_each_width() {
        for s in ["a", "é", "€", "😀"] {
            let buf = format!("x{s}");
            assert_eq!(backward_width(buf.as_bytes(), buf.len()), s.len(), "{s}");
        }
    }

    #[test]
    fn backward_mid_string() {
        let buf = "héllo".as_bytes();
        // Cursor after "hé" (byte 3).
        assert_eq!(backward_width(buf, 3), 2);
        assert_eq!(backward_width(buf, 1), 1);
    }

    #[test]
    fn backward_at_start_is_zero() {
        assert_eq!(backward_width(b"abc", 0), 0);
    }

    #[test]
    fn backward_stray_continuation_after_ascii() {
        // 'a' followed by a lone continuation byte: step over the stray byte.
        assert_eq!(backward_width(&[b'a', 0x80], 2), 1);
    }

    // ── counting / truncation ─────────────────────────────────────────────────

    #[test]
    fn count_codepoints() {
        assert_eq!(codepoint_count("héllo".as_bytes()), 5);
        assert_eq!(codepoint_count("€😀".as_bytes()), 2);
        assert_eq!(codepoint_count(b""), 0);
    }

    #[test]
    fn truncate_respects_boundaries() {
        assert_eq!(truncate("héllo", 2), "h");
        assert_eq!(truncate("héllo", 3), "hé");
        assert_eq!(truncate("héllo", 100), "héllo");
        assert_eq!(truncate("😀", 3), "");
    }
}
