//! UTF-8 boundary helpers used when windowing long sections.

/// Finds a valid UTF-8 character boundary at or before the given position.
///
/// # Examples
///
/// ```
/// use sqlrag_rs::io::find_char_boundary;
///
/// let s = "Hello 世界";
/// assert_eq!(find_char_boundary(s, 6), 6); // Before '世'
/// assert_eq!(find_char_boundary(s, 7), 6); // Middle of '世', backs up
/// ```
#[must_use]
pub const fn find_char_boundary(s: &str, pos: usize) -> usize {
    if pos >= s.len() {
        return s.len();
    }
    let bytes = s.as_bytes();
    let mut boundary = pos;
    // UTF-8 continuation bytes start with 10xxxxxx
    while boundary > 0 && (bytes[boundary] & 0xC0) == 0x80 {
        boundary -= 1;
    }
    boundary
}

/// Converts a character count into a byte offset from `start`, clamped to the
/// end of `s`.
#[must_use]
pub fn byte_offset_for_chars(s: &str, start: usize, chars: usize) -> usize {
    s[start..]
        .char_indices()
        .nth(chars)
        .map_or(s.len(), |(offset, _)| start + offset)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_find_char_boundary_ascii() {
        assert_eq!(find_char_boundary("hello", 3), 3);
        assert_eq!(find_char_boundary("hello", 10), 5);
    }

    #[test]
    fn test_find_char_boundary_multibyte() {
        let s = "₹100";
        assert_eq!(find_char_boundary(s, 1), 0);
        assert_eq!(find_char_boundary(s, 2), 0);
        assert_eq!(find_char_boundary(s, 3), 3);
    }

    #[test]
    fn test_byte_offset_for_chars() {
        let s = "aé₹b";
        assert_eq!(byte_offset_for_chars(s, 0, 0), 0);
        assert_eq!(byte_offset_for_chars(s, 0, 2), 3);
        assert_eq!(byte_offset_for_chars(s, 0, 3), 6);
        assert_eq!(byte_offset_for_chars(s, 0, 10), s.len());
        assert_eq!(byte_offset_for_chars(s, 1, 1), 3);
    }
}
