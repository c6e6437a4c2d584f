//! UTF-8 character column conversion.
//!
//! Compilers report columns as character positions, while Rust strings are
//! indexed by bytes. Multi-byte characters (like `æ` = 2 bytes, emoji = 4 bytes)
//! need conversion before a column can be turned into an offset.

/// Convert a character offset to a byte offset in a UTF-8 string.
///
/// Offsets past the last character clamp to `content.len()`.
///
/// # Examples
/// ```
/// use snipcheck_lib::utils::utf8_offsets::char_offset_to_byte_offset;
///
/// assert_eq!(char_offset_to_byte_offset("Hello", 2), 2);
/// assert_eq!(char_offset_to_byte_offset("æx", 1), 2);
/// assert_eq!(char_offset_to_byte_offset("abc", 10), 3);
/// ```
pub fn char_offset_to_byte_offset(content: &str, char_offset: usize) -> usize {
    content
        .char_indices()
        .nth(char_offset)
        .map(|(byte_idx, _)| byte_idx)
        .unwrap_or(content.len())
}
