//! UTF-8-safe string truncation utilities
//!
//! Article bodies and log previews routinely contain multi-byte characters
//! (CJK text, emoji, typographic quotes). Slicing by byte index would panic,
//! so every truncation goes through these helpers.

/// Truncate to at most `max_chars` characters (not bytes).
///
/// # Examples
/// ```
/// # use mediumscrape::utils::string_utils::safe_truncate_chars;
/// assert_eq!(safe_truncate_chars("Hello, World!", 5), "Hello");
/// assert_eq!(safe_truncate_chars("日本語の記事", 3), "日本語");
/// assert_eq!(safe_truncate_chars("Hi", 100), "Hi");
/// ```
#[inline]
pub fn safe_truncate_chars(s: &str, max_chars: usize) -> &str {
    match s.char_indices().nth(max_chars) {
        None => s,
        Some((byte_idx, _)) => &s[..byte_idx],
    }
}

/// Byte index of the last boundary within the first `max_chars` characters.
///
/// A boundary is any whitespace or a character in `boundary_chars`. Falls back
/// to the `max_chars`-th character when no boundary exists, and to the string
/// length when the string is shorter.
///
/// # Examples
/// ```
/// # use mediumscrape::utils::string_utils::safe_truncate_boundary;
/// let text = "Hello, wonderful world of Unicode!";
/// let idx = safe_truncate_boundary(text, 20, " ,;:");
/// assert_eq!(&text[..idx], "Hello, wonderful");
/// ```
pub fn safe_truncate_boundary(s: &str, max_chars: usize, boundary_chars: &str) -> usize {
    let max_byte_idx = s
        .char_indices()
        .nth(max_chars)
        .map(|(idx, _)| idx)
        .unwrap_or(s.len());

    if max_byte_idx == s.len() {
        return max_byte_idx;
    }

    s[..max_byte_idx]
        .rfind(|c: char| c.is_whitespace() || boundary_chars.contains(c))
        .unwrap_or(max_byte_idx)
}
