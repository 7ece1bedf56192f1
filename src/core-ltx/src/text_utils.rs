//! Text manipulation utilities.

/// Uppercases the first character of a string and leaves the rest as is.
///
/// # Examples
///
/// ```
/// # use core_ltx::text_utils::capitalize_first;
/// assert_eq!(capitalize_first("blog"), "Blog");
/// assert_eq!(capitalize_first("api-Docs"), "Api-Docs");
/// assert_eq!(capitalize_first(""), "");
/// ```
pub fn capitalize_first(s: &str) -> String {
    let mut chars = s.chars();
    match chars.next() {
        None => String::new(),
        Some(first) => first.to_uppercase().chain(chars).collect(),
    }
}

/// Keeps at most `max_chars` characters, never splitting a UTF-8 sequence.
pub fn truncate_chars(s: &str, max_chars: usize) -> &str {
    match s.char_indices().nth(max_chars) {
        Some((byte_index, _)) => &s[..byte_index],
        None => s,
    }
}
