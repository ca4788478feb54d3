//! UTF-8 text utilities for surface editing.
//!
//! Surface offsets are counted in `char`s (one caret stop per scalar value),
//! so every edit goes through a char-to-byte conversion first.

use std::borrow::Cow;

/// Clamp an arbitrary byte index to a valid UTF-8 character boundary.
///
/// If `index` is beyond the string length, it is clamped to `s.len()`.
/// If `index` falls in the middle of a multi-byte character, it is
/// adjusted backwards to the start of that character.
///
/// # Examples
///
/// ```
/// use input_core::clamp_to_char_boundary;
///
/// let s = "a€b"; // '€' is 3 bytes
/// assert_eq!(clamp_to_char_boundary(s, 2), 1); // mid '€' -> start of '€'
/// assert_eq!(clamp_to_char_boundary(s, 4), 4); // 'b'
/// assert_eq!(clamp_to_char_boundary(s, 100), 5); // beyond end -> len
/// ```
#[inline]
pub fn clamp_to_char_boundary(s: &str, index: usize) -> usize {
    let mut index = index.min(s.len());
    while index > 0 && !s.is_char_boundary(index) {
        index -= 1;
    }
    index
}

/// Length of `s` in `char`s.
#[inline]
pub fn char_len(s: &str) -> usize {
    s.chars().count()
}

/// Byte index of the `char_idx`-th character, clamped to `s.len()`.
///
/// # Examples
///
/// ```
/// use input_core::byte_index;
///
/// let s = "a€b";
/// assert_eq!(byte_index(s, 0), 0);
/// assert_eq!(byte_index(s, 2), 4);
/// assert_eq!(byte_index(s, 9), 5);
/// ```
pub fn byte_index(s: &str, char_idx: usize) -> usize {
    s.char_indices()
        .nth(char_idx)
        .map(|(i, _)| i)
        .unwrap_or(s.len())
}

/// Inserts `ins` before the `char_idx`-th character of `s`.
pub fn insert_at_char(s: &mut String, char_idx: usize, ins: &str) {
    let at = byte_index(s, char_idx);
    s.insert_str(at, ins);
}

/// Removes the characters in `start..end` (char indices, clamped) from `s`.
pub fn remove_char_range(s: &mut String, start: usize, end: usize) {
    let a = byte_index(s, start);
    let b = byte_index(s, end.max(start));
    s.replace_range(a..b, "");
}

/// Splits `s` at a char index, returning the tail.
pub fn split_off_at_char(s: &mut String, char_idx: usize) -> String {
    let at = byte_index(s, char_idx);
    s.split_off(at)
}

/// Filter a string to remove newlines (CR and LF), for single-line surfaces.
///
/// # Examples
///
/// ```
/// use input_core::filter_single_line;
///
/// assert_eq!(filter_single_line("hello"), "hello");
/// assert_eq!(filter_single_line("a\r\nb"), "ab");
/// ```
pub fn filter_single_line(s: &str) -> Cow<'_, str> {
    if !s.contains('\n') && !s.contains('\r') {
        return Cow::Borrowed(s);
    }
    Cow::Owned(s.chars().filter(|c| *c != '\n' && *c != '\r').collect())
}

/// Normalize newlines in a string (CRLF/CR → LF).
///
/// # Examples
///
/// ```
/// use input_core::normalize_newlines;
///
/// assert_eq!(normalize_newlines("hello\r\nworld"), "hello\nworld");
/// assert_eq!(normalize_newlines("hello\rworld"), "hello\nworld");
/// ```
pub fn normalize_newlines(s: &str) -> Cow<'_, str> {
    if !s.contains('\r') {
        return Cow::Borrowed(s);
    }

    let mut out = String::with_capacity(s.len());
    let mut it = s.chars().peekable();
    while let Some(ch) = it.next() {
        match ch {
            '\r' => {
                if it.peek() == Some(&'\n') {
                    let _ = it.next();
                }
                out.push('\n');
            }
            _ => out.push(ch),
        }
    }
    Cow::Owned(out)
}
