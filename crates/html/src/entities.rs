//! Entity decoding for parsed markup and escaping for serialized markup.
//!
//! Decoding contract:
//! - Named entities decoded: `&amp;`, `&lt;`, `&gt;`, `&quot;`, `&apos;`, `&nbsp;`.
//! - Numeric entities decoded only when well-formed and semicolon-terminated:
//!   `&#123;` (decimal) and `&#x1F4A9;` (hex).
//! - Only valid Unicode scalar values decode; invalid scalars pass through unchanged.
//! - Missing semicolons, unknown names and malformed numerics are left unchanged.
//!
//! Escaping is the minimal set needed so that `decode(escape(s)) == s`.

const NAMED: &[(&[u8], char)] = &[
    (b"&amp;", '&'),
    (b"&lt;", '<'),
    (b"&gt;", '>'),
    (b"&quot;", '"'),
    (b"&apos;", '\''),
    (b"&nbsp;", '\u{00A0}'),
];

const MAX_HEX_DIGITS: usize = 6; // 0x10FFFF
const MAX_DEC_DIGITS: usize = 7; // 1114111

/// Returns the index of the terminating `;` of a numeric entity body starting at `start`.
fn scan_numeric_entity(bytes: &[u8], start: usize, is_hex: bool) -> Option<usize> {
    let max_digits = if is_hex { MAX_HEX_DIGITS } else { MAX_DEC_DIGITS };
    let mut j = start;
    while j < bytes.len() {
        let b = bytes[j];
        if b == b';' {
            return (j > start).then_some(j);
        }
        let ok = if is_hex {
            b.is_ascii_hexdigit()
        } else {
            b.is_ascii_digit()
        };
        if !ok || j - start == max_digits {
            return None;
        }
        j += 1;
    }
    None
}

/// Decodes the entity starting at `i` (which points at `&`).
///
/// Returns the decoded char and the index just past the entity.
fn decode_one(s: &str, i: usize) -> Option<(char, usize)> {
    let bytes = s.as_bytes();
    let rest = &bytes[i..];
    if let Some((pat, ch)) = NAMED.iter().find(|(pat, _)| rest.starts_with(pat)) {
        return Some((*ch, i + pat.len()));
    }

    let (digits_start, is_hex) = if rest.starts_with(b"&#x") || rest.starts_with(b"&#X") {
        (i + 3, true)
    } else if rest.starts_with(b"&#") {
        (i + 2, false)
    } else {
        return None;
    };
    let end = scan_numeric_entity(bytes, digits_start, is_hex)?;
    let digits = &s[digits_start..end];
    let radix = if is_hex { 16 } else { 10 };
    let ch = u32::from_str_radix(digits, radix)
        .ok()
        .and_then(char::from_u32)?;
    Some((ch, end + 1))
}

pub fn decode_entities(s: &str) -> String {
    let bytes = s.as_bytes();
    let mut out = String::with_capacity(s.len());
    let mut copy_start = 0;
    let mut i = 0;

    while let Some(rel) = memchr::memchr(b'&', &bytes[i..]) {
        let amp = i + rel;
        match decode_one(s, amp) {
            Some((ch, next)) => {
                out.push_str(&s[copy_start..amp]);
                out.push(ch);
                i = next;
                copy_start = next;
            }
            None => {
                // Leave the `&` in place and keep scanning after it.
                i = amp + 1;
            }
        }
    }

    out.push_str(&s[copy_start..]);
    out
}

/// Appends `s` to `out`, escaping characters that would otherwise start markup.
pub fn escape_text_into(out: &mut String, s: &str) {
    for ch in s.chars() {
        match ch {
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            '\u{00A0}' => out.push_str("&nbsp;"),
            _ => out.push(ch),
        }
    }
}

/// Appends `s` to `out` for use inside a double-quoted attribute value.
pub fn escape_attr_into(out: &mut String, s: &str) {
    for ch in s.chars() {
        match ch {
            '&' => out.push_str("&amp;"),
            '"' => out.push_str("&quot;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            _ => out.push(ch),
        }
    }
}
