//! Fragment tokenizer for editable-surface markup.
//!
//! Supported tag-name characters (ASCII only): `[A-Za-z0-9:_-]`.
//! Attribute names use the same ASCII character class.
//!
//! Known limitations (intentional):
//! - Not an HTML5 tokenizer (no parse-error recovery, no doctype, no rawtext elements).
//!   Editable surfaces only ever contain text, inline elements and `<br>`.
//! - Tag/attribute names are restricted to ASCII `[A-Za-z0-9:_-]`.
use crate::entities::decode_entities;
use crate::types::{AtomId, AtomTable, Token, TokenStream};
use memchr::memchr;

const HTML_COMMENT_START: &str = "<!--";
const HTML_COMMENT_END: &str = "-->";

fn is_name_char(c: u8) -> bool {
    c.is_ascii_alphanumeric() || c == b'-' || c == b'_' || c == b':'
}

pub(crate) fn is_void_element(name: &str) -> bool {
    matches!(
        name,
        "area" | "br" | "col" | "embed" | "hr" | "img" | "input" | "source" | "track" | "wbr"
    )
}

/// Tokenizes a markup fragment into a token stream with interned names.
pub fn tokenize(input: &str) -> TokenStream {
    let mut out = Vec::new();
    let mut atoms = AtomTable::new();
    let mut i = 0;
    let bytes = input.as_bytes();
    let len = bytes.len();
    // Invariant: we scan by byte, but any slice endpoints must be UTF-8 char boundaries.
    // Slices are only cut at ASCII structural bytes, which never occur inside a
    // multi-byte sequence.
    while i < len {
        if bytes[i] != b'<' {
            let start = i;
            i = memchr(b'<', &bytes[i..]).map_or(len, |rel| i + rel);
            debug_assert!(input.is_char_boundary(start));
            debug_assert!(input.is_char_boundary(i));
            let decoded = decode_entities(&input[start..i]);
            if !decoded.is_empty() {
                out.push(Token::Text(decoded));
            }
            continue;
        }

        if input[i..].starts_with(HTML_COMMENT_START) {
            let body_start = i + HTML_COMMENT_START.len();
            match input[body_start..].find(HTML_COMMENT_END) {
                Some(end) => {
                    out.push(Token::Comment(input[body_start..body_start + end].to_string()));
                    i = body_start + end + HTML_COMMENT_END.len();
                    continue;
                }
                None => {
                    out.push(Token::Comment(input[body_start..].to_string()));
                    break;
                }
            }
        }

        // end tag
        if i + 1 < len && bytes[i + 1] == b'/' {
            let start = i + 2;
            let mut j = start;
            while j < len && is_name_char(bytes[j]) {
                j += 1;
            }
            let name = atoms.intern_ascii_lowercase(&input[start..j]);
            j = memchr(b'>', &bytes[j..]).map_or(len, |rel| j + rel + 1);
            out.push(Token::EndTag(name));
            i = j;
            continue;
        }

        // start tag
        let start = i + 1;
        let mut j = start;
        while j < len && is_name_char(bytes[j]) {
            j += 1;
        }
        if j == start {
            // A lone `<` is text.
            out.push(Token::Text("<".to_string()));
            i += 1;
            continue;
        }
        let name = atoms.intern_ascii_lowercase(&input[start..j]);
        let (attributes, self_closing, next) = scan_attributes(input, j, &mut atoms);
        let self_closing = self_closing || is_void_element(atoms.resolve(name));
        log::trace!(target: "html.tokenizer", "start tag <{}> at {i}", atoms.resolve(name));
        out.push(Token::StartTag {
            name,
            attributes,
            self_closing,
        });
        i = next;
    }
    TokenStream::new(out, atoms)
}

fn scan_attributes(
    input: &str,
    mut k: usize,
    atoms: &mut AtomTable,
) -> (Vec<(AtomId, Option<String>)>, bool, usize) {
    let bytes = input.as_bytes();
    let len = bytes.len();
    let mut attributes: Vec<(AtomId, Option<String>)> = Vec::new();
    let mut self_closing = false;

    let skip_whitespace = |k: &mut usize| {
        while *k < len && bytes[*k].is_ascii_whitespace() {
            *k += 1;
        }
    };

    loop {
        skip_whitespace(&mut k);
        if k >= len {
            break;
        }
        if bytes[k] == b'>' {
            k += 1;
            break;
        }
        if bytes[k] == b'/' {
            if k + 1 < len && bytes[k + 1] == b'>' {
                self_closing = true;
                k += 2;
                break;
            }
            k += 1;
            continue;
        }
        let name_start = k;
        while k < len && is_name_char(bytes[k]) {
            k += 1;
        }
        if name_start == k {
            k += 1;
            continue;
        }
        let attribute_name = atoms.intern_ascii_lowercase(&input[name_start..k]);

        skip_whitespace(&mut k);
        let value = if k < len && bytes[k] == b'=' {
            k += 1;
            skip_whitespace(&mut k);
            if k < len && (bytes[k] == b'"' || bytes[k] == b'\'') {
                let quote = bytes[k];
                k += 1;
                let vstart = k;
                k = memchr(quote, &bytes[k..]).map_or(len, |rel| k + rel);
                let raw = &input[vstart..k];
                if k < len {
                    k += 1;
                }
                Some(decode_entities(raw))
            } else {
                let vstart = k;
                while k < len && !bytes[k].is_ascii_whitespace() && bytes[k] != b'>' {
                    if bytes[k] == b'/' && k + 1 < len && bytes[k + 1] == b'>' {
                        break;
                    }
                    k += 1;
                }
                Some(decode_entities(&input[vstart..k]))
            }
        } else {
            None
        };
        attributes.push((attribute_name, value));
    }

    (attributes, self_closing, k)
}
