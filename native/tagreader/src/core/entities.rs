//! Entity Decoding and Escaping
//!
//! Handles decoding of character references in text and attribute values:
//! - Built-in entities: &lt; &gt; &amp; &quot; &apos;
//! - Common HTML named entities (&nbsp;, &copy;, ...)
//! - Numeric character references: &#123; &#x7B;
//!
//! Uses Cow for zero-copy when no entities are present. Unknown or malformed
//! references are kept verbatim; hand-written HTML is full of bare '&'.

use memchr::{memchr, memchr2};
use std::borrow::Cow;

/// Masked form of a line feed in exported text
pub const MASKED_LF: &str = "&#10;";
/// Masked form of a carriage return in exported text
pub const MASKED_CR: &str = "&#13;";

/// Decode text content, handling entity references
///
/// Returns Borrowed if no entities present (zero-copy),
/// returns Owned if entities were decoded.
#[inline]
pub fn decode_text(input: &str) -> Cow<'_, str> {
    // Fast path: check if there are any entities using SIMD
    if memchr(b'&', input.as_bytes()).is_none() {
        return Cow::Borrowed(input);
    }
    Cow::Owned(decode_entities(input))
}

/// Decode all entity references in the input
fn decode_entities(input: &str) -> String {
    let mut result = String::with_capacity(input.len());
    let mut rest = input;

    while let Some(amp_pos) = memchr(b'&', rest.as_bytes()) {
        result.push_str(&rest[..amp_pos]);
        rest = &rest[amp_pos..];

        let decoded = memchr(b';', rest.as_bytes())
            // Entity names are short; a far-away ';' belongs to something else
            .filter(|&semi| semi <= 32)
            .and_then(|semi| decode_entity(&rest[1..semi]).map(|c| (c, semi)));

        match decoded {
            Some((c, semi)) => {
                result.push(c);
                rest = &rest[semi + 1..];
            }
            None => {
                result.push('&');
                rest = &rest[1..];
            }
        }
    }

    result.push_str(rest);
    result
}

/// Decode a single entity (without & and ;)
fn decode_entity(entity: &str) -> Option<char> {
    if let Some(numeric) = entity.strip_prefix('#') {
        return decode_numeric_entity(numeric);
    }

    match entity {
        "lt" => Some('<'),
        "gt" => Some('>'),
        "amp" => Some('&'),
        "quot" => Some('"'),
        "apos" => Some('\''),
        // HTML5 named entities (common ones)
        "nbsp" => Some('\u{00A0}'),
        "copy" => Some('\u{00A9}'),
        "reg" => Some('\u{00AE}'),
        "trade" => Some('\u{2122}'),
        "laquo" => Some('\u{00AB}'),
        "raquo" => Some('\u{00BB}'),
        "mdash" => Some('\u{2014}'),
        "ndash" => Some('\u{2013}'),
        "lsquo" => Some('\u{2018}'),
        "rsquo" => Some('\u{2019}'),
        "ldquo" => Some('\u{201C}'),
        "rdquo" => Some('\u{201D}'),
        "bdquo" => Some('\u{201E}'),
        "hellip" => Some('\u{2026}'),
        "euro" => Some('\u{20AC}'),
        "times" => Some('\u{00D7}'),
        _ => None,
    }
}

/// Decode a numeric character reference
fn decode_numeric_entity(entity: &str) -> Option<char> {
    let codepoint = match entity.strip_prefix(['x', 'X']) {
        // Hexadecimal: &#xHHHH;
        Some(hex) => u32::from_str_radix(hex, 16).ok()?,
        // Decimal: &#DDDD;
        None => entity.parse::<u32>().ok()?,
    };
    char::from_u32(codepoint)
}

/// Escape a value for a double-quoted attribute
#[inline]
pub fn escape_attr_to_buf(s: &str, buf: &mut String) {
    for c in s.chars() {
        match c {
            '&' => buf.push_str("&amp;"),
            '<' => buf.push_str("&lt;"),
            '>' => buf.push_str("&gt;"),
            '"' => buf.push_str("&quot;"),
            _ => buf.push(c),
        }
    }
}

/// Replace literal line breaks with character references so exported text
/// survives storage that normalizes whitespace. Entity decoding restores them.
pub fn mask_line_breaks(input: &str) -> Cow<'_, str> {
    let bytes = input.as_bytes();
    if memchr2(b'\n', b'\r', bytes).is_none() {
        return Cow::Borrowed(input);
    }

    let mut result = String::with_capacity(input.len() + 16);
    for c in input.chars() {
        match c {
            '\n' => result.push_str(MASKED_LF),
            '\r' => result.push_str(MASKED_CR),
            _ => result.push(c),
        }
    }
    Cow::Owned(result)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_no_entities_borrows() {
        assert!(matches!(decode_text("plain text"), Cow::Borrowed("plain text")));
    }

    #[test]
    fn test_builtin_and_html_entities() {
        assert_eq!(decode_text("a &lt;b&gt; &amp; &quot;c&quot;"), "a <b> & \"c\"");
        assert_eq!(decode_text("x&nbsp;y"), "x\u{00A0}y");
    }

    #[test]
    fn test_numeric_entities() {
        assert_eq!(decode_text("&#65;&#x42;&#X43;"), "ABC");
    }

    #[test]
    fn test_bare_ampersand_kept() {
        assert_eq!(decode_text("Tom & Jerry; &unknown; &"), "Tom & Jerry; &unknown; &");
    }

    #[test]
    fn test_escape_attr() {
        let mut buf = String::new();
        escape_attr_to_buf("a\"b<c>&d'", &mut buf);
        assert_eq!(buf, "a&quot;b&lt;c&gt;&amp;d'");
    }

    #[test]
    fn test_mask_line_breaks_restored_by_decode() {
        let masked = mask_line_breaks("one\r\ntwo\nthree");
        assert_eq!(masked, "one&#13;&#10;two&#10;three");
        assert_eq!(decode_text(&masked), "one\r\ntwo\nthree");
        assert!(matches!(mask_line_breaks("flat"), Cow::Borrowed(_)));
    }
}
