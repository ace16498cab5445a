//! SIMD-accelerated markup scanning using memchr
//!
//! Uses memchr crate for fast byte searching with SIMD acceleration:
//! - SSE2 (default x86_64)
//! - AVX2 (runtime detection)
//! - NEON (aarch64)
//!
//! The scanner only locates delimiters. It never fails: callers decide what
//! an unterminated construct means.

use memchr::{memchr, memchr_iter, memmem};

/// Scanner for markup delimiter detection
pub struct Scanner<'a> {
    input: &'a [u8],
    pos: usize,
}

impl<'a> Scanner<'a> {
    /// Create a new scanner for the given input
    #[inline]
    pub fn new(input: &'a [u8]) -> Self {
        Scanner { input, pos: 0 }
    }

    /// Create a scanner starting at `pos`
    #[inline]
    pub fn at(input: &'a [u8], pos: usize) -> Self {
        Scanner {
            input,
            pos: pos.min(input.len()),
        }
    }

    /// Get the current position
    #[inline]
    pub fn position(&self) -> usize {
        self.pos
    }

    /// Set the current position
    #[inline]
    pub fn set_position(&mut self, pos: usize) {
        self.pos = pos.min(self.input.len());
    }

    /// Total input length
    #[inline]
    pub fn len(&self) -> usize {
        self.input.len()
    }

    /// Check if we've reached the end
    #[inline]
    pub fn is_eof(&self) -> bool {
        self.pos >= self.input.len()
    }

    /// Peek at current byte without advancing
    #[inline]
    pub fn peek(&self) -> Option<u8> {
        self.input.get(self.pos).copied()
    }

    /// Advance by n bytes
    #[inline]
    pub fn advance(&mut self, n: usize) {
        self.pos = (self.pos + n).min(self.input.len());
    }

    /// Check if input starts with a byte sequence at current position
    #[inline]
    pub fn starts_with(&self, needle: &[u8]) -> bool {
        self.input[self.pos..].starts_with(needle)
    }

    /// Find the next '<' that really opens markup.
    ///
    /// A '<' followed by a space, digit or other punctuation is ordinary
    /// text in hand-written HTML ("a < b"), so it is skipped.
    pub fn find_markup_start(&self) -> Option<usize> {
        memchr_iter(b'<', &self.input[self.pos..])
            .map(|i| self.pos + i)
            .find(|&at| opens_markup(self.input, at))
    }

    /// Find tag end while handling quotes properly
    /// Returns the position of '>' that is not inside quotes
    pub fn find_tag_end_quoted(&self) -> Option<usize> {
        let mut pos = self.pos;
        let mut in_single_quote = false;
        let mut in_double_quote = false;

        while pos < self.input.len() {
            match self.input[pos] {
                b'"' if !in_single_quote => in_double_quote = !in_double_quote,
                b'\'' if !in_double_quote => in_single_quote = !in_single_quote,
                b'>' if !in_single_quote && !in_double_quote => return Some(pos),
                _ => {}
            }
            pos += 1;
        }
        None
    }

    /// Find the end of a start tag.
    ///
    /// Follows the attribute parser: a quote only opens a value when it comes
    /// right after `=` (optionally separated by whitespace). Quotes inside an
    /// unquoted value such as `alt=O'Brien` are ordinary characters.
    pub fn find_start_tag_end(&self) -> Option<usize> {
        let mut pos = self.pos;
        let mut after_eq = false;

        while pos < self.input.len() {
            match self.input[pos] {
                b'>' => return Some(pos),
                quote @ (b'"' | b'\'') if after_eq => {
                    let close = memchr(quote, &self.input[pos + 1..])?;
                    pos += close + 2;
                    after_eq = false;
                    continue;
                }
                b'=' => after_eq = true,
                b if is_whitespace(b) => {}
                _ => after_eq = false,
            }
            pos += 1;
        }
        None
    }

    /// Find next occurrence of a specific byte
    #[inline]
    pub fn find_byte(&self, byte: u8) -> Option<usize> {
        memchr(byte, &self.input[self.pos..]).map(|i| self.pos + i)
    }

    /// Find next occurrence of a byte sequence (comment and CDATA terminators)
    #[inline]
    pub fn find_seq(&self, needle: &[u8]) -> Option<usize> {
        memmem::find(&self.input[self.pos..], needle).map(|i| self.pos + i)
    }

    /// Find `</name` with an ASCII case-insensitive name match, as used to end
    /// raw-text elements such as `<script>`.
    pub fn find_closing_tag(&self, name: &str) -> Option<usize> {
        let name = name.as_bytes();
        memmem::find_iter(&self.input[self.pos..], b"</")
            .map(|i| self.pos + i)
            .find(|&at| {
                let start = at + 2;
                let end = start + name.len();
                end <= self.input.len()
                    && self.input[start..end].eq_ignore_ascii_case(name)
                    && self
                        .input
                        .get(end)
                        .is_none_or(|&b| is_whitespace(b) || b == b'>' || b == b'/')
            })
    }

    /// Read a tag or attribute name leniently: everything up to whitespace,
    /// '>', '/', or '='. Returns the byte range of the name.
    pub fn read_name(&mut self) -> (usize, usize) {
        let start = self.pos;
        while self.pos < self.input.len() {
            match self.input[self.pos] {
                b'>' | b'/' | b'=' => break,
                b if is_whitespace(b) => break,
                _ => self.pos += 1,
            }
        }
        (start, self.pos)
    }
}

/// Check whether the '<' at `at` begins a markup construct
#[inline]
pub fn opens_markup(input: &[u8], at: usize) -> bool {
    match input.get(at + 1) {
        Some(b'!') | Some(b'?') => true,
        Some(b'/') => input.get(at + 2).is_some_and(|&b| is_name_start_char(b)),
        Some(&b) => is_name_start_char(b),
        None => false,
    }
}

/// Check if byte is whitespace
#[inline]
pub fn is_whitespace(b: u8) -> bool {
    matches!(b, b' ' | b'\t' | b'\n' | b'\r' | b'\x0c')
}

/// Check if byte can start a tag name
/// Allows ASCII letters, underscore, colon, and non-ASCII (UTF-8 Unicode)
#[inline]
pub fn is_name_start_char(b: u8) -> bool {
    matches!(b, b'A'..=b'Z' | b'a'..=b'z' | b'_' | b':') || b >= 0x80
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_find_markup_start_skips_bare_less_than() {
        let scanner = Scanner::new(b"a < b <p>");
        assert_eq!(scanner.find_markup_start(), Some(6));
    }

    #[test]
    fn test_find_markup_start_closing_and_comment() {
        assert_eq!(Scanner::new(b"x</p>").find_markup_start(), Some(1));
        assert_eq!(Scanner::new(b"x<!-- c -->").find_markup_start(), Some(1));
        assert_eq!(Scanner::new(b"x</ p>").find_markup_start(), None);
    }

    #[test]
    fn test_find_tag_end_quoted() {
        let scanner = Scanner::new(b"<a attr=\">test\">content");
        assert_eq!(scanner.find_tag_end_quoted(), Some(15));
    }

    #[test]
    fn test_find_start_tag_end_quotes_only_after_equals() {
        assert_eq!(Scanner::new(b"<a attr=\">x\">").find_start_tag_end(), Some(12));
        assert_eq!(Scanner::new(b"<a attr = '>x'>").find_start_tag_end(), Some(14));
        assert_eq!(Scanner::new(b"<img alt=O'Brien src=x.png>").find_start_tag_end(), Some(26));
        assert_eq!(Scanner::new(b"<a title=x\"y>").find_start_tag_end(), Some(12));
        assert_eq!(Scanner::new(b"<a href=\"open>").find_start_tag_end(), None);
    }

    #[test]
    fn test_find_closing_tag_case_insensitive() {
        let scanner = Scanner::new(b"if (a</b) {} </SCRIPT>");
        assert_eq!(scanner.find_closing_tag("script"), Some(13));
        assert_eq!(Scanner::new(b"</scripts>").find_closing_tag("script"), None);
    }

    #[test]
    fn test_read_name() {
        let mut scanner = Scanner::new(b"element-name attr>");
        assert_eq!(scanner.read_name(), (0, 12));
        assert_eq!(scanner.position(), 12);
    }
}
