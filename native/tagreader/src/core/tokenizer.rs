//! Markup Tokenizer - splits the buffer into node-sized tokens
//!
//! One call to [`Tokenizer::next_token`] yields exactly one node:
//! - Element start/empty/end tags
//! - Text runs between markup
//! - Comments, CDATA sections, declarations, processing instructions
//!
//! The tokenizer is lenient. An unterminated tag or comment swallows the
//! rest of the buffer as its body and is flagged `terminated: false`; no
//! input makes it fail.

use super::scanner::Scanner;
use super::span::Span;

/// Elements whose content is raw text rather than markup
pub const RAW_TEXT_ELEMENTS: &[&str] = &["script", "style"];

/// Type of markup token
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TokenKind {
    /// Element start tag: <element>
    StartTag,
    /// Self-closed element: <element/>
    EmptyTag,
    /// Element end tag: </element>
    EndTag,
    /// Text content between markup
    Text,
    /// Comment: <!--...-->
    Comment,
    /// CDATA section: <![CDATA[...]]>
    CData,
    /// Declaration: <!DOCTYPE ...>
    Declaration,
    /// Processing instruction: <?target ...?>
    ProcessingInstruction,
}

/// A scanned token. All positions are spans into the tokenizer input.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Token {
    pub kind: TokenKind,
    /// Full raw span including delimiters
    pub span: Span,
    /// Tag name (tags only)
    pub name: Span,
    /// Attribute list (start/empty tags) or delimiter-free body (everything else)
    pub body: Span,
    /// False when the input ended before the closing delimiter
    pub terminated: bool,
}

impl Token {
    fn text(start: usize, end: usize) -> Self {
        Token {
            kind: TokenKind::Text,
            span: Span::new(start, end),
            name: Span::empty(start),
            body: Span::new(start, end),
            terminated: true,
        }
    }

    fn wrapped(kind: TokenKind, span: Span, body: Span, terminated: bool) -> Self {
        Token {
            kind,
            span,
            name: Span::empty(span.start),
            body,
            terminated,
        }
    }
}

/// Markup tokenizer implementing a pull pattern over a borrowed buffer
pub struct Tokenizer<'a> {
    scanner: Scanner<'a>,
    input: &'a str,
    /// Set after a raw-text element opener: the next token is its content
    raw_text: Option<&'static str>,
    raw_text_elements: bool,
}

impl<'a> Tokenizer<'a> {
    /// Create a new tokenizer at the start of the input
    pub fn new(input: &'a str) -> Self {
        Self::at(input, 0, None)
    }

    /// Resume tokenizing at `pos`. `raw_text` names a raw-text element whose
    /// content starts at `pos`.
    pub fn at(input: &'a str, pos: usize, raw_text: Option<&'static str>) -> Self {
        Tokenizer {
            scanner: Scanner::at(input.as_bytes(), pos),
            input,
            raw_text,
            raw_text_elements: true,
        }
    }

    /// Raw-text element the next token belongs to, if any
    #[inline]
    pub fn raw_text(&self) -> Option<&'static str> {
        self.raw_text
    }

    /// Enable or disable raw-text handling for `<script>`/`<style>`.
    /// When disabled, no element content is treated specially.
    pub fn with_raw_text_elements(mut self, enabled: bool) -> Self {
        self.raw_text_elements = enabled;
        self
    }

    /// Get the next token, or `None` once the input is exhausted
    pub fn next_token(&mut self) -> Option<Token> {
        if self.scanner.is_eof() {
            return None;
        }
        let start = self.scanner.position();

        if let Some(element) = self.raw_text.take() {
            let end = self
                .scanner
                .find_closing_tag(element)
                .unwrap_or(self.scanner.len());
            if end > start {
                self.scanner.set_position(end);
                return Some(Token::text(start, end));
            }
        }

        if self.scanner.peek() == Some(b'<') && super::scanner::opens_markup(self.input.as_bytes(), start) {
            return Some(self.scan_markup(start));
        }

        // Text runs up to the next real markup opener
        self.scanner.advance(1);
        let end = self
            .scanner
            .find_markup_start()
            .unwrap_or(self.scanner.len());
        self.scanner.set_position(end);
        Some(Token::text(start, end))
    }

    fn scan_markup(&mut self, start: usize) -> Token {
        if self.scanner.starts_with(b"<!--") {
            return self.scan_delimited(start, TokenKind::Comment, 4, b"-->");
        }
        if self.scanner.starts_with(b"<![CDATA[") {
            return self.scan_delimited(start, TokenKind::CData, 9, b"]]>");
        }
        if self.scanner.starts_with(b"<?") {
            return self.scan_processing_instruction(start);
        }
        if self.scanner.starts_with(b"<!") {
            self.scanner.advance(2);
            let (end, body_end, terminated) = match self.scanner.find_tag_end_quoted() {
                Some(gt) => (gt + 1, gt, true),
                None => (self.scanner.len(), self.scanner.len(), false),
            };
            self.scanner.set_position(end);
            return Token::wrapped(
                TokenKind::Declaration,
                Span::new(start, end),
                Span::new(start + 2, body_end),
                terminated,
            );
        }
        if self.scanner.starts_with(b"</") {
            return self.scan_end_tag(start);
        }
        self.scan_start_tag(start)
    }

    fn scan_delimited(&mut self, start: usize, kind: TokenKind, open: usize, close: &[u8]) -> Token {
        self.scanner.advance(open);
        let body_start = self.scanner.position();
        let (body_end, end, terminated) = match self.scanner.find_seq(close) {
            Some(at) => (at, at + close.len(), true),
            None => (self.scanner.len(), self.scanner.len(), false),
        };
        self.scanner.set_position(end);
        Token::wrapped(kind, Span::new(start, end), Span::new(body_start, body_end), terminated)
    }

    fn scan_processing_instruction(&mut self, start: usize) -> Token {
        self.scanner.advance(2);
        let body_start = self.scanner.position();
        let (body_end, end, terminated) = match self.scanner.find_seq(b"?>") {
            Some(at) => (at, at + 2, true),
            // HTML treats "<?...>" as a bogus comment closed by the first '>'
            None => match self.scanner.find_byte(b'>') {
                Some(gt) => (gt, gt + 1, true),
                None => (self.scanner.len(), self.scanner.len(), false),
            },
        };
        self.scanner.set_position(end);
        Token::wrapped(
            TokenKind::ProcessingInstruction,
            Span::new(start, end),
            Span::new(body_start, body_end),
            terminated,
        )
    }

    fn scan_end_tag(&mut self, start: usize) -> Token {
        self.scanner.advance(2);
        let (name_start, name_end) = self.scanner.read_name();
        let (end, terminated) = match self.scanner.find_byte(b'>') {
            Some(gt) => (gt + 1, true),
            None => (self.scanner.len(), false),
        };
        self.scanner.set_position(end);
        Token {
            kind: TokenKind::EndTag,
            span: Span::new(start, end),
            name: Span::new(name_start, name_end),
            body: Span::empty(name_end),
            terminated,
        }
    }

    fn scan_start_tag(&mut self, start: usize) -> Token {
        self.scanner.advance(1);
        let (name_start, name_end) = self.scanner.read_name();
        let bytes = self.input.as_bytes();

        let (end, attrs_end, self_closing, terminated) = match self.scanner.find_start_tag_end() {
            Some(gt) => {
                let self_closing = gt > name_end && bytes[gt - 1] == b'/';
                let attrs_end = if self_closing { gt - 1 } else { gt };
                (gt + 1, attrs_end, self_closing, true)
            }
            None => (bytes.len(), bytes.len(), false, false),
        };
        self.scanner.set_position(end);

        let name = Span::new(name_start, name_end);
        let kind = if self_closing {
            TokenKind::EmptyTag
        } else {
            TokenKind::StartTag
        };
        if kind == TokenKind::StartTag && terminated && self.raw_text_elements {
            let name_str = name.as_str(self.input);
            self.raw_text = RAW_TEXT_ELEMENTS
                .iter()
                .copied()
                .find(|element| element.eq_ignore_ascii_case(name_str));
        }

        Token {
            kind,
            span: Span::new(start, end),
            name,
            body: Span::new(name_end, attrs_end.max(name_end)),
            terminated,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn kinds(input: &str) -> Vec<(TokenKind, String)> {
        let mut tokenizer = Tokenizer::new(input);
        let mut out = Vec::new();
        while let Some(token) = tokenizer.next_token() {
            out.push((token.kind, token.span.as_str(input).to_string()));
        }
        out
    }

    #[test]
    fn test_simple_sequence() {
        assert_eq!(
            kinds("<p>Hi</p><!--c-->"),
            vec![
                (TokenKind::StartTag, "<p>".to_string()),
                (TokenKind::Text, "Hi".to_string()),
                (TokenKind::EndTag, "</p>".to_string()),
                (TokenKind::Comment, "<!--c-->".to_string()),
            ]
        );
    }

    #[test]
    fn test_adjacent_tags_have_no_empty_text() {
        let tokens = kinds("<a><b/></a>");
        assert_eq!(tokens.len(), 3);
        assert_eq!(tokens[1].0, TokenKind::EmptyTag);
    }

    #[test]
    fn test_bodies() {
        let input = "<!--x--><?xml version=\"1.0\"?><!DOCTYPE html><![CDATA[a<b]]>";
        let mut tokenizer = Tokenizer::new(input);
        let bodies: Vec<_> = std::iter::from_fn(|| tokenizer.next_token())
            .map(|t| (t.kind, t.body.as_str(input)))
            .collect();
        assert_eq!(
            bodies,
            vec![
                (TokenKind::Comment, "x"),
                (TokenKind::ProcessingInstruction, "xml version=\"1.0\""),
                (TokenKind::Declaration, "DOCTYPE html"),
                (TokenKind::CData, "a<b"),
            ]
        );
    }

    #[test]
    fn test_start_tag_name_and_attrs() {
        let input = "<img src='a>b.png' alt=x/>";
        let token = Tokenizer::new(input).next_token().unwrap();
        assert_eq!(token.kind, TokenKind::EmptyTag);
        assert_eq!(token.name.as_str(input), "img");
        assert_eq!(token.body.as_str(input), " src='a>b.png' alt=x");
        assert_eq!(token.span.end, input.len());
    }

    #[test]
    fn test_unterminated_comment_takes_rest() {
        let input = "a<!-- open";
        let mut tokenizer = Tokenizer::new(input);
        tokenizer.next_token();
        let token = tokenizer.next_token().unwrap();
        assert_eq!(token.kind, TokenKind::Comment);
        assert!(!token.terminated);
        assert_eq!(token.body.as_str(input), " open");
        assert!(tokenizer.next_token().is_none());
    }

    #[test]
    fn test_stray_quotes_in_unquoted_values() {
        assert_eq!(
            kinds("<img alt=O'Brien src=x.png><p>next</p>"),
            vec![
                (TokenKind::StartTag, "<img alt=O'Brien src=x.png>".to_string()),
                (TokenKind::StartTag, "<p>".to_string()),
                (TokenKind::Text, "next".to_string()),
                (TokenKind::EndTag, "</p>".to_string()),
            ]
        );
        assert_eq!(kinds("<a title=x\"y>z").len(), 2);
    }

    #[test]
    fn test_unterminated_tag_takes_rest() {
        let input = "<a href=\"x";
        let token = Tokenizer::new(input).next_token().unwrap();
        assert_eq!(token.kind, TokenKind::StartTag);
        assert!(!token.terminated);
        assert_eq!(token.body.as_str(input), " href=\"x");
    }

    #[test]
    fn test_script_content_is_raw_text() {
        assert_eq!(
            kinds("<script>if (a<b) x='</p>';</script>"),
            vec![
                (TokenKind::StartTag, "<script>".to_string()),
                (TokenKind::Text, "if (a<b) x='</p>';".to_string()),
                (TokenKind::EndTag, "</script>".to_string()),
            ]
        );
    }

    #[test]
    fn test_raw_text_disabled() {
        let input = "<style>a<b>c</style>";
        let mut tokenizer = Tokenizer::new(input).with_raw_text_elements(false);
        let mut names = Vec::new();
        while let Some(token) = tokenizer.next_token() {
            names.push(token.kind);
        }
        assert_eq!(
            names,
            vec![
                TokenKind::StartTag,
                TokenKind::Text,
                TokenKind::StartTag,
                TokenKind::Text,
                TokenKind::EndTag,
            ]
        );
    }
}
