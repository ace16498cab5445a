//! Node Types
//!
//! The node the cursor currently points at, as a closed set of variants.
//! Nodes hold spans into the reader's buffer, never copies of its text.

use crate::core::attributes::AttributeTable;
use crate::core::span::Span;
use crate::core::tokenizer::{Token, TokenKind};

/// Delimiters wrapping a misc-text node
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MiscDelimiter {
    /// `<!...>`
    Declaration,
    /// `<?...?>`
    ProcessingInstruction,
    /// `<![CDATA[...]]>`
    CData,
}

impl MiscDelimiter {
    /// Opening delimiter
    pub fn open(self) -> &'static str {
        match self {
            MiscDelimiter::Declaration => "<!",
            MiscDelimiter::ProcessingInstruction => "<?",
            MiscDelimiter::CData => "<![CDATA[",
        }
    }

    /// Closing delimiter
    pub fn close(self) -> &'static str {
        match self {
            MiscDelimiter::Declaration => ">",
            MiscDelimiter::ProcessingInstruction => "?>",
            MiscDelimiter::CData => "]]>",
        }
    }
}

/// Classification of the current node
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NodeKind {
    BeforeStart,
    NamedTag,
    ClosingTag,
    Comment,
    MiscText,
    PlainText,
}

impl NodeKind {
    /// Snake-case name, used for host atoms
    pub fn as_str(self) -> &'static str {
        match self {
            NodeKind::BeforeStart => "before_start",
            NodeKind::NamedTag => "named_tag",
            NodeKind::ClosingTag => "closing_tag",
            NodeKind::Comment => "comment",
            NodeKind::MiscText => "misc_text",
            NodeKind::PlainText => "plain_text",
        }
    }
}

/// The node under the cursor
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Node {
    /// No node consumed yet; the next read starts at `at`
    BeforeStart { at: usize },
    /// Opening or self-closed element
    NamedTag {
        span: Span,
        name: Span,
        attributes: AttributeTable,
        is_group: bool,
    },
    /// `</name>`
    ClosingTag { span: Span, name: Span },
    /// `<!--body-->`
    Comment { span: Span, body: Span },
    /// Declarations, processing instructions and CDATA
    MiscText {
        span: Span,
        body: Span,
        delimiter: MiscDelimiter,
    },
    /// Character data between markup
    PlainText { span: Span },
}

impl Node {
    /// Build a node from a scanned token
    pub fn from_token(source: &str, token: &Token) -> Self {
        match token.kind {
            TokenKind::StartTag | TokenKind::EmptyTag => Node::NamedTag {
                span: token.span,
                name: token.name,
                attributes: AttributeTable::parse(token.body.as_str(source)),
                is_group: token.kind == TokenKind::StartTag,
            },
            TokenKind::EndTag => Node::ClosingTag {
                span: token.span,
                name: token.name,
            },
            TokenKind::Comment => Node::Comment {
                span: token.span,
                body: token.body,
            },
            TokenKind::Declaration => Node::misc(token, MiscDelimiter::Declaration),
            TokenKind::ProcessingInstruction => Node::misc(token, MiscDelimiter::ProcessingInstruction),
            TokenKind::CData => Node::misc(token, MiscDelimiter::CData),
            TokenKind::Text => Node::PlainText { span: token.span },
        }
    }

    fn misc(token: &Token, delimiter: MiscDelimiter) -> Self {
        Node::MiscText {
            span: token.span,
            body: token.body,
            delimiter,
        }
    }

    /// Classification of this node
    pub fn kind(&self) -> NodeKind {
        match self {
            Node::BeforeStart { .. } => NodeKind::BeforeStart,
            Node::NamedTag { .. } => NodeKind::NamedTag,
            Node::ClosingTag { .. } => NodeKind::ClosingTag,
            Node::Comment { .. } => NodeKind::Comment,
            Node::MiscText { .. } => NodeKind::MiscText,
            Node::PlainText { .. } => NodeKind::PlainText,
        }
    }

    /// Raw span including delimiters; empty for `BeforeStart`
    pub fn span(&self) -> Span {
        match self {
            Node::BeforeStart { at } => Span::empty(*at),
            Node::NamedTag { span, .. }
            | Node::ClosingTag { span, .. }
            | Node::Comment { span, .. }
            | Node::MiscText { span, .. }
            | Node::PlainText { span } => *span,
        }
    }

    /// Name span of opening, self-closed and closing tags
    pub fn name_span(&self) -> Option<Span> {
        match self {
            Node::NamedTag { name, .. } | Node::ClosingTag { name, .. } => Some(*name),
            _ => None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::tokenizer::Tokenizer;

    fn first_node(input: &str) -> Node {
        let token = Tokenizer::new(input).next_token().unwrap();
        Node::from_token(input, &token)
    }

    #[test]
    fn test_named_tag_group_flag() {
        assert!(matches!(first_node("<p class=x>"), Node::NamedTag { is_group: true, .. }));
        assert!(matches!(first_node("<br/>"), Node::NamedTag { is_group: false, .. }));
    }

    #[test]
    fn test_misc_delimiters() {
        let node = first_node("<?xml version=\"1.0\"?>");
        assert_eq!(node.kind(), NodeKind::MiscText);
        assert!(matches!(
            node,
            Node::MiscText {
                delimiter: MiscDelimiter::ProcessingInstruction,
                ..
            }
        ));
        assert_eq!(MiscDelimiter::CData.open(), "<![CDATA[");
    }

    #[test]
    fn test_before_start_span() {
        let node = Node::BeforeStart { at: 7 };
        assert_eq!(node.span(), Span::empty(7));
        assert_eq!(node.name_span(), None);
    }
}
