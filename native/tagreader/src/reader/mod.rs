//! Sequential Tag Reader
//!
//! A cursor over an owned HTML/XML buffer that advances one node at a time.
//! Text between markup is an unnamed node; comments, declarations and
//! processing instructions are unnamed nodes too.
//!
//! - Node model: see [`node`]
//! - Searches and balanced-group extraction: see [`search`]
//! - Attribute edits and canonical export: see [`edit`]
//! - Compound attachments: see [`attachments`]

pub mod attachments;
pub mod edit;
pub mod node;
pub mod search;

use std::borrow::Cow;

use memchr::memchr_iter;
use tracing::{debug, trace};

use crate::config::ReaderOptions;
use crate::core::attributes::{fold_name, AttributeTable};
use crate::core::date::{parse_date_prefix, DateTime};
use crate::core::entities::decode_text;
use crate::core::tokenizer::Tokenizer;
use crate::error::{ReaderError, Result};

use attachments::AttachmentRegistry;
use edit::PendingEdits;
pub use node::{Node, NodeKind};

/// Everything that moves when the cursor moves. Cloned to restore the
/// cursor after a failed search.
#[derive(Debug, Clone)]
struct CursorState {
    node: Node,
    /// Offset where the next scan starts
    next: usize,
    /// Raw-text element whose content starts at `next`
    raw_text: Option<&'static str>,
    /// Bytes of the current text node already consumed by `read_date`
    text_offset: usize,
    edits: PendingEdits,
}

impl CursorState {
    fn at(pos: usize) -> Self {
        CursorState {
            node: Node::BeforeStart { at: pos },
            next: pos,
            raw_text: None,
            text_offset: 0,
            edits: PendingEdits::default(),
        }
    }
}

/// Sequential reader over HTML/XML markup
#[derive(Debug, Clone)]
pub struct TagReader {
    source: String,
    cursor: CursorState,
    options: ReaderOptions,
    attachments: AttachmentRegistry,
}

impl TagReader {
    /// Create a reader positioned before the first node
    pub fn new(data: impl Into<String>) -> Self {
        Self::with_options(data, ReaderOptions::default())
    }

    /// Create a reader with explicit options
    pub fn with_options(data: impl Into<String>, options: ReaderOptions) -> Self {
        TagReader {
            source: data.into(),
            cursor: CursorState::at(0),
            options,
            attachments: AttachmentRegistry::default(),
        }
    }

    /// Reset the reader onto fresh data. Position, staged edits and
    /// registered attachments are discarded; options are kept.
    pub fn init(&mut self, data: impl Into<String>) -> &mut Self {
        self.source = data.into();
        self.cursor = CursorState::at(0);
        self.attachments.clear();
        debug!(len = self.source.len(), "tag reader initialised");
        self
    }

    /// Case-fold mode (`ForceLowerCase`)
    pub fn force_lower_case(&self) -> bool {
        self.options.force_lower_case
    }

    /// Set the case-fold mode
    pub fn set_force_lower_case(&mut self, value: bool) -> &mut Self {
        self.options.force_lower_case = value;
        self
    }

    /// Set line-break masking for exported text
    pub fn set_mask_line_breaks(&mut self, value: bool) -> &mut Self {
        self.options.mask_line_breaks = value;
        self
    }

    // ========================================================================
    // Advancing
    // ========================================================================

    /// Advance to the next node. At end of input this is a no-op.
    pub fn read_next(&mut self) -> &mut Self {
        self.step();
        self
    }

    /// Advance one node; false when nothing is left to scan
    fn step(&mut self) -> bool {
        let mut tokenizer = Tokenizer::at(&self.source, self.cursor.next, self.cursor.raw_text)
            .with_raw_text_elements(self.options.raw_text_elements);
        let Some(token) = tokenizer.next_token() else {
            return false;
        };
        let raw_text = tokenizer.raw_text();

        trace!(
            kind = ?token.kind,
            start = token.span.start,
            end = token.span.end,
            terminated = token.terminated,
            "node"
        );
        self.cursor.node = Node::from_token(&self.source, &token);
        self.cursor.next = token.span.end;
        self.cursor.raw_text = raw_text;
        self.cursor.text_offset = 0;
        self.cursor.edits.clear();
        true
    }

    /// Leave the cursor just before the node starting at `at`
    fn park(&mut self, at: usize) {
        self.cursor = CursorState::at(at);
    }

    fn snapshot(&self) -> CursorState {
        self.cursor.clone()
    }

    fn restore(&mut self, state: CursorState) {
        self.cursor = state;
    }

    // ========================================================================
    // Node state
    // ========================================================================

    /// True once no further node can be scanned
    pub fn eof(&self) -> bool {
        self.cursor.next >= self.source.len()
    }

    /// The node under the cursor
    pub fn node(&self) -> &Node {
        &self.cursor.node
    }

    /// Classification of the current node
    pub fn kind(&self) -> NodeKind {
        self.cursor.node.kind()
    }

    /// Byte offset of the current position (`TagPos`)
    pub fn tag_pos(&self) -> usize {
        match self.cursor.node {
            Node::BeforeStart { at } => at,
            ref node => node.span().start + self.cursor.text_offset,
        }
    }

    /// Zero-based line of the current position (`CurLineIndex`)
    pub fn cur_line_index(&self) -> usize {
        let end = self.tag_pos().min(self.source.len());
        memchr_iter(b'\n', &self.source.as_bytes()[..end]).count()
    }

    /// Name of the current tag, folded per the case mode; empty for
    /// unnamed nodes
    pub fn tag_name(&self) -> Cow<'_, str> {
        match self.cursor.node.name_span() {
            Some(name) => fold_name(name.as_str(&self.source), self.options.force_lower_case),
            None => Cow::Borrowed(""),
        }
    }

    /// True iff the current node opens a balanced region
    pub fn is_group_tag(&self) -> bool {
        matches!(self.cursor.node, Node::NamedTag { is_group: true, .. })
    }

    /// True iff the current node is a closing tag
    pub fn is_closing_tag(&self) -> bool {
        matches!(self.cursor.node, Node::ClosingTag { .. })
    }

    fn attributes(&self) -> Option<&AttributeTable> {
        match &self.cursor.node {
            Node::NamedTag { attributes, .. } => Some(attributes),
            _ => None,
        }
    }

    /// Names of the current tag's attributes, in source order
    pub fn attr_names(&self) -> Vec<Cow<'_, str>> {
        self.attributes()
            .map(|table| {
                let fold = self.options.force_lower_case;
                table.iter(fold).map(|a| fold_name(&a.name, fold)).collect()
            })
            .unwrap_or_default()
    }

    /// Attribute value, or an empty string if absent
    pub fn get_attr(&self, name: &str) -> &str {
        self.attributes()
            .and_then(|table| table.get(name, self.options.force_lower_case))
            .map_or("", |a| a.value.as_str())
    }

    /// True iff the attribute is present and set (non-zero)
    pub fn get_bool_attr(&self, name: &str) -> bool {
        self.attributes()
            .and_then(|table| table.get(name, self.options.force_lower_case))
            .is_some_and(|a| a.as_bool())
    }

    /// Comment body, for comment nodes only
    pub fn comment(&self) -> Option<&str> {
        match &self.cursor.node {
            Node::Comment { body, .. } => Some(body.as_str(&self.source)),
            _ => None,
        }
    }

    /// Body of declarations, processing instructions and CDATA
    pub fn misc_text(&self) -> Option<&str> {
        match &self.cursor.node {
            Node::MiscText { body, .. } => Some(body.as_str(&self.source)),
            _ => None,
        }
    }

    /// Text of a text node with character references decoded
    pub fn plain_text(&self) -> Option<Cow<'_, str>> {
        self.raw_text().map(decode_text)
    }

    /// Text of a text node exactly as in the source
    pub fn raw_text(&self) -> Option<&str> {
        match &self.cursor.node {
            Node::PlainText { span } => Some(span.as_str(&self.source)),
            _ => None,
        }
    }

    /// Source fragment between two byte offsets (`GetRangePos`)
    pub fn get_range_pos(&self, start: usize, end: usize) -> Result<&str> {
        if start > end {
            return Err(ReaderError::InvalidRange { start, end });
        }
        self.source
            .get(start..end)
            .ok_or(ReaderError::InvalidRange { start, end })
    }

    // ========================================================================
    // Dates
    // ========================================================================

    /// Read a date at the current text position and move past it.
    ///
    /// When the cursor is not on a text node it first advances onto the
    /// next node, which must be text.
    pub fn read_date(&mut self) -> Result<DateTime> {
        let saved = self.snapshot();
        if self.kind() != NodeKind::PlainText {
            self.step();
        }

        let parsed = match &self.cursor.node {
            Node::PlainText { span } => {
                let text = span.as_str(&self.source);
                text.get(self.cursor.text_offset..).and_then(parse_date_prefix)
            }
            _ => None,
        };

        match parsed {
            Some((date, used)) => {
                self.cursor.text_offset += used;
                Ok(date)
            }
            None => {
                let offset = self.tag_pos();
                self.restore(saved);
                debug!(offset, "no date at position");
                Err(ReaderError::NoDateAtPosition { offset })
            }
        }
    }

    // ========================================================================
    // Attachments
    // ========================================================================

    /// Remember an attachment for later bulk export. Re-registering a file
    /// name replaces its content. Returns the file name.
    pub fn register_compound_attc(&mut self, file_name: &str, data: &str) -> String {
        self.attachments.register(file_name, data).to_string()
    }

    /// Write every registered attachment to `out`
    pub fn export_compound_attc<W: std::io::Write>(&self, out: &mut W) -> Result<&Self> {
        self.attachments.export(out)?;
        Ok(self)
    }

    /// Registered attachments
    pub fn attachments(&self) -> &AttachmentRegistry {
        &self.attachments
    }
}
