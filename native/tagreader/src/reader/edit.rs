//! Staged Attribute Edits and Canonical Export
//!
//! Edits never touch the source buffer. They are kept next to the current
//! node and only show up when the node is rendered; advancing discards them.

use std::borrow::Cow;
use std::io::Write;

use super::node::Node;
use super::TagReader;
use crate::core::attributes::{fold_name, names_match};
use crate::core::entities::{escape_attr_to_buf, mask_line_breaks};
use crate::error::{ReaderError, Result};

/// A staged change to one attribute. `None` removes it.
#[derive(Debug, Clone, PartialEq, Eq)]
struct AttrEdit {
    name: String,
    value: Option<String>,
}

/// Edits staged for the current tag, in the order they were made
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct PendingEdits {
    entries: Vec<AttrEdit>,
}

impl PendingEdits {
    fn stage(&mut self, name: &str, value: Option<String>, fold: bool) {
        match self.entries.iter_mut().find(|e| names_match(&e.name, name, fold)) {
            Some(entry) => entry.value = value,
            None => self.entries.push(AttrEdit {
                name: name.to_string(),
                value,
            }),
        }
    }

    fn lookup(&self, name: &str, fold: bool) -> Option<&AttrEdit> {
        self.entries.iter().find(|e| names_match(&e.name, name, fold))
    }

    pub fn clear(&mut self) {
        self.entries.clear();
    }
}

fn push_attr(buf: &mut String, name: &str, value: Option<&str>) {
    buf.push(' ');
    buf.push_str(name);
    if let Some(value) = value {
        buf.push_str("=\"");
        escape_attr_to_buf(value, buf);
        buf.push('"');
    }
}

impl TagReader {
    fn require_named_tag(&self, operation: &str) -> Result<()> {
        match self.cursor.node {
            Node::NamedTag { .. } => Ok(()),
            ref other => Err(ReaderError::invalid_state(format!(
                "{operation} needs a tag, cursor is on {}",
                other.kind().as_str()
            ))),
        }
    }

    /// Stage a replacement or new attribute for export
    pub fn set_attr(&mut self, name: &str, value: &str) -> Result<&mut Self> {
        self.require_named_tag("set_attr")?;
        let fold = self.options.force_lower_case;
        let name = fold_name(name, fold);
        self.cursor.edits.stage(&name, Some(value.to_string()), fold);
        Ok(self)
    }

    /// Stage removal of an attribute. Missing attributes are ignored.
    pub fn delete_opt_attr(&mut self, name: &str) -> Result<&mut Self> {
        self.require_named_tag("delete_opt_attr")?;
        let fold = self.options.force_lower_case;
        let name = fold_name(name, fold);
        self.cursor.edits.stage(&name, None, fold);
        Ok(self)
    }

    /// Render the current tag with staged edits applied.
    ///
    /// Original attributes keep their order, edited values replace them in
    /// place and new attributes follow. Values are always double-quoted.
    /// Closing tags render as `</name>`; other nodes have no tag string.
    pub fn tag_str(&self) -> Option<String> {
        let fold = self.options.force_lower_case;
        let edits = &self.cursor.edits;

        match &self.cursor.node {
            Node::NamedTag {
                name,
                attributes,
                is_group,
                ..
            } => {
                let mut buf = String::with_capacity(64);
                buf.push('<');
                buf.push_str(name.as_str(&self.source));

                for attr in attributes.iter(fold) {
                    match edits.lookup(&attr.name, fold) {
                        Some(AttrEdit { value: None, .. }) => {}
                        Some(AttrEdit { value: Some(v), .. }) => push_attr(&mut buf, &attr.name, Some(v.as_str())),
                        None => push_attr(&mut buf, &attr.name, attr.has_value.then_some(attr.value.as_str())),
                    }
                }
                for edit in &edits.entries {
                    if let Some(value) = &edit.value {
                        if attributes.get(&edit.name, fold).is_none() {
                            push_attr(&mut buf, &edit.name, Some(value.as_str()));
                        }
                    }
                }

                buf.push_str(if *is_group { ">" } else { "/>" });
                Some(buf)
            }
            Node::ClosingTag { name, .. } => Some(format!("</{}>", name.as_str(&self.source))),
            _ => None,
        }
    }

    /// [`tag_str`](Self::tag_str) for callers that require a tag
    pub fn get_tag_str(&self) -> Result<String> {
        self.tag_str().ok_or_else(|| {
            ReaderError::invalid_state(format!(
                "get_tag_str needs a tag, cursor is on {}",
                self.kind().as_str()
            ))
        })
    }

    /// Canonical form of the current node
    pub fn canonical(&self) -> Cow<'_, str> {
        if let Some(tag) = self.tag_str() {
            return Cow::Owned(tag);
        }
        match &self.cursor.node {
            Node::Comment { body, .. } => Cow::Owned(format!("<!--{}-->", body.as_str(&self.source))),
            Node::MiscText { body, delimiter, .. } => Cow::Owned(format!(
                "{}{}{}",
                delimiter.open(),
                body.as_str(&self.source),
                delimiter.close()
            )),
            Node::PlainText { span } if self.options.mask_line_breaks => mask_line_breaks(span.as_str(&self.source)),
            Node::PlainText { span } => Cow::Borrowed(span.as_str(&self.source)),
            _ => Cow::Borrowed(""),
        }
    }

    /// Write the canonical form of the current node to `out`
    pub fn export_tag<W: Write>(&self, out: &mut W) -> Result<()> {
        out.write_all(self.canonical().as_bytes())?;
        Ok(())
    }
}
