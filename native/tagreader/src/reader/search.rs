//! Forward Searches and Group Extraction
//!
//! Bounded operations built on top of single-node advancing. Unlike plain
//! scanning these have an explicit target, so running out of input is an
//! error. Every failing call leaves the cursor where it was.

use tracing::debug;

use super::node::Node;
use super::TagReader;
use crate::core::attributes::{fold_name, names_match, parse_attributes, Attribute, AttributeTable};
use crate::error::{ReaderError, Result};

/// Outcome of a forward scan
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Search {
    Found,
    NotFound,
}

impl Search {
    /// Map a missed optional search to `false` and a missed mandatory one
    /// to an error
    fn into_result(self, target: &str, optional: bool) -> Result<bool> {
        match self {
            Search::Found => Ok(true),
            Search::NotFound if optional => Ok(false),
            Search::NotFound => Err(ReaderError::not_found(format!("tag <{target}>"))),
        }
    }
}

/// Attribute filter for tag searches.
///
/// Parsed with the tag attribute parser: `name=value` requires an exact
/// value, a bare `name` requires presence. All conditions must hold.
#[derive(Debug, Clone, Default)]
pub struct AttrMask {
    conditions: Vec<Attribute>,
}

impl AttrMask {
    pub fn parse(mask: &str) -> Self {
        AttrMask {
            conditions: parse_attributes(mask),
        }
    }

    pub fn is_empty(&self) -> bool {
        self.conditions.is_empty()
    }

    pub fn matches(&self, table: &AttributeTable, fold: bool) -> bool {
        self.conditions.iter().all(|cond| match table.get(&cond.name, fold) {
            Some(attr) => !cond.has_value || attr.value == cond.value,
            None => false,
        })
    }
}

impl TagReader {
    /// Check whether the current node is a named tag called `name`
    fn on_named_tag(&self, name: &str, mask: Option<&AttrMask>) -> bool {
        let fold = self.options.force_lower_case;
        match &self.cursor.node {
            Node::NamedTag {
                name: tag,
                attributes,
                ..
            } => {
                (name.is_empty() || names_match(tag.as_str(&self.source), name, fold))
                    && mask.is_none_or(|m| m.matches(attributes, fold))
            }
            _ => false,
        }
    }

    /// Advance until a named tag matches. On a miss the cursor is restored.
    fn scan_to_tag(&mut self, name: &str, mask: Option<&AttrMask>) -> Search {
        let saved = self.snapshot();
        while self.step() {
            if self.on_named_tag(name, mask) {
                return Search::Found;
            }
        }
        self.restore(saved);
        debug!(tag = name, "tag not found");
        Search::NotFound
    }

    /// Return the raw markup of the current element through its matching
    /// closer, leaving the cursor on the closer.
    ///
    /// A self-closed tag returns just itself. Nesting is tracked by name
    /// only; self-closed tags of the same name do not change depth.
    pub fn read_html_group(&mut self) -> Result<&str> {
        let (open, name, is_group) = match self.cursor.node {
            Node::NamedTag {
                span,
                name,
                is_group,
                ..
            } => (span, name, is_group),
            ref other => {
                return Err(ReaderError::invalid_state(format!(
                    "read_html_group needs an opening tag, cursor is on {}",
                    other.kind().as_str()
                )))
            }
        };
        if !is_group {
            return Ok(open.as_str(&self.source));
        }

        let fold = self.options.force_lower_case;
        let name = fold_name(name.as_str(&self.source), fold).into_owned();
        let saved = self.snapshot();
        let mut depth = 1usize;

        let close_end = loop {
            if !self.step() {
                self.restore(saved);
                debug!(tag = %name, offset = open.start, "unbalanced group");
                return Err(ReaderError::UnbalancedMarkup {
                    tag: name,
                    offset: open.start,
                });
            }
            match &self.cursor.node {
                Node::NamedTag {
                    name: tag,
                    is_group: true,
                    ..
                } if names_match(tag.as_str(&self.source), &name, fold) => depth += 1,
                Node::ClosingTag { span, name: tag } if names_match(tag.as_str(&self.source), &name, fold) => {
                    depth -= 1;
                    if depth == 0 {
                        break span.end;
                    }
                }
                _ => {}
            }
        };

        Ok(&self.source[open.start..close_end])
    }

    /// Return the raw source from the end of the current node up to the
    /// next `<name>` tag. The reader is left just before that tag.
    pub fn read_html_until_tag(&mut self, name: &str) -> Result<&str> {
        let from = self.cursor.next;
        match self.scan_to_tag(name, None) {
            Search::Found => {
                let to = self.cursor.node.span().start;
                self.park(to);
                Ok(&self.source[from..to])
            }
            Search::NotFound => Err(ReaderError::not_found(format!("tag <{name}>"))),
        }
    }

    /// Concatenate the decoded text of every text node before the next
    /// `<name>` tag, dropping markup. The reader is left just before that tag.
    pub fn read_text_until_tag(&mut self, name: &str) -> Result<String> {
        let saved = self.snapshot();
        let mut text = String::new();
        while self.step() {
            if self.on_named_tag(name, None) {
                let to = self.cursor.node.span().start;
                self.park(to);
                return Ok(text);
            }
            if let Some(chunk) = self.plain_text() {
                text.push_str(&chunk);
            }
        }
        self.restore(saved);
        debug!(tag = name, "tag not found");
        Err(ReaderError::not_found(format!("tag <{name}>")))
    }

    /// Advance to the next text node containing `text`; `TagPos` moves to
    /// the end of that node
    pub fn skip_to_plain_text(&mut self, text: &str) -> Result<&mut Self> {
        let saved = self.snapshot();
        while self.step() {
            if self.plain_text().is_some_and(|t| t.contains(text)) {
                self.cursor.text_offset = self.cursor.node.span().len();
                return Ok(self);
            }
        }
        self.restore(saved);
        debug!(text, "text not found");
        Err(ReaderError::not_found(format!("text {text:?}")))
    }

    /// Find the next `<name>` tag matching `mask` and stop just before it,
    /// so that the following `read_next` produces it. An empty name matches
    /// any tag.
    ///
    /// A miss returns `Ok(false)` when `optional`, otherwise `NotFound`.
    pub fn skip_to_tag(&mut self, name: &str, mask: Option<&str>, optional: bool) -> Result<bool> {
        let mask = mask.map(AttrMask::parse).filter(|m| !m.is_empty());
        let search = self.scan_to_tag(name, mask.as_ref());
        if search == Search::Found {
            let at = self.cursor.node.span().start;
            self.park(at);
        }
        search.into_result(name, optional)
    }

    /// Like [`skip_to_tag`](Self::skip_to_tag) but leaves the cursor on the
    /// found tag
    pub fn skip_to_tag_inc(&mut self, name: &str, mask: Option<&str>, optional: bool) -> Result<bool> {
        let mask = mask.map(AttrMask::parse).filter(|m| !m.is_empty());
        self.scan_to_tag(name, mask.as_ref()).into_result(name, optional)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::reader::NodeKind;
    use pretty_assertions::assert_eq;
    use rstest::rstest;

    fn on_first_tag(input: &str) -> TagReader {
        let mut reader = TagReader::new(input);
        reader.read_next();
        reader
    }

    #[rstest]
    #[case("<a>x</a>tail", "<a>x</a>")]
    #[case("<a><b><a>in</a></b><a/></a>", "<a><b><a>in</a></b><a/></a>")]
    #[case("<div id=1><div>a</div><p>b</p></div><div>c</div>", "<div id=1><div>a</div><p>b</p></div>")]
    #[case("<A>mixed</a>", "<A>mixed</a>")]
    #[case("<br/>rest", "<br/>")]
    fn test_read_html_group(#[case] input: &str, #[case] expected: &str) {
        let mut reader = on_first_tag(input);
        assert_eq!(reader.read_html_group().unwrap(), expected);
    }

    #[test]
    fn test_read_html_group_leaves_cursor_on_closer() {
        let mut reader = on_first_tag("<ul><li>1</li></ul><p>");
        reader.read_html_group().unwrap();
        assert!(reader.is_closing_tag());
        assert_eq!(reader.tag_name(), "ul");
        reader.read_next();
        assert_eq!(reader.tag_name(), "p");
    }

    #[test]
    fn test_read_html_group_unbalanced_restores() {
        let mut reader = on_first_tag("<a><a></a>");
        let err = reader.read_html_group().unwrap_err();
        assert!(matches!(err, ReaderError::UnbalancedMarkup { offset: 0, .. }));
        assert_eq!(reader.tag_pos(), 0);
        assert_eq!(reader.kind(), NodeKind::NamedTag);
    }

    #[test]
    fn test_read_html_group_requires_tag() {
        let mut reader = TagReader::new("text<a></a>");
        assert!(matches!(reader.read_html_group(), Err(ReaderError::InvalidState(_))));
        reader.read_next();
        assert!(matches!(reader.read_html_group(), Err(ReaderError::InvalidState(_))));
    }

    #[test]
    fn test_read_html_until_tag() {
        let mut reader = on_first_tag("<h1>T</h1><p>one <b>two</b></p><table>");
        assert_eq!(reader.read_html_until_tag("TABLE").unwrap(), "T</h1><p>one <b>two</b></p>");
        assert_eq!(reader.kind(), NodeKind::BeforeStart);
        reader.read_next();
        assert_eq!(reader.tag_name(), "table");
    }

    #[test]
    fn test_read_text_until_tag() {
        let mut reader = on_first_tag("<h1>T</h1><p>one &amp; <b>two</b></p><table>");
        assert_eq!(reader.read_text_until_tag("table").unwrap(), "Tone & two");
        reader.read_next();
        assert_eq!(reader.tag_name(), "table");
    }

    #[test]
    fn test_until_tag_not_found_restores() {
        let mut reader = on_first_tag("<p>a</p>");
        assert!(matches!(reader.read_html_until_tag("table"), Err(ReaderError::NotFound { .. })));
        assert!(matches!(reader.read_text_until_tag("table"), Err(ReaderError::NotFound { .. })));
        assert_eq!(reader.tag_name(), "p");
        assert_eq!(reader.tag_pos(), 0);
    }

    #[test]
    fn test_skip_to_plain_text() {
        let mut reader = TagReader::new("<p>alpha</p><p>beta gamma</p><p>delta</p>");
        reader.skip_to_plain_text("gamma").unwrap();
        assert_eq!(reader.raw_text(), Some("beta gamma"));
        assert_eq!(reader.tag_pos(), reader.node().span().end);
        assert_eq!(reader.tag_pos(), 25);
        reader.read_next();
        assert!(reader.is_closing_tag());

        assert!(matches!(reader.skip_to_plain_text("alpha"), Err(ReaderError::NotFound { .. })));
        assert!(reader.is_closing_tag());
    }

    #[test]
    fn test_skip_to_tag_parks_before_match() {
        let mut reader = TagReader::new("<div><span>x</span><row id=2></row></div>");
        assert_eq!(reader.skip_to_tag("row", None, false).unwrap(), true);
        assert_eq!(reader.kind(), NodeKind::BeforeStart);
        assert_eq!(reader.tag_pos(), 19);
        reader.read_next();
        assert_eq!(reader.tag_name(), "row");
        assert_eq!(reader.get_attr("id"), "2");
    }

    #[test]
    fn test_skip_to_tag_inc_consumes_match() {
        let mut reader = TagReader::new("<div><row id=1><row id=2>");
        assert!(reader.skip_to_tag_inc("row", Some("id=2"), false).unwrap());
        assert_eq!(reader.tag_name(), "row");
        assert_eq!(reader.get_attr("id"), "2");
    }

    #[test]
    fn test_skip_to_tag_missing_optional_and_mandatory() {
        let mut reader = on_first_tag("<table><tr><td>1</td></tr></table>");
        let before = reader.node().clone();

        assert_eq!(reader.skip_to_tag("row", Some(""), true).unwrap(), false);
        assert_eq!(reader.node(), &before);

        let err = reader.skip_to_tag("row", None, false).unwrap_err();
        assert!(matches!(err, ReaderError::NotFound { .. }));
        assert_eq!(reader.node(), &before);
    }

    #[rstest]
    #[case("class=item", true)]
    #[case("class=item data-x", true)]
    #[case("class=other", false)]
    #[case("hidden", false)]
    fn test_attr_mask(#[case] mask: &str, #[case] found: bool) {
        let mut reader = TagReader::new("<li class=\"item\" data-x=\"\">");
        assert_eq!(reader.skip_to_tag_inc("li", Some(mask), true).unwrap(), found);
    }

    #[test]
    fn test_empty_name_matches_any_tag() {
        let mut reader = TagReader::new("<a><b data-id=7><c>");
        assert!(reader.skip_to_tag_inc("", Some("data-id"), false).unwrap());
        assert_eq!(reader.tag_name(), "b");
    }
}
