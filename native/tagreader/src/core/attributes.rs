//! Attribute Parsing
//!
//! Parses the attribute list of a tag into an ordered table. Parsing is
//! lenient: double-quoted, single-quoted and unquoted values are accepted,
//! bare names become valueless attributes, and junk characters are skipped.

use super::entities::decode_text;
use super::scanner::is_whitespace;
use std::borrow::Cow;

/// A parsed attribute
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Attribute {
    /// Attribute name as written in the source
    pub name: String,
    /// Attribute value (entities decoded); empty for bare attributes
    pub value: String,
    /// False for a bare attribute such as `<input checked>`
    pub has_value: bool,
}

impl Attribute {
    /// Create an attribute with a value
    pub fn new(name: impl Into<String>, value: impl Into<String>) -> Self {
        Attribute {
            name: name.into(),
            value: value.into(),
            has_value: true,
        }
    }

    /// Create a bare attribute
    pub fn bare(name: impl Into<String>) -> Self {
        Attribute {
            name: name.into(),
            value: String::new(),
            has_value: false,
        }
    }

    /// Interpret the attribute as a flag.
    ///
    /// Bare attributes are set. Integer values are set iff non-zero; any other
    /// non-empty value is set; an explicitly empty value is not.
    pub fn as_bool(&self) -> bool {
        if !self.has_value {
            return true;
        }
        let value = self.value.trim();
        match value.parse::<i64>() {
            Ok(n) => n != 0,
            Err(_) => !value.is_empty(),
        }
    }
}

/// Normalize a tag or attribute name for comparison
#[inline]
pub fn fold_name(name: &str, fold: bool) -> Cow<'_, str> {
    if fold && name.chars().any(char::is_uppercase) {
        Cow::Owned(name.to_lowercase())
    } else {
        Cow::Borrowed(name)
    }
}

/// Compare two names under the case-folding rule
#[inline]
pub fn names_match(a: &str, b: &str, fold: bool) -> bool {
    if fold {
        a == b || fold_name(a, true) == fold_name(b, true)
    } else {
        a == b
    }
}

/// Ordered attribute table of one tag
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct AttributeTable {
    attrs: Vec<Attribute>,
}

impl AttributeTable {
    /// Parse attributes from raw tag content (after the element name).
    ///
    /// Exact duplicate names keep the first occurrence. Names differing only
    /// in case are all kept, so the table stays valid when the folding mode
    /// changes; `get` and `iter` apply first-wins under the mode they are
    /// given.
    pub fn parse(input: &str) -> Self {
        let mut table = AttributeTable::default();
        for attr in parse_attributes(input) {
            if table.get(&attr.name, false).is_none() {
                table.attrs.push(attr);
            }
        }
        table
    }

    /// Look up an attribute by name; the first match wins
    pub fn get(&self, name: &str, fold: bool) -> Option<&Attribute> {
        self.attrs.iter().find(|a| names_match(&a.name, name, fold))
    }

    /// Attributes in source order, skipping names that repeat an earlier one
    /// under the folding rule
    pub fn iter(&self, fold: bool) -> impl Iterator<Item = &Attribute> + '_ {
        self.attrs
            .iter()
            .enumerate()
            .filter(move |&(i, attr)| {
                !self.attrs[..i]
                    .iter()
                    .any(|prev| names_match(&prev.name, &attr.name, fold))
            })
            .map(|(_, attr)| attr)
    }
}

/// Parse attributes from raw tag content, keeping every occurrence
pub fn parse_attributes(input: &str) -> Vec<Attribute> {
    let bytes = input.as_bytes();
    let mut attrs = Vec::new();
    let mut pos = 0;

    while pos < bytes.len() {
        // Skip whitespace
        while pos < bytes.len() && is_whitespace(bytes[pos]) {
            pos += 1;
        }

        if pos >= bytes.len() {
            break;
        }

        // Stray '/', '=', quotes between attributes are noise
        if matches!(bytes[pos], b'/' | b'=' | b'"' | b'\'' | b'>') {
            pos += 1;
            continue;
        }

        // Parse attribute name
        let name_start = pos;
        while pos < bytes.len() && is_name_char(bytes[pos]) {
            pos += 1;
        }
        let name = &input[name_start..pos];

        // Skip whitespace around '='
        let mut look = pos;
        while look < bytes.len() && is_whitespace(bytes[look]) {
            look += 1;
        }

        if look >= bytes.len() || bytes[look] != b'=' {
            // Attribute without value (like HTML boolean attributes)
            attrs.push(Attribute::bare(name));
            continue;
        }

        pos = look + 1; // Skip '='

        while pos < bytes.len() && is_whitespace(bytes[pos]) {
            pos += 1;
        }

        if pos >= bytes.len() {
            attrs.push(Attribute::new(name, ""));
            break;
        }

        let quote = bytes[pos];
        if quote != b'"' && quote != b'\'' {
            // Unquoted value ends at whitespace or '>'
            let value_start = pos;
            while pos < bytes.len() && !is_whitespace(bytes[pos]) && bytes[pos] != b'>' {
                pos += 1;
            }
            attrs.push(Attribute::new(name, decode_text(&input[value_start..pos])));
            continue;
        }

        pos += 1; // Skip opening quote
        let value_start = pos;
        while pos < bytes.len() && bytes[pos] != quote {
            pos += 1;
        }
        // A missing closing quote takes the rest of the tag
        attrs.push(Attribute::new(name, decode_text(&input[value_start..pos])));

        if pos < bytes.len() {
            pos += 1; // Skip closing quote
        }
    }

    attrs
}

/// Check if byte may appear in a lenient attribute name
#[inline]
fn is_name_char(b: u8) -> bool {
    !is_whitespace(b) && !matches!(b, b'=' | b'>' | b'/' | b'"' | b'\'')
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_simple_attributes() {
        let attrs = parse_attributes(" id=\"test\" class=\"foo\"");
        assert_eq!(attrs.len(), 2);
        assert_eq!(attrs[0], Attribute::new("id", "test"));
        assert_eq!(attrs[1], Attribute::new("class", "foo"));
    }

    #[test]
    fn test_quoting_styles() {
        let attrs = parse_attributes(" a='single' b=unquoted c = \"spaced\"");
        assert_eq!(attrs[0].value, "single");
        assert_eq!(attrs[1].value, "unquoted");
        assert_eq!(attrs[2].value, "spaced");
    }

    #[test]
    fn test_bare_attribute() {
        let attrs = parse_attributes(" checked disabled=\"0\"");
        assert_eq!(attrs[0], Attribute::bare("checked"));
        assert!(attrs[0].as_bool());
        assert!(!attrs[1].as_bool());
    }

    #[test]
    fn test_entity_in_value() {
        let attrs = parse_attributes(" title=\"&lt;hello&gt;\"");
        assert_eq!(attrs[0].value, "<hello>");
    }

    #[test]
    fn test_unterminated_quote_takes_rest() {
        let attrs = parse_attributes(" href=\"x y");
        assert_eq!(attrs, vec![Attribute::new("href", "x y")]);
    }

    #[test]
    fn test_duplicates_keep_first() {
        let table = AttributeTable::parse(" id=a ID=b id=c");
        let value = |name, fold| table.get(name, fold).map(|a| a.value.as_str());

        assert_eq!(table.iter(true).count(), 1);
        assert_eq!(value("id", true), Some("a"));
        assert_eq!(value("ID", true), Some("a"));

        assert_eq!(table.iter(false).count(), 2);
        assert_eq!(value("id", false), Some("a"));
        assert_eq!(value("ID", false), Some("b"));
    }

    #[test]
    fn test_bool_values() {
        assert!(Attribute::new("x", "1").as_bool());
        assert!(Attribute::new("x", "-3").as_bool());
        assert!(Attribute::new("x", "checked").as_bool());
        assert!(!Attribute::new("x", "0").as_bool());
        assert!(!Attribute::new("x", "").as_bool());
    }

    #[test]
    fn test_fold_name() {
        assert_eq!(fold_name("DIV", true), "div");
        assert_eq!(fold_name("DIV", false), "DIV");
        assert!(names_match("Class", "class", true));
        assert!(!names_match("Class", "class", false));
    }
}
