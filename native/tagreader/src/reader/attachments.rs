//! Compound Attachments
//!
//! Named blobs collected while walking a document and exported together
//! afterwards. The registry keeps registration order; re-registering a file
//! name replaces the content in place.
//!
//! Export format, per entry:
//!
//! | Field | Encoding |
//! |---|---|
//! | path length | `u32` little endian |
//! | path | UTF-8 bytes |
//! | content length | `u64` little endian |
//! | content | UTF-8 bytes |

use std::io::{self, Write};

/// One registered attachment
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CompoundAttachment {
    pub relative_path: String,
    pub content: String,
}

/// Ordered, last-write-wins attachment registry
#[derive(Debug, Clone, Default)]
pub struct AttachmentRegistry {
    entries: Vec<CompoundAttachment>,
}

impl AttachmentRegistry {
    /// Register `content` under `relative_path` and return the stored path
    pub fn register(&mut self, relative_path: &str, content: &str) -> &str {
        let existing = self.entries.iter().position(|e| e.relative_path == relative_path);
        let index = match existing {
            Some(index) => {
                self.entries[index].content = content.to_string();
                index
            }
            None => {
                self.entries.push(CompoundAttachment {
                    relative_path: relative_path.to_string(),
                    content: content.to_string(),
                });
                self.entries.len() - 1
            }
        };
        &self.entries[index].relative_path
    }

    pub fn iter(&self) -> std::slice::Iter<'_, CompoundAttachment> {
        self.entries.iter()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn clear(&mut self) {
        self.entries.clear();
    }

    /// Write every attachment to `out` in registration order
    pub fn export<W: Write>(&self, out: &mut W) -> io::Result<()> {
        for entry in &self.entries {
            let path_len = u32::try_from(entry.relative_path.len())
                .map_err(|_| io::Error::new(io::ErrorKind::InvalidInput, "attachment path too long"))?;
            out.write_all(&path_len.to_le_bytes())?;
            out.write_all(entry.relative_path.as_bytes())?;
            out.write_all(&(entry.content.len() as u64).to_le_bytes())?;
            out.write_all(entry.content.as_bytes())?;
        }
        out.flush()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::reader::TagReader;
    use pretty_assertions::assert_eq;

    #[test]
    fn test_last_write_wins_keeps_position() {
        let mut registry = AttachmentRegistry::default();
        assert_eq!(registry.register("a.css", "one"), "a.css");
        registry.register("b.png", "two");
        registry.register("a.css", "three");

        let entries: Vec<_> = registry
            .iter()
            .map(|e| (e.relative_path.as_str(), e.content.as_str()))
            .collect();
        assert_eq!(entries, vec![("a.css", "three"), ("b.png", "two")]);
    }

    #[test]
    fn test_export_layout() {
        let mut registry = AttachmentRegistry::default();
        registry.register("x", "hello");
        let mut out = Vec::new();
        registry.export(&mut out).unwrap();

        let mut expected = vec![1, 0, 0, 0, b'x'];
        expected.extend_from_slice(&[5, 0, 0, 0, 0, 0, 0, 0]);
        expected.extend_from_slice(b"hello");
        assert_eq!(out, expected);
    }

    #[test]
    fn test_export_empty_registry_writes_nothing() {
        let mut out = Vec::new();
        AttachmentRegistry::default().export(&mut out).unwrap();
        assert!(out.is_empty());
    }

    #[test]
    fn test_reader_export_compound_attc() {
        let mut reader = TagReader::new("<img src=a.png>");
        assert_eq!(reader.register_compound_attc("img/a.png", "PNG"), "img/a.png");
        let mut out = Vec::new();
        reader.export_compound_attc(&mut out).unwrap();
        assert_eq!(out.len(), 4 + 9 + 8 + 3);
        assert_eq!(reader.attachments().iter().count(), 1);
    }
}
