//! Reader configuration

/// Behaviour switches of a [`TagReader`](crate::reader::TagReader).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ReaderOptions {
    /// Fold tag and attribute names to lower case for reporting and matching
    pub force_lower_case: bool,
    /// Escape line breaks in exported text as `&#13;`/`&#10;`
    pub mask_line_breaks: bool,
    /// Read `<script>`/`<style>` content as a single text node
    pub raw_text_elements: bool,
}

impl Default for ReaderOptions {
    fn default() -> Self {
        ReaderOptions {
            force_lower_case: true,
            mask_line_breaks: true,
            raw_text_elements: true,
        }
    }
}

impl ReaderOptions {
    /// Apply a named boolean switch. Returns false for unknown names.
    pub fn set(&mut self, name: &str, value: bool) -> bool {
        match name {
            "force_lower_case" => self.force_lower_case = value,
            "mask_line_breaks" => self.mask_line_breaks = value,
            "raw_text_elements" => self.raw_text_elements = value,
            _ => return false,
        }
        true
    }
}
