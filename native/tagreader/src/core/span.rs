//! Span - byte range into the reader's source buffer
//!
//! Nodes never copy text out of the buffer; they keep spans and slice
//! the source on demand.

/// A half-open byte range `[start, end)` into the source text.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct Span {
    /// Byte offset of the first byte
    pub start: usize,
    /// Byte offset one past the last byte
    pub end: usize,
}

impl Span {
    /// Create a new span
    #[inline]
    pub const fn new(start: usize, end: usize) -> Self {
        Self { start, end }
    }

    /// Create an empty span positioned at `at`
    #[inline]
    pub const fn empty(at: usize) -> Self {
        Self { start: at, end: at }
    }

    /// Length in bytes
    #[inline]
    pub const fn len(&self) -> usize {
        self.end.saturating_sub(self.start)
    }

    /// Check if this span is empty
    #[inline]
    pub const fn is_empty(&self) -> bool {
        self.end <= self.start
    }

    /// Extract the text this span covers.
    ///
    /// Spans are only ever cut at ASCII delimiters, so they always land on
    /// character boundaries; an out-of-range span yields an empty string.
    #[inline]
    pub fn as_str<'a>(&self, input: &'a str) -> &'a str {
        input.get(self.start..self.end).unwrap_or("")
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_as_str() {
        let span = Span::new(3, 7);
        assert_eq!(span.as_str("<p>Hello</p>"), "Hell");
        assert_eq!(span.len(), 4);
    }

    #[test]
    fn test_out_of_range_is_empty() {
        assert_eq!(Span::new(2, 40).as_str("abc"), "");
        assert!(Span::empty(5).is_empty());
    }
}
