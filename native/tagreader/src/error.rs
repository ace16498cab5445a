//! Reader error types.

use thiserror::Error;

/// Errors raised by tag reader operations.
///
/// Plain scanning never fails; these come from operations with an explicit
/// target (searches, group extraction, dates) or a node-kind precondition.
#[derive(Debug, Error)]
pub enum ReaderError {
    /// A mandatory search reached the end of input without a match.
    #[error("{target} not found before end of input")]
    NotFound {
        /// Description of what was searched for.
        target: String,
    },

    /// A group tag has no matching closing tag.
    #[error("unbalanced markup: <{tag}> at offset {offset} is never closed")]
    UnbalancedMarkup {
        /// Name of the unclosed tag.
        tag: String,
        /// Byte offset of the opening tag.
        offset: usize,
    },

    /// No recognized date format at the cursor.
    #[error("no date at offset {offset}")]
    NoDateAtPosition {
        /// Byte offset where a date was expected.
        offset: usize,
    },

    /// The current node does not support the operation.
    #[error("invalid state: {0}")]
    InvalidState(String),

    /// A requested byte range is outside the buffer or splits a character.
    #[error("invalid range {start}..{end}")]
    InvalidRange {
        /// Range start.
        start: usize,
        /// Range end.
        end: usize,
    },

    /// Writing to an export sink failed.
    #[error("export failed: {0}")]
    Io(#[from] std::io::Error),
}

impl ReaderError {
    /// Creates a new not-found error.
    pub fn not_found(target: impl Into<String>) -> Self {
        Self::NotFound {
            target: target.into(),
        }
    }

    /// Creates a new invalid-state error.
    pub fn invalid_state(message: impl Into<String>) -> Self {
        Self::InvalidState(message.into())
    }

    /// Short machine-readable name of the error kind.
    pub fn kind(&self) -> &'static str {
        match self {
            Self::NotFound { .. } => "not_found",
            Self::UnbalancedMarkup { .. } => "unbalanced_markup",
            Self::NoDateAtPosition { .. } => "no_date_at_position",
            Self::InvalidState(_) => "invalid_state",
            Self::InvalidRange { .. } => "invalid_range",
            Self::Io(_) => "io",
        }
    }
}

/// Result alias for reader operations.
pub type Result<T> = std::result::Result<T, ReaderError>;
