//! Error types for document operations.

use thiserror::Error;

use crate::EmojiId;

/// Result type for document operations.
pub type ArtResult<T> = Result<T, ArtError>;

/// Errors that can occur while editing or loading a document.
///
/// Every variant aborts only the operation that produced it; the document
/// the operation was applied to is left unchanged.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum ArtError {
    /// The referenced emoji is not in the document.
    #[error("Emoji not found: {0}")]
    NotFound(EmojiId),

    /// The text is not a single emoji grapheme.
    #[error("Not a single emoji glyph: {0:?}")]
    InvalidGlyph(String),

    /// The requested size is not a positive glyph size.
    #[error("Invalid emoji size: {size}")]
    InvalidSize {
        /// The rejected size, before any conversion to model units.
        size: f64,
    },

    /// The scale factor would produce a non-positive or unrepresentable size.
    #[error("Scaling by {factor} produces an invalid size")]
    InvalidScale {
        /// The rejected factor.
        factor: f64,
    },

    /// Moving the emoji would take it past the `i32` coordinate range.
    #[error("Emoji {id} would move out of bounds")]
    OutOfBounds {
        /// The emoji that could not be moved.
        id: EmojiId,
    },

    /// The id counter has issued its last id.
    #[error("No emoji ids left to issue")]
    IdsExhausted,

    /// Persisted bytes could not be turned into a valid document.
    #[error("Corrupt document: {0}")]
    CorruptDocument(String),

    /// A viewport transform was asked to invert a zero zoom.
    #[error("Zoom scale is zero")]
    DivisionByZero,
}

impl From<serde_json::Error> for ArtError {
    fn from(err: serde_json::Error) -> Self {
        Self::CorruptDocument(err.to_string())
    }
}
