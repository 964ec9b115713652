//! Serializable intents.
//!
//! Hosts that drive a document from scripts or over a wire describe each
//! intent as JSON:
//!
//! ```json
//! { "intent": "add_emoji", "glyph": "😀", "position": { "x": 0, "y": 0 }, "size": 40 }
//! { "intent": "move_emoji", "id": 1, "offset": { "dx": 10, "dy": -5 } }
//! { "intent": "undo" }
//! ```

use art_core::schema::BackgroundDocument;
use art_core::{EmojiId, Offset, Position};
use serde::{Deserialize, Serialize};

/// A single intent against a [`crate::DocumentController`].
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "intent", rename_all = "snake_case")]
pub enum Intent {
    /// Add an emoji.
    AddEmoji {
        /// The emoji text.
        glyph: String,
        /// Model-space position.
        position: Position,
        /// Nominal size.
        size: u32,
    },
    /// Move one emoji.
    MoveEmoji {
        /// Target emoji.
        id: EmojiId,
        /// Delta to add to its position.
        offset: Offset,
    },
    /// Move several emojis by the same delta.
    MoveEmojis {
        /// Target emojis.
        ids: Vec<EmojiId>,
        /// Delta to add to each position.
        offset: Offset,
    },
    /// Scale one emoji.
    ScaleEmoji {
        /// Target emoji.
        id: EmojiId,
        /// Multiplier for its size.
        factor: f64,
    },
    /// Scale several emojis by the same factor.
    ScaleEmojis {
        /// Target emojis.
        ids: Vec<EmojiId>,
        /// Multiplier for each size.
        factor: f64,
    },
    /// Remove one emoji.
    RemoveEmoji {
        /// Target emoji.
        id: EmojiId,
    },
    /// Replace the background.
    SetBackground {
        /// The new background, in its persisted form.
        background: BackgroundDocument,
    },
    /// Undo the last step.
    Undo,
    /// Redo the last undone step.
    Redo,
}

/// What applying an [`Intent`] did.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(tag = "outcome", content = "id", rename_all = "snake_case")]
pub enum IntentOutcome {
    /// A new emoji was added.
    Added(EmojiId),
    /// The document changed.
    Changed,
    /// Nothing changed (absent id removed, empty undo/redo stack).
    Unchanged,
}
