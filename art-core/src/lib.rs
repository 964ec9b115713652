//! # Emoji Art Core
//!
//! The value types behind an emoji art canvas: a background descriptor plus
//! an ordered collection of positioned, sized emoji glyphs.
//!
//! ## Architecture
//!
//! ```text
//! ┌─────────────────────────────────────────────┐
//! │                  art-core                   │
//! ├─────────────────────────────────────────────┤
//! │  Document        │  Geometry                │
//! │  - Background    │  - Model <-> viewport    │
//! │  - Emojis        │  - Zoom to fit           │
//! ├─────────────────────────────────────────────┤
//! │  History         │  Schema                  │
//! │  - Snapshots     │  - Versioned JSON        │
//! │  - Undo / redo   │  - Base64 image data     │
//! └─────────────────────────────────────────────┘
//! ```
//!
//! Nothing in this crate performs I/O. Fetching background images and
//! wiring history to a live document lives in `art-document`.

#![forbid(unsafe_code)]
#![deny(missing_docs)]
#![deny(clippy::all)]
#![deny(clippy::pedantic)]
#![allow(clippy::module_name_repetitions)]

pub mod background;
pub mod document;
pub mod emoji;
pub mod error;
pub mod geometry;
pub mod history;
pub mod schema;

pub use background::{normalize_image_url, Background, FetchStatus};
pub use document::ArtDocument;
pub use emoji::{Emoji, EmojiId, Glyph, Offset, Position};
pub use error::{ArtError, ArtResult};
pub use geometry::{Point, Size, ViewTransform};
pub use history::{History, UndoRecord, DEFAULT_HISTORY_LIMIT};
pub use schema::{deserialize, serialize, ArtFile};

/// Re-exported so callers can build [`Background::RemoteUrl`] values.
pub use url::Url;

/// Core crate version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
