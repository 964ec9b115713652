//! # Emoji Art Document
//!
//! A live emoji art document: undoable intents over an
//! [`art_core::ArtDocument`], asynchronous background image loading and
//! change notifications for a host UI.
//!
//! ## Architecture
//!
//! ```text
//! ┌──────────────────────────────────────────────────┐
//! │               DocumentController                 │
//! │  intents · preview/commit move · observable state│
//! ├────────────────────────┬─────────────────────────┤
//! │       UndoEngine       │    BackgroundLoader     │
//! │  snapshots, history    │  generation-checked     │
//! │  resolve on bg change ─┼─▶ fetch + decode        │
//! ├────────────────────────┴─────────────────────────┤
//! │      EventHub (ordered change notifications)     │
//! └──────────────────────────────────────────────────┘
//! ```
//!
//! ## Example
//!
//! ```no_run
//! use art_core::{ArtDocument, Offset, Position};
//! use art_document::{ControllerConfig, DocumentController};
//!
//! # async fn demo() -> Result<(), Box<dyn std::error::Error>> {
//! let mut controller = DocumentController::with_http(
//!     ArtDocument::new(),
//!     tokio::runtime::Handle::current(),
//!     &ControllerConfig::default(),
//! )?;
//! let id = controller.add_emoji("😀", Position::ZERO, 40)?;
//! controller.move_emoji(id, Offset::new(10, -5))?;
//! controller.undo();
//! # Ok(())
//! # }
//! ```

#![forbid(unsafe_code)]
#![deny(missing_docs)]
#![deny(clippy::all)]
#![deny(clippy::pedantic)]
#![allow(clippy::module_name_repetitions)]

pub mod controller;
pub mod engine;
pub mod error;
pub mod events;
pub mod fetcher;
pub mod image;
pub mod intent;
pub mod loader;

pub use controller::{ControllerConfig, DocumentController};
pub use engine::UndoEngine;
pub use error::FetchError;
pub use events::{DocumentEvent, EventCallback, EventHub, SubscriptionId};
pub use fetcher::{HttpFetcher, ImageFetcher, LoaderConfig, DEFAULT_USER_AGENT};
pub use crate::image::{decode_image, BackgroundImage, ImageFormat};
pub use intent::{Intent, IntentOutcome};
pub use loader::BackgroundLoader;
