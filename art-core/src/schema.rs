//! Persisted representation of art documents.
//!
//! Documents are stored as JSON:
//!
//! ```json
//! {
//!   "version": 1,
//!   "background": { "type": "url", "value": "https://example.com/sky.png" },
//!   "emojis": [
//!     { "id": 1, "glyph": "😀", "position": { "x": 0, "y": 0 }, "size": 40 }
//!   ],
//!   "last_emoji_id": 1
//! }
//! ```
//!
//! Embedded background images are stored as standard base64 text.

use base64::Engine;
use serde::{Deserialize, Serialize};
use url::Url;

use crate::{ArtDocument, ArtError, ArtResult, Background, Emoji, EmojiId, Glyph, Position};

/// Current schema version.
pub const SCHEMA_VERSION: u32 = 1;

/// Persisted background descriptor.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", content = "value", rename_all = "snake_case")]
pub enum BackgroundDocument {
    /// No background image.
    Blank,
    /// Remote image URL.
    Url(String),
    /// Base64-encoded image bytes.
    ImageData(String),
}

impl From<&Background> for BackgroundDocument {
    fn from(background: &Background) -> Self {
        match background {
            Background::Blank => Self::Blank,
            Background::RemoteUrl(url) => Self::Url(url.to_string()),
            Background::EmbeddedBytes(data) => {
                Self::ImageData(base64::engine::general_purpose::STANDARD.encode(data))
            }
        }
    }
}

impl BackgroundDocument {
    /// Convert into a runtime descriptor.
    ///
    /// # Errors
    ///
    /// Returns [`ArtError::CorruptDocument`] for an unparsable URL or invalid
    /// base64 data.
    pub fn into_background(self) -> ArtResult<Background> {
        match self {
            Self::Blank => Ok(Background::Blank),
            Self::Url(raw) => Url::parse(&raw)
                .map(Background::RemoteUrl)
                .map_err(|e| ArtError::CorruptDocument(format!("bad background url {raw:?}: {e}"))),
            Self::ImageData(encoded) => base64::engine::general_purpose::STANDARD
                .decode(encoded)
                .map(Background::EmbeddedBytes)
                .map_err(|e| ArtError::CorruptDocument(format!("bad background image data: {e}"))),
        }
    }
}

/// Persisted emoji.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EmojiDocument {
    /// Emoji identifier.
    pub id: u64,
    /// Emoji text.
    pub glyph: String,
    /// Model-space position.
    pub position: Position,
    /// Nominal size in model units.
    pub size: u32,
}

impl From<&Emoji> for EmojiDocument {
    fn from(emoji: &Emoji) -> Self {
        Self {
            id: emoji.id.get(),
            glyph: emoji.glyph.to_string(),
            position: emoji.position,
            size: emoji.size,
        }
    }
}

impl EmojiDocument {
    /// Convert into a runtime emoji.
    ///
    /// # Errors
    ///
    /// Returns [`ArtError::CorruptDocument`] if the glyph is empty.
    pub fn into_emoji(self) -> ArtResult<Emoji> {
        Ok(Emoji {
            id: EmojiId::new(self.id),
            glyph: Glyph::from_persisted(self.glyph)?,
            position: self.position,
            size: self.size,
        })
    }
}

/// Canonical persisted document.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ArtFile {
    /// Schema version, see [`SCHEMA_VERSION`].
    pub version: u32,
    /// Background descriptor.
    #[serde(default = "ArtFile::default_background")]
    pub background: BackgroundDocument,
    /// Emojis in drawing order.
    #[serde(default)]
    pub emojis: Vec<EmojiDocument>,
    /// Last issued emoji id.
    #[serde(default)]
    pub last_emoji_id: u64,
}

impl ArtFile {
    const fn default_background() -> BackgroundDocument {
        BackgroundDocument::Blank
    }

    /// Build the persisted form of a document.
    #[must_use]
    pub fn from_document(document: &ArtDocument) -> Self {
        Self {
            version: SCHEMA_VERSION,
            background: BackgroundDocument::from(document.background()),
            emojis: document.emojis().iter().map(EmojiDocument::from).collect(),
            last_emoji_id: document.last_emoji_id(),
        }
    }

    /// Convert back into a runtime document, validating its invariants.
    ///
    /// # Errors
    ///
    /// Returns [`ArtError::CorruptDocument`] for an unsupported version,
    /// malformed background, empty glyph, zero size or duplicate id.
    pub fn into_document(self) -> ArtResult<ArtDocument> {
        if self.version != SCHEMA_VERSION {
            return Err(ArtError::CorruptDocument(format!(
                "unsupported schema version {}",
                self.version
            )));
        }
        let background = self.background.into_background()?;
        let emojis = self
            .emojis
            .into_iter()
            .map(EmojiDocument::into_emoji)
            .collect::<ArtResult<Vec<_>>>()?;
        ArtDocument::from_parts(background, emojis, self.last_emoji_id)
    }
}

/// Encode a document.
///
/// # Errors
///
/// Returns an error if JSON encoding fails.
pub fn serialize(document: &ArtDocument) -> ArtResult<Vec<u8>> {
    let bytes = serde_json::to_vec(&ArtFile::from_document(document))?;
    tracing::debug!(
        emojis = document.emojis().len(),
        bytes = bytes.len(),
        "Serialized document"
    );
    Ok(bytes)
}

/// Decode a document produced by [`serialize`].
///
/// # Errors
///
/// Returns [`ArtError::CorruptDocument`] if the bytes are not a valid
/// document.
pub fn deserialize(bytes: &[u8]) -> ArtResult<ArtDocument> {
    let file: ArtFile = serde_json::from_slice(bytes)?;
    file.into_document()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::Offset;

    fn populated() -> ArtDocument {
        let mut doc = ArtDocument::new();
        doc.set_background(Background::RemoteUrl(
            Url::parse("https://example.com/sky.png").expect("url"),
        ));
        let a = doc
            .add_emoji(Glyph::parse("😀").expect("emoji"), Position::ZERO, 40)
            .expect("add");
        doc.add_emoji(Glyph::parse("🐶").expect("emoji"), Position::new(5, 9), 12)
            .expect("add");
        doc.move_emoji(a, Offset::new(-3, 4)).expect("move");
        doc
    }

    #[test]
    fn test_json_layout() {
        let value: serde_json::Value =
            serde_json::from_slice(&serialize(&populated()).expect("serialize")).expect("json");
        assert_eq!(value["version"], 1);
        assert_eq!(value["background"]["type"], "url");
        assert_eq!(value["background"]["value"], "https://example.com/sky.png");
        assert_eq!(value["emojis"][0]["glyph"], "😀");
        assert_eq!(value["emojis"][0]["position"]["x"], -3);
        assert_eq!(value["emojis"][1]["id"], 2);
        assert_eq!(value["last_emoji_id"], 2);
    }

    #[test]
    fn test_round_trip_keeps_counter() {
        let mut doc = populated();
        doc.remove_emoji(EmojiId::new(2));
        let restored = deserialize(&serialize(&doc).expect("serialize")).expect("deserialize");
        assert_eq!(restored, doc);
        assert_eq!(restored.last_emoji_id(), 2);
    }

    #[test]
    fn test_embedded_bytes_use_base64() {
        let mut doc = ArtDocument::new();
        doc.set_background(Background::EmbeddedBytes(vec![0, 1, 2, 254, 255]));
        let json = String::from_utf8(serialize(&doc).expect("serialize")).expect("utf8");
        assert!(json.contains(r#""type":"image_data","value":"AAEC/v8=""#));
        assert_eq!(deserialize(json.as_bytes()).expect("deserialize"), doc);
    }

    #[test]
    fn test_malformed_bytes_are_corrupt() {
        for input in [
            "not json",
            r#"{"version":2}"#,
            r#"{"version":1,"background":{"type":"url","value":"::nope"}}"#,
            r#"{"version":1,"background":{"type":"image_data","value":"%%%"}}"#,
            r#"{"version":1,"emojis":[{"id":1,"glyph":"","position":{"x":0,"y":0},"size":3}]}"#,
            r#"{"version":1,"emojis":[{"id":1,"glyph":"😀","position":{"x":0,"y":0},"size":0}]}"#,
            r#"{"version":1,"last_emoji_id":18446744073709551615}"#,
        ] {
            assert!(
                matches!(deserialize(input.as_bytes()), Err(ArtError::CorruptDocument(_))),
                "{input} should be corrupt"
            );
        }
    }

    #[test]
    fn test_minimal_document_defaults() {
        let doc = deserialize(br#"{"version":1}"#).expect("deserialize");
        assert_eq!(doc, ArtDocument::new());
    }
}
