//! The art document - a background plus an ordered set of emojis.

use crate::{ArtError, ArtResult, Background, Emoji, EmojiId, Glyph, Offset, Position};

/// An emoji art document.
///
/// Emojis are kept in insertion order, which is also the drawing order
/// (later emojis are drawn on top). Every edit goes through the methods
/// below, each of which either succeeds completely or leaves the document
/// untouched.
///
/// Equality is structural over the background and the emoji sequence; the
/// id counter does not take part in it.
#[derive(Debug, Clone, Default)]
pub struct ArtDocument {
    background: Background,
    emojis: Vec<Emoji>,
    last_emoji_id: u64,
}

impl PartialEq for ArtDocument {
    fn eq(&self, other: &Self) -> bool {
        self.background == other.background && self.emojis == other.emojis
    }
}

impl Eq for ArtDocument {}

impl ArtDocument {
    /// Create an empty document with a blank background.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Rebuild a document from persisted parts, checking its invariants.
    ///
    /// A counter below the largest id in use is raised to that id. A
    /// counter that has no id left to issue is rejected.
    pub(crate) fn from_parts(
        background: Background,
        emojis: Vec<Emoji>,
        last_emoji_id: u64,
    ) -> ArtResult<Self> {
        let mut ids: Vec<EmojiId> = emojis.iter().map(|e| e.id).collect();
        ids.sort_unstable();
        if let Some(pair) = ids.windows(2).find(|pair| pair[0] == pair[1]) {
            return Err(ArtError::CorruptDocument(format!(
                "duplicate emoji id {}",
                pair[0]
            )));
        }
        if let Some(emoji) = emojis.iter().find(|e| e.size == 0) {
            return Err(ArtError::CorruptDocument(format!(
                "emoji {} has zero size",
                emoji.id
            )));
        }
        let highest = ids.last().map_or(0, |id| id.get());
        let last_emoji_id = last_emoji_id.max(highest);
        if last_emoji_id == u64::MAX {
            return Err(ArtError::CorruptDocument(format!(
                "emoji id counter {last_emoji_id} is exhausted"
            )));
        }
        Ok(Self {
            background,
            emojis,
            last_emoji_id,
        })
    }

    /// The background descriptor.
    #[must_use]
    pub fn background(&self) -> &Background {
        &self.background
    }

    /// All emojis in drawing order.
    #[must_use]
    pub fn emojis(&self) -> &[Emoji] {
        &self.emojis
    }

    /// The most recently issued emoji id (0 if none was ever issued).
    #[must_use]
    pub fn last_emoji_id(&self) -> u64 {
        self.last_emoji_id
    }

    /// Look up an emoji by id.
    #[must_use]
    pub fn lookup(&self, id: EmojiId) -> Option<&Emoji> {
        self.emojis.iter().find(|e| e.id == id)
    }

    fn index_of(&self, id: EmojiId) -> ArtResult<usize> {
        self.emojis
            .iter()
            .position(|e| e.id == id)
            .ok_or(ArtError::NotFound(id))
    }

    /// Append an emoji on top of the others and return its new id.
    ///
    /// # Errors
    ///
    /// Returns [`ArtError::InvalidSize`] if `size` is zero, or
    /// [`ArtError::IdsExhausted`] if the counter has no id left.
    pub fn add_emoji(&mut self, glyph: Glyph, position: Position, size: u32) -> ArtResult<EmojiId> {
        if size == 0 {
            return Err(ArtError::InvalidSize { size: 0.0 });
        }
        let next = self
            .last_emoji_id
            .checked_add(1)
            .ok_or(ArtError::IdsExhausted)?;
        self.last_emoji_id = next;
        let id = EmojiId::new(next);
        self.emojis.push(Emoji {
            id,
            glyph,
            position,
            size,
        });
        Ok(id)
    }

    /// Shift an emoji by `offset`.
    ///
    /// # Errors
    ///
    /// Returns [`ArtError::NotFound`] if no emoji has this id, or
    /// [`ArtError::OutOfBounds`] if the new position leaves the `i32` range.
    pub fn move_emoji(&mut self, id: EmojiId, offset: Offset) -> ArtResult<()> {
        self.move_emojis(&[id], offset)
    }

    /// Shift several emojis by the same offset.
    ///
    /// # Errors
    ///
    /// Fails like [`ArtDocument::move_emoji`] for the first offending id; no
    /// emoji is moved in that case.
    pub fn move_emojis(&mut self, ids: &[EmojiId], offset: Offset) -> ArtResult<()> {
        let updates = ids
            .iter()
            .map(|&id| {
                let index = self.index_of(id)?;
                let position = self.emojis[index]
                    .position
                    .checked_offset(offset)
                    .ok_or(ArtError::OutOfBounds { id })?;
                Ok((index, position))
            })
            .collect::<ArtResult<Vec<_>>>()?;
        for (index, position) in updates {
            self.emojis[index].position = position;
        }
        Ok(())
    }

    /// Multiply an emoji's size by `factor` and return the new size.
    ///
    /// The result is rounded half away from zero. Sizes that would round to
    /// zero or below are rejected rather than clamped.
    ///
    /// # Errors
    ///
    /// Returns [`ArtError::NotFound`] if no emoji has this id, or
    /// [`ArtError::InvalidScale`] if the scaled size is not positive.
    pub fn scale_emoji(&mut self, id: EmojiId, factor: f64) -> ArtResult<u32> {
        let index = self.index_of(id)?;
        let size = scaled_size(self.emojis[index].size, factor)?;
        self.emojis[index].size = size;
        Ok(size)
    }

    /// Scale several emojis by the same factor.
    ///
    /// # Errors
    ///
    /// Fails like [`ArtDocument::scale_emoji`] for the first offending id;
    /// no emoji is resized in that case.
    pub fn scale_emojis(&mut self, ids: &[EmojiId], factor: f64) -> ArtResult<()> {
        let updates = ids
            .iter()
            .map(|&id| {
                let index = self.index_of(id)?;
                Ok((index, scaled_size(self.emojis[index].size, factor)?))
            })
            .collect::<ArtResult<Vec<_>>>()?;
        for (index, size) in updates {
            self.emojis[index].size = size;
        }
        Ok(())
    }

    /// Remove an emoji. Removing an absent id does nothing.
    pub fn remove_emoji(&mut self, id: EmojiId) -> Option<Emoji> {
        let index = self.emojis.iter().position(|e| e.id == id)?;
        Some(self.emojis.remove(index))
    }

    /// Replace the background.
    pub fn set_background(&mut self, background: Background) {
        self.background = background;
    }
}

#[allow(clippy::cast_possible_truncation, clippy::cast_sign_loss)]
fn scaled_size(size: u32, factor: f64) -> ArtResult<u32> {
    // f64::round rounds half away from zero.
    let scaled = (f64::from(size) * factor).round();
    if !scaled.is_finite() || scaled < 1.0 || scaled > f64::from(u32::MAX) {
        return Err(ArtError::InvalidScale { factor });
    }
    Ok(scaled as u32)
}
