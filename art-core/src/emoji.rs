//! Emoji entities - the glyphs placed on a document.

use std::fmt;
use std::ops::{Add, AddAssign};

use serde::{Deserialize, Serialize};

use crate::{ArtError, ArtResult};

/// Identifier of an emoji, unique within one document.
///
/// Issued by the document's own counter starting at 1 and never reused.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct EmojiId(u64);

impl EmojiId {
    /// Wrap a raw identifier.
    #[must_use]
    pub const fn new(raw: u64) -> Self {
        Self(raw)
    }

    /// The raw identifier.
    #[must_use]
    pub const fn get(self) -> u64 {
        self.0
    }
}

impl fmt::Display for EmojiId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Integer position in model space (origin at the document center, y down).
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Position {
    /// Horizontal coordinate.
    pub x: i32,
    /// Vertical coordinate.
    pub y: i32,
}

impl Position {
    /// The document center.
    pub const ZERO: Self = Self { x: 0, y: 0 };

    /// Create a position.
    #[must_use]
    pub const fn new(x: i32, y: i32) -> Self {
        Self { x, y }
    }

    /// Shift by `offset`, or `None` if either coordinate leaves the `i32`
    /// range.
    #[must_use]
    pub fn checked_offset(self, offset: Offset) -> Option<Self> {
        Some(Self {
            x: self.x.checked_add(offset.dx)?,
            y: self.y.checked_add(offset.dy)?,
        })
    }
}

/// A relative movement in model space.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Offset {
    /// Horizontal delta.
    pub dx: i32,
    /// Vertical delta.
    pub dy: i32,
}

impl Offset {
    /// No movement.
    pub const ZERO: Self = Self { dx: 0, dy: 0 };

    /// Create an offset.
    #[must_use]
    pub const fn new(dx: i32, dy: i32) -> Self {
        Self { dx, dy }
    }

    /// Whether this offset moves anything.
    #[must_use]
    pub const fn is_zero(self) -> bool {
        self.dx == 0 && self.dy == 0
    }
}

/// Saturates at the `i32` limits; use [`Position::checked_offset`] where an
/// out-of-range move must be detected.
impl Add<Offset> for Position {
    type Output = Position;

    fn add(self, offset: Offset) -> Position {
        Position {
            x: self.x.saturating_add(offset.dx),
            y: self.y.saturating_add(offset.dy),
        }
    }
}

impl Add for Offset {
    type Output = Offset;

    fn add(self, other: Offset) -> Offset {
        Offset {
            dx: self.dx.saturating_add(other.dx),
            dy: self.dy.saturating_add(other.dy),
        }
    }
}

impl AddAssign for Offset {
    fn add_assign(&mut self, other: Offset) {
        *self = *self + other;
    }
}

/// A single grapheme cluster classified as an emoji.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Glyph(String);

impl Glyph {
    /// Parse text that must be exactly one emoji grapheme.
    ///
    /// Segmentation and classification follow a compact built-in rule set
    /// (presentation ranges, ZWJ sequences, flags, keycaps, modifiers and
    /// tags) rather than the full Unicode emoji tables, so rare sequences
    /// may be classified differently from a complete UAX #29 implementation.
    ///
    /// # Errors
    ///
    /// Returns [`ArtError::InvalidGlyph`] for empty text, text with more than
    /// one grapheme, or a grapheme that is not an emoji.
    pub fn parse(text: &str) -> ArtResult<Self> {
        let cluster = leading_cluster(text);
        if cluster.len() == text.len() && is_emoji_cluster(cluster) {
            Ok(Self(text.to_owned()))
        } else {
            Err(ArtError::InvalidGlyph(text.to_owned()))
        }
    }

    /// The first grapheme of `text`, if it is an emoji.
    ///
    /// Dropped text only contributes its first character.
    #[must_use]
    pub fn first_in(text: &str) -> Option<Self> {
        let cluster = leading_cluster(text);
        is_emoji_cluster(cluster).then(|| Self(cluster.to_owned()))
    }

    /// Accept a persisted glyph without classifying it.
    pub(crate) fn from_persisted(text: String) -> ArtResult<Self> {
        if text.is_empty() {
            return Err(ArtError::CorruptDocument("empty emoji glyph".to_string()));
        }
        Ok(Self(text))
    }

    /// The glyph text.
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for Glyph {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<Glyph> for String {
    fn from(glyph: Glyph) -> Self {
        glyph.0
    }
}

/// An emoji placed on a document.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Emoji {
    /// Identifier, unique within the document.
    pub id: EmojiId,
    /// The emoji itself.
    pub glyph: Glyph,
    /// Center of the glyph in model space.
    pub position: Position,
    /// Nominal rendering size in model units. Always positive.
    pub size: u32,
}

const ZERO_WIDTH_JOINER: char = '\u{200D}';

/// Emoji presentation starts at U+238D; below it a lone scalar is text.
const EMOJI_PRESENTATION_FLOOR: u32 = 0x238D;

fn is_regional_indicator(c: char) -> bool {
    matches!(u32::from(c), 0x1F1E6..=0x1F1FF)
}

/// Scalars that attach to the preceding emoji without starting a new one.
fn is_extender(c: char) -> bool {
    matches!(
        u32::from(c),
        0xFE0E | 0xFE0F     // variation selectors
        | 0x20E3            // combining keycap
        | 0x1F3FB..=0x1F3FF // skin tone modifiers
        | 0xE0020..=0xE007F // tag sequences
    )
}

/// Approximation of the Unicode `Emoji` property.
fn is_emoji_scalar(c: char) -> bool {
    matches!(
        u32::from(c),
        0x23 | 0x2A
            | 0x30..=0x39
            | 0xA9
            | 0xAE
            | 0x203C
            | 0x2049
            | 0x2122
            | 0x2139
            | 0x2194..=0x2199
            | 0x21A9..=0x21AA
            | 0x231A..=0x231B
            | 0x2328
            | 0x23CF
            | 0x23E9..=0x23F3
            | 0x23F8..=0x23FA
            | 0x24C2
            | 0x25AA..=0x25AB
            | 0x25B6
            | 0x25C0
            | 0x25FB..=0x25FE
            | 0x2600..=0x27BF
            | 0x2934..=0x2935
            | 0x2B05..=0x2B07
            | 0x2B1B..=0x2B1C
            | 0x2B50
            | 0x2B55
            | 0x3030
            | 0x303D
            | 0x3297
            | 0x3299
            | 0x1F000..=0x1FAFF
    )
}

/// The first extended grapheme of `text`, using the emoji sequence rules
/// (flag pairs, modifiers, keycaps, tags and ZWJ joins).
fn leading_cluster(text: &str) -> &str {
    let mut chars = text.char_indices().peekable();
    let Some((_, first)) = chars.next() else {
        return "";
    };
    let mut end = first.len_utf8();

    if is_regional_indicator(first) {
        if let Some(&(i, c)) = chars.peek() {
            if is_regional_indicator(c) {
                end = i + c.len_utf8();
            }
        }
        return &text[..end];
    }

    while let Some(&(i, c)) = chars.peek() {
        if is_extender(c) {
            end = i + c.len_utf8();
            chars.next();
        } else if c == ZERO_WIDTH_JOINER {
            end = i + c.len_utf8();
            chars.next();
            match chars.peek() {
                Some(&(j, next)) if is_emoji_scalar(next) => {
                    end = j + next.len_utf8();
                    chars.next();
                }
                _ => break,
            }
        } else {
            break;
        }
    }
    &text[..end]
}

fn is_emoji_cluster(cluster: &str) -> bool {
    let mut scalars = cluster.chars();
    let Some(first) = scalars.next() else {
        return false;
    };
    if !is_emoji_scalar(first) || cluster.ends_with(ZERO_WIDTH_JOINER) {
        return false;
    }
    u32::from(first) >= EMOJI_PRESENTATION_FLOOR || scalars.next().is_some()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_accepts_single_emoji() {
        for text in ["😀", "❤️", "👍🏽", "👨‍👩‍👧", "🇯🇵", "1️⃣", "🏴\u{E0067}\u{E0062}\u{E0065}\u{E006E}\u{E0067}\u{E007F}"] {
            assert!(Glyph::parse(text).is_ok(), "{text:?} should be an emoji");
        }
    }

    #[test]
    fn test_parse_rejects_text_and_sequences() {
        for text in ["", "a", "1", "#", "😀😀", "😀a", "🇯🇵🇯🇵", "👨\u{200D}"] {
            assert_eq!(
                Glyph::parse(text),
                Err(ArtError::InvalidGlyph(text.to_string())),
                "{text:?} should be rejected"
            );
        }
    }

    #[test]
    fn test_first_in_takes_leading_grapheme() {
        assert_eq!(Glyph::first_in("🐶🐱").map(String::from), Some("🐶".to_string()));
        assert_eq!(Glyph::first_in("👍🏽 nice").map(String::from), Some("👍🏽".to_string()));
        assert!(Glyph::first_in("hello 😀").is_none());
        assert!(Glyph::first_in("").is_none());
    }

    #[test]
    fn test_position_plus_offset_saturates() {
        let moved = Position::new(i32::MAX - 1, 0) + Offset::new(5, -3);
        assert_eq!(moved, Position::new(i32::MAX, -3));
    }

    #[test]
    fn test_checked_offset_detects_overflow() {
        let edge = Position::new(i32::MAX - 1, i32::MIN);
        assert_eq!(
            edge.checked_offset(Offset::new(1, 0)),
            Some(Position::new(i32::MAX, i32::MIN))
        );
        assert_eq!(edge.checked_offset(Offset::new(2, 0)), None);
        assert_eq!(edge.checked_offset(Offset::new(0, -1)), None);
    }
}
