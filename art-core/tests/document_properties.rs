//! Property tests for the document model and its persisted form.
//!
//! Covers:
//! - Additive moves
//! - Idempotent removal
//! - Lossless serialization of any reachable document

use art_core::{
    deserialize, serialize, ArtDocument, Background, EmojiId, Glyph, Offset, Position, Url,
};
use proptest::prelude::*;

const GLYPHS: [&str; 6] = ["😀", "🐶", "🌵", "👍🏽", "🇯🇵", "❤️"];

/// An edit that can be replayed on a document to reach arbitrary states.
#[derive(Debug, Clone)]
enum Edit {
    Add {
        glyph: usize,
        x: i32,
        y: i32,
        size: u32,
    },
    Move {
        pick: usize,
        dx: i32,
        dy: i32,
    },
    Remove {
        pick: usize,
    },
    Background(u8),
}

fn edit_strategy() -> impl Strategy<Value = Edit> {
    prop_oneof![
        (0..GLYPHS.len(), -500..500i32, -500..500i32, 1..200u32)
            .prop_map(|(glyph, x, y, size)| Edit::Add { glyph, x, y, size }),
        (any::<usize>(), -50..50i32, -50..50i32).prop_map(|(pick, dx, dy)| Edit::Move { pick, dx, dy }),
        any::<usize>().prop_map(|pick| Edit::Remove { pick }),
        (0..3u8).prop_map(Edit::Background),
    ]
}

fn pick(doc: &ArtDocument, index: usize) -> Option<EmojiId> {
    let emojis = doc.emojis();
    if emojis.is_empty() {
        None
    } else {
        Some(emojis[index % emojis.len()].id)
    }
}

fn build(edits: &[Edit]) -> ArtDocument {
    let mut doc = ArtDocument::new();
    for edit in edits {
        match *edit {
            Edit::Add { glyph, x, y, size } => {
                let glyph = Glyph::parse(GLYPHS[glyph]).expect("emoji");
                doc.add_emoji(glyph, Position::new(x, y), size).expect("add");
            }
            Edit::Move { pick: index, dx, dy } => {
                if let Some(id) = pick(&doc, index) {
                    doc.move_emoji(id, Offset::new(dx, dy)).expect("move");
                }
            }
            Edit::Remove { pick: index } => {
                if let Some(id) = pick(&doc, index) {
                    doc.remove_emoji(id);
                }
            }
            Edit::Background(kind) => doc.set_background(match kind {
                0 => Background::Blank,
                1 => Background::RemoteUrl(Url::parse("https://example.com/bg.png").expect("url")),
                _ => Background::EmbeddedBytes(vec![kind; 16]),
            }),
        }
    }
    doc
}

proptest! {
    #[test]
    fn move_shifts_position_by_delta(
        edits in prop::collection::vec(edit_strategy(), 1..30),
        index in any::<usize>(),
        dx in -1000..1000i32,
        dy in -1000..1000i32,
    ) {
        let doc = build(&edits);
        if let Some(id) = pick(&doc, index) {
            let before = doc.lookup(id).expect("present").position;
            let mut moved = doc.clone();
            moved.move_emoji(id, Offset::new(dx, dy)).expect("move");
            let after = moved.lookup(id).expect("present").position;
            prop_assert_eq!(after, Position::new(before.x + dx, before.y + dy));
        }
    }

    #[test]
    fn remove_is_idempotent(
        edits in prop::collection::vec(edit_strategy(), 0..30),
        raw_id in 0..40u64,
    ) {
        let id = EmojiId::new(raw_id);
        let mut once = build(&edits);
        once.remove_emoji(id);
        let mut twice = once.clone();
        twice.remove_emoji(id);
        prop_assert_eq!(once, twice);
    }

    #[test]
    fn serialization_round_trips(edits in prop::collection::vec(edit_strategy(), 0..40)) {
        let doc = build(&edits);
        let restored = deserialize(&serialize(&doc).expect("serialize")).expect("deserialize");
        prop_assert_eq!(restored.last_emoji_id(), doc.last_emoji_id());
        prop_assert_eq!(restored, doc);
    }
}

#[test]
fn test_document_survives_file_round_trip() {
    let dir = tempfile::tempdir().expect("tempdir");
    let path = dir.path().join("art.emojiart");

    let doc = build(&[
        Edit::Add {
            glyph: 0,
            x: 0,
            y: 0,
            size: 40,
        },
        Edit::Add {
            glyph: 3,
            x: 12,
            y: -8,
            size: 20,
        },
        Edit::Background(2),
    ]);
    std::fs::write(&path, serialize(&doc).expect("serialize")).expect("write");

    let restored = deserialize(&std::fs::read(&path).expect("read")).expect("deserialize");
    assert_eq!(restored, doc);
    assert_eq!(restored.emojis()[1].glyph.as_str(), "👍🏽");
}
