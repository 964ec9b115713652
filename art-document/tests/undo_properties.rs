//! Property tests for undo/redo through the controller.

use std::sync::Arc;

use art_core::{ArtDocument, Background, EmojiId, Offset, Position, Url};
use art_document::{ControllerConfig, DocumentController, FetchError, ImageFetcher};
use async_trait::async_trait;
use proptest::prelude::*;

const GLYPHS: [&str; 4] = ["😀", "🐶", "👍🏽", "🇯🇵"];

struct Offline;

#[async_trait]
impl ImageFetcher for Offline {
    async fn fetch(&self, url: &Url) -> Result<Vec<u8>, FetchError> {
        Err(FetchError::UnsupportedScheme(url.scheme().to_string()))
    }
}

#[derive(Debug, Clone)]
enum Step {
    Add { glyph: usize, x: i32, y: i32 },
    Move { pick: usize, dx: i32, dy: i32 },
    Scale { pick: usize, double: bool },
    Remove { pick: usize },
    Background(bool),
    Undo,
    Redo,
}

fn step_strategy() -> impl Strategy<Value = Step> {
    prop_oneof![
        (0..GLYPHS.len(), -100..100i32, -100..100i32)
            .prop_map(|(glyph, x, y)| Step::Add { glyph, x, y }),
        (any::<usize>(), -20..20i32, -20..20i32).prop_map(|(pick, dx, dy)| Step::Move { pick, dx, dy }),
        (any::<usize>(), any::<bool>()).prop_map(|(pick, double)| Step::Scale { pick, double }),
        any::<usize>().prop_map(|pick| Step::Remove { pick }),
        any::<bool>().prop_map(Step::Background),
        Just(Step::Undo),
        Just(Step::Redo),
    ]
}

fn pick(doc: &ArtDocument, index: usize) -> Option<EmojiId> {
    let emojis = doc.emojis();
    (!emojis.is_empty()).then(|| emojis[index % emojis.len()].id)
}

/// Apply `step`, returning whether it should have committed a new step.
fn apply(controller: &mut DocumentController, step: &Step) -> bool {
    let doc = controller.document().clone();
    match *step {
        Step::Add { glyph, x, y } => {
            controller
                .add_emoji(GLYPHS[glyph], Position::new(x, y), 16)
                .expect("add");
            true
        }
        Step::Move { pick: index, dx, dy } => pick(&doc, index).is_some_and(|id| {
            controller.move_emoji(id, Offset::new(dx, dy)).expect("move");
            dx != 0 || dy != 0
        }),
        Step::Scale {
            pick: index,
            double,
        } => pick(&doc, index).is_some_and(|id| {
            // Sizes start at 16 and only double or stay put, so never drop below one.
            let factor = if double { 2.0 } else { 1.0 };
            controller.scale_emoji(id, factor).is_ok() && double
        }),
        Step::Remove { pick: index } => {
            pick(&doc, index).is_some_and(|id| controller.remove_emoji(id))
        }
        Step::Background(remote) => {
            let background = if remote {
                Background::RemoteUrl(Url::parse("https://example.com/bg.png").expect("url"))
            } else {
                Background::Blank
            };
            let changed = *doc.background() != background;
            controller.set_background(background);
            changed
        }
        Step::Undo => {
            controller.undo();
            false
        }
        Step::Redo => {
            controller.redo();
            false
        }
    }
}

proptest! {
    #[test]
    fn undo_then_redo_round_trips(steps in prop::collection::vec(step_strategy(), 1..30)) {
        let runtime = tokio::runtime::Builder::new_current_thread()
            .enable_all()
            .build()
            .expect("runtime");
        let mut controller = DocumentController::new(
            ArtDocument::new(),
            Arc::new(Offline),
            runtime.handle().clone(),
            &ControllerConfig::default(),
        );

        for step in &steps {
            let before = controller.document().clone();
            if !apply(&mut controller, step) {
                continue;
            }
            let after = controller.document().clone();
            prop_assert_ne!(&before, &after);

            prop_assert!(controller.undo());
            prop_assert_eq!(controller.document(), &before);
            prop_assert!(controller.redo());
            prop_assert_eq!(controller.document(), &after);
        }
    }
}
