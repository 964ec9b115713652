//! The document controller: the one mutation surface hosts talk to.

use std::sync::Arc;

use art_core::{
    normalize_image_url, ArtDocument, ArtError, ArtResult, Background, EmojiId, FetchStatus,
    Glyph, History, Offset, Point, Position, Size, Url, ViewTransform, DEFAULT_HISTORY_LIMIT,
};
use tokio::runtime::Handle;

use crate::engine::UndoEngine;
use crate::error::FetchError;
use crate::events::{DocumentEvent, EventHub, SubscriptionId};
use crate::fetcher::{HttpFetcher, ImageFetcher, LoaderConfig};
use crate::image::BackgroundImage;
use crate::intent::{Intent, IntentOutcome};
use crate::loader::BackgroundLoader;

/// Settings for a [`DocumentController`].
#[derive(Debug, Clone)]
pub struct ControllerConfig {
    /// Maximum number of undo steps kept.
    pub history_limit: usize,
    /// Settings for the default HTTP fetcher.
    pub loader: LoaderConfig,
}

impl Default for ControllerConfig {
    fn default() -> Self {
        Self {
            history_limit: DEFAULT_HISTORY_LIMIT,
            loader: LoaderConfig::default(),
        }
    }
}

/// A move gesture in progress.
#[derive(Debug)]
struct MoveGesture {
    ids: Vec<EmojiId>,
    net: Offset,
    preview: ArtDocument,
}

/// Façade over one live document.
///
/// All intents go through `&mut self`; hosts with several threads wrap the
/// controller in a mutex. Background fetches complete on the runtime passed
/// at construction and are reported through [`DocumentController::subscribe`].
#[derive(Debug)]
pub struct DocumentController {
    engine: UndoEngine,
    events: Arc<EventHub>,
    gesture: Option<MoveGesture>,
}

impl DocumentController {
    /// Open `document`, fetching remote backgrounds with `fetcher` on
    /// `runtime`.
    #[must_use]
    pub fn new(
        document: ArtDocument,
        fetcher: Arc<dyn ImageFetcher>,
        runtime: Handle,
        config: &ControllerConfig,
    ) -> Self {
        let events = Arc::new(EventHub::new());
        let loader = BackgroundLoader::new(fetcher, runtime, Arc::clone(&events));
        let engine = UndoEngine::new(
            document,
            History::with_limit(config.history_limit),
            loader,
            Arc::clone(&events),
        );
        Self {
            engine,
            events,
            gesture: None,
        }
    }

    /// Open `document` with the default HTTP/file fetcher.
    ///
    /// # Errors
    ///
    /// Returns [`FetchError::Http`] if the HTTP client cannot be built.
    pub fn with_http(
        document: ArtDocument,
        runtime: Handle,
        config: &ControllerConfig,
    ) -> Result<Self, FetchError> {
        let fetcher = HttpFetcher::new(&config.loader)?;
        Ok(Self::new(document, Arc::new(fetcher), runtime, config))
    }

    // ========================================================================
    // Observable state
    // ========================================================================

    /// The committed document.
    #[must_use]
    pub fn document(&self) -> &ArtDocument {
        self.engine.document()
    }

    /// What should be drawn: the preview of a move gesture in progress, or
    /// the committed document.
    #[must_use]
    pub fn displayed_document(&self) -> &ArtDocument {
        self.gesture
            .as_ref()
            .map_or_else(|| self.engine.document().as_ref(), |gesture| &gesture.preview)
    }

    /// The resolved background image, if any.
    #[must_use]
    pub fn background_image(&self) -> Option<Arc<BackgroundImage>> {
        self.engine.loader().image()
    }

    /// The background fetch status.
    #[must_use]
    pub fn fetch_status(&self) -> FetchStatus {
        self.engine.loader().status()
    }

    /// Wait until no background fetch is in flight.
    pub async fn wait_until_settled(&self) -> FetchStatus {
        self.engine.loader().wait_until_settled().await
    }

    /// Register a change callback.
    pub fn subscribe<F>(&self, callback: F) -> SubscriptionId
    where
        F: Fn(&DocumentEvent) + Send + Sync + 'static,
    {
        self.events.subscribe(callback)
    }

    /// Remove a change callback.
    pub fn unsubscribe(&self, id: SubscriptionId) -> bool {
        self.events.unsubscribe(id)
    }

    /// Encode the committed document.
    ///
    /// # Errors
    ///
    /// Returns [`ArtError::CorruptDocument`] if encoding fails.
    pub fn serialize(&self) -> ArtResult<Vec<u8>> {
        art_core::serialize(self.document())
    }

    /// Zoom that fits the resolved background into `viewport`, if there is
    /// a non-empty background image.
    #[must_use]
    pub fn zoom_to_fit(&self, viewport: Size) -> Option<ViewTransform> {
        let image = self.background_image()?;
        ViewTransform::zoom_to_fit(image.size(), viewport)
    }

    // ========================================================================
    // Undo menu
    // ========================================================================

    /// Whether there is a step to undo.
    #[must_use]
    pub fn can_undo(&self) -> bool {
        self.engine.history().can_undo()
    }

    /// Whether there is a step to redo.
    #[must_use]
    pub fn can_redo(&self) -> bool {
        self.engine.history().can_redo()
    }

    /// Label of the step [`Self::undo`] would revert.
    #[must_use]
    pub fn undo_action_name(&self) -> Option<&str> {
        self.engine.history().undo_name()
    }

    /// Label of the step [`Self::redo`] would re-apply.
    #[must_use]
    pub fn redo_action_name(&self) -> Option<&str> {
        self.engine.history().redo_name()
    }

    // ========================================================================
    // Intents
    // ========================================================================

    /// Replace the document (e.g. after opening a file), clearing history.
    pub fn open(&mut self, document: ArtDocument) {
        self.abandon_gesture();
        tracing::info!(emojis = document.emojis().len(), "Opening document");
        self.engine.replace(document);
    }

    /// Decode and open a persisted document.
    ///
    /// # Errors
    ///
    /// Returns [`ArtError::CorruptDocument`] for malformed bytes; the current
    /// document is kept.
    pub fn open_bytes(&mut self, bytes: &[u8]) -> ArtResult<()> {
        let document = art_core::deserialize(bytes)?;
        self.open(document);
        Ok(())
    }

    /// Add an emoji.
    ///
    /// # Errors
    ///
    /// [`ArtError::InvalidGlyph`] unless `glyph` is exactly one emoji,
    /// [`ArtError::InvalidSize`] for a zero size.
    pub fn add_emoji(&mut self, glyph: &str, position: Position, size: u32) -> ArtResult<EmojiId> {
        self.abandon_gesture();
        let glyph = Glyph::parse(glyph)?;
        let name = format!("Add {glyph}");
        self.engine
            .perform(name, |doc| doc.add_emoji(glyph, position, size))
    }

    /// Add the first emoji of dropped `text` at a viewport location.
    ///
    /// The emoji is sized `default_size` viewport units, so it appears at
    /// the same on-screen size whatever the zoom. Returns `Ok(None)` if the
    /// text does not start with an emoji.
    ///
    /// # Errors
    ///
    /// [`ArtError::DivisionByZero`] for a zero zoom, [`ArtError::InvalidSize`]
    /// if the size rounds below one model unit.
    pub fn drop_text(
        &mut self,
        text: &str,
        location: Point,
        view: &ViewTransform,
        viewport: Size,
        default_size: f64,
    ) -> ArtResult<Option<EmojiId>> {
        let Some(glyph) = Glyph::first_in(text) else {
            tracing::debug!("Dropped text has no leading emoji");
            return Ok(None);
        };
        let position = view.to_model_position(location, viewport)?;
        let size = model_size(view.model_length(default_size)?)?;
        self.add_emoji(glyph.as_str(), position, size).map(Some)
    }

    /// Use a dropped or pasted image URL as the background.
    pub fn drop_url(&mut self, url: &Url) {
        let url = normalize_image_url(url);
        self.set_background(Background::RemoteUrl(url));
    }

    /// Move one emoji by `offset`.
    ///
    /// # Errors
    ///
    /// [`ArtError::NotFound`] if `id` is absent, [`ArtError::OutOfBounds`] if
    /// the move would leave the coordinate range.
    pub fn move_emoji(&mut self, id: EmojiId, offset: Offset) -> ArtResult<()> {
        self.abandon_gesture();
        self.engine.perform("Move", |doc| doc.move_emoji(id, offset))
    }

    /// Move several emojis by `offset` in one step.
    ///
    /// # Errors
    ///
    /// [`ArtError::NotFound`] or [`ArtError::OutOfBounds`] for the first
    /// offending id; nothing moves.
    pub fn move_emojis(&mut self, ids: &[EmojiId], offset: Offset) -> ArtResult<()> {
        self.abandon_gesture();
        self.engine.perform("Move", |doc| doc.move_emojis(ids, offset))
    }

    /// Scale one emoji's size by `factor`. Returns the new size.
    ///
    /// # Errors
    ///
    /// [`ArtError::NotFound`] if `id` is absent, [`ArtError::InvalidScale`] if
    /// the size would round below one.
    pub fn scale_emoji(&mut self, id: EmojiId, factor: f64) -> ArtResult<u32> {
        self.abandon_gesture();
        self.engine.perform("Scale", |doc| doc.scale_emoji(id, factor))
    }

    /// Scale several emojis by `factor` in one step.
    ///
    /// # Errors
    ///
    /// As [`Self::scale_emoji`]; nothing changes if any emoji fails.
    pub fn scale_emojis(&mut self, ids: &[EmojiId], factor: f64) -> ArtResult<()> {
        self.abandon_gesture();
        self.engine.perform("Scale", |doc| doc.scale_emojis(ids, factor))
    }

    /// Remove an emoji. Removing an absent id changes nothing and returns
    /// `false`.
    pub fn remove_emoji(&mut self, id: EmojiId) -> bool {
        self.abandon_gesture();
        // Removal cannot fail.
        self.engine
            .perform("Remove", |doc| Ok(doc.remove_emoji(id).is_some()))
            .unwrap_or(false)
    }

    /// Replace the background.
    pub fn set_background(&mut self, background: Background) {
        self.abandon_gesture();
        if let Err(err) = self.engine.perform("Set Background", |doc| {
            doc.set_background(background);
            Ok(())
        }) {
            tracing::warn!(error = %err, "Background change rejected");
        }
    }

    /// Undo the last step. Returns `false` if there was nothing to undo.
    pub fn undo(&mut self) -> bool {
        self.abandon_gesture();
        self.engine.undo()
    }

    /// Redo the last undone step. Returns `false` if there was nothing to
    /// redo.
    pub fn redo(&mut self) -> bool {
        self.abandon_gesture();
        self.engine.redo()
    }

    /// Stop the background fetch in flight. Returns `false` if nothing was
    /// being fetched.
    pub fn cancel_fetch(&mut self) -> bool {
        self.engine.loader_mut().cancel()
    }

    // ========================================================================
    // Two-phase move
    // ========================================================================

    /// Provisionally move `ids` by a further `delta`.
    ///
    /// Deltas accumulate while the same set of ids is dragged; a different
    /// set starts a new gesture. The preview is visible through
    /// [`Self::displayed_document`] only: no history entry, no event.
    ///
    /// # Errors
    ///
    /// [`ArtError::NotFound`] or [`ArtError::OutOfBounds`] for the first
    /// offending id; the gesture is unchanged.
    pub fn preview_move(&mut self, ids: &[EmojiId], delta: Offset) -> ArtResult<()> {
        let net = match &self.gesture {
            Some(gesture) if gesture.ids == ids => gesture.net + delta,
            _ => delta,
        };
        let mut preview = self.document().clone();
        preview.move_emojis(ids, net)?;
        self.gesture = Some(MoveGesture {
            ids: ids.to_vec(),
            net,
            preview,
        });
        Ok(())
    }

    /// Commit the gesture in progress as one `"Move"` step.
    ///
    /// Returns `false` if no gesture was active or its net delta is zero.
    ///
    /// # Errors
    ///
    /// [`ArtError::NotFound`] if a dragged emoji disappeared meanwhile.
    pub fn commit_move(&mut self) -> ArtResult<bool> {
        let Some(gesture) = self.gesture.take() else {
            return Ok(false);
        };
        if gesture.net.is_zero() {
            return Ok(false);
        }
        self.engine
            .perform("Move", |doc| doc.move_emojis(&gesture.ids, gesture.net))?;
        Ok(true)
    }

    /// Drop the gesture in progress. Returns `false` if none was active.
    pub fn cancel_move(&mut self) -> bool {
        self.gesture.take().is_some()
    }

    fn abandon_gesture(&mut self) {
        if let Some(gesture) = self.gesture.take() {
            tracing::debug!(emojis = gesture.ids.len(), "Abandoning uncommitted move");
        }
    }

    /// Apply a serialized intent.
    ///
    /// # Errors
    ///
    /// Whatever the corresponding method returns, plus
    /// [`ArtError::CorruptDocument`] for an undecodable background.
    pub fn apply(&mut self, intent: Intent) -> ArtResult<IntentOutcome> {
        let before = Arc::clone(self.engine.document());
        match intent {
            Intent::AddEmoji {
                glyph,
                position,
                size,
            } => return self.add_emoji(&glyph, position, size).map(IntentOutcome::Added),
            Intent::MoveEmoji { id, offset } => self.move_emoji(id, offset)?,
            Intent::MoveEmojis { ids, offset } => self.move_emojis(&ids, offset)?,
            Intent::ScaleEmoji { id, factor } => {
                self.scale_emoji(id, factor)?;
            }
            Intent::ScaleEmojis { ids, factor } => self.scale_emojis(&ids, factor)?,
            Intent::RemoveEmoji { id } => {
                self.remove_emoji(id);
            }
            Intent::SetBackground { background } => {
                self.set_background(background.into_background()?);
            }
            Intent::Undo => {
                self.undo();
            }
            Intent::Redo => {
                self.redo();
            }
        }
        Ok(if Arc::ptr_eq(&before, self.engine.document()) {
            IntentOutcome::Unchanged
        } else {
            IntentOutcome::Changed
        })
    }
}

/// Round a model length to a positive integer size.
#[allow(clippy::cast_possible_truncation, clippy::cast_sign_loss)]
fn model_size(length: f64) -> ArtResult<u32> {
    let rounded = length.round();
    if !(1.0..=f64::from(u32::MAX)).contains(&rounded) {
        return Err(ArtError::InvalidSize { size: length });
    }
    Ok(rounded as u32)
}
