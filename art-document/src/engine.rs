//! Transactional document mutation with linear undo/redo.

use std::sync::Arc;

use art_core::{ArtDocument, ArtResult, History, UndoRecord};

use crate::events::{DocumentEvent, EventHub};
use crate::loader::BackgroundLoader;

/// Owns the committed document, its history and the background loader.
///
/// Every mutation runs against a private copy of the current document. If
/// the mutation fails the copy is dropped, so a failed operation never
/// leaves a partial change, a history entry or an event behind.
#[derive(Debug)]
pub struct UndoEngine {
    current: Arc<ArtDocument>,
    history: History,
    loader: BackgroundLoader,
    events: Arc<EventHub>,
}

impl UndoEngine {
    /// Start editing `document` and begin resolving its background.
    #[must_use]
    pub fn new(
        document: ArtDocument,
        history: History,
        mut loader: BackgroundLoader,
        events: Arc<EventHub>,
    ) -> Self {
        loader.resolve(document.background());
        Self {
            current: Arc::new(document),
            history,
            loader,
            events,
        }
    }

    /// The committed document.
    #[must_use]
    pub fn document(&self) -> &Arc<ArtDocument> {
        &self.current
    }

    /// The background loader.
    #[must_use]
    pub fn loader(&self) -> &BackgroundLoader {
        &self.loader
    }

    /// Mutable access to the background loader, for cancellation.
    pub fn loader_mut(&mut self) -> &mut BackgroundLoader {
        &mut self.loader
    }

    /// The undo/redo history.
    #[must_use]
    pub fn history(&self) -> &History {
        &self.history
    }

    /// Run `mutate` as one undoable step named `name`.
    ///
    /// A mutation that leaves the document equal to what it was commits
    /// nothing.
    ///
    /// # Errors
    ///
    /// Propagates the mutation's error; the committed document is untouched.
    pub fn perform<T, F>(&mut self, name: impl Into<String>, mutate: F) -> ArtResult<T>
    where
        F: FnOnce(&mut ArtDocument) -> ArtResult<T>,
    {
        let name = name.into();
        let mut next = ArtDocument::clone(&self.current);
        let value = mutate(&mut next).inspect_err(|err| {
            tracing::debug!(name = %name, error = %err, "Rejected document operation");
        })?;

        if next == *self.current {
            tracing::debug!(name = %name, "Operation left document unchanged");
            return Ok(value);
        }

        let next = Arc::new(next);
        tracing::debug!(name = %name, emojis = next.emojis().len(), "Committing document change");
        self.history.record(UndoRecord {
            name,
            before: Arc::clone(&self.current),
            after: Arc::clone(&next),
        });
        self.commit(next);
        Ok(value)
    }

    /// Restore the document from before the most recent step.
    ///
    /// Returns `false` if there is nothing to undo.
    pub fn undo(&mut self) -> bool {
        let Some(record) = self.history.undo() else {
            return false;
        };
        tracing::debug!(name = %record.name, "Undo");
        let target = Arc::clone(&record.before);
        self.commit(target);
        true
    }

    /// Re-apply the most recently undone step.
    ///
    /// Returns `false` if there is nothing to redo.
    pub fn redo(&mut self) -> bool {
        let Some(record) = self.history.redo() else {
            return false;
        };
        tracing::debug!(name = %record.name, "Redo");
        let target = Arc::clone(&record.after);
        self.commit(target);
        true
    }

    /// Replace the document outright, discarding all history.
    pub fn replace(&mut self, document: ArtDocument) {
        self.history.clear();
        let document = Arc::new(document);
        self.current = Arc::clone(&document);
        self.events.turn().emit(&DocumentEvent::DocumentChanged(document));
        self.loader.resolve(self.current.background());
    }

    fn commit(&mut self, next: Arc<ArtDocument>) {
        let previous = std::mem::replace(&mut self.current, next);
        self.events
            .turn()
            .emit(&DocumentEvent::DocumentChanged(Arc::clone(&self.current)));
        if previous.background() != self.current.background() {
            tracing::debug!(background = %self.current.background(), "Background changed");
            self.loader.resolve(self.current.background());
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::FetchError;
    use crate::fetcher::ImageFetcher;
    use art_core::{ArtError, Background, EmojiId, FetchStatus, Glyph, Offset, Position, Url};
    use async_trait::async_trait;
    use std::sync::atomic::{AtomicUsize, Ordering};

    /// Counts fetches and always fails.
    #[derive(Default)]
    struct CountingFetcher(AtomicUsize);

    #[async_trait]
    impl ImageFetcher for CountingFetcher {
        async fn fetch(&self, _url: &Url) -> Result<Vec<u8>, FetchError> {
            self.0.fetch_add(1, Ordering::SeqCst);
            Err(FetchError::Cancelled)
        }
    }

    fn engine_with(fetcher: Arc<CountingFetcher>) -> UndoEngine {
        let events = Arc::new(EventHub::new());
        let loader = BackgroundLoader::new(fetcher, tokio::runtime::Handle::current(), Arc::clone(&events));
        UndoEngine::new(ArtDocument::new(), History::new(), loader, events)
    }

    fn engine() -> UndoEngine {
        engine_with(Arc::new(CountingFetcher::default()))
    }

    fn add(engine: &mut UndoEngine, glyph: &str) -> EmojiId {
        let glyph = Glyph::parse(glyph).expect("glyph");
        engine
            .perform("Add", |doc| doc.add_emoji(glyph, Position::ZERO, 40))
            .expect("add")
    }

    #[tokio::test]
    async fn test_undo_redo_restores_snapshots() {
        let mut engine = engine();
        let id = add(&mut engine, "😀");
        engine
            .perform("Move", |doc| doc.move_emoji(id, Offset::new(5, 5)))
            .expect("move");

        assert!(engine.undo());
        assert_eq!(engine.document().lookup(id).expect("emoji").position, Position::ZERO);
        assert!(engine.undo());
        assert!(engine.document().emojis().is_empty());
        assert!(!engine.undo());

        assert!(engine.redo());
        assert!(engine.redo());
        assert_eq!(
            engine.document().lookup(id).expect("emoji").position,
            Position::new(5, 5)
        );
        assert!(!engine.redo());
    }

    #[tokio::test]
    async fn test_failed_operation_commits_nothing() {
        let mut engine = engine();
        let before = Arc::clone(engine.document());
        let missing = EmojiId::new(42);
        let result = engine.perform("Move", |doc| doc.move_emoji(missing, Offset::new(1, 1)));
        assert_eq!(result, Err(ArtError::NotFound(missing)));
        assert!(Arc::ptr_eq(&before, engine.document()));
        assert!(!engine.history().can_undo());
    }

    #[tokio::test]
    async fn test_unchanged_operation_is_not_recorded() {
        let mut engine = engine();
        let removed = engine
            .perform("Remove", |doc| Ok(doc.remove_emoji(EmojiId::new(7))))
            .expect("remove");
        assert!(removed.is_none());
        assert!(!engine.history().can_undo());
    }

    #[tokio::test]
    async fn test_new_action_clears_redo() {
        let mut engine = engine();
        add(&mut engine, "😀");
        assert!(engine.undo());
        assert!(engine.history().can_redo());
        add(&mut engine, "🎉");
        assert!(!engine.history().can_redo());
    }

    #[tokio::test]
    async fn test_background_resolved_only_when_it_changes() {
        let fetcher = Arc::new(CountingFetcher::default());
        let mut engine = engine_with(Arc::clone(&fetcher));
        let url = Url::parse("https://example.com/a.png").expect("url");

        engine
            .perform("Set Background", |doc| {
                doc.set_background(Background::RemoteUrl(url.clone()));
                Ok(())
            })
            .expect("set background");
        assert_eq!(engine.loader().status(), FetchStatus::Fetching);
        engine.loader().wait_until_settled().await;

        // Emoji edits leave the background (and its failed status) alone.
        add(&mut engine, "😀");
        assert_eq!(engine.loader().status(), FetchStatus::Failed(url.clone()));
        assert!(engine.undo());
        assert_eq!(fetcher.0.load(Ordering::SeqCst), 1);

        // Undoing the background change resolves Blank again.
        assert!(engine.undo());
        assert!(engine.document().background().is_blank());
        assert_eq!(engine.loader().status(), FetchStatus::Idle);

        // Redo fetches the URL anew.
        assert!(engine.redo());
        assert_eq!(engine.loader().status(), FetchStatus::Fetching);
        engine.loader().wait_until_settled().await;
        assert_eq!(fetcher.0.load(Ordering::SeqCst), 2);
    }
}
