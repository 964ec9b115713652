//! Change notifications for hosts.
//!
//! Hosts register callbacks and are told, exactly once per committed change,
//! that the document, the displayed background image or the fetch status
//! changed. Background fetches complete on runtime worker threads, so
//! callbacks must be `Send + Sync`.

use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, Mutex, MutexGuard, PoisonError, RwLock};

use art_core::{ArtDocument, FetchStatus};

use crate::image::BackgroundImage;

/// A committed state change.
#[derive(Debug, Clone)]
pub enum DocumentEvent {
    /// The committed document was replaced.
    DocumentChanged(Arc<ArtDocument>),
    /// The displayed background image changed (`None` = cleared).
    ImageChanged(Option<Arc<BackgroundImage>>),
    /// The background fetch status changed.
    FetchStatusChanged(FetchStatus),
}

/// Callback type for change notifications.
pub type EventCallback = Arc<dyn Fn(&DocumentEvent) + Send + Sync>;

/// Handle returned by [`EventHub::subscribe`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct SubscriptionId(u64);

/// Registry of event callbacks.
///
/// Emission happens inside a dispatch turn: whoever changes state takes the
/// turn first, applies the change, emits, and releases it. Events therefore
/// reach observers in the same order the changes were applied, whichever
/// thread applied them. Callbacks may read state but must not issue intents
/// from inside the callback.
#[derive(Default)]
pub struct EventHub {
    subscribers: RwLock<Vec<(SubscriptionId, EventCallback)>>,
    next_id: AtomicU64,
    dispatch: Mutex<()>,
}

impl std::fmt::Debug for EventHub {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let count = self
            .subscribers
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .len();
        f.debug_struct("EventHub")
            .field("subscribers", &count)
            .finish_non_exhaustive()
    }
}

/// Exclusive right to apply a change and emit its events.
pub(crate) struct DispatchTurn<'a> {
    hub: &'a EventHub,
    _guard: MutexGuard<'a, ()>,
}

impl DispatchTurn<'_> {
    /// Deliver an event to every subscriber.
    pub(crate) fn emit(&self, event: &DocumentEvent) {
        let subscribers: Vec<EventCallback> = self
            .hub
            .subscribers
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .iter()
            .map(|(_, callback)| Arc::clone(callback))
            .collect();
        for callback in subscribers {
            callback(event);
        }
    }
}

impl EventHub {
    /// Create an empty hub.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a callback for every future event.
    pub fn subscribe<F>(&self, callback: F) -> SubscriptionId
    where
        F: Fn(&DocumentEvent) + Send + Sync + 'static,
    {
        let id = SubscriptionId(self.next_id.fetch_add(1, Ordering::Relaxed));
        self.subscribers
            .write()
            .unwrap_or_else(PoisonError::into_inner)
            .push((id, Arc::new(callback)));
        id
    }

    /// Remove a callback. Returns `false` if it was not registered.
    pub fn unsubscribe(&self, id: SubscriptionId) -> bool {
        let mut subscribers = self
            .subscribers
            .write()
            .unwrap_or_else(PoisonError::into_inner);
        let before = subscribers.len();
        subscribers.retain(|(existing, _)| *existing != id);
        subscribers.len() != before
    }

    /// Take the dispatch turn, waiting for any emission in progress.
    pub(crate) fn turn(&self) -> DispatchTurn<'_> {
        DispatchTurn {
            hub: self,
            _guard: self.dispatch.lock().unwrap_or_else(PoisonError::into_inner),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_subscribe_and_unsubscribe() {
        let hub = EventHub::new();
        let seen = Arc::new(Mutex::new(Vec::new()));
        let sink = Arc::clone(&seen);
        let id = hub.subscribe(move |event| {
            if let DocumentEvent::FetchStatusChanged(status) = event {
                sink.lock().expect("lock").push(status.clone());
            }
        });

        hub.turn().emit(&DocumentEvent::FetchStatusChanged(FetchStatus::Fetching));
        assert!(hub.unsubscribe(id));
        assert!(!hub.unsubscribe(id));
        hub.turn().emit(&DocumentEvent::FetchStatusChanged(FetchStatus::Idle));

        assert_eq!(*seen.lock().expect("lock"), vec![FetchStatus::Fetching]);
    }
}
