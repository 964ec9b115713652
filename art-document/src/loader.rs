//! Background image loading.
//!
//! The loader turns a [`Background`] descriptor into a displayable image and
//! reports progress through [`FetchStatus`]:
//!
//! ```text
//! Blank            -> Idle      (image cleared)
//! EmbeddedBytes(d) -> Idle      (decoded synchronously, no image on failure)
//! RemoteUrl(u)     -> Fetching  -> Idle       (image published)
//!                               -> Failed(u)  (no image)
//! ```
//!
//! At most one fetch is in flight. Every [`BackgroundLoader::resolve`] bumps
//! a generation counter and aborts the previous fetch task; a fetch that
//! still manages to complete compares its generation under the state lock
//! and is discarded if a newer descriptor has been issued since.

use std::sync::{Arc, Mutex, MutexGuard, PoisonError};

use art_core::{Background, FetchStatus};
use tokio::runtime::Handle;
use tokio::sync::watch;
use tokio::task::JoinHandle;
use url::Url;

use crate::error::FetchError;
use crate::events::{DocumentEvent, EventHub};
use crate::fetcher::ImageFetcher;
use crate::image::{decode_image, BackgroundImage};

#[derive(Debug, Default)]
struct LoaderState {
    generation: u64,
    image: Option<Arc<BackgroundImage>>,
    /// URL of the fetch in flight, if any.
    pending: Option<Url>,
}

#[derive(Debug)]
struct Shared {
    state: Mutex<LoaderState>,
    status: watch::Sender<FetchStatus>,
    events: Arc<EventHub>,
}

impl Shared {
    fn lock_state(&self) -> MutexGuard<'_, LoaderState> {
        self.state.lock().unwrap_or_else(PoisonError::into_inner)
    }

    /// Install a new image and status, returning the events to emit.
    fn publish(
        &self,
        state: &mut LoaderState,
        image: Option<Arc<BackgroundImage>>,
        status: FetchStatus,
    ) -> Vec<DocumentEvent> {
        let mut events = Vec::new();

        let image_changed = match (&state.image, &image) {
            (None, None) => false,
            (Some(old), Some(new)) => !Arc::ptr_eq(old, new),
            _ => true,
        };
        if image_changed {
            state.image = image;
            events.push(DocumentEvent::ImageChanged(state.image.clone()));
        }

        let status_changed = self.status.send_if_modified(|current| {
            if *current == status {
                false
            } else {
                *current = status.clone();
                true
            }
        });
        if status_changed {
            tracing::debug!(generation = state.generation, status = %status, "Fetch status changed");
            events.push(DocumentEvent::FetchStatusChanged(status));
        }

        events
    }

    /// Apply the outcome of the fetch issued for `generation`.
    fn complete(
        &self,
        generation: u64,
        url: &Url,
        outcome: Result<BackgroundImage, FetchError>,
    ) {
        let turn = self.events.turn();
        let mut state = self.lock_state();
        if state.generation != generation {
            tracing::debug!(
                %url,
                generation,
                current = state.generation,
                "Discarding superseded background fetch"
            );
            return;
        }
        state.pending = None;

        let events = match outcome {
            Ok(image) => {
                tracing::info!(
                    %url,
                    width = image.width,
                    height = image.height,
                    "Background image loaded"
                );
                self.publish(&mut state, Some(Arc::new(image)), FetchStatus::Idle)
            }
            Err(err) => {
                tracing::warn!(%url, error = %err, "Background image fetch failed");
                self.publish(&mut state, None, FetchStatus::Failed(url.clone()))
            }
        };
        drop(state);

        for event in &events {
            turn.emit(event);
        }
    }
}

/// Resolves background descriptors into images on a Tokio runtime.
pub struct BackgroundLoader {
    fetcher: Arc<dyn ImageFetcher>,
    runtime: Handle,
    shared: Arc<Shared>,
    in_flight: Option<JoinHandle<()>>,
}

impl std::fmt::Debug for BackgroundLoader {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("BackgroundLoader")
            .field("status", &self.status())
            .field("in_flight", &self.in_flight.is_some())
            .finish_non_exhaustive()
    }
}

impl BackgroundLoader {
    /// Create an idle loader that spawns fetches on `runtime` and reports
    /// changes through `events`.
    #[must_use]
    pub fn new(fetcher: Arc<dyn ImageFetcher>, runtime: Handle, events: Arc<EventHub>) -> Self {
        let (status, _) = watch::channel(FetchStatus::Idle);
        Self {
            fetcher,
            runtime,
            shared: Arc::new(Shared {
                state: Mutex::new(LoaderState::default()),
                status,
                events,
            }),
            in_flight: None,
        }
    }

    /// Cancel the previous resolution and start resolving `background`.
    pub fn resolve(&mut self, background: &Background) {
        let turn = self.shared.events.turn();
        let mut state = self.shared.lock_state();
        state.generation += 1;
        let generation = state.generation;

        if let Some(handle) = self.in_flight.take() {
            if let Some(url) = state.pending.take() {
                tracing::debug!(%url, "Cancelling superseded background fetch");
            }
            handle.abort();
        }

        let events = match background {
            Background::Blank => self.shared.publish(&mut state, None, FetchStatus::Idle),
            Background::EmbeddedBytes(data) => {
                let image = match decode_image(data) {
                    Ok(image) => Some(Arc::new(image)),
                    Err(err) => {
                        tracing::warn!(bytes = data.len(), error = %err, "Embedded background is not a decodable image");
                        None
                    }
                };
                self.shared.publish(&mut state, image, FetchStatus::Idle)
            }
            Background::RemoteUrl(url) => {
                tracing::debug!(%url, generation, "Fetching background image");
                state.pending = Some(url.clone());
                let events = self.shared.publish(&mut state, None, FetchStatus::Fetching);
                self.in_flight = Some(self.spawn_fetch(generation, url.clone()));
                events
            }
        };
        drop(state);

        for event in &events {
            turn.emit(event);
        }
    }

    /// Abort the fetch in flight, if any, and report it as failed.
    ///
    /// Returns `false` if nothing was being fetched.
    pub fn cancel(&mut self) -> bool {
        let Some(handle) = self.in_flight.take() else {
            return false;
        };
        handle.abort();

        let turn = self.shared.events.turn();
        let mut state = self.shared.lock_state();
        let Some(url) = state.pending.take() else {
            // Already completed before we got the lock.
            return false;
        };
        state.generation += 1;
        tracing::info!(%url, "Background fetch cancelled");
        let events = self
            .shared
            .publish(&mut state, None, FetchStatus::Failed(url));
        drop(state);

        for event in &events {
            turn.emit(event);
        }
        true
    }

    fn spawn_fetch(&self, generation: u64, url: Url) -> JoinHandle<()> {
        let fetcher = Arc::clone(&self.fetcher);
        let shared = Arc::clone(&self.shared);
        self.runtime.spawn(async move {
            let outcome = match fetcher.fetch(&url).await {
                Ok(bytes) => tokio::task::spawn_blocking(move || decode_image(&bytes))
                    .await
                    .unwrap_or_else(|join| {
                        if join.is_cancelled() {
                            Err(FetchError::Cancelled)
                        } else {
                            Err(FetchError::Decode(join.to_string()))
                        }
                    }),
                Err(err) => Err(err),
            };
            shared.complete(generation, &url, outcome);
        })
    }

    /// Current fetch status.
    #[must_use]
    pub fn status(&self) -> FetchStatus {
        self.shared.status.borrow().clone()
    }

    /// Currently displayed background image.
    #[must_use]
    pub fn image(&self) -> Option<Arc<BackgroundImage>> {
        self.shared.lock_state().image.clone()
    }

    /// Watch the fetch status.
    #[must_use]
    pub fn watch_status(&self) -> watch::Receiver<FetchStatus> {
        self.shared.status.subscribe()
    }

    /// Wait until no fetch is in flight and return the settled status.
    pub async fn wait_until_settled(&self) -> FetchStatus {
        let mut status = self.watch_status();
        let settled = status
            .wait_for(|s| !s.is_fetching())
            .await
            .map(|s| s.clone());
        // The sender lives as long as `self`, so the channel cannot close here.
        settled.unwrap_or_else(|_| self.status())
    }
}

impl Drop for BackgroundLoader {
    fn drop(&mut self) {
        if let Some(handle) = self.in_flight.take() {
            handle.abort();
        }
    }
}
