//! Per-view async fetch state machine.
//!
//! DESIGN
//! ======
//! A [`Loader`] tracks `Idle -> Loading -> Loaded | Failed` for one view.
//! Changing the identifier (or calling `refresh`) moves to `Loading` at once
//! and spawns the fetch on the tokio runtime, so the caller keeps handling
//! events while the request is outstanding.
//!
//! STALE RESPONSES
//! ===============
//! There is no network-level cancellation. Every issued request gets a
//! sequence number; a completion is applied only if its number is still the
//! latest AND its identifier is still current. Anything else is dropped on
//! arrival, so an old response can never overwrite fresher state. This also
//! covers a `refresh` racing an earlier fetch for the same identifier.
//!
//! OBSERVATION
//! ===========
//! Each transition is published on a `watch` channel. Entry into and exit
//! from `Loading` is also reported to an optional [`LoadingSource`]. Reports
//! are serialized and read the state at report time, so when a caller and a
//! fetch task transition concurrently the last report always matches the
//! latest state.

use std::fmt;
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};

use futures::future::BoxFuture;
use tokio::sync::watch;
use tracing::{debug, warn};

use crate::error::ErrorCode;
use crate::host::LoadingSource;
use crate::services::ServiceError;

// =============================================================================
// STATE
// =============================================================================

#[derive(Debug, Clone, Default, PartialEq)]
pub enum LoadState<T> {
    #[default]
    Idle,
    Loading,
    Loaded(T),
    Failed(ServiceError),
}

impl<T> LoadState<T> {
    #[must_use]
    pub fn is_idle(&self) -> bool {
        matches!(self, Self::Idle)
    }

    #[must_use]
    pub fn is_loading(&self) -> bool {
        matches!(self, Self::Loading)
    }

    #[must_use]
    pub fn is_loaded(&self) -> bool {
        matches!(self, Self::Loaded(_))
    }

    #[must_use]
    pub fn is_failed(&self) -> bool {
        matches!(self, Self::Failed(_))
    }

    #[must_use]
    pub fn data(&self) -> Option<&T> {
        match self {
            Self::Loaded(data) => Some(data),
            _ => None,
        }
    }

    #[must_use]
    pub fn error(&self) -> Option<&ServiceError> {
        match self {
            Self::Failed(error) => Some(error),
            _ => None,
        }
    }
}

// =============================================================================
// LOADER
// =============================================================================

/// Produces the fetch future for an identifier.
pub type Fetcher<K, T> = Arc<dyn Fn(K) -> BoxFuture<'static, Result<T, ServiceError>> + Send + Sync>;

struct Slot<K, T> {
    identifier: Option<K>,
    request: u64,
    state: LoadState<T>,
}

struct Shared<K, T> {
    name: &'static str,
    slot: Mutex<Slot<K, T>>,
    fetch: Fetcher<K, T>,
    tx: watch::Sender<LoadState<T>>,
    loading: Option<LoadingSource>,
    report: Mutex<()>,
}

/// Cloneable handle to one view's load state machine.
pub struct Loader<K, T> {
    shared: Arc<Shared<K, T>>,
}

impl<K, T> Clone for Loader<K, T> {
    fn clone(&self) -> Self {
        Self { shared: Arc::clone(&self.shared) }
    }
}

impl<K, T> Loader<K, T>
where
    K: Clone + PartialEq + fmt::Display + Send + Sync + 'static,
    T: Clone + Send + Sync + 'static,
{
    /// Build an idle loader. `name` tags log lines.
    #[must_use]
    pub fn new(name: &'static str, fetch: Fetcher<K, T>, loading: Option<LoadingSource>) -> Self {
        let (tx, _rx) = watch::channel(LoadState::Idle);
        let slot = Mutex::new(Slot { identifier: None, request: 0, state: LoadState::Idle });
        Self { shared: Arc::new(Shared { name, slot, fetch, tx, loading, report: Mutex::new(()) }) }
    }

    /// Adopt a new identifier. `None` returns to `Idle` and orphans any
    /// in-flight request; `Some` starts a fetch immediately.
    pub fn set_identifier(&self, identifier: Option<K>) {
        let slot = self.shared.lock();
        match identifier {
            Some(identifier) => self.start(slot, identifier),
            None => self.clear(slot),
        }
    }

    /// Re-issue the fetch for the current identifier. Returns `false` (and
    /// does nothing) while no identifier is set.
    pub fn refresh(&self) -> bool {
        let slot = self.shared.lock();
        let Some(identifier) = slot.identifier.clone() else {
            debug!(loader = self.shared.name, "load: refresh ignored, no identifier");
            return false;
        };
        self.start(slot, identifier);
        true
    }

    #[must_use]
    pub fn identifier(&self) -> Option<K> {
        self.shared.lock().identifier.clone()
    }

    #[must_use]
    pub fn state(&self) -> LoadState<T> {
        self.shared.lock().state.clone()
    }

    #[must_use]
    pub fn is_loading(&self) -> bool {
        self.shared.lock().state.is_loading()
    }

    /// Receiver that observes every transition.
    #[must_use]
    pub fn watch(&self) -> watch::Receiver<LoadState<T>> {
        self.shared.tx.subscribe()
    }

    /// Wait until the state is anything but `Loading` and return it.
    pub async fn settled(&self) -> LoadState<T> {
        let mut rx = self.watch();
        match rx.wait_for(|state| !state.is_loading()).await {
            Ok(state) => state.clone(),
            Err(_) => self.state(),
        }
    }

    fn start(&self, mut slot: MutexGuard<'_, Slot<K, T>>, identifier: K) {
        slot.request += 1;
        let request = slot.request;
        slot.identifier = Some(identifier.clone());
        self.shared.transition(&mut slot, LoadState::Loading);
        drop(slot);

        self.shared.sync_loading();
        debug!(loader = self.shared.name, %identifier, request, "load: fetch issued");

        let fut = (self.shared.fetch)(identifier.clone());
        let shared = Arc::clone(&self.shared);
        tokio::spawn(async move {
            let result = fut.await;
            shared.complete(request, &identifier, result);
        });
    }

    fn clear(&self, mut slot: MutexGuard<'_, Slot<K, T>>) {
        slot.request += 1;
        slot.identifier = None;
        self.shared.transition(&mut slot, LoadState::Idle);
        drop(slot);

        self.shared.sync_loading();
        debug!(loader = self.shared.name, "load: identifier cleared");
    }
}

impl<K, T> Shared<K, T>
where
    K: PartialEq + fmt::Display,
    T: Clone,
{
    fn lock(&self) -> MutexGuard<'_, Slot<K, T>> {
        self.slot.lock().unwrap_or_else(PoisonError::into_inner)
    }

    fn transition(&self, slot: &mut Slot<K, T>, next: LoadState<T>) {
        slot.state = next.clone();
        self.tx.send_replace(next);
    }

    /// Mirror the current state onto the loading source. The slot lock must
    /// not be held by the caller.
    fn sync_loading(&self) {
        let Some(source) = &self.loading else {
            return;
        };
        let _order = self.report.lock().unwrap_or_else(PoisonError::into_inner);
        let loading = self.lock().state.is_loading();
        source.set(loading);
    }

    fn complete(&self, request: u64, identifier: &K, result: Result<T, ServiceError>) {
        let mut slot = self.lock();
        if slot.request != request || slot.identifier.as_ref() != Some(identifier) {
            debug!(loader = self.name, %identifier, request, latest = slot.request, "load: discarding stale response");
            return;
        }

        let next = match result {
            Ok(data) => {
                debug!(loader = self.name, %identifier, request, "load: loaded");
                LoadState::Loaded(data)
            }
            Err(e) => {
                warn!(
                    loader = self.name,
                    %identifier,
                    error = %e,
                    code = e.error_code(),
                    retryable = e.retryable(),
                    "load: fetch failed"
                );
                LoadState::Failed(e)
            }
        };
        self.transition(&mut slot, next);
        drop(slot);
        self.sync_loading();
    }
}

#[cfg(test)]
#[path = "load_state_test.rs"]
mod tests;
