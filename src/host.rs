//! Aggregate loading indicator for a containing view.
//!
//! DESIGN
//! ======
//! A host owns the spinner for several independent views. Each view holds a
//! [`LoadingSource`] and reports every entry into and exit from its busy
//! state. The host is loading while any source is loading, and tells its
//! listeners only about aggregate edges: [`HostEvent::Loading`] on the first
//! busy source, [`HostEvent::DoneLoading`] when the last one settles.

use std::collections::HashSet;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};

use tracing::debug;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum HostEvent {
    Loading,
    DoneLoading,
}

type Listener = Arc<dyn Fn(HostEvent) + Send + Sync>;

#[derive(Default)]
struct HostState {
    busy: HashSet<u64>,
    listeners: Vec<Listener>,
}

#[derive(Default)]
struct HostInner {
    state: Mutex<HostState>,
    next_source: AtomicU64,
}

/// Cloneable handle to one aggregate loading indicator.
#[derive(Clone, Default)]
pub struct LoadingHost {
    inner: Arc<HostInner>,
}

impl LoadingHost {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a new reporting source. The source starts idle.
    #[must_use]
    pub fn source(&self, name: &'static str) -> LoadingSource {
        let id = self.inner.next_source.fetch_add(1, Ordering::Relaxed);
        LoadingSource { id, name, host: self.clone() }
    }

    /// Call `listener` on every aggregate transition.
    pub fn on_change<F>(&self, listener: F)
    where
        F: Fn(HostEvent) + Send + Sync + 'static,
    {
        self.lock().listeners.push(Arc::new(listener));
    }

    #[must_use]
    pub fn is_loading(&self) -> bool {
        !self.lock().busy.is_empty()
    }

    /// Number of sources currently loading.
    #[must_use]
    pub fn busy_count(&self) -> usize {
        self.lock().busy.len()
    }

    fn lock(&self) -> MutexGuard<'_, HostState> {
        self.inner.state.lock().unwrap_or_else(PoisonError::into_inner)
    }

    fn report(&self, id: u64, name: &'static str, loading: bool) {
        let (event, listeners) = {
            let mut state = self.lock();
            let was_loading = !state.busy.is_empty();
            if loading {
                state.busy.insert(id);
            } else {
                state.busy.remove(&id);
            }
            let now_loading = !state.busy.is_empty();
            if was_loading == now_loading {
                return;
            }
            let event = if now_loading { HostEvent::Loading } else { HostEvent::DoneLoading };
            (event, state.listeners.clone())
        };

        debug!(source = name, ?event, "host: loading changed");
        for listener in &listeners {
            listener(event);
        }
    }
}

/// One view's line into a [`LoadingHost`]. Dropping it clears its flag.
pub struct LoadingSource {
    id: u64,
    name: &'static str,
    host: LoadingHost,
}

impl LoadingSource {
    pub fn set(&self, loading: bool) {
        self.host.report(self.id, self.name, loading);
    }

    #[must_use]
    pub fn name(&self) -> &'static str {
        self.name
    }
}

impl Drop for LoadingSource {
    fn drop(&mut self) {
        self.set(false);
    }
}

impl std::fmt::Debug for LoadingSource {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("LoadingSource").field("id", &self.id).field("name", &self.name).finish()
    }
}

#[cfg(test)]
#[path = "host_test.rs"]
mod tests;
