//! Application-wide selection bus.
//!
//! DESIGN
//! ======
//! One bus per hosting session, created by the session and handed to each
//! component at construction. It carries a single payload shape,
//! [`SelectionMessage`], to every subscriber in registration order.
//!
//! DISPATCH
//! ========
//! `publish` snapshots the subscriber list and queues `(message, snapshot)`.
//! Whoever finds the bus idle drains the queue; a publish made while a
//! dispatch is running (from a handler, or another thread) only enqueues.
//! This keeps per-subscriber publish order even for nested publishes.
//!
//! The lock is never held while a handler runs, so handlers may subscribe,
//! unsubscribe, or publish. Each entry carries an `active` flag checked just
//! before invocation: a subscriber removed mid-dispatch is skipped, and a
//! subscriber added mid-dispatch is not part of the in-flight snapshot.
//!
//! ERROR HANDLING
//! ==============
//! A handler returning `Err` or panicking is logged and skipped; delivery
//! continues with the next subscriber.

use std::collections::VecDeque;
use std::panic::{AssertUnwindSafe, catch_unwind};
use std::sync::atomic::{AtomicBool, AtomicU64, Ordering};
use std::sync::{Arc, Mutex, MutexGuard, PoisonError, Weak};

use tracing::{debug, warn};

use crate::error::ErrorCode;
use crate::state::SelectionMessage;

// =============================================================================
// TYPES
// =============================================================================

/// Failure reported by a subscriber. Never reaches the publisher.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("selection handler failed: {0}")]
pub struct HandlerError(pub String);

impl ErrorCode for HandlerError {
    fn error_code(&self) -> &'static str {
        "E_HANDLER"
    }
}

pub type HandlerResult = Result<(), HandlerError>;

type Handler = dyn Fn(&SelectionMessage) -> HandlerResult + Send + Sync;

struct Entry {
    id: u64,
    active: AtomicBool,
    handler: Box<Handler>,
}

type Snapshot = Vec<Arc<Entry>>;

#[derive(Default)]
struct BusState {
    entries: Vec<Arc<Entry>>,
    queue: VecDeque<(SelectionMessage, Snapshot)>,
    dispatching: bool,
}

#[derive(Default)]
struct BusInner {
    state: Mutex<BusState>,
    next_id: AtomicU64,
}

impl BusInner {
    fn lock(&self) -> MutexGuard<'_, BusState> {
        self.state.lock().unwrap_or_else(PoisonError::into_inner)
    }
}

// =============================================================================
// BUS
// =============================================================================

/// Cloneable handle to one session's selection bus.
#[derive(Clone, Default)]
pub struct SelectionBus {
    inner: Arc<BusInner>,
}

impl SelectionBus {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Register `handler` for every message published from now on.
    ///
    /// The returned [`Subscription`] unsubscribes when dropped.
    #[must_use = "dropping the subscription unsubscribes immediately"]
    pub fn subscribe<F>(&self, handler: F) -> Subscription
    where
        F: Fn(&SelectionMessage) -> HandlerResult + Send + Sync + 'static,
    {
        let id = self.inner.next_id.fetch_add(1, Ordering::Relaxed);
        let entry = Arc::new(Entry { id, active: AtomicBool::new(true), handler: Box::new(handler) });

        let count = {
            let mut state = self.inner.lock();
            state.entries.push(Arc::clone(&entry));
            state.entries.len()
        };
        debug!(subscriber = id, count, "bus: subscribed");

        Subscription { entry, bus: Arc::downgrade(&self.inner) }
    }

    /// Deliver `message` to every subscriber registered right now.
    pub fn publish(&self, message: SelectionMessage) {
        {
            let mut state = self.inner.lock();
            let snapshot = state.entries.clone();
            debug!(record_id = %message.record_id(), subscribers = snapshot.len(), "bus: publish");
            state.queue.push_back((message, snapshot));
            if state.dispatching {
                return;
            }
            state.dispatching = true;
        }

        loop {
            let next = {
                let mut state = self.inner.lock();
                let Some(next) = state.queue.pop_front() else {
                    state.dispatching = false;
                    break;
                };
                next
            };
            deliver(&next.0, &next.1);
        }
    }

    /// Number of live subscriptions.
    #[must_use]
    pub fn subscriber_count(&self) -> usize {
        self.inner.lock().entries.len()
    }
}

fn deliver(message: &SelectionMessage, snapshot: &[Arc<Entry>]) {
    for entry in snapshot {
        if !entry.active.load(Ordering::Acquire) {
            continue;
        }
        match catch_unwind(AssertUnwindSafe(|| (entry.handler)(message))) {
            Ok(Ok(())) => {}
            Ok(Err(e)) => {
                warn!(subscriber = entry.id, error = %e, code = e.error_code(), "bus: handler failed");
            }
            Err(_) => {
                warn!(subscriber = entry.id, record_id = %message.record_id(), "bus: handler panicked");
            }
        }
    }
}

// =============================================================================
// SUBSCRIPTION
// =============================================================================

/// Owned registration on a [`SelectionBus`].
pub struct Subscription {
    entry: Arc<Entry>,
    bus: Weak<BusInner>,
}

impl Subscription {
    /// Remove the handler. Safe to call any number of times, including from
    /// inside a handler.
    pub fn unsubscribe(&self) {
        if !self.entry.active.swap(false, Ordering::AcqRel) {
            return;
        }
        let Some(bus) = self.bus.upgrade() else {
            return;
        };
        let mut state = bus.lock();
        state.entries.retain(|e| e.id != self.entry.id);
        debug!(subscriber = self.entry.id, count = state.entries.len(), "bus: unsubscribed");
    }

    #[must_use]
    pub fn is_active(&self) -> bool {
        self.entry.active.load(Ordering::Acquire)
    }
}

impl Drop for Subscription {
    fn drop(&mut self) {
        self.unsubscribe();
    }
}

impl std::fmt::Debug for Subscription {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Subscription")
            .field("id", &self.entry.id)
            .field("active", &self.is_active())
            .finish()
    }
}

#[cfg(test)]
#[path = "bus_test.rs"]
mod tests;
