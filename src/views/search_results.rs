//! Filtered vessel grid.
//!
//! DESIGN
//! ======
//! The grid is keyed by a vessel type id; an empty id lists every type. A new
//! filter moves the loader to `Loading` on the same call, so the host's
//! spinner turns on before the backend answers.
//!
//! Row selection is published on the [`SelectionBus`]; the grid keeps no link
//! to whoever listens.
//!
//! COMMIT WORKFLOW
//! ===============
//! Inline edits are committed as one batch. Success or failure, the grid
//! refreshes afterwards to pick up server-derived values. Every commit call
//! registers its own [`LoadingSource`](crate::host::LoadingSource) with the host and holds it until the
//! refresh has been issued, so the host never reports "done" between a
//! commit and its reload. Overlapping commits each keep the host busy, and a
//! dropped commit future releases its source on drop.

use std::sync::{Arc, Mutex, MutexGuard, PoisonError};

use futures::FutureExt;
use tokio::sync::watch;
use tracing::{debug, info, warn};

use crate::bus::SelectionBus;
use crate::error::ErrorCode;
use crate::host::LoadingHost;
use crate::load_state::{Fetcher, LoadState, Loader};
use crate::services::{Capabilities, Notifier, ServiceError, Toast, VesselService};
use crate::state::{MessageError, PartialVessel, SelectionMessage, Vessel};

pub const COMMIT_SUCCESS_TITLE: &str = "Success";
pub const COMMIT_SUCCESS_MESSAGE: &str = "Ship it!";
pub const COMMIT_ERROR_TITLE: &str = "Error";

#[derive(Default)]
struct Local {
    selected: Option<String>,
    drafts: Vec<PartialVessel>,
}

struct Inner {
    loader: Loader<String, Vec<Vessel>>,
    service: Arc<dyn VesselService>,
    notifier: Arc<dyn Notifier>,
    bus: SelectionBus,
    host: LoadingHost,
    local: Mutex<Local>,
}

#[derive(Clone)]
pub struct SearchResultsView {
    inner: Arc<Inner>,
}

impl SearchResultsView {
    #[must_use]
    pub fn new(caps: &Capabilities, bus: SelectionBus, host: &LoadingHost) -> Self {
        let service = Arc::clone(&caps.service);
        let fetch: Fetcher<String, Vec<Vessel>> = Arc::new(move |boat_type_id: String| {
            let service = Arc::clone(&service);
            async move { service.fetch_vessels(&boat_type_id).await }.boxed()
        });
        let inner = Inner {
            loader: Loader::new("search_results", fetch, Some(host.source("search_results"))),
            service: Arc::clone(&caps.service),
            notifier: Arc::clone(&caps.notifier),
            bus,
            host: host.clone(),
            local: Mutex::new(Local::default()),
        };
        Self { inner: Arc::new(inner) }
    }

    fn local(&self) -> MutexGuard<'_, Local> {
        self.inner.local.lock().unwrap_or_else(PoisonError::into_inner)
    }

    // =========================================================================
    // SEARCH
    // =========================================================================

    /// Run the search for `boat_type_id`. Blank means every type.
    pub fn search(&self, boat_type_id: &str) {
        let boat_type_id = boat_type_id.trim().to_string();
        info!(boat_type_id = %boat_type_id, "search: filter changed");
        self.inner.loader.set_identifier(Some(boat_type_id));
    }

    /// Re-run the current search, or search every type if none ran yet.
    pub fn refresh(&self) {
        if !self.inner.loader.refresh() {
            self.inner.loader.set_identifier(Some(String::new()));
        }
    }

    #[must_use]
    pub fn boat_type_id(&self) -> String {
        self.inner.loader.identifier().unwrap_or_default()
    }

    #[must_use]
    pub fn vessels(&self) -> Vec<Vessel> {
        self.inner.loader.state().data().cloned().unwrap_or_default()
    }

    #[must_use]
    pub fn error(&self) -> Option<ServiceError> {
        self.inner.loader.state().error().cloned()
    }

    #[must_use]
    pub fn is_loading(&self) -> bool {
        self.inner.loader.is_loading()
    }

    #[must_use]
    pub fn state(&self) -> LoadState<Vec<Vessel>> {
        self.inner.loader.state()
    }

    #[must_use]
    pub fn watch(&self) -> watch::Receiver<LoadState<Vec<Vessel>>> {
        self.inner.loader.watch()
    }

    pub async fn settled(&self) -> LoadState<Vec<Vessel>> {
        self.inner.loader.settled().await
    }

    // =========================================================================
    // SELECTION
    // =========================================================================

    /// Select a row and broadcast its id.
    ///
    /// # Errors
    ///
    /// Returns [`MessageError::EmptyRecordId`] for a blank id; nothing is
    /// published and the previous selection stays.
    pub fn select(&self, row_id: &str) -> Result<(), MessageError> {
        let message = SelectionMessage::new(row_id)?;
        self.local().selected = Some(message.record_id().to_string());
        info!(record_id = %message.record_id(), "search: row selected");
        self.inner.bus.publish(message);
        Ok(())
    }

    #[must_use]
    pub fn selected_id(&self) -> Option<String> {
        self.local().selected.clone()
    }

    // =========================================================================
    // INLINE EDITS
    // =========================================================================

    /// Buffer an edit. Drafts for the same row merge, later values winning.
    pub fn stage_edit(&self, edit: PartialVessel) {
        if edit.is_empty() {
            return;
        }
        let mut local = self.local();
        match local.drafts.iter_mut().find(|d| d.id == edit.id) {
            Some(draft) => draft.merge(edit),
            None => local.drafts.push(edit),
        }
    }

    #[must_use]
    pub fn drafts(&self) -> Vec<PartialVessel> {
        self.local().drafts.clone()
    }

    /// Commit every buffered draft.
    ///
    /// # Errors
    ///
    /// Same as [`SearchResultsView::commit_edits`].
    pub async fn save_drafts(&self) -> Result<(), ServiceError> {
        let drafts = self.drafts();
        self.commit_edits(drafts).await
    }

    /// Commit `edits` as one batch, notify, then refresh the grid.
    ///
    /// An empty batch does nothing. On success the committed rows leave the
    /// draft buffer.
    ///
    /// # Errors
    ///
    /// Returns the backend's error after the error toast has been shown and
    /// the refresh issued.
    pub async fn commit_edits(&self, edits: Vec<PartialVessel>) -> Result<(), ServiceError> {
        if edits.is_empty() {
            debug!("search: empty commit ignored");
            return Ok(());
        }

        let busy = self.inner.host.source("search_results.commit");
        busy.set(true);
        info!(rows = edits.len(), "search: committing edits");
        let result = self.inner.service.commit_vessel_edits(&edits).await;

        match &result {
            Ok(()) => {
                self.inner.notifier.notify(Toast::success(COMMIT_SUCCESS_TITLE, Some(COMMIT_SUCCESS_MESSAGE)));
                self.local().drafts.retain(|d| !edits.iter().any(|e| e.id == d.id));
            }
            Err(e) => {
                warn!(
                    error = %e,
                    code = e.error_code(),
                    retryable = e.retryable(),
                    rows = edits.len(),
                    "search: commit failed"
                );
                self.inner.notifier.notify(Toast::error(COMMIT_ERROR_TITLE, e.to_string()));
            }
        }

        self.refresh();
        drop(busy);
        result
    }
}

#[cfg(test)]
#[path = "search_results_test.rs"]
mod tests;
