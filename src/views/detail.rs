//! Selected-vessel detail panel.
//!
//! DESIGN
//! ======
//! The panel subscribes to the [`SelectionBus`] when built and adopts every
//! published record id: its own loader fetches the vessel, and the review
//! list and review form it composed at construction get the same id through
//! the handles it holds.
//!
//! When the form reports a created review, the panel switches to the reviews
//! tab and refreshes the list once.
//!
//! LIFECYCLE
//! =========
//! The bus handler and the form listener capture only a `Weak` to the panel,
//! so the panel's lifetime is governed by its owner alone. Dropping the panel
//! (or calling [`DetailView::disconnect`]) releases the subscription; no
//! later publish reaches it.

use std::sync::{Arc, Mutex, MutexGuard, PoisonError, Weak};

use futures::FutureExt;
use tracing::{debug, info};

use crate::bus::{SelectionBus, Subscription};
use crate::error::ErrorCode;
use crate::host::LoadingHost;
use crate::load_state::{Fetcher, LoadState, Loader};
use crate::services::{Capabilities, Navigator};
use crate::state::{ReviewCreated, Vessel};
use crate::views::review_form::ReviewSubmissionForm;
use crate::views::review_list::ReviewListView;

pub const DETAILS_TAB_ICON: &str = "utility:anchor";

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum DetailTab {
    #[default]
    Details,
    Reviews,
    AddReview,
}

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum DetailError {
    #[error("no vessel selected")]
    NoSelection,
}

impl ErrorCode for DetailError {
    fn error_code(&self) -> &'static str {
        match self {
            Self::NoSelection => "E_NO_SELECTION",
        }
    }
}

struct Inner {
    loader: Loader<String, Vessel>,
    navigator: Arc<dyn Navigator>,
    reviews: ReviewListView,
    form: ReviewSubmissionForm,
    tab: Mutex<DetailTab>,
    subscription: Mutex<Option<Subscription>>,
}

impl Inner {
    fn adopt(&self, record_id: &str) {
        info!(%record_id, "detail: selection received");
        self.loader.set_identifier(Some(record_id.to_string()));
        self.reviews.set_record_id(Some(record_id));
        self.form.set_record_id(Some(record_id));
    }

    fn review_created(&self, event: &ReviewCreated) {
        info!(review_id = %event.review.id, boat_id = %event.review.boat_id, "detail: review created");
        *self.tab() = DetailTab::Reviews;
        self.reviews.refresh();
    }

    fn tab(&self) -> MutexGuard<'_, DetailTab> {
        self.tab.lock().unwrap_or_else(PoisonError::into_inner)
    }

    fn subscription(&self) -> MutexGuard<'_, Option<Subscription>> {
        self.subscription.lock().unwrap_or_else(PoisonError::into_inner)
    }
}

pub struct DetailView {
    inner: Arc<Inner>,
}

impl DetailView {
    /// Build the panel with its review list and form, and subscribe to `bus`.
    /// With a `host`, the panel and its review list report loading to it.
    #[must_use]
    pub fn new(bus: &SelectionBus, caps: &Capabilities, host: Option<&LoadingHost>) -> Self {
        let service = Arc::clone(&caps.service);
        let fetch: Fetcher<String, Vessel> = Arc::new(move |id: String| {
            let service = Arc::clone(&service);
            async move { service.fetch_vessel_by_id(&id).await }.boxed()
        });

        let inner = Arc::new_cyclic(|weak: &Weak<Inner>| {
            let handler_ref = weak.clone();
            let subscription = bus.subscribe(move |message| {
                if let Some(inner) = handler_ref.upgrade() {
                    inner.adopt(message.record_id());
                }
                Ok(())
            });

            let form = ReviewSubmissionForm::new(caps);
            let listener_ref = weak.clone();
            form.on_review_created(move |event| {
                if let Some(inner) = listener_ref.upgrade() {
                    inner.review_created(event);
                }
            });

            Inner {
                loader: Loader::new("detail", fetch, host.map(|h| h.source("detail"))),
                navigator: Arc::clone(&caps.navigator),
                reviews: ReviewListView::new(caps, host.map(|h| h.source("detail.reviews"))),
                form,
                tab: Mutex::new(DetailTab::default()),
                subscription: Mutex::new(Some(subscription)),
            }
        });
        debug!("detail: subscribed to selection bus");
        Self { inner }
    }

    #[must_use]
    pub fn record_id(&self) -> Option<String> {
        self.inner.loader.identifier()
    }

    #[must_use]
    pub fn state(&self) -> LoadState<Vessel> {
        self.inner.loader.state()
    }

    #[must_use]
    pub fn vessel(&self) -> Option<Vessel> {
        self.inner.loader.state().data().cloned()
    }

    /// True once the selected vessel has loaded.
    #[must_use]
    pub fn has_record(&self) -> bool {
        self.inner.loader.state().is_loaded()
    }

    /// Loaded vessel name, empty otherwise.
    #[must_use]
    pub fn boat_name(&self) -> String {
        self.vessel().map(|v| v.name).unwrap_or_default()
    }

    #[must_use]
    pub fn details_tab_icon(&self) -> Option<&'static str> {
        self.has_record().then_some(DETAILS_TAB_ICON)
    }

    #[must_use]
    pub fn active_tab(&self) -> DetailTab {
        *self.inner.tab()
    }

    pub fn set_active_tab(&self, tab: DetailTab) {
        *self.inner.tab() = tab;
    }

    #[must_use]
    pub fn reviews(&self) -> &ReviewListView {
        &self.inner.reviews
    }

    #[must_use]
    pub fn form(&self) -> &ReviewSubmissionForm {
        &self.inner.form
    }

    /// Open the full record page of the selected vessel.
    ///
    /// # Errors
    ///
    /// Returns [`DetailError::NoSelection`] before any selection arrived.
    pub fn navigate_to_record_view_page(&self) -> Result<(), DetailError> {
        let record_id = self.record_id().ok_or(DetailError::NoSelection)?;
        self.inner.navigator.navigate_to_record(&record_id);
        Ok(())
    }

    /// Release the bus subscription. Idempotent.
    pub fn disconnect(&self) {
        if let Some(subscription) = self.inner.subscription().take() {
            subscription.unsubscribe();
            debug!("detail: disconnected from selection bus");
        }
    }

    #[must_use]
    pub fn is_connected(&self) -> bool {
        self.inner.subscription().as_ref().is_some_and(Subscription::is_active)
    }

    /// Wait for the vessel fetch to settle.
    pub async fn settled(&self) -> LoadState<Vessel> {
        self.inner.loader.settled().await
    }
}

#[cfg(test)]
#[path = "detail_test.rs"]
mod tests;
