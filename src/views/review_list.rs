//! Review list for one vessel.
//!
//! The parent sets the vessel id and may force a reload through
//! [`ReviewListView::refresh`]. A blank id never fetches. Fetch failures are
//! kept for inspection while the list itself renders empty; there is no
//! automatic retry.

use std::sync::Arc;

use futures::FutureExt;
use tokio::sync::watch;
use tracing::info;

use crate::host::LoadingSource;
use crate::load_state::{Fetcher, LoadState, Loader};
use crate::services::{Capabilities, Navigator, ServiceError};
use crate::state::{VesselReview, normalize_id};

struct Inner {
    loader: Loader<String, Vec<VesselReview>>,
    navigator: Arc<dyn Navigator>,
}

#[derive(Clone)]
pub struct ReviewListView {
    inner: Arc<Inner>,
}

impl ReviewListView {
    #[must_use]
    pub fn new(caps: &Capabilities, loading: Option<LoadingSource>) -> Self {
        let service = Arc::clone(&caps.service);
        let fetch: Fetcher<String, Vec<VesselReview>> = Arc::new(move |boat_id: String| {
            let service = Arc::clone(&service);
            async move { service.fetch_reviews(&boat_id).await }.boxed()
        });
        let inner = Inner { loader: Loader::new("reviews", fetch, loading), navigator: Arc::clone(&caps.navigator) };
        Self { inner: Arc::new(inner) }
    }

    /// Point the list at a vessel. Blank or absent ids clear the list
    /// without fetching.
    pub fn set_record_id(&self, record_id: Option<&str>) {
        let boat_id = normalize_id(record_id);
        info!(boat_id = boat_id.as_deref().unwrap_or(""), "reviews: record id set");
        self.inner.loader.set_identifier(boat_id);
    }

    #[must_use]
    pub fn record_id(&self) -> Option<String> {
        self.inner.loader.identifier()
    }

    /// Reload reviews for the current vessel even if nothing changed.
    pub fn refresh(&self) -> bool {
        self.inner.loader.refresh()
    }

    /// Loaded reviews, or an empty list in any other state.
    #[must_use]
    pub fn reviews(&self) -> Vec<VesselReview> {
        self.inner.loader.state().data().cloned().unwrap_or_default()
    }

    #[must_use]
    pub fn reviews_to_show(&self) -> bool {
        self.inner.loader.state().data().is_some_and(|reviews| !reviews.is_empty())
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
    pub fn state(&self) -> LoadState<Vec<VesselReview>> {
        self.inner.loader.state()
    }

    #[must_use]
    pub fn watch(&self) -> watch::Receiver<LoadState<Vec<VesselReview>>> {
        self.inner.loader.watch()
    }

    pub async fn settled(&self) -> LoadState<Vec<VesselReview>> {
        self.inner.loader.settled().await
    }

    /// Open the record page of one review.
    pub fn navigate_to_record(&self, review_id: &str) {
        self.inner.navigator.navigate_to_record(review_id);
    }
}

#[cfg(test)]
#[path = "review_list_test.rs"]
mod tests;
