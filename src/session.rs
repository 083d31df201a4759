//! One page session: the bus, the spinner host, and the views wired to both.
//!
//! Each session builds its own [`SelectionBus`], so two sessions never see
//! each other's selections.

use crate::bus::SelectionBus;
use crate::host::LoadingHost;
use crate::services::Capabilities;
use crate::views::{DetailView, SearchResultsView};

pub struct Session {
    bus: SelectionBus,
    host: LoadingHost,
    search: SearchResultsView,
    detail: DetailView,
}

impl Session {
    #[must_use]
    pub fn new(caps: &Capabilities) -> Self {
        let bus = SelectionBus::new();
        let host = LoadingHost::new();
        let search = SearchResultsView::new(caps, bus.clone(), &host);
        let detail = DetailView::new(&bus, caps, Some(&host));
        tracing::info!(subscribers = bus.subscriber_count(), "session: ready");
        Self { bus, host, search, detail }
    }

    #[must_use]
    pub fn bus(&self) -> &SelectionBus {
        &self.bus
    }

    #[must_use]
    pub fn host(&self) -> &LoadingHost {
        &self.host
    }

    #[must_use]
    pub fn search(&self) -> &SearchResultsView {
        &self.search
    }

    #[must_use]
    pub fn detail(&self) -> &DetailView {
        &self.detail
    }
}

#[cfg(test)]
#[path = "session_test.rs"]
mod tests;
