//! View-state components.
//!
//! ARCHITECTURE
//! ============
//! Each view is a cheap cloneable handle over `Arc`-owned state. Views own
//! their own [`Loader`](crate::load_state::Loader) and mutate it only from
//! their own methods and fetch completions. Cross-view traffic goes through
//! exactly two channels: the [`SelectionBus`](crate::bus::SelectionBus) for
//! unrelated views, and explicit handles held by a parent for its children.

pub mod detail;
pub mod review_form;
pub mod review_list;
pub mod search_results;

pub use detail::{DetailTab, DetailView};
pub use review_form::ReviewSubmissionForm;
pub use review_list::ReviewListView;
pub use search_results::SearchResultsView;
