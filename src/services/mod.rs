//! Capability interfaces consumed by the views.
//!
//! ARCHITECTURE
//! ============
//! Views never talk to a backend, a toast layer, or a router directly. They
//! hold `Arc<dyn ...>` handles to the traits below, bundled in
//! [`Capabilities`] and injected at construction. The adapters in `memory`
//! and `notify` back the demo binary; tests swap in recorders and gated fakes.

pub mod memory;
pub mod notify;

use std::sync::Arc;

use crate::error::ErrorCode;
use crate::state::{NewReview, PartialVessel, Vessel, VesselReview};

// =============================================================================
// ERROR
// =============================================================================

/// Failure reported by the backend RPC surface. Carries a human-readable
/// message that views surface verbatim in notifications.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ServiceError {
    /// The backend refused the request (validation, constraint, etc.).
    #[error("{0}")]
    Rejected(String),

    /// No record with the requested id.
    #[error("record not found: {0}")]
    NotFound(String),

    /// Transport or availability failure.
    #[error("service unavailable: {0}")]
    Unavailable(String),
}

impl ErrorCode for ServiceError {
    fn error_code(&self) -> &'static str {
        match self {
            Self::Rejected(_) => "E_REJECTED",
            Self::NotFound(_) => "E_NOT_FOUND",
            Self::Unavailable(_) => "E_UNAVAILABLE",
        }
    }

    fn retryable(&self) -> bool {
        matches!(self, Self::Unavailable(_))
    }
}

// =============================================================================
// BACKEND
// =============================================================================

/// Backend data-access surface for vessels and reviews.
#[async_trait::async_trait]
pub trait VesselService: Send + Sync {
    /// List vessels of the given type; an empty type id lists all vessels.
    async fn fetch_vessels(&self, boat_type_id: &str) -> Result<Vec<Vessel>, ServiceError>;

    /// Apply a batch of inline edits as one commit.
    async fn commit_vessel_edits(&self, edits: &[PartialVessel]) -> Result<(), ServiceError>;

    /// List every review whose parent is `boat_id`.
    async fn fetch_reviews(&self, boat_id: &str) -> Result<Vec<VesselReview>, ServiceError>;

    /// Create a review from a field set and return the stored record.
    async fn create_review(&self, review: &NewReview) -> Result<VesselReview, ServiceError>;

    /// Load one full vessel record.
    async fn fetch_vessel_by_id(&self, id: &str) -> Result<Vessel, ServiceError>;
}

// =============================================================================
// NOTIFICATIONS
// =============================================================================

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ToastVariant {
    Success,
    Error,
}

/// A user-facing notification.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Toast {
    pub title: String,
    pub message: Option<String>,
    pub variant: ToastVariant,
}

impl Toast {
    #[must_use]
    pub fn success(title: &str, message: Option<&str>) -> Self {
        Self { title: title.to_string(), message: message.map(str::to_string), variant: ToastVariant::Success }
    }

    #[must_use]
    pub fn error(title: &str, message: impl Into<String>) -> Self {
        Self { title: title.to_string(), message: Some(message.into()), variant: ToastVariant::Error }
    }
}

/// Toast presentation capability.
pub trait Notifier: Send + Sync {
    fn notify(&self, toast: Toast);
}

/// Record-page navigation capability.
pub trait Navigator: Send + Sync {
    fn navigate_to_record(&self, record_id: &str);
}

// =============================================================================
// CAPABILITY BUNDLE
// =============================================================================

/// Everything a view may call outside itself. Cheap to clone.
#[derive(Clone)]
pub struct Capabilities {
    pub service: Arc<dyn VesselService>,
    pub notifier: Arc<dyn Notifier>,
    pub navigator: Arc<dyn Navigator>,
}

impl Capabilities {
    #[must_use]
    pub fn new(service: Arc<dyn VesselService>, notifier: Arc<dyn Notifier>, navigator: Arc<dyn Navigator>) -> Self {
        Self { service, notifier, navigator }
    }
}
