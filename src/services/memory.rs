//! In-memory backend used by the demo binary.
//!
//! DESIGN
//! ======
//! Holds vessels and reviews behind one `Mutex`. Edit commits validate the
//! whole batch before applying any of it, so a rejected commit leaves the
//! store untouched. Seeds load from JSON:
//! `{"vessels": [...], "reviews": [...]}`.

use std::path::Path;
use std::sync::{Mutex, PoisonError};

use serde::Deserialize;
use tracing::info;
use uuid::Uuid;

use super::{ServiceError, VesselService};
use crate::error::ErrorCode;
use crate::state::{COMMENT_FIELD, NAME_FIELD, NewReview, PartialVessel, Vessel, VesselReview};

/// Longest accepted vessel name on commit.
pub const MAX_NAME_LEN: usize = 80;

#[derive(Debug, thiserror::Error)]
pub enum SeedError {
    #[error("failed to read seed file: {0}")]
    Io(#[from] std::io::Error),
    #[error("failed to parse seed file: {0}")]
    Parse(#[from] serde_json::Error),
}

impl ErrorCode for SeedError {
    fn error_code(&self) -> &'static str {
        match self {
            Self::Io(_) => "E_SEED_IO",
            Self::Parse(_) => "E_SEED_PARSE",
        }
    }
}

/// Initial contents of the store.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct Seed {
    pub vessels: Vec<Vessel>,
    #[serde(default)]
    pub reviews: Vec<VesselReview>,
}

pub struct MemoryVesselService {
    store: Mutex<Seed>,
}

impl MemoryVesselService {
    #[must_use]
    pub fn new(seed: Seed) -> Self {
        Self { store: Mutex::new(seed) }
    }

    /// Parse a JSON seed.
    ///
    /// # Errors
    ///
    /// Returns [`SeedError::Parse`] if the JSON does not match [`Seed`].
    pub fn from_json(json: &str) -> Result<Self, SeedError> {
        let seed: Seed = serde_json::from_str(json)?;
        info!(vessels = seed.vessels.len(), reviews = seed.reviews.len(), "memory: seed loaded");
        Ok(Self::new(seed))
    }

    /// Read and parse a JSON seed file.
    ///
    /// # Errors
    ///
    /// Returns [`SeedError::Io`] if the file cannot be read, or
    /// [`SeedError::Parse`] if its contents are not a valid seed.
    pub fn from_seed_file(path: &Path) -> Result<Self, SeedError> {
        let json = std::fs::read_to_string(path)?;
        Self::from_json(&json)
    }

    /// A small built-in fleet for demos.
    #[must_use]
    pub fn with_sample_fleet() -> Self {
        let vessel = |id: &str, name: &str, boat_type: &str, length: f64, price: f64, description: &str| Vessel {
            id: id.into(),
            name: name.into(),
            boat_type: boat_type.into(),
            length,
            price,
            description: description.into(),
        };
        Self::new(Seed {
            vessels: vec![
                vessel("v1", "Wind Dancer", "sailboat", 32.0, 85_000.0, "Cruising sloop with a roomy cockpit."),
                vessel("v2", "Reel Deal", "fishing", 24.0, 42_000.0, "Center console rigged for offshore trips."),
                vessel("v3", "Blue Heron", "sailboat", 27.0, 38_500.0, "Weekender with a shoal-draft keel."),
                vessel("v4", "Party Barge", "pontoon", 22.0, 29_900.0, "Seats twelve, built for lake days."),
            ],
            reviews: vec![VesselReview {
                id: "r1".into(),
                boat_id: "v1".into(),
                name: "Smooth sailing".into(),
                rating: 5,
                comment: Some("Points high and tracks well.".into()),
                created_by: Some("harbor master".into()),
            }],
        })
    }

    fn lock(&self) -> std::sync::MutexGuard<'_, Seed> {
        self.store.lock().unwrap_or_else(PoisonError::into_inner)
    }
}

fn validate_edit(store: &Seed, edit: &PartialVessel) -> Result<(), ServiceError> {
    if !store.vessels.iter().any(|v| v.id == edit.id) {
        return Err(ServiceError::NotFound(edit.id.clone()));
    }
    if edit.name.as_ref().is_some_and(|name| name.chars().count() > MAX_NAME_LEN) {
        return Err(ServiceError::Rejected("Field too long".into()));
    }
    if edit.length.is_some_and(|length| length <= 0.0) || edit.price.is_some_and(|price| price < 0.0) {
        return Err(ServiceError::Rejected(format!("invalid numeric value for {}", edit.id)));
    }
    Ok(())
}

#[async_trait::async_trait]
impl VesselService for MemoryVesselService {
    async fn fetch_vessels(&self, boat_type_id: &str) -> Result<Vec<Vessel>, ServiceError> {
        let store = self.lock();
        Ok(store
            .vessels
            .iter()
            .filter(|v| boat_type_id.is_empty() || v.boat_type == boat_type_id)
            .cloned()
            .collect())
    }

    async fn commit_vessel_edits(&self, edits: &[PartialVessel]) -> Result<(), ServiceError> {
        let mut store = self.lock();
        for edit in edits {
            validate_edit(&store, edit)?;
        }
        for edit in edits {
            if let Some(vessel) = store.vessels.iter_mut().find(|v| v.id == edit.id) {
                edit.apply_to(vessel);
            }
        }
        info!(count = edits.len(), "memory: edits committed");
        Ok(())
    }

    async fn fetch_reviews(&self, boat_id: &str) -> Result<Vec<VesselReview>, ServiceError> {
        let store = self.lock();
        Ok(store
            .reviews
            .iter()
            .filter(|r| r.boat_id == boat_id)
            .cloned()
            .collect())
    }

    async fn create_review(&self, review: &NewReview) -> Result<VesselReview, ServiceError> {
        let mut store = self.lock();
        if !store.vessels.iter().any(|v| v.id == review.boat_id) {
            return Err(ServiceError::NotFound(review.boat_id.clone()));
        }
        let created = VesselReview {
            id: Uuid::new_v4().to_string(),
            boat_id: review.boat_id.clone(),
            name: review.field(NAME_FIELD).unwrap_or_default().to_string(),
            rating: review.rating.value(),
            comment: review.field(COMMENT_FIELD).map(str::to_string),
            created_by: None,
        };
        store.reviews.push(created.clone());
        info!(review_id = %created.id, boat_id = %created.boat_id, "memory: review created");
        Ok(created)
    }

    async fn fetch_vessel_by_id(&self, id: &str) -> Result<Vessel, ServiceError> {
        let store = self.lock();
        store
            .vessels
            .iter()
            .find(|v| v.id == id)
            .cloned()
            .ok_or_else(|| ServiceError::NotFound(id.to_string()))
    }
}

#[cfg(test)]
#[path = "memory_test.rs"]
mod tests;
