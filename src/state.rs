//! Record shapes shared by the views and the capability traits.
//!
//! DESIGN
//! ======
//! Payloads that cross a component boundary (`SelectionMessage`,
//! `ReviewCreated`, `NewReview`) are fixed, typed shapes. Validation happens
//! at construction so downstream code never sees an empty selection id or an
//! out-of-range rating.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use crate::error::ErrorCode;

/// Field-set key carrying the parent vessel id on a new review.
pub const BOAT_FIELD: &str = "Boat";
/// Field-set key carrying the star rating on a new review.
pub const RATING_FIELD: &str = "Rating";
/// Review subject input.
pub const NAME_FIELD: &str = "Name";
/// Free-text review input.
pub const COMMENT_FIELD: &str = "Comment";

pub const MIN_RATING: u8 = 1;
pub const MAX_RATING: u8 = 5;

// =============================================================================
// VESSEL
// =============================================================================

/// A vessel record as returned by the backend.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Vessel {
    pub id: String,
    pub name: String,
    /// Vessel type identifier (the search filter key).
    #[serde(default)]
    pub boat_type: String,
    #[serde(default)]
    pub length: f64,
    #[serde(default)]
    pub price: f64,
    #[serde(default)]
    pub description: String,
}

/// An inline-edit draft for one vessel. Only `Some` fields are sent.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct PartialVessel {
    pub id: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub length: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub price: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
}

impl PartialVessel {
    #[must_use]
    pub fn new(id: impl Into<String>) -> Self {
        Self { id: id.into(), ..Self::default() }
    }

    #[must_use]
    pub fn with_name(mut self, name: impl Into<String>) -> Self {
        self.name = Some(name.into());
        self
    }

    #[must_use]
    pub fn with_length(mut self, length: f64) -> Self {
        self.length = Some(length);
        self
    }

    #[must_use]
    pub fn with_price(mut self, price: f64) -> Self {
        self.price = Some(price);
        self
    }

    #[must_use]
    pub fn with_description(mut self, description: impl Into<String>) -> Self {
        self.description = Some(description.into());
        self
    }

    /// True when no field is edited.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.name.is_none() && self.length.is_none() && self.price.is_none() && self.description.is_none()
    }

    /// Fold a later draft for the same record into this one. Later values win.
    pub fn merge(&mut self, later: PartialVessel) {
        if later.name.is_some() {
            self.name = later.name;
        }
        if later.length.is_some() {
            self.length = later.length;
        }
        if later.price.is_some() {
            self.price = later.price;
        }
        if later.description.is_some() {
            self.description = later.description;
        }
    }

    /// Write the edited fields onto a full record.
    pub fn apply_to(&self, vessel: &mut Vessel) {
        if let Some(name) = &self.name {
            vessel.name.clone_from(name);
        }
        if let Some(length) = self.length {
            vessel.length = length;
        }
        if let Some(price) = self.price {
            vessel.price = price;
        }
        if let Some(description) = &self.description {
            vessel.description.clone_from(description);
        }
    }
}

// =============================================================================
// REVIEWS
// =============================================================================

/// A stored review of a vessel.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct VesselReview {
    pub id: String,
    /// Parent vessel id.
    pub boat_id: String,
    /// Review subject.
    pub name: String,
    pub rating: u8,
    #[serde(default)]
    pub comment: Option<String>,
    /// Display name of the author, when the backend provides one.
    #[serde(default)]
    pub created_by: Option<String>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, thiserror::Error)]
#[error("rating must be between 1 and 5, got {0}")]
pub struct InvalidRating(pub u8);

impl ErrorCode for InvalidRating {
    fn error_code(&self) -> &'static str {
        "E_INVALID_RATING"
    }
}

/// Star rating in `1..=5`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(try_from = "u8", into = "u8")]
pub struct Rating(u8);

impl Rating {
    /// # Errors
    ///
    /// Returns [`InvalidRating`] for values outside `1..=5`.
    pub fn new(value: u8) -> Result<Self, InvalidRating> {
        if (MIN_RATING..=MAX_RATING).contains(&value) { Ok(Self(value)) } else { Err(InvalidRating(value)) }
    }

    #[must_use]
    pub fn value(self) -> u8 {
        self.0
    }
}

impl TryFrom<u8> for Rating {
    type Error = InvalidRating;

    fn try_from(value: u8) -> Result<Self, Self::Error> {
        Self::new(value)
    }
}

impl From<Rating> for u8 {
    fn from(rating: Rating) -> Self {
        rating.0
    }
}

/// Outgoing create payload, serialized as one flat field set:
/// `{"Boat": ..., "Rating": ..., <input api name>: <value>, ...}`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct NewReview {
    #[serde(rename = "Boat")]
    pub boat_id: String,
    #[serde(rename = "Rating")]
    pub rating: Rating,
    #[serde(flatten)]
    pub fields: BTreeMap<String, String>,
}

impl NewReview {
    #[must_use]
    pub fn new(boat_id: impl Into<String>, rating: Rating) -> Self {
        Self { boat_id: boat_id.into(), rating, fields: BTreeMap::new() }
    }

    #[must_use]
    pub fn with_field(mut self, api_name: impl Into<String>, value: impl Into<String>) -> Self {
        self.fields.insert(api_name.into(), value.into());
        self
    }

    #[must_use]
    pub fn field(&self, api_name: &str) -> Option<&str> {
        self.fields.get(api_name).map(String::as_str)
    }
}

/// Local signal raised by the submission form after a successful create.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ReviewCreated {
    pub review: VesselReview,
}

// =============================================================================
// SELECTION MESSAGE
// =============================================================================

#[derive(Debug, Clone, Copy, PartialEq, Eq, thiserror::Error)]
pub enum MessageError {
    #[error("selection message requires a non-empty record id")]
    EmptyRecordId,
}

impl ErrorCode for MessageError {
    fn error_code(&self) -> &'static str {
        match self {
            Self::EmptyRecordId => "E_EMPTY_RECORD_ID",
        }
    }
}

/// The only payload carried by the selection bus.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(try_from = "RawSelectionMessage")]
pub struct SelectionMessage {
    #[serde(rename = "recordId")]
    record_id: String,
}

#[derive(Deserialize)]
struct RawSelectionMessage {
    #[serde(rename = "recordId")]
    record_id: String,
}

impl TryFrom<RawSelectionMessage> for SelectionMessage {
    type Error = MessageError;

    fn try_from(raw: RawSelectionMessage) -> Result<Self, Self::Error> {
        Self::new(raw.record_id)
    }
}

impl SelectionMessage {
    /// Build a message for `record_id`, trimming surrounding whitespace.
    ///
    /// # Errors
    ///
    /// Returns [`MessageError::EmptyRecordId`] when the id is blank.
    pub fn new(record_id: impl Into<String>) -> Result<Self, MessageError> {
        let record_id = record_id.into();
        match normalize_id(Some(&record_id)) {
            Some(record_id) => Ok(Self { record_id }),
            None => Err(MessageError::EmptyRecordId),
        }
    }

    #[must_use]
    pub fn record_id(&self) -> &str {
        &self.record_id
    }
}

/// Treat blank identifiers as absent.
#[must_use]
pub fn normalize_id(id: Option<&str>) -> Option<String> {
    id.map(str::trim).filter(|id| !id.is_empty()).map(str::to_string)
}

#[cfg(test)]
#[path = "state_test.rs"]
mod tests;
