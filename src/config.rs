//! Demo configuration parsed from environment variables.

use std::path::PathBuf;

use crate::error::ErrorCode;
use crate::state::{InvalidRating, Rating};

pub const DEFAULT_REVIEW_RATING: u8 = 5;

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ConfigError {
    #[error("{var}: expected an integer, got '{value}'")]
    NotANumber { var: &'static str, value: String },
    #[error("{var}: {source}")]
    Rating {
        var: &'static str,
        #[source]
        source: InvalidRating,
    },
}

impl ErrorCode for ConfigError {
    fn error_code(&self) -> &'static str {
        match self {
            Self::NotANumber { .. } => "E_CONFIG_NUMBER",
            Self::Rating { .. } => "E_CONFIG_RATING",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AppConfig {
    /// Initial search filter; empty lists every type.
    pub boat_type: String,
    /// Vessel to select; the first search result when absent.
    pub select: Option<String>,
    /// JSON seed for the in-memory backend; the built-in fleet when absent.
    pub seed_file: Option<PathBuf>,
    pub review_rating: Rating,
}

impl AppConfig {
    /// Build typed config from environment variables.
    ///
    /// Optional:
    /// - `FLEETVIEW_BOAT_TYPE`: default empty (all types)
    /// - `FLEETVIEW_SELECT`: default first result
    /// - `FLEETVIEW_SEED_FILE`: default built-in fleet
    /// - `FLEETVIEW_REVIEW_RATING`: default 5, must be 1..=5
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError`] when `FLEETVIEW_REVIEW_RATING` is not a rating.
    pub fn from_env() -> Result<Self, ConfigError> {
        let var = |key: &str| std::env::var(key).ok();
        Ok(Self {
            boat_type: var("FLEETVIEW_BOAT_TYPE").map(|v| v.trim().to_string()).unwrap_or_default(),
            select: parse_optional(var("FLEETVIEW_SELECT").as_deref()),
            seed_file: parse_optional(var("FLEETVIEW_SEED_FILE").as_deref()).map(PathBuf::from),
            review_rating: parse_rating("FLEETVIEW_REVIEW_RATING", var("FLEETVIEW_REVIEW_RATING").as_deref())?,
        })
    }
}

/// Blank values count as unset.
fn parse_optional(raw: Option<&str>) -> Option<String> {
    raw.map(str::trim).filter(|v| !v.is_empty()).map(str::to_string)
}

fn parse_rating(var: &'static str, raw: Option<&str>) -> Result<Rating, ConfigError> {
    let Some(raw) = parse_optional(raw) else {
        return Rating::new(DEFAULT_REVIEW_RATING).map_err(|source| ConfigError::Rating { var, source });
    };
    let value = raw.parse::<u8>().map_err(|_| ConfigError::NotANumber { var, value: raw.clone() })?;
    Rating::new(value).map_err(|source| ConfigError::Rating { var, source })
}

#[cfg(test)]
#[path = "config_test.rs"]
mod tests;
