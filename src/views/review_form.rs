//! Review submission form.
//!
//! DESIGN
//! ======
//! The form holds a pending star rating, the parent vessel id supplied by its
//! host, and any number of text input fields. `submit` refuses to reach the
//! backend without a rating or a parent id. On success it raises
//! [`ReviewCreated`] to registered listeners, shows a toast, and resets the
//! rating and every input field.

use std::sync::{Arc, Mutex, MutexGuard, PoisonError};

use tracing::{info, warn};

use crate::error::ErrorCode;
use crate::services::{Capabilities, Notifier, ServiceError, Toast, VesselService};
use crate::state::{
    BOAT_FIELD, COMMENT_FIELD, InvalidRating, NAME_FIELD, NewReview, RATING_FIELD, Rating, ReviewCreated, VesselReview,
    normalize_id,
};

pub const SUCCESS_TITLE: &str = "Review Created!";
pub const ERROR_TITLE: &str = "Error";
pub const LABEL_SUBJECT: &str = "Review Subject";
pub const LABEL_COMMENT: &str = "Comment";

#[derive(Debug, thiserror::Error)]
pub enum FormError {
    #[error("a rating is required before submitting")]
    RatingRequired,
    #[error("no vessel selected for this review")]
    MissingParent,
    #[error(transparent)]
    InvalidRating(#[from] InvalidRating),
    #[error("unknown input field: {0}")]
    UnknownField(String),
    #[error("reserved field name: {0}")]
    ReservedField(String),
    #[error("review create failed: {0}")]
    Create(#[source] ServiceError),
}

impl ErrorCode for FormError {
    fn error_code(&self) -> &'static str {
        match self {
            Self::RatingRequired => "E_RATING_REQUIRED",
            Self::MissingParent => "E_MISSING_PARENT",
            Self::InvalidRating(_) => "E_INVALID_RATING",
            Self::UnknownField(_) => "E_UNKNOWN_FIELD",
            Self::ReservedField(_) => "E_RESERVED_FIELD",
            Self::Create(e) => e.error_code(),
        }
    }

    fn retryable(&self) -> bool {
        match self {
            Self::Create(e) => e.retryable(),
            _ => false,
        }
    }
}

/// One text input of the form.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct InputField {
    pub api_name: String,
    pub label: String,
    pub value: String,
}

impl InputField {
    #[must_use]
    pub fn new(api_name: &str, label: &str) -> Self {
        Self { api_name: api_name.to_string(), label: label.to_string(), value: String::new() }
    }

    pub fn reset(&mut self) {
        self.value.clear();
    }
}

/// Subject and comment inputs.
#[must_use]
pub fn default_fields() -> Vec<InputField> {
    vec![InputField::new(NAME_FIELD, LABEL_SUBJECT), InputField::new(COMMENT_FIELD, LABEL_COMMENT)]
}

type CreatedListener = Arc<dyn Fn(&ReviewCreated) + Send + Sync>;

struct FormState {
    boat_id: Option<String>,
    rating: Option<Rating>,
    fields: Vec<InputField>,
}

struct Inner {
    service: Arc<dyn VesselService>,
    notifier: Arc<dyn Notifier>,
    state: Mutex<FormState>,
    listeners: Mutex<Vec<CreatedListener>>,
}

#[derive(Clone)]
pub struct ReviewSubmissionForm {
    inner: Arc<Inner>,
}

impl ReviewSubmissionForm {
    /// Form with the default subject and comment inputs.
    #[must_use]
    pub fn new(caps: &Capabilities) -> Self {
        Self::build(caps, default_fields())
    }

    /// Form with a custom set of inputs.
    ///
    /// # Errors
    ///
    /// Returns [`FormError::ReservedField`] if an input would shadow the
    /// parent id or rating keys of the outgoing field set.
    pub fn with_fields(caps: &Capabilities, fields: Vec<InputField>) -> Result<Self, FormError> {
        if let Some(field) = fields.iter().find(|f| f.api_name == BOAT_FIELD || f.api_name == RATING_FIELD) {
            return Err(FormError::ReservedField(field.api_name.clone()));
        }
        Ok(Self::build(caps, fields))
    }

    fn build(caps: &Capabilities, fields: Vec<InputField>) -> Self {
        let state = FormState { boat_id: None, rating: None, fields };
        let inner = Inner {
            service: Arc::clone(&caps.service),
            notifier: Arc::clone(&caps.notifier),
            state: Mutex::new(state),
            listeners: Mutex::new(Vec::new()),
        };
        Self { inner: Arc::new(inner) }
    }

    fn lock(&self) -> MutexGuard<'_, FormState> {
        self.inner.state.lock().unwrap_or_else(PoisonError::into_inner)
    }

    /// Host-supplied parent vessel id.
    pub fn set_record_id(&self, record_id: Option<&str>) {
        self.lock().boat_id = normalize_id(record_id);
    }

    #[must_use]
    pub fn record_id(&self) -> Option<String> {
        self.lock().boat_id.clone()
    }

    /// Record the value picked in the star control.
    ///
    /// # Errors
    ///
    /// Returns [`FormError::InvalidRating`] outside `1..=5`; the pending
    /// rating is left unchanged.
    pub fn set_rating(&self, value: u8) -> Result<(), FormError> {
        let rating = Rating::new(value)?;
        self.lock().rating = Some(rating);
        Ok(())
    }

    #[must_use]
    pub fn rating(&self) -> Option<Rating> {
        self.lock().rating
    }

    /// Set the text of one input.
    ///
    /// # Errors
    ///
    /// Returns [`FormError::UnknownField`] if no input has `api_name`.
    pub fn set_field(&self, api_name: &str, value: &str) -> Result<(), FormError> {
        let mut state = self.lock();
        let field = state
            .fields
            .iter_mut()
            .find(|f| f.api_name == api_name)
            .ok_or_else(|| FormError::UnknownField(api_name.to_string()))?;
        value.clone_into(&mut field.value);
        Ok(())
    }

    #[must_use]
    pub fn field(&self, api_name: &str) -> Option<String> {
        self.lock().fields.iter().find(|f| f.api_name == api_name).map(|f| f.value.clone())
    }

    #[must_use]
    pub fn fields(&self) -> Vec<InputField> {
        self.lock().fields.clone()
    }

    /// Register a listener for successful creates.
    pub fn on_review_created<F>(&self, listener: F)
    where
        F: Fn(&ReviewCreated) + Send + Sync + 'static,
    {
        self.inner
            .listeners
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .push(Arc::new(listener));
    }

    /// Validate, then create the review.
    ///
    /// # Errors
    ///
    /// - [`FormError::RatingRequired`] / [`FormError::MissingParent`]: blocked
    ///   locally, nothing sent.
    /// - [`FormError::Create`]: the backend refused; an error toast was shown
    ///   and the inputs are kept.
    pub async fn submit(&self) -> Result<VesselReview, FormError> {
        let review = self.outgoing().inspect_err(|e| {
            warn!(error = %e, code = e.error_code(), "review form: submission blocked");
        })?;

        info!(boat_id = %review.boat_id, rating = review.rating.value(), "review form: submitting");
        match self.inner.service.create_review(&review).await {
            Ok(created) => {
                self.emit_created(&ReviewCreated { review: created.clone() });
                self.inner.notifier.notify(Toast::success(SUCCESS_TITLE, None));
                self.reset();
                Ok(created)
            }
            Err(e) => {
                warn!(error = %e, code = e.error_code(), retryable = e.retryable(), "review form: create failed");
                self.inner.notifier.notify(Toast::error(ERROR_TITLE, e.to_string()));
                Err(FormError::Create(e))
            }
        }
    }

    /// Clear the rating and every input.
    pub fn reset(&self) {
        let mut state = self.lock();
        state.rating = None;
        for field in &mut state.fields {
            field.reset();
        }
    }

    fn outgoing(&self) -> Result<NewReview, FormError> {
        let state = self.lock();
        let rating = state.rating.ok_or(FormError::RatingRequired)?;
        let boat_id = state.boat_id.clone().ok_or(FormError::MissingParent)?;
        let review = state
            .fields
            .iter()
            .filter(|f| !f.value.trim().is_empty())
            .fold(NewReview::new(boat_id, rating), |review, f| review.with_field(&f.api_name, &f.value));
        Ok(review)
    }

    fn emit_created(&self, event: &ReviewCreated) {
        let listeners = self.inner.listeners.lock().unwrap_or_else(PoisonError::into_inner).clone();
        for listener in &listeners {
            listener(event);
        }
    }
}

#[cfg(test)]
#[path = "review_form_test.rs"]
mod tests;
