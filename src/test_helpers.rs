//! Shared fakes for view tests.
//!
//! `MockVesselService` records every call, can fail any operation with a
//! fixed error, and can hold an operation until the test releases it.

use std::collections::HashMap;
use std::sync::{Arc, Mutex};
use std::time::Duration;

use tokio::sync::Semaphore;

use crate::services::{Capabilities, Navigator, Notifier, ServiceError, Toast, VesselService};
use crate::state::{NewReview, PartialVessel, Vessel, VesselReview};

pub const WAIT: Duration = Duration::from_millis(500);

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Op {
    FetchVessels,
    Commit,
    FetchReviews,
    CreateReview,
    FetchVessel,
}

#[derive(Debug, Clone, PartialEq)]
pub enum Call {
    FetchVessels(String),
    Commit(Vec<PartialVessel>),
    FetchReviews(String),
    CreateReview(NewReview),
    FetchVessel(String),
}

impl Call {
    fn op(&self) -> Op {
        match self {
            Self::FetchVessels(_) => Op::FetchVessels,
            Self::Commit(_) => Op::Commit,
            Self::FetchReviews(_) => Op::FetchReviews,
            Self::CreateReview(_) => Op::CreateReview,
            Self::FetchVessel(_) => Op::FetchVessel,
        }
    }
}

#[derive(Default)]
pub struct MockVesselService {
    vessels: Mutex<Vec<Vessel>>,
    reviews: Mutex<Vec<VesselReview>>,
    calls: Mutex<Vec<Call>>,
    failures: Mutex<HashMap<Op, ServiceError>>,
    holds: Mutex<HashMap<Op, Arc<Semaphore>>>,
}

impl MockVesselService {
    pub fn new(vessels: Vec<Vessel>, reviews: Vec<VesselReview>) -> Arc<Self> {
        Arc::new(Self { vessels: Mutex::new(vessels), reviews: Mutex::new(reviews), ..Self::default() })
    }

    /// Make every future call to `op` fail with `error`.
    pub fn fail(&self, op: Op, error: ServiceError) {
        self.failures.lock().unwrap().insert(op, error);
    }

    pub fn succeed(&self, op: Op) {
        self.failures.lock().unwrap().remove(&op);
    }

    /// Block calls to `op` until [`MockVesselService::release`] is called.
    pub fn hold(&self, op: Op) {
        self.holds.lock().unwrap().insert(op, Arc::new(Semaphore::new(0)));
    }

    /// Let one held call to `op` proceed.
    pub fn release(&self, op: Op) {
        if let Some(gate) = self.holds.lock().unwrap().get(&op) {
            gate.add_permits(1);
        }
    }

    pub fn set_reviews(&self, reviews: Vec<VesselReview>) {
        *self.reviews.lock().unwrap() = reviews;
    }

    pub fn calls(&self) -> Vec<Call> {
        self.calls.lock().unwrap().clone()
    }

    pub fn count(&self, op: Op) -> usize {
        self.calls.lock().unwrap().iter().filter(|c| c.op() == op).count()
    }

    async fn enter(&self, call: Call) -> Result<(), ServiceError> {
        let op = call.op();
        self.calls.lock().unwrap().push(call);
        let gate = self.holds.lock().unwrap().get(&op).cloned();
        if let Some(gate) = gate {
            gate.acquire().await.expect("gate closed").forget();
        }
        match self.failures.lock().unwrap().get(&op) {
            Some(error) => Err(error.clone()),
            None => Ok(()),
        }
    }
}

#[async_trait::async_trait]
impl VesselService for MockVesselService {
    async fn fetch_vessels(&self, boat_type_id: &str) -> Result<Vec<Vessel>, ServiceError> {
        self.enter(Call::FetchVessels(boat_type_id.to_string())).await?;
        Ok(self
            .vessels
            .lock()
            .unwrap()
            .iter()
            .filter(|v| boat_type_id.is_empty() || v.boat_type == boat_type_id)
            .cloned()
            .collect())
    }

    async fn commit_vessel_edits(&self, edits: &[PartialVessel]) -> Result<(), ServiceError> {
        self.enter(Call::Commit(edits.to_vec())).await
    }

    async fn fetch_reviews(&self, boat_id: &str) -> Result<Vec<VesselReview>, ServiceError> {
        self.enter(Call::FetchReviews(boat_id.to_string())).await?;
        Ok(self
            .reviews
            .lock()
            .unwrap()
            .iter()
            .filter(|r| r.boat_id == boat_id)
            .cloned()
            .collect())
    }

    async fn create_review(&self, review: &NewReview) -> Result<VesselReview, ServiceError> {
        self.enter(Call::CreateReview(review.clone())).await?;
        let created = VesselReview {
            id: format!("r{}", self.reviews.lock().unwrap().len() + 1),
            boat_id: review.boat_id.clone(),
            name: review.field(crate::state::NAME_FIELD).unwrap_or_default().to_string(),
            rating: review.rating.value(),
            comment: review.field(crate::state::COMMENT_FIELD).map(str::to_string),
            created_by: None,
        };
        self.reviews.lock().unwrap().push(created.clone());
        Ok(created)
    }

    async fn fetch_vessel_by_id(&self, id: &str) -> Result<Vessel, ServiceError> {
        self.enter(Call::FetchVessel(id.to_string())).await?;
        self.vessels
            .lock()
            .unwrap()
            .iter()
            .find(|v| v.id == id)
            .cloned()
            .ok_or_else(|| ServiceError::NotFound(id.to_string()))
    }
}

#[derive(Default)]
pub struct RecordingNotifier {
    toasts: Mutex<Vec<Toast>>,
}

impl RecordingNotifier {
    pub fn toasts(&self) -> Vec<Toast> {
        self.toasts.lock().unwrap().clone()
    }
}

impl Notifier for RecordingNotifier {
    fn notify(&self, toast: Toast) {
        self.toasts.lock().unwrap().push(toast);
    }
}

#[derive(Default)]
pub struct RecordingNavigator {
    visited: Mutex<Vec<String>>,
}

impl RecordingNavigator {
    pub fn visited(&self) -> Vec<String> {
        self.visited.lock().unwrap().clone()
    }
}

impl Navigator for RecordingNavigator {
    fn navigate_to_record(&self, record_id: &str) {
        self.visited.lock().unwrap().push(record_id.to_string());
    }
}

/// Mock service plus recorders, wired into a [`Capabilities`] bundle.
pub struct Harness {
    pub service: Arc<MockVesselService>,
    pub notifier: Arc<RecordingNotifier>,
    pub navigator: Arc<RecordingNavigator>,
    pub caps: Capabilities,
}

impl Harness {
    pub fn new(vessels: Vec<Vessel>, reviews: Vec<VesselReview>) -> Self {
        let service = MockVesselService::new(vessels, reviews);
        let notifier = Arc::new(RecordingNotifier::default());
        let navigator = Arc::new(RecordingNavigator::default());
        let caps = Capabilities::new(
            Arc::clone(&service) as Arc<dyn VesselService>,
            Arc::clone(&notifier) as Arc<dyn Notifier>,
            Arc::clone(&navigator) as Arc<dyn Navigator>,
        );
        Self { service, notifier, navigator, caps }
    }

    pub fn fleet() -> Self {
        Self::new(
            vec![
                vessel("v1", "Wind", "Sailboat"),
                vessel("v2", "Gust", "Sailboat"),
                vessel("v3", "Trawler", "Fishing"),
            ],
            vec![review("r1", "v1", 4)],
        )
    }
}

pub fn vessel(id: &str, name: &str, boat_type: &str) -> Vessel {
    Vessel {
        id: id.into(),
        name: name.into(),
        boat_type: boat_type.into(),
        length: 30.0,
        price: 50_000.0,
        description: format!("{name} description"),
    }
}

pub fn review(id: &str, boat_id: &str, rating: u8) -> VesselReview {
    VesselReview {
        id: id.into(),
        boat_id: boat_id.into(),
        name: format!("review {id}"),
        rating,
        comment: None,
        created_by: None,
    }
}

/// Give spawned tasks a chance to run to completion.
pub async fn drain_tasks() {
    for _ in 0..32 {
        tokio::task::yield_now().await;
    }
}

/// Await `fut` or fail the test after [`WAIT`].
pub async fn within<F: std::future::Future>(fut: F) -> F::Output {
    tokio::time::timeout(WAIT, fut).await.expect("timed out waiting for view")
}
