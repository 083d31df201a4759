use std::sync::Arc;

use fleetview::config::AppConfig;
use fleetview::services::memory::MemoryVesselService;
use fleetview::services::notify::{TracingNavigator, TracingNotifier};
use fleetview::services::{Capabilities, VesselService};
use fleetview::session::Session;
use fleetview::state::COMMENT_FIELD;

#[tokio::main]
async fn main() {
    tracing_subscriber::fmt::init();

    let config = AppConfig::from_env().expect("invalid configuration");
    let service: Arc<dyn VesselService> = match &config.seed_file {
        Some(path) => Arc::new(MemoryVesselService::from_seed_file(path).expect("failed to load seed file")),
        None => Arc::new(MemoryVesselService::with_sample_fleet()),
    };
    let caps = Capabilities::new(service, Arc::new(TracingNotifier), Arc::new(TracingNavigator));
    let session = Session::new(&caps);

    session.search().search(&config.boat_type);
    session.search().settled().await;
    let vessels = session.search().vessels();
    tracing::info!(boat_type = %config.boat_type, count = vessels.len(), "demo: search settled");

    let Some(record_id) = config.select.clone().or_else(|| vessels.first().map(|v| v.id.clone())) else {
        tracing::warn!("demo: nothing to select");
        return;
    };
    if let Err(e) = session.search().select(&record_id) {
        tracing::warn!(error = %e, "demo: cannot select record");
        return;
    }

    let detail = session.detail();
    detail.settled().await;
    detail.reviews().settled().await;
    tracing::info!(
        %record_id,
        boat = %detail.boat_name(),
        reviews = detail.reviews().reviews().len(),
        "demo: detail loaded"
    );

    let form = detail.form();
    form.set_rating(config.review_rating.value()).expect("rating validated by config");
    form.set_field(COMMENT_FIELD, "Logged from the fleetview demo").expect("default form has a comment field");
    match form.submit().await {
        Ok(review) => tracing::info!(review_id = %review.id, "demo: review submitted"),
        Err(e) => tracing::warn!(error = %e, "demo: review rejected"),
    }

    detail.reviews().settled().await;
    tracing::info!(
        tab = ?detail.active_tab(),
        reviews = detail.reviews().reviews().len(),
        "demo: reviews refreshed"
    );
}
