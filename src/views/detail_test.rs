use super::*;
use crate::host::HostEvent;
use crate::services::ServiceError;
use crate::state::SelectionMessage;
use crate::test_helpers::{Harness, Op, drain_tasks, vessel, within};

fn select(bus: &SelectionBus, id: &str) {
    bus.publish(SelectionMessage::new(id).unwrap());
}

#[tokio::test]
async fn starts_empty_on_details_tab() {
    let h = Harness::fleet();
    let bus = SelectionBus::new();
    let detail = DetailView::new(&bus, &h.caps, None);

    assert_eq!(detail.record_id(), None);
    assert!(detail.state().is_idle());
    assert!(!detail.has_record());
    assert_eq!(detail.boat_name(), "");
    assert_eq!(detail.details_tab_icon(), None);
    assert_eq!(detail.active_tab(), DetailTab::Details);
    assert!(detail.is_connected());
    assert_eq!(bus.subscriber_count(), 1);
}

#[tokio::test]
async fn selection_loads_vessel_and_reviews() {
    let h = Harness::fleet();
    let bus = SelectionBus::new();
    let detail = DetailView::new(&bus, &h.caps, None);

    select(&bus, "v1");
    assert!(detail.state().is_loading());
    assert!(!detail.has_record());

    within(detail.settled()).await;
    within(detail.reviews().settled()).await;

    assert_eq!(detail.record_id().as_deref(), Some("v1"));
    assert_eq!(detail.vessel(), Some(vessel("v1", "Wind", "Sailboat")));
    assert!(detail.has_record());
    assert_eq!(detail.boat_name(), "Wind");
    assert_eq!(detail.details_tab_icon(), Some(DETAILS_TAB_ICON));
    assert_eq!(detail.reviews().reviews().len(), 1);
    assert_eq!(detail.form().record_id().as_deref(), Some("v1"));
}

#[tokio::test]
async fn later_selection_wins_over_slow_earlier_fetch() {
    let h = Harness::fleet();
    h.service.hold(Op::FetchVessel);
    let bus = SelectionBus::new();
    let detail = DetailView::new(&bus, &h.caps, None);

    select(&bus, "v1");
    select(&bus, "v2");
    h.service.release(Op::FetchVessel);
    drain_tasks().await;
    h.service.release(Op::FetchVessel);
    within(detail.settled()).await;
    drain_tasks().await;

    assert_eq!(detail.boat_name(), "Gust");
    assert_eq!(detail.record_id().as_deref(), Some("v2"));
}

#[tokio::test]
async fn failed_fetch_has_no_record() {
    let h = Harness::fleet();
    let bus = SelectionBus::new();
    let detail = DetailView::new(&bus, &h.caps, None);

    select(&bus, "missing");
    within(detail.settled()).await;

    assert_eq!(detail.state(), LoadState::Failed(ServiceError::NotFound("missing".into())));
    assert!(!detail.has_record());
    assert_eq!(detail.boat_name(), "");
    assert_eq!(detail.details_tab_icon(), None);
}

#[tokio::test]
async fn review_created_switches_tab_and_refreshes_once() {
    let h = Harness::fleet();
    let bus = SelectionBus::new();
    let detail = DetailView::new(&bus, &h.caps, None);
    select(&bus, "v1");
    within(detail.settled()).await;
    within(detail.reviews().settled()).await;
    detail.set_active_tab(DetailTab::AddReview);
    assert_eq!(h.service.count(Op::FetchReviews), 1);

    detail.form().set_rating(5).unwrap();
    detail.form().set_field(crate::state::COMMENT_FIELD, "Great boat").unwrap();
    detail.form().submit().await.unwrap();
    within(detail.reviews().settled()).await;
    drain_tasks().await;

    assert_eq!(detail.active_tab(), DetailTab::Reviews);
    assert_eq!(h.service.count(Op::FetchReviews), 2);
    assert_eq!(detail.reviews().reviews().len(), 2);
}

#[tokio::test]
async fn disconnect_stops_selection_handling() {
    let h = Harness::fleet();
    let bus = SelectionBus::new();
    let detail = DetailView::new(&bus, &h.caps, None);

    detail.disconnect();
    detail.disconnect();
    select(&bus, "v1");
    drain_tasks().await;

    assert!(!detail.is_connected());
    assert_eq!(bus.subscriber_count(), 0);
    assert_eq!(detail.record_id(), None);
    assert_eq!(h.service.count(Op::FetchVessel), 0);
}

#[tokio::test]
async fn dropping_view_releases_subscription() {
    let h = Harness::fleet();
    let bus = SelectionBus::new();
    let detail = DetailView::new(&bus, &h.caps, None);
    assert_eq!(bus.subscriber_count(), 1);

    drop(detail);
    select(&bus, "v1");
    drain_tasks().await;

    assert_eq!(bus.subscriber_count(), 0);
    assert!(h.service.calls().is_empty());
}

#[tokio::test]
async fn host_sees_vessel_and_review_loads_together() {
    let h = Harness::fleet();
    let bus = SelectionBus::new();
    let host = LoadingHost::new();
    let events = Arc::new(Mutex::new(Vec::new()));
    let sink = Arc::clone(&events);
    host.on_change(move |e| sink.lock().unwrap().push(e));
    let detail = DetailView::new(&bus, &h.caps, Some(&host));

    select(&bus, "v1");
    assert_eq!(host.busy_count(), 2);
    within(detail.settled()).await;
    within(detail.reviews().settled()).await;

    assert!(!host.is_loading());
    assert_eq!(*events.lock().unwrap(), vec![HostEvent::Loading, HostEvent::DoneLoading]);
}

#[tokio::test]
async fn navigation_requires_a_selection() {
    let h = Harness::fleet();
    let bus = SelectionBus::new();
    let detail = DetailView::new(&bus, &h.caps, None);

    assert_eq!(detail.navigate_to_record_view_page(), Err(DetailError::NoSelection));

    select(&bus, "v3");
    detail.navigate_to_record_view_page().unwrap();
    assert_eq!(h.navigator.visited(), vec!["v3"]);
}
