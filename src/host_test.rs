use super::*;

fn recorded(host: &LoadingHost) -> Arc<Mutex<Vec<HostEvent>>> {
    let events = Arc::new(Mutex::new(Vec::new()));
    let sink = Arc::clone(&events);
    host.on_change(move |event| sink.lock().unwrap().push(event));
    events
}

#[test]
fn new_host_is_idle() {
    let host = LoadingHost::new();
    assert!(!host.is_loading());
    assert_eq!(host.busy_count(), 0);
}

#[test]
fn single_source_emits_loading_then_done() {
    let host = LoadingHost::new();
    let events = recorded(&host);
    let source = host.source("grid");

    source.set(true);
    assert!(host.is_loading());
    source.set(false);
    assert!(!host.is_loading());

    assert_eq!(*events.lock().unwrap(), vec![HostEvent::Loading, HostEvent::DoneLoading]);
}

#[test]
fn host_stays_loading_until_every_source_settles() {
    let host = LoadingHost::new();
    let events = recorded(&host);
    let a = host.source("a");
    let b = host.source("b");

    a.set(true);
    b.set(true);
    a.set(false);
    assert!(host.is_loading());
    assert_eq!(host.busy_count(), 1);
    b.set(false);

    assert_eq!(*events.lock().unwrap(), vec![HostEvent::Loading, HostEvent::DoneLoading]);
}

#[test]
fn redundant_reports_emit_nothing() {
    let host = LoadingHost::new();
    let events = recorded(&host);
    let a = host.source("a");

    a.set(false);
    a.set(true);
    a.set(true);
    a.set(false);
    a.set(false);

    assert_eq!(*events.lock().unwrap(), vec![HostEvent::Loading, HostEvent::DoneLoading]);
}

#[test]
fn dropping_busy_source_clears_its_flag() {
    let host = LoadingHost::new();
    let events = recorded(&host);
    let a = host.source("a");
    a.set(true);
    drop(a);

    assert!(!host.is_loading());
    assert_eq!(*events.lock().unwrap(), vec![HostEvent::Loading, HostEvent::DoneLoading]);
}

#[test]
fn source_keeps_its_name() {
    let host = LoadingHost::new();
    assert_eq!(host.source("reviews").name(), "reviews");
}
