use midikeyrs::hotplug::HotplugPoller;
use midikeyrs::midi::{InputHandle, MidiBackend, MockBackend, ReceiveCallback};
use midikeyrs::{DeviceRegistry, HandlerError};
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;

fn counting_callback(counter: Arc<AtomicUsize>) -> ReceiveCallback {
    Arc::new(move |_id: &str, _bytes: &[u8]| {
        counter.fetch_add(1, Ordering::SeqCst);
    })
}

fn poller_for(backend: &MockBackend) -> (HotplugPoller, Arc<DeviceRegistry>) {
    let registry = Arc::new(DeviceRegistry::new());
    let backend: Arc<dyn MidiBackend> = Arc::new(backend.clone());
    let callback = counting_callback(Arc::new(AtomicUsize::new(0)));
    (
        HotplugPoller::new(backend, Arc::clone(&registry), callback),
        registry,
    )
}

#[test]
fn test_refresh_opens_enumerated_devices() {
    let backend = MockBackend::with_ports([("a", "Keys A"), ("b", "Keys B")]);
    let (poller, registry) = poller_for(&backend);

    let report = poller.refresh().unwrap();
    assert_eq!(report.connected, vec!["a".to_string(), "b".to_string()]);
    assert!(report.disconnected.is_empty());
    assert_eq!(registry.ids(), vec!["a", "b"]);
    assert!(backend.is_subscribed("a"));
    assert!(backend.is_subscribed("b"));
    assert_eq!(registry.running_status("a"), Some(None));
}

#[test]
fn test_refresh_is_idempotent() {
    let backend = MockBackend::with_ports([("a", "Keys A")]);
    let (poller, registry) = poller_for(&backend);

    poller.refresh().unwrap();
    backend.send("a", &[0x90, 0x3C, 0x64]);
    let ids = registry.ids();
    let status = registry.running_status("a");

    let report = poller.refresh().unwrap();
    assert!(report.is_empty());
    assert_eq!(registry.ids(), ids);
    assert_eq!(registry.running_status("a"), status);
    assert_eq!(backend.open_count("a"), 1);
    assert_eq!(backend.subscriber_count(), 1);
}

#[test]
fn test_hotplug_convergence() {
    let backend = MockBackend::with_ports([("A", "Device A")]);
    let (poller, registry) = poller_for(&backend);
    let mut connects = Vec::new();
    let mut disconnects = Vec::new();

    let report = poller.refresh().unwrap();
    assert_eq!(registry.ids(), vec!["A"]);
    connects.extend(report.connected);
    disconnects.extend(report.disconnected);

    backend.plug("B", "Device B");
    let report = poller.refresh().unwrap();
    assert_eq!(registry.ids(), vec!["A", "B"]);
    connects.extend(report.connected);
    disconnects.extend(report.disconnected);

    backend.unplug("A");
    let report = poller.refresh().unwrap();
    assert_eq!(registry.ids(), vec!["B"]);
    connects.extend(report.connected);
    disconnects.extend(report.disconnected);

    assert_eq!(connects.iter().filter(|id| *id == "B").count(), 1);
    assert_eq!(disconnects, vec!["A".to_string()]);
    assert!(!backend.is_subscribed("A"));
}

#[test]
fn test_diff_is_by_id_not_name() {
    let backend = MockBackend::with_ports([("port-1", "Same Name")]);
    let (poller, registry) = poller_for(&backend);
    poller.refresh().unwrap();

    backend.unplug("port-1");
    backend.plug("port-2", "Same Name");
    let report = poller.refresh().unwrap();

    assert_eq!(report.connected, vec!["port-2".to_string()]);
    assert_eq!(report.disconnected, vec!["port-1".to_string()]);
    assert_eq!(registry.ids(), vec!["port-2"]);
}

#[test]
fn test_open_failure_aborts_cycle_and_retries() {
    let backend = MockBackend::with_ports([("a", "Keys A")]);
    backend.set_fail_open("a", true);
    let (poller, registry) = poller_for(&backend);

    match poller.refresh() {
        Err(HandlerError::Open { id, .. }) => assert_eq!(id, "a"),
        other => panic!("Expected open error, got {:?}", other),
    }
    assert!(registry.is_empty());

    backend.set_fail_open("a", false);
    let report = poller.refresh().unwrap();
    assert_eq!(report.connected, vec!["a".to_string()]);
    assert!(registry.contains("a"));
}

#[test]
fn test_open_failure_keeps_earlier_work() {
    let backend = MockBackend::with_ports([("a", "Keys A"), ("b", "Keys B")]);
    let (poller, registry) = poller_for(&backend);
    poller.refresh().unwrap();

    backend.unplug("a");
    backend.plug("c", "Keys C");
    backend.set_fail_open("c", true);

    assert!(poller.refresh().is_err());
    // The removal ran before the failing open
    assert_eq!(registry.ids(), vec!["b"]);
}

#[test]
fn test_enumeration_failure_leaves_registry_untouched() {
    let backend = MockBackend::with_ports([("a", "Keys A")]);
    let (poller, registry) = poller_for(&backend);
    poller.refresh().unwrap();

    backend.set_fail_listing(true);
    assert!(matches!(poller.refresh(), Err(HandlerError::Enumeration(_))));
    assert_eq!(registry.ids(), vec!["a"]);

    backend.set_fail_listing(false);
    assert!(poller.refresh().unwrap().is_empty());
}

#[test]
fn test_registry_clear_unsubscribes_everything() {
    let backend = MockBackend::with_ports([("a", "Keys A"), ("b", "Keys B")]);
    let (poller, registry) = poller_for(&backend);
    poller.refresh().unwrap();

    let removed = registry.clear();
    assert_eq!(removed.len(), 2);
    assert!(registry.is_empty());
    assert_eq!(backend.subscriber_count(), 0);
    assert!(removed.iter().all(|d| d.with_state(|_| ()).is_none()));
}

#[test]
fn test_device_info_snapshot() {
    let backend = MockBackend::with_ports([("b", "Keys B"), ("a", "Keys A")]);
    let (poller, registry) = poller_for(&backend);
    poller.refresh().unwrap();

    let devices = registry.devices();
    assert_eq!(devices.len(), 2);
    assert_eq!(devices[0].id, "a");
    assert_eq!(devices[0].name, "Keys A");
    assert_eq!(devices[0].running_status, None);
    assert!(devices[0].connected_at <= chrono::Local::now());
}

#[test]
fn test_subscribe_conflict_keeps_existing_subscriber() {
    let backend = MockBackend::with_ports([("a", "Keys A")]);
    let mut other = backend.open_input("a").unwrap();
    other
        .subscribe(counting_callback(Arc::new(AtomicUsize::new(0))))
        .unwrap();
    let (poller, registry) = poller_for(&backend);

    let err = poller.refresh().unwrap_err();
    assert!(matches!(err, HandlerError::Subscribe { ref id, .. } if id == "a"));
    assert!(registry.is_empty());
    assert!(backend.is_subscribed("a"));
}
