use log::{Level, Log, Metadata, Record};
use midikeyrs::hotplug::HotplugPoller;
use midikeyrs::midi::{MidiBackend, MockBackend};
use midikeyrs::{DeviceRegistry, EventDispatcher, InputQueue};
use std::cell::RefCell;
use std::sync::{Arc, Once};

thread_local! {
    static CAPTURED: RefCell<Vec<(Level, String)>> = RefCell::new(Vec::new());
}

/// Records log lines per thread. The mock backend delivers bytes on the
/// sending thread, so parallel tests never see each other's lines.
struct CaptureLogger;

impl Log for CaptureLogger {
    fn enabled(&self, _metadata: &Metadata) -> bool {
        true
    }

    fn log(&self, record: &Record) {
        if record.target().starts_with("midikeyrs") {
            CAPTURED.with(|lines| {
                lines
                    .borrow_mut()
                    .push((record.level(), record.args().to_string()))
            });
        }
    }

    fn flush(&self) {}
}

static LOGGER: CaptureLogger = CaptureLogger;
static INIT: Once = Once::new();

fn capture() {
    INIT.call_once(|| {
        log::set_logger(&LOGGER).unwrap();
        log::set_max_level(log::LevelFilter::Trace);
    });
    CAPTURED.with(|lines| lines.borrow_mut().clear());
}

fn captured() -> Vec<(Level, String)> {
    CAPTURED.with(|lines| lines.borrow().clone())
}

fn count(lines: &[(Level, String)], level: Level, message: &str) -> usize {
    lines
        .iter()
        .filter(|(l, m)| *l == level && m == message)
        .count()
}

fn wired(backend: &MockBackend) -> (HotplugPoller, Arc<EventDispatcher>) {
    let registry = Arc::new(DeviceRegistry::new());
    let dispatcher = Arc::new(EventDispatcher::new(
        Arc::clone(&registry),
        Arc::new(InputQueue::new()),
    ));
    let shared: Arc<dyn MidiBackend> = Arc::new(backend.clone());
    let poller = HotplugPoller::new(shared, registry, dispatcher.callback());
    (poller, dispatcher)
}

#[test]
fn test_hotplug_logs_each_transition_once() {
    capture();
    let backend = MockBackend::with_ports([("A", "Device A")]);
    let (poller, _dispatcher) = wired(&backend);

    poller.refresh().unwrap();
    backend.plug("B", "Device B");
    poller.refresh().unwrap();
    backend.unplug("A");
    poller.refresh().unwrap();
    poller.refresh().unwrap();

    let lines = captured();
    assert_eq!(count(&lines, Level::Info, "Connected MIDI device: Device A"), 1);
    assert_eq!(count(&lines, Level::Info, "Connected MIDI device: Device B"), 1);
    assert_eq!(
        count(&lines, Level::Info, "Disconnected MIDI device: Device A"),
        1
    );
    assert_eq!(
        count(&lines, Level::Info, "Disconnected MIDI device: Device B"),
        0
    );
}

#[test]
fn test_every_decoded_event_is_traced_in_hex() {
    capture();
    let backend = MockBackend::with_ports([("d", "Keys")]);
    let (poller, dispatcher) = wired(&backend);
    poller.refresh().unwrap();

    backend.send("d", &[0x90, 0x3C, 0x64]);
    backend.send("d", &[0xB0, 0x07, 0x64]);
    backend.send("d", &[0x07, 0x10]);

    let lines = captured();
    assert_eq!(count(&lines, Level::Trace, "Event 90:3C:64"), 1);
    assert_eq!(count(&lines, Level::Trace, "Event B0:07:64"), 1);
    assert_eq!(count(&lines, Level::Trace, "Event B0:07:10"), 1);
    assert_eq!(count(&lines, Level::Debug, "NoteOn: C4/156.25%"), 1);
    assert_eq!(dispatcher.queue().len(), 1);
}
