//! Bridges raw receive callbacks to key input events

use crate::midi::{decode, DecodedEvent, EventKind, MidiKey, ReceiveCallback};
use crate::registry::DeviceRegistry;
use crossbeam::queue::SegQueue;
use log::{debug, trace, warn};
use std::sync::Arc;

/// A key press or release handed to the input pipeline
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct KeyInputEvent {
    pub key: MidiKey,
    pub pressed: bool,
}

impl KeyInputEvent {
    pub fn new(key: MidiKey, pressed: bool) -> Self {
        Self { key, pressed }
    }
}

/// Append-only queue of pending key events. Producers are backend callback
/// threads; the consumer drains it at its own pace.
#[derive(Debug, Default)]
pub struct InputQueue {
    events: SegQueue<KeyInputEvent>,
}

impl InputQueue {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn push(&self, event: KeyInputEvent) {
        self.events.push(event);
    }

    pub fn pop(&self) -> Option<KeyInputEvent> {
        self.events.pop()
    }

    /// Pops everything queued so far, oldest first
    pub fn drain(&self) -> Vec<KeyInputEvent> {
        let mut events = Vec::with_capacity(self.events.len());
        while let Some(event) = self.events.pop() {
            events.push(event);
        }
        events
    }

    pub fn len(&self) -> usize {
        self.events.len()
    }

    pub fn is_empty(&self) -> bool {
        self.events.is_empty()
    }
}

pub struct EventDispatcher {
    registry: Arc<DeviceRegistry>,
    queue: Arc<InputQueue>,
}

impl EventDispatcher {
    pub fn new(registry: Arc<DeviceRegistry>, queue: Arc<InputQueue>) -> Self {
        Self { registry, queue }
    }

    pub fn queue(&self) -> &Arc<InputQueue> {
        &self.queue
    }

    /// Receive callback to hand to a backend
    pub fn callback(self: &Arc<Self>) -> ReceiveCallback {
        let dispatcher = Arc::clone(self);
        Arc::new(move |device_id: &str, bytes: &[u8]| {
            dispatcher.on_message(device_id, bytes);
        })
    }

    /// Decodes one callback buffer for `device_id` and forwards its note
    /// events. Returns how many key events were queued.
    pub fn on_message(&self, device_id: &str, bytes: &[u8]) -> usize {
        let Some(device) = self.registry.get(device_id) else {
            trace!("Ignoring MIDI data from closed device {}", device_id);
            return 0;
        };

        // Decode and forward under the device lock so a concurrent close
        // cannot interleave and per-device order is kept.
        let forwarded = device.with_state(|state| {
            let output = decode(bytes, state.running_status);
            state.running_status = output.running_status;

            for error in &output.errors {
                warn!("MIDI decode error on {}: {}", device.name(), error);
            }

            let mut count = 0;
            for input in output.events.iter().filter_map(|e| self.translate(e)) {
                self.queue.push(input);
                count += 1;
            }
            count
        });

        forwarded.unwrap_or_else(|| {
            trace!("Ignoring MIDI data from closed device {}", device_id);
            0
        })
    }

    fn translate(&self, event: &DecodedEvent) -> Option<KeyInputEvent> {
        trace!(
            "Event {:02X}:{:02X}:{:02X}",
            event.status,
            event.data1,
            event.data2
        );

        let key = MidiKey::from(event.data1);
        match event.kind() {
            EventKind::NoteOn => {
                debug!("NoteOn: {}/{:.2}%", key, event.intensity() * 100.0);
                Some(KeyInputEvent::new(key, true))
            }
            EventKind::NoteOff => {
                debug!("NoteOff: {}/{:.2}%", key, event.intensity() * 100.0);
                Some(KeyInputEvent::new(key, false))
            }
            EventKind::Other => None,
        }
    }
}
