use crate::dispatcher::KeyInputEvent;
use crate::midi::MidiKey;
use std::collections::BTreeSet;

/// Keys currently held down, as seen by a consumer of the input queue.
/// Keys outside the named range are ignored here rather than by the
/// dispatcher.
#[derive(Debug, Default)]
pub struct KeyboardState {
    held: BTreeSet<MidiKey>,
    press_count: u64,
}

impl KeyboardState {
    pub fn new() -> Self {
        Self::default()
    }

    /// Applies one event. Returns whether the held set changed.
    pub fn apply(&mut self, event: KeyInputEvent) -> bool {
        if !event.key.is_known() {
            return false;
        }

        if event.pressed {
            self.press_count += 1;
            self.held.insert(event.key)
        } else {
            self.held.remove(&event.key)
        }
    }

    pub fn is_held(&self, key: MidiKey) -> bool {
        self.held.contains(&key)
    }

    /// Held keys, lowest first
    pub fn held_keys(&self) -> Vec<MidiKey> {
        self.held.iter().copied().collect()
    }

    pub fn press_count(&self) -> u64 {
        self.press_count
    }

    pub fn release_all(&mut self) {
        self.held.clear();
    }
}
