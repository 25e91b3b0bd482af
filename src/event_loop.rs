// event_loop.rs

use crate::dispatcher::InputQueue;
use crate::state::KeyboardState;
use crossbeam::channel::{self, Receiver};
use log::{debug, info};
use std::sync::Arc;
use std::time::Duration;

/// Consumer side of the input queue: drains pending key events on a fixed
/// tick and folds them into a [`KeyboardState`].
pub struct EventLoop {
    queue: Arc<InputQueue>,
    state: KeyboardState,
}

impl EventLoop {
    pub fn new(queue: Arc<InputQueue>) -> Self {
        EventLoop {
            queue,
            state: KeyboardState::new(),
        }
    }

    pub fn state(&self) -> &KeyboardState {
        &self.state
    }

    /// Applies everything queued so far. Returns how many events were read.
    pub fn process_pending(&mut self) -> usize {
        let events = self.queue.drain();
        for event in &events {
            if self.state.apply(*event) {
                info!(
                    "Key {} {} (held: {:?})",
                    event.key,
                    if event.pressed { "pressed" } else { "released" },
                    self.state.held_keys()
                );
            } else {
                debug!("Key event without state change: {:?}", event);
            }
        }
        events.len()
    }

    /// Runs until `shutdown` receives a message or is disconnected.
    pub fn run(&mut self, shutdown: Receiver<()>, interval: Duration) {
        let ticker = channel::tick(interval);
        loop {
            let stop = crossbeam::select! {
                recv(shutdown) -> _ => true,
                recv(ticker) -> _ => false,
            };
            if stop {
                break;
            }
            self.process_pending();
        }
        // Events queued after the last tick
        self.process_pending();
        info!("Event loop stopped");
    }
}
