use crate::midi::backend::{
    BackendError, InputHandle, MidiBackend, PortDetails, ReceiveCallback, Result,
};
use std::collections::{HashMap, HashSet};
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};

#[derive(Default)]
struct MockState {
    ports: Vec<PortDetails>,
    fail_listing: bool,
    fail_open: HashSet<String>,
    subscribers: HashMap<String, ReceiveCallback>,
    open_count: HashMap<String, usize>,
}

/// In-memory backend. Clones share the same simulated hardware, so a test can
/// keep one clone to plug devices and inject bytes while the handler owns
/// another.
#[derive(Clone, Default)]
pub struct MockBackend {
    state: Arc<Mutex<MockState>>,
}

impl MockBackend {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_ports<I, S>(ports: I) -> Self
    where
        I: IntoIterator<Item = (S, S)>,
        S: Into<String>,
    {
        let backend = Self::new();
        for (id, name) in ports {
            backend.plug(id, name);
        }
        backend
    }

    fn state(&self) -> MutexGuard<'_, MockState> {
        self.state.lock().unwrap_or_else(PoisonError::into_inner)
    }

    /// Simulates connecting a device
    pub fn plug(&self, id: impl Into<String>, name: impl Into<String>) {
        let port = PortDetails::new(id, name);
        let mut state = self.state();
        if !state.ports.iter().any(|p| p.id == port.id) {
            state.ports.push(port);
        }
    }

    /// Simulates disconnecting a device. The subscription is left in place,
    /// like a driver that only notices the loss on the next enumeration.
    pub fn unplug(&self, id: &str) {
        self.state().ports.retain(|p| p.id != id);
    }

    pub fn set_fail_listing(&self, fail: bool) {
        self.state().fail_listing = fail;
    }

    pub fn set_fail_open(&self, id: &str, fail: bool) {
        let mut state = self.state();
        if fail {
            state.fail_open.insert(id.to_string());
        } else {
            state.fail_open.remove(id);
        }
    }

    pub fn is_subscribed(&self, id: &str) -> bool {
        self.state().subscribers.contains_key(id)
    }

    pub fn subscriber_count(&self) -> usize {
        self.state().subscribers.len()
    }

    /// How many times `open_input` succeeded for `id`
    pub fn open_count(&self, id: &str) -> usize {
        self.state().open_count.get(id).copied().unwrap_or(0)
    }

    /// Delivers `bytes` through the callback subscribed for `id`, the way a
    /// driver thread would. Returns false when nothing is subscribed.
    pub fn send(&self, id: &str, bytes: &[u8]) -> bool {
        let callback = self.state().subscribers.get(id).cloned();
        match callback {
            Some(callback) => {
                callback(id, bytes);
                true
            }
            None => false,
        }
    }
}

impl MidiBackend for MockBackend {
    fn list_inputs(&self) -> Result<Vec<PortDetails>> {
        let state = self.state();
        if state.fail_listing {
            return Err(BackendError::Init("mock enumeration failure".to_string()));
        }
        Ok(state.ports.clone())
    }

    fn open_input(&self, id: &str) -> Result<Box<dyn InputHandle>> {
        let mut state = self.state();
        if state.fail_open.contains(id) {
            return Err(BackendError::Connection(format!("mock open failure for {}", id)));
        }
        if !state.ports.iter().any(|p| p.id == id) {
            return Err(BackendError::PortNotFound(id.to_string()));
        }
        *state.open_count.entry(id.to_string()).or_insert(0) += 1;

        Ok(Box::new(MockInput {
            id: id.to_string(),
            state: Arc::clone(&self.state),
            subscribed: false,
        }))
    }
}

struct MockInput {
    id: String,
    state: Arc<Mutex<MockState>>,
    /// Whether the entry in `subscribers` belongs to this handle
    subscribed: bool,
}

impl InputHandle for MockInput {
    fn subscribe(&mut self, callback: ReceiveCallback) -> Result<()> {
        let mut state = self.state.lock().unwrap_or_else(PoisonError::into_inner);
        if state.subscribers.contains_key(&self.id) {
            return Err(BackendError::AlreadySubscribed(self.id.clone()));
        }
        state.subscribers.insert(self.id.clone(), callback);
        self.subscribed = true;
        Ok(())
    }

    fn unsubscribe(&mut self) {
        if !self.subscribed {
            return;
        }
        self.subscribed = false;
        self.state
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .subscribers
            .remove(&self.id);
    }
}
