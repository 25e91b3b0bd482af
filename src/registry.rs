//! The set of currently open MIDI input devices
//!
//! Each [`Device`] carries its own state lock (running status plus an open
//! flag) so receive callbacks on different devices never contend. The map
//! itself is only locked for lookups and insert/remove, never while calling
//! into the backend.

use crate::midi::{BackendError, InputHandle, PortDetails, ReceiveCallback};
use chrono::{DateTime, Local};
use std::collections::HashMap;
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};

/// Per-device decoder state, guarded by the device's lock
#[derive(Debug)]
pub struct DeviceState {
    /// Last status byte seen on this device, `None` until the first one
    pub running_status: Option<u8>,
    open: bool,
}

/// An open input device owned by the registry
pub struct Device {
    id: String,
    name: String,
    connected_at: DateTime<Local>,
    handle: Mutex<Box<dyn InputHandle>>,
    state: Mutex<DeviceState>,
}

impl Device {
    pub fn new(port: PortDetails, handle: Box<dyn InputHandle>) -> Self {
        Self {
            id: port.id,
            name: port.name,
            connected_at: Local::now(),
            handle: Mutex::new(handle),
            state: Mutex::new(DeviceState {
                running_status: None,
                open: true,
            }),
        }
    }

    pub fn id(&self) -> &str {
        &self.id
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn connected_at(&self) -> DateTime<Local> {
        self.connected_at
    }

    pub fn running_status(&self) -> Option<u8> {
        self.lock_state().running_status
    }

    /// Runs `f` under the device lock, or returns `None` once the device has
    /// been closed.
    pub fn with_state<R>(&self, f: impl FnOnce(&mut DeviceState) -> R) -> Option<R> {
        let mut state = self.lock_state();
        if state.open {
            Some(f(&mut state))
        } else {
            None
        }
    }

    pub fn subscribe(&self, callback: ReceiveCallback) -> Result<(), BackendError> {
        self.lock_handle().subscribe(callback)
    }

    /// Unsubscribes first, then marks the device closed. Anything still
    /// in flight from the backend is rejected by [`Device::with_state`].
    pub fn close(&self) {
        self.lock_handle().unsubscribe();
        self.lock_state().open = false;
    }

    pub fn info(&self) -> DeviceInfo {
        DeviceInfo {
            id: self.id.clone(),
            name: self.name.clone(),
            running_status: self.running_status(),
            connected_at: self.connected_at,
        }
    }

    fn lock_state(&self) -> MutexGuard<'_, DeviceState> {
        self.state.lock().unwrap_or_else(PoisonError::into_inner)
    }

    fn lock_handle(&self) -> MutexGuard<'_, Box<dyn InputHandle>> {
        self.handle.lock().unwrap_or_else(PoisonError::into_inner)
    }
}

/// Snapshot of an open device
#[derive(Debug, Clone, PartialEq)]
pub struct DeviceInfo {
    pub id: String,
    pub name: String,
    pub running_status: Option<u8>,
    pub connected_at: DateTime<Local>,
}

#[derive(Default)]
pub struct DeviceRegistry {
    devices: Mutex<HashMap<String, Arc<Device>>>,
}

impl DeviceRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    fn map(&self) -> MutexGuard<'_, HashMap<String, Arc<Device>>> {
        self.devices.lock().unwrap_or_else(PoisonError::into_inner)
    }

    pub fn get(&self, id: &str) -> Option<Arc<Device>> {
        self.map().get(id).cloned()
    }

    pub fn contains(&self, id: &str) -> bool {
        self.map().contains_key(id)
    }

    pub fn len(&self) -> usize {
        self.map().len()
    }

    pub fn is_empty(&self) -> bool {
        self.map().is_empty()
    }

    /// Open device ids, sorted
    pub fn ids(&self) -> Vec<String> {
        let mut ids: Vec<String> = self.map().keys().cloned().collect();
        ids.sort();
        ids
    }

    /// `None` when the device is not open, `Some(None)` before its first
    /// status byte.
    pub fn running_status(&self, id: &str) -> Option<Option<u8>> {
        self.get(id).map(|device| device.running_status())
    }

    pub fn devices(&self) -> Vec<DeviceInfo> {
        let mut devices: Vec<DeviceInfo> = self.snapshot().iter().map(|d| d.info()).collect();
        devices.sort_by(|a, b| a.id.cmp(&b.id));
        devices
    }

    /// Adds an opened device. An entry already registered under the same id is
    /// closed and replaced.
    pub fn insert(&self, device: Device) -> Arc<Device> {
        let id = device.id.clone();
        self.remove(&id);
        let device = Arc::new(device);
        self.map().insert(id, Arc::clone(&device));
        device
    }

    /// Unsubscribes and closes the device, then drops it from the map.
    pub fn remove(&self, id: &str) -> Option<Arc<Device>> {
        let device = self.get(id)?;
        device.close();
        self.map().remove(id);
        Some(device)
    }

    /// Removes every device, unsubscribing each one before it leaves the map.
    pub fn clear(&self) -> Vec<Arc<Device>> {
        let devices = self.snapshot();
        for device in &devices {
            device.close();
        }
        let mut map = self.map();
        for device in &devices {
            map.remove(device.id());
        }
        devices
    }

    fn snapshot(&self) -> Vec<Arc<Device>> {
        self.map().values().cloned().collect()
    }
}
