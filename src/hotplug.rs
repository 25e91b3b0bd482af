//! Hot-plug poller: keeps the registry in step with the backend enumeration

use crate::error::{HandlerError, Result};
use crate::midi::{MidiBackend, PortDetails, ReceiveCallback};
use crate::registry::{Device, DeviceRegistry};
use log::info;
use std::collections::HashSet;
use std::sync::Arc;

/// Ids changed by a single refresh cycle
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RefreshReport {
    pub connected: Vec<String>,
    pub disconnected: Vec<String>,
}

impl RefreshReport {
    pub fn is_empty(&self) -> bool {
        self.connected.is_empty() && self.disconnected.is_empty()
    }
}

pub struct HotplugPoller {
    backend: Arc<dyn MidiBackend>,
    registry: Arc<DeviceRegistry>,
    callback: ReceiveCallback,
}

impl HotplugPoller {
    pub fn new(
        backend: Arc<dyn MidiBackend>,
        registry: Arc<DeviceRegistry>,
        callback: ReceiveCallback,
    ) -> Self {
        Self {
            backend,
            registry,
            callback,
        }
    }

    /// Closes devices that vanished from the enumeration, then opens new ones.
    ///
    /// An open or subscribe failure aborts the cycle; devices handled before
    /// the failure stay in place and the failed one is retried next cycle.
    pub fn refresh(&self) -> Result<RefreshReport> {
        let inputs = self
            .backend
            .list_inputs()
            .map_err(HandlerError::Enumeration)?;
        let present: HashSet<&str> = inputs.iter().map(|p| p.id.as_str()).collect();
        let mut report = RefreshReport::default();

        for id in self.registry.ids() {
            if present.contains(id.as_str()) {
                continue;
            }
            if let Some(device) = self.registry.remove(&id) {
                info!("Disconnected MIDI device: {}", device.name());
                report.disconnected.push(id);
            }
        }

        for port in inputs {
            if self.registry.contains(&port.id) {
                continue;
            }
            let id = port.id.clone();
            let name = self.connect(port)?;
            info!("Connected MIDI device: {}", name);
            report.connected.push(id);
        }

        Ok(report)
    }

    fn connect(&self, port: PortDetails) -> Result<String> {
        let handle = self
            .backend
            .open_input(&port.id)
            .map_err(|source| HandlerError::Open {
                id: port.id.clone(),
                source,
            })?;

        // Registered before subscribing so the first bytes find their device
        let device = self.registry.insert(Device::new(port, handle));
        if let Err(source) = device.subscribe(Arc::clone(&self.callback)) {
            self.registry.remove(device.id());
            return Err(HandlerError::Subscribe {
                id: device.id().to_string(),
                source,
            });
        }

        Ok(device.name().to_string())
    }
}
