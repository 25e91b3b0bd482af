use std::sync::Arc;
use thiserror::Error;

/// Callback invoked by a backend with the stable id of the sending device and
/// the raw bytes it delivered.
pub type ReceiveCallback = Arc<dyn Fn(&str, &[u8]) + Send + Sync>;

/// Custom error type for device backend operations
#[derive(Debug, Error)]
pub enum BackendError {
    /// The backend client could not be created (missing driver, no sequencer)
    #[error("MIDI backend initialization error: {0}")]
    Init(String),
    /// No input port carries the requested id
    #[error("MIDI input port not found: {0}")]
    PortNotFound(String),
    /// The port exists but could not be queried or connected
    #[error("MIDI connection error: {0}")]
    Connection(String),
    /// A receive callback is already attached to this handle
    #[error("MIDI input {0} is already subscribed")]
    AlreadySubscribed(String),
}

/// Result type for backend operations
pub type Result<T> = std::result::Result<T, BackendError>;

/// An input port as enumerated by a backend
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct PortDetails {
    pub id: String,
    pub name: String,
}

impl PortDetails {
    pub fn new(id: impl Into<String>, name: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            name: name.into(),
        }
    }
}

/// An opened input device. The registry owns exactly one handle per open
/// device and is the only caller of `subscribe`/`unsubscribe`.
pub trait InputHandle: Send {
    /// Attaches the receive callback. Bytes start flowing after this returns.
    fn subscribe(&mut self, callback: ReceiveCallback) -> Result<()>;

    /// Detaches the receive callback. Once this returns the backend must not
    /// invoke the callback again for this handle.
    fn unsubscribe(&mut self);
}

/// Trait defining the interface for MIDI input backends
pub trait MidiBackend: Send + Sync {
    /// Enumerates the currently connected input ports
    fn list_inputs(&self) -> Result<Vec<PortDetails>>;

    /// Opens the port with the given id. May block until the driver finishes.
    fn open_input(&self, id: &str) -> Result<Box<dyn InputHandle>>;
}
