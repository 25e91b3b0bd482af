use crate::midi::BackendError;
use thiserror::Error;

/// Failures surfaced by the hot-plug handler
#[derive(Debug, Error)]
pub enum HandlerError {
    /// The startup probe could not enumerate devices
    #[error("{hint}: {source}")]
    Initialization {
        hint: &'static str,
        #[source]
        source: BackendError,
    },
    /// Enumeration failed during a refresh cycle
    #[error("couldn't refresh MIDI input devices: {0}")]
    Enumeration(#[source] BackendError),
    /// A newly enumerated device could not be opened
    #[error("couldn't open MIDI device {id}: {source}")]
    Open {
        id: String,
        #[source]
        source: BackendError,
    },
    /// An opened device refused the receive callback
    #[error("couldn't subscribe to MIDI device {id}: {source}")]
    Subscribe {
        id: String,
        #[source]
        source: BackendError,
    },
}

impl HandlerError {
    /// Probe failure with the platform hint attached
    pub fn initialization(source: BackendError) -> Self {
        HandlerError::Initialization {
            hint: probe_hint(),
            source,
        }
    }
}

/// Diagnostic for a failed device probe. ALSA is a separate package on Linux.
pub fn probe_hint() -> &'static str {
    if cfg!(target_os = "linux") {
        "Couldn't list input devices, is libasound2-dev installed?"
    } else {
        "Couldn't list input devices."
    }
}

pub type Result<T> = std::result::Result<T, HandlerError>;
