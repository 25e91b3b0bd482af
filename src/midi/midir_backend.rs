use crate::midi::backend::{
    BackendError, InputHandle, MidiBackend, PortDetails, ReceiveCallback, Result,
};
use log::{debug, trace};
use midir::{Ignore, MidiInput, MidiInputConnection, MidiInputPort};
use std::collections::HashMap;

impl From<midir::InitError> for BackendError {
    fn from(err: midir::InitError) -> Self {
        BackendError::Init(err.to_string())
    }
}

impl From<midir::PortInfoError> for BackendError {
    fn from(err: midir::PortInfoError) -> Self {
        BackendError::Connection(err.to_string())
    }
}

/// Hardware backend over midir. A fresh `MidiInput` client is created for
/// every enumeration and every opened port, since midir consumes the client
/// when connecting.
pub struct MidirBackend {
    client_name: String,
}

impl MidirBackend {
    pub fn new(client_name: impl Into<String>) -> Self {
        Self {
            client_name: client_name.into(),
        }
    }

    fn client(&self, suffix: &str) -> Result<MidiInput> {
        let mut midi_in = MidiInput::new(&format!("{}-{}", self.client_name, suffix))?;
        midi_in.ignore(Ignore::None);
        Ok(midi_in)
    }
}

impl Default for MidirBackend {
    fn default() -> Self {
        Self::new("midikeyrs")
    }
}

/// Assigns each port name an id that stays the same across enumerations:
/// the name itself, with `#n` appended for the n-th repeat of that name.
pub fn stable_ids<S: AsRef<str>>(names: &[S]) -> Vec<String> {
    let mut seen: HashMap<&str, usize> = HashMap::new();
    names
        .iter()
        .map(|name| {
            let name = name.as_ref();
            let count = seen.entry(name).or_insert(0);
            *count += 1;
            if *count == 1 {
                name.to_string()
            } else {
                format!("{}#{}", name, count)
            }
        })
        .collect()
}

/// Current ports of `midi_in` paired with their stable ids
fn enumerate(midi_in: &MidiInput) -> Result<Vec<(PortDetails, MidiInputPort)>> {
    let ports = midi_in.ports();
    let names = ports
        .iter()
        .map(|port| midi_in.port_name(port))
        .collect::<std::result::Result<Vec<_>, _>>()?;

    Ok(stable_ids(&names)
        .into_iter()
        .zip(names)
        .map(|(id, name)| PortDetails::new(id, name))
        .zip(ports)
        .collect())
}

impl MidiBackend for MidirBackend {
    fn list_inputs(&self) -> Result<Vec<PortDetails>> {
        let midi_in = self.client("list")?;
        let ports: Vec<PortDetails> = enumerate(&midi_in)?
            .into_iter()
            .map(|(details, _)| details)
            .collect();

        trace!("Enumerated {} MIDI input port(s)", ports.len());
        Ok(ports)
    }

    fn open_input(&self, id: &str) -> Result<Box<dyn InputHandle>> {
        let midi_in = self.client("in")?;
        let (details, port) = enumerate(&midi_in)?
            .into_iter()
            .find(|(details, _)| details.id == id)
            .ok_or_else(|| BackendError::PortNotFound(id.to_string()))?;
        debug!("Opened MIDI input port {} ({})", details.name, id);

        Ok(Box::new(MidirInput {
            id: details.id,
            port,
            input: Some(midi_in),
            connection: None,
        }))
    }
}

/// An opened midir port. Subscribing connects it; unsubscribing closes the
/// connection and keeps the client so the port can be connected again.
pub struct MidirInput {
    id: String,
    port: MidiInputPort,
    input: Option<MidiInput>,
    connection: Option<MidiInputConnection<()>>,
}

impl InputHandle for MidirInput {
    fn subscribe(&mut self, callback: ReceiveCallback) -> Result<()> {
        let input = self
            .input
            .take()
            .ok_or_else(|| BackendError::AlreadySubscribed(self.id.clone()))?;

        let id = self.id.clone();
        match input.connect(
            &self.port,
            "midikeyrs-input",
            move |_stamp, message, _| callback(&id, message),
            (),
        ) {
            Ok(connection) => {
                self.connection = Some(connection);
                Ok(())
            }
            Err(err) => {
                let msg = err.to_string();
                self.input = Some(err.into_inner());
                Err(BackendError::Connection(msg))
            }
        }
    }

    fn unsubscribe(&mut self) {
        if let Some(connection) = self.connection.take() {
            // No callback runs after close() returns
            let (input, ()) = connection.close();
            self.input = Some(input);
        }
    }
}
