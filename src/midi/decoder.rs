//! Running-status MIDI byte-stream decoding
//!
//! [`decode`] is a pure function: the caller owns the running-status byte of
//! the device the buffer came from and stores the returned value back.

use thiserror::Error;

pub const NOTE_OFF: u8 = 0x80;
pub const NOTE_ON: u8 = 0x90;
const SYSEX_START: u8 = 0xF0;
const SYSEX_END: u8 = 0xF7;

/// Raw velocity reported as an intensity of 1.0
pub const VELOCITY_SCALE: f32 = 64.0;

/// Status family of a decoded message, as far as the dispatcher cares
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EventKind {
    NoteOn,
    NoteOff,
    Other,
}

/// A single decoded MIDI message. Missing data bytes are reported as 0.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DecodedEvent {
    pub status: u8,
    pub data1: u8,
    pub data2: u8,
}

impl DecodedEvent {
    pub fn new(status: u8, data1: u8, data2: u8) -> Self {
        Self {
            status,
            data1,
            data2,
        }
    }

    pub fn kind(&self) -> EventKind {
        match self.status & 0xF0 {
            NOTE_ON => EventKind::NoteOn,
            NOTE_OFF => EventKind::NoteOff,
            _ => EventKind::Other,
        }
    }

    /// Channel (0-15) for channel voice messages, `None` for system messages
    pub fn channel(&self) -> Option<u8> {
        if self.status < 0xF0 {
            Some(self.status & 0x0F)
        } else {
            None
        }
    }

    /// Velocity normalized against [`VELOCITY_SCALE`], so 64 reads as 1.0
    pub fn intensity(&self) -> f32 {
        f32::from(self.data2) / VELOCITY_SCALE
    }
}

/// Non-fatal problems found while decoding a buffer
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum DecodeError {
    /// A data byte arrived with no usable running status for the device
    #[error("data byte {byte:#04X} received with no running status")]
    MissingRunningStatus { byte: u8 },
    /// The buffer ended (or a status byte interrupted) mid-message
    #[error("status {status:#04X} needs {expected} data byte(s), got {available}")]
    Truncated {
        status: u8,
        expected: usize,
        available: usize,
    },
}

/// Everything one call to [`decode`] produced
#[derive(Debug, Clone, Default, PartialEq)]
pub struct DecodeOutput {
    pub events: Vec<DecodedEvent>,
    pub running_status: Option<u8>,
    pub errors: Vec<DecodeError>,
}

/// Number of data bytes following a status byte. SysEx is variable and handled
/// separately.
pub fn data_length(status: u8) -> usize {
    match status & 0xF0 {
        0xC0 | 0xD0 => 1,
        0xF0 => match status {
            0xF1 | 0xF3 => 1,
            0xF2 => 2,
            _ => 0,
        },
        _ => 2,
    }
}

/// Decodes `bytes` starting from the device's prior running status.
pub fn decode(bytes: &[u8], running_status: Option<u8>) -> DecodeOutput {
    let mut out = DecodeOutput {
        running_status,
        ..Default::default()
    };
    let mut i = 0;

    while i < bytes.len() {
        let first = bytes[i];

        if first == SYSEX_START {
            out.running_status = Some(first);
            out.events.push(DecodedEvent::new(first, 0, 0));
            i = sysex_end(bytes, i + 1);
            continue;
        }

        let (status, data_start) = if first >= 0x80 {
            out.running_status = Some(first);
            (first, i + 1)
        } else {
            match out.running_status {
                // System messages never establish running status
                Some(status) if status < 0xF0 => (status, i),
                _ => {
                    out.errors
                        .push(DecodeError::MissingRunningStatus { byte: first });
                    i = skip_data(bytes, i);
                    continue;
                }
            }
        };

        let expected = data_length(status);
        let available = bytes[data_start..]
            .iter()
            .take(expected)
            .take_while(|b| **b < 0x80)
            .count();

        if available < expected {
            out.errors.push(DecodeError::Truncated {
                status,
                expected,
                available,
            });
            i = data_start + available;
            continue;
        }

        let data = &bytes[data_start..data_start + expected];
        out.events.push(DecodedEvent::new(
            status,
            data.first().copied().unwrap_or(0),
            data.get(1).copied().unwrap_or(0),
        ));
        i = data_start + expected;
    }

    out
}

/// Index just past the SysEx terminator, or the end of the buffer.
fn sysex_end(bytes: &[u8], from: usize) -> usize {
    bytes[from..]
        .iter()
        .position(|b| *b == SYSEX_END)
        .map_or(bytes.len(), |pos| from + pos + 1)
}

/// Index of the next status byte at or after `from`.
fn skip_data(bytes: &[u8], from: usize) -> usize {
    bytes[from..]
        .iter()
        .position(|b| *b >= 0x80)
        .map_or(bytes.len(), |pos| from + pos)
}
