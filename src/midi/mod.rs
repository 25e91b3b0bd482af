//! MIDI input functionality for midikeyrs
//!
//! This module provides:
//! - Running-status decoding of raw MIDI byte streams
//! - The key identifier model carried by note events
//! - The device backend abstraction, with a midir implementation for real
//!   hardware and an in-memory mock for tests
//!
//! The main components are:
//! - [`decode`] for turning raw bytes into [`DecodedEvent`]s
//! - [`MidiBackend`] and [`InputHandle`] for device enumeration and callbacks
//! - [`MidirBackend`] for real MIDI devices
//! - [`MockBackend`] for testing
//!
pub mod backend;
pub mod decoder;
mod key;
pub mod midir_backend;
pub mod mock_backend;

pub use backend::{BackendError, InputHandle, MidiBackend, PortDetails, ReceiveCallback};
pub use decoder::{decode, DecodeError, DecodeOutput, DecodedEvent, EventKind};
pub use key::MidiKey;

pub use midir_backend::MidirBackend;
pub use mock_backend::MockBackend;
