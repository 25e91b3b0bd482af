use crate::midi::PortDetails;
use clap::Parser;
use std::path::PathBuf;

#[derive(Parser, Debug)]
#[command(author, version, about, long_about = None)]
pub struct Args {
    /// List available MIDI input devices and exit
    #[arg(long)]
    pub list_devices: bool,

    /// Configuration file (defaults to ./midikeyrs.toml when present)
    #[arg(long, value_name = "PATH")]
    pub config: Option<PathBuf>,

    /// Start with MIDI input disabled
    #[arg(long)]
    pub disabled: bool,

    /// Hot-plug poll period in milliseconds
    #[arg(long, value_name = "MS")]
    pub poll_interval_ms: Option<u64>,

    /// Log to stderr (honours RUST_LOG) instead of the log file
    #[arg(long)]
    pub log_stderr: bool,
}

pub fn format_device_list(ports: &[PortDetails]) -> Vec<String> {
    ports
        .iter()
        .map(|port| format!("  - {} [{}]", port.name, port.id))
        .collect()
}
