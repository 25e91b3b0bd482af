pub mod cli;
pub mod config;
pub mod dispatcher;
pub mod error;
pub mod event_loop;
pub mod handler;
pub mod hotplug;
pub mod logging;
pub mod midi;
pub mod registry;
pub mod scheduler;
pub mod state;

pub use cli::Args;
pub use dispatcher::{EventDispatcher, InputQueue, KeyInputEvent};
pub use error::HandlerError;
pub use handler::{HandlerOptions, MidiInputHandler};
pub use hotplug::RefreshReport;
pub use registry::{DeviceInfo, DeviceRegistry};
pub use scheduler::{ManualScheduler, ScheduledTask, Scheduler, ThreadScheduler};

use std::sync::Arc;

pub fn create_scheduler() -> Arc<ThreadScheduler> {
    Arc::new(ThreadScheduler::new())
}
