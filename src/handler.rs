//! MIDI input handler: probe, enable/disable lifecycle and wiring
//!
//! [`MidiInputHandler::set_enabled`] is the only transition function between
//! [`Lifecycle::Stopped`] and [`Lifecycle::Running`]; it alone starts or
//! cancels the hot-plug poll and releases devices on disable.

use crate::dispatcher::{EventDispatcher, InputQueue};
use crate::error::{HandlerError, Result};
use crate::hotplug::{HotplugPoller, RefreshReport};
use crate::midi::MidiBackend;
use crate::registry::{DeviceInfo, DeviceRegistry};
use crate::scheduler::{ScheduledTask, Scheduler};
use log::{debug, error, info, warn};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};
use std::time::Duration;

pub const DEFAULT_POLL_INTERVAL: Duration = Duration::from_millis(500);

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HandlerOptions {
    /// Initial value of the Enabled option, applied by `initialize`
    pub enabled: bool,
    pub poll_interval: Duration,
}

impl Default for HandlerOptions {
    fn default() -> Self {
        Self {
            enabled: true,
            poll_interval: DEFAULT_POLL_INTERVAL,
        }
    }
}

pub enum Lifecycle {
    Stopped,
    Running { poll: ScheduledTask },
}

struct Inner {
    poller: HotplugPoller,
    registry: Arc<DeviceRegistry>,
    lifecycle: Mutex<Lifecycle>,
}

impl Inner {
    fn lifecycle(&self) -> MutexGuard<'_, Lifecycle> {
        self.lifecycle.lock().unwrap_or_else(PoisonError::into_inner)
    }

    /// Refreshes while holding the lifecycle lock, so a disable waits for the
    /// cycle and a cycle started after a disable does nothing.
    fn refresh(&self) -> Result<RefreshReport> {
        let lifecycle = self.lifecycle();
        match *lifecycle {
            Lifecycle::Running { .. } => self.poller.refresh(),
            Lifecycle::Stopped => {
                debug!("Skipping MIDI refresh, input is disabled");
                Ok(RefreshReport::default())
            }
        }
    }

    fn poll(&self) {
        if let Err(e) = self.refresh() {
            error!("MIDI device refresh failed: {}", e);
        }
    }
}

pub struct MidiInputHandler {
    inner: Arc<Inner>,
    backend: Arc<dyn MidiBackend>,
    scheduler: Arc<dyn Scheduler>,
    dispatcher: Arc<EventDispatcher>,
    options: HandlerOptions,
    active: AtomicBool,
}

impl MidiInputHandler {
    pub fn new(
        backend: Arc<dyn MidiBackend>,
        scheduler: Arc<dyn Scheduler>,
        options: HandlerOptions,
    ) -> Self {
        let registry = Arc::new(DeviceRegistry::new());
        let queue = Arc::new(InputQueue::new());
        let dispatcher = Arc::new(EventDispatcher::new(Arc::clone(&registry), queue));
        let poller = HotplugPoller::new(
            Arc::clone(&backend),
            Arc::clone(&registry),
            dispatcher.callback(),
        );

        Self {
            inner: Arc::new(Inner {
                poller,
                registry,
                lifecycle: Mutex::new(Lifecycle::Stopped),
            }),
            backend,
            scheduler,
            dispatcher,
            options,
            active: AtomicBool::new(false),
        }
    }

    /// Probes device enumeration once. On failure the handler stays inactive
    /// for good; on success the configured Enabled value is applied. Later
    /// calls on an active handler do not probe again.
    pub fn initialize(&self) -> bool {
        if self.is_active() {
            debug!("MIDI input handler already initialized");
            return true;
        }

        match self.backend.list_inputs() {
            Ok(ports) => {
                debug!("MIDI probe found {} input device(s)", ports.len());
                self.active.store(true, Ordering::SeqCst);
                self.set_enabled(self.options.enabled);
                true
            }
            Err(source) => {
                error!("{}", HandlerError::initialization(source));
                self.active.store(false, Ordering::SeqCst);
                false
            }
        }
    }

    pub fn is_active(&self) -> bool {
        self.active.load(Ordering::SeqCst)
    }

    pub fn is_enabled(&self) -> bool {
        matches!(*self.inner.lifecycle(), Lifecycle::Running { .. })
    }

    pub fn set_enabled(&self, enabled: bool) {
        if !self.is_active() {
            warn!("MIDI input handler is not active, ignoring enabled={}", enabled);
            return;
        }

        let mut lifecycle = self.inner.lifecycle();
        if enabled {
            if let Lifecycle::Running { .. } = *lifecycle {
                debug!("MIDI input already enabled");
                return;
            }

            let inner = Arc::downgrade(&self.inner);
            let poll = self.scheduler.schedule_periodic(
                Box::new(move || {
                    if let Some(inner) = inner.upgrade() {
                        inner.poll();
                    }
                }),
                Duration::ZERO,
                self.options.poll_interval,
            );
            *lifecycle = Lifecycle::Running { poll };
            info!(
                "MIDI input enabled, polling devices every {:?}",
                self.options.poll_interval
            );
        } else {
            let Lifecycle::Running { poll } = &mut *lifecycle else {
                debug!("MIDI input already disabled");
                return;
            };

            poll.cancel();
            *lifecycle = Lifecycle::Stopped;
            let released = self.inner.registry.clear();
            info!("MIDI input disabled, released {} device(s)", released.len());
        }
    }

    /// Runs one hot-plug cycle now. Does nothing while disabled.
    pub fn refresh(&self) -> Result<RefreshReport> {
        self.inner.refresh()
    }

    pub fn devices(&self) -> Vec<DeviceInfo> {
        self.inner.registry.devices()
    }

    /// Sorted ids of the open devices
    pub fn open_device_ids(&self) -> Vec<String> {
        self.inner.registry.ids()
    }

    pub fn registry(&self) -> &Arc<DeviceRegistry> {
        &self.inner.registry
    }

    pub fn dispatcher(&self) -> &Arc<EventDispatcher> {
        &self.dispatcher
    }

    /// Pending key events produced by the dispatcher
    pub fn queue(&self) -> &Arc<InputQueue> {
        self.dispatcher.queue()
    }
}

impl Drop for MidiInputHandler {
    fn drop(&mut self) {
        if self.is_active() {
            self.set_enabled(false);
        }
    }
}
