use crossbeam::channel::{self, Sender};
use log::trace;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Mutex, PoisonError};
use std::thread;
use std::time::{Duration, Instant};

pub type PeriodicTask = Box<dyn FnMut() + Send + 'static>;

pub trait Scheduler: Send + Sync {
    fn spawn<F>(&self, f: F)
    where
        F: FnOnce() + Send + 'static,
        Self: Sized;

    /// Runs `task` after `initial_delay`, then every `period`, until the
    /// returned handle is cancelled or dropped.
    fn schedule_periodic(
        &self,
        task: PeriodicTask,
        initial_delay: Duration,
        period: Duration,
    ) -> ScheduledTask;
}

/// Cancellation handle for a periodic task. Dropping it cancels the task.
pub struct ScheduledTask {
    cancelled: Arc<AtomicBool>,
    wake: Option<Sender<()>>,
}

impl ScheduledTask {
    fn new(cancelled: Arc<AtomicBool>, wake: Option<Sender<()>>) -> Self {
        Self { cancelled, wake }
    }

    /// Stops future runs. A run already in progress is not interrupted.
    pub fn cancel(&mut self) {
        self.cancelled.store(true, Ordering::SeqCst);
        // Disconnecting the channel wakes a sleeping timer thread
        self.wake.take();
    }

    pub fn is_cancelled(&self) -> bool {
        self.cancelled.load(Ordering::SeqCst)
    }
}

impl Drop for ScheduledTask {
    fn drop(&mut self) {
        self.cancel();
    }
}

pub struct ThreadScheduler;

impl ThreadScheduler {
    pub fn new() -> Self {
        ThreadScheduler
    }
}

impl Default for ThreadScheduler {
    fn default() -> Self {
        Self::new()
    }
}

impl Scheduler for ThreadScheduler {
    fn spawn<F>(&self, f: F)
    where
        F: FnOnce() + Send + 'static,
    {
        let _ = thread::spawn(f);
    }

    fn schedule_periodic(
        &self,
        mut task: PeriodicTask,
        initial_delay: Duration,
        period: Duration,
    ) -> ScheduledTask {
        let cancelled = Arc::new(AtomicBool::new(false));
        let (wake_tx, wake_rx) = channel::bounded::<()>(0);
        let flag = Arc::clone(&cancelled);

        let _ = thread::spawn(move || {
            let mut next = Instant::now() + initial_delay;
            loop {
                let woken = crossbeam::select! {
                    recv(wake_rx) -> _ => true,
                    recv(channel::at(next)) -> _ => false,
                };
                if woken || flag.load(Ordering::SeqCst) {
                    break;
                }

                task();

                // Fixed rate; skip missed runs instead of bursting
                next += period;
                let now = Instant::now();
                if next < now {
                    next = now;
                }
            }
            trace!("Periodic task stopped");
        });

        ScheduledTask::new(cancelled, Some(wake_tx))
    }
}

struct ManualTask {
    task: PeriodicTask,
    cancelled: Arc<AtomicBool>,
    initial_delay: Duration,
    period: Duration,
}

/// Scheduler driven by explicit [`ManualScheduler::tick`] calls, for tests
/// that need deterministic poll cycles.
#[derive(Default)]
pub struct ManualScheduler {
    tasks: Mutex<Vec<ManualTask>>,
}

impl ManualScheduler {
    pub fn new() -> Self {
        Self::default()
    }

    /// Runs every live periodic task once. Returns how many ran.
    pub fn tick(&self) -> usize {
        let mut tasks = std::mem::take(&mut *self.lock());
        tasks.retain(|t| !t.cancelled.load(Ordering::SeqCst));

        let mut ran = 0;
        for entry in tasks.iter_mut() {
            // Cancellation from an earlier task in this tick applies too
            if !entry.cancelled.load(Ordering::SeqCst) {
                (entry.task)();
                ran += 1;
            }
        }

        let mut current = self.lock();
        tasks.append(&mut current);
        *current = tasks;
        ran
    }

    pub fn active_tasks(&self) -> usize {
        self.lock()
            .iter()
            .filter(|t| !t.cancelled.load(Ordering::SeqCst))
            .count()
    }

    /// `(initial_delay, period)` of each live task
    pub fn schedules(&self) -> Vec<(Duration, Duration)> {
        self.lock()
            .iter()
            .filter(|t| !t.cancelled.load(Ordering::SeqCst))
            .map(|t| (t.initial_delay, t.period))
            .collect()
    }

    fn lock(&self) -> std::sync::MutexGuard<'_, Vec<ManualTask>> {
        self.tasks.lock().unwrap_or_else(PoisonError::into_inner)
    }
}

impl Scheduler for ManualScheduler {
    fn spawn<F>(&self, f: F)
    where
        F: FnOnce() + Send + 'static,
    {
        f();
    }

    fn schedule_periodic(
        &self,
        task: PeriodicTask,
        initial_delay: Duration,
        period: Duration,
    ) -> ScheduledTask {
        let cancelled = Arc::new(AtomicBool::new(false));
        self.lock().push(ManualTask {
            task,
            cancelled: Arc::clone(&cancelled),
            initial_delay,
            period,
        });
        ScheduledTask::new(cancelled, None)
    }
}
