use std::sync::{Arc, Mutex, MutexGuard, PoisonError};
use std::time::Duration;

use quiz_core::{AttemptTimer, TickOutcome, TimerSnapshot};
use tokio::sync::watch;
use tracing::{debug, info};

use crate::scheduler::{Scheduler, TaskControl, TaskHandle};

const TICK: Duration = Duration::from_secs(1);

pub type ExpiredCallback = Box<dyn FnOnce() + Send>;

/// Drives an `AttemptTimer` from a scheduler and publishes every tick.
pub struct TimerRunner {
    timer: Arc<Mutex<AttemptTimer>>,
    snapshots: Arc<watch::Sender<TimerSnapshot>>,
    task: TaskHandle,
}

fn lock(timer: &Mutex<AttemptTimer>) -> MutexGuard<'_, AttemptTimer> {
    timer.lock().unwrap_or_else(PoisonError::into_inner)
}

impl TimerRunner {
    /// Start ticking `timer` once per second.
    ///
    /// `on_expired` runs at most once, on the tick that reaches zero. A zero
    /// duration expires on the first tick.
    #[must_use]
    pub fn start(scheduler: &dyn Scheduler, timer: AttemptTimer, on_expired: ExpiredCallback) -> Self {
        let (snapshots, _) = watch::channel(timer.snapshot());
        let snapshots = Arc::new(snapshots);
        let timer = Arc::new(Mutex::new(timer));

        let shared = Arc::clone(&timer);
        let publish = Arc::clone(&snapshots);
        let mut on_expired = Some(on_expired);
        let task = scheduler.every(
            TICK,
            Box::new(move || {
                let (outcome, snapshot) = {
                    let mut timer = lock(&shared);
                    (timer.tick(), timer.snapshot())
                };
                publish.send_replace(snapshot);
                match outcome {
                    TickOutcome::Ticked { .. } => TaskControl::Continue,
                    TickOutcome::Expired => {
                        info!("attempt timer expired");
                        if let Some(callback) = on_expired.take() {
                            callback();
                        }
                        TaskControl::Stop
                    }
                    TickOutcome::Inactive => TaskControl::Stop,
                }
            }),
        );

        Self {
            timer,
            snapshots,
            task,
        }
    }

    #[must_use]
    pub fn subscribe(&self) -> watch::Receiver<TimerSnapshot> {
        self.snapshots.subscribe()
    }

    #[must_use]
    pub fn snapshot(&self) -> TimerSnapshot {
        lock(&self.timer).snapshot()
    }

    /// Stop the countdown. Returns `false` if it had already stopped.
    pub fn cancel(&self) -> bool {
        let (stopped, snapshot) = {
            let mut timer = lock(&self.timer);
            (timer.cancel(), timer.snapshot())
        };
        self.task.cancel();
        if stopped {
            debug!(remaining = snapshot.remaining_secs, "attempt timer cancelled");
            self.snapshots.send_replace(snapshot);
        }
        stopped
    }
}
