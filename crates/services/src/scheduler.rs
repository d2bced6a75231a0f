//! Tick sources for attempt timers and background execution.
//!
//! Timers never call `tokio::time` directly; they ask a `Scheduler` to run
//! a task periodically and get back a handle that stops it. Tests drive a
//! `ManualScheduler` second by second instead of waiting on a wall clock.

use std::fmt;
use std::future::Future;
use std::pin::Pin;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};
use std::time::Duration;

use tokio::runtime::Handle;
use tokio::task::AbortHandle;
use tokio::time::{Instant, MissedTickBehavior};
use tracing::warn;

/// Whether a repeating task wants to run again.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TaskControl {
    Continue,
    Stop,
}

pub type RepeatingTask = Box<dyn FnMut() -> TaskControl + Send>;
pub type BackgroundTask = Pin<Box<dyn Future<Output = ()> + Send>>;

/// Cancellation handle for a scheduled task.
pub struct TaskHandle {
    cancelled: Arc<AtomicBool>,
    abort: Option<AbortHandle>,
}

impl TaskHandle {
    fn new(cancelled: Arc<AtomicBool>, abort: Option<AbortHandle>) -> Self {
        Self { cancelled, abort }
    }

    /// Stop the task. No invocation starts after this returns.
    pub fn cancel(&self) {
        self.cancelled.store(true, Ordering::Release);
        if let Some(abort) = &self.abort {
            abort.abort();
        }
    }

    #[must_use]
    pub fn is_cancelled(&self) -> bool {
        self.cancelled.load(Ordering::Acquire)
    }
}

impl fmt::Debug for TaskHandle {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("TaskHandle")
            .field("cancelled", &self.is_cancelled())
            .finish()
    }
}

pub trait Scheduler: Send + Sync {
    /// Run `task` every `period`, first after one full period.
    fn every(&self, period: Duration, task: RepeatingTask) -> TaskHandle;

    /// Run `task` to completion independently of the caller.
    fn spawn(&self, task: BackgroundTask);
}

/// Wall-clock scheduler on a tokio runtime.
#[derive(Clone, Debug)]
pub struct TokioScheduler {
    handle: Handle,
}

impl TokioScheduler {
    #[must_use]
    pub fn new(handle: Handle) -> Self {
        Self { handle }
    }

    /// Scheduler on the runtime of the calling context, if any.
    #[must_use]
    pub fn try_current() -> Option<Self> {
        Handle::try_current().ok().map(Self::new)
    }
}

impl Scheduler for TokioScheduler {
    fn every(&self, period: Duration, mut task: RepeatingTask) -> TaskHandle {
        let cancelled = Arc::new(AtomicBool::new(false));
        let flag = Arc::clone(&cancelled);
        let join = self.handle.spawn(async move {
            let mut interval = tokio::time::interval_at(Instant::now() + period, period);
            interval.set_missed_tick_behavior(MissedTickBehavior::Delay);
            loop {
                interval.tick().await;
                if flag.load(Ordering::Acquire) {
                    break;
                }
                if task() == TaskControl::Stop {
                    break;
                }
            }
        });
        TaskHandle::new(cancelled, Some(join.abort_handle()))
    }

    fn spawn(&self, task: BackgroundTask) {
        self.handle.spawn(task);
    }
}

struct ManualTask {
    period_secs: u64,
    next_due: u64,
    task: RepeatingTask,
    cancelled: Arc<AtomicBool>,
}

#[derive(Default)]
struct ManualState {
    now_secs: u64,
    tasks: Vec<ManualTask>,
}

/// Virtual-time scheduler. Time only moves when `advance` is called.
///
/// Background tasks still run on the ambient tokio runtime, since they are
/// network calls rather than timed work.
pub struct ManualScheduler {
    state: Mutex<ManualState>,
    runtime: Option<Handle>,
}

impl Default for ManualScheduler {
    fn default() -> Self {
        Self::new()
    }
}

impl ManualScheduler {
    #[must_use]
    pub fn new() -> Self {
        Self {
            state: Mutex::new(ManualState::default()),
            runtime: Handle::try_current().ok(),
        }
    }

    fn lock(&self) -> MutexGuard<'_, ManualState> {
        self.state.lock().unwrap_or_else(PoisonError::into_inner)
    }

    #[must_use]
    pub fn now_secs(&self) -> u64 {
        self.lock().now_secs
    }

    /// Tasks that have neither stopped nor been cancelled.
    #[must_use]
    pub fn active_tasks(&self) -> usize {
        self.lock()
            .tasks
            .iter()
            .filter(|t| !t.cancelled.load(Ordering::Acquire))
            .count()
    }

    /// Move virtual time forward one second at a time, running due tasks.
    ///
    /// Tasks run outside the internal lock, so they may schedule more work.
    pub fn advance(&self, secs: u64) {
        for _ in 0..secs {
            let (now, due) = {
                let mut state = self.lock();
                state.now_secs += 1;
                (state.now_secs, std::mem::take(&mut state.tasks))
            };
            let mut kept = Vec::with_capacity(due.len());
            for mut entry in due {
                if entry.cancelled.load(Ordering::Acquire) {
                    continue;
                }
                if entry.next_due <= now {
                    if (entry.task)() == TaskControl::Stop {
                        continue;
                    }
                    entry.next_due = now + entry.period_secs;
                }
                kept.push(entry);
            }
            let mut state = self.lock();
            kept.append(&mut state.tasks);
            state.tasks = kept;
        }
    }
}

impl Scheduler for ManualScheduler {
    fn every(&self, period: Duration, task: RepeatingTask) -> TaskHandle {
        let cancelled = Arc::new(AtomicBool::new(false));
        let period_secs = period.as_secs().max(1);
        let mut state = self.lock();
        let next_due = state.now_secs + period_secs;
        state.tasks.push(ManualTask {
            period_secs,
            next_due,
            task,
            cancelled: Arc::clone(&cancelled),
        });
        TaskHandle::new(cancelled, None)
    }

    fn spawn(&self, task: BackgroundTask) {
        match &self.runtime {
            Some(runtime) => {
                runtime.spawn(task);
            }
            None => warn!("manual scheduler has no runtime; background task dropped"),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::AtomicU32;

    fn counter(stop_after: u32) -> (Arc<AtomicU32>, RepeatingTask) {
        let count = Arc::new(AtomicU32::new(0));
        let seen = Arc::clone(&count);
        let task: RepeatingTask = Box::new(move || {
            let n = seen.fetch_add(1, Ordering::SeqCst) + 1;
            if n >= stop_after {
                TaskControl::Stop
            } else {
                TaskControl::Continue
            }
        });
        (count, task)
    }

    #[test]
    fn manual_runs_once_per_period() {
        let scheduler = ManualScheduler::new();
        let (count, task) = counter(u32::MAX);
        let _handle = scheduler.every(Duration::from_secs(1), task);
        scheduler.advance(5);
        assert_eq!(count.load(Ordering::SeqCst), 5);
        assert_eq!(scheduler.now_secs(), 5);
    }

    #[test]
    fn stopped_task_is_dropped() {
        let scheduler = ManualScheduler::new();
        let (count, task) = counter(3);
        let _handle = scheduler.every(Duration::from_secs(1), task);
        scheduler.advance(10);
        assert_eq!(count.load(Ordering::SeqCst), 3);
        assert_eq!(scheduler.active_tasks(), 0);
    }

    #[test]
    fn cancelled_task_never_runs_again() {
        let scheduler = ManualScheduler::new();
        let (count, task) = counter(u32::MAX);
        let handle = scheduler.every(Duration::from_secs(1), task);
        scheduler.advance(2);
        handle.cancel();
        scheduler.advance(5);
        assert_eq!(count.load(Ordering::SeqCst), 2);
        assert!(handle.is_cancelled());
    }

    #[tokio::test(start_paused = true)]
    async fn tokio_scheduler_ticks_on_the_runtime() {
        let scheduler = TokioScheduler::new(Handle::current());
        let (count, task) = counter(3);
        let _handle = scheduler.every(Duration::from_secs(1), task);
        tokio::time::sleep(Duration::from_secs(5)).await;
        assert_eq!(count.load(Ordering::SeqCst), 3);
    }
}
