//! Countdown state for a timed attempt.
//!
//! `AttemptTimer` is a plain value: it does not own a tick source. The
//! services layer drives `tick()` once per second and reacts to the
//! returned `TickOutcome`.

/// Remaining time at or below which the UI shows the low-time warning.
pub const LOW_TIME_THRESHOLD_SECS: u32 = 120;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum TimerPhase {
    Running,
    Expired,
    Cancelled,
}

/// Result of advancing the timer by one second.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TickOutcome {
    /// Still running with the given seconds left.
    Ticked { remaining: u32 },
    /// Reached zero on this tick. Returned exactly once per timer.
    Expired,
    /// Already expired or cancelled; nothing changed.
    Inactive,
}

/// Read-only view of the countdown for observers.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TimerSnapshot {
    pub remaining_secs: u32,
    pub running: bool,
}

impl TimerSnapshot {
    /// True during the last two minutes of a running countdown.
    #[must_use]
    pub fn is_low_time(&self) -> bool {
        self.running && self.remaining_secs > 0 && self.remaining_secs <= LOW_TIME_THRESHOLD_SECS
    }

    /// `mm:ss`, minutes unbounded.
    #[must_use]
    pub fn label(&self) -> String {
        format!("{}:{:02}", self.remaining_secs / 60, self.remaining_secs % 60)
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AttemptTimer {
    duration_secs: u32,
    remaining: u32,
    phase: TimerPhase,
}

impl AttemptTimer {
    #[must_use]
    pub fn new(duration_secs: u32) -> Self {
        Self {
            duration_secs,
            remaining: duration_secs,
            phase: TimerPhase::Running,
        }
    }

    #[must_use]
    pub fn from_minutes(duration_minutes: u32) -> Self {
        Self::new(duration_minutes.saturating_mul(60))
    }

    #[must_use]
    pub fn duration_secs(&self) -> u32 {
        self.duration_secs
    }

    #[must_use]
    pub fn remaining_secs(&self) -> u32 {
        self.remaining
    }

    #[must_use]
    pub fn is_running(&self) -> bool {
        self.phase == TimerPhase::Running
    }

    #[must_use]
    pub fn is_expired(&self) -> bool {
        self.phase == TimerPhase::Expired
    }

    #[must_use]
    pub fn snapshot(&self) -> TimerSnapshot {
        TimerSnapshot {
            remaining_secs: self.remaining,
            running: self.is_running(),
        }
    }

    /// Advance by one second.
    pub fn tick(&mut self) -> TickOutcome {
        if self.phase != TimerPhase::Running {
            return TickOutcome::Inactive;
        }
        if self.remaining > 1 {
            self.remaining -= 1;
            return TickOutcome::Ticked {
                remaining: self.remaining,
            };
        }
        self.remaining = 0;
        self.phase = TimerPhase::Expired;
        TickOutcome::Expired
    }

    /// Stop the countdown. Returns `false` if it had already stopped.
    pub fn cancel(&mut self) -> bool {
        if self.phase != TimerPhase::Running {
            return false;
        }
        self.phase = TimerPhase::Cancelled;
        true
    }
}
