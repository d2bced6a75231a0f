use chrono::{DateTime, Duration, Utc};
use std::sync::{Arc, Mutex, PoisonError};

/// Source of "now" for cache deadlines and attempt timestamps.
///
/// `Manual` clocks share their instant between clones, so a test can hand a
/// clone to a cache and advance time from the outside.
#[derive(Debug, Clone, Default)]
pub enum Clock {
    #[default]
    System,
    Fixed(DateTime<Utc>),
    Manual(Arc<Mutex<DateTime<Utc>>>),
}

impl Clock {
    /// Wall-clock time.
    #[must_use]
    pub fn system() -> Self {
        Self::System
    }

    /// Returns a clock frozen at the given timestamp.
    #[must_use]
    pub fn fixed(at: DateTime<Utc>) -> Self {
        Self::Fixed(at)
    }

    /// Returns a shared, manually advanced clock starting at `at`.
    #[must_use]
    pub fn manual(at: DateTime<Utc>) -> Self {
        Self::Manual(Arc::new(Mutex::new(at)))
    }

    #[must_use]
    pub fn now(&self) -> DateTime<Utc> {
        match self {
            Clock::System => Utc::now(),
            Clock::Fixed(t) => *t,
            Clock::Manual(t) => *t.lock().unwrap_or_else(PoisonError::into_inner),
        }
    }

    /// Advance a manual clock (visible to every clone) or a fixed clock.
    ///
    /// Has no effect on `Clock::System`.
    pub fn advance(&mut self, delta: Duration) {
        match self {
            Clock::System => {}
            Clock::Fixed(t) => *t += delta,
            Clock::Manual(t) => *t.lock().unwrap_or_else(PoisonError::into_inner) += delta,
        }
    }
}

/// 2023-11-14T22:13:20Z, the instant every test fixture starts from.
pub const FIXED_TEST_TIMESTAMP: i64 = 1_700_000_000;

#[must_use]
pub fn fixed_now() -> DateTime<Utc> {
    DateTime::<Utc>::from_timestamp(FIXED_TEST_TIMESTAMP, 0).unwrap_or(DateTime::<Utc>::UNIX_EPOCH)
}

#[must_use]
pub fn fixed_clock() -> Clock {
    Clock::fixed(fixed_now())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn manual_clock_is_shared_between_clones() {
        let mut clock = Clock::manual(fixed_now());
        let observer = clock.clone();
        clock.advance(Duration::seconds(30));
        assert_eq!(observer.now(), fixed_now() + Duration::seconds(30));
    }

    #[test]
    fn fixed_clock_advances_only_itself() {
        let mut clock = fixed_clock();
        let copy = clock.clone();
        clock.advance(Duration::seconds(5));
        assert_eq!(copy.now(), fixed_now());
        assert_eq!(clock.now(), fixed_now() + Duration::seconds(5));
    }
}
