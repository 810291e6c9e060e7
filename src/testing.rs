//! Testing utilities and mock implementations.
//!
//! These types are provided for use in tests. They may appear unused in
//! the library itself but are consumed by unit and integration tests.

#![allow(dead_code)]

use crate::error::{Error, Result};
use crate::tasks::models::Task;
use crate::traits::{Clock, Notifier};
use chrono::{DateTime, Duration, NaiveDate, TimeZone, Utc};
use std::sync::Mutex;

/// A clock that only moves when told to.
#[derive(Debug)]
pub struct MockClock {
    now: Mutex<DateTime<Utc>>,
    today: Mutex<Option<NaiveDate>>,
}

impl MockClock {
    /// Create a clock frozen at `start`.
    #[must_use]
    pub const fn new(start: DateTime<Utc>) -> Self {
        Self { now: Mutex::new(start), today: Mutex::new(None) }
    }

    /// Create a clock frozen at 2025-05-10 09:00:00 UTC.
    ///
    /// # Panics
    ///
    /// Never; the literal date is valid.
    #[must_use]
    pub fn at_default_start() -> Self {
        Self::new(Utc.with_ymd_and_hms(2025, 5, 10, 9, 0, 0).unwrap())
    }

    /// Move the clock forward.
    ///
    /// # Panics
    ///
    /// Panics if the mutex is poisoned.
    pub fn advance(&self, by: Duration) {
        let mut now = self.now.lock().unwrap();
        *now += by;
    }

    /// Move the clock forward by whole minutes.
    pub fn advance_minutes(&self, minutes: i64) {
        self.advance(Duration::minutes(minutes));
    }

    /// Jump to an absolute instant.
    ///
    /// # Panics
    ///
    /// Panics if the mutex is poisoned.
    pub fn set(&self, to: DateTime<Utc>) {
        *self.now.lock().unwrap() = to;
    }

    /// Pin the wall-clock date independently of the UTC instant, as for a
    /// user whose local day differs from the UTC day.
    ///
    /// # Panics
    ///
    /// Panics if the mutex is poisoned.
    pub fn set_today(&self, date: NaiveDate) {
        *self.today.lock().unwrap() = Some(date);
    }
}

impl Clock for MockClock {
    fn now(&self) -> DateTime<Utc> {
        *self.now.lock().unwrap()
    }

    fn today(&self) -> NaiveDate {
        self.today.lock().unwrap().unwrap_or_else(|| self.now().date_naive())
    }
}

/// A notifier that records deliveries and can be told to fail for some tasks.
#[derive(Debug, Default)]
pub struct MockNotifier {
    delivered: Mutex<Vec<i64>>,
    failing: Mutex<Vec<i64>>,
}

impl MockNotifier {
    /// Create a notifier that accepts everything.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Make deliveries for `task_id` fail.
    ///
    /// # Panics
    ///
    /// Panics if the mutex is poisoned.
    pub fn fail_for(&self, task_id: i64) {
        self.failing.lock().unwrap().push(task_id);
    }

    /// Ids of tasks that were successfully notified, in delivery order.
    ///
    /// # Panics
    ///
    /// Panics if the mutex is poisoned.
    #[must_use]
    pub fn delivered(&self) -> Vec<i64> {
        self.delivered.lock().unwrap().clone()
    }
}

impl Notifier for MockNotifier {
    fn notify(&self, task: &Task) -> Result<()> {
        if self.failing.lock().unwrap().contains(&task.id) {
            return Err(Error::Io(std::io::Error::new(
                std::io::ErrorKind::ConnectionReset,
                "transport unavailable",
            )));
        }
        self.delivered.lock().unwrap().push(task.id);
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_mock_clock_advances() {
        let clock = MockClock::at_default_start();
        let before = clock.now();
        clock.advance_minutes(10);
        assert_eq!(clock.now() - before, Duration::minutes(10));
    }

    #[test]
    fn test_mock_clock_set() {
        let clock = MockClock::at_default_start();
        let target = Utc.with_ymd_and_hms(2030, 1, 1, 0, 0, 0).unwrap();
        clock.set(target);
        assert_eq!(clock.now(), target);
    }
}
