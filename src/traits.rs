//! Core traits for testability and abstraction.

use crate::error::Result;
use crate::tasks::models::Task;
use chrono::{DateTime, Local, NaiveDate, Utc};

/// Source of the current time.
///
/// The stores never call `Utc::now()` directly so that elapsed-time
/// accounting can be tested deterministically.
pub trait Clock: Send + Sync {
    /// The current instant.
    fn now(&self) -> DateTime<Utc>;

    /// Today's date on the user's wall clock. Short `MM/DD` schedules take
    /// their year from here.
    fn today(&self) -> NaiveDate {
        self.now().date_naive()
    }
}

/// Clock backed by the system time.
#[derive(Debug, Clone, Copy, Default)]
pub struct SystemClock;

impl Clock for SystemClock {
    fn now(&self) -> DateTime<Utc> {
        Utc::now()
    }

    fn today(&self) -> NaiveDate {
        Local::now().date_naive()
    }
}

/// Delivery channel for task reminders.
///
/// Implementations wrap whatever transport the surrounding application uses
/// (chat DM, email, desktop notification).
pub trait Notifier {
    /// Deliver a reminder for `task`.
    ///
    /// # Errors
    ///
    /// Returns an error if the reminder could not be delivered.
    fn notify(&self, task: &Task) -> Result<()>;
}
