//! Reminders for tasks that are about to start.
//!
//! The scan is stateless: it selects pending tasks scheduled inside
//! `[now, now + lead)` and hands each to a [`Notifier`]. A failed delivery
//! is logged and counted. It never changes the task and is not retried, so
//! running the scan on a fixed interval shorter than `lead` may remind the
//! same task more than once.

use crate::error::Result;
use crate::tasks::store::TaskStore;
use crate::traits::Notifier;
use chrono::{Duration, NaiveDateTime};
use serde::Serialize;

/// Outcome of one reminder scan.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct ReminderReport {
    /// Ids of tasks whose reminder was delivered.
    pub notified: Vec<i64>,
    /// Ids of tasks whose reminder failed.
    pub failed: Vec<i64>,
}

/// Notify every pending task scheduled within `lead` of `now`.
///
/// `now` is wall-clock time in the same frame as task schedules.
///
/// # Errors
///
/// Returns an error only if the store cannot be queried; delivery failures
/// are reported in the [`ReminderReport`].
pub fn scan_and_notify(
    store: &impl TaskStore,
    notifier: &impl Notifier,
    now: NaiveDateTime,
    lead: Duration,
) -> Result<ReminderReport> {
    let due = store.pending_due_between(now, now + lead)?;
    tracing::debug!(count = due.len(), %now, "reminder scan");

    let mut report = ReminderReport::default();
    for task in due {
        match notifier.notify(&task) {
            Ok(()) => report.notified.push(task.id),
            Err(e) => {
                tracing::warn!(task_id = task.id, owner = %task.owner, error = %e, "reminder delivery failed");
                report.failed.push(task.id);
            }
        }
    }
    Ok(report)
}
