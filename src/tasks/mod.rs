//! Task tracking.
//!
//! This module provides:
//! - Tasks with an optional schedule, duration estimate, deadline, location
//!   and priority flag
//! - A `pending -> in_progress -> done` lifecycle with per-session time
//!   accounting
//! - Mirrored copies of a task for other users
//! - Day and week views over scheduled tasks
//!
//! # Example
//!
//! ```no_run
//! use taskbot::tasks::{NewTask, SqliteTaskStore, TaskStore};
//!
//! let store = SqliteTaskStore::open("/tmp/taskbot.sqlite3").unwrap();
//!
//! let task = store.create("alice", NewTask::new("Write report").scheduled("05/10 14:00")).unwrap();
//! store.start(task.id, "alice").unwrap();
//! let done = store.finish("alice", None).unwrap();
//! println!("{} took {:.1} minutes", done.description, done.accumulated_duration_minutes);
//! ```

pub mod calendar;
pub mod models;
pub mod schedule;
pub mod store;

pub use calendar::{day_window, group_by_weekday, week_window, DayBucket, Window};
pub use models::{
    InvalidStatus, MirrorRequest, NewTask, Status, Task, TaskEdit, TaskSummary,
    DEFAULT_DURATION_MINUTES,
};
pub use store::{SqliteTaskStore, TaskStore};

use crate::error::Result;
use chrono::NaiveDate;

/// The owner's tasks scheduled on `date`, earliest first.
///
/// # Errors
///
/// Returns an error if the store cannot be queried.
pub fn tasks_on_day(store: &impl TaskStore, owner: &str, date: NaiveDate) -> Result<Vec<Task>> {
    let window = day_window(date);
    store.list_due_between(owner, window.start, window.end)
}

/// The owner's tasks in the week containing `date`, bucketed Monday first.
///
/// # Errors
///
/// Returns an error if the store cannot be queried.
pub fn week_agenda(store: &impl TaskStore, owner: &str, date: NaiveDate) -> Result<Vec<DayBucket>> {
    let window = week_window(date);
    Ok(group_by_weekday(store.list_due_between(owner, window.start, window.end)?))
}
