//! Task model types.

use chrono::{DateTime, NaiveDateTime, Utc};
use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;

/// Default duration estimate for a task, in minutes.
pub const DEFAULT_DURATION_MINUTES: u32 = 15;

/// Task lifecycle status.
///
/// Legal transitions are `pending -> in_progress -> done` and
/// `in_progress -> pending` (delay). Nothing leaves `done`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Status {
    /// Not started, or delayed back from `in_progress`.
    #[default]
    Pending,
    /// A work session is running.
    InProgress,
    /// Finished. Terminal.
    Done,
}

impl Status {
    /// Parse a status from a string.
    ///
    /// # Errors
    ///
    /// Returns an error if the string is not a valid status.
    #[allow(clippy::should_implement_trait)]
    pub fn from_str(s: &str) -> Result<Self, InvalidStatus> {
        match s.trim().to_lowercase().as_str() {
            "pending" => Ok(Self::Pending),
            "in_progress" | "in-progress" => Ok(Self::InProgress),
            "done" => Ok(Self::Done),
            _ => Err(InvalidStatus(s.to_string())),
        }
    }

    /// Get the string representation of the status.
    #[must_use]
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::Pending => "pending",
            Self::InProgress => "in_progress",
            Self::Done => "done",
        }
    }
}

impl std::fmt::Display for Status {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// Error when an invalid status string is provided.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct InvalidStatus(pub String);

impl std::fmt::Display for InvalidStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "invalid status: '{}' (must be one of: pending, in_progress, done)", self.0)
    }
}

impl std::error::Error for InvalidStatus {}

/// A task owned by one user.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Task {
    /// Database-assigned identifier.
    pub id: i64,
    /// Identity of the user who owns the task.
    pub owner: String,
    /// What needs doing.
    pub description: String,
    /// Current lifecycle status.
    pub status: Status,
    /// Planned wall-clock start, if scheduled.
    pub scheduled_at: Option<NaiveDateTime>,
    /// Estimated duration in minutes.
    pub duration_estimate_minutes: u32,
    /// Optional wall-clock deadline. Not ordered against `scheduled_at`.
    pub deadline: Option<NaiveDateTime>,
    /// Optional place or URL.
    pub location: Option<String>,
    /// Whether the task is flagged as a priority.
    pub priority: bool,
    /// Other users who received an independent copy of this task.
    pub mirrored_owners: BTreeSet<String>,
    /// Start of the running session. Set only while `in_progress`.
    pub started_at: Option<DateTime<Utc>>,
    /// When the task was finished.
    pub stopped_at: Option<DateTime<Utc>>,
    /// Number of times the task entered `in_progress`.
    pub session_count: u32,
    /// Total minutes credited by completed sessions.
    pub accumulated_duration_minutes: f64,
    /// When the task was created.
    pub created_at: DateTime<Utc>,
}

impl Task {
    /// Check if a work session is running.
    #[must_use]
    pub fn is_in_progress(&self) -> bool {
        self.status == Status::InProgress
    }

    /// Check if the task is finished.
    #[must_use]
    pub fn is_done(&self) -> bool {
        self.status == Status::Done
    }
}

/// A copy of a new task to be created for another user.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MirrorRequest {
    /// The user who receives the copy.
    pub owner: String,
    /// When the copy is scheduled (`MM/DD HH:MM` or `YYYY-MM-DD HH:MM`).
    pub schedule: String,
}

/// Unvalidated input for creating a task.
///
/// Scheduling fields are raw strings exactly as the user typed them; the
/// store validates them in `create`. Blank strings mean "not supplied".
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct NewTask {
    /// Task description (required, non-empty).
    pub description: String,
    /// Planned start, `MM/DD HH:MM` (current year) or `YYYY-MM-DD HH:MM`.
    #[serde(default)]
    pub schedule: Option<String>,
    /// Duration estimate in minutes (positive integer, default 15).
    #[serde(default)]
    pub duration: Option<String>,
    /// Deadline, `YYYY-MM-DD HH:MM`.
    #[serde(default)]
    pub deadline: Option<String>,
    /// Place or URL.
    #[serde(default)]
    pub location: Option<String>,
    /// Priority flag.
    #[serde(default)]
    pub priority: bool,
    /// Users who should receive independent copies.
    #[serde(default)]
    pub mirrors: Vec<MirrorRequest>,
}

impl NewTask {
    /// Start building a task with only a description.
    #[must_use]
    pub fn new(description: impl Into<String>) -> Self {
        Self { description: description.into(), ..Self::default() }
    }

    /// Set the planned start.
    #[must_use]
    pub fn scheduled(mut self, schedule: impl Into<String>) -> Self {
        self.schedule = Some(schedule.into());
        self
    }

    /// Set the duration estimate.
    #[must_use]
    pub fn duration(mut self, minutes: impl Into<String>) -> Self {
        self.duration = Some(minutes.into());
        self
    }

    /// Set the deadline.
    #[must_use]
    pub fn deadline(mut self, deadline: impl Into<String>) -> Self {
        self.deadline = Some(deadline.into());
        self
    }

    /// Set the location.
    #[must_use]
    pub fn location(mut self, location: impl Into<String>) -> Self {
        self.location = Some(location.into());
        self
    }

    /// Set the priority flag.
    #[must_use]
    pub const fn priority(mut self, priority: bool) -> Self {
        self.priority = priority;
        self
    }

    /// Add a mirror copy for another user.
    #[must_use]
    pub fn mirror(mut self, owner: impl Into<String>, schedule: impl Into<String>) -> Self {
        self.mirrors.push(MirrorRequest { owner: owner.into(), schedule: schedule.into() });
        self
    }
}

/// Scheduling fields to change on an existing task or a draft.
///
/// `None` leaves a field alone. A blank string clears the schedule,
/// deadline or location and resets the duration to the default.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct TaskEdit {
    /// Planned start, `MM/DD HH:MM` (current year) or `YYYY-MM-DD HH:MM`.
    #[serde(default)]
    pub schedule: Option<String>,
    /// Duration estimate in minutes.
    #[serde(default)]
    pub duration: Option<String>,
    /// Deadline, `YYYY-MM-DD HH:MM`.
    #[serde(default)]
    pub deadline: Option<String>,
    /// Place or URL.
    #[serde(default)]
    pub location: Option<String>,
}

impl TaskEdit {
    /// Whether the edit would change nothing.
    #[must_use]
    pub const fn is_empty(&self) -> bool {
        self.schedule.is_none()
            && self.duration.is_none()
            && self.deadline.is_none()
            && self.location.is_none()
    }
}

/// Per-owner task counts, as shown in the list header.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct TaskSummary {
    /// All tasks.
    pub total: u64,
    /// Tasks not yet done.
    pub active: u64,
    /// Finished tasks.
    pub done: u64,
}
