//! Error types for `taskbot`.

use crate::tasks::models::Status;

/// Errors that can occur in the task and preference stores.
#[derive(Debug, thiserror::Error)]
pub enum Error {
    /// Input was malformed or out of range.
    #[error(transparent)]
    Validation(#[from] ValidationError),

    /// The referenced record does not exist for the caller.
    #[error(transparent)]
    NotFound(#[from] NotFound),

    /// The requested transition is illegal from the current state.
    #[error(transparent)]
    Conflict(#[from] InvalidTransition),

    /// An I/O error occurred.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// A JSON error occurred.
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    /// A YAML parsing error occurred.
    #[error("YAML error: {0}")]
    Yaml(#[from] serde_yaml::Error),

    /// A `SQLite` database error occurred.
    #[error("Database error: {0}")]
    Database(#[from] rusqlite::Error),

    /// The configuration could not be resolved.
    #[error("Config error: {0}")]
    Config(String),
}

/// Coarse classification of an [`Error`], used by command surfaces to pick
/// exit codes and protocol error types.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorKind {
    /// See [`Error::Validation`].
    Validation,
    /// See [`Error::NotFound`].
    NotFound,
    /// See [`Error::Conflict`].
    Conflict,
    /// Storage, I/O, serialization or configuration failure.
    Internal,
}

impl Error {
    /// Classify this error.
    #[must_use]
    pub const fn kind(&self) -> ErrorKind {
        match self {
            Self::Validation(_) => ErrorKind::Validation,
            Self::NotFound(_) => ErrorKind::NotFound,
            Self::Conflict(_) => ErrorKind::Conflict,
            Self::Io(_) | Self::Json(_) | Self::Yaml(_) | Self::Database(_) | Self::Config(_) => {
                ErrorKind::Internal
            }
        }
    }

    /// Shorthand for a validation failure on `field`.
    pub fn validation(field: &'static str, constraint: impl Into<String>) -> Self {
        Self::Validation(ValidationError { field, constraint: constraint.into() })
    }
}

/// Malformed or out-of-range input.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("invalid {field}: {constraint}")]
pub struct ValidationError {
    /// The input field that failed validation.
    pub field: &'static str,
    /// Human-readable description of the violated constraint.
    pub constraint: String,
}

/// A referenced record is absent for the caller.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum NotFound {
    /// No task with this id is owned by the caller.
    #[error("task {task_id} not found for {owner}")]
    Task {
        /// Requested task id.
        task_id: i64,
        /// Caller identity.
        owner: String,
    },
    /// The caller has no task in progress.
    #[error("no task in progress for {owner}")]
    NoTaskInProgress {
        /// Caller identity.
        owner: String,
    },
    /// The caller has no live draft.
    #[error("no draft in progress for {owner}")]
    Draft {
        /// Caller identity.
        owner: String,
    },
}

/// A lifecycle transition that the current status does not allow.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("cannot {action} task {task_id}: it is {current}")]
pub struct InvalidTransition {
    /// The task that was targeted.
    pub task_id: i64,
    /// Its status at the time of the attempt.
    pub current: Status,
    /// The attempted action (`start`, `finish`, `delay`).
    pub action: &'static str,
}

/// A specialized Result type for this crate.
pub type Result<T> = std::result::Result<T, Error>;
