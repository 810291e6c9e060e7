//! # `taskbot`
//!
//! Personal task tracking: tasks with a `pending -> in_progress -> done`
//! lifecycle and per-session time accounting, mirrored copies for other
//! users, calendar views, reminders and per-user scheduling preferences,
//! all persisted in `SQLite`.

#[cfg(feature = "cli")]
pub mod cli;
pub mod config;
pub mod db;
pub mod drafts;
pub mod error;
pub mod logging;
pub mod mcp;
pub mod paths;
pub mod preferences;
pub mod reminders;
pub mod tasks;
pub mod testing;
pub mod traits;

pub use error::{Error, ErrorKind, Result};

/// Library version.
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_version_exists() {
        assert!(!VERSION.is_empty());
    }
}
