//! Configuration management for taskbot.
//!
//! This module handles the `~/.taskbot/config.yaml` file. Every field has a
//! default, so a missing file or a partial file is always usable.

use crate::error::{Error, Result};
use crate::paths;
use chrono::Duration;
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

/// Default number of tasks returned by list operations.
pub const DEFAULT_LIST_LIMIT: usize = 10;

/// Default lifetime of an untouched draft, in minutes.
pub const DEFAULT_DRAFT_TTL_MINUTES: u32 = 10;

/// Default reminder look-ahead, in minutes.
pub const DEFAULT_REMINDER_LEAD_MINUTES: u32 = 15;

/// Runtime configuration for the command surfaces.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(default)]
pub struct BotConfig {
    /// Path of the `SQLite` database. `None` means `~/.taskbot/taskbot.sqlite3`.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub database_path: Option<PathBuf>,

    /// Maximum number of tasks shown by `list`.
    pub list_limit: usize,

    /// Minutes after which an untouched draft is discarded.
    pub draft_ttl_minutes: u32,

    /// How far ahead the reminder scan looks, in minutes.
    pub reminder_lead_minutes: u32,

    /// `tracing` filter directive, e.g. `taskbot=debug`.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub log_filter: Option<String>,
}

impl Default for BotConfig {
    fn default() -> Self {
        Self {
            database_path: None,
            list_limit: DEFAULT_LIST_LIMIT,
            draft_ttl_minutes: DEFAULT_DRAFT_TTL_MINUTES,
            reminder_lead_minutes: DEFAULT_REMINDER_LEAD_MINUTES,
            log_filter: None,
        }
    }
}

impl BotConfig {
    /// Load config from a specific file, returning None if it does not exist.
    ///
    /// # Errors
    ///
    /// Returns an error if the file exists but cannot be read or parsed.
    pub fn load_from(path: &Path) -> Result<Option<Self>> {
        if !path.exists() {
            return Ok(None);
        }

        let content = std::fs::read_to_string(path)?;
        let config: Self = serde_yaml::from_str(&content)?;
        Ok(Some(config))
    }

    /// Load config from `path`, or the default location when `path` is
    /// `None`, falling back to defaults when no file exists.
    ///
    /// # Errors
    ///
    /// Returns an error if a file exists but cannot be parsed.
    pub fn load_or_default(path: Option<&Path>) -> Result<Self> {
        let resolved = match path {
            Some(p) => Some(p.to_path_buf()),
            None => paths::default_config_path(),
        };
        match resolved {
            Some(p) => Ok(Self::load_from(&p)?.unwrap_or_default()),
            None => Ok(Self::default()),
        }
    }

    /// Save config to a specific file, creating parent directories.
    ///
    /// # Errors
    ///
    /// Returns an error if the file cannot be written.
    pub fn save_to(&self, path: &Path) -> Result<()> {
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)?;
        }

        let content = serde_yaml::to_string(self)?;
        std::fs::write(path, content)?;
        Ok(())
    }

    /// The database path, resolving the default location if unset.
    ///
    /// # Errors
    ///
    /// Returns an error if no path is configured and the home directory
    /// cannot be determined.
    pub fn database_path(&self) -> Result<PathBuf> {
        self.database_path
            .clone()
            .or_else(paths::default_db_path)
            .ok_or_else(|| Error::Config("cannot determine home directory".to_string()))
    }

    /// Draft lifetime as a duration.
    #[must_use]
    pub fn draft_ttl(&self) -> Duration {
        Duration::minutes(i64::from(self.draft_ttl_minutes))
    }

    /// Reminder look-ahead as a duration.
    #[must_use]
    pub fn reminder_lead(&self) -> Duration {
        Duration::minutes(i64::from(self.reminder_lead_minutes))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn test_bot_config_default() {
        let config = BotConfig::default();
        assert!(config.database_path.is_none());
        assert_eq!(config.list_limit, 10);
        assert_eq!(config.draft_ttl_minutes, 10);
        assert_eq!(config.reminder_lead_minutes, 15);
    }

    #[test]
    fn test_load_not_found() {
        let dir = TempDir::new().unwrap();
        let result = BotConfig::load_from(&dir.path().join("config.yaml")).unwrap();
        assert!(result.is_none());
    }

    #[test]
    fn test_save_and_load() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("nested").join("config.yaml");
        let config = BotConfig {
            database_path: Some(dir.path().join("tasks.sqlite3")),
            list_limit: 25,
            log_filter: Some("taskbot=debug".to_string()),
            ..Default::default()
        };

        config.save_to(&path).unwrap();
        let loaded = BotConfig::load_from(&path).unwrap().unwrap();
        assert_eq!(loaded, config);
    }

    #[test]
    fn test_partial_yaml_uses_defaults() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("config.yaml");
        std::fs::write(&path, "list_limit: 3\n").unwrap();

        let loaded = BotConfig::load_or_default(Some(&path)).unwrap();
        assert_eq!(loaded.list_limit, 3);
        assert_eq!(loaded.draft_ttl_minutes, DEFAULT_DRAFT_TTL_MINUTES);
    }

    #[test]
    fn test_invalid_yaml_is_error() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("config.yaml");
        std::fs::write(&path, "list_limit: [not a number").unwrap();

        assert!(BotConfig::load_from(&path).is_err());
    }

    #[test]
    fn test_database_path_prefers_configured() {
        let config =
            BotConfig { database_path: Some(PathBuf::from("/tmp/x.sqlite3")), ..Default::default() };
        assert_eq!(config.database_path().unwrap(), PathBuf::from("/tmp/x.sqlite3"));
    }

    /// Point `HOME` at a temp dir for the duration of a test.
    struct HomeGuard {
        original: Option<std::ffi::OsString>,
    }

    impl HomeGuard {
        fn new(home: &Path) -> Self {
            let original = std::env::var_os("HOME");
            std::env::set_var("HOME", home);
            Self { original }
        }
    }

    impl Drop for HomeGuard {
        fn drop(&mut self) {
            match &self.original {
                Some(home) => std::env::set_var("HOME", home),
                None => std::env::remove_var("HOME"),
            }
        }
    }

    #[test]
    #[serial_test::serial]
    fn test_default_location_under_home() {
        let dir = TempDir::new().unwrap();
        let _guard = HomeGuard::new(dir.path());

        assert_eq!(BotConfig::load_or_default(None).unwrap(), BotConfig::default());

        std::fs::create_dir_all(dir.path().join(".taskbot")).unwrap();
        std::fs::write(dir.path().join(".taskbot").join("config.yaml"), "reminder_lead_minutes: 5\n")
            .unwrap();
        let loaded = BotConfig::load_or_default(None).unwrap();
        assert_eq!(loaded.reminder_lead_minutes, 5);
        assert_eq!(
            loaded.database_path().unwrap(),
            dir.path().join(".taskbot").join("taskbot.sqlite3")
        );
    }

    #[test]
    fn test_durations() {
        let config = BotConfig::default();
        assert_eq!(config.draft_ttl(), Duration::minutes(10));
        assert_eq!(config.reminder_lead(), Duration::minutes(15));
    }
}
