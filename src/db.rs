//! `SQLite` connection handling and versioned schema migrations.
//!
//! The schema is described by [`MIGRATIONS`], an append-only list of SQL
//! batches. The number of applied migrations is stored in
//! `PRAGMA user_version`; [`Database::open`] applies the missing ones once,
//! inside a single transaction, and later connections skip the check.

use crate::error::Result;
use chrono::{DateTime, NaiveDateTime, SecondsFormat, Utc};
use rusqlite::Connection;
use std::path::{Path, PathBuf};
use std::time::Duration;

/// How long a connection waits for a competing writer before failing.
const BUSY_TIMEOUT: Duration = Duration::from_secs(5);

/// Storage format for naive (wall-clock) date-times. Lexicographic order
/// matches chronological order.
pub const NAIVE_FORMAT: &str = "%Y-%m-%d %H:%M:%S";

/// Ordered schema migrations. Never edit an entry once released; append.
pub const MIGRATIONS: &[&str] = &[
    // 1: core task table
    r"
    CREATE TABLE tasks (
        id INTEGER PRIMARY KEY AUTOINCREMENT,
        owner TEXT NOT NULL,
        description TEXT NOT NULL CHECK (length(trim(description)) > 0),
        due_time TEXT,
        started_at TEXT,
        stopped_at TEXT,
        status TEXT NOT NULL DEFAULT 'pending'
            CHECK (status IN ('pending', 'in_progress', 'done')),
        created_at TEXT NOT NULL
    );
    CREATE INDEX idx_tasks_owner_status ON tasks(owner, status);
    ",
    // 2: scheduling fields
    r"
    ALTER TABLE tasks ADD COLUMN scheduled_at TEXT;
    ALTER TABLE tasks ADD COLUMN duration_minutes INTEGER NOT NULL DEFAULT 15
        CHECK (duration_minutes > 0);
    ALTER TABLE tasks ADD COLUMN deadline TEXT;
    ALTER TABLE tasks ADD COLUMN location TEXT;
    ALTER TABLE tasks ADD COLUMN priority INTEGER NOT NULL DEFAULT 0;
    ALTER TABLE tasks ADD COLUMN mirrored_owners TEXT NOT NULL DEFAULT '[]';
    CREATE INDEX idx_tasks_owner_scheduled ON tasks(owner, scheduled_at);
    ",
    // 3: session metrics and scheduling preferences
    r"
    ALTER TABLE tasks ADD COLUMN session_count INTEGER NOT NULL DEFAULT 0;
    ALTER TABLE tasks ADD COLUMN accumulated_minutes REAL NOT NULL DEFAULT 0;

    CREATE TABLE user_preferences (
        owner TEXT PRIMARY KEY,
        work_start TEXT NOT NULL DEFAULT '09:00',
        work_end TEXT NOT NULL DEFAULT '17:00',
        lunch_duration_minutes INTEGER NOT NULL DEFAULT 30
            CHECK (lunch_duration_minutes BETWEEN 10 AND 180),
        lunch_window_start TEXT NOT NULL DEFAULT '12:00',
        lunch_window_end TEXT NOT NULL DEFAULT '14:00',
        time_zone TEXT NOT NULL DEFAULT 'UTC'
    );
    ",
];

/// Handle to a migrated database file.
///
/// Each operation opens a new connection. This keeps the stores `Send +
/// Sync` without a connection pool; `SQLite` serializes writers through
/// `BEGIN IMMEDIATE` and the busy timeout.
#[derive(Debug, Clone)]
pub struct Database {
    path: PathBuf,
}

impl Database {
    /// Open the database at `path`, creating it and applying pending
    /// migrations.
    ///
    /// # Errors
    ///
    /// Returns an error if the file cannot be created or a migration fails.
    pub fn open(path: impl AsRef<Path>) -> Result<Self> {
        let db = Self { path: path.as_ref().to_path_buf() };
        if let Some(parent) = db.path.parent() {
            if !parent.as_os_str().is_empty() {
                std::fs::create_dir_all(parent)?;
            }
        }
        let mut conn = db.connect()?;
        conn.execute_batch("PRAGMA journal_mode = WAL;")?;
        let applied = migrate(&mut conn)?;
        if applied > 0 {
            tracing::info!(path = %db.path.display(), applied, "applied schema migrations");
        }
        Ok(db)
    }

    /// Get the database path.
    #[must_use]
    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Open a connection with the standard pragmas.
    ///
    /// # Errors
    ///
    /// Returns an error if the file cannot be opened.
    pub fn connect(&self) -> Result<Connection> {
        let conn = Connection::open(&self.path)?;
        conn.busy_timeout(BUSY_TIMEOUT)?;
        conn.execute_batch("PRAGMA foreign_keys = ON;")?;
        Ok(conn)
    }
}

/// Read the number of applied migrations.
///
/// # Errors
///
/// Returns an error if the pragma cannot be read.
pub fn schema_version(conn: &Connection) -> Result<usize> {
    let version: i64 = conn.pragma_query_value(None, "user_version", |row| row.get(0))?;
    Ok(usize::try_from(version).unwrap_or(0))
}

/// Apply all migrations newer than the stored `user_version`.
///
/// Returns how many migrations were applied.
///
/// # Errors
///
/// Returns an error if any migration fails; nothing is applied in that case.
pub fn migrate(conn: &mut Connection) -> Result<usize> {
    let tx = conn.transaction_with_behavior(rusqlite::TransactionBehavior::Immediate)?;
    let current = schema_version(&tx)?;
    let pending = MIGRATIONS.iter().enumerate().skip(current);

    let mut applied = 0;
    for (index, sql) in pending {
        tx.execute_batch(sql)?;
        tracing::debug!(migration = index + 1, "applied migration");
        applied += 1;
    }

    if applied > 0 {
        let version = i64::try_from(MIGRATIONS.len()).unwrap_or(i64::MAX);
        tx.pragma_update(None, "user_version", version)?;
    }
    tx.commit()?;
    Ok(applied)
}

/// Format an instant for storage.
#[must_use]
pub fn format_instant(at: DateTime<Utc>) -> String {
    at.to_rfc3339_opts(SecondsFormat::Micros, true)
}

/// Parse a stored instant. Unparseable values read as `None`.
#[must_use]
pub fn parse_instant(raw: Option<String>) -> Option<DateTime<Utc>> {
    raw.and_then(|s| DateTime::parse_from_rfc3339(&s).ok()).map(|dt| dt.with_timezone(&Utc))
}

/// Format a wall-clock date-time for storage.
#[must_use]
pub fn format_naive(at: NaiveDateTime) -> String {
    at.format(NAIVE_FORMAT).to_string()
}

/// Parse a stored wall-clock date-time. Unparseable values read as `None`.
#[must_use]
pub fn parse_naive(raw: Option<String>) -> Option<NaiveDateTime> {
    raw.and_then(|s| NaiveDateTime::parse_from_str(&s, NAIVE_FORMAT).ok())
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{NaiveDate, TimeZone};
    use tempfile::TempDir;

    #[test]
    fn test_open_applies_all_migrations() {
        let dir = TempDir::new().unwrap();
        let db = Database::open(dir.path().join("t.sqlite3")).unwrap();
        let conn = db.connect().unwrap();
        assert_eq!(schema_version(&conn).unwrap(), MIGRATIONS.len());
    }

    #[test]
    fn test_reopen_applies_nothing() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("t.sqlite3");
        Database::open(&path).unwrap();

        let mut conn = Connection::open(&path).unwrap();
        assert_eq!(migrate(&mut conn).unwrap(), 0);
    }

    #[test]
    fn test_upgrade_from_first_migration_keeps_rows() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("legacy.sqlite3");
        {
            let conn = Connection::open(&path).unwrap();
            conn.execute_batch(MIGRATIONS[0]).unwrap();
            conn.pragma_update(None, "user_version", 1).unwrap();
            conn.execute(
                "INSERT INTO tasks (owner, description, due_time, created_at)
                 VALUES ('alice', 'legacy row', '2025-05-10 14:00:00', '2025-05-01T00:00:00.000000Z')",
                [],
            )
            .unwrap();
        }

        let db = Database::open(&path).unwrap();
        let conn = db.connect().unwrap();
        let (duration, sessions): (i64, i64) = conn
            .query_row(
                "SELECT duration_minutes, session_count FROM tasks WHERE owner = 'alice'",
                [],
                |row| Ok((row.get(0)?, row.get(1)?)),
            )
            .unwrap();
        assert_eq!(duration, 15);
        assert_eq!(sessions, 0);
    }

    #[test]
    fn test_open_creates_parent_directory() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("a").join("b").join("t.sqlite3");
        Database::open(&path).unwrap();
        assert!(path.exists());
    }

    #[test]
    fn test_instant_round_trip_is_sortable() {
        let a = Utc.with_ymd_and_hms(2025, 5, 10, 9, 0, 0).unwrap();
        let b = Utc.with_ymd_and_hms(2025, 5, 10, 10, 0, 0).unwrap();
        assert!(format_instant(a) < format_instant(b));
        assert_eq!(parse_instant(Some(format_instant(a))), Some(a));
        assert_eq!(parse_instant(Some("garbage".to_string())), None);
    }

    #[test]
    fn test_naive_format() {
        let at = NaiveDate::from_ymd_opt(2025, 5, 10).unwrap().and_hms_opt(14, 0, 0).unwrap();
        assert_eq!(format_naive(at), "2025-05-10 14:00:00");
        assert_eq!(parse_naive(Some(format_naive(at))), Some(at));
    }
}
