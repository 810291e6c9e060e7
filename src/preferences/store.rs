//! Preference store trait and `SQLite` implementation.

use crate::db::Database;
use crate::error::Result;
use crate::preferences::models::{
    Preference, PreferenceField, PreferenceValue, TimeOfDay, TimeZone,
};
use rusqlite::{params, Connection, OptionalExtension, TransactionBehavior};
use std::path::Path;

/// Trait for preference storage operations.
#[allow(clippy::missing_errors_doc)]
pub trait PreferenceStore {
    /// Get the owner's preferences, creating the default record on first
    /// access.
    fn get_or_create(&self, owner: &str) -> Result<Preference>;

    /// Validate `raw` for `field` and persist it.
    ///
    /// On a validation failure nothing is written.
    fn update_field(&self, owner: &str, field: PreferenceField, raw: &str)
        -> Result<PreferenceValue>;
}

/// SQLite-based preference store.
#[derive(Debug, Clone)]
pub struct SqlitePreferenceStore {
    db: Database,
}

impl SqlitePreferenceStore {
    /// Create a store over an opened database.
    #[must_use]
    pub const fn new(db: Database) -> Self {
        Self { db }
    }

    /// Open (and migrate) the database at `db_path`.
    ///
    /// # Errors
    ///
    /// Returns an error if the database cannot be initialized.
    pub fn open(db_path: impl AsRef<Path>) -> Result<Self> {
        Ok(Self::new(Database::open(db_path)?))
    }

    fn ensure_row(conn: &Connection, owner: &str) -> Result<()> {
        let inserted = conn.execute(
            "INSERT INTO user_preferences (owner) VALUES (?1) ON CONFLICT(owner) DO NOTHING",
            params![owner],
        )?;
        if inserted > 0 {
            tracing::debug!(owner, "created default preferences");
        }
        Ok(())
    }

    fn fetch(conn: &Connection, owner: &str) -> Result<Option<Preference>> {
        let pref = conn
            .query_row(
                "SELECT work_start, work_end, lunch_duration_minutes, lunch_window_start,
                        lunch_window_end, time_zone
                 FROM user_preferences WHERE owner = ?1",
                params![owner],
                |row| Self::parse_preference(owner, row),
            )
            .optional()?;
        Ok(pref)
    }

    /// Parse a preference row. Values that no longer validate read as the
    /// default for their field.
    fn parse_preference(owner: &str, row: &rusqlite::Row) -> rusqlite::Result<Preference> {
        let defaults = Preference::defaults_for(owner);
        let time = |idx: usize, field: PreferenceField, fallback: TimeOfDay| {
            row.get::<_, String>(idx)
                .map(|raw| TimeOfDay::parse(field.as_str(), &raw).unwrap_or(fallback))
        };
        let lunch: i64 = row.get(2)?;
        let tz: String = row.get(5)?;

        Ok(Preference {
            work_start: time(0, PreferenceField::WorkStart, defaults.work_start)?,
            work_end: time(1, PreferenceField::WorkEnd, defaults.work_end)?,
            lunch_duration_minutes: u32::try_from(lunch)
                .unwrap_or(defaults.lunch_duration_minutes),
            lunch_window_start: time(3, PreferenceField::LunchWindowStart, defaults.lunch_window_start)?,
            lunch_window_end: time(4, PreferenceField::LunchWindowEnd, defaults.lunch_window_end)?,
            time_zone: TimeZone::from_str(&tz).unwrap_or(defaults.time_zone),
            owner: defaults.owner,
        })
    }

    /// The update statement for `field`. Column names are fixed here and
    /// never built from input.
    const fn update_sql(field: PreferenceField) -> &'static str {
        match field {
            PreferenceField::WorkStart => {
                "UPDATE user_preferences SET work_start = ?1 WHERE owner = ?2"
            }
            PreferenceField::WorkEnd => "UPDATE user_preferences SET work_end = ?1 WHERE owner = ?2",
            PreferenceField::LunchDurationMinutes => {
                "UPDATE user_preferences SET lunch_duration_minutes = ?1 WHERE owner = ?2"
            }
            PreferenceField::LunchWindowStart => {
                "UPDATE user_preferences SET lunch_window_start = ?1 WHERE owner = ?2"
            }
            PreferenceField::LunchWindowEnd => {
                "UPDATE user_preferences SET lunch_window_end = ?1 WHERE owner = ?2"
            }
            PreferenceField::TimeZone => {
                "UPDATE user_preferences SET time_zone = ?1 WHERE owner = ?2"
            }
        }
    }
}

impl PreferenceStore for SqlitePreferenceStore {
    fn get_or_create(&self, owner: &str) -> Result<Preference> {
        let conn = self.db.connect()?;
        if let Some(pref) = Self::fetch(&conn, owner)? {
            return Ok(pref);
        }
        Self::ensure_row(&conn, owner)?;
        Ok(Self::fetch(&conn, owner)?.unwrap_or_else(|| Preference::defaults_for(owner)))
    }

    fn update_field(
        &self,
        owner: &str,
        field: PreferenceField,
        raw: &str,
    ) -> Result<PreferenceValue> {
        let value = field.parse_value(raw)?;

        let mut conn = self.db.connect()?;
        let tx = conn.transaction_with_behavior(TransactionBehavior::Immediate)?;
        Self::ensure_row(&tx, owner)?;
        let sql = Self::update_sql(field);
        match value {
            PreferenceValue::Minutes(minutes) => tx.execute(sql, params![minutes, owner])?,
            other => tx.execute(sql, params![other.to_string(), owner])?,
        };
        tx.commit()?;

        tracing::info!(owner, field = field.as_str(), value = %value, "updated preference");
        Ok(value)
    }
}
