//! Task store trait and `SQLite` implementation.

use crate::db::{self, Database};
use crate::error::{Error, InvalidTransition, NotFound, Result};
use crate::tasks::models::{
    NewTask, Status, Task, TaskEdit, TaskSummary, DEFAULT_DURATION_MINUTES,
};
use crate::tasks::schedule::{non_blank, parse_deadline, parse_duration, parse_schedule};
use crate::traits::{Clock, SystemClock};
use chrono::{DateTime, Datelike, NaiveDateTime, Utc};
use rusqlite::{params, Connection, OptionalExtension, Transaction, TransactionBehavior};
use std::collections::BTreeSet;
use std::path::Path;
use std::sync::Arc;

/// Columns read by [`SqliteTaskStore::parse_task`], in order. Legacy rows
/// only carry `due_time`, which stands in for `scheduled_at`.
const TASK_COLUMNS: &str = "id, owner, description, status, COALESCE(scheduled_at, due_time),
    duration_minutes, deadline, location, priority, mirrored_owners, started_at, stopped_at,
    session_count, accumulated_minutes, created_at";

/// Trait for task storage operations.
///
/// These are the only entry points for reading or changing tasks. Every
/// operation is scoped to an owner; a task owned by someone else is
/// indistinguishable from a missing one.
#[allow(clippy::missing_errors_doc)]
pub trait TaskStore {
    /// Validate `new_task` and insert it as `pending`, together with any
    /// mirror copies.
    fn create(&self, owner: &str, new_task: NewTask) -> Result<Task>;

    /// Get one of the owner's tasks.
    fn get(&self, task_id: i64, owner: &str) -> Result<Task>;

    /// Begin a work session on a pending task.
    fn start(&self, task_id: i64, owner: &str) -> Result<Task>;

    /// Finish an in-progress task, crediting the elapsed session time.
    ///
    /// Without an explicit id, targets the most recently started task.
    fn finish(&self, owner: &str, task_id: Option<i64>) -> Result<Task>;

    /// Return an in-progress task to `pending`, discarding the session.
    ///
    /// Without an explicit id, targets the most recently started task.
    fn delay(&self, owner: &str, task_id: Option<i64>) -> Result<Task>;

    /// Change the schedule, duration, deadline or location of one of the
    /// owner's tasks. The status and session fields are left alone.
    fn update_schedule(&self, task_id: i64, owner: &str, edit: TaskEdit) -> Result<Task>;

    /// Delete one of the owner's tasks. Returns false if it did not exist.
    fn delete(&self, task_id: i64, owner: &str) -> Result<bool>;

    /// List the owner's tasks, most recent first.
    fn list_by_owner(&self, owner: &str, status: Option<Status>, limit: usize)
        -> Result<Vec<Task>>;

    /// List the owner's tasks scheduled in `[start, end)`, earliest first.
    fn list_due_between(
        &self,
        owner: &str,
        start: NaiveDateTime,
        end: NaiveDateTime,
    ) -> Result<Vec<Task>>;

    /// Count the owner's tasks by state.
    fn summary(&self, owner: &str) -> Result<TaskSummary>;

    /// Pending tasks of every owner scheduled in `[start, end)`, earliest
    /// first. Used by the reminder scan.
    fn pending_due_between(&self, start: NaiveDateTime, end: NaiveDateTime) -> Result<Vec<Task>>;
}

/// A `NewTask` whose raw fields have been parsed.
struct ValidatedTask {
    description: String,
    scheduled_at: Option<NaiveDateTime>,
    duration_minutes: u32,
    deadline: Option<NaiveDateTime>,
    location: Option<String>,
    priority: bool,
    mirrors: Vec<(String, NaiveDateTime)>,
}

/// SQLite-based task store.
#[derive(Clone)]
pub struct SqliteTaskStore {
    db: Database,
    clock: Arc<dyn Clock>,
}

impl std::fmt::Debug for SqliteTaskStore {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SqliteTaskStore").field("db", &self.db).finish_non_exhaustive()
    }
}

impl SqliteTaskStore {
    /// Create a store over an opened database with the given clock.
    #[must_use]
    pub fn new(db: Database, clock: Arc<dyn Clock>) -> Self {
        Self { db, clock }
    }

    /// Open (and migrate) the database at `db_path` using the system clock.
    ///
    /// # Errors
    ///
    /// Returns an error if the database cannot be initialized.
    pub fn open(db_path: impl AsRef<Path>) -> Result<Self> {
        Ok(Self::new(Database::open(db_path)?, Arc::new(SystemClock)))
    }

    /// Get the underlying database handle.
    #[must_use]
    pub const fn database(&self) -> &Database {
        &self.db
    }

    /// Run `f` inside an `IMMEDIATE` transaction so that the read-check-write
    /// sequence of a transition cannot interleave with another writer.
    fn with_write_lock<T>(&self, f: impl FnOnce(&Transaction<'_>) -> Result<T>) -> Result<T> {
        let mut conn = self.db.connect()?;
        let tx = conn.transaction_with_behavior(TransactionBehavior::Immediate)?;
        let value = f(&tx)?;
        tx.commit()?;
        Ok(value)
    }

    /// Parse a task from a row selected with [`TASK_COLUMNS`].
    fn parse_task(row: &rusqlite::Row) -> rusqlite::Result<Task> {
        let status_str: String = row.get(3)?;
        let duration: i64 = row.get(5)?;
        let mirrored: String = row.get(9)?;
        let sessions: i64 = row.get(12)?;

        Ok(Task {
            id: row.get(0)?,
            owner: row.get(1)?,
            description: row.get(2)?,
            status: Status::from_str(&status_str).unwrap_or_default(),
            scheduled_at: db::parse_naive(row.get(4)?),
            duration_estimate_minutes: u32::try_from(duration)
                .unwrap_or(DEFAULT_DURATION_MINUTES),
            deadline: db::parse_naive(row.get(6)?),
            location: row.get(7)?,
            priority: row.get(8)?,
            mirrored_owners: serde_json::from_str::<BTreeSet<String>>(&mirrored)
                .unwrap_or_default(),
            started_at: db::parse_instant(row.get(10)?),
            stopped_at: db::parse_instant(row.get(11)?),
            session_count: u32::try_from(sessions).unwrap_or(0),
            accumulated_duration_minutes: row.get(13)?,
            created_at: db::parse_instant(row.get(14)?).unwrap_or_default(),
        })
    }

    fn fetch(conn: &Connection, task_id: i64) -> Result<Option<Task>> {
        let task = conn
            .query_row(
                &format!("SELECT {TASK_COLUMNS} FROM tasks WHERE id = ?1"),
                params![task_id],
                Self::parse_task,
            )
            .optional()?;
        Ok(task)
    }

    fn fetch_owned(conn: &Connection, task_id: i64, owner: &str) -> Result<Task> {
        conn.query_row(
            &format!("SELECT {TASK_COLUMNS} FROM tasks WHERE id = ?1 AND owner = ?2"),
            params![task_id, owner],
            Self::parse_task,
        )
        .optional()?
        .ok_or_else(|| NotFound::Task { task_id, owner: owner.to_string() }.into())
    }

    /// Resolve the target of `finish`/`delay`.
    ///
    /// An explicit id must belong to the owner. Otherwise the owner's most
    /// recently started in-progress task wins; several in-progress tasks
    /// are tolerated rather than rejected.
    fn resolve_in_progress(conn: &Connection, owner: &str, task_id: Option<i64>) -> Result<Task> {
        if let Some(id) = task_id {
            return Self::fetch_owned(conn, id, owner);
        }
        conn.query_row(
            &format!(
                "SELECT {TASK_COLUMNS} FROM tasks
                 WHERE owner = ?1 AND status = 'in_progress'
                 ORDER BY started_at DESC, id DESC LIMIT 1"
            ),
            params![owner],
            Self::parse_task,
        )
        .optional()?
        .ok_or_else(|| NotFound::NoTaskInProgress { owner: owner.to_string() }.into())
    }

    fn require_status(task: &Task, expected: Status, action: &'static str) -> Result<()> {
        if task.status == expected {
            Ok(())
        } else {
            Err(InvalidTransition { task_id: task.id, current: task.status, action }.into())
        }
    }

    fn validate(&self, owner: &str, new_task: NewTask) -> Result<ValidatedTask> {
        let description = new_task.description.trim().to_string();
        if description.is_empty() {
            return Err(Error::validation("description", "must not be empty"));
        }

        let year = self.clock.today().year();
        let scheduled_at = non_blank(new_task.schedule.as_deref())
            .map(|raw| parse_schedule("schedule", raw, year))
            .transpose()?;
        let deadline = non_blank(new_task.deadline.as_deref()).map(parse_deadline).transpose()?;
        let duration_minutes = parse_duration(new_task.duration.as_deref())?;
        let location = non_blank(new_task.location.as_deref()).map(str::to_string);

        let mut mirrors = Vec::with_capacity(new_task.mirrors.len());
        for mirror in new_task.mirrors {
            let mirror_owner = mirror.owner.trim().to_string();
            if mirror_owner.is_empty() {
                return Err(Error::validation("mirror", "mirror owner must not be empty"));
            }
            if mirror_owner == owner {
                return Err(Error::validation("mirror", "cannot mirror a task to its own owner"));
            }
            mirrors.push((mirror_owner, parse_schedule("mirror schedule", &mirror.schedule, year)?));
        }

        Ok(ValidatedTask {
            description,
            scheduled_at,
            duration_minutes,
            deadline,
            location,
            priority: new_task.priority,
            mirrors,
        })
    }

    #[allow(clippy::too_many_arguments)]
    fn insert(
        conn: &Connection,
        owner: &str,
        description: &str,
        scheduled_at: Option<NaiveDateTime>,
        duration_minutes: u32,
        deadline: Option<NaiveDateTime>,
        location: Option<&str>,
        priority: bool,
        mirrored_owners: &BTreeSet<String>,
        created_at: DateTime<Utc>,
    ) -> Result<i64> {
        conn.execute(
            "INSERT INTO tasks (owner, description, scheduled_at, duration_minutes, deadline,
                                location, priority, mirrored_owners, created_at)
             VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9)",
            params![
                owner,
                description,
                scheduled_at.map(db::format_naive),
                duration_minutes,
                deadline.map(db::format_naive),
                location,
                priority,
                serde_json::to_string(mirrored_owners)?,
                db::format_instant(created_at),
            ],
        )?;
        Ok(conn.last_insert_rowid())
    }

    fn query_tasks(
        &self,
        sql: &str,
        params: &[&dyn rusqlite::ToSql],
    ) -> Result<Vec<Task>> {
        let conn = self.db.connect()?;
        let mut stmt = conn.prepare(sql)?;
        let tasks = stmt.query_map(params, Self::parse_task)?.collect::<rusqlite::Result<_>>()?;
        Ok(tasks)
    }
}

impl TaskStore for SqliteTaskStore {
    fn create(&self, owner: &str, new_task: NewTask) -> Result<Task> {
        let valid = self.validate(owner, new_task)?;
        let now = self.clock.now();
        let mirrored_owners: BTreeSet<String> =
            valid.mirrors.iter().map(|(mirror_owner, _)| mirror_owner.clone()).collect();

        let task = self.with_write_lock(|tx| {
            let id = Self::insert(
                tx,
                owner,
                &valid.description,
                valid.scheduled_at,
                valid.duration_minutes,
                valid.deadline,
                valid.location.as_deref(),
                valid.priority,
                &mirrored_owners,
                now,
            )?;

            for (mirror_owner, scheduled_at) in &valid.mirrors {
                let copy_id = Self::insert(
                    tx,
                    mirror_owner,
                    &format!("Mirrored task from {owner}: {}", valid.description),
                    Some(*scheduled_at),
                    DEFAULT_DURATION_MINUTES,
                    None,
                    None,
                    false,
                    &BTreeSet::new(),
                    now,
                )?;
                tracing::debug!(task_id = id, copy_id, mirror_owner = %mirror_owner, "mirrored task");
            }

            Self::fetch_owned(tx, id, owner)
        })?;

        tracing::info!(task_id = task.id, owner, "created task");
        Ok(task)
    }

    fn get(&self, task_id: i64, owner: &str) -> Result<Task> {
        let conn = self.db.connect()?;
        Self::fetch_owned(&conn, task_id, owner)
    }

    fn start(&self, task_id: i64, owner: &str) -> Result<Task> {
        let now = self.clock.now();
        let task = self.with_write_lock(|tx| {
            let task = Self::fetch_owned(tx, task_id, owner)?;
            Self::require_status(&task, Status::Pending, "start")?;

            tx.execute(
                "UPDATE tasks SET status = 'in_progress', started_at = ?1,
                                  session_count = session_count + 1
                 WHERE id = ?2",
                params![db::format_instant(now), task_id],
            )?;
            Self::fetch_owned(tx, task_id, owner)
        })?;

        tracing::info!(task_id, owner, sessions = task.session_count, "started task");
        Ok(task)
    }

    fn finish(&self, owner: &str, task_id: Option<i64>) -> Result<Task> {
        let now = self.clock.now();
        let (task, elapsed) = self.with_write_lock(|tx| {
            let task = Self::resolve_in_progress(tx, owner, task_id)?;
            Self::require_status(&task, Status::InProgress, "finish")?;

            #[allow(clippy::cast_precision_loss)]
            let elapsed = task.started_at.map_or(0.0, |started| {
                (now - started).num_milliseconds().max(0) as f64 / 60_000.0
            });

            tx.execute(
                "UPDATE tasks SET status = 'done', stopped_at = ?1, started_at = NULL,
                                  accumulated_minutes = accumulated_minutes + ?2
                 WHERE id = ?3",
                params![db::format_instant(now), elapsed, task.id],
            )?;
            Ok((Self::fetch_owned(tx, task.id, owner)?, elapsed))
        })?;

        tracing::info!(task_id = task.id, owner, elapsed_minutes = elapsed, "finished task");
        Ok(task)
    }

    fn delay(&self, owner: &str, task_id: Option<i64>) -> Result<Task> {
        let task = self.with_write_lock(|tx| {
            let task = Self::resolve_in_progress(tx, owner, task_id)?;
            Self::require_status(&task, Status::InProgress, "delay")?;

            tx.execute(
                "UPDATE tasks SET status = 'pending', started_at = NULL WHERE id = ?1",
                params![task.id],
            )?;
            Self::fetch_owned(tx, task.id, owner)
        })?;

        tracing::info!(task_id = task.id, owner, "delayed task");
        Ok(task)
    }

    fn update_schedule(&self, task_id: i64, owner: &str, edit: TaskEdit) -> Result<Task> {
        let year = self.clock.today().year();
        let task = self.with_write_lock(|tx| {
            let current = Self::fetch_owned(tx, task_id, owner)?;

            let scheduled_at = match edit.schedule.as_deref() {
                None => current.scheduled_at,
                Some(raw) => non_blank(Some(raw))
                    .map(|raw| parse_schedule("schedule", raw, year))
                    .transpose()?,
            };
            let duration_minutes = match edit.duration.as_deref() {
                None => current.duration_estimate_minutes,
                Some(raw) => parse_duration(Some(raw))?,
            };
            let deadline = match edit.deadline.as_deref() {
                None => current.deadline,
                Some(raw) => non_blank(Some(raw)).map(parse_deadline).transpose()?,
            };
            let location = match edit.location.as_deref() {
                None => current.location,
                Some(raw) => non_blank(Some(raw)).map(str::to_string),
            };

            // `due_time` is cleared too so a removed schedule stays removed.
            tx.execute(
                "UPDATE tasks SET scheduled_at = ?1, due_time = NULL, duration_minutes = ?2,
                                  deadline = ?3, location = ?4
                 WHERE id = ?5",
                params![
                    scheduled_at.map(db::format_naive),
                    duration_minutes,
                    deadline.map(db::format_naive),
                    location,
                    task_id,
                ],
            )?;
            Self::fetch_owned(tx, task_id, owner)
        })?;

        tracing::info!(task_id, owner, "updated task schedule");
        Ok(task)
    }

    fn delete(&self, task_id: i64, owner: &str) -> Result<bool> {
        let conn = self.db.connect()?;
        let rows = conn
            .execute("DELETE FROM tasks WHERE id = ?1 AND owner = ?2", params![task_id, owner])?;

        if rows > 0 {
            tracing::info!(task_id, owner, "deleted task");
        } else {
            tracing::debug!(task_id, owner, "delete found nothing");
        }
        Ok(rows > 0)
    }

    fn list_by_owner(
        &self,
        owner: &str,
        status: Option<Status>,
        limit: usize,
    ) -> Result<Vec<Task>> {
        let limit = i64::try_from(limit).unwrap_or(i64::MAX);
        match status {
            Some(status) => self.query_tasks(
                &format!(
                    "SELECT {TASK_COLUMNS} FROM tasks WHERE owner = ?1 AND status = ?2
                     ORDER BY created_at DESC, id DESC LIMIT ?3"
                ),
                params![owner, status.as_str(), limit],
            ),
            None => self.query_tasks(
                &format!(
                    "SELECT {TASK_COLUMNS} FROM tasks WHERE owner = ?1
                     ORDER BY created_at DESC, id DESC LIMIT ?2"
                ),
                params![owner, limit],
            ),
        }
    }

    fn list_due_between(
        &self,
        owner: &str,
        start: NaiveDateTime,
        end: NaiveDateTime,
    ) -> Result<Vec<Task>> {
        self.query_tasks(
            &format!(
                "SELECT {TASK_COLUMNS} FROM tasks
                 WHERE owner = ?1
                   AND COALESCE(scheduled_at, due_time) >= ?2
                   AND COALESCE(scheduled_at, due_time) < ?3
                 ORDER BY COALESCE(scheduled_at, due_time) ASC, id ASC"
            ),
            params![owner, db::format_naive(start), db::format_naive(end)],
        )
    }

    fn summary(&self, owner: &str) -> Result<TaskSummary> {
        let conn = self.db.connect()?;
        let (total, done): (i64, i64) = conn.query_row(
            "SELECT COUNT(*), COALESCE(SUM(CASE WHEN status = 'done' THEN 1 ELSE 0 END), 0)
             FROM tasks WHERE owner = ?1",
            params![owner],
            |row| Ok((row.get(0)?, row.get(1)?)),
        )?;
        let total = u64::try_from(total).unwrap_or(0);
        let done = u64::try_from(done).unwrap_or(0);
        Ok(TaskSummary { total, active: total - done, done })
    }

    fn pending_due_between(&self, start: NaiveDateTime, end: NaiveDateTime) -> Result<Vec<Task>> {
        self.query_tasks(
            &format!(
                "SELECT {TASK_COLUMNS} FROM tasks
                 WHERE status = 'pending'
                   AND COALESCE(scheduled_at, due_time) >= ?1
                   AND COALESCE(scheduled_at, due_time) < ?2
                 ORDER BY COALESCE(scheduled_at, due_time) ASC, id ASC"
            ),
            params![db::format_naive(start), db::format_naive(end)],
        )
    }
}
