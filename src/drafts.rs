//! Expiring per-user task drafts.
//!
//! A command surface that composes a task over several steps (description
//! first, then schedule, then mirrors) keeps the half-built task here. Each
//! draft expires a fixed time after it was last touched; expired drafts are
//! treated as absent and dropped lazily.

use crate::error::{NotFound, Result};
use crate::tasks::models::{MirrorRequest, NewTask, TaskEdit};
use crate::traits::Clock;
use chrono::{DateTime, Duration, Utc};
use serde::Serialize;
use std::collections::HashMap;
use std::sync::{Arc, Mutex, MutexGuard};

/// A task being composed.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Draft {
    /// The task as composed so far.
    pub task: NewTask,
    /// When the draft was last changed.
    pub touched_at: DateTime<Utc>,
}

/// Scheduling fields to overwrite on a draft. `None` leaves a field alone.
pub type DraftEdit = TaskEdit;

/// Drafts for all users of one command surface.
pub struct DraftBook {
    drafts: Mutex<HashMap<String, Draft>>,
    ttl: Duration,
    clock: Arc<dyn Clock>,
}

impl std::fmt::Debug for DraftBook {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("DraftBook").field("ttl", &self.ttl).finish_non_exhaustive()
    }
}

impl DraftBook {
    /// Create an empty book whose drafts live for `ttl` after each edit.
    #[must_use]
    pub fn new(ttl: Duration, clock: Arc<dyn Clock>) -> Self {
        Self { drafts: Mutex::new(HashMap::new()), ttl, clock }
    }

    /// Lock the map. A poisoned lock only means another thread panicked
    /// mid-edit; the map itself is still usable.
    fn lock(&self) -> MutexGuard<'_, HashMap<String, Draft>> {
        self.drafts.lock().unwrap_or_else(std::sync::PoisonError::into_inner)
    }

    fn is_live(&self, draft: &Draft, now: DateTime<Utc>) -> bool {
        now - draft.touched_at < self.ttl
    }

    /// Apply `change` to the owner's live draft.
    fn touch(&self, owner: &str, change: impl FnOnce(&mut NewTask)) -> Result<Draft> {
        let now = self.clock.now();
        let mut drafts = self.lock();
        match drafts.get_mut(owner) {
            Some(draft) if self.is_live(draft, now) => {
                change(&mut draft.task);
                draft.touched_at = now;
                Ok(draft.clone())
            }
            Some(_) => {
                drafts.remove(owner);
                tracing::debug!(owner, "draft expired");
                Err(NotFound::Draft { owner: owner.to_string() }.into())
            }
            None => Err(NotFound::Draft { owner: owner.to_string() }.into()),
        }
    }

    /// Start a new draft, replacing any previous one for the owner.
    pub fn begin(&self, owner: &str, description: impl Into<String>) -> Draft {
        let draft = Draft { task: NewTask::new(description), touched_at: self.clock.now() };
        if self.lock().insert(owner.to_string(), draft.clone()).is_some() {
            tracing::debug!(owner, "replaced previous draft");
        }
        draft
    }

    /// Overwrite scheduling fields on the owner's draft.
    ///
    /// # Errors
    ///
    /// Returns `NotFound` if the owner has no live draft.
    pub fn edit(&self, owner: &str, edit: DraftEdit) -> Result<Draft> {
        self.touch(owner, |task| {
            if edit.schedule.is_some() {
                task.schedule = edit.schedule;
            }
            if edit.duration.is_some() {
                task.duration = edit.duration;
            }
            if edit.deadline.is_some() {
                task.deadline = edit.deadline;
            }
            if edit.location.is_some() {
                task.location = edit.location;
            }
        })
    }

    /// Set the priority flag on the owner's draft.
    ///
    /// # Errors
    ///
    /// Returns `NotFound` if the owner has no live draft.
    pub fn set_priority(&self, owner: &str, priority: bool) -> Result<Draft> {
        self.touch(owner, |task| task.priority = priority)
    }

    /// Add a mirror copy to the owner's draft.
    ///
    /// # Errors
    ///
    /// Returns `NotFound` if the owner has no live draft.
    pub fn add_mirror(
        &self,
        owner: &str,
        mirror_owner: impl Into<String>,
        schedule: impl Into<String>,
    ) -> Result<Draft> {
        let mirror = MirrorRequest { owner: mirror_owner.into(), schedule: schedule.into() };
        self.touch(owner, |task| task.mirrors.push(mirror))
    }

    /// The owner's live draft, if any.
    pub fn get(&self, owner: &str) -> Option<Draft> {
        let now = self.clock.now();
        let mut drafts = self.lock();
        match drafts.get(owner) {
            Some(draft) if self.is_live(draft, now) => Some(draft.clone()),
            Some(_) => {
                drafts.remove(owner);
                None
            }
            None => None,
        }
    }

    /// Hand the owner's draft to `create` and drop the draft once `create`
    /// succeeds. A failed `create` leaves the draft in place for fixing.
    ///
    /// The book stays locked while `create` runs, so one draft cannot be
    /// created twice.
    ///
    /// # Errors
    ///
    /// Returns `NotFound` if the owner has no live draft, or whatever
    /// `create` returns.
    pub fn finalize<T>(
        &self,
        owner: &str,
        create: impl FnOnce(&NewTask) -> Result<T>,
    ) -> Result<T> {
        let now = self.clock.now();
        let mut drafts = self.lock();
        match drafts.get(owner) {
            Some(draft) if self.is_live(draft, now) => {
                let created = create(&draft.task)?;
                drafts.remove(owner);
                Ok(created)
            }
            Some(_) => {
                drafts.remove(owner);
                Err(NotFound::Draft { owner: owner.to_string() }.into())
            }
            None => Err(NotFound::Draft { owner: owner.to_string() }.into()),
        }
    }

    /// Discard the owner's draft. Returns whether a live one existed.
    pub fn cancel(&self, owner: &str) -> bool {
        let now = self.clock.now();
        self.lock().remove(owner).is_some_and(|draft| self.is_live(&draft, now))
    }

    /// Drop every expired draft, returning how many were dropped.
    pub fn purge_expired(&self) -> usize {
        let now = self.clock.now();
        let mut drafts = self.lock();
        let before = drafts.len();
        drafts.retain(|_, draft| self.is_live(draft, now));
        let purged = before - drafts.len();
        if purged > 0 {
            tracing::debug!(purged, "purged expired drafts");
        }
        purged
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::ErrorKind;
    use crate::testing::MockClock;

    fn book() -> (Arc<MockClock>, DraftBook) {
        let clock = Arc::new(MockClock::at_default_start());
        let book = DraftBook::new(Duration::minutes(10), clock.clone());
        (clock, book)
    }

    #[test]
    fn test_begin_edit_finalize() {
        let (_clock, book) = book();
        book.begin("alice", "Write report");
        book.edit(
            "alice",
            DraftEdit {
                schedule: Some("05/10 14:00".to_string()),
                duration: Some("30".to_string()),
                ..Default::default()
            },
        )
        .unwrap();
        book.edit("alice", DraftEdit { location: Some("Library".to_string()), ..Default::default() })
            .unwrap();
        book.set_priority("alice", true).unwrap();
        book.add_mirror("alice", "bob", "05/10 15:00").unwrap();

        let task = book.finalize("alice", |task| Ok(task.clone())).unwrap();
        assert_eq!(
            task,
            NewTask::new("Write report")
                .scheduled("05/10 14:00")
                .duration("30")
                .location("Library")
                .priority(true)
                .mirror("bob", "05/10 15:00")
        );
        assert!(book.get("alice").is_none());
    }

    #[test]
    fn test_finalize_without_draft_is_not_found() {
        let (_clock, book) = book();
        let err = book.finalize("alice", |task| Ok(task.clone())).unwrap_err();
        assert_eq!(err.kind(), ErrorKind::NotFound);
    }

    #[test]
    fn test_failed_finalize_keeps_draft() {
        let (_clock, book) = book();
        book.begin("alice", "Write report");
        let edit = DraftEdit { schedule: Some("13/45 10:00".to_string()), ..Default::default() };
        book.edit("alice", edit).unwrap();

        let err = book
            .finalize("alice", |_| Err::<(), _>(crate::Error::validation("schedule", "bad")))
            .unwrap_err();
        assert_eq!(err.kind(), ErrorKind::Validation);
        let draft = book.get("alice").unwrap();
        assert_eq!(draft.task.schedule.as_deref(), Some("13/45 10:00"));

        let edit = DraftEdit { schedule: Some("05/10 10:00".to_string()), ..Default::default() };
        book.edit("alice", edit).unwrap();
        let task = book.finalize("alice", |task| Ok(task.clone())).unwrap();
        assert_eq!(task.schedule.as_deref(), Some("05/10 10:00"));
        assert!(book.get("alice").is_none());
    }

    #[test]
    fn test_begin_replaces_previous() {
        let (_clock, book) = book();
        book.begin("alice", "first");
        book.set_priority("alice", true).unwrap();
        book.begin("alice", "second");

        let draft = book.get("alice").unwrap();
        assert_eq!(draft.task, NewTask::new("second"));
    }

    #[test]
    fn test_drafts_are_per_owner() {
        let (_clock, book) = book();
        book.begin("alice", "hers");
        assert!(book.get("bob").is_none());
        assert_eq!(book.edit("bob", DraftEdit::default()).unwrap_err().kind(), ErrorKind::NotFound);
    }

    #[test]
    fn test_draft_expires_after_ttl() {
        let (clock, book) = book();
        book.begin("alice", "x");
        clock.advance_minutes(9);
        assert!(book.get("alice").is_some());
        clock.advance_minutes(1);
        assert!(book.get("alice").is_none());
        let err = book.finalize("alice", |task| Ok(task.clone())).unwrap_err();
        assert_eq!(err.kind(), ErrorKind::NotFound);
    }

    #[test]
    fn test_edit_extends_lifetime() {
        let (clock, book) = book();
        book.begin("alice", "x");
        clock.advance_minutes(8);
        book.set_priority("alice", true).unwrap();
        clock.advance_minutes(8);
        assert!(book.finalize("alice", |task| Ok(task.priority)).unwrap());
    }

    #[test]
    fn test_edit_on_expired_draft_fails() {
        let (clock, book) = book();
        book.begin("alice", "x");
        clock.advance_minutes(11);
        assert!(book.set_priority("alice", true).is_err());
    }

    #[test]
    fn test_cancel() {
        let (_clock, book) = book();
        book.begin("alice", "x");
        assert!(book.cancel("alice"));
        assert!(!book.cancel("alice"));
    }

    #[test]
    fn test_purge_expired() {
        let (clock, book) = book();
        book.begin("alice", "old");
        clock.advance_minutes(6);
        book.begin("bob", "new");
        clock.advance_minutes(5);

        assert_eq!(book.purge_expired(), 1);
        assert!(book.get("alice").is_none());
        assert!(book.get("bob").is_some());
        assert_eq!(book.purge_expired(), 0);
    }
}
