//! Integration tests for taskbot.

use std::sync::{Arc, Barrier};
use std::thread;

use chrono::{Duration, NaiveDate};
use taskbot::db::Database;
use taskbot::preferences::{PreferenceField, PreferenceStore, SqlitePreferenceStore};
use taskbot::reminders::scan_and_notify;
use taskbot::tasks::{NewTask, SqliteTaskStore, Status, TaskStore};
use taskbot::testing::{MockClock, MockNotifier};
use taskbot::ErrorKind;
use tempfile::TempDir;

fn open(dir: &TempDir) -> (Arc<MockClock>, SqliteTaskStore) {
    let clock = Arc::new(MockClock::at_default_start());
    let db = Database::open(dir.path().join("taskbot.sqlite3")).unwrap();
    (clock.clone(), SqliteTaskStore::new(db, clock))
}

#[test]
fn test_version_exists() {
    assert!(!taskbot::VERSION.is_empty());
}

#[test]
fn test_write_report_scenario() {
    let dir = TempDir::new().unwrap();
    let (clock, store) = open(&dir);

    let task = store.create("alice", NewTask::new("Write report")).unwrap();
    assert_eq!(task.status, Status::Pending);
    assert_eq!(task.session_count, 0);

    let task = store.start(task.id, "alice").unwrap();
    assert_eq!(task.status, Status::InProgress);
    assert_eq!(task.session_count, 1);

    clock.advance_minutes(10);
    let task = store.finish("alice", Some(task.id)).unwrap();
    assert_eq!(task.status, Status::Done);
    assert!((task.accumulated_duration_minutes - 10.0).abs() < 1e-6);
}

#[test]
fn test_delay_start_finish_credits_one_session() {
    let dir = TempDir::new().unwrap();
    let (clock, store) = open(&dir);
    let task = store.create("alice", NewTask::new("Review PR")).unwrap();

    store.start(task.id, "alice").unwrap();
    clock.advance_minutes(30);
    store.delay("alice", None).unwrap();

    clock.advance_minutes(60);
    store.start(task.id, "alice").unwrap();
    clock.advance_minutes(5);
    let done = store.finish("alice", None).unwrap();

    assert_eq!(done.session_count, 2);
    assert!((done.accumulated_duration_minutes - 5.0).abs() < 1e-6);
}

#[test]
fn test_in_progress_iff_started_at() {
    let dir = TempDir::new().unwrap();
    let (clock, store) = open(&dir);
    let ids: Vec<i64> = (0..4)
        .map(|i| store.create("alice", NewTask::new(format!("task {i}"))).unwrap().id)
        .collect();

    store.start(ids[0], "alice").unwrap();
    store.start(ids[1], "alice").unwrap();
    clock.advance_minutes(3);
    store.finish("alice", Some(ids[0])).unwrap();
    store.start(ids[2], "alice").unwrap();
    store.delay("alice", Some(ids[2])).unwrap();

    for task in store.list_by_owner("alice", None, 100).unwrap() {
        assert_eq!(task.status == Status::InProgress, task.started_at.is_some(), "{task:?}");
    }
}

#[test]
fn test_concurrent_start_has_one_winner() {
    let dir = TempDir::new().unwrap();
    let (_clock, store) = open(&dir);
    let task = store.create("alice", NewTask::new("Contended")).unwrap();

    let threads = 4;
    let barrier = Arc::new(Barrier::new(threads));
    let handles: Vec<_> = (0..threads)
        .map(|_| {
            let store = store.clone();
            let barrier = Arc::clone(&barrier);
            thread::spawn(move || {
                barrier.wait();
                store.start(task.id, "alice").map_err(|e| e.kind())
            })
        })
        .collect();

    let results: Vec<_> = handles.into_iter().map(|h| h.join().unwrap()).collect();
    let wins = results.iter().filter(|r| r.is_ok()).count();
    let conflicts = results.iter().filter(|r| **r == Err(ErrorKind::Conflict)).count();

    assert_eq!(wins, 1, "{results:?}");
    assert_eq!(conflicts, threads - 1, "{results:?}");
    assert_eq!(store.get(task.id, "alice").unwrap().session_count, 1);
}

#[test]
fn test_concurrent_creates_all_land() {
    let dir = TempDir::new().unwrap();
    let (_clock, store) = open(&dir);

    let handles: Vec<_> = (0..8)
        .map(|i| {
            let store = store.clone();
            thread::spawn(move || {
                store.create(&format!("user{}", i % 2), NewTask::new(format!("t{i}"))).unwrap().id
            })
        })
        .collect();
    let mut ids: Vec<i64> = handles.into_iter().map(|h| h.join().unwrap()).collect();
    ids.sort_unstable();
    ids.dedup();

    assert_eq!(ids.len(), 8);
    assert_eq!(store.summary("user0").unwrap().total, 4);
    assert_eq!(store.summary("user1").unwrap().total, 4);
}

#[test]
fn test_owners_are_isolated() {
    let dir = TempDir::new().unwrap();
    let (_clock, store) = open(&dir);
    let task = store.create("alice", NewTask::new("private")).unwrap();

    assert_eq!(store.start(task.id, "mallory").unwrap_err().kind(), ErrorKind::NotFound);
    assert_eq!(store.finish("mallory", Some(task.id)).unwrap_err().kind(), ErrorKind::NotFound);
    assert!(!store.delete(task.id, "mallory").unwrap());
    assert!(store.list_by_owner("mallory", None, 10).unwrap().is_empty());
    assert_eq!(store.get(task.id, "alice").unwrap(), task);
}

#[test]
fn test_stores_share_one_database() {
    let dir = TempDir::new().unwrap();
    let db = Database::open(dir.path().join("shared.sqlite3")).unwrap();
    let tasks = SqliteTaskStore::new(db.clone(), Arc::new(MockClock::at_default_start()));
    let prefs = SqlitePreferenceStore::new(db);

    tasks.create("alice", NewTask::new("x")).unwrap();
    prefs.update_field("alice", PreferenceField::WorkStart, "8:0").unwrap();

    let reopened = Database::open(dir.path().join("shared.sqlite3")).unwrap();
    let prefs = SqlitePreferenceStore::new(reopened);
    assert_eq!(prefs.get_or_create("alice").unwrap().work_start.to_string(), "08:00");
}

#[test]
fn test_preference_validation_scenarios() {
    let dir = TempDir::new().unwrap();
    let prefs = SqlitePreferenceStore::open(dir.path().join("p.sqlite3")).unwrap();

    let err = prefs.update_field("alice", PreferenceField::LunchDurationMinutes, "5").unwrap_err();
    assert_eq!(err.kind(), ErrorKind::Validation);
    assert_eq!(prefs.get_or_create("alice").unwrap().lunch_duration_minutes, 30);

    let value = prefs.update_field("alice", PreferenceField::WorkStart, "9:5").unwrap();
    assert_eq!(value.to_string(), "09:05");
}

#[test]
fn test_reminder_failure_leaves_tasks_untouched() {
    let dir = TempDir::new().unwrap();
    let (_clock, store) = open(&dir);
    let a = store.create("alice", NewTask::new("a").scheduled("05/10 09:05")).unwrap();
    let b = store.create("bob", NewTask::new("b").scheduled("05/10 09:06")).unwrap();

    let notifier = MockNotifier::new();
    notifier.fail_for(a.id);
    let now = NaiveDate::from_ymd_opt(2025, 5, 10).unwrap().and_hms_opt(9, 0, 0).unwrap();
    let report = scan_and_notify(&store, &notifier, now, Duration::minutes(15)).unwrap();

    assert_eq!(report.failed, vec![a.id]);
    assert_eq!(report.notified, vec![b.id]);
    assert_eq!(store.get(a.id, "alice").unwrap(), a);

    // Nothing was marked: a second scan reminds again.
    let again = scan_and_notify(&store, &MockNotifier::new(), now, Duration::minutes(15)).unwrap();
    assert_eq!(again.notified, vec![a.id, b.id]);
}
