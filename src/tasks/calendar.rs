//! Day and week windows for calendar-style views.
//!
//! Windows are half-open `[start, end)` ranges of wall-clock date-times, the
//! shape [`TaskStore::list_due_between`](super::TaskStore::list_due_between)
//! expects.

use crate::tasks::models::Task;
use chrono::{Datelike, Duration, NaiveDate, NaiveDateTime, NaiveTime, Weekday};
use serde::Serialize;

/// A half-open range of wall-clock time.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct Window {
    /// Inclusive start.
    pub start: NaiveDateTime,
    /// Exclusive end.
    pub end: NaiveDateTime,
}

impl Window {
    /// Check whether `at` falls inside the window.
    #[must_use]
    pub fn contains(&self, at: NaiveDateTime) -> bool {
        self.start <= at && at < self.end
    }
}

/// The window covering `date`, from midnight to the next midnight.
#[must_use]
pub fn day_window(date: NaiveDate) -> Window {
    let start = date.and_time(NaiveTime::MIN);
    Window { start, end: start + Duration::days(1) }
}

/// The week containing `date`, from Monday midnight to the following Monday.
#[must_use]
pub fn week_window(date: NaiveDate) -> Window {
    let offset = i64::from(date.weekday().num_days_from_monday());
    let start = (date - Duration::days(offset)).and_time(NaiveTime::MIN);
    Window { start, end: start + Duration::days(7) }
}

/// Tasks scheduled on one weekday.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct DayBucket {
    /// Weekday of this bucket.
    #[serde(serialize_with = "serialize_weekday")]
    pub weekday: Weekday,
    /// Tasks in the order they were given.
    pub tasks: Vec<Task>,
}

fn serialize_weekday<S: serde::Serializer>(day: &Weekday, s: S) -> Result<S::Ok, S::Error> {
    s.serialize_str(&day.to_string())
}

/// Split tasks into seven buckets, Monday first.
///
/// Unscheduled tasks are dropped. The order within each bucket follows the
/// input, so sorted input gives sorted buckets.
#[must_use]
pub fn group_by_weekday(tasks: Vec<Task>) -> Vec<DayBucket> {
    let mut buckets: Vec<DayBucket> = (0..7)
        .map(|n| DayBucket { weekday: weekday_from_monday(n), tasks: Vec::new() })
        .collect();

    for task in tasks {
        if let Some(at) = task.scheduled_at {
            let index = at.weekday().num_days_from_monday() as usize;
            buckets[index].tasks.push(task);
        }
    }
    buckets
}

fn weekday_from_monday(n: u32) -> Weekday {
    match n {
        0 => Weekday::Mon,
        1 => Weekday::Tue,
        2 => Weekday::Wed,
        3 => Weekday::Thu,
        4 => Weekday::Fri,
        5 => Weekday::Sat,
        _ => Weekday::Sun,
    }
}
