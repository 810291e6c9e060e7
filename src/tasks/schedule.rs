//! Parsing of user-typed schedule, deadline and duration strings.
//!
//! Schedules come in two shapes: the short `MM/DD HH:MM` form used by the
//! task composer (the year is supplied by the caller, normally the current
//! one) and the full `YYYY-MM-DD HH:MM` form. Deadlines always use the full
//! form.

use crate::error::{Error, Result};
use crate::tasks::models::DEFAULT_DURATION_MINUTES;
use chrono::{NaiveDate, NaiveDateTime};
use once_cell::sync::Lazy;
use regex::Regex;

static SHORT_SCHEDULE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^([0-9]{1,2})/([0-9]{1,2})\s+([0-9]{1,2}):([0-9]{1,2})$").unwrap());

static FULL_DATETIME: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"^([0-9]{4})-([0-9]{1,2})-([0-9]{1,2})\s+([0-9]{1,2}):([0-9]{1,2})$").unwrap()
});

/// Treat `None` and whitespace-only strings alike.
pub(crate) fn non_blank(raw: Option<&str>) -> Option<&str> {
    raw.map(str::trim).filter(|s| !s.is_empty())
}

/// Parse a schedule string.
///
/// # Errors
///
/// Returns a validation error for `field` if the string has neither shape
/// or names an impossible date or time.
pub fn parse_schedule(field: &'static str, raw: &str, year: i32) -> Result<NaiveDateTime> {
    let raw = raw.trim();
    if let Some(caps) = SHORT_SCHEDULE.captures(raw) {
        return build(field, raw, year, &caps[1], &caps[2], &caps[3], &caps[4]);
    }
    if let Some(caps) = FULL_DATETIME.captures(raw) {
        let year = number(field, raw, &caps[1])?;
        return build(field, raw, year, &caps[2], &caps[3], &caps[4], &caps[5]);
    }
    Err(Error::validation(
        field,
        format!("'{raw}' is not a date and time (expected MM/DD HH:MM or YYYY-MM-DD HH:MM)"),
    ))
}

/// Parse a deadline string (`YYYY-MM-DD HH:MM`).
///
/// # Errors
///
/// Returns a validation error if the string is malformed or impossible.
pub fn parse_deadline(raw: &str) -> Result<NaiveDateTime> {
    let raw = raw.trim();
    let Some(caps) = FULL_DATETIME.captures(raw) else {
        return Err(Error::validation(
            "deadline",
            format!("'{raw}' is not a date and time (expected YYYY-MM-DD HH:MM)"),
        ));
    };
    let year = number("deadline", raw, &caps[1])?;
    build("deadline", raw, year, &caps[2], &caps[3], &caps[4], &caps[5])
}

/// Parse a duration estimate. Absent or blank input yields the default.
///
/// # Errors
///
/// Returns a validation error unless the input is a positive integer.
pub fn parse_duration(raw: Option<&str>) -> Result<u32> {
    let Some(raw) = non_blank(raw) else {
        return Ok(DEFAULT_DURATION_MINUTES);
    };
    match raw.parse::<u32>() {
        Ok(0) | Err(_) => Err(Error::validation(
            "duration",
            format!("'{raw}' is not a positive number of minutes"),
        )),
        Ok(minutes) => Ok(minutes),
    }
}

fn number<T: std::str::FromStr>(field: &'static str, raw: &str, digits: &str) -> Result<T> {
    digits
        .parse()
        .map_err(|_| Error::validation(field, format!("'{raw}' is not a valid date and time")))
}

fn build(
    field: &'static str,
    raw: &str,
    year: i32,
    month: &str,
    day: &str,
    hour: &str,
    minute: &str,
) -> Result<NaiveDateTime> {
    let (month, day) = (number(field, raw, month)?, number(field, raw, day)?);
    let (hour, minute) = (number(field, raw, hour)?, number(field, raw, minute)?);
    NaiveDate::from_ymd_opt(year, month, day)
        .and_then(|date| date.and_hms_opt(hour, minute, 0))
        .ok_or_else(|| Error::validation(field, format!("'{raw}' is not a valid date and time")))
}
