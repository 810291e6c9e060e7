//! Preference model types and field validators.

use crate::error::{Error, Result};
use once_cell::sync::Lazy;
use regex::Regex;
use serde::{Deserialize, Serialize};

/// Shortest accepted lunch break, in minutes.
pub const MIN_LUNCH_MINUTES: u32 = 10;

/// Longest accepted lunch break, in minutes.
pub const MAX_LUNCH_MINUTES: u32 = 180;

static TIME_OF_DAY: Lazy<Regex> = Lazy::new(|| Regex::new(r"^([0-9]{1,2}):([0-9]{1,2})$").unwrap());

/// A wall-clock time without date, stored as `HH:MM`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct TimeOfDay {
    hour: u8,
    minute: u8,
}

impl TimeOfDay {
    /// Create a time, returning `None` if out of range.
    #[must_use]
    pub const fn new(hour: u8, minute: u8) -> Option<Self> {
        if hour <= 23 && minute <= 59 {
            Some(Self { hour, minute })
        } else {
            None
        }
    }

    /// Hour, 0-23.
    #[must_use]
    pub const fn hour(self) -> u8 {
        self.hour
    }

    /// Minute, 0-59.
    #[must_use]
    pub const fn minute(self) -> u8 {
        self.minute
    }

    /// Parse `H:M` with one or two digits on each side.
    ///
    /// # Errors
    ///
    /// Returns a validation error for `field` if the input is malformed or
    /// out of range.
    pub fn parse(field: &'static str, raw: &str) -> Result<Self> {
        let raw = raw.trim();
        let caps = TIME_OF_DAY
            .captures(raw)
            .ok_or_else(|| Error::validation(field, format!("'{raw}' is not a time (expected HH:MM)")))?;

        let out_of_range = |part: &str, max: u8| {
            Error::validation(field, format!("'{raw}': {part} is not between 0 and {max}"))
        };
        let hour = caps[1]
            .parse::<u8>()
            .ok()
            .filter(|h| *h <= 23)
            .ok_or_else(|| out_of_range("hour", 23))?;
        let minute = caps[2]
            .parse::<u8>()
            .ok()
            .filter(|m| *m <= 59)
            .ok_or_else(|| out_of_range("minute", 59))?;
        Ok(Self { hour, minute })
    }
}

impl std::fmt::Display for TimeOfDay {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{:02}:{:02}", self.hour, self.minute)
    }
}

impl Serialize for TimeOfDay {
    fn serialize<S: serde::Serializer>(&self, s: S) -> std::result::Result<S::Ok, S::Error> {
        s.collect_str(self)
    }
}

impl<'de> Deserialize<'de> for TimeOfDay {
    fn deserialize<D: serde::Deserializer<'de>>(d: D) -> std::result::Result<Self, D::Error> {
        let raw = String::deserialize(d)?;
        Self::parse("time", &raw).map_err(serde::de::Error::custom)
    }
}

/// The time zones a user may choose from.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum TimeZone {
    /// `GMT`
    Gmt,
    /// `UTC`
    #[default]
    Utc,
    /// `Europe/London`
    EuropeLondon,
    /// `Europe/Berlin`
    EuropeBerlin,
    /// `America/New_York`
    AmericaNewYork,
    /// `America/Los_Angeles`
    AmericaLosAngeles,
    /// `Asia/Tokyo`
    AsiaTokyo,
    /// `Asia/Kolkata`
    AsiaKolkata,
}

impl TimeZone {
    /// Every accepted zone.
    pub const ALL: [Self; 8] = [
        Self::Gmt,
        Self::Utc,
        Self::EuropeLondon,
        Self::EuropeBerlin,
        Self::AmericaNewYork,
        Self::AmericaLosAngeles,
        Self::AsiaTokyo,
        Self::AsiaKolkata,
    ];

    /// Parse an exact zone name. Matching is case-sensitive.
    ///
    /// # Errors
    ///
    /// Returns a validation error listing the accepted names.
    #[allow(clippy::should_implement_trait)]
    pub fn from_str(raw: &str) -> Result<Self> {
        let raw = raw.trim();
        Self::ALL.into_iter().find(|tz| tz.as_str() == raw).ok_or_else(|| {
            let names: Vec<&str> = Self::ALL.iter().map(Self::as_str).collect();
            Error::validation("time_zone", format!("'{raw}' is not one of: {}", names.join(", ")))
        })
    }

    /// The IANA-style name.
    #[must_use]
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::Gmt => "GMT",
            Self::Utc => "UTC",
            Self::EuropeLondon => "Europe/London",
            Self::EuropeBerlin => "Europe/Berlin",
            Self::AmericaNewYork => "America/New_York",
            Self::AmericaLosAngeles => "America/Los_Angeles",
            Self::AsiaTokyo => "Asia/Tokyo",
            Self::AsiaKolkata => "Asia/Kolkata",
        }
    }
}

impl std::fmt::Display for TimeZone {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl Serialize for TimeZone {
    fn serialize<S: serde::Serializer>(&self, s: S) -> std::result::Result<S::Ok, S::Error> {
        s.serialize_str(self.as_str())
    }
}

/// An editable preference field.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum PreferenceField {
    /// Start of the working day.
    WorkStart,
    /// End of the working day.
    WorkEnd,
    /// Length of the lunch break.
    LunchDurationMinutes,
    /// Earliest lunch start.
    LunchWindowStart,
    /// Latest lunch end.
    LunchWindowEnd,
    /// The user's time zone.
    TimeZone,
}

impl PreferenceField {
    /// Every editable field, in display order.
    pub const ALL: [Self; 6] = [
        Self::WorkStart,
        Self::WorkEnd,
        Self::LunchDurationMinutes,
        Self::LunchWindowStart,
        Self::LunchWindowEnd,
        Self::TimeZone,
    ];

    /// Parse a field from its `snake_case` name.
    ///
    /// # Errors
    ///
    /// Returns a validation error for unknown names.
    #[allow(clippy::should_implement_trait)]
    pub fn from_str(name: &str) -> Result<Self> {
        let name = name.trim();
        Self::ALL.into_iter().find(|f| f.as_str() == name).ok_or_else(|| {
            let names: Vec<&str> = Self::ALL.iter().map(Self::as_str).collect();
            Error::validation("field", format!("'{name}' is not one of: {}", names.join(", ")))
        })
    }

    /// The `snake_case` name, which is also the column name.
    #[must_use]
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::WorkStart => "work_start",
            Self::WorkEnd => "work_end",
            Self::LunchDurationMinutes => "lunch_duration_minutes",
            Self::LunchWindowStart => "lunch_window_start",
            Self::LunchWindowEnd => "lunch_window_end",
            Self::TimeZone => "time_zone",
        }
    }

    /// Validate and normalize a raw value for this field.
    ///
    /// # Errors
    ///
    /// Returns a validation error naming the violated constraint.
    pub fn parse_value(self, raw: &str) -> Result<PreferenceValue> {
        match self {
            Self::WorkStart | Self::WorkEnd | Self::LunchWindowStart | Self::LunchWindowEnd => {
                TimeOfDay::parse(self.as_str(), raw).map(PreferenceValue::Time)
            }
            Self::LunchDurationMinutes => parse_lunch_minutes(raw).map(PreferenceValue::Minutes),
            Self::TimeZone => TimeZone::from_str(raw).map(PreferenceValue::TimeZone),
        }
    }
}

impl std::fmt::Display for PreferenceField {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

fn parse_lunch_minutes(raw: &str) -> Result<u32> {
    let raw = raw.trim();
    let minutes: u32 = raw.parse().map_err(|_| {
        Error::validation("lunch_duration_minutes", format!("'{raw}' is not a whole number"))
    })?;
    if !(MIN_LUNCH_MINUTES..=MAX_LUNCH_MINUTES).contains(&minutes) {
        return Err(Error::validation(
            "lunch_duration_minutes",
            format!("{minutes} is not between {MIN_LUNCH_MINUTES} and {MAX_LUNCH_MINUTES}"),
        ));
    }
    Ok(minutes)
}

/// A validated, normalized preference value.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(untagged)]
pub enum PreferenceValue {
    /// A time-of-day field.
    Time(TimeOfDay),
    /// The lunch duration.
    Minutes(u32),
    /// The time zone.
    TimeZone(TimeZone),
}

impl std::fmt::Display for PreferenceValue {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Time(t) => write!(f, "{t}"),
            Self::Minutes(m) => write!(f, "{m}"),
            Self::TimeZone(tz) => write!(f, "{tz}"),
        }
    }
}

/// One user's scheduling preferences.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Preference {
    /// The user these preferences belong to.
    pub owner: String,
    /// Start of the working day.
    pub work_start: TimeOfDay,
    /// End of the working day.
    pub work_end: TimeOfDay,
    /// Lunch break length, 10-180 minutes.
    pub lunch_duration_minutes: u32,
    /// Earliest lunch start.
    pub lunch_window_start: TimeOfDay,
    /// Latest lunch end.
    pub lunch_window_end: TimeOfDay,
    /// The user's time zone.
    pub time_zone: TimeZone,
}

impl Preference {
    /// Default preferences for `owner`.
    #[must_use]
    pub fn defaults_for(owner: impl Into<String>) -> Self {
        Self {
            owner: owner.into(),
            work_start: TimeOfDay { hour: 9, minute: 0 },
            work_end: TimeOfDay { hour: 17, minute: 0 },
            lunch_duration_minutes: 30,
            lunch_window_start: TimeOfDay { hour: 12, minute: 0 },
            lunch_window_end: TimeOfDay { hour: 14, minute: 0 },
            time_zone: TimeZone::Utc,
        }
    }

    /// Current value of `field`.
    #[must_use]
    pub const fn value(&self, field: PreferenceField) -> PreferenceValue {
        match field {
            PreferenceField::WorkStart => PreferenceValue::Time(self.work_start),
            PreferenceField::WorkEnd => PreferenceValue::Time(self.work_end),
            PreferenceField::LunchDurationMinutes => {
                PreferenceValue::Minutes(self.lunch_duration_minutes)
            }
            PreferenceField::LunchWindowStart => PreferenceValue::Time(self.lunch_window_start),
            PreferenceField::LunchWindowEnd => PreferenceValue::Time(self.lunch_window_end),
            PreferenceField::TimeZone => PreferenceValue::TimeZone(self.time_zone),
        }
    }
}
