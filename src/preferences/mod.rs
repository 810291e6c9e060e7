//! Per-user scheduling preferences.
//!
//! Each user has one record, created with defaults the first time it is
//! read or edited. Fields are edited one at a time through
//! [`PreferenceStore::update_field`], which validates and normalizes the raw
//! input before anything is written.

pub mod models;
pub mod store;

pub use models::{
    Preference, PreferenceField, PreferenceValue, TimeOfDay, TimeZone, MAX_LUNCH_MINUTES,
    MIN_LUNCH_MINUTES,
};
pub use store::{PreferenceStore, SqlitePreferenceStore};
