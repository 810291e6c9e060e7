//! Preference CLI subcommands.

use clap::Subcommand;

/// Scheduling preference commands.
///
/// Fields: `work_start`, `work_end`, `lunch_window_start`,
/// `lunch_window_end` (all `HH:MM`), `lunch_duration_minutes` (10-180) and
/// `time_zone` (GMT, UTC, Europe/London, Europe/Berlin, America/New_York,
/// America/Los_Angeles, Asia/Tokyo, Asia/Kolkata).
#[derive(Subcommand, Debug, Clone)]
pub enum PrefsCommand {
    /// Show all preferences.
    Show,

    /// Set one preference.
    Set {
        /// Field name
        field: String,

        /// New value
        value: String,
    },
}
