//! Command-line interface for taskbot.
//!
//! Every command acts on behalf of one user, given with `--user` or the
//! `TASKBOT_USER` environment variable. Results are printed as JSON on
//! stdout; errors go to stderr with a distinct exit code per error kind.

mod prefs;
mod run;


pub use prefs::PrefsCommand;
pub use run::{run, CliOutput};

use crate::tasks::{MirrorRequest, Status};
use chrono::NaiveDate;
use clap::{Parser, Subcommand};
use std::path::PathBuf;

/// Personal task tracking with work sessions.
///
/// Quick start:
///
///   taskbot --user alice todo "Write report" --at "05/10 14:00"
///   taskbot --user alice start 1
///   taskbot --user alice finish
#[derive(Parser, Debug)]
#[command(name = "taskbot")]
#[command(version, about, long_about = None)]
#[command(propagate_version = true)]
pub struct Cli {
    /// User to act as.
    #[arg(short, long, global = true, env = "TASKBOT_USER")]
    pub user: Option<String>,

    /// Config file (default: ~/.taskbot/config.yaml).
    #[arg(long, global = true)]
    pub config: Option<PathBuf>,

    /// Database file, overriding the config.
    #[arg(long, global = true)]
    pub db: Option<PathBuf>,

    /// The command to execute
    #[command(subcommand)]
    pub command: Command,
}

/// Top-level commands.
#[derive(Subcommand, Debug, Clone)]
pub enum Command {
    /// Create a task.
    ///
    /// Schedules use `MM/DD HH:MM` (current year) or `YYYY-MM-DD HH:MM`.
    /// Deadlines use `YYYY-MM-DD HH:MM`.
    Todo {
        /// What needs doing
        description: String,

        /// Planned start
        #[arg(long)]
        at: Option<String>,

        /// Estimated duration in minutes (default 15)
        #[arg(short, long)]
        duration: Option<String>,

        /// Deadline
        #[arg(long)]
        deadline: Option<String>,

        /// Place or URL
        #[arg(short, long)]
        location: Option<String>,

        /// Flag as a priority
        #[arg(short, long)]
        priority: bool,

        /// Give a copy to another user: `OWNER=SCHEDULE` (repeatable)
        #[arg(short, long, value_parser = parse_mirror)]
        mirror: Vec<MirrorRequest>,
    },

    /// Show one task.
    Get {
        /// Task ID
        id: i64,
    },

    /// Start a work session on a pending task.
    Start {
        /// Task ID
        id: i64,
    },

    /// Finish a task in progress (default: the most recently started).
    Finish {
        /// Task ID
        id: Option<i64>,
    },

    /// Put a task in progress back to pending (default: the most recently
    /// started).
    Delay {
        /// Task ID
        id: Option<i64>,
    },

    /// Reschedule a task. Omitted options are left alone; an empty value
    /// clears the field.
    Edit {
        /// Task ID
        id: i64,

        /// Planned start
        #[arg(long)]
        at: Option<String>,

        /// Estimated duration in minutes
        #[arg(short, long)]
        duration: Option<String>,

        /// Deadline
        #[arg(long)]
        deadline: Option<String>,

        /// Place or URL
        #[arg(short, long)]
        location: Option<String>,
    },

    /// Delete a task.
    Delete {
        /// Task ID
        id: i64,
    },

    /// List tasks, most recent first.
    List {
        /// Filter by status: pending, in_progress, done
        #[arg(short, long)]
        status: Option<String>,

        /// Maximum number of tasks (default from config)
        #[arg(short = 'n', long)]
        limit: Option<usize>,
    },

    /// Show task counts.
    Summary,

    /// Tasks scheduled today (or on `--date`).
    Today {
        /// Day to show, `YYYY-MM-DD`
        #[arg(long)]
        date: Option<NaiveDate>,
    },

    /// Tasks scheduled this week, Monday first (or the week of `--date`).
    Week {
        /// Any day in the week to show, `YYYY-MM-DD`
        #[arg(long)]
        date: Option<NaiveDate>,
    },

    /// Scheduling preferences.
    #[command(subcommand)]
    Prefs(PrefsCommand),

    /// Print reminders for pending tasks starting soon, for all users.
    Remind {
        /// Look-ahead in minutes (default from config)
        #[arg(long)]
        lead: Option<u32>,
    },

    /// Show version information.
    Version,
}

impl Command {
    /// Returns true if this command acts on behalf of a user.
    #[must_use]
    pub const fn needs_user(&self) -> bool {
        !matches!(self, Self::Remind { .. } | Self::Version)
    }
}

/// Parse `OWNER=SCHEDULE` into a mirror request.
fn parse_mirror(raw: &str) -> Result<MirrorRequest, String> {
    let (owner, schedule) =
        raw.split_once('=').ok_or_else(|| format!("'{raw}' is not OWNER=SCHEDULE"))?;
    if owner.trim().is_empty() || schedule.trim().is_empty() {
        return Err(format!("'{raw}' is not OWNER=SCHEDULE"));
    }
    Ok(MirrorRequest { owner: owner.trim().to_string(), schedule: schedule.trim().to_string() })
}

/// Parse an optional `--status` value.
fn parse_status(raw: Option<&String>) -> crate::error::Result<Option<Status>> {
    raw.map(|s| {
        Status::from_str(s).map_err(|e| crate::error::Error::validation("status", e.to_string()))
    })
    .transpose()
}
