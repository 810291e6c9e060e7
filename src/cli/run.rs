//! Command execution for the CLI.
//!
//! This module handles running CLI commands and producing output.

use crate::cli::{parse_status, Cli, Command, PrefsCommand};
use crate::config::BotConfig;
use crate::db::Database;
use crate::error::{Error, ErrorKind};
use crate::preferences::{PreferenceField, PreferenceStore, SqlitePreferenceStore};
use crate::reminders::{scan_and_notify, ReminderReport};
use crate::tasks::{self, NewTask, SqliteTaskStore, Task, TaskEdit, TaskStore};
use crate::traits::{Notifier, SystemClock};
use chrono::{Duration, Local, NaiveDate};
use serde::Serialize;
use std::cell::RefCell;
use std::process::ExitCode;
use std::sync::Arc;

/// Output from running the CLI, with separate stdout and stderr messages.
#[derive(Debug)]
pub struct CliOutput {
    /// Exit code for the process.
    pub exit_code: ExitCode,
    /// Messages to print to stdout.
    pub stdout: Vec<String>,
    /// Messages to print to stderr.
    pub stderr: Vec<String>,
}

/// Everything a command needs once config and storage are resolved.
struct Context {
    config: BotConfig,
    tasks: SqliteTaskStore,
    prefs: SqlitePreferenceStore,
}

impl Context {
    fn open(cli: &Cli) -> crate::error::Result<Self> {
        let config = BotConfig::load_or_default(cli.config.as_deref())?;
        let path = match &cli.db {
            Some(path) => path.clone(),
            None => config.database_path()?,
        };
        let db = Database::open(path)?;
        Ok(Self {
            tasks: SqliteTaskStore::new(db.clone(), Arc::new(SystemClock)),
            prefs: SqlitePreferenceStore::new(db),
            config,
        })
    }
}

/// Run a parsed command line.
pub fn run(cli: Cli) -> CliOutput {
    if matches!(cli.command, Command::Version) {
        return success_output(format!("taskbot v{}", crate::VERSION));
    }

    let user = match (cli.command.needs_user(), cli.user.as_deref().map(str::trim)) {
        (false, _) => String::new(),
        (true, Some(user)) if !user.is_empty() => user.to_string(),
        (true, _) => {
            return error_output(&Error::validation("user", "pass --user or set TASKBOT_USER"))
        }
    };

    let ctx = match Context::open(&cli) {
        Ok(ctx) => ctx,
        Err(e) => return error_output(&e),
    };
    tracing::debug!(command = ?cli.command, user = %user, "running command");

    let result = match cli.command {
        Command::Todo { description, at, duration, deadline, location, priority, mirror } => {
            let new_task = NewTask {
                description,
                schedule: at,
                duration,
                deadline,
                location,
                priority,
                mirrors: mirror,
            };
            ctx.tasks.create(&user, new_task).map(|task| json_output(&task))
        }
        Command::Get { id } => ctx.tasks.get(id, &user).map(|task| json_output(&task)),
        Command::Start { id } => ctx.tasks.start(id, &user).map(|task| json_output(&task)),
        Command::Finish { id } => ctx.tasks.finish(&user, id).map(|task| json_output(&task)),
        Command::Delay { id } => ctx.tasks.delay(&user, id).map(|task| json_output(&task)),
        Command::Edit { id, at, duration, deadline, location } => {
            let edit = TaskEdit { schedule: at, duration, deadline, location };
            if edit.is_empty() {
                Err(Error::validation("edit", "nothing to change"))
            } else {
                ctx.tasks.update_schedule(id, &user, edit).map(|task| json_output(&task))
            }
        }
        Command::Delete { id } => ctx.tasks.delete(id, &user).map(|deleted| {
            json_output(&serde_json::json!({ "id": id, "deleted": deleted }))
        }),
        Command::List { status, limit } => list(&ctx, &user, status.as_ref(), limit),
        Command::Summary => ctx.tasks.summary(&user).map(|summary| json_output(&summary)),
        Command::Today { date } => {
            let date = date.unwrap_or_else(today);
            tasks::tasks_on_day(&ctx.tasks, &user, date).map(|tasks| json_output(&tasks))
        }
        Command::Week { date } => {
            let date = date.unwrap_or_else(today);
            tasks::week_agenda(&ctx.tasks, &user, date).map(|week| json_output(&week))
        }
        Command::Prefs(cmd) => prefs(&ctx, &user, cmd),
        Command::Remind { lead } => remind(&ctx, lead),
        Command::Version => Ok(success_output(format!("taskbot v{}", crate::VERSION))),
    };

    result.unwrap_or_else(|e| error_output(&e))
}

fn today() -> NaiveDate {
    Local::now().date_naive()
}

#[derive(Debug, Serialize)]
struct ListOutput {
    total: u64,
    active: u64,
    done: u64,
    tasks: Vec<Task>,
}

fn list(
    ctx: &Context,
    user: &str,
    status: Option<&String>,
    limit: Option<usize>,
) -> crate::error::Result<CliOutput> {
    let status = parse_status(status)?;
    let limit = limit.unwrap_or(ctx.config.list_limit);
    let summary = ctx.tasks.summary(user)?;
    let tasks = ctx.tasks.list_by_owner(user, status, limit)?;
    Ok(json_output(&ListOutput {
        total: summary.total,
        active: summary.active,
        done: summary.done,
        tasks,
    }))
}

fn prefs(ctx: &Context, user: &str, cmd: PrefsCommand) -> crate::error::Result<CliOutput> {
    match cmd {
        PrefsCommand::Show => Ok(json_output(&ctx.prefs.get_or_create(user)?)),
        PrefsCommand::Set { field, value } => {
            let field = PreferenceField::from_str(&field)?;
            let value = ctx.prefs.update_field(user, field, &value)?;
            Ok(json_output(&serde_json::json!({ "field": field.as_str(), "value": value })))
        }
    }
}

/// Collects reminder text for printing.
#[derive(Debug, Default)]
struct PrintNotifier {
    lines: RefCell<Vec<String>>,
}

impl Notifier for PrintNotifier {
    fn notify(&self, task: &Task) -> crate::error::Result<()> {
        let when = task.scheduled_at.map(|at| at.format("%Y-%m-%d %H:%M").to_string());
        self.lines.borrow_mut().push(format!(
            "Reminder for {}: '{}' starts at {} (task {})",
            task.owner,
            task.description,
            when.as_deref().unwrap_or("an unknown time"),
            task.id
        ));
        Ok(())
    }
}

#[derive(Debug, Serialize)]
struct RemindOutput {
    #[serde(flatten)]
    report: ReminderReport,
    reminders: Vec<String>,
}

fn remind(ctx: &Context, lead: Option<u32>) -> crate::error::Result<CliOutput> {
    let lead = lead.map_or_else(|| ctx.config.reminder_lead(), |m| Duration::minutes(i64::from(m)));
    let notifier = PrintNotifier::default();
    let report = scan_and_notify(&ctx.tasks, &notifier, Local::now().naive_local(), lead)?;
    Ok(json_output(&RemindOutput { report, reminders: notifier.lines.into_inner() }))
}

fn json_output<T: Serialize>(value: &T) -> CliOutput {
    match serde_json::to_string_pretty(value) {
        Ok(json) => CliOutput { exit_code: ExitCode::SUCCESS, stdout: vec![json], stderr: vec![] },
        Err(e) => error_output(&Error::from(e)),
    }
}

fn success_output(message: String) -> CliOutput {
    CliOutput { exit_code: ExitCode::SUCCESS, stdout: vec![message], stderr: vec![] }
}

/// Exit code for an error: 2 validation, 3 not found, 4 conflict, 1 other.
pub(crate) const fn exit_code_for(kind: ErrorKind) -> u8 {
    match kind {
        ErrorKind::Validation => 2,
        ErrorKind::NotFound => 3,
        ErrorKind::Conflict => 4,
        ErrorKind::Internal => 1,
    }
}

fn error_output(error: &Error) -> CliOutput {
    if error.kind() == ErrorKind::Internal {
        tracing::error!(error = %error, "command failed");
    }
    CliOutput {
        exit_code: ExitCode::from(exit_code_for(error.kind())),
        stdout: vec![],
        stderr: vec![format!("Error: {error}")],
    }
}
