//! MCP server for task tracking.
//!
//! This module provides an MCP server that exposes the task and preference
//! stores, plus multi-step task drafts, through the Model Context Protocol.
//! Every tool takes the acting user as `owner`.

// The rmcp `#[tool(aggr)]` macro requires ownership of input structs,
// making pass-by-value necessary for all tool handler functions.
#![allow(clippy::needless_pass_by_value)]

use crate::config::BotConfig;
use crate::db::Database;
use crate::drafts::{DraftBook, DraftEdit};
use crate::error::{Error, ErrorKind};
use crate::preferences::{PreferenceField, PreferenceStore, SqlitePreferenceStore};
use crate::tasks::{self, MirrorRequest, NewTask, SqliteTaskStore, Status, TaskEdit, TaskStore};
use crate::traits::{Clock, SystemClock};
use chrono::{Local, NaiveDate};
use rmcp::model::{
    CallToolResult, Content, Implementation, ProtocolVersion, ServerCapabilities, ServerInfo,
};
use rmcp::tool;
use rmcp::Error as McpError;
use schemars::JsonSchema;
use serde::{Deserialize, Serialize};
use std::sync::Arc;

/// Instructions for the MCP server, shown to agents using this server.
const INSTRUCTIONS: &str = r"Personal task tracker. Every tool acts for the user named in `owner`; tasks of other users are invisible.

## Lifecycle

Tasks start `pending`. `start_task` begins a work session (`in_progress`), `finish_task` ends it (`done`, elapsed minutes credited) and `delay_task` puts it back to `pending` without crediting time. `done` is final. `finish_task` and `delay_task` default to the most recently started task when no id is given.

## Scheduling

Schedules are `MM/DD HH:MM` (current year) or `YYYY-MM-DD HH:MM`; deadlines are `YYYY-MM-DD HH:MM`; durations are whole minutes (default 15). Mirrors give an independent copy of a new task to another user at their own time. `edit_task` reschedules an existing task; an empty string clears a field.

## Drafts

For step-by-step composition use `draft_begin`, then `draft_edit` / `draft_set_priority` / `draft_add_mirror`, then `draft_finalize` to create the task. A draft that fails validation is kept so it can be fixed. Drafts expire after a few idle minutes.
";

/// MCP server for task tracking.
#[derive(Clone)]
pub struct TaskbotServer {
    tasks: Arc<SqliteTaskStore>,
    prefs: Arc<SqlitePreferenceStore>,
    drafts: Arc<DraftBook>,
    config: BotConfig,
}

impl TaskbotServer {
    /// Create a server over the configured database, using the system
    /// clock.
    ///
    /// # Errors
    ///
    /// Returns an error if the database cannot be initialized.
    pub fn new(config: BotConfig) -> crate::error::Result<Self> {
        let db = Database::open(config.database_path()?)?;
        Ok(Self::with_clock(db, Arc::new(SystemClock), config))
    }

    /// Create a server over an opened database with the given clock.
    #[must_use]
    pub fn with_clock(db: Database, clock: Arc<dyn Clock>, config: BotConfig) -> Self {
        Self {
            tasks: Arc::new(SqliteTaskStore::new(db.clone(), Arc::clone(&clock))),
            prefs: Arc::new(SqlitePreferenceStore::new(db)),
            drafts: Arc::new(DraftBook::new(config.draft_ttl(), clock)),
            config,
        }
    }
}

// Tool input schemas

/// A copy of a new task for another user.
#[derive(Debug, Deserialize, JsonSchema)]
pub struct MirrorInput {
    /// The user who receives the copy.
    pub owner: String,
    /// When the copy is scheduled.
    pub schedule: String,
}

impl From<MirrorInput> for MirrorRequest {
    fn from(input: MirrorInput) -> Self {
        Self { owner: input.owner, schedule: input.schedule }
    }
}

/// Input for creating a task.
#[derive(Debug, Deserialize, JsonSchema)]
pub struct CreateTaskInput {
    /// Acting user.
    pub owner: String,
    /// What needs doing (required).
    pub description: String,
    /// Planned start, `MM/DD HH:MM` or `YYYY-MM-DD HH:MM` (optional).
    pub schedule: Option<String>,
    /// Estimated minutes (optional, default 15).
    pub duration: Option<String>,
    /// Deadline, `YYYY-MM-DD HH:MM` (optional).
    pub deadline: Option<String>,
    /// Place or URL (optional).
    pub location: Option<String>,
    /// Priority flag.
    #[serde(default)]
    pub priority: bool,
    /// Copies for other users.
    #[serde(default)]
    pub mirrors: Vec<MirrorInput>,
}

/// Input naming one task.
#[derive(Debug, Deserialize, JsonSchema)]
pub struct TaskIdInput {
    /// Acting user.
    pub owner: String,
    /// Task ID.
    pub id: i64,
}

/// Input for rescheduling a task. Omitted fields are left alone; an empty
/// string clears the field.
#[derive(Debug, Deserialize, JsonSchema)]
pub struct EditTaskInput {
    /// Acting user.
    pub owner: String,
    /// Task ID.
    pub id: i64,
    /// Planned start.
    pub schedule: Option<String>,
    /// Estimated minutes.
    pub duration: Option<String>,
    /// Deadline.
    pub deadline: Option<String>,
    /// Place or URL.
    pub location: Option<String>,
}

/// Input for finishing or delaying a task.
#[derive(Debug, Deserialize, JsonSchema)]
pub struct SessionInput {
    /// Acting user.
    pub owner: String,
    /// Task ID (optional, default: the most recently started task).
    pub id: Option<i64>,
}

/// Input for listing tasks.
#[derive(Debug, Deserialize, JsonSchema)]
pub struct ListTasksInput {
    /// Acting user.
    pub owner: String,
    /// Filter by status: pending, in_progress, done (optional).
    pub status: Option<String>,
    /// Maximum number of tasks (optional).
    pub limit: Option<usize>,
}

/// Input carrying only the acting user.
#[derive(Debug, Deserialize, JsonSchema)]
pub struct OwnerInput {
    /// Acting user.
    pub owner: String,
}

/// Input for calendar views.
#[derive(Debug, Deserialize, JsonSchema)]
pub struct CalendarInput {
    /// Acting user.
    pub owner: String,
    /// Day, `YYYY-MM-DD` (optional, default today).
    pub date: Option<String>,
}

/// Input for setting a preference.
#[derive(Debug, Deserialize, JsonSchema)]
pub struct SetPreferenceInput {
    /// Acting user.
    pub owner: String,
    /// Field: work_start, work_end, lunch_duration_minutes,
    /// lunch_window_start, lunch_window_end, time_zone.
    pub field: String,
    /// New value.
    pub value: String,
}

/// Input for starting a draft.
#[derive(Debug, Deserialize, JsonSchema)]
pub struct DraftBeginInput {
    /// Acting user.
    pub owner: String,
    /// What needs doing.
    pub description: String,
}

/// Input for editing a draft. Omitted fields are left alone.
#[derive(Debug, Deserialize, JsonSchema)]
pub struct DraftEditInput {
    /// Acting user.
    pub owner: String,
    /// Planned start.
    pub schedule: Option<String>,
    /// Estimated minutes.
    pub duration: Option<String>,
    /// Deadline.
    pub deadline: Option<String>,
    /// Place or URL.
    pub location: Option<String>,
}

/// Input for flagging a draft.
#[derive(Debug, Deserialize, JsonSchema)]
pub struct DraftPriorityInput {
    /// Acting user.
    pub owner: String,
    /// Priority flag.
    pub priority: bool,
}

/// Input for adding a mirror to a draft.
#[derive(Debug, Deserialize, JsonSchema)]
pub struct DraftMirrorInput {
    /// Acting user.
    pub owner: String,
    /// The user who receives the copy.
    pub mirror_owner: String,
    /// When the copy is scheduled.
    pub schedule: String,
}

fn to_mcp_error(error: Error) -> McpError {
    let kind = match error.kind() {
        ErrorKind::Validation => "validation",
        ErrorKind::NotFound => "not_found",
        ErrorKind::Conflict => "conflict",
        ErrorKind::Internal => {
            tracing::error!(error = %error, "tool failed");
            return McpError::internal_error(error.to_string(), None);
        }
    };
    McpError::invalid_params(error.to_string(), Some(serde_json::json!({ "kind": kind })))
}

fn json_result<T: Serialize>(value: &T) -> Result<CallToolResult, McpError> {
    let json = serde_json::to_string_pretty(value)
        .map_err(|e| McpError::internal_error(e.to_string(), None))?;
    Ok(CallToolResult::success(vec![Content::text(json)]))
}

fn parse_date(raw: Option<&str>) -> Result<NaiveDate, McpError> {
    match raw.map(str::trim).filter(|s| !s.is_empty()) {
        Some(raw) => NaiveDate::parse_from_str(raw, "%Y-%m-%d").map_err(|_| {
            McpError::invalid_params(format!("'{raw}' is not a date (expected YYYY-MM-DD)"), None)
        }),
        None => Ok(Local::now().date_naive()),
    }
}

#[tool(tool_box)]
impl TaskbotServer {
    /// Create a task.
    #[tool(description = "Create a task with optional schedule, duration, deadline, location, priority and mirrors")]
    fn create_task(&self, #[tool(aggr)] input: CreateTaskInput) -> Result<CallToolResult, McpError> {
        let new_task = NewTask {
            description: input.description,
            schedule: input.schedule,
            duration: input.duration,
            deadline: input.deadline,
            location: input.location,
            priority: input.priority,
            mirrors: input.mirrors.into_iter().map(MirrorRequest::from).collect(),
        };
        let task = self.tasks.create(&input.owner, new_task).map_err(to_mcp_error)?;
        json_result(&task)
    }

    /// Get one task.
    #[tool(description = "Get one of the owner's tasks by ID")]
    fn get_task(&self, #[tool(aggr)] input: TaskIdInput) -> Result<CallToolResult, McpError> {
        let task = self.tasks.get(input.id, &input.owner).map_err(to_mcp_error)?;
        json_result(&task)
    }

    /// Start a work session.
    #[tool(description = "Start a work session on a pending task")]
    fn start_task(&self, #[tool(aggr)] input: TaskIdInput) -> Result<CallToolResult, McpError> {
        let task = self.tasks.start(input.id, &input.owner).map_err(to_mcp_error)?;
        json_result(&task)
    }

    /// Finish a task.
    #[tool(description = "Finish a task in progress (default: the most recently started one)")]
    fn finish_task(&self, #[tool(aggr)] input: SessionInput) -> Result<CallToolResult, McpError> {
        let task = self.tasks.finish(&input.owner, input.id).map_err(to_mcp_error)?;
        json_result(&task)
    }

    /// Delay a task.
    #[tool(description = "Put a task in progress back to pending (default: the most recently started one)")]
    fn delay_task(&self, #[tool(aggr)] input: SessionInput) -> Result<CallToolResult, McpError> {
        let task = self.tasks.delay(&input.owner, input.id).map_err(to_mcp_error)?;
        json_result(&task)
    }

    /// Reschedule a task.
    #[tool(description = "Change the schedule, duration, deadline or location of one of the owner's tasks")]
    fn edit_task(&self, #[tool(aggr)] input: EditTaskInput) -> Result<CallToolResult, McpError> {
        let edit = TaskEdit {
            schedule: input.schedule,
            duration: input.duration,
            deadline: input.deadline,
            location: input.location,
        };
        let task = self.tasks.update_schedule(input.id, &input.owner, edit).map_err(to_mcp_error)?;
        json_result(&task)
    }

    /// Delete a task.
    #[tool(description = "Delete one of the owner's tasks; reports whether it existed")]
    fn delete_task(&self, #[tool(aggr)] input: TaskIdInput) -> Result<CallToolResult, McpError> {
        let deleted = self.tasks.delete(input.id, &input.owner).map_err(to_mcp_error)?;
        json_result(&serde_json::json!({ "id": input.id, "deleted": deleted }))
    }

    /// List tasks.
    #[tool(description = "List the owner's tasks, most recent first")]
    fn list_tasks(&self, #[tool(aggr)] input: ListTasksInput) -> Result<CallToolResult, McpError> {
        let status = input
            .status
            .as_deref()
            .map(Status::from_str)
            .transpose()
            .map_err(|e| McpError::invalid_params(e.to_string(), None))?;
        let limit = input.limit.unwrap_or(self.config.list_limit);
        let tasks =
            self.tasks.list_by_owner(&input.owner, status, limit).map_err(to_mcp_error)?;
        json_result(&tasks)
    }

    /// Count tasks.
    #[tool(description = "Count the owner's tasks: total, active and done")]
    fn task_summary(&self, #[tool(aggr)] input: OwnerInput) -> Result<CallToolResult, McpError> {
        let summary = self.tasks.summary(&input.owner).map_err(to_mcp_error)?;
        json_result(&summary)
    }

    /// Tasks on one day.
    #[tool(description = "Tasks scheduled on a day (default today), earliest first")]
    fn tasks_today(&self, #[tool(aggr)] input: CalendarInput) -> Result<CallToolResult, McpError> {
        let date = parse_date(input.date.as_deref())?;
        let day = tasks::tasks_on_day(self.tasks.as_ref(), &input.owner, date)
            .map_err(to_mcp_error)?;
        json_result(&day)
    }

    /// Tasks in one week.
    #[tool(description = "Tasks scheduled in the week containing a day (default today), grouped Monday to Sunday")]
    fn tasks_this_week(
        &self,
        #[tool(aggr)] input: CalendarInput,
    ) -> Result<CallToolResult, McpError> {
        let date = parse_date(input.date.as_deref())?;
        let week = tasks::week_agenda(self.tasks.as_ref(), &input.owner, date)
            .map_err(to_mcp_error)?;
        json_result(&week)
    }

    /// Show preferences.
    #[tool(description = "Get the owner's scheduling preferences")]
    fn get_preferences(&self, #[tool(aggr)] input: OwnerInput) -> Result<CallToolResult, McpError> {
        let pref = self.prefs.get_or_create(&input.owner).map_err(to_mcp_error)?;
        json_result(&pref)
    }

    /// Set one preference.
    #[tool(description = "Set one scheduling preference; the value is validated and normalized")]
    fn set_preference(
        &self,
        #[tool(aggr)] input: SetPreferenceInput,
    ) -> Result<CallToolResult, McpError> {
        let field = PreferenceField::from_str(&input.field).map_err(to_mcp_error)?;
        let value =
            self.prefs.update_field(&input.owner, field, &input.value).map_err(to_mcp_error)?;
        json_result(&serde_json::json!({ "field": field.as_str(), "value": value }))
    }

    /// Start a draft.
    #[tool(description = "Start composing a task, replacing any previous draft")]
    fn draft_begin(&self, #[tool(aggr)] input: DraftBeginInput) -> Result<CallToolResult, McpError> {
        self.drafts.purge_expired();
        json_result(&self.drafts.begin(&input.owner, input.description))
    }

    /// Edit a draft.
    #[tool(description = "Set schedule, duration, deadline or location on the current draft")]
    fn draft_edit(&self, #[tool(aggr)] input: DraftEditInput) -> Result<CallToolResult, McpError> {
        let edit = DraftEdit {
            schedule: input.schedule,
            duration: input.duration,
            deadline: input.deadline,
            location: input.location,
        };
        let draft = self.drafts.edit(&input.owner, edit).map_err(to_mcp_error)?;
        json_result(&draft)
    }

    /// Flag a draft.
    #[tool(description = "Set the priority flag on the current draft")]
    fn draft_set_priority(
        &self,
        #[tool(aggr)] input: DraftPriorityInput,
    ) -> Result<CallToolResult, McpError> {
        let draft = self.drafts.set_priority(&input.owner, input.priority).map_err(to_mcp_error)?;
        json_result(&draft)
    }

    /// Add a mirror to a draft.
    #[tool(description = "Give another user a copy of the drafted task at their own time")]
    fn draft_add_mirror(
        &self,
        #[tool(aggr)] input: DraftMirrorInput,
    ) -> Result<CallToolResult, McpError> {
        let draft = self
            .drafts
            .add_mirror(&input.owner, input.mirror_owner, input.schedule)
            .map_err(to_mcp_error)?;
        json_result(&draft)
    }

    /// Show the draft.
    #[tool(description = "Show the current draft, if any")]
    fn draft_show(&self, #[tool(aggr)] input: OwnerInput) -> Result<CallToolResult, McpError> {
        json_result(&self.drafts.get(&input.owner))
    }

    /// Create the drafted task.
    #[tool(description = "Create the task from the current draft and discard the draft; an invalid draft is kept for fixing")]
    fn draft_finalize(&self, #[tool(aggr)] input: OwnerInput) -> Result<CallToolResult, McpError> {
        let task = self
            .drafts
            .finalize(&input.owner, |new_task| self.tasks.create(&input.owner, new_task.clone()))
            .map_err(to_mcp_error)?;
        json_result(&task)
    }

    /// Discard the draft.
    #[tool(description = "Discard the current draft")]
    fn draft_cancel(&self, #[tool(aggr)] input: OwnerInput) -> Result<CallToolResult, McpError> {
        let cancelled = self.drafts.cancel(&input.owner);
        json_result(&serde_json::json!({ "cancelled": cancelled }))
    }
}

#[rmcp::tool(tool_box)]
impl rmcp::ServerHandler for TaskbotServer {
    fn get_info(&self) -> ServerInfo {
        ServerInfo {
            protocol_version: ProtocolVersion::V_2024_11_05,
            capabilities: ServerCapabilities::builder().enable_tools().build(),
            server_info: Implementation {
                name: "taskbot-mcp".to_string(),
                version: env!("CARGO_PKG_VERSION").to_string(),
            },
            instructions: Some(INSTRUCTIONS.to_string()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testing::MockClock;
    use tempfile::TempDir;

    fn server() -> (TempDir, Arc<MockClock>, TaskbotServer) {
        let dir = TempDir::new().unwrap();
        let db = Database::open(dir.path().join("mcp.sqlite3")).unwrap();
        let clock = Arc::new(MockClock::at_default_start());
        let server = TaskbotServer::with_clock(db, clock.clone(), BotConfig::default());
        (dir, clock, server)
    }

    /// Parse the JSON text of a successful tool result.
    fn body(result: Result<CallToolResult, McpError>) -> serde_json::Value {
        let value = serde_json::to_value(result.unwrap()).unwrap();
        serde_json::from_str(value["content"][0]["text"].as_str().unwrap()).unwrap()
    }

    fn owner(name: &str) -> OwnerInput {
        OwnerInput { owner: name.to_string() }
    }

    #[test]
    fn test_create_start_finish() {
        let (_dir, clock, server) = server();
        let created = body(server.create_task(CreateTaskInput {
            owner: "alice".to_string(),
            description: "Write report".to_string(),
            schedule: Some("05/10 14:00".to_string()),
            duration: None,
            deadline: None,
            location: None,
            priority: false,
            mirrors: vec![],
        }));
        let id = created["id"].as_i64().unwrap();
        assert_eq!(created["scheduled_at"], "2025-05-10T14:00:00");

        body(server.start_task(TaskIdInput { owner: "alice".to_string(), id }));
        clock.advance_minutes(10);
        let done = body(server.finish_task(SessionInput { owner: "alice".to_string(), id: None }));
        assert_eq!(done["status"], "done");
        assert!((done["accumulated_duration_minutes"].as_f64().unwrap() - 10.0).abs() < 1e-9);
    }

    #[test]
    fn test_edit_task() {
        let (_dir, _clock, server) = server();
        let created = body(server.create_task(CreateTaskInput {
            owner: "alice".to_string(),
            description: "Dentist".to_string(),
            schedule: Some("05/10 14:00".to_string()),
            duration: None,
            deadline: None,
            location: Some("Clinic".to_string()),
            priority: false,
            mirrors: vec![],
        }));
        let id = created["id"].as_i64().unwrap();

        let edited = body(server.edit_task(EditTaskInput {
            owner: "alice".to_string(),
            id,
            schedule: Some("05/11 09:30".to_string()),
            duration: Some("40".to_string()),
            deadline: None,
            location: Some(String::new()),
        }));
        assert_eq!(edited["scheduled_at"], "2025-05-11T09:30:00");
        assert_eq!(edited["duration_estimate_minutes"], 40);
        assert!(edited["location"].is_null());

        let err = server
            .edit_task(EditTaskInput {
                owner: "bob".to_string(),
                id,
                schedule: None,
                duration: Some("5".to_string()),
                deadline: None,
                location: None,
            })
            .unwrap_err();
        assert_eq!(err.data, Some(serde_json::json!({ "kind": "not_found" })));
    }

    #[test]
    fn test_domain_errors_are_invalid_params() {
        let (_dir, _clock, server) = server();
        let err = server
            .start_task(TaskIdInput { owner: "alice".to_string(), id: 7 })
            .unwrap_err();
        assert!(err.message.contains("not found"));
        assert_eq!(err.data, Some(serde_json::json!({ "kind": "not_found" })));
    }

    #[test]
    fn test_list_rejects_unknown_status() {
        let (_dir, _clock, server) = server();
        let result = server.list_tasks(ListTasksInput {
            owner: "alice".to_string(),
            status: Some("archived".to_string()),
            limit: None,
        });
        assert!(result.is_err());
    }

    #[test]
    fn test_draft_flow_creates_task() {
        let (_dir, _clock, server) = server();
        body(server.draft_begin(DraftBeginInput {
            owner: "alice".to_string(),
            description: "Plan trip".to_string(),
        }));
        body(server.draft_edit(DraftEditInput {
            owner: "alice".to_string(),
            schedule: Some("05/12 10:00".to_string()),
            duration: Some("60".to_string()),
            deadline: None,
            location: None,
        }));
        body(server.draft_add_mirror(DraftMirrorInput {
            owner: "alice".to_string(),
            mirror_owner: "bob".to_string(),
            schedule: "05/12 11:00".to_string(),
        }));

        let task = body(server.draft_finalize(owner("alice")));
        assert_eq!(task["duration_estimate_minutes"], 60);
        assert_eq!(task["mirrored_owners"], serde_json::json!(["bob"]));
        assert!(body(server.draft_show(owner("alice"))).is_null());
        assert!(server.draft_finalize(owner("alice")).is_err());
    }

    #[test]
    fn test_invalid_draft_survives_finalize() {
        let (_dir, _clock, server) = server();
        body(server.draft_begin(DraftBeginInput {
            owner: "alice".to_string(),
            description: "Plan trip".to_string(),
        }));
        body(server.draft_edit(DraftEditInput {
            owner: "alice".to_string(),
            schedule: Some("13/45 10:00".to_string()),
            duration: None,
            deadline: None,
            location: None,
        }));

        let err = server.draft_finalize(owner("alice")).unwrap_err();
        assert_eq!(err.data, Some(serde_json::json!({ "kind": "validation" })));
        let draft = body(server.draft_show(owner("alice")));
        assert_eq!(draft["task"]["schedule"], "13/45 10:00");

        body(server.draft_edit(DraftEditInput {
            owner: "alice".to_string(),
            schedule: Some("05/12 10:00".to_string()),
            duration: None,
            deadline: None,
            location: None,
        }));
        let task = body(server.draft_finalize(owner("alice")));
        assert_eq!(task["scheduled_at"], "2025-05-12T10:00:00");
        assert!(body(server.draft_show(owner("alice"))).is_null());
    }

    #[test]
    fn test_draft_expires() {
        let (_dir, clock, server) = server();
        body(server.draft_begin(DraftBeginInput {
            owner: "alice".to_string(),
            description: "x".to_string(),
        }));
        clock.advance_minutes(11);
        assert!(server.draft_finalize(owner("alice")).is_err());
    }

    #[test]
    fn test_preferences() {
        let (_dir, _clock, server) = server();
        let set = body(server.set_preference(SetPreferenceInput {
            owner: "alice".to_string(),
            field: "lunch_window_start".to_string(),
            value: "11:5".to_string(),
        }));
        assert_eq!(set["value"], "11:05");

        let prefs = body(server.get_preferences(owner("alice")));
        assert_eq!(prefs["lunch_window_start"], "11:05");
        assert_eq!(prefs["time_zone"], "UTC");

        assert!(server
            .set_preference(SetPreferenceInput {
                owner: "alice".to_string(),
                field: "time_zone".to_string(),
                value: "Moon/Base".to_string(),
            })
            .is_err());
    }

    #[test]
    fn test_week_view() {
        let (_dir, _clock, server) = server();
        body(server.create_task(CreateTaskInput {
            owner: "alice".to_string(),
            description: "sunday".to_string(),
            schedule: Some("2025-05-11 10:00".to_string()),
            duration: None,
            deadline: None,
            location: None,
            priority: true,
            mirrors: vec![],
        }));
        let week = body(server.tasks_this_week(CalendarInput {
            owner: "alice".to_string(),
            date: Some("2025-05-06".to_string()),
        }));
        assert_eq!(week[6]["tasks"][0]["description"], "sunday");

        assert!(server
            .tasks_today(CalendarInput { owner: "alice".to_string(), date: Some("May".to_string()) })
            .is_err());
    }

    #[test]
    fn test_get_info() {
        use rmcp::ServerHandler;
        let (_dir, _clock, server) = server();
        let info = server.get_info();
        assert_eq!(info.server_info.name, "taskbot-mcp");
        assert!(info.instructions.unwrap().contains("owner"));
    }
}
