//! Task model: the single persisted entity, plus its category and status views.

use std::fmt;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;

/// Number of day slots rendered by the calendar.
pub const DAYS_IN_MONTH: i32 = 30;

/// Progress value of a task that has not been started.
pub const PROGRESS_NOT_STARTED: i32 = 0;

/// Progress value written by the "In Process" quick action.
pub const PROGRESS_IN_PROCESS: i32 = 50;

/// Progress value of a completed task.
pub const PROGRESS_COMPLETE: i32 = 100;

/// A stored task row.
///
/// `task_type` is kept as the raw tag the client sent; the endpoint does not
/// validate it. Use [`Task::category`] to resolve it against the known set.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, FromRow)]
pub struct Task {
    pub id: i64,
    pub user_id: String,
    #[serde(rename = "type")]
    #[sqlx(rename = "type")]
    pub task_type: String,
    pub content: String,
    pub day: i32,
    pub progress: i32,
    pub created_at: DateTime<Utc>,
}

impl Task {
    pub fn category(&self) -> Option<Category> {
        Category::parse(&self.task_type)
    }

    pub fn status(&self) -> TaskStatus {
        TaskStatus::from_progress(self.progress)
    }
}

/// Upsert request body. Every field is optional so presence can be checked
/// by the service and reported with a single message.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct UpsertTask {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub id: Option<i64>,
    #[serde(default)]
    pub user_id: Option<String>,
    #[serde(default, rename = "type")]
    pub task_type: Option<String>,
    #[serde(default)]
    pub content: Option<String>,
    #[serde(default)]
    pub day: Option<i32>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub progress: Option<i32>,
}

/// An upsert whose required fields are known to be present.
#[derive(Debug, Clone, PartialEq)]
pub struct NewTask {
    pub id: Option<i64>,
    pub user_id: String,
    pub task_type: String,
    pub content: String,
    pub day: i32,
    pub progress: Option<i32>,
}

/// Closed set of task categories the dashboard offers forms for.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Category {
    Todo,
    Hapalan,
    Planner,
    Chat,
}

impl Category {
    pub const ALL: [Category; 4] = [
        Category::Todo,
        Category::Hapalan,
        Category::Planner,
        Category::Chat,
    ];

    /// Tag stored in the `type` column.
    pub fn as_str(&self) -> &'static str {
        match self {
            Category::Todo => "todo",
            Category::Hapalan => "hapalan",
            Category::Planner => "planner",
            Category::Chat => "chat",
        }
    }

    pub fn label(&self) -> &'static str {
        match self {
            Category::Todo => "Todo",
            Category::Hapalan => "Hapalan",
            Category::Planner => "Planner",
            Category::Chat => "Chat",
        }
    }

    pub fn parse(tag: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|c| c.as_str() == tag)
    }
}

impl fmt::Display for Category {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Tri-state view of a task's continuous progress value.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum TaskStatus {
    NotReady,
    InProcess,
    Success,
}

impl TaskStatus {
    pub fn from_progress(progress: i32) -> Self {
        if progress == PROGRESS_NOT_STARTED {
            TaskStatus::NotReady
        } else if progress < PROGRESS_COMPLETE {
            TaskStatus::InProcess
        } else {
            TaskStatus::Success
        }
    }

    pub fn label(&self) -> &'static str {
        match self {
            TaskStatus::NotReady => "Not Ready",
            TaskStatus::InProcess => "In Process",
            TaskStatus::Success => "Success",
        }
    }
}
