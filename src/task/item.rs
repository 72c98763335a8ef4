//! Task types, write validation and list filtering.

use chrono::{NaiveDate, NaiveDateTime};
use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Workflow status of a task.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TaskStatus {
    Todo,
    InProgress,
    Blocked,
    Done,
}

impl TaskStatus {
    pub const ALL: [TaskStatus; 4] = [
        TaskStatus::Todo,
        TaskStatus::InProgress,
        TaskStatus::Blocked,
        TaskStatus::Done,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Todo => "todo",
            Self::InProgress => "in_progress",
            Self::Blocked => "blocked",
            Self::Done => "done",
        }
    }

    pub fn parse(value: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|s| s.as_str() == value)
    }
}

impl std::fmt::Display for TaskStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TaskPriority {
    Low,
    Medium,
    High,
    Urgent,
}

impl TaskPriority {
    pub const ALL: [TaskPriority; 4] = [
        TaskPriority::Low,
        TaskPriority::Medium,
        TaskPriority::High,
        TaskPriority::Urgent,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Low => "low",
            Self::Medium => "medium",
            Self::High => "high",
            Self::Urgent => "urgent",
        }
    }

    pub fn parse(value: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|p| p.as_str() == value)
    }
}

/// A task as the backend serves it.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Task {
    pub id: i64,
    pub title: String,
    #[serde(default)]
    pub description: String,
    pub status: TaskStatus,
    pub priority: TaskPriority,
    #[serde(default)]
    pub assignee_id: Option<i64>,
    pub reporter_id: i64,
    #[serde(default)]
    pub created_at: Option<NaiveDateTime>,
    #[serde(default)]
    pub updated_at: Option<NaiveDateTime>,
    #[serde(default)]
    pub due_date: Option<NaiveDate>,
    #[serde(default)]
    pub labels: Vec<String>,
    #[serde(default)]
    pub related_topic: String,
    #[serde(default)]
    pub parent_board_id: Option<i64>,
}

#[derive(Debug, Error, PartialEq, Eq)]
pub enum TaskPayloadError {
    #[error("Title is required.")]
    MissingTitle,

    #[error("Reporter ID is required.")]
    MissingReporter,

    #[error("Invalid task payload: {0}")]
    Malformed(String),
}

/// Body of a create or update request.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TaskPayload {
    pub title: String,
    #[serde(default)]
    pub description: String,
    pub status: TaskStatus,
    pub priority: TaskPriority,
    #[serde(default)]
    pub assignee_id: Option<i64>,
    #[serde(default)]
    pub reporter_id: Option<i64>,
    #[serde(default)]
    pub due_date: Option<NaiveDate>,
    #[serde(default)]
    pub labels: Vec<String>,
    #[serde(default)]
    pub related_topic: String,
    #[serde(default)]
    pub parent_board_id: Option<i64>,
}

impl TaskPayload {
    /// Decode and validate a raw JSON body, returning the normalized payload.
    pub fn from_json(value: serde_json::Value) -> Result<Self, TaskPayloadError> {
        let payload: TaskPayload = serde_json::from_value(value)
            .map_err(|e| TaskPayloadError::Malformed(e.to_string()))?;
        payload.validated()
    }

    /// Trim text fields, drop blank labels, and enforce required fields.
    pub fn validated(mut self) -> Result<Self, TaskPayloadError> {
        self.title = self.title.trim().to_string();
        if self.title.is_empty() {
            return Err(TaskPayloadError::MissingTitle);
        }
        match self.reporter_id {
            Some(id) if id > 0 => {}
            _ => return Err(TaskPayloadError::MissingReporter),
        }
        self.description = self.description.trim().to_string();
        self.related_topic = self.related_topic.trim().to_string();
        self.labels = self
            .labels
            .into_iter()
            .map(|l| l.trim().to_string())
            .filter(|l| !l.is_empty())
            .collect();
        Ok(self)
    }
}

/// Board constraint of a [`TaskFilter`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BoardFilter {
    Board(i64),
    /// Tasks not placed on any board
    Unassigned,
}

/// Query-string filters for the task list.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
pub struct TaskFilter {
    #[serde(default)]
    pub status: Option<String>,
    #[serde(default)]
    pub board: Option<String>,
    #[serde(default)]
    pub q: Option<String>,
}

impl TaskFilter {
    fn meaningful(value: &Option<String>) -> Option<&str> {
        value
            .as_deref()
            .map(str::trim)
            .filter(|v| !v.is_empty() && *v != "all")
    }

    pub fn is_empty(&self) -> bool {
        Self::meaningful(&self.status).is_none()
            && Self::meaningful(&self.board).is_none()
            && Self::meaningful(&self.q).is_none()
    }

    fn board_filter(&self) -> Option<BoardFilter> {
        let board = Self::meaningful(&self.board)?;
        if board == "none" {
            return Some(BoardFilter::Unassigned);
        }
        // An unparseable id can't match any board.
        Some(BoardFilter::Board(board.parse().unwrap_or(i64::MIN)))
    }

    pub fn matches(&self, task: &Task) -> bool {
        if let Some(status) = Self::meaningful(&self.status) {
            if TaskStatus::parse(status) != Some(task.status) {
                return false;
            }
        }

        match self.board_filter() {
            Some(BoardFilter::Board(id)) if task.parent_board_id != Some(id) => return false,
            Some(BoardFilter::Unassigned) if task.parent_board_id.is_some() => return false,
            _ => {}
        }

        match Self::meaningful(&self.q) {
            None => true,
            Some(query) => {
                let query = query.to_lowercase();
                task.title.to_lowercase().contains(&query)
                    || task.description.to_lowercase().contains(&query)
                    || task.related_topic.to_lowercase().contains(&query)
            }
        }
    }

    pub fn apply(&self, tasks: Vec<Task>) -> Vec<Task> {
        tasks.into_iter().filter(|t| self.matches(t)).collect()
    }
}
