//! Core record types for the task manager.

use chrono::NaiveDateTime;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Storage format for task deadlines (naive local time).
pub const DEADLINE_FORMAT: &str = "%Y-%m-%d %H:%M:%S";

/// Maximum length of TaskType, Position and Task names.
pub const NAME_MAX_LEN: usize = 155;

/// Maximum length of worker usernames and name parts.
pub const USERNAME_MAX_LEN: usize = 150;

/// Lifecycle state of a task.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Status {
    #[default]
    Pending,
    InProgress,
    Paused,
    Canceled,
    Completed,
    Reviewing,
    Blocked,
}

impl Status {
    pub const ALL: [Status; 7] = [
        Status::Pending,
        Status::InProgress,
        Status::Paused,
        Status::Canceled,
        Status::Completed,
        Status::Reviewing,
        Status::Blocked,
    ];

    /// Statuses that take a task out of the active set.
    pub const INACTIVE: [Status; 3] = [Status::Canceled, Status::Completed, Status::Blocked];

    pub fn as_str(&self) -> &'static str {
        match self {
            Status::Pending => "pending",
            Status::InProgress => "in_progress",
            Status::Paused => "paused",
            Status::Canceled => "canceled",
            Status::Completed => "completed",
            Status::Reviewing => "reviewing",
            Status::Blocked => "blocked",
        }
    }

    pub fn label(&self) -> &'static str {
        match self {
            Status::Pending => "Pending",
            Status::InProgress => "In progress",
            Status::Paused => "Paused",
            Status::Canceled => "Canceled",
            Status::Completed => "Completed",
            Status::Reviewing => "Reviewing",
            Status::Blocked => "Blocked",
        }
    }

    /// Active tasks are those not canceled, completed or blocked.
    pub fn is_active(&self) -> bool {
        !Self::INACTIVE.contains(self)
    }
}

impl FromStr for Status {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Status::ALL
            .iter()
            .find(|status| status.as_str() == s)
            .copied()
            .ok_or_else(|| format!("unknown status: {}", s))
    }
}

impl fmt::Display for Status {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Task priority.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Priority {
    #[default]
    Low,
    Medium,
    High,
    Critical,
}

impl Priority {
    pub const ALL: [Priority; 4] = [
        Priority::Low,
        Priority::Medium,
        Priority::High,
        Priority::Critical,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            Priority::Low => "low",
            Priority::Medium => "medium",
            Priority::High => "high",
            Priority::Critical => "critical",
        }
    }

    pub fn label(&self) -> &'static str {
        match self {
            Priority::Low => "Low",
            Priority::Medium => "Medium",
            Priority::High => "High",
            Priority::Critical => "Critical",
        }
    }
}

impl FromStr for Priority {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Priority::ALL
            .iter()
            .find(|priority| priority.as_str() == s)
            .copied()
            .ok_or_else(|| format!("unknown priority: {}", s))
    }
}

impl fmt::Display for Priority {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A category of task ("Bug", "Feature", ...).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TaskType {
    pub id: i64,
    pub name: String,
    pub description: String,
}

impl fmt::Display for TaskType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.name)
    }
}

/// A job title a worker can hold.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Position {
    pub id: i64,
    pub name: String,
    pub description: String,
}

impl fmt::Display for Position {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.name)
    }
}

/// A worker account.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Worker {
    pub id: i64,
    pub username: String,
    pub first_name: String,
    pub last_name: String,
    pub email: String,
    pub position_id: Option<i64>,
    pub position_name: Option<String>,
    pub date_joined: i64,
}

impl Worker {
    pub fn url(&self) -> String {
        format!("/workers/{}/", self.id)
    }

    /// "First Last", falling back to the username when both are blank.
    pub fn display_name(&self) -> String {
        let full = format!("{} {}", self.first_name, self.last_name);
        let full = full.trim();
        if full.is_empty() {
            self.username.clone()
        } else {
            full.to_string()
        }
    }
}

impl fmt::Display for Worker {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{} {} {}",
            self.position_name.as_deref().unwrap_or(""),
            self.first_name,
            self.last_name
        )
    }
}

/// Minimal worker reference attached to a task.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Assignee {
    pub id: i64,
    pub username: String,
    pub first_name: String,
    pub last_name: String,
}

/// A unit of work.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Task {
    pub id: i64,
    pub name: String,
    pub description: String,
    pub deadline: Option<NaiveDateTime>,
    pub status: Status,
    pub priority: Priority,
    pub task_type_id: Option<i64>,
    pub task_type_name: Option<String>,
    pub assignees: Vec<Assignee>,
    pub created_at: i64,
    pub updated_at: i64,
}

impl Task {
    pub fn url(&self) -> String {
        format!("/tasks/{}/", self.id)
    }
}

impl fmt::Display for Task {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.deadline {
            Some(deadline) => write!(
                f,
                "Task {}, priority: {}, deadline: {}",
                self.name,
                self.priority,
                deadline.format(DEADLINE_FORMAT)
            ),
            None => write!(f, "Task {}, priority: {}, deadline: -", self.name, self.priority),
        }
    }
}

/// Field values for creating or replacing a task.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct TaskInput {
    pub name: String,
    pub description: String,
    pub deadline: Option<NaiveDateTime>,
    pub status: Status,
    pub priority: Priority,
    pub task_type_id: Option<i64>,
    pub assignee_ids: Vec<i64>,
}

/// Field values for creating or replacing a worker profile.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct WorkerInput {
    pub username: String,
    pub first_name: String,
    pub last_name: String,
    pub email: String,
    pub position_id: Option<i64>,
}

/// A remark left on a task.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Comment {
    pub id: i64,
    pub task_id: i64,
    pub task_name: String,
    pub author_id: i64,
    pub author_username: String,
    pub content: String,
    pub created_at: i64,
    pub updated_at: i64,
}

impl fmt::Display for Comment {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} on {}", self.author_username, self.task_name)
    }
}
