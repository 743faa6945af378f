use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use std::str::FromStr;
use uuid::Uuid;

use crate::error::AppError;

/// Represents the status of a task.
/// Corresponds to the `task_status` SQL enum.
#[derive(Debug, Serialize, Deserialize, Clone, Copy, PartialEq, Eq, sqlx::Type)]
#[sqlx(type_name = "task_status", rename_all = "lowercase")]
#[serde(rename_all = "lowercase")]
pub enum TaskStatus {
    /// Task is still open; its due date lies ahead.
    Pending,
    /// Task is done; its due date has passed.
    Completed,
}

impl FromStr for TaskStatus {
    type Err = AppError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "pending" => Ok(TaskStatus::Pending),
            "completed" => Ok(TaskStatus::Completed),
            _ => Err(AppError::BadRequest(
                "status must be either pending or completed".into(),
            )),
        }
    }
}

/// Input structure for creating or updating a task, as received over HTTP.
///
/// Every field defaults when absent so that `validate` can report exactly which
/// one is missing.
#[derive(Debug, Default, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct TaskInput {
    pub title: String,
    /// RFC 3339 timestamp.
    pub due_date: Option<DateTime<Utc>>,
    pub status: String,
}

/// A task that passed validation and is ready to be persisted.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NewTask {
    pub title: String,
    pub due_date: DateTime<Utc>,
    pub status: TaskStatus,
}

/// Represents a task entity as stored and returned by the API.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, FromRow)]
pub struct Task {
    /// Unique identifier for the task (UUID v4).
    pub id: Uuid,
    pub title: String,
    pub due_date: DateTime<Utc>,
    pub status: TaskStatus,
}

/// Seconds from the Unix epoch to `0001-01-01T00:00:00Z`, the zero time clients
/// send for an unset date.
const ZERO_TIME_SECS: i64 = -62_135_596_800;

fn is_zero_time(date: &DateTime<Utc>) -> bool {
    date.timestamp() == ZERO_TIME_SECS && date.timestamp_subsec_nanos() == 0
}

impl TaskInput {
    /// Checks the task rules relative to `now` and produces a `NewTask`.
    ///
    /// A completed task must be due in the past, a pending one in the future.
    /// A due date equal to `now` satisfies both.
    pub fn validate(&self, now: DateTime<Utc>) -> Result<NewTask, AppError> {
        if self.title.is_empty() {
            return Err(AppError::BadRequest("title is required".into()));
        }

        let due_date = self
            .due_date
            .filter(|d| !is_zero_time(d))
            .ok_or_else(|| AppError::BadRequest("due date is required".into()))?;

        if self.status.is_empty() {
            return Err(AppError::BadRequest("status is required".into()));
        }

        let status: TaskStatus = self.status.parse()?;

        match status {
            TaskStatus::Completed if now < due_date => {
                Err(AppError::BadRequest("due date must be in the past".into()))
            }
            TaskStatus::Pending if now > due_date => {
                Err(AppError::BadRequest("due date must be in the future".into()))
            }
            _ => Ok(NewTask {
                title: self.title.clone(),
                due_date,
                status,
            }),
        }
    }
}

impl Task {
    pub fn new(id: Uuid, task: NewTask) -> Self {
        Self {
            id,
            title: task.title,
            due_date: task.due_date,
            status: task.status,
        }
    }
}

/// Parses a task identifier taken from a request path.
pub fn parse_task_id(id: &str) -> Result<Uuid, AppError> {
    Uuid::parse_str(id).map_err(|_| AppError::BadRequest("Invalid ID".into()))
}
