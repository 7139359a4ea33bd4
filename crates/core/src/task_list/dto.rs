//! Wire representations of task lists and tasks

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use super::model::{TaskPriority, TaskStatus};

/// Transfer object for a task list
///
/// `task_count` and `progress` are derived on the way out and ignored on the
/// way in.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TaskListDto {
    #[serde(default)]
    pub id: Option<Uuid>,
    #[serde(default)]
    pub title: Option<String>,
    #[serde(default)]
    pub description: Option<String>,
    #[serde(default)]
    pub task_count: usize,
    #[serde(default)]
    pub progress: Option<f64>,
    #[serde(default)]
    pub tasks: Option<Vec<TaskDto>>,
}

/// Transfer object for a task
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TaskDto {
    #[serde(default)]
    pub id: Option<Uuid>,
    #[serde(default)]
    pub title: String,
    #[serde(default)]
    pub description: Option<String>,
    #[serde(default)]
    pub due_date: Option<DateTime<Utc>>,
    #[serde(default)]
    pub priority: TaskPriority,
    #[serde(default)]
    pub status: TaskStatus,
}
