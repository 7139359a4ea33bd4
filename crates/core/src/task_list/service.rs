//! Task list service
//!
//! Orchestrates repository calls and enforces the rules for creating lists.

use chrono::Utc;
use std::sync::Arc;
use uuid::Uuid;

use super::model::TaskList;
use super::repository::TaskListRepository;
use crate::{Error, Result};

#[derive(Clone)]
pub struct TaskListService {
    repository: Arc<dyn TaskListRepository>,
}

impl TaskListService {
    pub fn new(repository: Arc<dyn TaskListRepository>) -> Self {
        Self { repository }
    }

    /// All persisted task lists, as the store returns them
    pub async fn list_task_lists(&self) -> Result<Vec<TaskList>> {
        self.repository.list_all().await
    }

    /// Get a single task list
    pub async fn get_task_list(&self, id: Uuid) -> Result<TaskList> {
        self.repository
            .find_by_id(id)
            .await?
            .ok_or(Error::TaskListNotFound(id))
    }

    /// Validate and persist a new task list
    ///
    /// The caller must not assign an identifier and must provide a non-blank
    /// title. Tasks on the input are not carried over, and both timestamps
    /// are set to the same instant.
    pub async fn create_task_list(&self, task_list: TaskList) -> Result<TaskList> {
        if let Some(id) = task_list.id {
            tracing::warn!(task_list_id = %id, "Rejected task list with preassigned ID");
            return Err(Error::InvalidInput(
                "Task list already has an ID".to_string(),
            ));
        }
        if task_list.title.trim().is_empty() {
            tracing::warn!("Rejected task list with blank title");
            return Err(Error::InvalidInput(
                "Task list title must be present".to_string(),
            ));
        }

        let now = Utc::now();
        let created = self
            .repository
            .save(TaskList {
                id: None,
                title: task_list.title,
                description: task_list.description,
                tasks: None,
                created_at: Some(now),
                updated_at: Some(now),
            })
            .await?;

        if let Some(id) = created.id {
            tracing::info!(task_list_id = %id, title = %created.title, "Created task list");
        }
        Ok(created)
    }
}
