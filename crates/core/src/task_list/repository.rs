//! Task list repository trait
//!
//! Defines the interface for task list storage operations.

use async_trait::async_trait;
use uuid::Uuid;

use super::model::TaskList;
use crate::Result;

/// Repository interface for task lists, keyed by their identifier
#[async_trait]
pub trait TaskListRepository: Send + Sync {
    /// Get all task lists with their tasks loaded
    async fn list_all(&self) -> Result<Vec<TaskList>>;

    /// Insert the list when it has no identifier, otherwise update it
    ///
    /// When `tasks` is `Some`, the stored tasks are replaced by the given
    /// ones. When it is `None`, stored tasks are left as they are.
    async fn save(&self, task_list: TaskList) -> Result<TaskList>;

    /// Get a task list by ID with its tasks loaded
    async fn find_by_id(&self, id: Uuid) -> Result<Option<TaskList>>;
}
