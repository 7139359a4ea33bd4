//! In-memory task list storage
//!
//! Keeps task lists in a map guarded by a lock. Nothing survives a restart.

use async_trait::async_trait;
use chrono::Utc;
use std::collections::HashMap;
use tokio::sync::RwLock;
use uuid::Uuid;

use super::model::{Task, TaskList};
use super::repository::TaskListRepository;
use crate::Result;

/// In-memory task list store
#[derive(Default)]
pub struct InMemoryTaskListStore {
    lists: RwLock<HashMap<Uuid, TaskList>>,
}

impl InMemoryTaskListStore {
    pub fn new() -> Self {
        Self::default()
    }
}

fn assign_task_ids(tasks: Vec<Task>) -> Vec<Task> {
    tasks
        .into_iter()
        .map(|mut task| {
            task.id.get_or_insert_with(Uuid::new_v4);
            task
        })
        .collect()
}

#[async_trait]
impl TaskListRepository for InMemoryTaskListStore {
    async fn list_all(&self) -> Result<Vec<TaskList>> {
        let lists = self.lists.read().await;
        let mut lists: Vec<TaskList> = lists.values().cloned().collect();
        lists.sort_by(|a, b| a.created_at.cmp(&b.created_at).then(a.id.cmp(&b.id)));
        Ok(lists)
    }

    async fn save(&self, mut task_list: TaskList) -> Result<TaskList> {
        let now = Utc::now();
        let id = *task_list.id.get_or_insert_with(Uuid::new_v4);
        task_list.updated_at.get_or_insert(now);
        task_list.tasks = task_list.tasks.map(assign_task_ids);

        let mut lists = self.lists.write().await;
        // An existing entry keeps its original creation time.
        task_list.created_at = lists
            .get(&id)
            .and_then(|existing| existing.created_at)
            .or(task_list.created_at)
            .or(Some(now));
        let stored_tasks = match &task_list.tasks {
            Some(tasks) => tasks.clone(),
            None => lists
                .get(&id)
                .and_then(|existing| existing.tasks.clone())
                .unwrap_or_default(),
        };
        let mut stored = task_list.clone();
        stored.tasks = Some(stored_tasks);
        lists.insert(id, stored);

        tracing::debug!(task_list_id = %id, "Saved task list in memory");
        Ok(task_list)
    }

    async fn find_by_id(&self, id: Uuid) -> Result<Option<TaskList>> {
        let lists = self.lists.read().await;
        Ok(lists.get(&id).cloned())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::task_list::TaskStatus;

    #[tokio::test]
    async fn test_save_assigns_id_and_keeps_absent_tasks() {
        let store = InMemoryTaskListStore::new();

        let saved = store.save(TaskList::new("Groceries")).await.unwrap();

        assert!(saved.id.is_some());
        assert!(saved.tasks.is_none());
        assert!(saved.created_at.is_some());
    }

    #[tokio::test]
    async fn test_list_all_loads_tasks() {
        let store = InMemoryTaskListStore::new();
        store.save(TaskList::new("Groceries")).await.unwrap();

        let lists = store.list_all().await.unwrap();

        assert_eq!(lists.len(), 1);
        assert_eq!(lists[0].tasks, Some(Vec::new()));
    }

    #[tokio::test]
    async fn test_save_without_tasks_keeps_stored_tasks() {
        let store = InMemoryTaskListStore::new();
        let saved = store
            .save(TaskList::new("Trip").with_tasks(vec![Task::new("Pack")]))
            .await
            .unwrap();
        let id = saved.id.unwrap();

        let mut renamed = saved.clone();
        renamed.title = "Summer trip".to_string();
        renamed.tasks = None;
        store.save(renamed).await.unwrap();

        let found = store.find_by_id(id).await.unwrap().unwrap();
        assert_eq!(found.title, "Summer trip");
        let tasks = found.tasks.unwrap();
        assert_eq!(tasks.len(), 1);
        assert!(tasks[0].id.is_some());
    }

    #[tokio::test]
    async fn test_update_keeps_id_and_creation_time() {
        let store = InMemoryTaskListStore::new();
        let saved = store.save(TaskList::new("Trip")).await.unwrap();

        tokio::time::sleep(std::time::Duration::from_millis(20)).await;

        let mut renamed = saved.clone();
        renamed.title = "Summer trip".to_string();
        renamed.created_at = None;
        renamed.updated_at = None;
        let updated = store.save(renamed).await.unwrap();

        assert_eq!(updated.id, saved.id);
        assert_eq!(updated.created_at, saved.created_at);
        assert!(updated.updated_at > saved.updated_at);

        let found = store.find_by_id(saved.id.unwrap()).await.unwrap().unwrap();
        assert_eq!(found.created_at, saved.created_at);
        assert_eq!(found.title, "Summer trip");
    }

    #[tokio::test]
    async fn test_save_with_tasks_replaces_stored_tasks() {
        let store = InMemoryTaskListStore::new();
        let saved = store
            .save(TaskList::new("Trip").with_tasks(vec![Task::new("Pack"), Task::new("Book")]))
            .await
            .unwrap();

        let mut updated = saved.clone();
        updated.tasks = Some(vec![Task::new("Go").with_status(TaskStatus::Close)]);
        store.save(updated).await.unwrap();

        let found = store.find_by_id(saved.id.unwrap()).await.unwrap().unwrap();
        let tasks = found.tasks.unwrap();
        assert_eq!(tasks.len(), 1);
        assert_eq!(tasks[0].title, "Go");
    }

    #[tokio::test]
    async fn test_find_unknown_id() {
        let store = InMemoryTaskListStore::new();
        assert!(store.find_by_id(Uuid::new_v4()).await.unwrap().is_none());
    }
}
