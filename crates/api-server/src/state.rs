//! Application state

use std::sync::Arc;

use tasklist_core::task_list::{
    InMemoryTaskListStore, SqliteTaskListStore, TaskListRepository, TaskListService,
};

use crate::config::StoreConfig;

/// Shared application state
#[derive(Clone)]
pub struct AppState {
    inner: Arc<AppStateInner>,
}

struct AppStateInner {
    task_list_service: TaskListService,
}

impl AppState {
    /// Open the configured store and build the services on top of it
    pub async fn new(store: &StoreConfig) -> tasklist_core::Result<Self> {
        let repository: Arc<dyn TaskListRepository> = match store {
            StoreConfig::Sqlite { url } => Arc::new(SqliteTaskListStore::connect(url).await?),
            StoreConfig::Memory => Arc::new(InMemoryTaskListStore::new()),
        };
        Ok(Self::with_repository(repository))
    }

    /// Build the state around an already opened repository
    pub fn with_repository(repository: Arc<dyn TaskListRepository>) -> Self {
        Self {
            inner: Arc::new(AppStateInner {
                task_list_service: TaskListService::new(repository),
            }),
        }
    }

    /// Get reference to the task list service
    pub fn task_list_service(&self) -> &TaskListService {
        &self.inner.task_list_service
    }
}
