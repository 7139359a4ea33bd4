//! SQLite task list storage
//!
//! Task lists and their tasks live in two tables linked by a foreign key.
//! Tasks keep the order of the list they were saved with.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use sqlx::sqlite::{SqliteConnectOptions, SqliteConnection, SqlitePool, SqlitePoolOptions};
use sqlx::FromRow;
use std::collections::HashMap;
use std::str::FromStr;
use uuid::Uuid;

use super::model::{Task, TaskList};
use super::repository::TaskListRepository;
use crate::{Error, Result};

const SCHEMA: &[&str] = &[
    "CREATE TABLE IF NOT EXISTS task_lists (
        id BLOB PRIMARY KEY NOT NULL,
        title TEXT NOT NULL,
        description TEXT,
        created_at TEXT NOT NULL,
        updated_at TEXT NOT NULL
    )",
    "CREATE TABLE IF NOT EXISTS tasks (
        id BLOB PRIMARY KEY NOT NULL,
        task_list_id BLOB NOT NULL REFERENCES task_lists(id) ON DELETE CASCADE,
        position INTEGER NOT NULL,
        title TEXT NOT NULL,
        description TEXT,
        due_date TEXT,
        priority TEXT NOT NULL,
        status TEXT NOT NULL
    )",
    "CREATE INDEX IF NOT EXISTS idx_tasks_task_list_id ON tasks (task_list_id, position)",
];

#[derive(Debug, FromRow)]
struct TaskListRow {
    id: Uuid,
    title: String,
    description: Option<String>,
    created_at: DateTime<Utc>,
    updated_at: DateTime<Utc>,
}

impl TaskListRow {
    fn into_task_list(self, tasks: Vec<Task>) -> TaskList {
        TaskList {
            id: Some(self.id),
            title: self.title,
            description: self.description,
            tasks: Some(tasks),
            created_at: Some(self.created_at),
            updated_at: Some(self.updated_at),
        }
    }
}

#[derive(Debug, FromRow)]
struct TaskRow {
    id: Uuid,
    task_list_id: Uuid,
    title: String,
    description: Option<String>,
    due_date: Option<DateTime<Utc>>,
    priority: String,
    status: String,
}

impl TryFrom<TaskRow> for Task {
    type Error = Error;

    fn try_from(row: TaskRow) -> Result<Self> {
        Ok(Self {
            id: Some(row.id),
            title: row.title,
            description: row.description,
            due_date: row.due_date,
            priority: row.priority.parse()?,
            status: row.status.parse()?,
        })
    }
}

/// Task list store backed by a SQLite connection pool
#[derive(Clone)]
pub struct SqliteTaskListStore {
    pool: SqlitePool,
}

impl SqliteTaskListStore {
    /// Open the database at `url`, creating it and its tables if missing
    pub async fn connect(url: &str) -> Result<Self> {
        let options = SqliteConnectOptions::from_str(url)?
            .create_if_missing(true)
            .foreign_keys(true);
        let pool = SqlitePoolOptions::new().connect_with(options).await?;
        Self::with_pool(pool).await
    }

    /// Open a private in-memory database
    ///
    /// The pool holds a single connection that is never recycled, since each
    /// SQLite memory connection is its own database.
    pub async fn connect_in_memory() -> Result<Self> {
        let options = SqliteConnectOptions::from_str("sqlite::memory:")?.foreign_keys(true);
        let pool = SqlitePoolOptions::new()
            .max_connections(1)
            .idle_timeout(None)
            .max_lifetime(None)
            .connect_with(options)
            .await?;
        Self::with_pool(pool).await
    }

    /// Wrap an existing pool and make sure the tables exist
    pub async fn with_pool(pool: SqlitePool) -> Result<Self> {
        for statement in SCHEMA {
            sqlx::query(*statement).execute(&pool).await?;
        }
        Ok(Self { pool })
    }

    async fn load_tasks(conn: &mut SqliteConnection, task_list_id: Uuid) -> Result<Vec<Task>> {
        let rows: Vec<TaskRow> = sqlx::query_as(
            "SELECT id, task_list_id, title, description, due_date, priority, status
             FROM tasks WHERE task_list_id = ? ORDER BY position",
        )
        .bind(task_list_id)
        .fetch_all(conn)
        .await?;

        rows.into_iter().map(Task::try_from).collect()
    }
}

#[async_trait]
impl TaskListRepository for SqliteTaskListStore {
    async fn list_all(&self) -> Result<Vec<TaskList>> {
        // Both reads run in one transaction so lists and tasks come from the
        // same snapshot.
        let mut tx = self.pool.begin().await?;

        let list_rows: Vec<TaskListRow> = sqlx::query_as(
            "SELECT id, title, description, created_at, updated_at
             FROM task_lists ORDER BY created_at, id",
        )
        .fetch_all(&mut *tx)
        .await?;

        let task_rows: Vec<TaskRow> = sqlx::query_as(
            "SELECT id, task_list_id, title, description, due_date, priority, status
             FROM tasks ORDER BY task_list_id, position",
        )
        .fetch_all(&mut *tx)
        .await?;

        tx.commit().await?;

        let mut tasks_by_list: HashMap<Uuid, Vec<Task>> = HashMap::new();
        for row in task_rows {
            let task_list_id = row.task_list_id;
            tasks_by_list
                .entry(task_list_id)
                .or_default()
                .push(Task::try_from(row)?);
        }

        Ok(list_rows
            .into_iter()
            .map(|row| {
                let tasks = tasks_by_list.remove(&row.id).unwrap_or_default();
                row.into_task_list(tasks)
            })
            .collect())
    }

    async fn save(&self, mut task_list: TaskList) -> Result<TaskList> {
        let now = Utc::now();
        let id = *task_list.id.get_or_insert_with(Uuid::new_v4);
        let created_at = task_list.created_at.unwrap_or(now);
        let updated_at = task_list.updated_at.unwrap_or(now);

        let mut tx = self.pool.begin().await?;

        // An existing row keeps its original creation time.
        let (stored_created_at, stored_updated_at): (DateTime<Utc>, DateTime<Utc>) =
            sqlx::query_as(
                "INSERT INTO task_lists (id, title, description, created_at, updated_at)
                 VALUES (?, ?, ?, ?, ?)
                 ON CONFLICT(id) DO UPDATE SET
                     title = excluded.title,
                     description = excluded.description,
                     updated_at = excluded.updated_at
                 RETURNING created_at, updated_at",
            )
            .bind(id)
            .bind(task_list.title.as_str())
            .bind(task_list.description.as_deref())
            .bind(created_at)
            .bind(updated_at)
            .fetch_one(&mut *tx)
            .await?;

        if let Some(tasks) = task_list.tasks.as_mut() {
            sqlx::query("DELETE FROM tasks WHERE task_list_id = ?")
                .bind(id)
                .execute(&mut *tx)
                .await?;

            for (position, task) in tasks.iter_mut().enumerate() {
                let task_id = *task.id.get_or_insert_with(Uuid::new_v4);
                sqlx::query(
                    "INSERT INTO tasks
                         (id, task_list_id, position, title, description, due_date, priority, status)
                     VALUES (?, ?, ?, ?, ?, ?, ?, ?)",
                )
                .bind(task_id)
                .bind(id)
                .bind(position as i64)
                .bind(task.title.as_str())
                .bind(task.description.as_deref())
                .bind(task.due_date)
                .bind(task.priority.as_str())
                .bind(task.status.as_str())
                .execute(&mut *tx)
                .await?;
            }
        }

        tx.commit().await?;

        task_list.created_at = Some(stored_created_at);
        task_list.updated_at = Some(stored_updated_at);
        tracing::debug!(task_list_id = %id, "Saved task list");
        Ok(task_list)
    }

    async fn find_by_id(&self, id: Uuid) -> Result<Option<TaskList>> {
        let mut tx = self.pool.begin().await?;

        let row: Option<TaskListRow> = sqlx::query_as(
            "SELECT id, title, description, created_at, updated_at
             FROM task_lists WHERE id = ?",
        )
        .bind(id)
        .fetch_optional(&mut *tx)
        .await?;

        let found = match row {
            Some(row) => {
                let tasks = Self::load_tasks(&mut *tx, id).await?;
                Some(row.into_task_list(tasks))
            }
            None => None,
        };

        tx.commit().await?;
        Ok(found)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::task_list::{TaskPriority, TaskStatus};
    use chrono::TimeZone;
    use tempfile::TempDir;

    #[tokio::test]
    async fn test_save_inserts_and_assigns_id() {
        let store = SqliteTaskListStore::connect_in_memory().await.unwrap();

        let saved = store
            .save(TaskList::new("Groceries").with_description("Weekly"))
            .await
            .unwrap();

        let id = saved.id.unwrap();
        assert!(saved.tasks.is_none());
        assert!(saved.created_at.is_some());

        let found = store.find_by_id(id).await.unwrap().unwrap();
        assert_eq!(found.title, "Groceries");
        assert_eq!(found.description.as_deref(), Some("Weekly"));
        assert_eq!(found.tasks, Some(Vec::new()));
        assert_eq!(found.created_at, saved.created_at);
    }

    #[tokio::test]
    async fn test_list_all_empty() {
        let store = SqliteTaskListStore::connect_in_memory().await.unwrap();
        assert!(store.list_all().await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_tasks_round_trip_in_order() {
        let store = SqliteTaskListStore::connect_in_memory().await.unwrap();
        let due = Utc.with_ymd_and_hms(2026, 11, 1, 9, 0, 0).unwrap();

        let saved = store
            .save(TaskList::new("Trip").with_tasks(vec![
                Task::new("Book flights")
                    .with_priority(TaskPriority::High)
                    .with_due_date(due),
                Task::new("Pack")
                    .with_description("Light")
                    .with_status(TaskStatus::Close),
                Task::new("Go").with_status(TaskStatus::InProgress),
            ]))
            .await
            .unwrap();

        let saved_tasks = saved.tasks.clone().unwrap();
        assert!(saved_tasks.iter().all(|task| task.id.is_some()));

        let lists = store.list_all().await.unwrap();
        assert_eq!(lists.len(), 1);
        let tasks = lists[0].tasks.clone().unwrap();
        let titles: Vec<&str> = tasks.iter().map(|task| task.title.as_str()).collect();
        assert_eq!(titles, vec!["Book flights", "Pack", "Go"]);
        assert_eq!(tasks[0].due_date, Some(due));
        assert_eq!(tasks[0].priority, TaskPriority::High);
        assert_eq!(tasks[1].status, TaskStatus::Close);
        assert_eq!(tasks[1].description.as_deref(), Some("Light"));
        assert_eq!(tasks, saved_tasks);
    }

    #[tokio::test]
    async fn test_update_keeps_id_and_creation_time() {
        let store = SqliteTaskListStore::connect_in_memory().await.unwrap();
        let saved = store
            .save(TaskList::new("Trip").with_tasks(vec![Task::new("Pack")]))
            .await
            .unwrap();

        let mut renamed = saved.clone();
        renamed.title = "Summer trip".to_string();
        renamed.tasks = None;
        renamed.created_at = None;
        renamed.updated_at = None;
        let updated = store.save(renamed).await.unwrap();

        assert_eq!(updated.id, saved.id);
        assert_eq!(updated.created_at, saved.created_at);

        let lists = store.list_all().await.unwrap();
        assert_eq!(lists.len(), 1);
        assert_eq!(lists[0].title, "Summer trip");
        assert_eq!(lists[0].tasks.as_ref().map(Vec::len), Some(1));
    }

    #[tokio::test]
    async fn test_list_all_groups_tasks_by_list() {
        let store = SqliteTaskListStore::connect_in_memory().await.unwrap();
        let first = store
            .save(TaskList::new("First").with_tasks(vec![Task::new("a"), Task::new("b")]))
            .await
            .unwrap();
        let second = store
            .save(TaskList::new("Second").with_tasks(vec![Task::new("c")]))
            .await
            .unwrap();
        store.save(TaskList::new("Third")).await.unwrap();

        let lists = store.list_all().await.unwrap();
        assert_eq!(lists.len(), 3);
        let count_for = |id: Option<Uuid>| {
            lists
                .iter()
                .find(|list| list.id == id)
                .and_then(|list| list.tasks.as_ref())
                .map(Vec::len)
        };
        assert_eq!(count_for(first.id), Some(2));
        assert_eq!(count_for(second.id), Some(1));
        assert!(lists.iter().all(|list| list.tasks.is_some()));
    }

    #[tokio::test]
    async fn test_deleting_list_cascades_to_tasks() {
        let store = SqliteTaskListStore::connect_in_memory().await.unwrap();
        let saved = store
            .save(TaskList::new("Trip").with_tasks(vec![Task::new("Pack")]))
            .await
            .unwrap();

        sqlx::query("DELETE FROM task_lists WHERE id = ?")
            .bind(saved.id.unwrap())
            .execute(&store.pool)
            .await
            .unwrap();

        let (remaining,): (i64,) = sqlx::query_as("SELECT COUNT(*) FROM tasks")
            .fetch_one(&store.pool)
            .await
            .unwrap();
        assert_eq!(remaining, 0);
    }

    #[tokio::test]
    async fn test_unknown_status_is_storage_error() {
        let store = SqliteTaskListStore::connect_in_memory().await.unwrap();
        let saved = store
            .save(TaskList::new("Trip").with_tasks(vec![Task::new("Pack")]))
            .await
            .unwrap();

        sqlx::query("UPDATE tasks SET status = 'DONE'")
            .execute(&store.pool)
            .await
            .unwrap();

        let err = store.find_by_id(saved.id.unwrap()).await.unwrap_err();
        assert!(matches!(err, Error::Storage(_)));
    }

    #[tokio::test(flavor = "multi_thread", worker_threads = 2)]
    async fn test_reads_see_list_and_tasks_from_same_save() {
        let temp_dir = TempDir::new().unwrap();
        let url = format!("sqlite://{}", temp_dir.path().join("tasks.db").display());
        let store = SqliteTaskListStore::connect(&url).await.unwrap();

        let versioned = |id: Uuid, version: usize| {
            TaskList::new(format!("v{version}"))
                .with_id(id)
                .with_tasks((0..version).map(|i| Task::new(format!("t{i}"))).collect())
        };
        let id = Uuid::new_v4();
        store.save(versioned(id, 1)).await.unwrap();

        let writer = {
            let store = store.clone();
            tokio::spawn(async move {
                for version in 2..=30 {
                    store.save(versioned(id, version)).await.unwrap();
                }
            })
        };

        for _ in 0..30 {
            let found = store.find_by_id(id).await.unwrap().unwrap();
            let tasks = found.tasks.unwrap();
            assert_eq!(found.title, format!("v{}", tasks.len()));

            let lists = store.list_all().await.unwrap();
            let tasks = lists[0].tasks.clone().unwrap();
            assert_eq!(lists[0].title, format!("v{}", tasks.len()));
        }

        writer.await.unwrap();
    }

    #[tokio::test]
    async fn test_file_database_survives_reconnect() {
        let temp_dir = TempDir::new().unwrap();
        let url = format!("sqlite://{}", temp_dir.path().join("tasks.db").display());

        let id = {
            let store = SqliteTaskListStore::connect(&url).await.unwrap();
            let saved = store.save(TaskList::new("Groceries")).await.unwrap();
            store.pool.close().await;
            saved.id.unwrap()
        };

        let store = SqliteTaskListStore::connect(&url).await.unwrap();
        let found = store.find_by_id(id).await.unwrap().unwrap();
        assert_eq!(found.title, "Groceries");
    }
}
