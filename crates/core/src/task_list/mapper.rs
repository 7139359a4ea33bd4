//! Conversions between entities and transfer objects

use super::dto::{TaskDto, TaskListDto};
use super::model::{Task, TaskList, TaskStatus};

/// Fraction of tasks whose status is `CLOSE`
///
/// Returns `None` when the tasks were not loaded, and also when the
/// collection is empty.
pub fn progress(tasks: Option<&[Task]>) -> Option<f64> {
    let tasks = tasks?;
    if tasks.is_empty() {
        return None;
    }
    let closed = tasks
        .iter()
        .filter(|task| task.status == TaskStatus::Close)
        .count();
    Some(closed as f64 / tasks.len() as f64)
}

impl From<TaskDto> for Task {
    fn from(dto: TaskDto) -> Self {
        Self {
            id: dto.id,
            title: dto.title,
            description: dto.description,
            due_date: dto.due_date,
            priority: dto.priority,
            status: dto.status,
        }
    }
}

impl From<Task> for TaskDto {
    fn from(task: Task) -> Self {
        Self {
            id: task.id,
            title: task.title,
            description: task.description,
            due_date: task.due_date,
            priority: task.priority,
            status: task.status,
        }
    }
}

impl From<TaskListDto> for TaskList {
    // Identifier and timestamps are owned by the service and the store.
    fn from(dto: TaskListDto) -> Self {
        Self {
            id: None,
            title: dto.title.unwrap_or_default(),
            description: dto.description,
            tasks: dto
                .tasks
                .map(|tasks| tasks.into_iter().map(Task::from).collect()),
            created_at: None,
            updated_at: None,
        }
    }
}

impl From<TaskList> for TaskListDto {
    fn from(list: TaskList) -> Self {
        let task_count = list.tasks.as_ref().map_or(0, Vec::len);
        let progress = progress(list.tasks.as_deref());
        Self {
            id: list.id,
            title: Some(list.title),
            description: list.description,
            task_count,
            progress,
            tasks: list
                .tasks
                .map(|tasks| tasks.into_iter().map(TaskDto::from).collect()),
        }
    }
}
