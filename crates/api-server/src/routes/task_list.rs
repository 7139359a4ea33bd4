//! Task list API endpoints

use axum::{
    extract::{Path, State},
    http::StatusCode,
    routing::get,
    Json, Router,
};
use serde::Serialize;
use uuid::Uuid;

use tasklist_core::task_list::{TaskList, TaskListDto};
use tasklist_core::Error;

use crate::state::AppState;

#[derive(Debug, Serialize)]
pub struct ErrorResponse {
    pub error: String,
}

type ApiError = (StatusCode, Json<ErrorResponse>);

fn error_response(err: Error) -> ApiError {
    let status = match &err {
        Error::InvalidInput(_) => StatusCode::BAD_REQUEST,
        Error::TaskListNotFound(_) => StatusCode::NOT_FOUND,
        Error::Database(_) | Error::Storage(_) => StatusCode::INTERNAL_SERVER_ERROR,
    };
    if status.is_server_error() {
        tracing::error!(error = %err, "Task list request failed");
    }
    (
        status,
        Json(ErrorResponse {
            error: err.to_string(),
        }),
    )
}

// ============================================================================
// Handlers
// ============================================================================

/// GET /tasks-lists - List all task lists
async fn list_task_lists(
    State(state): State<AppState>,
) -> Result<Json<Vec<TaskListDto>>, ApiError> {
    let lists = state
        .task_list_service()
        .list_task_lists()
        .await
        .map_err(error_response)?;

    Ok(Json(lists.into_iter().map(TaskListDto::from).collect()))
}

/// POST /tasks-lists - Create a new task list
async fn create_task_list(
    State(state): State<AppState>,
    Json(dto): Json<TaskListDto>,
) -> Result<Json<TaskListDto>, ApiError> {
    let created = state
        .task_list_service()
        .create_task_list(TaskList::from(dto))
        .await
        .map_err(error_response)?;

    Ok(Json(TaskListDto::from(created)))
}

/// GET /tasks-lists/{id} - Get a single task list
async fn get_task_list(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
) -> Result<Json<TaskListDto>, ApiError> {
    let list = state
        .task_list_service()
        .get_task_list(id)
        .await
        .map_err(error_response)?;

    Ok(Json(TaskListDto::from(list)))
}

// ============================================================================
// Router
// ============================================================================

pub fn router() -> Router<AppState> {
    Router::new()
        .route("/tasks-lists", get(list_task_lists).post(create_task_list))
        .route("/tasks-lists/{id}", get(get_task_list))
}
