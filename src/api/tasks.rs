//! Task endpoints
//!
//! Reads are public, listing needs any live key, and each mutation needs
//! its own `task.*` permission.

use axum::{
    extract::State,
    http::StatusCode,
    middleware::from_fn_with_state,
    routing::{delete, get, patch, post},
    Router,
};
use serde::{Deserialize, Serialize};
use tracing::info;

use crate::api::middleware::{authenticate, require_permission, PermissionGuard};
use crate::api::state::AppState;
use crate::api::types::{ApiError, Json, Path};
use crate::domain::task::{task_permissions, Task, TaskId};
use crate::domain::PermissionName;

/// Create the task router
///
/// Method-level layers wrap only the handlers registered before them, so
/// `GET /task/{id}` stays public.
pub fn create_task_router(state: &AppState) -> Router<AppState> {
    let [create, update, remove] = task_permissions();
    let authn = from_fn_with_state(state.clone(), authenticate);
    let guard = |permission: PermissionName| {
        from_fn_with_state(
            PermissionGuard::new(state.auth.clone(), permission),
            require_permission,
        )
    };

    Router::new()
        .route(
            "/task",
            post(create_task)
                .route_layer(guard(create))
                .route_layer(authn.clone()),
        )
        .route(
            "/task/{id}",
            delete(delete_task)
                .route_layer(guard(remove))
                .route_layer(authn.clone())
                .get(get_task),
        )
        .route(
            "/task/{id}/completed",
            patch(complete_task)
                .route_layer(guard(update.clone()))
                .route_layer(authn.clone()),
        )
        .route(
            "/task/{id}/uncompleted",
            patch(uncomplete_task)
                .route_layer(guard(update))
                .route_layer(authn.clone()),
        )
        .route("/tasks", get(list_tasks).route_layer(authn))
}

#[derive(Debug, Deserialize)]
pub struct CreateTaskRequest {
    pub title: String,
}

#[derive(Debug, Serialize)]
pub struct ListTasksResponse {
    pub tasks: Vec<Task>,
}

/// POST /task
pub async fn create_task(
    State(state): State<AppState>,
    Json(request): Json<CreateTaskRequest>,
) -> Result<(StatusCode, Json<Task>), ApiError> {
    let title = Task::normalize_title(&request.title)?;
    let task = state.tasks.create(&title).await?;

    info!(task_id = %task.id, "Task created");

    Ok((StatusCode::CREATED, Json(task)))
}

/// GET /task/{id}
pub async fn get_task(
    State(state): State<AppState>,
    Path(id): Path<i64>,
) -> Result<Json<Task>, ApiError> {
    state
        .tasks
        .get(TaskId::new(id))
        .await?
        .map(Json)
        .ok_or_else(|| task_not_found(id))
}

/// GET /tasks
pub async fn list_tasks(
    State(state): State<AppState>,
) -> Result<Json<ListTasksResponse>, ApiError> {
    let tasks = state.tasks.list().await?;
    Ok(Json(ListTasksResponse { tasks }))
}

/// DELETE /task/{id}
pub async fn delete_task(
    State(state): State<AppState>,
    Path(id): Path<i64>,
) -> Result<StatusCode, ApiError> {
    if !state.tasks.delete(TaskId::new(id)).await? {
        return Err(task_not_found(id));
    }

    info!(task_id = id, "Task deleted");
    Ok(StatusCode::NO_CONTENT)
}

/// PATCH /task/{id}/completed
pub async fn complete_task(
    State(state): State<AppState>,
    Path(id): Path<i64>,
) -> Result<Json<Task>, ApiError> {
    set_completed(&state, id, true).await
}

/// PATCH /task/{id}/uncompleted
pub async fn uncomplete_task(
    State(state): State<AppState>,
    Path(id): Path<i64>,
) -> Result<Json<Task>, ApiError> {
    set_completed(&state, id, false).await
}

async fn set_completed(
    state: &AppState,
    id: i64,
    completed: bool,
) -> Result<Json<Task>, ApiError> {
    let task_id = TaskId::new(id);

    if !state.tasks.set_completed(task_id, completed).await? {
        return Err(task_not_found(id));
    }

    state
        .tasks
        .get(task_id)
        .await?
        .map(Json)
        .ok_or_else(|| task_not_found(id))
}

fn task_not_found(id: i64) -> ApiError {
    ApiError::not_found(format!("Task '{}' not found", id))
}
