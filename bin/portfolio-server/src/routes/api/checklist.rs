//! Checklist items embedded in a task.

use std::sync::Arc;

use axum::extract::rejection::JsonRejection;
use axum::extract::{Path, State};
use axum::http::StatusCode;
use axum::routing::{post, put};
use axum::{Json, Router};
use chrono::Utc;
use tracing::info;
use utoipa::OpenApi;

use crate::entities::TaskStore;
use crate::error::ServerError;
use crate::extract::validated;
use crate::middleware::Caller;
use crate::routes::api::tasks::{load_owned_task, reload_task};
use crate::schemas::envelope::ApiResponse;
use crate::schemas::task::{AddChecklistItemRequest, TaskResponse, UpdateChecklistItemRequest};
use crate::state::AppState;

#[derive(OpenApi)]
#[openapi(
    paths(add_item, update_item, delete_item),
    components(schemas(AddChecklistItemRequest, UpdateChecklistItemRequest))
)]
pub struct ChecklistApi;

pub fn router() -> Router<Arc<AppState>> {
    Router::new()
        .route("/tasks/{id}/checklist", post(add_item))
        .route("/tasks/{id}/checklist/{item_id}", put(update_item).delete(delete_item))
}

fn item_not_found(item_id: &str) -> ServerError {
    ServerError::NotFound(format!("checklist item {item_id} not found"))
}

/// Append an item; `isCompleted` defaults to `false`.
#[utoipa::path(
    post,
    path = "/api/tasks/{id}/checklist",
    tag = "checklist",
    params(("id" = String, Path, description = "Task id")),
    request_body = AddChecklistItemRequest,
    responses(
        (status = 201, description = "Item added; the whole task is returned", body = TaskResponse),
        (status = 400, description = "Validation failed"),
        (status = 403, description = "Caller is neither owner nor admin"),
        (status = 404, description = "Task not found"),
    )
)]
pub async fn add_item(
    State(state): State<Arc<AppState>>,
    caller: Caller,
    Path(id): Path<String>,
    body: Result<Json<AddChecklistItemRequest>, JsonRejection>,
) -> Result<(StatusCode, Json<ApiResponse<TaskResponse>>), ServerError> {
    let mut task = load_owned_task(&state, &caller, &id).await?;
    let item = validated(body)?.into_item();
    let item_id = item.id.clone();

    task.checklist.push(item);
    task.updated_at = Utc::now();
    state.store.save_task(&task).await?;
    info!(task_id = %id, item_id = %item_id, "checklist item added");

    Ok((StatusCode::CREATED, Json(ApiResponse::ok(reload_task(&state, &id).await?))))
}

/// Update `text` and/or `isCompleted`; an explicit `false` is stored.
#[utoipa::path(
    put,
    path = "/api/tasks/{id}/checklist/{item_id}",
    tag = "checklist",
    params(
        ("id" = String, Path, description = "Task id"),
        ("item_id" = String, Path, description = "Checklist item id"),
    ),
    request_body = UpdateChecklistItemRequest,
    responses(
        (status = 200, description = "Item updated; the whole task is returned", body = TaskResponse),
        (status = 400, description = "Validation failed"),
        (status = 403, description = "Caller is neither owner nor admin"),
        (status = 404, description = "Task or checklist item not found"),
    )
)]
pub async fn update_item(
    State(state): State<Arc<AppState>>,
    caller: Caller,
    Path((id, item_id)): Path<(String, String)>,
    body: Result<Json<UpdateChecklistItemRequest>, JsonRejection>,
) -> Result<Json<ApiResponse<TaskResponse>>, ServerError> {
    let mut task = load_owned_task(&state, &caller, &id).await?;
    let req = validated(body)?;
    let item = task
        .checklist_item_mut(&item_id)
        .ok_or_else(|| item_not_found(&item_id))?;
    req.apply_to(item);

    task.updated_at = Utc::now();
    state.store.save_task(&task).await?;
    info!(task_id = %id, item_id = %item_id, "checklist item updated");

    Ok(Json(ApiResponse::ok(reload_task(&state, &id).await?)))
}

#[utoipa::path(
    delete,
    path = "/api/tasks/{id}/checklist/{item_id}",
    tag = "checklist",
    params(
        ("id" = String, Path, description = "Task id"),
        ("item_id" = String, Path, description = "Checklist item id"),
    ),
    responses(
        (status = 200, description = "Item removed; the whole task is returned", body = TaskResponse),
        (status = 403, description = "Caller is neither owner nor admin"),
        (status = 404, description = "Task or checklist item not found"),
    )
)]
pub async fn delete_item(
    State(state): State<Arc<AppState>>,
    caller: Caller,
    Path((id, item_id)): Path<(String, String)>,
) -> Result<Json<ApiResponse<TaskResponse>>, ServerError> {
    let mut task = load_owned_task(&state, &caller, &id).await?;
    if !task.remove_checklist_item(&item_id) {
        return Err(item_not_found(&item_id));
    }

    task.updated_at = Utc::now();
    state.store.save_task(&task).await?;
    info!(task_id = %id, item_id = %item_id, "checklist item removed");

    Ok(Json(ApiResponse::ok(reload_task(&state, &id).await?)))
}
