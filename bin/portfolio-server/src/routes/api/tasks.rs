//! Task CRUD, due-date buckets and per-user stats.
//!
//! Every handler that touches a single task goes through [`load_owned_task`]:
//! fetch, 404 if missing, then the owner-or-admin check.

use std::collections::BTreeMap;
use std::sync::Arc;

use axum::extract::rejection::JsonRejection;
use axum::extract::{Path, Query, State};
use axum::http::StatusCode;
use axum::routing::get;
use axum::{Json, Router};
use chrono::{Local, Utc};
use serde_json::Value as JsonValue;
use strum::IntoEnumIterator;
use tracing::{debug, info};
use utoipa::OpenApi;

use crate::entities::dao::{Priority, TaskCategory, TaskRecord, TaskStatus};
use crate::entities::task::GroupBy;
use crate::entities::{BlogStore, ProjectStore, TaskStore};
use crate::error::ServerError;
use crate::extract::{validated, ValidatedJson};
use crate::middleware::Caller;
use crate::query::{Clause, CompareOp, DayWindow, DueBucket, Field, Filter, Value, DEFAULT_SORT};
use crate::schemas::envelope::{ApiResponse, Pagination};
use crate::schemas::task::{
    CreateTaskRequest, TaskListQuery, TaskResponse, TaskStats, UpdateTaskRequest,
};
use crate::state::AppState;

#[derive(OpenApi)]
#[openapi(
    paths(list_tasks, list_today, list_overdue, task_stats, get_task, create_task, update_task, delete_task),
    components(schemas(TaskResponse, TaskStats, CreateTaskRequest, UpdateTaskRequest))
)]
pub struct TasksApi;

pub fn router() -> Router<Arc<AppState>> {
    Router::new()
        .route("/tasks", get(list_tasks).post(create_task))
        .route("/tasks/today", get(list_today))
        .route("/tasks/overdue", get(list_overdue))
        .route("/tasks/stats", get(task_stats))
        .route("/tasks/{id}", get(get_task).put(update_task).delete(delete_task))
}

// ── shared helpers ───────────────────────────────────────────────────────────

pub(super) async fn load_owned_task(
    state: &AppState,
    caller: &Caller,
    id: &str,
) -> Result<TaskRecord, ServerError> {
    let task = state
        .store
        .get_task(id)
        .await?
        .ok_or_else(|| ServerError::NotFound(format!("task {id} not found")))?;
    caller.ensure_owner_or_admin(&task.user_id, "task")?;
    Ok(task)
}

/// Re-read after a write so `projectRef` / `blogRef` come back populated.
pub(super) async fn reload_task(state: &AppState, id: &str) -> Result<TaskResponse, ServerError> {
    state
        .store
        .get_task(id)
        .await?
        .map(TaskResponse::from)
        .ok_or_else(|| ServerError::Internal(format!("task {id} vanished after write")))
}

/// Referenced project and post must exist; drafts are linkable by admins only.
async fn check_refs(
    state: &AppState,
    caller: &Caller,
    project_id: Option<&str>,
    blog_id: Option<&str>,
) -> Result<(), ServerError> {
    if let Some(id) = project_id {
        if state.store.get_project(id).await?.is_none() {
            return Err(ServerError::Validation(format!("projectRef: project {id} does not exist")));
        }
    }
    if let Some(id) = blog_id {
        let visible = state
            .store
            .get_post(id)
            .await?
            .is_some_and(|p| p.id == id && (p.published || caller.is_admin()));
        if !visible {
            return Err(ServerError::Validation(format!("blogRef: blog post {id} does not exist")));
        }
    }
    Ok(())
}

fn tally<E: IntoEnumIterator + AsRef<str>>(rows: Vec<(String, u64)>) -> BTreeMap<String, u64> {
    let mut counts: BTreeMap<String, u64> = E::iter().map(|v| (v.as_ref().to_owned(), 0)).collect();
    for (label, n) in rows {
        *counts.entry(label).or_default() += n;
    }
    counts
}

fn into_responses(tasks: Vec<TaskRecord>) -> Vec<TaskResponse> {
    tasks.into_iter().map(TaskResponse::from).collect()
}

// ── handlers ─────────────────────────────────────────────────────────────────

/// List the caller's tasks with filters, search, projection, sort and paging.
#[utoipa::path(
    get,
    path = "/api/tasks",
    tag = "tasks",
    params(TaskListQuery),
    responses(
        (status = 200, description = "Page of tasks in the list envelope", body = [TaskResponse]),
        (status = 400, description = "Filter value could not be cast"),
        (status = 401, description = "Missing X-User-Id"),
    )
)]
pub async fn list_tasks(
    State(state): State<Arc<AppState>>,
    caller: Caller,
    Query(query): Query<TaskListQuery>,
) -> Result<Json<ApiResponse<Vec<JsonValue>>>, ServerError> {
    let plan = state.queries.build(&query.0, &caller.user_id, &Local::now())?;
    let tasks = state
        .store
        .find_tasks(&plan.filter, &plan.sort, plan.skip, Some(plan.limit))
        .await?;
    let total = state.store.count_tasks(&plan.count_filter).await?;
    debug!(user_id = %caller.user_id, returned = tasks.len(), total, "listed tasks");

    let data = tasks
        .into_iter()
        .map(|t| TaskResponse::from(t).project(plan.projection.as_ref()))
        .collect::<Result<Vec<_>, _>>()?;
    let pagination = Pagination::new(plan.page, plan.limit, total);
    Ok(Json(ApiResponse::page(data, total, pagination)))
}

/// Tasks due between local midnight and the next.
#[utoipa::path(
    get,
    path = "/api/tasks/today",
    tag = "tasks",
    responses(
        (status = 200, description = "Tasks due today", body = [TaskResponse]),
        (status = 401, description = "Missing X-User-Id"),
    )
)]
pub async fn list_today(
    State(state): State<Arc<AppState>>,
    caller: Caller,
) -> Result<Json<ApiResponse<Vec<TaskResponse>>>, ServerError> {
    let filter = state.queries.bucket(&caller.user_id, DueBucket::Today, &Local::now());
    let tasks = state.store.find_tasks(&filter, &DEFAULT_SORT, 0, None).await?;
    Ok(Json(ApiResponse::list(into_responses(tasks))))
}

/// Unfinished tasks due before today.
#[utoipa::path(
    get,
    path = "/api/tasks/overdue",
    tag = "tasks",
    responses(
        (status = 200, description = "Overdue tasks", body = [TaskResponse]),
        (status = 401, description = "Missing X-User-Id"),
    )
)]
pub async fn list_overdue(
    State(state): State<Arc<AppState>>,
    caller: Caller,
) -> Result<Json<ApiResponse<Vec<TaskResponse>>>, ServerError> {
    let filter = state.queries.bucket(&caller.user_id, DueBucket::Overdue, &Local::now());
    let tasks = state.store.find_tasks(&filter, &DEFAULT_SORT, 0, None).await?;
    Ok(Json(ApiResponse::list(into_responses(tasks))))
}

/// Aggregate counts over the caller's own tasks. Admins get their own too.
#[utoipa::path(
    get,
    path = "/api/tasks/stats",
    tag = "tasks",
    responses(
        (status = 200, description = "Task counts", body = TaskStats),
        (status = 401, description = "Missing X-User-Id"),
    )
)]
pub async fn task_stats(
    State(state): State<Arc<AppState>>,
    caller: Caller,
) -> Result<Json<ApiResponse<TaskStats>>, ServerError> {
    let store = &state.store;
    let owned = Filter::owned_by(&caller.user_id);
    let now = Local::now();
    let window = DayWindow::containing(&now);

    let completed_today = owned
        .clone()
        .with(Clause::eq(Field::Status, Value::Text(TaskStatus::Completed.to_string())))
        .with(Clause::Compare {
            field: Field::CompletedAt,
            op: CompareOp::Gte,
            value: Value::Timestamp(window.start),
        })
        .with(Clause::Compare {
            field: Field::CompletedAt,
            op: CompareOp::Lt,
            value: Value::Timestamp(window.tomorrow),
        });

    let stats = TaskStats {
        total: store.count_tasks(&owned).await?,
        by_status: tally::<TaskStatus>(store.count_tasks_by(&owned, GroupBy::Status).await?),
        by_category: tally::<TaskCategory>(store.count_tasks_by(&owned, GroupBy::Category).await?),
        by_priority: tally::<Priority>(store.count_tasks_by(&owned, GroupBy::Priority).await?),
        today: store
            .count_tasks(&state.queries.bucket(&caller.user_id, DueBucket::Today, &now))
            .await?,
        overdue: store
            .count_tasks(&state.queries.bucket(&caller.user_id, DueBucket::Overdue, &now))
            .await?,
        completed_today: store.count_tasks(&completed_today).await?,
    };
    Ok(Json(ApiResponse::ok(stats)))
}

#[utoipa::path(
    get,
    path = "/api/tasks/{id}",
    tag = "tasks",
    params(("id" = String, Path, description = "Task id")),
    responses(
        (status = 200, description = "Task", body = TaskResponse),
        (status = 403, description = "Caller is neither owner nor admin"),
        (status = 404, description = "Task not found"),
    )
)]
pub async fn get_task(
    State(state): State<Arc<AppState>>,
    caller: Caller,
    Path(id): Path<String>,
) -> Result<Json<ApiResponse<TaskResponse>>, ServerError> {
    let task = load_owned_task(&state, &caller, &id).await?;
    Ok(Json(ApiResponse::ok(TaskResponse::from(task))))
}

/// Create a task owned by the caller; a `user` key in the body is ignored.
#[utoipa::path(
    post,
    path = "/api/tasks",
    tag = "tasks",
    request_body = CreateTaskRequest,
    responses(
        (status = 201, description = "Task created", body = TaskResponse),
        (status = 400, description = "Validation failed"),
        (status = 401, description = "Missing X-User-Id"),
    )
)]
pub async fn create_task(
    State(state): State<Arc<AppState>>,
    caller: Caller,
    ValidatedJson(req): ValidatedJson<CreateTaskRequest>,
) -> Result<(StatusCode, Json<ApiResponse<TaskResponse>>), ServerError> {
    check_refs(&state, &caller, req.project_ref.as_deref(), req.blog_ref.as_deref()).await?;
    let task = req.into_record(&caller.user_id, Utc::now());
    state.store.insert_task(&task).await?;
    info!(task_id = %task.id, user_id = %caller.user_id, "task created");

    let created = reload_task(&state, &task.id).await?;
    Ok((StatusCode::CREATED, Json(ApiResponse::ok(created))))
}

/// Partial update. Setting `status` to `completed` the first time stamps
/// `completedAt`.
#[utoipa::path(
    put,
    path = "/api/tasks/{id}",
    tag = "tasks",
    params(("id" = String, Path, description = "Task id")),
    request_body = UpdateTaskRequest,
    responses(
        (status = 200, description = "Task updated", body = TaskResponse),
        (status = 400, description = "Validation failed"),
        (status = 403, description = "Caller is neither owner nor admin"),
        (status = 404, description = "Task not found"),
    )
)]
pub async fn update_task(
    State(state): State<Arc<AppState>>,
    caller: Caller,
    Path(id): Path<String>,
    body: Result<Json<UpdateTaskRequest>, JsonRejection>,
) -> Result<Json<ApiResponse<TaskResponse>>, ServerError> {
    let mut task = load_owned_task(&state, &caller, &id).await?;
    let req = validated(body)?;

    let new_project = req.project_ref.clone().flatten();
    let new_blog = req.blog_ref.clone().flatten();
    check_refs(&state, &caller, new_project.as_deref(), new_blog.as_deref()).await?;

    req.apply_to(&mut task, Utc::now())?;
    state.store.save_task(&task).await?;
    info!(task_id = %id, user_id = %caller.user_id, status = %task.status, "task updated");

    Ok(Json(ApiResponse::ok(reload_task(&state, &id).await?)))
}

#[utoipa::path(
    delete,
    path = "/api/tasks/{id}",
    tag = "tasks",
    params(("id" = String, Path, description = "Task id")),
    responses(
        (status = 200, description = "Task deleted"),
        (status = 403, description = "Caller is neither owner nor admin"),
        (status = 404, description = "Task not found"),
    )
)]
pub async fn delete_task(
    State(state): State<Arc<AppState>>,
    caller: Caller,
    Path(id): Path<String>,
) -> Result<Json<ApiResponse<()>>, ServerError> {
    load_owned_task(&state, &caller, &id).await?;
    state.store.delete_task(&id).await?;
    info!(task_id = %id, user_id = %caller.user_id, "task deleted");
    Ok(Json(ApiResponse::message("task deleted")))
}
