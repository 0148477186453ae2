//! Portfolio projects. Reads are public; writes need the admin role.

use std::sync::Arc;

use axum::extract::rejection::JsonRejection;
use axum::extract::{Path, Query, State};
use axum::http::StatusCode;
use axum::routing::get;
use axum::{Json, Router};
use chrono::Utc;
use tracing::info;
use utoipa::OpenApi;

use crate::entities::{ProjectStore, TaskStore};
use crate::error::ServerError;
use crate::extract::validated;
use crate::middleware::Caller;
use crate::schemas::envelope::ApiResponse;
use crate::schemas::project::{
    CreateProjectRequest, ProjectListQuery, ProjectResponse, UpdateProjectRequest,
};
use crate::state::AppState;

#[derive(OpenApi)]
#[openapi(
    paths(list_projects, get_project, create_project, update_project, delete_project),
    components(schemas(ProjectResponse, CreateProjectRequest, UpdateProjectRequest))
)]
pub struct ProjectsApi;

pub fn router() -> Router<Arc<AppState>> {
    Router::new()
        .route("/projects", get(list_projects).post(create_project))
        .route(
            "/projects/{id}",
            get(get_project).put(update_project).delete(delete_project),
        )
}

fn not_found(id: &str) -> ServerError {
    ServerError::NotFound(format!("project {id} not found"))
}

#[utoipa::path(
    get,
    path = "/api/projects",
    tag = "projects",
    params(ProjectListQuery),
    responses((status = 200, description = "Projects, newest first", body = [ProjectResponse]))
)]
pub async fn list_projects(
    State(state): State<Arc<AppState>>,
    Query(q): Query<ProjectListQuery>,
) -> Result<Json<ApiResponse<Vec<ProjectResponse>>>, ServerError> {
    let projects = state.store.list_projects(q.featured).await?;
    Ok(Json(ApiResponse::list(
        projects.into_iter().map(ProjectResponse::from).collect(),
    )))
}

#[utoipa::path(
    get,
    path = "/api/projects/{id}",
    tag = "projects",
    params(("id" = String, Path, description = "Project id")),
    responses(
        (status = 200, description = "Project", body = ProjectResponse),
        (status = 404, description = "Project not found"),
    )
)]
pub async fn get_project(
    State(state): State<Arc<AppState>>,
    Path(id): Path<String>,
) -> Result<Json<ApiResponse<ProjectResponse>>, ServerError> {
    let project = state.store.get_project(&id).await?.ok_or_else(|| not_found(&id))?;
    Ok(Json(ApiResponse::ok(project.into())))
}

#[utoipa::path(
    post,
    path = "/api/projects",
    tag = "projects",
    request_body = CreateProjectRequest,
    responses(
        (status = 201, description = "Project created", body = ProjectResponse),
        (status = 400, description = "Validation failed"),
        (status = 401, description = "Missing X-User-Id"),
        (status = 403, description = "Admin role required"),
    )
)]
pub async fn create_project(
    State(state): State<Arc<AppState>>,
    caller: Caller,
    body: Result<Json<CreateProjectRequest>, JsonRejection>,
) -> Result<(StatusCode, Json<ApiResponse<ProjectResponse>>), ServerError> {
    caller.require_admin()?;
    let project = validated(body)?.into_record(Utc::now());
    state.store.insert_project(&project).await?;
    info!(project_id = %project.id, user_id = %caller.user_id, "project created");
    Ok((StatusCode::CREATED, Json(ApiResponse::ok(project.into()))))
}

#[utoipa::path(
    put,
    path = "/api/projects/{id}",
    tag = "projects",
    params(("id" = String, Path, description = "Project id")),
    request_body = UpdateProjectRequest,
    responses(
        (status = 200, description = "Project updated", body = ProjectResponse),
        (status = 400, description = "Validation failed"),
        (status = 403, description = "Admin role required"),
        (status = 404, description = "Project not found"),
    )
)]
pub async fn update_project(
    State(state): State<Arc<AppState>>,
    caller: Caller,
    Path(id): Path<String>,
    body: Result<Json<UpdateProjectRequest>, JsonRejection>,
) -> Result<Json<ApiResponse<ProjectResponse>>, ServerError> {
    caller.require_admin()?;
    let mut project = state.store.get_project(&id).await?.ok_or_else(|| not_found(&id))?;
    validated(body)?.apply_to(&mut project, Utc::now());
    state.store.save_project(&project).await?;
    info!(project_id = %id, user_id = %caller.user_id, "project updated");
    Ok(Json(ApiResponse::ok(project.into())))
}

/// Delete a project and unlink it from every task that referenced it.
#[utoipa::path(
    delete,
    path = "/api/projects/{id}",
    tag = "projects",
    params(("id" = String, Path, description = "Project id")),
    responses(
        (status = 200, description = "Project deleted"),
        (status = 403, description = "Admin role required"),
        (status = 404, description = "Project not found"),
    )
)]
pub async fn delete_project(
    State(state): State<Arc<AppState>>,
    caller: Caller,
    Path(id): Path<String>,
) -> Result<Json<ApiResponse<()>>, ServerError> {
    caller.require_admin()?;
    if !state.store.delete_project(&id).await? {
        return Err(not_found(&id));
    }
    let unlinked = state.store.clear_task_refs(Some(&id), None).await?;
    info!(project_id = %id, unlinked_tasks = unlinked, "project deleted");
    Ok(Json(ApiResponse::message("project deleted")))
}
