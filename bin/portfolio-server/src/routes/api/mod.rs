pub mod blogs;
pub mod checklist;
pub mod projects;
pub mod tasks;

#[cfg(test)]
mod test;

use std::sync::Arc;

use axum::Router;
use utoipa::OpenApi;

use crate::state::AppState;

/// Routes nested under `/api`.
pub fn router() -> Router<Arc<AppState>> {
    Router::new()
        .merge(tasks::router())
        .merge(checklist::router())
        .merge(projects::router())
        .merge(blogs::router())
}

#[derive(OpenApi)]
#[openapi(tags(
    (name = "tasks", description = "Per-user tasks; identity comes from X-User-Id / X-User-Role"),
    (name = "checklist", description = "Checklist items embedded in a task"),
    (name = "projects", description = "Portfolio projects"),
    (name = "blogs", description = "Blog posts")
))]
pub struct PortfolioApi;

pub fn api_docs() -> utoipa::openapi::OpenApi {
    let mut spec = PortfolioApi::openapi();
    spec.merge(tasks::TasksApi::openapi());
    spec.merge(checklist::ChecklistApi::openapi());
    spec.merge(projects::ProjectsApi::openapi());
    spec.merge(blogs::BlogsApi::openapi());
    spec
}
