use axum::routing::get;
use axum::{Json, Router};
use std::sync::Arc;
use utoipa::OpenApi;

use crate::routes::{api, health};
use crate::state::AppState;

#[derive(OpenApi)]
#[openapi(info(
    title = "portfolio-server",
    description = "Tasks, projects and blog posts for the portfolio dashboard",
    version = "0.1.0"
))]
pub struct ApiDoc;

pub fn get_docs() -> utoipa::openapi::OpenApi {
    let mut root = ApiDoc::openapi();
    root.merge(health::HealthApi::openapi());
    root.merge(api::api_docs());
    root
}

/// Serves the generated document at `/api-docs/openapi.json`.
pub fn router() -> Router<Arc<AppState>> {
    let doc = Json(get_docs());
    Router::new().route("/api-docs/openapi.json", get(move || async move { doc }))
}
