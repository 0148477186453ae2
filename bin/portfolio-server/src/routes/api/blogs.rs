//! Blog posts. Drafts are visible to admins only.

use std::sync::Arc;

use axum::extract::rejection::JsonRejection;
use axum::extract::{Path, Query, State};
use axum::http::StatusCode;
use axum::routing::get;
use axum::{Json, Router};
use chrono::Utc;
use tracing::info;
use utoipa::OpenApi;

use crate::entities::dao::{slugify, BlogPostRecord};
use crate::entities::{BlogStore, SqliteStore, TaskStore};
use crate::error::ServerError;
use crate::extract::validated;
use crate::middleware::Caller;
use crate::schemas::blog::{
    BlogListQuery, BlogPostResponse, CreateBlogPostRequest, UpdateBlogPostRequest,
};
use crate::schemas::envelope::ApiResponse;
use crate::state::AppState;

#[derive(OpenApi)]
#[openapi(
    paths(list_posts, get_post, create_post, update_post, delete_post),
    components(schemas(BlogPostResponse, CreateBlogPostRequest, UpdateBlogPostRequest))
)]
pub struct BlogsApi;

pub fn router() -> Router<Arc<AppState>> {
    Router::new()
        .route("/blogs", get(list_posts).post(create_post))
        .route("/blogs/{id}", get(get_post).put(update_post).delete(delete_post))
}

fn not_found(id: &str) -> ServerError {
    ServerError::NotFound(format!("blog post {id} not found"))
}

/// `base`, or `base-2`, `base-3`, ... until no other post uses it.
async fn unique_slug(
    store: &SqliteStore,
    base: String,
    exclude_id: Option<&str>,
) -> Result<String, ServerError> {
    let mut candidate = base.clone();
    let mut suffix = 2;
    while store.slug_exists(&candidate, exclude_id).await? {
        candidate = format!("{base}-{suffix}");
        suffix += 1;
    }
    Ok(candidate)
}

async fn load_post(state: &AppState, id: &str) -> Result<BlogPostRecord, ServerError> {
    state.store.get_post(id).await?.ok_or_else(|| not_found(id))
}

#[utoipa::path(
    get,
    path = "/api/blogs",
    tag = "blogs",
    params(BlogListQuery),
    responses((status = 200, description = "Posts, newest first", body = [BlogPostResponse]))
)]
pub async fn list_posts(
    State(state): State<Arc<AppState>>,
    caller: Option<Caller>,
    Query(q): Query<BlogListQuery>,
) -> Result<Json<ApiResponse<Vec<BlogPostResponse>>>, ServerError> {
    let published_only = !caller.is_some_and(|c| c.is_admin());
    let posts = state.store.list_posts(published_only, q.tag.as_deref()).await?;
    Ok(Json(ApiResponse::list(
        posts.into_iter().map(BlogPostResponse::from).collect(),
    )))
}

/// Look up by id or slug. Unpublished posts are 404 for non-admins.
#[utoipa::path(
    get,
    path = "/api/blogs/{id}",
    tag = "blogs",
    params(("id" = String, Path, description = "Post id or slug")),
    responses(
        (status = 200, description = "Post", body = BlogPostResponse),
        (status = 404, description = "Post not found"),
    )
)]
pub async fn get_post(
    State(state): State<Arc<AppState>>,
    caller: Option<Caller>,
    Path(id): Path<String>,
) -> Result<Json<ApiResponse<BlogPostResponse>>, ServerError> {
    let post = load_post(&state, &id).await?;
    if !post.published && !caller.is_some_and(|c| c.is_admin()) {
        return Err(not_found(&id));
    }
    Ok(Json(ApiResponse::ok(post.into())))
}

#[utoipa::path(
    post,
    path = "/api/blogs",
    tag = "blogs",
    request_body = CreateBlogPostRequest,
    responses(
        (status = 201, description = "Post created", body = BlogPostResponse),
        (status = 400, description = "Validation failed"),
        (status = 401, description = "Missing X-User-Id"),
        (status = 403, description = "Admin role required"),
    )
)]
pub async fn create_post(
    State(state): State<Arc<AppState>>,
    caller: Caller,
    body: Result<Json<CreateBlogPostRequest>, JsonRejection>,
) -> Result<(StatusCode, Json<ApiResponse<BlogPostResponse>>), ServerError> {
    caller.require_admin()?;
    let req = validated(body)?;
    let slug = unique_slug(&state.store, slugify(&req.title), None).await?;
    let post = req.into_record(&caller.user_id, slug, Utc::now());
    state.store.insert_post(&post).await?;
    info!(post_id = %post.id, slug = %post.slug, "blog post created");
    Ok((StatusCode::CREATED, Json(ApiResponse::ok(post.into()))))
}

/// Partial update. A new title re-derives the slug.
#[utoipa::path(
    put,
    path = "/api/blogs/{id}",
    tag = "blogs",
    params(("id" = String, Path, description = "Post id or slug")),
    request_body = UpdateBlogPostRequest,
    responses(
        (status = 200, description = "Post updated", body = BlogPostResponse),
        (status = 400, description = "Validation failed"),
        (status = 403, description = "Admin role required"),
        (status = 404, description = "Post not found"),
    )
)]
pub async fn update_post(
    State(state): State<Arc<AppState>>,
    caller: Caller,
    Path(id): Path<String>,
    body: Result<Json<UpdateBlogPostRequest>, JsonRejection>,
) -> Result<Json<ApiResponse<BlogPostResponse>>, ServerError> {
    caller.require_admin()?;
    let mut post = load_post(&state, &id).await?;
    let req = validated(body)?;

    let retitled = req.title.as_ref().is_some_and(|t| *t != post.title);
    req.apply_to(&mut post, Utc::now());
    if retitled {
        post.slug = unique_slug(&state.store, slugify(&post.title), Some(&post.id)).await?;
    }
    state.store.save_post(&post).await?;
    info!(post_id = %post.id, slug = %post.slug, published = post.published, "blog post updated");
    Ok(Json(ApiResponse::ok(post.into())))
}

/// Delete a post and unlink it from every task that referenced it.
#[utoipa::path(
    delete,
    path = "/api/blogs/{id}",
    tag = "blogs",
    params(("id" = String, Path, description = "Post id or slug")),
    responses(
        (status = 200, description = "Post deleted"),
        (status = 403, description = "Admin role required"),
        (status = 404, description = "Post not found"),
    )
)]
pub async fn delete_post(
    State(state): State<Arc<AppState>>,
    caller: Caller,
    Path(id): Path<String>,
) -> Result<Json<ApiResponse<()>>, ServerError> {
    caller.require_admin()?;
    let post = load_post(&state, &id).await?;
    state.store.delete_post(&post.id).await?;
    let unlinked = state.store.clear_task_refs(None, Some(&post.id)).await?;
    info!(post_id = %post.id, unlinked_tasks = unlinked, "blog post deleted");
    Ok(Json(ApiResponse::message("blog post deleted")))
}
