//! End-to-end tests driving the full router against an in-memory database.

use std::sync::Arc;

use axum::body::Body;
use axum::http::{header, Request, StatusCode};
use axum::Router;
use chrono::{Duration, Local};
use http_body_util::BodyExt;
use serde_json::{json, Value};
use tower::ServiceExt;

use crate::config::Config;
use crate::entities::SqliteStore;
use crate::query::DayWindow;
use crate::routes;
use crate::state::AppState;

type Who = Option<(&'static str, &'static str)>;

const U1: Who = Some(("u1", "user"));
const U2: Who = Some(("u2", "user"));
const ADMIN: Who = Some(("root", "admin"));
const ANON: Who = None;

async fn app() -> Router {
    let store = SqliteStore::in_memory().await;
    routes::build(Arc::new(AppState::new(Config::default(), store)))
}

async fn send(app: &Router, method: &str, uri: &str, who: Who, body: Option<Value>) -> (StatusCode, Value) {
    let mut builder = Request::builder().method(method).uri(uri);
    if let Some((id, role)) = who {
        builder = builder.header("x-user-id", id).header("x-user-role", role);
    }
    let request = match body {
        Some(body) => builder
            .header(header::CONTENT_TYPE, "application/json")
            .body(Body::from(body.to_string())),
        None => builder.body(Body::empty()),
    }
    .unwrap();

    let response = app.clone().oneshot(request).await.unwrap();
    let status = response.status();
    let bytes = response.into_body().collect().await.unwrap().to_bytes();
    let value = if bytes.is_empty() {
        Value::Null
    } else {
        serde_json::from_slice(&bytes).unwrap()
    };
    (status, value)
}

async fn create(app: &Router, who: Who, body: Value) -> Value {
    let (status, value) = send(app, "POST", "/api/tasks", who, Some(body)).await;
    assert_eq!(status, StatusCode::CREATED, "{value}");
    value["data"].clone()
}

fn id_of(value: &Value) -> String {
    value["_id"].as_str().unwrap().to_owned()
}

#[tokio::test]
async fn missing_identity_is_rejected() {
    let app = app().await;
    let (status, body) = send(&app, "GET", "/api/tasks", ANON, None).await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);
    assert_eq!(body["success"], false);
}

#[tokio::test]
async fn create_assigns_caller_as_owner() {
    let app = app().await;
    let task = create(&app, U1, json!({ "title": " Write ", "user": "u2" })).await;
    assert_eq!(task["user"], "u1");
    assert_eq!(task["title"], "Write");
    assert_eq!(task["status"], "pending");
    assert_eq!(task["priority"], "medium");
    assert_eq!(task["projectRef"], Value::Null);
    assert!(task["completedAt"].is_null());
}

#[tokio::test]
async fn invalid_bodies_are_validation_failures() {
    let app = app().await;
    let (status, body) = send(&app, "POST", "/api/tasks", U1, Some(json!({ "title": "" }))).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["success"], false);

    let (status, _) = send(
        &app,
        "POST",
        "/api/tasks",
        U1,
        Some(json!({ "title": "x", "status": "someday" })),
    )
    .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn ownership_is_enforced_after_existence() {
    let app = app().await;
    let id = id_of(&create(&app, U1, json!({ "title": "mine" })).await);
    let uri = format!("/api/tasks/{id}");

    let (status, _) = send(&app, "GET", "/api/tasks/nope", U2, None).await;
    assert_eq!(status, StatusCode::NOT_FOUND);

    let (status, body) = send(&app, "GET", &uri, U2, None).await;
    assert_eq!(status, StatusCode::FORBIDDEN);
    assert_eq!(body["success"], false);

    // Forbidden wins over an invalid body for someone else's task.
    let (status, _) = send(&app, "PUT", &uri, U2, Some(json!({ "title": "" }))).await;
    assert_eq!(status, StatusCode::FORBIDDEN);

    let (status, _) = send(&app, "DELETE", &uri, U2, None).await;
    assert_eq!(status, StatusCode::FORBIDDEN);

    let (status, body) = send(&app, "GET", &uri, ADMIN, None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["data"]["title"], "mine");

    let (status, _) = send(&app, "DELETE", &uri, U1, None).await;
    assert_eq!(status, StatusCode::OK);
    let (status, _) = send(&app, "GET", &uri, U1, None).await;
    assert_eq!(status, StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn completed_at_is_stamped_once() {
    let app = app().await;
    let id = id_of(&create(&app, U1, json!({ "title": "ship" })).await);
    let uri = format!("/api/tasks/{id}");

    let (_, body) = send(&app, "PUT", &uri, U1, Some(json!({ "status": "completed" }))).await;
    let stamped = body["data"]["completedAt"].clone();
    assert!(stamped.is_string());

    let (_, body) = send(&app, "PUT", &uri, U1, Some(json!({ "status": "pending" }))).await;
    assert_eq!(body["data"]["status"], "pending");
    assert_eq!(body["data"]["completedAt"], stamped);

    let (_, body) = send(&app, "PUT", &uri, U1, Some(json!({ "status": "completed" }))).await;
    assert_eq!(body["data"]["completedAt"], stamped);
}

#[tokio::test]
async fn checklist_items_round_trip() {
    let app = app().await;
    let id = id_of(&create(&app, U1, json!({ "title": "post" })).await);
    let base = format!("/api/tasks/{id}/checklist");

    let (status, body) = send(&app, "POST", &base, U1, Some(json!({ "text": "outline" }))).await;
    assert_eq!(status, StatusCode::CREATED);
    let item = body["data"]["checklist"][0].clone();
    assert_eq!(item["isCompleted"], false);
    let item_uri = format!("{base}/{}", id_of(&item));

    let (_, _) = send(&app, "PUT", &item_uri, U1, Some(json!({ "isCompleted": true }))).await;
    let (status, body) = send(&app, "PUT", &item_uri, U1, Some(json!({ "isCompleted": false }))).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["data"]["checklist"][0]["isCompleted"], false);
    assert_eq!(body["data"]["checklist"][0]["text"], "outline");

    let (_, body) = send(&app, "GET", &format!("/api/tasks/{id}"), U1, None).await;
    assert_eq!(body["data"]["checklist"][0]["isCompleted"], false);

    let (status, body) = send(&app, "PUT", &format!("{base}/missing"), U1, Some(json!({}))).await;
    assert_eq!(status, StatusCode::NOT_FOUND);
    assert!(body["message"].as_str().unwrap().contains("checklist item"));

    let (status, body) = send(&app, "DELETE", &item_uri, U1, None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["data"]["checklist"], json!([]));
    let (status, _) = send(&app, "DELETE", &item_uri, U1, None).await;
    assert_eq!(status, StatusCode::NOT_FOUND);

    let (status, _) = send(&app, "POST", &base, U2, Some(json!({ "text": "x" }))).await;
    assert_eq!(status, StatusCode::FORBIDDEN);
}

#[tokio::test]
async fn list_paginates_with_links() {
    let app = app().await;
    for i in 0..5 {
        create(&app, U1, json!({ "title": format!("t{i}") })).await;
    }
    create(&app, U2, json!({ "title": "other" })).await;

    let (status, body) = send(&app, "GET", "/api/tasks?limit=2&page=1", U1, None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["count"], 2);
    assert_eq!(body["total"], 5);
    assert_eq!(body["pagination"], json!({ "next": { "page": 2, "limit": 2 } }));

    let (_, body) = send(&app, "GET", "/api/tasks?limit=2&page=3", U1, None).await;
    assert_eq!(body["count"], 1);
    assert_eq!(body["pagination"], json!({ "prev": { "page": 2, "limit": 2 } }));
}

#[tokio::test]
async fn urgent_task_due_tomorrow_leads_the_default_order() {
    let app = app().await;
    let window = DayWindow::containing(&Local::now());
    let later = (window.tomorrow + Duration::days(2)).to_rfc3339();
    let tomorrow = (window.tomorrow + Duration::hours(1)).to_rfc3339();
    create(&app, U1, json!({ "title": "B", "priority": "low", "dueDate": later })).await;
    create(&app, U1, json!({ "title": "A", "priority": "high", "dueDate": tomorrow })).await;

    let (_, body) = send(&app, "GET", "/api/tasks?dueDate=today", U1, None).await;
    assert_eq!(body["data"], json!([]));

    let (_, body) = send(&app, "GET", "/api/tasks", U1, None).await;
    assert_eq!(body["data"][0]["title"], "A");
    assert_eq!(body["data"][1]["title"], "B");
}

#[tokio::test]
async fn list_supports_select_search_and_comparisons() {
    let app = app().await;
    create(&app, U1, json!({ "title": "Deploy site", "tags": ["ops"], "dueDate": "2030-01-05" })).await;
    create(&app, U1, json!({ "title": "Read book", "dueDate": "2030-03-01" })).await;

    let (_, body) = send(&app, "GET", "/api/tasks?search=DEPLOY&select=title", U1, None).await;
    assert_eq!(body["count"], 1);
    let only = body["data"][0].as_object().unwrap();
    assert_eq!(only.len(), 2);
    assert_eq!(only["title"], "Deploy site");

    let (_, body) = send(&app, "GET", "/api/tasks?dueDate%5Bgte%5D=2030-02-01", U1, None).await;
    assert_eq!(body["count"], 1);
    assert_eq!(body["data"][0]["title"], "Read book");

    let (status, _) = send(&app, "GET", "/api/tasks?dueDate%5Bgte%5D=soon", U1, None).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn search_ignores_case_beyond_ascii() {
    let app = app().await;
    create(&app, U1, json!({ "title": "Über release" })).await;
    create(&app, U1, json!({ "title": "chores", "tags": ["Ümlaut"] })).await;

    let (_, body) = send(&app, "GET", "/api/tasks?search=%C3%BCber", U1, None).await;
    assert_eq!(body["count"], 1);
    assert_eq!(body["data"][0]["title"], "Über release");

    let (_, body) = send(&app, "GET", "/api/tasks?search=%C3%BCmlaut", U1, None).await;
    assert_eq!(body["count"], 1);
    assert_eq!(body["data"][0]["title"], "chores");
}

#[tokio::test]
async fn buckets_and_stats_are_scoped_to_the_caller() {
    let app = app().await;
    let window = DayWindow::containing(&Local::now());
    let now = (window.start + Duration::hours(12)).to_rfc3339();
    let long_ago = (window.start - Duration::days(3)).to_rfc3339();
    create(&app, U1, json!({ "title": "late", "dueDate": long_ago, "category": "blog" })).await;
    create(&app, U1, json!({ "title": "done", "dueDate": long_ago, "status": "completed" })).await;
    create(&app, U1, json!({ "title": "now", "dueDate": now, "priority": "urgent" })).await;
    create(&app, U2, json!({ "title": "theirs", "dueDate": long_ago })).await;

    let (_, body) = send(&app, "GET", "/api/tasks/overdue", U1, None).await;
    assert_eq!(body["count"], 1);
    assert_eq!(body["data"][0]["title"], "late");

    let (_, body) = send(&app, "GET", "/api/tasks/today", U1, None).await;
    assert_eq!(body["count"], 1);
    assert_eq!(body["data"][0]["title"], "now");

    let (status, body) = send(&app, "GET", "/api/tasks/stats", U1, None).await;
    assert_eq!(status, StatusCode::OK);
    let stats = &body["data"];
    assert_eq!(stats["total"], 3);
    assert_eq!(stats["byStatus"]["completed"], 1);
    assert_eq!(stats["byStatus"]["cancelled"], 0);
    assert_eq!(stats["byCategory"]["blog"], 1);
    assert_eq!(stats["byPriority"]["urgent"], 1);
    assert_eq!(stats["today"], 1);
    assert_eq!(stats["overdue"], 1);
    assert_eq!(stats["completedToday"], 1);
}

#[tokio::test]
async fn project_refs_populate_and_clear_on_delete() {
    let app = app().await;
    let (status, _) = send(&app, "POST", "/api/projects", U1, Some(json!({ "title": "Site" }))).await;
    assert_eq!(status, StatusCode::FORBIDDEN);

    let (status, body) = send(&app, "POST", "/api/projects", ADMIN, Some(json!({ "title": "Site" }))).await;
    assert_eq!(status, StatusCode::CREATED);
    let project_id = id_of(&body["data"]);

    let (status, _) = send(&app, "POST", "/api/tasks", U1, Some(json!({ "title": "x", "projectRef": "ghost" }))).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);

    let task = create(&app, U1, json!({ "title": "polish", "projectRef": project_id })).await;
    assert_eq!(task["projectRef"], json!({ "_id": project_id, "title": "Site" }));

    let (status, body) = send(&app, "GET", "/api/projects", ANON, None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["count"], 1);

    let (status, _) = send(&app, "DELETE", &format!("/api/projects/{project_id}"), ADMIN, None).await;
    assert_eq!(status, StatusCode::OK);
    let (_, body) = send(&app, "GET", &format!("/api/tasks/{}", id_of(&task)), U1, None).await;
    assert_eq!(body["data"]["projectRef"], Value::Null);
}

#[tokio::test]
async fn drafts_are_hidden_until_published() {
    let app = app().await;
    let draft = json!({ "title": "Hello World", "content": "body" });
    let (status, body) = send(&app, "POST", "/api/blogs", ADMIN, Some(draft.clone())).await;
    assert_eq!(status, StatusCode::CREATED);
    assert_eq!(body["data"]["slug"], "hello-world");
    let id = id_of(&body["data"]);

    let (_, body) = send(&app, "POST", "/api/blogs", ADMIN, Some(draft)).await;
    assert_eq!(body["data"]["slug"], "hello-world-2");

    let (_, body) = send(&app, "GET", "/api/blogs", ANON, None).await;
    assert_eq!(body["count"], 0);
    let (_, body) = send(&app, "GET", "/api/blogs", ADMIN, None).await;
    assert_eq!(body["count"], 2);

    let (status, _) = send(&app, "GET", "/api/blogs/hello-world", ANON, None).await;
    assert_eq!(status, StatusCode::NOT_FOUND);

    // A draft cannot be linked, and so cannot be named, by a non-admin.
    let (status, body) = send(&app, "POST", "/api/tasks", U1, Some(json!({ "title": "x", "blogRef": id }))).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert!(!body.to_string().contains("Hello World"));
    let task = create(&app, U1, json!({ "title": "x" })).await;
    let (status, _) = send(
        &app,
        "PUT",
        &format!("/api/tasks/{}", id_of(&task)),
        U1,
        Some(json!({ "blogRef": id })),
    )
    .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    let linked = create(&app, ADMIN, json!({ "title": "plan", "blogRef": id })).await;
    assert_eq!(linked["blogRef"]["title"], "Hello World");

    let (status, body) = send(&app, "PUT", &format!("/api/blogs/{id}"), ADMIN, Some(json!({ "published": true }))).await;
    assert_eq!(status, StatusCode::OK);
    assert!(body["data"]["publishedAt"].is_string());

    let (status, body) = send(&app, "GET", "/api/blogs/hello-world", ANON, None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["data"]["_id"], id.as_str());

    let published = create(&app, U1, json!({ "title": "y", "blogRef": id })).await;
    assert_eq!(published["blogRef"]["title"], "Hello World");
}

#[tokio::test]
async fn health_docs_and_trace_header() {
    let app = app().await;
    let (status, body) = send(&app, "GET", "/health", ANON, None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["status"], "ok");

    let (status, body) = send(&app, "GET", "/api-docs/openapi.json", ANON, None).await;
    assert_eq!(status, StatusCode::OK);
    assert!(body["paths"]["/api/tasks"].is_object());

    let response = app
        .clone()
        .oneshot(Request::builder().uri("/health").body(Body::empty()).unwrap())
        .await
        .unwrap();
    assert!(response.headers().contains_key("x-trace-id"));
}
