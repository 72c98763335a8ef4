//! Task API endpoints.
//!
//! Thin proxy over the backend's `/api/tasks`:
//! - List tasks (optionally filtered by status, board and text)
//! - Create / update a task after validating the payload
//! - Get / delete a task

use std::sync::Arc;

use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    response::{IntoResponse, Response},
    routing::get,
    Json, Router,
};
use serde_json::{json, Value};

use crate::backend::{BackendClient, BackendRequest};
use crate::task::{Task, TaskFilter, TaskPayload};

use super::proxy::{decode, error_response, forward, passthrough, unavailable_list};
use super::routes::AppState;

/// Create task routes.
pub fn routes() -> Router<Arc<AppState>> {
    Router::new()
        .route("/", get(list_tasks).post(create_task))
        .route("/:id", get(get_task).put(update_task).delete(delete_task))
}

fn task_path(id: i64) -> String {
    format!("/api/tasks/{}", id)
}

// ─────────────────────────────────────────────────────────────────────────────
// Handlers
// ─────────────────────────────────────────────────────────────────────────────

/// GET /api/tasks - List tasks, wrapped as `{tasks}`.
async fn list_tasks(
    State(state): State<Arc<AppState>>,
    Query(filter): Query<TaskFilter>,
) -> Response {
    let response = match state.backend.fetch(&BackendRequest::get("/api/tasks")).await {
        Ok(response) => response,
        Err(e) => return unavailable_list("tasks", &e),
    };
    if !response.is_success() {
        return passthrough(response);
    }

    if filter.is_empty() {
        return match response.json::<Value>() {
            Ok(tasks) => Json(json!({ "tasks": tasks })).into_response(),
            Err(e) => error_response(
                StatusCode::BAD_GATEWAY,
                format!("Backend returned a non-JSON body: {}", e),
            ),
        };
    }

    match response.json::<Vec<Task>>() {
        Ok(tasks) => {
            let tasks = filter.apply(tasks);
            tracing::debug!("Task filter {:?} kept {} tasks", filter, tasks.len());
            Json(json!({ "tasks": tasks })).into_response()
        }
        Err(e) => error_response(
            StatusCode::BAD_GATEWAY,
            format!("Backend returned an unexpected task list: {}", e),
        ),
    }
}

/// Validate `body` and forward it as a write.
async fn write_task(
    backend: &BackendClient,
    body: Value,
    build: impl FnOnce(Value) -> BackendRequest,
) -> Response {
    let payload = match TaskPayload::from_json(body) {
        Ok(payload) => payload,
        Err(e) => return error_response(StatusCode::BAD_REQUEST, e.to_string()),
    };
    match serde_json::to_value(&payload) {
        Ok(body) => forward(backend, build(body)).await,
        Err(e) => error_response(StatusCode::INTERNAL_SERVER_ERROR, e.to_string()),
    }
}

/// POST /api/tasks - Create a task.
async fn create_task(State(state): State<Arc<AppState>>, Json(body): Json<Value>) -> Response {
    write_task(&state.backend, body, |body| {
        BackendRequest::post("/api/tasks", body)
    })
    .await
}

/// GET /api/tasks/:id - Get a task.
async fn get_task(State(state): State<Arc<AppState>>, Path(id): Path<i64>) -> Response {
    forward(&state.backend, BackendRequest::get(task_path(id))).await
}

/// PUT /api/tasks/:id - Update a task.
async fn update_task(
    State(state): State<Arc<AppState>>,
    Path(id): Path<i64>,
    Json(body): Json<Value>,
) -> Response {
    write_task(&state.backend, body, |body| {
        BackendRequest::put(task_path(id), body)
    })
    .await
}

/// DELETE /api/tasks/:id - Delete a task.
async fn delete_task(State(state): State<Arc<AppState>>, Path(id): Path<i64>) -> Response {
    forward(&state.backend, BackendRequest::delete(task_path(id))).await
}

/// Fetch the typed task list, for routes that combine it with other data.
pub(super) async fn fetch_tasks(backend: &BackendClient) -> Result<Vec<Task>, Response> {
    decode(backend.fetch(&BackendRequest::get("/api/tasks")).await)
}

#[cfg(test)]
mod tests {
    use std::sync::atomic::{AtomicUsize, Ordering};

    use super::super::testing::{spawn, spawn_app, DEAD_BACKEND};
    use super::*;
    use crate::task::item::tests::sample_task;

    fn stub_backend() -> Router {
        let mut blocked = sample_task(2, None);
        blocked.status = crate::task::TaskStatus::Blocked;
        let tasks = json!([sample_task(1, Some(1)), blocked]);

        Router::new()
            .route(
                "/api/tasks",
                get(move || {
                    let tasks = tasks.clone();
                    async move { Json(tasks) }
                })
                .post(|Json(body): Json<Value>| async move {
                    (StatusCode::CREATED, Json(json!({ "id": 9, "received": body })))
                }),
            )
            .route(
                "/api/tasks/:id",
                get(|Path(id): Path<i64>| async move {
                    if id == 1 {
                        Json(sample_task(1, Some(1))).into_response()
                    } else {
                        (StatusCode::UNPROCESSABLE_ENTITY, Json(json!({ "detail": "no such task" })))
                            .into_response()
                    }
                }),
            )
    }

    fn failing_backend(hits: Arc<AtomicUsize>) -> Router {
        Router::new().fallback(move || {
            let hits = Arc::clone(&hits);
            async move {
                hits.fetch_add(1, Ordering::SeqCst);
                (StatusCode::SERVICE_UNAVAILABLE, "down")
            }
        })
    }

    #[tokio::test]
    async fn test_list_falls_back_to_healthy_backend() {
        let hits = Arc::new(AtomicUsize::new(0));
        let down = spawn(failing_backend(Arc::clone(&hits))).await;
        let up = spawn(stub_backend()).await;
        let app = spawn_app(vec![DEAD_BACKEND.to_string(), down, up]).await;

        let response = reqwest::get(format!("{}/api/tasks", app)).await.unwrap();
        assert_eq!(response.status(), 200);
        let body: Value = response.json().await.unwrap();
        assert_eq!(body["tasks"].as_array().unwrap().len(), 2);
        assert_eq!(hits.load(Ordering::SeqCst), 1);
    }

    #[tokio::test]
    async fn test_list_applies_filters() {
        let up = spawn(stub_backend()).await;
        let app = spawn_app(vec![up]).await;

        let body: Value = reqwest::get(format!("{}/api/tasks?status=blocked&board=none", app))
            .await
            .unwrap()
            .json()
            .await
            .unwrap();
        let tasks = body["tasks"].as_array().unwrap();
        assert_eq!(tasks.len(), 1);
        assert_eq!(tasks[0]["id"], 2);
    }

    #[tokio::test]
    async fn test_list_exhausted_is_bad_gateway() {
        let app = spawn_app(vec![DEAD_BACKEND.to_string()]).await;

        let response = reqwest::get(format!("{}/api/tasks", app)).await.unwrap();
        assert_eq!(response.status(), 502);
        let body: Value = response.json().await.unwrap();
        assert_eq!(body["tasks"], json!([]));
        assert!(body["error"]
            .as_str()
            .unwrap()
            .starts_with("All backends failed. http://127.0.0.1:1/api/tasks -> "));
    }

    #[tokio::test]
    async fn test_client_error_is_mirrored_without_fallback() {
        let hits = Arc::new(AtomicUsize::new(0));
        let first = spawn(stub_backend()).await;
        let second = spawn(failing_backend(Arc::clone(&hits))).await;
        let app = spawn_app(vec![first, second]).await;

        let response = reqwest::get(format!("{}/api/tasks/5", app)).await.unwrap();
        assert_eq!(response.status(), 422);
        let body: Value = response.json().await.unwrap();
        assert_eq!(body["detail"], "no such task");
        assert_eq!(hits.load(Ordering::SeqCst), 0);
    }

    #[tokio::test]
    async fn test_create_validates_then_forwards_normalized_payload() {
        let up = spawn(stub_backend()).await;
        let app = spawn_app(vec![up]).await;
        let client = reqwest::Client::new();

        let rejected = client
            .post(format!("{}/api/tasks", app))
            .json(&json!({"title": "  ", "status": "todo", "priority": "low", "reporter_id": 1}))
            .send()
            .await
            .unwrap();
        assert_eq!(rejected.status(), 400);
        let body: Value = rejected.json().await.unwrap();
        assert_eq!(body["error"], "Title is required.");

        let created = client
            .post(format!("{}/api/tasks", app))
            .json(&json!({
                "title": " Lock launch date ",
                "status": "todo",
                "priority": "high",
                "reporter_id": 1,
                "labels": ["launch", " "]
            }))
            .send()
            .await
            .unwrap();
        assert_eq!(created.status(), 201);
        let body: Value = created.json().await.unwrap();
        assert_eq!(body["received"]["title"], "Lock launch date");
        assert_eq!(body["received"]["labels"], json!(["launch"]));
    }
}
