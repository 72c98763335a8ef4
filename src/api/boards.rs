//! Board API endpoints.
//!
//! Proxies the backend's `/api/boards` and adds an assembled board view that
//! resolves cards to tasks.

use std::sync::Arc;

use axum::{
    extract::{Path, State},
    http::StatusCode,
    response::{IntoResponse, Response},
    routing::get,
    Json, Router,
};
use futures::future::join;
use serde_json::{json, Value};

use crate::backend::BackendRequest;
use crate::task::BoardDetail;

use super::proxy::{decode, error_response, forward, passthrough, unavailable_list};
use super::routes::AppState;
use super::tasks::fetch_tasks;

/// Create board routes.
pub fn routes() -> Router<Arc<AppState>> {
    Router::new()
        .route("/", get(list_boards))
        .route("/:id", get(get_board).delete(delete_board))
        .route("/:id/view", get(board_view))
}

fn board_path(id: i64) -> String {
    format!("/api/boards/{}", id)
}

// ─────────────────────────────────────────────────────────────────────────────
// Handlers
// ─────────────────────────────────────────────────────────────────────────────

/// GET /api/boards - List boards, wrapped as `{boards}`.
async fn list_boards(State(state): State<Arc<AppState>>) -> Response {
    let response = match state.backend.fetch(&BackendRequest::get("/api/boards")).await {
        Ok(response) => response,
        Err(e) => return unavailable_list("boards", &e),
    };
    if !response.is_success() {
        return passthrough(response);
    }
    match response.json::<Value>() {
        Ok(boards) => Json(json!({ "boards": boards })).into_response(),
        Err(e) => error_response(
            StatusCode::BAD_GATEWAY,
            format!("Backend returned a non-JSON body: {}", e),
        ),
    }
}

/// GET /api/boards/:id - Board with its columns and cards.
async fn get_board(State(state): State<Arc<AppState>>, Path(id): Path<i64>) -> Response {
    forward(&state.backend, BackendRequest::get(board_path(id))).await
}

/// DELETE /api/boards/:id - Delete a board.
async fn delete_board(State(state): State<Arc<AppState>>, Path(id): Path<i64>) -> Response {
    forward(&state.backend, BackendRequest::delete(board_path(id))).await
}

/// GET /api/boards/:id/view - Board with cards resolved to tasks.
async fn board_view(State(state): State<Arc<AppState>>, Path(id): Path<i64>) -> Response {
    let detail_request = BackendRequest::get(board_path(id));
    let (detail, tasks) = join(
        state.backend.fetch(&detail_request),
        fetch_tasks(&state.backend),
    )
    .await;

    let detail: BoardDetail = match decode(detail) {
        Ok(detail) => detail,
        Err(response) => return response,
    };
    let tasks = match tasks {
        Ok(tasks) => tasks,
        Err(response) => return response,
    };

    let view = detail.assemble(&tasks);
    if !view.unmapped_tasks.is_empty() || !view.dangling_card_ids.is_empty() {
        tracing::info!(
            "Board {} has {} unmapped tasks and {} dangling cards",
            id,
            view.unmapped_tasks.len(),
            view.dangling_card_ids.len()
        );
    }
    Json(view).into_response()
}

#[cfg(test)]
mod tests {
    use super::super::testing::{spawn, spawn_app, DEAD_BACKEND};
    use super::*;
    use crate::task::item::tests::sample_task;

    fn stub_backend() -> Router {
        let tasks = json!([sample_task(1, Some(1)), sample_task(2, Some(1))]);
        Router::new()
            .route(
                "/api/boards",
                get(|| async { Json(json!([{"id": 1, "name": "Launch", "owner_id": 1}])) }),
            )
            .route(
                "/api/boards/:id",
                get(|Path(id): Path<i64>| async move {
                    if id != 1 {
                        return (StatusCode::NOT_FOUND, Json(json!({"detail": "Board not found"})))
                            .into_response();
                    }
                    Json(json!({
                        "board": {"id": 1, "name": "Launch", "description": "", "owner_id": 1},
                        "columns": [{"id": 10, "name": "Todo"}],
                        "cards": [{"id": 100, "task_id": 1, "column_id": 10, "order_index": 0}]
                    }))
                    .into_response()
                }),
            )
            .route(
                "/api/tasks",
                get(move || {
                    let tasks = tasks.clone();
                    async move { Json(tasks) }
                }),
            )
    }

    #[tokio::test]
    async fn test_list_boards_wraps_payload() {
        let app = spawn_app(vec![spawn(stub_backend()).await]).await;
        let body: Value = reqwest::get(format!("{}/api/boards", app))
            .await
            .unwrap()
            .json()
            .await
            .unwrap();
        assert_eq!(body["boards"][0]["name"], "Launch");
    }

    #[tokio::test]
    async fn test_list_boards_exhausted() {
        let app = spawn_app(vec![DEAD_BACKEND.to_string()]).await;
        let response = reqwest::get(format!("{}/api/boards", app)).await.unwrap();
        assert_eq!(response.status(), 502);
        let body: Value = response.json().await.unwrap();
        assert_eq!(body["boards"], json!([]));
        assert!(body["error"].as_str().unwrap().starts_with("All backends failed."));
    }

    #[tokio::test]
    async fn test_board_view_tracks_unmapped_tasks() {
        let app = spawn_app(vec![spawn(stub_backend()).await]).await;
        let body: Value = reqwest::get(format!("{}/api/boards/1/view", app))
            .await
            .unwrap()
            .json()
            .await
            .unwrap();
        assert_eq!(body["columns"][0]["cards"][0]["task"]["id"], 1);
        assert_eq!(body["unmapped_tasks"][0]["id"], 2);
        assert_eq!(body["dangling_card_ids"], json!([]));
    }

    #[tokio::test]
    async fn test_missing_board_falls_through_then_fails() {
        // A 404 is a fallthrough status, so the only backend ends exhausted.
        let app = spawn_app(vec![spawn(stub_backend()).await]).await;
        let response = reqwest::get(format!("{}/api/boards/7", app)).await.unwrap();
        assert_eq!(response.status(), 502);
        let body: Value = response.json().await.unwrap();
        assert!(body["error"].as_str().unwrap().contains("-> HTTP 404"));
    }
}
