//! Graph API endpoints.

use std::sync::Arc;

use axum::{
    extract::{Query, State},
    http::{header, StatusCode},
    response::{IntoResponse, Response},
    routing::get,
    Json, Router,
};
use serde::Deserialize;

use crate::graph::{load_view, GraphView};

use super::routes::AppState;

/// Shared caches may serve a graph for a minute and revalidate in the background.
pub const GRAPH_CACHE_CONTROL: &str = "public, s-maxage=60, stale-while-revalidate=59";

/// Create graph routes.
pub fn routes() -> Router<Arc<AppState>> {
    Router::new().route("/live", get(live_graph))
}

// ─────────────────────────────────────────────────────────────────────────────
// Request/Response Types
// ─────────────────────────────────────────────────────────────────────────────

#[derive(Debug, Default, Deserialize)]
pub struct GraphQuery {
    /// knowledge | departments | employees
    pub view: Option<String>,
}

// ─────────────────────────────────────────────────────────────────────────────
// Handlers
// ─────────────────────────────────────────────────────────────────────────────

/// GET /api/graph/live?view= - Normalized graph for one view.
async fn live_graph(
    State(state): State<Arc<AppState>>,
    Query(query): Query<GraphQuery>,
) -> Response {
    let view = GraphView::from_query(query.view.as_deref());
    let snapshot = load_view(&state.backend, view).await;

    if snapshot.is_unavailable() {
        return (
            StatusCode::BAD_GATEWAY,
            [(header::CACHE_CONTROL, "no-store")],
            Json(snapshot),
        )
            .into_response();
    }
    ([(header::CACHE_CONTROL, GRAPH_CACHE_CONTROL)], Json(snapshot)).into_response()
}

#[cfg(test)]
mod tests {
    use serde_json::{json, Value};

    use super::super::testing::{spawn, spawn_app, DEAD_BACKEND};
    use super::*;

    fn stub_backend() -> Router {
        Router::new()
            .route(
                "/api/graph/employees",
                get(|| async {
                    Json(json!([
                        {"id": 1, "full_name": "Amina", "role": "Founder", "team": "Engineering"},
                        {"id": 2, "full_name": "Sarah", "role": "Lead", "team": "Growth"}
                    ]))
                }),
            )
            .route(
                "/api/graph/edges",
                get(|| async { Json(json!([{"from": 1, "to": 2, "weight": 3}])) }),
            )
            .route(
                "/api/graph/departments",
                get(|| async { Json(json!({"nodes": [], "edges": []})) }),
            )
    }

    #[tokio::test]
    async fn test_employees_view_is_cacheable() {
        let app = spawn_app(vec![spawn(stub_backend()).await]).await;
        let response = reqwest::get(format!("{}/api/graph/live?view=employees", app))
            .await
            .unwrap();
        assert_eq!(response.status(), 200);
        assert_eq!(
            response.headers()["cache-control"].to_str().unwrap(),
            GRAPH_CACHE_CONTROL
        );

        let body: Value = response.json().await.unwrap();
        assert_eq!(body["view"], "employees");
        let ids: Vec<&str> = body["nodes"]
            .as_array()
            .unwrap()
            .iter()
            .map(|n| n["id"].as_str().unwrap())
            .collect();
        assert_eq!(ids, vec!["emp::1", "emp::2"]);
        assert_ne!(body["nodes"][0]["x"], body["nodes"][1]["x"]);
        assert_eq!(body["edges"][0]["weight"], 3.0);
        assert!(body.get("error").is_none());
    }

    #[tokio::test]
    async fn test_empty_view_is_a_normal_response() {
        let app = spawn_app(vec![spawn(stub_backend()).await]).await;
        let response = reqwest::get(format!("{}/api/graph/live?view=departments", app))
            .await
            .unwrap();
        assert_eq!(response.status(), 200);
        let body: Value = response.json().await.unwrap();
        assert_eq!(body["view"], "departments");
        assert_eq!(body["nodes"], json!([]));
        assert_eq!(body["edges"], json!([]));
    }

    #[tokio::test]
    async fn test_unavailable_view_is_not_cached() {
        let app = spawn_app(vec![DEAD_BACKEND.to_string()]).await;
        let response = reqwest::get(format!("{}/api/graph/live?view=bogus", app))
            .await
            .unwrap();
        assert_eq!(response.status(), 502);
        assert_eq!(response.headers()["cache-control"].to_str().unwrap(), "no-store");

        let body: Value = response.json().await.unwrap();
        assert_eq!(body["view"], "knowledge");
        assert_eq!(body["nodes"], json!([]));
        assert!(body["error"].as_str().unwrap().starts_with("All backends failed."));
        assert_eq!(body["errors"].as_array().unwrap().len(), 1);
    }

    #[tokio::test]
    async fn test_empty_employees_with_failed_edges_is_served() {
        let backend = spawn(
            Router::new()
                .route("/api/graph/employees", get(|| async { Json(json!([])) }))
                .route(
                    "/api/graph/edges",
                    get(|| async { (StatusCode::INTERNAL_SERVER_ERROR, "boom") }),
                ),
        )
        .await;
        let app = spawn_app(vec![backend]).await;

        let response = reqwest::get(format!("{}/api/graph/live?view=employees", app))
            .await
            .unwrap();
        assert_eq!(response.status(), 200);
        let body: Value = response.json().await.unwrap();
        assert_eq!(body["nodes"], json!([]));
        assert!(body["error"].as_str().unwrap().contains("HTTP 500"));
    }
}
