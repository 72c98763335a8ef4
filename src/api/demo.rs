//! Demo conflict engine endpoints.
//!
//! Every mutating call returns the transition it caused plus the fresh
//! snapshot, so the console can redraw from a single response.

use std::sync::Arc;
use std::time::Instant;

use axum::{
    extract::{Path, Query, State},
    routing::{get, post},
    Json, Router,
};
use serde::{Deserialize, Serialize};

use crate::demo::{stamp, DemoSnapshot, Transition};
use crate::graph::{load_view, GraphSnapshot, GraphView};

use super::graph::GraphQuery;
use super::routes::AppState;

/// Create demo routes.
pub fn routes() -> Router<Arc<AppState>> {
    Router::new()
        .route("/", get(get_demo))
        .route("/meeting", post(simulate_meeting))
        .route("/conflicts/:id/resolve", post(resolve_conflict))
        .route("/query", post(run_query))
        .route("/graph", post(load_graph))
        .route("/reset", post(reset))
}

// ─────────────────────────────────────────────────────────────────────────────
// Request/Response Types
// ─────────────────────────────────────────────────────────────────────────────

#[derive(Debug, Deserialize)]
pub struct QueryRequest {
    #[serde(default)]
    pub command: String,
}

#[derive(Debug, Serialize)]
pub struct DemoActionResponse {
    pub transition: Transition,
    pub state: DemoSnapshot,
    /// The graph load behind a `/graph` call, including its errors
    #[serde(skip_serializing_if = "Option::is_none")]
    pub graph: Option<GraphSnapshot>,
}

fn action(transition: Transition, state: DemoSnapshot) -> Json<DemoActionResponse> {
    Json(DemoActionResponse {
        transition,
        state,
        graph: None,
    })
}

// ─────────────────────────────────────────────────────────────────────────────
// Handlers
// ─────────────────────────────────────────────────────────────────────────────

/// GET /api/demo - Current demo snapshot.
async fn get_demo(State(state): State<Arc<AppState>>) -> Json<DemoSnapshot> {
    Json(state.demo.read().await.snapshot(Instant::now()))
}

/// POST /api/demo/meeting - Simulate the end of a meeting.
async fn simulate_meeting(State(state): State<Arc<AppState>>) -> Json<DemoActionResponse> {
    let now = Instant::now();
    let mut session = state.demo.write().await;
    let transition = session.simulate_meeting(now, &stamp());
    action(transition, session.snapshot(now))
}

/// POST /api/demo/conflicts/:id/resolve - Resolve one conflict.
async fn resolve_conflict(
    State(state): State<Arc<AppState>>,
    Path(id): Path<String>,
) -> Json<DemoActionResponse> {
    let now = Instant::now();
    let mut session = state.demo.write().await;
    let transition = session.resolve_conflict(&id, now, &stamp());
    action(transition, session.snapshot(now))
}

/// POST /api/demo/query - Run a command-bar query.
async fn run_query(
    State(state): State<Arc<AppState>>,
    Json(req): Json<QueryRequest>,
) -> Json<DemoActionResponse> {
    let now = Instant::now();
    let mut session = state.demo.write().await;
    let transition = session.run_query(&req.command, now, &stamp());
    action(transition, session.snapshot(now))
}

/// POST /api/demo/graph?view= - Load a graph view into the demo.
async fn load_graph(
    State(state): State<Arc<AppState>>,
    Query(query): Query<GraphQuery>,
) -> Json<DemoActionResponse> {
    let view = GraphView::from_query(query.view.as_deref());
    // Backend round trips happen outside the lock.
    let graph = load_view(&state.backend, view).await;

    let mut session = state.demo.write().await;
    let transition = session.apply_graph(&graph);
    let snapshot = session.snapshot(Instant::now());
    Json(DemoActionResponse {
        transition,
        state: snapshot,
        graph: Some(graph),
    })
}

/// POST /api/demo/reset - Restore the seed state.
async fn reset(State(state): State<Arc<AppState>>) -> Json<DemoSnapshot> {
    let mut session = state.demo.write().await;
    session.reset();
    Json(session.snapshot(Instant::now()))
}
