//! HTTP API.
//!
//! - `/api/tasks`, `/api/boards` - passthrough proxy to the backend
//! - `/api/graph/live` - normalized graph views
//! - `/api/demo` - demo conflict engine

mod boards;
mod demo;
mod graph;
mod proxy;
mod routes;
mod tasks;

pub use routes::{router, serve, AppState, HealthResponse};
