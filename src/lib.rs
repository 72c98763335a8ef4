//! # Org Console
//!
//! Backend service for an organizational intelligence console: it visualizes
//! the company knowledge graph, surfaces conflicting decisions, and fronts the
//! task and board backend.
//!
//! ## Architecture
//!
//! ```text
//!   browser ──HTTP/JSON──▶ api (axum)
//!                            │ tasks / boards  → passthrough proxy
//!                            │ graph           → normalized views
//!                            │ demo            → in-memory conflict engine
//!                            ▼
//!                    ┌──────────────────┐
//!                    │  BackendClient   │  BACKEND_URL → deployed → local
//!                    └────────┬─────────┘
//!                             ▼
//!                      org graph + tasks backend
//! ```
//!
//! ## Modules
//! - `api`: HTTP routes and server lifecycle
//! - `backend`: Multi-backend fallback fetch
//! - `config`: Environment configuration
//! - `demo`: Demo state machine (meeting, resolve, query)
//! - `graph`: Graph view normalization and layout
//! - `task`: Task and board types

pub mod api;
pub mod backend;
pub mod config;
pub mod demo;
pub mod graph;
pub mod task;

pub use backend::{BackendClient, BackendError};
pub use config::Config;
pub use demo::{DemoSession, DemoState};
pub use graph::{GraphSnapshot, GraphView};
