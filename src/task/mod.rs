//! Task module - tasks, boards and the checks applied before writes.
//!
//! The backend owns every task and board; these types are the read model the
//! console works with plus the validated write payload.

pub mod item;
mod board;

pub use board::{Board, BoardCard, BoardColumn, BoardDetail, BoardView, CardView, ColumnView};
pub use item::{Task, TaskFilter, TaskPayload, TaskPayloadError, TaskPriority, TaskStatus};
