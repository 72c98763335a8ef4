//! Org graph types and backend graph normalization.
//!
//! The backend serves three differently shaped graphs. Everything here maps
//! them onto one node/edge representation with deterministic layout
//! coordinates, so the renderer never needs per-view logic.

pub mod normalize;
mod service;

pub use normalize::{
    aggregate_edges, normalize_departments, normalize_employees, normalize_knowledge,
    AggregatedEdge, BackendDepartmentGraph, BackendEmployee, BackendEmployeeEdge,
    BackendKnowledgeGraph, RawEdge,
};
pub use service::load_view;

use serde::{Deserialize, Serialize};

/// Node category, derived from backend node type or department.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum NodeKind {
    Team,
    Decision,
    Stakeholder,
}

/// Alignment status shared by nodes and edges.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum GraphStatus {
    Aligned,
    Conflict,
    Pending,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct OrgNode {
    pub id: String,
    pub label: String,
    #[serde(rename = "type")]
    pub kind: NodeKind,
    pub x: i32,
    pub y: i32,
    /// Latest update shown in the context card
    pub latest: String,
    pub owner: String,
    /// Dependency note
    pub deps: String,
    pub status: GraphStatus,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct OrgEdge {
    pub id: String,
    pub source: String,
    pub target: String,
    pub status: GraphStatus,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub weight: Option<f64>,
}

/// Which backend graph to render.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum GraphView {
    #[default]
    Knowledge,
    Departments,
    Employees,
}

impl GraphView {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Knowledge => "knowledge",
            Self::Departments => "departments",
            Self::Employees => "employees",
        }
    }

    /// Parse a `view` query value; anything unrecognized is the knowledge view.
    pub fn from_query(value: Option<&str>) -> Self {
        match value.map(|v| v.trim().to_ascii_lowercase()).as_deref() {
            Some("departments") => Self::Departments,
            Some("employees") => Self::Employees,
            _ => Self::Knowledge,
        }
    }
}

impl std::fmt::Display for GraphView {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A normalized graph ready for rendering.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GraphSnapshot {
    pub nodes: Vec<OrgNode>,
    pub edges: Vec<OrgEdge>,
    pub view: GraphView,
    /// Where the data came from, e.g. `backend:http://127.0.0.1:8000/api/graph/knowledge`
    pub source: String,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub errors: Vec<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
    /// Set only when the view's primary payload could not be fetched at all
    #[serde(skip)]
    exhausted: bool,
}

impl GraphSnapshot {
    pub fn new(view: GraphView, nodes: Vec<OrgNode>, edges: Vec<OrgEdge>, source: String) -> Self {
        Self {
            nodes,
            edges,
            view,
            source,
            errors: Vec::new(),
            error: None,
            exhausted: false,
        }
    }

    /// Empty graph carrying the reasons every candidate failed.
    pub fn unavailable(view: GraphView, errors: Vec<String>) -> Self {
        let error = if errors.is_empty() {
            format!("Graph backend unavailable for {}", view)
        } else {
            format!("All backends failed. {}", errors.join(" | "))
        };
        Self {
            nodes: Vec::new(),
            edges: Vec::new(),
            view,
            source: "none".to_string(),
            errors,
            error: Some(error),
            exhausted: true,
        }
    }

    /// Record a non-fatal failure while keeping whatever was loaded.
    pub fn push_error(&mut self, error: String) {
        self.errors.push(error);
        self.error = Some(self.errors.join(" | "));
    }

    /// True when nothing could be loaded at all.
    ///
    /// A partial load that recorded errors, even one with no nodes, is not
    /// unavailable.
    pub fn is_unavailable(&self) -> bool {
        self.exhausted
    }
}
