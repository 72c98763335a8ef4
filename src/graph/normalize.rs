//! Pure mapping from backend graph payloads to [`OrgNode`]/[`OrgEdge`].
//!
//! No IO here; the same payload always yields the same positions and edge ids.

use std::collections::hash_map::Entry;
use std::collections::{HashMap, HashSet};
use std::f64::consts::{FRAC_PI_2, TAU};

use serde::{Deserialize, Deserializer};

use super::{GraphStatus, NodeKind, OrgEdge, OrgNode};

/// Weight assumed for edges the backend sends without one.
pub const DEFAULT_EDGE_WEIGHT: f64 = 1.0;

pub const KNOWLEDGE_EDGE_CAP: usize = 80;
pub const DEPARTMENT_EDGE_CAP: usize = 80;
pub const EMPLOYEE_EDGE_CAP: usize = 160;

// Knowledge view: two blocks of fixed-height columns.
const KNOWLEDGE_ROW_CAPACITY: usize = 10;
const KNOWLEDGE_TOP: i32 = 60;
const KNOWLEDGE_ROW_GAP: i32 = 36;
const KNOWLEDGE_COLUMN_GAP: i32 = 120;
const EMPLOYEE_BLOCK_X: i32 = 140;
const TOPIC_BLOCK_X: i32 = 560;

// Departments view: one ring.
const RING_CENTER_X: f64 = 350.0;
const RING_CENTER_Y: f64 = 240.0;
const RING_BASE_RADIUS: f64 = 90.0;
const RING_RADIUS_PER_NODE: f64 = 18.0;
const RING_MAX_RADIUS: f64 = 220.0;

// Employees view: one column per team.
const TEAM_ORIGIN_X: i32 = 110;
const TEAM_COLUMN_GAP: i32 = 150;
const TEAM_TOP: i32 = 60;
const TEAM_ROW_GAP: i32 = 40;

/// Teams that always lead the employees view, in this order.
pub const PREFERRED_TEAM_ORDER: [&str; 6] =
    ["Exec", "Engineering", "Product", "Growth", "Revenue", "People"];

const UNASSIGNED_TEAM: &str = "Unassigned";

/// Accept ids sent either as JSON strings or numbers.
fn flexible_id<'de, D>(deserializer: D) -> Result<String, D::Error>
where
    D: Deserializer<'de>,
{
    #[derive(Deserialize)]
    #[serde(untagged)]
    enum Id {
        Text(String),
        Int(i64),
        Float(f64),
    }

    Ok(match Id::deserialize(deserializer)? {
        Id::Text(s) => s,
        Id::Int(n) => n.to_string(),
        Id::Float(n) => n.to_string(),
    })
}

/// Edge as the knowledge and departments endpoints send it.
#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct RawEdge {
    #[serde(deserialize_with = "flexible_id")]
    pub source: String,
    #[serde(deserialize_with = "flexible_id")]
    pub target: String,
    #[serde(default)]
    pub weight: Option<f64>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct BackendKnowledgeNode {
    #[serde(deserialize_with = "flexible_id")]
    pub id: String,
    /// "employee" or "topic"
    #[serde(rename = "type", default)]
    pub kind: String,
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub role: Option<String>,
}

/// Payload of `/api/graph/knowledge`.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct BackendKnowledgeGraph {
    #[serde(default)]
    pub nodes: Vec<BackendKnowledgeNode>,
    #[serde(default)]
    pub edges: Vec<RawEdge>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct BackendDepartmentNode {
    #[serde(deserialize_with = "flexible_id")]
    pub id: String,
    #[serde(default)]
    pub label: Option<String>,
}

/// Payload of `/api/graph/departments`.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct BackendDepartmentGraph {
    #[serde(default)]
    pub nodes: Vec<BackendDepartmentNode>,
    #[serde(default)]
    pub edges: Vec<RawEdge>,
}

/// One entry of `/api/graph/employees`.
#[derive(Debug, Clone, Deserialize)]
pub struct BackendEmployee {
    pub id: i64,
    #[serde(default)]
    pub full_name: String,
    #[serde(default)]
    pub role: String,
    #[serde(default)]
    pub team: Option<String>,
}

/// One entry of `/api/graph/edges`.
#[derive(Debug, Clone, Deserialize)]
pub struct BackendEmployeeEdge {
    #[serde(alias = "from")]
    pub from_employee_id: i64,
    #[serde(alias = "to")]
    pub to_employee_id: i64,
    #[serde(default)]
    pub weight: Option<f64>,
}

/// One edge per `(source, target)` pair after aggregation.
#[derive(Debug, Clone, PartialEq)]
pub struct AggregatedEdge {
    pub source: String,
    pub target: String,
    pub weight: f64,
}

/// Merge duplicate pairs, rank by weight and keep the top `cap`.
///
/// Edges touching an id outside `known` are dropped first. Weights of
/// duplicate pairs are summed (missing weight counts as
/// [`DEFAULT_EDGE_WEIGHT`]). The sort is stable, so equal weights keep the
/// order in which their pair was first seen.
pub fn aggregate_edges<I>(edges: I, known: &HashSet<String>, cap: usize) -> Vec<AggregatedEdge>
where
    I: IntoIterator<Item = RawEdge>,
{
    let mut index: HashMap<(String, String), usize> = HashMap::new();
    let mut merged: Vec<AggregatedEdge> = Vec::new();

    for edge in edges {
        if !known.contains(&edge.source) || !known.contains(&edge.target) {
            continue;
        }
        let weight = edge.weight.unwrap_or(DEFAULT_EDGE_WEIGHT);
        match index.entry((edge.source.clone(), edge.target.clone())) {
            Entry::Occupied(slot) => merged[*slot.get()].weight += weight,
            Entry::Vacant(slot) => {
                slot.insert(merged.len());
                merged.push(AggregatedEdge {
                    source: edge.source,
                    target: edge.target,
                    weight,
                });
            }
        }
    }

    merged.sort_by(|a, b| b.weight.total_cmp(&a.weight));
    merged.truncate(cap);
    merged
}

fn node_ids(nodes: &[OrgNode]) -> HashSet<String> {
    nodes.iter().map(|n| n.id.clone()).collect()
}

fn aligned_edge(id: String, edge: AggregatedEdge) -> OrgEdge {
    OrgEdge {
        id,
        source: edge.source,
        target: edge.target,
        status: GraphStatus::Aligned,
        weight: Some(edge.weight),
    }
}

/// Column-major slot in a block of fixed-height columns.
fn block_position(index: usize, origin_x: i32) -> (i32, i32) {
    let column = (index / KNOWLEDGE_ROW_CAPACITY) as i32;
    let row = (index % KNOWLEDGE_ROW_CAPACITY) as i32;
    (
        origin_x + column * KNOWLEDGE_COLUMN_GAP,
        KNOWLEDGE_TOP + row * KNOWLEDGE_ROW_GAP,
    )
}

fn ring_radius(count: usize) -> f64 {
    (RING_BASE_RADIUS + RING_RADIUS_PER_NODE * count as f64).min(RING_MAX_RADIUS)
}

/// Even spacing around the ring, first node at 12 o'clock.
fn ring_position(index: usize, count: usize) -> (i32, i32) {
    let radius = ring_radius(count);
    let angle = -FRAC_PI_2 + TAU * index as f64 / count.max(1) as f64;
    (
        (RING_CENTER_X + radius * angle.cos()).round() as i32,
        (RING_CENTER_Y + radius * angle.sin()).round() as i32,
    )
}

fn display_name(name: &str, fallback: &str) -> String {
    let trimmed = name.trim();
    if trimmed.is_empty() {
        fallback.to_string()
    } else {
        trimmed.to_string()
    }
}

/// Employees on the left, topics on the right.
pub fn normalize_knowledge(payload: &BackendKnowledgeGraph) -> (Vec<OrgNode>, Vec<OrgEdge>) {
    let mut seen = HashSet::new();
    let mut employees = Vec::new();
    let mut topics = Vec::new();

    for node in &payload.nodes {
        if !seen.insert(node.id.as_str()) {
            continue;
        }
        match node.kind.as_str() {
            "employee" => employees.push(node),
            "topic" => topics.push(node),
            other => tracing::debug!("Skipping knowledge node {} of type {:?}", node.id, other),
        }
    }

    let mut nodes = Vec::with_capacity(employees.len() + topics.len());
    for (index, node) in employees.iter().enumerate() {
        let (x, y) = block_position(index, EMPLOYEE_BLOCK_X);
        let label = display_name(&node.name, &node.id);
        nodes.push(OrgNode {
            id: node.id.clone(),
            label: label.clone(),
            kind: NodeKind::Stakeholder,
            x,
            y,
            latest: format!(
                "Role: {}",
                node.role.as_deref().filter(|r| !r.is_empty()).unwrap_or("Unknown")
            ),
            owner: label,
            deps: "Sourced from backend employee graph.".to_string(),
            status: GraphStatus::Aligned,
        });
    }
    for (index, node) in topics.iter().enumerate() {
        let (x, y) = block_position(index, TOPIC_BLOCK_X);
        nodes.push(OrgNode {
            id: node.id.clone(),
            label: display_name(&node.name, &node.id),
            kind: NodeKind::Decision,
            x,
            y,
            latest: "Knowledge topic extracted from communication edges.".to_string(),
            owner: "Org Graph API".to_string(),
            deps: "Derived from communication edge topics.".to_string(),
            status: GraphStatus::Aligned,
        });
    }

    let known = node_ids(&nodes);
    let edges = aggregate_edges(payload.edges.iter().cloned(), &known, KNOWLEDGE_EDGE_CAP)
        .into_iter()
        .enumerate()
        .map(|(i, edge)| aligned_edge(format!("kg-edge-{}", i + 1), edge))
        .collect();

    (nodes, edges)
}

/// Departments evenly spaced on a ring that grows with the department count.
pub fn normalize_departments(payload: &BackendDepartmentGraph) -> (Vec<OrgNode>, Vec<OrgEdge>) {
    let mut seen = HashSet::new();
    let departments: Vec<&BackendDepartmentNode> = payload
        .nodes
        .iter()
        .filter(|n| seen.insert(n.id.as_str()))
        .collect();

    let count = departments.len();
    let nodes: Vec<OrgNode> = departments
        .iter()
        .enumerate()
        .map(|(index, node)| {
            let (x, y) = ring_position(index, count);
            let label = display_name(node.label.as_deref().unwrap_or(""), &node.id);
            OrgNode {
                id: node.id.clone(),
                label: label.clone(),
                kind: NodeKind::Team,
                x,
                y,
                latest: "Department aggregated from employee roles.".to_string(),
                owner: label,
                deps: "Weighted by communication between departments.".to_string(),
                status: GraphStatus::Aligned,
            }
        })
        .collect();

    let known = node_ids(&nodes);
    let edges = aggregate_edges(payload.edges.iter().cloned(), &known, DEPARTMENT_EDGE_CAP)
        .into_iter()
        .enumerate()
        .map(|(i, edge)| aligned_edge(format!("dept-edge-{}", i + 1), edge))
        .collect();

    (nodes, edges)
}

pub fn employee_node_id(id: i64) -> String {
    format!("emp::{}", id)
}

fn team_of(employee: &BackendEmployee) -> &str {
    employee
        .team
        .as_deref()
        .map(str::trim)
        .filter(|t| !t.is_empty())
        .unwrap_or(UNASSIGNED_TEAM)
}

/// Team columns: preferred teams first, then the rest in discovery order.
fn order_teams<'a>(employees: &[&'a BackendEmployee]) -> Vec<(&'a str, Vec<&'a BackendEmployee>)> {
    let mut discovered: Vec<(&'a str, Vec<&'a BackendEmployee>)> = Vec::new();
    for &employee in employees {
        let team = team_of(employee);
        match discovered.iter_mut().find(|(name, _)| *name == team) {
            Some((_, members)) => members.push(employee),
            None => discovered.push((team, vec![employee])),
        }
    }

    let mut ordered = Vec::with_capacity(discovered.len());
    for preferred in PREFERRED_TEAM_ORDER {
        if let Some(pos) = discovered.iter().position(|(name, _)| *name == preferred) {
            ordered.push(discovered.remove(pos));
        }
    }
    ordered.extend(discovered);
    ordered
}

/// Employees in team columns, joined by their communication edges.
pub fn normalize_employees(
    employees: &[BackendEmployee],
    edges: &[BackendEmployeeEdge],
) -> (Vec<OrgNode>, Vec<OrgEdge>) {
    let mut seen = HashSet::new();
    let unique: Vec<&BackendEmployee> = employees.iter().filter(|e| seen.insert(e.id)).collect();

    let mut nodes = Vec::with_capacity(unique.len());
    for (column, (team, members)) in order_teams(&unique).into_iter().enumerate() {
        for (row, employee) in members.into_iter().enumerate() {
            let label = display_name(&employee.full_name, &format!("Employee #{}", employee.id));
            let role = if employee.role.trim().is_empty() {
                "Unknown"
            } else {
                employee.role.trim()
            };
            nodes.push(OrgNode {
                id: employee_node_id(employee.id),
                label: label.clone(),
                kind: NodeKind::Stakeholder,
                x: TEAM_ORIGIN_X + column as i32 * TEAM_COLUMN_GAP,
                y: TEAM_TOP + row as i32 * TEAM_ROW_GAP,
                latest: format!("Role: {}", role),
                owner: label,
                deps: format!("Team: {}", team),
                status: GraphStatus::Aligned,
            });
        }
    }

    let known = node_ids(&nodes);
    let raw = edges.iter().map(|e| RawEdge {
        source: employee_node_id(e.from_employee_id),
        target: employee_node_id(e.to_employee_id),
        weight: e.weight,
    });
    let edges = aggregate_edges(raw, &known, EMPLOYEE_EDGE_CAP)
        .into_iter()
        .map(|edge| aligned_edge(format!("{}=>{}", edge.source, edge.target), edge))
        .collect();

    (nodes, edges)
}
