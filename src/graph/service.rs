//! Load a graph view from the backend and normalize it.

use futures::future::join;

use crate::backend::{BackendClient, BackendError, BackendRequest};

use super::normalize::{
    normalize_departments, normalize_employees, normalize_knowledge, BackendDepartmentGraph,
    BackendEmployee, BackendEmployeeEdge, BackendKnowledgeGraph,
};
use super::{GraphSnapshot, GraphView};

fn source_label(base_url: &str, path: &str) -> String {
    format!("backend:{}{}", base_url, path)
}

fn failure_reasons(err: BackendError) -> Vec<String> {
    match err {
        BackendError::NoCandidates => vec![err.to_string()],
        BackendError::Exhausted { failures } => failures,
    }
}

/// Fetch `view` through the fallback client.
///
/// Never fails: when every candidate is exhausted the snapshot is empty and
/// carries the per-candidate reasons.
pub async fn load_view(backend: &BackendClient, view: GraphView) -> GraphSnapshot {
    let snapshot = match view {
        GraphView::Knowledge => load_knowledge(backend).await,
        GraphView::Departments => load_departments(backend).await,
        GraphView::Employees => load_employees(backend).await,
    };

    if snapshot.is_unavailable() {
        tracing::error!("Graph view {} unavailable: {:?}", view, snapshot.errors);
    } else {
        tracing::info!(
            "Loaded {} graph ({} nodes, {} edges) from {}",
            view,
            snapshot.nodes.len(),
            snapshot.edges.len(),
            snapshot.source
        );
    }
    snapshot
}

async fn load_knowledge(backend: &BackendClient) -> GraphSnapshot {
    const PATH: &str = "/api/graph/knowledge";
    match backend
        .fetch_json::<BackendKnowledgeGraph>(&BackendRequest::get(PATH))
        .await
    {
        Ok(located) => {
            let (nodes, edges) = normalize_knowledge(&located.value);
            GraphSnapshot::new(
                GraphView::Knowledge,
                nodes,
                edges,
                source_label(&located.base_url, PATH),
            )
        }
        Err(e) => GraphSnapshot::unavailable(GraphView::Knowledge, failure_reasons(e)),
    }
}

async fn load_departments(backend: &BackendClient) -> GraphSnapshot {
    const PATH: &str = "/api/graph/departments";
    match backend
        .fetch_json::<BackendDepartmentGraph>(&BackendRequest::get(PATH))
        .await
    {
        Ok(located) => {
            let (nodes, edges) = normalize_departments(&located.value);
            GraphSnapshot::new(
                GraphView::Departments,
                nodes,
                edges,
                source_label(&located.base_url, PATH),
            )
        }
        Err(e) => GraphSnapshot::unavailable(GraphView::Departments, failure_reasons(e)),
    }
}

/// Employees and their edges must come from the same backend, so both are
/// requested against one candidate at a time. A candidate that serves the
/// employees but not the edges is only used once every candidate has failed.
async fn load_employees(backend: &BackendClient) -> GraphSnapshot {
    const EMPLOYEES_PATH: &str = "/api/graph/employees";
    const EDGES_PATH: &str = "/api/graph/edges";

    if backend.base_urls().is_empty() {
        return GraphSnapshot::unavailable(
            GraphView::Employees,
            failure_reasons(BackendError::NoCandidates),
        );
    }

    let employees_request = BackendRequest::get(EMPLOYEES_PATH);
    let edges_request = BackendRequest::get(EDGES_PATH);
    let mut failures = Vec::new();
    let mut nodes_only: Option<(&str, Vec<BackendEmployee>)> = None;

    for base_url in backend.base_urls() {
        let (employees, edges) = join(
            backend.fetch_json_at::<Vec<BackendEmployee>>(base_url, &employees_request),
            backend.fetch_json_at::<Vec<BackendEmployeeEdge>>(base_url, &edges_request),
        )
        .await;

        match (employees, edges) {
            (Ok(employees), Ok(edges)) => {
                let (nodes, edges) = normalize_employees(&employees, &edges);
                return GraphSnapshot::new(
                    GraphView::Employees,
                    nodes,
                    edges,
                    source_label(base_url, EMPLOYEES_PATH),
                );
            }
            (Ok(employees), Err(reason)) => {
                failures.push(reason);
                if nodes_only.is_none() {
                    nodes_only = Some((base_url.as_str(), employees));
                }
            }
            (Err(reason), Ok(_)) => failures.push(reason),
            (Err(employee_reason), Err(edge_reason)) => {
                failures.push(employee_reason);
                failures.push(edge_reason);
            }
        }
    }

    match nodes_only {
        Some((base_url, employees)) => {
            tracing::warn!(
                "No backend served employees with edges, rendering nodes from {}",
                base_url
            );
            let (nodes, edges) = normalize_employees(&employees, &[]);
            let mut snapshot = GraphSnapshot::new(
                GraphView::Employees,
                nodes,
                edges,
                source_label(base_url, EMPLOYEES_PATH),
            );
            for reason in failures {
                snapshot.push_error(reason);
            }
            snapshot
        }
        None => GraphSnapshot::unavailable(GraphView::Employees, failures),
    }
}
