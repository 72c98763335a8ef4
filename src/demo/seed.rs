//! Seed snapshot the demo session starts from.

use crate::graph::{GraphStatus, NodeKind, OrgEdge, OrgNode};

use super::{Conflict, ConflictStatus, DemoState, TimelineItem, LAUNCH_DATE_CONFLICT};

const SEEDED_TIME: &str = "09:00";

fn edge(id: &str, source: &str, target: &str, status: GraphStatus) -> OrgEdge {
    OrgEdge {
        id: id.to_string(),
        source: source.to_string(),
        target: target.to_string(),
        status,
        weight: None,
    }
}

fn item(text: &str) -> TimelineItem {
    TimelineItem {
        time: SEEDED_TIME.to_string(),
        text: text.to_string(),
    }
}

impl DemoState {
    /// The organizational memory snapshot the console boots with.
    pub fn seeded() -> Self {
        Self {
            alignment: 98,
            meeting_applied: false,
            graph_state: "Awaiting events".to_string(),
            conflicts: vec![Conflict {
                id: LAUNCH_DATE_CONFLICT.to_string(),
                title: "Launch date mismatch".to_string(),
                detail: "Product says May 10; Go-to-market plan says May 24.".to_string(),
                impacted: vec![
                    "Decision: Launch Date".to_string(),
                    "Team: Marketing".to_string(),
                    "Team: Product".to_string(),
                ],
                status: ConflictStatus::Open,
            }],
            nodes: vec![
                OrgNode {
                    id: "product".to_string(),
                    label: "Product".to_string(),
                    kind: NodeKind::Team,
                    x: 170,
                    y: 110,
                    latest: "Launch prep in progress".to_string(),
                    owner: "Priya (PM)".to_string(),
                    deps: "Depends on campaign lock + legal review".to_string(),
                    status: GraphStatus::Aligned,
                },
                OrgNode {
                    id: "marketing".to_string(),
                    label: "Marketing".to_string(),
                    kind: NodeKind::Team,
                    x: 520,
                    y: 120,
                    latest: "Campaign copy draft complete".to_string(),
                    owner: "Sarah (Lead)".to_string(),
                    deps: "Depends on final launch date".to_string(),
                    status: GraphStatus::Aligned,
                },
                OrgNode {
                    id: "launch_date".to_string(),
                    label: "Launch Date".to_string(),
                    kind: NodeKind::Decision,
                    x: 350,
                    y: 240,
                    latest: "Conflicting date references detected".to_string(),
                    owner: "AI Chief of Staff".to_string(),
                    deps: "Linked to Product roadmap + GTM timeline".to_string(),
                    status: GraphStatus::Conflict,
                },
                OrgNode {
                    id: "exec".to_string(),
                    label: "Founder".to_string(),
                    kind: NodeKind::Stakeholder,
                    x: 350,
                    y: 370,
                    latest: "Awaiting aligned launch recommendation".to_string(),
                    owner: "Amina".to_string(),
                    deps: "Needs approved single source of truth".to_string(),
                    status: GraphStatus::Pending,
                },
            ],
            edges: vec![
                edge("e1", "product", "launch_date", GraphStatus::Aligned),
                edge("e2", "marketing", "launch_date", GraphStatus::Conflict),
                edge("e3", "launch_date", "exec", GraphStatus::Pending),
            ],
            activity: vec![
                item("System initialized with current organizational memory snapshot."),
                item("Detected contradictory launch dates from Product and Marketing artifacts."),
            ],
            timeline: vec![item("v1.12 Truth state synced from workspace docs.")],
        }
    }
}
