//! Demo conflict engine behind the console's buttons.
//!
//! Three user actions drive it:
//! - "Simulate meeting ended" ingests a meeting once and flags the launch-date conflict
//! - "Resolve" closes a conflict and propagates the aligned state to the graph
//! - "Run query" answers the daily-diff question or echoes the command
//!
//! Each action also raises a transient pulse (used for animation) that
//! reverts to idle on its own.

mod seed;

use std::time::{Duration, Instant};

use serde::{Deserialize, Serialize};

use crate::graph::{GraphSnapshot, GraphStatus, OrgEdge, OrgNode};

/// Feed items exposed per list in a snapshot.
pub const MAX_FEED_ITEMS: usize = 8;

/// How long a pulse stays visible.
pub const PULSE_DURATION: Duration = Duration::from_millis(900);

pub const LAUNCH_DATE_CONFLICT: &str = "launch-date-conflict";

const LAUNCH_DATE_NODE: &str = "launch_date";
const EXEC_NODE: &str = "exec";
const MARKETING_EDGE: &str = "e2";
const EXEC_EDGE: &str = "e3";

const DAILY_DIFF_PHRASE: &str = "what changed today";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Pulse {
    Idle,
    Meeting,
    Resolve,
    Query,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ConflictStatus {
    Open,
    Resolved,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Conflict {
    pub id: String,
    pub title: String,
    pub detail: String,
    pub impacted: Vec<String>,
    pub status: ConflictStatus,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TimelineItem {
    /// HH:MM
    pub time: String,
    pub text: String,
}

/// Full demo state. Activity and timeline are newest first.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DemoState {
    pub alignment: u8,
    pub meeting_applied: bool,
    pub conflicts: Vec<Conflict>,
    pub nodes: Vec<OrgNode>,
    pub edges: Vec<OrgEdge>,
    pub activity: Vec<TimelineItem>,
    pub timeline: Vec<TimelineItem>,
    pub graph_state: String,
}

/// What an action did to the state.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Transition {
    Applied,
    /// Logged but otherwise left the state alone
    Ignored,
    Unchanged,
}

/// Current local time as the feed shows it.
pub fn stamp() -> String {
    chrono::Local::now().format("%H:%M").to_string()
}

impl DemoState {
    fn add_activity(&mut self, time: &str, text: impl Into<String>) {
        self.activity.insert(
            0,
            TimelineItem {
                time: time.to_string(),
                text: text.into(),
            },
        );
    }

    fn add_timeline(&mut self, time: &str, text: impl Into<String>) {
        self.timeline.insert(
            0,
            TimelineItem {
                time: time.to_string(),
                text: text.into(),
            },
        );
    }

    fn node_mut(&mut self, id: &str) -> Option<&mut OrgNode> {
        self.nodes.iter_mut().find(|n| n.id == id)
    }

    fn set_edge_status(&mut self, id: &str, status: GraphStatus) {
        if let Some(edge) = self.edges.iter_mut().find(|e| e.id == id) {
            edge.status = status;
        }
    }

    pub fn conflict(&self, id: &str) -> Option<&Conflict> {
        self.conflicts.iter().find(|c| c.id == id)
    }

    pub fn open_conflicts(&self) -> usize {
        self.conflicts
            .iter()
            .filter(|c| c.status == ConflictStatus::Open)
            .count()
    }

    /// Ingest the meeting transcript. Replays only log that they were ignored.
    pub fn simulate_meeting(&mut self, time: &str) -> Transition {
        self.alignment = 96;
        self.graph_state = "Meeting event ingested".to_string();

        if self.meeting_applied {
            self.add_activity(
                time,
                "Meeting replay ignored; current state already reflects latest notes.",
            );
            return Transition::Ignored;
        }

        self.meeting_applied = true;
        if let Some(conflict) = self
            .conflicts
            .iter_mut()
            .find(|c| c.id == LAUNCH_DATE_CONFLICT)
        {
            conflict.status = ConflictStatus::Open;
        }
        if let Some(node) = self.node_mut(LAUNCH_DATE_NODE) {
            node.status = GraphStatus::Conflict;
            node.latest = "Meeting notes mention May 24; prior doc still says May 10".to_string();
        }
        if let Some(node) = self.node_mut(EXEC_NODE) {
            node.status = GraphStatus::Pending;
        }
        self.set_edge_status(MARKETING_EDGE, GraphStatus::Conflict);
        self.set_edge_status(EXEC_EDGE, GraphStatus::Pending);

        self.add_activity(time, "Ingested meeting transcript from Product weekly sync.");
        self.add_activity(
            time,
            "Detected contradiction in launch date references across team artifacts.",
        );
        self.add_timeline(time, "v1.13 Candidate update created from meeting transcript.");
        Transition::Applied
    }

    /// Resolve an open conflict; anything else is left untouched.
    pub fn resolve_conflict(&mut self, conflict_id: &str, time: &str) -> Transition {
        match self.conflicts.iter_mut().find(|c| c.id == conflict_id) {
            Some(conflict) if conflict.status == ConflictStatus::Open => {
                conflict.status = ConflictStatus::Resolved;
            }
            _ => return Transition::Unchanged,
        }

        self.alignment = 100;
        self.graph_state = "Conflict resolved and truth propagated".to_string();
        if let Some(node) = self.node_mut(LAUNCH_DATE_NODE) {
            node.status = GraphStatus::Aligned;
            node.latest = "Single launch date locked: May 24".to_string();
            node.deps = "All downstream plans synced".to_string();
        }
        if let Some(node) = self.node_mut(EXEC_NODE) {
            node.status = GraphStatus::Aligned;
            node.latest = "Aligned launch brief generated".to_string();
        }
        self.set_edge_status(MARKETING_EDGE, GraphStatus::Aligned);
        self.set_edge_status(EXEC_EDGE, GraphStatus::Aligned);

        self.add_activity(
            time,
            "Resolved launch date conflict, chose May 24 based on latest approved roadmap.",
        );
        self.add_activity(
            time,
            "Routed update to Sarah (Marketing), Priya (Product), and Founder briefing channel.",
        );
        self.add_timeline(time, "v1.13 Launch date conflict resolved and versioned.");
        Transition::Applied
    }

    /// Answer a command-bar query. Blank commands do nothing.
    pub fn run_query(&mut self, command: &str, time: &str) -> Transition {
        let trimmed = command.trim();
        if trimmed.is_empty() {
            return Transition::Unchanged;
        }

        if trimmed.to_lowercase().contains(DAILY_DIFF_PHRASE) {
            let open = self.open_conflicts();
            self.add_activity(
                time,
                format!(
                    "Responded to founder query: {} conflict{} detected, stakeholder routing pending.",
                    open,
                    if open == 1 { "" } else { "s" }
                ),
            );
            self.add_timeline(time, "Query served: daily organizational diff.");
        } else {
            self.add_activity(
                time,
                format!(
                    "Interpreted command: \"{}\" (daily diff queries are supported best).",
                    trimmed
                ),
            );
        }
        Transition::Applied
    }

    /// Swap in a freshly loaded graph, or keep the current one if it came back empty.
    pub fn apply_graph(&mut self, snapshot: &GraphSnapshot) -> Transition {
        if snapshot.nodes.is_empty() {
            self.graph_state = format!(
                "Backend unavailable for {}; using local fallback graph.",
                snapshot.view
            );
            return Transition::Ignored;
        }

        self.nodes = snapshot.nodes.clone();
        self.edges = snapshot.edges.clone();
        self.graph_state = format!(
            "{} graph ({} nodes, {} edges)",
            snapshot.view,
            snapshot.nodes.len(),
            snapshot.edges.len()
        );
        Transition::Applied
    }
}

/// Read model returned to the console.
#[derive(Debug, Clone, Serialize)]
pub struct DemoSnapshot {
    pub alignment: u8,
    pub meeting_applied: bool,
    pub open_conflicts: usize,
    pub conflicts: Vec<Conflict>,
    pub nodes: Vec<OrgNode>,
    pub edges: Vec<OrgEdge>,
    pub activity: Vec<TimelineItem>,
    pub timeline: Vec<TimelineItem>,
    pub graph_state: String,
    pub pulse: Pulse,
}

/// Demo state plus the pulse clock.
#[derive(Debug, Clone)]
pub struct DemoSession {
    state: DemoState,
    pulse: Option<(Pulse, Instant)>,
}

impl Default for DemoSession {
    fn default() -> Self {
        Self::new()
    }
}

impl DemoSession {
    pub fn new() -> Self {
        Self {
            state: DemoState::seeded(),
            pulse: None,
        }
    }

    pub fn state(&self) -> &DemoState {
        &self.state
    }

    fn trigger(&mut self, pulse: Pulse, now: Instant) {
        self.pulse = Some((pulse, now));
    }

    /// Pulse visible at `now`; idle once [`PULSE_DURATION`] has elapsed.
    pub fn pulse_at(&self, now: Instant) -> Pulse {
        match self.pulse {
            Some((pulse, since)) if now.saturating_duration_since(since) < PULSE_DURATION => pulse,
            _ => Pulse::Idle,
        }
    }

    pub fn simulate_meeting(&mut self, now: Instant, time: &str) -> Transition {
        self.trigger(Pulse::Meeting, now);
        let transition = self.state.simulate_meeting(time);
        tracing::info!("Meeting simulated: {:?}", transition);
        transition
    }

    pub fn resolve_conflict(&mut self, conflict_id: &str, now: Instant, time: &str) -> Transition {
        self.trigger(Pulse::Resolve, now);
        let transition = self.state.resolve_conflict(conflict_id, time);
        tracing::info!("Resolve {}: {:?}", conflict_id, transition);
        transition
    }

    pub fn run_query(&mut self, command: &str, now: Instant, time: &str) -> Transition {
        if command.trim().is_empty() {
            return Transition::Unchanged;
        }
        self.trigger(Pulse::Query, now);
        self.state.run_query(command, time)
    }

    pub fn apply_graph(&mut self, snapshot: &GraphSnapshot) -> Transition {
        self.state.apply_graph(snapshot)
    }

    pub fn reset(&mut self) {
        tracing::info!("Demo session reset to seed state");
        *self = Self::new();
    }

    pub fn snapshot(&self, now: Instant) -> DemoSnapshot {
        let state = &self.state;
        DemoSnapshot {
            alignment: state.alignment,
            meeting_applied: state.meeting_applied,
            open_conflicts: state.open_conflicts(),
            conflicts: state.conflicts.clone(),
            nodes: state.nodes.clone(),
            edges: state.edges.clone(),
            activity: state.activity.iter().take(MAX_FEED_ITEMS).cloned().collect(),
            timeline: state.timeline.iter().take(MAX_FEED_ITEMS).cloned().collect(),
            graph_state: state.graph_state.clone(),
            pulse: self.pulse_at(now),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::graph::{GraphView, NodeKind};

    fn node_status(state: &DemoState, id: &str) -> GraphStatus {
        state.nodes.iter().find(|n| n.id == id).unwrap().status
    }

    fn edge_status(state: &DemoState, id: &str) -> GraphStatus {
        state.edges.iter().find(|e| e.id == id).unwrap().status
    }

    #[test]
    fn test_seed_layout() {
        let state = DemoState::seeded();
        let placed: Vec<(&str, NodeKind, i32, i32)> = state
            .nodes
            .iter()
            .map(|n| (n.id.as_str(), n.kind, n.x, n.y))
            .collect();
        assert_eq!(
            placed,
            vec![
                ("product", NodeKind::Team, 170, 110),
                ("marketing", NodeKind::Team, 520, 120),
                ("launch_date", NodeKind::Decision, 350, 240),
                ("exec", NodeKind::Stakeholder, 350, 370),
            ]
        );
        assert_eq!(node_status(&state, "launch_date"), GraphStatus::Conflict);
        assert_eq!(state.open_conflicts(), 1);
    }

    #[test]
    fn test_meeting_marks_conflict_graph() {
        let mut state = DemoState::seeded();
        let activity_before = state.activity.len();

        assert_eq!(state.simulate_meeting("10:15"), Transition::Applied);
        assert!(state.meeting_applied);
        assert_eq!(state.alignment, 96);
        assert_eq!(
            state.conflict(LAUNCH_DATE_CONFLICT).unwrap().status,
            ConflictStatus::Open
        );
        assert_eq!(node_status(&state, "launch_date"), GraphStatus::Conflict);
        assert_eq!(node_status(&state, "exec"), GraphStatus::Pending);
        assert_eq!(edge_status(&state, "e2"), GraphStatus::Conflict);
        assert_eq!(edge_status(&state, "e3"), GraphStatus::Pending);
        assert_eq!(state.activity.len(), activity_before + 2);
        assert_eq!(state.timeline.len(), 2);
        assert_eq!(state.activity[0].time, "10:15");
    }

    #[test]
    fn test_meeting_twice_only_logs_ignored_replay() {
        let mut state = DemoState::seeded();
        state.simulate_meeting("10:00");
        let after_first = state.clone();

        assert_eq!(state.simulate_meeting("10:01"), Transition::Ignored);
        assert_eq!(state.conflicts, after_first.conflicts);
        assert_eq!(state.nodes, after_first.nodes);
        assert_eq!(state.timeline, after_first.timeline);
        assert_eq!(state.activity.len(), after_first.activity.len() + 1);
        assert!(state.activity[0].text.contains("ignored"));
    }

    #[test]
    fn test_resolve_aligns_graph() {
        let mut state = DemoState::seeded();
        state.simulate_meeting("10:00");

        assert_eq!(
            state.resolve_conflict(LAUNCH_DATE_CONFLICT, "10:05"),
            Transition::Applied
        );
        assert_eq!(state.alignment, 100);
        assert_eq!(state.open_conflicts(), 0);
        assert_eq!(node_status(&state, "launch_date"), GraphStatus::Aligned);
        assert_eq!(node_status(&state, "exec"), GraphStatus::Aligned);
        assert_eq!(edge_status(&state, "e2"), GraphStatus::Aligned);
        assert_eq!(edge_status(&state, "e3"), GraphStatus::Aligned);
        assert_eq!(state.timeline[0].text, "v1.13 Launch date conflict resolved and versioned.");
    }

    #[test]
    fn test_resolve_twice_is_noop() {
        let mut state = DemoState::seeded();
        state.resolve_conflict(LAUNCH_DATE_CONFLICT, "10:05");
        let before = state.clone();

        assert_eq!(
            state.resolve_conflict(LAUNCH_DATE_CONFLICT, "10:07"),
            Transition::Unchanged
        );
        assert_eq!(state, before);
        assert_eq!(state.alignment, 100);
    }

    #[test]
    fn test_resolve_unknown_conflict_is_noop() {
        let mut state = DemoState::seeded();
        let before = state.clone();
        assert_eq!(state.resolve_conflict("nope", "10:00"), Transition::Unchanged);
        assert_eq!(state, before);
    }

    #[test]
    fn test_query_daily_diff() {
        let mut state = DemoState::seeded();
        assert_eq!(
            state.run_query("  What changed TODAY?  ", "11:00"),
            Transition::Applied
        );
        assert!(state.activity[0].text.starts_with("Responded to founder query: 1 conflict detected"));
        assert_eq!(state.timeline[0].text, "Query served: daily organizational diff.");
    }

    #[test]
    fn test_query_generic_and_blank() {
        let mut state = DemoState::seeded();
        let timeline_before = state.timeline.len();

        state.run_query(" Summarize hiring ", "11:00");
        assert_eq!(
            state.activity[0].text,
            "Interpreted command: \"Summarize hiring\" (daily diff queries are supported best)."
        );
        assert_eq!(state.timeline.len(), timeline_before);

        let before = state.clone();
        assert_eq!(state.run_query("   ", "11:01"), Transition::Unchanged);
        assert_eq!(state, before);
    }

    #[test]
    fn test_apply_graph_keeps_last_good_on_empty() {
        let mut state = DemoState::seeded();
        let empty = GraphSnapshot::unavailable(GraphView::Employees, vec!["down".to_string()]);
        assert_eq!(state.apply_graph(&empty), Transition::Ignored);
        assert_eq!(state.nodes.len(), 4);
        assert_eq!(
            state.graph_state,
            "Backend unavailable for employees; using local fallback graph."
        );

        let mut fresh_node = state.nodes[0].clone();
        fresh_node.id = "emp::1".to_string();
        fresh_node.kind = NodeKind::Stakeholder;
        let loaded = GraphSnapshot::new(
            GraphView::Employees,
            vec![fresh_node],
            Vec::new(),
            "backend:test".to_string(),
        );
        assert_eq!(state.apply_graph(&loaded), Transition::Applied);
        assert_eq!(state.nodes.len(), 1);
        assert_eq!(state.graph_state, "employees graph (1 nodes, 0 edges)");
    }

    #[test]
    fn test_pulse_reverts_to_idle() {
        let mut session = DemoSession::new();
        let t0 = Instant::now();
        assert_eq!(session.pulse_at(t0), Pulse::Idle);

        session.simulate_meeting(t0, "10:00");
        assert_eq!(session.pulse_at(t0 + Duration::from_millis(899)), Pulse::Meeting);
        assert_eq!(session.pulse_at(t0 + PULSE_DURATION), Pulse::Idle);

        session.run_query("   ", t0, "10:00");
        assert_eq!(session.pulse_at(t0), Pulse::Meeting);

        session.resolve_conflict("missing", t0, "10:00");
        assert_eq!(session.pulse_at(t0), Pulse::Resolve);
    }

    #[test]
    fn test_snapshot_caps_feeds() {
        let mut session = DemoSession::new();
        let now = Instant::now();
        for i in 0..12 {
            session.run_query(&format!("command {}", i), now, "12:00");
            session.run_query("what changed today", now, "12:00");
        }
        let snapshot = session.snapshot(now);
        assert_eq!(snapshot.activity.len(), MAX_FEED_ITEMS);
        assert_eq!(snapshot.timeline.len(), MAX_FEED_ITEMS);
        assert_eq!(snapshot.pulse, Pulse::Query);
        assert_eq!(snapshot.open_conflicts, 1);

        session.reset();
        assert_eq!(session.state(), &DemoState::seeded());
    }
}
