//! Star-shaped contact network.
//!
//! One central node stands for the export owner; every aggregated entity
//! (company, position, ...) whose count reaches the cutoff becomes a leaf
//! linked to it.  Leaves carry a weight for sizing and the set of sub-labels
//! (e.g. positions within a company) shown on hover.

use std::collections::{BTreeSet, HashMap, HashSet};

use insights_core::models::{AggregationRow, ContactField, ContactRecord};
use petgraph::graph::{NodeIndex, UnGraph};
use serde::Serialize;
use tracing::{debug, warn};

use crate::cleaner::truncate_chars;

/// Label of the central node.
pub const SELF_LABEL: &str = "you";

/// Longest entity label used as node identity.
pub const MAX_LABEL_CHARS: usize = 50;

const LINEAR_SCALE: f64 = 1.7;
const LOG_SCALE: f64 = 7.0;

// ── Nodes ─────────────────────────────────────────────────────────────────────

/// A leaf of the star.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct EntityNode {
    /// Node identity: the key truncated to [`MAX_LABEL_CHARS`], suffixed on collision.
    pub label: String,
    /// The untruncated aggregation key.
    pub key: String,
    pub count: u32,
    pub weight: f64,
    pub tooltip_labels: BTreeSet<String>,
    /// Hover text, filled in from [`EntityNode::hover_text`] once the label is final.
    pub title: String,
}

impl EntityNode {
    /// `"{label} - {count} connections"` followed by one sub-label per line.
    pub fn hover_text(&self) -> String {
        let mut text = format!("{} - {} connections\n", self.label, self.count);
        for label in &self.tooltip_labels {
            text.push_str(label);
            text.push('\n');
        }
        text
    }
}

#[derive(Debug, Clone, PartialEq)]
pub enum ContactNode {
    Me,
    Entity(EntityNode),
}

/// Node size for an aggregated count.
///
/// Linear: `count * 1.7`.  Log scale: `ln(count) * 7`.
pub fn node_weight(count: u32, log_scale: bool) -> f64 {
    let count = f64::from(count);
    if log_scale {
        count.ln() * LOG_SCALE
    } else {
        count * LINEAR_SCALE
    }
}

// ── ContactGraph ──────────────────────────────────────────────────────────────

/// Undirected star graph over [`ContactNode`]s.
#[derive(Debug, Clone)]
pub struct ContactGraph {
    graph: UnGraph<ContactNode, ()>,
    center: NodeIndex,
    labels: HashMap<String, NodeIndex>,
}

impl Default for ContactGraph {
    fn default() -> Self {
        Self::new()
    }
}

impl ContactGraph {
    /// A graph holding only the central node.
    pub fn new() -> Self {
        let mut graph = UnGraph::new_undirected();
        let center = graph.add_node(ContactNode::Me);
        let mut labels = HashMap::new();
        labels.insert(SELF_LABEL.to_string(), center);
        Self {
            graph,
            center,
            labels,
        }
    }

    /// Attach `node` to the center.  Its label is made unique first.
    fn add_entity(&mut self, mut node: EntityNode) -> NodeIndex {
        node.label = self.unique_label(&node.key);
        node.title = node.hover_text();
        let label = node.label.clone();
        let idx = self.graph.add_node(ContactNode::Entity(node));
        self.graph.add_edge(self.center, idx, ());
        self.labels.insert(label, idx);
        idx
    }

    /// Truncated key, or `"{truncated} (n)"` if that label is already taken.
    fn unique_label(&self, key: &str) -> String {
        let base = truncate_chars(key, MAX_LABEL_CHARS);
        if !self.labels.contains_key(&base) {
            return base;
        }

        let mut n = 2usize;
        loop {
            let suffix = format!(" ({})", n);
            let room = MAX_LABEL_CHARS.saturating_sub(suffix.chars().count());
            let candidate = format!("{}{}", truncate_chars(key, room), suffix);
            if !self.labels.contains_key(&candidate) {
                warn!("Node label {:?} collides after truncation, using {:?}", base, candidate);
                return candidate;
            }
            n += 1;
        }
    }

    pub fn node_count(&self) -> usize {
        self.graph.node_count()
    }

    pub fn edge_count(&self) -> usize {
        self.graph.edge_count()
    }

    /// Number of leaves (everything except the center).
    pub fn entity_count(&self) -> usize {
        self.graph.node_count() - 1
    }

    /// Leaves in insertion order (aggregation order).
    pub fn entities(&self) -> impl Iterator<Item = &EntityNode> {
        self.graph
            .node_indices()
            .filter_map(move |idx| match &self.graph[idx] {
                ContactNode::Entity(e) => Some(e),
                ContactNode::Me => None,
            })
    }

    /// Look up a leaf by its node label.
    pub fn entity(&self, label: &str) -> Option<&EntityNode> {
        let idx = self.labels.get(label)?;
        match self.graph.node_weight(*idx)? {
            ContactNode::Entity(e) => Some(e),
            ContactNode::Me => None,
        }
    }

    /// True when every edge touches the center and every leaf has exactly one edge.
    pub fn is_star(&self) -> bool {
        let edges_ok = self
            .graph
            .edge_indices()
            .filter_map(|e| self.graph.edge_endpoints(e))
            .all(|(a, b)| (a == self.center) != (b == self.center));
        let leaves_ok = self
            .graph
            .node_indices()
            .filter(|&n| n != self.center)
            .all(|n| self.graph.neighbors(n).count() == 1);
        edges_ok && leaves_ok
    }

    /// Serializable form for the rendering collaborator.
    pub fn to_view(&self) -> GraphView {
        let nodes: Vec<EntityNode> = self.entities().cloned().collect();
        let edges = nodes
            .iter()
            .map(|n| GraphEdge {
                source: SELF_LABEL.to_string(),
                target: n.label.clone(),
            })
            .collect();
        GraphView {
            center: SELF_LABEL.to_string(),
            nodes,
            edges,
        }
    }
}

/// Flat, serializable star graph.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct GraphView {
    pub center: String,
    pub nodes: Vec<EntityNode>,
    pub edges: Vec<GraphEdge>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct GraphEdge {
    pub source: String,
    pub target: String,
}

// ── GraphBuilder ──────────────────────────────────────────────────────────────

/// How to turn an aggregation table into a [`ContactGraph`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct GraphConfig {
    /// Column the aggregation rows were counted over.
    pub group_field: ContactField,
    /// Column collected into each node's tooltip labels.
    pub sub_label_field: ContactField,
    /// Minimum count for a row to become a node.
    pub cutoff: u32,
    pub log_scale: bool,
}

impl GraphConfig {
    /// Companies, annotated with the positions held there.
    pub fn companies(cutoff: u32, log_scale: bool) -> Self {
        Self {
            group_field: ContactField::Company,
            sub_label_field: ContactField::Position,
            cutoff,
            log_scale,
        }
    }

    /// Positions, annotated with the names of the people holding them.
    pub fn positions(cutoff: u32, log_scale: bool) -> Self {
        Self {
            group_field: ContactField::Position,
            sub_label_field: ContactField::Name,
            cutoff,
            log_scale,
        }
    }
}

/// Build the star graph for `rows` (aggregated over `config.group_field`).
///
/// Empty `rows` give a graph with only the center node.
pub fn build_graph(
    records: &[ContactRecord],
    rows: &[AggregationRow],
    config: &GraphConfig,
) -> ContactGraph {
    let included: Vec<&AggregationRow> = rows.iter().filter(|r| r.count >= config.cutoff).collect();
    let keys: HashSet<&str> = included.iter().map(|r| r.key.as_str()).collect();

    let mut tooltips: HashMap<&str, BTreeSet<String>> = HashMap::new();
    for record in records {
        let Some(group) = config.group_field.value(record) else {
            continue;
        };
        if !keys.contains(group) {
            continue;
        }
        if let Some(sub) = config.sub_label_field.value(record).filter(|s| !s.is_empty()) {
            tooltips.entry(group).or_default().insert(sub.to_string());
        }
    }

    let mut graph = ContactGraph::new();
    for row in included {
        graph.add_entity(EntityNode {
            label: String::new(),
            key: row.key.clone(),
            count: row.count,
            weight: node_weight(row.count, config.log_scale),
            tooltip_labels: tooltips.remove(row.key.as_str()).unwrap_or_default(),
            title: String::new(),
        });
    }
    debug_assert!(graph.is_star());

    debug!(
        "Built {} graph: {} of {} rows at cutoff {}",
        config.group_field,
        graph.entity_count(),
        rows.len(),
        config.cutoff
    );
    graph
}

// ── Tests ─────────────────────────────────────────────────────────────────────

#[cfg(test)]
mod tests {
    use super::*;
    use crate::aggregator::Aggregator;
    use chrono::NaiveDate;

    fn record(name: &str, company: &str, position: &str) -> ContactRecord {
        ContactRecord {
            name: name.to_string(),
            company: company.to_string(),
            position: position.to_string(),
            connected_on: NaiveDate::from_ymd_opt(2022, 1, 1).unwrap(),
            email: None,
        }
    }

    fn scenario() -> Vec<ContactRecord> {
        vec![
            record("Ada", "Acme", "Data Scientist"),
            record("Alan", "Acme", "Data Analyst"),
            record("Grace", "Beta", "Data Scientist"),
        ]
    }

    // ── node_weight ───────────────────────────────────────────────────────────

    #[test]
    fn test_weight_linear() {
        assert!((node_weight(10, false) - 17.0).abs() < 1e-9);
    }

    #[test]
    fn test_weight_log() {
        let w = node_weight(100, true);
        assert!((w - 100f64.ln() * 7.0).abs() < 1e-12);
        assert!((w - 32.236).abs() < 1e-3);
    }

    #[test]
    fn test_weight_log_of_one_is_zero() {
        assert_eq!(node_weight(1, true), 0.0);
    }

    // ── build_graph ───────────────────────────────────────────────────────────

    #[test]
    fn test_company_scenario_graph() {
        let records = scenario();
        let rows = Aggregator::by_contact_field(&records, ContactField::Company);
        let graph = build_graph(&records, &rows, &GraphConfig::companies(1, false));

        assert_eq!(graph.node_count(), 3);
        assert_eq!(graph.edge_count(), 2);
        assert!(graph.is_star());

        let acme = graph.entity("Acme").unwrap();
        assert_eq!(acme.count, 2);
        assert!((acme.weight - 3.4).abs() < 1e-9);
        let expected: BTreeSet<String> =
            ["Data Analyst", "Data Scientist"].iter().map(|s| s.to_string()).collect();
        assert_eq!(acme.tooltip_labels, expected);
        assert_eq!(
            graph.entity("Beta").unwrap().tooltip_labels.iter().collect::<Vec<_>>(),
            vec!["Data Scientist"]
        );
    }

    #[test]
    fn test_cutoff_filters_rows() {
        let records = scenario();
        let rows = Aggregator::by_contact_field(&records, ContactField::Company);
        let graph = build_graph(&records, &rows, &GraphConfig::companies(2, false));

        assert_eq!(graph.entity_count(), 1);
        assert_eq!(graph.node_count(), 2);
        assert!(graph.entity("Beta").is_none());
    }

    #[test]
    fn test_entity_count_matches_rows_at_cutoff() {
        let rows = vec![
            AggregationRow::new("a", 9),
            AggregationRow::new("b", 5),
            AggregationRow::new("c", 3),
            AggregationRow::new("d", 2),
            AggregationRow::new("e", 1),
        ];
        for cutoff in 1..=10 {
            let graph = build_graph(&[], &rows, &GraphConfig::companies(cutoff, false));
            let expected = rows.iter().filter(|r| r.count >= cutoff).count();
            assert_eq!(graph.entity_count(), expected, "cutoff {}", cutoff);
            assert_eq!(graph.node_count(), expected + 1);
        }
    }

    #[test]
    fn test_empty_rows_gives_only_center() {
        let graph = build_graph(&scenario(), &[], &GraphConfig::companies(1, false));
        assert_eq!(graph.node_count(), 1);
        assert_eq!(graph.edge_count(), 0);
        assert!(graph.is_star());
        assert!(graph.to_view().nodes.is_empty());
    }

    #[test]
    fn test_position_graph_uses_names() {
        let records = scenario();
        let rows = Aggregator::by_contact_field(&records, ContactField::Position);
        let graph = build_graph(&records, &rows, &GraphConfig::positions(1, true));

        let ds = graph.entity("Data Scientist").unwrap();
        assert_eq!(ds.tooltip_labels.iter().collect::<Vec<_>>(), vec!["Ada", "Grace"]);
        assert!((ds.weight - 2f64.ln() * 7.0).abs() < 1e-12);
    }

    #[test]
    fn test_long_label_truncated_and_tooltips_use_full_key() {
        let long = "A".repeat(60);
        let records = vec![record("Ada", &long, "Engineer")];
        let rows = vec![AggregationRow::new(long.clone(), 1)];
        let graph = build_graph(&records, &rows, &GraphConfig::companies(1, false));

        let node = graph.entities().next().unwrap();
        assert_eq!(node.label.chars().count(), MAX_LABEL_CHARS);
        assert_eq!(node.key, long);
        assert!(node.tooltip_labels.contains("Engineer"));
    }

    #[test]
    fn test_truncation_collision_is_disambiguated() {
        let prefix = "B".repeat(50);
        let first = format!("{}-one", prefix);
        let second = format!("{}-two", prefix);
        let rows = vec![
            AggregationRow::new(first.clone(), 3),
            AggregationRow::new(second.clone(), 2),
        ];
        let graph = build_graph(&[], &rows, &GraphConfig::companies(1, false));

        assert_eq!(graph.entity_count(), 2);
        let labels: Vec<&str> = graph.entities().map(|n| n.label.as_str()).collect();
        assert_eq!(labels[0], prefix);
        assert_eq!(labels[1], format!("{} (2)", "B".repeat(46)));
        assert!(labels.iter().all(|l| l.chars().count() <= MAX_LABEL_CHARS));
        assert_eq!(graph.entity(labels[1]).unwrap().key, second);
    }

    #[test]
    fn test_entity_named_like_center_is_disambiguated() {
        let rows = vec![AggregationRow::new(SELF_LABEL, 4)];
        let graph = build_graph(&[], &rows, &GraphConfig::companies(1, false));
        assert_eq!(graph.node_count(), 2);
        assert_eq!(graph.entities().next().unwrap().label, "you (2)");
    }

    #[test]
    fn test_hover_text() {
        let records = scenario();
        let rows = Aggregator::by_contact_field(&records, ContactField::Company);
        let graph = build_graph(&records, &rows, &GraphConfig::companies(1, false));
        assert_eq!(
            graph.entity("Acme").unwrap().hover_text(),
            "Acme - 2 connections\nData Analyst\nData Scientist\n"
        );
    }

    #[test]
    fn test_title_carries_hover_text_into_view() {
        let records = scenario();
        let rows = Aggregator::by_contact_field(&records, ContactField::Company);
        let view = build_graph(&records, &rows, &GraphConfig::companies(1, false)).to_view();

        assert_eq!(view.nodes[0].title, "Acme - 2 connections\nData Analyst\nData Scientist\n");
        let json = serde_json::to_value(&view).unwrap();
        assert_eq!(json["nodes"][1]["title"], "Beta - 1 connections\nData Scientist\n");
    }

    #[test]
    fn test_title_uses_disambiguated_label() {
        let rows = vec![AggregationRow::new(SELF_LABEL, 4)];
        let graph = build_graph(&[], &rows, &GraphConfig::companies(1, false));
        assert_eq!(graph.entities().next().unwrap().title, "you (2) - 4 connections\n");
    }

    #[test]
    fn test_view_edges_point_at_center() {
        let records = scenario();
        let rows = Aggregator::by_contact_field(&records, ContactField::Company);
        let view = build_graph(&records, &rows, &GraphConfig::companies(1, false)).to_view();

        assert_eq!(view.center, SELF_LABEL);
        assert_eq!(view.nodes.len(), 2);
        assert!(view.edges.iter().all(|e| e.source == SELF_LABEL));
        let targets: Vec<&str> = view.edges.iter().map(|e| e.target.as_str()).collect();
        assert_eq!(targets, vec!["Acme", "Beta"]);
    }
}
