//! Neighborhood subgraph around a selected indicator, and the visual
//! attributes of its nodes.

use crate::domains::indicator::types::{Indicator, IndicatorStatus};
use crate::domains::relation::types::Relation;
use crate::types::FlowCategory;
use serde::Serialize;
use std::collections::BTreeSet;

/// Depth of the neighborhood shown around the central indicator.
pub const NEIGHBORHOOD_HOPS: usize = 2;

pub const LINK_COLOR: &str = "#999999";

/// Role of a node in the rendered graph. Checked in declaration order:
/// central wins over primary, primary wins over target status.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum NodeRole {
    Central,
    Primary,
    Below,
    Above,
    Normal,
}

impl NodeRole {
    pub fn of(indicator: &Indicator, central_id: &str) -> Self {
        if indicator.id == central_id {
            NodeRole::Central
        } else if indicator.is_primary {
            NodeRole::Primary
        } else {
            match indicator.status {
                Some(IndicatorStatus::Below) => NodeRole::Below,
                Some(IndicatorStatus::Above) => NodeRole::Above,
                _ => NodeRole::Normal,
            }
        }
    }

    pub fn color(&self) -> &'static str {
        match self {
            NodeRole::Central => "#F57C00",
            NodeRole::Primary => "#4CAF50",
            NodeRole::Below => "#F44336",
            NodeRole::Above => "#2196F3",
            NodeRole::Normal => "#6C63FF",
        }
    }

    pub fn size(&self) -> u8 {
        match self {
            NodeRole::Central => 8,
            NodeRole::Primary => 7,
            NodeRole::Below | NodeRole::Above => 6,
            NodeRole::Normal => 5,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct GraphNode {
    pub id: String,
    pub name: String,
    pub is_primary: bool,
    pub role: NodeRole,
    pub color: &'static str,
    pub size: u8,
}

impl GraphNode {
    fn new(indicator: &Indicator, central_id: &str) -> Self {
        let role = NodeRole::of(indicator, central_id);
        Self {
            id: indicator.id.clone(),
            name: indicator.name.clone(),
            is_primary: indicator.is_primary,
            role,
            color: role.color(),
            size: role.size(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct GraphLink {
    pub source: String,
    pub target: String,
    /// Impact weight of the relation
    pub value: f64,
    pub color: &'static str,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct IndicatorGraph {
    pub central_id: Option<String>,
    pub nodes: Vec<GraphNode>,
    pub links: Vec<GraphLink>,
}

impl IndicatorGraph {
    pub fn node_ids(&self) -> BTreeSet<&str> {
        self.nodes.iter().map(|n| n.id.as_str()).collect()
    }

    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }
}

/// Ids reachable from `central_id` within `hops` steps, following relations in
/// either direction. Each hop expands only from the ids the previous hop added.
pub fn neighborhood_ids(relations: &[&Relation], central_id: &str, hops: usize) -> BTreeSet<String> {
    let mut visited = BTreeSet::new();
    visited.insert(central_id.to_string());
    let mut frontier = vec![central_id.to_string()];

    for _ in 0..hops {
        let mut added = Vec::new();
        for id in &frontier {
            for relation in relations.iter().filter(|r| r.touches(id)) {
                for neighbor in [&relation.source_id, &relation.target_id] {
                    if visited.insert(neighbor.clone()) {
                        added.push(neighbor.clone());
                    }
                }
            }
        }
        if added.is_empty() {
            break;
        }
        frontier = added;
    }

    visited
}

/// Two-hop subgraph of `flow` around `central_id`.
///
/// Ids without a matching indicator of the flow are dropped from the nodes; links
/// are every relation of the flow with both ends in the neighborhood.
pub fn extract_neighborhood(
    indicators: &[Indicator],
    relations: &[Relation],
    central_id: &str,
    flow: FlowCategory,
) -> IndicatorGraph {
    let flow_relations: Vec<&Relation> = relations.iter().filter(|r| r.flow_type == flow).collect();
    let visited = neighborhood_ids(&flow_relations, central_id, NEIGHBORHOOD_HOPS);

    let nodes = indicators
        .iter()
        .filter(|i| i.flow_type == flow && visited.contains(&i.id))
        .map(|i| GraphNode::new(i, central_id))
        .collect();

    let links = flow_relations
        .iter()
        .filter(|r| visited.contains(&r.source_id) && visited.contains(&r.target_id))
        .map(|r| GraphLink {
            source: r.source_id.clone(),
            target: r.target_id.clone(),
            value: r.impact,
            color: LINK_COLOR,
        })
        .collect();

    IndicatorGraph {
        central_id: Some(central_id.to_string()),
        nodes,
        links,
    }
}
