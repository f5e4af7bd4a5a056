use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Outcome branch an edge fires on. Absent in the wire format means success.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum EdgeKind {
    #[default]
    Success,
    Error,
    Timeout,
}

impl EdgeKind {
    pub fn as_str(self) -> &'static str {
        match self {
            EdgeKind::Success => "success",
            EdgeKind::Error => "error",
            EdgeKind::Timeout => "timeout",
        }
    }
}

/// One workflow step as emitted by the rule engine's `parse`.
///
/// `id` is the join key between graph, findings and layout output; it is
/// stable for the duration of one analysis pass.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct NodeRef {
    pub id: String,
    #[serde(rename = "type")]
    pub node_type: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub params: Option<BTreeMap<String, serde_json::Value>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub cred: Option<BTreeMap<String, serde_json::Value>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub flags: Option<BTreeMap<String, serde_json::Value>>,
}

impl NodeRef {
    /// Display label: explicit name, else the node type, else the id.
    pub fn label(&self) -> &str {
        match self.name.as_deref() {
            Some(name) if !name.is_empty() => name,
            _ if !self.node_type.is_empty() => &self.node_type,
            _ => &self.id,
        }
    }
}

/// Directed connection between two node ids. May reference ids that are
/// not present in `Graph::nodes`; layout drops such edges instead of
/// failing (see `layout`).
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Edge {
    pub from: String,
    pub to: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub on: Option<EdgeKind>,
}

impl Edge {
    pub fn kind(&self) -> EdgeKind {
        self.on.unwrap_or_default()
    }
}

/// Workflow graph as produced by the external rule engine. Not guaranteed
/// acyclic; disconnected components are legal.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Graph {
    #[serde(default)]
    pub nodes: Vec<NodeRef>,
    #[serde(default)]
    pub edges: Vec<Edge>,
    #[serde(default)]
    pub meta: BTreeMap<String, serde_json::Value>,
}

#[derive(Debug, Error)]
pub enum GraphError {
    #[error("invalid graph JSON: {0}")]
    Json(#[from] serde_json::Error),
    #[error("duplicate node id {0:?}")]
    DuplicateNodeId(String),
    #[error("node with empty id")]
    EmptyNodeId,
}

impl Graph {
    pub fn new() -> Self {
        Self::default()
    }

    /// Deserializes a graph from the rule engine's JSON contract and checks
    /// the id invariant (non-empty, unique within the graph).
    pub fn from_json(input: &str) -> Result<Self, GraphError> {
        let graph: Graph = serde_json::from_str(input)?;
        let mut seen = std::collections::HashSet::with_capacity(graph.nodes.len());
        for node in &graph.nodes {
            if node.id.is_empty() {
                return Err(GraphError::EmptyNodeId);
            }
            if !seen.insert(node.id.as_str()) {
                return Err(GraphError::DuplicateNodeId(node.id.clone()));
            }
        }
        Ok(graph)
    }
}
