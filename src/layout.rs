use std::cmp::Reverse;
use std::collections::{BinaryHeap, HashMap};

use serde::Serialize;
use tracing::debug;

use crate::config::LayoutConfig;
use crate::finding::{Finding, Severity, group_by_node, max_severity};
use crate::graph::{EdgeKind, Graph};

/// Top-left anchor of a node box, in design units.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize)]
pub struct Position {
    pub x: f32,
    pub y: f32,
}

/// One laid-out node, annotated with its findings. Derived per
/// `(graph, findings)` pair and never mutated in place.
#[derive(Debug, Clone, Serialize)]
pub struct PositionedNode {
    pub id: String,
    pub label: String,
    pub node_type: String,
    pub position: Position,
    pub width: f32,
    pub height: f32,
    pub findings: Vec<Finding>,
    pub max_severity: Option<Severity>,
    pub finding_count: usize,
}

/// Stroke attributes for an edge, a pure function of its kind.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct EdgeStroke {
    pub color: &'static str,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub dasharray: Option<&'static str>,
}

pub fn edge_stroke(kind: EdgeKind) -> EdgeStroke {
    match kind {
        EdgeKind::Success => EdgeStroke {
            color: "#94a3b8",
            dasharray: None,
        },
        EdgeKind::Error => EdgeStroke {
            color: "#ef4444",
            dasharray: Some("5,5"),
        },
        EdgeKind::Timeout => EdgeStroke {
            color: "#f97316",
            dasharray: Some("2,4"),
        },
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct StyledEdge {
    /// `edge-{from}-{to}-{k}`, `k` counting duplicates of the same
    /// `(from, to)` pair so parallel edges never collide.
    pub id: String,
    pub from: String,
    pub to: String,
    pub kind: EdgeKind,
    pub stroke: EdgeStroke,
    /// Kind name for non-default edges; success edges stay unlabeled.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub label: Option<&'static str>,
}

#[derive(Debug, Clone, Default, Serialize)]
pub struct Diagram {
    pub nodes: Vec<PositionedNode>,
    pub edges: Vec<StyledEdge>,
}

/// Computes a layered left-to-right layout for the workflow graph and joins
/// per-node findings onto the result.
///
/// All working state is function-local; separate calls share nothing.
/// Cycles are broken during ranking (the feedback edge renders backwards),
/// disconnected nodes land in rank 0, and edges referencing unknown node
/// ids are dropped from both ranking and output with a debug event.
pub fn compute_layout(graph: &Graph, findings: &[Finding], config: &LayoutConfig) -> Diagram {
    if graph.nodes.is_empty() {
        return Diagram::default();
    }

    // Nodes are addressed by declaration index from here on.
    let mut index_of: HashMap<&str, usize> = HashMap::with_capacity(graph.nodes.len());
    for (idx, node) in graph.nodes.iter().enumerate() {
        index_of.insert(node.id.as_str(), idx);
    }

    let mut edges: Vec<(usize, usize)> = Vec::with_capacity(graph.edges.len());
    for edge in &graph.edges {
        match (index_of.get(edge.from.as_str()), index_of.get(edge.to.as_str())) {
            (Some(&from), Some(&to)) => edges.push((from, to)),
            _ => debug!(from = %edge.from, to = %edge.to, "dropping edge to unknown node"),
        }
    }

    let ranks = compute_ranks(graph.nodes.len(), &edges);
    let mut buckets = bucket_by_rank(&ranks);
    order_rank_buckets(&mut buckets, &edges, config.ordering_passes);

    let findings_by_node = group_by_node(findings);

    let mut nodes: Vec<PositionedNode> = graph
        .nodes
        .iter()
        .map(|node| {
            let node_findings: Vec<Finding> = findings_by_node
                .get(node.id.as_str())
                .map(|group| group.iter().map(|f| (*f).clone()).collect())
                .unwrap_or_default();
            PositionedNode {
                id: node.id.clone(),
                label: node.label().to_string(),
                node_type: node.node_type.clone(),
                position: Position::default(),
                width: config.node_width,
                height: config.node_height,
                max_severity: max_severity(&node_findings),
                finding_count: node_findings.len(),
                findings: node_findings,
            }
        })
        .collect();

    for (rank, bucket) in buckets.iter().enumerate() {
        for (slot, &idx) in bucket.iter().enumerate() {
            let center_x = config.margin_x
                + config.node_width / 2.0
                + rank as f32 * (config.node_width + config.rank_spacing);
            let center_y = config.margin_y
                + config.node_height / 2.0
                + slot as f32 * (config.node_height + config.node_spacing);
            // The renderer expects top-left anchored boxes.
            nodes[idx].position = Position {
                x: center_x - config.node_width / 2.0,
                y: center_y - config.node_height / 2.0,
            };
        }
    }

    let mut pair_seen: HashMap<(&str, &str), usize> = HashMap::new();
    let styled_edges: Vec<StyledEdge> = graph
        .edges
        .iter()
        .filter(|edge| {
            index_of.contains_key(edge.from.as_str()) && index_of.contains_key(edge.to.as_str())
        })
        .map(|edge| {
            let dup = pair_seen
                .entry((edge.from.as_str(), edge.to.as_str()))
                .or_insert(0);
            let id = format!("edge-{}-{}-{}", edge.from, edge.to, *dup);
            *dup += 1;
            let kind = edge.kind();
            StyledEdge {
                id,
                from: edge.from.clone(),
                to: edge.to.clone(),
                kind,
                stroke: edge_stroke(kind),
                label: match kind {
                    EdgeKind::Success => None,
                    other => Some(other.as_str()),
                },
            }
        })
        .collect();

    Diagram {
        nodes,
        edges: styled_edges,
    }
}

/// Longest-path ranks from a cycle-tolerant topological order.
///
/// Kahn's algorithm keyed by declaration order; when a cycle leaves no node
/// ready, the earliest-declared remaining node is forced as a source and
/// its unprocessed incoming edges become back-edges. Back-edges do not
/// advance ranks, so termination never depends on acyclicity.
fn compute_ranks(node_count: usize, edges: &[(usize, usize)]) -> Vec<usize> {
    let mut adj: Vec<Vec<usize>> = vec![Vec::new(); node_count];
    let mut indegree: Vec<usize> = vec![0; node_count];
    for &(from, to) in edges {
        adj[from].push(to);
        indegree[to] += 1;
    }

    let mut ready: BinaryHeap<Reverse<usize>> = BinaryHeap::new();
    for (idx, &deg) in indegree.iter().enumerate() {
        if deg == 0 {
            ready.push(Reverse(idx));
        }
    }

    let mut order: Vec<usize> = Vec::with_capacity(node_count);
    let mut processed: Vec<bool> = vec![false; node_count];
    loop {
        while let Some(Reverse(idx)) = ready.pop() {
            if processed[idx] {
                continue;
            }
            processed[idx] = true;
            order.push(idx);
            for &next in &adj[idx] {
                if processed[next] {
                    continue;
                }
                indegree[next] = indegree[next].saturating_sub(1);
                if indegree[next] == 0 {
                    ready.push(Reverse(next));
                }
            }
        }
        if order.len() >= node_count {
            break;
        }
        // Cycle: force the earliest-declared remaining node as a source.
        match processed.iter().position(|done| !done) {
            Some(idx) => ready.push(Reverse(idx)),
            None => break,
        }
    }

    let mut order_index: Vec<usize> = vec![0; node_count];
    for (pos, &idx) in order.iter().enumerate() {
        order_index[idx] = pos;
    }

    let mut ranks: Vec<usize> = vec![0; node_count];
    for &idx in &order {
        for &next in &adj[idx] {
            // Back-edges (earlier in the broken order) keep their rank.
            if order_index[next] > order_index[idx] {
                ranks[next] = ranks[next].max(ranks[idx] + 1);
            }
        }
    }
    ranks
}

fn bucket_by_rank(ranks: &[usize]) -> Vec<Vec<usize>> {
    let max_rank = ranks.iter().copied().max().unwrap_or(0);
    let mut buckets: Vec<Vec<usize>> = vec![Vec::new(); max_rank + 1];
    for (idx, &rank) in ranks.iter().enumerate() {
        buckets[rank].push(idx);
    }
    buckets
}

/// Median-heuristic crossing reduction: alternating down/up sweeps sort
/// each rank bucket by the median slot of its neighbors in the adjacent
/// rank, tie-broken by declaration index for determinism.
fn order_rank_buckets(buckets: &mut [Vec<usize>], edges: &[(usize, usize)], passes: usize) {
    if buckets.len() <= 1 {
        return;
    }
    let node_count: usize = buckets.iter().map(Vec::len).sum();
    let mut incoming: Vec<Vec<usize>> = vec![Vec::new(); node_count];
    let mut outgoing: Vec<Vec<usize>> = vec![Vec::new(); node_count];
    for &(from, to) in edges {
        outgoing[from].push(to);
        incoming[to].push(from);
    }

    let mut slots: Vec<usize> = vec![0; node_count];
    let update_slots = |buckets: &[Vec<usize>], slots: &mut Vec<usize>| {
        for bucket in buckets {
            for (slot, &idx) in bucket.iter().enumerate() {
                slots[idx] = slot;
            }
        }
    };
    update_slots(buckets, &mut slots);

    let sort_bucket = |bucket: &mut Vec<usize>, neighbors: &[Vec<usize>], slots: &[usize]| {
        bucket.sort_by(|&a, &b| {
            let a_score = median_slot(a, neighbors, slots);
            let b_score = median_slot(b, neighbors, slots);
            a_score
                .partial_cmp(&b_score)
                .unwrap_or(std::cmp::Ordering::Equal)
                .then(a.cmp(&b))
        });
    };

    for _ in 0..passes.max(1) {
        for rank in 1..buckets.len() {
            if buckets[rank].len() > 1 {
                sort_bucket(&mut buckets[rank], &incoming, &slots);
                update_slots(buckets, &mut slots);
            }
        }
        for rank in (0..buckets.len() - 1).rev() {
            if buckets[rank].len() > 1 {
                sort_bucket(&mut buckets[rank], &outgoing, &slots);
                update_slots(buckets, &mut slots);
            }
        }
    }
}

fn median_slot(idx: usize, neighbors: &[Vec<usize>], slots: &[usize]) -> f32 {
    let list = &neighbors[idx];
    if list.is_empty() {
        return slots[idx] as f32;
    }
    let mut values: Vec<usize> = list.iter().map(|&n| slots[n]).collect();
    values.sort_unstable();
    let mid = values.len() / 2;
    if values.len() % 2 == 1 {
        values[mid] as f32
    } else {
        (values[mid - 1] + values[mid]) as f32 * 0.5
    }
}

/// Ranks reachable from the diagram, for assertions and debugging.
#[cfg(test)]
fn rank_of(diagram: &Diagram, config: &LayoutConfig, id: &str) -> usize {
    let node = diagram.nodes.iter().find(|n| n.id == id).unwrap();
    ((node.position.x - config.margin_x) / (config.node_width + config.rank_spacing)).round()
        as usize
}
