//! Single-source shortest paths over the current driving-time weights.
//!
//! # Tie-breaking
//!
//! Heap entries are ordered by `(cost, discovery sequence)`.  Among entries
//! of equal cost the one pushed first is settled first, and a node's
//! predecessor is only replaced on a *strictly* smaller cost.  Outgoing
//! streets are scanned in insertion order.  The resulting tree is therefore
//! a deterministic function of the graph's construction order, and equal
//! cost alternatives resolve to the one discovered first.
//!
//! Weights are positive and finite (a [`StreetGraph`] invariant), so plain
//! Dijkstra applies and no negative-cycle handling is needed.

use std::cmp::Ordering;
use std::collections::BinaryHeap;

use st_core::{NodeId, NodeIndex, StreetId};

use crate::{NetworkError, NetworkResult, StreetGraph};

// ── Heap state ────────────────────────────────────────────────────────────────

#[derive(Copy, Clone, Debug)]
struct State {
    cost: f64,
    seq:  u64,
    node: NodeIndex,
}

impl Ord for State {
    fn cmp(&self, other: &Self) -> Ordering {
        // Min-heap by (cost, seq), reversed for std's max-heap.
        other
            .cost
            .total_cmp(&self.cost)
            .then_with(|| other.seq.cmp(&self.seq))
    }
}

impl PartialOrd for State {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl PartialEq for State {
    fn eq(&self, other: &Self) -> bool {
        self.cmp(other) == Ordering::Equal
    }
}

impl Eq for State {}

// ── PredecessorTree ───────────────────────────────────────────────────────────

/// Shortest-path tree rooted at one origin.
///
/// Maps every reachable node (except the origin) to its predecessor on the
/// optimal path.  Unreachable nodes are simply absent.
pub struct PredecessorTree<'g> {
    graph:    &'g StreetGraph,
    origin:   NodeIndex,
    /// Street that reached each node; `StreetId::INVALID` for the origin and
    /// unreached nodes.
    incoming: Vec<StreetId>,
    /// Accumulated driving time; infinite for unreached nodes.
    cost:     Vec<f64>,
}

impl<'g> PredecessorTree<'g> {
    pub fn origin(&self) -> NodeId {
        self.graph.node_at(self.origin).id
    }

    /// `true` if `node` is reachable and is not the origin.
    pub fn contains(&self, node: NodeId) -> bool {
        self.incoming_street(node).is_some()
    }

    /// Street used to enter `node` on its shortest path.
    pub fn incoming_street(&self, node: NodeId) -> Option<StreetId> {
        let i = self.graph.index_of(node)?;
        let s = self.incoming[i.index()];
        (s != StreetId::INVALID).then_some(s)
    }

    pub fn predecessor(&self, node: NodeId) -> Option<NodeId> {
        self.incoming_street(node)
            .map(|s| self.graph.node_at(self.graph.street_source(s)).id)
    }

    /// Shortest driving time from the origin; `Some(0.0)` for the origin
    /// itself, `None` if unreachable or unknown.
    pub fn driving_time_to(&self, node: NodeId) -> Option<f64> {
        let i = self.graph.index_of(node)?;
        let c = self.cost[i.index()];
        c.is_finite().then_some(c)
    }

    /// Walk backward from `goal` to the origin, yielding the streets of the
    /// shortest path in reverse order.
    ///
    /// `None` if `goal` is unreachable or unknown.  For `goal == origin` the
    /// walk is empty.
    pub fn streets_to(&self, goal: NodeId) -> Option<PathStreets<'_, 'g>> {
        let current = self.graph.index_of(goal)?;
        if !self.cost[current.index()].is_finite() {
            return None;
        }
        Some(PathStreets { tree: self, current })
    }

    /// `(node, predecessor)` pairs for every reachable node, in node
    /// insertion order.
    pub fn iter(&self) -> impl Iterator<Item = (NodeId, NodeId)> + '_ {
        self.incoming
            .iter()
            .enumerate()
            .filter(|(_, s)| **s != StreetId::INVALID)
            .map(|(i, &s)| {
                let node = self.graph.node_at(NodeIndex(i as u32)).id;
                let pred = self.graph.node_at(self.graph.street_source(s)).id;
                (node, pred)
            })
    }

    /// Number of nodes reachable from the origin, excluding the origin.
    pub fn reachable_count(&self) -> usize {
        self.incoming.iter().filter(|s| **s != StreetId::INVALID).count()
    }
}

/// Iterator returned by [`PredecessorTree::streets_to`].
pub struct PathStreets<'t, 'g> {
    tree:    &'t PredecessorTree<'g>,
    current: NodeIndex,
}

impl Iterator for PathStreets<'_, '_> {
    type Item = StreetId;

    fn next(&mut self) -> Option<StreetId> {
        if self.current == self.tree.origin {
            return None;
        }
        let s = self.tree.incoming[self.current.index()];
        if s == StreetId::INVALID {
            return None;
        }
        self.current = self.tree.graph.street_source(s);
        Some(s)
    }
}

// ── Dijkstra ──────────────────────────────────────────────────────────────────

/// Compute the shortest-path tree from `origin` under the graph's current
/// driving times.
///
/// O((V + E) log V).
///
/// # Errors
/// [`NetworkError::UnknownNode`] if `origin` is not in the graph.
pub fn shortest_path_tree(graph: &StreetGraph, origin: NodeId) -> NetworkResult<PredecessorTree<'_>> {
    let start = graph.index_of(origin).ok_or(NetworkError::UnknownNode(origin))?;

    let n = graph.node_count();
    let mut cost = vec![f64::INFINITY; n];
    let mut incoming = vec![StreetId::INVALID; n];
    let mut heap = BinaryHeap::new();
    let mut seq = 0u64;

    cost[start.index()] = 0.0;
    heap.push(State { cost: 0.0, seq, node: start });

    while let Some(State { cost: c, node, .. }) = heap.pop() {
        // Skip stale heap entries.
        if c > cost[node.index()] {
            continue;
        }

        for &street in graph.out_street_ids(node) {
            let next = graph.street_target(street);
            let next_cost = c + graph.weight(street);

            if next_cost < cost[next.index()] {
                cost[next.index()] = next_cost;
                incoming[next.index()] = street;
                seq += 1;
                heap.push(State { cost: next_cost, seq, node: next });
            }
        }
    }

    Ok(PredecessorTree { graph, origin: start, incoming, cost })
}
