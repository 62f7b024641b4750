//! The trip table.

use std::collections::BTreeMap;

use st_core::NodeId;

/// Trips grouped by origin.
///
/// Several trips may share an origin and a goal may repeat; each entry in an
/// origin's goal list is one trip.  The simulator runs one shortest-path
/// search per origin and serves all of its goals from that tree.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Trips {
    by_origin: BTreeMap<NodeId, Vec<NodeId>>,
    count:     usize,
}

impl Trips {
    pub fn new() -> Self {
        Self::default()
    }

    /// Record one trip from `origin` to `goal`.
    pub fn push(&mut self, origin: NodeId, goal: NodeId) {
        self.by_origin.entry(origin).or_default().push(goal);
        self.count += 1;
    }

    /// Distinct origins, ascending.
    pub fn origins(&self) -> impl ExactSizeIterator<Item = NodeId> + '_ {
        self.by_origin.keys().copied()
    }

    /// Goals of every trip starting at `origin`, in insertion order.  Empty
    /// for an origin without trips.
    pub fn goals(&self, origin: NodeId) -> &[NodeId] {
        self.by_origin.get(&origin).map(Vec::as_slice).unwrap_or(&[])
    }

    /// Number of distinct origins.
    pub fn origin_count(&self) -> usize {
        self.by_origin.len()
    }

    /// Total number of trips.
    pub fn len(&self) -> usize {
        self.count
    }

    pub fn is_empty(&self) -> bool {
        self.count == 0
    }

    /// `(origin, goals)` pairs in ascending origin order.
    pub fn iter(&self) -> impl Iterator<Item = (NodeId, &[NodeId])> + '_ {
        self.by_origin.iter().map(|(o, g)| (*o, g.as_slice()))
    }
}

impl FromIterator<(NodeId, NodeId)> for Trips {
    fn from_iter<I: IntoIterator<Item = (NodeId, NodeId)>>(iter: I) -> Self {
        let mut trips = Trips::new();
        for (origin, goal) in iter {
            trips.push(origin, goal);
        }
        trips
    }
}
