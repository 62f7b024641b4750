//! Street graph representation.
//!
//! # Data layout
//!
//! Streets live in an **arena** indexed by [`StreetId`].  Ids are handed out
//! sequentially at insertion and never reused, so `0..street_count()` is
//! dense and a plain `Vec<u32>` indexed by `StreetId` serves as the per-street
//! load array.
//!
//! Nodes live in a second arena indexed by [`NodeIndex`].  Each node owns an
//! adjacency list of outgoing `StreetId`s in insertion order:
//!
//! ```text
//! out_streets[node_index] = [street, street, …]
//! ```
//!
//! Street endpoints are mirrored into `street_from` / `street_to` so the
//! shortest-path inner loop never touches the external-id hash map.
//!
//! # Spatial index
//!
//! An R-tree (via `rstar`) maps `(lon, lat)` to the nearest node.  Used to
//! attach landuse points or arbitrary coordinates to the street network.

use rstar::{AABB, PointDistance, RTree, RTreeObject};

use st_core::{Bounds, GeoPoint, NodeId, NodeIndex, StreetId};

use crate::{NetworkError, NetworkResult};

#[cfg(feature = "fx-hash")]
type IdMap<K, V> = rustc_hash::FxHashMap<K, V>;
#[cfg(not(feature = "fx-hash"))]
type IdMap<K, V> = std::collections::HashMap<K, V>;

/// Lowest speed limit a street can be set to, km/h.  Keeps weights finite.
pub const MIN_SPEED_LIMIT_KMH: f64 = 1.0;

/// Highest speed limit a street can be set to, km/h.
pub const MAX_SPEED_LIMIT_KMH: f64 = 140.0;

// ── R-tree node entry ─────────────────────────────────────────────────────────

#[derive(Clone)]
struct NodeEntry {
    point: [f64; 2], // [lon, lat]
    index: NodeIndex,
}

impl RTreeObject for NodeEntry {
    type Envelope = AABB<[f64; 2]>;
    fn envelope(&self) -> Self::Envelope {
        AABB::from_point(self.point)
    }
}

impl PointDistance for NodeEntry {
    /// Squared Euclidean distance in lon/lat space.  Good enough for
    /// nearest-node queries within a city.
    fn distance_2(&self, point: &[f64; 2]) -> f64 {
        let dlon = self.point[0] - point[0];
        let dlat = self.point[1] - point[1];
        dlon * dlon + dlat * dlat
    }
}

// ── Node / Street ─────────────────────────────────────────────────────────────

/// A street network node.  Immutable once added.
#[derive(Copy, Clone, Debug, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Node {
    pub id:  NodeId,
    pub pos: GeoPoint,
}

/// A directed street with its physical and dynamic attributes.
#[derive(Clone, Debug, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Street {
    pub id:            StreetId,
    pub origin:        NodeId,
    pub destination:   NodeId,
    /// Physical length in metres.
    pub length_m:      f64,
    /// Speed limit in km/h, always within `[1, 140]`.
    pub max_speed_kmh: f64,
    /// Lane count in this direction; fractional for split two-way streets.
    pub lanes:         f64,
    /// Current shortest-path weight (`length_m / speed_kmh`).  Always > 0.
    pub driving_time:  f64,
}

/// Outcome of [`StreetGraph::change_max_speed`].
#[derive(Copy, Clone, Debug, PartialEq)]
pub struct SpeedChange {
    pub previous: f64,
    pub current:  f64,
    /// `true` if the requested speed fell outside `[1, 140]` and was
    /// satisfied at the bound instead.
    pub clamped:  bool,
}

impl SpeedChange {
    /// `true` if the full requested delta was applied.  A clamped request or
    /// a zero delta is not a real change.
    #[inline]
    pub fn is_real(&self) -> bool {
        !self.clamped && self.current != self.previous
    }
}

// ── StreetGraph ───────────────────────────────────────────────────────────────

/// Directed, weighted street graph.
///
/// A directed `(origin, destination)` pair is unique; the reverse direction
/// is a separate street with its own id.
#[derive(Clone)]
pub struct StreetGraph {
    // ── Node data ─────────────────────────────────────────────────────────
    nodes:       Vec<Node>,
    node_lookup: IdMap<NodeId, NodeIndex>,
    /// Outgoing streets per node, in insertion order.
    out_streets: Vec<Vec<StreetId>>,

    // ── Street arena (indexed by StreetId) ────────────────────────────────
    streets:     Vec<Street>,
    street_from: Vec<NodeIndex>,
    street_to:   Vec<NodeIndex>,
    pair_lookup: IdMap<(NodeIndex, NodeIndex), StreetId>,

    bounds:      Option<Bounds>,
    spatial_idx: RTree<NodeEntry>,
}

impl StreetGraph {
    pub fn new() -> Self {
        Self::with_capacity(0, 0)
    }

    /// Pre-allocate for the expected number of nodes and streets to reduce
    /// reallocations when bulk-loading from OSM or CSV.
    pub fn with_capacity(nodes: usize, streets: usize) -> Self {
        let mut node_lookup = IdMap::default();
        node_lookup.reserve(nodes);
        let mut pair_lookup = IdMap::default();
        pair_lookup.reserve(streets);
        Self {
            nodes: Vec::with_capacity(nodes),
            node_lookup,
            out_streets: Vec::with_capacity(nodes),
            streets: Vec::with_capacity(streets),
            street_from: Vec::with_capacity(streets),
            street_to: Vec::with_capacity(streets),
            pair_lookup,
            bounds: None,
            spatial_idx: RTree::new(),
        }
    }

    // ── Dimensions ────────────────────────────────────────────────────────

    pub fn node_count(&self) -> usize {
        self.nodes.len()
    }

    pub fn street_count(&self) -> usize {
        self.streets.len()
    }

    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }

    // ── Nodes ─────────────────────────────────────────────────────────────

    /// Add a node and widen [`bounds`](Self::bounds) to include it.
    ///
    /// # Errors
    /// [`NetworkError::DuplicateNode`] if `id` is already present.
    pub fn add_node(&mut self, id: NodeId, lon: f64, lat: f64) -> NetworkResult<NodeIndex> {
        if self.node_lookup.contains_key(&id) {
            return Err(NetworkError::DuplicateNode(id));
        }
        let index = NodeIndex(self.nodes.len() as u32);
        let pos = GeoPoint::new(lon, lat);

        self.nodes.push(Node { id, pos });
        self.out_streets.push(Vec::new());
        self.node_lookup.insert(id, index);
        self.spatial_idx.insert(NodeEntry { point: [lon, lat], index });
        match &mut self.bounds {
            Some(b) => b.extend(pos),
            None => self.bounds = Some(Bounds::from_point(pos)),
        }
        Ok(index)
    }

    pub fn has_node(&self, id: NodeId) -> bool {
        self.node_lookup.contains_key(&id)
    }

    pub fn node(&self, id: NodeId) -> Option<&Node> {
        self.node_lookup.get(&id).map(|i| &self.nodes[i.index()])
    }

    /// All nodes in insertion order.
    pub fn nodes(&self) -> impl Iterator<Item = &Node> + '_ {
        self.nodes.iter()
    }

    /// Min/max latitude and longitude seen during construction.
    ///
    /// `None` for a graph without nodes (unless set explicitly).
    pub fn bounds(&self) -> Option<Bounds> {
        self.bounds
    }

    /// Override the recorded bounds, e.g. with the extent of the full map
    /// extract rather than only the street nodes.
    pub fn set_bounds(&mut self, bounds: Bounds) {
        self.bounds = Some(bounds);
    }

    /// Return the node nearest to `(lon, lat)`.
    ///
    /// Returns `None` only if the graph has no nodes.
    pub fn snap_to_node(&self, lon: f64, lat: f64) -> Option<NodeId> {
        self.spatial_idx
            .nearest_neighbor(&[lon, lat])
            .map(|e| self.nodes[e.index.index()].id)
    }

    // ── Streets ───────────────────────────────────────────────────────────

    /// Add a directed street and return its sequential id.
    ///
    /// The initial driving time is the free-flow time `length / max_speed`.
    /// `max_speed` is clamped into `[1, 140]`.
    ///
    /// # Errors
    /// - [`NetworkError::UnknownNode`] if either endpoint is missing.
    /// - [`NetworkError::DuplicateStreet`] if the directed pair exists.  Check
    ///   [`has_street`](Self::has_street) first when duplicates are expected.
    /// - [`NetworkError::InvalidStreet`] for a self-loop or a non-positive,
    ///   non-finite length, speed, or lane count.
    pub fn add_street(
        &mut self,
        origin:      NodeId,
        destination: NodeId,
        length_m:    f64,
        max_speed:   f64,
        lanes:       f64,
    ) -> NetworkResult<StreetId> {
        let from = self.index_of(origin).ok_or(NetworkError::UnknownNode(origin))?;
        let to = self.index_of(destination).ok_or(NetworkError::UnknownNode(destination))?;

        let invalid = |reason: String| NetworkError::InvalidStreet { origin, destination, reason };
        if from == to {
            return Err(invalid("self-loop".into()));
        }
        for (name, value) in [("length", length_m), ("max speed", max_speed), ("lanes", lanes)] {
            if !(value.is_finite() && value > 0.0) {
                return Err(invalid(format!("{name} must be positive, got {value}")));
            }
        }
        if self.pair_lookup.contains_key(&(from, to)) {
            return Err(NetworkError::DuplicateStreet { origin, destination });
        }

        let id = StreetId(self.streets.len() as u32);
        let max_speed_kmh = max_speed.clamp(MIN_SPEED_LIMIT_KMH, MAX_SPEED_LIMIT_KMH);
        self.streets.push(Street {
            id,
            origin,
            destination,
            length_m,
            max_speed_kmh,
            lanes,
            driving_time: length_m / max_speed_kmh,
        });
        self.street_from.push(from);
        self.street_to.push(to);
        self.pair_lookup.insert((from, to), id);
        self.out_streets[from.index()].push(id);
        Ok(id)
    }

    pub fn has_street(&self, origin: NodeId, destination: NodeId) -> bool {
        self.street_index_of(origin, destination).is_some()
    }

    /// Id of the directed street `origin → destination`, if present.
    pub fn street_index_of(&self, origin: NodeId, destination: NodeId) -> Option<StreetId> {
        let from = self.index_of(origin)?;
        let to = self.index_of(destination)?;
        self.pair_lookup.get(&(from, to)).copied()
    }

    pub fn street_by_index(&self, id: StreetId) -> Option<&Street> {
        self.streets.get(id.index())
    }

    /// Every street with its full attribute tuple, in id order.
    pub fn streets(&self) -> impl ExactSizeIterator<Item = &Street> + '_ {
        self.streets.iter()
    }

    /// Outgoing streets of `node` in insertion order.  Empty for an unknown
    /// node.
    pub fn out_streets(&self, node: NodeId) -> impl Iterator<Item = &Street> + '_ {
        self.index_of(node)
            .into_iter()
            .flat_map(move |i| self.out_streets[i.index()].iter())
            .map(move |s| &self.streets[s.index()])
    }

    pub fn get_driving_time(&self, id: StreetId) -> NetworkResult<f64> {
        self.street_by_index(id)
            .map(|s| s.driving_time)
            .ok_or(NetworkError::UnknownStreet(id))
    }

    /// Overwrite the shortest-path weight of a street.
    ///
    /// # Errors
    /// [`NetworkError::InvalidDrivingTime`] unless `time` is finite and > 0.
    pub fn set_driving_time(&mut self, id: StreetId, time: f64) -> NetworkResult<()> {
        if !(time.is_finite() && time > 0.0) {
            return Err(NetworkError::InvalidDrivingTime { street: id, value: time });
        }
        let street = self
            .streets
            .get_mut(id.index())
            .ok_or(NetworkError::UnknownStreet(id))?;
        street.driving_time = time;
        Ok(())
    }

    /// Shift a street's speed limit by `delta` km/h, clamped to `[1, 140]`.
    ///
    /// The driving time is left alone; the next simulation step re-weights
    /// every street from its speed limit anyway.
    pub fn change_max_speed(&mut self, id: StreetId, delta: f64) -> NetworkResult<SpeedChange> {
        let street = self
            .streets
            .get_mut(id.index())
            .ok_or(NetworkError::UnknownStreet(id))?;
        let previous = street.max_speed_kmh;
        let requested = previous + delta;
        let current = requested.clamp(MIN_SPEED_LIMIT_KMH, MAX_SPEED_LIMIT_KMH);
        street.max_speed_kmh = current;
        Ok(SpeedChange { previous, current, clamped: current != requested })
    }

    // ── Crate-internal hot-path access ────────────────────────────────────

    #[inline]
    pub(crate) fn index_of(&self, id: NodeId) -> Option<NodeIndex> {
        self.node_lookup.get(&id).copied()
    }

    #[inline]
    pub(crate) fn node_at(&self, index: NodeIndex) -> &Node {
        &self.nodes[index.index()]
    }

    #[inline]
    pub(crate) fn out_street_ids(&self, index: NodeIndex) -> &[StreetId] {
        &self.out_streets[index.index()]
    }

    #[inline]
    pub(crate) fn street_source(&self, id: StreetId) -> NodeIndex {
        self.street_from[id.index()]
    }

    #[inline]
    pub(crate) fn street_target(&self, id: StreetId) -> NodeIndex {
        self.street_to[id.index()]
    }

    #[inline]
    pub(crate) fn weight(&self, id: StreetId) -> f64 {
        self.streets[id.index()].driving_time
    }
}

impl Default for StreetGraph {
    fn default() -> Self {
        Self::new()
    }
}
