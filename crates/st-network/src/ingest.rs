//! Turn raw map elements into a [`StreetGraph`] plus landuse node sets.
//!
//! [`MapData`] is source-agnostic: the PBF loader in [`crate::osm`] fills it,
//! and tests build it by hand.
//!
//! Landuse categories come from `landuse=residential|commercial|industrial`
//! on nodes, on ways (all of a way's nodes), and on relations (every node
//! reachable through member ways and nested relations; typically landuse
//! multipolygons).  Each category is reduced to the nodes that are also part
//! of the street network, which is what trip generation samples from.

use std::collections::{BTreeSet, HashMap, HashSet};

use log::{debug, warn};

use st_core::{Bounds, GeoPoint, NodeId};

use crate::tags::{self, StreetRule};
use crate::{NetworkResult, StreetGraph};

/// A map node with its tags.
#[derive(Clone, Debug, Default)]
pub struct RawNode {
    pub pos:  Option<GeoPoint>,
    pub tags: Vec<(String, String)>,
}

/// A map way: ordered node references plus tags.
#[derive(Clone, Debug, Default)]
pub struct RawWay {
    pub id:   i64,
    pub refs: Vec<i64>,
    pub tags: Vec<(String, String)>,
}

impl RawWay {
    fn tag_slice(&self) -> Vec<(&str, &str)> {
        self.tags.iter().map(|(k, v)| (k.as_str(), v.as_str())).collect()
    }
}

/// Member reference of a map relation.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub enum RawMember {
    Node(i64),
    Way(i64),
    Relation(i64),
}

/// A map relation: member references plus tags.
#[derive(Clone, Debug, Default)]
pub struct RawRelation {
    pub id:      i64,
    pub members: Vec<RawMember>,
    pub tags:    Vec<(String, String)>,
}

/// Raw map elements keyed by map id.
#[derive(Clone, Debug, Default)]
pub struct MapData {
    pub nodes:     HashMap<i64, RawNode>,
    pub ways:      Vec<RawWay>,
    pub relations: Vec<RawRelation>,
}

/// Landuse classes trip generation draws origins and goals from.
#[derive(Copy, Clone, Debug, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum Landuse {
    Residential,
    Commercial,
    Industrial,
}

impl Landuse {
    fn from_tag(value: &str) -> Option<Landuse> {
        match value {
            "residential" => Some(Landuse::Residential),
            "commercial"  => Some(Landuse::Commercial),
            "industrial"  => Some(Landuse::Industrial),
            _             => None,
        }
    }

    fn of(tags: &[(String, String)]) -> Option<Landuse> {
        tags.iter()
            .find(|(k, _)| k == "landuse")
            .and_then(|(_, v)| Landuse::from_tag(v))
    }
}

/// Result of [`MapData::build`].
pub struct MapImport {
    pub graph:       StreetGraph,
    /// Residential nodes that are part of the street network.
    pub residential: BTreeSet<NodeId>,
    /// Commercial nodes that are part of the street network.
    pub commercial:  BTreeSet<NodeId>,
    /// Industrial nodes that are part of the street network.
    pub industrial:  BTreeSet<NodeId>,
}

impl MapImport {
    /// Commercial and industrial nodes: where residents drive to.
    pub fn workplaces(&self) -> BTreeSet<NodeId> {
        self.commercial.union(&self.industrial).copied().collect()
    }

    /// `(origins, goals)` for trip generation.
    ///
    /// With `use_attributed_nodes` residents start at residential nodes and
    /// drive to workplaces; without it both sides are every node of the
    /// graph, in insertion order.
    pub fn trip_endpoints(&self, use_attributed_nodes: bool) -> (Vec<NodeId>, Vec<NodeId>) {
        if use_attributed_nodes {
            (self.residential.iter().copied().collect(), self.workplaces().into_iter().collect())
        } else {
            let all: Vec<NodeId> = self.graph.nodes().map(|n| n.id).collect();
            (all.clone(), all)
        }
    }
}

impl MapData {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn add_node(&mut self, id: i64, lon: f64, lat: f64, tags: Vec<(String, String)>) {
        self.nodes.insert(id, RawNode { pos: Some(GeoPoint::new(lon, lat)), tags });
    }

    pub fn add_way(&mut self, id: i64, refs: Vec<i64>, tags: Vec<(String, String)>) {
        self.ways.push(RawWay { id, refs, tags });
    }

    pub fn add_relation(&mut self, id: i64, members: Vec<RawMember>, tags: Vec<(String, String)>) {
        self.relations.push(RawRelation { id, members, tags });
    }

    /// Ids of ways that belong to a landuse relation, directly or through
    /// nested relations.  These ways usually carry no tags of their own, so a
    /// loader has to keep them for [`build`](Self::build) to see their nodes.
    pub fn landuse_member_ways(&self) -> HashSet<i64> {
        let index = self.relation_index();
        self.relations
            .iter()
            .filter(|r| Landuse::of(&r.tags).is_some())
            .flat_map(|r| relation_members(r.id, &index).1)
            .collect()
    }

    /// Extent of every positioned node, street or not.
    pub fn bounds(&self) -> Option<Bounds> {
        let mut positions = self.nodes.values().filter_map(|n| n.pos);
        let first = positions.next()?;
        let mut b = Bounds::from_point(first);
        positions.for_each(|p| b.extend(p));
        Some(b)
    }

    /// Build the street graph and landuse sets.
    ///
    /// Ways are processed in the order they were added; within a way each
    /// consecutive node pair becomes one street per drivable direction.  A
    /// directed pair already present (shared by two ways) keeps its first
    /// attributes.  Segments referencing nodes without a position are
    /// skipped.
    pub fn build(&self) -> NetworkResult<MapImport> {
        let mut graph = StreetGraph::with_capacity(self.nodes.len(), self.ways.len() * 4);
        let mut skipped = 0usize;

        for way in &self.ways {
            let tag_slice = way.tag_slice();
            let Some(rule) = tags::street_rule(&tag_slice) else {
                continue;
            };
            for pair in way.refs.windows(2) {
                let (a, b) = (pair[0], pair[1]);
                if a == b {
                    continue;
                }
                let (Some(pa), Some(pb)) = (self.position(a), self.position(b)) else {
                    skipped += 1;
                    continue;
                };
                for (id, pos) in [(a, pa), (b, pb)] {
                    if !graph.has_node(NodeId(id)) {
                        graph.add_node(NodeId(id), pos.lon, pos.lat)?;
                    }
                }
                add_segment(&mut graph, NodeId(a), NodeId(b), pa.distance_m(pb), &rule)?;
            }
        }
        if skipped > 0 {
            warn!("skipped {skipped} street segments with unknown node positions");
        }
        if let Some(b) = self.bounds() {
            graph.set_bounds(b);
        }

        let categories = self.landuse_nodes();
        let connected = |class: Landuse| -> BTreeSet<NodeId> {
            categories
                .iter()
                .filter(|(_, c)| *c == class)
                .map(|(id, _)| NodeId(*id))
                .filter(|id| graph.has_node(*id))
                .collect()
        };
        let residential = connected(Landuse::Residential);
        let commercial = connected(Landuse::Commercial);
        let industrial = connected(Landuse::Industrial);

        for (name, set) in [
            ("residential", &residential),
            ("commercial", &commercial),
            ("industrial", &industrial),
        ] {
            if set.is_empty() {
                warn!("no {name} nodes are connected to the street network");
            } else {
                debug!("{} {name} nodes connected to the street network", set.len());
            }
        }

        Ok(MapImport { graph, residential, commercial, industrial })
    }

    fn position(&self, id: i64) -> Option<GeoPoint> {
        self.nodes.get(&id).and_then(|n| n.pos)
    }

    fn relation_index(&self) -> HashMap<i64, &RawRelation> {
        self.relations.iter().map(|r| (r.id, r)).collect()
    }

    /// `(map node id, class)` for every node tagged directly or belonging to
    /// a tagged way or relation.  A node may appear under several classes.
    fn landuse_nodes(&self) -> BTreeSet<(i64, Landuse)> {
        let mut out = BTreeSet::new();
        for (id, node) in &self.nodes {
            if let Some(class) = Landuse::of(&node.tags) {
                out.insert((*id, class));
            }
        }
        for way in &self.ways {
            if let Some(class) = Landuse::of(&way.tags) {
                out.extend(way.refs.iter().map(|r| (*r, class)));
            }
        }

        let relations = self.relation_index();
        let ways: HashMap<i64, &RawWay> = self.ways.iter().map(|w| (w.id, w)).collect();
        for relation in &self.relations {
            let Some(class) = Landuse::of(&relation.tags) else {
                continue;
            };
            let (nodes, member_ways) = relation_members(relation.id, &relations);
            out.extend(nodes.into_iter().map(|n| (n, class)));
            for way in member_ways.iter().filter_map(|w| ways.get(w)) {
                out.extend(way.refs.iter().map(|r| (*r, class)));
            }
        }
        out
    }
}

/// `(node ids, way ids)` reachable from relation `root`.  Nested relations
/// are followed once each, so membership cycles terminate; members missing
/// from `index` are ignored.
fn relation_members(root: i64, index: &HashMap<i64, &RawRelation>) -> (BTreeSet<i64>, BTreeSet<i64>) {
    let mut nodes = BTreeSet::new();
    let mut ways = BTreeSet::new();
    let mut seen = HashSet::new();
    let mut stack = vec![root];
    while let Some(id) = stack.pop() {
        if !seen.insert(id) {
            continue;
        }
        let Some(relation) = index.get(&id) else {
            continue;
        };
        for member in &relation.members {
            match *member {
                RawMember::Node(n) => {
                    nodes.insert(n);
                }
                RawMember::Way(w) => {
                    ways.insert(w);
                }
                RawMember::Relation(r) => stack.push(r),
            }
        }
    }
    (nodes, ways)
}

/// Add the streets of one way segment `a → b` according to `rule`.
fn add_segment(
    graph:    &mut StreetGraph,
    a:        NodeId,
    b:        NodeId,
    length_m: f64,
    rule:     &StreetRule,
) -> NetworkResult<()> {
    // Coincident nodes produce zero-length segments; keep weights positive.
    let length_m = length_m.max(f64::EPSILON);
    if let Some(lanes) = rule.forward_lanes {
        if !graph.has_street(a, b) {
            graph.add_street(a, b, length_m, rule.max_speed_kmh, lanes)?;
        }
    }
    if let Some(lanes) = rule.backward_lanes {
        if !graph.has_street(b, a) {
            graph.add_street(b, a, length_m, rule.max_speed_kmh, lanes)?;
        }
    }
    Ok(())
}
