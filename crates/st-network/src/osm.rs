//! OSM PBF loader — enabled with the `osm` Cargo feature.
//!
//! # Usage
//!
//! ```ignore
//! use std::path::Path;
//! use st_network::osm::load_from_pbf;
//!
//! let import = load_from_pbf(Path::new("luebeck.osm.pbf"))?;
//! let graph = import.graph;
//! ```
//!
//! # What is loaded
//!
//! The file is read twice.  The first pass collects every relation, which is
//! enough to know which untagged ways outline a landuse multipolygon.  The
//! second pass reads every node (position and tags, for bounds and landuse),
//! every way carrying a `highway` or `landuse` tag, and those landuse member
//! ways.  Street construction and landuse categorisation happen in
//! [`MapData::build`].

use std::collections::HashSet;
use std::path::Path;

use log::info;
use osmpbf::{Element, ElementReader, RelMemberType};

use crate::ingest::{MapData, MapImport, RawMember};
use crate::NetworkError;

fn osm_err(e: osmpbf::Error) -> NetworkError {
    NetworkError::Osm(e.to_string())
}

/// Load a street network and landuse sets from an OSM PBF file.
///
/// # Errors
///
/// Returns [`NetworkError::Osm`] on parse errors.
pub fn load_from_pbf(path: &Path) -> Result<MapImport, NetworkError> {
    let mut data = MapData::new();

    ElementReader::from_path(path)
        .map_err(osm_err)?
        .for_each(|elem| {
            if let Element::Relation(r) = elem {
                let members = r
                    .members()
                    .map(|m| match m.member_type {
                        RelMemberType::Node     => RawMember::Node(m.member_id),
                        RelMemberType::Way      => RawMember::Way(m.member_id),
                        RelMemberType::Relation => RawMember::Relation(m.member_id),
                    })
                    .collect();
                data.add_relation(r.id(), members, owned_tags(r.tags()));
            }
        })
        .map_err(osm_err)?;

    let member_ways: HashSet<i64> = data.landuse_member_ways();

    ElementReader::from_path(path)
        .map_err(osm_err)?
        .for_each(|elem| match elem {
            Element::Node(n) => {
                data.add_node(n.id(), n.lon(), n.lat(), owned_tags(n.tags()));
            }
            Element::DenseNode(n) => {
                data.add_node(n.id(), n.lon(), n.lat(), owned_tags(n.tags()));
            }
            Element::Way(w) => {
                let relevant = w.tags().any(|(k, _)| k == "highway" || k == "landuse")
                    || member_ways.contains(&w.id());
                if relevant {
                    let refs: Vec<i64> = w.refs().collect();
                    data.add_way(w.id(), refs, owned_tags(w.tags()));
                }
            }
            Element::Relation(_) => {}
        })
        .map_err(osm_err)?;

    info!(
        "read {} nodes, {} ways and {} relations from {}",
        data.nodes.len(),
        data.ways.len(),
        data.relations.len(),
        path.display()
    );
    data.build()
}

fn owned_tags<'a>(tags: impl Iterator<Item = (&'a str, &'a str)>) -> Vec<(String, String)> {
    tags.map(|(k, v)| (k.to_owned(), v.to_owned())).collect()
}
