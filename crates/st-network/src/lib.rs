//! `st-network` — street graph, shortest-path search, and map ingestion.
//!
//! # Crate layout
//!
//! | Module            | Contents                                                  |
//! |-------------------|-----------------------------------------------------------|
//! | [`graph`]         | `StreetGraph` (street arena + adjacency lists + R-tree)   |
//! | [`shortest_path`] | `shortest_path_tree`, `PredecessorTree`                   |
//! | [`tags`]          | Highway tag rules: speed, lanes, oneway                   |
//! | [`ingest`]        | `MapData` → `MapImport` (graph + landuse node sets)       |
//! | [`osm`]           | `load_from_pbf` (feature = `"osm"` only)                  |
//! | [`error`]         | `NetworkError`, `NetworkResult<T>`                        |
//!
//! # Feature flags
//!
//! | Flag      | Effect                                                     |
//! |-----------|------------------------------------------------------------|
//! | `osm`     | Enables OSM PBF loading via the `osmpbf` crate.            |
//! | `serde`   | Derives `Serialize`/`Deserialize` on public types.         |
//! | `fx-hash` | Uses FxHash for the id lookups.                            |

pub mod error;
pub mod graph;
pub mod ingest;
pub mod shortest_path;
pub mod tags;

#[cfg(feature = "osm")]
pub mod osm;


pub use error::{NetworkError, NetworkResult};
pub use graph::{MAX_SPEED_LIMIT_KMH, MIN_SPEED_LIMIT_KMH, Node, SpeedChange, Street, StreetGraph};
pub use ingest::{Landuse, MapData, MapImport, RawMember, RawNode, RawRelation, RawWay};
pub use shortest_path::{PathStreets, PredecessorTree, shortest_path_tree};
