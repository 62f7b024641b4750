//! Synthetic grid town.
//!
//! An `N × N` block of map nodes about 100 m apart, laid out the way an OSM
//! extract would describe it, so the demo exercises the same tag rules and
//! landuse handling as a real map:
//!
//! ```text
//!   row N-1  ── residential ──   industrial park (south-east corner)
//!   …                            one-way service loop
//!   col N/2  ══ primary avenue, 4 lanes, maxspeed 70 ══
//!   row 0    ── residential ──   commercial strip (east edge)
//! ```
//!
//! West half is residential, the east column commercial, the south-east
//! corner industrial.

use st_network::{MapData, MapImport, NetworkResult};

/// Degrees between neighbouring nodes, ~110 m of latitude.
const SPACING_DEG: f64 = 0.001;

/// Origin of the grid, somewhere in northern Germany.
const ORIGIN_LON: f64 = 10.68;
const ORIGIN_LAT: f64 = 53.86;

const SERVICE_NODE_A: i64 = 900;
const SERVICE_NODE_B: i64 = 901;

fn tags(pairs: &[(&str, &str)]) -> Vec<(String, String)> {
    pairs.iter().map(|(k, v)| (k.to_string(), v.to_string())).collect()
}

fn node_id(size: i64, row: i64, col: i64) -> i64 {
    1_000 + row * size + col
}

/// Build the town's map data and import it.
pub fn build_town(size: i64) -> NetworkResult<MapImport> {
    let mut map = MapData::new();
    for row in 0..size {
        for col in 0..size {
            map.add_node(
                node_id(size, row, col),
                ORIGIN_LON + col as f64 * SPACING_DEG,
                ORIGIN_LAT + row as f64 * SPACING_DEG,
                vec![],
            );
        }
    }

    let avenue = size / 2;
    let mut way_id = 1;

    // East-west streets.
    for row in 0..size {
        let refs = (0..size).map(|col| node_id(size, row, col)).collect();
        map.add_way(way_id, refs, tags(&[("highway", "residential")]));
        way_id += 1;
    }

    // North-south streets; the middle one is the avenue.
    for col in 0..size {
        let refs = (0..size).map(|row| node_id(size, row, col)).collect();
        let way_tags = if col == avenue {
            tags(&[("highway", "primary"), ("maxspeed", "70"), ("lanes", "4")])
        } else {
            tags(&[("highway", "tertiary")])
        };
        map.add_way(way_id, refs, way_tags);
        way_id += 1;
    }

    // One-way diagonal service road through the industrial park, on its own
    // mid-block nodes.
    let (r, c) = (size - 3, size - 3);
    for (k, id) in [(0.5, SERVICE_NODE_A), (1.5, SERVICE_NODE_B)] {
        map.add_node(
            id,
            ORIGIN_LON + (c as f64 + k) * SPACING_DEG,
            ORIGIN_LAT + (r as f64 + k) * SPACING_DEG,
            vec![],
        );
    }
    let service_refs = vec![
        node_id(size, r, c),
        SERVICE_NODE_A,
        node_id(size, r + 1, c + 1),
        SERVICE_NODE_B,
        node_id(size, r + 2, c + 2),
    ];
    map.add_way(way_id, service_refs, tags(&[("highway", "service"), ("oneway", "yes")]));
    way_id += 1;

    // Landuse.
    let residential = (0..size)
        .flat_map(|row| (0..avenue).map(move |col| node_id(size, row, col)))
        .collect();
    map.add_way(way_id, residential, tags(&[("landuse", "residential")]));
    way_id += 1;

    let commercial = (0..size).map(|row| node_id(size, row, size - 1)).collect();
    map.add_way(way_id, commercial, tags(&[("landuse", "commercial")]));
    way_id += 1;

    let industrial = (size - 3..size)
        .flat_map(|row| (size - 3..size).map(move |col| node_id(size, row, col)))
        .collect();
    map.add_way(way_id, industrial, tags(&[("landuse", "industrial")]));

    map.build()
}
