//! Checkpoint reading: rebuild a network and a load array from the files
//! written by [`CsvWriter`](crate::CsvWriter).
//!
//! Snapshots are labelled with the first step that uses them, so the
//! network a run had *after* step `s` is the latest snapshot at or before
//! `s`.  Pair it with the load of step `s` and hand both to
//! `Simulator::resume` to continue the run; any construction due before
//! step `s + 1` is then re-applied on the same inputs.

use std::fs::File;
use std::path::Path;

use log::info;
use serde::de::DeserializeOwned;

use st_core::{NodeId, StreetId};
use st_network::StreetGraph;

use crate::csv::{NODES_FILE, STEP_SUMMARIES_FILE, STREET_SNAPSHOTS_FILE, TRAFFIC_LOAD_FILE};
use crate::{NodeRow, OutputError, OutputResult, StepSummaryRow, StreetSnapshotRow, TrafficLoadRow};

fn read_rows<T: DeserializeOwned>(path: &Path) -> OutputResult<Vec<T>> {
    let file = File::open(path)?;
    let mut reader = csv::Reader::from_reader(file);
    let mut rows = Vec::new();
    for row in reader.deserialize() {
        rows.push(row?);
    }
    Ok(rows)
}

/// Rebuild the street network as it was after step `step`.
///
/// Streets are re-added in snapshot order, so every street gets back its
/// original index.  Driving times start at their free-flow value; the next
/// simulation step re-weights them anyway.
///
/// # Errors
///
/// [`OutputError::MissingSnapshot`] if no snapshot is labelled `step` or
/// earlier; [`OutputError::Format`] if the snapshot's street indices are not
/// dense.
pub fn read_network(dir: &Path, step: u64) -> OutputResult<StreetGraph> {
    let nodes: Vec<NodeRow> = read_rows(&dir.join(NODES_FILE))?;
    let streets: Vec<StreetSnapshotRow> = read_rows(&dir.join(STREET_SNAPSHOTS_FILE))?;

    let snapshot = streets
        .iter()
        .map(|r| r.step)
        .filter(|s| *s <= step)
        .max()
        .ok_or(OutputError::MissingSnapshot(step))?;

    let mut graph = StreetGraph::with_capacity(nodes.len(), streets.len());
    for n in &nodes {
        graph.add_node(NodeId(n.node), n.lon, n.lat)?;
    }

    let mut rows: Vec<&StreetSnapshotRow> = streets.iter().filter(|r| r.step == snapshot).collect();
    rows.sort_by_key(|r| r.street);
    for row in rows {
        let id = graph.add_street(
            NodeId(row.origin),
            NodeId(row.destination),
            row.length,
            row.max_speed,
            row.lanes,
        )?;
        if id != StreetId(row.street) {
            return Err(OutputError::Format(format!(
                "snapshot {snapshot}: expected street {}, rebuilt as {id}",
                row.street
            )));
        }
    }

    info!(
        "restored network from snapshot {snapshot}: {} nodes, {} streets",
        graph.node_count(),
        graph.street_count()
    );
    Ok(graph)
}

/// Rebuild the load array of step `step`.
///
/// Only steps whose summary row carries `load_saved` can be restored; with
/// `output_interval_steps > 1` pick a step that is a multiple of the
/// interval.  Streets without a row carried no load.
///
/// # Errors
///
/// [`OutputError::MissingLoad`] if the load of `step` was not saved;
/// [`OutputError::Format`] if a row names a street `>= street_count`.
pub fn read_traffic_load(dir: &Path, step: u64, street_count: usize) -> OutputResult<Vec<u32>> {
    let summaries: Vec<StepSummaryRow> = read_rows(&dir.join(STEP_SUMMARIES_FILE))?;
    if !summaries.iter().any(|s| s.step == step && s.load_saved) {
        return Err(OutputError::MissingLoad(step));
    }

    let rows: Vec<TrafficLoadRow> = read_rows(&dir.join(TRAFFIC_LOAD_FILE))?;
    let mut load = vec![0u32; street_count];
    for row in rows.iter().filter(|r| r.step == step) {
        let slot = load.get_mut(row.street as usize).ok_or_else(|| {
            OutputError::Format(format!(
                "step {step}: street {} out of range for {street_count} streets",
                row.street
            ))
        })?;
        *slot = row.load;
    }
    Ok(load)
}
