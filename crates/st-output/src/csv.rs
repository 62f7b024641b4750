//! CSV output backend.
//!
//! Creates four files in the configured output directory:
//!
//! | File                   | Columns                                                     |
//! |------------------------|-------------------------------------------------------------|
//! | `nodes.csv`            | node, lon, lat                                              |
//! | `street_snapshots.csv` | step, street, origin, destination, length, max_speed, lanes |
//! | `traffic_load.csv`     | step, street, load, ideal_speed, actual_speed (zero loads omitted) |
//! | `step_summaries.csv`   | step, origins_processed, trips_assigned, …, load_saved      |

use std::fs::File;
use std::path::Path;

use csv::{Writer, WriterBuilder};
use serde::Serialize;

use crate::writer::OutputWriter;
use crate::{NodeRow, OutputResult, StepSummaryRow, StreetSnapshotRow, TrafficLoadRow};

pub const NODES_FILE: &str = "nodes.csv";
pub const STREET_SNAPSHOTS_FILE: &str = "street_snapshots.csv";
pub const TRAFFIC_LOAD_FILE: &str = "traffic_load.csv";
pub const STEP_SUMMARIES_FILE: &str = "step_summaries.csv";

/// Writes simulation output to CSV files.
pub struct CsvWriter {
    nodes:     Writer<File>,
    streets:   Writer<File>,
    load:      Writer<File>,
    summaries: Writer<File>,
    finished:  bool,
}

/// Create `path` and write `header`.  Rows are serialized without serde's
/// automatic header so that files of empty runs still carry one.
fn open(path: &Path, header: &[&str]) -> OutputResult<Writer<File>> {
    let mut w = WriterBuilder::new().has_headers(false).from_path(path)?;
    w.write_record(header)?;
    Ok(w)
}

fn write_all<T: Serialize>(w: &mut Writer<File>, rows: &[T]) -> OutputResult<()> {
    for row in rows {
        w.serialize(row)?;
    }
    Ok(())
}

impl CsvWriter {
    /// Create `dir` if needed, open (or truncate) the CSV files in it, and
    /// write the header rows.
    pub fn new(dir: &Path) -> OutputResult<Self> {
        std::fs::create_dir_all(dir)?;
        Ok(Self {
            nodes:     open(&dir.join(NODES_FILE), &["node", "lon", "lat"])?,
            streets:   open(
                &dir.join(STREET_SNAPSHOTS_FILE),
                &["step", "street", "origin", "destination", "length", "max_speed", "lanes"],
            )?,
            load:      open(
                &dir.join(TRAFFIC_LOAD_FILE),
                &["step", "street", "load", "ideal_speed", "actual_speed"],
            )?,
            summaries: open(
                &dir.join(STEP_SUMMARIES_FILE),
                &[
                    "step",
                    "origins_processed",
                    "trips_assigned",
                    "trips_unreachable",
                    "trips_skipped",
                    "total_load",
                    "load_saved",
                ],
            )?,
            finished:  false,
        })
    }
}

impl OutputWriter for CsvWriter {
    fn write_nodes(&mut self, rows: &[NodeRow]) -> OutputResult<()> {
        write_all(&mut self.nodes, rows)
    }

    fn write_streets(&mut self, rows: &[StreetSnapshotRow]) -> OutputResult<()> {
        write_all(&mut self.streets, rows)
    }

    fn write_load(&mut self, rows: &[TrafficLoadRow]) -> OutputResult<()> {
        write_all(&mut self.load, rows)
    }

    fn write_step_summary(&mut self, row: &StepSummaryRow) -> OutputResult<()> {
        self.summaries.serialize(row)?;
        Ok(())
    }

    fn finish(&mut self) -> OutputResult<()> {
        if self.finished {
            return Ok(());
        }
        self.finished = true;
        self.nodes.flush()?;
        self.streets.flush()?;
        self.load.flush()?;
        self.summaries.flush()?;
        Ok(())
    }
}
