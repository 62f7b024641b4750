//! `st-output` — persistence of simulation results for the streets
//! workspace.
//!
//! [`CsvWriter`] implements [`OutputWriter`] and is driven by
//! [`SimOutputObserver`], which implements `st_sim::SimObserver`.  The
//! [`reader`] module turns the same files back into a `StreetGraph` and a
//! load array so a run can be resumed.
//!
//! | File                   | Written                                        |
//! |------------------------|------------------------------------------------|
//! | `nodes.csv`            | once, at run start                             |
//! | `street_snapshots.csv` | at run start and after every road construction |
//! | `traffic_load.csv`     | every `output_interval_steps` steps            |
//! | `step_summaries.csv`   | every step                                     |
//!
//! # Usage
//!
//! ```rust,ignore
//! use st_output::{CsvWriter, SimOutputObserver};
//!
//! let writer = CsvWriter::new(Path::new("./output"))?;
//! let mut obs = SimOutputObserver::new(writer, &config);
//! sim.run(&mut obs)?;
//! if let Some(e) = obs.take_error() {
//!     eprintln!("output error: {e}");
//! }
//!
//! // Later: continue after step 4.
//! let graph = st_output::read_network(dir, 4)?;
//! let load = st_output::read_traffic_load(dir, 4, graph.street_count())?;
//! let sim = Simulator::resume(graph, trips, config, 4, load)?;
//! ```

pub mod csv;
pub mod error;
pub mod observer;
pub mod reader;
pub mod row;
pub mod writer;

#[cfg(test)]
mod tests;

pub use crate::csv::CsvWriter;
pub use error::{OutputError, OutputResult};
pub use observer::SimOutputObserver;
pub use reader::{read_network, read_traffic_load};
pub use row::{NodeRow, StepSummaryRow, StreetSnapshotRow, TrafficLoadRow};
pub use writer::OutputWriter;
