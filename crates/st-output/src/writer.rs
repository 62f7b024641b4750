//! The `OutputWriter` trait implemented by backend writers.

use crate::{NodeRow, OutputResult, StepSummaryRow, StreetSnapshotRow, TrafficLoadRow};

/// Sink for simulation output.
///
/// Backends return their errors; [`SimOutputObserver`] keeps the first one
/// for [`SimOutputObserver::take_error`] and carries on.
///
/// [`SimOutputObserver`]: crate::SimOutputObserver
///
/// [`SimOutputObserver::take_error`]: crate::SimOutputObserver::take_error
pub trait OutputWriter {
    /// Write the network's nodes.
    fn write_nodes(&mut self, rows: &[NodeRow]) -> OutputResult<()>;

    /// Write one full street snapshot.
    fn write_streets(&mut self, rows: &[StreetSnapshotRow]) -> OutputResult<()>;

    /// Write the non-zero loads of one step.
    fn write_load(&mut self, rows: &[TrafficLoadRow]) -> OutputResult<()>;

    /// Write one step summary row.
    fn write_step_summary(&mut self, row: &StepSummaryRow) -> OutputResult<()>;

    /// Flush every open file.  Calling it twice is harmless.
    fn finish(&mut self) -> OutputResult<()>;
}
