//! `SimOutputObserver<W>` — bridges `SimObserver` to an `OutputWriter`.

use st_core::TrafficConfig;
use st_network::{Street, StreetGraph};
use st_sim::{ConstructionReport, SimObserver, SpeedModel, StepSummary, TrafficLoad};

use crate::row::{NodeRow, StepSummaryRow, StreetSnapshotRow, TrafficLoadRow};
use crate::writer::OutputWriter;
use crate::{OutputError, OutputResult};

/// Node rows for every node of `graph`, in insertion order.
pub fn node_rows(graph: &StreetGraph) -> Vec<NodeRow> {
    graph
        .nodes()
        .map(|n| NodeRow { node: n.id.0, lon: n.pos.lon, lat: n.pos.lat })
        .collect()
}

/// A full street snapshot of `graph`, labelled `step`.
pub fn snapshot_rows(step: u64, graph: &StreetGraph) -> Vec<StreetSnapshotRow> {
    graph
        .streets()
        .map(|s| StreetSnapshotRow {
            step,
            street:      s.id.0,
            origin:      s.origin.0,
            destination: s.destination.0,
            length:      s.length_m,
            max_speed:   s.max_speed_kmh,
            lanes:       s.lanes,
        })
        .collect()
}

/// Non-zero load rows of one step.  `streets` are the streets the step ran
/// on, indexed by id; loads on streets missing from it are not reported.
pub fn load_rows(step: u64, load: &TrafficLoad, streets: &[Street], speed: &SpeedModel) -> Vec<TrafficLoadRow> {
    load.iter_nonzero()
        .filter_map(|(id, load)| {
            let s = streets.get(id.index())?;
            Some(TrafficLoadRow {
                step,
                street:       id.0,
                load,
                ideal_speed:  speed.driving_speed(s.length_m, s.max_speed_kmh, 0, s.lanes),
                actual_speed: speed.driving_speed(s.length_m, s.max_speed_kmh, load, s.lanes),
            })
        })
        .collect()
}

/// A [`SimObserver`] that persists the network and the traffic load to any
/// [`OutputWriter`] backend.
///
/// | Event            | Written                                          |
/// |------------------|--------------------------------------------------|
/// | run start        | nodes (once) and a street snapshot               |
/// | construction     | a street snapshot for the next step              |
/// | step end         | summary row; load rows every `output_interval_steps` |
/// | run end          | flush                                            |
///
/// Errors from the writer are stored internally because `SimObserver` methods
/// have no return value.  After `sim.run()` returns, check for errors with
/// [`take_error`][Self::take_error].
pub struct SimOutputObserver<W: OutputWriter> {
    writer:        W,
    config:        TrafficConfig,
    speed:         SpeedModel,
    /// Streets as of the latest snapshot, for the speed columns.
    streets:       Vec<Street>,
    nodes_written: bool,
    last_error:    Option<OutputError>,
}

impl<W: OutputWriter> SimOutputObserver<W> {
    /// Create an observer backed by `writer`, using `config` for the load
    /// output interval.
    pub fn new(writer: W, config: &TrafficConfig) -> Self {
        Self {
            writer,
            config:        config.clone(),
            speed:         SpeedModel::new(config),
            streets:       Vec::new(),
            nodes_written: false,
            last_error:    None,
        }
    }

    /// Take the stored write error (if any) after `sim.run()` returns.
    ///
    /// Returns `None` if all writes succeeded.
    pub fn take_error(&mut self) -> Option<OutputError> {
        self.last_error.take()
    }

    /// Unwrap the inner writer (e.g. to inspect files after the sim).
    pub fn into_writer(self) -> W {
        self.writer
    }

    fn store_err(&mut self, result: OutputResult<()>) {
        if let Err(e) = result {
            // Keep only the first error.
            if self.last_error.is_none() {
                self.last_error = Some(e);
            }
        }
    }
}

impl<W: OutputWriter> SimObserver for SimOutputObserver<W> {
    fn on_sim_start(&mut self, step: u64, graph: &StreetGraph) {
        if !self.nodes_written {
            self.nodes_written = true;
            let result = self.writer.write_nodes(&node_rows(graph));
            self.store_err(result);
        }
        let result = self.writer.write_streets(&snapshot_rows(step, graph));
        self.store_err(result);
        self.streets = graph.streets().cloned().collect();
    }

    fn on_step_end(&mut self, summary: &StepSummary, load: &TrafficLoad) {
        let load_saved = self.config.output_due(summary.step);
        let row = StepSummaryRow {
            step:              summary.step,
            origins_processed: summary.origins_processed as u64,
            trips_assigned:    summary.trips_assigned as u64,
            trips_unreachable: summary.trips_unreachable as u64,
            trips_skipped:     summary.trips_skipped as u64,
            total_load:        summary.total_load,
            load_saved,
        };
        let result = self.writer.write_step_summary(&row);
        self.store_err(result);

        if load_saved {
            let rows = load_rows(summary.step, load, &self.streets, &self.speed);
            if !rows.is_empty() {
                let result = self.writer.write_load(&rows);
                self.store_err(result);
            }
        }
    }

    fn on_construction(&mut self, step: u64, _report: &ConstructionReport, graph: &StreetGraph) {
        let result = self.writer.write_streets(&snapshot_rows(step, graph));
        self.store_err(result);
        self.streets = graph.streets().cloned().collect();
    }

    fn on_sim_end(&mut self, _final_step: u64) {
        let result = self.writer.finish();
        self.store_err(result);
    }
}
