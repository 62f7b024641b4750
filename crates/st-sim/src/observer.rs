//! Simulation observer trait for progress reporting and data collection.

use log::{debug, info, warn};

use st_core::NodeId;
use st_network::StreetGraph;

use crate::{ConstructionReport, StepSummary, TrafficLoad};

/// Callbacks invoked by [`Simulator`][crate::Simulator] at key points of a
/// run.
///
/// All methods have default no-op implementations so implementors only need
/// to override what they care about.  Step numbers are 1-based: the first
/// call to `step` reports step 1.
///
/// # Example — load recorder
///
/// ```rust,ignore
/// struct TotalLoad(Vec<u64>);
///
/// impl SimObserver for TotalLoad {
///     fn on_step_end(&mut self, _summary: &StepSummary, load: &TrafficLoad) {
///         self.0.push(load.total());
///     }
/// }
/// ```
pub trait SimObserver {
    /// Called once by [`run`][crate::Simulator::run] before the first step,
    /// with the number of steps already completed (non-zero after a resume).
    fn on_sim_start(&mut self, _step: u64, _graph: &StreetGraph) {}

    /// Called at the start of each step, before re-weighting.
    fn on_step_start(&mut self, _step: u64) {}

    /// Called after all goals of one origin have been assigned.
    ///
    /// `assigned` counts the trips of this origin that reached their goal.
    fn on_origin_processed(&mut self, _step: u64, _origin: NodeId, _assigned: usize) {}

    /// Called for every trip skipped because its origin or goal is not a
    /// node of the graph.
    fn on_trip_skipped(&mut self, _step: u64, _origin: NodeId, _goal: NodeId) {}

    /// Called at the end of each step with that step's load.
    fn on_step_end(&mut self, _summary: &StepSummary, _load: &TrafficLoad) {}

    /// Called after a road construction pass.
    ///
    /// `step` is the step the reshaped network will first be used for.
    fn on_construction(&mut self, _step: u64, _report: &ConstructionReport, _graph: &StreetGraph) {}

    /// Called once after the final step of [`run`][crate::Simulator::run].
    fn on_sim_end(&mut self, _final_step: u64) {}
}

/// A [`SimObserver`] that does nothing.  Use when you need to call `run` but
/// don't want progress callbacks.
pub struct NoopObserver;

impl SimObserver for NoopObserver {}

/// A [`SimObserver`] that forwards events to the [`log`] facade.
///
/// Step boundaries and construction go to `info`, skipped trips to `warn`,
/// per-origin progress to `debug`.
#[derive(Default)]
pub struct LogObserver {
    origins_seen: usize,
}

impl LogObserver {
    pub fn new() -> Self {
        Self::default()
    }
}

impl SimObserver for LogObserver {
    fn on_sim_start(&mut self, step: u64, graph: &StreetGraph) {
        info!(
            "starting at step {step}: {} nodes, {} streets",
            graph.node_count(),
            graph.street_count()
        );
    }

    fn on_step_start(&mut self, step: u64) {
        self.origins_seen = 0;
        info!("step {step}: preparing streets");
    }

    fn on_origin_processed(&mut self, step: u64, origin: NodeId, assigned: usize) {
        self.origins_seen += 1;
        debug!("step {step}: origin nr {} ({origin}), {assigned} trips assigned", self.origins_seen);
    }

    fn on_trip_skipped(&mut self, step: u64, origin: NodeId, goal: NodeId) {
        warn!("step {step}: skipped trip {origin} -> {goal}, node not in the street network");
    }

    fn on_step_end(&mut self, summary: &StepSummary, _load: &TrafficLoad) {
        info!(
            "step {} done: {} origins, {} trips assigned, {} unreachable, {} skipped, total load {}",
            summary.step,
            summary.origins_processed,
            summary.trips_assigned,
            summary.trips_unreachable,
            summary.trips_skipped,
            summary.total_load,
        );
    }

    fn on_construction(&mut self, step: u64, report: &ConstructionReport, _graph: &StreetGraph) {
        info!(
            "road construction before step {step}: {} streets slowed, {} sped up",
            report.slowed, report.sped_up
        );
    }

    fn on_sim_end(&mut self, final_step: u64) {
        info!("simulation finished after step {final_step}");
    }
}
