//! The `Simulator` struct and its step loop.

use st_core::{NodeId, StreetId, TrafficConfig};
use st_network::{NetworkError, StreetGraph, shortest_path_tree};
use st_trips::Trips;

use crate::{
    CapacityAdjuster, ConstructionReport, SimBuilder, SimObserver, SimResult, SpeedModel,
    TrafficLoad,
};

// ── Step summary ──────────────────────────────────────────────────────────────

/// What one step did.
#[derive(Copy, Clone, Debug, Default, PartialEq, Eq)]
pub struct StepSummary {
    /// 1-based number of the step.
    pub step:              u64,
    /// Origins a shortest-path tree was computed for.
    pub origins_processed: usize,
    /// Trips routed to their goal and added to the load.
    pub trips_assigned:    usize,
    /// Trips whose goal is not reachable from their origin.
    pub trips_unreachable: usize,
    /// Trips whose origin or goal is not a node of the graph.
    pub trips_skipped:     usize,
    /// Sum of the load over all streets after the step.
    pub total_load:        u64,
}

/// Result of routing all trips of one origin into a load array.
struct OriginOutcome {
    origin:      NodeId,
    /// `false` if the origin is not in the graph; all its trips are skipped.
    known:       bool,
    assigned:    usize,
    unreachable: usize,
    /// Goals not in the graph.
    skipped:     Vec<NodeId>,
}

// ── Simulator ─────────────────────────────────────────────────────────────────

/// Iterative traffic assignment over an owned street graph.
///
/// Each [`step`](Self::step):
///
/// 1. **Re-weight**: every street's driving time is set from last step's
///    load through the [`SpeedModel`] and the jam tolerance.
/// 2. **Reset** the load to zero.
/// 3. **Assign**: one shortest-path search per distinct origin (ascending
///    `NodeId`); each reachable goal's path adds `trip_volume` to every
///    street on it.
/// 4. Advance the step counter.
///
/// The simulator never stops on its own; [`run`](Self::run) drives
/// `max_simulation_steps` steps with road construction in between.
///
/// Create via [`Simulator::new`], [`Simulator::resume`], or
/// [`SimBuilder`][crate::SimBuilder].
pub struct Simulator {
    pub(crate) config:        TrafficConfig,
    pub(crate) speed:         SpeedModel,
    pub(crate) graph:         StreetGraph,
    pub(crate) trips:         Trips,
    pub(crate) jam_tolerance: f64,
    pub(crate) load:          TrafficLoad,
    /// Completed steps.
    pub(crate) step:          u64,
}

impl Simulator {
    /// Fresh simulator at step 0 with an all-zero load.
    pub fn new(graph: StreetGraph, trips: Trips, config: TrafficConfig) -> SimResult<Self> {
        SimBuilder::new(config, graph, trips).build()
    }

    /// Simulator continuing after `step` completed steps, `load` being the
    /// load of step `step`.
    pub fn resume(
        graph:  StreetGraph,
        trips:  Trips,
        config: TrafficConfig,
        step:   u64,
        load:   Vec<u32>,
    ) -> SimResult<Self> {
        SimBuilder::new(config, graph, trips).resume_from(step, load).build()
    }

    // ── Accessors ─────────────────────────────────────────────────────────

    pub fn graph(&self) -> &StreetGraph {
        &self.graph
    }

    pub fn trips(&self) -> &Trips {
        &self.trips
    }

    /// Load of the last completed step.
    pub fn load(&self) -> &TrafficLoad {
        &self.load
    }

    /// Number of completed steps.
    pub fn step_count(&self) -> u64 {
        self.step
    }

    pub fn jam_tolerance(&self) -> f64 {
        self.jam_tolerance
    }

    pub fn config(&self) -> &TrafficConfig {
        &self.config
    }

    pub fn speed_model(&self) -> &SpeedModel {
        &self.speed
    }

    /// Give back the graph, e.g. to persist the final network.
    pub fn into_graph(self) -> StreetGraph {
        self.graph
    }

    // ── Public API ────────────────────────────────────────────────────────

    /// Run until `config.max_simulation_steps` steps are completed.
    ///
    /// Road construction runs before every step `s` (0-based count of
    /// completed steps) with `s > 0` and `s % steps_between_construction ==
    /// 0`.  A resumed simulator continues toward the same total.
    pub fn run<O: SimObserver>(&mut self, observer: &mut O) -> SimResult<()> {
        observer.on_sim_start(self.step, &self.graph);
        while self.step < self.config.max_simulation_steps {
            if self.config.construction_due(self.step) {
                self.road_construction(observer)?;
            }
            self.step(observer)?;
        }
        observer.on_sim_end(self.step);
        Ok(())
    }

    /// Run exactly one step.
    pub fn step<O: SimObserver>(&mut self, observer: &mut O) -> SimResult<StepSummary> {
        let step = self.step + 1;
        observer.on_step_start(step);

        self.reweight()?;
        self.load.reset();

        let outcomes = self.assign()?;

        let mut summary = StepSummary { step, ..StepSummary::default() };
        for outcome in outcomes {
            if !outcome.known {
                let goals = self.trips.goals(outcome.origin);
                for &goal in goals {
                    observer.on_trip_skipped(step, outcome.origin, goal);
                }
                summary.trips_skipped += goals.len();
                continue;
            }
            for &goal in &outcome.skipped {
                observer.on_trip_skipped(step, outcome.origin, goal);
            }
            summary.origins_processed += 1;
            summary.trips_assigned += outcome.assigned;
            summary.trips_unreachable += outcome.unreachable;
            summary.trips_skipped += outcome.skipped.len();
            observer.on_origin_processed(step, outcome.origin, outcome.assigned);
        }
        summary.total_load = self.load.total();

        self.step = step;
        observer.on_step_end(&summary, &self.load);
        Ok(summary)
    }

    /// Shift speed limits from the least to the most loaded streets based
    /// on the last step's load.
    pub fn road_construction<O: SimObserver>(&mut self, observer: &mut O) -> SimResult<ConstructionReport> {
        let report = CapacityAdjuster::from_config(&self.config).apply(&mut self.graph, &self.load)?;
        observer.on_construction(self.step + 1, &report, &self.graph);
        Ok(report)
    }

    // ── Step phases ───────────────────────────────────────────────────────

    /// Set every street's driving time from the current load.
    fn reweight(&mut self) -> SimResult<()> {
        let times: Vec<(StreetId, f64)> = self
            .graph
            .streets()
            .map(|s| (s.id, self.speed.driving_time(s, self.load.get(s.id), self.jam_tolerance)))
            .collect();
        for (street, time) in times {
            self.graph.set_driving_time(street, time)?;
        }
        Ok(())
    }

    /// Route every trip over the frozen weights and fill `self.load`.
    ///
    /// Outcomes come back in ascending origin order on both paths.
    fn assign(&mut self) -> SimResult<Vec<OriginOutcome>> {
        let graph = &self.graph;
        let volume = self.config.trip_volume;

        #[cfg(not(feature = "parallel"))]
        {
            let load = &mut self.load;
            self.trips
                .iter()
                .map(|(origin, goals)| route_origin(graph, origin, goals, volume, load))
                .collect()
        }

        #[cfg(feature = "parallel")]
        {
            use rayon::prelude::*;

            let street_count = graph.street_count();
            let work: Vec<(NodeId, &[NodeId])> = self.trips.iter().collect();

            // Each rayon split folds into a private load array; the reduce
            // concatenates outcomes in split order, keeping origin order.
            let (partial, outcomes) = work
                .par_iter()
                .fold(
                    || (TrafficLoad::new(street_count), Vec::new()),
                    |(mut load, mut outcomes), &(origin, goals)| {
                        outcomes.push(route_origin(graph, origin, goals, volume, &mut load));
                        (load, outcomes)
                    },
                )
                .reduce(
                    || (TrafficLoad::new(street_count), Vec::new()),
                    |(mut load_a, mut out_a), (load_b, out_b)| {
                        if let Err(e) = load_a.merge(load_b.as_slice()) {
                            out_a.push(Err(e));
                        }
                        out_a.extend(out_b);
                        (load_a, out_a)
                    },
                );

            let outcomes = outcomes.into_iter().collect::<SimResult<Vec<_>>>()?;
            self.load.merge(partial.as_slice())?;
            Ok(outcomes)
        }
    }
}

/// Route all trips of `origin` and add their paths to `load`.
fn route_origin(
    graph:  &StreetGraph,
    origin: NodeId,
    goals:  &[NodeId],
    volume: u32,
    load:   &mut TrafficLoad,
) -> SimResult<OriginOutcome> {
    let mut outcome = OriginOutcome {
        origin,
        known:       true,
        assigned:    0,
        unreachable: 0,
        skipped:     Vec::new(),
    };

    let tree = match shortest_path_tree(graph, origin) {
        Ok(tree) => tree,
        Err(NetworkError::UnknownNode(_)) => {
            outcome.known = false;
            return Ok(outcome);
        }
        Err(e) => return Err(e.into()),
    };

    for &goal in goals {
        if !graph.has_node(goal) {
            outcome.skipped.push(goal);
            continue;
        }
        match tree.streets_to(goal) {
            Some(path) => {
                for street in path {
                    load.add(street, volume)?;
                }
                outcome.assigned += 1;
            }
            None => outcome.unreachable += 1,
        }
    }
    Ok(outcome)
}
