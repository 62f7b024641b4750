//! Fluent builder for constructing a [`Simulator`].

use st_core::{SimRng, TrafficConfig};
use st_network::StreetGraph;
use st_trips::Trips;

use crate::{SimError, SimResult, Simulator, SpeedModel, TrafficLoad};

/// Child stream of the master seed used for the jam tolerance draw, kept
/// apart from the stream trip generation consumes.
const JAM_TOLERANCE_STREAM: u64 = 0x6a61_6d;

/// Fluent builder for [`Simulator`].
///
/// # Required inputs
///
/// - [`TrafficConfig`] — speed model constants, trip volume, seed, …
/// - [`StreetGraph`] — the network, moved into the simulator
/// - [`Trips`] — the trip table
///
/// # Optional inputs (have defaults)
///
/// | Method                   | Default                                       |
/// |--------------------------|-----------------------------------------------|
/// | `.jam_tolerance(t)`      | `config.jam_tolerance`, else drawn from seed  |
/// | `.resume_from(step, v)`  | step 0, all-zero load                         |
///
/// # Example
///
/// ```rust,ignore
/// let mut sim = SimBuilder::new(config, graph, trips)
///     .jam_tolerance(0.6)
///     .build()?;
/// sim.run(&mut NoopObserver)?;
/// ```
pub struct SimBuilder {
    config:        TrafficConfig,
    graph:         StreetGraph,
    trips:         Trips,
    jam_tolerance: Option<f64>,
    step:          u64,
    load:          Option<Vec<u32>>,
}

impl SimBuilder {
    pub fn new(config: TrafficConfig, graph: StreetGraph, trips: Trips) -> Self {
        Self {
            config,
            graph,
            trips,
            jam_tolerance: None,
            step:          0,
            load:          None,
        }
    }

    /// Override the jam tolerance from the configuration.
    pub fn jam_tolerance(mut self, jam_tolerance: f64) -> Self {
        self.jam_tolerance = Some(jam_tolerance);
        self
    }

    /// Continue from a checkpoint: `step` steps are already done and `load`
    /// is the load of the last of them (length must equal the street count).
    pub fn resume_from(mut self, step: u64, load: Vec<u32>) -> Self {
        self.step = step;
        self.load = Some(load);
        self
    }

    /// Validate inputs and return a ready-to-run [`Simulator`].
    pub fn build(self) -> SimResult<Simulator> {
        self.config.validate()?;

        let jam_tolerance = match self.jam_tolerance.or(self.config.jam_tolerance) {
            Some(t) => t,
            None => SimRng::new(self.config.seed).child(JAM_TOLERANCE_STREAM).random::<f64>(),
        };
        if !(0.0..=1.0).contains(&jam_tolerance) {
            return Err(SimError::Config(format!(
                "jam tolerance must be in [0, 1], got {jam_tolerance}"
            )));
        }

        let street_count = self.graph.street_count();
        let load = match self.load {
            Some(v) => {
                if v.len() != street_count {
                    return Err(SimError::LoadLengthMismatch { expected: street_count, got: v.len() });
                }
                TrafficLoad::from_vec(v)
            }
            None => TrafficLoad::new(street_count),
        };

        Ok(Simulator {
            speed: SpeedModel::new(&self.config),
            config: self.config,
            graph: self.graph,
            trips: self.trips,
            jam_tolerance,
            load,
            step: self.step,
        })
    }
}
