//! Simulation configuration.
//!
//! One explicit struct passed by value into the simulator and the speed
//! model.  There is no process-wide settings table.

use crate::{CoreError, CoreResult};

/// Top-level traffic assignment configuration.
///
/// Typically loaded from a JSON file by the application crate (with the
/// `serde` feature; missing keys fall back to [`Default`]) and passed to the
/// simulator.
#[derive(Clone, Debug, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(default))]
pub struct TrafficConfig {
    /// Blend weight in `[0, 1]` between congested (0) and free-flow (1)
    /// speed.  `None` draws one value per run from the seeded RNG.
    pub jam_tolerance: Option<f64>,

    /// Load units added to a street each time a trip traverses it.
    pub trip_volume: u32,

    /// Space one car occupies on a lane, metres.
    pub car_length: f64,

    /// Lower bound for the braking distance, metres.  Keeps the speed model
    /// away from zero and negative square roots on jammed streets.
    pub min_braking_distance: f64,

    /// Braking deceleration, m/s².  7.5 is typical for dry asphalt.
    pub braking_deceleration: f64,

    /// Run road construction every N steps.  0 disables it.
    pub steps_between_construction: u64,

    /// Speed limit change (km/h) applied per construction to each affected street.
    pub construction_speed_delta: f64,

    /// Number of steps a full run drives the simulator for.
    pub max_simulation_steps: u64,

    /// Number of trips to generate, one per resident.
    pub number_of_residents: usize,

    /// Draw trip origins from residential nodes and goals from commercial
    /// and industrial ones.  `false` draws both from every network node.
    pub use_attributed_nodes: bool,

    /// Master RNG seed.  The same seed always produces identical results.
    pub seed: u64,

    /// Persist the traffic load every N steps.  1 = every step.
    pub output_interval_steps: u64,
}

impl Default for TrafficConfig {
    fn default() -> Self {
        Self {
            jam_tolerance:              None,
            trip_volume:                1,
            car_length:                 4.0,
            min_braking_distance:       0.001,
            braking_deceleration:       7.5,
            steps_between_construction: 10,
            construction_speed_delta:   20.0,
            max_simulation_steps:       4,
            number_of_residents:        50,
            use_attributed_nodes:       true,
            seed:                       0,
            output_interval_steps:      1,
        }
    }
}

impl TrafficConfig {
    /// Check every value is inside the range the speed model and simulator
    /// rely on.
    pub fn validate(&self) -> CoreResult<()> {
        if let Some(t) = self.jam_tolerance {
            if !(0.0..=1.0).contains(&t) {
                return Err(CoreError::Config(format!(
                    "jam_tolerance must be in [0, 1], got {t}"
                )));
            }
        }
        if self.trip_volume == 0 {
            return Err(CoreError::Config("trip_volume must be positive".into()));
        }
        for (name, value) in [
            ("car_length", self.car_length),
            ("min_braking_distance", self.min_braking_distance),
            ("braking_deceleration", self.braking_deceleration),
        ] {
            if !(value.is_finite() && value > 0.0) {
                return Err(CoreError::Config(format!(
                    "{name} must be a positive finite number, got {value}"
                )));
            }
        }
        if !(self.construction_speed_delta.is_finite() && self.construction_speed_delta >= 0.0) {
            return Err(CoreError::Config(format!(
                "construction_speed_delta must be non-negative, got {}",
                self.construction_speed_delta
            )));
        }
        Ok(())
    }

    /// `true` if road construction is due before running step `step`
    /// (0-based count of steps already completed).
    #[inline]
    pub fn construction_due(&self, step: u64) -> bool {
        self.steps_between_construction > 0
            && step > 0
            && step.is_multiple_of(self.steps_between_construction)
    }

    /// `true` if the load of step `step` (1-based) should be persisted.
    #[inline]
    pub fn output_due(&self, step: u64) -> bool {
        self.output_interval_steps > 0 && step.is_multiple_of(self.output_interval_steps)
    }
}
