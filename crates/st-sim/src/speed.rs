//! Capacity-based speed model.
//!
//! Cars on a street share its length evenly.  Each car keeps a braking
//! distance to the one in front, and drives as fast as that distance allows:
//!
//! ```text
//! space_per_car    = length · lanes / max(load, lanes)        m
//! braking_distance = max(space_per_car − car_length, min_braking_distance)
//! potential_speed  = √(2 · deceleration · braking_distance)  m/s
//! actual_speed     = min(max_speed, potential_speed · 3.6)    km/h
//! ```
//!
//! Drivers do not react fully to congestion.  The jam tolerance blends the
//! loaded speed with the empty-street speed:
//!
//! ```text
//! perceived = actual(load) + (actual(0) − actual(load)) · jam_tolerance
//! driving_time = length / perceived
//! ```
//!
//! `min_braking_distance > 0` and `max_speed ≥ 1` keep every speed positive,
//! so driving times are always finite and positive.

use st_core::TrafficConfig;
use st_network::Street;

/// km/h per m/s.
const KMH_PER_MS: f64 = 3.6;

#[derive(Copy, Clone, Debug, PartialEq)]
pub struct SpeedModel {
    pub car_length:           f64,
    pub min_braking_distance: f64,
    pub braking_deceleration: f64,
}

impl SpeedModel {
    pub fn new(config: &TrafficConfig) -> Self {
        Self {
            car_length:           config.car_length,
            min_braking_distance: config.min_braking_distance,
            braking_deceleration: config.braking_deceleration,
        }
    }

    /// Speed (km/h) on a street of `length_m` metres with `lanes` lanes and
    /// `load` cars on it.  Non-increasing in `load`.
    pub fn driving_speed(&self, length_m: f64, max_speed_kmh: f64, load: u32, lanes: f64) -> f64 {
        let space_per_car = length_m * lanes / f64::from(load).max(lanes);
        let braking_distance = (space_per_car - self.car_length).max(self.min_braking_distance);
        let potential_ms = (2.0 * self.braking_deceleration * braking_distance).sqrt();
        max_speed_kmh.min(potential_ms * KMH_PER_MS)
    }

    /// Speed drivers act on, given their jam tolerance in `[0, 1]`.
    pub fn perceived_speed(
        &self,
        length_m:      f64,
        max_speed_kmh: f64,
        load:          u32,
        lanes:         f64,
        jam_tolerance: f64,
    ) -> f64 {
        let ideal = self.driving_speed(length_m, max_speed_kmh, 0, lanes);
        let actual = self.driving_speed(length_m, max_speed_kmh, load, lanes);
        actual + (ideal - actual) * jam_tolerance
    }

    /// Edge weight for `street` under `load`.
    pub fn driving_time(&self, street: &Street, load: u32, jam_tolerance: f64) -> f64 {
        let perceived = self.perceived_speed(
            street.length_m,
            street.max_speed_kmh,
            load,
            street.lanes,
            jam_tolerance,
        );
        street.length_m / perceived
    }
}

impl Default for SpeedModel {
    fn default() -> Self {
        Self::new(&TrafficConfig::default())
    }
}
