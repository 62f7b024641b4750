//! Road construction: move capacity from quiet streets to busy ones.
//!
//! Streets are ranked by last step's load, ascending, ties by street index.
//! The quietest `⌊0.15·N⌋` streets lose `delta` km/h of speed limit and the
//! busiest `⌊0.05·N⌋` gain the same amount.
//!
//! A change that hits the `[1, 140]` clamp does not count: the window it
//! belongs to grows by one so the next street in rank order is tried
//! instead.  Adjustment stops as soon as the two windows would meet, so no
//! street is touched twice in one pass.
//!
//! A partially applied change counts as clamped too, even though the street
//! still moves to the bound.  On a network where most streets sit near the
//! floor the slow window therefore keeps growing until it meets the fast
//! one: with 24 streets at 10 km/h and a 20 km/h delta, 20 streets drop to
//! 1 km/h and one street is sped up.
//!
//! With fewer than 20 streets the top window is empty.  There is then no
//! busy street to hand capacity to, and the pass leaves the graph untouched.

use log::debug;

use st_core::{StreetId, TrafficConfig};
use st_network::StreetGraph;

use crate::{SimError, SimResult, TrafficLoad};

/// Share of streets (quietest first) that get slower.
pub const SLOW_DOWN_SHARE: f64 = 0.15;

/// Share of streets (busiest first) that get faster.
pub const SPEED_UP_SHARE: f64 = 0.05;

/// Outcome of one construction pass.
#[derive(Copy, Clone, Debug, Default, PartialEq, Eq)]
pub struct ConstructionReport {
    /// Streets whose speed limit was lowered.
    pub slowed:  usize,
    /// Streets whose speed limit was raised.
    pub sped_up: usize,
    /// Requests that hit the speed clamp and were not counted.
    pub clamped: usize,
}

impl ConstructionReport {
    pub fn changed(&self) -> usize {
        self.slowed + self.sped_up
    }
}

#[derive(Copy, Clone, Debug, PartialEq)]
pub struct CapacityAdjuster {
    /// Speed limit shift in km/h, applied downward and upward.
    pub delta: f64,
}

impl CapacityAdjuster {
    pub fn new(delta: f64) -> Self {
        Self { delta }
    }

    pub fn from_config(config: &TrafficConfig) -> Self {
        Self::new(config.construction_speed_delta)
    }

    /// Run one pass over `graph` ranked by `load`.
    ///
    /// Only speed limits change; driving times are recomputed by the next
    /// step's re-weighting.
    pub fn apply(&self, graph: &mut StreetGraph, load: &TrafficLoad) -> SimResult<ConstructionReport> {
        let n = graph.street_count();
        if load.len() != n {
            return Err(SimError::LoadLengthMismatch { expected: n, got: load.len() });
        }

        let mut report = ConstructionReport::default();
        let bottom = (SLOW_DOWN_SHARE * n as f64).floor() as usize;
        let top = (SPEED_UP_SHARE * n as f64).floor() as usize;
        if bottom == 0 || top == 0 || self.delta == 0.0 {
            debug!("road construction skipped: {n} streets leave an empty window");
            return Ok(report);
        }

        let mut ranked: Vec<StreetId> = (0..n as u32).map(StreetId).collect();
        ranked.sort_by_key(|&s| (load.get(s), s));

        // Slow window is ranked[..slow_end], fast window is ranked[fast_start..].
        let mut slow_end = bottom;
        let mut fast_start = n - top;

        for i in 0..n {
            if slow_end >= fast_start {
                break;
            }
            if i < slow_end {
                if graph.change_max_speed(ranked[i], -self.delta)?.is_real() {
                    report.slowed += 1;
                } else {
                    report.clamped += 1;
                    slow_end += 1;
                }
            }
            if slow_end >= fast_start {
                break;
            }
            let j = n - 1 - i;
            if j >= fast_start {
                if graph.change_max_speed(ranked[j], self.delta)?.is_real() {
                    report.sped_up += 1;
                } else {
                    report.clamped += 1;
                    fast_start -= 1;
                }
            }
            if i >= slow_end && j < fast_start {
                break;
            }
        }

        debug!(
            "road construction: {} slowed, {} sped up, {} clamped",
            report.slowed, report.sped_up, report.clamped
        );
        Ok(report)
    }
}
