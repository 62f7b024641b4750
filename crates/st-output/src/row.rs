//! Plain data row types written by output backends and read back by the
//! checkpoint reader.

use serde::{Deserialize, Serialize};

/// One street network node.  Written once per output directory.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct NodeRow {
    pub node: i64,
    pub lon:  f64,
    pub lat:  f64,
}

/// One street's attributes as of a given step.
///
/// A full snapshot (every street) is written at the start of a run and after
/// every road construction, labelled with the first step that uses it.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct StreetSnapshotRow {
    pub step:        u64,
    pub street:      u32,
    pub origin:      i64,
    pub destination: i64,
    pub length:      f64,
    pub max_speed:   f64,
    pub lanes:       f64,
}

/// Non-zero load of one street after a given step.
///
/// `ideal_speed` is the speed model's result at zero load and `actual_speed`
/// at `load`, both in km/h under the speed limit the step ran with.  Streets
/// without a row drove at their ideal speed.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct TrafficLoadRow {
    pub step:         u64,
    pub street:       u32,
    pub load:         u32,
    pub ideal_speed:  f64,
    pub actual_speed: f64,
}

/// Summary statistics for one simulation step.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct StepSummaryRow {
    pub step:              u64,
    pub origins_processed: u64,
    pub trips_assigned:    u64,
    pub trips_unreachable: u64,
    pub trips_skipped:     u64,
    pub total_load:        u64,
    /// The step's load rows were written to `traffic_load.csv`.  Zero loads
    /// have no rows, so this is what tells an all-zero step from a skipped one.
    pub load_saved:        bool,
}
