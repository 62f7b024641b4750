//! Random trip generation.
//!
//! Every resident gets exactly one trip: an origin drawn uniformly from the
//! origin candidates (typically residential nodes) and an independent goal
//! drawn uniformly from the goal candidates (commercial and industrial
//! nodes).  Draws go through the run's [`SimRng`], so the same seed and the
//! same candidate order always give the same table.

use log::debug;

use st_core::{NodeId, SimRng};

use crate::{TripError, TripResult, Trips};

/// Generate `residents` trips.
///
/// # Errors
///
/// [`TripError::NoCandidates`] if `residents > 0` and either candidate slice
/// is empty.
pub fn generate_trips(
    residents: usize,
    origins:   &[NodeId],
    goals:     &[NodeId],
    rng:       &mut SimRng,
) -> TripResult<Trips> {
    let mut trips = Trips::new();
    for _ in 0..residents {
        let origin = rng.pick(origins).ok_or(TripError::NoCandidates("origin"))?;
        let goal = rng.pick(goals).ok_or(TripError::NoCandidates("goal"))?;
        trips.push(origin, goal);
    }
    debug!(
        "generated {} trips from {} distinct origins",
        trips.len(),
        trips.origin_count()
    );
    Ok(trips)
}
