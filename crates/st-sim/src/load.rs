//! Per-street traffic load.

use st_core::StreetId;

use crate::{SimError, SimResult};

/// Dense load counter, one slot per street, indexed by [`StreetId`].
///
/// Reset to zero at the start of every step and filled while trips are
/// assigned.  Its length always equals the graph's street count.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct TrafficLoad {
    counts: Vec<u32>,
}

impl TrafficLoad {
    /// All-zero load for `street_count` streets.
    pub fn new(street_count: usize) -> Self {
        Self { counts: vec![0; street_count] }
    }

    pub fn from_vec(counts: Vec<u32>) -> Self {
        Self { counts }
    }

    pub fn len(&self) -> usize {
        self.counts.len()
    }

    pub fn is_empty(&self) -> bool {
        self.counts.is_empty()
    }

    pub fn reset(&mut self) {
        self.counts.fill(0);
    }

    /// Load on `street`; 0 for an index out of range.
    #[inline]
    pub fn get(&self, street: StreetId) -> u32 {
        self.counts.get(street.index()).copied().unwrap_or(0)
    }

    /// Add `volume` to `street`.
    ///
    /// # Errors
    /// [`SimError::LoadOverflow`] if the counter would exceed `u32::MAX`; the
    /// slot is left unchanged.
    #[inline]
    pub fn add(&mut self, street: StreetId, volume: u32) -> SimResult<()> {
        let slot = &mut self.counts[street.index()];
        *slot = slot.checked_add(volume).ok_or(SimError::LoadOverflow(street))?;
        Ok(())
    }

    /// Element-wise sum with another load array of the same length.
    ///
    /// # Errors
    /// [`SimError::LoadOverflow`] for the first street whose sum overflows.
    pub fn merge(&mut self, other: &[u32]) -> SimResult<()> {
        for (i, (a, b)) in self.counts.iter_mut().zip(other).enumerate() {
            *a = a.checked_add(*b).ok_or(SimError::LoadOverflow(StreetId(i as u32)))?;
        }
        Ok(())
    }

    /// Sum over all streets.
    pub fn total(&self) -> u64 {
        self.counts.iter().map(|&c| u64::from(c)).sum()
    }

    pub fn as_slice(&self) -> &[u32] {
        &self.counts
    }

    /// `(street, load)` for every street with a non-zero load, in index order.
    pub fn iter_nonzero(&self) -> impl Iterator<Item = (StreetId, u32)> + '_ {
        self.counts
            .iter()
            .enumerate()
            .filter(|(_, c)| **c > 0)
            .map(|(i, &c)| (StreetId(i as u32), c))
    }

    pub fn into_vec(self) -> Vec<u32> {
        self.counts
    }
}
