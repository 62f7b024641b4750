//! `st-trips` — the origin → goals trip table and its generator.
//!
//! # Crate layout
//!
//! | Module        | Contents                                              |
//! |---------------|-------------------------------------------------------|
//! | [`trips`]     | `Trips` (`BTreeMap<NodeId, Vec<NodeId>>`)             |
//! | [`generate`]  | `generate_trips`: one random trip per resident        |
//! | [`error`]     | `TripError`, `TripResult<T>`                          |
//!
//! Origins are kept in ascending `NodeId` order, so iterating a `Trips`
//! table is reproducible and the simulator's per-origin searches run in a
//! fixed order.

pub mod error;
pub mod generate;
pub mod trips;

#[cfg(test)]
mod tests;

pub use error::{TripError, TripResult};
pub use generate::generate_trips;
pub use trips::Trips;
