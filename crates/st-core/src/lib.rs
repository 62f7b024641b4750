//! `st-core` — foundational types for the `streets` traffic assignment
//! workspace.
//!
//! This crate is a dependency of every other `st-*` crate.  It intentionally
//! has no `st-*` dependencies and minimal external ones (only `rand` and
//! `thiserror`, plus optional `serde`).
//!
//! # What lives here
//!
//! | Module          | Contents                                              |
//! |-----------------|-------------------------------------------------------|
//! | [`ids`]         | `NodeId` (external), `NodeIndex`, `StreetId`          |
//! | [`geo`]         | `GeoPoint`, `Bounds`, haversine distance              |
//! | [`config`]      | `TrafficConfig` and its defaults                      |
//! | [`rng`]         | `SimRng` (seeded, deterministic)                      |
//! | [`error`]       | `CoreError`, `CoreResult`                             |
//!
//! # Feature flags
//!
//! | Flag    | Effect                                                     |
//! |---------|------------------------------------------------------------|
//! | `serde` | Adds `Serialize`/`Deserialize` to all public types.        |

pub mod config;
pub mod error;
pub mod geo;
pub mod ids;
pub mod rng;


// ── Re-exports ────────────────────────────────────────────────────────────────

pub use config::TrafficConfig;
pub use error::{CoreError, CoreResult};
pub use geo::{Bounds, GeoPoint};
pub use ids::{NodeId, NodeIndex, StreetId};
pub use rng::SimRng;
