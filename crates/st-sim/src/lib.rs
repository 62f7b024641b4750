//! `st-sim` — iterative traffic assignment for the streets workspace.
//!
//! # Step loop
//!
//! ```text
//! for step in 1..=config.max_simulation_steps:
//!   ⓪ Construction — every `steps_between_construction` steps, shift speed
//!                    limits from the quietest to the busiest streets.
//!   ① Re-weight    — driving_time = length / perceived_speed(last load).
//!   ② Reset        — load := 0 for every street.
//!   ③ Assign       — one Dijkstra per distinct origin (parallel with the
//!                    `parallel` feature); walk each goal's path back to the
//!                    origin, adding `trip_volume` per street.
//! ```
//!
//! Repeating this drives the trip pattern toward an equilibrium where
//! drivers avoid the streets the previous step congested.
//!
//! # Cargo features
//!
//! | Feature    | Effect                                                 |
//! |------------|--------------------------------------------------------|
//! | `parallel` | Runs the per-origin searches on Rayon's thread pool.   |
//!
//! # Quick-start
//!
//! ```rust,ignore
//! use st_core::TrafficConfig;
//! use st_sim::{LogObserver, Simulator};
//!
//! let mut sim = Simulator::new(graph, trips, TrafficConfig::default())?;
//! sim.run(&mut LogObserver::new())?;
//! println!("total load: {}", sim.load().total());
//! ```

pub mod builder;
pub mod construction;
pub mod error;
pub mod load;
pub mod observer;
pub mod sim;
pub mod speed;


pub use builder::SimBuilder;
pub use construction::{CapacityAdjuster, ConstructionReport};
pub use error::{SimError, SimResult};
pub use load::TrafficLoad;
pub use observer::{LogObserver, NoopObserver, SimObserver};
pub use sim::{Simulator, StepSummary};
pub use speed::SpeedModel;
