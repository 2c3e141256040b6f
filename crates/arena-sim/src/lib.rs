//! Headless arena simulation.
//!
//! Runs the combat core against a scripted player on a fixed timestep and
//! reports what happened. Used for balance runs and soak testing without a
//! window or GPU.

#![warn(missing_docs)]
#![warn(clippy::all)]
#![deny(clippy::unwrap_used)]

/// Camera used for render snapshots
pub mod camera;
/// TOML-backed run configuration
pub mod config;
/// Effect sink that counts requests
pub mod effects;
/// Scripted player double
pub mod player;
/// Simulation loop and summary
pub mod sim;

pub use config::{PlayerConfig, SimConfig, CONFIG_FILE};
pub use sim::{SimSummary, Simulation, StopReason};
