//! # Robot Runtime Simulator
//!
//! Simulated HAL backend for the robot runtime, plus demo competition
//! programs to drive through it.
//!
//! # Module Structure
//!
//! - [`hal`] - `SimHal`, the simulated HAL boundary and its packet loop
//! - [`driver_station`] - Driver-station packet link and program state
//! - [`programs`] - Cooperative and stubborn demo competition loops
//! - [`config`] - `SimConfig` loaded from TOML

#![deny(missing_docs)]

pub mod config;
pub mod driver_station;
pub mod hal;
pub mod programs;

// Re-export key types for convenience
pub use crate::config::SimConfig;
pub use crate::driver_station::{DriverStation, UserProgramState};
pub use crate::hal::{SimHal, SimHalConfig};
pub use crate::programs::{CooperativeLoop, ProgramKind, StubbornLoop};
