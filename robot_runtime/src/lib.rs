//! # Robot Runtime
//!
//! Lifecycle coordinator between a hardware abstraction layer (HAL) and a
//! user-supplied competition loop.
//!
//! The user program is two plain callables, `on_start` (runs the loop,
//! blocks for the whole competition) and `on_stop` (asks the loop to
//! return). The runtime initializes the HAL, places the loop on the right
//! thread, forwards the HAL's shutdown request into `on_stop`, and
//! guarantees the process can always proceed to HAL shutdown, abandoning a
//! loop that does not exit within the join timeout.
//!
//! # Module Structure
//!
//! - [`hal`] - `Hal` boundary trait, `HalError`
//! - [`program`] - `ProgramHandle` (start/stop callables)
//! - [`coordinator`] - `LifecycleCoordinator`, running reference, completion flag
//! - [`supervisor`] - `Runtime`, inline/hosted placement, join-or-abandon
//! - [`entry`] - `start_robot_runtime` process entry point
//! - [`error`] - `RuntimeError` and exit statuses
//!
//! # Architecture
//!
//! ```text
//! ┌──────────────────────────────────────────────────────────────────┐
//! │                    start_robot_runtime()                         │
//! │  ┌─────────────┐    ┌──────────────┐    ┌─────────────────────┐  │
//! │  │ Hal (trait) │◄──►│   Runtime    │◄──►│ LifecycleCoordinator│  │
//! │  │             │    │ (supervisor) │    │  running / exited   │  │
//! │  └─────────────┘    └──────┬───────┘    └──────────┬──────────┘  │
//! │                            │ spawn / inline        │ on_stop     │
//! │                            ▼                       ▼             │
//! │                   ┌─────────────────────────────────────┐        │
//! │                   │ ProgramHandle { on_start, on_stop } │        │
//! │                   └─────────────────────────────────────┘        │
//! └──────────────────────────────────────────────────────────────────┘
//! ```

#![deny(missing_docs)]

pub mod coordinator;
pub mod entry;
pub mod error;
pub mod hal;
pub mod program;
pub mod supervisor;

// Re-export key types for convenience
pub use crate::coordinator::{LifecycleCoordinator, request_stop};
pub use crate::entry::{
    start_robot_runtime, start_robot_runtime_with_config, start_robot_runtime_with_handle,
};
pub use crate::error::RuntimeError;
pub use crate::hal::{Hal, HalError};
pub use crate::program::ProgramHandle;
pub use crate::supervisor::{Placement, RunOutcome, RunReport, Runtime};
