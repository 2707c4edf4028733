//! Prelude module for common re-exports.
//!
//! ```rust
//! use robot_common::prelude::*;
//! ```

// ─── Logging ────────────────────────────────────────────────────────
pub use crate::config::LogLevel;

// ─── Configuration ──────────────────────────────────────────────────
pub use crate::config::{ConfigError, ConfigLoader, PanicPolicy, RuntimeConfig, SharedConfig};

// ─── Constants ──────────────────────────────────────────────────────
pub use crate::consts::{
    DEFAULT_JOIN_TIMEOUT, EXIT_ALREADY_STARTED, EXIT_PROGRAM_PANICKED, EXIT_SPAWN_FAILED,
    EXIT_SUCCESS,
};
