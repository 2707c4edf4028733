//! HAL boundary trait and error types.
//!
//! This module defines:
//! - `Hal` trait - The five lifecycle operations the runtime consumes
//! - `HalError` enum - Error types for HAL operations
//!
//! Everything behind the trait (driver I/O, sensors, network tables) is
//! opaque to the runtime.

use thiserror::Error;

/// Error types for HAL operations.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum HalError {
    /// HAL initialization failed with a nonzero status code.
    #[error("HAL initialization failed (code {code}): {reason}")]
    InitFailed {
        /// Status reported by the HAL. Becomes the process exit status.
        code: i32,
        /// Human readable cause.
        reason: String,
    },
}

impl HalError {
    /// Create an initialization failure.
    ///
    /// A zero code is coerced to `-1`; a failed init must never look like
    /// a successful exit.
    pub fn init_failed(code: i32, reason: impl Into<String>) -> Self {
        Self::InitFailed {
            code: if code == 0 { -1 } else { code },
            reason: reason.into(),
        }
    }

    /// Status code carried by the error.
    pub fn code(&self) -> i32 {
        match self {
            HalError::InitFailed { code, .. } => *code,
        }
    }
}

/// The hardware abstraction layer, as seen by the lifecycle runtime.
///
/// The HAL owns process startup and shutdown and, on some platforms, the
/// primary execution thread.
///
/// # Lifecycle
///
/// 1. `initialize()` - Called once, before anything else
/// 2. `has_main()` - Decides whether the program loop is hosted on a worker
/// 3. `run_main()` - Hosted only; blocks until `exit_main()` is called
/// 4. `shutdown()` - Called once at the end, even after an abandoned loop
///
/// `exit_main()` may be called from any thread, any number of times, and
/// before or after `run_main()` has started.
pub trait Hal: Send + Sync {
    /// Returns the backend's identifier (e.g., "sim", "roborio").
    fn name(&self) -> &'static str;

    /// Bring up the HAL.
    ///
    /// # Errors
    /// Return `HalError::InitFailed` with the status the process should exit with.
    fn initialize(&self) -> Result<(), HalError>;

    /// Whether the HAL needs the calling thread for its own main loop.
    fn has_main(&self) -> bool;

    /// Run the HAL main loop on the calling thread.
    ///
    /// Blocks until a shutdown request occurs (`exit_main()`).
    fn run_main(&self);

    /// Request `run_main()` to return.
    fn exit_main(&self);

    /// Tear down the HAL.
    fn shutdown(&self);
}
