//! Runtime-wide constants.
//!
//! Exit statuses, default timeouts and thread names shared by the runtime
//! core and the HAL backends.

use std::time::Duration;

/// Exit status of a run that completed normally.
pub const EXIT_SUCCESS: i32 = 0;

/// Exit status when the competition program panicked and the run was ended.
///
/// Matches the status the Rust runtime uses for an uncaught panic.
pub const EXIT_PROGRAM_PANICKED: i32 = 101;

/// Exit status when the runtime entry point is invoked a second time in
/// the same process.
pub const EXIT_ALREADY_STARTED: i32 = 102;

/// Exit status when the program worker thread could not be spawned.
pub const EXIT_SPAWN_FAILED: i32 = 103;

/// Default bounded wait for the program thread after a stop request (ms).
pub const DEFAULT_JOIN_TIMEOUT_MS: u64 = 1000;

/// Default bounded wait as Duration.
pub const DEFAULT_JOIN_TIMEOUT: Duration = Duration::from_millis(DEFAULT_JOIN_TIMEOUT_MS);

/// Default name of the thread hosting the competition loop.
pub const DEFAULT_WORKER_THREAD_NAME: &str = "robot-program";

/// Default driver-station packet period (ms). 50 Hz.
pub const DEFAULT_DS_PERIOD_MS: u64 = 20;

/// Canonical runtime service name (used for logging).
pub const RUNTIME_SERVICE_NAME: &str = "robot_runtime";
