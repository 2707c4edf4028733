//! Runtime error type and its mapping to process exit statuses.

use crate::hal::HalError;
use robot_common::consts::{EXIT_ALREADY_STARTED, EXIT_PROGRAM_PANICKED, EXIT_SPAWN_FAILED};
use thiserror::Error;

/// Error types for a runtime invocation.
#[derive(Debug, Error)]
pub enum RuntimeError {
    /// HAL initialization failed; nothing was started.
    #[error(transparent)]
    Hal(#[from] HalError),

    /// The runtime was already started in this process.
    #[error("robot runtime already started in this process")]
    AlreadyStarted,

    /// The program worker thread could not be spawned.
    #[error("failed to spawn program thread: {0}")]
    SpawnFailed(#[source] std::io::Error),

    /// The competition program panicked inside `on_start`.
    #[error("competition program panicked: {message}")]
    ProgramPanicked {
        /// Panic message, if it was a string payload.
        message: String,
    },
}

impl RuntimeError {
    /// Process exit status for this error.
    pub fn exit_code(&self) -> i32 {
        match self {
            RuntimeError::Hal(e) => e.code(),
            RuntimeError::AlreadyStarted => EXIT_ALREADY_STARTED,
            RuntimeError::SpawnFailed(_) => EXIT_SPAWN_FAILED,
            RuntimeError::ProgramPanicked { .. } => EXIT_PROGRAM_PANICKED,
        }
    }
}
