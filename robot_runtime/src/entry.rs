//! Process entry point.
//!
//! Only one invocation per process is supported: the program handle is
//! placed in the process-wide coordinator's slot and lives until exit,
//! possibly outliving the runtime if its thread was abandoned.

use crate::coordinator::LifecycleCoordinator;
use crate::error::RuntimeError;
use crate::hal::Hal;
use crate::program::ProgramHandle;
use crate::supervisor::Runtime;
use robot_common::config::RuntimeConfig;
use robot_common::consts::EXIT_SUCCESS;
use std::sync::Arc;
use tracing::{error, warn};

/// Start the robot runtime with default settings.
///
/// Returns `0` after a normal run, or the HAL's nonzero status if HAL
/// initialization failed (in which case neither hook is ever invoked).
///
/// # Example
///
/// ```rust,ignore
/// fn main() {
///     let code = robot_runtime::start_robot_runtime(MyHal::new(), run_loop, stop_loop);
///     std::process::exit(code);
/// }
/// ```
pub fn start_robot_runtime<H, S, T>(hal: H, on_start: S, on_stop: T) -> i32
where
    H: Hal + 'static,
    S: Fn() + Send + Sync + 'static,
    T: Fn() + Send + Sync + 'static,
{
    start_robot_runtime_with_config(hal, RuntimeConfig::default(), on_start, on_stop)
}

/// Start the robot runtime with explicit lifecycle settings.
///
/// An invalid `config` is replaced by the defaults. A second call in the
/// same process returns `EXIT_ALREADY_STARTED` without touching the HAL.
pub fn start_robot_runtime_with_config<H, S, T>(
    hal: H,
    config: RuntimeConfig,
    on_start: S,
    on_stop: T,
) -> i32
where
    H: Hal + 'static,
    S: Fn() + Send + Sync + 'static,
    T: Fn() + Send + Sync + 'static,
{
    start_robot_runtime_with_handle(hal, config, ProgramHandle::new(on_start, on_stop))
}

/// Start the robot runtime with a prebuilt program handle.
///
/// Same contract as [`start_robot_runtime_with_config`].
pub fn start_robot_runtime_with_handle<H>(
    hal: H,
    config: RuntimeConfig,
    program: ProgramHandle,
) -> i32
where
    H: Hal + 'static,
{
    let config = match config.validate() {
        Ok(()) => config,
        Err(e) => {
            warn!("Invalid runtime config ({}); using defaults", e);
            RuntimeConfig::default()
        }
    };

    let coordinator = LifecycleCoordinator::global();
    let Some(program) = coordinator.install(program) else {
        let err = RuntimeError::AlreadyStarted;
        error!("{}", err);
        return err.exit_code();
    };

    let runtime = Runtime::with_coordinator(Arc::new(hal), config, coordinator);
    match runtime.run(program) {
        Ok(_) => EXIT_SUCCESS,
        Err(e) => {
            error!("Robot runtime ended with error: {}", e);
            e.exit_code()
        }
    }
}
