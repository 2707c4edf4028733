//! Thread supervisor.
//!
//! Decides where the program loop runs and, when the HAL owns the main
//! thread, drives the bounded join-or-abandon protocol.
//!
//! # Branches
//!
//! ```text
//!  has_main() == false  (Inline)        has_main() == true  (Hosted)
//!  ─────────────────────────────        ──────────────────────────────────────
//!  caller: register                     worker: register → on_start → cleanup
//!          on_start                     caller: run_main()   (blocks)
//!          deregister                           request_stop()
//!                                               wait ≤ join_timeout
//!                                                 ├─ exited  → join
//!                                                 └─ timeout → abandon
//! ```
//!
//! Either way HAL `shutdown()` is called before `Runtime::run` returns.

use crate::coordinator::LifecycleCoordinator;
use crate::error::RuntimeError;
use crate::hal::Hal;
use crate::program::ProgramHandle;
use robot_common::config::{PanicPolicy, RuntimeConfig};
use std::any::Any;
use std::panic::{self, AssertUnwindSafe};
use std::sync::Arc;
use std::thread;
use std::time::{Duration, Instant};
use tracing::{debug, error, info, warn};

/// Where the program loop ran.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Placement {
    /// On the calling thread; the HAL has no main loop.
    Inline,
    /// On a dedicated worker thread while the caller ran the HAL main loop.
    Hosted,
}

/// How the program loop ended.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RunOutcome {
    /// Inline loop returned on its own.
    Completed,
    /// Worker exited within the timeout and was joined.
    Joined,
    /// Worker did not exit within the timeout and was detached.
    Abandoned,
}

/// Summary of a finished run.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RunReport {
    /// Placement chosen from `Hal::has_main()`.
    pub placement: Placement,
    /// Join, abandon or inline completion.
    pub outcome: RunOutcome,
    /// Whether `on_stop` was dispatched during the run.
    pub stop_requested: bool,
    /// Wall time from HAL initialization to HAL shutdown.
    pub elapsed: Duration,
}

/// Cleanup that must run however `on_start` ends.
///
/// Dropping the guard deregisters the program (setting the completion flag)
/// and then, when hosted, requests `exit_main()`. The running reference is
/// already clear by the time the supervisor leaves `run_main()`.
struct CleanupGuard<'a> {
    coordinator: &'a LifecycleCoordinator,
    hal: Option<&'a dyn Hal>,
}

impl<'a> CleanupGuard<'a> {
    fn inline(coordinator: &'a LifecycleCoordinator) -> Self {
        Self {
            coordinator,
            hal: None,
        }
    }

    fn hosted(coordinator: &'a LifecycleCoordinator, hal: &'a dyn Hal) -> Self {
        Self {
            coordinator,
            hal: Some(hal),
        }
    }
}

impl Drop for CleanupGuard<'_> {
    fn drop(&mut self) {
        if thread::panicking() {
            error!("Competition program unwound; running cleanup");
        }
        self.coordinator.deregister();
        if let Some(hal) = self.hal {
            hal.exit_main();
        }
    }
}

/// Failure of a branch before HAL shutdown has run.
enum BranchError {
    Spawn(std::io::Error),
    Panicked(Box<dyn Any + Send + 'static>),
}

/// One HAL, one coordinator, one program loop.
pub struct Runtime<H: Hal + 'static> {
    hal: Arc<H>,
    coordinator: Arc<LifecycleCoordinator>,
    config: RuntimeConfig,
}

impl<H: Hal + 'static> Runtime<H> {
    /// Create a runtime sharing an existing coordinator and HAL.
    pub fn with_coordinator(
        hal: Arc<H>,
        config: RuntimeConfig,
        coordinator: Arc<LifecycleCoordinator>,
    ) -> Self {
        Self {
            hal,
            coordinator,
            config,
        }
    }

    /// The coordinator holding the running reference.
    pub fn coordinator(&self) -> &Arc<LifecycleCoordinator> {
        &self.coordinator
    }

    /// Run `program` to completion.
    ///
    /// Initializes the HAL (fail-fast), runs the chosen branch, then always
    /// calls HAL `shutdown()`.
    ///
    /// # Errors
    /// - `RuntimeError::Hal` if HAL initialization fails; nothing else runs
    /// - `RuntimeError::SpawnFailed` if the worker thread cannot be created
    /// - `RuntimeError::ProgramPanicked` if `on_start`, or an `on_stop`
    ///   dispatched by the supervisor, panicked under `PanicPolicy::EndRun`
    ///
    /// # Panics
    /// Re-raises such a panic under `PanicPolicy::Propagate`, after HAL
    /// shutdown.
    pub fn run(&self, program: Arc<ProgramHandle>) -> Result<RunReport, RuntimeError> {
        let started = Instant::now();

        if let Err(e) = self.hal.initialize() {
            error!("HAL '{}' initialization failed: {}", self.hal.name(), e);
            return Err(e.into());
        }
        info!("HAL '{}' initialized", self.hal.name());

        self.coordinator.arm();
        let placement = if self.hal.has_main() {
            Placement::Hosted
        } else {
            Placement::Inline
        };

        let result = match placement {
            Placement::Inline => self.run_inline(program),
            Placement::Hosted => self.run_hosted(program),
        };

        info!("Shutting down HAL '{}'", self.hal.name());
        self.hal.shutdown();

        match result {
            Ok(outcome) => {
                let report = RunReport {
                    placement,
                    outcome,
                    stop_requested: self.coordinator.stop_requested(),
                    elapsed: started.elapsed(),
                };
                info!(
                    "Run finished: {:?}/{:?} after {:.3}s",
                    report.placement,
                    report.outcome,
                    report.elapsed.as_secs_f64()
                );
                Ok(report)
            }
            Err(BranchError::Spawn(e)) => {
                error!("Could not spawn program thread: {}", e);
                Err(RuntimeError::SpawnFailed(e))
            }
            Err(BranchError::Panicked(payload)) => {
                let message = panic_message(payload.as_ref());
                match self.config.panic_policy {
                    PanicPolicy::EndRun => {
                        error!("Competition program panicked: {}", message);
                        Err(RuntimeError::ProgramPanicked { message })
                    }
                    PanicPolicy::Propagate => {
                        error!("Competition program panicked, propagating: {}", message);
                        panic::resume_unwind(payload)
                    }
                }
            }
        }
    }

    fn run_inline(&self, program: Arc<ProgramHandle>) -> Result<RunOutcome, BranchError> {
        info!("HAL has no main loop; running program on the calling thread");

        let coordinator = self.coordinator.as_ref();
        panic::catch_unwind(AssertUnwindSafe(|| {
            let _cleanup = CleanupGuard::inline(coordinator);
            coordinator.register(Arc::clone(&program));
            program.start();
        }))
        .map(|()| RunOutcome::Completed)
        .map_err(BranchError::Panicked)
    }

    fn run_hosted(&self, program: Arc<ProgramHandle>) -> Result<RunOutcome, BranchError> {
        let coordinator = Arc::clone(&self.coordinator);
        let hal = Arc::clone(&self.hal);

        let worker = thread::Builder::new()
            .name(self.config.worker_thread_name.clone())
            .spawn(move || {
                let _cleanup = CleanupGuard::hosted(&coordinator, hal.as_ref());
                coordinator.register(Arc::clone(&program));
                program.start();
            })
            .map_err(BranchError::Spawn)?;

        info!(
            "Program hosted on thread '{}'; entering HAL main loop",
            self.config.worker_thread_name
        );
        self.hal.run_main();
        info!("HAL main loop returned");

        // on_stop runs on this thread; a panic in it must not skip the
        // join-or-abandon step or HAL shutdown.
        let stop_panic =
            match panic::catch_unwind(AssertUnwindSafe(|| self.coordinator.request_stop())) {
                Ok(true) => {
                    debug!("Stop dispatched to program loop");
                    None
                }
                Ok(false) => None,
                Err(payload) => {
                    error!("on_stop panicked; continuing shutdown");
                    Some(payload)
                }
            };

        let timeout = self.config.join_timeout();
        let outcome = if self.coordinator.wait_for_exit(timeout) {
            worker.join().map_err(BranchError::Panicked)?;
            debug!("Program thread joined");
            RunOutcome::Joined
        } else {
            warn!(
                "Program loop did not exit within {}ms; abandoning thread '{}'",
                timeout.as_millis(),
                self.config.worker_thread_name
            );
            drop(worker);
            RunOutcome::Abandoned
        };

        match stop_panic {
            Some(payload) => Err(BranchError::Panicked(payload)),
            None => Ok(outcome),
        }
    }
}

/// Best-effort text of a panic payload.
fn panic_message(payload: &(dyn Any + Send)) -> String {
    if let Some(s) = payload.downcast_ref::<&'static str>() {
        (*s).to_string()
    } else if let Some(s) = payload.downcast_ref::<String>() {
        s.clone()
    } else {
        "non-string panic payload".to_string()
    }
}
