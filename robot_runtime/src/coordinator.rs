//! Lifecycle coordinator.
//!
//! Holds the process-wide program slot and the "currently running"
//! reference, and is the only path through which `on_stop` is invoked from
//! outside the program's own thread.
//!
//! # State
//!
//! ```text
//!            arm()             register()           deregister()
//!   Idle ───────────► Armed ─────────────► Running ─────────────► Exited
//!                                             │                     ▲
//!                                             └── request_stop() ───┘
//!                                                 (on_stop, at most once)
//! ```
//!
//! The running reference and the completion flag live under one mutex;
//! the completion flag is paired with a condvar so the supervisor can wait
//! on it with a bound.

use crate::program::ProgramHandle;
use parking_lot::{Condvar, Mutex};
use std::sync::{Arc, LazyLock, OnceLock};
use std::time::Duration;
use tracing::{debug, trace};

/// Mutable lifecycle state, always accessed under `LifecycleCoordinator::state`.
#[derive(Debug, Default)]
struct RunState {
    /// Running reference. Set while `on_start` executes.
    running: Option<Arc<ProgramHandle>>,
    /// `on_stop` has been dispatched for the current run.
    stop_requested: bool,
    /// Completion flag. Set together with clearing `running`.
    exited: bool,
}

/// Coordinates register / stop / deregister for the program loop.
#[derive(Debug, Default)]
pub struct LifecycleCoordinator {
    state: Mutex<RunState>,
    exited_cv: Condvar,
    /// Process-lifetime program slot. Written once, never freed.
    program: OnceLock<Arc<ProgramHandle>>,
}

static GLOBAL: LazyLock<Arc<LifecycleCoordinator>> =
    LazyLock::new(|| Arc::new(LifecycleCoordinator::new()));

impl LifecycleCoordinator {
    /// Create a standalone coordinator.
    ///
    /// Production code goes through [`LifecycleCoordinator::global`]; separate
    /// instances exist so runs can be exercised in isolation.
    pub fn new() -> Self {
        Self::default()
    }

    /// The process-wide coordinator.
    pub fn global() -> Arc<LifecycleCoordinator> {
        Arc::clone(&GLOBAL)
    }

    /// Place `program` in the process-lifetime slot.
    ///
    /// Returns the stored handle, or `None` if a program was already
    /// installed. Only one program per coordinator is ever accepted.
    pub fn install(&self, program: ProgramHandle) -> Option<Arc<ProgramHandle>> {
        let candidate = Arc::new(program);
        let stored = self.program.get_or_init(|| Arc::clone(&candidate));
        Arc::ptr_eq(stored, &candidate).then(|| Arc::clone(stored))
    }

    /// The installed program, if any.
    pub fn program(&self) -> Option<Arc<ProgramHandle>> {
        self.program.get().cloned()
    }

    /// Reset the completion flag ahead of a new run.
    pub fn arm(&self) {
        let mut state = self.state.lock();
        state.running = None;
        state.stop_requested = false;
        state.exited = false;
    }

    /// Publish `program` as the running reference.
    pub fn register(&self, program: Arc<ProgramHandle>) {
        let mut state = self.state.lock();
        state.running = Some(program);
        state.stop_requested = false;
        debug!("Program registered as running");
    }

    /// Ask the running program to stop.
    ///
    /// Reads the running reference under the lock and, if set and not yet
    /// stopped, invokes `on_stop` after releasing the lock. Returns whether
    /// `on_stop` was dispatched by this call.
    pub fn request_stop(&self) -> bool {
        let program = {
            let mut guard = self.state.lock();
            let state = &mut *guard;
            match state.running.as_ref() {
                Some(program) if !state.stop_requested => {
                    state.stop_requested = true;
                    Arc::clone(program)
                }
                Some(_) => {
                    trace!("Stop already requested for this run");
                    return false;
                }
                None => {
                    trace!("Stop requested with no running program");
                    return false;
                }
            }
        };

        debug!("Dispatching on_stop to running program");
        program.stop();
        true
    }

    /// Clear the running reference and set the completion flag, then wake
    /// every waiter.
    pub fn deregister(&self) {
        {
            let mut state = self.state.lock();
            state.running = None;
            state.exited = true;
        }
        self.exited_cv.notify_all();
        debug!("Program deregistered");
    }

    /// Wait up to `timeout` for the completion flag.
    ///
    /// Returns `true` if the program loop has exited.
    pub fn wait_for_exit(&self, timeout: Duration) -> bool {
        let mut state = self.state.lock();
        if !state.exited {
            let _ = self
                .exited_cv
                .wait_while_for(&mut state, |s| !s.exited, timeout);
        }
        state.exited
    }

    /// Whether a program is currently registered as running.
    pub fn is_running(&self) -> bool {
        self.state.lock().running.is_some()
    }

    /// Whether the completion flag is set.
    pub fn has_exited(&self) -> bool {
        self.state.lock().exited
    }

    /// Whether `on_stop` has been dispatched in the current run.
    pub fn stop_requested(&self) -> bool {
        self.state.lock().stop_requested
    }
}

/// Ask the program managed by the process-wide coordinator to stop.
///
/// Safe to call from any thread (e.g. a signal handler thread) at any time;
/// a no-op when nothing is running.
pub fn request_stop() -> bool {
    GLOBAL.request_stop()
}

static_assertions::assert_impl_all!(LifecycleCoordinator: Send, Sync);

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::{AtomicU32, Ordering};
    use std::thread;
    use std::time::Instant;

    fn counting_program(stops: &Arc<AtomicU32>) -> Arc<ProgramHandle> {
        let stops = Arc::clone(stops);
        Arc::new(ProgramHandle::new(
            || {},
            move || {
                stops.fetch_add(1, Ordering::SeqCst);
            },
        ))
    }

    #[test]
    fn test_request_stop_without_program_is_noop() {
        let coordinator = LifecycleCoordinator::new();
        assert!(!coordinator.request_stop());
        assert!(!coordinator.is_running());
    }

    #[test]
    fn test_request_stop_dispatches_once_per_run() {
        let stops = Arc::new(AtomicU32::new(0));
        let coordinator = LifecycleCoordinator::new();
        coordinator.arm();
        coordinator.register(counting_program(&stops));

        assert!(coordinator.request_stop());
        assert!(!coordinator.request_stop());
        assert_eq!(stops.load(Ordering::SeqCst), 1);
        assert!(coordinator.stop_requested());
    }

    #[test]
    fn test_request_stop_after_deregister_is_noop() {
        let stops = Arc::new(AtomicU32::new(0));
        let coordinator = LifecycleCoordinator::new();
        coordinator.arm();
        coordinator.register(counting_program(&stops));
        coordinator.deregister();

        assert!(!coordinator.request_stop());
        assert_eq!(stops.load(Ordering::SeqCst), 0);
        assert!(coordinator.has_exited());
    }

    #[test]
    fn test_wait_for_exit_times_out() {
        let coordinator = LifecycleCoordinator::new();
        coordinator.arm();

        let start = Instant::now();
        assert!(!coordinator.wait_for_exit(Duration::from_millis(50)));
        assert!(start.elapsed() >= Duration::from_millis(50));
    }

    #[test]
    fn test_wait_for_exit_released_by_deregister() {
        let coordinator = Arc::new(LifecycleCoordinator::new());
        coordinator.arm();

        let c = Arc::clone(&coordinator);
        let worker = thread::spawn(move || {
            thread::sleep(Duration::from_millis(20));
            c.deregister();
        });

        let start = Instant::now();
        assert!(coordinator.wait_for_exit(Duration::from_secs(5)));
        assert!(start.elapsed() < Duration::from_secs(5));
        worker.join().unwrap();
    }

    #[test]
    fn test_arm_resets_completion_flag() {
        let coordinator = LifecycleCoordinator::new();
        coordinator.deregister();
        assert!(coordinator.has_exited());

        coordinator.arm();
        assert!(!coordinator.has_exited());
        assert!(!coordinator.stop_requested());
    }

    #[test]
    fn test_install_accepts_only_first_program() {
        let coordinator = LifecycleCoordinator::new();
        assert!(coordinator.program().is_none());

        let first = coordinator.install(ProgramHandle::new(|| {}, || {}));
        assert!(first.is_some());
        assert!(coordinator.install(ProgramHandle::new(|| {}, || {})).is_none());

        let stored = coordinator.program().unwrap();
        assert!(Arc::ptr_eq(&stored, &first.unwrap()));
    }
}
