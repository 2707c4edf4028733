//! Program handle: the user's competition loop as two plain callables.

use std::fmt;

type Hook = Box<dyn Fn() + Send + Sync + 'static>;

/// Start/stop hooks of a competition program.
///
/// `on_start` runs the competition loop and only returns when the
/// competition is over. `on_stop` asks a running `on_start` to return; it
/// may be called from another thread while `on_start` is still executing,
/// and must be safe to call near the loop's natural end.
///
/// Immutable once constructed.
pub struct ProgramHandle {
    on_start: Hook,
    on_stop: Hook,
}

impl ProgramHandle {
    /// Build a handle from a start and a stop callable.
    pub fn new<S, T>(on_start: S, on_stop: T) -> Self
    where
        S: Fn() + Send + Sync + 'static,
        T: Fn() + Send + Sync + 'static,
    {
        Self {
            on_start: Box::new(on_start),
            on_stop: Box::new(on_stop),
        }
    }

    /// Run the competition loop. Blocks for the competition's duration.
    pub fn start(&self) {
        (self.on_start)();
    }

    /// Signal the competition loop to exit.
    pub fn stop(&self) {
        (self.on_stop)();
    }
}

impl fmt::Debug for ProgramHandle {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ProgramHandle").finish_non_exhaustive()
    }
}

static_assertions::assert_impl_all!(ProgramHandle: Send, Sync);
