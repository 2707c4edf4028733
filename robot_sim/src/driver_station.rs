//! Simulated driver-station link.
//!
//! The HAL publishes one packet per period; competition programs block on
//! [`DriverStation::wait_for_data_with_timeout`] to pace their loop and
//! report their own state back with the `observe_*` calls.

use parking_lot::{Condvar, Mutex};
use std::sync::Arc;
use std::time::Duration;
use tracing::debug;

/// Program state as last reported by the competition program.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum UserProgramState {
    /// Nothing reported yet.
    #[default]
    NotStarted,
    /// The program finished setup and entered its loop.
    Starting,
    /// Running while the robot is disabled.
    Disabled,
    /// Running under operator control.
    Teleop,
}

#[derive(Debug, Default)]
struct DsState {
    packets: u64,
    enabled: bool,
    program_state: UserProgramState,
}

#[derive(Debug, Default)]
struct DsInner {
    state: Mutex<DsState>,
    data_cv: Condvar,
}

/// Cloneable handle to the driver-station link.
#[derive(Debug, Clone, Default)]
pub struct DriverStation {
    inner: Arc<DsInner>,
}

impl DriverStation {
    /// Create a link with no packets yet.
    pub fn new() -> Self {
        Self::default()
    }

    /// Publish a new packet and wake every waiting program.
    ///
    /// Returns the packet count after publishing.
    pub fn publish_packet(&self, enabled: bool) -> u64 {
        let count = {
            let mut state = self.inner.state.lock();
            state.packets += 1;
            state.enabled = enabled;
            state.packets
        };
        self.inner.data_cv.notify_all();
        count
    }

    /// Block until a packet newer than the current one arrives, or until
    /// `timeout` elapses.
    ///
    /// Returns `true` if new data arrived.
    pub fn wait_for_data_with_timeout(&self, timeout: Duration) -> bool {
        let mut state = self.inner.state.lock();
        let seen = state.packets;
        let result = self
            .inner
            .data_cv
            .wait_while_for(&mut state, |s| s.packets == seen, timeout);
        !result.timed_out() || state.packets != seen
    }

    /// Number of packets published so far.
    pub fn packet_count(&self) -> u64 {
        self.inner.state.lock().packets
    }

    /// Whether the last packet had the robot enabled.
    pub fn is_enabled(&self) -> bool {
        self.inner.state.lock().enabled
    }

    /// Report that the program finished setup.
    pub fn observe_user_program_starting(&self) {
        self.observe(UserProgramState::Starting);
    }

    /// Report that the program is running while disabled.
    pub fn observe_user_program_disabled(&self) {
        self.observe(UserProgramState::Disabled);
    }

    /// Report that the program is running under operator control.
    pub fn observe_user_program_teleop(&self) {
        self.observe(UserProgramState::Teleop);
    }

    /// Last state reported by the program.
    pub fn program_state(&self) -> UserProgramState {
        self.inner.state.lock().program_state
    }

    fn observe(&self, new_state: UserProgramState) {
        let mut state = self.inner.state.lock();
        if state.program_state != new_state {
            debug!("User program state {:?} -> {:?}", state.program_state, new_state);
            state.program_state = new_state;
        }
    }
}
