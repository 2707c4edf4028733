//! Demo competition programs.
//!
//! Both loops pace themselves on driver-station packets and report their
//! state the way a real robot program does. They differ only in how they
//! treat `on_stop`.

use crate::driver_station::DriverStation;
use robot_runtime::ProgramHandle;
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, AtomicU64, Ordering};
use std::time::Duration;
use tracing::info;

/// How long one loop iteration waits for a packet.
const PACKET_WAIT: Duration = Duration::from_millis(100);

/// Which demo program to run.
#[derive(Debug, Clone, Copy, PartialEq, Eq, clap::ValueEnum)]
pub enum ProgramKind {
    /// Exits promptly when asked to stop.
    Cooperative,
    /// Ignores stop requests; gets abandoned.
    Stubborn,
}

/// One iteration of the shared control loop body.
fn control_step(ds: &DriverStation, cycles: &AtomicU64) {
    ds.wait_for_data_with_timeout(PACKET_WAIT);
    if ds.is_enabled() {
        ds.observe_user_program_teleop();
    } else {
        ds.observe_user_program_disabled();
    }
    cycles.fetch_add(1, Ordering::Relaxed);
}

/// Competition loop that exits once `stop()` has been called, or after an
/// optional number of cycles.
#[derive(Debug)]
pub struct CooperativeLoop {
    ds: DriverStation,
    stop: AtomicBool,
    cycles: AtomicU64,
    max_cycles: Option<u64>,
}

impl CooperativeLoop {
    /// Create a loop fed by `ds`.
    pub fn new(ds: DriverStation, max_cycles: Option<u64>) -> Self {
        Self {
            ds,
            stop: AtomicBool::new(false),
            cycles: AtomicU64::new(0),
            max_cycles,
        }
    }

    /// Run until stopped or until the cycle limit is reached.
    pub fn run(&self) {
        self.ds.observe_user_program_starting();
        info!("Cooperative loop started");

        while !self.stop.load(Ordering::SeqCst) {
            control_step(&self.ds, &self.cycles);
            if self
                .max_cycles
                .is_some_and(|max| self.cycles.load(Ordering::Relaxed) >= max)
            {
                info!("Cooperative loop reached its cycle limit");
                break;
            }
        }

        info!(
            "Cooperative loop exited after {} cycles",
            self.cycles.load(Ordering::Relaxed)
        );
    }

    /// Ask `run()` to return.
    pub fn stop(&self) {
        info!("Cooperative loop asked to stop");
        self.stop.store(true, Ordering::SeqCst);
    }

    /// Cycles completed so far.
    pub fn cycles(&self) -> u64 {
        self.cycles.load(Ordering::Relaxed)
    }

    /// Wrap the loop as start/stop hooks.
    pub fn into_handle(self: Arc<Self>) -> ProgramHandle {
        let stopper = Arc::clone(&self);
        ProgramHandle::new(move || self.run(), move || stopper.stop())
    }
}

/// Competition loop that never honors a stop request.
///
/// `release()` exists so tests can reclaim the thread after it has been
/// abandoned.
#[derive(Debug)]
pub struct StubbornLoop {
    ds: DriverStation,
    released: AtomicBool,
    stop_calls: AtomicU64,
    cycles: AtomicU64,
}

impl StubbornLoop {
    /// Create a loop fed by `ds`.
    pub fn new(ds: DriverStation) -> Self {
        Self {
            ds,
            released: AtomicBool::new(false),
            stop_calls: AtomicU64::new(0),
            cycles: AtomicU64::new(0),
        }
    }

    /// Run until `release()` is called.
    pub fn run(&self) {
        self.ds.observe_user_program_starting();
        info!("Stubborn loop started");
        while !self.released.load(Ordering::SeqCst) {
            control_step(&self.ds, &self.cycles);
        }
    }

    /// Record the stop request and carry on.
    pub fn stop(&self) {
        self.stop_calls.fetch_add(1, Ordering::SeqCst);
        info!("Stubborn loop ignoring stop request");
    }

    /// Let `run()` return.
    pub fn release(&self) {
        self.released.store(true, Ordering::SeqCst);
    }

    /// Number of stop requests received.
    pub fn stop_calls(&self) -> u64 {
        self.stop_calls.load(Ordering::SeqCst)
    }

    /// Cycles completed so far.
    pub fn cycles(&self) -> u64 {
        self.cycles.load(Ordering::Relaxed)
    }

    /// Wrap the loop as start/stop hooks.
    pub fn into_handle(self: Arc<Self>) -> ProgramHandle {
        let stopper = Arc::clone(&self);
        ProgramHandle::new(move || self.run(), move || stopper.stop())
    }
}
