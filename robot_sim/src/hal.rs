//! Simulated HAL backend.
//!
//! `SimHal` implements the runtime's [`Hal`] boundary without hardware. Its
//! main loop publishes driver-station packets at a fixed period and keeps
//! timing statistics, until `exit_main()` is requested or the configured
//! competition time runs out.
//!
//! When `has_main` is off the same packet loop runs on a background ticker
//! thread started by `initialize()` and stopped by `shutdown()`.

use crate::driver_station::DriverStation;
use parking_lot::{Condvar, Mutex};
use robot_common::consts::DEFAULT_DS_PERIOD_MS;
use robot_runtime::{Hal, HalError};
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use std::sync::atomic::{AtomicU32, Ordering};
use std::thread::{self, JoinHandle};
use std::time::{Duration, Instant};
use tracing::{debug, info, warn};

/// Simulated HAL settings.
///
/// # TOML Example
///
/// ```toml
/// [hal]
/// has_main = true
/// ds_period_ms = 20
/// run_for_ms = 5000
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct SimHalConfig {
    /// Whether the HAL claims the calling thread for its main loop.
    pub has_main: bool,
    /// Inject an initialization failure with this status code.
    pub init_error_code: Option<i32>,
    /// Driver-station packet period.
    pub ds_period_ms: u64,
    /// End the main loop on its own after this long (simulated match end).
    pub run_for_ms: Option<u64>,
    /// Whether published packets report the robot as enabled.
    pub enabled: bool,
}

impl Default for SimHalConfig {
    fn default() -> Self {
        Self {
            has_main: true,
            init_error_code: None,
            ds_period_ms: DEFAULT_DS_PERIOD_MS,
            run_for_ms: None,
            enabled: true,
        }
    }
}

impl SimHalConfig {
    /// Packet period as a `Duration`.
    pub fn ds_period(&self) -> Duration {
        Duration::from_millis(self.ds_period_ms)
    }
}

/// Timing statistics for the packet loop.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct TimingStats {
    /// Number of cycles executed
    pub cycle_count: u64,
    /// Number of cycles that overran the period
    pub timing_violations: u64,
    /// Maximum observed cycle work time
    pub max_cycle_time_us: u64,
}

/// How many times each HAL operation was called.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct CallCounts {
    /// `initialize()`
    pub initialize: u32,
    /// `run_main()`
    pub run_main: u32,
    /// `exit_main()`
    pub exit_main: u32,
    /// `shutdown()`
    pub shutdown: u32,
}

#[derive(Debug, Default)]
struct Counters {
    initialize: AtomicU32,
    run_main: AtomicU32,
    exit_main: AtomicU32,
    shutdown: AtomicU32,
}

#[derive(Debug)]
struct Inner {
    config: SimHalConfig,
    ds: DriverStation,
    exit_requested: Mutex<bool>,
    exit_cv: Condvar,
    stats: Mutex<TimingStats>,
    counters: Counters,
    ticker: Mutex<Option<JoinHandle<()>>>,
}

/// Simulated HAL. Cheap to clone; clones share state.
#[derive(Debug, Clone)]
pub struct SimHal {
    inner: Arc<Inner>,
}

impl SimHal {
    /// Create a simulated HAL.
    pub fn new(config: SimHalConfig) -> Self {
        Self {
            inner: Arc::new(Inner {
                config,
                ds: DriverStation::new(),
                exit_requested: Mutex::new(false),
                exit_cv: Condvar::new(),
                stats: Mutex::new(TimingStats::default()),
                counters: Counters::default(),
                ticker: Mutex::new(None),
            }),
        }
    }

    /// The driver-station link fed by this HAL.
    pub fn driver_station(&self) -> DriverStation {
        self.inner.ds.clone()
    }

    /// Timing statistics of the packet loop so far.
    pub fn stats(&self) -> TimingStats {
        *self.inner.stats.lock()
    }

    /// Call counts of the HAL operations so far.
    pub fn call_counts(&self) -> CallCounts {
        let c = &self.inner.counters;
        CallCounts {
            initialize: c.initialize.load(Ordering::SeqCst),
            run_main: c.run_main.load(Ordering::SeqCst),
            exit_main: c.exit_main.load(Ordering::SeqCst),
            shutdown: c.shutdown.load(Ordering::SeqCst),
        }
    }

    /// Whether `exit_main()` has been requested.
    pub fn exit_requested(&self) -> bool {
        *self.inner.exit_requested.lock()
    }
}

impl Inner {
    /// Publish packets every period until exit is requested or the
    /// configured competition time elapses.
    fn packet_loop(&self) {
        let period = self.config.ds_period();
        let deadline = self
            .config
            .run_for_ms
            .map(|ms| Instant::now() + Duration::from_millis(ms));

        info!(
            "Driver-station loop started (period={}ms, rt={})",
            period.as_millis(),
            detect_rt_mode()
        );

        loop {
            let cycle_start = Instant::now();
            self.ds.publish_packet(self.config.enabled);

            let work_us = cycle_start.elapsed().as_micros() as u64;
            let cycle_count = {
                let mut stats = self.stats.lock();
                stats.cycle_count += 1;
                stats.max_cycle_time_us = stats.max_cycle_time_us.max(work_us);
                if work_us > period.as_micros() as u64 {
                    stats.timing_violations += 1;
                    if stats.timing_violations <= 10 || stats.timing_violations % 1000 == 0 {
                        warn!(
                            "Timing violation #{}: cycle took {}us (target {}us)",
                            stats.timing_violations,
                            work_us,
                            period.as_micros()
                        );
                    }
                }
                stats.cycle_count
            };

            if cycle_count % 500 == 0 {
                debug!("Driver-station loop: {} packets", cycle_count);
            }

            if deadline.is_some_and(|d| Instant::now() >= d) {
                info!("Simulated competition time elapsed");
                break;
            }

            // Sleep for the rest of the period, waking early on exit.
            let remaining = period.saturating_sub(cycle_start.elapsed());
            let mut exit = self.exit_requested.lock();
            if !*exit {
                let _ = self.exit_cv.wait_while_for(&mut exit, |e| !*e, remaining);
            }
            if *exit {
                break;
            }
        }

        let stats = *self.stats.lock();
        info!(
            "Driver-station loop stopped after {} packets (violations: {})",
            stats.cycle_count, stats.timing_violations
        );
    }
}

impl Hal for SimHal {
    fn name(&self) -> &'static str {
        "sim"
    }

    fn initialize(&self) -> Result<(), HalError> {
        self.inner.counters.initialize.fetch_add(1, Ordering::SeqCst);
        if let Some(code) = self.inner.config.init_error_code {
            return Err(HalError::init_failed(code, "simulated initialization failure"));
        }
        *self.inner.exit_requested.lock() = false;

        if !self.inner.config.has_main {
            let inner = Arc::clone(&self.inner);
            let handle = thread::Builder::new()
                .name("sim-ds-ticker".to_string())
                .spawn(move || inner.packet_loop())
                .map_err(|e| HalError::init_failed(-1, format!("ticker thread: {e}")))?;
            *self.inner.ticker.lock() = Some(handle);
        }

        info!(
            "Simulated HAL initialized (has_main={}, period={}ms)",
            self.inner.config.has_main, self.inner.config.ds_period_ms
        );
        Ok(())
    }

    fn has_main(&self) -> bool {
        self.inner.config.has_main
    }

    fn run_main(&self) {
        self.inner.counters.run_main.fetch_add(1, Ordering::SeqCst);
        self.inner.packet_loop();
    }

    fn exit_main(&self) {
        self.inner.counters.exit_main.fetch_add(1, Ordering::SeqCst);
        *self.inner.exit_requested.lock() = true;
        self.inner.exit_cv.notify_all();
    }

    fn shutdown(&self) {
        self.inner.counters.shutdown.fetch_add(1, Ordering::SeqCst);
        {
            *self.inner.exit_requested.lock() = true;
        }
        self.inner.exit_cv.notify_all();

        if let Some(ticker) = self.inner.ticker.lock().take() {
            if ticker.join().is_err() {
                warn!("Driver-station ticker thread panicked");
            }
        }
        info!("Simulated HAL shut down");
    }
}

/// Detect if running in real-time mode by checking scheduler policy.
fn detect_rt_mode() -> bool {
    #[cfg(target_os = "linux")]
    {
        use libc::{SCHED_FIFO, SCHED_RR, sched_getscheduler};
        // SAFETY: sched_getscheduler(0) only queries the calling thread's policy.
        unsafe {
            let policy = sched_getscheduler(0);
            policy == SCHED_FIFO || policy == SCHED_RR
        }
    }
    #[cfg(not(target_os = "linux"))]
    {
        false
    }
}
