//! Simulator end-to-end tests.
//!
//! Runs the demo programs through `Runtime` on top of `SimHal`, covering
//! both placements, the cooperative join and the stubborn abandonment.

use robot_common::config::RuntimeConfig;
use robot_runtime::{Hal, LifecycleCoordinator, Placement, RunOutcome, Runtime, RuntimeError};
use robot_sim::{
    CooperativeLoop, SimHal, SimHalConfig, StubbornLoop, UserProgramState,
};
use std::sync::Arc;
use std::thread;
use std::time::{Duration, Instant};

/// Helper: runtime over a clone of `hal`, so the test keeps a view of it.
fn runtime(hal: &SimHal, join_timeout_ms: u64) -> Runtime<SimHal> {
    Runtime::with_coordinator(
        Arc::new(hal.clone()),
        RuntimeConfig {
            join_timeout_ms,
            ..RuntimeConfig::default()
        },
        Arc::new(LifecycleCoordinator::new()),
    )
}

fn hal_config(has_main: bool, run_for_ms: Option<u64>) -> SimHalConfig {
    SimHalConfig {
        has_main,
        ds_period_ms: 5,
        run_for_ms,
        ..SimHalConfig::default()
    }
}

#[test]
fn test_hosted_cooperative_match() {
    let hal = SimHal::new(hal_config(true, Some(150)));
    let program = Arc::new(CooperativeLoop::new(hal.driver_station(), None));
    let rt = runtime(&hal, 1000);

    let start = Instant::now();
    let report = rt.run(Arc::new(Arc::clone(&program).into_handle())).unwrap();

    assert_eq!(report.placement, Placement::Hosted);
    assert_eq!(report.outcome, RunOutcome::Joined);
    assert!(report.stop_requested);
    assert!(start.elapsed() < Duration::from_secs(1));
    assert!(program.cycles() > 0);
    assert_eq!(hal.driver_station().program_state(), UserProgramState::Teleop);

    let calls = hal.call_counts();
    assert_eq!(calls.initialize, 1);
    assert_eq!(calls.run_main, 1);
    assert_eq!(calls.shutdown, 1);
}

#[test]
fn test_hosted_stubborn_match_abandoned() {
    let hal = SimHal::new(hal_config(true, Some(50)));
    let program = Arc::new(StubbornLoop::new(hal.driver_station()));
    let rt = runtime(&hal, 200);

    let start = Instant::now();
    let report = rt.run(Arc::new(Arc::clone(&program).into_handle())).unwrap();
    let elapsed = start.elapsed();

    assert_eq!(report.outcome, RunOutcome::Abandoned);
    assert_eq!(program.stop_calls(), 1);
    assert!(elapsed >= Duration::from_millis(200));
    assert!(elapsed < Duration::from_secs(2));
    assert_eq!(hal.call_counts().shutdown, 1);

    // The abandoned loop is still alive; let it go and watch it deregister.
    program.release();
    assert!(rt.coordinator().wait_for_exit(Duration::from_secs(2)));
}

#[test]
fn test_inline_match_stopped_from_another_thread() {
    let hal = SimHal::new(hal_config(false, None));
    let program = Arc::new(CooperativeLoop::new(hal.driver_station(), None));
    let rt = runtime(&hal, 1000);

    let coordinator = Arc::clone(rt.coordinator());
    let stopper = thread::spawn(move || {
        while !coordinator.request_stop() {
            thread::sleep(Duration::from_millis(5));
        }
    });

    let report = rt.run(Arc::new(Arc::clone(&program).into_handle())).unwrap();
    stopper.join().unwrap();

    assert_eq!(report.placement, Placement::Inline);
    assert_eq!(report.outcome, RunOutcome::Completed);
    assert!(report.stop_requested);
    // The packet ticker fed the loop and was stopped by shutdown.
    assert!(hal.driver_station().packet_count() > 0);
    assert_eq!(hal.call_counts().run_main, 0);
    assert_eq!(hal.call_counts().shutdown, 1);
}

#[test]
fn test_inline_match_with_cycle_limit() {
    let hal = SimHal::new(hal_config(false, None));
    let program = Arc::new(CooperativeLoop::new(hal.driver_station(), Some(5)));
    let rt = runtime(&hal, 1000);

    let report = rt.run(Arc::new(Arc::clone(&program).into_handle())).unwrap();
    assert_eq!(report.outcome, RunOutcome::Completed);
    assert!(!report.stop_requested);
    assert_eq!(program.cycles(), 5);
}

#[test]
fn test_sim_init_failure_surfaces_code() {
    let hal = SimHal::new(SimHalConfig {
        init_error_code: Some(-1029),
        ..hal_config(true, Some(50))
    });
    let program = Arc::new(CooperativeLoop::new(hal.driver_station(), None));
    let rt = runtime(&hal, 1000);

    let err = rt.run(Arc::new(Arc::clone(&program).into_handle())).unwrap_err();
    assert!(matches!(err, RuntimeError::Hal(_)));
    assert_eq!(err.exit_code(), -1029);
    assert_eq!(program.cycles(), 0);
    assert_eq!(hal.call_counts().run_main, 0);
    assert_eq!(hal.call_counts().shutdown, 0);
    assert!(!hal.exit_requested());
    assert_eq!(hal.name(), "sim");
}
