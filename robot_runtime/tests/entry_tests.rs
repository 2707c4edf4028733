//! # Entry Point Tests
//!
//! `start_robot_runtime` uses the process-wide coordinator, which accepts a
//! single program per process. Everything touching it lives in one test so
//! the ordering within this test binary is fixed.

mod common;

use common::{Event, MockHal};
use robot_runtime::{Hal, HalError, LifecycleCoordinator, request_stop, start_robot_runtime};
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, AtomicU32, Ordering};
use std::thread;
use std::time::Duration;

/// Forwards to a shared `MockHal` so the journal stays observable after
/// the runtime takes ownership.
struct SharedHal(Arc<MockHal>);

impl Hal for SharedHal {
    fn name(&self) -> &'static str {
        self.0.name()
    }
    fn initialize(&self) -> Result<(), HalError> {
        self.0.initialize()
    }
    fn has_main(&self) -> bool {
        self.0.has_main()
    }
    fn run_main(&self) {
        self.0.run_main()
    }
    fn exit_main(&self) {
        self.0.exit_main()
    }
    fn shutdown(&self) {
        self.0.shutdown()
    }
}

#[test]
fn test_single_invocation_per_process() {
    // Nothing is running yet: the global stop request is a no-op.
    assert!(!request_stop());

    let hal = Arc::new(MockHal::inline());
    let stop = Arc::new(AtomicBool::new(false));
    let stops = Arc::new(AtomicU32::new(0));

    // Stands in for a signal handler: keeps asking until the loop is live.
    let stopper = thread::spawn(|| {
        while !request_stop() {
            thread::sleep(Duration::from_millis(5));
        }
    });

    let (sf, sf2, sc) = (Arc::clone(&stop), Arc::clone(&stop), Arc::clone(&stops));
    let code = start_robot_runtime(
        SharedHal(Arc::clone(&hal)),
        move || {
            while !sf.load(Ordering::SeqCst) {
                thread::sleep(Duration::from_millis(1));
            }
        },
        move || {
            sc.fetch_add(1, Ordering::SeqCst);
            sf2.store(true, Ordering::SeqCst);
        },
    );
    stopper.join().unwrap();

    assert_eq!(code, 0);
    assert_eq!(stops.load(Ordering::SeqCst), 1);
    assert_eq!(
        hal.journal(),
        vec![Event::Initialize, Event::HasMain, Event::Shutdown]
    );
    assert!(LifecycleCoordinator::global().program().is_some());
    assert!(!LifecycleCoordinator::global().is_running());

    // A second invocation is refused before the HAL is touched.
    let second = Arc::new(MockHal::inline());
    let started = Arc::new(AtomicBool::new(false));
    let st = Arc::clone(&started);
    let code = start_robot_runtime(
        SharedHal(Arc::clone(&second)),
        move || st.store(true, Ordering::SeqCst),
        || {},
    );
    assert_eq!(code, 102);
    assert!(second.journal().is_empty());
    assert!(!started.load(Ordering::SeqCst));
}
