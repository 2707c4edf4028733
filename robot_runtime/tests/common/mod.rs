//! Shared helpers for runtime integration tests.

#![allow(dead_code)]

use parking_lot::{Condvar, Mutex};
use robot_runtime::{Hal, HalError};
use std::time::Duration;

/// Observable event, in the order it happened.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Event {
    Initialize,
    HasMain,
    RunMain,
    ExitMain,
    Shutdown,
    ProgramStarted,
    ProgramStopped,
    ProgramExited,
}

/// Recording HAL.
///
/// `run_main` blocks until `exit_main` is called, or until `auto_exit`
/// elapses (standing in for the HAL's own shutdown detection).
pub struct MockHal {
    has_main: bool,
    init_error: Option<i32>,
    auto_exit: Option<Duration>,
    journal: Mutex<Vec<Event>>,
    exit_requested: Mutex<bool>,
    exit_cv: Condvar,
}

impl MockHal {
    pub fn inline() -> Self {
        Self::build(false, None)
    }

    pub fn hosted(auto_exit: Option<Duration>) -> Self {
        Self::build(true, auto_exit)
    }

    pub fn failing(code: i32, has_main: bool) -> Self {
        let mut hal = Self::build(has_main, None);
        hal.init_error = Some(code);
        hal
    }

    fn build(has_main: bool, auto_exit: Option<Duration>) -> Self {
        Self {
            has_main,
            init_error: None,
            auto_exit,
            journal: Mutex::new(Vec::new()),
            exit_requested: Mutex::new(false),
            exit_cv: Condvar::new(),
        }
    }

    pub fn record(&self, event: Event) {
        self.journal.lock().push(event);
    }

    pub fn journal(&self) -> Vec<Event> {
        self.journal.lock().clone()
    }

    pub fn count(&self, event: Event) -> usize {
        self.journal.lock().iter().filter(|e| **e == event).count()
    }

    pub fn position(&self, event: Event) -> Option<usize> {
        self.journal.lock().iter().position(|e| *e == event)
    }
}

impl Hal for MockHal {
    fn name(&self) -> &'static str {
        "mock"
    }

    fn initialize(&self) -> Result<(), HalError> {
        self.record(Event::Initialize);
        match self.init_error {
            Some(code) => Err(HalError::init_failed(code, "mock init failure")),
            None => Ok(()),
        }
    }

    fn has_main(&self) -> bool {
        self.record(Event::HasMain);
        self.has_main
    }

    fn run_main(&self) {
        self.record(Event::RunMain);
        let mut exit = self.exit_requested.lock();
        match self.auto_exit {
            Some(after) => {
                let _ = self.exit_cv.wait_while_for(&mut exit, |e| !*e, after);
            }
            None => self.exit_cv.wait_while(&mut exit, |e| !*e),
        }
    }

    fn exit_main(&self) {
        self.record(Event::ExitMain);
        *self.exit_requested.lock() = true;
        self.exit_cv.notify_all();
    }

    fn shutdown(&self) {
        self.record(Event::Shutdown);
    }
}
