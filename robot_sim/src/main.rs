//! # Robot Runtime Simulator Binary
//!
//! Runs a demo competition program through the robot runtime on top of the
//! simulated HAL.
//!
//! # Usage
//!
//! ```bash
//! # Hosted placement, cooperative loop, match ends after 5 s
//! robot_sim --run-for 5
//!
//! # Stubborn loop: abandoned one second after the match ends
//! robot_sim --program stubborn --run-for 2
//!
//! # Inline placement (HAL without a main loop), stop with Ctrl-C
//! robot_sim --inline
//!
//! # From a config file, verbose JSON logs
//! robot_sim --config config/sim.toml -v --json
//! ```

#![deny(warnings)]

use clap::Parser;
use robot_common::config::{ConfigLoader, LogLevel};
use robot_runtime::{Hal, request_stop, start_robot_runtime_with_handle};
use robot_sim::{CooperativeLoop, ProgramKind, SimConfig, SimHal, StubbornLoop};
use std::path::PathBuf;
use std::sync::Arc;
use std::thread;
use std::time::Duration;
use tracing::{error, info, Level};
use tracing_subscriber::EnvFilter;

/// Robot runtime simulator - drives a demo competition loop through a simulated HAL
#[derive(Parser, Debug)]
#[command(name = "robot_sim")]
#[command(author = "RTS007")]
#[command(version)]
#[command(about = "Drives a demo competition loop through a simulated HAL")]
#[command(long_about = None)]
struct Args {
    /// Path to simulator config (TOML). Defaults are used when omitted.
    #[arg(short, long, value_name = "FILE")]
    config: Option<PathBuf>,

    /// Simulate a HAL without a main loop (program runs on the main thread)
    #[arg(long)]
    inline: bool,

    /// Demo program to run
    #[arg(short, long, value_enum, default_value_t = ProgramKind::Cooperative)]
    program: ProgramKind,

    /// End the simulated match after this many seconds
    #[arg(long, value_name = "SECS")]
    run_for: Option<f64>,

    /// Stop the cooperative loop on its own after this many cycles
    #[arg(long, value_name = "N")]
    cycles: Option<u64>,

    /// Bounded wait for the program thread after a stop request
    #[arg(long, value_name = "MS")]
    join_timeout_ms: Option<u64>,

    /// Make HAL initialization fail with this status code
    #[arg(long, value_name = "CODE", allow_negative_numbers = true)]
    fail_init: Option<i32>,

    /// Enable verbose logging
    #[arg(short, long)]
    verbose: bool,

    /// Output logs in JSON format
    #[arg(long)]
    json: bool,
}

fn main() {
    match run() {
        Ok(code) => std::process::exit(code),
        Err(e) => {
            error!("Simulator startup failed: {}", e);
            eprintln!("robot_sim: {e}");
            std::process::exit(1);
        }
    }
}

fn run() -> Result<i32, Box<dyn std::error::Error>> {
    let args = Args::parse();

    let mut config = match args.config {
        Some(ref path) => SimConfig::load(path)?,
        None => SimConfig::default(),
    };
    apply_overrides(&mut config, &args);
    config.validate()?;

    setup_tracing(&args, config.shared.log_level);

    info!(
        "Robot simulator v{} starting ({})",
        env!("CARGO_PKG_VERSION"),
        config.shared.service_name
    );
    info!(
        "Placement: {}, program: {:?}, join timeout: {}ms",
        if config.hal.has_main { "hosted" } else { "inline" },
        args.program,
        config.runtime.join_timeout_ms
    );

    let hal = SimHal::new(config.hal.clone());
    let ds = hal.driver_station();

    // Ctrl-C: the HAL's own shutdown request when it owns the main thread,
    // otherwise straight to the running program.
    let signal_hal = hal.clone();
    let has_main = config.hal.has_main;
    ctrlc::set_handler(move || {
        info!("Received shutdown signal");
        if has_main {
            signal_hal.exit_main();
        } else {
            request_stop();
        }
    })?;

    // Without a HAL main loop nothing ends the match; do it from a timer.
    if !has_main {
        if let Some(ms) = config.hal.run_for_ms {
            let _timer = thread::Builder::new()
                .name("sim-match-timer".to_string())
                .spawn(move || {
                    thread::sleep(Duration::from_millis(ms));
                    info!("Simulated competition time elapsed");
                    request_stop();
                })?;
        }
    }

    let code = match args.program {
        ProgramKind::Cooperative => {
            let program = Arc::new(CooperativeLoop::new(ds, args.cycles));
            let code = start_robot_runtime_with_handle(
                hal.clone(),
                config.runtime.clone(),
                Arc::clone(&program).into_handle(),
            );
            info!("Cooperative loop ran {} cycles", program.cycles());
            code
        }
        ProgramKind::Stubborn => {
            let program = Arc::new(StubbornLoop::new(ds));
            let code = start_robot_runtime_with_handle(
                hal.clone(),
                config.runtime.clone(),
                Arc::clone(&program).into_handle(),
            );
            info!(
                "Stubborn loop ran {} cycles, ignored {} stop requests",
                program.cycles(),
                program.stop_calls()
            );
            code
        }
    };

    let stats = hal.stats();
    info!(
        "HAL stats: {} packets, max cycle {}us, {} violations",
        stats.cycle_count, stats.max_cycle_time_us, stats.timing_violations
    );
    info!("Robot simulator exiting with status {}", code);
    Ok(code)
}

/// CLI flags win over the config file.
fn apply_overrides(config: &mut SimConfig, args: &Args) {
    if args.inline {
        config.hal.has_main = false;
    }
    if let Some(secs) = args.run_for {
        config.hal.run_for_ms = Some((secs.max(0.0) * 1000.0) as u64);
    }
    if let Some(ms) = args.join_timeout_ms {
        config.runtime.join_timeout_ms = ms;
    }
    if let Some(code) = args.fail_init {
        config.hal.init_error_code = Some(code);
    }
    if args.verbose {
        config.shared.log_level = LogLevel::Debug;
    }
}

/// Setup tracing subscriber based on CLI arguments and config.
fn setup_tracing(args: &Args, level: LogLevel) {
    let level: Level = level.into();
    let filter = EnvFilter::from_default_env().add_directive(level.into());

    if args.json {
        tracing_subscriber::fmt()
            .with_env_filter(filter)
            .with_thread_names(true)
            .json()
            .init();
    } else {
        tracing_subscriber::fmt()
            .with_env_filter(filter)
            .with_thread_names(true)
            .init();
    }
}
