//! Configuration loading traits and types.
//!
//! This module provides a standardized way to load TOML configuration files
//! across the runtime crates and binaries.
//!
//! # Usage
//!
//! ```rust,no_run
//! use robot_common::config::{ConfigError, ConfigLoader, RuntimeConfig, SharedConfig};
//! use serde::Deserialize;
//! use std::path::Path;
//!
//! #[derive(Debug, Deserialize)]
//! struct MyRobotConfig {
//!     shared: SharedConfig,
//!     #[serde(default)]
//!     runtime: RuntimeConfig,
//! }
//!
//! fn main() -> Result<(), ConfigError> {
//!     let config = MyRobotConfig::load(Path::new("robot.toml"))?;
//!     config.runtime.validate()?;
//!     println!("Service: {}", config.shared.service_name);
//!     Ok(())
//! }
//! ```

use crate::consts::{DEFAULT_JOIN_TIMEOUT_MS, DEFAULT_WORKER_THREAD_NAME};
use serde::{Deserialize, Serialize};
use std::path::Path;
use std::time::Duration;
use thiserror::Error;

/// Error type for configuration loading operations.
#[derive(Debug, Clone, Error)]
pub enum ConfigError {
    /// Configuration file not found at specified path.
    #[error("Configuration file not found")]
    FileNotFound,

    /// TOML parsing failed.
    #[error("Failed to parse configuration: {0}")]
    ParseError(String),

    /// Semantic validation failed.
    #[error("Configuration validation failed: {0}")]
    ValidationError(String),
}

/// Log level for application logging.
///
/// Uses lowercase serde values for TOML compatibility.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum LogLevel {
    /// Most verbose, detailed tracing information.
    Trace,
    /// Debug information useful during development.
    Debug,
    /// General information about application operation.
    #[default]
    Info,
    /// Warning messages for potentially problematic situations.
    Warn,
    /// Error messages for serious problems.
    Error,
}

impl From<LogLevel> for tracing::Level {
    fn from(level: LogLevel) -> Self {
        match level {
            LogLevel::Trace => tracing::Level::TRACE,
            LogLevel::Debug => tracing::Level::DEBUG,
            LogLevel::Info => tracing::Level::INFO,
            LogLevel::Warn => tracing::Level::WARN,
            LogLevel::Error => tracing::Level::ERROR,
        }
    }
}

/// Common configuration fields shared across binaries.
///
/// # TOML Example
///
/// ```toml
/// [shared]
/// log_level = "debug"
/// service_name = "robot-sim-01"
/// ```
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SharedConfig {
    /// Logging verbosity level.
    #[serde(default)]
    pub log_level: LogLevel,

    /// Application instance identifier.
    pub service_name: String,
}

impl SharedConfig {
    /// Validate the configuration.
    ///
    /// # Errors
    ///
    /// Returns `ConfigError::ValidationError` if `service_name` is empty.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.service_name.is_empty() {
            return Err(ConfigError::ValidationError(
                "service_name cannot be empty".to_string(),
            ));
        }
        Ok(())
    }
}

/// What happens after the competition program panics.
///
/// Cleanup (deregistration, `ExitMain`, HAL shutdown) runs in both cases.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "snake_case")]
pub enum PanicPolicy {
    /// End the run and report the panic as an error / nonzero exit status.
    #[default]
    EndRun,
    /// Re-raise the panic on the calling thread once HAL shutdown is done.
    Propagate,
}

/// Lifecycle tuning for the runtime.
///
/// # TOML Example
///
/// ```toml
/// [runtime]
/// join_timeout_ms = 1000
/// worker_thread_name = "robot-program"
/// panic_policy = "end_run"
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct RuntimeConfig {
    /// Bounded wait for the program thread after a stop request.
    pub join_timeout_ms: u64,
    /// Name given to the thread hosting the competition loop.
    pub worker_thread_name: String,
    /// Behavior after a panic inside `on_start`.
    pub panic_policy: PanicPolicy,
}

impl Default for RuntimeConfig {
    fn default() -> Self {
        Self {
            join_timeout_ms: DEFAULT_JOIN_TIMEOUT_MS,
            worker_thread_name: DEFAULT_WORKER_THREAD_NAME.to_string(),
            panic_policy: PanicPolicy::default(),
        }
    }
}

impl RuntimeConfig {
    /// Join timeout as a `Duration`.
    pub fn join_timeout(&self) -> Duration {
        Duration::from_millis(self.join_timeout_ms)
    }

    /// Validate the configuration.
    ///
    /// # Errors
    ///
    /// Returns `ConfigError::ValidationError` if:
    /// - `join_timeout_ms` is zero
    /// - `worker_thread_name` is empty or contains a NUL byte
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.join_timeout_ms == 0 {
            return Err(ConfigError::ValidationError(
                "join_timeout_ms must be greater than zero".to_string(),
            ));
        }
        if self.worker_thread_name.is_empty() {
            return Err(ConfigError::ValidationError(
                "worker_thread_name cannot be empty".to_string(),
            ));
        }
        if self.worker_thread_name.contains('\0') {
            return Err(ConfigError::ValidationError(
                "worker_thread_name cannot contain NUL".to_string(),
            ));
        }
        Ok(())
    }
}

/// Trait for loading configuration from TOML files.
///
/// Blanket-implemented for every `serde::de::DeserializeOwned` type.
///
/// # Contract
///
/// - Returns `ConfigError::FileNotFound` if the file does not exist
/// - Returns `ConfigError::ParseError` if TOML syntax is invalid
pub trait ConfigLoader: Sized + serde::de::DeserializeOwned {
    /// Load configuration from a TOML file.
    fn load(path: &Path) -> Result<Self, ConfigError> {
        let content = std::fs::read_to_string(path).map_err(|e| {
            if e.kind() == std::io::ErrorKind::NotFound {
                ConfigError::FileNotFound
            } else {
                ConfigError::ParseError(e.to_string())
            }
        })?;

        toml::from_str(&content).map_err(|e| ConfigError::ParseError(e.to_string()))
    }
}

impl<T: serde::de::DeserializeOwned> ConfigLoader for T {}
