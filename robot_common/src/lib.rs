//! Robot Runtime Common Library
//!
//! This crate provides shared constants and configuration loading utilities
//! for all robot runtime workspace crates.
//!
//! # Module Structure
//!
//! - [`consts`] - Exit statuses, default timeouts and names
//! - [`config`] - Configuration loading traits and types
//! - [`prelude`] - Common re-exports for convenience
//!
//! # Usage
//!
//! ```rust
//! use robot_common::prelude::*;
//!
//! let runtime = RuntimeConfig::default();
//! assert_eq!(runtime.join_timeout(), DEFAULT_JOIN_TIMEOUT);
//! ```

pub mod config;
pub mod consts;
pub mod prelude;
