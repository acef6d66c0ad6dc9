//! # step-timing: function and block timing
//!
//! Thin application layer over the `step-timer` crate:
//! - TOML configuration for the log level and filter
//! - `tracing-subscriber` setup
//! - Re-export of the timing primitives

pub mod config;
pub mod logging;

pub use step_timer;
pub use step_timer::{StepGuard, StepTimer, TimedFn};

pub type Result<T> = anyhow::Result<T>;

pub const VERSION: &str = env!("CARGO_PKG_VERSION");
pub const NAME: &str = env!("CARGO_PKG_NAME");
