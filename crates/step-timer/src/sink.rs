use std::fmt;
use std::str::FromStr;
use std::sync::Arc;

use parking_lot::Mutex;
use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Destination for timing log lines
pub trait LogSink {
    fn emit(&self, message: &str);
}

impl<S: LogSink + ?Sized> LogSink for &S {
    #[inline]
    fn emit(&self, message: &str) {
        (**self).emit(message)
    }
}

impl<S: LogSink + ?Sized> LogSink for Arc<S> {
    #[inline]
    fn emit(&self, message: &str) {
        (**self).emit(message)
    }
}

impl<S: LogSink + ?Sized> LogSink for Box<S> {
    #[inline]
    fn emit(&self, message: &str) {
        (**self).emit(message)
    }
}

#[derive(Error, Debug, Clone, PartialEq, Eq)]
#[error("Unknown log level: {0:?} (expected trace, debug, info, warn or error)")]
pub struct ParseLevelError(String);

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(try_from = "String", into = "&'static str")]
pub enum Level {
    Trace,
    Debug,
    #[default]
    Info,
    Warn,
    Error,
}

impl Level {
    pub fn as_str(&self) -> &'static str {
        match self {
            Level::Trace => "trace",
            Level::Debug => "debug",
            Level::Info => "info",
            Level::Warn => "warn",
            Level::Error => "error",
        }
    }
}

impl fmt::Display for Level {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Level {
    type Err = ParseLevelError;

    fn from_str(s: &str) -> Result<Self, ParseLevelError> {
        match s.trim().to_ascii_lowercase().as_str() {
            "trace" => Ok(Level::Trace),
            "debug" => Ok(Level::Debug),
            "info" => Ok(Level::Info),
            "warn" | "warning" => Ok(Level::Warn),
            "error" => Ok(Level::Error),
            _ => Err(ParseLevelError(s.to_string())),
        }
    }
}

impl TryFrom<String> for Level {
    type Error = ParseLevelError;

    fn try_from(value: String) -> Result<Self, ParseLevelError> {
        value.parse()
    }
}

impl From<Level> for &'static str {
    fn from(level: Level) -> Self {
        level.as_str()
    }
}

/// Sink that forwards every line to `tracing` under the `step_timer` target
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct TracingSink {
    level: Level,
}

impl TracingSink {
    pub fn new(level: Level) -> Self {
        Self { level }
    }

    pub fn level(&self) -> Level {
        self.level
    }
}

impl LogSink for TracingSink {
    fn emit(&self, message: &str) {
        match self.level {
            Level::Trace => tracing::trace!(target: "step_timer", "{}", message),
            Level::Debug => tracing::debug!(target: "step_timer", "{}", message),
            Level::Info => tracing::info!(target: "step_timer", "{}", message),
            Level::Warn => tracing::warn!(target: "step_timer", "{}", message),
            Level::Error => tracing::error!(target: "step_timer", "{}", message),
        }
    }
}

/// Sink that keeps every line in memory, mostly for tests
#[derive(Debug, Default)]
pub struct MemorySink {
    lines: Mutex<Vec<String>>,
}

impl MemorySink {
    pub fn new() -> Self {
        Self::default()
    }

    /// Copy of all lines emitted so far
    pub fn lines(&self) -> Vec<String> {
        self.lines.lock().clone()
    }

    /// Drain all lines emitted so far
    pub fn take(&self) -> Vec<String> {
        std::mem::take(&mut *self.lines.lock())
    }

    pub fn len(&self) -> usize {
        self.lines.lock().len()
    }

    pub fn is_empty(&self) -> bool {
        self.lines.lock().is_empty()
    }

    pub fn clear(&self) {
        self.lines.lock().clear();
    }
}

impl LogSink for MemorySink {
    fn emit(&self, message: &str) {
        self.lines.lock().push(message.to_string());
    }
}
