use std::fmt;
use std::time::Duration;

use crate::clock::Timestamp;

/// Decimal places used for elapsed seconds in log lines
pub const ELAPSED_PRECISION: usize = 4;

/// A single finished measurement: what was timed, and when it started and ended
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct TimingSpan<'a> {
    label: &'a str,
    start: Timestamp,
    end: Timestamp,
}

impl<'a> TimingSpan<'a> {
    #[inline]
    pub fn new(label: &'a str, start: Timestamp, end: Timestamp) -> Self {
        Self { label, start, end }
    }

    #[inline]
    pub fn label(&self) -> &'a str {
        self.label
    }

    #[inline]
    pub fn start(&self) -> Timestamp {
        self.start
    }

    #[inline]
    pub fn end(&self) -> Timestamp {
        self.end
    }

    /// Elapsed seconds, never negative
    #[inline]
    pub fn elapsed_secs(&self) -> f64 {
        self.end.elapsed_since(self.start)
    }

    #[inline]
    pub fn elapsed(&self) -> Duration {
        Duration::try_from_secs_f64(self.elapsed_secs()).unwrap_or(Duration::ZERO)
    }
}

/// Formats as `[<label>] Elapsed time: <secs> seconds`
impl fmt::Display for TimingSpan<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "[{}] Elapsed time: {:.prec$} seconds",
            self.label,
            self.elapsed_secs(),
            prec = ELAPSED_PRECISION,
        )
    }
}
