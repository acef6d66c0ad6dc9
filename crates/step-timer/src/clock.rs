use std::collections::VecDeque;
use std::sync::Arc;
use std::time::Instant;

use chrono::Utc;
use parking_lot::Mutex;

/// Point in time expressed as fractional seconds since a clock-specific origin
#[derive(Copy, Clone, Debug, Default, PartialEq, PartialOrd)]
pub struct Timestamp {
    secs: f64,
}

impl Timestamp {
    /// Create timestamp from raw seconds
    #[inline]
    pub fn from_secs(secs: f64) -> Self {
        Self { secs }
    }

    /// Get raw seconds
    #[inline]
    pub fn as_secs(&self) -> f64 {
        self.secs
    }

    /// Seconds from `start` to this timestamp, saturating at zero
    #[inline]
    pub fn elapsed_since(&self, start: Timestamp) -> f64 {
        if self.secs >= start.secs {
            self.secs - start.secs
        } else {
            0.0
        }
    }
}

/// Source of timestamps for a timer
pub trait Clock {
    fn now(&self) -> Timestamp;
}

impl<C: Clock + ?Sized> Clock for &C {
    #[inline]
    fn now(&self) -> Timestamp {
        (**self).now()
    }
}

impl<C: Clock + ?Sized> Clock for Arc<C> {
    #[inline]
    fn now(&self) -> Timestamp {
        (**self).now()
    }
}

/// Monotonic clock backed by `Instant`, origin at construction
#[derive(Debug, Clone, Copy)]
pub struct MonotonicClock {
    origin: Instant,
}

impl MonotonicClock {
    pub fn new() -> Self {
        Self {
            origin: Instant::now(),
        }
    }
}

impl Default for MonotonicClock {
    fn default() -> Self {
        Self::new()
    }
}

impl Clock for MonotonicClock {
    #[inline]
    fn now(&self) -> Timestamp {
        Timestamp::from_secs(self.origin.elapsed().as_secs_f64())
    }
}

/// Wall clock, seconds since the Unix epoch.
///
/// Subject to system clock adjustments; prefer [`MonotonicClock`] unless the
/// readings need to line up with wall time.
#[derive(Debug, Clone, Copy, Default)]
pub struct WallClock;

impl Clock for WallClock {
    #[inline]
    fn now(&self) -> Timestamp {
        let now = Utc::now();
        Timestamp::from_secs(now.timestamp() as f64 + f64::from(now.timestamp_subsec_nanos()) / 1e9)
    }
}

/// Manually driven clock for deterministic tests.
///
/// Readings queued with [`ManualClock::push_readings`] are handed out one per
/// `now()` call; once the queue is empty the clock keeps returning the last
/// value it reported (or whatever was set with `set`/`advance`).
#[derive(Debug, Default)]
pub struct ManualClock {
    state: Mutex<ManualState>,
}

#[derive(Debug, Default)]
struct ManualState {
    current: f64,
    scripted: VecDeque<f64>,
}

impl ManualClock {
    pub fn new(start_secs: f64) -> Self {
        Self {
            state: Mutex::new(ManualState {
                current: start_secs,
                scripted: VecDeque::new(),
            }),
        }
    }

    /// Clock that returns `readings` in order, then sticks to the last one
    pub fn with_readings(readings: impl IntoIterator<Item = f64>) -> Self {
        let clock = Self::default();
        clock.push_readings(readings);
        clock
    }

    pub fn push_readings(&self, readings: impl IntoIterator<Item = f64>) {
        self.state.lock().scripted.extend(readings);
    }

    pub fn set(&self, secs: f64) {
        self.state.lock().current = secs;
    }

    pub fn advance(&self, secs: f64) {
        self.state.lock().current += secs;
    }

    /// Number of scripted readings not yet consumed
    pub fn pending(&self) -> usize {
        self.state.lock().scripted.len()
    }
}

impl Clock for ManualClock {
    fn now(&self) -> Timestamp {
        let mut state = self.state.lock();
        if let Some(next) = state.scripted.pop_front() {
            state.current = next;
        }
        Timestamp::from_secs(state.current)
    }
}
