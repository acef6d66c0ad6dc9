//! Process-wide timer for call sites that don't carry their own.
//!
//! Logs through `tracing` at INFO on the monotonic clock. Code that needs a
//! different sink or a controllable clock should own a [`StepTimer`] instead.

use once_cell::sync::Lazy;

use crate::clock::MonotonicClock;
use crate::sink::TracingSink;
use crate::timer::{StepGuard, StepTimer, TimedFn};

pub static GLOBAL_STEP_TIMER: Lazy<StepTimer> = Lazy::new(StepTimer::new);

#[inline]
pub fn global() -> &'static StepTimer {
    &GLOBAL_STEP_TIMER
}

/// Time a block on the global timer until the returned guard is dropped
pub fn time_step(label: impl Into<String>) -> StepGuard<'static, MonotonicClock, TracingSink> {
    global().time_step(label)
}

/// Wrap `func` on the global timer under an explicit name
pub fn time_function<F>(name: impl Into<String>, func: F) -> TimedFn<'static, F, MonotonicClock, TracingSink> {
    global().wrap_named(name, func)
}

/// Time a block on the global timer, yielding the block's value
#[macro_export]
macro_rules! time_step {
    ($label:expr, $code:block) => {{
        let _guard = $crate::global::time_step($label);
        $code
    }};
}
