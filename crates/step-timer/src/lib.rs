//! Timing instrumentation for functions and blocks of code.
//!
//! - [`StepTimer::wrap`] turns a callable into a [`TimedFn`] that logs
//!   `[<name>] Elapsed time: <secs> seconds` after every successful call.
//! - [`StepTimer::time_step`] returns a [`StepGuard`] that logs the same line
//!   for its scope when dropped, on every exit path.
//!
//! Clocks and log sinks are injected through the [`Clock`] and [`LogSink`]
//! traits; [`global()`] provides a process-wide timer logging via `tracing`.

pub mod clock;
pub mod global;
pub mod sink;
pub mod span;
pub mod timer;

pub use clock::{Clock, ManualClock, MonotonicClock, Timestamp, WallClock};
pub use global::{global, time_function, time_step, GLOBAL_STEP_TIMER};
pub use sink::{Level, LogSink, MemorySink, ParseLevelError, TracingSink};
pub use span::{TimingSpan, ELAPSED_PRECISION};
pub use timer::{function_name, Invoke, StepGuard, StepTimer, TimedFn};
