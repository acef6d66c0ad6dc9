use std::any::type_name;
use std::fmt;

use crate::clock::{Clock, MonotonicClock, Timestamp};
use crate::sink::{LogSink, TracingSink};
use crate::span::TimingSpan;

/// Bare name of a callable type, as reported by `type_name`.
///
/// Module paths and `<...>` groups (generic arguments, `<impl T>` and
/// `<T as Trait>` segments) are stripped; closures are named after the
/// function that defines them. `type_name` output is best effort, so use
/// [`StepTimer::wrap_named`] when the exact name matters.
pub fn function_name<F: ?Sized>() -> String {
    let mut path = type_name::<F>();
    while let Some(outer) = path.strip_suffix("::{{closure}}") {
        path = outer;
    }

    let mut plain = String::with_capacity(path.len());
    let mut depth = 0usize;
    for ch in path.chars() {
        match ch {
            '<' => depth += 1,
            // `->` in fn pointer types is not a closing bracket
            '>' if depth > 0 => depth -= 1,
            _ if depth == 0 => plain.push(ch),
            _ => {}
        }
    }

    match plain.rsplit("::").find(|segment| !segment.is_empty()) {
        Some(segment) => segment.to_string(),
        None => path.to_string(),
    }
}

/// Callable that can be invoked with its arguments packed into a tuple
pub trait Invoke<Args> {
    type Output;

    fn invoke(&self, args: Args) -> Self::Output;
}

macro_rules! impl_invoke {
    ($($ty:ident => $arg:ident),*) => {
        impl<Func, Ret, $($ty),*> Invoke<($($ty,)*)> for Func
        where
            Func: Fn($($ty),*) -> Ret,
        {
            type Output = Ret;

            #[inline]
            fn invoke(&self, ($($arg,)*): ($($ty,)*)) -> Ret {
                self($($arg),*)
            }
        }
    };
}

impl_invoke!();
impl_invoke!(A1 => a1);
impl_invoke!(A1 => a1, A2 => a2);
impl_invoke!(A1 => a1, A2 => a2, A3 => a3);
impl_invoke!(A1 => a1, A2 => a2, A3 => a3, A4 => a4);
impl_invoke!(A1 => a1, A2 => a2, A3 => a3, A4 => a4, A5 => a5);
impl_invoke!(A1 => a1, A2 => a2, A3 => a3, A4 => a4, A5 => a5, A6 => a6);

/// Times functions and blocks, writing one line per measurement to its sink.
///
/// The clock and sink are injected, so tests can drive the timer with a
/// [`ManualClock`](crate::clock::ManualClock) and read lines back from a
/// [`MemorySink`](crate::sink::MemorySink).
#[derive(Debug, Clone, Default)]
pub struct StepTimer<C = MonotonicClock, S = TracingSink> {
    clock: C,
    sink: S,
}

impl StepTimer {
    /// Timer on the monotonic clock that logs through `tracing` at INFO
    pub fn new() -> Self {
        Self::default()
    }
}

impl<C: Clock, S: LogSink> StepTimer<C, S> {
    pub fn with_parts(clock: C, sink: S) -> Self {
        Self { clock, sink }
    }

    pub fn clock(&self) -> &C {
        &self.clock
    }

    pub fn sink(&self) -> &S {
        &self.sink
    }

    #[inline]
    fn start(&self) -> Timestamp {
        self.clock.now()
    }

    /// Close the span opened at `start`, log it and return elapsed seconds
    fn finish(&self, label: &str, start: Timestamp) -> f64 {
        let span = TimingSpan::new(label, start, self.clock.now());
        self.sink.emit(&span.to_string());
        span.elapsed_secs()
    }

    /// Start timing a block. The line is logged when the guard is dropped,
    /// including when the scope is left through `?` or a panic.
    pub fn time_step(&self, label: impl Into<String>) -> StepGuard<'_, C, S> {
        StepGuard {
            timer: self,
            label: label.into(),
            start: self.start(),
        }
    }

    /// Run `f` as a timed block; the line is logged on every exit path
    pub fn step<R>(&self, label: &str, f: impl FnOnce() -> R) -> R {
        let _guard = self.time_step(label);
        f()
    }

    /// Run `f` as a timed call. If `f` panics nothing is logged.
    pub fn run<R>(&self, name: &str, f: impl FnOnce() -> R) -> R {
        let start = self.start();
        let result = f();
        self.finish(name, start);
        result
    }

    /// Like [`run`](Self::run), but an `Err` also skips the log line
    pub fn try_run<T, E>(&self, name: &str, f: impl FnOnce() -> Result<T, E>) -> Result<T, E> {
        let start = self.start();
        let value = f()?;
        self.finish(name, start);
        Ok(value)
    }

    /// Wrap `func` so every call is timed under the function's own name
    pub fn wrap<F>(&self, func: F) -> TimedFn<'_, F, C, S> {
        self.wrap_named(function_name::<F>(), func)
    }

    pub fn wrap_named<F>(&self, name: impl Into<String>, func: F) -> TimedFn<'_, F, C, S> {
        TimedFn {
            func,
            name: name.into(),
            timer: self,
        }
    }
}

/// Logs the elapsed time of its scope when dropped
#[must_use = "the step is logged as soon as the guard is dropped"]
pub struct StepGuard<'t, C: Clock, S: LogSink> {
    timer: &'t StepTimer<C, S>,
    label: String,
    start: Timestamp,
}

impl<C: Clock, S: LogSink> StepGuard<'_, C, S> {
    pub fn label(&self) -> &str {
        &self.label
    }

    pub fn start(&self) -> Timestamp {
        self.start
    }

    /// Seconds since the guard was created, without logging
    pub fn elapsed_secs(&self) -> f64 {
        self.timer.clock.now().elapsed_since(self.start)
    }
}

impl<C: Clock, S: LogSink> fmt::Debug for StepGuard<'_, C, S> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("StepGuard")
            .field("label", &self.label)
            .field("start", &self.start)
            .finish()
    }
}

impl<C: Clock, S: LogSink> Drop for StepGuard<'_, C, S> {
    fn drop(&mut self) {
        self.timer.finish(&self.label, self.start);
    }
}

/// A callable wrapped by [`StepTimer::wrap`]. Reports the wrapped callable's
/// name and logs the duration of every successful call.
pub struct TimedFn<'t, F, C, S> {
    func: F,
    name: String,
    timer: &'t StepTimer<C, S>,
}

impl<F, C: Clock, S: LogSink> TimedFn<'_, F, C, S> {
    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn inner(&self) -> &F {
        &self.func
    }

    pub fn into_inner(self) -> F {
        self.func
    }

    /// Call with the arguments packed in a tuple: `f.call((a, b))`.
    ///
    /// The return value passes through untouched, `Err` included. A panic in
    /// the wrapped callable propagates and nothing is logged.
    pub fn call<Args>(&self, args: Args) -> F::Output
    where
        F: Invoke<Args>,
    {
        self.timer.run(&self.name, || self.func.invoke(args))
    }

    /// Call a fallible callable; an `Err` propagates without a log line
    pub fn try_call<Args, T, E>(&self, args: Args) -> Result<T, E>
    where
        F: Invoke<Args, Output = Result<T, E>>,
    {
        self.timer.try_run(&self.name, || self.func.invoke(args))
    }
}

impl<F, C, S> fmt::Debug for TimedFn<'_, F, C, S> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("TimedFn").field("name", &self.name).finish_non_exhaustive()
    }
}

/// Time a block with the given timer, yielding the block's value
#[macro_export]
macro_rules! time_block {
    ($timer:expr, $label:expr, $code:block) => {{
        let _guard = $timer.time_step($label);
        $code
    }};
}

/// Wrap a function with the given timer, naming it after its identifier
#[macro_export]
macro_rules! timed {
    ($timer:expr, $func:ident) => {
        $timer.wrap_named(stringify!($func), $func)
    };
    ($timer:expr, $func:path) => {
        $timer.wrap($func)
    };
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::clock::ManualClock;
    use crate::sink::MemorySink;
    use std::panic::{self, AssertUnwindSafe};

    fn manual_timer(readings: &[f64]) -> StepTimer<ManualClock, MemorySink> {
        StepTimer::with_parts(
            ManualClock::with_readings(readings.iter().copied()),
            MemorySink::new(),
        )
    }

    fn add(a: i32, b: i32) -> i32 {
        a + b
    }

    fn parse_port(raw: &str) -> Result<u16, std::num::ParseIntError> {
        raw.parse()
    }

    fn answer() -> u32 {
        42
    }

    fn name_of<F>(_: &F) -> String {
        function_name::<F>()
    }

    #[test]
    fn test_function_name_of_fn_item() {
        assert_eq!(name_of(&add), "add");
        assert_eq!(name_of(&String::from_utf8_lossy), "from_utf8_lossy");
    }

    #[test]
    fn test_function_name_of_fn_pointer() {
        assert_eq!(function_name::<fn(i32)>(), "fn(i32)");
        assert_eq!(function_name::<fn(i32) -> i32>(), "fn(i32) -> i32");
    }

    #[test]
    fn test_function_name_of_closure() {
        let closure = |x: i32| x * 2;
        assert_eq!(name_of(&closure), "test_function_name_of_closure");
    }

    #[test]
    fn test_function_name_strips_generics() {
        assert_eq!(function_name::<Vec<String>>(), "Vec");
        assert_eq!(name_of(&Vec::<u8>::new), "new");
        assert_eq!(name_of(&std::cmp::max::<Vec<u8>>), "max");
    }

    #[test]
    fn test_function_name_of_inherent_methods() {
        assert_eq!(name_of(&i32::abs), "abs");
        assert_eq!(name_of(&str::len), "len");
        assert_eq!(name_of(&<u8 as Clone>::clone), "clone");
    }

    #[test]
    fn test_wrap_inherent_method_logs_its_name() {
        let timer = manual_timer(&[0.0, 0.5]);
        let timed_abs = timer.wrap(i32::abs);

        assert_eq!(timed_abs.name(), "abs");
        assert_eq!(timed_abs.call((-3,)), 3);
        assert_eq!(timer.sink().lines(), vec!["[abs] Elapsed time: 0.5000 seconds".to_string()]);

        let timed_len = timer.wrap(str::len);
        assert_eq!(timed_len.call(("four",)), 4);
        assert!(timer.sink().lines()[1].starts_with("[len] "));
    }

    #[test]
    fn test_wrap_preserves_name_and_result() {
        let timer = manual_timer(&[10.0, 10.1234]);
        let timed_add = timer.wrap(add);

        assert_eq!(timed_add.name(), "add");
        assert_eq!(timed_add.call((2, 3)), 5);
        assert_eq!(timer.sink().lines(), vec!["[add] Elapsed time: 0.1234 seconds".to_string()]);
    }

    #[test]
    fn test_zero_and_many_arguments() {
        let timer = manual_timer(&[]);
        let timed_answer = timer.wrap(answer);
        let sum6 = timer.wrap_named("sum6", |a: u8, b: u16, c: u32, d: u64, e: i32, f: i64| {
            a as i64 + b as i64 + c as i64 + d as i64 + e as i64 + f
        });

        assert_eq!(timed_answer.call(()), 42);
        assert_eq!(sum6.call((1, 2, 3, 4, 5, 6)), 21);

        let lines = timer.sink().lines();
        assert_eq!(lines.len(), 2);
        assert!(lines[0].starts_with("[answer] "));
        assert!(lines[1].starts_with("[sum6] "));
    }

    #[test]
    fn test_each_call_logs_once() {
        let timer = manual_timer(&[]);
        let timed_add = timer.wrap(add);

        for i in 0..5 {
            assert_eq!(timed_add.call((i, i)), i * 2);
        }

        assert_eq!(timer.sink().len(), 5);
    }

    #[test]
    fn test_call_passes_err_through_and_logs() {
        let timer = manual_timer(&[1.0, 1.5]);
        let timed_parse = timer.wrap(parse_port);

        assert!(timed_parse.call(("not a port",)).is_err());
        assert_eq!(timer.sink().lines(), vec!["[parse_port] Elapsed time: 0.5000 seconds".to_string()]);
    }

    #[test]
    fn test_try_call_skips_log_on_err() {
        let timer = manual_timer(&[]);
        let timed_parse = timer.wrap(parse_port);

        let err = timed_parse.try_call(("70000",)).unwrap_err();
        assert_eq!(err, "70000".parse::<u16>().unwrap_err());
        assert!(timer.sink().is_empty());

        assert_eq!(timed_parse.try_call(("8080",)), Ok(8080));
        assert_eq!(timer.sink().len(), 1);
    }

    #[test]
    fn test_panicking_function_logs_nothing() {
        let timer = manual_timer(&[]);
        let timed = timer.wrap_named("explode", |_: ()| -> u32 { panic!("boom") });

        let result = panic::catch_unwind(AssertUnwindSafe(|| timed.call(((),))));

        let payload = result.unwrap_err();
        assert_eq!(payload.downcast_ref::<&str>(), Some(&"boom"));
        assert!(timer.sink().is_empty());
    }

    #[test]
    fn test_step_guard_logs_on_drop() {
        let timer = manual_timer(&[10.0, 10.1234]);
        {
            let guard = timer.time_step("load");
            assert_eq!(guard.label(), "load");
            assert_eq!(guard.start().as_secs(), 10.0);
            assert!(timer.sink().is_empty());
        }
        assert_eq!(timer.sink().lines(), vec!["[load] Elapsed time: 0.1234 seconds".to_string()]);
    }

    #[test]
    fn test_step_returns_block_value() {
        let timer = manual_timer(&[0.0, 2.0]);
        let value = timer.step("sum", || (1..=10).sum::<u32>());

        assert_eq!(value, 55);
        assert_eq!(timer.sink().lines(), vec!["[sum] Elapsed time: 2.0000 seconds".to_string()]);
    }

    #[test]
    fn test_step_logs_when_block_returns_err() {
        fn load(timer: &StepTimer<ManualClock, MemorySink>) -> Result<u16, std::num::ParseIntError> {
            let _guard = timer.time_step("load");
            let port: u16 = "nope".parse()?;
            Ok(port)
        }

        let timer = manual_timer(&[]);
        assert!(load(&timer).is_err());
        assert_eq!(timer.sink().len(), 1);
        assert!(timer.sink().lines()[0].starts_with("[load] Elapsed time: "));
    }

    #[test]
    fn test_step_logs_when_block_panics() {
        let timer = manual_timer(&[5.0, 5.25]);

        let result = panic::catch_unwind(AssertUnwindSafe(|| {
            timer.step("fragile", || -> () { panic!("step failed") })
        }));

        assert!(result.is_err());
        assert_eq!(timer.sink().lines(), vec!["[fragile] Elapsed time: 0.2500 seconds".to_string()]);
    }

    #[test]
    fn test_guard_elapsed_does_not_log() {
        let timer = manual_timer(&[1.0, 1.75, 2.0]);
        let guard = timer.time_step("peek");
        assert_eq!(guard.elapsed_secs(), 0.75);
        assert!(timer.sink().is_empty());
        drop(guard);
        assert_eq!(timer.sink().lines(), vec!["[peek] Elapsed time: 1.0000 seconds".to_string()]);
    }

    #[test]
    fn test_nested_steps_log_inner_first() {
        let timer = manual_timer(&[]);
        timer.step("outer", || {
            timer.step("inner", || ());
        });

        let lines = timer.sink().lines();
        assert_eq!(lines.len(), 2);
        assert!(lines[0].starts_with("[inner] "));
        assert!(lines[1].starts_with("[outer] "));
    }

    #[test]
    fn test_time_block_macro() {
        let timer = manual_timer(&[]);

        let result = time_block!(&timer, "macro_test", {
            let mut sum = 0;
            for i in 0..100 {
                sum += i;
            }
            sum
        });

        assert_eq!(result, 4950);
        assert_eq!(timer.sink().len(), 1);
        assert!(timer.sink().lines()[0].starts_with("[macro_test] "));
    }

    #[test]
    fn test_timed_macro() {
        let timer = manual_timer(&[]);

        let timed_add = timed!(timer, add);
        assert_eq!(timed_add.name(), "add");
        assert_eq!(timed_add.call((20, 22)), 42);

        let timed_max = timed!(timer, std::cmp::max::<i32>);
        assert_eq!(timed_max.name(), "max");
        assert_eq!(timed_max.call((3, 9)), 9);
    }

    #[test]
    fn test_into_inner() {
        let timer = manual_timer(&[]);
        let timed_add = timer.wrap(add);
        assert_eq!((timed_add.inner())(1, 1), 2);
        let plain = timed_add.into_inner();
        assert_eq!(plain(2, 2), 4);
        assert!(timer.sink().is_empty());
    }

    #[test]
    fn test_debug_output() {
        let timer = manual_timer(&[]);
        let timed_add = timer.wrap(add);
        assert!(format!("{:?}", timed_add).contains("add"));

        let guard = timer.time_step("dbg");
        assert!(format!("{:?}", guard).contains("dbg"));
    }
}
