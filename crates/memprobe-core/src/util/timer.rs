//! Monotonic high-resolution elapsed-time accumulator.

use std::time::{Duration, Instant};

/// Accumulating stopwatch over the monotonic clock.
///
/// `start`/`stop` may be paired repeatedly; elapsed time accumulates across
/// pairs. Querying while running includes the in-flight interval.
#[derive(Debug, Clone, Copy, Default)]
pub struct Timer {
    started: Option<Instant>,
    accumulated: Duration,
}

impl Timer {
    /// Create a stopped timer with zero accumulated time.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Start timing. No-op if already running.
    pub fn start(&mut self) {
        if self.started.is_none() {
            self.started = Some(Instant::now());
        }
    }

    /// Stop timing and fold the interval into the accumulator. No-op if
    /// not running.
    pub fn stop(&mut self) {
        if let Some(started) = self.started.take() {
            self.accumulated += started.elapsed();
        }
    }

    /// Stop and clear the accumulator.
    pub fn reset(&mut self) {
        self.started = None;
        self.accumulated = Duration::ZERO;
    }

    /// Clear the accumulator and start timing again.
    pub fn restart(&mut self) {
        self.reset();
        self.start();
    }

    /// Accumulated nanoseconds, including the in-flight interval when
    /// running.
    #[must_use]
    pub fn elapsed_ns(&self) -> f64 {
        let mut total = self.accumulated;
        if let Some(started) = self.started {
            total += started.elapsed();
        }
        total.as_secs_f64() * 1e9
    }

    /// Accumulated microseconds.
    #[must_use]
    pub fn elapsed_us(&self) -> f64 {
        self.elapsed_ns() / 1e3
    }

    /// Accumulated milliseconds.
    #[must_use]
    pub fn elapsed_ms(&self) -> f64 {
        self.elapsed_ns() / 1e6
    }

    /// Accumulated seconds.
    #[must_use]
    pub fn elapsed_sec(&self) -> f64 {
        self.elapsed_ns() / 1e9
    }

    /// Whether a `start` is outstanding.
    #[must_use]
    pub fn is_running(&self) -> bool {
        self.started.is_some()
    }
}
