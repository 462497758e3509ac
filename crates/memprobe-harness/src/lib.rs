//! # memprobe-harness
//!
//! Drives the `memprobe-core` allocator family through deterministic
//! workloads and reduces the timings into comparable metrics.
//!
//! This crate provides:
//! - Benchmark runner: timed allocation/deallocation phases per iteration
//! - Concurrency benchmark: mutex, atomic, producer/consumer, and
//!   thread-creation micro-tests
//! - Engine: the programmatic surface host bindings consume
//! - Report: human-readable and JSON renderings of a benchmark suite

#![forbid(unsafe_code)]

pub mod concurrency;
pub mod engine;
pub mod report;
pub mod runner;

pub use concurrency::{ConcurrencyBenchmark, ConcurrencyConfig, ConcurrencyMetrics};
pub use engine::{AllocatorKind, ConcurrencyTest, Engine};
pub use report::{ReportError, SuiteReport};
pub use runner::{BenchmarkConfig, BenchmarkMetrics, BenchmarkRunner, ProgressCallback};
