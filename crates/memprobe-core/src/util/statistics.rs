//! Sample-vector reduction for benchmark timings.

use serde::{Deserialize, Serialize};

/// Summary statistics over one sample vector, in the sample's unit
/// (nanoseconds for the benchmark driver).
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct SampleStats {
    pub mean: f64,
    pub median: f64,
    pub std_dev: f64,
    pub min: f64,
    pub max: f64,
    pub p95: f64,
    pub p99: f64,
    pub sample_count: usize,
}

/// Reduce a sample vector. Sorts `samples` ascending in place; an empty
/// input yields an all-zero record.
///
/// The standard deviation is the population form; p95/p99 are the samples
/// at `floor(n * 0.95)` and `floor(n * 0.99)`.
#[must_use]
pub fn analyze(samples: &mut [f64]) -> SampleStats {
    if samples.is_empty() {
        return SampleStats::default();
    }

    samples.sort_by(f64::total_cmp);

    let n = samples.len();
    let mean = samples.iter().sum::<f64>() / n as f64;

    let mid = n / 2;
    let median = if n % 2 == 0 {
        (samples[mid - 1] + samples[mid]) / 2.0
    } else {
        samples[mid]
    };

    let variance = samples.iter().map(|s| (s - mean) * (s - mean)).sum::<f64>() / n as f64;

    SampleStats {
        mean,
        median,
        std_dev: variance.sqrt(),
        min: samples[0],
        max: samples[n - 1],
        p95: samples[(n as f64 * 0.95) as usize],
        p99: samples[(n as f64 * 0.99) as usize],
        sample_count: n,
    }
}

/// Operations per second for `operations` completed in `time_ns`
/// nanoseconds. Zero when `time_ns` is not positive.
#[must_use]
pub fn throughput(operations: usize, time_ns: f64) -> f64 {
    if time_ns <= 0.0 {
        return 0.0;
    }
    operations as f64 * 1e9 / time_ns
}
