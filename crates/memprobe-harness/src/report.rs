//! Suite report rendering.

use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::concurrency::ConcurrencyMetrics;
use crate::runner::BenchmarkMetrics;

/// Failure at the report boundary.
#[derive(Debug, thiserror::Error)]
pub enum ReportError {
    #[error("report serialization failed: {0}")]
    Serialize(#[from] serde_json::Error),
    #[error("report write failed: {0}")]
    Io(#[from] std::io::Error),
}

/// One full diagnostics run: allocator benchmarks plus concurrency
/// micro-tests.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct SuiteReport {
    pub title: String,
    pub benchmarks: Vec<BenchmarkMetrics>,
    pub concurrency: Vec<ConcurrencyMetrics>,
}

impl SuiteReport {
    #[must_use]
    pub fn new(title: impl Into<String>) -> Self {
        Self {
            title: title.into(),
            benchmarks: Vec::new(),
            concurrency: Vec::new(),
        }
    }

    /// Render the human-readable row format.
    #[must_use]
    pub fn to_text(&self) -> String {
        let mut out = String::new();
        out.push_str(&format!("\n{}\n", self.title));
        out.push_str(&format!("{}\n", "=".repeat(60)));

        if !self.benchmarks.is_empty() {
            out.push_str("\n=== Allocator Benchmarks ===\n");
            for metrics in &self.benchmarks {
                out.push_str(&render_benchmark(metrics));
            }
        }

        if !self.concurrency.is_empty() {
            out.push_str("\n=== Concurrency Benchmarks ===\n");
            for metrics in &self.concurrency {
                out.push_str(&render_concurrency(metrics));
            }
        }

        out.push_str(&format!("{}\n", "=".repeat(60)));
        out
    }

    /// Render the report as pretty JSON.
    pub fn to_json(&self) -> Result<String, ReportError> {
        Ok(serde_json::to_string_pretty(self)?)
    }

    /// Write the JSON rendering to `path`.
    pub fn write_json(&self, path: &Path) -> Result<(), ReportError> {
        std::fs::write(path, self.to_json()?)?;
        Ok(())
    }
}

fn render_benchmark(metrics: &BenchmarkMetrics) -> String {
    let mut out = String::new();
    out.push_str(&format!("\nAllocator: {}\n", metrics.allocator_name));
    out.push_str(&format!(
        "  Mean Alloc Time:   {:.2} ns\n",
        metrics.allocation_time.mean
    ));
    out.push_str(&format!(
        "  Median Alloc Time: {:.2} ns\n",
        metrics.allocation_time.median
    ));
    out.push_str(&format!(
        "  Min/Max:           {:.2} / {:.2} ns\n",
        metrics.allocation_time.min, metrics.allocation_time.max
    ));
    out.push_str(&format!(
        "  Std Dev:           {:.2} ns\n",
        metrics.allocation_time.std_dev
    ));
    out.push_str(&format!(
        "  Mean Dealloc Time: {:.2} ns\n",
        metrics.deallocation_time.mean
    ));
    out.push_str(&format!(
        "  Throughput:        {:.2} ops/sec\n",
        metrics.throughput
    ));
    out.push_str(&format!(
        "  Peak Memory:       {:.2} KB\n",
        metrics.peak_memory as f64 / 1024.0
    ));
    out.push_str(&format!(
        "  Fragmentation:     {:.2}%\n",
        metrics.fragmentation
    ));
    out
}

fn render_concurrency(metrics: &ConcurrencyMetrics) -> String {
    let mut out = String::new();
    out.push_str(&format!("\nTest: {}\n", metrics.test_name));
    out.push_str(&format!(
        "  Total Time:     {:.2} ms\n",
        metrics.total_time_ms
    ));
    out.push_str(&format!(
        "  Contention:     {:.2} ms\n",
        metrics.contention_time_ms
    ));
    out.push_str(&format!(
        "  Throughput:     {:.2} ops/sec\n",
        metrics.throughput
    ));
    out.push_str(&format!(
        "  Ops Completed:  {}\n",
        metrics.ops_completed
    ));
    out
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample_report() -> SuiteReport {
        let mut report = SuiteReport::new("Memory Diagnostics Suite");
        report.benchmarks.push(BenchmarkMetrics {
            allocator_name: "Pool Allocator".to_owned(),
            throughput: 1e6,
            peak_memory: 4096,
            ..BenchmarkMetrics::default()
        });
        report.concurrency.push(ConcurrencyMetrics {
            test_name: "Mutex Contention".to_owned(),
            total_time_ms: 12.5,
            ops_completed: 4000,
            ..ConcurrencyMetrics::default()
        });
        report
    }

    #[test]
    fn text_rendering_lists_every_section() {
        let text = sample_report().to_text();
        assert!(text.contains("Memory Diagnostics Suite"));
        assert!(text.contains("Allocator: Pool Allocator"));
        assert!(text.contains("Test: Mutex Contention"));
        assert!(text.contains("Throughput"));
    }

    #[test]
    fn empty_sections_are_omitted() {
        let report = SuiteReport::new("Empty");
        let text = report.to_text();
        assert!(!text.contains("Allocator Benchmarks"));
        assert!(!text.contains("Concurrency Benchmarks"));
    }

    #[test]
    fn json_round_trips() {
        let json = sample_report().to_json().expect("serialize");
        let parsed: SuiteReport = serde_json::from_str(&json).expect("deserialize");
        assert_eq!(parsed.benchmarks.len(), 1);
        assert_eq!(parsed.benchmarks[0].allocator_name, "Pool Allocator");
        assert_eq!(parsed.concurrency[0].ops_completed, 4000);
    }

    #[test]
    fn write_json_creates_the_file() {
        let dir = std::env::temp_dir().join("memprobe-report-test");
        std::fs::create_dir_all(&dir).expect("temp dir");
        let path = dir.join("suite.json");

        sample_report().write_json(&path).expect("write");
        let contents = std::fs::read_to_string(&path).expect("read back");
        assert!(contents.contains("Pool Allocator"));

        let _ = std::fs::remove_file(&path);
    }
}
