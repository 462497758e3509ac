//! Native diagnostics entry point.
//!
//! With no flags, runs every allocator benchmark and concurrency
//! micro-test at the default configuration, prints the suite report, and
//! exits 0.

use std::path::PathBuf;

use clap::Parser;

use memprobe_harness::{
    AllocatorKind, BenchmarkConfig, ConcurrencyConfig, ConcurrencyTest, Engine, SuiteReport,
};

/// Memory allocator diagnostics suite.
#[derive(Debug, Parser)]
#[command(name = "memprobe")]
#[command(about = "Benchmark custom allocator strategies and concurrency primitives")]
struct Cli {
    /// Bytes per allocation.
    #[arg(long, default_value_t = 256)]
    object_size: usize,
    /// Allocations per iteration.
    #[arg(long, default_value_t = 10_000)]
    object_count: usize,
    /// Benchmark iterations.
    #[arg(long, default_value_t = 5)]
    iterations: usize,
    /// Allocation alignment (power of two).
    #[arg(long, default_value_t = 16)]
    alignment: usize,
    /// Threads for the concurrency tests.
    #[arg(long, default_value_t = 4)]
    threads: usize,
    /// Dummy-work units inside the concurrency measured sections.
    #[arg(long, default_value_t = 100)]
    work_size: usize,
    /// Restrict the run to one allocator.
    #[arg(long, value_enum)]
    allocator: Option<AllocatorKind>,
    /// Also write the report as JSON.
    #[arg(long)]
    json: Option<PathBuf>,
}

fn main() -> Result<(), Box<dyn std::error::Error>> {
    let cli = Cli::parse();

    let benchmark_config = BenchmarkConfig {
        object_size: cli.object_size,
        object_count: cli.object_count,
        iterations: cli.iterations,
        alignment: cli.alignment,
        thread_count: 1,
        randomize_order: false,
    };
    let concurrency_config = ConcurrencyConfig {
        thread_count: cli.threads,
        iterations: 1000,
        work_size: cli.work_size,
    };

    let mut engine = Engine::new();
    let mut report = SuiteReport::new("Memory Engine Diagnostics Suite");

    let allocators = match cli.allocator {
        Some(kind) => vec![kind],
        None => AllocatorKind::all().to_vec(),
    };
    for kind in allocators {
        engine.set_allocator(kind);
        report.benchmarks.push(engine.run_benchmark(&benchmark_config));
    }

    for test in ConcurrencyTest::all() {
        report
            .concurrency
            .push(engine.run_concurrency_test(test, &concurrency_config));
    }

    print!("{}", report.to_text());

    if let Some(path) = cli.json {
        report.write_json(&path)?;
        eprintln!("Report written to {}", path.display());
    }

    Ok(())
}
