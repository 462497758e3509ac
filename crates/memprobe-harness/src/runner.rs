//! Allocation/deallocation workload driver.

use memprobe_core::util::statistics::{self, SampleStats};
use memprobe_core::util::timer::Timer;
use memprobe_core::Allocator;

use serde::{Deserialize, Serialize};

/// Workload parameters for one benchmark run.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BenchmarkConfig {
    /// Bytes per allocation.
    pub object_size: usize,
    /// Allocations per iteration.
    pub object_count: usize,
    /// Iterations (one sample each for both phases).
    pub iterations: usize,
    /// Alignment passed to every allocation.
    pub alignment: usize,
    /// Threads for the concurrency companion tests; the allocator
    /// workload itself is single-threaded.
    pub thread_count: usize,
    /// Deterministically shuffle the deallocation order.
    pub randomize_order: bool,
}

impl Default for BenchmarkConfig {
    fn default() -> Self {
        Self {
            object_size: 256,
            object_count: 10_000,
            iterations: 10,
            alignment: 8,
            thread_count: 1,
            randomize_order: false,
        }
    }
}

/// Reduced metrics for one allocator under one config.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct BenchmarkMetrics {
    pub allocator_name: String,
    /// Per-iteration mean allocation latency samples, reduced (ns).
    pub allocation_time: SampleStats,
    /// Per-iteration mean deallocation latency samples, reduced (ns).
    pub deallocation_time: SampleStats,
    /// Allocations per second, from the mean allocation latency.
    pub throughput: f64,
    /// Largest peak_bytes_used observed across iterations.
    pub peak_memory: usize,
    /// Allocator-reported fragmentation after the last iteration (%).
    pub fragmentation: f64,
}

/// Progress observer: integer percent in [0, 100] plus a short status.
pub type ProgressCallback = Box<dyn FnMut(u32, &str)>;

/// Runs allocation workloads against one allocator at a time.
#[derive(Default)]
pub struct BenchmarkRunner {
    progress: Option<ProgressCallback>,
}

impl BenchmarkRunner {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Install a progress observer, invoked after each iteration.
    pub fn set_progress_callback(&mut self, callback: ProgressCallback) {
        self.progress = Some(callback);
    }

    /// Run the configured workload: per iteration, reset the allocator,
    /// time an allocation burst of `object_count` blocks, then time
    /// returning every retained block. Deallocation walks the production
    /// order, reversed for LIFO-only allocators, shuffled when
    /// `randomize_order` is set.
    pub fn run(&mut self, allocator: &mut dyn Allocator, config: &BenchmarkConfig) -> BenchmarkMetrics {
        let mut metrics = BenchmarkMetrics {
            allocator_name: allocator.name().to_owned(),
            ..BenchmarkMetrics::default()
        };

        let mut alloc_samples = Vec::with_capacity(config.iterations);
        let mut dealloc_samples = Vec::with_capacity(config.iterations);
        let mut pointers: Vec<*mut u8> = Vec::with_capacity(config.object_count);

        for iteration in 0..config.iterations {
            allocator.reset();
            pointers.clear();

            let mut alloc_timer = Timer::new();
            alloc_timer.start();
            for _ in 0..config.object_count {
                if let Some(ptr) = allocator.allocate(config.object_size, config.alignment) {
                    pointers.push(ptr);
                }
            }
            alloc_timer.stop();
            alloc_samples.push(alloc_timer.elapsed_ns() / config.object_count.max(1) as f64);

            metrics.peak_memory = metrics.peak_memory.max(allocator.stats().peak_bytes_used);

            if allocator.lifo_only() {
                pointers.reverse();
            } else if config.randomize_order {
                shuffle(&mut pointers, 0x9E37_79B9_7F4A_7C15 ^ iteration as u64);
            }

            let mut dealloc_timer = Timer::new();
            dealloc_timer.start();
            for &ptr in &pointers {
                allocator.deallocate(ptr);
            }
            dealloc_timer.stop();
            dealloc_samples.push(dealloc_timer.elapsed_ns() / pointers.len().max(1) as f64);

            if let Some(callback) = self.progress.as_mut() {
                let percent = ((iteration + 1) * 100 / config.iterations.max(1)) as u32;
                callback(percent, &format!("Running iteration {}", iteration + 1));
            }
        }

        metrics.allocation_time = statistics::analyze(&mut alloc_samples);
        metrics.deallocation_time = statistics::analyze(&mut dealloc_samples);
        metrics.throughput =
            statistics::throughput(config.object_count, metrics.allocation_time.mean);
        metrics.fragmentation = allocator.fragmentation_percentage();

        metrics
    }
}

/// Fisher-Yates with an xorshift64* stream; deterministic per seed.
fn shuffle<T>(items: &mut [T], seed: u64) {
    let mut state = seed | 1;
    let mut next = move || {
        state ^= state >> 12;
        state ^= state << 25;
        state ^= state >> 27;
        state.wrapping_mul(0x2545_F491_4F6C_DD1D)
    };
    for i in (1..items.len()).rev() {
        let j = (next() % (i as u64 + 1)) as usize;
        items.swap(i, j);
    }
}
