//! Programmatic surface consumed by host bindings and the CLI.

use memprobe_core::util::memory::{mib, MAX_ALIGN};
use memprobe_core::{
    AllocationStats, Allocator, FitPolicy, FreeListAllocator, PoolAllocator, StackAllocator,
    StandardAllocator,
};

use crate::concurrency::{ConcurrencyBenchmark, ConcurrencyConfig, ConcurrencyMetrics};
use crate::runner::{BenchmarkConfig, BenchmarkMetrics, BenchmarkRunner, ProgressCallback};

/// Default pool geometry.
const DEFAULT_POOL_BLOCK_SIZE: usize = 4096;
const DEFAULT_POOL_BLOCK_COUNT: usize = 10_000;
/// Default stack / free-list backing size.
const DEFAULT_REGION_SIZE_MIB: usize = 16;

/// Allocator selection, with the numeric encoding host bindings use.
#[derive(Debug, Clone, Copy, PartialEq, Eq, clap::ValueEnum)]
pub enum AllocatorKind {
    Standard,
    Pool,
    Stack,
    FreeList,
}

impl AllocatorKind {
    /// Decode the binding-level index: STANDARD=0, POOL=1, STACK=2,
    /// FREELIST=3.
    #[must_use]
    pub fn from_index(index: u32) -> Option<Self> {
        match index {
            0 => Some(Self::Standard),
            1 => Some(Self::Pool),
            2 => Some(Self::Stack),
            3 => Some(Self::FreeList),
            _ => None,
        }
    }

    /// All variants, in index order.
    #[must_use]
    pub fn all() -> [Self; 4] {
        [Self::Standard, Self::Pool, Self::Stack, Self::FreeList]
    }
}

/// Concurrency micro-test selection, with the binding-level encoding.
#[derive(Debug, Clone, Copy, PartialEq, Eq, clap::ValueEnum)]
pub enum ConcurrencyTest {
    MutexContention,
    AtomicPerformance,
    ProducerConsumer,
    ThreadCreation,
}

impl ConcurrencyTest {
    /// Decode the binding-level index: MUTEX_CONTENTION=0,
    /// ATOMIC_PERFORMANCE=1, PRODUCER_CONSUMER=2, THREAD_CREATION=3.
    #[must_use]
    pub fn from_index(index: u32) -> Option<Self> {
        match index {
            0 => Some(Self::MutexContention),
            1 => Some(Self::AtomicPerformance),
            2 => Some(Self::ProducerConsumer),
            3 => Some(Self::ThreadCreation),
            _ => None,
        }
    }

    /// All tests, in index order.
    #[must_use]
    pub fn all() -> [Self; 4] {
        [
            Self::MutexContention,
            Self::AtomicPerformance,
            Self::ProducerConsumer,
            Self::ThreadCreation,
        ]
    }
}

/// Owns one instance of every allocator variant plus the benchmark
/// drivers, and routes operations to the current selection.
pub struct Engine {
    standard: StandardAllocator,
    pool: PoolAllocator,
    stack: StackAllocator,
    free_list: FreeListAllocator,
    current: AllocatorKind,
    runner: BenchmarkRunner,
    concurrency: ConcurrencyBenchmark,
}

impl Engine {
    /// Build an engine with the default allocator geometry: pool
    /// 4096 x 10 000, stack and free list over 16 MiB regions, baseline
    /// unbounded. The baseline starts selected.
    #[must_use]
    pub fn new() -> Self {
        Self {
            standard: StandardAllocator::new(),
            pool: PoolAllocator::new(DEFAULT_POOL_BLOCK_SIZE, DEFAULT_POOL_BLOCK_COUNT, MAX_ALIGN),
            stack: StackAllocator::new(mib(DEFAULT_REGION_SIZE_MIB), MAX_ALIGN),
            free_list: FreeListAllocator::new(mib(DEFAULT_REGION_SIZE_MIB), FitPolicy::BestFit),
            current: AllocatorKind::Standard,
            runner: BenchmarkRunner::new(),
            concurrency: ConcurrencyBenchmark::new(),
        }
    }

    /// Select the allocator subsequent operations target.
    pub fn set_allocator(&mut self, kind: AllocatorKind) {
        self.current = kind;
    }

    /// Currently selected variant.
    #[must_use]
    pub fn current_allocator(&self) -> AllocatorKind {
        self.current
    }

    /// Shared-contract view of the current allocator.
    #[must_use]
    pub fn allocator(&self) -> &dyn Allocator {
        match self.current {
            AllocatorKind::Standard => &self.standard,
            AllocatorKind::Pool => &self.pool,
            AllocatorKind::Stack => &self.stack,
            AllocatorKind::FreeList => &self.free_list,
        }
    }

    /// Run the allocation benchmark against the current allocator.
    pub fn run_benchmark(&mut self, config: &BenchmarkConfig) -> BenchmarkMetrics {
        let Self {
            standard,
            pool,
            stack,
            free_list,
            current,
            runner,
            ..
        } = self;
        let allocator: &mut dyn Allocator = match current {
            AllocatorKind::Standard => standard,
            AllocatorKind::Pool => pool,
            AllocatorKind::Stack => stack,
            AllocatorKind::FreeList => free_list,
        };
        runner.run(allocator, config)
    }

    /// Run one concurrency micro-test; independent of the allocator
    /// selection.
    #[must_use]
    pub fn run_concurrency_test(
        &self,
        test: ConcurrencyTest,
        config: &ConcurrencyConfig,
    ) -> ConcurrencyMetrics {
        match test {
            ConcurrencyTest::MutexContention => self.concurrency.run_mutex_contention(config),
            ConcurrencyTest::AtomicPerformance => self.concurrency.run_atomic_performance(config),
            ConcurrencyTest::ProducerConsumer => self.concurrency.run_producer_consumer(config),
            ConcurrencyTest::ThreadCreation => self.concurrency.run_thread_creation(config),
        }
    }

    /// Install the runner's progress observer.
    pub fn set_progress_callback(&mut self, callback: ProgressCallback) {
        self.runner.set_progress_callback(callback);
    }

    /// Statistics snapshot of the current allocator.
    #[must_use]
    pub fn stats(&self) -> AllocationStats {
        *self.allocator().stats()
    }

    /// Live-allocation bitmap; non-empty only while the pool is selected.
    #[must_use]
    pub fn memory_grid(&self) -> Vec<bool> {
        match self.current {
            AllocatorKind::Pool => self.pool.allocation_grid(),
            _ => Vec::new(),
        }
    }

    /// Reset the current allocator to its constructed state.
    pub fn reset_current_allocator(&mut self) {
        let Self {
            standard,
            pool,
            stack,
            free_list,
            current,
            ..
        } = self;
        let allocator: &mut dyn Allocator = match current {
            AllocatorKind::Standard => standard,
            AllocatorKind::Pool => pool,
            AllocatorKind::Stack => stack,
            AllocatorKind::FreeList => free_list,
        };
        allocator.reset();
    }
}

impl Default for Engine {
    fn default() -> Self {
        Self::new()
    }
}
