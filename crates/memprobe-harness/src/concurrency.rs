//! Threading and synchronization micro-tests.

use std::collections::VecDeque;
use std::hint::black_box;
use std::sync::atomic::{AtomicBool, AtomicU64, Ordering};
use std::thread;
use std::time::Duration;

use memprobe_core::util::statistics;
use memprobe_core::util::timer::Timer;

use parking_lot::{Condvar, Mutex};
use serde::{Deserialize, Serialize};

/// Parameters shared by all four micro-tests.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ConcurrencyConfig {
    pub thread_count: usize,
    pub iterations: usize,
    /// Units of dummy arithmetic performed inside the measured section.
    pub work_size: usize,
}

impl Default for ConcurrencyConfig {
    fn default() -> Self {
        Self {
            thread_count: 4,
            iterations: 1000,
            work_size: 100,
        }
    }
}

/// Results of one micro-test.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ConcurrencyMetrics {
    pub test_name: String,
    pub total_time_ms: f64,
    /// Summed lock wait time; zero for tests without a lock.
    pub contention_time_ms: f64,
    /// Operations per second over the wall time.
    pub throughput: f64,
    /// Rough operations per ms per thread; not normalized to [0, 1].
    pub thread_efficiency: f64,
    /// Final observed counter/items value.
    pub ops_completed: u64,
}

/// Dummy arithmetic the compiler cannot elide.
fn spin_work(units: usize) {
    let mut acc = 0usize;
    for unit in 0..units {
        acc = acc.wrapping_add(unit);
    }
    black_box(acc);
}

/// Four independent micro-tests over OS threads. Every spawned thread is
/// joined before a test returns.
#[derive(Debug, Default)]
pub struct ConcurrencyBenchmark;

impl ConcurrencyBenchmark {
    #[must_use]
    pub fn new() -> Self {
        Self
    }

    /// Threads repeatedly acquire one shared mutex, spin under the lock,
    /// and bump a shared counter. Lock wait time is measured per
    /// acquisition and summed as the contention figure.
    #[must_use]
    pub fn run_mutex_contention(&self, config: &ConcurrencyConfig) -> ConcurrencyMetrics {
        let lock = Mutex::new(());
        let counter = AtomicU64::new(0);
        let wait_ns = AtomicU64::new(0);

        let mut total = Timer::new();
        total.start();
        thread::scope(|scope| {
            for _ in 0..config.thread_count {
                scope.spawn(|| {
                    for _ in 0..config.iterations {
                        let mut wait = Timer::new();
                        wait.start();
                        let guard = lock.lock();
                        wait.stop();
                        wait_ns.fetch_add(wait.elapsed_ns() as u64, Ordering::Relaxed);

                        spin_work(config.work_size);
                        counter.fetch_add(1, Ordering::SeqCst);
                        drop(guard);
                    }
                });
            }
        });
        total.stop();

        let ops = counter.load(Ordering::SeqCst);
        let total_time_ms = total.elapsed_ms();
        ConcurrencyMetrics {
            test_name: "Mutex Contention".to_owned(),
            total_time_ms,
            contention_time_ms: wait_ns.load(Ordering::Relaxed) as f64 / 1e6,
            throughput: statistics::throughput(ops as usize, total.elapsed_ns()),
            thread_efficiency: (config.iterations * config.thread_count) as f64
                / (total_time_ms * config.thread_count as f64),
            ops_completed: ops,
        }
    }

    /// Threads hammer one shared atomic: a relaxed increment plus
    /// `work_size / 10` sequentially-consistent increments per round.
    #[must_use]
    pub fn run_atomic_performance(&self, config: &ConcurrencyConfig) -> ConcurrencyMetrics {
        let counter = AtomicU64::new(0);

        let mut total = Timer::new();
        total.start();
        thread::scope(|scope| {
            for _ in 0..config.thread_count {
                scope.spawn(|| {
                    for _ in 0..config.iterations {
                        counter.fetch_add(1, Ordering::Relaxed);
                        for _ in 0..config.work_size / 10 {
                            counter.fetch_add(1, Ordering::SeqCst);
                        }
                    }
                });
            }
        });
        total.stop();

        let ops = counter.load(Ordering::SeqCst);
        ConcurrencyMetrics {
            test_name: "Atomic Performance".to_owned(),
            total_time_ms: total.elapsed_ms(),
            contention_time_ms: 0.0,
            throughput: statistics::throughput(ops as usize, total.elapsed_ns()),
            thread_efficiency: 0.0,
            ops_completed: ops,
        }
    }

    /// Half the threads push into a shared queue, half pop from it with a
    /// short timed wait. Producers are joined, then the completion flag is
    /// set and broadcast; consumers drain until the flag is set and the
    /// queue is empty. No FIFO guarantee across producers; every produced
    /// item is consumed before the call returns.
    #[must_use]
    pub fn run_producer_consumer(&self, config: &ConcurrencyConfig) -> ConcurrencyMetrics {
        let queue: Mutex<VecDeque<u64>> = Mutex::new(VecDeque::new());
        let ready = Condvar::new();
        let done = AtomicBool::new(false);
        let consumed = AtomicU64::new(0);
        let pair_count = config.thread_count / 2;

        let mut total = Timer::new();
        total.start();
        thread::scope(|scope| {
            for _ in 0..pair_count {
                scope.spawn(|| loop {
                    let mut items = queue.lock();
                    if items.is_empty() {
                        if done.load(Ordering::Acquire) {
                            break;
                        }
                        // Timed wait so a completion broadcast between the
                        // emptiness check and the sleep cannot hang us.
                        let _ = ready.wait_for(&mut items, Duration::from_millis(1));
                    }
                    if items.pop_front().is_some() {
                        consumed.fetch_add(1, Ordering::Relaxed);
                    }
                });
            }

            let producers: Vec<_> = (0..pair_count)
                .map(|_| {
                    scope.spawn(|| {
                        for item in 0..config.iterations as u64 {
                            queue.lock().push_back(item);
                            ready.notify_one();
                        }
                    })
                })
                .collect();

            for producer in producers {
                let _ = producer.join();
            }
            done.store(true, Ordering::Release);
            ready.notify_all();
        });
        total.stop();

        let ops = consumed.load(Ordering::Relaxed);
        ConcurrencyMetrics {
            test_name: "Producer-Consumer".to_owned(),
            total_time_ms: total.elapsed_ms(),
            contention_time_ms: 0.0,
            throughput: statistics::throughput(ops as usize, total.elapsed_ns()),
            thread_efficiency: 0.0,
            ops_completed: ops,
        }
    }

    /// Spawn-and-join rounds of short-lived threads, measuring creation
    /// overhead.
    #[must_use]
    pub fn run_thread_creation(&self, config: &ConcurrencyConfig) -> ConcurrencyMetrics {
        let mut total = Timer::new();
        total.start();
        for _ in 0..config.iterations {
            let handles: Vec<_> = (0..config.thread_count)
                .map(|_| thread::spawn(|| spin_work(100)))
                .collect();
            for handle in handles {
                let _ = handle.join();
            }
        }
        total.stop();

        let ops = (config.iterations * config.thread_count) as u64;
        let total_time_ms = total.elapsed_ms();
        let throughput = if total_time_ms > 0.0 {
            ops as f64 / (total_time_ms / 1e3)
        } else {
            0.0
        };
        ConcurrencyMetrics {
            test_name: "Thread Creation".to_owned(),
            total_time_ms,
            contention_time_ms: 0.0,
            throughput,
            thread_efficiency: 0.0,
            ops_completed: ops,
        }
    }
}
