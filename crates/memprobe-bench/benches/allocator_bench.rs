//! Allocator comparison benchmarks.

use criterion::{criterion_group, criterion_main, BenchmarkId, Criterion};

use memprobe_core::util::memory::mib;
use memprobe_core::{
    Allocator, FitPolicy, FreeListAllocator, PoolAllocator, StackAllocator, StandardAllocator,
};

const BURST: usize = 1000;

fn burst_and_drain(allocator: &mut dyn Allocator, size: usize, lifo: bool) {
    // Reset keeps the allocation history bounded across criterion runs.
    allocator.reset();
    let mut pointers = Vec::with_capacity(BURST);
    for _ in 0..BURST {
        if let Some(ptr) = allocator.allocate(criterion::black_box(size), 16) {
            pointers.push(ptr);
        }
    }
    if lifo {
        pointers.reverse();
    }
    for ptr in pointers {
        allocator.deallocate(ptr);
    }
}

fn bench_alloc_burst(c: &mut Criterion) {
    let sizes: &[usize] = &[16, 64, 256, 1024];
    let mut group = c.benchmark_group("alloc_burst");

    for &size in sizes {
        group.bench_with_input(BenchmarkId::new("standard", size), &size, |b, &sz| {
            let mut allocator = StandardAllocator::new();
            b.iter(|| burst_and_drain(&mut allocator, sz, false));
        });
        group.bench_with_input(BenchmarkId::new("pool", size), &size, |b, &sz| {
            let mut allocator = PoolAllocator::new(1024, BURST, 16);
            b.iter(|| burst_and_drain(&mut allocator, sz, false));
        });
        group.bench_with_input(BenchmarkId::new("stack", size), &size, |b, &sz| {
            let mut allocator = StackAllocator::new(mib(16), 16);
            b.iter(|| burst_and_drain(&mut allocator, sz, true));
        });
        group.bench_with_input(BenchmarkId::new("free_list", size), &size, |b, &sz| {
            let mut allocator = FreeListAllocator::new(mib(16), FitPolicy::FirstFit);
            b.iter(|| burst_and_drain(&mut allocator, sz, false));
        });
    }
    group.finish();
}

fn bench_free_list_policies(c: &mut Criterion) {
    let mut group = c.benchmark_group("free_list_policies");

    for (label, policy) in [
        ("first_fit", FitPolicy::FirstFit),
        ("best_fit", FitPolicy::BestFit),
        ("worst_fit", FitPolicy::WorstFit),
    ] {
        group.bench_function(label, |b| {
            let mut allocator = FreeListAllocator::new(mib(16), policy);
            b.iter(|| {
                allocator.reset();
                // Mixed sizes with interleaved frees to keep the free list
                // fragmented enough that the fit search matters.
                let mut pointers = Vec::with_capacity(256);
                for i in 0..256usize {
                    let size = 32 + (i % 7) * 48;
                    if let Some(ptr) = allocator.allocate(criterion::black_box(size), 16) {
                        pointers.push(ptr);
                    }
                    if i % 3 == 0 {
                        if let Some(ptr) = pointers.pop() {
                            allocator.deallocate(ptr);
                        }
                    }
                }
                for ptr in pointers.drain(..) {
                    allocator.deallocate(ptr);
                }
            });
        });
    }
    group.finish();
}

fn bench_stack_marker_rollback(c: &mut Criterion) {
    let mut group = c.benchmark_group("stack_rollback");

    group.bench_function("rollback_vs_1000_frees", |b| {
        let mut allocator = StackAllocator::new(mib(16), 16);
        b.iter(|| {
            allocator.reset();
            let mark = allocator.marker();
            for _ in 0..BURST {
                let _ = allocator.allocate(criterion::black_box(128), 16);
            }
            allocator.rollback_to(mark);
        });
    });
    group.finish();
}

criterion_group!(
    benches,
    bench_alloc_burst,
    bench_free_list_policies,
    bench_stack_marker_rollback
);
criterion_main!(benches);
