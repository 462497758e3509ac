//! # memprobe-core
//!
//! A family of memory allocators over caller-owned backing regions, with
//! per-operation timing and allocation statistics. Four disciplines share
//! one contract: a system-allocator baseline, a fixed-size block pool, a
//! LIFO stack, and a coalescing free list.
//!
//! No `unsafe` code is permitted at the crate level; every raw-memory
//! operation lives in [`allocators::raw`], whose contract is bounds-checked.

#![deny(unsafe_code)]

pub mod allocators;
pub mod util;

pub use allocators::free_list::{FitPolicy, FreeListAllocator};
pub use allocators::pool::PoolAllocator;
pub use allocators::stack::StackAllocator;
pub use allocators::standard::StandardAllocator;
pub use allocators::{AllocationInfo, AllocationStats, Allocator};
pub use util::statistics::SampleStats;
pub use util::timer::Timer;
