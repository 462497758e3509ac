//! The allocator family and its shared contract.

pub mod free_list;
pub mod pool;
#[allow(unsafe_code)]
pub mod raw;
pub mod stack;
pub mod standard;
mod tracker;

pub use tracker::{AllocationInfo, AllocationStats, AllocationTracker};

/// The capability set every allocator variant exposes.
///
/// Variants are single-threaded: callers serialize access externally.
/// Errors are encoded in return values — exhaustion and rejected requests
/// yield `None`, foreign or out-of-order pointers handed to [`deallocate`]
/// are silently ignored.
///
/// [`deallocate`]: Allocator::deallocate
pub trait Allocator {
    /// Allocate `size` bytes aligned to `alignment`.
    ///
    /// `alignment` must be a power of two (only the baseline variant
    /// coerces invalid values). A zero `size` yields `None`. On exhaustion
    /// yields `None` with no partial state left behind.
    fn allocate(&mut self, size: usize, alignment: usize) -> Option<*mut u8>;

    /// Return a previously allocated block.
    ///
    /// Null pointers, pointers this allocator does not own, and (for the
    /// stack variant) out-of-order returns are no-ops.
    fn deallocate(&mut self, ptr: *mut u8);

    /// Return to the constructed state: all loans revoked, statistics and
    /// history cleared, the free structure re-initialized. Callers must
    /// not retain addresses across a reset.
    fn reset(&mut self);

    /// Whether `ptr` lies within this allocator's backing region (for the
    /// baseline: whether it is currently tracked).
    fn owns(&self, ptr: *const u8) -> bool;

    /// Human-readable variant name.
    fn name(&self) -> &str;

    /// Size of the backing region in bytes (the baseline reports an
    /// unbounded sentinel).
    fn total_size(&self) -> usize;

    /// Cumulative allocation statistics.
    fn stats(&self) -> &AllocationStats;

    /// Per-allocation history since construction or the last reset.
    fn allocation_history(&self) -> &[AllocationInfo];

    /// Bytes currently assignable.
    fn available(&self) -> usize {
        self.total_size()
            .saturating_sub(self.stats().current_bytes_used)
    }

    /// Fragmentation as a percentage of bytes in use; zero when nothing is
    /// in use. The pool and stack variants report zero by definition.
    fn fragmentation_percentage(&self) -> f64 {
        let stats = self.stats();
        if stats.current_bytes_used == 0 {
            return 0.0;
        }
        stats.fragmentation_bytes as f64 / stats.current_bytes_used as f64 * 100.0
    }

    /// Whether blocks must be returned in reverse allocation order. The
    /// benchmark driver reverses its deallocation pass when this is set.
    fn lifo_only(&self) -> bool {
        false
    }
}
