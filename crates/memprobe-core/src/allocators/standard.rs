//! Baseline variant backed by the system allocator.

use std::collections::HashMap;

use crate::allocators::raw::{system_alloc, system_dealloc};
use crate::allocators::{AllocationInfo, AllocationStats, AllocationTracker, Allocator};
use crate::util::memory::{is_power_of_two, MAX_ALIGN};
use crate::util::timer::Timer;

/// Comparison baseline: every allocation goes straight to the system
/// allocator, with an auxiliary map from address to (size, alignment) so
/// deallocation can rebuild the layout and ownership can be answered.
///
/// The per-address tracking cost is non-trivial; it is accepted because
/// the point of this variant is comparative measurement.
#[derive(Debug, Default)]
pub struct StandardAllocator {
    live: HashMap<usize, (usize, usize)>,
    tracker: AllocationTracker,
}

impl StandardAllocator {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }
}

impl Allocator for StandardAllocator {
    fn allocate(&mut self, size: usize, alignment: usize) -> Option<*mut u8> {
        if size == 0 {
            return None;
        }
        let alignment = if is_power_of_two(alignment) {
            alignment
        } else {
            MAX_ALIGN
        };

        let mut timer = Timer::new();
        timer.start();
        let addr = system_alloc(size, alignment)?;
        timer.stop();

        self.live.insert(addr, (size, alignment));
        self.tracker
            .record_allocation(addr, size, alignment, timer.elapsed_ns());
        Some(addr as *mut u8)
    }

    fn deallocate(&mut self, ptr: *mut u8) {
        if ptr.is_null() {
            return;
        }
        let addr = ptr as usize;
        let Some((size, alignment)) = self.live.remove(&addr) else {
            return;
        };

        let mut timer = Timer::new();
        timer.start();
        system_dealloc(addr, size, alignment);
        timer.stop();

        self.tracker
            .record_deallocation(addr, size, timer.elapsed_ns());
    }

    fn reset(&mut self) {
        for (addr, (size, alignment)) in self.live.drain() {
            system_dealloc(addr, size, alignment);
        }
        self.tracker.reset();
    }

    fn owns(&self, ptr: *const u8) -> bool {
        self.live.contains_key(&(ptr as usize))
    }

    fn name(&self) -> &str {
        "Standard (system)"
    }

    fn total_size(&self) -> usize {
        usize::MAX
    }

    fn stats(&self) -> &AllocationStats {
        self.tracker.stats()
    }

    fn allocation_history(&self) -> &[AllocationInfo] {
        self.tracker.history()
    }

    fn available(&self) -> usize {
        usize::MAX
    }
}

impl Drop for StandardAllocator {
    fn drop(&mut self) {
        for (addr, (size, alignment)) in self.live.drain() {
            system_dealloc(addr, size, alignment);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn allocate_tracks_and_owns() {
        let mut alloc = StandardAllocator::new();
        let ptr = alloc.allocate(256, 16).expect("allocation");
        assert_eq!(ptr as usize % 16, 0);
        assert!(alloc.owns(ptr));
        assert_eq!(alloc.stats().current_allocations, 1);
        assert_eq!(alloc.stats().current_bytes_used, 256);

        alloc.deallocate(ptr);
        assert!(!alloc.owns(ptr));
        assert_eq!(alloc.stats().current_allocations, 0);
        assert_eq!(alloc.stats().current_bytes_used, 0);
    }

    #[test]
    fn zero_size_is_rejected() {
        let mut alloc = StandardAllocator::new();
        assert!(alloc.allocate(0, 16).is_none());
        assert_eq!(alloc.stats().total_allocations, 0);
    }

    #[test]
    fn non_power_of_two_alignment_is_coerced() {
        let mut alloc = StandardAllocator::new();
        let ptr = alloc.allocate(64, 3).expect("allocation");
        assert_eq!(ptr as usize % MAX_ALIGN, 0);
        let entry = alloc.allocation_history()[0];
        assert_eq!(entry.alignment, MAX_ALIGN);
        alloc.deallocate(ptr);
    }

    #[test]
    fn foreign_and_null_deallocate_are_noops() {
        let mut alloc = StandardAllocator::new();
        alloc.deallocate(std::ptr::null_mut());
        alloc.deallocate(0xDEAD_BEEF_usize as *mut u8);
        assert_eq!(alloc.stats().total_deallocations, 0);
    }

    #[test]
    fn double_free_is_ignored_after_first() {
        let mut alloc = StandardAllocator::new();
        let ptr = alloc.allocate(64, 16).expect("allocation");
        alloc.deallocate(ptr);
        alloc.deallocate(ptr);
        assert_eq!(alloc.stats().total_deallocations, 1);
    }

    #[test]
    fn reset_releases_outstanding_loans() {
        let mut alloc = StandardAllocator::new();
        let ptrs: Vec<_> = (0..8).filter_map(|_| alloc.allocate(128, 16)).collect();
        assert_eq!(ptrs.len(), 8);
        alloc.reset();
        assert_eq!(*alloc.stats(), AllocationStats::default());
        assert!(alloc.allocation_history().is_empty());
        assert!(ptrs.iter().all(|&p| !alloc.owns(p)));
    }

    #[test]
    fn available_is_unbounded_sentinel() {
        let alloc = StandardAllocator::new();
        assert_eq!(alloc.available(), usize::MAX);
        assert_eq!(alloc.total_size(), usize::MAX);
        assert_eq!(alloc.fragmentation_percentage(), 0.0);
    }
}
