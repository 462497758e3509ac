//! LIFO bump allocator with marker rollback.

use crate::allocators::raw::BackingRegion;
use crate::allocators::{AllocationInfo, AllocationStats, AllocationTracker, Allocator};
use crate::util::memory::{align_forward, WORD};
use crate::util::timer::Timer;

/// Offset snapshot of the stack top, usable to bulk-free everything
/// allocated after it was taken.
pub type Marker = usize;

/// Header word count: {size, adjustment, previous_offset}.
const HEADER_WORDS: usize = 3;
/// Header size in bytes.
const HEADER_SIZE: usize = HEADER_WORDS * WORD;

/// LIFO allocator over one contiguous region.
///
/// Each allocation places a three-word header immediately below an
/// aligned payload and bumps the top offset. Deallocation only succeeds
/// for the top allocation; anything else is silently ignored.
///
/// Rollback does not re-derive the previous-offset chain: rollback and
/// per-address deallocate do not compose. Use one or the other within a
/// scope.
#[derive(Debug)]
pub struct StackAllocator {
    region: BackingRegion,
    total_size: usize,
    alignment: usize,
    /// Top of the stack.
    current_offset: usize,
    /// Offset the top allocation started from (pre-adjustment).
    previous_offset: usize,
    tracker: AllocationTracker,
}

impl StackAllocator {
    /// Build a stack over `size` bytes, region-aligned to `alignment`
    /// (a power of two, also used as the region alignment floor).
    #[must_use]
    pub fn new(size: usize, alignment: usize) -> Self {
        Self {
            region: BackingRegion::acquire(size, alignment),
            total_size: size,
            alignment,
            current_offset: 0,
            previous_offset: 0,
            tracker: AllocationTracker::new(),
        }
    }

    /// Snapshot the current top.
    #[must_use]
    pub fn marker(&self) -> Marker {
        self.current_offset
    }

    /// Roll the top back to `marker`, bulk-freeing every allocation made
    /// after the snapshot. Markers above the current top are ignored.
    ///
    /// The previous-offset chain is not re-walked; per-address deallocate
    /// is unreliable after a rollback.
    pub fn rollback_to(&mut self, marker: Marker) {
        if marker > self.current_offset {
            return;
        }
        let freed = self.current_offset - marker;
        self.current_offset = marker;
        self.previous_offset = 0;
        if freed > 0 {
            self.tracker.force_current_bytes_used(marker);
        }
    }

    /// Bytes consumed, headers and padding included.
    #[must_use]
    pub fn used(&self) -> usize {
        self.current_offset
    }

    /// Consumed fraction of the region, 0–100.
    #[must_use]
    pub fn usage_percentage(&self) -> f64 {
        if self.total_size == 0 {
            return 0.0;
        }
        self.current_offset as f64 / self.total_size as f64 * 100.0
    }
}

impl Allocator for StackAllocator {
    fn allocate(&mut self, size: usize, alignment: usize) -> Option<*mut u8> {
        if !self.region.is_acquired() || size == 0 {
            return None;
        }

        let mut timer = Timer::new();
        timer.start();

        let payload_offset = align_forward(self.current_offset + HEADER_SIZE, alignment);
        if payload_offset.checked_add(size)? > self.total_size {
            return None;
        }
        let header_offset = payload_offset - HEADER_SIZE;
        let adjustment = header_offset - self.current_offset;

        let header = self.region.base() + header_offset;
        self.region.write_word(header, size);
        self.region.write_word(header + WORD, adjustment);
        self.region.write_word(header + 2 * WORD, self.previous_offset);

        self.previous_offset = self.current_offset;
        self.current_offset = payload_offset + size;

        timer.stop();

        let addr = self.region.base() + payload_offset;
        self.tracker
            .record_allocation(addr, size, alignment, timer.elapsed_ns());
        Some(addr as *mut u8)
    }

    fn deallocate(&mut self, ptr: *mut u8) {
        if ptr.is_null() || !self.owns(ptr.cast_const()) {
            return;
        }
        let offset = ptr as usize - self.region.base();
        if offset < HEADER_SIZE {
            return;
        }
        let header = self.region.base() + offset - HEADER_SIZE;
        let size = self.region.read_word(header);

        // LIFO contract: only the top allocation can be returned.
        if offset.checked_add(size) != Some(self.current_offset) {
            return;
        }

        let mut timer = Timer::new();
        timer.start();
        self.current_offset = self.previous_offset;
        // The header's stored previous_offset is authoritative for the
        // chain.
        self.previous_offset = self.region.read_word(header + 2 * WORD);
        timer.stop();

        self.tracker
            .record_deallocation(ptr as usize, size, timer.elapsed_ns());
    }

    fn reset(&mut self) {
        self.current_offset = 0;
        self.previous_offset = 0;
        self.tracker.reset();
    }

    fn owns(&self, ptr: *const u8) -> bool {
        self.region.contains(ptr as usize)
    }

    fn name(&self) -> &str {
        "Stack Allocator"
    }

    fn total_size(&self) -> usize {
        self.total_size
    }

    fn stats(&self) -> &AllocationStats {
        self.tracker.stats()
    }

    fn allocation_history(&self) -> &[AllocationInfo] {
        self.tracker.history()
    }

    fn available(&self) -> usize {
        self.total_size - self.current_offset
    }

    fn fragmentation_percentage(&self) -> f64 {
        // Only internal alignment waste exists; it is not attributed as
        // fragmentation.
        0.0
    }

    fn lifo_only(&self) -> bool {
        true
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn payloads_are_aligned() {
        let mut stack = StackAllocator::new(4096, 16);
        for &alignment in &[1usize, 2, 4, 8, 16] {
            let ptr = stack.allocate(33, alignment).expect("allocation");
            assert_eq!(ptr as usize % alignment, 0, "alignment {alignment}");
        }
    }

    #[test]
    fn lifo_pairing_returns_to_empty() {
        let mut stack = StackAllocator::new(1024, 16);
        let p1 = stack.allocate(100, 8).expect("first");
        let p2 = stack.allocate(200, 8).expect("second");

        stack.deallocate(p2);
        stack.deallocate(p1);

        assert_eq!(stack.used(), 0);
        assert_eq!(stack.marker(), 0);
        assert_eq!(stack.stats().current_allocations, 0);
        assert_eq!(stack.available(), 1024);
    }

    #[test]
    fn out_of_order_deallocate_is_ignored() {
        let mut stack = StackAllocator::new(1024, 16);
        let p1 = stack.allocate(100, 8).expect("first");
        let p2 = stack.allocate(200, 8).expect("second");

        stack.deallocate(p1);
        assert_eq!(stack.stats().total_deallocations, 0, "not the top");

        stack.deallocate(p2);
        stack.deallocate(p1);
        assert_eq!(stack.used(), 0);
        assert_eq!(stack.stats().current_allocations, 0);
    }

    #[test]
    fn exhaustion_returns_null_without_side_effects() {
        let mut stack = StackAllocator::new(256, 16);
        let before_used = {
            stack.allocate(128, 16).expect("fits");
            stack.used()
        };
        assert!(stack.allocate(512, 16).is_none());
        assert_eq!(stack.used(), before_used);
        assert_eq!(stack.stats().total_allocations, 1);
    }

    #[test]
    fn zero_size_is_rejected() {
        let mut stack = StackAllocator::new(256, 16);
        assert!(stack.allocate(0, 16).is_none());
    }

    #[test]
    fn marker_rollback_bulk_frees() {
        let mut stack = StackAllocator::new(4096, 16);
        stack.allocate(100, 16).expect("kept");
        let mark = stack.marker();

        stack.allocate(200, 16).expect("scratch");
        stack.allocate(300, 16).expect("scratch");
        assert!(stack.used() > mark);

        stack.rollback_to(mark);
        assert_eq!(stack.used(), mark);
        assert_eq!(stack.stats().current_bytes_used, mark);

        // Space above the marker is reusable.
        assert!(stack.allocate(500, 16).is_some());
    }

    #[test]
    fn rollback_above_top_is_ignored() {
        let mut stack = StackAllocator::new(1024, 16);
        stack.allocate(64, 16).expect("allocation");
        let top = stack.marker();
        stack.rollback_to(top + 100);
        assert_eq!(stack.marker(), top);
    }

    #[test]
    fn foreign_pointer_deallocate_is_noop() {
        let mut stack = StackAllocator::new(1024, 16);
        stack.allocate(64, 16).expect("allocation");
        stack.deallocate(std::ptr::null_mut());
        stack.deallocate(0xDEAD_BEEF_usize as *mut u8);
        assert_eq!(stack.stats().total_deallocations, 0);
    }

    #[test]
    fn reset_restores_post_construction_state() {
        let mut stack = StackAllocator::new(1024, 16);
        stack.allocate(100, 16).expect("allocation");
        stack.reset();
        assert_eq!(stack.available(), 1024);
        assert_eq!(*stack.stats(), AllocationStats::default());
        stack.reset();
        assert_eq!(stack.available(), 1024, "reset is idempotent");
    }

    #[test]
    fn usage_percentage_tracks_offset() {
        let mut stack = StackAllocator::new(1024, 16);
        assert_eq!(stack.usage_percentage(), 0.0);
        stack.allocate(488, 8).expect("allocation");
        assert_eq!(stack.usage_percentage(), stack.used() as f64 / 1024.0 * 100.0);
    }

    #[test]
    fn failed_region_fails_every_allocate() {
        let mut stack = StackAllocator::new(0, 16);
        assert!(stack.allocate(8, 8).is_none());
        assert!(!stack.owns(0x1000 as *const u8));
    }
}
