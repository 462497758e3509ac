//! Fixed-size block pool with an intrusive free list.

use crate::allocators::raw::BackingRegion;
use crate::allocators::{AllocationInfo, AllocationStats, AllocationTracker, Allocator};
use crate::util::memory::{align_forward, WORD};
use crate::util::timer::Timer;

/// Fixed-size block allocator.
///
/// One contiguous region is divided into `block_count` blocks of
/// `block_size` bytes. Free blocks are threaded into an intrusive list:
/// the first word of each free block stores the address of the next free
/// block (zero terminates). Allocation pops the head, deallocation pushes
/// it back; both are O(1) and there is no external fragmentation.
///
/// Deallocation does not validate block alignment or re-free; a
/// double-free creates a cycle in the free list and is a program error.
#[derive(Debug)]
pub struct PoolAllocator {
    region: BackingRegion,
    block_size: usize,
    block_count: usize,
    alignment: usize,
    /// Head of the intrusive free list; zero when exhausted.
    free_head: usize,
    allocated_blocks: usize,
    tracker: AllocationTracker,
}

impl PoolAllocator {
    /// Build a pool of `block_count` blocks of `block_size` bytes each.
    ///
    /// The effective block size is `block_size` aligned up to `alignment`
    /// and at least one word, so the intrusive next-pointer always fits.
    /// `alignment` must be a power of two.
    #[must_use]
    pub fn new(block_size: usize, block_count: usize, alignment: usize) -> Self {
        let block_size = align_forward(block_size, alignment).max(WORD);
        let total_size = block_size * block_count;
        let region = BackingRegion::acquire(total_size, alignment);

        let mut pool = Self {
            region,
            block_size,
            block_count,
            alignment,
            free_head: 0,
            allocated_blocks: 0,
            tracker: AllocationTracker::new(),
        };
        pool.initialize_free_list();
        pool
    }

    /// Number of blocks currently free.
    #[must_use]
    pub fn free_blocks(&self) -> usize {
        self.block_count - self.allocated_blocks
    }

    /// Number of blocks currently loaned out.
    #[must_use]
    pub fn allocated_blocks(&self) -> usize {
        self.allocated_blocks
    }

    /// Effective size of each block.
    #[must_use]
    pub fn block_size(&self) -> usize {
        self.block_size
    }

    /// Total number of blocks.
    #[must_use]
    pub fn block_count(&self) -> usize {
        self.block_count
    }

    /// Live-allocation bitmap: position `i` is true iff block `i` is
    /// loaned out. Derived by starting all-true and clearing along the
    /// free list.
    #[must_use]
    pub fn allocation_grid(&self) -> Vec<bool> {
        let mut grid = vec![true; self.block_count];
        let mut current = self.free_head;
        while current != 0 {
            let index = (current - self.region.base()) / self.block_size;
            if index < self.block_count {
                grid[index] = false;
            }
            current = self.region.read_word(current);
        }
        grid
    }

    /// Thread every block into the free list, head at block 0.
    fn initialize_free_list(&mut self) {
        self.free_head = 0;
        if !self.region.is_acquired() {
            return;
        }
        for i in (0..self.block_count).rev() {
            let block = self.region.base() + i * self.block_size;
            self.region.write_word(block, self.free_head);
            self.free_head = block;
        }
    }
}

impl Allocator for PoolAllocator {
    fn allocate(&mut self, size: usize, _alignment: usize) -> Option<*mut u8> {
        if size == 0 || size > self.block_size || self.free_head == 0 {
            return None;
        }

        let mut timer = Timer::new();
        timer.start();
        let block = self.free_head;
        self.free_head = self.region.read_word(block);
        self.allocated_blocks += 1;
        timer.stop();

        self.tracker
            .record_allocation(block, self.block_size, self.alignment, timer.elapsed_ns());
        Some(block as *mut u8)
    }

    fn deallocate(&mut self, ptr: *mut u8) {
        if ptr.is_null() || !self.owns(ptr) {
            return;
        }
        let block = ptr as usize;

        let mut timer = Timer::new();
        timer.start();
        self.region.write_word(block, self.free_head);
        self.free_head = block;
        self.allocated_blocks = self.allocated_blocks.saturating_sub(1);
        timer.stop();

        self.tracker
            .record_deallocation(block, self.block_size, timer.elapsed_ns());
    }

    fn reset(&mut self) {
        self.initialize_free_list();
        self.allocated_blocks = 0;
        self.tracker.reset();
    }

    fn owns(&self, ptr: *const u8) -> bool {
        self.region.contains(ptr as usize)
    }

    fn name(&self) -> &str {
        "Pool Allocator"
    }

    fn total_size(&self) -> usize {
        self.block_size * self.block_count
    }

    fn stats(&self) -> &AllocationStats {
        self.tracker.stats()
    }

    fn allocation_history(&self) -> &[AllocationInfo] {
        self.tracker.history()
    }

    fn available(&self) -> usize {
        self.free_blocks() * self.block_size
    }

    fn fragmentation_percentage(&self) -> f64 {
        0.0
    }
}
