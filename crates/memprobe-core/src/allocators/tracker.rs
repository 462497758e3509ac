//! Shared statistics and history record-keeping.

use std::time::Instant;

use serde::{Deserialize, Serialize};

/// Cumulative counters for one allocator.
///
/// Invariants: `current_allocations = total_allocations -
/// total_deallocations`; `current_bytes_used <= peak_bytes_used`; every
/// counter except the `current_*` pair is monotonically non-decreasing.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct AllocationStats {
    pub total_allocations: u64,
    pub total_deallocations: u64,
    pub current_allocations: u64,
    pub total_bytes_allocated: usize,
    pub current_bytes_used: usize,
    pub peak_bytes_used: usize,
    pub fragmentation_bytes: usize,
    pub avg_allocation_time_ns: f64,
    pub avg_dealloc_time_ns: f64,
}

/// One allocation-history entry.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct AllocationInfo {
    /// Address handed to the caller.
    pub address: usize,
    /// Size accounted for the allocation.
    pub size: usize,
    /// Alignment the caller requested.
    pub alignment: usize,
    /// Nanoseconds since allocator construction (monotonic).
    pub timestamp_ns: u64,
    /// Cleared when the allocation is returned.
    pub active: bool,
}

/// Record-keeping helper embedded in every variant.
///
/// History is unbounded within a run and cleared by [`reset`].
///
/// [`reset`]: AllocationTracker::reset
#[derive(Debug)]
pub struct AllocationTracker {
    stats: AllocationStats,
    history: Vec<AllocationInfo>,
    epoch: Instant,
}

impl AllocationTracker {
    #[must_use]
    pub fn new() -> Self {
        Self {
            stats: AllocationStats::default(),
            history: Vec::new(),
            epoch: Instant::now(),
        }
    }

    /// Fold a successful allocation into the counters and append a history
    /// entry. The rolling mean is the running arithmetic mean.
    pub fn record_allocation(&mut self, address: usize, size: usize, alignment: usize, time_ns: f64) {
        self.stats.total_allocations += 1;
        self.stats.current_allocations += 1;
        self.stats.total_bytes_allocated += size;
        self.stats.current_bytes_used += size;
        if self.stats.current_bytes_used > self.stats.peak_bytes_used {
            self.stats.peak_bytes_used = self.stats.current_bytes_used;
        }

        let n = self.stats.total_allocations as f64;
        self.stats.avg_allocation_time_ns =
            (self.stats.avg_allocation_time_ns * (n - 1.0) + time_ns) / n;

        self.history.push(AllocationInfo {
            address,
            size,
            alignment,
            timestamp_ns: self.epoch.elapsed().as_nanos() as u64,
            active: true,
        });
    }

    /// Fold a deallocation into the counters and clear the active flag of
    /// the most recent live history entry for `address`.
    pub fn record_deallocation(&mut self, address: usize, size: usize, time_ns: f64) {
        self.stats.total_deallocations += 1;
        self.stats.current_allocations = self.stats.current_allocations.saturating_sub(1);
        self.stats.current_bytes_used = self.stats.current_bytes_used.saturating_sub(size);

        let n = self.stats.total_deallocations as f64;
        self.stats.avg_dealloc_time_ns =
            (self.stats.avg_dealloc_time_ns * (n - 1.0) + time_ns) / n;

        if let Some(entry) = self
            .history
            .iter_mut()
            .rev()
            .find(|entry| entry.active && entry.address == address)
        {
            entry.active = false;
        }
    }

    /// Overwrite the fragmentation estimate.
    pub fn set_fragmentation_bytes(&mut self, bytes: usize) {
        self.stats.fragmentation_bytes = bytes;
    }

    /// Force the used-bytes counter (stack rollback). Raises the peak if
    /// needed so `current <= peak` keeps holding.
    pub fn force_current_bytes_used(&mut self, bytes: usize) {
        self.stats.current_bytes_used = bytes;
        if self.stats.peak_bytes_used < bytes {
            self.stats.peak_bytes_used = bytes;
        }
    }

    /// Clear all counters and history.
    pub fn reset(&mut self) {
        self.stats = AllocationStats::default();
        self.history.clear();
    }

    #[must_use]
    pub fn stats(&self) -> &AllocationStats {
        &self.stats
    }

    #[must_use]
    pub fn history(&self) -> &[AllocationInfo] {
        &self.history
    }
}

impl Default for AllocationTracker {
    fn default() -> Self {
        Self::new()
    }
}
