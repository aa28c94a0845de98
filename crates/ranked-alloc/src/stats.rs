// Copyright (c) 2025 Dimitris Kafetzis
//
// Licensed under the MIT License.
// See LICENSE file in the project root for full license information.
//
// SPDX-License-Identifier: MIT

//! Counters kept by [`MemoryPool`](crate::MemoryPool).

/// Cumulative pool counters.
///
/// The balance between [`successful_allocations`](Self::successful_allocations)
/// and `total_deallocations` is what the tensor tests use to prove each
/// buffer is released exactly once.
#[derive(Debug, Clone, Default, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
pub struct AllocationStats {
    /// Every request, including refused ones.
    pub total_allocations: u64,
    /// Requests served from the free list.
    pub cache_hits: u64,
    /// Requests that went to the heap.
    pub cache_misses: u64,
    /// Requests refused because of the budget.
    pub oom_count: u64,
    /// High-water mark of live requested bytes.
    pub peak_allocated_bytes: usize,
    pub cumulative_allocated_bytes: u64,
    pub total_deallocations: u64,
}

impl AllocationStats {
    /// Fraction of successful requests served from the free list.
    pub fn cache_hit_ratio(&self) -> f64 {
        let served = self.successful_allocations();
        if served == 0 {
            0.0
        } else {
            self.cache_hits as f64 / served as f64
        }
    }

    pub fn successful_allocations(&self) -> u64 {
        self.cache_hits + self.cache_misses
    }

    /// Blocks handed out and not yet returned.
    pub fn outstanding_blocks(&self) -> u64 {
        self.successful_allocations()
            .saturating_sub(self.total_deallocations)
    }

    pub(crate) fn record_cache_hit(&mut self, bytes: usize) {
        self.total_allocations += 1;
        self.cache_hits += 1;
        self.cumulative_allocated_bytes += bytes as u64;
    }

    pub(crate) fn record_cache_miss(&mut self, bytes: usize) {
        self.total_allocations += 1;
        self.cache_misses += 1;
        self.cumulative_allocated_bytes += bytes as u64;
    }

    pub(crate) fn record_oom(&mut self) {
        self.total_allocations += 1;
        self.oom_count += 1;
    }

    pub(crate) fn record_deallocation(&mut self) {
        self.total_deallocations += 1;
    }

    pub(crate) fn update_peak(&mut self, live_bytes: usize) {
        self.peak_allocated_bytes = self.peak_allocated_bytes.max(live_bytes);
    }

    /// One-line report suitable for logs.
    pub fn summary(&self) -> String {
        format!(
            "{} requests: {} hits / {} misses ({:.0}% reuse), {} refused; \
             {} released, {} outstanding; peak {} B",
            self.total_allocations,
            self.cache_hits,
            self.cache_misses,
            self.cache_hit_ratio() * 100.0,
            self.oom_count,
            self.total_deallocations,
            self.outstanding_blocks(),
            self.peak_allocated_bytes,
        )
    }
}
