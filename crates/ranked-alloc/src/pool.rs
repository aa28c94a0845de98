// Copyright (c) 2025 Dimitris Kafetzis
//
// Licensed under the MIT License.
// See LICENSE file in the project root for full license information.
//
// SPDX-License-Identifier: MIT

//! Budget-enforcing, caching allocator for tensor buffers.
//!
//! [`MemoryPool`] implements [`Allocator`] on top of the system heap. It:
//!
//! 1. Refuses requests that would push live bytes past the budget
//!    (`Err(OutOfMemory)`).
//! 2. Keeps released blocks on a free list binned by size class and
//!    alignment, so tensors of similar size reuse memory.
//! 3. Tracks [`AllocationStats`].
//!
//! # Thread Safety
//! A pool handle is cheap to clone; clones share one `Arc<PoolInner>`, and
//! all interior state sits behind atomics or a `Mutex`.
//!
//! # Size Classes
//! Blocks are rounded up to the next power of two, never below
//! [`MIN_SIZE_CLASS`]. Budget accounting uses the requested size, not the
//! rounded one.

use crate::{AllocationStats, Allocator, MemoryBudget, MemoryError, SystemAllocator};
use std::alloc::Layout;
use std::collections::HashMap;
use std::ptr::NonNull;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};

/// Smallest block the pool asks the heap for.
pub const MIN_SIZE_CLASS: usize = 64;

/// Free-list key: rounded size and alignment.
type BinKey = (usize, usize);

/// A cached block owned by the free list.
struct FreeBlock(NonNull<u8>);

// SAFETY: a free block is plain heap memory owned solely by the free list.
unsafe impl Send for FreeBlock {}

struct PoolInner {
    budget: MemoryBudget,
    /// Requested bytes currently handed out.
    allocated_bytes: AtomicUsize,
    free_blocks: Mutex<HashMap<BinKey, Vec<FreeBlock>>>,
    /// Rounded bytes parked on the free list.
    free_list_bytes: AtomicUsize,
    stats: Mutex<AllocationStats>,
}

impl PoolInner {
    fn release_all(&self) -> usize {
        let mut released = 0;
        if let Ok(mut free) = self.free_blocks.lock() {
            for ((size, align), blocks) in free.drain() {
                // SAFETY: bins are keyed by the class layout the block was
                // obtained from the heap with.
                let layout = unsafe { Layout::from_size_align_unchecked(size, align) };
                for block in blocks {
                    unsafe { SystemAllocator.deallocate(block.0, layout) };
                    released += size;
                }
            }
        }
        self.free_list_bytes.fetch_sub(released, Ordering::AcqRel);
        released
    }
}

impl Drop for PoolInner {
    fn drop(&mut self) {
        self.release_all();
    }
}

/// Shared handle to a budgeted block pool.
///
/// # Example
/// ```
/// use ranked_alloc::{array_layout, Allocator, MemoryBudget, MemoryPool};
///
/// let pool = MemoryPool::new(MemoryBudget::from_kb(4));
/// let layout = array_layout::<f32>(256).unwrap();
///
/// let block = pool.allocate(layout).unwrap();
/// assert_eq!(pool.allocated_bytes(), 1024);
///
/// unsafe { pool.deallocate(block, layout) };
/// assert_eq!(pool.allocated_bytes(), 0);
/// ```
#[derive(Clone)]
pub struct MemoryPool {
    inner: Arc<PoolInner>,
}

impl MemoryPool {
    pub fn new(budget: MemoryBudget) -> Self {
        Self {
            inner: Arc::new(PoolInner {
                budget,
                allocated_bytes: AtomicUsize::new(0),
                free_blocks: Mutex::new(HashMap::new()),
                free_list_bytes: AtomicUsize::new(0),
                stats: Mutex::new(AllocationStats::default()),
            }),
        }
    }

    /// Live (handed out, not yet released) bytes.
    pub fn allocated_bytes(&self) -> usize {
        self.inner.allocated_bytes.load(Ordering::Acquire)
    }

    /// Bytes that can still be requested before hitting the budget.
    pub fn available_bytes(&self) -> usize {
        self.inner
            .budget
            .as_bytes()
            .saturating_sub(self.allocated_bytes())
    }

    pub fn budget(&self) -> MemoryBudget {
        self.inner.budget
    }

    /// Snapshot of the pool's counters.
    pub fn stats(&self) -> AllocationStats {
        self.inner
            .stats
            .lock()
            .map(|s| s.clone())
            .unwrap_or_default()
    }

    /// Bytes parked on the free list.
    pub fn free_list_bytes(&self) -> usize {
        self.inner.free_list_bytes.load(Ordering::Acquire)
    }

    /// Returns every cached block to the heap. Live blocks are untouched.
    pub fn shrink(&self) {
        let released = self.inner.release_all();
        tracing::debug!(released_bytes = released, "memory pool shrunk");
    }

    fn reserve(&self, size: usize) -> Result<(), MemoryError> {
        let budget = self.inner.budget;
        let mut current = self.inner.allocated_bytes.load(Ordering::Acquire);
        loop {
            if !budget.admits(current, size) {
                if let Ok(mut stats) = self.inner.stats.lock() {
                    stats.record_oom();
                }
                tracing::warn!(
                    requested = size,
                    allocated = current,
                    budget = budget.as_bytes(),
                    "memory pool budget exhausted"
                );
                return Err(MemoryError::OutOfMemory {
                    requested_bytes: size,
                    available_bytes: budget.as_bytes().saturating_sub(current),
                    budget_bytes: budget.as_bytes(),
                });
            }
            match self.inner.allocated_bytes.compare_exchange_weak(
                current,
                current + size,
                Ordering::AcqRel,
                Ordering::Acquire,
            ) {
                Ok(_) => return Ok(()),
                Err(actual) => current = actual,
            }
        }
    }

    fn take_cached(&self, key: BinKey) -> Option<NonNull<u8>> {
        let mut free = self.inner.free_blocks.lock().ok()?;
        let block = free.get_mut(&key)?.pop()?;
        self.inner.free_list_bytes.fetch_sub(key.0, Ordering::AcqRel);
        Some(block.0)
    }
}

unsafe impl Allocator for MemoryPool {
    fn allocate(&self, layout: Layout) -> Result<NonNull<u8>, MemoryError> {
        let size = layout.size();
        if size == 0 {
            return Err(MemoryError::ZeroSizedAllocation);
        }
        let class = size_class_for(size);
        let key = (class, layout.align());
        let class_layout = Layout::from_size_align(class, layout.align()).map_err(|_| {
            MemoryError::AllocationFailed {
                size: class,
                align: layout.align(),
            }
        })?;

        self.reserve(size)?;

        let (ptr, hit) = match self.take_cached(key) {
            Some(ptr) => (ptr, true),
            None => match SystemAllocator.allocate(class_layout) {
                Ok(ptr) => (ptr, false),
                Err(e) => {
                    self.inner.allocated_bytes.fetch_sub(size, Ordering::AcqRel);
                    return Err(e);
                }
            },
        };

        if let Ok(mut stats) = self.inner.stats.lock() {
            if hit {
                stats.record_cache_hit(size);
            } else {
                stats.record_cache_miss(size);
            }
            stats.update_peak(self.allocated_bytes());
        }
        tracing::debug!(size, class, hit, "pool block handed out");
        Ok(ptr)
    }

    unsafe fn deallocate(&self, ptr: NonNull<u8>, layout: Layout) {
        let size = layout.size();
        let class = size_class_for(size);
        self.inner.allocated_bytes.fetch_sub(size, Ordering::AcqRel);

        if let Ok(mut stats) = self.inner.stats.lock() {
            stats.record_deallocation();
        }

        match self.inner.free_blocks.lock() {
            Ok(mut free) => {
                free.entry((class, layout.align()))
                    .or_default()
                    .push(FreeBlock(ptr));
                self.inner.free_list_bytes.fetch_add(class, Ordering::AcqRel);
            }
            Err(_) => {
                let class_layout = Layout::from_size_align_unchecked(class, layout.align());
                SystemAllocator.deallocate(ptr, class_layout);
            }
        }
    }
}

/// Rounds `size` up to the next power of two, but not below [`MIN_SIZE_CLASS`].
fn size_class_for(size: usize) -> usize {
    size.max(MIN_SIZE_CLASS).next_power_of_two()
}

impl std::fmt::Debug for MemoryPool {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("MemoryPool")
            .field("budget", &self.inner.budget)
            .field("allocated_bytes", &self.allocated_bytes())
            .field("free_list_bytes", &self.free_list_bytes())
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::array_layout;

    #[test]
    fn test_allocate_and_release() {
        let pool = MemoryPool::new(MemoryBudget::from_kb(64));
        let layout = array_layout::<f64>(100).unwrap();

        let p = pool.allocate(layout).unwrap();
        assert_eq!(pool.allocated_bytes(), 800);
        assert_eq!(pool.available_bytes(), 64 * 1024 - 800);

        unsafe { pool.deallocate(p, layout) };
        assert_eq!(pool.allocated_bytes(), 0);
        assert_eq!(pool.free_list_bytes(), 1024);
    }

    #[test]
    fn test_budget_exhaustion() {
        let pool = MemoryPool::new(MemoryBudget::from_bytes(256));
        let layout = array_layout::<u8>(200).unwrap();
        let p = pool.allocate(layout).unwrap();

        let second = pool.allocate(layout);
        assert!(matches!(
            second,
            Err(MemoryError::OutOfMemory {
                requested_bytes: 200,
                available_bytes: 56,
                budget_bytes: 256,
            })
        ));
        assert_eq!(pool.stats().oom_count, 1);
        assert_eq!(pool.allocated_bytes(), 200);

        unsafe { pool.deallocate(p, layout) };
    }

    #[test]
    fn test_zero_sized_request() {
        let pool = MemoryPool::new(MemoryBudget::from_kb(1));
        let layout = Layout::from_size_align(0, 8).unwrap();
        assert_eq!(pool.allocate(layout), Err(MemoryError::ZeroSizedAllocation));
    }

    #[test]
    fn test_reuse_same_class() {
        let pool = MemoryPool::new(MemoryBudget::from_kb(64));
        let a = array_layout::<f32>(100).unwrap(); // 400 B -> 512 class
        let b = array_layout::<f32>(120).unwrap(); // 480 B -> 512 class

        let p = pool.allocate(a).unwrap();
        unsafe { pool.deallocate(p, a) };
        let q = pool.allocate(b).unwrap();
        assert_eq!(p, q);

        let stats = pool.stats();
        assert_eq!(stats.cache_misses, 1);
        assert_eq!(stats.cache_hits, 1);
        unsafe { pool.deallocate(q, b) };
    }

    #[test]
    fn test_alignment_separates_bins() {
        let pool = MemoryPool::new(MemoryBudget::from_kb(64));
        let bytes = array_layout::<u8>(128).unwrap();
        let words = array_layout::<u64>(16).unwrap();

        let p = pool.allocate(bytes).unwrap();
        unsafe { pool.deallocate(p, bytes) };
        let q = pool.allocate(words).unwrap();

        assert_eq!(q.as_ptr() as usize % 8, 0);
        assert_eq!(pool.stats().cache_hits, 0);
        unsafe { pool.deallocate(q, words) };
    }

    #[test]
    fn test_shrink_clears_free_list() {
        let pool = MemoryPool::new(MemoryBudget::from_kb(64));
        let layout = array_layout::<i32>(1000).unwrap();
        let p = pool.allocate(layout).unwrap();
        unsafe { pool.deallocate(p, layout) };
        assert!(pool.free_list_bytes() > 0);

        pool.shrink();
        assert_eq!(pool.free_list_bytes(), 0);
    }

    #[test]
    fn test_clones_share_state() {
        let pool = MemoryPool::new(MemoryBudget::from_kb(8));
        let other = pool.clone();
        let layout = array_layout::<u16>(512).unwrap();

        let p = other.allocate(layout).unwrap();
        assert_eq!(pool.allocated_bytes(), 1024);
        unsafe { pool.deallocate(p, layout) };
        assert_eq!(other.allocated_bytes(), 0);
    }

    #[test]
    fn test_peak_tracking() {
        let pool = MemoryPool::new(MemoryBudget::from_kb(64));
        let small = array_layout::<u8>(1000).unwrap();
        let large = array_layout::<u8>(3000).unwrap();

        let a = pool.allocate(small).unwrap();
        let b = pool.allocate(large).unwrap();
        unsafe {
            pool.deallocate(a, small);
            pool.deallocate(b, large);
        }

        let stats = pool.stats();
        assert_eq!(stats.peak_allocated_bytes, 4000);
        assert_eq!(stats.total_deallocations, 2);
    }

    #[test]
    fn test_size_class() {
        assert_eq!(size_class_for(1), MIN_SIZE_CLASS);
        assert_eq!(size_class_for(64), 64);
        assert_eq!(size_class_for(65), 128);
        assert_eq!(size_class_for(4096), 4096);
    }

    #[test]
    fn test_debug_format() {
        let pool = MemoryPool::new(MemoryBudget::from_mb(1));
        let debug = format!("{pool:?}");
        assert!(debug.contains("MemoryPool"));
        assert!(debug.contains("allocated_bytes"));
    }
}
