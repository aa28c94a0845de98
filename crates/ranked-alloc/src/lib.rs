// Copyright (c) 2025 Dimitris Kafetzis
//
// Licensed under the MIT License.
// See LICENSE file in the project root for full license information.
//
// SPDX-License-Identifier: MIT

//! # ranked-alloc
//!
//! Allocation back-ends for `ranked-tensor` buffers.
//!
//! # Key Components
//!
//! - [`Allocator`] — the capability a tensor needs: allocate a block for `N`
//!   elements, release it, and construct `N` elements in place.
//! - [`SystemAllocator`] — the global heap; the default for tensors.
//! - [`MemoryPool`] — a budget-enforced allocator with a size-class free list.
//! - [`MemoryBudget`] — a hard ceiling with human-readable parsing
//!   (`"512M"`, `"1G"`, ...).
//! - [`AllocationStats`] — pool counters (reuse ratio, peak, refusals).
//!
//! # Ownership Model
//!
//! ```text
//! Tensor::zeros_in(shape, pool.clone())
//!       │
//!       ▼
//!   RawBuffer  ◄─── NonNull<T> + element count + allocator handle
//!       │
//!       │  drop()
//!       ▼
//!   Allocator::deallocate(ptr, same layout)  ──► pool free list
//! ```
//!
//! # Example
//! ```
//! use ranked_alloc::{array_layout, Allocator, MemoryBudget, MemoryPool};
//!
//! let pool = MemoryPool::new(MemoryBudget::parse("1M").unwrap());
//! let layout = array_layout::<f64>(1024).unwrap();
//!
//! let block = pool.allocate(layout).unwrap();
//! assert_eq!(pool.allocated_bytes(), 8 * 1024);
//! unsafe { pool.deallocate(block, layout) };
//! assert_eq!(pool.stats().outstanding_blocks(), 0);
//! ```

mod allocator;
mod budget;
mod error;
pub mod pool;
mod stats;

pub use allocator::{array_layout, Allocator, SystemAllocator};
pub use budget::MemoryBudget;
pub use error::MemoryError;
pub use pool::MemoryPool;
pub use stats::AllocationStats;
