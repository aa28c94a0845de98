// Copyright (c) 2025 Dimitris Kafetzis
//
// Licensed under the MIT License.
// See LICENSE file in the project root for full license information.
//
// SPDX-License-Identifier: MIT

//! Error types for element buffer allocation.

/// Errors reported by an [`Allocator`](crate::Allocator) or while configuring one.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum MemoryError {
    /// The request would push the pool past its budget.
    #[error("out of memory: requested {requested_bytes} bytes, but only {available_bytes} available (budget: {budget_bytes})")]
    OutOfMemory {
        requested_bytes: usize,
        available_bytes: usize,
        budget_bytes: usize,
    },

    /// Element buffers always hold at least one element of non-zero size.
    #[error("cannot allocate zero-sized buffer")]
    ZeroSizedAllocation,

    /// `count * size_of::<T>()` overflowed or exceeded `isize::MAX`.
    #[error("buffer of {count} elements of {elem_size} bytes does not fit in the address space")]
    InvalidLayout { count: usize, elem_size: usize },

    /// The underlying heap returned a null pointer.
    #[error("allocation of {size} bytes (align {align}) failed")]
    AllocationFailed { size: usize, align: usize },

    /// A budget string could not be parsed.
    #[error("invalid memory budget '{0}': expected a positive number with an optional K, M or G suffix")]
    InvalidBudget(String),
}
