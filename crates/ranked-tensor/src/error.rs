// Copyright (c) 2025 Dimitris Kafetzis
//
// Licensed under the MIT License.
// See LICENSE file in the project root for full license information.
//
// SPDX-License-Identifier: MIT

//! Error types for shapes, indexing and tensor construction.

/// Errors that can occur while building or indexing tensors.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum TensorError {
    /// An axis length was zero, negative, or not representable as `usize`.
    #[error("axis {axis} must have a positive length, got {value}")]
    NonPositiveAxis { axis: usize, value: String },

    /// A runtime argument sequence had the wrong number of axis lengths.
    #[error("expected {expected} axis lengths, got {got} arguments")]
    ArgumentCount { expected: usize, got: usize },

    /// A list of axis lengths did not match the shape's rank.
    #[error("rank mismatch: shape has {expected} axes but the list has {got}")]
    RankMismatch { expected: usize, got: usize },

    /// The product of the axis lengths does not fit in `usize`.
    #[error("element count of shape {axes:?} overflows usize")]
    ElementCountOverflow { axes: Vec<usize> },

    /// An index fell outside an axis.
    #[error("index {index} is out of bounds for axis {axis} of length {len}")]
    IndexOutOfBounds { axis: usize, index: usize, len: usize },

    /// A borrowed or copied buffer does not hold exactly one shape's worth of elements.
    #[error("buffer size mismatch: shape needs {expected} elements, got {actual}")]
    BufferSizeMismatch { expected: usize, actual: usize },

    /// The allocator could not provide storage.
    #[error("allocation failed: {0}")]
    Memory(#[from] ranked_alloc::MemoryError),
}
