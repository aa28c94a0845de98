// Copyright (c) 2025 Dimitris Kafetzis
//
// Licensed under the MIT License.
// See LICENSE file in the project root for full license information.
//
// SPDX-License-Identifier: MIT

//! Row-major strides and element offsets for a fixed-rank shape.

use crate::{Shape, TensorError};

/// Shape, element count and stride table of a contiguous rank-`R` block.
///
/// Offsets are in elements, not bytes. The stride table is derived once, in
/// [`Layout::new`], from a shape that can no longer change, so it never goes
/// stale.
///
/// ```
/// use ranked_tensor::{Layout, Shape};
///
/// let layout = Layout::new(Shape::new([2, 3, 4]).unwrap());
/// assert_eq!(layout.strides(), &[12, 4, 1]);
/// assert_eq!(layout.offset_of([1, 2, 3]).unwrap(), 23);
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Layout<const R: usize> {
    shape: Shape<R>,
    len: usize,
    strides: [usize; R],
}

impl<const R: usize> Layout<R> {
    /// Lays out `shape` contiguously.
    ///
    /// Starting from the element count, each axis divides the running count
    /// by its length; what remains is that axis' stride. The last axis ends
    /// up with stride 1.
    pub fn new(shape: Shape<R>) -> Self {
        let len = shape.len();
        let mut strides = [0usize; R];
        let mut running = len;
        for (stride, axis_len) in strides.iter_mut().zip(shape.iter()) {
            running /= axis_len;
            *stride = running;
        }
        Self {
            shape,
            len,
            strides,
        }
    }

    pub fn shape(&self) -> &Shape<R> {
        &self.shape
    }

    /// Number of elements covered.
    pub fn len(&self) -> usize {
        self.len
    }

    pub fn is_empty(&self) -> bool {
        self.len == 0
    }

    pub fn strides(&self) -> &[usize; R] {
        &self.strides
    }

    /// Stride of axis `i`.
    ///
    /// # Panics
    /// Panics if `i >= R`.
    pub fn stride(&self, i: usize) -> usize {
        self.strides[i]
    }

    /// Offset of position `i` along axis 0.
    pub fn slice_offset(&self, i: usize) -> Result<usize, TensorError> {
        check_axis(0, i, self.shape.axis(0))?;
        Ok(self.slice_offset_unchecked(i))
    }

    /// Offset of position `i` along axis 0, without a bounds check.
    ///
    /// The result is only meaningful when `i < shape.axis(0)`.
    #[inline]
    pub fn slice_offset_unchecked(&self, i: usize) -> usize {
        i * self.strides[0]
    }

    /// Offset of a full multi-index.
    pub fn offset_of(&self, index: [usize; R]) -> Result<usize, TensorError> {
        for (axis, (&i, len)) in index.iter().zip(self.shape.iter()).enumerate() {
            check_axis(axis, i, len)?;
        }
        Ok(self.offset_of_unchecked(index))
    }

    /// Offset of a full multi-index, without bounds checks.
    #[inline]
    pub fn offset_of_unchecked(&self, index: [usize; R]) -> usize {
        index
            .iter()
            .zip(self.strides.iter())
            .map(|(i, stride)| i * stride)
            .sum()
    }
}

#[inline]
fn check_axis(axis: usize, index: usize, len: usize) -> Result<(), TensorError> {
    if index < len {
        Ok(())
    } else {
        Err(TensorError::IndexOutOfBounds { axis, index, len })
    }
}
