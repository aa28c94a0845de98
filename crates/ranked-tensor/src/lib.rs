// Copyright (c) 2025 Dimitris Kafetzis
//
// Licensed under the MIT License.
// See LICENSE file in the project root for full license information.
//
// SPDX-License-Identifier: MIT

//! # ranked-tensor
//!
//! Dense tensors whose rank is fixed at compile time and whose axis lengths
//! are chosen at runtime.
//!
//! # Key Components
//!
//! - [`Shape`] — `R` positive axis lengths; immutable once built.
//! - [`Layout`] — row-major strides and offset arithmetic for a shape.
//! - [`Tensor`] — an owned buffer plus its layout, generic over an
//!   [`Allocator`](ranked_alloc::Allocator) (the global heap by default).
//! - [`TensorView`] / [`TensorViewMut`] — borrowed sub-blocks. `slice(i)`
//!   drops axis 0 and yields a view one rank lower; rank 1 ends in `at(i)`.
//! - [`Element`] / [`DType`] — the scalar types a tensor can hold.
//!
//! # Indexing
//!
//! ```text
//! Tensor<T, 3> ─slice(i)─► TensorView<T, 2> ─slice(j)─► TensorView<T, 1> ─at(k)─► &T
//!              └──────────────────── get([i, j, k]) ───────────────────────────┘
//! ```
//!
//! Checked access returns [`TensorError::IndexOutOfBounds`]; the unchecked
//! forms are `unsafe`.
//!
//! # Example
//! ```
//! use ranked_tensor::{shape, Tensor2i};
//!
//! let mut a = Tensor2i::empty(shape![4, 3].unwrap());
//! for i in 0..4 {
//!     let mut row = a.slice_mut(i).unwrap();
//!     for j in 0..3 {
//!         row[j] = (i * 3 + j + 1) as i32;
//!     }
//! }
//! a.slice_mut(0).unwrap()[2] = 17;
//! assert_eq!(a[[0, 2]], 17);
//! assert_eq!(a[[1, 2]], 6);
//! ```

mod buffer;
mod dtype;
mod error;
mod layout;
mod shape;
mod tensor;
mod view;

pub use dtype::{DType, Element};
pub use error::TensorError;
pub use layout::Layout;
pub use shape::{Shape, Shape1D, Shape2D, Shape3D, Shape4D, Shape5D};
pub use tensor::{
    Tensor, Tensor1d, Tensor1f, Tensor1i, Tensor2d, Tensor2f, Tensor2i, Tensor3d, Tensor3f,
    Tensor3i, Tensor4d, Tensor4f, Tensor4i, Tensor5d, Tensor5f, Tensor5i,
};
pub use view::{TensorView, TensorViewMut};

pub use ranked_alloc::{Allocator, MemoryBudget, MemoryError, MemoryPool, SystemAllocator};
