// Copyright (c) 2025 Dimitris Kafetzis
//
// Licensed under the MIT License.
// See LICENSE file in the project root for full license information.
//
// SPDX-License-Identifier: MIT

//! Single-owner element storage.
//!
//! [`RawBuffer`] is the only type in the crate that talks to an
//! [`Allocator`]. It records the allocation layout when the block is obtained
//! and hands the very same layout back on drop, so a buffer is always released
//! exactly once and with the size it was allocated with.

use crate::{Element, TensorError};
use ranked_alloc::{array_layout, Allocator};
use std::alloc::Layout;
use std::marker::PhantomData;
use std::ptr::NonNull;

pub(crate) struct RawBuffer<T: Element, A: Allocator> {
    ptr: NonNull<T>,
    len: usize,
    layout: Layout,
    alloc: A,
    _owns: PhantomData<T>,
}

// SAFETY: the buffer is uniquely owned; sending or sharing it is sending or
// sharing `T`s and the allocator handle.
unsafe impl<T: Element, A: Allocator + Send> Send for RawBuffer<T, A> {}
unsafe impl<T: Element, A: Allocator + Sync> Sync for RawBuffer<T, A> {}

impl<T: Element, A: Allocator> RawBuffer<T, A> {
    /// Allocates `len` elements and constructs each one as `value`.
    pub(crate) fn filled(len: usize, value: T, alloc: A) -> Result<Self, TensorError> {
        let layout = array_layout::<T>(len)?;
        let ptr = alloc.allocate(layout)?.cast::<T>();
        // SAFETY: the block holds `len` properly aligned `T`s.
        unsafe { alloc.construct_n(ptr, len, &value) };
        tracing::trace!(len, dtype = T::DTYPE.as_str(), "tensor buffer allocated and filled");
        Ok(Self::from_parts(ptr, len, layout, alloc))
    }

    /// Allocates `len` elements whose bytes are zero.
    ///
    /// Every [`Element`] accepts the all-zero bit pattern.
    pub(crate) fn zeroed(len: usize, alloc: A) -> Result<Self, TensorError> {
        let layout = array_layout::<T>(len)?;
        let ptr = alloc.allocate_zeroed(layout)?.cast::<T>();
        tracing::trace!(len, dtype = T::DTYPE.as_str(), "tensor buffer allocated");
        Ok(Self::from_parts(ptr, len, layout, alloc))
    }

    /// Allocates a copy of `src`.
    pub(crate) fn copied(src: &[T], alloc: A) -> Result<Self, TensorError> {
        let len = src.len();
        let layout = array_layout::<T>(len)?;
        let ptr = alloc.allocate(layout)?.cast::<T>();
        // SAFETY: fresh block of `len` elements cannot overlap `src`.
        unsafe { std::ptr::copy_nonoverlapping(src.as_ptr(), ptr.as_ptr(), len) };
        tracing::trace!(len, dtype = T::DTYPE.as_str(), "tensor buffer allocated from slice");
        Ok(Self::from_parts(ptr, len, layout, alloc))
    }

    fn from_parts(ptr: NonNull<T>, len: usize, layout: Layout, alloc: A) -> Self {
        Self {
            ptr,
            len,
            layout,
            alloc,
            _owns: PhantomData,
        }
    }

    pub(crate) fn len(&self) -> usize {
        self.len
    }

    pub(crate) fn as_non_null(&self) -> NonNull<T> {
        self.ptr
    }

    pub(crate) fn as_ptr(&self) -> *const T {
        self.ptr.as_ptr()
    }

    pub(crate) fn as_mut_ptr(&mut self) -> *mut T {
        self.ptr.as_ptr()
    }

    pub(crate) fn as_slice(&self) -> &[T] {
        // SAFETY: `len` initialised elements live at `ptr` until drop.
        unsafe { std::slice::from_raw_parts(self.ptr.as_ptr(), self.len) }
    }

    pub(crate) fn as_mut_slice(&mut self) -> &mut [T] {
        // SAFETY: as above, and `&mut self` guarantees exclusivity.
        unsafe { std::slice::from_raw_parts_mut(self.ptr.as_ptr(), self.len) }
    }

    pub(crate) fn allocator(&self) -> &A {
        &self.alloc
    }
}

impl<T: Element, A: Allocator> Drop for RawBuffer<T, A> {
    fn drop(&mut self) {
        // `T: Copy`, so there is nothing to drop in place.
        // SAFETY: `ptr` came from `self.alloc` with exactly `self.layout`.
        unsafe { self.alloc.deallocate(self.ptr.cast(), self.layout) };
        tracing::trace!(len = self.len, dtype = T::DTYPE.as_str(), "tensor buffer released");
    }
}
