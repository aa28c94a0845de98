// Copyright (c) 2025 Dimitris Kafetzis
//
// Licensed under the MIT License.
// See LICENSE file in the project root for full license information.
//
// SPDX-License-Identifier: MIT

//! Borrowed, rank-reducing views into tensor storage.
//!
//! A view never allocates or releases memory. It borrows a contiguous block
//! from a [`Tensor`](crate::Tensor) (or from a parent view) for `'a`, so the
//! borrow checker refuses to let it outlive the owner.
//!
//! Indexing peels one axis at a time:
//!
//! ```text
//! TensorView<T, 3> ──slice(i)──► TensorView<T, 2> ──slice(j)──► TensorView<T, 1> ──at(k)──► &T
//! ```
//!
//! `slice`/`at` are bounds-checked and return `Result`. The `*_unchecked`
//! variants are `unsafe` and reserved for call sites that already proved the
//! index is in range.

use crate::{Element, Layout, Shape, Tensor, TensorError};
use ranked_alloc::{Allocator, SystemAllocator};
use std::fmt;
use std::marker::PhantomData;
use std::ops::{Index, IndexMut};
use std::ptr::NonNull;

/// A shared view of a rank-`R` block.
#[derive(Clone, Copy)]
pub struct TensorView<'a, T: Element, const R: usize> {
    ptr: NonNull<T>,
    layout: Layout<R>,
    _borrow: PhantomData<&'a [T]>,
}

/// An exclusive view of a rank-`R` block; writes land in the owner's buffer.
pub struct TensorViewMut<'a, T: Element, const R: usize> {
    ptr: NonNull<T>,
    layout: Layout<R>,
    _borrow: PhantomData<&'a mut [T]>,
}

// SAFETY: the views behave like `&'a [T]` and `&'a mut [T]`, and every
// `Element` is `Send + Sync`.
unsafe impl<T: Element, const R: usize> Send for TensorView<'_, T, R> {}
unsafe impl<T: Element, const R: usize> Sync for TensorView<'_, T, R> {}
unsafe impl<T: Element, const R: usize> Send for TensorViewMut<'_, T, R> {}
unsafe impl<T: Element, const R: usize> Sync for TensorViewMut<'_, T, R> {}

impl<'a, T: Element, const R: usize> TensorView<'a, T, R> {
    /// Wraps an existing slice, which must hold exactly `shape.len()` elements.
    ///
    /// ```
    /// use ranked_tensor::{Shape, TensorView};
    ///
    /// let data = [1, 2, 3, 4, 5, 6];
    /// let v = TensorView::from_slice(Shape::new([2, 3]).unwrap(), &data).unwrap();
    /// assert_eq!(*v.slice(1).unwrap().at(0).unwrap(), 4);
    /// ```
    pub fn from_slice(shape: Shape<R>, data: &'a [T]) -> Result<Self, TensorError> {
        let layout = Layout::new(shape);
        check_len(&layout, data.len())?;
        // SAFETY: slice pointers are never null and `data` outlives `'a`.
        Ok(unsafe { Self::new(NonNull::new_unchecked(data.as_ptr() as *mut T), layout) })
    }

    /// Views memory that the caller manages.
    ///
    /// # Safety
    /// `ptr` must be non-null, aligned, and valid for reads of `shape.len()`
    /// initialised elements for `'a`, with no concurrent writer.
    pub unsafe fn from_raw_parts(ptr: *const T, shape: Shape<R>) -> Self {
        Self::new(NonNull::new_unchecked(ptr as *mut T), Layout::new(shape))
    }

    /// # Safety
    /// `ptr` must be valid for reads of `layout.len()` elements for `'a`.
    pub(crate) unsafe fn new(ptr: NonNull<T>, layout: Layout<R>) -> Self {
        Self {
            ptr,
            layout,
            _borrow: PhantomData,
        }
    }

    pub fn shape(&self) -> &Shape<R> {
        self.layout.shape()
    }

    pub const fn rank(&self) -> usize {
        R
    }

    pub fn len(&self) -> usize {
        self.layout.len()
    }

    pub fn is_empty(&self) -> bool {
        self.layout.is_empty()
    }

    pub fn layout(&self) -> &Layout<R> {
        &self.layout
    }

    pub fn strides(&self) -> &[usize; R] {
        self.layout.strides()
    }

    pub fn dtype(&self) -> crate::DType {
        T::DTYPE
    }

    pub fn element_byte_size(&self) -> usize {
        std::mem::size_of::<T>()
    }

    pub fn as_ptr(&self) -> *const T {
        self.ptr.as_ptr()
    }

    /// The viewed elements in row-major order.
    pub fn as_slice(&self) -> &'a [T] {
        // SAFETY: views always cover a contiguous block of `len` elements.
        unsafe { std::slice::from_raw_parts(self.ptr.as_ptr(), self.layout.len()) }
    }

    pub fn iter(&self) -> std::slice::Iter<'a, T> {
        self.as_slice().iter()
    }

    /// Element at a full multi-index.
    pub fn get(&self, index: [usize; R]) -> Result<&'a T, TensorError> {
        let offset = self.layout.offset_of(index)?;
        // SAFETY: `offset_of` checked every axis.
        Ok(unsafe { &*self.ptr.as_ptr().add(offset) })
    }

    /// Element at a full multi-index, without bounds checks.
    ///
    /// # Safety
    /// Every `index[k]` must be below `shape().axis(k)`.
    pub unsafe fn get_unchecked(&self, index: [usize; R]) -> &'a T {
        &*self.ptr.as_ptr().add(self.layout.offset_of_unchecked(index))
    }

    /// Copies the viewed block into a new tensor on the system heap.
    pub fn to_tensor(&self) -> Result<Tensor<T, R>, TensorError> {
        self.to_tensor_in(SystemAllocator)
    }

    pub fn to_tensor_in<A: Allocator>(&self, alloc: A) -> Result<Tensor<T, R, A>, TensorError> {
        Tensor::from_elements_in(*self.shape(), self.as_slice(), alloc)
    }
}

impl<'a, T: Element, const R: usize> TensorViewMut<'a, T, R> {
    /// Wraps an existing mutable slice, which must hold exactly
    /// `shape.len()` elements.
    pub fn from_slice_mut(shape: Shape<R>, data: &'a mut [T]) -> Result<Self, TensorError> {
        let layout = Layout::new(shape);
        check_len(&layout, data.len())?;
        // SAFETY: slice pointers are never null and `data` is exclusively
        // borrowed for `'a`.
        Ok(unsafe { Self::new(NonNull::new_unchecked(data.as_mut_ptr()), layout) })
    }

    /// Mutably views memory that the caller manages.
    ///
    /// # Safety
    /// `ptr` must be non-null, aligned, valid for reads and writes of
    /// `shape.len()` initialised elements for `'a`, and not accessed through
    /// any other path while the view is alive.
    pub unsafe fn from_raw_parts(ptr: *mut T, shape: Shape<R>) -> Self {
        Self::new(NonNull::new_unchecked(ptr), Layout::new(shape))
    }

    /// # Safety
    /// `ptr` must be valid for exclusive access to `layout.len()` elements for `'a`.
    pub(crate) unsafe fn new(ptr: NonNull<T>, layout: Layout<R>) -> Self {
        Self {
            ptr,
            layout,
            _borrow: PhantomData,
        }
    }

    /// A shared view of the same block, borrowing `self`.
    pub fn as_view(&self) -> TensorView<'_, T, R> {
        // SAFETY: shared reborrow of an exclusive view.
        unsafe { TensorView::new(self.ptr, self.layout) }
    }

    /// A shorter-lived exclusive view of the same block.
    pub fn reborrow(&mut self) -> TensorViewMut<'_, T, R> {
        // SAFETY: `&mut self` is held for the reborrow's lifetime.
        unsafe { TensorViewMut::new(self.ptr, self.layout) }
    }

    /// Gives up exclusivity, keeping the original lifetime.
    pub fn into_view(self) -> TensorView<'a, T, R> {
        // SAFETY: `self` is consumed, so no writer remains.
        unsafe { TensorView::new(self.ptr, self.layout) }
    }

    pub fn shape(&self) -> &Shape<R> {
        self.layout.shape()
    }

    pub const fn rank(&self) -> usize {
        R
    }

    pub fn len(&self) -> usize {
        self.layout.len()
    }

    pub fn is_empty(&self) -> bool {
        self.layout.is_empty()
    }

    pub fn layout(&self) -> &Layout<R> {
        &self.layout
    }

    pub fn strides(&self) -> &[usize; R] {
        self.layout.strides()
    }

    pub fn dtype(&self) -> crate::DType {
        T::DTYPE
    }

    pub fn element_byte_size(&self) -> usize {
        std::mem::size_of::<T>()
    }

    pub fn as_ptr(&self) -> *const T {
        self.ptr.as_ptr()
    }

    pub fn as_mut_ptr(&mut self) -> *mut T {
        self.ptr.as_ptr()
    }

    pub fn as_slice(&self) -> &[T] {
        self.as_view().as_slice()
    }

    pub fn as_mut_slice(&mut self) -> &mut [T] {
        // SAFETY: contiguous block, exclusively borrowed through `&mut self`.
        unsafe { std::slice::from_raw_parts_mut(self.ptr.as_ptr(), self.layout.len()) }
    }

    pub fn into_mut_slice(self) -> &'a mut [T] {
        // SAFETY: consuming `self` hands its exclusive borrow to the slice.
        unsafe { std::slice::from_raw_parts_mut(self.ptr.as_ptr(), self.layout.len()) }
    }

    pub fn iter(&self) -> std::slice::Iter<'_, T> {
        self.as_slice().iter()
    }

    pub fn iter_mut(&mut self) -> std::slice::IterMut<'_, T> {
        self.as_mut_slice().iter_mut()
    }

    /// Overwrites every viewed element with `value`.
    pub fn fill(&mut self, value: T) {
        self.as_mut_slice().fill(value);
    }

    pub fn get(&self, index: [usize; R]) -> Result<&T, TensorError> {
        self.as_view().get(index)
    }

    pub fn get_mut(&mut self, index: [usize; R]) -> Result<&mut T, TensorError> {
        let offset = self.layout.offset_of(index)?;
        // SAFETY: `offset_of` checked every axis.
        Ok(unsafe { &mut *self.ptr.as_ptr().add(offset) })
    }

    /// # Safety
    /// Every `index[k]` must be below `shape().axis(k)`.
    pub unsafe fn get_mut_unchecked(&mut self, index: [usize; R]) -> &mut T {
        &mut *self.ptr.as_ptr().add(self.layout.offset_of_unchecked(index))
    }

    pub fn to_tensor(&self) -> Result<Tensor<T, R>, TensorError> {
        self.as_view().to_tensor()
    }
}

fn check_len<const R: usize>(layout: &Layout<R>, actual: usize) -> Result<(), TensorError> {
    if actual == layout.len() {
        Ok(())
    } else {
        Err(TensorError::BufferSizeMismatch {
            expected: layout.len(),
            actual,
        })
    }
}

macro_rules! impl_rank_reduction {
    ($($rank:literal => $lower:literal),* $(,)?) => {
        $(
            impl<'a, T: Element> TensorView<'a, T, $rank> {
                /// View of position `i` along axis 0, one rank lower.
                pub fn slice(&self, i: usize) -> Result<TensorView<'a, T, $lower>, TensorError> {
                    let offset = self.layout.slice_offset(i)?;
                    // SAFETY: `slice_offset` checked `i` against axis 0.
                    Ok(unsafe { self.sub_view(offset) })
                }

                /// # Safety
                /// `i` must be below `shape().axis(0)`.
                pub unsafe fn slice_unchecked(&self, i: usize) -> TensorView<'a, T, $lower> {
                    self.sub_view(self.layout.slice_offset_unchecked(i))
                }

                unsafe fn sub_view(&self, offset: usize) -> TensorView<'a, T, $lower> {
                    let lower = Layout::new(self.layout.shape().drop_first());
                    TensorView::new(NonNull::new_unchecked(self.ptr.as_ptr().add(offset)), lower)
                }
            }

            impl<'a, T: Element> TensorViewMut<'a, T, $rank> {
                /// Shared view of position `i` along axis 0.
                pub fn slice(&self, i: usize) -> Result<TensorView<'_, T, $lower>, TensorError> {
                    self.as_view().slice(i)
                }

                /// Exclusive view of position `i` along axis 0, borrowing `self`.
                pub fn slice_mut(&mut self, i: usize) -> Result<TensorViewMut<'_, T, $lower>, TensorError> {
                    self.reborrow().into_slice_mut(i)
                }

                /// Exclusive view of position `i` along axis 0, keeping `'a`.
                pub fn into_slice_mut(self, i: usize) -> Result<TensorViewMut<'a, T, $lower>, TensorError> {
                    let offset = self.layout.slice_offset(i)?;
                    // SAFETY: `slice_offset` checked `i`; `self` is consumed.
                    Ok(unsafe { self.into_sub_view(offset) })
                }

                /// # Safety
                /// `i` must be below `shape().axis(0)`.
                pub unsafe fn slice_mut_unchecked(&mut self, i: usize) -> TensorViewMut<'_, T, $lower> {
                    let offset = self.layout.slice_offset_unchecked(i);
                    self.reborrow().into_sub_view(offset)
                }

                unsafe fn into_sub_view(self, offset: usize) -> TensorViewMut<'a, T, $lower> {
                    let lower = Layout::new(self.layout.shape().drop_first());
                    TensorViewMut::new(NonNull::new_unchecked(self.ptr.as_ptr().add(offset)), lower)
                }
            }
        )*
    };
}

impl_rank_reduction!(2 => 1, 3 => 2, 4 => 3, 5 => 4, 6 => 5, 7 => 6, 8 => 7);

impl<'a, T: Element> TensorView<'a, T, 1> {
    /// Element `i`; the terminal step of rank reduction.
    pub fn at(&self, i: usize) -> Result<&'a T, TensorError> {
        let offset = self.layout.slice_offset(i)?;
        // SAFETY: checked against the only axis.
        Ok(unsafe { &*self.ptr.as_ptr().add(offset) })
    }

    /// # Safety
    /// `i` must be below `len()`.
    pub unsafe fn at_unchecked(&self, i: usize) -> &'a T {
        &*self.ptr.as_ptr().add(i)
    }
}

impl<'a, T: Element> TensorViewMut<'a, T, 1> {
    pub fn at(&self, i: usize) -> Result<&T, TensorError> {
        self.as_view().at(i)
    }

    /// Mutable element `i`; writes are visible to the owner.
    pub fn at_mut(&mut self, i: usize) -> Result<&mut T, TensorError> {
        self.reborrow().into_at_mut(i)
    }

    /// Mutable element `i`, keeping `'a`.
    pub fn into_at_mut(self, i: usize) -> Result<&'a mut T, TensorError> {
        let offset = self.layout.slice_offset(i)?;
        // SAFETY: checked; `self` is consumed.
        Ok(unsafe { &mut *self.ptr.as_ptr().add(offset) })
    }

    /// # Safety
    /// `i` must be below `len()`.
    pub unsafe fn at_mut_unchecked(&mut self, i: usize) -> &mut T {
        &mut *self.ptr.as_ptr().add(i)
    }
}

impl<T: Element> Index<usize> for TensorView<'_, T, 1> {
    type Output = T;

    fn index(&self, i: usize) -> &T {
        self.at(i).unwrap_or_else(|e| panic!("{e}"))
    }
}

impl<T: Element> Index<usize> for TensorViewMut<'_, T, 1> {
    type Output = T;

    fn index(&self, i: usize) -> &T {
        self.at(i).unwrap_or_else(|e| panic!("{e}"))
    }
}

impl<T: Element> IndexMut<usize> for TensorViewMut<'_, T, 1> {
    fn index_mut(&mut self, i: usize) -> &mut T {
        self.at_mut(i).unwrap_or_else(|e| panic!("{e}"))
    }
}

impl<T: Element, const R: usize> Index<[usize; R]> for TensorView<'_, T, R> {
    type Output = T;

    fn index(&self, index: [usize; R]) -> &T {
        self.get(index).unwrap_or_else(|e| panic!("{e}"))
    }
}

impl<T: Element, const R: usize> Index<[usize; R]> for TensorViewMut<'_, T, R> {
    type Output = T;

    fn index(&self, index: [usize; R]) -> &T {
        self.get(index).unwrap_or_else(|e| panic!("{e}"))
    }
}

impl<T: Element, const R: usize> IndexMut<[usize; R]> for TensorViewMut<'_, T, R> {
    fn index_mut(&mut self, index: [usize; R]) -> &mut T {
        self.get_mut(index).unwrap_or_else(|e| panic!("{e}"))
    }
}

impl<'a, T: Element, const R: usize> IntoIterator for TensorView<'a, T, R> {
    type Item = &'a T;
    type IntoIter = std::slice::Iter<'a, T>;

    fn into_iter(self) -> Self::IntoIter {
        self.as_slice().iter()
    }
}

impl<T: Element, const R: usize> fmt::Debug for TensorView<'_, T, R> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("TensorView")
            .field("shape", self.shape())
            .field("dtype", &T::DTYPE)
            .field("data", &self.as_slice())
            .finish()
    }
}

impl<T: Element, const R: usize> fmt::Debug for TensorViewMut<'_, T, R> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("TensorViewMut")
            .field("shape", self.shape())
            .field("dtype", &T::DTYPE)
            .field("data", &self.as_slice())
            .finish()
    }
}
