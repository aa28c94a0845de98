// Copyright (c) 2025 Dimitris Kafetzis
//
// Licensed under the MIT License.
// See LICENSE file in the project root for full license information.
//
// SPDX-License-Identifier: MIT

//! The owning tensor type.

use crate::buffer::RawBuffer;
use crate::{DType, Element, Layout, Shape, TensorError, TensorView, TensorViewMut};
use ranked_alloc::{Allocator, SystemAllocator};
use std::fmt;
use std::ops::{Index, IndexMut};

/// An owned, rank-`R` tensor stored contiguously in row-major order.
///
/// The rank is a type parameter; the axis lengths are chosen at runtime and
/// fixed for the tensor's life. Storage comes from `A`, which defaults to the
/// global heap. A tensor is the sole owner of its buffer: moving it moves
/// ownership, and [`Clone`] makes a deep copy.
///
/// # Memory Layout
/// Element `[i0, .., iR-1]` lives at `Σ ik * stride(k)`, where the strides
/// come from [`Layout`]. Indexing peels axis 0 off into a
/// [`TensorView`]/[`TensorViewMut`] one rank lower, down to a terminal
/// [`at`](Tensor::at) on rank 1.
///
/// # Examples
/// ```
/// use ranked_tensor::{Shape, Tensor};
///
/// let mut a = Tensor::<i32, 2>::zeros(Shape::new([4, 3]).unwrap());
/// *a.slice_mut(2).unwrap().at_mut(1).unwrap() = 8;
/// assert_eq!(a[[2, 1]], 8);
/// assert_eq!(a.slice(2).unwrap().as_slice(), &[0, 8, 0]);
/// ```
pub struct Tensor<T: Element, const R: usize, A: Allocator = SystemAllocator> {
    buf: RawBuffer<T, A>,
    layout: Layout<R>,
}

impl<T: Element, const R: usize> Tensor<T, R, SystemAllocator> {
    /// Creates a tensor with every element set to `value`.
    ///
    /// # Panics
    /// Panics if the global allocator cannot provide the buffer.
    pub fn new(shape: Shape<R>, value: T) -> Self {
        on_system_heap(Self::new_in(shape, value, SystemAllocator))
    }

    /// Creates a tensor without choosing its contents.
    ///
    /// The elements hold the all-zero bit pattern, but callers should treat
    /// them as unspecified and overwrite them before reading.
    ///
    /// # Panics
    /// Panics if the global allocator cannot provide the buffer.
    pub fn empty(shape: Shape<R>) -> Self {
        on_system_heap(Self::empty_in(shape, SystemAllocator))
    }

    /// # Panics
    /// Panics if the global allocator cannot provide the buffer.
    pub fn zeros(shape: Shape<R>) -> Self {
        on_system_heap(Self::zeros_in(shape, SystemAllocator))
    }

    /// # Panics
    /// Panics if the global allocator cannot provide the buffer.
    pub fn ones(shape: Shape<R>) -> Self {
        on_system_heap(Self::ones_in(shape, SystemAllocator))
    }

    /// Same as [`Tensor::new`].
    ///
    /// # Panics
    /// Panics if the global allocator cannot provide the buffer.
    pub fn full(shape: Shape<R>, value: T) -> Self {
        Self::new(shape, value)
    }

    /// Zeros with the shape of `other`, whose element type and allocator
    /// may differ. `other`'s contents are ignored.
    ///
    /// ```
    /// use ranked_tensor::{Shape, Tensor};
    ///
    /// let a = Tensor::<f64, 2>::ones(Shape::new([2, 5]).unwrap());
    /// let b = Tensor::<u8, 2>::zeros_like(&a);
    /// assert_eq!(b.shape(), a.shape());
    /// ```
    pub fn zeros_like<U: Element, B: Allocator>(other: &Tensor<U, R, B>) -> Self {
        Self::zeros(*other.shape())
    }

    pub fn ones_like<U: Element, B: Allocator>(other: &Tensor<U, R, B>) -> Self {
        Self::ones(*other.shape())
    }

    pub fn empty_like<U: Element, B: Allocator>(other: &Tensor<U, R, B>) -> Self {
        Self::empty(*other.shape())
    }

    pub fn full_like<U: Element, B: Allocator>(other: &Tensor<U, R, B>, value: T) -> Self {
        Self::full(*other.shape(), value)
    }

    /// Copies `data`, which must hold exactly `shape.len()` elements in
    /// row-major order.
    pub fn from_elements(shape: Shape<R>, data: &[T]) -> Result<Self, TensorError> {
        Self::from_elements_in(shape, data, SystemAllocator)
    }
}

impl<T: Element, const R: usize, A: Allocator> Tensor<T, R, A> {
    /// Allocates from `alloc` and sets every element to `value`.
    pub fn new_in(shape: Shape<R>, value: T, alloc: A) -> Result<Self, TensorError> {
        let layout = Layout::new(shape);
        let buf = RawBuffer::filled(layout.len(), value, alloc)?;
        Ok(Self::from_buffer(buf, layout))
    }

    /// Allocates from `alloc`; see [`Tensor::empty`] for what the contents
    /// hold.
    pub fn empty_in(shape: Shape<R>, alloc: A) -> Result<Self, TensorError> {
        let layout = Layout::new(shape);
        let buf = RawBuffer::zeroed(layout.len(), alloc)?;
        Ok(Self::from_buffer(buf, layout))
    }

    pub fn zeros_in(shape: Shape<R>, alloc: A) -> Result<Self, TensorError> {
        Self::new_in(shape, T::ZERO, alloc)
    }

    pub fn ones_in(shape: Shape<R>, alloc: A) -> Result<Self, TensorError> {
        Self::new_in(shape, T::ONE, alloc)
    }

    pub fn full_in(shape: Shape<R>, value: T, alloc: A) -> Result<Self, TensorError> {
        Self::new_in(shape, value, alloc)
    }

    /// Copies `data` into a buffer from `alloc`.
    ///
    /// Fails with [`TensorError::BufferSizeMismatch`] before allocating if
    /// `data.len() != shape.len()`.
    pub fn from_elements_in(shape: Shape<R>, data: &[T], alloc: A) -> Result<Self, TensorError> {
        let layout = Layout::new(shape);
        if data.len() != layout.len() {
            return Err(TensorError::BufferSizeMismatch {
                expected: layout.len(),
                actual: data.len(),
            });
        }
        let buf = RawBuffer::copied(data, alloc)?;
        Ok(Self::from_buffer(buf, layout))
    }

    fn from_buffer(buf: RawBuffer<T, A>, layout: Layout<R>) -> Self {
        debug_assert_eq!(buf.len(), layout.len());
        Self { buf, layout }
    }

    pub fn shape(&self) -> &Shape<R> {
        self.layout.shape()
    }

    pub const fn rank(&self) -> usize {
        R
    }

    /// Number of elements.
    pub fn len(&self) -> usize {
        self.layout.len()
    }

    /// Always `false`; kept for parity with slices.
    pub fn is_empty(&self) -> bool {
        self.layout.is_empty()
    }

    pub fn layout(&self) -> &Layout<R> {
        &self.layout
    }

    pub fn strides(&self) -> &[usize; R] {
        self.layout.strides()
    }

    pub fn dtype(&self) -> DType {
        T::DTYPE
    }

    pub fn element_byte_size(&self) -> usize {
        std::mem::size_of::<T>()
    }

    /// Bytes occupied by the elements.
    pub fn size_bytes(&self) -> usize {
        self.len() * self.element_byte_size()
    }

    pub fn allocator(&self) -> &A {
        self.buf.allocator()
    }

    pub fn as_ptr(&self) -> *const T {
        self.buf.as_ptr()
    }

    pub fn as_mut_ptr(&mut self) -> *mut T {
        self.buf.as_mut_ptr()
    }

    pub fn as_slice(&self) -> &[T] {
        self.buf.as_slice()
    }

    pub fn as_mut_slice(&mut self) -> &mut [T] {
        self.buf.as_mut_slice()
    }

    pub fn iter(&self) -> std::slice::Iter<'_, T> {
        self.as_slice().iter()
    }

    pub fn iter_mut(&mut self) -> std::slice::IterMut<'_, T> {
        self.as_mut_slice().iter_mut()
    }

    pub fn fill(&mut self, value: T) {
        self.as_mut_slice().fill(value);
    }

    /// Shared view of the whole tensor.
    pub fn view(&self) -> TensorView<'_, T, R> {
        // SAFETY: the buffer holds `layout.len()` elements for as long as
        // `self` is borrowed.
        unsafe { TensorView::new(self.buf.as_non_null(), self.layout) }
    }

    /// Exclusive view of the whole tensor.
    pub fn view_mut(&mut self) -> TensorViewMut<'_, T, R> {
        // SAFETY: as for `view`, and `&mut self` makes the borrow exclusive.
        unsafe { TensorViewMut::new(self.buf.as_non_null(), self.layout) }
    }

    /// Element at a full multi-index.
    pub fn get(&self, index: [usize; R]) -> Result<&T, TensorError> {
        let offset = self.layout.offset_of(index)?;
        Ok(&self.as_slice()[offset])
    }

    pub fn get_mut(&mut self, index: [usize; R]) -> Result<&mut T, TensorError> {
        let offset = self.layout.offset_of(index)?;
        Ok(&mut self.as_mut_slice()[offset])
    }

    /// # Safety
    /// Every `index[k]` must be below `shape().axis(k)`.
    pub unsafe fn get_unchecked(&self, index: [usize; R]) -> &T {
        self.as_slice()
            .get_unchecked(self.layout.offset_of_unchecked(index))
    }

    /// # Safety
    /// Every `index[k]` must be below `shape().axis(k)`.
    pub unsafe fn get_unchecked_mut(&mut self, index: [usize; R]) -> &mut T {
        let offset = self.layout.offset_of_unchecked(index);
        self.as_mut_slice().get_unchecked_mut(offset)
    }
}

fn on_system_heap<T>(result: Result<T, TensorError>) -> T {
    match result {
        Ok(tensor) => tensor,
        Err(err) => panic!("tensor allocation failed: {err}"),
    }
}

macro_rules! impl_tensor_slicing {
    ($($rank:literal => $lower:literal),* $(,)?) => {
        $(
            impl<T: Element, A: Allocator> Tensor<T, $rank, A> {
                /// Shared view of position `i` along axis 0, one rank lower.
                pub fn slice(&self, i: usize) -> Result<TensorView<'_, T, $lower>, TensorError> {
                    self.view().slice(i)
                }

                /// Exclusive view of position `i` along axis 0; writes land
                /// in this tensor.
                pub fn slice_mut(&mut self, i: usize) -> Result<TensorViewMut<'_, T, $lower>, TensorError> {
                    self.view_mut().into_slice_mut(i)
                }

                /// # Safety
                /// `i` must be below `shape().axis(0)`.
                pub unsafe fn slice_unchecked(&self, i: usize) -> TensorView<'_, T, $lower> {
                    self.view().slice_unchecked(i)
                }

                /// # Safety
                /// `i` must be below `shape().axis(0)`.
                pub unsafe fn slice_mut_unchecked(&mut self, i: usize) -> TensorViewMut<'_, T, $lower> {
                    let offset = self.layout.slice_offset_unchecked(i);
                    let lower = Layout::new(self.layout.shape().drop_first());
                    let ptr = std::ptr::NonNull::new_unchecked(self.buf.as_mut_ptr().add(offset));
                    TensorViewMut::new(ptr, lower)
                }
            }
        )*
    };
}

impl_tensor_slicing!(2 => 1, 3 => 2, 4 => 3, 5 => 4, 6 => 5, 7 => 6, 8 => 7);

impl<T: Element, A: Allocator> Tensor<T, 1, A> {
    /// Element `i` of a vector.
    pub fn at(&self, i: usize) -> Result<&T, TensorError> {
        let offset = self.layout.slice_offset(i)?;
        Ok(&self.as_slice()[offset])
    }

    pub fn at_mut(&mut self, i: usize) -> Result<&mut T, TensorError> {
        let offset = self.layout.slice_offset(i)?;
        Ok(&mut self.as_mut_slice()[offset])
    }

    /// # Safety
    /// `i` must be below `len()`.
    pub unsafe fn at_unchecked(&self, i: usize) -> &T {
        self.as_slice().get_unchecked(i)
    }

    /// # Safety
    /// `i` must be below `len()`.
    pub unsafe fn at_mut_unchecked(&mut self, i: usize) -> &mut T {
        self.as_mut_slice().get_unchecked_mut(i)
    }
}

impl<T: Element, A: Allocator> Index<usize> for Tensor<T, 1, A> {
    type Output = T;

    fn index(&self, i: usize) -> &T {
        self.at(i).unwrap_or_else(|e| panic!("{e}"))
    }
}

impl<T: Element, A: Allocator> IndexMut<usize> for Tensor<T, 1, A> {
    fn index_mut(&mut self, i: usize) -> &mut T {
        self.at_mut(i).unwrap_or_else(|e| panic!("{e}"))
    }
}

impl<T: Element, const R: usize, A: Allocator> Index<[usize; R]> for Tensor<T, R, A> {
    type Output = T;

    fn index(&self, index: [usize; R]) -> &T {
        self.get(index).unwrap_or_else(|e| panic!("{e}"))
    }
}

impl<T: Element, const R: usize, A: Allocator> IndexMut<[usize; R]> for Tensor<T, R, A> {
    fn index_mut(&mut self, index: [usize; R]) -> &mut T {
        self.get_mut(index).unwrap_or_else(|e| panic!("{e}"))
    }
}

impl<T: Element, const R: usize, A: Allocator + Clone> Clone for Tensor<T, R, A> {
    /// Deep copy into a fresh buffer from a clone of the allocator.
    ///
    /// # Panics
    /// Panics if the allocator cannot provide the copy.
    fn clone(&self) -> Self {
        let alloc = self.allocator().clone();
        match RawBuffer::copied(self.as_slice(), alloc) {
            Ok(buf) => Self::from_buffer(buf, self.layout),
            Err(err) => panic!("tensor clone failed: {err}"),
        }
    }
}

impl<T: Element, const R: usize, A: Allocator, B: Allocator> PartialEq<Tensor<T, R, B>>
    for Tensor<T, R, A>
{
    fn eq(&self, other: &Tensor<T, R, B>) -> bool {
        self.shape() == other.shape() && self.as_slice() == other.as_slice()
    }
}

impl<'a, T: Element, const R: usize, A: Allocator> IntoIterator for &'a Tensor<T, R, A> {
    type Item = &'a T;
    type IntoIter = std::slice::Iter<'a, T>;

    fn into_iter(self) -> Self::IntoIter {
        self.iter()
    }
}

impl<'a, T: Element, const R: usize, A: Allocator> IntoIterator for &'a mut Tensor<T, R, A> {
    type Item = &'a mut T;
    type IntoIter = std::slice::IterMut<'a, T>;

    fn into_iter(self) -> Self::IntoIter {
        self.iter_mut()
    }
}

impl<T: Element, const R: usize, A: Allocator> fmt::Debug for Tensor<T, R, A> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Tensor")
            .field("shape", self.shape())
            .field("dtype", &T::DTYPE)
            .field("data", &self.as_slice())
            .finish()
    }
}

pub type Tensor1d = Tensor<f64, 1>;
pub type Tensor2d = Tensor<f64, 2>;
pub type Tensor3d = Tensor<f64, 3>;
pub type Tensor4d = Tensor<f64, 4>;
pub type Tensor5d = Tensor<f64, 5>;

pub type Tensor1f = Tensor<f32, 1>;
pub type Tensor2f = Tensor<f32, 2>;
pub type Tensor3f = Tensor<f32, 3>;
pub type Tensor4f = Tensor<f32, 4>;
pub type Tensor5f = Tensor<f32, 5>;

pub type Tensor1i = Tensor<i32, 1>;
pub type Tensor2i = Tensor<i32, 2>;
pub type Tensor3i = Tensor<i32, 3>;
pub type Tensor4i = Tensor<i32, 4>;
pub type Tensor5i = Tensor<i32, 5>;
