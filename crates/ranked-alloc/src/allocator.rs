// Copyright (c) 2025 Dimitris Kafetzis
//
// Licensed under the MIT License.
// See LICENSE file in the project root for full license information.
//
// SPDX-License-Identifier: MIT

//! The allocation capability tensors are generic over.
//!
//! An [`Allocator`] can hand out a block for `N` elements, release a block of
//! `N` elements, and construct `N` elements in place. Tensors call it exactly
//! once to allocate and exactly once to release, always with the same
//! [`Layout`].

use crate::MemoryError;
use std::alloc::Layout;
use std::ptr::NonNull;

/// A source of raw element storage.
///
/// # Safety
///
/// Implementations must guarantee that:
/// - a successful `allocate(layout)` returns a block valid for reads and
///   writes of `layout.size()` bytes, aligned to `layout.align()`, and not
///   aliased by any other live block;
/// - the block stays valid until it is passed to `deallocate` with the same
///   layout.
pub unsafe trait Allocator {
    /// Allocates a block described by `layout`.
    fn allocate(&self, layout: Layout) -> Result<NonNull<u8>, MemoryError>;

    /// Allocates a block whose bytes are all zero.
    fn allocate_zeroed(&self, layout: Layout) -> Result<NonNull<u8>, MemoryError> {
        let ptr = self.allocate(layout)?;
        // SAFETY: `allocate` returned a block of at least `layout.size()` bytes.
        unsafe { ptr.as_ptr().write_bytes(0, layout.size()) };
        Ok(ptr)
    }

    /// Releases a block previously returned by this allocator.
    ///
    /// # Safety
    /// `ptr` must come from `allocate`/`allocate_zeroed` on this allocator
    /// (or a handle sharing its state) with the same `layout`, and must not
    /// be used afterwards.
    unsafe fn deallocate(&self, ptr: NonNull<u8>, layout: Layout);

    /// Writes `count` clones of `value` starting at `ptr`.
    ///
    /// # Safety
    /// `ptr` must be valid for writes of `count` consecutive `T`s. Existing
    /// contents are overwritten without being dropped.
    unsafe fn construct_n<T: Clone>(&self, ptr: NonNull<T>, count: usize, value: &T) {
        let head = ptr.as_ptr();
        for i in 0..count {
            head.add(i).write(value.clone());
        }
    }
}

/// Computes the layout of a buffer of `count` elements of `T`.
pub fn array_layout<T>(count: usize) -> Result<Layout, MemoryError> {
    let layout = Layout::array::<T>(count).map_err(|_| MemoryError::InvalidLayout {
        count,
        elem_size: std::mem::size_of::<T>(),
    })?;
    if layout.size() == 0 {
        return Err(MemoryError::ZeroSizedAllocation);
    }
    Ok(layout)
}

/// The process-wide heap.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct SystemAllocator;

unsafe impl Allocator for SystemAllocator {
    fn allocate(&self, layout: Layout) -> Result<NonNull<u8>, MemoryError> {
        if layout.size() == 0 {
            return Err(MemoryError::ZeroSizedAllocation);
        }
        // SAFETY: layout has non-zero size.
        let ptr = unsafe { std::alloc::alloc(layout) };
        NonNull::new(ptr).ok_or(MemoryError::AllocationFailed {
            size: layout.size(),
            align: layout.align(),
        })
    }

    fn allocate_zeroed(&self, layout: Layout) -> Result<NonNull<u8>, MemoryError> {
        if layout.size() == 0 {
            return Err(MemoryError::ZeroSizedAllocation);
        }
        // SAFETY: layout has non-zero size.
        let ptr = unsafe { std::alloc::alloc_zeroed(layout) };
        NonNull::new(ptr).ok_or(MemoryError::AllocationFailed {
            size: layout.size(),
            align: layout.align(),
        })
    }

    unsafe fn deallocate(&self, ptr: NonNull<u8>, layout: Layout) {
        std::alloc::dealloc(ptr.as_ptr(), layout);
    }
}

// Borrowing an allocator is as good as owning it; lets several tensors share
// one pool without cloning the handle.
unsafe impl<A: Allocator + ?Sized> Allocator for &A {
    fn allocate(&self, layout: Layout) -> Result<NonNull<u8>, MemoryError> {
        (**self).allocate(layout)
    }

    fn allocate_zeroed(&self, layout: Layout) -> Result<NonNull<u8>, MemoryError> {
        (**self).allocate_zeroed(layout)
    }

    unsafe fn deallocate(&self, ptr: NonNull<u8>, layout: Layout) {
        (**self).deallocate(ptr, layout)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_array_layout() {
        let layout = array_layout::<f32>(12).unwrap();
        assert_eq!(layout.size(), 48);
        assert_eq!(layout.align(), 4);
    }

    #[test]
    fn test_array_layout_rejects_empty_and_overflow() {
        assert_eq!(array_layout::<f64>(0), Err(MemoryError::ZeroSizedAllocation));
        assert!(matches!(
            array_layout::<u64>(usize::MAX),
            Err(MemoryError::InvalidLayout { elem_size: 8, .. })
        ));
    }

    #[test]
    fn test_system_allocate_construct_deallocate() {
        let alloc = SystemAllocator;
        let layout = array_layout::<i32>(5).unwrap();
        let raw = alloc.allocate(layout).unwrap();
        let typed = raw.cast::<i32>();
        unsafe {
            alloc.construct_n(typed, 5, &7);
            let values = std::slice::from_raw_parts(typed.as_ptr(), 5);
            assert_eq!(values, &[7, 7, 7, 7, 7]);
            alloc.deallocate(raw, layout);
        }
    }

    #[test]
    fn test_system_allocate_zeroed() {
        let alloc = SystemAllocator;
        let layout = array_layout::<u64>(8).unwrap();
        let raw = alloc.allocate_zeroed(layout).unwrap();
        unsafe {
            let values = std::slice::from_raw_parts(raw.cast::<u64>().as_ptr(), 8);
            assert!(values.iter().all(|&v| v == 0));
            alloc.deallocate(raw, layout);
        }
    }

    #[test]
    fn test_zero_sized_request() {
        let layout = Layout::from_size_align(0, 1).unwrap();
        assert_eq!(
            SystemAllocator.allocate(layout),
            Err(MemoryError::ZeroSizedAllocation)
        );
    }

    #[test]
    fn test_borrowed_allocator() {
        fn via<A: Allocator>(a: A) -> Result<(), MemoryError> {
            let layout = array_layout::<u8>(16)?;
            let p = a.allocate(layout)?;
            unsafe { a.deallocate(p, layout) };
            Ok(())
        }
        let alloc = SystemAllocator;
        via(&alloc).unwrap();
    }
}
