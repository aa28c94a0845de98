// Copyright (c) 2025 Dimitris Kafetzis
//
// Licensed under the MIT License.
// See LICENSE file in the project root for full license information.
//
// SPDX-License-Identifier: MIT

//! Integration tests: shapes → layout → owned tensors → views, on the
//! system heap and on a budgeted pool.

use ranked_tensor::{
    shape, DType, MemoryBudget, MemoryError, MemoryPool, Shape, Shape2D, Tensor, Tensor2i,
    Tensor5f, TensorError, TensorView, TensorViewMut,
};

// ── Helpers ────────────────────────────────────────────────────

/// Fills `a` so that `a[i][j] == i * cols + j + 1`.
fn numbered(rows: usize, cols: usize) -> Tensor2i {
    let mut a = Tensor2i::empty(Shape2D::new([rows, cols]).unwrap());
    for i in 0..rows {
        let mut row = a.slice_mut(i).unwrap();
        for j in 0..cols {
            *row.at_mut(j).unwrap() = (i * cols + j + 1) as i32;
        }
    }
    a
}

// ── End-to-End Scenario ────────────────────────────────────────

#[test]
fn test_matrix_row_view_overwrite() {
    let mut a = numbered(4, 3);

    let row0 = a.slice(0).unwrap();
    assert_eq!(*row0.at(2).unwrap(), 3);

    let mut row0 = a.slice_mut(0).unwrap();
    *row0.at_mut(2).unwrap() = 17;

    assert_eq!(*a.slice(0).unwrap().at(2).unwrap(), 17);
    for i in 0..4 {
        for j in 0..3 {
            let expected = if (i, j) == (0, 2) {
                17
            } else {
                (i * 3 + j + 1) as i32
            };
            assert_eq!(a[[i, j]], expected, "a[{i}][{j}]");
        }
    }
}

#[test]
fn test_rank5_factory_and_strides() {
    let t = Tensor5f::zeros(shape![15, 128, 64, 7, 7].unwrap());
    assert_eq!(t.shape().to_string(), "(15, 128, 64, 7, 7)");
    assert_eq!(t.len(), 15 * 128 * 64 * 7 * 7);

    let s = t.strides();
    assert_eq!(s[4], 1);
    for i in 0..4 {
        assert_eq!(s[i], s[i + 1] * t.shape().axis(i + 1));
    }

    let leaf = t
        .slice(14)
        .unwrap()
        .slice(127)
        .unwrap()
        .slice(63)
        .unwrap()
        .slice(6)
        .unwrap();
    assert_eq!(leaf.len(), 7);
    assert_eq!(*leaf.at(6).unwrap(), 0.0);
}

#[test]
fn test_rank7_ones() {
    let t = Tensor::<u16, 7>::ones(shape![2, 1, 3, 1, 2, 1, 2].unwrap());
    assert_eq!(t.len(), 24);
    assert_eq!(t.dtype(), DType::U16);
    assert!(t.iter().all(|&x| x == 1));
    let v = t.slice(1).unwrap().slice(0).unwrap().slice(2).unwrap();
    assert_eq!(v.shape().axes(), &[1, 2, 1, 2]);
}

// ── Aliasing ───────────────────────────────────────────────────

#[test]
fn test_nested_views_alias_owner() {
    let mut t = Tensor::<f64, 3>::zeros(shape![3, 4, 5].unwrap());
    *t.slice_mut(2)
        .unwrap()
        .slice_mut(3)
        .unwrap()
        .at_mut(4)
        .unwrap() = 9.5;
    assert_eq!(t[[2, 3, 4]], 9.5);
    assert_eq!(t.as_slice()[t.layout().offset_of([2, 3, 4]).unwrap()], 9.5);

    t[[0, 0, 1]] = -1.0;
    assert_eq!(t.view().slice(0).unwrap().slice(0).unwrap()[1], -1.0);
}

#[test]
fn test_distinct_indices_distinct_addresses() {
    let t = Tensor::<u8, 3>::zeros(shape![2, 3, 4].unwrap());
    let mut addrs = Vec::new();
    for i in 0..2 {
        for j in 0..3 {
            for k in 0..4 {
                addrs.push(t.get([i, j, k]).unwrap() as *const u8);
            }
        }
    }
    let mut sorted = addrs.clone();
    sorted.sort();
    sorted.dedup();
    assert_eq!(sorted.len(), addrs.len());
}

#[test]
fn test_borrowed_buffer_views() {
    let mut data: Vec<i64> = (0..6).collect();
    {
        let mut v = TensorViewMut::from_slice_mut(shape![3, 2].unwrap(), &mut data).unwrap();
        v[[2, 1]] = 50;
    }
    let v = TensorView::from_slice(shape![2, 3].unwrap(), &data).unwrap();
    assert_eq!(*v.slice(1).unwrap().at(2).unwrap(), 50);

    let owned = v.to_tensor().unwrap();
    drop(data);
    assert_eq!(owned[[1, 2]], 50);
}

// ── Errors ─────────────────────────────────────────────────────

#[test]
fn test_construction_errors() {
    assert!(matches!(
        Shape::<3>::from_axes([4, -1, 2]),
        Err(TensorError::NonPositiveAxis { axis: 1, .. })
    ));
    assert_eq!(
        Shape::<3>::from_args([4, 4]).unwrap_err(),
        TensorError::ArgumentCount {
            expected: 3,
            got: 2
        }
    );
    assert_eq!(
        Shape::<2>::from_slice(&[1, 2, 3]).unwrap_err(),
        TensorError::RankMismatch {
            expected: 2,
            got: 3
        }
    );
}

#[test]
fn test_overflowing_shape_rejected() {
    let err = Shape::<2>::from_args([usize::MAX / 2, 3]).unwrap_err();
    assert!(matches!(err, TensorError::ElementCountOverflow { ref axes } if axes.len() == 2));
    assert!(err.to_string().contains("overflows"), "{err}");
    assert!(shape![usize::MAX, 1, 2].is_err());
}

#[test]
fn test_index_errors_name_axis() {
    let a = numbered(4, 3);
    assert_eq!(
        a.get([1, 7]).unwrap_err(),
        TensorError::IndexOutOfBounds {
            axis: 1,
            index: 7,
            len: 3
        }
    );
    assert!(a.slice(3).unwrap().at(3).is_err());
    let msg = a.slice(9).unwrap_err().to_string();
    assert!(msg.contains("axis 0"), "{msg}");
}

// ── Factories ──────────────────────────────────────────────────

#[test]
fn test_like_factories_across_types() {
    let base = Tensor::<u64, 2>::full(shape![3, 7].unwrap(), 42);
    let z = Tensor::<f32, 2>::zeros_like(&base);
    let o = Tensor::<i8, 2>::ones_like(&z);
    let f = Tensor::<f64, 2>::full_like(&o, 2.5);
    let e = Tensor::<u32, 2>::empty_like(&f);

    for shape in [z.shape(), o.shape(), f.shape(), e.shape()] {
        assert_eq!(shape, base.shape());
    }
    assert!(z.iter().all(|&x| x == 0.0));
    assert!(o.iter().all(|&x| x == 1));
    assert!(f.iter().all(|&x| x == 2.5));
}

// ── Pool-backed Tensors ────────────────────────────────────────

#[test]
fn test_pool_memory_fully_returned() {
    let pool = MemoryPool::new(MemoryBudget::parse("64K").unwrap());
    {
        let a = Tensor::<f32, 2, _>::zeros_in(shape![16, 16].unwrap(), &pool).unwrap();
        let b = Tensor::<f64, 3, _>::full_in(shape![4, 4, 4].unwrap(), 1.0, &pool).unwrap();
        let c = Tensor::<u8, 1, _>::from_elements_in(shape![3].unwrap(), &[1, 2, 3], &pool).unwrap();
        assert_eq!(
            pool.allocated_bytes(),
            a.size_bytes() + b.size_bytes() + c.size_bytes()
        );
    }
    assert_eq!(pool.allocated_bytes(), 0);
    let stats = pool.stats();
    assert_eq!(stats.successful_allocations(), 3);
    assert_eq!(stats.total_deallocations, 3);
    assert_eq!(stats.outstanding_blocks(), 0);
}

#[test]
fn test_pool_reuses_released_blocks() {
    let pool = MemoryPool::new(MemoryBudget::from_kb(8));
    for _ in 0..4 {
        let t = Tensor::<i32, 2, _>::ones_in(shape![8, 8].unwrap(), pool.clone()).unwrap();
        assert_eq!(t[[7, 7]], 1);
    }
    let stats = pool.stats();
    assert_eq!(stats.cache_misses, 1);
    assert_eq!(stats.cache_hits, 3);
}

#[test]
fn test_pool_budget_refuses_tensor() {
    let pool = MemoryPool::new(MemoryBudget::from_kb(1));
    let _held = Tensor::<u8, 1, _>::zeros_in(shape![1000].unwrap(), &pool).unwrap();
    let err = Tensor::<u8, 1, _>::zeros_in(shape![100].unwrap(), &pool).unwrap_err();
    assert!(matches!(
        err,
        TensorError::Memory(MemoryError::OutOfMemory {
            requested_bytes: 100,
            ..
        })
    ));
}
