// Copyright (c) 2025 Dimitris Kafetzis
//
// Licensed under the MIT License.
// See LICENSE file in the project root for full license information.
//
// SPDX-License-Identifier: MIT

//! Benchmarks for element access: checked slicing, unchecked slicing and
//! whole-index lookup over a rank-3 tensor.

use criterion::{black_box, criterion_group, criterion_main, Criterion};
use ranked_tensor::{shape, Tensor3f};

const AXES: [usize; 3] = [32, 64, 64];

fn filled() -> Tensor3f {
    let mut t = Tensor3f::empty(shape![AXES[0], AXES[1], AXES[2]].unwrap());
    for (n, x) in t.iter_mut().enumerate() {
        *x = n as f32;
    }
    t
}

fn bench_checked_slicing(c: &mut Criterion) {
    let t = filled();
    c.bench_function("slice_at_checked", |b| {
        b.iter(|| {
            let mut sum = 0.0f32;
            for i in 0..AXES[0] {
                let plane = t.slice(i).unwrap();
                for j in 0..AXES[1] {
                    let row = plane.slice(j).unwrap();
                    for k in 0..AXES[2] {
                        sum += *row.at(k).unwrap();
                    }
                }
            }
            black_box(sum)
        })
    });
}

fn bench_unchecked_slicing(c: &mut Criterion) {
    let t = filled();
    c.bench_function("slice_at_unchecked", |b| {
        b.iter(|| {
            let mut sum = 0.0f32;
            for i in 0..AXES[0] {
                // SAFETY: loop bounds are the axis lengths.
                let plane = unsafe { t.slice_unchecked(i) };
                for j in 0..AXES[1] {
                    let row = unsafe { plane.slice_unchecked(j) };
                    for k in 0..AXES[2] {
                        sum += unsafe { *row.at_unchecked(k) };
                    }
                }
            }
            black_box(sum)
        })
    });
}

fn bench_whole_index(c: &mut Criterion) {
    let t = filled();
    c.bench_function("get_whole_index", |b| {
        b.iter(|| {
            let mut sum = 0.0f32;
            for i in 0..AXES[0] {
                for j in 0..AXES[1] {
                    for k in 0..AXES[2] {
                        sum += t[[i, j, k]];
                    }
                }
            }
            black_box(sum)
        })
    });
}

criterion_group!(
    benches,
    bench_checked_slicing,
    bench_unchecked_slicing,
    bench_whole_index
);
criterion_main!(benches);
