// Copyright (c) 2025 Dimitris Kafetzis
//
// Licensed under the MIT License.
// See LICENSE file in the project root for full license information.
//
// SPDX-License-Identifier: MIT

//! `ranked-demo run` command: build the demo tensors and walk a matrix
//! through its row views.
//!
//! ```text
//! Tensor<i32, 2> ─slice_mut(0)─► TensorViewMut<i32, 1> ─at_mut(2)─► &mut i32
//! ```

use crate::config::DemoConfig;
use anyhow::Context;
use ranked_alloc::MemoryPool;
use ranked_tensor::{
    shape, Allocator, Shape, Shape3D, Tensor, Tensor1d, Tensor1f, Tensor2i, Tensor3f, Tensor5f,
};

pub fn execute(config: &DemoConfig) -> anyhow::Result<()> {
    println!("╔══════════════════════════════════════════════════════╗");
    println!("║           ranked-demo · Tensor Walkthrough           ║");
    println!("╚══════════════════════════════════════════════════════╝");
    println!();

    let budget = config.parse_budget()?;
    let pool = MemoryPool::new(budget);
    tracing::info!(budget = %budget, rows = config.rows, cols = config.cols, "starting demo");

    // ── Rank-5 Tensor ──────────────────────────────────────────
    let tensor = Tensor5f::empty(shape![15, 128, 64, 7, 7]?);
    println!("  Created a tensor of size: {}", tensor.shape());
    println!("  It has {} elements", tensor.len());

    let (seq_length, batch_size, channels, height, width): (usize, usize, usize, usize, usize) =
        (*tensor.shape()).into();
    println!(
        "  seq_length={seq_length} batch_size={batch_size} channels={channels} height={height} width={width}"
    );
    println!("  Strides: {:?}", tensor.strides());
    println!();

    // ── Factories ──────────────────────────────────────────────
    let zero_tensor = Tensor1f::zeros(shape![5]?);
    let one_tensor = Tensor1d::ones_like(&zero_tensor);
    let empty_tensor = Tensor2i::empty(shape![2, 4]?);

    let image_size = Shape3D::new([3, 28, 28])?;
    let full_tensor = Tensor3f::full(image_size, config.fill_value);

    let custom_size = Shape::<7>::new([1, 2, 3, 4, 5, 6, 7])?;
    let custom_tensor = Tensor::<u16, 7, _>::ones_in(custom_size, pool.clone())
        .context("allocating the rank-7 tensor from the pool")?;

    println!("  Factories:");
    print_tensor_line("zeros", &zero_tensor);
    print_tensor_line("ones_like", &one_tensor);
    print_tensor_line("empty", &empty_tensor);
    print_tensor_line("full", &full_tensor);
    print_tensor_line("ones (pool)", &custom_tensor);
    println!();

    // ── Matrix Through Row Views ───────────────────────────────
    let matrix_shape = Shape::new([config.rows, config.cols])
        .context("matrix rows and cols must be positive")?;
    let mut matrix = Tensor::<i32, 2, _>::empty_in(matrix_shape, pool.clone())
        .context("allocating the matrix from the pool")?;

    let (rows, cols): (usize, usize) = (*matrix.shape()).into();
    for i in 0..rows {
        let mut row = matrix.slice_mut(i)?;
        for j in 0..cols {
            *row.at_mut(j)? = i32::try_from(i * cols + j + 1)?;
        }
    }

    println!("  Matrix:");
    print_matrix(&matrix)?;

    let row0 = matrix.slice(0)?;
    println!("  0th row size is: {}", row0.shape());

    let mut row0 = matrix.slice_mut(0)?;
    let value02 = row0
        .at_mut(2)
        .context("the matrix needs at least 3 columns to overwrite [0][2]")?;
    *value02 = 17;

    println!("  After writing 17 through the row view:");
    print_matrix(&matrix)?;

    // ── Pool ───────────────────────────────────────────────────
    println!("  Pool Stats:");
    println!("   {}", pool.stats().summary());
    println!(
        "   In use: {} bytes of {}",
        pool.allocated_bytes(),
        pool.budget()
    );

    drop(matrix);
    drop(custom_tensor);
    tracing::info!(
        allocated = pool.allocated_bytes(),
        cached = pool.free_list_bytes(),
        "demo tensors released"
    );
    pool.shrink();

    Ok(())
}

fn print_tensor_line<T, const R: usize, A>(label: &str, t: &Tensor<T, R, A>)
where
    T: ranked_tensor::Element,
    A: Allocator,
{
    println!(
        "   {label:<12} {:<16} {:>4} {:>6} elements  first={:?}",
        t.shape().to_string(),
        t.dtype(),
        t.len(),
        t.as_slice()[0]
    );
}

fn print_matrix<A: Allocator>(matrix: &Tensor<i32, 2, A>) -> anyhow::Result<()> {
    for i in 0..matrix.shape().axis(0) {
        let row = matrix.slice(i)?;
        let cells: Vec<String> = row.iter().map(|x| x.to_string()).collect();
        println!("   {},", cells.join(", "));
    }
    println!();
    Ok(())
}
