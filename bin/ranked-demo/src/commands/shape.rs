// Copyright (c) 2025 Dimitris Kafetzis
//
// Licensed under the MIT License.
// See LICENSE file in the project root for full license information.
//
// SPDX-License-Identifier: MIT

//! `ranked-demo shape` command: validate axis lengths for a rank chosen at
//! runtime and print the shape, element count and strides.

use ranked_tensor::Shape;

pub fn execute(axes: &[i64]) -> anyhow::Result<()> {
    match axes.len() {
        1 => describe::<1>(axes),
        2 => describe::<2>(axes),
        3 => describe::<3>(axes),
        4 => describe::<4>(axes),
        5 => describe::<5>(axes),
        n => anyhow::bail!("rank {n} is not supported here; pass between 1 and 5 axis lengths"),
    }
}

fn describe<const R: usize>(axes: &[i64]) -> anyhow::Result<()> {
    let shape = Shape::<R>::from_args(axes.iter().copied())?;
    tracing::debug!(rank = R, "shape validated");

    println!("  Shape:    {shape}");
    println!("  Rank:     {}", shape.rank());
    println!("  Elements: {}", shape.len());
    println!("  Strides:  {:?}", shape.strides());
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_supported_ranks() {
        assert!(execute(&[7]).is_ok());
        assert!(execute(&[15, 128, 64, 7, 7]).is_ok());
    }

    #[test]
    fn test_rejects_bad_input() {
        assert!(execute(&[]).is_err());
        assert!(execute(&[1, 2, 3, 4, 5, 6]).is_err());
        let err = execute(&[4, -1, 2]).unwrap_err();
        assert!(err.to_string().contains("axis 1"));
    }

    #[test]
    #[cfg(target_pointer_width = "64")]
    fn test_rejects_overflowing_element_count() {
        let err = execute(&[4294967296, 4294967296]).unwrap_err();
        assert!(err.to_string().contains("overflows usize"), "{err}");
    }
}
