// Copyright (c) 2025 Dimitris Kafetzis
//
// Licensed under the MIT License.
// See LICENSE file in the project root for full license information.
//
// SPDX-License-Identifier: MIT

//! Fixed-rank shape descriptors.

use crate::{Layout, TensorError};
use std::fmt;
use std::ops::Index;

/// Post-monomorphisation guard: rank-0 shapes do not exist.
struct RankCheck<const R: usize>;

impl<const R: usize> RankCheck<R> {
    const VALID: () = assert!(R >= 1, "tensor rank must be at least 1");
}

/// The axis lengths of a rank-`R` tensor.
///
/// The rank is part of the type; the lengths are chosen at runtime and are
/// always positive. A shape is immutable: to change an axis, build a new
/// shape with [`with_axis`](Shape::with_axis).
///
/// # Examples
/// ```
/// use ranked_tensor::Shape;
///
/// let s = Shape::new([2, 3, 4]).unwrap();
/// assert_eq!(s.rank(), 3);
/// assert_eq!(s.len(), 24);
/// assert_eq!(s.to_string(), "(2, 3, 4)");
/// assert_eq!(s.drop_first().axes(), &[3, 4]);
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, serde::Serialize, serde::Deserialize)]
#[serde(into = "Vec<usize>", try_from = "Vec<usize>")]
pub struct Shape<const R: usize> {
    axes: [usize; R],
    len: usize,
}

impl<const R: usize> Shape<R> {
    /// Number of axes.
    pub const RANK: usize = R;

    /// Builds a shape from exactly `R` lengths.
    ///
    /// The argument count is checked by the compiler; each length must be
    /// non-zero.
    pub fn new(axes: [usize; R]) -> Result<Self, TensorError> {
        if let Some(axis) = axes.iter().position(|&len| len == 0) {
            return Err(TensorError::NonPositiveAxis {
                axis,
                value: "0".to_string(),
            });
        }
        Self::checked(axes)
    }

    /// Builds a shape from any integer type, rejecting zero and negative
    /// lengths.
    ///
    /// ```
    /// use ranked_tensor::{Shape, TensorError};
    ///
    /// let err = Shape::from_axes([4, -1, 2]).unwrap_err();
    /// assert!(matches!(err, TensorError::NonPositiveAxis { axis: 1, .. }));
    /// ```
    pub fn from_axes<I>(axes: [I; R]) -> Result<Self, TensorError>
    where
        I: TryInto<usize> + Copy + fmt::Display,
    {
        let mut out = [0usize; R];
        for (axis, (slot, value)) in out.iter_mut().zip(axes).enumerate() {
            *slot = positive_axis(axis, value)?;
        }
        Self::checked(out)
    }

    /// Builds a shape from a runtime argument sequence, which must yield
    /// exactly `R` items.
    ///
    /// Fails with [`TensorError::ArgumentCount`] on a count mismatch.
    pub fn from_args<I, V>(args: I) -> Result<Self, TensorError>
    where
        I: IntoIterator<Item = V>,
        V: TryInto<usize> + Copy + fmt::Display,
    {
        let args: Vec<V> = args.into_iter().collect();
        if args.len() != R {
            return Err(TensorError::ArgumentCount {
                expected: R,
                got: args.len(),
            });
        }
        let mut out = [0usize; R];
        for (axis, (slot, value)) in out.iter_mut().zip(args).enumerate() {
            *slot = positive_axis(axis, value)?;
        }
        Self::checked(out)
    }

    /// Builds a shape from a list whose length must equal `R`.
    ///
    /// Fails with [`TensorError::RankMismatch`] if it does not.
    pub fn from_slice(axes: &[usize]) -> Result<Self, TensorError> {
        let axes: [usize; R] = axes.try_into().map_err(|_| TensorError::RankMismatch {
            expected: R,
            got: axes.len(),
        })?;
        Self::new(axes)
    }

    /// Positive lengths in, element count checked for overflow.
    fn checked(axes: [usize; R]) -> Result<Self, TensorError> {
        let len = axes
            .iter()
            .try_fold(1usize, |acc, &len| acc.checked_mul(len))
            .ok_or_else(|| TensorError::ElementCountOverflow {
                axes: axes.to_vec(),
            })?;
        Ok(Self::from_parts(axes, len))
    }

    /// Trusted constructor: every length is positive and the product is
    /// known to fit, e.g. the trailing axes of a valid shape.
    pub(crate) fn from_raw(axes: [usize; R]) -> Self {
        let len = axes.iter().product();
        Self::from_parts(axes, len)
    }

    fn from_parts(axes: [usize; R], len: usize) -> Self {
        #[allow(clippy::let_unit_value)]
        let () = RankCheck::<R>::VALID;
        debug_assert!(axes.iter().all(|&len| len > 0));
        Self { axes, len }
    }

    pub const fn rank(&self) -> usize {
        R
    }

    /// Total number of elements (product of all axis lengths).
    pub fn len(&self) -> usize {
        self.len
    }

    /// Always `false`: every axis has at least one position.
    pub fn is_empty(&self) -> bool {
        false
    }

    /// Length of axis `i`.
    ///
    /// # Panics
    /// Panics if `i >= R`.
    pub fn axis(&self, i: usize) -> usize {
        self.axes[i]
    }

    /// Length of axis `i`, or `None` if `i >= R`.
    pub fn get(&self, i: usize) -> Option<usize> {
        self.axes.get(i).copied()
    }

    pub fn axes(&self) -> &[usize; R] {
        &self.axes
    }

    pub fn into_array(self) -> [usize; R] {
        self.axes
    }

    pub fn iter(&self) -> impl Iterator<Item = usize> + '_ {
        self.axes.iter().copied()
    }

    /// Returns a copy of this shape with axis `i` set to `len`.
    ///
    /// Fails with [`TensorError::IndexOutOfBounds`] if `i >= R`.
    pub fn with_axis(&self, i: usize, len: usize) -> Result<Self, TensorError> {
        let mut axes = self.axes;
        let slot = axes.get_mut(i).ok_or(TensorError::IndexOutOfBounds {
            axis: i,
            index: i,
            len: R,
        })?;
        *slot = len;
        Self::new(axes)
    }

    /// Row-major strides of a contiguous buffer with this shape.
    pub fn strides(&self) -> [usize; R] {
        *Layout::new(*self).strides()
    }
}

fn positive_axis<V>(axis: usize, value: V) -> Result<usize, TensorError>
where
    V: TryInto<usize> + Copy + fmt::Display,
{
    match value.try_into() {
        Ok(len) if len > 0 => Ok(len),
        _ => Err(TensorError::NonPositiveAxis {
            axis,
            value: value.to_string(),
        }),
    }
}

macro_rules! impl_drop_first {
    ($($rank:literal => $lower:literal),* $(,)?) => {
        $(
            impl Shape<$rank> {
                /// Shape of one slice along axis 0: the remaining axes, in order.
                pub fn drop_first(&self) -> Shape<$lower> {
                    let mut axes = [0usize; $lower];
                    axes.copy_from_slice(&self.axes[1..]);
                    Shape::from_raw(axes)
                }
            }
        )*
    };
}

impl_drop_first!(2 => 1, 3 => 2, 4 => 3, 5 => 4, 6 => 5, 7 => 6, 8 => 7);

impl<const R: usize> Index<usize> for Shape<R> {
    type Output = usize;

    fn index(&self, i: usize) -> &usize {
        &self.axes[i]
    }
}

impl<const R: usize> fmt::Display for Shape<R> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "(")?;
        for (i, len) in self.axes.iter().enumerate() {
            if i > 0 {
                write!(f, ", ")?;
            }
            write!(f, "{len}")?;
        }
        write!(f, ")")
    }
}

impl<const R: usize> From<Shape<R>> for [usize; R] {
    fn from(shape: Shape<R>) -> Self {
        shape.axes
    }
}

impl<const R: usize> From<Shape<R>> for Vec<usize> {
    fn from(shape: Shape<R>) -> Self {
        shape.axes.to_vec()
    }
}

impl<const R: usize> TryFrom<[usize; R]> for Shape<R> {
    type Error = TensorError;

    fn try_from(axes: [usize; R]) -> Result<Self, Self::Error> {
        Self::new(axes)
    }
}

impl<const R: usize> TryFrom<&[usize]> for Shape<R> {
    type Error = TensorError;

    fn try_from(axes: &[usize]) -> Result<Self, Self::Error> {
        Self::from_slice(axes)
    }
}

impl<const R: usize> TryFrom<Vec<usize>> for Shape<R> {
    type Error = TensorError;

    fn try_from(axes: Vec<usize>) -> Result<Self, Self::Error> {
        Self::from_slice(&axes)
    }
}

macro_rules! impl_into_tuple {
    (@usize $idx:tt) => { usize };
    ($($rank:literal => ($($idx:tt),+)),* $(,)?) => {
        $(
            impl From<Shape<$rank>> for ($(impl_into_tuple!(@usize $idx),)+) {
                fn from(shape: Shape<$rank>) -> Self {
                    ($(shape.axes[$idx],)+)
                }
            }
        )*
    };
}

impl_into_tuple! {
    1 => (0),
    2 => (0, 1),
    3 => (0, 1, 2),
    4 => (0, 1, 2, 3),
    5 => (0, 1, 2, 3, 4),
}

pub type Shape1D = Shape<1>;
pub type Shape2D = Shape<2>;
pub type Shape3D = Shape<3>;
pub type Shape4D = Shape<4>;
pub type Shape5D = Shape<5>;

/// Builds a [`Shape`] from a list of integer lengths.
///
/// Expands to [`Shape::from_axes`], so the result is a `Result`. The number
/// of lengths fixes the rank; asking for a different rank does not compile:
///
/// ```compile_fail
/// use ranked_tensor::{shape, Shape, TensorError};
///
/// let s: Result<Shape<3>, TensorError> = shape![4, 4];
/// ```
///
/// ```
/// use ranked_tensor::shape;
///
/// let s = shape![4, 3].unwrap();
/// assert_eq!(s.len(), 12);
/// assert!(shape![4, -1, 2].is_err());
/// ```
#[macro_export]
macro_rules! shape {
    ($($axis:expr),+ $(,)?) => {
        $crate::Shape::from_axes([$($axis),+])
    };
}
