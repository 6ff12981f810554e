// Copyright (c) 2025 Dimitris Kafetzis
//
// Licensed under the MIT License.
// See LICENSE file in the project root for full license information.
//
// SPDX-License-Identifier: MIT

//! The numeric element capability.
//!
//! [`Numeric`] connects a Rust primitive to its [`DType`], its variant in
//! [`Buffer`] and [`Scalar`], and the per-element arithmetic used by the
//! kernels in [`crate::ops`]. A tensor is numeric-backed exactly when its
//! buffer holds one of the implementing types, which is fixed when the
//! tensor is constructed.

use crate::{BinaryOp, Buffer, DType, Scalar};
use std::fmt;

/// A domain violation detected for a single right-hand operand.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DomainFault {
    /// Integer division by zero.
    DivisionByZero,
    /// Integer power with a negative exponent.
    NegativeExponent,
    /// Integer power with an exponent that does not fit in `u32`.
    ExponentOverflow,
}

/// Element types that support the elementwise arithmetic kernels.
pub trait Numeric: Copy + PartialEq + fmt::Debug + Send + Sync + 'static {
    /// The corresponding runtime data type.
    const DTYPE: DType;

    /// `true` when [`Numeric::check`] can reject operands. Kernels skip the
    /// validation pass otherwise.
    const CHECKED: bool;

    /// The additive identity.
    fn zero() -> Self;

    /// Applies `op` to a single pair of elements.
    fn combine(op: BinaryOp, lhs: Self, rhs: Self) -> Self;

    /// Validates the right-hand operand of `op` before anything is written.
    fn check(_op: BinaryOp, _rhs: Self) -> Result<(), DomainFault> {
        Ok(())
    }

    /// Borrows the typed contents of `buffer`, if it holds this type.
    fn slice(buffer: &Buffer) -> Option<&[Self]>;

    /// Mutably borrows the typed contents of `buffer`, if it holds this type.
    fn slice_mut(buffer: &mut Buffer) -> Option<&mut [Self]>;

    /// Wraps a typed vector into a [`Buffer`].
    fn into_buffer(values: Vec<Self>) -> Buffer;

    /// Extracts the value from `scalar` if the types agree.
    fn from_scalar(scalar: Scalar) -> Option<Self>;
}

macro_rules! impl_float {
    ($t:ty, $variant:ident) => {
        impl Numeric for $t {
            const DTYPE: DType = DType::$variant;
            const CHECKED: bool = false;

            #[inline]
            fn zero() -> Self {
                0.0
            }

            #[inline]
            fn combine(op: BinaryOp, lhs: Self, rhs: Self) -> Self {
                match op {
                    BinaryOp::Add => lhs + rhs,
                    BinaryOp::Sub => lhs - rhs,
                    BinaryOp::Mul => lhs * rhs,
                    BinaryOp::Div => lhs / rhs,
                    BinaryOp::Pow => lhs.powf(rhs),
                }
            }

            fn slice(buffer: &Buffer) -> Option<&[Self]> {
                match buffer {
                    Buffer::$variant(v) => Some(v),
                    _ => None,
                }
            }

            fn slice_mut(buffer: &mut Buffer) -> Option<&mut [Self]> {
                match buffer {
                    Buffer::$variant(v) => Some(v),
                    _ => None,
                }
            }

            fn into_buffer(values: Vec<Self>) -> Buffer {
                Buffer::$variant(values)
            }

            fn from_scalar(scalar: Scalar) -> Option<Self> {
                match scalar {
                    Scalar::$variant(v) => Some(v),
                    _ => None,
                }
            }
        }
    };
}

// Integer arithmetic wraps on overflow; division by zero and out-of-range
// exponents are rejected by `check` before the kernel writes anything.
macro_rules! impl_int {
    ($t:ty, $variant:ident) => {
        impl Numeric for $t {
            const DTYPE: DType = DType::$variant;
            const CHECKED: bool = true;

            #[inline]
            fn zero() -> Self {
                0
            }

            #[inline]
            fn combine(op: BinaryOp, lhs: Self, rhs: Self) -> Self {
                match op {
                    BinaryOp::Add => lhs.wrapping_add(rhs),
                    BinaryOp::Sub => lhs.wrapping_sub(rhs),
                    BinaryOp::Mul => lhs.wrapping_mul(rhs),
                    BinaryOp::Div if rhs == 0 => 0,
                    BinaryOp::Div => lhs.wrapping_div(rhs),
                    BinaryOp::Pow => lhs.wrapping_pow(u32::try_from(rhs).unwrap_or(0)),
                }
            }

            fn check(op: BinaryOp, rhs: Self) -> Result<(), DomainFault> {
                match op {
                    BinaryOp::Div if rhs == 0 => Err(DomainFault::DivisionByZero),
                    BinaryOp::Pow if rhs < 0 => Err(DomainFault::NegativeExponent),
                    BinaryOp::Pow if u32::try_from(rhs).is_err() => {
                        Err(DomainFault::ExponentOverflow)
                    }
                    _ => Ok(()),
                }
            }

            fn slice(buffer: &Buffer) -> Option<&[Self]> {
                match buffer {
                    Buffer::$variant(v) => Some(v),
                    _ => None,
                }
            }

            fn slice_mut(buffer: &mut Buffer) -> Option<&mut [Self]> {
                match buffer {
                    Buffer::$variant(v) => Some(v),
                    _ => None,
                }
            }

            fn into_buffer(values: Vec<Self>) -> Buffer {
                Buffer::$variant(values)
            }

            fn from_scalar(scalar: Scalar) -> Option<Self> {
                match scalar {
                    Scalar::$variant(v) => Some(v),
                    _ => None,
                }
            }
        }
    };
}

impl_float!(f32, F32);
impl_float!(f64, F64);
impl_int!(i32, I32);
impl_int!(i64, I64);

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_float_combine() {
        assert_eq!(f32::combine(BinaryOp::Add, 1.0, 2.0), 3.0);
        assert_eq!(f64::combine(BinaryOp::Sub, 1.0, 2.0), -1.0);
        assert_eq!(f64::combine(BinaryOp::Pow, 2.0, 10.0), 1024.0);
        assert!(f32::combine(BinaryOp::Div, 1.0, 0.0).is_infinite());
    }

    #[test]
    fn test_int_combine_wraps() {
        assert_eq!(i32::combine(BinaryOp::Add, i32::MAX, 1), i32::MIN);
        assert_eq!(i64::combine(BinaryOp::Mul, 6, 7), 42);
        assert_eq!(i32::combine(BinaryOp::Div, 7, 2), 3);
        assert_eq!(i32::combine(BinaryOp::Div, i32::MIN, -1), i32::MIN);
        assert_eq!(i64::combine(BinaryOp::Pow, 3, 4), 81);
    }

    #[test]
    fn test_int_check() {
        assert_eq!(i32::check(BinaryOp::Div, 0), Err(DomainFault::DivisionByZero));
        assert_eq!(i32::check(BinaryOp::Div, 3), Ok(()));
        assert_eq!(i64::check(BinaryOp::Pow, -1), Err(DomainFault::NegativeExponent));
        assert_eq!(
            i64::check(BinaryOp::Pow, i64::from(u32::MAX) + 1),
            Err(DomainFault::ExponentOverflow)
        );
        assert_eq!(i32::check(BinaryOp::Add, 0), Ok(()));
    }

    #[test]
    fn test_float_never_rejects() {
        for op in BinaryOp::ALL {
            assert_eq!(f64::check(op, 0.0), Ok(()));
        }
    }

    #[test]
    fn test_buffer_access() {
        let mut buf = f32::into_buffer(vec![1.0, 2.0]);
        assert_eq!(f32::slice(&buf), Some(&[1.0f32, 2.0][..]));
        assert!(f64::slice(&buf).is_none());
        f32::slice_mut(&mut buf).unwrap()[0] = 5.0;
        assert_eq!(f32::slice(&buf).unwrap()[0], 5.0);
    }

    #[test]
    fn test_from_scalar() {
        assert_eq!(i32::from_scalar(Scalar::I32(4)), Some(4));
        assert_eq!(i32::from_scalar(Scalar::I64(4)), None);
        assert_eq!(f64::from_scalar(Scalar::F32(1.0)), None);
    }
}
