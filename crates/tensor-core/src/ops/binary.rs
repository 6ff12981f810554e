// Copyright (c) 2025 Dimitris Kafetzis
//
// Licensed under the MIT License.
// See LICENSE file in the project root for full license information.
//
// SPDX-License-Identifier: MIT

//! Elementwise binary kernels over [`Buffer`]s.
//!
//! All four entry points share one typed loop. Each element of the
//! destination is computed from the *original* values of its operands
//! before it is written, so an operand that is the destination itself
//! ([`Source::Dest`]) always contributes its pre-call value.
//!
//! Operands are validated (element types, lengths, integer domain) before
//! the first write: a kernel error never leaves the destination partially
//! updated.

use crate::{BinaryOp, Buffer, DType, DomainFault, Numeric, Scalar, TensorError};

/// One operand of a kernel call.
#[derive(Debug, Clone, Copy)]
pub enum Source<'a> {
    /// A buffer distinct from the destination.
    Buffer(&'a Buffer),
    /// A scalar broadcast to every element.
    Scalar(Scalar),
    /// The destination buffer itself, read before it is overwritten.
    Dest,
}

#[derive(Debug, Clone, Copy)]
enum Write {
    Overwrite,
    Accumulate,
}

/// Writing form: `dst = lhs OP rhs`.
pub fn apply_into(
    op: BinaryOp,
    lhs: Source<'_>,
    rhs: Source<'_>,
    dst: &mut Buffer,
) -> Result<(), TensorError> {
    run(op, lhs, rhs, dst, Write::Overwrite)
}

/// Accumulating form: `dst = dst + (lhs OP rhs)`.
pub fn accumulate_into(
    op: BinaryOp,
    lhs: Source<'_>,
    rhs: Source<'_>,
    dst: &mut Buffer,
) -> Result<(), TensorError> {
    run(op, lhs, rhs, dst, Write::Accumulate)
}

/// Mutating form: `dst = dst OP rhs`.
pub fn apply_assign(op: BinaryOp, dst: &mut Buffer, rhs: Source<'_>) -> Result<(), TensorError> {
    run(op, Source::Dest, rhs, dst, Write::Overwrite)
}

/// Reversed mutating form: `dst = lhs OP dst`.
pub fn apply_assign_rev(
    op: BinaryOp,
    dst: &mut Buffer,
    lhs: Source<'_>,
) -> Result<(), TensorError> {
    run(op, lhs, Source::Dest, dst, Write::Overwrite)
}

fn run(
    op: BinaryOp,
    lhs: Source<'_>,
    rhs: Source<'_>,
    dst: &mut Buffer,
    write: Write,
) -> Result<(), TensorError> {
    match dst.dtype() {
        DType::F32 => run_typed::<f32>(op, lhs, rhs, dst, write),
        DType::F64 => run_typed::<f64>(op, lhs, rhs, dst, write),
        DType::I32 => run_typed::<i32>(op, lhs, rhs, dst, write),
        DType::I64 => run_typed::<i64>(op, lhs, rhs, dst, write),
        dtype => Err(TensorError::UnsupportedDType {
            op: op.name(),
            dtype,
        }),
    }
}

/// A [`Source`] resolved to the destination's element type.
enum Operand<'a, T> {
    Slice(&'a [T]),
    Value(T),
    Dest,
}

impl<T: Numeric> Operand<'_, T> {
    #[inline(always)]
    fn at(&self, dst: &[T], i: usize) -> T {
        match self {
            Operand::Slice(s) => s[i],
            Operand::Value(v) => *v,
            Operand::Dest => dst[i],
        }
    }
}

fn resolve<T: Numeric>(
    op: BinaryOp,
    source: Source<'_>,
    len: usize,
) -> Result<Operand<'_, T>, TensorError> {
    match source {
        Source::Buffer(buffer) => {
            let slice = T::slice(buffer).ok_or(TensorError::DTypeMismatch {
                op: op.name(),
                expected: T::DTYPE,
                actual: buffer.dtype(),
            })?;
            if slice.len() != len {
                return Err(TensorError::LengthMismatch {
                    op: op.name(),
                    expected: len,
                    actual: slice.len(),
                });
            }
            Ok(Operand::Slice(slice))
        }
        Source::Scalar(scalar) => T::from_scalar(scalar).map(Operand::Value).ok_or(
            TensorError::ScalarTypeMismatch {
                op: op.name(),
                expected: T::DTYPE,
                actual: scalar.dtype(),
            },
        ),
        Source::Dest => Ok(Operand::Dest),
    }
}

fn domain_error(op: BinaryOp, fault: DomainFault, index: usize) -> TensorError {
    let op = op.name();
    match fault {
        DomainFault::DivisionByZero => TensorError::DivisionByZero { op, index },
        DomainFault::NegativeExponent => TensorError::NegativeExponent { op, index },
        DomainFault::ExponentOverflow => TensorError::ExponentOverflow { op, index },
    }
}

fn run_typed<T: Numeric>(
    op: BinaryOp,
    lhs: Source<'_>,
    rhs: Source<'_>,
    dst: &mut Buffer,
    write: Write,
) -> Result<(), TensorError> {
    let len = dst.len();
    let lhs = resolve::<T>(op, lhs, len)?;
    let rhs = resolve::<T>(op, rhs, len)?;
    let out = T::slice_mut(dst).ok_or(TensorError::UnsupportedDType {
        op: op.name(),
        dtype: T::DTYPE,
    })?;

    if T::CHECKED {
        match &rhs {
            Operand::Value(v) if len > 0 => {
                T::check(op, *v).map_err(|fault| domain_error(op, fault, 0))?
            }
            Operand::Value(_) => {}
            _ => {
                for i in 0..len {
                    T::check(op, rhs.at(out, i)).map_err(|fault| domain_error(op, fault, i))?;
                }
            }
        }
    }

    for i in 0..len {
        let value = T::combine(op, lhs.at(out, i), rhs.at(out, i));
        out[i] = match write {
            Write::Overwrite => value,
            Write::Accumulate => T::combine(BinaryOp::Add, out[i], value),
        };
    }

    Ok(())
}
