// Copyright (c) 2025 Dimitris Kafetzis
//
// Licensed under the MIT License.
// See LICENSE file in the project root for full license information.
//
// SPDX-License-Identifier: MIT

//! The operation dispatcher.
//!
//! One function serves every operation and call shape. It resolves the
//! destination for the prepared [`ExecMode`], locks the tensors involved
//! and runs a single kernel pass.
//!
//! # Aliasing
//! A destination may be the same tensor as either operand (reuse or
//! increment into an input, or the in-place path itself). Such an
//! operand is handed to the kernel as [`Source::Dest`]; the kernel reads
//! each element's original value before writing it, so the result equals
//! the one computed with a separate copy of the operand.
//!
//! # Locking
//! The destination is write-locked and every other distinct operand is
//! read-locked, each exactly once, in ascending [`Tensor::id`] order.

use crate::{ArithError, CallShape, ExecMode, ExecPath, Prepared, Secondary};
use memory_manager::MemoryPool;
use parking_lot::RwLockReadGuard;
use tensor_core::ops::{accumulate_into, apply_into, Source};
use tensor_core::{BinaryOp, Buffer, Tensor, TensorError};

/// The outcome of a successful dispatch.
#[derive(Debug, Clone)]
pub struct Dispatched {
    /// The result tensor.
    pub result: Tensor,
    /// The path that produced it.
    pub path: ExecPath,
    /// Whether the destination was one of the operands.
    pub aliased: bool,
}

/// Runs `op` on prepared operands.
///
/// Fresh results are drawn from `pool` when one is given and are plain
/// zero-filled tensors otherwise.
pub fn dispatch(
    op: BinaryOp,
    prepared: Prepared,
    pool: Option<&MemoryPool>,
) -> Result<Dispatched, ArithError> {
    let Prepared {
        call,
        primary,
        secondary,
        mode,
    } = prepared;
    let path = mode.path();

    let (dest, accumulate) = match mode {
        ExecMode::Increment(target) => (target.into_tensor(), true),
        ExecMode::Reuse(target) => (target.into_tensor(), false),
        ExecMode::Fresh => {
            let result = match pool {
                Some(pool) => pool.recycle(primary.dtype(), primary.shape())?,
                None => Tensor::zeros(primary.shape().clone(), primary.dtype()),
            };
            (result, false)
        }
        ExecMode::InPlace => (primary.tensor().clone(), false),
    };

    let other = match &secondary {
        Secondary::Tensor(t) => Some(t.tensor()),
        Secondary::Scalar(_) => None,
    };
    let aliased = primary.tensor().same(&dest) || other.is_some_and(|t| t.same(&dest));
    if aliased {
        tracing::trace!(%op, %call, %path, "destination aliases an operand");
    }

    execute(op, call, primary.tensor(), &secondary, &dest, accumulate).map_err(|source| {
        ArithError::Kernel {
            op,
            call,
            path,
            source,
        }
    })?;

    tracing::debug!(
        %op,
        %call,
        %path,
        aliased,
        elements = dest.num_elements(),
        "dispatched"
    );

    Ok(Dispatched {
        result: dest,
        path,
        aliased,
    })
}

fn execute(
    op: BinaryOp,
    call: CallShape,
    primary: &Tensor,
    secondary: &Secondary,
    dest: &Tensor,
    accumulate: bool,
) -> Result<(), TensorError> {
    let mut inputs: Vec<&Tensor> = Vec::with_capacity(2);
    for t in std::iter::once(primary).chain(match secondary {
        Secondary::Tensor(t) => Some(t.tensor()),
        Secondary::Scalar(_) => None,
    }) {
        if !t.same(dest) && !inputs.iter().any(|seen| seen.same(t)) {
            inputs.push(t);
        }
    }
    inputs.sort_by_key(|t| t.id());

    let (below, above): (Vec<&Tensor>, Vec<&Tensor>) =
        inputs.into_iter().partition(|t| t.id() < dest.id());
    let mut guards: Vec<(&Tensor, RwLockReadGuard<'_, Buffer>)> =
        below.into_iter().map(|t| (t, t.read())).collect();
    let mut dst = dest.write();
    guards.extend(above.into_iter().map(|t| (t, t.read())));

    let tensor_src = source_of(&guards, primary);
    let other_src = match secondary {
        Secondary::Tensor(t) => source_of(&guards, t.tensor()),
        Secondary::Scalar(s) => Source::Scalar(*s),
    };
    let (lhs, rhs) = match call {
        CallShape::ScalarTensor => (other_src, tensor_src),
        CallShape::TensorTensor | CallShape::TensorScalar => (tensor_src, other_src),
    };

    if accumulate {
        accumulate_into(op, lhs, rhs, &mut dst)
    } else {
        apply_into(op, lhs, rhs, &mut dst)
    }
}

/// An operand with no read guard of its own is the destination.
fn source_of<'g>(guards: &'g [(&Tensor, RwLockReadGuard<'_, Buffer>)], t: &Tensor) -> Source<'g> {
    guards
        .iter()
        .find(|(held, _)| held.same(t))
        .map_or(Source::Dest, |(_, guard)| Source::Buffer(&**guard))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{prepare_dd, prepare_ds, prepare_sd, use_unsafe, with_incr, with_reuse};
    use memory_manager::MemoryBudget;
    use tensor_core::{DType, Scalar, Shape};

    fn vec_f64(values: &[f64]) -> Tensor {
        Tensor::from_slice(Shape::vector(values.len()), values).unwrap()
    }

    #[test]
    fn test_fresh_without_pool() {
        let a = vec_f64(&[1.0, 2.0]);
        let b = vec_f64(&[3.0, 4.0]);
        let out = dispatch(BinaryOp::Add, prepare_dd(&a, &b, &[]).unwrap(), None).unwrap();
        assert_eq!(out.path, ExecPath::Fresh);
        assert!(!out.aliased);
        assert_eq!(out.result.to_vec::<f64>().unwrap(), vec![4.0, 6.0]);
    }

    #[test]
    fn test_fresh_from_pool() {
        let pool = MemoryPool::new(MemoryBudget::from_mb(1));
        let a = vec_f64(&[1.0, 2.0]);
        let out = dispatch(
            BinaryOp::Mul,
            prepare_ds(&a, Scalar::F64(2.0), &[]).unwrap(),
            Some(&pool),
        )
        .unwrap();
        assert_eq!(out.result.to_vec::<f64>().unwrap(), vec![2.0, 4.0]);
        assert_eq!(pool.live_bytes(), 16);
    }

    #[test]
    fn test_in_place_sd_reverses_operands() {
        let b = vec_f64(&[2.0, 4.0]);
        let out = dispatch(
            BinaryOp::Sub,
            prepare_sd(Scalar::F64(10.0), &b, &[use_unsafe()]).unwrap(),
            None,
        )
        .unwrap();
        assert!(out.result.same(&b));
        assert!(out.aliased);
        assert_eq!(b.to_vec::<f64>().unwrap(), vec![8.0, 6.0]);
    }

    #[test]
    fn test_in_place_with_self() {
        let a = Tensor::from_vec(Shape::vector(3), vec![1i32, 2, 3]).unwrap();
        let p = prepare_dd(&a, &a, &[use_unsafe()]).unwrap();
        dispatch(BinaryOp::Mul, p, None).unwrap();
        assert_eq!(a.to_vec::<i32>().unwrap(), vec![1, 4, 9]);
    }

    #[test]
    fn test_reuse_into_b() {
        let a = vec_f64(&[1.0, 2.0]);
        let b = vec_f64(&[8.0, 8.0]);
        let p = prepare_dd(&a, &b, &[with_reuse(&b)]).unwrap();
        let out = dispatch(BinaryOp::Div, p, None).unwrap();
        assert!(out.result.same(&b));
        assert!(out.aliased);
        assert_eq!(b.to_vec::<f64>().unwrap(), vec![0.125, 0.25]);
    }

    #[test]
    fn test_increment_into_a_and_b_same() {
        let a = vec_f64(&[1.0, 2.0]);
        let p = prepare_dd(&a, &a, &[with_incr(&a)]).unwrap();
        dispatch(BinaryOp::Add, p, None).unwrap();
        // a + (a + a)
        assert_eq!(a.to_vec::<f64>().unwrap(), vec![3.0, 6.0]);
    }

    #[test]
    fn test_kernel_error_is_wrapped() {
        let a = Tensor::from_vec(Shape::vector(2), vec![1i64, 2]).unwrap();
        let err = dispatch(
            BinaryOp::Add,
            prepare_ds(&a, Scalar::F32(1.0), &[]).unwrap(),
            None,
        )
        .unwrap_err();
        assert!(matches!(
            err,
            ArithError::Kernel {
                op: BinaryOp::Add,
                call: CallShape::TensorScalar,
                path: ExecPath::Fresh,
                source: TensorError::ScalarTypeMismatch { .. },
            }
        ));
    }

    #[test]
    fn test_fresh_oom() {
        let pool = MemoryPool::new(MemoryBudget::from_bytes(8));
        let a = Tensor::zeros(Shape::vector(4), DType::F32);
        let err = dispatch(BinaryOp::Add, prepare_dd(&a, &a, &[]).unwrap(), Some(&pool))
            .unwrap_err();
        assert!(matches!(err, ArithError::Allocation(_)));
    }

    #[test]
    fn test_crossed_destinations_across_threads() {
        let x = vec_f64(&[1.0; 64]);
        let y = vec_f64(&[2.0; 64]);
        let workers: Vec<_> = [(x.clone(), y.clone()), (y.clone(), x.clone())]
            .into_iter()
            .map(|(dest, other)| {
                std::thread::spawn(move || {
                    for _ in 0..200 {
                        let p = prepare_dd(&dest, &other, &[use_unsafe()]).unwrap();
                        dispatch(BinaryOp::Mul, p, None).unwrap();
                        let p = prepare_dd(&dest, &other, &[use_unsafe()]).unwrap();
                        dispatch(BinaryOp::Div, p, None).unwrap();
                    }
                })
            })
            .collect();
        for w in workers {
            w.join().unwrap();
        }
        assert_eq!(x.num_elements(), 64);
    }
}
