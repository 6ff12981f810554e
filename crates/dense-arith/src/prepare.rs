// Copyright (c) 2025 Dimitris Kafetzis
//
// Licensed under the MIT License.
// See LICENSE file in the project root for full license information.
//
// SPDX-License-Identifier: MIT

//! Operand preparation.
//!
//! Checks that operands can be computed on, that tensor-tensor shapes
//! agree, and normalises the execution options into an [`ExecMode`].
//! Nothing here touches tensor data.

use crate::{parse_options, ArithError, CallShape, ExecMode, FuncOpt};
use tensor_core::{NumericTensor, Scalar, Tensor};

/// The operand that does not define the result shape.
#[derive(Debug, Clone)]
pub enum Secondary {
    Tensor(NumericTensor),
    Scalar(Scalar),
}

/// Operands and mode of a call that passed every preparation check.
///
/// The *primary* operand defines the result shape and element type: `a`
/// for tensor-tensor and tensor-scalar calls, `b` for scalar-tensor calls.
#[derive(Debug, Clone)]
pub struct Prepared {
    pub(crate) call: CallShape,
    pub(crate) primary: NumericTensor,
    pub(crate) secondary: Secondary,
    pub(crate) mode: ExecMode,
}

impl Prepared {
    pub fn call(&self) -> CallShape {
        self.call
    }

    pub fn primary(&self) -> &NumericTensor {
        &self.primary
    }

    pub fn secondary(&self) -> &Secondary {
        &self.secondary
    }

    pub fn mode(&self) -> &ExecMode {
        &self.mode
    }
}

/// Prepares a tensor-tensor call. Operand `a` is checked before `b`.
pub fn prepare_dd(a: &Tensor, b: &Tensor, opts: &[FuncOpt]) -> Result<Prepared, ArithError> {
    let a = numeric_operand("a", a)?;
    let b = numeric_operand("b", b)?;
    if a.shape() != b.shape() {
        return Err(ArithError::ShapeMismatch {
            lhs: a.shape().clone(),
            rhs: b.shape().clone(),
        });
    }

    let mode = ExecMode::from_options(parse_options(opts), &a)?;
    Ok(Prepared {
        call: CallShape::TensorTensor,
        primary: a,
        secondary: Secondary::Tensor(b),
        mode,
    })
}

/// Prepares a tensor-scalar call.
pub fn prepare_ds(a: &Tensor, s: Scalar, opts: &[FuncOpt]) -> Result<Prepared, ArithError> {
    prepare_mixed(CallShape::TensorScalar, numeric_operand("a", a)?, s, opts)
}

/// Prepares a scalar-tensor call.
pub fn prepare_sd(s: Scalar, b: &Tensor, opts: &[FuncOpt]) -> Result<Prepared, ArithError> {
    prepare_mixed(CallShape::ScalarTensor, numeric_operand("b", b)?, s, opts)
}

fn prepare_mixed(
    call: CallShape,
    tensor: NumericTensor,
    scalar: Scalar,
    opts: &[FuncOpt],
) -> Result<Prepared, ArithError> {
    let mode = ExecMode::from_options(parse_options(opts), &tensor)?;
    Ok(Prepared {
        call,
        primary: tensor,
        secondary: Secondary::Scalar(scalar),
        mode,
    })
}

fn numeric_operand(operand: &'static str, t: &Tensor) -> Result<NumericTensor, ArithError> {
    t.numeric().ok_or_else(|| ArithError::UnsupportedOperand {
        operand,
        found: format!("{} storage", t.dtype()),
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{use_unsafe, with_reuse, ExecPath};
    use tensor_core::{DType, Shape};

    fn packed(n: usize) -> Tensor {
        Tensor::from_packed(Shape::vector(n), DType::BF16, vec![0; 2 * n]).unwrap()
    }

    #[test]
    fn test_dd_primary_is_a() {
        let a = Tensor::zeros(Shape::vector(3), DType::I32);
        let b = Tensor::zeros(Shape::vector(3), DType::I32);
        let p = prepare_dd(&a, &b, &[]).unwrap();
        assert_eq!(p.call(), CallShape::TensorTensor);
        assert!(p.primary().tensor().same(&a));
        assert!(matches!(p.secondary(), Secondary::Tensor(t) if t.tensor().same(&b)));
        assert_eq!(p.mode().path(), ExecPath::Fresh);
    }

    #[test]
    fn test_sd_primary_is_b() {
        let b = Tensor::zeros(Shape::vector(3), DType::F64);
        let p = prepare_sd(Scalar::F64(2.0), &b, &[use_unsafe()]).unwrap();
        assert_eq!(p.call(), CallShape::ScalarTensor);
        assert!(p.primary().tensor().same(&b));
        assert_eq!(p.mode().path(), ExecPath::InPlace);
    }

    #[test]
    fn test_unsupported_a_reported_first() {
        let err = prepare_dd(&packed(2), &packed(3), &[]).unwrap_err();
        assert!(matches!(err, ArithError::UnsupportedOperand { operand: "a", .. }));
    }

    #[test]
    fn test_unsupported_b() {
        let a = Tensor::zeros(Shape::vector(2), DType::F32);
        let err = prepare_dd(&a, &packed(2), &[]).unwrap_err();
        assert!(matches!(err, ArithError::UnsupportedOperand { operand: "b", .. }));
        assert!(err.to_string().contains("bf16"));

        let err = prepare_sd(Scalar::F32(1.0), &packed(2), &[]).unwrap_err();
        assert!(matches!(err, ArithError::UnsupportedOperand { operand: "b", .. }));
    }

    #[test]
    fn test_shape_mismatch() {
        let a = Tensor::zeros(Shape::matrix(2, 3), DType::F32);
        let b = Tensor::zeros(Shape::matrix(3, 2), DType::F32);
        let err = prepare_dd(&a, &b, &[]).unwrap_err();
        assert!(matches!(err, ArithError::ShapeMismatch { .. }));
    }

    #[test]
    fn test_reuse_checked_against_tensor_operand() {
        let a = Tensor::zeros(Shape::matrix(2, 2), DType::I64);
        let target = Tensor::zeros(Shape::vector(4), DType::I64);
        let err = prepare_ds(&a, Scalar::I64(1), &[with_reuse(&target)]).unwrap_err();
        assert!(matches!(err, ArithError::ReuseShapeMismatch { .. }));
    }
}
