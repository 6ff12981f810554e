// Copyright (c) 2025 Dimitris Kafetzis
//
// Licensed under the MIT License.
// See LICENSE file in the project root for full license information.
//
// SPDX-License-Identifier: MIT

//! Execution modes and the call shapes they are dispatched for.
//!
//! Parsed options are normalised exactly once into an [`ExecMode`]. Each
//! variant carries only what its path needs, so the dispatcher never sees
//! a flag combination it cannot act on.
//!
//! | `incr` | reuse target | `safe` | mode        |
//! |--------|--------------|--------|-------------|
//! | yes    | present      | any    | `Increment` |
//! | no     | present      | any    | `Reuse`     |
//! | no     | absent       | yes    | `Fresh`     |
//! | no     | absent       | no     | `InPlace`   |
//! | yes    | absent       | any    | error       |

use crate::{ArithError, ParsedOptions};
use std::fmt;
use tensor_core::{NumericTensor, Tensor};

/// The position of tensors and scalars in a call.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, serde::Serialize)]
pub enum CallShape {
    /// Tensor with tensor.
    TensorTensor,
    /// Tensor with scalar.
    TensorScalar,
    /// Scalar with tensor.
    ScalarTensor,
}

impl CallShape {
    /// Returns the short suffix used in entry point names.
    pub fn as_str(self) -> &'static str {
        match self {
            CallShape::TensorTensor => "DD",
            CallShape::TensorScalar => "DS",
            CallShape::ScalarTensor => "SD",
        }
    }
}

impl fmt::Display for CallShape {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// The path a dispatch takes, without the data it carries.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, serde::Serialize)]
pub enum ExecPath {
    Increment,
    Reuse,
    Fresh,
    InPlace,
}

impl ExecPath {
    pub fn name(self) -> &'static str {
        match self {
            ExecPath::Increment => "increment",
            ExecPath::Reuse => "reuse",
            ExecPath::Fresh => "fresh",
            ExecPath::InPlace => "in-place",
        }
    }
}

impl fmt::Display for ExecPath {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// Where the result of a call goes.
#[derive(Debug, Clone)]
pub enum ExecMode {
    /// `target += a OP b`; returns the target.
    Increment(NumericTensor),
    /// `target = a OP b`; returns the target.
    Reuse(NumericTensor),
    /// Result goes into a newly allocated tensor.
    Fresh,
    /// Result overwrites the shape-defining operand.
    InPlace,
}

impl ExecMode {
    /// Normalises parsed options against the shape-defining operand.
    ///
    /// A reuse target is checked for shape first, then element type.
    pub fn from_options(
        parsed: ParsedOptions,
        operand: &NumericTensor,
    ) -> Result<Self, ArithError> {
        let ParsedOptions { safe, incr, reuse } = parsed;
        let target = reuse
            .as_ref()
            .map(|t| check_reuse(t, operand))
            .transpose()?;

        match (incr, target) {
            (true, Some(target)) => Ok(ExecMode::Increment(target)),
            (true, None) => Err(ArithError::UnreachableState {
                safe,
                incr,
                reuse: false,
            }),
            (false, Some(target)) => Ok(ExecMode::Reuse(target)),
            (false, None) if safe => Ok(ExecMode::Fresh),
            (false, None) => Ok(ExecMode::InPlace),
        }
    }

    pub fn path(&self) -> ExecPath {
        match self {
            ExecMode::Increment(_) => ExecPath::Increment,
            ExecMode::Reuse(_) => ExecPath::Reuse,
            ExecMode::Fresh => ExecPath::Fresh,
            ExecMode::InPlace => ExecPath::InPlace,
        }
    }

    /// Returns the caller-supplied destination, if any.
    pub fn target(&self) -> Option<&NumericTensor> {
        match self {
            ExecMode::Increment(t) | ExecMode::Reuse(t) => Some(t),
            ExecMode::Fresh | ExecMode::InPlace => None,
        }
    }
}

fn check_reuse(target: &Tensor, operand: &NumericTensor) -> Result<NumericTensor, ArithError> {
    if target.shape() != operand.shape() {
        return Err(ArithError::ReuseShapeMismatch {
            expected: operand.shape().clone(),
            actual: target.shape().clone(),
        });
    }
    match target.numeric() {
        Some(numeric) if numeric.dtype() == operand.dtype() => Ok(numeric),
        _ => Err(ArithError::ReuseTypeMismatch {
            expected: operand.dtype(),
            actual: target.dtype(),
        }),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{parse_options, use_unsafe, with_incr, with_reuse};
    use tensor_core::{DType, Shape};

    fn operand() -> NumericTensor {
        Tensor::zeros(Shape::matrix(2, 2), DType::F32)
            .numeric()
            .unwrap()
    }

    fn mode(opts: &[crate::FuncOpt]) -> Result<ExecMode, ArithError> {
        ExecMode::from_options(parse_options(opts), &operand())
    }

    #[test]
    fn test_default_is_fresh() {
        assert_eq!(mode(&[]).unwrap().path(), ExecPath::Fresh);
    }

    #[test]
    fn test_unsafe_is_in_place() {
        assert_eq!(mode(&[use_unsafe()]).unwrap().path(), ExecPath::InPlace);
    }

    #[test]
    fn test_reuse_wins_over_unsafe() {
        let t = Tensor::zeros(Shape::matrix(2, 2), DType::F32);
        let m = mode(&[use_unsafe(), with_reuse(&t)]).unwrap();
        assert_eq!(m.path(), ExecPath::Reuse);
        assert!(m.target().unwrap().tensor().same(&t));
    }

    #[test]
    fn test_incr_wins_over_everything() {
        let t = Tensor::zeros(Shape::matrix(2, 2), DType::F32);
        let m = mode(&[use_unsafe(), with_incr(&t)]).unwrap();
        assert_eq!(m.path(), ExecPath::Increment);
    }

    #[test]
    fn test_reuse_shape_checked_before_type() {
        let t = Tensor::zeros(Shape::vector(4), DType::I64);
        let err = mode(&[with_reuse(&t)]).unwrap_err();
        assert!(matches!(err, ArithError::ReuseShapeMismatch { .. }));
    }

    #[test]
    fn test_reuse_type_mismatch() {
        let t = Tensor::zeros(Shape::matrix(2, 2), DType::F64);
        let err = mode(&[with_reuse(&t)]).unwrap_err();
        assert!(matches!(
            err,
            ArithError::ReuseTypeMismatch {
                expected: DType::F32,
                actual: DType::F64
            }
        ));
    }

    #[test]
    fn test_packed_reuse_target_rejected() {
        let t = Tensor::from_packed(Shape::matrix(2, 2), DType::F16, vec![0; 8]).unwrap();
        let err = mode(&[with_incr(&t)]).unwrap_err();
        assert!(matches!(err, ArithError::ReuseTypeMismatch { .. }));
    }

    #[test]
    fn test_incr_without_target_is_unreachable() {
        let parsed = ParsedOptions {
            safe: false,
            incr: true,
            reuse: None,
        };
        let err = ExecMode::from_options(parsed, &operand()).unwrap_err();
        assert!(matches!(
            err,
            ArithError::UnreachableState {
                safe: false,
                incr: true,
                reuse: false
            }
        ));
    }

    #[test]
    fn test_display() {
        assert_eq!(CallShape::ScalarTensor.to_string(), "SD");
        assert_eq!(ExecPath::InPlace.to_string(), "in-place");
    }
}
