// Copyright (c) 2025 Dimitris Kafetzis
//
// Licensed under the MIT License.
// See LICENSE file in the project root for full license information.
//
// SPDX-License-Identifier: MIT

//! Error types for elementwise arithmetic dispatch.

use crate::{CallShape, ExecPath};
use tensor_core::{BinaryOp, DType, Shape};

/// Errors that can occur while preparing or dispatching an operation.
#[derive(Debug, thiserror::Error)]
pub enum ArithError {
    /// An operand is not a tensor with numeric storage.
    #[error("operand {operand} is not a numeric dense tensor (found {found})")]
    UnsupportedOperand { operand: &'static str, found: String },

    /// Tensor-tensor operands have different shapes.
    #[error("shape mismatch: {lhs} vs {rhs}")]
    ShapeMismatch { lhs: Shape, rhs: Shape },

    /// The reuse target's shape differs from the operand shape.
    #[error("reuse target has shape {actual}, expected {expected}")]
    ReuseShapeMismatch { expected: Shape, actual: Shape },

    /// The reuse target is not numeric or holds a different element type.
    #[error("reuse target has element type {actual}, expected {expected}")]
    ReuseTypeMismatch { expected: DType, actual: DType },

    /// The elementwise kernel rejected the operands.
    #[error("{op}{call} failed on {path} path: {source}")]
    Kernel {
        op: BinaryOp,
        call: CallShape,
        path: ExecPath,
        #[source]
        source: tensor_core::TensorError,
    },

    /// The execution flags describe no valid path.
    #[error("unknown state reached: safe {safe}, incr {incr}, reuse {reuse}")]
    UnreachableState { safe: bool, incr: bool, reuse: bool },

    /// The allocator could not provide a result buffer.
    #[error("allocation failed: {0}")]
    Allocation(#[from] memory_manager::MemoryError),

    /// Configuration error.
    #[error("configuration error: {0}")]
    Config(String),
}

#[cfg(test)]
mod tests {
    use super::*;
    use tensor_core::TensorError;

    #[test]
    fn test_kernel_message_names_op_call_and_path() {
        let err = ArithError::Kernel {
            op: BinaryOp::Div,
            call: CallShape::TensorScalar,
            path: ExecPath::Fresh,
            source: TensorError::DivisionByZero { op: "div", index: 0 },
        };
        let text = err.to_string();
        assert!(text.starts_with("divDS failed on fresh path"), "{text}");
        assert!(std::error::Error::source(&err).is_some());
    }

    #[test]
    fn test_shape_mismatch_message() {
        let err = ArithError::ShapeMismatch {
            lhs: Shape::matrix(2, 3),
            rhs: Shape::matrix(3, 2),
        };
        assert_eq!(err.to_string(), "shape mismatch: [2, 3] vs [3, 2]");
    }
}
