// Copyright (c) 2025 Dimitris Kafetzis
//
// Licensed under the MIT License.
// See LICENSE file in the project root for full license information.
//
// SPDX-License-Identifier: MIT

//! Error types for tensor construction and kernel execution.

use crate::{DType, Shape};

/// Errors that can occur while building tensors or running kernels.
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum TensorError {
    /// The provided data does not match the element count of the shape.
    #[error("buffer size mismatch for shape {shape}: expected {expected} elements, got {actual}")]
    BufferSizeMismatch {
        shape: Shape,
        expected: usize,
        actual: usize,
    },

    /// The data type is not supported for this operation.
    #[error("unsupported dtype {dtype} for {op}")]
    UnsupportedDType { op: &'static str, dtype: DType },

    /// An operand buffer does not hold the destination's element type.
    #[error("{op}: operand dtype {actual} does not match destination dtype {expected}")]
    DTypeMismatch {
        op: &'static str,
        expected: DType,
        actual: DType,
    },

    /// A scalar operand does not match the tensor element type.
    #[error("{op}: scalar of type {actual} cannot be applied to {expected} elements")]
    ScalarTypeMismatch {
        op: &'static str,
        expected: DType,
        actual: DType,
    },

    /// An operand buffer has a different element count than the destination.
    #[error("{op}: operand has {actual} elements, destination has {expected}")]
    LengthMismatch {
        op: &'static str,
        expected: usize,
        actual: usize,
    },

    /// Integer division by zero.
    #[error("{op}: integer division by zero at element {index}")]
    DivisionByZero { op: &'static str, index: usize },

    /// Integer power with a negative exponent.
    #[error("{op}: negative integer exponent at element {index}")]
    NegativeExponent { op: &'static str, index: usize },

    /// Integer power with an exponent too large to evaluate.
    #[error("{op}: integer exponent out of range at element {index}")]
    ExponentOverflow { op: &'static str, index: usize },
}
