// Copyright (c) 2025 Dimitris Kafetzis
//
// Licensed under the MIT License.
// See LICENSE file in the project root for full license information.
//
// SPDX-License-Identifier: MIT

//! # tensor-core
//!
//! Dense tensor storage and elementwise arithmetic kernels.
//!
//! This crate provides:
//! - [`Tensor`]: a shared handle to a dense, n-dimensional tensor whose
//!   contiguous buffer sits behind a reader/writer lock.
//! - [`NumericTensor`]: proof that a tensor's storage supports arithmetic.
//! - [`Shape`], [`DType`], [`Scalar`] and [`Buffer`].
//! - [`Numeric`]: the element capability implemented for `f32`, `f64`,
//!   `i32` and `i64`.
//! - [`ops`]: the add/sub/mul/div/pow kernels in writing, mutating and
//!   accumulating forms.
//! - [`Recycler`]: the hook through which an allocator gets buffers back.
//!
//! # Design Goals
//! - Kernels never allocate; they write into a caller-chosen buffer.
//! - Kernels validate before writing, so failures leave no partial state.
//! - Clean error types via `thiserror`.

mod buffer;
mod dtype;
mod element;
mod error;
pub mod ops;
mod scalar;
mod shape;
mod tensor;

pub use buffer::Buffer;
pub use dtype::DType;
pub use element::{DomainFault, Numeric};
pub use error::TensorError;
pub use ops::BinaryOp;
pub use scalar::Scalar;
pub use shape::Shape;
pub use tensor::{NumericTensor, Recycler, Tensor};
