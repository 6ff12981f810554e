// Copyright (c) 2025 Dimitris Kafetzis
//
// Licensed under the MIT License.
// See LICENSE file in the project root for full license information.
//
// SPDX-License-Identifier: MIT

//! Error types for buffer allocation.

/// Errors that can occur during allocation or budget parsing.
#[derive(Debug, thiserror::Error)]
pub enum MemoryError {
    /// The requested allocation would exceed the memory budget.
    #[error("out of memory: requested {requested_bytes} bytes, but only {available_bytes} available (budget: {budget_bytes})")]
    OutOfMemory {
        requested_bytes: usize,
        available_bytes: usize,
        budget_bytes: usize,
    },

    /// A budget string could not be parsed or describes zero bytes.
    #[error("invalid memory budget '{input}': {reason}")]
    InvalidBudget { input: String, reason: &'static str },

    /// The recycled buffer could not be wrapped into a tensor.
    #[error("tensor construction failed: {0}")]
    Tensor(#[from] tensor_core::TensorError),
}
