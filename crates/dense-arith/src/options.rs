// Copyright (c) 2025 Dimitris Kafetzis
//
// Licensed under the MIT License.
// See LICENSE file in the project root for full license information.
//
// SPDX-License-Identifier: MIT

//! Execution options accepted by every arithmetic entry point.
//!
//! With no options a call is *safe*: the result lands in a freshly
//! allocated tensor and the inputs are left alone.
//!
//! ```
//! use dense_arith::{parse_options, use_unsafe, with_incr};
//! use tensor_core::{DType, Shape, Tensor};
//!
//! let acc = Tensor::zeros(Shape::vector(4), DType::F32);
//! let parsed = parse_options(&[use_unsafe(), with_incr(&acc)]);
//! assert!(!parsed.safe);
//! assert!(parsed.incr);
//! assert!(parsed.reuse.unwrap().same(&acc));
//! ```

use tensor_core::Tensor;

/// One execution option.
#[derive(Debug, Clone)]
pub enum FuncOpt {
    /// Mutate the shape-defining operand instead of allocating.
    Unsafe,
    /// Write the result into the given tensor.
    Reuse(Tensor),
    /// Add the result into the given tensor.
    Incr(Tensor),
}

/// Returns [`FuncOpt::Unsafe`].
pub fn use_unsafe() -> FuncOpt {
    FuncOpt::Unsafe
}

/// Returns [`FuncOpt::Reuse`] holding a handle to `target`.
pub fn with_reuse(target: &Tensor) -> FuncOpt {
    FuncOpt::Reuse(target.clone())
}

/// Returns [`FuncOpt::Incr`] holding a handle to `target`.
pub fn with_incr(target: &Tensor) -> FuncOpt {
    FuncOpt::Incr(target.clone())
}

/// The flags a list of [`FuncOpt`]s boils down to.
#[derive(Debug, Clone)]
pub struct ParsedOptions {
    pub safe: bool,
    pub incr: bool,
    pub reuse: Option<Tensor>,
}

impl Default for ParsedOptions {
    fn default() -> Self {
        Self {
            safe: true,
            incr: false,
            reuse: None,
        }
    }
}

/// Folds `opts` left to right; later options override earlier ones.
pub fn parse_options(opts: &[FuncOpt]) -> ParsedOptions {
    opts.iter()
        .fold(ParsedOptions::default(), |mut parsed, opt| {
            match opt {
                FuncOpt::Unsafe => parsed.safe = false,
                FuncOpt::Reuse(t) => parsed.reuse = Some(t.clone()),
                FuncOpt::Incr(t) => {
                    parsed.incr = true;
                    parsed.reuse = Some(t.clone());
                }
            }
            parsed
        })
}
