// Copyright (c) 2025 Dimitris Kafetzis
//
// Licensed under the MIT License.
// See LICENSE file in the project root for full license information.
//
// SPDX-License-Identifier: MIT

//! # dense-arith
//!
//! Elementwise add, sub, mul, div and pow on dense tensors, in three call
//! shapes: tensor with tensor (DD), tensor with scalar (DS) and scalar
//! with tensor (SD).
//!
//! Every call goes through the same two stages:
//!
//! ```text
//! operands + [FuncOpt]
//!       │  prepare_dd / prepare_ds / prepare_sd
//!       ▼
//!   Prepared { call, primary, secondary, ExecMode }
//!       │  dispatch(op, prepared, pool)
//!       ▼
//!   result tensor
//! ```
//!
//! # Execution Modes
//! - **Fresh** (default): the result is a new tensor from the pool.
//! - **InPlace** ([`use_unsafe`]): the shape-defining operand is
//!   overwritten and returned.
//! - **Reuse** ([`with_reuse`]): the result is written into a
//!   caller-supplied tensor.
//! - **Increment** ([`with_incr`]): the result is added into a
//!   caller-supplied tensor.
//!
//! A destination may be one of the operands; the result is the same as
//! if it were a separate copy.
//!
//! # Entry Points
//! [`Arith`] exposes `add`, `add_scalar`, `scalar_add` and the same trio
//! for `sub`, `mul`, `div` and `pow`. The free functions `add_dd`,
//! `add_ds`, `add_sd`, … run on the process-wide [`global`] context.

mod arith;
mod config;
mod dispatch;
mod error;
mod mode;
mod options;
mod prepare;
mod stats;

pub use arith::{
    add_dd, add_ds, add_sd, div_dd, div_ds, div_sd, global, mul_dd, mul_ds, mul_sd, pow_dd,
    pow_ds, pow_sd, sub_dd, sub_ds, sub_sd, Arith, Operand, DEFAULT_BUDGET_MB,
};
pub use config::ArithConfig;
pub use dispatch::{dispatch, Dispatched};
pub use error::ArithError;
pub use mode::{CallShape, ExecMode, ExecPath};
pub use options::{parse_options, use_unsafe, with_incr, with_reuse, FuncOpt, ParsedOptions};
pub use prepare::{prepare_dd, prepare_ds, prepare_sd, Prepared, Secondary};
pub use stats::DispatchStats;
