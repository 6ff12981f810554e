// Copyright (c) 2025 Dimitris Kafetzis
//
// Licensed under the MIT License.
// See LICENSE file in the project root for full license information.
//
// SPDX-License-Identifier: MIT

//! The arithmetic context and its public entry points.

use crate::{
    dispatch, prepare_dd, prepare_ds, prepare_sd, ArithConfig, ArithError, DispatchStats, FuncOpt,
};
use memory_manager::{MemoryBudget, MemoryPool};
use std::sync::{Mutex, OnceLock};
use tensor_core::{BinaryOp, Scalar, Tensor};

/// Budget of the process-wide context returned by [`global`].
pub const DEFAULT_BUDGET_MB: usize = 512;

/// One side of a binary operation.
#[derive(Debug, Clone, Copy)]
pub enum Operand<'a> {
    Tensor(&'a Tensor),
    Scalar(Scalar),
}

impl<'a> From<&'a Tensor> for Operand<'a> {
    fn from(t: &'a Tensor) -> Self {
        Operand::Tensor(t)
    }
}

impl From<Scalar> for Operand<'_> {
    fn from(s: Scalar) -> Self {
        Operand::Scalar(s)
    }
}

/// Owns the result-buffer pool and dispatch statistics.
///
/// Every entry point takes a list of [`FuncOpt`]s selecting where the
/// result goes. With none, the result is a new tensor and the inputs are
/// untouched.
///
/// # Example
/// ```
/// use dense_arith::{use_unsafe, Arith};
/// use tensor_core::{Shape, Tensor};
///
/// let arith = Arith::unpooled();
/// let a = Tensor::from_f32(Shape::vector(4), &[1.0, 2.0, 3.0, 4.0]).unwrap();
/// let b = Tensor::from_f32(Shape::vector(4), &[10.0; 4]).unwrap();
///
/// let c = arith.add(&a, &b, &[]).unwrap();
/// assert_eq!(c.to_vec::<f32>().unwrap(), vec![11.0, 12.0, 13.0, 14.0]);
///
/// let same = arith.add(&a, &b, &[use_unsafe()]).unwrap();
/// assert!(same.same(&a));
/// ```
pub struct Arith {
    pool: Option<MemoryPool>,
    stats: Mutex<DispatchStats>,
    collect_stats: bool,
}

impl Arith {
    /// Builds a context from configuration.
    pub fn new(config: &ArithConfig) -> Result<Self, ArithError> {
        let budget = config.parse_budget()?;
        let pool = config.recycle_buffers.then(|| MemoryPool::new(budget));
        tracing::info!(
            %budget,
            recycle = config.recycle_buffers,
            stats = config.collect_stats,
            "arithmetic context ready"
        );
        Ok(Self {
            pool,
            stats: Mutex::new(DispatchStats::default()),
            collect_stats: config.collect_stats,
        })
    }

    /// Builds a context that serves fresh results from `pool`.
    pub fn with_pool(pool: MemoryPool) -> Self {
        Self {
            pool: Some(pool),
            stats: Mutex::new(DispatchStats::default()),
            collect_stats: true,
        }
    }

    /// Builds a context that allocates every fresh result on the heap.
    pub fn unpooled() -> Self {
        Self {
            pool: None,
            stats: Mutex::new(DispatchStats::default()),
            collect_stats: true,
        }
    }

    pub fn pool(&self) -> Option<&MemoryPool> {
        self.pool.as_ref()
    }

    /// Returns a snapshot of the dispatch statistics.
    pub fn stats(&self) -> DispatchStats {
        self.stats
            .lock()
            .map(|s| s.clone())
            .unwrap_or_default()
    }

    pub fn reset_stats(&self) {
        if let Ok(mut stats) = self.stats.lock() {
            *stats = DispatchStats::default();
        }
    }

    /// Runs `op` on any combination of tensor and scalar operands except
    /// two scalars.
    pub fn binary(
        &self,
        op: BinaryOp,
        lhs: Operand<'_>,
        rhs: Operand<'_>,
        opts: &[FuncOpt],
    ) -> Result<Tensor, ArithError> {
        let prepared = match (lhs, rhs) {
            (Operand::Tensor(a), Operand::Tensor(b)) => prepare_dd(a, b, opts),
            (Operand::Tensor(a), Operand::Scalar(s)) => prepare_ds(a, s, opts),
            (Operand::Scalar(s), Operand::Tensor(b)) => prepare_sd(s, b, opts),
            (Operand::Scalar(s), Operand::Scalar(_)) => Err(ArithError::UnsupportedOperand {
                operand: "a",
                found: format!("scalar {s}"),
            }),
        };

        match prepared.and_then(|p| dispatch(op, p, self.pool.as_ref())) {
            Ok(done) => {
                self.with_stats(|s| s.record(op, done.path, done.aliased));
                Ok(done.result)
            }
            Err(e) => {
                tracing::debug!(%op, error = %e, "dispatch rejected");
                self.with_stats(DispatchStats::record_failure);
                Err(e)
            }
        }
    }

    fn with_stats(&self, f: impl FnOnce(&mut DispatchStats)) {
        if !self.collect_stats {
            return;
        }
        if let Ok(mut stats) = self.stats.lock() {
            f(&mut stats);
        }
    }
}

impl std::fmt::Debug for Arith {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Arith")
            .field("pool", &self.pool)
            .field("collect_stats", &self.collect_stats)
            .finish()
    }
}

/// Returns the process-wide context used by the free functions.
///
/// It pools fresh results under a [`DEFAULT_BUDGET_MB`] budget and
/// collects statistics.
pub fn global() -> &'static Arith {
    static GLOBAL: OnceLock<Arith> = OnceLock::new();
    GLOBAL.get_or_init(|| Arith::with_pool(MemoryPool::new(MemoryBudget::from_mb(DEFAULT_BUDGET_MB))))
}

macro_rules! entry_points {
    ($($variant:ident => $dd:ident, $ds:ident, $sd:ident, $dd_fn:ident, $ds_fn:ident, $sd_fn:ident;)*) => {
        impl Arith {
            $(
                #[doc = concat!("`a ", stringify!($dd), " b` for two tensors of the same shape.")]
                pub fn $dd(&self, a: &Tensor, b: &Tensor, opts: &[FuncOpt]) -> Result<Tensor, ArithError> {
                    self.binary(BinaryOp::$variant, Operand::Tensor(a), Operand::Tensor(b), opts)
                }

                #[doc = concat!("`a ", stringify!($dd), " s` with the scalar on the right.")]
                pub fn $ds(&self, a: &Tensor, s: impl Into<Scalar>, opts: &[FuncOpt]) -> Result<Tensor, ArithError> {
                    self.binary(BinaryOp::$variant, Operand::Tensor(a), Operand::Scalar(s.into()), opts)
                }

                #[doc = concat!("`s ", stringify!($dd), " b` with the scalar on the left.")]
                pub fn $sd(&self, s: impl Into<Scalar>, b: &Tensor, opts: &[FuncOpt]) -> Result<Tensor, ArithError> {
                    self.binary(BinaryOp::$variant, Operand::Scalar(s.into()), Operand::Tensor(b), opts)
                }
            )*
        }

        $(
            #[doc = concat!("[`Arith::", stringify!($dd), "`] on the [`global`] context.")]
            pub fn $dd_fn(a: &Tensor, b: &Tensor, opts: &[FuncOpt]) -> Result<Tensor, ArithError> {
                global().$dd(a, b, opts)
            }

            #[doc = concat!("[`Arith::", stringify!($ds), "`] on the [`global`] context.")]
            pub fn $ds_fn(a: &Tensor, s: impl Into<Scalar>, opts: &[FuncOpt]) -> Result<Tensor, ArithError> {
                global().$ds(a, s, opts)
            }

            #[doc = concat!("[`Arith::", stringify!($sd), "`] on the [`global`] context.")]
            pub fn $sd_fn(s: impl Into<Scalar>, b: &Tensor, opts: &[FuncOpt]) -> Result<Tensor, ArithError> {
                global().$sd(s, b, opts)
            }
        )*
    };
}

entry_points! {
    Add => add, add_scalar, scalar_add, add_dd, add_ds, add_sd;
    Sub => sub, sub_scalar, scalar_sub, sub_dd, sub_ds, sub_sd;
    Mul => mul, mul_scalar, scalar_mul, mul_dd, mul_ds, mul_sd;
    Div => div, div_scalar, scalar_div, div_dd, div_ds, div_sd;
    Pow => pow, pow_scalar, scalar_pow, pow_dd, pow_ds, pow_sd;
}
