// Copyright (c) 2025 Dimitris Kafetzis
//
// Licensed under the MIT License.
// See LICENSE file in the project root for full license information.
//
// SPDX-License-Identifier: MIT

//! Dispatch statistics.
//!
//! [`DispatchStats`] counts which execution path each call took. It is
//! the quickest way to see whether callers actually hit the reuse and
//! in-place paths or allocate on every call.

use crate::ExecPath;
use std::collections::BTreeMap;
use tensor_core::BinaryOp;

/// Cumulative per-path and per-operation counters.
#[derive(Debug, Clone, Default, PartialEq, Eq, serde::Serialize)]
pub struct DispatchStats {
    pub fresh: u64,
    pub reuse: u64,
    pub increment: u64,
    pub in_place: u64,
    /// Dispatches whose destination was one of the operands.
    pub aliased: u64,
    /// Calls rejected during preparation or by the kernel.
    pub failures: u64,
    /// Successful dispatches per operation name.
    pub per_op: BTreeMap<&'static str, u64>,
}

impl DispatchStats {
    /// Records one successful dispatch.
    pub fn record(&mut self, op: BinaryOp, path: ExecPath, aliased: bool) {
        let counter = match path {
            ExecPath::Fresh => &mut self.fresh,
            ExecPath::Reuse => &mut self.reuse,
            ExecPath::Increment => &mut self.increment,
            ExecPath::InPlace => &mut self.in_place,
        };
        *counter += 1;
        if aliased {
            self.aliased += 1;
        }
        *self.per_op.entry(op.name()).or_insert(0) += 1;
    }

    pub fn record_failure(&mut self) {
        self.failures += 1;
    }

    /// Number of successful dispatches.
    pub fn total(&self) -> u64 {
        self.fresh + self.reuse + self.increment + self.in_place
    }

    /// Returns a one-line human-readable summary.
    pub fn summary(&self) -> String {
        format!(
            "{} dispatches ({} fresh, {} reuse, {} increment, {} in-place), {} aliased, {} failed",
            self.total(),
            self.fresh,
            self.reuse,
            self.increment,
            self.in_place,
            self.aliased,
            self.failures,
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_record_paths() {
        let mut s = DispatchStats::default();
        s.record(BinaryOp::Add, ExecPath::Fresh, false);
        s.record(BinaryOp::Add, ExecPath::InPlace, true);
        s.record(BinaryOp::Pow, ExecPath::Increment, false);
        s.record_failure();

        assert_eq!(s.total(), 3);
        assert_eq!(s.aliased, 1);
        assert_eq!(s.failures, 1);
        assert_eq!(s.per_op.get("add"), Some(&2));
        assert_eq!(s.per_op.get("pow"), Some(&1));
    }

    #[test]
    fn test_summary() {
        let mut s = DispatchStats::default();
        s.record(BinaryOp::Mul, ExecPath::Reuse, false);
        assert_eq!(
            s.summary(),
            "1 dispatches (0 fresh, 1 reuse, 0 increment, 0 in-place), 0 aliased, 0 failed"
        );
    }

    #[test]
    fn test_serialize() {
        let mut s = DispatchStats::default();
        s.record(BinaryOp::Div, ExecPath::Fresh, false);
        let json = serde_json::to_value(&s).unwrap();
        assert_eq!(json["fresh"], 1);
        assert_eq!(json["per_op"]["div"], 1);
    }
}
