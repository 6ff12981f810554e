// Copyright (c) 2025 Dimitris Kafetzis
//
// Licensed under the MIT License.
// See LICENSE file in the project root for full license information.
//
// SPDX-License-Identifier: MIT

//! Allocation statistics for the recycling pool.

/// Cumulative counters describing how well the free list is doing.
#[derive(Debug, Clone, Default, PartialEq, Eq, serde::Serialize)]
pub struct AllocationStats {
    /// Number of `recycle` requests, including failed ones.
    pub requests: u64,
    /// Requests served from a reclaimed buffer.
    pub cache_hits: u64,
    /// Requests that needed a fresh heap allocation.
    pub cache_misses: u64,
    /// Requests rejected because of the budget.
    pub oom_count: u64,
    /// Buffers handed back by dropped tensors.
    pub reclaimed: u64,
    /// High-water mark of live bytes.
    pub peak_live_bytes: usize,
    /// Sum of bytes handed out over the pool's lifetime.
    pub bytes_served: u64,
}

impl AllocationStats {
    /// Fraction of successful requests served from the free list, in `[0, 1]`.
    pub fn hit_ratio(&self) -> f64 {
        let served = self.cache_hits + self.cache_misses;
        if served == 0 {
            0.0
        } else {
            self.cache_hits as f64 / served as f64
        }
    }

    pub(crate) fn record_served(&mut self, bytes: usize, hit: bool, live_bytes: usize) {
        self.requests += 1;
        if hit {
            self.cache_hits += 1;
        } else {
            self.cache_misses += 1;
        }
        self.bytes_served += bytes as u64;
        self.peak_live_bytes = self.peak_live_bytes.max(live_bytes);
    }

    pub(crate) fn record_oom(&mut self) {
        self.requests += 1;
        self.oom_count += 1;
    }

    pub(crate) fn record_reclaim(&mut self) {
        self.reclaimed += 1;
    }

    /// Returns a one-line human-readable summary.
    pub fn summary(&self) -> String {
        format!(
            "{} requests ({} hits, {} misses, {:.0}% hit rate), {} OOMs, {} reclaimed, peak {} bytes",
            self.requests,
            self.cache_hits,
            self.cache_misses,
            self.hit_ratio() * 100.0,
            self.oom_count,
            self.reclaimed,
            self.peak_live_bytes,
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_ratio() {
        assert_eq!(AllocationStats::default().hit_ratio(), 0.0);
    }

    #[test]
    fn test_ratio_ignores_oom() {
        let mut s = AllocationStats::default();
        s.record_served(100, true, 100);
        s.record_served(100, false, 200);
        s.record_oom();
        assert_eq!(s.requests, 3);
        assert!((s.hit_ratio() - 0.5).abs() < 1e-9);
    }

    #[test]
    fn test_peak_never_decreases() {
        let mut s = AllocationStats::default();
        s.record_served(10, false, 300);
        s.record_served(10, true, 50);
        assert_eq!(s.peak_live_bytes, 300);
        assert_eq!(s.bytes_served, 20);
    }

    #[test]
    fn test_summary() {
        let mut s = AllocationStats::default();
        s.record_served(64, false, 64);
        s.record_reclaim();
        let text = s.summary();
        assert!(text.contains("1 requests"));
        assert!(text.contains("1 reclaimed"));
    }
}
