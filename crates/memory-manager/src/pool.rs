// Copyright (c) 2025 Dimitris Kafetzis
//
// Licensed under the MIT License.
// See LICENSE file in the project root for full license information.
//
// SPDX-License-Identifier: MIT

//! Buffer-recycling tensor allocator with budget enforcement.
//!
//! The [`MemoryPool`] hands out zero-filled tensors. It:
//!
//! 1. Enforces a hard ceiling on live bytes; a request that would exceed
//!    the budget returns `Err(OutOfMemory)`.
//! 2. Keeps a free list of reclaimed buffers, binned by element type and
//!    size class, and prefers those over fresh heap allocations.
//! 3. Tracks allocation statistics.
//!
//! Tensors produced by [`MemoryPool::recycle`] carry a handle to the pool
//! state; when the last handle to such a tensor is dropped its buffer is
//! reclaimed into the free list.
//!
//! # Size Classes
//! A request is binned by the smallest power of two that is at least its
//! byte size and at least [`MIN_SIZE_CLASS`]. Fresh buffers reserve the
//! whole class so any later request in the same bin fits without growing.

use crate::{AllocationStats, MemoryBudget, MemoryError};
use std::collections::HashMap;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};
use tensor_core::{Buffer, DType, Recycler, Shape, Tensor};

/// Minimum size class: 4 KB. Anything smaller is rounded up.
pub const MIN_SIZE_CLASS: usize = 4096;

type BinKey = (DType, usize);

/// State shared between the pool and every tensor it has handed out.
struct PoolInner {
    budget: MemoryBudget,
    /// Bytes held by tensors that are still referenced.
    live_bytes: AtomicUsize,
    free_buffers: Mutex<HashMap<BinKey, Vec<Buffer>>>,
    /// Capacity in bytes of every buffer sitting in the free list.
    free_list_bytes: AtomicUsize,
    stats: Mutex<AllocationStats>,
}

impl Recycler for PoolInner {
    fn reclaim(&self, buffer: Buffer) {
        let bytes = buffer.size_bytes();
        self.live_bytes.fetch_sub(bytes, Ordering::AcqRel);

        if let Ok(mut stats) = self.stats.lock() {
            stats.record_reclaim();
        }

        let key = (buffer.dtype(), size_class_for(bytes));
        let cached = buffer.capacity() * buffer.dtype().size_bytes();
        if let Ok(mut free) = self.free_buffers.lock() {
            free.entry(key).or_default().push(buffer);
            self.free_list_bytes.fetch_add(cached, Ordering::AcqRel);
        }
    }
}

/// The buffer-recycling allocator for result tensors.
///
/// # Example
/// ```
/// use memory_manager::{MemoryBudget, MemoryPool};
/// use tensor_core::{DType, Shape};
///
/// let pool = MemoryPool::new(MemoryBudget::from_mb(64));
///
/// let t = pool.recycle(DType::F32, &Shape::vector(256)).unwrap();
/// assert_eq!(pool.live_bytes(), 1024);
///
/// // The buffer goes back to the free list when the tensor is dropped.
/// drop(t);
/// assert_eq!(pool.live_bytes(), 0);
/// let _again = pool.recycle(DType::F32, &Shape::vector(256)).unwrap();
/// assert_eq!(pool.stats().cache_hits, 1);
/// ```
pub struct MemoryPool {
    inner: Arc<PoolInner>,
}

impl MemoryPool {
    /// Creates a new pool with the given budget.
    pub fn new(budget: MemoryBudget) -> Self {
        Self {
            inner: Arc::new(PoolInner {
                budget,
                live_bytes: AtomicUsize::new(0),
                free_buffers: Mutex::new(HashMap::new()),
                free_list_bytes: AtomicUsize::new(0),
                stats: Mutex::new(AllocationStats::default()),
            }),
        }
    }

    /// Returns a zero-filled tensor of the requested type and shape.
    ///
    /// A reclaimed buffer from the matching bin is reused when one exists
    /// (cache hit); otherwise a new buffer is allocated (cache miss).
    /// Shapes with no elements are served without touching the pool.
    pub fn recycle(&self, dtype: DType, shape: &Shape) -> Result<Tensor, MemoryError> {
        let len = shape.num_elements();
        if len == 0 {
            return Ok(Tensor::zeros(shape.clone(), dtype));
        }

        let bytes = shape.size_bytes(dtype);
        let live = self.inner.live_bytes.load(Ordering::Acquire);
        let budget = self.inner.budget.as_bytes();
        if live.saturating_add(bytes) > budget {
            if let Ok(mut stats) = self.inner.stats.lock() {
                stats.record_oom();
            }
            tracing::warn!(%dtype, %shape, bytes, live, budget, "recycle request exceeds budget");
            return Err(MemoryError::OutOfMemory {
                requested_bytes: bytes,
                available_bytes: budget.saturating_sub(live),
                budget_bytes: budget,
            });
        }

        let class = size_class_for(bytes);
        let reclaimed = self
            .inner
            .free_buffers
            .lock()
            .ok()
            .and_then(|mut free| free.get_mut(&(dtype, class)).and_then(Vec::pop));
        let hit = reclaimed.is_some();

        let buffer = match reclaimed {
            Some(mut buffer) => {
                self.inner
                    .free_list_bytes
                    .fetch_sub(buffer.capacity() * dtype.size_bytes(), Ordering::AcqRel);
                buffer.reset_zeroed(len);
                buffer
            }
            None => Buffer::with_capacity(dtype, len, class / dtype.size_bytes()),
        };

        let recycler: Arc<dyn Recycler> = self.inner.clone();
        let tensor = Tensor::with_recycler(shape.clone(), buffer, recycler)?;

        let live = self.inner.live_bytes.fetch_add(bytes, Ordering::AcqRel) + bytes;
        if let Ok(mut stats) = self.inner.stats.lock() {
            stats.record_served(bytes, hit, live);
        }
        tracing::trace!(%dtype, %shape, hit, live, "recycled tensor");

        Ok(tensor)
    }

    /// Returns the number of bytes held by live pool tensors.
    pub fn live_bytes(&self) -> usize {
        self.inner.live_bytes.load(Ordering::Acquire)
    }

    /// Returns the number of bytes remaining before hitting the budget.
    pub fn available_bytes(&self) -> usize {
        self.inner.budget.as_bytes().saturating_sub(self.live_bytes())
    }

    /// Returns the memory budget.
    pub fn budget(&self) -> MemoryBudget {
        self.inner.budget
    }

    /// Returns a snapshot of allocation statistics.
    pub fn stats(&self) -> AllocationStats {
        self.inner
            .stats
            .lock()
            .map(|s| s.clone())
            .unwrap_or_default()
    }

    /// Drops every cached free buffer. Live tensors are unaffected.
    pub fn shrink(&self) {
        if let Ok(mut free) = self.inner.free_buffers.lock() {
            free.clear();
            self.inner.free_list_bytes.store(0, Ordering::Release);
        }
    }

    /// Returns the capacity in bytes of the buffers held in the free list.
    pub fn free_list_bytes(&self) -> usize {
        self.inner.free_list_bytes.load(Ordering::Acquire)
    }
}

/// Smallest power of two that is `>= size` and `>= MIN_SIZE_CLASS`.
fn size_class_for(size: usize) -> usize {
    size.max(MIN_SIZE_CLASS).next_power_of_two()
}

impl std::fmt::Debug for MemoryPool {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("MemoryPool")
            .field("budget", &self.inner.budget)
            .field("live_bytes", &self.live_bytes())
            .field("free_list_bytes", &self.free_list_bytes())
            .finish()
    }
}
