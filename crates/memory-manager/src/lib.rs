// Copyright (c) 2025 Dimitris Kafetzis
//
// Licensed under the MIT License.
// See LICENSE file in the project root for full license information.
//
// SPDX-License-Identifier: MIT

//! # memory-manager
//!
//! A budget-enforced, buffer-recycling allocator for result tensors.
//!
//! # Key Components
//!
//! - [`MemoryBudget`]: a hard memory ceiling with human-readable parsing
//!   (`"512M"`, `"1G"`, etc.).
//! - [`MemoryPool`]: the allocator. It enforces the budget, keeps a free
//!   list binned by element type and size class, and tracks statistics.
//! - [`AllocationStats`]: cumulative allocator metrics (peak usage, cache
//!   hit ratio, OOM count).
//!
//! # Ownership Model
//!
//! ```text
//! MemoryPool::recycle(dtype, shape)
//!       │
//!       ▼
//!     Tensor  ◄─── owns Buffer, holds Arc<dyn Recycler> (the pool state)
//!       │
//!       │  last handle dropped
//!       ▼
//!   Recycler::reclaim(buffer)  ──► free list
//! ```
//!
//! Every tensor the pool hands out keeps an `Arc` to the pool's inner
//! state. When its last handle goes away the buffer is reclaimed into the
//! free list and the live-bytes counter drops accordingly.
//!
//! # Example
//! ```
//! use memory_manager::{MemoryBudget, MemoryPool};
//! use tensor_core::{DType, Shape};
//!
//! let pool = MemoryPool::new(MemoryBudget::from_mb(64));
//!
//! let a = pool.recycle(DType::F32, &Shape::matrix(512, 512)).unwrap(); // 1 MB
//! let b = pool.recycle(DType::I64, &Shape::vector(1024)).unwrap();     // 8 KB
//! assert_eq!(pool.live_bytes(), 1024 * 1024 + 8 * 1024);
//!
//! drop(a);
//! assert_eq!(pool.live_bytes(), 8 * 1024);
//! # drop(b);
//! ```

mod budget;
mod error;
pub mod pool;
mod stats;

pub use budget::MemoryBudget;
pub use error::MemoryError;
pub use pool::MemoryPool;
pub use stats::AllocationStats;
