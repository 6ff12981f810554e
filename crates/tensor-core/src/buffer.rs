// Copyright (c) 2025 Dimitris Kafetzis
//
// Licensed under the MIT License.
// See LICENSE file in the project root for full license information.
//
// SPDX-License-Identifier: MIT

//! Contiguous element storage.

use crate::{DType, Numeric};

/// The contiguous buffer behind a [`crate::Tensor`].
///
/// Numeric element types are stored as typed vectors so the kernels never
/// reinterpret bytes. Storage-only types keep their raw little-endian
/// bytes in [`Buffer::Packed`].
#[derive(Debug, Clone, PartialEq)]
pub enum Buffer {
    F32(Vec<f32>),
    F64(Vec<f64>),
    I32(Vec<i32>),
    I64(Vec<i64>),
    /// Raw bytes of a storage-only type (`F16`, `BF16`, `I8`).
    Packed { dtype: DType, bytes: Vec<u8> },
}

impl Buffer {
    /// Creates a zero-filled buffer of `len` elements.
    pub fn zeroed(dtype: DType, len: usize) -> Self {
        Self::with_capacity(dtype, len, len)
    }

    /// Creates a zero-filled buffer of `len` elements whose backing
    /// allocation can hold at least `capacity` elements without growing.
    pub fn with_capacity(dtype: DType, len: usize, capacity: usize) -> Self {
        fn filled<T: Numeric>(len: usize, capacity: usize) -> Buffer {
            let mut v = Vec::with_capacity(capacity.max(len));
            v.resize(len, T::zero());
            T::into_buffer(v)
        }

        match dtype {
            DType::F32 => filled::<f32>(len, capacity),
            DType::F64 => filled::<f64>(len, capacity),
            DType::I32 => filled::<i32>(len, capacity),
            DType::I64 => filled::<i64>(len, capacity),
            DType::F16 | DType::BF16 | DType::I8 => {
                let elem = dtype.size_bytes();
                let mut bytes = Vec::with_capacity(capacity.max(len) * elem);
                bytes.resize(len * elem, 0);
                Buffer::Packed { dtype, bytes }
            }
        }
    }

    /// Returns the element type held by this buffer.
    pub fn dtype(&self) -> DType {
        match self {
            Buffer::F32(_) => DType::F32,
            Buffer::F64(_) => DType::F64,
            Buffer::I32(_) => DType::I32,
            Buffer::I64(_) => DType::I64,
            Buffer::Packed { dtype, .. } => *dtype,
        }
    }

    /// Returns the number of elements.
    pub fn len(&self) -> usize {
        match self {
            Buffer::F32(v) => v.len(),
            Buffer::F64(v) => v.len(),
            Buffer::I32(v) => v.len(),
            Buffer::I64(v) => v.len(),
            Buffer::Packed { dtype, bytes } => bytes.len() / dtype.size_bytes(),
        }
    }

    /// Returns `true` if the buffer holds no elements.
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Returns the number of elements the backing allocation can hold.
    pub fn capacity(&self) -> usize {
        match self {
            Buffer::F32(v) => v.capacity(),
            Buffer::F64(v) => v.capacity(),
            Buffer::I32(v) => v.capacity(),
            Buffer::I64(v) => v.capacity(),
            Buffer::Packed { dtype, bytes } => bytes.capacity() / dtype.size_bytes(),
        }
    }

    /// Returns the size of the live contents in bytes.
    pub fn size_bytes(&self) -> usize {
        self.len() * self.dtype().size_bytes()
    }

    /// Resizes to `len` elements and zeroes every element, keeping the
    /// backing allocation when it is large enough.
    pub fn reset_zeroed(&mut self, len: usize) {
        fn reset<T: Numeric>(v: &mut Vec<T>, len: usize) {
            v.clear();
            v.resize(len, T::zero());
        }

        match self {
            Buffer::F32(v) => reset(v, len),
            Buffer::F64(v) => reset(v, len),
            Buffer::I32(v) => reset(v, len),
            Buffer::I64(v) => reset(v, len),
            Buffer::Packed { dtype, bytes } => {
                bytes.clear();
                bytes.resize(len * dtype.size_bytes(), 0);
            }
        }
    }

    /// Borrows the contents as a typed slice, or `None` if `T` is not the
    /// element type of this buffer.
    pub fn as_slice<T: Numeric>(&self) -> Option<&[T]> {
        T::slice(self)
    }

    /// Mutably borrows the contents as a typed slice.
    pub fn as_mut_slice<T: Numeric>(&mut self) -> Option<&mut [T]> {
        T::slice_mut(self)
    }
}
