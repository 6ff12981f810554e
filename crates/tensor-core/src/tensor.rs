// Copyright (c) 2025 Dimitris Kafetzis
//
// Licensed under the MIT License.
// See LICENSE file in the project root for full license information.
//
// SPDX-License-Identifier: MIT

//! Core tensor handle and the numeric capability wrapper.

use crate::{Buffer, DType, Numeric, Shape, TensorError};
use parking_lot::{RwLock, RwLockReadGuard, RwLockWriteGuard};
use std::fmt;
use std::sync::Arc;

/// Receives buffers back when the last handle to a tensor is dropped.
///
/// Implemented by buffer-recycling allocators so that a result tensor
/// handed out by the allocator flows back into its free list.
pub trait Recycler: Send + Sync {
    /// Takes ownership of a buffer that is no longer referenced.
    fn reclaim(&self, buffer: Buffer);
}

struct TensorBody {
    shape: Shape,
    dtype: DType,
    buffer: RwLock<Buffer>,
    recycler: Option<Arc<dyn Recycler>>,
}

impl Drop for TensorBody {
    fn drop(&mut self) {
        if let Some(recycler) = self.recycler.take() {
            let buffer = std::mem::replace(self.buffer.get_mut(), Buffer::zeroed(self.dtype, 0));
            recycler.reclaim(buffer);
        }
    }
}

/// A dense, n-dimensional tensor stored in one contiguous buffer.
///
/// `Tensor` is a shared handle: cloning it is cheap and yields another
/// handle to the *same* tensor, so writes through one handle are visible
/// through every other. Use [`Tensor::same`] to test identity and
/// [`Tensor::deep_copy`] for an independent copy.
///
/// The buffer sits behind a reader/writer lock. Readers take
/// [`Tensor::read`]; the arithmetic dispatcher takes [`Tensor::write`] on
/// its destination for the duration of one kernel call.
///
/// # Invariant
/// The buffer always holds exactly `shape.num_elements()` elements of
/// `dtype`. The shape and dtype never change after construction.
#[derive(Clone)]
pub struct Tensor {
    body: Arc<TensorBody>,
}

impl Tensor {
    fn from_parts(shape: Shape, buffer: Buffer, recycler: Option<Arc<dyn Recycler>>) -> Self {
        Self {
            body: Arc::new(TensorBody {
                dtype: buffer.dtype(),
                shape,
                buffer: RwLock::new(buffer),
                recycler,
            }),
        }
    }

    /// Creates a new tensor filled with zeros.
    ///
    /// # Examples
    /// ```
    /// use tensor_core::{Tensor, Shape, DType};
    /// let t = Tensor::zeros(Shape::matrix(2, 3), DType::F32);
    /// assert_eq!(t.size_bytes(), 24);
    /// ```
    pub fn zeros(shape: Shape, dtype: DType) -> Self {
        let buffer = Buffer::zeroed(dtype, shape.num_elements());
        Self::from_parts(shape, buffer, None)
    }

    /// Creates a tensor that owns `values`.
    ///
    /// # Examples
    /// ```
    /// use tensor_core::{Tensor, Shape};
    /// let t = Tensor::from_vec(Shape::vector(3), vec![1i64, 2, 3]).unwrap();
    /// assert_eq!(t.to_vec::<i64>().unwrap(), vec![1, 2, 3]);
    /// ```
    pub fn from_vec<T: Numeric>(shape: Shape, values: Vec<T>) -> Result<Self, TensorError> {
        Self::from_buffer(shape, T::into_buffer(values))
    }

    /// Creates a tensor by copying `values`.
    pub fn from_slice<T: Numeric>(shape: Shape, values: &[T]) -> Result<Self, TensorError> {
        Self::from_vec(shape, values.to_vec())
    }

    /// Creates an `f32` tensor by copying `values`.
    pub fn from_f32(shape: Shape, values: &[f32]) -> Result<Self, TensorError> {
        Self::from_slice(shape, values)
    }

    /// Creates a tensor of a storage-only type from its raw bytes.
    ///
    /// Returns [`TensorError::UnsupportedDType`] for numeric types, which
    /// are built with [`Tensor::from_vec`] instead.
    pub fn from_packed(shape: Shape, dtype: DType, bytes: Vec<u8>) -> Result<Self, TensorError> {
        if dtype.is_numeric() {
            return Err(TensorError::UnsupportedDType {
                op: "from_packed",
                dtype,
            });
        }
        Self::from_buffer(shape, Buffer::Packed { dtype, bytes })
    }

    /// Creates a tensor from an existing buffer.
    pub fn from_buffer(shape: Shape, buffer: Buffer) -> Result<Self, TensorError> {
        check_len(&shape, &buffer)?;
        Ok(Self::from_parts(shape, buffer, None))
    }

    /// Creates a tensor whose buffer is handed to `recycler` when the last
    /// handle is dropped.
    pub fn with_recycler(
        shape: Shape,
        buffer: Buffer,
        recycler: Arc<dyn Recycler>,
    ) -> Result<Self, TensorError> {
        check_len(&shape, &buffer)?;
        Ok(Self::from_parts(shape, buffer, Some(recycler)))
    }

    /// Returns the tensor's shape.
    pub fn shape(&self) -> &Shape {
        &self.body.shape
    }

    /// Returns the tensor's element type.
    pub fn dtype(&self) -> DType {
        self.body.dtype
    }

    /// Returns the number of elements.
    pub fn num_elements(&self) -> usize {
        self.body.shape.num_elements()
    }

    /// Returns the memory footprint of the contents in bytes.
    pub fn size_bytes(&self) -> usize {
        self.body.shape.size_bytes(self.body.dtype)
    }

    /// Returns `true` if the element type supports arithmetic.
    pub fn is_numeric(&self) -> bool {
        self.body.dtype.is_numeric()
    }

    /// Returns `true` if both handles refer to the same tensor.
    pub fn same(&self, other: &Tensor) -> bool {
        Arc::ptr_eq(&self.body, &other.body)
    }

    /// Returns an address identifying the tensor, stable while any handle
    /// is alive. Handles of the same tensor share one id.
    pub fn id(&self) -> usize {
        Arc::as_ptr(&self.body) as usize
    }

    /// Returns the numeric capability of this tensor, or `None` if its
    /// storage is not numeric.
    pub fn numeric(&self) -> Option<NumericTensor> {
        NumericTensor::new(self)
    }

    /// Acquires shared read access to the buffer.
    pub fn read(&self) -> RwLockReadGuard<'_, Buffer> {
        self.body.buffer.read()
    }

    /// Acquires exclusive write access to the buffer.
    pub fn write(&self) -> RwLockWriteGuard<'_, Buffer> {
        self.body.buffer.write()
    }

    /// Copies the contents out as a typed vector, or `None` if `T` is not
    /// the element type.
    pub fn to_vec<T: Numeric>(&self) -> Option<Vec<T>> {
        self.read().as_slice::<T>().map(<[T]>::to_vec)
    }

    /// Creates an independent tensor with the same shape and contents.
    pub fn deep_copy(&self) -> Tensor {
        let buffer = self.read().clone();
        Self::from_parts(self.body.shape.clone(), buffer, None)
    }

    /// Sets every element to `value`.
    pub fn fill<T: Numeric>(&self, value: T) -> Result<(), TensorError> {
        let mut buffer = self.write();
        let actual = buffer.dtype();
        let slice = buffer
            .as_mut_slice::<T>()
            .ok_or(TensorError::DTypeMismatch {
                op: "fill",
                expected: actual,
                actual: T::DTYPE,
            })?;
        slice.fill(value);
        Ok(())
    }
}

fn check_len(shape: &Shape, buffer: &Buffer) -> Result<(), TensorError> {
    let expected = shape.num_elements();
    let actual = buffer.len();
    if expected != actual {
        return Err(TensorError::BufferSizeMismatch {
            shape: shape.clone(),
            expected,
            actual,
        });
    }
    Ok(())
}

impl fmt::Debug for Tensor {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Tensor")
            .field("id", &Arc::as_ptr(&self.body))
            .field("shape", &self.body.shape)
            .field("dtype", &self.body.dtype)
            .field("recycled", &self.body.recycler.is_some())
            .finish()
    }
}

/// A [`Tensor`] whose storage is known to be numeric.
///
/// The only way to obtain one is [`NumericTensor::new`] (or
/// [`Tensor::numeric`]), so holding a `NumericTensor` proves the kernels
/// can operate on it.
#[derive(Debug, Clone)]
pub struct NumericTensor(Tensor);

impl NumericTensor {
    /// Wraps a handle to `tensor` if its storage is numeric.
    pub fn new(tensor: &Tensor) -> Option<Self> {
        tensor.is_numeric().then(|| Self(tensor.clone()))
    }

    /// Returns the underlying tensor handle.
    pub fn tensor(&self) -> &Tensor {
        &self.0
    }

    /// Consumes the wrapper, returning the tensor handle.
    pub fn into_tensor(self) -> Tensor {
        self.0
    }

    /// Returns the tensor's shape.
    pub fn shape(&self) -> &Shape {
        self.0.shape()
    }

    /// Returns the tensor's element type.
    pub fn dtype(&self) -> DType {
        self.0.dtype()
    }
}
