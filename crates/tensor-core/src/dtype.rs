// Copyright (c) 2025 Dimitris Kafetzis
//
// Licensed under the MIT License.
// See LICENSE file in the project root for full license information.
//
// SPDX-License-Identifier: MIT

//! Supported tensor element data types.

use std::fmt;

/// Enumerates the element types a [`crate::Tensor`] can hold.
///
/// Only the numeric types (`F32`, `F64`, `I32`, `I64`) have arithmetic
/// kernels. The half-precision and `I8` types are storage-only: they are
/// carried as packed bytes (e.g. quantised weights) and are rejected by
/// the arithmetic dispatcher.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, serde::Serialize, serde::Deserialize)]
pub enum DType {
    /// 32-bit IEEE 754 floating point.
    F32,
    /// 64-bit IEEE 754 floating point.
    F64,
    /// 32-bit signed integer.
    I32,
    /// 64-bit signed integer.
    I64,
    /// 16-bit IEEE 754 floating point (storage-only).
    F16,
    /// 16-bit brain floating point (storage-only).
    BF16,
    /// 8-bit signed integer for quantised weights (storage-only).
    I8,
}

impl DType {
    /// Every supported data type.
    pub const ALL: [DType; 7] = [
        DType::F32,
        DType::F64,
        DType::I32,
        DType::I64,
        DType::F16,
        DType::BF16,
        DType::I8,
    ];

    /// Returns the size of a single element in bytes.
    pub fn size_bytes(self) -> usize {
        match self {
            DType::F64 | DType::I64 => 8,
            DType::F32 | DType::I32 => 4,
            DType::F16 | DType::BF16 => 2,
            DType::I8 => 1,
        }
    }

    /// Returns `true` if tensors of this type support the arithmetic kernels.
    pub fn is_numeric(self) -> bool {
        matches!(self, DType::F32 | DType::F64 | DType::I32 | DType::I64)
    }

    /// Returns a human-readable label for this data type.
    pub fn as_str(self) -> &'static str {
        match self {
            DType::F32 => "f32",
            DType::F64 => "f64",
            DType::I32 => "i32",
            DType::I64 => "i64",
            DType::F16 => "f16",
            DType::BF16 => "bf16",
            DType::I8 => "i8",
        }
    }
}

impl fmt::Display for DType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_numeric_split() {
        let numeric: Vec<_> = DType::ALL.iter().filter(|d| d.is_numeric()).collect();
        assert_eq!(numeric, vec![&DType::F32, &DType::F64, &DType::I32, &DType::I64]);
        assert!(!DType::F16.is_numeric());
        assert!(!DType::I8.is_numeric());
    }

    #[test]
    fn test_sizes() {
        assert_eq!(DType::F64.size_bytes(), 8);
        assert_eq!(DType::I32.size_bytes(), 4);
        assert_eq!(DType::BF16.size_bytes(), 2);
        assert_eq!(DType::I8.size_bytes(), 1);
    }

    #[test]
    fn test_display() {
        assert_eq!(DType::BF16.to_string(), "bf16");
        assert_eq!(format!("{}", DType::I64), "i64");
    }

    #[test]
    fn test_serde_roundtrip() {
        let json = serde_json::to_string(&DType::F64).unwrap();
        let back: DType = serde_json::from_str(&json).unwrap();
        assert_eq!(back, DType::F64);
    }
}
