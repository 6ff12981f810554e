// Copyright (c) 2025 Dimitris Kafetzis
//
// Licensed under the MIT License.
// See LICENSE file in the project root for full license information.
//
// SPDX-License-Identifier: MIT

//! Arithmetic context configuration loaded from TOML files or constructed
//! programmatically.
//!
//! # TOML Format
//! ```toml
//! memory_budget = "512M"
//! recycle_buffers = true
//! collect_stats = true
//! ```

use crate::ArithError;
use memory_manager::MemoryBudget;
use std::path::Path;

/// Configuration for an [`crate::Arith`] context.
#[derive(Debug, Clone, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
pub struct ArithConfig {
    /// Ceiling on live pooled result bytes (human-readable, e.g. `"512M"`).
    pub memory_budget: String,
    /// Serve fresh results from the recycling pool. When off, every fresh
    /// result is a new heap allocation and the budget is not enforced.
    #[serde(default = "default_true")]
    pub recycle_buffers: bool,
    /// Whether to count dispatches per path and operation.
    #[serde(default = "default_true")]
    pub collect_stats: bool,
}

fn default_true() -> bool {
    true
}

impl ArithConfig {
    /// Loads configuration from a TOML file.
    pub fn from_file(path: &Path) -> Result<Self, ArithError> {
        let content = std::fs::read_to_string(path).map_err(|e| {
            ArithError::Config(format!("cannot read config '{}': {e}", path.display()))
        })?;
        Self::from_toml(&content)
    }

    /// Parses configuration from a TOML string.
    pub fn from_toml(toml_str: &str) -> Result<Self, ArithError> {
        toml::from_str(toml_str).map_err(|e| ArithError::Config(format!("TOML parse error: {e}")))
    }

    /// Serialises configuration to TOML.
    pub fn to_toml(&self) -> Result<String, ArithError> {
        toml::to_string_pretty(self)
            .map_err(|e| ArithError::Config(format!("TOML serialise error: {e}")))
    }

    /// Parses the memory budget string into a [`MemoryBudget`].
    pub fn parse_budget(&self) -> Result<MemoryBudget, ArithError> {
        MemoryBudget::parse(&self.memory_budget)
            .map_err(|e| ArithError::Config(format!("invalid budget: {e}")))
    }
}

impl Default for ArithConfig {
    fn default() -> Self {
        Self {
            memory_budget: "512M".to_string(),
            recycle_buffers: true,
            collect_stats: true,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default() {
        let c = ArithConfig::default();
        assert_eq!(c.memory_budget, "512M");
        assert!(c.recycle_buffers);
        assert!(c.collect_stats);
        assert_eq!(c.parse_budget().unwrap().as_mb(), 512);
    }

    #[test]
    fn test_from_toml() {
        let toml = r#"
memory_budget = "1G"
recycle_buffers = false
"#;
        let c = ArithConfig::from_toml(toml).unwrap();
        assert_eq!(c.memory_budget, "1G");
        assert!(!c.recycle_buffers);
        assert!(c.collect_stats);
    }

    #[test]
    fn test_from_toml_missing_budget() {
        let err = ArithConfig::from_toml("collect_stats = false").unwrap_err();
        assert!(matches!(err, ArithError::Config(_)));
    }

    #[test]
    fn test_invalid_budget() {
        let c = ArithConfig {
            memory_budget: "lots".into(),
            ..Default::default()
        };
        let err = c.parse_budget().unwrap_err();
        assert!(err.to_string().contains("invalid budget"));
    }

    #[test]
    fn test_to_toml_roundtrip() {
        let c = ArithConfig {
            memory_budget: "64M".into(),
            recycle_buffers: false,
            collect_stats: false,
        };
        let back = ArithConfig::from_toml(&c.to_toml().unwrap()).unwrap();
        assert_eq!(back, c);
    }

    #[test]
    fn test_from_file() {
        let path = std::env::temp_dir().join(format!("dense-arith-{}.toml", std::process::id()));
        std::fs::write(&path, "memory_budget = \"2048K\"\n").unwrap();
        let c = ArithConfig::from_file(&path).unwrap();
        std::fs::remove_file(&path).unwrap();
        assert_eq!(c.parse_budget().unwrap().as_mb(), 2);

        let missing = ArithConfig::from_file(Path::new("/nonexistent/dense-arith.toml"));
        assert!(matches!(missing, Err(ArithError::Config(_))));
    }
}
