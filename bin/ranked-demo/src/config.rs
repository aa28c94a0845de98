// Copyright (c) 2025 Dimitris Kafetzis
//
// Licensed under the MIT License.
// See LICENSE file in the project root for full license information.
//
// SPDX-License-Identifier: MIT

//! Demo configuration loaded from TOML files or built from defaults.
//!
//! # TOML Format
//! ```toml
//! memory_budget = "64M"
//! rows = 4
//! cols = 3
//! fill_value = 3.14
//! ```

use ranked_alloc::MemoryBudget;
use std::path::Path;

#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("configuration error: {0}")]
    Invalid(String),
}

/// Settings for `ranked-demo run`.
#[derive(Debug, Clone, PartialEq, serde::Serialize, serde::Deserialize)]
#[serde(default)]
pub struct DemoConfig {
    /// Ceiling for the demo's memory pool (human-readable, e.g. `"64M"`).
    pub memory_budget: String,
    /// Rows of the numbered matrix.
    pub rows: usize,
    /// Columns of the numbered matrix.
    pub cols: usize,
    /// Value used by the `full` factory example.
    pub fill_value: f32,
}

impl DemoConfig {
    pub fn from_file(path: &Path) -> Result<Self, ConfigError> {
        let content = std::fs::read_to_string(path).map_err(|e| {
            ConfigError::Invalid(format!("cannot read config '{}': {e}", path.display()))
        })?;
        Self::from_toml(&content)
    }

    pub fn from_toml(toml_str: &str) -> Result<Self, ConfigError> {
        toml::from_str(toml_str).map_err(|e| ConfigError::Invalid(format!("TOML parse error: {e}")))
    }

    pub fn to_toml(&self) -> Result<String, ConfigError> {
        toml::to_string_pretty(self)
            .map_err(|e| ConfigError::Invalid(format!("TOML serialise error: {e}")))
    }

    pub fn parse_budget(&self) -> Result<MemoryBudget, ConfigError> {
        MemoryBudget::parse(&self.memory_budget)
            .map_err(|e| ConfigError::Invalid(format!("invalid budget: {e}")))
    }

    /// Replaces file or default values with those given on the command line.
    pub fn apply_overrides(
        &mut self,
        rows: Option<usize>,
        cols: Option<usize>,
        budget: Option<String>,
    ) {
        if let Some(rows) = rows {
            self.rows = rows;
        }
        if let Some(cols) = cols {
            self.cols = cols;
        }
        if let Some(budget) = budget {
            self.memory_budget = budget;
        }
    }
}

impl Default for DemoConfig {
    #[allow(clippy::approx_constant)]
    fn default() -> Self {
        Self {
            memory_budget: "64M".to_string(),
            rows: 4,
            cols: 3,
            fill_value: 3.14,
        }
    }
}
