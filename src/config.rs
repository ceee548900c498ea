//! Profiler configuration
//!
//! Loaded from a TOML file. Every field has a default, so an empty file (or
//! no file) gives the stock behavior: a 100-unit grid and the five busiest
//! cells per report.
//!
//! # Example TOML
//! ```toml
//! grid_size = 100.0
//! max_locations = 5
//! command = "debughookcalls.start"
//!
//! [workload]
//! events_per_second = 200.0
//! jitter = 40.0
//! detached_ratio = 0.1
//!
//! [[workload.hotspot]]
//! hook = "OnItemSplit"
//! position = [105.0, 0.0, 0.0]
//! weight = 3.0
//! ```

use crate::command::DEFAULT_COMMAND;
use crate::error::ProfilerError;
use crate::session::DEFAULT_MAX_LOCATIONS;
use crate::spatial::DEFAULT_GRID_SIZE;
use crate::workload::WorkloadConfig;
use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::Path;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct ProfilerConfig {
    /// Edge length of a spatial grid cell, in world units
    pub grid_size: f64,

    /// Number of cells listed in each report
    pub max_locations: usize,

    /// Console command that starts a measurement
    pub command: String,

    /// Synthetic host traffic for the console (none by default)
    pub workload: Option<WorkloadConfig>,
}

impl Default for ProfilerConfig {
    fn default() -> Self {
        Self {
            grid_size: DEFAULT_GRID_SIZE,
            max_locations: DEFAULT_MAX_LOCATIONS,
            command: DEFAULT_COMMAND.to_string(),
            workload: None,
        }
    }
}

impl ProfilerConfig {
    /// Parse configuration from TOML text and validate it
    pub fn from_toml_str(content: &str) -> Result<Self> {
        let config: Self =
            toml::from_str(content).context("Failed to parse profiler configuration")?;
        config.validate()?;
        Ok(config)
    }

    /// Load configuration from a TOML file
    pub fn from_toml<P: AsRef<Path>>(path: P) -> Result<Self> {
        let content = fs::read_to_string(path.as_ref()).with_context(|| {
            format!("Failed to read config file: {}", path.as_ref().display())
        })?;
        Self::from_toml_str(&content)
            .with_context(|| format!("Invalid config file: {}", path.as_ref().display()))
    }

    /// Check value ranges
    pub fn validate(&self) -> std::result::Result<(), ProfilerError> {
        if !self.grid_size.is_finite() || self.grid_size <= 0.0 {
            return Err(ProfilerError::InvalidConfig(format!(
                "grid_size must be positive, got {}",
                self.grid_size
            )));
        }

        if self.command.trim().is_empty() || self.command.contains(char::is_whitespace) {
            return Err(ProfilerError::InvalidConfig(format!(
                "command must be a single word, got {:?}",
                self.command
            )));
        }

        if let Some(workload) = &self.workload {
            workload.validate()?;
        }

        Ok(())
    }
}
