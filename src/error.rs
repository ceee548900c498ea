//! Error types for the profiler core
//!
//! Only the control boundary can fail. Redundant stops and events without
//! spatial context are not errors and never surface here.

use thiserror::Error;

/// Errors produced while validating a measurement request or configuration
#[derive(Error, Debug, Clone, PartialEq)]
pub enum ProfilerError {
    /// Hook name is not on the allow-list
    #[error("Unsupported hook name: {0}")]
    UnknownHook(String),

    /// Duration is zero, negative, or not finite
    #[error("Duration must be a positive number of seconds: {0}")]
    InvalidDuration(f64),

    /// Missing arguments or a duration that is not a number
    #[error("Usage: {command} <hook name> <seconds>")]
    Usage { command: String },

    /// Configuration value out of range
    #[error("Invalid configuration: {0}")]
    InvalidConfig(String),
}

/// Result type for profiler operations
pub type Result<T> = std::result::Result<T, ProfilerError>;
