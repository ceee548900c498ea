//! hookprof - hook call-frequency profiler
//!
//! Attaches to one host hook at a time for a bounded window, counts how often
//! it fires, buckets the calls on a coarse spatial grid and reports the
//! busiest cells when the window closes.

pub mod cli;
pub mod command;
pub mod config;
pub mod console;
pub mod error;
pub mod hooks;
pub mod host;
pub mod report;
pub mod session;
pub mod spatial;
pub mod timer;
pub mod workload;

pub use error::{ProfilerError, Result};
