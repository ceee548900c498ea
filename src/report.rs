//! End-of-session report
//!
//! Text rendering matches the operator log lines exactly; JSON rendering is
//! used by `--format json`.

use crate::hooks::HookId;
use crate::spatial::Hotspot;
use serde::{Deserialize, Serialize};

/// Summary of one completed measurement
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Report {
    /// Hook that was measured
    pub hook: String,
    /// Total calls observed during the window
    pub call_count: u64,
    /// Length of the window in seconds
    pub duration_secs: f64,
    /// Busiest grid cells, highest count first
    #[serde(default)]
    pub hotspots: Vec<Hotspot>,
}

impl Report {
    pub fn new(hook: HookId, call_count: u64, duration_secs: f64, hotspots: Vec<Hotspot>) -> Self {
        Self {
            hook: hook.to_string(),
            call_count,
            duration_secs,
            hotspots,
        }
    }

    /// `Hook {name} was called {count} times over {duration} second(s)`
    pub fn summary_line(&self) -> String {
        format!(
            "Hook {} was called {} times over {} second(s)",
            self.hook, self.call_count, self.duration_secs
        )
    }

    /// `{count} calls at approximate location {key}`
    pub fn hotspot_line(hotspot: &Hotspot) -> String {
        format!(
            "{} calls at approximate location {}",
            hotspot.count, hotspot.location
        )
    }

    /// Every line of the report, summary first
    pub fn lines(&self) -> Vec<String> {
        let mut lines = Vec::with_capacity(1 + self.hotspots.len());
        lines.push(self.summary_line());
        lines.extend(self.hotspots.iter().map(Self::hotspot_line));
        lines
    }

    /// Pretty-printed JSON
    pub fn to_json(&self) -> serde_json::Result<String> {
        serde_json::to_string_pretty(self)
    }
}
