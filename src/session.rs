//! Measurement session state machine
//!
//! ```text
//!            start                    deadline fires
//!   Idle ──────────────▶ Armed ──────────────────────▶ Idle
//!                        │   ▲        (report)
//!                        └───┘
//!                  start again: stop (no report), re-arm
//! ```
//!
//! The session owns the active hook, the deadline handle, the call counter
//! and the spatial aggregator. The hook bus and the scheduler are passed in
//! on every transition so the session never holds on to host resources.

use crate::error::{ProfilerError, Result};
use crate::hooks::{HookBus, HookId};
use crate::report::Report;
use crate::spatial::{Position, SpatialAggregator};
use crate::timer::{Scheduler, TimerHandle};
use std::time::Duration;

/// Number of cells printed when no configuration overrides it
pub const DEFAULT_MAX_LOCATIONS: usize = 5;

/// Longest measurement window accepted, in seconds (about 136 years)
pub const MAX_TEST_DURATION_SECS: f64 = u32::MAX as f64;

/// Result of a successful `start`
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct StartOutcome {
    /// Hook whose running measurement was aborted to make room
    pub aborted: Option<HookId>,
    /// Deadline armed for the new measurement
    pub deadline: TimerHandle,
}

/// One profiling run against a single hook
#[derive(Debug)]
pub struct MeasurementSession {
    active_hook: Option<HookId>,
    test_duration: f64,
    call_count: u64,
    deadline: Option<TimerHandle>,
    aggregator: SpatialAggregator,
    max_locations: usize,
}

impl Default for MeasurementSession {
    fn default() -> Self {
        Self::new(SpatialAggregator::default(), DEFAULT_MAX_LOCATIONS)
    }
}

impl MeasurementSession {
    /// Create an idle session
    pub fn new(aggregator: SpatialAggregator, max_locations: usize) -> Self {
        Self {
            active_hook: None,
            test_duration: 0.0,
            call_count: 0,
            deadline: None,
            aggregator,
            max_locations,
        }
    }

    pub fn active_hook(&self) -> Option<HookId> {
        self.active_hook
    }

    pub fn is_active(&self) -> bool {
        self.active_hook.is_some()
    }

    pub fn call_count(&self) -> u64 {
        self.call_count
    }

    /// Duration of the current (or last) measurement in seconds
    pub fn test_duration(&self) -> f64 {
        self.test_duration
    }

    pub fn aggregator(&self) -> &SpatialAggregator {
        &self.aggregator
    }

    /// True if `handle` is this session's armed deadline
    pub fn owns_timer(&self, handle: TimerHandle) -> bool {
        self.deadline == Some(handle)
    }

    /// Begin measuring `hook` for `duration_secs` seconds
    ///
    /// A running measurement is stopped first without a report. Invalid
    /// durations, and deadlines the scheduler cannot arm, are rejected
    /// before anything changes.
    pub fn start(
        &mut self,
        hook: HookId,
        duration_secs: f64,
        bus: &mut dyn HookBus,
        scheduler: &mut dyn Scheduler,
    ) -> Result<StartOutcome> {
        let window = window_for(duration_secs)?;
        // Arm before tearing down the old window so a refused deadline
        // leaves the running measurement untouched
        let deadline = scheduler
            .schedule_once(window)
            .ok_or(ProfilerError::InvalidDuration(duration_secs))?;

        let aborted = self.stop(bus, scheduler);

        self.active_hook = Some(hook);
        self.test_duration = duration_secs;
        self.call_count = 0;
        self.aggregator.clear();
        bus.subscribe(hook);
        self.deadline = Some(deadline);

        tracing::warn!(
            hook = %hook,
            duration_secs,
            "Subscribing to hook {} for {} second(s)",
            hook,
            duration_secs
        );

        Ok(StartOutcome { aborted, deadline })
    }

    /// Count one firing of the active hook
    ///
    /// Does nothing while idle. A missing position, or one with no grid cell,
    /// still counts towards the total but not towards any grid cell.
    pub fn record_occurrence(&mut self, position: Option<Position>) {
        if self.active_hook.is_none() {
            return;
        }
        self.call_count += 1;
        if let Some(position) = position {
            self.aggregator.increment(position);
        }
    }

    /// Close the window: log and return the report, then go idle
    ///
    /// Returns `None` when no measurement is running.
    pub fn expire_and_report(&mut self, bus: &mut dyn HookBus) -> Option<Report> {
        let hook = self.active_hook?;

        let report = Report::new(
            hook,
            self.call_count,
            self.test_duration,
            self.aggregator.top_n(self.max_locations),
        );

        tracing::warn!(
            hook = %hook,
            call_count = report.call_count,
            duration_secs = report.duration_secs,
            "{}",
            report.summary_line()
        );
        for hotspot in &report.hotspots {
            tracing::warn!(
                hook = %hook,
                count = hotspot.count,
                "{}",
                Report::hotspot_line(hotspot)
            );
        }
        self.aggregator.clear();

        bus.unsubscribe(hook);
        self.active_hook = None;
        // The timer already fired; only the handle needs releasing
        self.deadline = None;

        Some(report)
    }

    /// Abort the running measurement without reporting
    ///
    /// Returns the hook that was active, if any. Safe to call while idle.
    pub fn stop(
        &mut self,
        bus: &mut dyn HookBus,
        scheduler: &mut dyn Scheduler,
    ) -> Option<HookId> {
        let hook = self.active_hook.take();
        if let Some(hook) = hook {
            bus.unsubscribe(hook);
            tracing::debug!(hook = %hook, call_count = self.call_count, "measurement stopped");
        }
        if let Some(handle) = self.deadline.take() {
            scheduler.cancel(handle);
        }
        self.aggregator.clear();
        hook
    }
}

/// Validate a requested window length
///
/// Accepts durations in `(0, MAX_TEST_DURATION_SECS]`; `NaN` and infinities
/// are rejected.
pub fn window_for(duration_secs: f64) -> Result<Duration> {
    if !(duration_secs > 0.0 && duration_secs <= MAX_TEST_DURATION_SECS) {
        return Err(ProfilerError::InvalidDuration(duration_secs));
    }
    Duration::try_from_secs_f64(duration_secs)
        .map_err(|_| ProfilerError::InvalidDuration(duration_secs))
}
