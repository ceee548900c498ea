//! Single-threaded host context
//!
//! Owns the hook dispatcher, the deadline queue and the one measurement
//! session. Host events, control commands and fired deadlines all go through
//! `&mut Host`, so they are serialized by construction.

use crate::config::ProfilerConfig;
use crate::error::Result;
use crate::hooks::{HandlerTable, HookBus, HookDispatcher, HookEvent, HookId};
use crate::report::Report;
use crate::session::{MeasurementSession, StartOutcome};
use crate::spatial::SpatialAggregator;
use crate::timer::DeadlineQueue;
use std::time::Instant;

#[derive(Debug)]
pub struct Host {
    dispatcher: HookDispatcher,
    timers: DeadlineQueue,
    session: MeasurementSession,
}

impl Host {
    /// Build a host from configuration, with its clock starting at `start`
    pub fn new(config: &ProfilerConfig, start: Instant) -> Self {
        Self {
            dispatcher: HookDispatcher::new(HandlerTable::standard()),
            timers: DeadlineQueue::new(start),
            session: MeasurementSession::new(
                SpatialAggregator::new(config.grid_size),
                config.max_locations,
            ),
        }
    }

    pub fn session(&self) -> &MeasurementSession {
        &self.session
    }

    pub fn is_subscribed(&self, hook: HookId) -> bool {
        self.dispatcher.is_subscribed(hook)
    }

    /// Hooks currently subscribed
    pub fn subscriptions(&self) -> Vec<HookId> {
        self.dispatcher.subscriptions()
    }

    /// Start (or restart) a measurement
    pub fn start(&mut self, hook: HookId, duration_secs: f64) -> Result<StartOutcome> {
        self.session
            .start(hook, duration_secs, &mut self.dispatcher, &mut self.timers)
    }

    /// Abort the running measurement, if any, without a report
    pub fn stop(&mut self) -> Option<HookId> {
        self.session.stop(&mut self.dispatcher, &mut self.timers)
    }

    /// Deliver a host event
    ///
    /// Returns `true` if the event reached the session.
    pub fn dispatch(&mut self, event: &HookEvent) -> bool {
        match self.dispatcher.route(event) {
            Some(position) => {
                self.session.record_occurrence(position);
                true
            }
            None => false,
        }
    }

    /// Earliest pending deadline
    pub fn next_deadline(&mut self) -> Option<Instant> {
        self.timers.next_deadline()
    }

    /// Host clock
    pub fn now(&self) -> Instant {
        self.timers.now()
    }

    /// Advance the clock and run every deadline that came due
    pub fn advance_to(&mut self, now: Instant) -> Vec<Report> {
        let mut reports = Vec::new();
        for handle in self.timers.advance_to(now) {
            if !self.session.owns_timer(handle) {
                tracing::debug!(timer = handle.id(), "ignoring stale deadline");
                continue;
            }
            if let Some(report) = self.session.expire_and_report(&mut self.dispatcher) {
                reports.push(report);
            }
        }
        reports
    }
}
