//! Synthetic host traffic
//!
//! Lets the console stand in for a busy server: hook events are drawn from a
//! weighted set of hotspots and scattered around each hotspot's position.

use crate::error::ProfilerError;
use crate::hooks::{HookEvent, HookId};
use crate::spatial::Position;
use rand::distributions::{Distribution, WeightedIndex};
use rand::Rng;
use serde::{Deserialize, Serialize};
use std::time::Duration;

/// A place in the world where one hook fires often
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct HotspotSpec {
    pub hook: HookId,
    pub position: Position,
    #[serde(default = "default_weight")]
    pub weight: f64,
}

const MAX_EVENTS_PER_SECOND: f64 = 1_000_000.0;

fn default_weight() -> f64 {
    1.0
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct WorkloadConfig {
    /// Total events generated per second across all hotspots
    pub events_per_second: f64,
    /// Maximum offset applied to a hotspot position on each axis
    pub jitter: f64,
    /// Fraction of events whose container has no owning entity
    pub detached_ratio: f64,
    /// Hotspots; every hook at the origin when empty
    pub hotspot: Vec<HotspotSpec>,
}

impl Default for WorkloadConfig {
    fn default() -> Self {
        Self {
            events_per_second: 100.0,
            jitter: 25.0,
            detached_ratio: 0.0,
            hotspot: Vec::new(),
        }
    }
}

impl WorkloadConfig {
    pub fn validate(&self) -> Result<(), ProfilerError> {
        if !(self.events_per_second > 0.0 && self.events_per_second <= MAX_EVENTS_PER_SECOND) {
            return Err(ProfilerError::InvalidConfig(format!(
                "workload.events_per_second must be in (0, 1000000], got {}",
                self.events_per_second
            )));
        }
        if !self.jitter.is_finite() || self.jitter < 0.0 {
            return Err(ProfilerError::InvalidConfig(format!(
                "workload.jitter must be >= 0, got {}",
                self.jitter
            )));
        }
        if !(0.0..=1.0).contains(&self.detached_ratio) {
            return Err(ProfilerError::InvalidConfig(format!(
                "workload.detached_ratio must be in [0, 1], got {}",
                self.detached_ratio
            )));
        }
        for spot in &self.hotspot {
            if !spot.weight.is_finite() || spot.weight <= 0.0 || !spot.position.is_finite() {
                return Err(ProfilerError::InvalidConfig(format!(
                    "invalid hotspot for {}: weight {} at {}",
                    spot.hook, spot.weight, spot.position
                )));
            }
        }
        Ok(())
    }
}

/// Event generator built from a [`WorkloadConfig`]
#[derive(Debug, Clone)]
pub struct Workload {
    hotspots: Vec<HotspotSpec>,
    index: WeightedIndex<f64>,
    interval: Duration,
    jitter: f64,
    detached_ratio: f64,
}

impl Workload {
    pub fn new(config: &WorkloadConfig) -> Result<Self, ProfilerError> {
        config.validate()?;

        let hotspots = if config.hotspot.is_empty() {
            HookId::ALL
                .iter()
                .map(|&hook| HotspotSpec {
                    hook,
                    position: Position::default(),
                    weight: 1.0,
                })
                .collect()
        } else {
            config.hotspot.clone()
        };

        let index = WeightedIndex::new(hotspots.iter().map(|h| h.weight))
            .map_err(|e| ProfilerError::InvalidConfig(format!("workload weights: {}", e)))?;

        Ok(Self {
            hotspots,
            index,
            interval: Duration::from_secs_f64(1.0 / config.events_per_second),
            jitter: config.jitter,
            detached_ratio: config.detached_ratio,
        })
    }

    /// Time between two generated events
    pub fn interval(&self) -> Duration {
        self.interval
    }

    /// Draw the next host event
    pub fn next_event<R: Rng + ?Sized>(&self, rng: &mut R) -> HookEvent {
        let spot = &self.hotspots[self.index.sample(rng)];

        let position = if rng.gen_bool(self.detached_ratio) {
            None
        } else {
            let j = self.jitter;
            Some(Position::new(
                spot.position.x + rng.gen_range(-j..=j),
                spot.position.y + rng.gen_range(-j..=j),
                spot.position.z + rng.gen_range(-j..=j),
            ))
        };

        HookEvent::sample(spot.hook, position)
    }
}
