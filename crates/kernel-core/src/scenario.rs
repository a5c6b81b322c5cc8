//! Scenario topology definitions and the scenario registry.
//!
//! A [`ScenarioDef`] carries every parameter the tick driver reads. Only
//! `canonical_v1` is registered; tests build ad-hoc definitions directly.

use contracts::{RequestClass, CANONICAL_SCENARIO_ID};
use tracing::debug;

use crate::error::KernelError;

/// Arrivals per tick for all ticks strictly below `until_tick` not covered by an earlier step.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ArrivalStep {
    pub until_tick: u64,
    pub count: u32,
}

/// Upper bound of a class's slice of the unit interval, sorted ascending.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ClassWeight {
    pub class: RequestClass,
    pub cumulative: f64,
}

/// Forces the leading arrival slots of a tick to fixed classes inside a tick window.
///
/// Applied after sampling, only when the tick has at least `forced.len()` arrivals.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PriorityOverride {
    pub first_tick: u64,
    pub last_tick: u64,
    pub forced: Vec<RequestClass>,
}

impl PriorityOverride {
    pub fn apply(&self, tick: u64, classes: &mut [RequestClass]) {
        if tick < self.first_tick || tick > self.last_tick || classes.len() < self.forced.len() {
            return;
        }
        classes[..self.forced.len()].copy_from_slice(&self.forced);
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct ScenarioDef {
    pub id: String,
    pub tick_count: u64,
    pub tick_duration_ms: u64,
    pub capacity: usize,
    pub service_ticks: i64,
    pub reject_threshold: usize,
    /// Class subject to overload rejection.
    pub shed_class: RequestClass,
    pub class_weights: Vec<ClassWeight>,
    pub arrival_steps: Vec<ArrivalStep>,
    /// Arrivals per tick once every step has been passed.
    pub tail_arrivals: u32,
    pub priority_override: Option<PriorityOverride>,
}

impl ScenarioDef {
    /// Look up a registered scenario by its exact id.
    ///
    /// No defaulting happens here; callers holding a [`contracts::RunConfig`]
    /// go through `effective_scenario_id` first.
    pub fn resolve(scenario_id: &str) -> Result<Self, KernelError> {
        match scenario_id {
            CANONICAL_SCENARIO_ID => {
                debug!(scenario_id, "resolved scenario");
                Ok(Self::canonical_v1())
            }
            other => Err(KernelError::UnknownScenario {
                scenario_id: other.to_string(),
            }),
        }
    }

    pub fn canonical_v1() -> Self {
        Self {
            id: CANONICAL_SCENARIO_ID.to_string(),
            tick_count: 240,
            tick_duration_ms: 250,
            capacity: 3,
            service_ticks: 1,
            reject_threshold: 12,
            shed_class: RequestClass::Anon,
            class_weights: vec![
                ClassWeight {
                    class: RequestClass::Anon,
                    cumulative: 0.55,
                },
                ClassWeight {
                    class: RequestClass::Free,
                    cumulative: 0.85,
                },
                ClassWeight {
                    class: RequestClass::Paid,
                    cumulative: 1.0,
                },
            ],
            arrival_steps: vec![
                ArrivalStep {
                    until_tick: 110,
                    count: 1,
                },
                ArrivalStep {
                    until_tick: 150,
                    count: 2,
                },
                ArrivalStep {
                    until_tick: 180,
                    count: 4,
                },
                ArrivalStep {
                    until_tick: 210,
                    count: 3,
                },
            ],
            tail_arrivals: 1,
            priority_override: Some(PriorityOverride {
                first_tick: 150,
                last_tick: 190,
                forced: vec![RequestClass::Paid, RequestClass::Free],
            }),
        }
    }

    pub fn arrival_count(&self, tick: u64) -> u32 {
        self.arrival_steps
            .iter()
            .find(|step| tick < step.until_tick)
            .map(|step| step.count)
            .unwrap_or(self.tail_arrivals)
    }

    pub fn total_duration_ms(&self) -> u64 {
        self.tick_count.saturating_mul(self.tick_duration_ms)
    }

    pub fn time_ms(&self, tick: u64) -> u64 {
        tick.saturating_mul(self.tick_duration_ms)
    }

    /// Map a uniform draw in `[0, 1)` onto the class distribution.
    pub fn class_for_draw(&self, draw: f64) -> RequestClass {
        self.class_weights
            .iter()
            .find(|weight| draw < weight.cumulative)
            .or_else(|| self.class_weights.last())
            .map(|weight| weight.class)
            .unwrap_or(RequestClass::lowest())
    }
}
