//! Queue-or-reject decision for arrivals. Outright rejection is the only backpressure.

use contracts::{EventType, RequestClass};

use crate::scenario::ScenarioDef;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Admission {
    Queued,
    Rejected,
}

impl Admission {
    pub fn event_type(self) -> EventType {
        match self {
            Self::Queued => EventType::Queue,
            Self::Rejected => EventType::Reject,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct AdmissionPolicy {
    pub reject_threshold: usize,
    pub shed_class: RequestClass,
}

impl AdmissionPolicy {
    pub fn from_scenario(scenario: &ScenarioDef) -> Self {
        Self {
            reject_threshold: scenario.reject_threshold,
            shed_class: scenario.shed_class,
        }
    }

    /// `queued_total` is the combined length of all class queues before this arrival.
    pub fn decide(&self, class: RequestClass, queued_total: usize) -> Admission {
        if class == self.shed_class && queued_total >= self.reject_threshold {
            Admission::Rejected
        } else {
            Admission::Queued
        }
    }
}
