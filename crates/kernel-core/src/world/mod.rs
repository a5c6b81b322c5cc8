use contracts::{
    Event, EventType, RequestClass, RequestState, Snapshot, StageId, StageSnapshot, NOT_QUEUED,
};
use tracing::debug;

mod events;
mod init;
mod snapshot;
mod step;

use crate::admission::{Admission, AdmissionPolicy};
use crate::queues::ClassQueues;
use crate::sampler::ClassSampler;
use crate::scenario::ScenarioDef;
use crate::scheduler::{ServicePool, ServiceScheduler};
use crate::token::{Token, TokenIdAllocator, TokenIndex};

/// Per-tick counters, kept for the most recent step only.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct StepMetrics {
    pub tick: u64,
    pub completed: u64,
    pub arrived: u64,
    pub rejected: u64,
    pub scheduled: u64,
    pub queued_after: u64,
}

/// Exclusive run context: every piece of mutable simulation state for one run.
///
/// Nothing here is shared across runs; a new world is built per run and
/// dropped once its trace has been taken.
#[derive(Debug)]
pub struct AdmissionWorld {
    scenario: ScenarioDef,
    sampler: ClassSampler,
    admission: AdmissionPolicy,
    scheduler: ServiceScheduler,
    token_ids: TokenIdAllocator,
    tokens: Vec<Token>,
    queues: ClassQueues,
    pool: ServicePool,
    snapshot_log: Vec<Snapshot>,
    event_log: Vec<Event>,
    next_tick: u64,
    last_step_metrics: StepMetrics,
}

impl AdmissionWorld {
    pub fn scenario(&self) -> &ScenarioDef {
        &self.scenario
    }

    /// Number of ticks executed so far.
    pub fn current_tick(&self) -> u64 {
        self.next_tick
    }

    pub fn is_complete(&self) -> bool {
        self.next_tick >= self.scenario.tick_count
    }

    pub fn tokens(&self) -> &[Token] {
        &self.tokens
    }

    pub fn queued_total(&self) -> usize {
        self.queues.total_len()
    }

    pub fn in_service(&self) -> usize {
        self.pool.len()
    }

    pub fn events(&self) -> &[Event] {
        &self.event_log
    }

    pub fn snapshots(&self) -> &[Snapshot] {
        &self.snapshot_log
    }

    pub fn last_step_metrics(&self) -> StepMetrics {
        self.last_step_metrics
    }

    /// Hand over the recorded trace, consuming the run context.
    pub fn into_trace(self) -> (Vec<Snapshot>, Vec<Event>) {
        (self.snapshot_log, self.event_log)
    }
}
