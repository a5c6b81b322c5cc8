use contracts::{RequestClass, RequestState, StageId, TokenSnapshot, NOT_QUEUED};

pub type TokenIndex = usize;

/// One request moving through the stages. Tokens are never removed from a run.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Token {
    pub id: String,
    pub class: RequestClass,
    pub state: RequestState,
    pub stage_id: StageId,
    /// Position across all class queues; [`NOT_QUEUED`] unless `state` is queued.
    pub queue_index: i64,
    /// Only meaningful while processing.
    pub service_remaining: i64,
    pub arrival_tick: u64,
}

impl Token {
    pub fn new(id: String, class: RequestClass, arrival_tick: u64, state: RequestState) -> Self {
        Self {
            id,
            class,
            state,
            stage_id: state.stage(),
            queue_index: NOT_QUEUED,
            service_remaining: 0,
            arrival_tick,
        }
    }

    pub fn begin_service(&mut self, service_ticks: i64) {
        self.state = RequestState::Processing;
        self.stage_id = StageId::Service;
        self.queue_index = NOT_QUEUED;
        self.service_remaining = service_ticks;
    }

    pub fn complete(&mut self) {
        self.state = RequestState::Done;
        self.stage_id = StageId::Done;
        self.queue_index = NOT_QUEUED;
    }

    pub fn snapshot(&self) -> TokenSnapshot {
        TokenSnapshot {
            id: self.id.clone(),
            class: self.class,
            state: self.state,
            stage_id: self.stage_id,
            queue_index: self.queue_index,
            service_remaining: self.service_remaining,
        }
    }
}

/// Monotonic `T0000`, `T0001`, ... id source.
#[derive(Debug, Clone, Default)]
pub struct TokenIdAllocator {
    next: u64,
}

impl TokenIdAllocator {
    pub fn next_id(&mut self) -> String {
        let id = format!("T{:04}", self.next);
        self.next = self.next.saturating_add(1);
        id
    }
}
