use super::*;

impl AdmissionWorld {
    /// Execute the next tick. Returns `false` once every tick has run.
    ///
    /// Phase order is fixed: completion frees capacity before the same tick's
    /// arrivals can be scheduled, and the snapshot is taken only after the
    /// tick has fully settled.
    pub fn step(&mut self) -> bool {
        if self.is_complete() {
            return false;
        }
        let tick = self.next_tick;

        let completed = self.complete_service(tick);
        let (arrived, rejected) = self.process_arrivals(tick);
        let scheduled = self.schedule(tick);
        self.reindex_queues();
        self.capture_snapshot(tick);

        self.last_step_metrics = StepMetrics {
            tick,
            completed,
            arrived,
            rejected,
            scheduled,
            queued_after: self.queues.total_len() as u64,
        };
        debug!(
            tick,
            completed,
            arrived,
            rejected,
            scheduled,
            queued = self.queues.total_len(),
            in_service = self.pool.len(),
            "tick settled"
        );
        self.next_tick = tick.saturating_add(1);
        true
    }

    pub fn step_n(&mut self, n: u64) -> u64 {
        let mut committed = 0_u64;
        for _ in 0..n {
            if !self.step() {
                break;
            }
            committed += 1;
        }
        committed
    }

    pub fn run_to_end(&mut self) -> u64 {
        let mut committed = 0_u64;
        while self.step() {
            committed += 1;
        }
        committed
    }

    /// Create a token for one arrival and queue or reject it.
    ///
    /// The rejection check sees the combined queue length before this token
    /// is added. Either way exactly one event is recorded.
    pub fn admit(&mut self, class: RequestClass, tick: u64) -> Admission {
        let decision = self.admission.decide(class, self.queues.total_len());
        let state = match decision {
            Admission::Queued => RequestState::Queued,
            Admission::Rejected => RequestState::Rejected,
        };
        let index = self.tokens.len();
        let id = self.token_ids.next_id();
        self.tokens.push(Token::new(id, class, tick, state));
        if decision == Admission::Queued {
            self.queues.push_back(class, index);
        }
        self.record_event(tick, decision.event_type(), index);
        decision
    }

    fn complete_service(&mut self, tick: u64) -> u64 {
        let finished = self.pool.advance(&mut self.tokens);
        for &index in &finished {
            if let Some(token) = self.tokens.get_mut(index) {
                token.complete();
            }
            self.record_event(tick, EventType::Complete, index);
        }
        finished.len() as u64
    }

    fn process_arrivals(&mut self, tick: u64) -> (u64, u64) {
        let count = self.scenario.arrival_count(tick);
        let classes = self.sampler.arrival_classes(&self.scenario, tick, count);
        let mut rejected = 0_u64;
        for class in &classes {
            if self.admit(*class, tick) == Admission::Rejected {
                rejected += 1;
            }
        }
        (classes.len() as u64, rejected)
    }

    fn schedule(&mut self, tick: u64) -> u64 {
        let scheduled = self
            .scheduler
            .fill(&mut self.queues, &mut self.pool, &mut self.tokens);
        for &index in &scheduled {
            self.record_event(tick, EventType::Schedule, index);
        }
        scheduled.len() as u64
    }

    /// Renumber every waiting token across the priority-ordered concatenation
    /// of class queues. Tokens outside the queues keep the sentinel.
    pub(super) fn reindex_queues(&mut self) {
        for token in &mut self.tokens {
            if token.state == RequestState::Queued {
                token.queue_index = NOT_QUEUED;
            }
        }
        for (position, index) in self.queues.iter_priority_order().enumerate() {
            if let Some(token) = self.tokens.get_mut(index) {
                token.queue_index = position as i64;
            }
        }
    }
}
