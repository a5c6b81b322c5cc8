//! Service pool and strict-priority scheduler.
//!
//! `ServicePool` owns the bounded set of in-service tokens and never grows past
//! its capacity. `ServiceScheduler` fills spare slots from [`ClassQueues`],
//! draining a higher class completely before looking at the next one. Lower
//! classes can starve; that trade-off is what the trace exists to show.

use crate::queues::ClassQueues;
use crate::token::{Token, TokenIndex};

#[derive(Debug, Clone)]
pub struct ServicePool {
    capacity: usize,
    in_service: Vec<TokenIndex>,
}

impl ServicePool {
    pub fn new(capacity: usize) -> Self {
        Self {
            capacity,
            in_service: Vec::with_capacity(capacity),
        }
    }

    pub fn capacity(&self) -> usize {
        self.capacity
    }

    pub fn len(&self) -> usize {
        self.in_service.len()
    }

    pub fn is_empty(&self) -> bool {
        self.in_service.is_empty()
    }

    pub fn spare(&self) -> usize {
        self.capacity.saturating_sub(self.in_service.len())
    }

    pub fn members(&self) -> &[TokenIndex] {
        &self.in_service
    }

    /// Returns `false` without inserting when the pool is already full.
    pub fn try_start(&mut self, token: TokenIndex) -> bool {
        if self.spare() == 0 {
            return false;
        }
        self.in_service.push(token);
        true
    }

    /// Decrement every in-service token and release the ones that ran out.
    ///
    /// Released tokens are returned in service-entry order; survivors keep
    /// their relative order.
    pub fn advance(&mut self, tokens: &mut [Token]) -> Vec<TokenIndex> {
        let mut finished = Vec::new();
        self.in_service.retain(|&index| {
            let Some(token) = tokens.get_mut(index) else {
                return false;
            };
            token.service_remaining -= 1;
            if token.service_remaining <= 0 {
                finished.push(index);
                false
            } else {
                true
            }
        });
        finished
    }
}

#[derive(Debug, Clone, Copy)]
pub struct ServiceScheduler {
    service_ticks: i64,
}

impl ServiceScheduler {
    pub fn new(service_ticks: i64) -> Self {
        Self { service_ticks }
    }

    /// Move queued tokens into service until capacity or the queues run out.
    ///
    /// Returns the scheduled tokens in the order they entered service.
    pub fn fill(
        &self,
        queues: &mut ClassQueues,
        pool: &mut ServicePool,
        tokens: &mut [Token],
    ) -> Vec<TokenIndex> {
        let mut scheduled = Vec::new();
        while pool.spare() > 0 {
            let Some((_, index)) = queues.pop_next() else {
                break;
            };
            if !pool.try_start(index) {
                break;
            }
            if let Some(token) = tokens.get_mut(index) {
                token.begin_service(self.service_ticks);
            }
            scheduled.push(index);
        }
        scheduled
    }
}

#[cfg(test)]
mod tests {
    use contracts::{RequestClass, RequestState};

    use super::*;

    fn queued(id: usize, class: RequestClass) -> Token {
        Token::new(format!("T{id:04}"), class, 0, RequestState::Queued)
    }

    #[test]
    fn pool_never_exceeds_capacity() {
        let mut pool = ServicePool::new(2);
        assert!(pool.try_start(0));
        assert!(pool.try_start(1));
        assert!(!pool.try_start(2));
        assert_eq!(pool.len(), 2);
        assert_eq!(pool.spare(), 0);
    }

    #[test]
    fn advance_releases_exhausted_tokens_in_order() {
        let mut tokens = vec![
            queued(0, RequestClass::Paid),
            queued(1, RequestClass::Free),
            queued(2, RequestClass::Anon),
        ];
        tokens[0].begin_service(1);
        tokens[1].begin_service(2);
        tokens[2].begin_service(1);
        let mut pool = ServicePool::new(3);
        for index in 0..3 {
            assert!(pool.try_start(index));
        }

        let finished = pool.advance(&mut tokens);
        assert_eq!(finished, vec![0, 2]);
        assert_eq!(pool.members(), &[1]);
        assert_eq!(tokens[1].service_remaining, 1);

        let finished = pool.advance(&mut tokens);
        assert_eq!(finished, vec![1]);
        assert!(pool.is_empty());
    }

    #[test]
    fn fill_drains_higher_class_first_and_stops_at_capacity() {
        let mut tokens = vec![
            queued(0, RequestClass::Anon),
            queued(1, RequestClass::Free),
            queued(2, RequestClass::Paid),
            queued(3, RequestClass::Paid),
        ];
        let mut queues = ClassQueues::new();
        for (index, token) in tokens.iter().enumerate() {
            queues.push_back(token.class, index);
        }
        let mut pool = ServicePool::new(3);
        let scheduler = ServiceScheduler::new(1);

        let scheduled = scheduler.fill(&mut queues, &mut pool, &mut tokens);
        assert_eq!(scheduled, vec![2, 3, 1]);
        assert_eq!(pool.spare(), 0);
        assert_eq!(queues.total_len(), 1);
        assert_eq!(tokens[0].state, RequestState::Queued);
        assert!(scheduled
            .iter()
            .all(|&index| tokens[index].state == RequestState::Processing
                && tokens[index].service_remaining == 1));
    }

    #[test]
    fn only_pooled_tokens_enter_processing() {
        let mut tokens = (0..4)
            .map(|id| queued(id, RequestClass::Free))
            .collect::<Vec<_>>();
        let mut queues = ClassQueues::new();
        for index in 0..tokens.len() {
            queues.push_back(RequestClass::Free, index);
        }
        let mut pool = ServicePool::new(1);
        let scheduler = ServiceScheduler::new(2);

        assert_eq!(scheduler.fill(&mut queues, &mut pool, &mut tokens), vec![0]);
        assert!(scheduler.fill(&mut queues, &mut pool, &mut tokens).is_empty());

        let processing = tokens
            .iter()
            .enumerate()
            .filter(|(_, token)| token.state == RequestState::Processing)
            .map(|(index, _)| index)
            .collect::<Vec<_>>();
        assert_eq!(processing, pool.members());
        assert_eq!(queues.total_len(), 3);
    }

    #[test]
    fn fill_with_empty_queues_is_noop() {
        let mut tokens = Vec::new();
        let mut queues = ClassQueues::new();
        let mut pool = ServicePool::new(3);
        let scheduled = ServiceScheduler::new(1).fill(&mut queues, &mut pool, &mut tokens);
        assert!(scheduled.is_empty());
        assert_eq!(pool.spare(), 3);
    }
}
