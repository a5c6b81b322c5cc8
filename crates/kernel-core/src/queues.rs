//! Per-class FIFO holding areas.
//!
//! Each class has its own `VecDeque`. Within a class order is arrival order;
//! across classes [`RequestClass::PRIORITY_ORDER`] decides who leaves first.

use std::collections::{BTreeMap, VecDeque};

use contracts::RequestClass;

use crate::token::TokenIndex;

#[derive(Debug, Clone)]
pub struct ClassQueues {
    lanes: BTreeMap<RequestClass, VecDeque<TokenIndex>>,
}

impl Default for ClassQueues {
    fn default() -> Self {
        Self::new()
    }
}

impl ClassQueues {
    pub fn new() -> Self {
        let lanes = RequestClass::PRIORITY_ORDER
            .iter()
            .map(|class| (*class, VecDeque::new()))
            .collect();
        Self { lanes }
    }

    pub fn push_back(&mut self, class: RequestClass, token: TokenIndex) {
        self.lanes.entry(class).or_default().push_back(token);
    }

    /// Pop the head of the highest-priority non-empty lane.
    pub fn pop_next(&mut self) -> Option<(RequestClass, TokenIndex)> {
        RequestClass::PRIORITY_ORDER.iter().find_map(|class| {
            self.lanes
                .get_mut(class)
                .and_then(VecDeque::pop_front)
                .map(|token| (*class, token))
        })
    }

    pub fn len(&self, class: RequestClass) -> usize {
        self.lanes.get(&class).map(VecDeque::len).unwrap_or(0)
    }

    pub fn total_len(&self) -> usize {
        self.lanes.values().map(VecDeque::len).sum()
    }

    pub fn is_empty(&self) -> bool {
        self.total_len() == 0
    }

    /// All waiting tokens, highest-priority lane first, FIFO inside each lane.
    pub fn iter_priority_order(&self) -> impl Iterator<Item = TokenIndex> + '_ {
        RequestClass::PRIORITY_ORDER
            .iter()
            .filter_map(|class| self.lanes.get(class))
            .flat_map(|lane| lane.iter().copied())
    }
}
