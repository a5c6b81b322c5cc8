//! Seeded class assignment for arrivals.

use contracts::RequestClass;
use rand::{Rng, SeedableRng};
use rand_chacha::ChaCha8Rng;

use crate::scenario::ScenarioDef;

/// Run-owned pseudo-random source. Same seed, same class sequence.
#[derive(Debug, Clone)]
pub struct ClassSampler {
    rng: ChaCha8Rng,
}

impl ClassSampler {
    pub fn new(seed: i64) -> Self {
        Self {
            rng: ChaCha8Rng::seed_from_u64(seed as u64),
        }
    }

    pub fn sample(&mut self, scenario: &ScenarioDef) -> RequestClass {
        let draw = self.rng.gen::<f64>();
        scenario.class_for_draw(draw)
    }

    /// Classes for one tick's arrivals: every slot is sampled first, then the
    /// scenario override (if any) rewrites the leading slots.
    pub fn arrival_classes(
        &mut self,
        scenario: &ScenarioDef,
        tick: u64,
        count: u32,
    ) -> Vec<RequestClass> {
        let mut classes = (0..count)
            .map(|_| self.sample(scenario))
            .collect::<Vec<_>>();
        if let Some(window) = &scenario.priority_override {
            window.apply(tick, &mut classes);
        }
        classes
    }
}
