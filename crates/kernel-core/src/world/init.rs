use super::*;

impl AdmissionWorld {
    pub fn new(scenario: ScenarioDef, seed: i64) -> Self {
        let tick_count = usize::try_from(scenario.tick_count).unwrap_or(0);
        debug!(
            scenario_id = %scenario.id,
            seed,
            tick_count = scenario.tick_count,
            capacity = scenario.capacity,
            "initializing admission world"
        );
        Self {
            sampler: ClassSampler::new(seed),
            admission: AdmissionPolicy::from_scenario(&scenario),
            scheduler: ServiceScheduler::new(scenario.service_ticks),
            token_ids: TokenIdAllocator::default(),
            tokens: Vec::new(),
            queues: ClassQueues::new(),
            pool: ServicePool::new(scenario.capacity),
            snapshot_log: Vec::with_capacity(tick_count),
            event_log: Vec::new(),
            next_tick: 0,
            last_step_metrics: StepMetrics::default(),
            scenario,
        }
    }
}
