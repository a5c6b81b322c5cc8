use super::*;

impl AdmissionWorld {
    /// Project the current token table and stage counters into an immutable snapshot.
    pub fn snapshot_for_tick(&self, tick: u64) -> Snapshot {
        Snapshot {
            tick,
            time_ms: self.scenario.time_ms(tick),
            tokens: self.tokens.iter().map(Token::snapshot).collect(),
            stages: self.stage_snapshots(),
        }
    }

    pub(super) fn capture_snapshot(&mut self, tick: u64) {
        let snapshot = self.snapshot_for_tick(tick);
        self.snapshot_log.push(snapshot);
    }

    fn stage_snapshots(&self) -> Vec<StageSnapshot> {
        StageId::ALL
            .iter()
            .map(|&id| match id {
                StageId::Queue => StageSnapshot {
                    id,
                    queue_length: self.queues.total_len() as u64,
                    capacity_used: 0,
                    capacity_total: 0,
                },
                StageId::Service => StageSnapshot {
                    id,
                    queue_length: 0,
                    capacity_used: self.pool.len() as u64,
                    capacity_total: self.pool.capacity() as u64,
                },
                StageId::Done | StageId::Rejected => StageSnapshot {
                    id,
                    queue_length: 0,
                    capacity_used: 0,
                    capacity_total: 0,
                },
            })
            .collect()
    }
}
