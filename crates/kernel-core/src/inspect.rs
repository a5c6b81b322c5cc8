//! Read-only analysis of a finished artifact: per-class outcomes and trace checks.

use std::collections::BTreeMap;
use std::fmt;

use contracts::{Artifact, EventType, RequestClass, RequestState, StageId};
use serde::Serialize;

#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct ClassSummary {
    pub arrived: u64,
    pub queued: u64,
    pub rejected: u64,
    pub scheduled: u64,
    pub completed: u64,
    /// Mean ticks between admission and scheduling, over scheduled tokens.
    pub mean_wait_ticks: Option<f64>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct RunSummary {
    pub scenario_id: String,
    pub seed: i64,
    pub replay_id: String,
    pub total_events: usize,
    pub peak_queue_length: u64,
    pub peak_capacity_used: u64,
    pub per_class: BTreeMap<RequestClass, ClassSummary>,
}

impl fmt::Display for RunSummary {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(
            f,
            "scenario_id={} seed={} replay_id={}",
            self.scenario_id, self.seed, self.replay_id
        )?;
        writeln!(
            f,
            "events={} peak_queue_length={} peak_capacity_used={}",
            self.total_events, self.peak_queue_length, self.peak_capacity_used
        )?;
        for class in RequestClass::PRIORITY_ORDER {
            let Some(summary) = self.per_class.get(&class) else {
                continue;
            };
            let wait = summary
                .mean_wait_ticks
                .map(|value| format!("{value:.2}"))
                .unwrap_or_else(|| "n/a".to_string());
            writeln!(
                f,
                "  {class}: arrived={} queued={} rejected={} scheduled={} completed={} mean_wait_ticks={wait}",
                summary.arrived, summary.queued, summary.rejected, summary.scheduled, summary.completed
            )?;
        }
        Ok(())
    }
}

pub fn summarize(artifact: &Artifact) -> RunSummary {
    let mut per_class = RequestClass::PRIORITY_ORDER
        .iter()
        .map(|class| (*class, ClassSummary::default()))
        .collect::<BTreeMap<_, _>>();
    let mut queued_at = BTreeMap::<&str, u64>::new();
    let mut wait_totals = BTreeMap::<RequestClass, u64>::new();

    for event in &artifact.events {
        let summary = per_class.entry(event.class).or_default();
        match event.event_type {
            EventType::Queue => {
                summary.arrived += 1;
                summary.queued += 1;
                queued_at.insert(event.token_id.as_str(), event.tick);
            }
            EventType::Reject => {
                summary.arrived += 1;
                summary.rejected += 1;
            }
            EventType::Schedule => {
                summary.scheduled += 1;
                if let Some(admitted) = queued_at.get(event.token_id.as_str()) {
                    *wait_totals.entry(event.class).or_insert(0) +=
                        event.tick.saturating_sub(*admitted);
                }
            }
            EventType::Complete => summary.completed += 1,
        }
    }
    for (class, summary) in per_class.iter_mut() {
        if summary.scheduled > 0 {
            let total = wait_totals.get(class).copied().unwrap_or(0);
            summary.mean_wait_ticks = Some(total as f64 / summary.scheduled as f64);
        }
    }

    let peak = |stage: StageId, pick: fn(&contracts::StageSnapshot) -> u64| {
        artifact
            .snapshots
            .iter()
            .filter_map(|snapshot| snapshot.stage(stage))
            .map(pick)
            .max()
            .unwrap_or(0)
    };

    RunSummary {
        scenario_id: artifact.metadata.scenario_id.clone(),
        seed: artifact.metadata.seed,
        replay_id: artifact.metadata.replay_id.clone(),
        total_events: artifact.events.len(),
        peak_queue_length: peak(StageId::Queue, |stage| stage.queue_length),
        peak_capacity_used: peak(StageId::Service, |stage| stage.capacity_used),
        per_class,
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TraceViolation {
    DurationMismatch {
        tick_count: u64,
        tick_duration_ms: u64,
        total_duration_ms: u64,
    },
    MalformedReplayId(String),
    SnapshotCountMismatch { expected: u64, found: usize },
    SnapshotOutOfOrder { position: usize, tick: u64 },
    CapacityExceeded { tick: u64, used: u64, total: u64 },
    StageStateMismatch { tick: u64, token_id: String },
    TokenMissing { tick: u64, token_id: String },
    TerminalStateChanged {
        tick: u64,
        token_id: String,
        from: RequestState,
        to: RequestState,
    },
}

impl fmt::Display for TraceViolation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::DurationMismatch {
                tick_count,
                tick_duration_ms,
                total_duration_ms,
            } => write!(
                f,
                "total_duration_ms={total_duration_ms} != tick_count={tick_count} * tick_duration_ms={tick_duration_ms}"
            ),
            Self::MalformedReplayId(id) => write!(f, "replay_id is not 64 hex chars: {id:?}"),
            Self::SnapshotCountMismatch { expected, found } => {
                write!(f, "expected {expected} snapshots, found {found}")
            }
            Self::SnapshotOutOfOrder { position, tick } => {
                write!(f, "snapshot at position {position} has tick {tick}")
            }
            Self::CapacityExceeded { tick, used, total } => {
                write!(f, "tick {tick}: capacity_used={used} exceeds capacity_total={total}")
            }
            Self::StageStateMismatch { tick, token_id } => {
                write!(f, "tick {tick}: token {token_id} stage disagrees with state")
            }
            Self::TokenMissing { tick, token_id } => {
                write!(f, "tick {tick}: token {token_id} disappeared from the token set")
            }
            Self::TerminalStateChanged {
                tick,
                token_id,
                from,
                to,
            } => write!(
                f,
                "tick {tick}: token {token_id} left terminal state {from:?} for {to:?}"
            ),
        }
    }
}

/// Check the standing invariants of an exported trace. An empty result means the trace is sound.
pub fn validate_trace(artifact: &Artifact) -> Vec<TraceViolation> {
    let mut violations = Vec::new();
    let metadata = &artifact.metadata;

    if !metadata.duration_consistent() {
        violations.push(TraceViolation::DurationMismatch {
            tick_count: metadata.tick_count,
            tick_duration_ms: metadata.tick_duration_ms,
            total_duration_ms: metadata.total_duration_ms,
        });
    }
    let replay_id_ok = metadata.replay_id.len() == 64
        && metadata
            .replay_id
            .chars()
            .all(|c| c.is_ascii_hexdigit());
    if !replay_id_ok {
        violations.push(TraceViolation::MalformedReplayId(metadata.replay_id.clone()));
    }
    if artifact.snapshots.len() as u64 != metadata.tick_count {
        violations.push(TraceViolation::SnapshotCountMismatch {
            expected: metadata.tick_count,
            found: artifact.snapshots.len(),
        });
    }

    let mut last_state = BTreeMap::<&str, RequestState>::new();
    for (position, snapshot) in artifact.snapshots.iter().enumerate() {
        if snapshot.tick != position as u64 {
            violations.push(TraceViolation::SnapshotOutOfOrder {
                position,
                tick: snapshot.tick,
            });
        }
        if let Some(service) = snapshot.stage(StageId::Service) {
            if service.capacity_used > service.capacity_total {
                violations.push(TraceViolation::CapacityExceeded {
                    tick: snapshot.tick,
                    used: service.capacity_used,
                    total: service.capacity_total,
                });
            }
        }
        for token in &snapshot.tokens {
            if token.stage_id != token.state.stage() {
                violations.push(TraceViolation::StageStateMismatch {
                    tick: snapshot.tick,
                    token_id: token.id.clone(),
                });
            }
            if let Some(previous) = last_state.get(token.id.as_str()) {
                if previous.is_terminal() && *previous != token.state {
                    violations.push(TraceViolation::TerminalStateChanged {
                        tick: snapshot.tick,
                        token_id: token.id.clone(),
                        from: *previous,
                        to: token.state,
                    });
                }
            }
        }
        for token_id in last_state.keys() {
            if snapshot.token(token_id).is_none() {
                violations.push(TraceViolation::TokenMissing {
                    tick: snapshot.tick,
                    token_id: (*token_id).to_string(),
                });
            }
        }
        for token in &snapshot.tokens {
            last_state.insert(token.id.as_str(), token.state);
        }
    }

    violations
}

#[cfg(test)]
mod tests {
    use contracts::RunConfig;

    use super::*;
    use crate::artifact::run;

    #[test]
    fn canonical_run_validates_clean() {
        let artifact = run(&RunConfig::default()).expect("canonical run");
        assert_eq!(validate_trace(&artifact), Vec::new());
    }

    #[test]
    fn summary_accounts_for_every_arrival() {
        let artifact = run(&RunConfig::default()).expect("canonical run");
        let summary = summarize(&artifact);
        let arrivals = artifact
            .events
            .iter()
            .filter(|event| matches!(event.event_type, EventType::Queue | EventType::Reject))
            .count() as u64;
        let summed = summary
            .per_class
            .values()
            .map(|class| class.arrived)
            .sum::<u64>();
        assert_eq!(summed, arrivals);
        assert!(summary.peak_capacity_used <= 3);
        let anon = &summary.per_class[&RequestClass::Anon];
        assert_eq!(anon.arrived, anon.queued + anon.rejected);
        assert_eq!(summary.per_class[&RequestClass::Paid].rejected, 0);
        assert_eq!(summary.per_class[&RequestClass::Free].rejected, 0);
        assert!(summary.to_string().contains("PAID: arrived="));
    }

    #[test]
    fn tampered_trace_reports_violations() {
        let mut artifact = run(&RunConfig::default()).expect("canonical run");
        artifact.metadata.total_duration_ms += 1;
        artifact.metadata.replay_id = "xyz".to_string();
        if let Some(service) = artifact.snapshots[5]
            .stages
            .iter_mut()
            .find(|stage| stage.id == StageId::Service)
        {
            service.capacity_used = service.capacity_total + 1;
        }
        let violations = validate_trace(&artifact);
        assert!(violations
            .iter()
            .any(|v| matches!(v, TraceViolation::DurationMismatch { .. })));
        assert!(violations
            .iter()
            .any(|v| matches!(v, TraceViolation::MalformedReplayId(_))));
        assert!(violations
            .iter()
            .any(|v| matches!(v, TraceViolation::CapacityExceeded { tick: 5, .. })));
    }

    #[test]
    fn resurrected_token_is_flagged() {
        let mut artifact = run(&RunConfig::default()).expect("canonical run");
        let (tick, token_id) = artifact
            .snapshots
            .iter()
            .find_map(|snapshot| {
                snapshot
                    .tokens
                    .iter()
                    .find(|token| token.state == RequestState::Done)
                    .map(|token| (snapshot.tick, token.id.clone()))
            })
            .expect("some token completes");
        let later = usize::try_from(tick + 1).expect("tick fits usize");
        if let Some(token) = artifact.snapshots[later]
            .tokens
            .iter_mut()
            .find(|token| token.id == token_id)
        {
            token.state = RequestState::Queued;
            token.stage_id = StageId::Queue;
        }
        let violations = validate_trace(&artifact);
        assert!(violations.iter().any(|v| matches!(
            v,
            TraceViolation::TerminalStateChanged { from: RequestState::Done, to: RequestState::Queued, .. }
        )));
    }
}
