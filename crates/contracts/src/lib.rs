//! v1 cross-boundary contracts for the admission kernel, its CLI, and trace consumers.

use std::fmt;

use serde::{Deserialize, Serialize};

pub mod serde_seed;

pub const ENGINE_VERSION: &str = "0.1.0";
pub const CANONICAL_SCENARIO_ID: &str = "canonical_v1";

/// Wire sentinel for `queue_index` on tokens that are not waiting in a queue.
///
/// Playback consumers key off the literal `-1`, so this stays a plain integer
/// rather than an optional field.
pub const NOT_QUEUED: i64 = -1;

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct RunConfig {
    #[serde(default)]
    pub scenario_id: String,
    #[serde(with = "serde_seed")]
    pub seed: i64,
}

impl RunConfig {
    pub fn new(scenario_id: impl Into<String>, seed: i64) -> Self {
        Self {
            scenario_id: scenario_id.into(),
            seed,
        }
    }

    /// Scenario id with the empty string mapped to the canonical scenario.
    ///
    /// Only the exact empty string defaults; anything else, whitespace
    /// included, is looked up as given.
    pub fn effective_scenario_id(&self) -> &str {
        if self.scenario_id.is_empty() {
            CANONICAL_SCENARIO_ID
        } else {
            &self.scenario_id
        }
    }
}

impl Default for RunConfig {
    fn default() -> Self {
        Self {
            scenario_id: CANONICAL_SCENARIO_ID.to_string(),
            seed: 1,
        }
    }
}

/// Priority tier of a request. Declaration order is lowest to highest priority.
#[derive(
    Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash, PartialOrd, Ord,
)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum RequestClass {
    Anon,
    Free,
    Paid,
}

impl RequestClass {
    /// Drain order used by the scheduler and by queue index numbering.
    pub const PRIORITY_ORDER: [RequestClass; 3] =
        [RequestClass::Paid, RequestClass::Free, RequestClass::Anon];

    pub fn lowest() -> Self {
        Self::Anon
    }

    pub fn as_str(self) -> &'static str {
        match self {
            Self::Anon => "ANON",
            Self::Free => "FREE",
            Self::Paid => "PAID",
        }
    }
}

impl fmt::Display for RequestClass {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash)]
#[serde(rename_all = "snake_case")]
pub enum RequestState {
    Queued,
    Processing,
    Done,
    Rejected,
}

impl RequestState {
    pub fn is_terminal(self) -> bool {
        matches!(self, Self::Done | Self::Rejected)
    }

    pub fn stage(self) -> StageId {
        match self {
            Self::Queued => StageId::Queue,
            Self::Processing => StageId::Service,
            Self::Done => StageId::Done,
            Self::Rejected => StageId::Rejected,
        }
    }
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash)]
#[serde(rename_all = "snake_case")]
pub enum StageId {
    Queue,
    Service,
    Done,
    Rejected,
}

impl StageId {
    pub const ALL: [StageId; 4] = [
        StageId::Queue,
        StageId::Service,
        StageId::Done,
        StageId::Rejected,
    ];
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum EventType {
    Queue,
    Schedule,
    Complete,
    Reject,
}

impl EventType {
    pub fn reason_code(self) -> ReasonCode {
        match self {
            Self::Queue => ReasonCode::QueueAdmission,
            Self::Schedule => ReasonCode::PrioritySchedule,
            Self::Complete => ReasonCode::ServiceComplete,
            Self::Reject => ReasonCode::RejectOverload,
        }
    }

    pub fn resulting_stage(self) -> StageId {
        match self {
            Self::Queue => StageId::Queue,
            Self::Schedule => StageId::Service,
            Self::Complete => StageId::Done,
            Self::Reject => StageId::Rejected,
        }
    }
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum ReasonCode {
    QueueAdmission,
    PrioritySchedule,
    ServiceComplete,
    RejectOverload,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct Metadata {
    pub scenario_id: String,
    #[serde(with = "serde_seed")]
    pub seed: i64,
    pub engine_version: String,
    pub replay_id: String,
    pub tick_count: u64,
    pub tick_duration_ms: u64,
    pub total_duration_ms: u64,
}

impl Metadata {
    pub fn duration_consistent(&self) -> bool {
        self.tick_count.checked_mul(self.tick_duration_ms) == Some(self.total_duration_ms)
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct TokenSnapshot {
    pub id: String,
    pub class: RequestClass,
    pub state: RequestState,
    pub stage_id: StageId,
    pub queue_index: i64,
    pub service_remaining: i64,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct StageSnapshot {
    pub id: StageId,
    pub queue_length: u64,
    pub capacity_used: u64,
    pub capacity_total: u64,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct Snapshot {
    pub tick: u64,
    pub time_ms: u64,
    pub tokens: Vec<TokenSnapshot>,
    pub stages: Vec<StageSnapshot>,
}

impl Snapshot {
    pub fn stage(&self, id: StageId) -> Option<&StageSnapshot> {
        self.stages.iter().find(|stage| stage.id == id)
    }

    pub fn token(&self, token_id: &str) -> Option<&TokenSnapshot> {
        self.tokens.iter().find(|token| token.id == token_id)
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct Event {
    pub tick: u64,
    #[serde(rename = "type")]
    pub event_type: EventType,
    pub reason_code: ReasonCode,
    pub token_id: String,
    pub stage_id: StageId,
    pub class: RequestClass,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct Artifact {
    pub metadata: Metadata,
    pub snapshots: Vec<Snapshot>,
    pub events: Vec<Event>,
}

impl Artifact {
    pub fn events_at(&self, tick: u64) -> impl Iterator<Item = &Event> {
        self.events.iter().filter(move |event| event.tick == tick)
    }
}

/// Result of comparing an artifact's `engine_version` with this build.
///
/// A mismatch is advisory: readers keep going and surface it to the user.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum VersionCompatibility {
    Match,
    Advisory { found: String, expected: String },
}

impl VersionCompatibility {
    pub fn is_match(&self) -> bool {
        matches!(self, Self::Match)
    }
}

impl fmt::Display for VersionCompatibility {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Match => write!(f, "engine_version={ENGINE_VERSION}"),
            Self::Advisory { found, expected } => write!(
                f,
                "artifact engine_version={found} differs from reader engine_version={expected}"
            ),
        }
    }
}

pub fn check_engine_version(metadata: &Metadata) -> VersionCompatibility {
    if metadata.engine_version == ENGINE_VERSION {
        VersionCompatibility::Match
    } else {
        VersionCompatibility::Advisory {
            found: metadata.engine_version.clone(),
            expected: ENGINE_VERSION.to_string(),
        }
    }
}
