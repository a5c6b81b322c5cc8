//! Deterministic tick executor for admission control and strict-priority service scheduling.
//!
//! A run owns one [`AdmissionWorld`]: per-class FIFO queues, a bounded service pool,
//! the token table and a seeded class sampler. Each tick executes the same phase
//! sequence (completion, arrival/admission, scheduling, queue reindex, snapshot) and
//! the finished trace is packaged into a [`contracts::Artifact`] whose replay id is a
//! SHA-256 over `(scenario_id, seed, engine_version)`.

pub mod admission;
pub mod artifact;
pub mod error;
pub mod inspect;
pub mod queues;
pub mod sampler;
pub mod scenario;
pub mod scheduler;
pub mod token;
pub mod world;

pub use admission::{Admission, AdmissionPolicy};
pub use artifact::{from_json, replay_id, run, run_scenario, to_json};
pub use error::KernelError;
pub use inspect::{summarize, validate_trace, RunSummary, TraceViolation};
pub use scenario::ScenarioDef;
pub use world::{AdmissionWorld, StepMetrics};
