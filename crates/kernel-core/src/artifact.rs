//! Artifact assembly, replay identifiers and JSON export.
//!
//! [`run`] is the engine entry point: a pure function from [`RunConfig`] to a
//! finished [`Artifact`]. It performs no I/O; writing the exported text is the
//! caller's concern.

use contracts::{Artifact, Event, Metadata, RunConfig, Snapshot, ENGINE_VERSION};
use sha2::{Digest, Sha256};
use tracing::info;

use crate::error::KernelError;
use crate::scenario::ScenarioDef;
use crate::world::AdmissionWorld;

/// SHA-256 over `scenario_id|seed|engine_version`, rendered as 64 lowercase hex chars.
pub fn replay_id(scenario_id: &str, seed: i64, engine_version: &str) -> String {
    let preimage = format!("{scenario_id}|{seed}|{engine_version}");
    hex::encode(Sha256::digest(preimage.as_bytes()))
}

pub fn run(config: &RunConfig) -> Result<Artifact, KernelError> {
    let scenario = ScenarioDef::resolve(config.effective_scenario_id())?;
    run_scenario(&scenario, config.seed)
}

/// Run an arbitrary scenario definition to completion and package the trace.
pub fn run_scenario(scenario: &ScenarioDef, seed: i64) -> Result<Artifact, KernelError> {
    let mut world = AdmissionWorld::new(scenario.clone(), seed);
    let ticks = world.run_to_end();
    let (snapshots, events) = world.into_trace();
    let artifact = build_artifact(scenario, seed, snapshots, events)?;
    info!(
        scenario_id = %artifact.metadata.scenario_id,
        seed,
        ticks,
        events = artifact.events.len(),
        replay_id = %artifact.metadata.replay_id,
        "run complete"
    );
    Ok(artifact)
}

pub fn build_metadata(scenario: &ScenarioDef, seed: i64) -> Metadata {
    Metadata {
        scenario_id: scenario.id.clone(),
        seed,
        engine_version: ENGINE_VERSION.to_string(),
        replay_id: replay_id(&scenario.id, seed, ENGINE_VERSION),
        tick_count: scenario.tick_count,
        tick_duration_ms: scenario.tick_duration_ms,
        total_duration_ms: scenario.total_duration_ms(),
    }
}

/// Fails with [`KernelError::NoEvents`] when the trace holds no events; that
/// only happens for a misconfigured scenario.
pub fn build_artifact(
    scenario: &ScenarioDef,
    seed: i64,
    snapshots: Vec<Snapshot>,
    events: Vec<Event>,
) -> Result<Artifact, KernelError> {
    if events.is_empty() {
        return Err(KernelError::NoEvents {
            scenario_id: scenario.id.clone(),
            seed,
        });
    }
    Ok(Artifact {
        metadata: build_metadata(scenario, seed),
        snapshots,
        events,
    })
}

/// Two-space indented JSON with a trailing newline.
pub fn to_json(artifact: &Artifact) -> Result<String, KernelError> {
    let mut text = serde_json::to_string_pretty(artifact)?;
    text.push('\n');
    Ok(text)
}

pub fn from_json(text: &str) -> Result<Artifact, KernelError> {
    Ok(serde_json::from_str(text)?)
}

#[cfg(test)]
mod tests {
    use contracts::CANONICAL_SCENARIO_ID;

    use super::*;

    #[test]
    fn replay_id_is_64_lowercase_hex() {
        let id = replay_id(CANONICAL_SCENARIO_ID, 1, ENGINE_VERSION);
        assert_eq!(id.len(), 64);
        assert!(id
            .chars()
            .all(|c| c.is_ascii_digit() || ('a'..='f').contains(&c)));
        assert!(hex::decode(&id).is_ok());
    }

    #[test]
    fn replay_id_matches_known_digest() {
        assert_eq!(
            replay_id("test_scenario", 123, "1.0.0"),
            "0a1ef21c6eab115aba69c1828feba2d6d7c7e4439d0b074821bbbba9b6f71654"
        );
        assert_eq!(
            replay_id(CANONICAL_SCENARIO_ID, 1, ENGINE_VERSION),
            "58d13ebaff544e9b01b83b8c30fa85206ef6c119624c78749142f4474ae5e3cd"
        );
    }

    #[test]
    fn replay_id_sensitive_to_each_input() {
        let base = replay_id(CANONICAL_SCENARIO_ID, 1, ENGINE_VERSION);
        assert_eq!(base, replay_id(CANONICAL_SCENARIO_ID, 1, ENGINE_VERSION));
        assert_ne!(base, replay_id(CANONICAL_SCENARIO_ID, 42, ENGINE_VERSION));
        assert_ne!(base, replay_id("other_scenario", 1, ENGINE_VERSION));
        assert_ne!(base, replay_id(CANONICAL_SCENARIO_ID, 1, "2.0.0"));
    }

    #[test]
    fn metadata_total_duration_is_product() {
        let meta = build_metadata(&ScenarioDef::canonical_v1(), 5);
        assert_eq!(meta.tick_count, 240);
        assert_eq!(meta.tick_duration_ms, 250);
        assert_eq!(meta.total_duration_ms, meta.tick_count * meta.tick_duration_ms);
        assert!(meta.duration_consistent());
    }

    #[test]
    fn empty_event_log_is_rejected() {
        let err = build_artifact(&ScenarioDef::canonical_v1(), 1, Vec::new(), Vec::new())
            .expect_err("no events");
        assert!(matches!(err, KernelError::NoEvents { seed: 1, .. }));
    }

    #[test]
    fn json_export_is_indented_and_newline_terminated() {
        let artifact = run(&RunConfig::default()).expect("canonical run");
        let text = to_json(&artifact).expect("serialize");
        assert!(text.starts_with("{\n  \"metadata\": {\n    \"scenario_id\": \"canonical_v1\","));
        assert!(text.ends_with("}\n"));
        assert!(!text.ends_with("\n\n"));
        let decoded = from_json(&text).expect("decode");
        assert_eq!(decoded, artifact);
    }
}
