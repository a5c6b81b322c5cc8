use thiserror::Error;

/// Failures surfaced by the kernel entry points.
///
/// Every variant is deterministic for a given input, so callers should report
/// rather than retry.
#[derive(Debug, Error)]
pub enum KernelError {
    /// The requested scenario id is not registered. Raised before any tick runs.
    #[error("unknown scenario_id: {scenario_id}")]
    UnknownScenario { scenario_id: String },

    /// A full run finished without recording a single event.
    #[error("no events produced (scenario_id={scenario_id} seed={seed})")]
    NoEvents { scenario_id: String, seed: i64 },

    #[error("artifact serialization failed: {0}")]
    Serialization(#[from] serde_json::Error),
}

impl KernelError {
    pub fn is_configuration(&self) -> bool {
        matches!(self, Self::UnknownScenario { .. })
    }
}
