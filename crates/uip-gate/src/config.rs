use serde::{Deserialize, Serialize};

/// Orchestrator configuration.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct GateConfig {
    /// Consult advisory knowledge at the end of every ALLOWed evaluation
    /// (default: false)
    pub consult_advisory_on_allow: bool,
}
