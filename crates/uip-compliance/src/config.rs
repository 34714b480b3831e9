use std::time::Duration;

use serde::{Deserialize, Serialize};

/// What to do when the location maps to no known jurisdiction.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum JurisdictionPolicy {
    /// Pass the citizenship check, marking the verdict as assumed
    #[default]
    Allow,
    Deny,
}

/// What to do when an intent carries no GPS coordinates.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum CoordinatesPolicy {
    /// Pass the land check, marking the verdict as assumed
    #[default]
    AssumeValid,
    Deny,
}

/// Rule chain configuration.
#[derive(Clone, Debug, Serialize, Deserialize)]
#[serde(default)]
pub struct ComplianceConfig {
    pub unknown_jurisdiction_policy: JurisdictionPolicy,
    pub missing_coordinates_policy: CoordinatesPolicy,
    /// Upper bound on one rule's fact lookups (ms)
    pub fact_timeout_ms: u64,
}

impl Default for ComplianceConfig {
    fn default() -> Self {
        Self {
            unknown_jurisdiction_policy: JurisdictionPolicy::Allow,
            missing_coordinates_policy: CoordinatesPolicy::AssumeValid,
            fact_timeout_ms: 2000,
        }
    }
}

impl ComplianceConfig {
    /// Both permissive defaults switched to deny.
    pub fn fail_closed() -> Self {
        Self {
            unknown_jurisdiction_policy: JurisdictionPolicy::Deny,
            missing_coordinates_policy: CoordinatesPolicy::Deny,
            ..Self::default()
        }
    }

    pub fn fact_timeout(&self) -> Duration {
        Duration::from_millis(self.fact_timeout_ms)
    }
}
