//! Layered configuration for `uipctl`.

use serde::{Deserialize, Serialize};
use uip_advisory::AdvisoryConfig;
use uip_compliance::ComplianceConfig;
use uip_evidence::EvidenceConfig;
use uip_gate::GateConfig;

/// Effective configuration: defaults, then an optional file, then `UIP_*`
/// environment variables (nested keys separated by `__`, e.g.
/// `UIP_ADVISORY__TIMEOUT_MS=5000`).
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct UipConfig {
    pub log: LogConfig,
    pub compliance: ComplianceConfig,
    pub advisory: AdvisoryConfig,
    pub evidence: EvidenceConfig,
    pub gate: GateConfig,
}

impl Default for UipConfig {
    fn default() -> Self {
        Self {
            log: LogConfig::default(),
            compliance: ComplianceConfig::default(),
            // Off unless asked for; the CLI should not reach for a model by default
            advisory: AdvisoryConfig {
                enabled: false,
                ..AdvisoryConfig::default()
            },
            evidence: EvidenceConfig::default(),
            gate: GateConfig::default(),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct LogConfig {
    pub level: String,
    pub json: bool,
}

impl Default for LogConfig {
    fn default() -> Self {
        Self {
            level: "info".to_string(),
            json: false,
        }
    }
}

impl UipConfig {
    pub fn load(path: Option<&str>) -> Result<Self, config::ConfigError> {
        let mut builder = config::Config::builder();

        builder = builder.add_source(config::Config::try_from(&UipConfig::default())?);

        if let Some(path) = path {
            builder = builder.add_source(config::File::with_name(path).required(true));
        }

        builder = builder.add_source(
            config::Environment::with_prefix("UIP")
                .prefix_separator("_")
                .separator("__")
                .try_parsing(true),
        );

        builder.build()?.try_deserialize()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;
    use uip_compliance::{CoordinatesPolicy, JurisdictionPolicy};
    use uip_evidence::SinkConfig;

    #[test]
    fn defaults_load_without_file() {
        let config = UipConfig::load(None).unwrap();
        assert_eq!(config.compliance.fact_timeout_ms, 2000);
        assert_eq!(config.evidence.append_timeout_ms, 2000);
        assert_eq!(config.evidence.sink, SinkConfig::Memory);
        assert!(!config.advisory.enabled);
    }

    #[test]
    fn file_overrides_defaults() {
        let mut file = tempfile::Builder::new().suffix(".toml").tempfile().unwrap();
        writeln!(
            file,
            r#"
[compliance]
unknown_jurisdiction_policy = "deny"
missing_coordinates_policy = "deny"

[evidence.sink]
kind = "jsonl"
path = "/tmp/uip/evidence.jsonl"

[gate]
consult_advisory_on_allow = true
"#
        )
        .unwrap();

        let config = UipConfig::load(file.path().to_str()).unwrap();
        assert_eq!(
            config.compliance.unknown_jurisdiction_policy,
            JurisdictionPolicy::Deny
        );
        assert_eq!(
            config.compliance.missing_coordinates_policy,
            CoordinatesPolicy::Deny
        );
        assert_eq!(
            config.evidence.sink,
            SinkConfig::Jsonl {
                path: "/tmp/uip/evidence.jsonl".into()
            }
        );
        assert!(config.gate.consult_advisory_on_allow);
        assert_eq!(config.advisory.timeout_ms, 10_000);
    }
}
