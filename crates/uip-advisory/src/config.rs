use std::time::Duration;

use serde::{Deserialize, Serialize};

/// Advisory layer configuration.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct AdvisoryConfig {
    /// When false the orchestrator never consults a provider.
    pub enabled: bool,
    /// Upper bound on a single provider call, including routing.
    pub timeout_ms: u64,
    /// Countries served by the Ollama provider.
    pub countries: Vec<String>,
    pub ollama: OllamaConfig,
}

impl Default for AdvisoryConfig {
    fn default() -> Self {
        Self {
            enabled: true,
            timeout_ms: 10_000,
            countries: vec!["IN".to_string(), "US".to_string()],
            ollama: OllamaConfig::default(),
        }
    }
}

impl AdvisoryConfig {
    pub fn timeout(&self) -> Duration {
        Duration::from_millis(self.timeout_ms)
    }
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct OllamaConfig {
    pub endpoint: String,
    pub model: String,
    pub request_timeout_secs: u64,
    /// Route through the system proxy instead of connecting directly.
    pub use_system_proxy: bool,
}

impl Default for OllamaConfig {
    fn default() -> Self {
        Self {
            endpoint: "http://localhost:11434".to_string(),
            model: "llama3".to_string(),
            request_timeout_secs: 60,
            use_system_proxy: false,
        }
    }
}
