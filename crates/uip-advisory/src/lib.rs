//! Advisory (retrieval-augmented) knowledge behind a confidence gate.
//!
//! Advisory output is informational. It never changes a compliance decision
//! or drives a lifecycle transition; below 0.7 confidence it is not even
//! surfaced as usable. Provider failures are normalised into a
//! zero-confidence sentinel so callers never see an error from this layer.

#![deny(unsafe_code)]

pub mod config;
pub mod error;
pub mod gate;
pub mod guarded;
pub mod mocks;
pub mod ollama;
pub mod provider;
pub mod router;

use std::sync::Arc;

pub use config::{AdvisoryConfig, OllamaConfig};
pub use error::AdvisoryError;
pub use gate::{AdvisoryGate, GatedAdvisory};
pub use guarded::GuardedAdvisor;
pub use ollama::{parse_model_output, OllamaAdvisoryProvider};
pub use provider::{AdvisoryProvider, AdvisoryQuery};
pub use router::{normalize_country, AdvisoryRouter};

/// Router with one Ollama provider per configured country.
pub fn ollama_router(config: &AdvisoryConfig) -> Result<AdvisoryRouter, AdvisoryError> {
    let mut router = AdvisoryRouter::new();
    for country in &config.countries {
        let code = normalize_country(country);
        let provider = OllamaAdvisoryProvider::new(&config.ollama, code.clone())?;
        router = router.register(&code, Arc::new(provider));
    }
    Ok(router)
}

/// Guarded advisor over [`ollama_router`], or `None` when disabled.
pub fn advisor_from_config(config: &AdvisoryConfig) -> Result<Option<GuardedAdvisor>, AdvisoryError> {
    if !config.enabled {
        return Ok(None);
    }
    let router = ollama_router(config)?;
    Ok(Some(GuardedAdvisor::new(Arc::new(router), config.timeout())))
}
