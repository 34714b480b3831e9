use std::collections::HashMap;
use std::sync::Arc;

use async_trait::async_trait;
use tracing::debug;
use uip_types::AdvisoryResponse;

use crate::error::AdvisoryError;
use crate::provider::{AdvisoryProvider, AdvisoryQuery};

/// Canonical country code for the aliases the pipeline accepts.
pub fn normalize_country(country: &str) -> String {
    let upper = country.trim().to_uppercase();
    match upper.as_str() {
        "IN" | "INDIA" => "IN".to_string(),
        "US" | "USA" | "UNITED STATES" => "US".to_string(),
        _ => upper,
    }
}

/// Routes each query to the provider registered for its country.
///
/// Constructed once at startup and passed in; there is no global registry.
#[derive(Clone, Default)]
pub struct AdvisoryRouter {
    providers: HashMap<String, Arc<dyn AdvisoryProvider>>,
}

impl AdvisoryRouter {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn register(mut self, country: &str, provider: Arc<dyn AdvisoryProvider>) -> Self {
        self.providers.insert(normalize_country(country), provider);
        self
    }

    pub fn provider_for(&self, country: &str) -> Option<Arc<dyn AdvisoryProvider>> {
        self.providers.get(&normalize_country(country)).cloned()
    }

    pub fn countries(&self) -> Vec<String> {
        let mut countries: Vec<String> = self.providers.keys().cloned().collect();
        countries.sort();
        countries
    }
}

#[async_trait]
impl AdvisoryProvider for AdvisoryRouter {
    fn name(&self) -> &str {
        "router"
    }

    async fn query(&self, query: &AdvisoryQuery) -> Result<AdvisoryResponse, AdvisoryError> {
        let provider = self
            .provider_for(&query.country)
            .ok_or_else(|| AdvisoryError::NoAdapter(query.country.clone()))?;
        debug!(
            country = %query.country,
            provider = provider.name(),
            "Routing advisory query"
        );
        provider.query(query).await
    }
}
