//! Test doubles for advisory providers.

use std::sync::atomic::{AtomicUsize, Ordering};

use async_trait::async_trait;
use chrono::Utc;
use uip_types::{AdvisoryResponse, MarketContext, ValuationHint};

use crate::error::AdvisoryError;
use crate::provider::{AdvisoryProvider, AdvisoryQuery};

/// Returns a fixed response and counts calls.
pub struct StaticAdvisoryProvider {
    response: AdvisoryResponse,
    calls: AtomicUsize,
}

impl StaticAdvisoryProvider {
    pub fn new(response: AdvisoryResponse) -> Self {
        Self {
            response,
            calls: AtomicUsize::new(0),
        }
    }

    pub fn with_confidence(country: &str, confidence: f64) -> Self {
        Self::new(AdvisoryResponse {
            summary: format!("Static advisory for {country}"),
            market_context: MarketContext {
                location_insights: "Established neighbourhood".into(),
                price_trends: "Flat".into(),
                market_conditions: "Balanced".into(),
                comparable_properties: None,
            },
            risk_signals: Vec::new(),
            valuation_hint: ValuationHint {
                estimated_range: None,
                factors: Vec::new(),
                methodology: "Static".into(),
                confidence,
            },
            sources: Vec::new(),
            country: country.to_string(),
            confidence,
            retrieval_timestamp: Utc::now(),
            model_version: "static".into(),
        })
    }

    pub fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl AdvisoryProvider for StaticAdvisoryProvider {
    fn name(&self) -> &str {
        "static"
    }

    async fn query(&self, _query: &AdvisoryQuery) -> Result<AdvisoryResponse, AdvisoryError> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        Ok(self.response.clone())
    }
}

pub struct FailingAdvisoryProvider {
    reason: String,
}

impl FailingAdvisoryProvider {
    pub fn new(reason: impl Into<String>) -> Self {
        Self {
            reason: reason.into(),
        }
    }
}

#[async_trait]
impl AdvisoryProvider for FailingAdvisoryProvider {
    fn name(&self) -> &str {
        "failing"
    }

    async fn query(&self, _query: &AdvisoryQuery) -> Result<AdvisoryResponse, AdvisoryError> {
        Err(AdvisoryError::Http(self.reason.clone()))
    }
}

/// Never completes.
pub struct StalledAdvisoryProvider;

#[async_trait]
impl AdvisoryProvider for StalledAdvisoryProvider {
    fn name(&self) -> &str {
        "stalled"
    }

    async fn query(&self, _query: &AdvisoryQuery) -> Result<AdvisoryResponse, AdvisoryError> {
        std::future::pending().await
    }
}
