use std::sync::Arc;
use std::time::Duration;

use tracing::{debug, warn};
use uip_types::AdvisoryResponse;

use crate::error::AdvisoryError;
use crate::gate::{AdvisoryGate, GatedAdvisory};
use crate::provider::{AdvisoryProvider, AdvisoryQuery};

/// Provider wrapped in a deadline and the confidence gate.
///
/// `consult` is infallible: errors and timeouts become the zero-confidence
/// sentinel, which the gate always classifies as LOW_CONFIDENCE.
#[derive(Clone)]
pub struct GuardedAdvisor {
    provider: Arc<dyn AdvisoryProvider>,
    timeout: Duration,
    gate: AdvisoryGate,
}

impl GuardedAdvisor {
    pub fn new(provider: Arc<dyn AdvisoryProvider>, timeout: Duration) -> Self {
        Self {
            provider,
            timeout,
            gate: AdvisoryGate::default(),
        }
    }

    pub fn with_gate(mut self, gate: AdvisoryGate) -> Self {
        self.gate = gate;
        self
    }

    pub fn gate(&self) -> &AdvisoryGate {
        &self.gate
    }

    pub async fn consult(&self, query: &AdvisoryQuery) -> GatedAdvisory {
        let outcome = match tokio::time::timeout(self.timeout, self.provider.query(query)).await {
            Ok(result) => result,
            Err(_) => Err(AdvisoryError::Timeout {
                timeout_ms: self.timeout.as_millis() as u64,
            }),
        };

        let response = match outcome {
            Ok(mut response) => {
                if !response.confidence.is_finite() {
                    response.confidence = 0.0;
                }
                response
            }
            Err(e) => {
                warn!(
                    provider = self.provider.name(),
                    country = %query.country,
                    error = %e,
                    "Advisory unavailable, continuing without it"
                );
                AdvisoryResponse::unavailable(query.country.clone(), &e)
            }
        };

        let gated = self.gate.admit(response);
        debug!(
            country = %query.country,
            confidence = gated.response.confidence,
            bucket = %gated.bucket,
            usable = gated.usable,
            "Advisory gated"
        );
        gated
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::mocks::{FailingAdvisoryProvider, StalledAdvisoryProvider, StaticAdvisoryProvider};
    use std::collections::BTreeMap;
    use uip_types::ConfidenceBucket;

    fn query() -> AdvisoryQuery {
        AdvisoryQuery {
            intent_type: "BUY_PROPERTY".into(),
            extracted_entities: BTreeMap::new(),
            country: "IN".into(),
            context: None,
        }
    }

    #[tokio::test]
    async fn high_confidence_is_usable() {
        let advisor = GuardedAdvisor::new(
            Arc::new(StaticAdvisoryProvider::with_confidence("IN", 0.93)),
            Duration::from_secs(1),
        );
        let gated = advisor.consult(&query()).await;
        assert!(gated.usable);
        assert_eq!(gated.bucket, ConfidenceBucket::HighConfidence);
    }

    #[tokio::test]
    async fn failure_becomes_sentinel() {
        let advisor = GuardedAdvisor::new(
            Arc::new(FailingAdvisoryProvider::new("connection refused")),
            Duration::from_secs(1),
        );
        let gated = advisor.consult(&query()).await;
        assert!(!gated.usable);
        assert!(gated.response.is_sentinel());
        assert_eq!(gated.response.country, "IN");
        assert!(gated.response.summary.contains("connection refused"));
    }

    #[tokio::test(start_paused = true)]
    async fn stalled_provider_times_out_into_sentinel() {
        let advisor = GuardedAdvisor::new(
            Arc::new(StalledAdvisoryProvider),
            Duration::from_millis(250),
        );
        let gated = advisor.consult(&query()).await;
        assert!(gated.response.is_sentinel());
        assert!(gated.response.summary.contains("timed out after 250ms"));
        assert_eq!(gated.bucket, ConfidenceBucket::LowConfidence);
    }

    #[tokio::test]
    async fn nan_confidence_is_zeroed() {
        let advisor = GuardedAdvisor::new(
            Arc::new(StaticAdvisoryProvider::with_confidence("IN", f64::NAN)),
            Duration::from_secs(1),
        );
        let gated = advisor.consult(&query()).await;
        assert_eq!(gated.response.confidence, 0.0);
        assert!(!gated.usable);
    }
}
