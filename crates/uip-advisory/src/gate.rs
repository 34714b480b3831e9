use serde::{Deserialize, Serialize};
use uip_types::{AdvisoryResponse, ConfidenceBucket, ADVISORY_THRESHOLD, HIGH_CONFIDENCE_THRESHOLD};

/// Confidence gate over advisory responses.
///
/// Total over its input: an absent response classifies as LOW_CONFIDENCE.
/// No retries, no caching.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct AdvisoryGate {
    usable_threshold: f64,
    high_threshold: f64,
}

impl Default for AdvisoryGate {
    fn default() -> Self {
        Self {
            usable_threshold: ADVISORY_THRESHOLD,
            high_threshold: HIGH_CONFIDENCE_THRESHOLD,
        }
    }
}

impl AdvisoryGate {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn classify(&self, response: Option<&AdvisoryResponse>) -> ConfidenceBucket {
        match response {
            Some(r) => ConfidenceBucket::with_thresholds(
                r.confidence,
                self.usable_threshold,
                self.high_threshold,
            ),
            None => ConfidenceBucket::LowConfidence,
        }
    }

    /// `confidence >= 0.7`
    pub fn usable(&self, response: &AdvisoryResponse) -> bool {
        response.confidence >= self.usable_threshold
    }

    pub fn admit(&self, response: AdvisoryResponse) -> GatedAdvisory {
        GatedAdvisory {
            bucket: self.classify(Some(&response)),
            usable: self.usable(&response),
            response,
        }
    }
}

/// An advisory response together with its gate verdict.
///
/// Consumers must check `usable` before letting the response influence
/// anything; an unusable response is informational only.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct GatedAdvisory {
    pub response: AdvisoryResponse,
    pub bucket: ConfidenceBucket,
    pub usable: bool,
}

impl GatedAdvisory {
    /// The response, only if it cleared the threshold.
    pub fn usable_response(&self) -> Option<&AdvisoryResponse> {
        self.usable.then_some(&self.response)
    }
}
