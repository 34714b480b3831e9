use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Minimum confidence for an advisory response to be usable.
pub const ADVISORY_THRESHOLD: f64 = 0.7;

/// Lower bound of the HIGH_CONFIDENCE bucket.
pub const HIGH_CONFIDENCE_THRESHOLD: f64 = 0.9;

/// Confidence bucket attached to every decision that consumed a score.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum ConfidenceBucket {
    HighConfidence,
    MediumConfidence,
    LowConfidence,
}

impl ConfidenceBucket {
    /// Classify a score with the standard thresholds. NaN lands in LOW.
    pub fn from_score(score: f64) -> Self {
        Self::with_thresholds(score, ADVISORY_THRESHOLD, HIGH_CONFIDENCE_THRESHOLD)
    }

    pub fn with_thresholds(score: f64, usable: f64, high: f64) -> Self {
        if score >= high {
            ConfidenceBucket::HighConfidence
        } else if score >= usable {
            ConfidenceBucket::MediumConfidence
        } else {
            ConfidenceBucket::LowConfidence
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            ConfidenceBucket::HighConfidence => "HIGH_CONFIDENCE",
            ConfidenceBucket::MediumConfidence => "MEDIUM_CONFIDENCE",
            ConfidenceBucket::LowConfidence => "LOW_CONFIDENCE",
        }
    }
}

impl std::fmt::Display for ConfidenceBucket {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct MarketContext {
    #[serde(default)]
    pub location_insights: String,
    #[serde(default)]
    pub price_trends: String,
    #[serde(default)]
    pub market_conditions: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub comparable_properties: Option<String>,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum RiskSignalType {
    Price,
    Location,
    Legal,
    Market,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum RiskSeverity {
    Low,
    Medium,
    High,
}

/// Advisory-only risk observation.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct RiskSignal {
    #[serde(rename = "type")]
    pub signal_type: RiskSignalType,
    pub severity: RiskSeverity,
    pub description: String,
    #[serde(default)]
    pub source: String,
}

#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct ValuationHint {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub estimated_range: Option<String>,
    #[serde(default)]
    pub factors: Vec<String>,
    #[serde(default)]
    pub methodology: String,
    #[serde(default)]
    pub confidence: f64,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum SourceType {
    Government,
    MarketData,
    Regulatory,
    ThirdParty,
}

/// Citation backing an advisory response.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct Source {
    #[serde(rename = "type")]
    pub source_type: SourceType,
    pub name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub url: Option<String>,
    #[serde(default)]
    pub date: String,
}

/// Retrieval-augmented knowledge with a confidence score.
///
/// Below [`ADVISORY_THRESHOLD`] a response is informational only and must not
/// gate or alter any compliance decision or lifecycle transition.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct AdvisoryResponse {
    pub summary: String,
    pub market_context: MarketContext,
    pub risk_signals: Vec<RiskSignal>,
    pub valuation_hint: ValuationHint,
    pub sources: Vec<Source>,
    pub country: String,
    pub confidence: f64,
    pub retrieval_timestamp: DateTime<Utc>,
    pub model_version: String,
}

impl AdvisoryResponse {
    /// Model version tag carried by the failure sentinel.
    pub const UNAVAILABLE_MODEL_VERSION: &'static str = "error";

    /// The zero-confidence sentinel substituted for any provider failure.
    pub fn unavailable(country: impl Into<String>, reason: impl std::fmt::Display) -> Self {
        Self::unavailable_at(country, reason, Utc::now())
    }

    pub fn unavailable_at(
        country: impl Into<String>,
        reason: impl std::fmt::Display,
        at: DateTime<Utc>,
    ) -> Self {
        Self {
            summary: format!(
                "Advisory retrieval failed: {reason}. Proceed with engine-only analysis."
            ),
            market_context: MarketContext::default(),
            risk_signals: Vec::new(),
            valuation_hint: ValuationHint {
                estimated_range: None,
                factors: Vec::new(),
                methodology: "Engine-only (advisory unavailable)".to_string(),
                confidence: 0.0,
            },
            sources: Vec::new(),
            country: country.into(),
            confidence: 0.0,
            retrieval_timestamp: at,
            model_version: Self::UNAVAILABLE_MODEL_VERSION.to_string(),
        }
    }

    pub fn is_sentinel(&self) -> bool {
        self.confidence == 0.0 && self.model_version == Self::UNAVAILABLE_MODEL_VERSION
    }

    /// `confidence >= 0.7`. NaN is never usable.
    pub fn is_usable(&self) -> bool {
        self.confidence >= ADVISORY_THRESHOLD
    }

    pub fn bucket(&self) -> ConfidenceBucket {
        ConfidenceBucket::from_score(self.confidence)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn bucket_boundaries() {
        assert_eq!(ConfidenceBucket::from_score(0.9), ConfidenceBucket::HighConfidence);
        assert_eq!(ConfidenceBucket::from_score(0.89), ConfidenceBucket::MediumConfidence);
        assert_eq!(ConfidenceBucket::from_score(0.7), ConfidenceBucket::MediumConfidence);
        assert_eq!(ConfidenceBucket::from_score(0.69), ConfidenceBucket::LowConfidence);
        assert_eq!(ConfidenceBucket::from_score(f64::NAN), ConfidenceBucket::LowConfidence);
    }

    #[test]
    fn sentinel_is_never_usable() {
        let sentinel = AdvisoryResponse::unavailable("IN", "timeout after 10000ms");
        assert_eq!(sentinel.confidence, 0.0);
        assert!(!sentinel.is_usable());
        assert!(sentinel.is_sentinel());
        assert_eq!(sentinel.bucket(), ConfidenceBucket::LowConfidence);
        assert!(sentinel.summary.contains("timeout after 10000ms"));
        assert_eq!(sentinel.valuation_hint.confidence, 0.0);
    }

    #[test]
    fn snake_case_wire_format() {
        let json = r#"{
            "summary": "Stable residential demand",
            "market_context": {
                "location_insights": "Beach road",
                "price_trends": "up 6% YoY",
                "market_conditions": "balanced"
            },
            "risk_signals": [
                {"type": "LOCATION", "severity": "MEDIUM", "description": "Cyclone exposure", "source": "IMD"}
            ],
            "valuation_hint": {"factors": ["sea view"], "methodology": "comparables", "confidence": 0.8},
            "sources": [{"type": "GOVERNMENT", "name": "AP RERA", "date": "2025-01-01"}],
            "country": "IN",
            "confidence": 0.92,
            "retrieval_timestamp": "2025-01-02T03:04:05Z",
            "model_version": "llama3"
        }"#;
        let response: AdvisoryResponse = serde_json::from_str(json).unwrap();
        assert_eq!(response.risk_signals[0].signal_type, RiskSignalType::Location);
        assert_eq!(response.sources[0].source_type, SourceType::Government);
        assert!(response.is_usable());
        assert_eq!(response.bucket(), ConfidenceBucket::HighConfidence);

        let back = serde_json::to_value(&response).unwrap();
        assert_eq!(back["market_context"]["price_trends"], "up 6% YoY");
        assert!(back["market_context"].get("comparable_properties").is_none());
    }
}
