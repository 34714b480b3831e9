//! Ollama-backed advisory provider.

use std::time::Duration;

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use reqwest::Client;
use serde::Deserialize;
use serde_json::{json, Value};
use tracing::debug;
use uip_types::{AdvisoryResponse, MarketContext, RiskSignal, Source, ValuationHint};

use crate::config::OllamaConfig;
use crate::error::AdvisoryError;
use crate::provider::{AdvisoryProvider, AdvisoryQuery};

const DEFAULT_CONFIDENCE: f64 = 0.5;

#[derive(Debug, Deserialize)]
struct OllamaResponse {
    response: String,
    #[serde(default)]
    model: Option<String>,
}

pub struct OllamaAdvisoryProvider {
    client: Client,
    endpoint: String,
    model: String,
    country: String,
}

impl OllamaAdvisoryProvider {
    pub fn new(config: &OllamaConfig, country: impl Into<String>) -> Result<Self, AdvisoryError> {
        Ok(Self {
            client: build_http_client(config)?,
            endpoint: config.endpoint.trim_end_matches('/').to_string(),
            model: config.model.clone(),
            country: country.into(),
        })
    }

    pub fn country(&self) -> &str {
        &self.country
    }
}

fn build_http_client(config: &OllamaConfig) -> Result<Client, AdvisoryError> {
    let mut builder = Client::builder().timeout(Duration::from_secs(config.request_timeout_secs));
    if !config.use_system_proxy {
        builder = builder.no_proxy();
    }
    builder
        .build()
        .map_err(|e| AdvisoryError::Http(format!("failed to build HTTP client: {}", e)))
}

fn compose_prompt(query: &AdvisoryQuery, country: &str) -> String {
    let entities = serde_json::to_string_pretty(&query.extracted_entities).unwrap_or_default();
    let context = query
        .context
        .as_ref()
        .and_then(|c| serde_json::to_string_pretty(c).ok())
        .unwrap_or_else(|| "{}".to_string());

    format!(
        "You are a real estate market analyst for country {country}.\n\
         Intent type: {intent_type}\n\
         Extracted entities:\n{entities}\n\
         Additional context:\n{context}\n\n\
         Respond with a single JSON object and nothing else, using this schema:\n\
         {{\n\
           \"summary\": string,\n\
           \"market_context\": {{\"location_insights\": string, \"price_trends\": string, \"market_conditions\": string, \"comparable_properties\": string}},\n\
           \"risk_signals\": [{{\"type\": \"PRICE|LOCATION|LEGAL|MARKET\", \"severity\": \"LOW|MEDIUM|HIGH\", \"description\": string, \"source\": string}}],\n\
           \"valuation_hint\": {{\"estimated_range\": string, \"factors\": [string], \"methodology\": string, \"confidence\": number}},\n\
           \"sources\": [{{\"type\": \"GOVERNMENT|MARKET_DATA|REGULATORY|THIRD_PARTY\", \"name\": string, \"url\": string, \"date\": string}}],\n\
           \"country\": string,\n\
           \"confidence\": number between 0 and 1\n\
         }}",
        intent_type = query.intent_type,
    )
}

fn truncate(text: &str, max: usize) -> String {
    if text.chars().count() <= max {
        return text.to_string();
    }
    let cut: String = text.chars().take(max).collect();
    format!("{}...", cut)
}

/// Slice from the first `{` to the last `}`, if any.
fn extract_json_object(text: &str) -> Option<&str> {
    let start = text.find('{')?;
    let end = text.rfind('}')?;
    (end > start).then(|| &text[start..=end])
}

fn clamp_confidence(value: Option<&Value>) -> f64 {
    match value.and_then(Value::as_f64) {
        Some(c) if c.is_finite() => c.clamp(0.0, 1.0),
        _ => DEFAULT_CONFIDENCE,
    }
}

fn string_field(value: &Value, key: &str) -> String {
    value
        .get(key)
        .and_then(Value::as_str)
        .unwrap_or_default()
        .to_string()
}

fn list_of<T: serde::de::DeserializeOwned>(value: Option<&Value>) -> Vec<T> {
    value
        .and_then(Value::as_array)
        .map(|items| {
            items
                .iter()
                .filter_map(|item| serde_json::from_value(item.clone()).ok())
                .collect()
        })
        .unwrap_or_default()
}

/// Normalise raw model output into an [`AdvisoryResponse`].
///
/// Missing fields take defaults; malformed risk signals and sources are
/// skipped. Only a text without any JSON object is an error.
pub fn parse_model_output(
    text: &str,
    model: &str,
    country: &str,
    now: DateTime<Utc>,
) -> Result<AdvisoryResponse, AdvisoryError> {
    let raw = extract_json_object(text)
        .ok_or_else(|| AdvisoryError::Parse("no JSON object in model output".to_string()))?;
    let value: Value =
        serde_json::from_str(raw).map_err(|e| AdvisoryError::Parse(e.to_string()))?;
    if !value.is_object() {
        return Err(AdvisoryError::Parse("model output is not an object".to_string()));
    }

    let market = value.get("market_context").cloned().unwrap_or(Value::Null);
    let valuation = value.get("valuation_hint").cloned().unwrap_or(Value::Null);

    let summary = value
        .get("summary")
        .and_then(Value::as_str)
        .filter(|s| !s.trim().is_empty())
        .unwrap_or("No summary available")
        .to_string();

    let retrieval_timestamp = value
        .get("retrieval_timestamp")
        .and_then(Value::as_str)
        .and_then(|s| DateTime::parse_from_rfc3339(s).ok())
        .map(|t| t.with_timezone(&Utc))
        .unwrap_or(now);

    Ok(AdvisoryResponse {
        summary,
        market_context: MarketContext {
            location_insights: string_field(&market, "location_insights"),
            price_trends: string_field(&market, "price_trends"),
            market_conditions: string_field(&market, "market_conditions"),
            comparable_properties: market
                .get("comparable_properties")
                .and_then(Value::as_str)
                .map(str::to_string),
        },
        risk_signals: list_of::<RiskSignal>(value.get("risk_signals")),
        valuation_hint: ValuationHint {
            estimated_range: valuation
                .get("estimated_range")
                .and_then(Value::as_str)
                .map(str::to_string),
            factors: valuation
                .get("factors")
                .and_then(Value::as_array)
                .map(|f| f.iter().filter_map(Value::as_str).map(str::to_string).collect())
                .unwrap_or_default(),
            methodology: string_field(&valuation, "methodology"),
            confidence: clamp_confidence(valuation.get("confidence")),
        },
        sources: list_of::<Source>(value.get("sources")),
        country: value
            .get("country")
            .and_then(Value::as_str)
            .filter(|c| !c.trim().is_empty())
            .unwrap_or(country)
            .to_string(),
        confidence: clamp_confidence(value.get("confidence")),
        retrieval_timestamp,
        model_version: value
            .get("model_version")
            .and_then(Value::as_str)
            .filter(|m| !m.is_empty())
            .unwrap_or(if model.is_empty() { "unknown" } else { model })
            .to_string(),
    })
}

#[async_trait]
impl AdvisoryProvider for OllamaAdvisoryProvider {
    fn name(&self) -> &str {
        "ollama"
    }

    async fn query(&self, query: &AdvisoryQuery) -> Result<AdvisoryResponse, AdvisoryError> {
        let url = format!("{}/api/generate", self.endpoint);
        let payload = json!({
            "model": self.model,
            "prompt": compose_prompt(query, &self.country),
            "stream": false,
        });

        debug!(url = %url, model = %self.model, country = %self.country, "Querying ollama");

        let response = self.client.post(&url).json(&payload).send().await?;

        if !response.status().is_success() {
            let status = response.status().as_u16();
            let body = response.text().await.unwrap_or_default();
            return Err(AdvisoryError::Status {
                status,
                body: truncate(&body, 320),
            });
        }

        let body: OllamaResponse = response
            .json()
            .await
            .map_err(|e| AdvisoryError::Parse(format!("invalid ollama response: {}", e)))?;

        let model = body.model.as_deref().unwrap_or(&self.model);
        parse_model_output(body.response.trim(), model, &self.country, Utc::now())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use uip_types::{RiskSeverity, SourceType};

    fn now() -> DateTime<Utc> {
        DateTime::parse_from_rfc3339("2026-03-01T10:00:00Z")
            .unwrap()
            .with_timezone(&Utc)
    }

    #[test]
    fn parses_json_wrapped_in_prose() {
        let text = r#"Here is the analysis:
        {"summary": "Stable coastal market", "confidence": 0.82,
         "market_context": {"location_insights": "Beach road", "price_trends": "Up 6%", "market_conditions": "Balanced"},
         "risk_signals": [{"type": "PRICE", "severity": "MEDIUM", "description": "Premium pricing", "source": "RERA"}],
         "valuation_hint": {"estimated_range": "70-80L", "factors": ["sea view"], "methodology": "Comparables", "confidence": 0.75},
         "sources": [{"type": "GOVERNMENT", "name": "AP RERA", "date": "2025"}]}
        Hope this helps."#;

        let r = parse_model_output(text, "llama3", "IN", now()).unwrap();
        assert_eq!(r.summary, "Stable coastal market");
        assert_eq!(r.confidence, 0.82);
        assert_eq!(r.country, "IN");
        assert_eq!(r.model_version, "llama3");
        assert_eq!(r.retrieval_timestamp, now());
        assert_eq!(r.risk_signals[0].severity, RiskSeverity::Medium);
        assert_eq!(r.sources[0].source_type, SourceType::Government);
        assert_eq!(r.valuation_hint.factors, vec!["sea view".to_string()]);
    }

    #[test]
    fn missing_fields_take_defaults() {
        let r = parse_model_output("{}", "", "US", now()).unwrap();
        assert_eq!(r.summary, "No summary available");
        assert_eq!(r.confidence, 0.5);
        assert_eq!(r.valuation_hint.confidence, 0.5);
        assert_eq!(r.country, "US");
        assert_eq!(r.model_version, "unknown");
        assert!(r.risk_signals.is_empty());
        assert!(r.sources.is_empty());
    }

    #[test]
    fn confidence_is_clamped_and_zero_is_kept() {
        let r = parse_model_output(r#"{"confidence": 1.7}"#, "m", "IN", now()).unwrap();
        assert_eq!(r.confidence, 1.0);
        let r = parse_model_output(r#"{"confidence": -3}"#, "m", "IN", now()).unwrap();
        assert_eq!(r.confidence, 0.0);
        let r = parse_model_output(r#"{"confidence": 0}"#, "m", "IN", now()).unwrap();
        assert_eq!(r.confidence, 0.0);
        let r = parse_model_output(r#"{"confidence": "high"}"#, "m", "IN", now()).unwrap();
        assert_eq!(r.confidence, 0.5);
    }

    #[test]
    fn malformed_signals_are_skipped() {
        let text = r#"{"risk_signals": [{"type": "WEATHER"}, {"type": "LEGAL", "severity": "HIGH", "description": "Title dispute"}]}"#;
        let r = parse_model_output(text, "m", "IN", now()).unwrap();
        assert_eq!(r.risk_signals.len(), 1);
        assert_eq!(r.risk_signals[0].source, "");
    }

    #[test]
    fn text_without_json_is_a_parse_error() {
        assert!(matches!(
            parse_model_output("I cannot help with that", "m", "IN", now()),
            Err(AdvisoryError::Parse(_))
        ));
        assert!(matches!(
            parse_model_output("} backwards {", "m", "IN", now()),
            Err(AdvisoryError::Parse(_))
        ));
    }

    #[test]
    fn prompt_names_country_and_schema() {
        let query = AdvisoryQuery {
            intent_type: "BUY_PROPERTY".into(),
            extracted_entities: [("location".to_string(), json!("Austin, Texas"))]
                .into_iter()
                .collect(),
            country: "US".into(),
            context: None,
        };
        let prompt = compose_prompt(&query, "US");
        assert!(prompt.contains("country US"));
        assert!(prompt.contains("Austin, Texas"));
        assert!(prompt.contains("\"valuation_hint\""));
    }

    #[tokio::test]
    async fn unreachable_endpoint_is_an_http_error() {
        let config = OllamaConfig {
            endpoint: "http://127.0.0.1:9".into(),
            request_timeout_secs: 2,
            ..OllamaConfig::default()
        };
        let provider = OllamaAdvisoryProvider::new(&config, "IN").unwrap();
        let query = AdvisoryQuery {
            intent_type: "BUY_PROPERTY".into(),
            extracted_entities: Default::default(),
            country: "IN".into(),
            context: None,
        };
        assert!(matches!(
            provider.query(&query).await,
            Err(AdvisoryError::Http(_))
        ));
    }
}
