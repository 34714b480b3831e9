use std::collections::BTreeMap;

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use uip_types::{AdvisoryResponse, IntentRecord};

use crate::error::AdvisoryError;

/// What the pipeline asks an advisory provider.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct AdvisoryQuery {
    pub intent_type: String,
    pub extracted_entities: BTreeMap<String, serde_json::Value>,
    pub country: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub context: Option<BTreeMap<String, serde_json::Value>>,
}

impl AdvisoryQuery {
    /// Build a query from an intent's extracted attributes.
    pub fn from_intent(intent: &IntentRecord, country: impl Into<String>) -> Self {
        let mut extracted_entities = match serde_json::to_value(&intent.attributes) {
            Ok(serde_json::Value::Object(map)) => map.into_iter().collect(),
            _ => BTreeMap::new(),
        };
        // Flatten rule metadata next to the typed attributes
        if let Some(serde_json::Value::Object(meta)) = extracted_entities.remove("metadata") {
            for (k, v) in meta {
                extracted_entities.entry(k).or_insert(v);
            }
        }

        Self {
            intent_type: intent.intent_type.clone(),
            extracted_entities,
            country: country.into(),
            context: None,
        }
    }

    pub fn with_context(mut self, key: impl Into<String>, value: serde_json::Value) -> Self {
        self.context
            .get_or_insert_with(BTreeMap::new)
            .insert(key.into(), value);
        self
    }
}

/// Source of retrieval-augmented knowledge for one or more countries.
///
/// Failures are returned as errors; callers normalise them into the
/// zero-confidence sentinel before gating.
#[async_trait]
pub trait AdvisoryProvider: Send + Sync {
    fn name(&self) -> &str;

    async fn query(&self, query: &AdvisoryQuery) -> Result<AdvisoryResponse, AdvisoryError>;
}
