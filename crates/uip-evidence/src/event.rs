use std::collections::BTreeMap;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uip_types::{ActorId, ConfidenceBucket, IntentId, TenantId};

/// Hash linked by the first event of every intent's chain.
pub const GENESIS_HASH: &str = "0000000000000000000000000000000000000000000000000000000000000000";

/// Closed vocabulary of audit events.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum EventType {
    IntentReceived,
    IntentParsed,
    ComplianceStarted,
    ComplianceRuleChecked,
    ComplianceResult,
    LifecycleTransitioned,
    RagQueryExecuted,
    RagAdvisoryLowConfidence,
}

impl EventType {
    pub fn as_str(&self) -> &'static str {
        match self {
            EventType::IntentReceived => "INTENT_RECEIVED",
            EventType::IntentParsed => "INTENT_PARSED",
            EventType::ComplianceStarted => "COMPLIANCE_STARTED",
            EventType::ComplianceRuleChecked => "COMPLIANCE_RULE_CHECKED",
            EventType::ComplianceResult => "COMPLIANCE_RESULT",
            EventType::LifecycleTransitioned => "LIFECYCLE_TRANSITIONED",
            EventType::RagQueryExecuted => "RAG_QUERY_EXECUTED",
            EventType::RagAdvisoryLowConfidence => "RAG_ADVISORY_LOW_CONFIDENCE",
        }
    }
}

impl std::fmt::Display for EventType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Component that originated an event.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum Engine {
    IntentEngine,
    ComplianceEngine,
    Orchestrator,
    RagAdapter,
}

impl Engine {
    pub fn as_str(&self) -> &'static str {
        match self {
            Engine::IntentEngine => "INTENT_ENGINE",
            Engine::ComplianceEngine => "COMPLIANCE_ENGINE",
            Engine::Orchestrator => "ORCHESTRATOR",
            Engine::RagAdapter => "RAG_ADAPTER",
        }
    }
}

/// One immutable audit record.
///
/// `sequence`, `previous_hash` and `hash` chain the events of one intent so
/// that edits, deletions and reorderings are detectable.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct EvidenceEvent {
    pub event_type: EventType,
    pub intent_id: IntentId,
    pub timestamp: DateTime<Utc>,
    pub engine: Engine,
    pub actor_id: ActorId,
    pub tenant_id: TenantId,
    pub payload: BTreeMap<String, serde_json::Value>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub reason: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub confidence: Option<ConfidenceBucket>,
    pub sequence: u64,
    pub previous_hash: String,
    pub hash: String,
}

/// Fields covered by the hash, in a fixed order.
#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct SealedFields<'a> {
    event_type: EventType,
    intent_id: &'a IntentId,
    timestamp: &'a DateTime<Utc>,
    engine: Engine,
    actor_id: &'a ActorId,
    tenant_id: &'a TenantId,
    payload: &'a BTreeMap<String, serde_json::Value>,
    reason: &'a Option<String>,
    confidence: &'a Option<ConfidenceBucket>,
    sequence: u64,
    previous_hash: &'a str,
}

impl EvidenceEvent {
    pub fn draft(
        event_type: EventType,
        engine: Engine,
        intent_id: IntentId,
        actor_id: ActorId,
        tenant_id: TenantId,
    ) -> EventDraft {
        EventDraft {
            event_type,
            engine,
            intent_id,
            actor_id,
            tenant_id,
            timestamp: None,
            payload: BTreeMap::new(),
            reason: None,
            confidence: None,
        }
    }

    /// Verify the integrity hash of this event.
    pub fn verify_integrity(&self) -> bool {
        self.compute_hash() == self.hash
    }

    fn compute_hash(&self) -> String {
        let fields = SealedFields {
            event_type: self.event_type,
            intent_id: &self.intent_id,
            timestamp: &self.timestamp,
            engine: self.engine,
            actor_id: &self.actor_id,
            tenant_id: &self.tenant_id,
            payload: &self.payload,
            reason: &self.reason,
            confidence: &self.confidence,
            sequence: self.sequence,
            previous_hash: &self.previous_hash,
        };

        let mut hasher = blake3::Hasher::new();
        hasher.update(b"uip-evidence-v1:");
        // Maps are BTreeMaps, so the JSON encoding is deterministic
        if let Ok(bytes) = serde_json::to_vec(&fields) {
            hasher.update(&bytes);
        }
        hasher.finalize().to_hex().to_string()
    }
}

/// Position of the last sealed event in one intent's chain.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct ChainHead {
    pub sequence: u64,
    pub last_hash: String,
}

impl ChainHead {
    pub fn genesis() -> Self {
        Self {
            sequence: 0,
            last_hash: GENESIS_HASH.to_string(),
        }
    }
}

impl Default for ChainHead {
    fn default() -> Self {
        Self::genesis()
    }
}

/// An event before it is sealed into a chain.
#[derive(Clone, Debug)]
pub struct EventDraft {
    event_type: EventType,
    engine: Engine,
    intent_id: IntentId,
    actor_id: ActorId,
    tenant_id: TenantId,
    timestamp: Option<DateTime<Utc>>,
    payload: BTreeMap<String, serde_json::Value>,
    reason: Option<String>,
    confidence: Option<ConfidenceBucket>,
}

impl EventDraft {
    pub fn payload(mut self, key: impl Into<String>, value: impl Serialize) -> Self {
        let value = serde_json::to_value(value).unwrap_or(serde_json::Value::Null);
        self.payload.insert(key.into(), value);
        self
    }

    pub fn reason(mut self, reason: impl Into<String>) -> Self {
        self.reason = Some(reason.into());
        self
    }

    pub fn confidence(mut self, bucket: ConfidenceBucket) -> Self {
        self.confidence = Some(bucket);
        self
    }

    pub fn at(mut self, timestamp: DateTime<Utc>) -> Self {
        self.timestamp = Some(timestamp);
        self
    }

    pub fn event_type(&self) -> EventType {
        self.event_type
    }

    /// Link this draft after `head` and advance the head.
    pub fn seal(self, head: &mut ChainHead) -> EvidenceEvent {
        let mut event = EvidenceEvent {
            event_type: self.event_type,
            intent_id: self.intent_id,
            timestamp: self.timestamp.unwrap_or_else(Utc::now),
            engine: self.engine,
            actor_id: self.actor_id,
            tenant_id: self.tenant_id,
            payload: self.payload,
            reason: self.reason,
            confidence: self.confidence,
            sequence: head.sequence + 1,
            previous_hash: head.last_hash.clone(),
            hash: String::new(),
        };
        event.hash = event.compute_hash();

        head.sequence = event.sequence;
        head.last_hash = event.hash.clone();
        event
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn draft(event_type: EventType) -> EventDraft {
        EvidenceEvent::draft(
            event_type,
            Engine::Orchestrator,
            IntentId::new("intent-1"),
            ActorId::new("actor-1"),
            TenantId::new("tenant-1"),
        )
    }

    #[test]
    fn sealing_links_events() {
        let mut head = ChainHead::genesis();
        let first = draft(EventType::IntentReceived).seal(&mut head);
        let second = draft(EventType::IntentParsed).seal(&mut head);

        assert_eq!(first.sequence, 1);
        assert_eq!(first.previous_hash, GENESIS_HASH);
        assert_eq!(second.sequence, 2);
        assert_eq!(second.previous_hash, first.hash);
        assert_eq!(head.last_hash, second.hash);
        assert!(first.verify_integrity());
        assert!(second.verify_integrity());
    }

    #[test]
    fn tampered_payload_fails_integrity() {
        let mut head = ChainHead::genesis();
        let mut event = draft(EventType::ComplianceResult)
            .payload("decision", "DENY")
            .seal(&mut head);
        event
            .payload
            .insert("decision".into(), serde_json::json!("ALLOW"));
        assert!(!event.verify_integrity());
    }

    #[test]
    fn integrity_survives_json_round_trip() {
        let mut head = ChainHead::genesis();
        let event = draft(EventType::RagAdvisoryLowConfidence)
            .payload("confidence", 0.0)
            .reason("timeout")
            .confidence(ConfidenceBucket::LowConfidence)
            .seal(&mut head);
        let line = serde_json::to_string(&event).unwrap();
        let back: EvidenceEvent = serde_json::from_str(&line).unwrap();
        assert_eq!(back, event);
        assert!(back.verify_integrity());
        assert!(line.contains("\"confidence\":\"LOW_CONFIDENCE\""));
        assert!(line.contains("\"eventType\":\"RAG_ADVISORY_LOW_CONFIDENCE\""));
    }
}
