//! Hash-chain verification over sealed evidence.

use std::collections::BTreeMap;

use serde::Serialize;

use crate::error::EvidenceError;
use crate::event::{EvidenceEvent, GENESIS_HASH};

/// Summary of one verified intent chain.
#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ChainReport {
    pub intent_id: String,
    pub events: u64,
    pub head_hash: String,
}

/// Verify the chain of a single intent, in emission order.
///
/// Detects edited events, missing or reordered sequence numbers and
/// inserted events. Truncation of the tail is not detectable from the
/// events alone; compare `head_hash` against a known head for that.
pub fn verify_chain(events: &[EvidenceEvent]) -> Result<ChainReport, EvidenceError> {
    let Some(first) = events.first() else {
        return Ok(ChainReport {
            intent_id: String::new(),
            events: 0,
            head_hash: GENESIS_HASH.to_string(),
        });
    };
    let intent_id = first.intent_id.as_str().to_string();

    let mut expected_sequence = 1u64;
    let mut previous = GENESIS_HASH.to_string();
    for event in events {
        if event.intent_id.as_str() != intent_id {
            return Err(EvidenceError::MixedIntents {
                expected: intent_id,
                found: event.intent_id.to_string(),
            });
        }
        if event.sequence != expected_sequence {
            return Err(EvidenceError::SequenceGap {
                intent_id,
                expected: expected_sequence,
                found: event.sequence,
            });
        }
        if event.previous_hash != previous {
            return Err(EvidenceError::BrokenLink {
                intent_id,
                sequence: event.sequence,
            });
        }
        if !event.verify_integrity() {
            return Err(EvidenceError::IntegrityFailure {
                intent_id,
                sequence: event.sequence,
            });
        }
        previous = event.hash.clone();
        expected_sequence += 1;
    }

    Ok(ChainReport {
        intent_id,
        events: events.len() as u64,
        head_hash: previous,
    })
}

/// Verify an interleaved log holding many intents.
///
/// Events are grouped by intent, keeping their relative order.
pub fn verify_log(events: &[EvidenceEvent]) -> Result<Vec<ChainReport>, EvidenceError> {
    let mut by_intent: BTreeMap<&str, Vec<EvidenceEvent>> = BTreeMap::new();
    for event in events {
        by_intent
            .entry(event.intent_id.as_str())
            .or_default()
            .push(event.clone());
    }

    by_intent
        .values()
        .map(|chain| verify_chain(chain))
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::event::{ChainHead, Engine, EventType};
    use uip_types::{ActorId, IntentId, TenantId};

    fn chain(intent: &str, len: usize) -> Vec<EvidenceEvent> {
        let mut head = ChainHead::genesis();
        (0..len)
            .map(|i| {
                EvidenceEvent::draft(
                    EventType::ComplianceRuleChecked,
                    Engine::ComplianceEngine,
                    IntentId::new(intent),
                    ActorId::new("actor"),
                    TenantId::new("tenant"),
                )
                .payload("index", i)
                .seal(&mut head)
            })
            .collect()
    }

    #[test]
    fn intact_chain_verifies() {
        let events = chain("a", 4);
        let report = verify_chain(&events).unwrap();
        assert_eq!(report.events, 4);
        assert_eq!(report.head_hash, events[3].hash);
    }

    #[test]
    fn deletion_is_detected() {
        let mut events = chain("a", 4);
        events.remove(1);
        assert!(matches!(
            verify_chain(&events),
            Err(EvidenceError::SequenceGap { expected: 2, found: 3, .. })
        ));
    }

    #[test]
    fn reordering_is_detected() {
        let mut events = chain("a", 3);
        events.swap(0, 1);
        assert!(verify_chain(&events).is_err());
    }

    #[test]
    fn edit_is_detected() {
        let mut events = chain("a", 3);
        events[2].reason = Some("rewritten".into());
        assert!(matches!(
            verify_chain(&events),
            Err(EvidenceError::IntegrityFailure { sequence: 3, .. })
        ));
    }

    #[test]
    fn relinked_forgery_is_detected() {
        let mut events = chain("a", 3);
        // Replace the middle event with a forged one that keeps its sequence
        let mut forged = events[1].clone();
        forged.payload.insert("index".into(), serde_json::json!(99));
        forged.hash = "f".repeat(64);
        events[1] = forged;
        assert!(verify_chain(&events).is_err());
    }

    #[test]
    fn interleaved_log_verifies_per_intent() {
        let a = chain("a", 3);
        let b = chain("b", 2);
        let log = vec![
            a[0].clone(),
            b[0].clone(),
            a[1].clone(),
            b[1].clone(),
            a[2].clone(),
        ];
        let reports = verify_log(&log).unwrap();
        assert_eq!(reports.len(), 2);
        assert_eq!(reports[0].events, 3);
        assert_eq!(reports[1].events, 2);
    }
}
