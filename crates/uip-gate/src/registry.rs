use std::collections::HashMap;
use std::sync::Arc;

use tokio::sync::{Mutex, OwnedMutexGuard, RwLock};
use uip_evidence::{ChainHead, EventType, EvidenceEvent};
use uip_types::{ActorId, ConfidenceBucket, IntentId, IntentRecord, LifecycleState, TenantId};

/// Everything the orchestrator tracks for one intent.
///
/// Once the intent reaches a terminal state the slot is compacted: the
/// record and advisory memo are dropped, leaving identity, state and the
/// chain head.
#[derive(Clone, Debug)]
pub struct IntentSlot {
    pub intent_id: IntentId,
    pub actor_id: ActorId,
    pub tenant_id: TenantId,
    /// Last submitted record; `None` once closed or when rebuilt from evidence.
    pub intent: Option<IntentRecord>,
    pub state: LifecycleState,
    pub chain: ChainHead,
    /// Bucket and usability of the last advisory consulted for this intent.
    pub last_advisory: Option<(ConfidenceBucket, bool)>,
}

impl IntentSlot {
    fn received(intent: &IntentRecord) -> Self {
        Self {
            intent_id: intent.intent_id.clone(),
            actor_id: intent.actor_id.clone(),
            tenant_id: intent.tenant_id.clone(),
            intent: Some(intent.clone()),
            state: LifecycleState::IntentReceived,
            chain: ChainHead::genesis(),
            last_advisory: None,
        }
    }

    /// Rebuild a slot by folding one intent's persisted chain.
    ///
    /// The state is the last `toState` recorded; the head is the last event.
    /// Returns `None` for an empty chain.
    pub fn replay(events: &[EvidenceEvent]) -> Option<Self> {
        let first = events.first()?;
        let mut slot = Self {
            intent_id: first.intent_id.clone(),
            actor_id: first.actor_id.clone(),
            tenant_id: first.tenant_id.clone(),
            intent: None,
            state: LifecycleState::IntentReceived,
            chain: ChainHead::genesis(),
            last_advisory: None,
        };

        for event in events {
            if let Some(state) = event
                .payload
                .get("toState")
                .and_then(|v| serde_json::from_value::<LifecycleState>(v.clone()).ok())
            {
                slot.state = state;
            }
            if matches!(
                event.event_type,
                EventType::RagQueryExecuted | EventType::RagAdvisoryLowConfidence
            ) {
                let usable = event
                    .payload
                    .get("usable")
                    .and_then(serde_json::Value::as_bool)
                    .unwrap_or(false);
                slot.last_advisory = event.confidence.map(|bucket| (bucket, usable));
            }
            slot.chain = ChainHead {
                sequence: event.sequence,
                last_hash: event.hash.clone(),
            };
        }

        if slot.state.is_terminal() {
            slot.compact();
        }
        Some(slot)
    }

    pub fn is_closed(&self) -> bool {
        self.state.is_terminal()
    }

    /// Drop everything a closed intent no longer needs.
    pub fn compact(&mut self) {
        self.intent = None;
        self.last_advisory = None;
    }
}

/// Per-intent exclusive slots.
///
/// The map lock is held only to find or insert a slot; all work on an
/// intent happens under that intent's own mutex, so distinct intents never
/// contend.
#[derive(Default)]
pub struct IntentRegistry {
    slots: RwLock<HashMap<IntentId, Arc<Mutex<IntentSlot>>>>,
}

impl IntentRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Lock the slot for `intent`, creating it in INTENT_RECEIVED if new.
    pub async fn acquire_or_insert(&self, intent: &IntentRecord) -> OwnedMutexGuard<IntentSlot> {
        let existing = self.slots.read().await.get(&intent.intent_id).cloned();
        let slot = match existing {
            Some(slot) => slot,
            None => {
                let mut slots = self.slots.write().await;
                slots
                    .entry(intent.intent_id.clone())
                    .or_insert_with(|| Arc::new(Mutex::new(IntentSlot::received(intent))))
                    .clone()
            }
        };
        slot.lock_owned().await
    }

    pub async fn acquire(&self, intent_id: &IntentId) -> Option<OwnedMutexGuard<IntentSlot>> {
        let slot = self.slots.read().await.get(intent_id).cloned()?;
        Some(slot.lock_owned().await)
    }

    /// Install a rebuilt slot, replacing any existing one for that intent.
    pub async fn restore(&self, slot: IntentSlot) {
        let mut slots = self.slots.write().await;
        match slots.get(&slot.intent_id).cloned() {
            Some(existing) => *existing.lock().await = slot,
            None => {
                slots.insert(slot.intent_id.clone(), Arc::new(Mutex::new(slot)));
            }
        }
    }

    pub async fn state(&self, intent_id: &IntentId) -> Option<LifecycleState> {
        let guard = self.acquire(intent_id).await?;
        Some(guard.state)
    }

    /// Copy of the slot, for inspection.
    pub async fn snapshot(&self, intent_id: &IntentId) -> Option<IntentSlot> {
        let guard = self.acquire(intent_id).await?;
        Some(guard.clone())
    }

    pub async fn len(&self) -> usize {
        self.slots.read().await.len()
    }

    pub async fn is_empty(&self) -> bool {
        self.slots.read().await.is_empty()
    }
}
