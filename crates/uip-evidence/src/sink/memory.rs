use std::sync::Arc;

use async_trait::async_trait;
use tokio::sync::RwLock;
use uip_types::IntentId;

use super::EvidenceSink;
use crate::error::SinkUnavailable;
use crate::event::EvidenceEvent;

/// In-memory sink for development and testing.
#[derive(Debug, Clone, Default)]
pub struct MemoryEvidenceSink {
    events: Arc<RwLock<Vec<EvidenceEvent>>>,
}

impl MemoryEvidenceSink {
    pub fn new() -> Self {
        Self::default()
    }

    /// Every accepted event, in acceptance order.
    pub async fn events(&self) -> Vec<EvidenceEvent> {
        self.events.read().await.clone()
    }

    pub async fn events_for(&self, intent_id: &IntentId) -> Vec<EvidenceEvent> {
        self.events
            .read()
            .await
            .iter()
            .filter(|e| &e.intent_id == intent_id)
            .cloned()
            .collect()
    }

    pub async fn len(&self) -> usize {
        self.events.read().await.len()
    }

    pub async fn is_empty(&self) -> bool {
        self.events.read().await.is_empty()
    }
}

#[async_trait]
impl EvidenceSink for MemoryEvidenceSink {
    fn name(&self) -> &str {
        "memory"
    }

    async fn append(&self, event: &EvidenceEvent) -> Result<(), SinkUnavailable> {
        self.events.write().await.push(event.clone());
        Ok(())
    }
}
