use async_trait::async_trait;

use crate::error::SinkUnavailable;
use crate::event::EvidenceEvent;
use crate::sink::EvidenceSink;

/// Sink that rejects every append.
pub struct FailingEvidenceSink {
    reason: String,
}

impl FailingEvidenceSink {
    pub fn new(reason: impl Into<String>) -> Self {
        Self {
            reason: reason.into(),
        }
    }
}

#[async_trait]
impl EvidenceSink for FailingEvidenceSink {
    fn name(&self) -> &str {
        "failing"
    }

    async fn append(&self, _event: &EvidenceEvent) -> Result<(), SinkUnavailable> {
        Err(SinkUnavailable::new(self.name(), self.reason.clone()))
    }
}

/// Sink whose appends never complete.
pub struct StalledEvidenceSink;

#[async_trait]
impl EvidenceSink for StalledEvidenceSink {
    fn name(&self) -> &str {
        "stalled"
    }

    async fn append(&self, _event: &EvidenceEvent) -> Result<(), SinkUnavailable> {
        std::future::pending::<()>().await;
        Ok(())
    }
}
