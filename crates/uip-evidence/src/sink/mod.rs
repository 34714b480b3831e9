//! Evidence sink backends.

mod jsonl;
mod memory;
#[cfg(feature = "postgres")]
mod postgres;

use async_trait::async_trait;

use crate::error::SinkUnavailable;
use crate::event::EvidenceEvent;

pub use jsonl::{read_log, JsonlEvidenceSink};
pub use memory::MemoryEvidenceSink;
#[cfg(feature = "postgres")]
pub use postgres::PostgresEvidenceSink;

/// External append-only audit store.
///
/// `append` returns once the event is durably accepted. Implementations must
/// preserve submission order per intent identifier.
#[async_trait]
pub trait EvidenceSink: Send + Sync {
    /// Short name used in logs and errors.
    fn name(&self) -> &str;

    async fn append(&self, event: &EvidenceEvent) -> Result<(), SinkUnavailable>;
}
