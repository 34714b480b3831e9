//! Evidence trail for the UIP compliance gate.
//!
//! Every pipeline step becomes an immutable [`EvidenceEvent`]. Events of one
//! intent form a BLAKE3 hash chain (sequence, previous hash, own hash), so
//! the persisted trail is tamper-evident and replayable.
//!
//! The [`EvidenceEmitter`] seals drafts and appends them to an
//! [`EvidenceSink`]. A sink that is unavailable never aborts the pipeline:
//! the failure is logged and counted in [`EmitterMetrics`].

#![deny(unsafe_code)]

pub mod chain;
pub mod emitter;
pub mod error;
pub mod event;
pub mod mocks;
pub mod sink;

pub use chain::{verify_chain, verify_log, ChainReport};
pub use emitter::{EmitterMetrics, EmitterMetricsSnapshot, EvidenceConfig, EvidenceEmitter, SinkConfig};
pub use error::{EvidenceError, SinkUnavailable};
pub use event::{ChainHead, Engine, EventDraft, EventType, EvidenceEvent, GENESIS_HASH};
pub use sink::{read_log, EvidenceSink, JsonlEvidenceSink, MemoryEvidenceSink};
#[cfg(feature = "postgres")]
pub use sink::PostgresEvidenceSink;

use std::sync::Arc;

/// Build the sink described by `config`.
pub async fn open_sink(config: &SinkConfig) -> Result<Arc<dyn EvidenceSink>, EvidenceError> {
    match config {
        SinkConfig::Memory => Ok(Arc::new(MemoryEvidenceSink::new())),
        SinkConfig::Jsonl { path } => Ok(Arc::new(JsonlEvidenceSink::open(path).await?)),
        #[cfg(feature = "postgres")]
        SinkConfig::Postgres {
            url,
            max_connections,
            connect_timeout_secs,
        } => Ok(Arc::new(
            PostgresEvidenceSink::connect(url, *max_connections, *connect_timeout_secs).await?,
        )),
        #[cfg(not(feature = "postgres"))]
        SinkConfig::Postgres { .. } => Err(EvidenceError::Sink(SinkUnavailable::new(
            "postgres",
            "built without the `postgres` feature",
        ))),
    }
}
