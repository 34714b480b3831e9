use thiserror::Error;

/// An evidence append that was not durably accepted.
///
/// The orchestrator never propagates this: it is logged and counted.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
#[error("evidence sink '{sink}' unavailable: {reason}")]
pub struct SinkUnavailable {
    pub sink: String,
    pub reason: String,
}

impl SinkUnavailable {
    pub fn new(sink: impl Into<String>, reason: impl Into<String>) -> Self {
        Self {
            sink: sink.into(),
            reason: reason.into(),
        }
    }
}

/// Errors from reading or verifying an evidence log.
#[derive(Error, Debug)]
pub enum EvidenceError {
    #[error("evidence I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("malformed evidence record at line {line}: {reason}")]
    Malformed { line: usize, reason: String },

    #[error("event integrity verification failed for intent {intent_id} at sequence {sequence}")]
    IntegrityFailure { intent_id: String, sequence: u64 },

    #[error("sequence gap for intent {intent_id}: expected {expected}, found {found}")]
    SequenceGap {
        intent_id: String,
        expected: u64,
        found: u64,
    },

    #[error("broken hash link for intent {intent_id} at sequence {sequence}")]
    BrokenLink { intent_id: String, sequence: u64 },

    #[error("chain mixes intents: expected {expected}, found {found}")]
    MixedIntents { expected: String, found: String },

    #[error(transparent)]
    Sink(#[from] SinkUnavailable),

    #[error("serialization error: {0}")]
    Serialization(String),
}

impl From<serde_json::Error> for EvidenceError {
    fn from(e: serde_json::Error) -> Self {
        EvidenceError::Serialization(e.to_string())
    }
}
