use thiserror::Error;

/// Advisory retrieval failure.
///
/// Recovered by [`crate::GuardedAdvisor`] into the zero-confidence sentinel;
/// never reaches the gate or the orchestrator.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum AdvisoryError {
    #[error("no advisory adapter registered for country '{0}'")]
    NoAdapter(String),

    #[error("advisory request failed: {0}")]
    Http(String),

    #[error("advisory backend returned {status}: {body}")]
    Status { status: u16, body: String },

    #[error("failed to parse advisory response: {0}")]
    Parse(String),

    #[error("advisory provider timed out after {timeout_ms}ms")]
    Timeout { timeout_ms: u64 },
}

impl From<reqwest::Error> for AdvisoryError {
    fn from(e: reqwest::Error) -> Self {
        AdvisoryError::Http(e.to_string())
    }
}
