use thiserror::Error;
use uip_types::{IntentId, IntentValidationError, InvalidTransition, LifecycleState};

/// Hard failures returned to the orchestrator's caller.
///
/// Rule failures, advisory failures and sink failures are recovered inside
/// the pipeline and never appear here.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum GateError {
    #[error("malformed intent: {0}")]
    MalformedIntent(#[from] IntentValidationError),

    #[error(transparent)]
    InvalidTransition(#[from] InvalidTransition),

    #[error("intent not found: {0}")]
    IntentNotFound(IntentId),

    #[error("advisory consultation not permitted in state {state}")]
    AdvisoryNotPermitted { state: LifecycleState },

    #[error("no advisory provider configured")]
    AdvisoryDisabled,

    #[error("cannot resume from evidence: {0}")]
    EvidenceReplay(String),
}
