use thiserror::Error;
use uip_types::RuleId;

/// A fact lookup the provider could not answer.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
#[error("fact lookup failed: {0}")]
pub struct FactError(pub String);

/// A rule could not reach a verdict.
///
/// Never crosses the chain boundary: the chain records it as a FAIL check.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum RuleEvaluationError {
    #[error("{rule}: {source}")]
    FactLookup {
        rule: RuleId,
        #[source]
        source: FactError,
    },

    #[error("{rule}: fact lookup timed out after {timeout_ms}ms")]
    Timeout { rule: RuleId, timeout_ms: u64 },

    #[error("{rule}: rule implementation panicked")]
    Panicked { rule: RuleId },
}

impl RuleEvaluationError {
    pub fn rule(&self) -> RuleId {
        match self {
            RuleEvaluationError::FactLookup { rule, .. }
            | RuleEvaluationError::Timeout { rule, .. }
            | RuleEvaluationError::Panicked { rule } => *rule,
        }
    }
}

/// Errors raised while assembling a rule chain.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ComplianceError {
    #[error("rule {rule} is out of canonical order")]
    RuleOrder { rule: RuleId },

    #[error("rule chain is empty")]
    EmptyChain,
}
