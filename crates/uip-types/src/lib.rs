//! UIP wire contract.
//!
//! Every type in this crate is JSON-serializable and its field names and enum
//! spellings are the wire contract shared with the evidence store and the
//! surrounding platform. Values must round-trip byte-for-byte through
//! `serde_json`.
//!
//! ## Contents
//!
//! - **Identifiers**: opaque intent, tenant and actor ids
//! - **Intent Record**: the unit of work entering the gate
//! - **Compliance**: per-rule check results and the aggregate decision
//! - **Lifecycle**: the closed pipeline-stage graph and its successor table
//! - **Advisory**: confidence-scored retrieval responses and their buckets

#![deny(unsafe_code)]

pub mod advisory;
pub mod compliance;
pub mod error;
pub mod ids;
pub mod intent;
pub mod lifecycle;

pub use advisory::{
    AdvisoryResponse, ConfidenceBucket, MarketContext, RiskSeverity, RiskSignal, RiskSignalType,
    Source, SourceType, ValuationHint, ADVISORY_THRESHOLD, HIGH_CONFIDENCE_THRESHOLD,
};
pub use compliance::{
    CheckCategory, CheckStatus, ComplianceCheckResult, ComplianceDecision, Decision,
    DecisionStatus, Details, Enforcement, RuleId, RULESET_VERSION, SUCCESS_REASON,
};
pub use error::{IntentValidationError, InvalidTransition};
pub use ids::{ActorId, IntentId, TenantId};
pub use intent::{
    Citizenship, GpsCoordinates, IntendedUse, IntentAttributes, IntentRecord, PropertyType,
    ResidencyStatus,
};
pub use lifecycle::{LifecycleMachine, LifecycleState};
