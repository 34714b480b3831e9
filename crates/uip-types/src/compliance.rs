use std::collections::BTreeMap;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Deserializer, Serialize, Serializer};

use crate::ids::IntentId;

/// Version tag of the closed rule set below.
pub const RULESET_VERSION: &str = "uip-compliance-rules/v1";

/// Reason carried by an ALLOW decision.
pub const SUCCESS_REASON: &str = "All compliance checks passed";

/// Structured facts that drove a verdict. Ordered so encoding is deterministic.
pub type Details = BTreeMap<String, serde_json::Value>;

/// Closed, versioned set of rule identifiers, in canonical evaluation order.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum RuleId {
    ForeignNationalLandRestriction,
    ZoningComplianceCheck,
    LandExistenceValidation,
}

impl RuleId {
    /// The fixed order in which the chain runs its rules.
    pub const ORDER: [RuleId; 3] = [
        RuleId::ForeignNationalLandRestriction,
        RuleId::ZoningComplianceCheck,
        RuleId::LandExistenceValidation,
    ];

    pub fn category(&self) -> CheckCategory {
        match self {
            RuleId::ForeignNationalLandRestriction => CheckCategory::Citizenship,
            RuleId::ZoningComplianceCheck => CheckCategory::Zoning,
            RuleId::LandExistenceValidation => CheckCategory::LandExistence,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            RuleId::ForeignNationalLandRestriction => "FOREIGN_NATIONAL_LAND_RESTRICTION",
            RuleId::ZoningComplianceCheck => "ZONING_COMPLIANCE_CHECK",
            RuleId::LandExistenceValidation => "LAND_EXISTENCE_VALIDATION",
        }
    }
}

impl std::fmt::Display for RuleId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum CheckCategory {
    #[serde(rename = "CITIZENSHIP")]
    Citizenship,
    #[serde(rename = "ZONING")]
    Zoning,
    /// Land existence / geospatial sanity
    #[serde(rename = "GPS")]
    LandExistence,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum CheckStatus {
    Pass,
    Fail,
}

/// Whether a failing check halts the pipeline.
///
/// Every rule at this layer is `Blocking`. On the wire this is the boolean
/// `blocking` field.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum Enforcement {
    Blocking,
    Advisory,
}

impl Enforcement {
    pub fn is_blocking(&self) -> bool {
        matches!(self, Enforcement::Blocking)
    }
}

impl Serialize for Enforcement {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_bool(self.is_blocking())
    }
}

impl<'de> Deserialize<'de> for Enforcement {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        Ok(if bool::deserialize(deserializer)? {
            Enforcement::Blocking
        } else {
            Enforcement::Advisory
        })
    }
}

/// One rule's verdict. Created once per rule invocation, never mutated.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ComplianceCheckResult {
    pub rule_id: RuleId,
    #[serde(rename = "type")]
    pub category: CheckCategory,
    pub status: CheckStatus,
    #[serde(rename = "blocking")]
    pub enforcement: Enforcement,
    pub reason: String,
    pub details: Details,
}

impl ComplianceCheckResult {
    pub fn pass(rule_id: RuleId, reason: impl Into<String>, details: Details) -> Self {
        Self {
            rule_id,
            category: rule_id.category(),
            status: CheckStatus::Pass,
            enforcement: Enforcement::Blocking,
            reason: reason.into(),
            details,
        }
    }

    pub fn fail(rule_id: RuleId, reason: impl Into<String>, details: Details) -> Self {
        Self {
            rule_id,
            category: rule_id.category(),
            status: CheckStatus::Fail,
            enforcement: Enforcement::Blocking,
            reason: reason.into(),
            details,
        }
    }

    pub fn passed(&self) -> bool {
        self.status == CheckStatus::Pass
    }

    /// A failure that halts the chain.
    pub fn is_blocking_failure(&self) -> bool {
        !self.passed() && self.enforcement.is_blocking()
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum Decision {
    Allow,
    Deny,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum DecisionStatus {
    Passed,
    Failed,
}

/// Aggregate output of the rule chain.
///
/// `checks` is always a prefix of [`RuleId::ORDER`]; `confidence` is computed
/// over the executed checks only.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ComplianceDecision {
    pub intent_id: IntentId,
    pub decision: Decision,
    pub status: DecisionStatus,
    pub confidence: f64,
    pub blocking: bool,
    pub reason: String,
    pub checks: Vec<ComplianceCheckResult>,
    pub timestamp: DateTime<Utc>,
}

impl ComplianceDecision {
    /// Aggregate the executed checks into a decision.
    ///
    /// An empty check list is treated as a denial.
    pub fn from_checks(
        intent_id: IntentId,
        checks: Vec<ComplianceCheckResult>,
        timestamp: DateTime<Utc>,
    ) -> Self {
        let passed = checks.iter().filter(|c| c.passed()).count();
        let confidence = if checks.is_empty() {
            0.0
        } else {
            passed as f64 / checks.len() as f64
        };

        let first_failure = checks.iter().find(|c| !c.passed());
        let (decision, status, reason) = match first_failure {
            Some(check) => (Decision::Deny, DecisionStatus::Failed, check.reason.clone()),
            None if checks.is_empty() => (
                Decision::Deny,
                DecisionStatus::Failed,
                "No compliance checks were executed".to_string(),
            ),
            None => (
                Decision::Allow,
                DecisionStatus::Passed,
                SUCCESS_REASON.to_string(),
            ),
        };
        let blocking = checks.iter().any(|c| c.is_blocking_failure()) || checks.is_empty();

        Self {
            intent_id,
            decision,
            status,
            confidence,
            blocking,
            reason,
            checks,
            timestamp,
        }
    }

    pub fn is_allow(&self) -> bool {
        self.decision == Decision::Allow
    }

    pub fn passed_count(&self) -> usize {
        self.checks.iter().filter(|c| c.passed()).count()
    }

    pub fn failed_count(&self) -> usize {
        self.checks.len() - self.passed_count()
    }

    /// Whether the pipeline may proceed to decision making.
    pub fn can_proceed(&self) -> bool {
        self.is_allow() && !self.blocking
    }
}
