//! The three blocking compliance rules.

/// Build a details map from key/value pairs.
macro_rules! details {
    ($($key:literal => $value:expr),* $(,)?) => {{
        let mut map = uip_types::Details::new();
        $( map.insert($key.to_string(), serde_json::json!($value)); )*
        map
    }};
}

mod citizenship;
mod land;
mod zoning;

use async_trait::async_trait;
use uip_types::{CheckCategory, ComplianceCheckResult, IntentRecord, RuleId};

use crate::error::RuleEvaluationError;
use crate::jurisdiction::Jurisdiction;

pub use citizenship::CitizenshipRule;
pub use land::LandExistenceRule;
pub use zoning::ZoningRule;

/// What a rule sees for one evaluation.
#[derive(Clone, Copy, Debug)]
pub struct RuleInput<'a> {
    pub intent: &'a IntentRecord,
    /// Classified once per chain run
    pub jurisdiction: Jurisdiction,
}

/// One compliance predicate.
///
/// Returns a check result for both outcomes; `Err` only when a verdict could
/// not be reached at all.
#[async_trait]
pub trait ComplianceRule: Send + Sync {
    fn rule_id(&self) -> RuleId;

    fn category(&self) -> CheckCategory {
        self.rule_id().category()
    }

    async fn check(&self, input: RuleInput<'_>) -> Result<ComplianceCheckResult, RuleEvaluationError>;
}
