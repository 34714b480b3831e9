use std::sync::Arc;

use async_trait::async_trait;
use uip_types::{ComplianceCheckResult, IntendedUse, PropertyType, RuleId};

use super::{ComplianceRule, RuleInput};
use crate::error::RuleEvaluationError;
use crate::facts::FactProvider;

/// Rule 2: Zoning Validation
///
/// The declared intended use (or the one inferred from the property type)
/// must be in the zone's allowed-use set.
pub struct ZoningRule {
    facts: Arc<dyn FactProvider>,
}

impl ZoningRule {
    pub fn new(facts: Arc<dyn FactProvider>) -> Self {
        Self { facts }
    }
}

#[async_trait]
impl ComplianceRule for ZoningRule {
    fn rule_id(&self) -> RuleId {
        RuleId::ZoningComplianceCheck
    }

    async fn check(&self, input: RuleInput<'_>) -> Result<ComplianceCheckResult, RuleEvaluationError> {
        let rule = self.rule_id();
        let attrs = &input.intent.attributes;
        let declared_type = attrs.property_type.unwrap_or(PropertyType::Residential);
        let use_declared = attrs.intended_use.is_some();
        let intended_use = attrs
            .intended_use
            .unwrap_or_else(|| IntendedUse::inferred_from(declared_type));

        let facts = self
            .facts
            .zoning(input.jurisdiction, &attrs.location, declared_type)
            .await
            .map_err(|source| RuleEvaluationError::FactLookup { rule, source })?;

        let Some(zone) = facts.zone else {
            return Ok(ComplianceCheckResult::pass(
                rule,
                "Zoning data unavailable - no use restriction applied",
                details! {
                    "zone" => "UNKNOWN",
                    "intendedUse" => intended_use,
                    "assumed" => true,
                },
            ));
        };

        if !facts.allowed_uses.contains(&intended_use) {
            let allowed: Vec<&str> = facts.allowed_uses.iter().map(|u| u.as_str()).collect();
            return Ok(ComplianceCheckResult::fail(
                rule,
                format!(
                    "Property is zoned for {} use only. {} use not allowed.",
                    zone.as_str().to_lowercase(),
                    capitalized(intended_use.as_str())
                ),
                details! {
                    "zone" => zone,
                    "allowedUse" => allowed,
                    "intendedUse" => intended_use,
                    "intendedUseDeclared" => use_declared,
                },
            ));
        }

        let allowed: Vec<&str> = facts.allowed_uses.iter().map(|u| u.as_str()).collect();
        Ok(ComplianceCheckResult::pass(
            rule,
            format!(
                "{} zone - allows {}",
                capitalized(zone.as_str()),
                allowed.join(", ").to_lowercase()
            ),
            details! {
                "zone" => zone,
                "allowedUse" => allowed,
                "intendedUse" => intended_use,
                "intendedUseDeclared" => use_declared,
            },
        ))
    }
}

fn capitalized(word: &str) -> String {
    let lower = word.to_lowercase();
    let mut chars = lower.chars();
    match chars.next() {
        Some(first) => first.to_uppercase().chain(chars).collect(),
        None => String::new(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::facts::StaticFactProvider;
    use crate::jurisdiction::Jurisdiction;
    use crate::mocks::UnknownZoningProvider;
    use uip_types::IntentRecord;

    async fn check(intent: &IntentRecord) -> ComplianceCheckResult {
        ZoningRule::new(Arc::new(StaticFactProvider::default()))
            .check(RuleInput {
                intent,
                jurisdiction: Jurisdiction::India,
            })
            .await
            .unwrap()
    }

    #[tokio::test]
    async fn commercial_use_of_residential_zone_fails() {
        let intent = IntentRecord::builder("BUY_PROPERTY", "Vizag")
            .property_type(PropertyType::Residential)
            .intended_use(IntendedUse::Commercial)
            .build();
        let result = check(&intent).await;
        assert!(!result.passed());
        assert_eq!(
            result.reason,
            "Property is zoned for residential use only. Commercial use not allowed."
        );
        assert_eq!(
            result.details["allowedUse"],
            serde_json::json!(["RESIDENCE", "INVESTMENT"])
        );
    }

    #[tokio::test]
    async fn investment_in_residential_zone_passes() {
        let intent = IntentRecord::builder("BUY_PROPERTY", "Vizag")
            .property_type(PropertyType::Residential)
            .intended_use(IntendedUse::Investment)
            .build();
        let result = check(&intent).await;
        assert!(result.passed());
        assert_eq!(result.reason, "Residential zone - allows residence, investment");
    }

    #[tokio::test]
    async fn use_is_inferred_from_property_type() {
        let intent = IntentRecord::builder("BUY_PROPERTY", "Vizag")
            .property_type(PropertyType::Commercial)
            .build();
        let result = check(&intent).await;
        assert!(result.passed());
        assert_eq!(result.details["intendedUse"], "COMMERCIAL");
        assert_eq!(result.details["intendedUseDeclared"], false);
    }

    #[tokio::test]
    async fn unknown_zone_is_marked_assumed() {
        let intent = IntentRecord::builder("BUY_PROPERTY", "Vizag").build();
        let result = ZoningRule::new(Arc::new(UnknownZoningProvider))
            .check(RuleInput {
                intent: &intent,
                jurisdiction: Jurisdiction::India,
            })
            .await
            .unwrap();
        assert!(result.passed());
        assert_eq!(result.details["assumed"], true);
    }

    #[test]
    fn capitalization() {
        assert_eq!(capitalized("COMMERCIAL"), "Commercial");
        assert_eq!(capitalized(""), "");
    }
}
