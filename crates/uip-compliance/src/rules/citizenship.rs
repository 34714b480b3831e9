use std::sync::Arc;

use async_trait::async_trait;
use tracing::debug;
use uip_types::{ComplianceCheckResult, PropertyType, RuleId};

use super::{ComplianceRule, RuleInput};
use crate::config::JurisdictionPolicy;
use crate::error::RuleEvaluationError;
use crate::facts::FactProvider;

/// Rule 1: Citizenship / Eligibility
///
/// Fails when the actor's citizenship and residency are barred from the
/// declared property type in the classified jurisdiction.
pub struct CitizenshipRule {
    facts: Arc<dyn FactProvider>,
    unknown_jurisdiction: JurisdictionPolicy,
}

impl CitizenshipRule {
    pub fn new(facts: Arc<dyn FactProvider>, unknown_jurisdiction: JurisdictionPolicy) -> Self {
        Self {
            facts,
            unknown_jurisdiction,
        }
    }
}

#[async_trait]
impl ComplianceRule for CitizenshipRule {
    fn rule_id(&self) -> RuleId {
        RuleId::ForeignNationalLandRestriction
    }

    async fn check(&self, input: RuleInput<'_>) -> Result<ComplianceCheckResult, RuleEvaluationError> {
        let rule = self.rule_id();
        let attrs = &input.intent.attributes;
        let jurisdiction = input.jurisdiction;
        let citizenship = attrs.citizenship;
        let residency = attrs.residency_status;
        let property_type = attrs.property_type.unwrap_or(PropertyType::Residential);

        if !jurisdiction.is_recognized() {
            return Ok(match self.unknown_jurisdiction {
                JurisdictionPolicy::Allow => ComplianceCheckResult::pass(
                    rule,
                    "Jurisdiction not recognized - no ownership restrictions applied",
                    details! {
                        "citizenship" => citizenship,
                        "residencyStatus" => residency,
                        "jurisdiction" => jurisdiction,
                        "allowed" => true,
                        "assumed" => true,
                    },
                ),
                JurisdictionPolicy::Deny => ComplianceCheckResult::fail(
                    rule,
                    format!(
                        "Jurisdiction could not be determined from location '{}'",
                        attrs.location
                    ),
                    details! {
                        "citizenship" => citizenship,
                        "residencyStatus" => residency,
                        "jurisdiction" => jurisdiction,
                        "allowed" => false,
                    },
                ),
            });
        }

        let Some(citizenship) = citizenship else {
            return Ok(ComplianceCheckResult::pass(
                rule,
                "Citizenship not declared - treated as domestic",
                details! {
                    "citizenship" => jurisdiction.domestic_citizenship(),
                    "residencyStatus" => residency,
                    "jurisdiction" => jurisdiction,
                    "allowed" => true,
                    "assumed" => true,
                },
            ));
        };

        let facts = self
            .facts
            .ownership(jurisdiction)
            .await
            .map_err(|source| RuleEvaluationError::FactLookup { rule, source })?;

        if let Some(restriction) = facts
            .restrictions
            .iter()
            .find(|r| r.applies(citizenship, residency, property_type))
        {
            debug!(
                intent_id = %input.intent.intent_id,
                restriction = %restriction.code,
                "Ownership restriction matched"
            );
            return Ok(ComplianceCheckResult::fail(
                rule,
                restriction.reason.clone(),
                details! {
                    "citizenship" => citizenship,
                    "residencyStatus" => residency,
                    "jurisdiction" => jurisdiction,
                    "propertyType" => property_type,
                    "restriction" => restriction.code,
                    "allowed" => false,
                },
            ));
        }

        let reason = if Some(citizenship) == jurisdiction.domestic_citizenship() {
            format!(
                "{} citizen - eligible for all property types",
                jurisdiction.display_name()
            )
        } else {
            format!(
                "No ownership restriction for {} nationals on {} property in {}",
                citizenship.as_str(),
                property_type.as_str(),
                jurisdiction.display_name()
            )
        };

        Ok(ComplianceCheckResult::pass(
            rule,
            reason,
            details! {
                "citizenship" => citizenship,
                "residencyStatus" => residency,
                "jurisdiction" => jurisdiction,
                "propertyType" => property_type,
                "allowed" => true,
            },
        ))
    }
}
