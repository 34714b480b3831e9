use async_trait::async_trait;
use uip_types::{ComplianceCheckResult, Details, GpsCoordinates, PropertyType, RuleId};

use crate::error::{FactError, RuleEvaluationError};
use crate::facts::{FactProvider, LandFacts, LandType, OwnershipFacts, ZoningFacts};
use crate::jurisdiction::Jurisdiction;
use crate::rules::{ComplianceRule, RuleInput};

/// Rule with a fixed verdict.
pub struct ScriptedRule {
    rule_id: RuleId,
    pass: bool,
}

impl ScriptedRule {
    pub fn pass(rule_id: RuleId) -> Self {
        Self {
            rule_id,
            pass: true,
        }
    }

    pub fn fail(rule_id: RuleId) -> Self {
        Self {
            rule_id,
            pass: false,
        }
    }
}

#[async_trait]
impl ComplianceRule for ScriptedRule {
    fn rule_id(&self) -> RuleId {
        self.rule_id
    }

    async fn check(&self, _input: RuleInput<'_>) -> Result<ComplianceCheckResult, RuleEvaluationError> {
        Ok(if self.pass {
            ComplianceCheckResult::pass(self.rule_id, "scripted pass", Details::new())
        } else {
            ComplianceCheckResult::fail(
                self.rule_id,
                format!("scripted failure of {}", self.rule_id),
                Details::new(),
            )
        })
    }
}

/// Rule whose implementation panics.
pub struct PanickingRule(pub RuleId);

#[async_trait]
impl ComplianceRule for PanickingRule {
    fn rule_id(&self) -> RuleId {
        self.0
    }

    async fn check(&self, _input: RuleInput<'_>) -> Result<ComplianceCheckResult, RuleEvaluationError> {
        panic!("rule {} exploded", self.0)
    }
}

/// Provider whose every lookup errors.
pub struct BrokenFactProvider;

#[async_trait]
impl FactProvider for BrokenFactProvider {
    async fn ownership(&self, _jurisdiction: Jurisdiction) -> Result<OwnershipFacts, FactError> {
        Err(FactError("ownership registry offline".into()))
    }

    async fn zoning(
        &self,
        _jurisdiction: Jurisdiction,
        _location: &str,
        _declared_type: PropertyType,
    ) -> Result<ZoningFacts, FactError> {
        Err(FactError("zoning registry offline".into()))
    }

    async fn land(
        &self,
        _jurisdiction: Jurisdiction,
        _point: &GpsCoordinates,
    ) -> Result<LandFacts, FactError> {
        Err(FactError("land registry offline".into()))
    }
}

/// Provider whose lookups never complete.
pub struct StalledFactProvider;

#[async_trait]
impl FactProvider for StalledFactProvider {
    async fn ownership(&self, _jurisdiction: Jurisdiction) -> Result<OwnershipFacts, FactError> {
        std::future::pending().await
    }

    async fn zoning(
        &self,
        _jurisdiction: Jurisdiction,
        _location: &str,
        _declared_type: PropertyType,
    ) -> Result<ZoningFacts, FactError> {
        std::future::pending().await
    }

    async fn land(
        &self,
        _jurisdiction: Jurisdiction,
        _point: &GpsCoordinates,
    ) -> Result<LandFacts, FactError> {
        std::future::pending().await
    }
}

/// Provider that knows nothing about any parcel.
pub struct UnknownZoningProvider;

#[async_trait]
impl FactProvider for UnknownZoningProvider {
    async fn ownership(&self, _jurisdiction: Jurisdiction) -> Result<OwnershipFacts, FactError> {
        Ok(OwnershipFacts::default())
    }

    async fn zoning(
        &self,
        _jurisdiction: Jurisdiction,
        _location: &str,
        _declared_type: PropertyType,
    ) -> Result<ZoningFacts, FactError> {
        Ok(ZoningFacts::unknown())
    }

    async fn land(
        &self,
        _jurisdiction: Jurisdiction,
        _point: &GpsCoordinates,
    ) -> Result<LandFacts, FactError> {
        Ok(LandFacts {
            land_type: LandType::Unknown,
            area_name: None,
        })
    }
}
