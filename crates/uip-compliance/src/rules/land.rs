use std::sync::Arc;

use async_trait::async_trait;
use uip_types::{ComplianceCheckResult, RuleId};

use super::{ComplianceRule, RuleInput};
use crate::config::CoordinatesPolicy;
use crate::error::RuleEvaluationError;
use crate::facts::{FactProvider, LandType};

/// Rule 3: Land Existence / Geospatial Sanity
pub struct LandExistenceRule {
    facts: Arc<dyn FactProvider>,
    missing_coordinates: CoordinatesPolicy,
}

impl LandExistenceRule {
    pub fn new(facts: Arc<dyn FactProvider>, missing_coordinates: CoordinatesPolicy) -> Self {
        Self {
            facts,
            missing_coordinates,
        }
    }
}

#[async_trait]
impl ComplianceRule for LandExistenceRule {
    fn rule_id(&self) -> RuleId {
        RuleId::LandExistenceValidation
    }

    async fn check(&self, input: RuleInput<'_>) -> Result<ComplianceCheckResult, RuleEvaluationError> {
        let rule = self.rule_id();

        let Some(point) = input.intent.attributes.gps_coordinates else {
            return Ok(match self.missing_coordinates {
                CoordinatesPolicy::AssumeValid => ComplianceCheckResult::pass(
                    rule,
                    "GPS coordinates not provided - assuming valid land",
                    details! {
                        "landType" => LandType::ValidLand,
                        "gpsValid" => false,
                        "exists" => true,
                        "assumed" => true,
                    },
                ),
                CoordinatesPolicy::Deny => ComplianceCheckResult::fail(
                    rule,
                    "GPS coordinates are required but were not provided",
                    details! {
                        "gpsValid" => false,
                        "exists" => false,
                    },
                ),
            });
        };

        if !point.in_range() {
            // NaN serializes as null
            return Ok(ComplianceCheckResult::fail(
                rule,
                "Invalid GPS coordinates",
                details! {
                    "landType" => "INVALID",
                    "gpsValid" => false,
                    "exists" => false,
                    "latitude" => point.latitude,
                    "longitude" => point.longitude,
                },
            ));
        }

        let facts = self
            .facts
            .land(input.jurisdiction, &point)
            .await
            .map_err(|source| RuleEvaluationError::FactLookup { rule, source })?;

        Ok(match facts.land_type {
            LandType::WaterBody => ComplianceCheckResult::fail(
                rule,
                "Property location is in a restricted zone (water body)",
                details! {
                    "landType" => facts.land_type,
                    "area" => facts.area_name,
                    "gpsValid" => true,
                    "exists" => false,
                    "latitude" => point.latitude,
                    "longitude" => point.longitude,
                },
            ),
            LandType::Restricted => ComplianceCheckResult::fail(
                rule,
                format!(
                    "Property location is in a restricted area ({})",
                    facts.area_name.as_deref().unwrap_or("unnamed")
                ),
                details! {
                    "landType" => facts.land_type,
                    "area" => facts.area_name,
                    "gpsValid" => true,
                    "exists" => true,
                    "latitude" => point.latitude,
                    "longitude" => point.longitude,
                },
            ),
            LandType::ValidLand => ComplianceCheckResult::pass(
                rule,
                "Valid land coordinates - not water or restricted area",
                details! {
                    "landType" => facts.land_type,
                    "gpsValid" => true,
                    "exists" => true,
                    "latitude" => point.latitude,
                    "longitude" => point.longitude,
                },
            ),
            LandType::Unknown => ComplianceCheckResult::pass(
                rule,
                "No land registry data for location - assuming valid land",
                details! {
                    "landType" => facts.land_type,
                    "gpsValid" => true,
                    "exists" => true,
                    "assumed" => true,
                    "latitude" => point.latitude,
                    "longitude" => point.longitude,
                },
            ),
        })
    }
}
