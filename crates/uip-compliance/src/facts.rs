//! Fact provider seam and the built-in static provider.

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use uip_types::{Citizenship, GpsCoordinates, IntendedUse, PropertyType, ResidencyStatus};

use crate::error::FactError;
use crate::geo::{AreaKind, GeoRegistry};
use crate::jurisdiction::Jurisdiction;

/// One disallowed ownership combination.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct OwnershipRestriction {
    pub citizenship: Citizenship,
    pub property_type: PropertyType,
    /// Residency statuses the restriction applies to. Empty means all.
    #[serde(default)]
    pub residency: Vec<ResidencyStatus>,
    pub code: String,
    pub reason: String,
}

impl OwnershipRestriction {
    pub fn applies(
        &self,
        citizenship: Citizenship,
        residency: Option<ResidencyStatus>,
        property_type: PropertyType,
    ) -> bool {
        self.citizenship == citizenship
            && self.property_type == property_type
            && (self.residency.is_empty()
                || residency.is_some_and(|r| self.residency.contains(&r)))
    }
}

/// Ownership facts for one jurisdiction.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct OwnershipFacts {
    /// False when the provider has no data for the jurisdiction.
    pub known: bool,
    pub restrictions: Vec<OwnershipRestriction>,
}

/// Zoning facts for one parcel.
#[derive(Clone, Debug, PartialEq)]
pub struct ZoningFacts {
    /// `None` when the zone is unknown.
    pub zone: Option<PropertyType>,
    pub allowed_uses: Vec<IntendedUse>,
}

impl ZoningFacts {
    pub fn unknown() -> Self {
        Self {
            zone: None,
            allowed_uses: Vec::new(),
        }
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum LandType {
    ValidLand,
    WaterBody,
    Restricted,
    Unknown,
}

/// Land classification at one point.
#[derive(Clone, Debug, PartialEq)]
pub struct LandFacts {
    pub land_type: LandType,
    pub area_name: Option<String>,
}

/// Source of real-world facts for the rules.
///
/// Must not fail on "unknown": return the explicit unknown value instead.
/// An `Err` means the lookup itself broke.
#[async_trait]
pub trait FactProvider: Send + Sync {
    async fn ownership(&self, jurisdiction: Jurisdiction) -> Result<OwnershipFacts, FactError>;

    async fn zoning(
        &self,
        jurisdiction: Jurisdiction,
        location: &str,
        declared_type: PropertyType,
    ) -> Result<ZoningFacts, FactError>;

    async fn land(
        &self,
        jurisdiction: Jurisdiction,
        point: &GpsCoordinates,
    ) -> Result<LandFacts, FactError>;
}

/// In-process provider backed by fixed tables and a [`GeoRegistry`].
#[derive(Clone, Debug)]
pub struct StaticFactProvider {
    restrictions: Vec<(Jurisdiction, OwnershipRestriction)>,
    geo: GeoRegistry,
}

impl StaticFactProvider {
    pub fn new(geo: GeoRegistry) -> Self {
        Self {
            restrictions: Vec::new(),
            geo,
        }
    }

    pub fn restrict(mut self, jurisdiction: Jurisdiction, restriction: OwnershipRestriction) -> Self {
        self.restrictions.push((jurisdiction, restriction));
        self
    }

    /// Allowed uses per zone type.
    pub fn allowed_uses(zone: PropertyType) -> Vec<IntendedUse> {
        match zone {
            PropertyType::Residential => vec![IntendedUse::Residence, IntendedUse::Investment],
            PropertyType::Commercial => vec![IntendedUse::Commercial, IntendedUse::Investment],
            PropertyType::Agricultural => vec![IntendedUse::Agricultural, IntendedUse::Investment],
        }
    }
}

impl Default for StaticFactProvider {
    fn default() -> Self {
        Self::new(GeoRegistry::standard()).restrict(
            Jurisdiction::India,
            OwnershipRestriction {
                citizenship: Citizenship::Other,
                property_type: PropertyType::Agricultural,
                residency: Vec::new(),
                code: "AGRICULTURAL_LAND".into(),
                reason: "Foreign nationals cannot purchase agricultural land in India".into(),
            },
        )
    }
}

#[async_trait]
impl FactProvider for StaticFactProvider {
    async fn ownership(&self, jurisdiction: Jurisdiction) -> Result<OwnershipFacts, FactError> {
        Ok(OwnershipFacts {
            known: jurisdiction.is_recognized(),
            restrictions: self
                .restrictions
                .iter()
                .filter(|(j, _)| *j == jurisdiction)
                .map(|(_, r)| r.clone())
                .collect(),
        })
    }

    async fn zoning(
        &self,
        _jurisdiction: Jurisdiction,
        _location: &str,
        declared_type: PropertyType,
    ) -> Result<ZoningFacts, FactError> {
        // No parcel registry: the declared type is the zone
        Ok(ZoningFacts {
            zone: Some(declared_type),
            allowed_uses: Self::allowed_uses(declared_type),
        })
    }

    async fn land(
        &self,
        jurisdiction: Jurisdiction,
        point: &GpsCoordinates,
    ) -> Result<LandFacts, FactError> {
        if !jurisdiction.is_recognized() {
            return Ok(LandFacts {
                land_type: LandType::Unknown,
                area_name: None,
            });
        }
        Ok(match self.geo.lookup(jurisdiction, point) {
            Some(area) => LandFacts {
                land_type: match area.kind {
                    AreaKind::WaterBody => LandType::WaterBody,
                    AreaKind::Restricted => LandType::Restricted,
                },
                area_name: Some(area.name.clone()),
            },
            None => LandFacts {
                land_type: LandType::ValidLand,
                area_name: None,
            },
        })
    }
}
