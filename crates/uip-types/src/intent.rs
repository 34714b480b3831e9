use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use crate::error::IntentValidationError;
use crate::ids::{ActorId, IntentId, TenantId};

/// Declared citizenship of the acting party.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum Citizenship {
    /// Indian national
    In,
    /// United States national
    Us,
    Other,
}

impl Citizenship {
    pub fn as_str(&self) -> &'static str {
        match self {
            Citizenship::In => "IN",
            Citizenship::Us => "US",
            Citizenship::Other => "OTHER",
        }
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum ResidencyStatus {
    Citizen,
    Resident,
    NonResident,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum PropertyType {
    Residential,
    Commercial,
    Agricultural,
}

impl PropertyType {
    pub fn as_str(&self) -> &'static str {
        match self {
            PropertyType::Residential => "RESIDENTIAL",
            PropertyType::Commercial => "COMMERCIAL",
            PropertyType::Agricultural => "AGRICULTURAL",
        }
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum IntendedUse {
    Residence,
    Investment,
    Commercial,
    Agricultural,
}

impl IntendedUse {
    /// The use implied by a property type when none was declared.
    pub fn inferred_from(property_type: PropertyType) -> Self {
        match property_type {
            PropertyType::Residential => IntendedUse::Residence,
            PropertyType::Commercial => IntendedUse::Commercial,
            PropertyType::Agricultural => IntendedUse::Agricultural,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            IntendedUse::Residence => "RESIDENCE",
            IntendedUse::Investment => "INVESTMENT",
            IntendedUse::Commercial => "COMMERCIAL",
            IntendedUse::Agricultural => "AGRICULTURAL",
        }
    }
}

/// WGS84 point. Accepts `lat`/`lng` as aliases on input.
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
pub struct GpsCoordinates {
    #[serde(alias = "lat")]
    pub latitude: f64,
    #[serde(alias = "lng")]
    pub longitude: f64,
}

impl GpsCoordinates {
    pub fn new(latitude: f64, longitude: f64) -> Self {
        Self {
            latitude,
            longitude,
        }
    }

    /// Latitude within [-90, 90] and longitude within [-180, 180].
    pub fn in_range(&self) -> bool {
        (-90.0..=90.0).contains(&self.latitude) && (-180.0..=180.0).contains(&self.longitude)
    }
}

/// Attributes extracted from the user's request by the intent engine.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct IntentAttributes {
    /// Free-text location, e.g. "Visakhapatnam, Andhra Pradesh, India"
    pub location: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub budget: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub area: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub property_id: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub citizenship: Option<Citizenship>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub residency_status: Option<ResidencyStatus>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub property_type: Option<PropertyType>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub intended_use: Option<IntendedUse>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub gps_coordinates: Option<GpsCoordinates>,
    /// Rule-specific metadata not covered by the typed fields.
    #[serde(default, skip_serializing_if = "BTreeMap::is_empty")]
    pub metadata: BTreeMap<String, serde_json::Value>,
}

/// The unit of work entering the gate. Immutable once received.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct IntentRecord {
    pub intent_id: IntentId,
    pub tenant_id: TenantId,
    pub actor_id: ActorId,
    /// Classified intent type, e.g. "BUY_PROPERTY"
    pub intent_type: String,
    pub attributes: IntentAttributes,
}

impl IntentRecord {
    pub fn builder(intent_type: impl Into<String>, location: impl Into<String>) -> IntentRecordBuilder {
        IntentRecordBuilder {
            intent_id: IntentId::generate(),
            tenant_id: TenantId::new("default"),
            actor_id: ActorId::new("anonymous"),
            intent_type: intent_type.into(),
            attributes: IntentAttributes {
                location: location.into(),
                ..Default::default()
            },
        }
    }

    /// Reject records that break the caller contract.
    pub fn validate(&self) -> Result<(), IntentValidationError> {
        if self.intent_id.is_blank() {
            return Err(IntentValidationError::MissingField("intentId"));
        }
        if self.tenant_id.is_blank() {
            return Err(IntentValidationError::MissingField("tenantId"));
        }
        if self.actor_id.is_blank() {
            return Err(IntentValidationError::MissingField("actorId"));
        }
        if self.intent_type.trim().is_empty() {
            return Err(IntentValidationError::MissingField("intentType"));
        }
        if self.attributes.location.trim().is_empty() {
            return Err(IntentValidationError::MissingField("attributes.location"));
        }
        if let Some(budget) = self.attributes.budget {
            if !budget.is_finite() || budget < 0.0 {
                return Err(IntentValidationError::InvalidBudget);
            }
        }
        Ok(())
    }
}

/// Builder for IntentRecord.
pub struct IntentRecordBuilder {
    intent_id: IntentId,
    tenant_id: TenantId,
    actor_id: ActorId,
    intent_type: String,
    attributes: IntentAttributes,
}

impl IntentRecordBuilder {
    pub fn intent_id(mut self, id: impl Into<String>) -> Self {
        self.intent_id = IntentId::new(id);
        self
    }

    pub fn tenant(mut self, tenant: impl Into<String>) -> Self {
        self.tenant_id = TenantId::new(tenant);
        self
    }

    pub fn actor(mut self, actor: impl Into<String>) -> Self {
        self.actor_id = ActorId::new(actor);
        self
    }

    pub fn budget(mut self, budget: f64) -> Self {
        self.attributes.budget = Some(budget);
        self
    }

    pub fn property_id(mut self, id: impl Into<String>) -> Self {
        self.attributes.property_id = Some(id.into());
        self
    }

    pub fn citizenship(mut self, citizenship: Citizenship) -> Self {
        self.attributes.citizenship = Some(citizenship);
        self
    }

    pub fn residency(mut self, status: ResidencyStatus) -> Self {
        self.attributes.residency_status = Some(status);
        self
    }

    pub fn property_type(mut self, property_type: PropertyType) -> Self {
        self.attributes.property_type = Some(property_type);
        self
    }

    pub fn intended_use(mut self, intended_use: IntendedUse) -> Self {
        self.attributes.intended_use = Some(intended_use);
        self
    }

    pub fn coordinates(mut self, latitude: f64, longitude: f64) -> Self {
        self.attributes.gps_coordinates = Some(GpsCoordinates::new(latitude, longitude));
        self
    }

    pub fn metadata(mut self, key: impl Into<String>, value: serde_json::Value) -> Self {
        self.attributes.metadata.insert(key.into(), value);
        self
    }

    pub fn build(self) -> IntentRecord {
        IntentRecord {
            intent_id: self.intent_id,
            tenant_id: self.tenant_id,
            actor_id: self.actor_id,
            intent_type: self.intent_type,
            attributes: self.attributes,
        }
    }
}
