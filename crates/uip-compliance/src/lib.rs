//! Compliance rule chain for UIP intents.
//!
//! Three blocking rules run in a fixed order and the chain stops at the
//! first failure:
//!
//! 1. `FOREIGN_NATIONAL_LAND_RESTRICTION`: citizenship/residency eligibility
//! 2. `ZONING_COMPLIANCE_CHECK`: intended use against the zone's allowed uses
//! 3. `LAND_EXISTENCE_VALIDATION`: coordinate range and registered water
//!    bodies or restricted areas
//!
//! Real-world facts come from a [`FactProvider`]; the jurisdiction is derived
//! from the free-text location by a [`JurisdictionClassifier`]. A rule that
//! errors, stalls or panics is recorded as a FAIL check and never aborts the
//! chain.

#![deny(unsafe_code)]

pub mod chain;
pub mod config;
pub mod error;
pub mod facts;
pub mod geo;
pub mod jurisdiction;
pub mod mocks;
pub mod rules;

pub use chain::RuleChain;
pub use config::{ComplianceConfig, CoordinatesPolicy, JurisdictionPolicy};
pub use error::{ComplianceError, FactError, RuleEvaluationError};
pub use facts::{
    FactProvider, LandFacts, LandType, OwnershipFacts, OwnershipRestriction, StaticFactProvider,
    ZoningFacts,
};
pub use geo::{AreaKind, GeoRegistry, Polygon, RegisteredArea};
pub use jurisdiction::{Jurisdiction, JurisdictionClassifier, KeywordJurisdictionClassifier};
pub use rules::{CitizenshipRule, ComplianceRule, LandExistenceRule, RuleInput, ZoningRule};
