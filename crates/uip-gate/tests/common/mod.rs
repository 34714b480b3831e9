#![allow(dead_code)]

use std::sync::Arc;
use std::time::Duration;

use uip_advisory::{AdvisoryProvider, GuardedAdvisor};
use uip_compliance::{
    ComplianceConfig, KeywordJurisdictionClassifier, RuleChain, StaticFactProvider,
};
use uip_evidence::{EvidenceConfig, EvidenceEmitter, EvidenceSink, MemoryEvidenceSink};
use uip_gate::{GateConfig, Orchestrator};
use uip_types::{Citizenship, IntendedUse, IntentRecord, PropertyType};

pub fn chain(config: &ComplianceConfig) -> Arc<RuleChain> {
    Arc::new(RuleChain::standard(
        Arc::new(StaticFactProvider::default()),
        Arc::new(KeywordJurisdictionClassifier::default()),
        config,
    ))
}

pub fn orchestrator_with_sink(sink: Arc<dyn EvidenceSink>, config: GateConfig) -> Orchestrator {
    let emitter = Arc::new(EvidenceEmitter::new(sink, &EvidenceConfig::default()));
    Orchestrator::new(chain(&ComplianceConfig::default()), emitter, config)
}

pub fn orchestrator() -> (Orchestrator, MemoryEvidenceSink) {
    let sink = MemoryEvidenceSink::new();
    let orchestrator = orchestrator_with_sink(Arc::new(sink.clone()), GateConfig::default());
    (orchestrator, sink)
}

pub fn orchestrator_with_advisor(
    provider: Arc<dyn AdvisoryProvider>,
    timeout: Duration,
    config: GateConfig,
) -> (Orchestrator, MemoryEvidenceSink) {
    let sink = MemoryEvidenceSink::new();
    let orchestrator = orchestrator_with_sink(Arc::new(sink.clone()), config)
        .with_advisor(GuardedAdvisor::new(provider, timeout));
    (orchestrator, sink)
}

/// Domestic buyer, residential home in Visakhapatnam, on land.
pub fn domestic_residential(id: &str) -> IntentRecord {
    IntentRecord::builder("BUY_PROPERTY", "Visakhapatnam, Andhra Pradesh, India")
        .intent_id(id)
        .tenant("tenant-1")
        .actor("user-42")
        .budget(7_500_000.0)
        .property_id("VZG-0001")
        .citizenship(Citizenship::In)
        .property_type(PropertyType::Residential)
        .intended_use(IntendedUse::Residence)
        .coordinates(17.7231, 83.3012)
        .build()
}

/// Foreign national buying agricultural land in India.
pub fn foreign_agricultural(id: &str) -> IntentRecord {
    IntentRecord::builder("BUY_PROPERTY", "Vizag, India")
        .intent_id(id)
        .tenant("tenant-1")
        .actor("user-7")
        .citizenship(Citizenship::Other)
        .property_type(PropertyType::Agricultural)
        .coordinates(17.9, 83.1)
        .build()
}

/// Valid buyer and zoning, latitude out of range.
pub fn out_of_range_coordinates(id: &str) -> IntentRecord {
    IntentRecord::builder("BUY_PROPERTY", "Vizag, India")
        .intent_id(id)
        .tenant("tenant-1")
        .actor("user-9")
        .citizenship(Citizenship::In)
        .property_type(PropertyType::Residential)
        .intended_use(IntendedUse::Residence)
        .coordinates(95.0, 10.0)
        .build()
}
