//! Wires the orchestrator from configuration.

use std::path::Path;
use std::sync::Arc;

use anyhow::Context;
use tracing::{debug, info};
use uip_compliance::{KeywordJurisdictionClassifier, RuleChain, StaticFactProvider};
use uip_evidence::{open_sink, read_log, EvidenceEmitter, SinkConfig};
use uip_gate::Orchestrator;
use uip_types::IntentRecord;

use crate::config::UipConfig;

/// Build the orchestrator once; everything is passed in explicitly.
///
/// With a JSON-lines sink, intents already in the log are resumed so this
/// run extends their chains instead of starting new ones.
pub async fn build(config: &UipConfig, with_advisory: bool) -> anyhow::Result<Orchestrator> {
    let chain = RuleChain::standard(
        Arc::new(StaticFactProvider::default()),
        Arc::new(KeywordJurisdictionClassifier::default()),
        &config.compliance,
    );

    let history = match &config.evidence.sink {
        SinkConfig::Jsonl { path } if Path::new(path).exists() => Some(
            read_log(path)
                .await
                .with_context(|| format!("failed to read evidence log {}", path))?,
        ),
        _ => None,
    };

    let sink = open_sink(&config.evidence.sink)
        .await
        .context("failed to open evidence sink")?;
    debug!(sink = sink.name(), "Evidence sink opened");
    let emitter = Arc::new(EvidenceEmitter::new(sink, &config.evidence));

    let mut gate = config.gate.clone();
    let mut advisory = config.advisory.clone();
    if with_advisory {
        advisory.enabled = true;
        gate.consult_advisory_on_allow = true;
    }

    let mut orchestrator = Orchestrator::new(Arc::new(chain), emitter, gate);
    if let Some(advisor) =
        uip_advisory::advisor_from_config(&advisory).context("failed to build advisory client")?
    {
        info!(
            endpoint = %advisory.ollama.endpoint,
            model = %advisory.ollama.model,
            "Advisory enabled"
        );
        orchestrator = orchestrator.with_advisor(advisor);
    }

    if let Some(events) = history {
        let intents = orchestrator
            .restore(&events)
            .await
            .context("failed to resume intents from evidence log")?;
        debug!(intents, "Resumed intents from evidence log");
    }
    Ok(orchestrator)
}

pub async fn read_intent(path: &Path) -> anyhow::Result<IntentRecord> {
    let raw = tokio::fs::read_to_string(path)
        .await
        .with_context(|| format!("failed to read intent file {}", path.display()))?;
    serde_json::from_str(&raw)
        .with_context(|| format!("failed to parse intent file {}", path.display()))
}
