use std::collections::BTreeMap;
use std::sync::Arc;

use serde::Serialize;
use tracing::{debug, info, warn};
use uip_advisory::{AdvisoryQuery, GatedAdvisory, GuardedAdvisor};
use uip_compliance::RuleChain;
use uip_evidence::{
    verify_log, EmitterMetricsSnapshot, Engine, EventDraft, EventType, EvidenceEmitter,
    EvidenceEvent,
};
use uip_types::{
    ComplianceDecision, ConfidenceBucket, IntentId, IntentRecord, LifecycleMachine,
    LifecycleState, ADVISORY_THRESHOLD, RULESET_VERSION,
};

use crate::config::GateConfig;
use crate::error::GateError;
use crate::registry::{IntentRegistry, IntentSlot};

/// Outcome of [`Orchestrator::evaluate_intent`].
#[derive(Clone, Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct IntentEvaluation {
    pub decision: ComplianceDecision,
    pub new_state: LifecycleState,
    /// Events sealed during this call, in emission order.
    pub events: Vec<EvidenceEvent>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub advisory: Option<GatedAdvisory>,
}

/// Outcome of [`Orchestrator::consult_advisory`].
#[derive(Clone, Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct AdvisoryOutcome {
    pub advisory: GatedAdvisory,
    pub event: EvidenceEvent,
}

/// Outcome of [`Orchestrator::advance`].
#[derive(Clone, Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Advancement {
    pub from: LifecycleState,
    pub to: LifecycleState,
    pub event: EvidenceEvent,
}

/// Drives intents through the compliance gate and the lifecycle.
///
/// The rule chain and the lifecycle table are shared and stateless; the only
/// mutable state is each intent's slot, held exclusively for the duration of
/// one call.
pub struct Orchestrator {
    chain: Arc<RuleChain>,
    machine: LifecycleMachine,
    emitter: Arc<EvidenceEmitter>,
    advisor: Option<GuardedAdvisor>,
    registry: IntentRegistry,
    config: GateConfig,
}

impl Orchestrator {
    pub fn new(chain: Arc<RuleChain>, emitter: Arc<EvidenceEmitter>, config: GateConfig) -> Self {
        Self {
            chain,
            machine: LifecycleMachine::standard(),
            emitter,
            advisor: None,
            registry: IntentRegistry::new(),
            config,
        }
    }

    pub fn with_advisor(mut self, advisor: GuardedAdvisor) -> Self {
        self.advisor = Some(advisor);
        self
    }

    pub fn config(&self) -> &GateConfig {
        &self.config
    }

    pub fn evidence_metrics(&self) -> EmitterMetricsSnapshot {
        self.emitter.metrics().snapshot()
    }

    /// Current lifecycle state of a known intent.
    pub async fn state(&self, intent_id: &IntentId) -> Option<LifecycleState> {
        self.registry.state(intent_id).await
    }

    /// Copy of the slot tracked for an intent.
    pub async fn slot(&self, intent_id: &IntentId) -> Option<IntentSlot> {
        self.registry.snapshot(intent_id).await
    }

    /// Resume intents from a persisted evidence log.
    ///
    /// Every chain must verify; each intent then continues from its last
    /// recorded state and head, so new events extend the stored chain.
    /// Returns the number of intents restored.
    pub async fn restore(&self, events: &[EvidenceEvent]) -> Result<usize, GateError> {
        verify_log(events).map_err(|e| GateError::EvidenceReplay(e.to_string()))?;

        let mut by_intent: BTreeMap<&IntentId, Vec<EvidenceEvent>> = BTreeMap::new();
        for event in events {
            by_intent.entry(&event.intent_id).or_default().push(event.clone());
        }

        let mut restored = 0;
        for chain in by_intent.values() {
            if let Some(slot) = IntentSlot::replay(chain) {
                debug!(
                    intent_id = %slot.intent_id,
                    state = %slot.state,
                    sequence = slot.chain.sequence,
                    "Intent restored from evidence"
                );
                self.registry.restore(slot).await;
                restored += 1;
            }
        }
        info!(intents = restored, events = events.len(), "Evidence replayed");
        Ok(restored)
    }

    /// Register an intent and move it to INTENT_PARSED without evaluating it.
    pub async fn receive(&self, intent: &IntentRecord) -> Result<Vec<EvidenceEvent>, GateError> {
        intent.validate()?;
        let mut slot = self.registry.acquire_or_insert(intent).await;
        let mut events = Vec::new();
        self.intake(&mut slot, intent, &mut events).await?;
        Ok(events)
    }

    /// Run one intent through the compliance gate.
    ///
    /// Accepts a new intent or one already in INTENT_PARSED. The decision is
    /// never influenced by advisory knowledge, even when
    /// `consult_advisory_on_allow` attaches one to the result.
    pub async fn evaluate_intent(&self, intent: &IntentRecord) -> Result<IntentEvaluation, GateError> {
        intent.validate()?;
        let mut slot = self.registry.acquire_or_insert(intent).await;
        let mut events = Vec::new();

        self.intake(&mut slot, intent, &mut events).await?;

        let checking = self
            .machine
            .transition(slot.state, LifecycleState::ComplianceChecking)?;
        let previous = slot.state;
        slot.state = checking;
        slot.intent = Some(intent.clone());

        let started = self
            .draft(&slot, EventType::ComplianceStarted, Engine::ComplianceEngine)
            .payload("fromState", previous)
            .payload("toState", checking)
            .payload("rulesetVersion", RULESET_VERSION)
            .payload("rules", self.chain.rule_ids());
        self.record(&mut slot, started, &mut events).await;

        let decision = self.chain.evaluate(intent).await;

        for (index, check) in decision.checks.iter().enumerate() {
            let draft = self
                .draft(&slot, EventType::ComplianceRuleChecked, Engine::ComplianceEngine)
                .payload("index", index + 1)
                .payload("ruleId", check.rule_id)
                .payload("type", check.category)
                .payload("status", check.status)
                .payload("blocking", check.enforcement.is_blocking())
                .payload("details", &check.details)
                .reason(check.reason.clone());
            self.record(&mut slot, draft, &mut events).await;
        }

        let bucket = ConfidenceBucket::from_score(decision.confidence);
        let result = self
            .draft(&slot, EventType::ComplianceResult, Engine::ComplianceEngine)
            .payload("decision", decision.decision)
            .payload("status", decision.status)
            .payload("score", decision.confidence)
            .payload("blocking", decision.blocking)
            .payload("checks", decision.checks.len())
            .payload("passed", decision.passed_count())
            .payload("failed", decision.failed_count())
            .reason(decision.reason.clone())
            .confidence(bucket);
        self.record(&mut slot, result, &mut events).await;

        let target = if decision.is_allow() {
            LifecycleState::AwaitingDecisions
        } else {
            LifecycleState::IntentBlocked
        };
        let transitioned = self
            .move_to(&mut slot, target, Some(decision.reason.clone()))
            .await?;
        events.push(transitioned);

        info!(
            intent_id = %intent.intent_id,
            decision = ?decision.decision,
            checks = decision.checks.len(),
            state = %slot.state,
            "Intent evaluated"
        );

        let advisory = match (&self.advisor, self.config.consult_advisory_on_allow) {
            (Some(advisor), true) if decision.is_allow() => {
                let country = self
                    .chain
                    .classify(&intent.attributes.location)
                    .country_code()
                    .unwrap_or("UNKNOWN");
                let query = AdvisoryQuery::from_intent(intent, country);
                let (gated, event) = self.consult_locked(&mut slot, advisor, &query).await;
                events.push(event);
                Some(gated)
            }
            _ => None,
        };

        Ok(IntentEvaluation {
            decision,
            new_state: slot.state,
            events,
            advisory,
        })
    }

    /// Move an evaluated intent along the lifecycle.
    ///
    /// Fails with [`GateError::InvalidTransition`] and leaves the state
    /// unchanged when `proposed` is not a successor of the current state.
    pub async fn advance(
        &self,
        intent_id: &IntentId,
        proposed: LifecycleState,
    ) -> Result<Advancement, GateError> {
        let mut slot = self
            .registry
            .acquire(intent_id)
            .await
            .ok_or_else(|| GateError::IntentNotFound(intent_id.clone()))?;

        let from = slot.state;
        let event = self.move_to(&mut slot, proposed, None).await?;
        info!(intent_id = %intent_id, from = %from, to = %slot.state, "Intent advanced");
        Ok(Advancement {
            from,
            to: slot.state,
            event,
        })
    }

    /// Consult advisory knowledge for an intent awaiting or making decisions.
    ///
    /// Never fails on provider errors; those come back as a LOW_CONFIDENCE
    /// sentinel. The lifecycle state is not touched.
    pub async fn consult_advisory(
        &self,
        intent_id: &IntentId,
        query: &AdvisoryQuery,
    ) -> Result<AdvisoryOutcome, GateError> {
        let advisor = self.advisor.as_ref().ok_or(GateError::AdvisoryDisabled)?;
        let mut slot = self
            .registry
            .acquire(intent_id)
            .await
            .ok_or_else(|| GateError::IntentNotFound(intent_id.clone()))?;

        if !slot.state.accepts_advisory() {
            return Err(GateError::AdvisoryNotPermitted { state: slot.state });
        }

        let (advisory, event) = self.consult_locked(&mut slot, advisor, query).await;
        Ok(AdvisoryOutcome { advisory, event })
    }

    /// Walk a new intent from INTENT_RECEIVED to INTENT_PARSED.
    async fn intake(
        &self,
        slot: &mut IntentSlot,
        intent: &IntentRecord,
        events: &mut Vec<EvidenceEvent>,
    ) -> Result<(), GateError> {
        if slot.state != LifecycleState::IntentReceived {
            return Ok(());
        }

        if slot.chain.sequence == 0 {
            let received = self
                .draft(slot, EventType::IntentReceived, Engine::IntentEngine)
                .payload("intentType", &intent.intent_type)
                .payload("location", &intent.attributes.location)
                .payload("state", LifecycleState::IntentReceived);
            self.record(slot, received, events).await;
        }

        let parsed = self
            .machine
            .transition(slot.state, LifecycleState::IntentParsed)?;
        slot.state = parsed;

        let draft = self
            .draft(slot, EventType::IntentParsed, Engine::IntentEngine)
            .payload("fromState", LifecycleState::IntentReceived)
            .payload("toState", parsed)
            .payload("attributes", &intent.attributes);
        self.record(slot, draft, events).await;

        debug!(intent_id = %intent.intent_id, "Intent parsed");
        Ok(())
    }

    /// Validated transition plus its LIFECYCLE_TRANSITIONED event.
    async fn move_to(
        &self,
        slot: &mut IntentSlot,
        proposed: LifecycleState,
        reason: Option<String>,
    ) -> Result<EvidenceEvent, GateError> {
        let from = slot.state;
        let to = self.machine.transition(from, proposed).map_err(|e| {
            warn!(
                intent_id = %slot.intent_id,
                from = %e.from,
                to = %e.to,
                "Rejected lifecycle transition"
            );
            e
        })?;
        slot.state = to;

        let mut draft = self
            .draft(slot, EventType::LifecycleTransitioned, Engine::Orchestrator)
            .payload("fromState", from)
            .payload("toState", to)
            .payload("terminal", to.is_terminal());
        if let Some(reason) = reason {
            draft = draft.reason(reason);
        }
        // A decision that consumed advisory knowledge carries its bucket
        if to == LifecycleState::DecisionsMade {
            if let Some((bucket, usable)) = slot.last_advisory {
                draft = draft.confidence(bucket).payload("advisoryUsable", usable);
            }
        }
        let event = self.emitter.record(&mut slot.chain, draft).await;
        if slot.is_closed() {
            slot.compact();
        }
        Ok(event)
    }

    async fn consult_locked(
        &self,
        slot: &mut IntentSlot,
        advisor: &GuardedAdvisor,
        query: &AdvisoryQuery,
    ) -> (GatedAdvisory, EvidenceEvent) {
        let gated = advisor.consult(query).await;
        slot.last_advisory = Some((gated.bucket, gated.usable));

        let response = &gated.response;
        let mut draft = if gated.usable {
            self.draft(slot, EventType::RagQueryExecuted, Engine::RagAdapter)
        } else {
            let reason = if response.is_sentinel() {
                response.summary.clone()
            } else {
                format!(
                    "Advisory confidence {:.2} below threshold {:.2}; informational only",
                    response.confidence, ADVISORY_THRESHOLD
                )
            };
            self.draft(slot, EventType::RagAdvisoryLowConfidence, Engine::RagAdapter)
                .reason(reason)
        };
        draft = draft
            .payload("country", &response.country)
            .payload("score", response.confidence)
            .payload("usable", gated.usable)
            .payload("modelVersion", &response.model_version)
            .payload("riskSignals", response.risk_signals.len())
            .payload("sources", response.sources.len())
            .payload("state", slot.state)
            .confidence(gated.bucket);

        let event = self.emitter.record(&mut slot.chain, draft).await;
        (gated, event)
    }

    fn draft(&self, slot: &IntentSlot, event_type: EventType, engine: Engine) -> EventDraft {
        EvidenceEvent::draft(
            event_type,
            engine,
            slot.intent_id.clone(),
            slot.actor_id.clone(),
            slot.tenant_id.clone(),
        )
    }

    async fn record(&self, slot: &mut IntentSlot, draft: EventDraft, events: &mut Vec<EvidenceEvent>) {
        let event = self.emitter.record(&mut slot.chain, draft).await;
        events.push(event);
    }
}
