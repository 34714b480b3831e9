mod common;

use std::sync::Arc;
use std::time::Duration;

use uip_advisory::mocks::StalledAdvisoryProvider;
use uip_advisory::AdvisoryQuery;
use uip_gate::{GateConfig, GateError};
use uip_types::{
    CheckStatus, ConfidenceBucket, Decision, DecisionStatus, IntentId, InvalidTransition,
    LifecycleState, RuleId, SUCCESS_REASON,
};

use common::*;

#[tokio::test]
async fn scenario_a_foreign_national_agricultural_land_is_denied_at_first_rule() {
    let (orchestrator, _sink) = orchestrator();
    let intent = foreign_agricultural("scenario-a");

    let evaluation = orchestrator.evaluate_intent(&intent).await.unwrap();
    let decision = &evaluation.decision;

    assert_eq!(decision.decision, Decision::Deny);
    assert_eq!(decision.status, DecisionStatus::Failed);
    assert_eq!(decision.checks.len(), 1);
    assert_eq!(
        decision.checks[0].rule_id,
        RuleId::ForeignNationalLandRestriction
    );
    assert!(decision.reason.to_lowercase().contains("agricultural"));
    assert_eq!(decision.confidence, 0.0);
    assert!(decision.blocking);
    assert_eq!(evaluation.new_state, LifecycleState::IntentBlocked);
}

#[tokio::test]
async fn scenario_b_domestic_residential_is_allowed_with_all_checks() {
    let (orchestrator, _sink) = orchestrator();
    let intent = domestic_residential("scenario-b");

    let evaluation = orchestrator.evaluate_intent(&intent).await.unwrap();
    let decision = &evaluation.decision;

    assert_eq!(decision.decision, Decision::Allow);
    assert_eq!(decision.status, DecisionStatus::Passed);
    assert_eq!(decision.checks.len(), 3);
    assert_eq!(decision.confidence, 1.0);
    assert_eq!(decision.reason, SUCCESS_REASON);
    assert!(!decision.blocking);
    assert_eq!(
        decision.checks.iter().map(|c| c.rule_id).collect::<Vec<_>>(),
        RuleId::ORDER.to_vec()
    );
    assert_eq!(evaluation.new_state, LifecycleState::AwaitingDecisions);
    assert!(evaluation.advisory.is_none());
}

#[tokio::test]
async fn scenario_c_out_of_range_coordinates_fail_only_the_land_check() {
    let (orchestrator, _sink) = orchestrator();
    let intent = out_of_range_coordinates("scenario-c");

    let evaluation = orchestrator.evaluate_intent(&intent).await.unwrap();
    let decision = &evaluation.decision;

    assert_eq!(decision.decision, Decision::Deny);
    assert_eq!(decision.checks.len(), 3);
    assert_eq!(decision.checks[0].status, CheckStatus::Pass);
    assert_eq!(decision.checks[1].status, CheckStatus::Pass);
    assert_eq!(decision.checks[2].status, CheckStatus::Fail);
    assert_eq!(decision.checks[2].rule_id, RuleId::LandExistenceValidation);
    assert_eq!(decision.reason, decision.checks[2].reason);
    assert!((decision.confidence - 2.0 / 3.0).abs() < 1e-9);
    assert_eq!(evaluation.new_state, LifecycleState::IntentBlocked);
}

#[tokio::test(start_paused = true)]
async fn scenario_d_advisory_timeout_degrades_without_touching_the_decision() {
    let (orchestrator, sink) = orchestrator_with_advisor(
        Arc::new(StalledAdvisoryProvider),
        Duration::from_millis(500),
        GateConfig {
            consult_advisory_on_allow: true,
        },
    );
    let intent = domestic_residential("scenario-d");

    let evaluation = orchestrator.evaluate_intent(&intent).await.unwrap();

    assert_eq!(evaluation.decision.decision, Decision::Allow);
    assert_eq!(evaluation.decision.confidence, 1.0);
    assert_eq!(evaluation.new_state, LifecycleState::AwaitingDecisions);

    let advisory = evaluation.advisory.expect("advisory consulted on allow");
    assert_eq!(advisory.response.confidence, 0.0);
    assert_eq!(advisory.bucket, ConfidenceBucket::LowConfidence);
    assert!(!advisory.usable);

    let last = sink.events().await.pop().unwrap();
    assert_eq!(last.event_type.as_str(), "RAG_ADVISORY_LOW_CONFIDENCE");
    assert_eq!(last.confidence, Some(ConfidenceBucket::LowConfidence));

    // An explicit consultation degrades the same way and leaves the state alone
    let query = AdvisoryQuery::from_intent(&intent, "IN");
    let outcome = orchestrator
        .consult_advisory(&intent.intent_id, &query)
        .await
        .unwrap();
    assert!(outcome.advisory.response.is_sentinel());
    assert_eq!(
        orchestrator.state(&intent.intent_id).await,
        Some(LifecycleState::AwaitingDecisions)
    );
}

#[tokio::test]
async fn scenario_e_completed_intent_rejects_every_transition() {
    let (orchestrator, _sink) = orchestrator();
    let intent = domestic_residential("scenario-e");
    let id = intent.intent_id.clone();

    orchestrator.evaluate_intent(&intent).await.unwrap();
    for next in [
        LifecycleState::DecisionsMade,
        LifecycleState::ActionsInProgress,
        LifecycleState::ActionsCompleted,
    ] {
        orchestrator.advance(&id, next).await.unwrap();
    }

    for proposed in LifecycleState::ALL {
        let err = orchestrator.advance(&id, proposed).await.unwrap_err();
        assert_eq!(
            err,
            GateError::InvalidTransition(InvalidTransition {
                from: LifecycleState::ActionsCompleted,
                to: proposed,
            })
        );
        assert_eq!(
            orchestrator.state(&id).await,
            Some(LifecycleState::ActionsCompleted)
        );
    }

    // Re-submitting a closed intent is also refused
    assert!(matches!(
        orchestrator.evaluate_intent(&intent).await,
        Err(GateError::InvalidTransition(_))
    ));
}

#[tokio::test]
async fn blocked_intent_cannot_advance() {
    let (orchestrator, _sink) = orchestrator();
    let intent = foreign_agricultural("blocked");
    orchestrator.evaluate_intent(&intent).await.unwrap();

    let err = orchestrator
        .advance(&intent.intent_id, LifecycleState::AwaitingDecisions)
        .await
        .unwrap_err();
    assert!(matches!(err, GateError::InvalidTransition(_)));
    assert_eq!(
        orchestrator.state(&intent.intent_id).await,
        Some(LifecycleState::IntentBlocked)
    );
}

#[tokio::test]
async fn closed_intents_keep_only_a_compact_slot() {
    let (orchestrator, _sink) = orchestrator();

    let blocked = foreign_agricultural("compact-blocked");
    let evaluation = orchestrator.evaluate_intent(&blocked).await.unwrap();
    let slot = orchestrator.slot(&blocked.intent_id).await.unwrap();
    assert!(slot.is_closed());
    assert!(slot.intent.is_none());
    assert_eq!(slot.chain.sequence, 6);
    assert_eq!(slot.chain.last_hash, evaluation.events[5].hash);

    let completed = domestic_residential("compact-completed");
    orchestrator.evaluate_intent(&completed).await.unwrap();
    assert!(orchestrator
        .slot(&completed.intent_id)
        .await
        .unwrap()
        .intent
        .is_some());
    for next in [
        LifecycleState::DecisionsMade,
        LifecycleState::ActionsInProgress,
        LifecycleState::ActionsCompleted,
    ] {
        orchestrator.advance(&completed.intent_id, next).await.unwrap();
    }
    let slot = orchestrator.slot(&completed.intent_id).await.unwrap();
    assert!(slot.intent.is_none());
    assert!(slot.last_advisory.is_none());

    for intent in [&blocked, &completed] {
        assert!(matches!(
            orchestrator
                .advance(&intent.intent_id, LifecycleState::DecisionsMade)
                .await,
            Err(GateError::InvalidTransition(_))
        ));
        assert!(matches!(
            orchestrator.evaluate_intent(intent).await,
            Err(GateError::InvalidTransition(_))
        ));
    }
}

#[tokio::test]
async fn malformed_intent_is_rejected_before_any_state_exists() {
    let (orchestrator, sink) = orchestrator();
    let mut intent = domestic_residential("malformed");
    intent.attributes.location = "   ".into();

    assert!(matches!(
        orchestrator.evaluate_intent(&intent).await,
        Err(GateError::MalformedIntent(_))
    ));
    assert!(orchestrator.state(&intent.intent_id).await.is_none());
    assert!(sink.is_empty().await);
}

#[tokio::test]
async fn advancing_an_unknown_intent_fails() {
    let (orchestrator, _sink) = orchestrator();
    let id = IntentId::new("nobody");
    assert_eq!(
        orchestrator
            .advance(&id, LifecycleState::DecisionsMade)
            .await
            .unwrap_err(),
        GateError::IntentNotFound(id)
    );
}

#[tokio::test]
async fn reevaluation_yields_identical_checks() {
    let (first, _) = orchestrator();
    let (second, _) = orchestrator();
    let intent = out_of_range_coordinates("idempotent");

    let a = first.evaluate_intent(&intent).await.unwrap().decision;
    let b = second.evaluate_intent(&intent).await.unwrap().decision;

    assert_eq!(a.decision, b.decision);
    assert_eq!(a.confidence, b.confidence);
    assert_eq!(a.reason, b.reason);
    assert_eq!(a.checks, b.checks);
}
