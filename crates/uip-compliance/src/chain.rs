use std::panic::AssertUnwindSafe;
use std::sync::Arc;
use std::time::Duration;

use chrono::{DateTime, Utc};
use futures::FutureExt;
use tracing::{debug, info, warn};
use uip_types::{ComplianceCheckResult, ComplianceDecision, IntentRecord, RuleId};

use crate::config::ComplianceConfig;
use crate::error::{ComplianceError, RuleEvaluationError};
use crate::facts::FactProvider;
use crate::jurisdiction::{Jurisdiction, JurisdictionClassifier};
use crate::rules::{CitizenshipRule, ComplianceRule, LandExistenceRule, RuleInput, ZoningRule};

/// Runs the blocking rules in canonical order, stopping at the first failure.
///
/// Holds no per-intent state; one chain may serve any number of concurrent
/// evaluations.
pub struct RuleChain {
    rules: Vec<Arc<dyn ComplianceRule>>,
    classifier: Arc<dyn JurisdictionClassifier>,
    fact_timeout: Duration,
}

impl RuleChain {
    /// The three standard rules over `facts`.
    pub fn standard(
        facts: Arc<dyn FactProvider>,
        classifier: Arc<dyn JurisdictionClassifier>,
        config: &ComplianceConfig,
    ) -> Self {
        Self {
            rules: vec![
                Arc::new(CitizenshipRule::new(
                    facts.clone(),
                    config.unknown_jurisdiction_policy,
                )),
                Arc::new(ZoningRule::new(facts.clone())),
                Arc::new(LandExistenceRule::new(
                    facts,
                    config.missing_coordinates_policy,
                )),
            ],
            classifier,
            fact_timeout: config.fact_timeout(),
        }
    }

    /// A chain over custom rules.
    ///
    /// Rule `i` must be `RuleId::ORDER[i]`; a shorter chain covers a prefix
    /// of the canonical order.
    pub fn with_rules(
        rules: Vec<Arc<dyn ComplianceRule>>,
        classifier: Arc<dyn JurisdictionClassifier>,
        config: &ComplianceConfig,
    ) -> Result<Self, ComplianceError> {
        if rules.is_empty() {
            return Err(ComplianceError::EmptyChain);
        }
        for (position, rule) in rules.iter().enumerate() {
            if RuleId::ORDER.get(position) != Some(&rule.rule_id()) {
                return Err(ComplianceError::RuleOrder {
                    rule: rule.rule_id(),
                });
            }
        }
        Ok(Self {
            rules,
            classifier,
            fact_timeout: config.fact_timeout(),
        })
    }

    /// Rule ids in evaluation order.
    pub fn rule_ids(&self) -> Vec<RuleId> {
        self.rules.iter().map(|r| r.rule_id()).collect()
    }

    pub fn classify(&self, location: &str) -> Jurisdiction {
        self.classifier.classify(location)
    }

    pub async fn evaluate(&self, intent: &IntentRecord) -> ComplianceDecision {
        self.evaluate_at(intent, Utc::now()).await
    }

    /// Evaluate with a fixed decision timestamp.
    ///
    /// Deterministic for an unchanged intent and unchanged facts.
    pub async fn evaluate_at(
        &self,
        intent: &IntentRecord,
        timestamp: DateTime<Utc>,
    ) -> ComplianceDecision {
        let jurisdiction = self.classifier.classify(&intent.attributes.location);
        let input = RuleInput {
            intent,
            jurisdiction,
        };

        debug!(
            intent_id = %intent.intent_id,
            jurisdiction = ?jurisdiction,
            rules = self.rules.len(),
            "Running compliance rule chain"
        );

        let mut checks: Vec<ComplianceCheckResult> = Vec::with_capacity(self.rules.len());
        for rule in &self.rules {
            let check = self.run_rule(rule.as_ref(), input).await;
            let halt = check.is_blocking_failure();

            debug!(
                intent_id = %intent.intent_id,
                rule = %check.rule_id,
                status = ?check.status,
                "Rule checked"
            );
            checks.push(check);

            if halt {
                break;
            }
        }

        let decision = ComplianceDecision::from_checks(intent.intent_id.clone(), checks, timestamp);
        info!(
            intent_id = %intent.intent_id,
            decision = ?decision.decision,
            executed = decision.checks.len(),
            confidence = decision.confidence,
            "Compliance decision"
        );
        decision
    }

    /// Run one rule; errors, timeouts and panics become FAIL results.
    async fn run_rule(&self, rule: &dyn ComplianceRule, input: RuleInput<'_>) -> ComplianceCheckResult {
        let rule_id = rule.rule_id();
        let guarded = AssertUnwindSafe(rule.check(input)).catch_unwind();

        let outcome = match tokio::time::timeout(self.fact_timeout, guarded).await {
            Ok(Ok(result)) => result,
            Ok(Err(_panic)) => Err(RuleEvaluationError::Panicked { rule: rule_id }),
            Err(_) => Err(RuleEvaluationError::Timeout {
                rule: rule_id,
                timeout_ms: self.fact_timeout.as_millis() as u64,
            }),
        };

        match outcome {
            Ok(check) if check.rule_id == rule_id => check,
            Ok(check) => evaluation_failure(
                rule_id,
                format!("rule returned a result for {}", check.rule_id),
            ),
            Err(e) => {
                warn!(
                    intent_id = %input.intent.intent_id,
                    rule = %rule_id,
                    error = %e,
                    "Rule evaluation failed; recording as FAIL"
                );
                evaluation_failure(rule_id, e.to_string())
            }
        }
    }
}

fn evaluation_failure(rule: RuleId, diagnostic: String) -> ComplianceCheckResult {
    let mut details = uip_types::Details::new();
    details.insert("evaluationError".into(), serde_json::json!(diagnostic));
    ComplianceCheckResult::fail(
        rule,
        format!("Compliance rule could not be evaluated: {diagnostic}"),
        details,
    )
}
