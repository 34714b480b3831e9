use std::path::Path;

use anyhow::Context;
use colored::*;
use serde::Serialize;
use tracing::info;
use uip_gate::{Advancement, IntentEvaluation, Orchestrator};
use uip_types::{CheckStatus, IntentRecord, LifecycleState};

use crate::config::UipConfig;
use crate::output::{print_failure, print_info, print_structured, print_success, OutputFormat};
use crate::pipeline;

pub async fn evaluate(
    config: &UipConfig,
    intent_path: &Path,
    with_advisory: bool,
    format: OutputFormat,
) -> anyhow::Result<()> {
    let intent = pipeline::read_intent(intent_path).await?;
    let orchestrator = pipeline::build(config, with_advisory).await?;

    let evaluation = orchestrator
        .evaluate_intent(&intent)
        .await
        .with_context(|| format!("evaluation of intent {} failed", intent.intent_id))?;

    match format {
        OutputFormat::Text => print_evaluation(&evaluation),
        _ => print_structured(&evaluation, format)?,
    }
    Ok(())
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
pub struct AdvanceReport {
    /// Present when this run had to evaluate the intent first.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub evaluation: Option<IntentEvaluation>,
    pub advancements: Vec<Advancement>,
}

/// Evaluate if not yet evaluated, then walk the requested states in order.
pub async fn advance(
    config: &UipConfig,
    intent_path: &Path,
    targets: &[LifecycleState],
    format: OutputFormat,
) -> anyhow::Result<()> {
    let intent = pipeline::read_intent(intent_path).await?;
    let orchestrator = pipeline::build(config, false).await?;
    let report = run_advance(&orchestrator, &intent, targets).await?;

    match format {
        OutputFormat::Text => {
            match &report.evaluation {
                Some(evaluation) => print_evaluation(evaluation),
                None => print_info(&format!(
                    "Intent {} resumed from evidence",
                    intent.intent_id
                )),
            }
            for step in &report.advancements {
                print_success(&format!("{} -> {}", step.from, step.to));
            }
        }
        _ => print_structured(&report, format)?,
    }
    Ok(())
}

pub async fn run_advance(
    orchestrator: &Orchestrator,
    intent: &IntentRecord,
    targets: &[LifecycleState],
) -> anyhow::Result<AdvanceReport> {
    let evaluation = match orchestrator.state(&intent.intent_id).await {
        None | Some(LifecycleState::IntentReceived) | Some(LifecycleState::IntentParsed) => Some(
            orchestrator
                .evaluate_intent(intent)
                .await
                .with_context(|| format!("evaluation of intent {} failed", intent.intent_id))?,
        ),
        Some(state) => {
            info!(intent_id = %intent.intent_id, state = %state, "Intent already evaluated");
            None
        }
    };

    let mut advancements = Vec::with_capacity(targets.len());
    for target in targets {
        let step = orchestrator
            .advance(&intent.intent_id, *target)
            .await
            .with_context(|| format!("cannot advance intent {} to {}", intent.intent_id, target))?;
        advancements.push(step);
    }

    Ok(AdvanceReport {
        evaluation,
        advancements,
    })
}

fn print_evaluation(evaluation: &IntentEvaluation) {
    let decision = &evaluation.decision;
    println!(
        "{} {}",
        "Intent".bold(),
        decision.intent_id.as_str().cyan()
    );

    for check in &decision.checks {
        let line = format!("{:<36} {}", check.rule_id.as_str(), check.reason);
        match check.status {
            CheckStatus::Pass => print_success(&line),
            CheckStatus::Fail => print_failure(&line),
        }
    }

    let verdict = if decision.is_allow() {
        "ALLOW".green().bold()
    } else {
        "DENY".red().bold()
    };
    println!(
        "\n{} {} (confidence {:.2}, {} of 3 checks executed)",
        "Decision:".bold(),
        verdict,
        decision.confidence,
        decision.checks.len()
    );
    println!("{} {}", "Reason:".bold(), decision.reason);
    println!("{} {}", "State:".bold(), evaluation.new_state);

    if let Some(advisory) = &evaluation.advisory {
        let usable = if advisory.usable {
            "usable".green()
        } else {
            "informational only".yellow()
        };
        println!();
        print_info(&format!(
            "Advisory [{}] {} ({:.2}): {}",
            advisory.bucket, usable, advisory.response.confidence, advisory.response.summary
        ));
    }
    println!("{} {} events emitted", "Evidence:".bold(), evaluation.events.len());
}
