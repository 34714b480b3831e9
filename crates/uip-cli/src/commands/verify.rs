use std::path::Path;

use anyhow::Context;
use uip_evidence::{read_log, verify_log};

use crate::output::{print_structured, print_success, OutputFormat};

/// Verify every intent chain in a JSON-lines evidence log.
pub async fn verify(log_path: &Path, format: OutputFormat) -> anyhow::Result<()> {
    let events = read_log(log_path)
        .await
        .with_context(|| format!("failed to read evidence log {}", log_path.display()))?;
    let reports = verify_log(&events)
        .with_context(|| format!("evidence log {} failed verification", log_path.display()))?;

    match format {
        OutputFormat::Text => {
            for report in &reports {
                print_success(&format!(
                    "{}: {} events, head {}",
                    report.intent_id,
                    report.events,
                    &report.head_hash[..16.min(report.head_hash.len())]
                ));
            }
            println!(
                "{} events across {} intents verified",
                events.len(),
                reports.len()
            );
        }
        _ => print_structured(&reports, format)?,
    }
    Ok(())
}
