//! Output formatting utilities

use anyhow::Context;
use colored::*;
use serde::Serialize;

/// Output format for CLI commands
#[derive(Debug, Clone, Copy, Default, clap::ValueEnum)]
pub enum OutputFormat {
    /// Human-readable summary
    #[default]
    Text,
    /// JSON format
    Json,
    /// YAML format
    Yaml,
}

/// Print a serializable value as JSON or YAML.
pub fn print_structured<T: Serialize>(data: &T, format: OutputFormat) -> anyhow::Result<()> {
    match format {
        OutputFormat::Text | OutputFormat::Json => {
            let text = serde_json::to_string_pretty(data).context("failed to encode JSON")?;
            println!("{}", text);
        }
        OutputFormat::Yaml => {
            let text = serde_yaml::to_string(data).context("failed to encode YAML")?;
            print!("{}", text);
        }
    }
    Ok(())
}

pub fn print_success(message: &str) {
    println!("{} {}", "✓".green(), message);
}

pub fn print_failure(message: &str) {
    println!("{} {}", "✗".red(), message);
}

pub fn print_info(message: &str) {
    println!("{} {}", "•".blue(), message);
}
