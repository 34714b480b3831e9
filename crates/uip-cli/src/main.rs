//! uipctl - operator CLI for the UIP compliance gate
//!
//! - Evaluate an intent file through the rule chain and lifecycle
//! - Advance an evaluated intent through later stages
//! - Print the lifecycle successor table
//! - Verify the hash chains of a JSON-lines evidence log

use std::path::PathBuf;

use anyhow::Context;
use clap::{Parser, Subcommand};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};
use uip_types::LifecycleState;

mod commands;
mod config;
mod output;
mod pipeline;

use config::UipConfig;

#[derive(Parser)]
#[command(name = "uipctl")]
#[command(about = "UIP compliance gate and pipeline orchestration", long_about = None)]
#[command(version)]
struct Cli {
    /// Configuration file path (TOML, YAML or JSON)
    #[arg(short, long, env = "UIP_CONFIG")]
    config: Option<String>,

    /// Output format
    #[arg(short, long, value_enum, default_value = "text")]
    output: output::OutputFormat,

    /// Enable debug logging
    #[arg(short, long)]
    verbose: bool,

    /// Emit logs as JSON
    #[arg(long, env = "UIP_LOG_JSON")]
    json_logs: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Run an intent through the compliance gate
    Evaluate {
        /// Intent record (JSON)
        intent: PathBuf,

        /// Consult advisory knowledge when the intent is allowed
        #[arg(long)]
        advisory: bool,
    },

    /// Evaluate an intent, then move it through later lifecycle stages
    Advance {
        /// Intent record (JSON)
        intent: PathBuf,

        /// Target states, applied in order (e.g. DECISIONS_MADE)
        #[arg(long = "to", required = true, num_args = 1..)]
        to: Vec<LifecycleState>,
    },

    /// Print the lifecycle successor table
    Lifecycle,

    /// Verify the hash chains of an evidence log
    Verify {
        /// JSON-lines evidence log
        log: PathBuf,
    },

    /// Show the effective configuration
    Config,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    let config = UipConfig::load(cli.config.as_deref()).context("failed to load configuration")?;

    let level = if cli.verbose {
        "debug".to_string()
    } else {
        config.log.level.clone()
    };
    let env_filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| level.into());

    if cli.json_logs || config.log.json {
        tracing_subscriber::registry()
            .with(env_filter)
            .with(tracing_subscriber::fmt::layer().json().with_writer(std::io::stderr))
            .init();
    } else {
        tracing_subscriber::registry()
            .with(env_filter)
            .with(
                tracing_subscriber::fmt::layer()
                    .without_time()
                    .with_writer(std::io::stderr),
            )
            .init();
    }

    match cli.command {
        Commands::Evaluate { intent, advisory } => {
            commands::evaluate::evaluate(&config, &intent, advisory, cli.output).await
        }
        Commands::Advance { intent, to } => {
            commands::evaluate::advance(&config, &intent, &to, cli.output).await
        }
        Commands::Lifecycle => commands::lifecycle::show(cli.output),
        Commands::Verify { log } => commands::verify::verify(&log, cli.output).await,
        Commands::Config => output::print_structured(&config, match cli.output {
            output::OutputFormat::Text => output::OutputFormat::Yaml,
            other => other,
        }),
    }
}
