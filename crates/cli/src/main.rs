//! EtherSense CLI
//!
//! Query a running agent for market state and signals, or run signal
//! detection locally over a snapshot file.

mod client;
mod commands;
mod output;

use anyhow::Result;
use clap::{Parser, Subcommand};
use commands::local::{self, RiskMode};
use commands::signals;
use sense_lib::signals::DEFAULT_RISK_EVENT_PROBABILITY;
use sense_lib::TimeFrame;
use std::path::PathBuf;

/// EtherSense market signals CLI
#[derive(Parser)]
#[command(name = "esense")]
#[command(author, version, about = "CLI for EtherSense market signals", long_about = None)]
pub struct Cli {
    /// Agent API URL (can also be set via ESENSE_API_URL env var)
    #[arg(long, env = "ESENSE_API_URL", default_value = "http://localhost:8080")]
    pub api_url: String,

    /// Output format
    #[arg(long, short, default_value = "table")]
    pub format: output::OutputFormat,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Show the agent's current dashboard state
    State,

    /// List the agent's current signals
    Signals,

    /// Trigger an immediate refresh on the agent
    Refresh,

    /// Detect signals over a local JSON snapshot file
    Detect {
        /// Path to a JSON array of snapshots
        #[arg(long)]
        file: PathBuf,

        /// Risk event behavior
        #[arg(long, value_enum, default_value_t = RiskMode::Never)]
        risk: RiskMode,

        /// Risk event probability used with `--risk random`
        #[arg(long, default_value_t = DEFAULT_RISK_EVENT_PROBABILITY)]
        risk_probability: f64,

        /// Seed for `--risk random`
        #[arg(long)]
        seed: Option<u64>,
    },

    /// Print mock snapshots
    Mock {
        /// Window to generate (daily, weekly, monthly)
        #[arg(long, default_value = "weekly")]
        timeframe: TimeFrame,

        /// Seed for reproducible output
        #[arg(long)]
        seed: Option<u64>,
    },
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    match cli.command {
        Commands::State => {
            let client = client::ApiClient::new(&cli.api_url)?;
            signals::show_state(&client, cli.format).await?;
        }
        Commands::Signals => {
            let client = client::ApiClient::new(&cli.api_url)?;
            signals::show_signals(&client, cli.format).await?;
        }
        Commands::Refresh => {
            let client = client::ApiClient::new(&cli.api_url)?;
            signals::trigger_refresh(&client, cli.format).await?;
        }
        Commands::Detect {
            file,
            risk,
            risk_probability,
            seed,
        } => {
            local::detect_file(&file, risk, risk_probability, seed, cli.format)?;
        }
        Commands::Mock { timeframe, seed } => {
            local::print_mock(timeframe, seed, cli.format)?;
        }
    }

    Ok(())
}
