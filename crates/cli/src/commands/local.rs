//! Commands that run without an agent

use anyhow::{Context, Result};
use clap::ValueEnum;
use sense_lib::feed::{FileFeed, MockFeed};
use sense_lib::signals::{ChanceSource, FixedChance, RngChance, SignalDetector, SignalThresholds};
use sense_lib::{MetricSnapshot, TimeFrame};
use std::path::Path;
use tabled::Tabled;

use super::signals::print_signals;
use crate::output::{format_net_flow, format_usd, print_info, print_rows, OutputFormat};

/// How the simulated risk feed behaves for local detection
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, ValueEnum)]
pub enum RiskMode {
    /// Risk event always fires
    Always,
    /// Risk event never fires
    #[default]
    Never,
    /// Fires with the configured probability
    Random,
}

impl RiskMode {
    fn chance(self, seed: Option<u64>) -> Box<dyn ChanceSource> {
        match (self, seed) {
            (RiskMode::Always, _) => Box::new(FixedChance::always()),
            (RiskMode::Never, _) => Box::new(FixedChance::never()),
            (RiskMode::Random, Some(seed)) => Box::new(RngChance::seeded(seed)),
            (RiskMode::Random, None) => Box::new(RngChance::from_entropy()),
        }
    }
}

#[derive(Tabled)]
struct SnapshotRow {
    #[tabled(rename = "Timestamp")]
    timestamp: String,
    #[tabled(rename = "BTC")]
    btc_price: String,
    #[tabled(rename = "ETH")]
    eth_price: String,
    #[tabled(rename = "BTC Dom")]
    btc_dominance: String,
    #[tabled(rename = "ETF Flows")]
    etf_net_flows: String,
    #[tabled(rename = "Meme Vel")]
    meme_velocity: String,
}

impl From<&MetricSnapshot> for SnapshotRow {
    fn from(s: &MetricSnapshot) -> Self {
        Self {
            timestamp: s.timestamp.format("%Y-%m-%d %H:%M").to_string(),
            btc_price: format_usd(s.btc_price),
            eth_price: format_usd(s.eth_price),
            btc_dominance: format!("{:.2}%", s.btc_dominance),
            etf_net_flows: format_net_flow(s.etf_net_flows),
            meme_velocity: format!("{:.1}", s.meme_velocity),
        }
    }
}

/// Detect signals over a JSON snapshot file
pub fn detect_file(
    path: &Path,
    risk: RiskMode,
    risk_probability: f64,
    seed: Option<u64>,
    format: OutputFormat,
) -> Result<()> {
    let snapshots = FileFeed::new(path)
        .load()
        .with_context(|| format!("Failed to load {}", path.display()))?;

    let thresholds = SignalThresholds {
        risk_event_probability: risk_probability,
        ..Default::default()
    };
    thresholds.validate()?;

    // JSON output stays a bare array
    if snapshots.len() < 2 && matches!(format, OutputFormat::Table) {
        print_info("Fewer than two snapshots, nothing to compare");
    }

    let detector = SignalDetector::new(thresholds);
    let mut chance = risk.chance(seed);
    let signals = detector.detect(&snapshots, chance.as_mut());

    print_signals(&signals, format)
}

/// Print a mock snapshot sequence
pub fn print_mock(timeframe: TimeFrame, seed: Option<u64>, format: OutputFormat) -> Result<()> {
    let snapshots = match seed {
        Some(seed) => MockFeed::seeded(seed).generate(timeframe),
        None => MockFeed::from_entropy().generate(timeframe),
    };

    let rows: Vec<SnapshotRow> = snapshots.iter().map(SnapshotRow::from).collect();
    print_rows(rows, &snapshots, format, "No snapshots generated")
}
