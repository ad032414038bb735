//! Commands that query a running agent

use anyhow::Result;
use colored::Colorize;
use sense_lib::{DashboardState, MetricSnapshot, SignalFlag};
use tabled::Tabled;

use crate::client::ApiClient;
use crate::output::{
    color_severity, format_billions, format_net_flow, format_usd, print_info, print_json,
    print_rows, print_success, print_warning, OutputFormat,
};

/// Row for signals table
#[derive(Tabled)]
pub struct SignalRow {
    #[tabled(rename = "ID")]
    id: String,
    #[tabled(rename = "Type")]
    signal_type: String,
    #[tabled(rename = "Severity")]
    severity: String,
    #[tabled(rename = "Title")]
    title: String,
    #[tabled(rename = "Source")]
    source: String,
}

impl From<&SignalFlag> for SignalRow {
    fn from(signal: &SignalFlag) -> Self {
        Self {
            id: signal.id.clone(),
            signal_type: signal.signal_type.to_string(),
            severity: color_severity(signal.severity),
            title: signal.title.clone(),
            source: signal.source.clone(),
        }
    }
}

pub fn print_signals(signals: &[SignalFlag], format: OutputFormat) -> Result<()> {
    let rows: Vec<SignalRow> = signals.iter().map(SignalRow::from).collect();
    print_rows(rows, signals, format, "No signals detected")
}

fn print_latest(latest: &MetricSnapshot) {
    println!("{}", "Latest Snapshot".bold());
    println!("{}", "-".repeat(50));
    println!("Timestamp:        {}", latest.timestamp.to_rfc3339().cyan());
    println!("BTC price:        {}", format_usd(latest.btc_price));
    println!("ETH price:        {}", format_usd(latest.eth_price));
    println!("BTC dominance:    {:.2}%", latest.btc_dominance);
    println!("Stablecoin cap:   {}", format_billions(latest.stablecoin_cap));
    println!("Total TVL:        {}", format_billions(latest.total_tvl));
    println!("ETH L2 volume:    {}", format_billions(latest.eth_l2_volume));
    println!("ETF net flows:    {}", format_net_flow(latest.etf_net_flows));
    println!("Meme velocity:    {:.1}", latest.meme_velocity);
    if let Some(volume) = latest.trading_volume {
        println!("Trading volume:   {}", format_billions(volume));
    }
}

fn print_state(state: &DashboardState, format: OutputFormat) -> Result<()> {
    if let OutputFormat::Json = format {
        return print_json(state);
    }

    println!("{}", "Market Pulse".bold());
    println!("{}", "=".repeat(50));
    println!("Timeframe:        {:?}", state.timeframe);
    println!("Snapshots:        {}", state.metrics.len());
    match state.last_ingestion {
        Some(at) => println!("Last ingestion:   {}", at.to_rfc3339()),
        None => println!("Last ingestion:   {}", "never".yellow()),
    }
    if state.is_ingesting {
        print_info("Refresh in progress");
    }
    println!();

    match state.latest() {
        Some(latest) => print_latest(latest),
        None => print_warning("No snapshots ingested yet"),
    }
    println!();

    print_signals(&state.signals, format)
}

pub async fn show_state(client: &ApiClient, format: OutputFormat) -> Result<()> {
    let state: DashboardState = client.get("api/v1/state").await?;
    print_state(&state, format)
}

pub async fn show_signals(client: &ApiClient, format: OutputFormat) -> Result<()> {
    let signals: Vec<SignalFlag> = client.get("api/v1/signals").await?;
    print_signals(&signals, format)
}

pub async fn trigger_refresh(client: &ApiClient, format: OutputFormat) -> Result<()> {
    let state: DashboardState = client.post("api/v1/refresh").await?;

    if let OutputFormat::Table = format {
        print_success(&format!(
            "Refreshed {} snapshots, {} signals",
            state.metrics.len(),
            state.signals.len()
        ));
    }
    print_state(&state, format)
}
