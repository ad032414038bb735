//! Core data models for market metrics and signals

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// One timestamped observation of the tracked market metrics
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MetricSnapshot {
    pub timestamp: DateTime<Utc>,
    pub btc_price: f64,
    pub eth_price: f64,
    /// Percentage share, (0, 100)
    pub btc_dominance: f64,
    /// Billions of quote currency
    pub stablecoin_cap: f64,
    /// Billions of quote currency
    pub total_tvl: f64,
    /// Billions of quote currency
    pub eth_l2_volume: f64,
    /// Signed, millions of quote currency
    pub etf_net_flows: f64,
    /// Unitless index, 0 to 100 by convention
    pub meme_velocity: f64,
    /// Billions of quote currency
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub trading_volume: Option<f64>,
}

/// Signal classification
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum SignalType {
    Rotation,
    LiquidityShift,
    /// Declared for consumers; no detection rule produces it
    NarrativeEmergence,
    RiskEvent,
    SocialVelocity,
}

impl SignalType {
    pub fn as_str(&self) -> &'static str {
        match self {
            SignalType::Rotation => "ROTATION",
            SignalType::LiquidityShift => "LIQUIDITY_SHIFT",
            SignalType::NarrativeEmergence => "NARRATIVE_EMERGENCE",
            SignalType::RiskEvent => "RISK_EVENT",
            SignalType::SocialVelocity => "SOCIAL_VELOCITY",
        }
    }
}

impl std::fmt::Display for SignalType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Signal severity levels
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SignalSeverity {
    Info,
    Warning,
    Critical,
}

impl std::fmt::Display for SignalSeverity {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            SignalSeverity::Info => write!(f, "info"),
            SignalSeverity::Warning => write!(f, "warning"),
            SignalSeverity::Critical => write!(f, "critical"),
        }
    }
}

/// A derived alert, created fresh on every detection pass
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SignalFlag {
    /// Unique within one detection pass only
    pub id: String,
    #[serde(rename = "type")]
    pub signal_type: SignalType,
    pub severity: SignalSeverity,
    pub title: String,
    pub description: String,
    /// Detection time, not snapshot time
    pub timestamp: DateTime<Utc>,
    pub source: String,
}

/// Window of history generated by the mock feed
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TimeFrame {
    /// 24 hourly snapshots
    Daily,
    /// 7 daily snapshots
    #[default]
    Weekly,
    /// 30 daily snapshots
    Monthly,
}

impl TimeFrame {
    /// Number of snapshots in the window
    pub fn points(&self) -> usize {
        match self {
            TimeFrame::Daily => 24,
            TimeFrame::Weekly => 7,
            TimeFrame::Monthly => 30,
        }
    }

    /// Spacing between consecutive snapshots
    pub fn step(&self) -> chrono::Duration {
        match self {
            TimeFrame::Daily => chrono::Duration::hours(1),
            TimeFrame::Weekly | TimeFrame::Monthly => chrono::Duration::days(1),
        }
    }
}

impl std::str::FromStr for TimeFrame {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "daily" => Ok(TimeFrame::Daily),
            "weekly" => Ok(TimeFrame::Weekly),
            "monthly" => Ok(TimeFrame::Monthly),
            other => Err(format!("unknown timeframe: {}", other)),
        }
    }
}

/// View state published after each refresh
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DashboardState {
    pub metrics: Vec<MetricSnapshot>,
    pub signals: Vec<SignalFlag>,
    pub timeframe: TimeFrame,
    pub is_ingesting: bool,
    pub last_ingestion: Option<DateTime<Utc>>,
}

impl DashboardState {
    /// Copy of `previous` flagged as mid-refresh
    pub fn ingesting(previous: &DashboardState) -> Self {
        Self {
            is_ingesting: true,
            ..previous.clone()
        }
    }

    pub fn latest(&self) -> Option<&MetricSnapshot> {
        self.metrics.last()
    }
}
