//! Agent configuration

use anyhow::{Context, Result};
use sense_lib::signals::{
    SignalThresholds, DEFAULT_LIQUIDITY_INFLOW_THRESHOLD, DEFAULT_RISK_EVENT_PROBABILITY,
    DEFAULT_ROTATION_DOMINANCE_DROP, DEFAULT_SOCIAL_VELOCITY_THRESHOLD,
};
use sense_lib::{SenseError, TimeFrame};
use serde::Deserialize;
use std::time::Duration;

/// Agent configuration
#[derive(Debug, Clone, Deserialize)]
pub struct AgentConfig {
    /// Name attached to every log event
    #[serde(default = "default_instance_name")]
    pub instance_name: String,

    /// API server port for state/health/metrics
    #[serde(default = "default_api_port")]
    pub api_port: u16,

    /// Seconds between scheduled refreshes
    #[serde(default = "default_refresh_interval")]
    pub refresh_interval_secs: u64,

    /// Window generated by the mock feed
    #[serde(default)]
    pub timeframe: TimeFrame,

    /// Seed for the mock feed and risk rule; entropy when unset
    #[serde(default)]
    pub seed: Option<u64>,

    #[serde(default = "default_risk_event_probability")]
    pub risk_event_probability: f64,

    #[serde(default = "default_rotation_dominance_drop")]
    pub rotation_dominance_drop: f64,

    #[serde(default = "default_liquidity_inflow_threshold")]
    pub liquidity_inflow_threshold: f64,

    #[serde(default = "default_social_velocity_threshold")]
    pub social_velocity_threshold: f64,
}

fn default_instance_name() -> String {
    "ethersense".to_string()
}

fn default_api_port() -> u16 {
    8080
}

fn default_refresh_interval() -> u64 {
    300
}

fn default_risk_event_probability() -> f64 {
    DEFAULT_RISK_EVENT_PROBABILITY
}

fn default_rotation_dominance_drop() -> f64 {
    DEFAULT_ROTATION_DOMINANCE_DROP
}

fn default_liquidity_inflow_threshold() -> f64 {
    DEFAULT_LIQUIDITY_INFLOW_THRESHOLD
}

fn default_social_velocity_threshold() -> f64 {
    DEFAULT_SOCIAL_VELOCITY_THRESHOLD
}

impl Default for AgentConfig {
    fn default() -> Self {
        Self {
            instance_name: default_instance_name(),
            api_port: default_api_port(),
            refresh_interval_secs: default_refresh_interval(),
            timeframe: TimeFrame::default(),
            seed: None,
            risk_event_probability: default_risk_event_probability(),
            rotation_dominance_drop: default_rotation_dominance_drop(),
            liquidity_inflow_threshold: default_liquidity_inflow_threshold(),
            social_velocity_threshold: default_social_velocity_threshold(),
        }
    }
}

impl AgentConfig {
    /// Load configuration from an optional `ethersense` file, then
    /// `ETHERSENSE_*` environment variables
    pub fn load() -> Result<Self> {
        Self::load_from(config::Environment::with_prefix("ETHERSENSE"))
    }

    fn load_from(environment: config::Environment) -> Result<Self> {
        let config = config::Config::builder()
            .add_source(config::File::with_name("ethersense").required(false))
            .add_source(environment)
            .build()
            .context("Failed to read configuration")?;

        let config: AgentConfig = config
            .try_deserialize()
            .context("Failed to parse configuration")?;
        config.validate()?;

        Ok(config)
    }

    pub fn validate(&self) -> std::result::Result<(), SenseError> {
        if self.refresh_interval_secs == 0 {
            return Err(SenseError::InvalidConfig(
                "refresh_interval_secs must be positive".to_string(),
            ));
        }
        self.thresholds().validate()
    }

    pub fn thresholds(&self) -> SignalThresholds {
        SignalThresholds {
            rotation_dominance_drop: self.rotation_dominance_drop,
            liquidity_inflow_threshold: self.liquidity_inflow_threshold,
            social_velocity_threshold: self.social_velocity_threshold,
            risk_event_probability: self.risk_event_probability,
        }
    }

    pub fn refresh_interval(&self) -> Duration {
        Duration::from_secs(self.refresh_interval_secs)
    }
}
