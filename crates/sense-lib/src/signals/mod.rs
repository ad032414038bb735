//! Signal detection over market metric snapshots
//!
//! This module provides:
//! - Threshold rules for rotation, liquidity shift and social velocity
//! - A simulated risk feed driven by an injectable chance source

mod chance;
mod detector;

pub use chance::{ChanceSource, FixedChance, RngChance};
pub use detector::{
    SignalDetector, SignalThresholds, DEFAULT_LIQUIDITY_INFLOW_THRESHOLD,
    DEFAULT_RISK_EVENT_PROBABILITY, DEFAULT_ROTATION_DOMINANCE_DROP,
    DEFAULT_SOCIAL_VELOCITY_THRESHOLD,
};
