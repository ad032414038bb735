//! Threshold-based signal detection
//!
//! Compares the latest snapshot against the previous one and against
//! fixed thresholds. Only the two most recent snapshots are consulted;
//! earlier history is ignored.

use chrono::{DateTime, Utc};

use super::chance::ChanceSource;
use crate::error::{Result, SenseError};
use crate::models::{MetricSnapshot, SignalFlag, SignalSeverity, SignalType};

/// Default BTC dominance drop (percentage points) for a rotation signal
pub const DEFAULT_ROTATION_DOMINANCE_DROP: f64 = 0.5;

/// Default ETF net inflow (millions) for a liquidity shift signal
pub const DEFAULT_LIQUIDITY_INFLOW_THRESHOLD: f64 = 400.0;

/// Default meme velocity index for a social velocity signal
pub const DEFAULT_SOCIAL_VELOCITY_THRESHOLD: f64 = 85.0;

/// Default per-call probability of the simulated risk feed firing
pub const DEFAULT_RISK_EVENT_PROBABILITY: f64 = 0.2;

/// Thresholds for the detection rules
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SignalThresholds {
    /// Rotation fires when dominance falls by more than this
    pub rotation_dominance_drop: f64,
    /// Liquidity shift fires when net flows exceed this
    pub liquidity_inflow_threshold: f64,
    /// Social velocity fires when the index exceeds this
    pub social_velocity_threshold: f64,
    /// Probability handed to the chance source for the risk rule
    pub risk_event_probability: f64,
}

impl Default for SignalThresholds {
    fn default() -> Self {
        Self {
            rotation_dominance_drop: DEFAULT_ROTATION_DOMINANCE_DROP,
            liquidity_inflow_threshold: DEFAULT_LIQUIDITY_INFLOW_THRESHOLD,
            social_velocity_threshold: DEFAULT_SOCIAL_VELOCITY_THRESHOLD,
            risk_event_probability: DEFAULT_RISK_EVENT_PROBABILITY,
        }
    }
}

impl SignalThresholds {
    pub fn validate(&self) -> Result<()> {
        if !(0.0..=1.0).contains(&self.risk_event_probability) {
            return Err(SenseError::InvalidConfig(format!(
                "risk_event_probability must be within [0, 1], got {}",
                self.risk_event_probability
            )));
        }

        let finite = [
            ("rotation_dominance_drop", self.rotation_dominance_drop),
            ("liquidity_inflow_threshold", self.liquidity_inflow_threshold),
            ("social_velocity_threshold", self.social_velocity_threshold),
        ];
        for (name, value) in finite {
            if !value.is_finite() {
                return Err(SenseError::InvalidConfig(format!(
                    "{} must be finite, got {}",
                    name, value
                )));
            }
        }

        Ok(())
    }
}

/// Maps a snapshot sequence to signal flags
#[derive(Debug, Clone, Default)]
pub struct SignalDetector {
    pub thresholds: SignalThresholds,
}

impl SignalDetector {
    pub fn new(thresholds: SignalThresholds) -> Self {
        Self { thresholds }
    }

    /// Detect signals, stamping them with the current time
    pub fn detect(
        &self,
        snapshots: &[MetricSnapshot],
        chance: &mut dyn ChanceSource,
    ) -> Vec<SignalFlag> {
        self.detect_at(snapshots, chance, Utc::now())
    }

    /// Detect signals, stamping them with `detected_at`
    ///
    /// Fewer than two snapshots yields no signals. Output follows rule
    /// order: rotation, liquidity shift, risk event, social velocity.
    pub fn detect_at(
        &self,
        snapshots: &[MetricSnapshot],
        chance: &mut dyn ChanceSource,
        detected_at: DateTime<Utc>,
    ) -> Vec<SignalFlag> {
        let [.., previous, latest] = snapshots else {
            return Vec::new();
        };
        let t = &self.thresholds;
        let mut signals = Vec::new();

        if latest.btc_dominance < previous.btc_dominance - t.rotation_dominance_drop {
            signals.push(self.rotation(detected_at));
        }

        if latest.etf_net_flows > t.liquidity_inflow_threshold {
            signals.push(self.liquidity_shift(detected_at));
        }

        // Simulated external security feed, independent of the metrics
        if chance.roll(t.risk_event_probability) {
            signals.push(Self::risk_event(detected_at));
        }

        if latest.meme_velocity > t.social_velocity_threshold {
            signals.push(self.social_velocity(detected_at));
        }

        signals
    }

    fn rotation(&self, at: DateTime<Utc>) -> SignalFlag {
        SignalFlag {
            id: "sig-1".to_string(),
            signal_type: SignalType::Rotation,
            severity: SignalSeverity::Info,
            title: "Altcoin Rotation Signal".to_string(),
            description: format!(
                "BTC dominance dropped by more than {} points while stablecoin market cap \
                 remained steady, suggesting internal capital flow.",
                self.thresholds.rotation_dominance_drop
            ),
            timestamp: at,
            source: "On-chain Dominance Tracking".to_string(),
        }
    }

    fn liquidity_shift(&self, at: DateTime<Utc>) -> SignalFlag {
        SignalFlag {
            id: "sig-2".to_string(),
            signal_type: SignalType::LiquidityShift,
            severity: SignalSeverity::Info,
            title: "Institutional Inflow Surge".to_string(),
            description: format!(
                "Daily ETF net flows exceeded ${}M, indicating sustained institutional demand.",
                self.thresholds.liquidity_inflow_threshold
            ),
            timestamp: at,
            source: "SEC Filings / Bloomberg Terminals".to_string(),
        }
    }

    fn risk_event(at: DateTime<Utc>) -> SignalFlag {
        SignalFlag {
            id: "sig-3".to_string(),
            signal_type: SignalType::RiskEvent,
            severity: SignalSeverity::Warning,
            title: "DeFi Bridge Exploit Detected".to_string(),
            description:
                "Anomalous outbound transactions detected on a cross-chain bridge protocol."
                    .to_string(),
            timestamp: at,
            source: "Security Monitor Bot".to_string(),
        }
    }

    fn social_velocity(&self, at: DateTime<Utc>) -> SignalFlag {
        SignalFlag {
            id: "sig-4".to_string(),
            signal_type: SignalType::SocialVelocity,
            severity: SignalSeverity::Critical,
            title: "Speculative Social Spike".to_string(),
            description: format!(
                "Meme coin social velocity is above {}, a historical indicator of local tops.",
                self.thresholds.social_velocity_threshold
            ),
            timestamp: at,
            source: "Social Intelligence Engine".to_string(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::signals::FixedChance;
    use std::collections::HashSet;

    fn snapshot(day: u32) -> MetricSnapshot {
        MetricSnapshot {
            timestamp: format!("2025-01-{:02}T00:00:00Z", day).parse().unwrap(),
            btc_price: 95_000.0,
            eth_price: 2_700.0,
            btc_dominance: 53.0,
            stablecoin_cap: 165.0,
            total_tvl: 90.0,
            eth_l2_volume: 17.0,
            etf_net_flows: 100.0,
            meme_velocity: 50.0,
            trading_volume: None,
        }
    }

    /// Two quiet snapshots with `latest` adjusted by `f`
    fn pair(f: impl FnOnce(&mut MetricSnapshot)) -> Vec<MetricSnapshot> {
        let previous = snapshot(1);
        let mut latest = snapshot(2);
        f(&mut latest);
        vec![previous, latest]
    }

    fn types(signals: &[SignalFlag]) -> Vec<SignalType> {
        signals.iter().map(|s| s.signal_type).collect()
    }

    #[test]
    fn test_short_sequences_yield_nothing() {
        let detector = SignalDetector::default();

        assert!(detector.detect(&[], &mut FixedChance::always()).is_empty());
        assert!(detector
            .detect(&[snapshot(1)], &mut FixedChance::always())
            .is_empty());
    }

    #[test]
    fn test_quiet_market_no_signals() {
        let detector = SignalDetector::default();
        let signals = detector.detect(&pair(|_| {}), &mut FixedChance::never());
        assert!(signals.is_empty());
    }

    #[test]
    fn test_rotation_boundary() {
        let detector = SignalDetector::default();
        let mut never = FixedChance::never();

        let fired = detector.detect(&pair(|s| s.btc_dominance = 52.4), &mut never);
        assert_eq!(types(&fired), vec![SignalType::Rotation]);
        assert_eq!(fired[0].severity, SignalSeverity::Info);

        let boundary = detector.detect(&pair(|s| s.btc_dominance = 52.5), &mut never);
        assert!(boundary.is_empty());
    }

    #[test]
    fn test_liquidity_boundary() {
        let detector = SignalDetector::default();
        let mut never = FixedChance::never();

        let boundary = detector.detect(&pair(|s| s.etf_net_flows = 400.0), &mut never);
        assert!(boundary.is_empty());

        let fired = detector.detect(&pair(|s| s.etf_net_flows = 400.01), &mut never);
        assert_eq!(types(&fired), vec![SignalType::LiquidityShift]);
        assert_eq!(fired[0].severity, SignalSeverity::Info);
    }

    #[test]
    fn test_social_velocity_boundary() {
        let detector = SignalDetector::default();
        let mut never = FixedChance::never();

        let boundary = detector.detect(&pair(|s| s.meme_velocity = 85.0), &mut never);
        assert!(boundary.is_empty());

        let fired = detector.detect(&pair(|s| s.meme_velocity = 85.1), &mut never);
        assert_eq!(types(&fired), vec![SignalType::SocialVelocity]);
        assert_eq!(fired[0].severity, SignalSeverity::Critical);
    }

    #[test]
    fn test_risk_event_follows_chance_only() {
        let detector = SignalDetector::default();

        for snapshots in [pair(|_| {}), pair(|s| s.meme_velocity = 99.0)] {
            let fired = detector.detect(&snapshots, &mut FixedChance::always());
            assert!(types(&fired).contains(&SignalType::RiskEvent));

            let quiet = detector.detect(&snapshots, &mut FixedChance::never());
            assert!(!types(&quiet).contains(&SignalType::RiskEvent));
        }

        let risk = &detector.detect(&pair(|_| {}), &mut FixedChance::always())[0];
        assert_eq!(risk.severity, SignalSeverity::Warning);
    }

    #[test]
    fn test_all_rules_in_table_order() {
        let detector = SignalDetector::default();
        let snapshots = pair(|s| {
            s.btc_dominance = 50.0;
            s.etf_net_flows = 450.0;
            s.meme_velocity = 90.0;
        });

        let signals = detector.detect(&snapshots, &mut FixedChance::always());
        assert_eq!(
            types(&signals),
            vec![
                SignalType::Rotation,
                SignalType::LiquidityShift,
                SignalType::RiskEvent,
                SignalType::SocialVelocity,
            ]
        );

        let ids: HashSet<&str> = signals.iter().map(|s| s.id.as_str()).collect();
        assert_eq!(ids.len(), signals.len());
        assert!(!types(&signals).contains(&SignalType::NarrativeEmergence));
    }

    #[test]
    fn test_only_last_two_snapshots_matter() {
        let detector = SignalDetector::default();

        // A large drop earlier in the history must not fire
        let mut early = snapshot(1);
        early.btc_dominance = 60.0;
        let snapshots = vec![early, snapshot(2), snapshot(3)];

        assert!(detector.detect(&snapshots, &mut FixedChance::never()).is_empty());
    }

    #[test]
    fn test_repeated_detection_is_stable() {
        let detector = SignalDetector::default();
        let snapshots = pair(|s| {
            s.btc_dominance = 51.0;
            s.meme_velocity = 88.0;
        });
        let at: DateTime<Utc> = "2025-01-02T12:00:00Z".parse().unwrap();

        let first = detector.detect_at(&snapshots, &mut FixedChance::never(), at);
        let second = detector.detect_at(&snapshots, &mut FixedChance::never(), at);
        assert_eq!(first, second);
        assert!(first.iter().all(|s| s.timestamp == at));
    }

    #[test]
    fn test_custom_thresholds() {
        let detector = SignalDetector::new(SignalThresholds {
            liquidity_inflow_threshold: 300.0,
            social_velocity_threshold: 80.0,
            ..Default::default()
        });
        let snapshots = pair(|s| {
            s.etf_net_flows = 350.0;
            s.meme_velocity = 82.0;
        });

        let signals = detector.detect(&snapshots, &mut FixedChance::never());
        assert_eq!(
            types(&signals),
            vec![SignalType::LiquidityShift, SignalType::SocialVelocity]
        );
        assert!(signals[0].description.contains("$300M"));
    }

    #[test]
    fn test_threshold_validation() {
        assert!(SignalThresholds::default().validate().is_ok());

        let bad_probability = SignalThresholds {
            risk_event_probability: 1.5,
            ..Default::default()
        };
        assert!(matches!(
            bad_probability.validate(),
            Err(SenseError::InvalidConfig(_))
        ));

        let bad_threshold = SignalThresholds {
            social_velocity_threshold: f64::NAN,
            ..Default::default()
        };
        assert!(bad_threshold.validate().is_err());
    }
}
