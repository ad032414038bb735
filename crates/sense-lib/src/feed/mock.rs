//! Randomized mock metrics
//!
//! Generates plausible snapshots ending at an anchor instant, one
//! timeframe step apart.

use chrono::{DateTime, Utc};
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use std::ops::Range;

use super::{validate_sequence, MetricsFeed};
use crate::error::Result;
use crate::models::{MetricSnapshot, TimeFrame};

const BTC_PRICE: Range<f64> = 90_000.0..100_000.0;
const ETH_PRICE: Range<f64> = 2_500.0..3_000.0;
const BTC_DOMINANCE: Range<f64> = 52.0..57.0;
const STABLECOIN_CAP: Range<f64> = 160.0..170.0;
const TOTAL_TVL: Range<f64> = 80.0..100.0;
const ETH_L2_VOLUME: Range<f64> = 15.0..20.0;
const ETF_NET_FLOWS: Range<f64> = -100.0..400.0;
const MEME_VELOCITY: Range<f64> = 0.0..100.0;
/// Only generated for the daily timeframe
const TRADING_VOLUME: Range<f64> = 20.0..60.0;

/// Mock feed drawing every field uniformly from a fixed range
pub struct MockFeed<R: Rng> {
    rng: R,
    /// Instant of the last snapshot; `None` means now
    anchor: Option<DateTime<Utc>>,
}

impl<R: Rng> MockFeed<R> {
    pub fn new(rng: R) -> Self {
        Self { rng, anchor: None }
    }

    /// Pin the last snapshot to a fixed instant
    pub fn with_anchor(mut self, anchor: DateTime<Utc>) -> Self {
        self.anchor = Some(anchor);
        self
    }

    /// Generate a snapshot sequence for `timeframe`
    pub fn generate(&mut self, timeframe: TimeFrame) -> Vec<MetricSnapshot> {
        let end = self.anchor.unwrap_or_else(Utc::now);
        let points = timeframe.points();
        let step = timeframe.step();

        (0..points)
            .map(|i| {
                let back = (points - 1 - i) as i32;
                self.snapshot(end - step * back, timeframe)
            })
            .collect()
    }

    fn snapshot(&mut self, timestamp: DateTime<Utc>, timeframe: TimeFrame) -> MetricSnapshot {
        let rng = &mut self.rng;
        MetricSnapshot {
            timestamp,
            btc_price: rng.gen_range(BTC_PRICE),
            eth_price: rng.gen_range(ETH_PRICE),
            btc_dominance: rng.gen_range(BTC_DOMINANCE),
            stablecoin_cap: rng.gen_range(STABLECOIN_CAP),
            total_tvl: rng.gen_range(TOTAL_TVL),
            eth_l2_volume: rng.gen_range(ETH_L2_VOLUME),
            etf_net_flows: rng.gen_range(ETF_NET_FLOWS),
            meme_velocity: rng.gen_range(MEME_VELOCITY),
            trading_volume: match timeframe {
                TimeFrame::Daily => Some(rng.gen_range(TRADING_VOLUME)),
                TimeFrame::Weekly | TimeFrame::Monthly => None,
            },
        }
    }
}

impl MockFeed<StdRng> {
    pub fn from_entropy() -> Self {
        Self::new(StdRng::from_entropy())
    }

    pub fn seeded(seed: u64) -> Self {
        Self::new(StdRng::seed_from_u64(seed))
    }
}

impl<R: Rng + Send> MetricsFeed for MockFeed<R> {
    fn fetch(&mut self, timeframe: TimeFrame) -> Result<Vec<MetricSnapshot>> {
        let snapshots = self.generate(timeframe);
        validate_sequence(&snapshots)?;
        Ok(snapshots)
    }
}
