//! EtherSense agent: scheduled refreshes behind an HTTP API

pub mod api;
pub mod config;
pub mod refresh_loop;

use sense_lib::feed::MockFeed;
use sense_lib::signals::{ChanceSource, RngChance, SignalDetector};
use sense_lib::{RefreshCycle, StructuredLogger};

/// Build the refresh cycle described by `config`
///
/// With a seed the feed and risk rule replay the same sequence on every
/// start; the risk rule uses a derived seed so it does not mirror the feed.
pub fn build_refresh_cycle(
    config: &config::AgentConfig,
    logger: StructuredLogger,
) -> RefreshCycle {
    let feed = match config.seed {
        Some(seed) => MockFeed::seeded(seed),
        None => MockFeed::from_entropy(),
    };
    let chance: Box<dyn ChanceSource + Send> = match config.seed {
        Some(seed) => Box::new(RngChance::seeded(seed.wrapping_add(1))),
        None => Box::new(RngChance::from_entropy()),
    };

    RefreshCycle::new(
        Box::new(feed),
        SignalDetector::new(config.thresholds()),
        chance,
        logger,
    )
    .with_timeframe(config.timeframe)
}
