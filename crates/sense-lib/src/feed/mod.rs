//! Market metrics sources
//!
//! This module provides feeds that produce ordered snapshot sequences:
//! a randomized mock feed and a JSON file feed.

mod file;
mod mock;

pub use file::FileFeed;
pub use mock::MockFeed;

use crate::error::{Result, SenseError};
use crate::models::{MetricSnapshot, TimeFrame};

/// Trait for snapshot sources
pub trait MetricsFeed: Send {
    /// Fetch an ordered snapshot sequence covering `timeframe`
    fn fetch(&mut self, timeframe: TimeFrame) -> Result<Vec<MetricSnapshot>>;
}

/// Check that timestamps never decrease
pub fn validate_sequence(snapshots: &[MetricSnapshot]) -> Result<()> {
    match snapshots
        .windows(2)
        .position(|pair| pair[1].timestamp < pair[0].timestamp)
    {
        Some(i) => Err(SenseError::UnorderedSnapshots { index: i + 1 }),
        None => Ok(()),
    }
}
