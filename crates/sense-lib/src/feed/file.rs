//! JSON file feed

use std::path::{Path, PathBuf};

use super::{validate_sequence, MetricsFeed};
use crate::error::Result;
use crate::models::{MetricSnapshot, TimeFrame};

/// Reads a JSON array of snapshots from disk on every fetch
#[derive(Debug, Clone)]
pub struct FileFeed {
    path: PathBuf,
}

impl FileFeed {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    pub fn load(&self) -> Result<Vec<MetricSnapshot>> {
        let content = std::fs::read_to_string(&self.path)?;
        let snapshots: Vec<MetricSnapshot> = serde_json::from_str(&content)?;
        validate_sequence(&snapshots)?;
        Ok(snapshots)
    }
}

impl MetricsFeed for FileFeed {
    /// The file defines its own window, so `timeframe` is ignored
    fn fetch(&mut self, _timeframe: TimeFrame) -> Result<Vec<MetricSnapshot>> {
        self.load()
    }
}
