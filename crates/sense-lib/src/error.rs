//! Error types for the sense library

use thiserror::Error;

/// Result alias used throughout the library
pub type Result<T> = std::result::Result<T, SenseError>;

/// Library errors
///
/// Signal detection itself never fails; these cover the feed and
/// configuration edges around it.
#[derive(Error, Debug)]
pub enum SenseError {
    #[error("Invalid configuration: {0}")]
    InvalidConfig(String),

    /// Snapshot at `index` is older than the one before it
    #[error("Snapshots out of order at index {index}")]
    UnorderedSnapshots { index: usize },

    #[error("Failed to read metrics file: {0}")]
    Io(#[from] std::io::Error),

    #[error("Failed to parse metrics: {0}")]
    Json(#[from] serde_json::Error),
}
