//! EtherSense core library
//!
//! This crate provides:
//! - Market metric and signal models
//! - Threshold-based signal detection
//! - Mock and file metrics feeds
//! - The refresh cycle tying feed and detector together
//! - Health checks and observability

pub mod error;
pub mod feed;
pub mod health;
pub mod models;
pub mod observability;
pub mod refresh;
pub mod signals;

pub use error::{Result, SenseError};
pub use health::{
    ComponentHealth, ComponentStatus, HealthRegistry, HealthResponse, ReadinessResponse,
};
pub use models::*;
pub use observability::{SenseMetrics, StructuredLogger};
pub use refresh::RefreshCycle;
