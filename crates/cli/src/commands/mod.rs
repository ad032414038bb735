//! CLI command implementations

pub mod local;
pub mod signals;
