//! Observability infrastructure for EtherSense
//!
//! Provides:
//! - Prometheus metrics (refresh latency, snapshots ingested, signals by type)
//! - Structured JSON logging with tracing

use prometheus::{
    register_histogram, register_int_counter, register_int_counter_vec, register_int_gauge,
    Histogram, IntCounter, IntCounterVec, IntGauge,
};
use std::sync::OnceLock;
use tracing::{info, warn};

use crate::models::{SignalFlag, SignalSeverity, SignalType};

/// Histogram buckets for refresh latency (in seconds)
const LATENCY_BUCKETS: &[f64] = &[
    0.00001, 0.00005, 0.0001, 0.0005, 0.001, 0.005, 0.01, 0.05, 0.1, 0.5, 1.0,
];

/// Global metrics instance (registered once)
static GLOBAL_METRICS: OnceLock<SenseMetricsInner> = OnceLock::new();

struct SenseMetricsInner {
    refresh_latency_seconds: Histogram,
    snapshots_ingested: IntGauge,
    signals_detected: IntCounterVec,
    refresh_errors: IntCounter,
    last_refresh_timestamp: IntGauge,
}

impl SenseMetricsInner {
    fn new() -> Self {
        Self {
            refresh_latency_seconds: register_histogram!(
                "ethersense_refresh_latency_seconds",
                "Time spent fetching metrics and detecting signals",
                LATENCY_BUCKETS.to_vec()
            )
            .expect("Failed to register refresh_latency_seconds"),

            snapshots_ingested: register_int_gauge!(
                "ethersense_snapshots_ingested",
                "Number of snapshots in the current dashboard state"
            )
            .expect("Failed to register snapshots_ingested"),

            signals_detected: register_int_counter_vec!(
                "ethersense_signals_detected_total",
                "Total number of signals detected, by signal type",
                &["signal_type"]
            )
            .expect("Failed to register signals_detected"),

            refresh_errors: register_int_counter!(
                "ethersense_refresh_errors_total",
                "Total number of failed refresh cycles"
            )
            .expect("Failed to register refresh_errors"),

            last_refresh_timestamp: register_int_gauge!(
                "ethersense_last_refresh_timestamp_seconds",
                "Unix time of the last successful refresh"
            )
            .expect("Failed to register last_refresh_timestamp"),
        }
    }
}

/// Handle to the global Prometheus metrics
///
/// Clones share the same underlying metrics.
#[derive(Clone)]
pub struct SenseMetrics {
    _private: (),
}

impl Default for SenseMetrics {
    fn default() -> Self {
        Self::new()
    }
}

impl SenseMetrics {
    /// Create a new metrics handle (initializes global metrics if needed)
    pub fn new() -> Self {
        GLOBAL_METRICS.get_or_init(SenseMetricsInner::new);
        Self { _private: () }
    }

    fn inner(&self) -> &SenseMetricsInner {
        GLOBAL_METRICS.get_or_init(SenseMetricsInner::new)
    }

    pub fn observe_refresh_latency(&self, duration_secs: f64) {
        self.inner().refresh_latency_seconds.observe(duration_secs);
    }

    pub fn set_snapshots_ingested(&self, count: i64) {
        self.inner().snapshots_ingested.set(count);
    }

    pub fn inc_signal_detected(&self, signal_type: SignalType) {
        self.inner()
            .signals_detected
            .with_label_values(&[signal_type.as_str()])
            .inc();
    }

    pub fn signals_detected(&self, signal_type: SignalType) -> u64 {
        self.inner()
            .signals_detected
            .with_label_values(&[signal_type.as_str()])
            .get()
    }

    pub fn inc_refresh_errors(&self) {
        self.inner().refresh_errors.inc();
    }

    pub fn set_last_refresh(&self, unix_secs: i64) {
        self.inner().last_refresh_timestamp.set(unix_secs);
    }
}

/// Structured logger for refresh and signal events
#[derive(Clone)]
pub struct StructuredLogger {
    instance: String,
}

impl StructuredLogger {
    pub fn new(instance: impl Into<String>) -> Self {
        Self {
            instance: instance.into(),
        }
    }

    /// Log a detected signal; critical signals log at warn level
    pub fn log_signal(&self, signal: &SignalFlag) {
        match signal.severity {
            SignalSeverity::Critical => {
                warn!(
                    event = "signal_detected",
                    instance = %self.instance,
                    signal_id = %signal.id,
                    signal_type = %signal.signal_type,
                    severity = %signal.severity,
                    title = %signal.title,
                    source = %signal.source,
                    "Critical signal detected"
                );
            }
            _ => {
                info!(
                    event = "signal_detected",
                    instance = %self.instance,
                    signal_id = %signal.id,
                    signal_type = %signal.signal_type,
                    severity = %signal.severity,
                    title = %signal.title,
                    source = %signal.source,
                    "Signal detected"
                );
            }
        }
    }

    pub fn log_refresh(&self, snapshots: usize, signals: usize, elapsed_ms: u128) {
        info!(
            event = "refresh_completed",
            instance = %self.instance,
            snapshots = snapshots,
            signals = signals,
            elapsed_ms = elapsed_ms,
            "Refresh cycle complete"
        );
    }

    pub fn log_refresh_failure(&self, error: &str) {
        warn!(
            event = "refresh_failed",
            instance = %self.instance,
            error = %error,
            "Refresh cycle failed, keeping previous state"
        );
    }

    pub fn log_startup(&self, version: &str, risk_event_probability: f64) {
        info!(
            event = "agent_started",
            instance = %self.instance,
            agent_version = %version,
            risk_event_probability = risk_event_probability,
            "EtherSense agent started"
        );
    }

    pub fn log_shutdown(&self, reason: &str) {
        info!(
            event = "agent_shutdown",
            instance = %self.instance,
            reason = %reason,
            "EtherSense agent shutting down"
        );
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_sense_metrics_creation() {
        // Global registry: handles share the same counters across tests
        let metrics = SenseMetrics::new();
        let before = metrics.signals_detected(SignalType::NarrativeEmergence);

        metrics.observe_refresh_latency(0.0002);
        metrics.set_snapshots_ingested(7);
        metrics.set_last_refresh(1_700_000_000);
        metrics.inc_refresh_errors();
        metrics.inc_signal_detected(SignalType::NarrativeEmergence);

        let other = SenseMetrics::new();
        assert_eq!(other.signals_detected(SignalType::NarrativeEmergence), before + 1);
    }

    #[test]
    fn test_structured_logger_creation() {
        let logger = StructuredLogger::new("test-instance");
        assert_eq!(logger.instance, "test-instance");
    }
}
