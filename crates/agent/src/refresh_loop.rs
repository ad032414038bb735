//! Scheduled refresh loop
//!
//! Refreshes once at startup, then on a fixed interval until shutdown.

use sense_lib::health::components;
use std::time::Duration;
use tokio::sync::broadcast;
use tokio::time::{interval, MissedTickBehavior};
use tracing::{debug, info};

use crate::api::AppState;

pub struct RefreshLoop {
    state: AppState,
    interval: Duration,
}

impl RefreshLoop {
    pub fn new(state: AppState, interval: Duration) -> Self {
        Self { state, interval }
    }

    pub async fn run(self, mut shutdown: broadcast::Receiver<()>) {
        info!(
            interval_secs = self.interval.as_secs(),
            "Starting refresh loop"
        );

        // First tick completes immediately
        let mut ticker = interval(self.interval);
        ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);
        let mut refresh_count = 0u64;

        loop {
            tokio::select! {
                _ = ticker.tick() => {
                    refresh_count += 1;
                    self.tick(refresh_count).await;
                }
                _ = shutdown.recv() => {
                    info!("Shutting down refresh loop");
                    break;
                }
            }
        }
    }

    async fn tick(&self, refresh_count: u64) {
        let registry = &self.state.health_registry;

        match self.state.refresh().await {
            Ok(dashboard) => {
                registry.set_healthy(components::REFRESH_LOOP).await;
                debug!(
                    refresh_count,
                    signals = dashboard.signals.len(),
                    "Scheduled refresh complete"
                );
            }
            // Already logged by the refresh cycle
            Err(e) => {
                registry
                    .set_degraded(
                        components::REFRESH_LOOP,
                        format!("Scheduled refresh {} failed: {}", refresh_count, e),
                    )
                    .await;
                debug!(refresh_count, "Scheduled refresh failed");
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use sense_lib::error::Result;
    use sense_lib::feed::{MetricsFeed, MockFeed};
    use sense_lib::signals::{FixedChance, SignalDetector};
    use sense_lib::{
        ComponentStatus, HealthRegistry, MetricSnapshot, RefreshCycle, SenseError,
        StructuredLogger, TimeFrame,
    };

    /// Feed that fails every fetch
    struct OfflineFeed;

    impl MetricsFeed for OfflineFeed {
        fn fetch(&mut self, _timeframe: TimeFrame) -> Result<Vec<MetricSnapshot>> {
            Err(SenseError::InvalidConfig("feed offline".to_string()))
        }
    }

    async fn app_state(feed: Box<dyn MetricsFeed>) -> AppState {
        let registry = HealthRegistry::new();
        registry.register(components::FEED).await;
        registry.register(components::REFRESH_LOOP).await;

        let cycle = RefreshCycle::new(
            feed,
            SignalDetector::default(),
            Box::new(FixedChance::never()),
            StructuredLogger::new("test"),
        );
        AppState::new(registry, cycle)
    }

    async fn loop_status(state: &AppState) -> Option<ComponentStatus> {
        let health = state.health_registry.health().await;
        health
            .components
            .get(components::REFRESH_LOOP)
            .map(|c| c.status)
    }

    #[tokio::test]
    async fn test_refreshes_immediately_and_stops() {
        let state = app_state(Box::new(MockFeed::seeded(21))).await;
        let (tx, rx) = broadcast::channel(1);

        let refresh_loop = RefreshLoop::new(state.clone(), Duration::from_secs(3600));
        let handle = tokio::spawn(refresh_loop.run(rx));

        // Wait for the startup refresh to publish
        for _ in 0..100 {
            if state.dashboard().await.last_ingestion.is_some() {
                break;
            }
            tokio::time::sleep(Duration::from_millis(10)).await;
        }
        assert_eq!(state.dashboard().await.metrics.len(), 7);
        assert!(state.health_registry.readiness().await.ready);
        assert_eq!(loop_status(&state).await, Some(ComponentStatus::Healthy));

        tx.send(()).unwrap();
        handle.await.unwrap();
    }

    #[tokio::test]
    async fn test_failed_refresh_degrades_loop() {
        let state = app_state(Box::new(OfflineFeed)).await;
        let refresh_loop = RefreshLoop::new(state.clone(), Duration::from_secs(3600));

        refresh_loop.tick(1).await;

        let health = state.health_registry.health().await;
        let loop_health = &health.components[components::REFRESH_LOOP];
        assert_eq!(loop_health.status, ComponentStatus::Degraded);
        assert!(loop_health
            .message
            .as_deref()
            .is_some_and(|m| m.contains("feed offline")));
        assert!(!state.health_registry.readiness().await.ready);
    }

    #[tokio::test]
    async fn test_successful_refresh_restores_loop() {
        let state = app_state(Box::new(MockFeed::seeded(4))).await;
        state
            .health_registry
            .set_degraded(components::REFRESH_LOOP, "earlier failure")
            .await;

        RefreshLoop::new(state.clone(), Duration::from_secs(3600))
            .tick(2)
            .await;

        assert_eq!(loop_status(&state).await, Some(ComponentStatus::Healthy));
    }
}
