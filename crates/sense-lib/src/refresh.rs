//! Refresh cycle
//!
//! One pass of feed → detector → dashboard state. The state is returned
//! to the caller rather than stored globally; callers decide where to
//! publish it.

use chrono::Utc;
use std::time::Instant;

use crate::error::Result;
use crate::feed::MetricsFeed;
use crate::models::{DashboardState, TimeFrame};
use crate::observability::{SenseMetrics, StructuredLogger};
use crate::signals::{ChanceSource, SignalDetector};

pub struct RefreshCycle {
    feed: Box<dyn MetricsFeed>,
    detector: SignalDetector,
    chance: Box<dyn ChanceSource + Send>,
    timeframe: TimeFrame,
    metrics: SenseMetrics,
    logger: StructuredLogger,
}

impl RefreshCycle {
    pub fn new(
        feed: Box<dyn MetricsFeed>,
        detector: SignalDetector,
        chance: Box<dyn ChanceSource + Send>,
        logger: StructuredLogger,
    ) -> Self {
        Self {
            feed,
            detector,
            chance,
            timeframe: TimeFrame::default(),
            metrics: SenseMetrics::new(),
            logger,
        }
    }

    pub fn with_timeframe(mut self, timeframe: TimeFrame) -> Self {
        self.timeframe = timeframe;
        self
    }

    pub fn timeframe(&self) -> TimeFrame {
        self.timeframe
    }

    pub fn set_timeframe(&mut self, timeframe: TimeFrame) {
        self.timeframe = timeframe;
    }

    /// Fetch fresh snapshots and detect signals over them
    ///
    /// A feed error is returned as-is; the caller keeps its previous state.
    pub fn run(&mut self) -> Result<DashboardState> {
        let start = Instant::now();

        let metrics = match self.feed.fetch(self.timeframe) {
            Ok(metrics) => metrics,
            Err(e) => {
                self.metrics.inc_refresh_errors();
                self.logger.log_refresh_failure(&e.to_string());
                return Err(e);
            }
        };

        let detected_at = Utc::now();
        let signals = self
            .detector
            .detect_at(&metrics, self.chance.as_mut(), detected_at);

        for signal in &signals {
            self.metrics.inc_signal_detected(signal.signal_type);
            self.logger.log_signal(signal);
        }

        let elapsed = start.elapsed();
        self.metrics.observe_refresh_latency(elapsed.as_secs_f64());
        self.metrics.set_snapshots_ingested(metrics.len() as i64);
        self.metrics.set_last_refresh(detected_at.timestamp());
        self.logger
            .log_refresh(metrics.len(), signals.len(), elapsed.as_millis());

        Ok(DashboardState {
            metrics,
            signals,
            timeframe: self.timeframe,
            is_ingesting: false,
            last_ingestion: Some(detected_at),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::SenseError;
    use crate::feed::MockFeed;
    use crate::models::{MetricSnapshot, SignalType};
    use crate::signals::FixedChance;

    /// Feed returning a canned sequence, or failing
    struct StaticFeed(Option<Vec<MetricSnapshot>>);

    impl MetricsFeed for StaticFeed {
        fn fetch(&mut self, _timeframe: TimeFrame) -> Result<Vec<MetricSnapshot>> {
            self.0
                .clone()
                .ok_or_else(|| SenseError::InvalidConfig("feed offline".to_string()))
        }
    }

    fn cycle(feed: Box<dyn MetricsFeed>, fires: bool) -> RefreshCycle {
        RefreshCycle::new(
            feed,
            SignalDetector::default(),
            Box::new(FixedChance(fires)),
            StructuredLogger::new("test"),
        )
    }

    #[test]
    fn test_run_builds_fresh_state() {
        let mut refresh = cycle(Box::new(MockFeed::seeded(11)), true)
            .with_timeframe(TimeFrame::Daily);

        let state = refresh.run().unwrap();
        assert_eq!(state.metrics.len(), 24);
        assert_eq!(state.timeframe, TimeFrame::Daily);
        assert!(!state.is_ingesting);
        assert!(state.last_ingestion.is_some());
        assert!(state
            .signals
            .iter()
            .any(|s| s.signal_type == SignalType::RiskEvent));
        assert!(state
            .signals
            .iter()
            .all(|s| Some(s.timestamp) == state.last_ingestion));
    }

    #[test]
    fn test_short_feed_gives_no_signals() {
        let snapshot = MockFeed::seeded(12).generate(TimeFrame::Weekly).remove(0);
        let mut refresh = cycle(Box::new(StaticFeed(Some(vec![snapshot]))), true);

        let state = refresh.run().unwrap();
        assert_eq!(state.metrics.len(), 1);
        assert!(state.signals.is_empty());
    }

    #[test]
    fn test_feed_error_propagates() {
        let mut refresh = cycle(Box::new(StaticFeed(None)), false);
        assert!(refresh.run().is_err());
    }

    #[test]
    fn test_timeframe_switch() {
        let mut refresh = cycle(Box::new(MockFeed::seeded(13)), false);
        assert_eq!(refresh.timeframe(), TimeFrame::Weekly);

        refresh.set_timeframe(TimeFrame::Monthly);
        assert_eq!(refresh.run().unwrap().metrics.len(), 30);
    }
}
