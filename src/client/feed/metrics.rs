//! # Feed Metrics
//!
//! Counters for feed loading and routing decisions.
//!
//! ## Features
//!
//! - **Load Counts**: `feed.loaded` per feed type
//! - **Routing**: tag-service attempts and fallbacks to the canonical API
//! - **Error Tracking**: failed resolutions
//! - **Latency**: rolling average of successful resolutions

use crate::shared::FeedType;
use std::collections::HashMap;
use std::sync::{Mutex, PoisonError};
use std::time::{Duration, Instant};

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct FeedMetricsSnapshot {
    /// `feed.loaded` counter keyed by feed type name
    pub loaded: HashMap<&'static str, u64>,
    pub tag_service_attempts: u64,
    pub fallbacks: u64,
    pub advanced_searches: u64,
    pub successful: u64,
    pub failed: u64,
    pub average_duration: Duration,
    /// Summed latency of successful resolutions
    pub total_duration: Duration,
}

impl FeedMetricsSnapshot {
    pub fn loaded(&self, feed_type: FeedType) -> u64 {
        self.loaded.get(feed_type.name()).copied().unwrap_or(0)
    }

    pub fn success_rate(&self) -> f64 {
        let total = self.successful + self.failed;
        if total == 0 {
            0.0
        } else {
            self.successful as f64 / total as f64
        }
    }
}

#[derive(Debug, Default)]
pub struct FeedMetrics {
    inner: Mutex<FeedMetricsSnapshot>,
}

impl FeedMetrics {
    pub fn new() -> Self {
        Self::default()
    }

    fn update(&self, f: impl FnOnce(&mut FeedMetricsSnapshot)) {
        let mut inner = self.inner.lock().unwrap_or_else(PoisonError::into_inner);
        f(&mut inner);
    }

    /// Count a feed load and return the start instant for [`record_success`](Self::record_success)
    pub fn record_load(&self, feed_type: FeedType) -> Instant {
        self.update(|m| *m.loaded.entry(feed_type.name()).or_insert(0) += 1);
        Instant::now()
    }

    pub fn record_tag_service_attempt(&self) {
        self.update(|m| m.tag_service_attempts += 1);
    }

    pub fn record_fallback(&self) {
        self.update(|m| m.fallbacks += 1);
    }

    pub fn record_advanced_search(&self) {
        self.update(|m| m.advanced_searches += 1);
    }

    pub fn record_success(&self, started: Instant) {
        let duration = started.elapsed();
        self.update(|m| {
            m.successful += 1;
            m.total_duration = m.total_duration.saturating_add(duration);
            let average = m.total_duration.as_nanos() / u128::from(m.successful);
            m.average_duration = Duration::from_nanos(u64::try_from(average).unwrap_or(u64::MAX));
        });
    }

    pub fn record_failure(&self) {
        self.update(|m| m.failed += 1);
    }

    pub fn snapshot(&self) -> FeedMetricsSnapshot {
        self.inner
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .clone()
    }
}
