//! # Feed Service
//!
//! Performs the actual request to get the items of a feed.
//!
//! A [`FeedQuery`] is compiled into backend parameters by the
//! [`FeedQueryCompiler`] and dispatched by the [`FeedBackendRouter`]. Each call
//! resolves to exactly one page or one error.
//!
//! ## Usage
//!
//! ```rust,no_run
//! use favfeed::client::{Config, FeedService};
//! use favfeed::shared::{ContentType, FeedFilter, FeedQuery, FeedType};
//!
//! # async fn example() -> Result<(), favfeed::shared::BackendError> {
//! let feed = FeedService::from_config(Config::new())?;
//! let query = FeedQuery::new(FeedFilter::new(FeedType::Promoted), [ContentType::Sfw]);
//! let page = feed.resolve_feed(&query).await?;
//! # Ok(())
//! # }
//! ```

pub mod metrics;
pub mod query;
pub mod router;

pub use metrics::{FeedMetrics, FeedMetricsSnapshot};
pub use query::{CompiledQuery, FeedQueryCompiler, TagExpression};
pub use router::{FeedBackendRouter, Route, TagServiceReason};

use crate::client::api::{
    CanonicalFeedBackend, HttpCanonicalFeedBackend, HttpTagServiceBackend, TagServiceFeedBackend,
};
use crate::client::config::{Config, FeatureFlagSource};
use crate::shared::{BackendError, FeedPage, FeedQuery, Post};
use std::sync::Arc;

pub struct FeedService {
    compiler: FeedQueryCompiler,
    router: FeedBackendRouter,
    canonical: Arc<dyn CanonicalFeedBackend>,
    metrics: Arc<FeedMetrics>,
}

impl FeedService {
    pub fn new(
        canonical: Arc<dyn CanonicalFeedBackend>,
        tag_service: Arc<dyn TagServiceFeedBackend>,
        flags: Arc<dyn FeatureFlagSource>,
        best_of_score_threshold: u32,
        fallback_on_rejected: bool,
    ) -> Self {
        let metrics = Arc::new(FeedMetrics::new());
        let router = FeedBackendRouter::new(
            Arc::clone(&canonical),
            tag_service,
            best_of_score_threshold,
            fallback_on_rejected,
            Arc::clone(&metrics),
        );
        Self {
            compiler: FeedQueryCompiler::new(flags),
            router,
            canonical,
            metrics,
        }
    }

    /// Create the service backed by the HTTP APIs. The configuration also
    /// serves as the feature-flag source.
    pub fn from_config(config: Config) -> Result<Self, BackendError> {
        let canonical = Arc::new(HttpCanonicalFeedBackend::new(config.clone())?);
        let tag_service = Arc::new(HttpTagServiceBackend::new(config.clone())?);
        let threshold = config.best_of_score_threshold();
        let fallback_on_rejected = config.fallback_on_rejected();
        Ok(Self::new(
            canonical,
            tag_service,
            Arc::new(config),
            threshold,
            fallback_on_rejected,
        ))
    }

    /// Load one page of the feed described by `query`
    pub async fn resolve_feed(&self, query: &FeedQuery) -> Result<FeedPage, BackendError> {
        let compiled = self.compiler.compile(query);
        let started = self.metrics.record_load(compiled.feed_type);

        let result = self.router.resolve(&compiled).await;
        match &result {
            Ok(_) => self.metrics.record_success(started),
            Err(e) => {
                tracing::warn!("[Feed] loading {} feed failed: {}", compiled.feed_type, e);
                self.metrics.record_failure();
            }
        }
        result
    }

    pub async fn load_post_details(&self, id: u64) -> Result<Post, BackendError> {
        self.canonical.item_info(id).await
    }

    pub fn metrics(&self) -> FeedMetricsSnapshot {
        self.metrics.snapshot()
    }
}
