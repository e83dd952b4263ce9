//! Feed backend routing
//!
//! Picks the backend for a compiled query. Random, best-of, controversial and
//! text feeds only exist on the tag service. Everything else goes to the
//! canonical API, optionally trying the tag service first:
//!
//! 1. no likes qualifier and tag-service search enabled: tag service, falling
//!    back to the canonical API on error
//! 2. otherwise, no likes qualifier, no `around`/`newer` cursor and an
//!    advanced tag expression: same as 1
//! 3. otherwise: canonical API only
//!
//! The route is chosen synchronously before any request starts. Dropping the
//! future returned by [`FeedBackendRouter::resolve`] cancels whichever call is
//! running; the fallback call is never started after that.

use crate::client::api::{CanonicalFeedBackend, GeneralParams, ItemsParams, TagServiceFeedBackend};
use crate::client::feed::metrics::FeedMetrics;
use crate::client::feed::query::CompiledQuery;
use crate::shared::{BackendError, FeedPage, FeedType};
use std::sync::Arc;

/// Why the tag service is tried before the canonical API
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TagServiceReason {
    /// Tag-service search is switched on
    SearchEnabled,
    /// Advanced tag expression on a first or older page
    AdvancedQuery,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Route {
    Random,
    BestOf,
    Controversial,
    Text,
    /// Tag-service general search with canonical fallback
    TagServiceFirst(TagServiceReason),
    Canonical,
}

/// Choose the route for a compiled query
pub fn select_route(query: &CompiledQuery) -> Route {
    match query.feed_type {
        FeedType::Random => Route::Random,
        FeedType::BestOf => Route::BestOf,
        FeedType::Controversial => Route::Controversial,
        FeedType::Text => Route::Text,
        FeedType::New | FeedType::Promoted | FeedType::Premium => {
            // The tag service cannot filter by likes.
            if query.likes.is_some() {
                Route::Canonical
            } else if query.tag_service_search {
                Route::TagServiceFirst(TagServiceReason::SearchEnabled)
            } else if query.around.is_none()
                && query.newer.is_none()
                && query.tags.is_advanced()
            {
                Route::TagServiceFirst(TagServiceReason::AdvancedQuery)
            } else {
                Route::Canonical
            }
        }
    }
}

pub(crate) fn items_params(query: &CompiledQuery) -> ItemsParams {
    ItemsParams {
        promoted: query.promoted,
        following: query.following,
        older: query.older,
        newer: query.newer,
        around: query.around,
        flags: query.flags,
        tags: query.tags.as_param().map(str::to_string),
        likes: query.likes.clone(),
        self_only: query.self_only,
        user: query.user.clone(),
    }
}

pub(crate) fn general_params(query: &CompiledQuery) -> GeneralParams {
    GeneralParams {
        promoted: query.promoted,
        tags: query.tags.as_param().map(str::to_string),
        user: query.user.clone(),
        flags: query.flags,
        older: query.older,
        newer: query.newer,
        around: query.around,
    }
}

/// Dispatches compiled queries to the feed backends
#[derive(Clone)]
pub struct FeedBackendRouter {
    canonical: Arc<dyn CanonicalFeedBackend>,
    tag_service: Arc<dyn TagServiceFeedBackend>,
    best_of_score_threshold: u32,
    fallback_on_rejected: bool,
    metrics: Arc<FeedMetrics>,
}

impl FeedBackendRouter {
    pub fn new(
        canonical: Arc<dyn CanonicalFeedBackend>,
        tag_service: Arc<dyn TagServiceFeedBackend>,
        best_of_score_threshold: u32,
        fallback_on_rejected: bool,
        metrics: Arc<FeedMetrics>,
    ) -> Self {
        Self {
            canonical,
            tag_service,
            best_of_score_threshold,
            fallback_on_rejected,
            metrics,
        }
    }

    fn should_fall_back(&self, error: &BackendError) -> bool {
        self.fallback_on_rejected || !error.is_rejected()
    }

    pub async fn resolve(&self, query: &CompiledQuery) -> Result<FeedPage, BackendError> {
        let tags = query.tags.as_param();

        match select_route(query) {
            Route::Random => self.tag_service.random(tags, query.flags).await,
            Route::BestOf => {
                self.tag_service
                    .best_of(
                        tags,
                        query.user.as_deref(),
                        query.flags,
                        query.older,
                        self.best_of_score_threshold,
                    )
                    .await
            }
            Route::Controversial => {
                self.tag_service
                    .controversial(tags, query.flags, query.older)
                    .await
            }
            Route::Text => self.tag_service.text(tags, query.flags, query.older).await,
            Route::Canonical => self.canonical.items(&items_params(query)).await,
            Route::TagServiceFirst(reason) => {
                let items = items_params(query);
                // Not polled unless the tag service fails.
                let official = self.canonical.items(&items);

                if reason == TagServiceReason::AdvancedQuery {
                    self.metrics.record_advanced_search();
                    tracing::info!(
                        "[Feed] Using general search api, but falling back on old one in case of an error."
                    );
                }
                self.metrics.record_tag_service_attempt();

                let general = general_params(query);
                match self.tag_service.general(&general).await {
                    Ok(page) => Ok(page),
                    Err(e) if self.should_fall_back(&e) => {
                        tracing::warn!("[Feed] tag service failed, using canonical api: {}", e);
                        self.metrics.record_fallback();
                        official.await
                    }
                    Err(e) => Err(e),
                }
            }
        }
    }
}
