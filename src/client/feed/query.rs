//! Feed query compilation
//!
//! Turns a [`FeedQuery`] into the flat parameter set the backends take. The
//! compiled query is immutable and knows nothing about backend selection.

use crate::client::config::FeatureFlagSource;
use crate::shared::{ContentType, FeedQuery, FeedType};
use std::sync::Arc;

/// Tag string with its query-language mode
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct TagExpression {
    tags: String,
    advanced: bool,
}

impl TagExpression {
    /// Parse a raw tag string. A leading `?` (after trimming) selects the
    /// advanced query language; the marker and the whitespace next to it are
    /// stripped once.
    pub fn parse(raw: Option<&str>) -> Self {
        let trimmed = raw.unwrap_or_default().trim();
        match trimmed.strip_prefix('?') {
            Some(rest) => Self {
                tags: rest.trim_start().to_string(),
                advanced: true,
            },
            None => Self {
                tags: trimmed.to_string(),
                advanced: false,
            },
        }
    }

    pub fn tags(&self) -> &str {
        &self.tags
    }

    pub fn is_advanced(&self) -> bool {
        self.advanced
    }

    /// Tags as a request parameter, `None` when there is no tag filter
    pub fn as_param(&self) -> Option<&str> {
        if self.tags.is_empty() {
            None
        } else {
            Some(&self.tags)
        }
    }
}

/// Backend-ready form of a feed request
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CompiledQuery {
    pub feed_type: FeedType,
    /// `Some(true)` for the promoted feed, otherwise unset
    pub promoted: Option<bool>,
    /// `Some(true)` for the premium feed, otherwise unset
    pub following: Option<bool>,
    /// Content-type bitmask
    pub flags: u32,
    pub tags: TagExpression,
    pub user: Option<String>,
    /// Non-empty likes qualifier
    pub likes: Option<String>,
    /// `Some(true)` when `likes` is set, otherwise unset
    pub self_only: Option<bool>,
    pub older: Option<u64>,
    pub newer: Option<u64>,
    pub around: Option<u64>,
    /// Tag-service search flag as read during compilation
    pub tag_service_search: bool,
}

/// Compiles feed queries, reading the feature flag once per query
#[derive(Clone)]
pub struct FeedQueryCompiler {
    flags: Arc<dyn FeatureFlagSource>,
}

impl FeedQueryCompiler {
    pub fn new(flags: Arc<dyn FeatureFlagSource>) -> Self {
        Self { flags }
    }

    pub fn compile(&self, query: &FeedQuery) -> CompiledQuery {
        compile(query, self.flags.tag_service_search_enabled())
    }
}

/// Compile `query` with an explicit tag-service flag
pub fn compile(query: &FeedQuery, tag_service_search: bool) -> CompiledQuery {
    let filter = &query.filter;
    let feed_type = filter.feed_type;

    let likes = filter
        .likes
        .as_deref()
        .filter(|likes| !likes.is_empty())
        .map(str::to_string);
    let self_only = likes.as_ref().map(|_| true);

    CompiledQuery {
        feed_type,
        promoted: (feed_type == FeedType::Promoted).then_some(true),
        following: (feed_type == FeedType::Premium).then_some(true),
        flags: ContentType::combine(&query.content_types),
        tags: TagExpression::parse(filter.tags.as_deref()),
        user: filter.username.clone(),
        likes,
        self_only,
        older: query.older,
        newer: query.newer,
        around: query.around,
        tag_service_search,
    }
}
