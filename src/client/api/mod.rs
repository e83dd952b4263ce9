//! # Backend Collaborators
//!
//! Contracts for the remote services the client core talks to, plus reqwest
//! implementations of each.
//!
//! - [`MembershipBackend`] - favorite-comments service, scoped by identity
//! - [`CanonicalFeedBackend`] - the official items API
//! - [`TagServiceFeedBackend`] - the category/tag-service API with its
//!   specialised feeds
//!
//! All calls are single-shot futures. Dropping a future cancels the request.

pub mod categories;
pub mod comments;
pub mod items;

pub use categories::HttpTagServiceBackend;
pub use comments::HttpMembershipBackend;
pub use items::HttpCanonicalFeedBackend;

use crate::client::identity::Identity;
use crate::shared::{BackendError, CommentId, FavedComment, FeedPage, Post};
use async_trait::async_trait;
use std::time::Duration;

/// Favorite-comments service
#[async_trait]
pub trait MembershipBackend: Send + Sync {
    /// Fetch every favorited comment of `identity` matching `content_mask`
    async fn fetch_all(
        &self,
        identity: &Identity,
        content_mask: u32,
    ) -> Result<Vec<FavedComment>, BackendError>;

    async fn confirm_add(
        &self,
        identity: &Identity,
        comment: &FavedComment,
    ) -> Result<(), BackendError>;

    async fn confirm_remove(&self, identity: &Identity, id: CommentId) -> Result<(), BackendError>;
}

/// Parameters of the canonical items call. `None` means "not sent".
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ItemsParams {
    pub promoted: Option<bool>,
    pub following: Option<bool>,
    pub older: Option<u64>,
    pub newer: Option<u64>,
    pub around: Option<u64>,
    pub flags: u32,
    pub tags: Option<String>,
    pub likes: Option<String>,
    pub self_only: Option<bool>,
    pub user: Option<String>,
}

/// Parameters of the tag-service general search. Same as the canonical call
/// without the likes fields.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct GeneralParams {
    pub promoted: Option<bool>,
    pub tags: Option<String>,
    pub user: Option<String>,
    pub flags: u32,
    pub older: Option<u64>,
    pub newer: Option<u64>,
    pub around: Option<u64>,
}

/// Official items API
#[async_trait]
pub trait CanonicalFeedBackend: Send + Sync {
    async fn items(&self, params: &ItemsParams) -> Result<FeedPage, BackendError>;

    async fn item_info(&self, id: u64) -> Result<Post, BackendError>;
}

/// Tag-service API
#[async_trait]
pub trait TagServiceFeedBackend: Send + Sync {
    async fn random(&self, tags: Option<&str>, flags: u32) -> Result<FeedPage, BackendError>;

    async fn best_of(
        &self,
        tags: Option<&str>,
        user: Option<&str>,
        flags: u32,
        older: Option<u64>,
        score: u32,
    ) -> Result<FeedPage, BackendError>;

    async fn controversial(
        &self,
        tags: Option<&str>,
        flags: u32,
        older: Option<u64>,
    ) -> Result<FeedPage, BackendError>;

    async fn text(
        &self,
        tags: Option<&str>,
        flags: u32,
        older: Option<u64>,
    ) -> Result<FeedPage, BackendError>;

    async fn general(&self, params: &GeneralParams) -> Result<FeedPage, BackendError>;
}

/// Query-string builder that leaves out absent values
#[derive(Debug, Default)]
pub(crate) struct Query(Vec<(&'static str, String)>);

impl Query {
    pub(crate) fn new() -> Self {
        Self::default()
    }

    pub(crate) fn put(mut self, key: &'static str, value: impl ToString) -> Self {
        self.0.push((key, value.to_string()));
        self
    }

    pub(crate) fn opt<T: ToString>(self, key: &'static str, value: Option<T>) -> Self {
        match value {
            Some(value) => self.put(key, value),
            None => self,
        }
    }

    /// Boolean flags go on the wire as `1`/`0`; `None` leaves the key out
    pub(crate) fn flag(self, key: &'static str, value: Option<bool>) -> Self {
        match value {
            Some(true) => self.put(key, 1),
            Some(false) => self.put(key, 0),
            None => self,
        }
    }

    pub(crate) fn pairs(&self) -> &[(&'static str, String)] {
        &self.0
    }
}

pub(crate) fn build_http_client(timeout: Duration) -> Result<reqwest::Client, BackendError> {
    reqwest::Client::builder()
        .timeout(timeout)
        .build()
        .map_err(|e| BackendError::transient(format!("Failed to create HTTP client: {}", e)))
}

/// Map non-success responses to a [`BackendError`], keeping the body text
pub(crate) async fn check_status(
    response: reqwest::Response,
) -> Result<reqwest::Response, BackendError> {
    let status = response.status();
    if status.is_success() {
        return Ok(response);
    }
    let error_text = response
        .text()
        .await
        .unwrap_or_else(|_| status.to_string());
    Err(BackendError::from_status(status.as_u16(), error_text))
}
