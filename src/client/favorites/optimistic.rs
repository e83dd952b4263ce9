//! # Optimistic Favorites
//!
//! Applies add/remove requests to the [`MembershipCache`] immediately and
//! confirms them with the comments service in the background.
//!
//! ## Features
//!
//! - **Immediate Updates**: the cache changes before the call returns
//! - **Identity Wait**: confirmation waits for the next available identity
//!   instead of failing while logged out
//! - **No Rollback**: a failed confirmation leaves the optimistic state in
//!   place; the next full sync corrects it
//!
//! ## Usage
//!
//! ```rust,no_run
//! # async fn example(mutator: favfeed::client::favorites::OptimisticMutator, comment: favfeed::shared::FavedComment) {
//! let handle = mutator.request_add(comment);
//! // the cache already contains the comment here
//! let outcome = handle.await;
//! # }
//! ```

use crate::client::api::MembershipBackend;
use crate::client::favorites::cache::MembershipCache;
use crate::client::identity::{Identity, IdentitySource};
use crate::shared::{BackendError, CommentId, FavedComment};
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;
use tokio::task::JoinHandle;

/// Result of the background confirmation of one request
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Confirmation {
    /// Backend accepted the change
    Confirmed,
    /// Backend call failed, local state kept
    Failed(BackendError),
    /// Identity source went away before an identity became available
    Abandoned,
}

#[derive(Debug, Clone)]
enum Change {
    Add(FavedComment),
    Remove(CommentId),
}

impl Change {
    fn id(&self) -> CommentId {
        match self {
            Change::Add(comment) => comment.id,
            Change::Remove(id) => *id,
        }
    }
}

/// Optimistic writer for the favorites cache
#[derive(Clone)]
pub struct OptimisticMutator {
    cache: Arc<MembershipCache>,
    backend: Arc<dyn MembershipBackend>,
    identity: Arc<dyn IdentitySource>,
    pending: Arc<AtomicUsize>,
}

impl OptimisticMutator {
    pub fn new(
        cache: Arc<MembershipCache>,
        backend: Arc<dyn MembershipBackend>,
        identity: Arc<dyn IdentitySource>,
    ) -> Self {
        Self {
            cache,
            backend,
            identity,
            pending: Arc::new(AtomicUsize::new(0)),
        }
    }

    /// Mark a comment as favorite. Must be called inside a Tokio runtime.
    pub fn request_add(&self, comment: FavedComment) -> JoinHandle<Confirmation> {
        tracing::info!("[Favorites] save comment-fav with id {}", comment.id);
        self.cache.add(comment.id);
        self.confirm(Change::Add(comment))
    }

    /// Unmark a comment. Must be called inside a Tokio runtime.
    pub fn request_remove(&self, id: CommentId) -> JoinHandle<Confirmation> {
        tracing::info!("[Favorites] delete comment-fav with id {}", id);
        self.cache.remove(id);
        self.confirm(Change::Remove(id))
    }

    /// Number of requests still waiting for identity or backend
    pub fn count_pending(&self) -> usize {
        self.pending.load(Ordering::SeqCst)
    }

    fn confirm(&self, change: Change) -> JoinHandle<Confirmation> {
        let backend = Arc::clone(&self.backend);
        let mut identity_rx = self.identity.subscribe();
        let pending = PendingGuard::new(Arc::clone(&self.pending));

        tokio::spawn(async move {
            let _pending = pending;

            let identity: Identity = match identity_rx
                .wait_for(Option::is_some)
                .await
                .map(|current| current.clone())
            {
                Ok(Some(identity)) => identity,
                _ => {
                    tracing::debug!(
                        "[Favorites] no identity for comment {}, keeping change local",
                        change.id()
                    );
                    return Confirmation::Abandoned;
                }
            };

            let result = match &change {
                Change::Add(comment) => backend.confirm_add(&identity, comment).await,
                Change::Remove(id) => backend.confirm_remove(&identity, *id).await,
            };

            match result {
                Ok(()) => Confirmation::Confirmed,
                Err(e) => {
                    tracing::warn!(
                        "[Favorites] could not confirm change of comment {}: {}",
                        change.id(),
                        e
                    );
                    Confirmation::Failed(e)
                }
            }
        })
    }
}

/// Counts a confirmation as pending until the task finishes or is dropped
struct PendingGuard(Arc<AtomicUsize>);

impl PendingGuard {
    fn new(counter: Arc<AtomicUsize>) -> Self {
        counter.fetch_add(1, Ordering::SeqCst);
        Self(counter)
    }
}

impl Drop for PendingGuard {
    fn drop(&mut self) {
        self.0.fetch_sub(1, Ordering::SeqCst);
    }
}
