//! # Favorite Comments
//!
//! Client-side view of the user's favorited comments.
//!
//! ## Architecture
//!
//! - **Cache** ([`MembershipCache`]): copy-on-write id set with a
//!   replay-latest snapshot stream
//! - **Synchronizer** ([`CacheSynchronizer`]): replaces the cache with the
//!   server list on every identity change or forced refresh
//! - **Mutator** ([`OptimisticMutator`]): local add/remove first, backend
//!   confirmation afterwards
//!
//! [`FavoritesService`] wires the three together and is what callers hold.
//!
//! ## Usage
//!
//! ```rust,no_run
//! use std::sync::Arc;
//! use favfeed::client::{Config, FavoritesService, IdentitySignal};
//!
//! # async fn example() -> Result<(), favfeed::shared::BackendError> {
//! let identity = Arc::new(IdentitySignal::anonymous());
//! let favorites = FavoritesService::from_config(Config::new(), identity.clone())?;
//!
//! identity.login("5f4dcc3b5aa765d61d8327deb882cf99");
//! let is_fav = favorites.is_favorited(1234);
//! # Ok(())
//! # }
//! ```

pub mod cache;
pub mod optimistic;
pub mod sync;

pub use cache::{MembershipCache, MembershipSnapshot};
pub use optimistic::{Confirmation, OptimisticMutator};
pub use sync::{CacheSynchronizer, SyncStats};

use crate::client::api::{HttpMembershipBackend, MembershipBackend};
use crate::client::config::Config;
use crate::client::identity::IdentitySource;
use crate::shared::{BackendError, CommentId, ContentType, FavedComment};
use std::sync::Arc;
use tokio::task::JoinHandle;
use tokio_stream::wrappers::WatchStream;

/// Favorited-comments facade
pub struct FavoritesService {
    cache: Arc<MembershipCache>,
    backend: Arc<dyn MembershipBackend>,
    identity: Arc<dyn IdentitySource>,
    mutator: OptimisticMutator,
    synchronizer: CacheSynchronizer,
}

impl FavoritesService {
    /// Create the service and start synchronizing. Must be called inside a
    /// Tokio runtime.
    pub fn new(backend: Arc<dyn MembershipBackend>, identity: Arc<dyn IdentitySource>) -> Self {
        let cache = Arc::new(MembershipCache::new());
        let synchronizer =
            CacheSynchronizer::start(Arc::clone(&cache), Arc::clone(&backend), identity.as_ref());
        let mutator = OptimisticMutator::new(
            Arc::clone(&cache),
            Arc::clone(&backend),
            Arc::clone(&identity),
        );

        Self {
            cache,
            backend,
            identity,
            mutator,
            synchronizer,
        }
    }

    /// Create the service backed by the HTTP comments service
    pub fn from_config(
        config: Config,
        identity: Arc<dyn IdentitySource>,
    ) -> Result<Self, BackendError> {
        let backend = Arc::new(HttpMembershipBackend::new(config)?);
        Ok(Self::new(backend, identity))
    }

    /// Snapshots of the favorited ids, starting with the current one
    pub fn favorites_snapshots(&self) -> WatchStream<MembershipSnapshot> {
        self.cache.subscribe()
    }

    pub fn current_snapshot(&self) -> MembershipSnapshot {
        self.cache.current_snapshot()
    }

    pub fn is_favorited(&self, id: CommentId) -> bool {
        self.cache.contains(id)
    }

    pub fn request_add(&self, comment: FavedComment) -> JoinHandle<Confirmation> {
        self.mutator.request_add(comment)
    }

    pub fn request_remove(&self, id: CommentId) -> JoinHandle<Confirmation> {
        self.mutator.request_remove(id)
    }

    pub fn force_refresh(&self) {
        self.synchronizer.force_refresh();
    }

    /// List the favorited comments of the given content types.
    ///
    /// Waits for an identity if none is present, and schedules a cache
    /// refresh as a side effect.
    pub async fn list(
        &self,
        content_types: impl IntoIterator<Item = ContentType>,
    ) -> Result<Vec<FavedComment>, BackendError> {
        let flags = ContentType::combine(content_types);
        self.force_refresh();

        let mut identity_rx = self.identity.subscribe();
        let identity = identity_rx
            .wait_for(Option::is_some)
            .await
            .map(|current| current.clone())
            .ok()
            .flatten()
            .ok_or(BackendError::NoIdentity)?;

        self.backend.fetch_all(&identity, flags).await
    }

    pub fn sync_stats(&self) -> SyncStats {
        self.synchronizer.stats()
    }

    pub fn pending_confirmations(&self) -> usize {
        self.mutator.count_pending()
    }
}
