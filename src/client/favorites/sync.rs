//! # Favorites Synchronizer
//!
//! Keeps the [`MembershipCache`] equal to the server's list for the current
//! identity.
//!
//! ## Triggers
//!
//! - **Identity changes**: every new value of the identity stream
//! - **Force refresh**: explicit requests through [`CacheSynchronizer::force_refresh`]
//!
//! ## Dispatch
//!
//! Each trigger bumps a generation counter and starts a fetch for the
//! identity current at that moment, aborting the previous fetch. A fetch
//! result is only applied while its generation is still the latest, checked
//! under the cache write lock, so a slow response for an old identity can
//! never overwrite a fresher state. Optimistic writes made while the fetch
//! was running are replayed on top of its result.
//!
//! Without an identity the cache is cleared. Fetch failures leave the cache
//! untouched and are only logged. Dropping the synchronizer aborts the
//! running fetch.

use crate::client::api::MembershipBackend;
use crate::client::favorites::cache::MembershipCache;
use crate::client::identity::{Identity, IdentitySource};
use crate::shared::ContentType;
use std::collections::HashSet;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, Mutex, PoisonError};
use tokio::sync::{mpsc, watch};
use tokio::task::JoinHandle;

/// Counters describing synchronizer activity
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct SyncStats {
    /// Fetches started
    pub started: u64,
    /// Fetch results written to the cache (or found equal to it)
    pub applied: u64,
    /// Fetches that failed
    pub failed: u64,
    /// Fetch results dropped because a newer trigger arrived
    pub superseded: u64,
}

#[derive(Debug, Default)]
struct SyncCounters {
    started: AtomicU64,
    applied: AtomicU64,
    failed: AtomicU64,
    superseded: AtomicU64,
}

impl SyncCounters {
    fn snapshot(&self) -> SyncStats {
        SyncStats {
            started: self.started.load(Ordering::Relaxed),
            applied: self.applied.load(Ordering::Relaxed),
            failed: self.failed.load(Ordering::Relaxed),
            superseded: self.superseded.load(Ordering::Relaxed),
        }
    }
}

/// State shared between the trigger loop and the fetch tasks
struct SyncContext {
    cache: Arc<MembershipCache>,
    backend: Arc<dyn MembershipBackend>,
    generation: AtomicU64,
    counters: SyncCounters,
    in_flight: Mutex<Option<JoinHandle<()>>>,
}

impl SyncContext {
    /// Swap in the handle of the newest fetch, aborting the one it replaces
    fn set_in_flight(&self, fetch: Option<JoinHandle<()>>) {
        let mut in_flight = self.in_flight.lock().unwrap_or_else(PoisonError::into_inner);
        if let Some(previous) = std::mem::replace(&mut *in_flight, fetch) {
            previous.abort();
        }
    }

    /// Write `ids` unless a newer trigger took over
    fn apply(&self, generation: u64, ids: HashSet<u64>) {
        if self.cache.complete_sync(generation, ids) {
            self.counters.applied.fetch_add(1, Ordering::Relaxed);
        } else {
            tracing::debug!(
                "[FavoritesSync] dropping result of superseded sync #{}",
                generation
            );
            self.counters.superseded.fetch_add(1, Ordering::Relaxed);
        }
    }

    async fn fetch(self: Arc<Self>, generation: u64, identity: Identity) {
        self.counters.started.fetch_add(1, Ordering::Relaxed);
        match self
            .backend
            .fetch_all(&identity, ContentType::all_flags())
            .await
        {
            Ok(comments) => {
                let ids = comments.iter().map(|comment| comment.id).collect();
                self.apply(generation, ids);
            }
            Err(e) => {
                self.cache.abandon_sync(generation);
                self.counters.failed.fetch_add(1, Ordering::Relaxed);
                tracing::warn!(
                    "[FavoritesSync] could not fetch favorites, keeping cached state: {}",
                    e
                );
            }
        }
    }
}

/// Background task reacting to identity changes and refresh requests
pub struct CacheSynchronizer {
    context: Arc<SyncContext>,
    refresh_tx: mpsc::UnboundedSender<()>,
    task: JoinHandle<()>,
}

impl CacheSynchronizer {
    /// Start synchronizing. Must be called inside a Tokio runtime; the
    /// current identity is synchronized right away.
    pub fn start(
        cache: Arc<MembershipCache>,
        backend: Arc<dyn MembershipBackend>,
        identity: &dyn IdentitySource,
    ) -> Self {
        let context = Arc::new(SyncContext {
            cache,
            backend,
            generation: AtomicU64::new(0),
            counters: SyncCounters::default(),
            in_flight: Mutex::new(None),
        });
        let (refresh_tx, refresh_rx) = mpsc::unbounded_channel();
        let mut identity_rx = identity.subscribe();

        // The first trigger is handled before returning so that a logged-out
        // start cannot clear optimistic writes made right after.
        let initial = identity_rx.borrow_and_update().clone();
        Self::dispatch(&context, initial);

        let task = tokio::spawn(Self::trigger_loop(
            Arc::clone(&context),
            identity_rx,
            refresh_rx,
        ));

        Self {
            context,
            refresh_tx,
            task,
        }
    }

    /// Re-fetch the list for the current identity
    pub fn force_refresh(&self) {
        if self.refresh_tx.send(()).is_err() {
            tracing::debug!("[FavoritesSync] refresh requested after synchronizer stopped");
        }
    }

    pub fn stats(&self) -> SyncStats {
        self.context.counters.snapshot()
    }

    /// Start a new generation for `identity`, superseding the running fetch
    fn dispatch(context: &Arc<SyncContext>, identity: Option<Identity>) {
        let generation = context.generation.fetch_add(1, Ordering::SeqCst) + 1;
        context.cache.begin_sync(generation);
        match identity {
            None => {
                context.set_in_flight(None);
                tracing::info!("[FavoritesSync] no identity, clearing favorites");
                context.apply(generation, HashSet::new());
            }
            Some(identity) => {
                tracing::info!("[FavoritesSync] starting sync #{} for {:?}", generation, identity);
                let fetch = Arc::clone(context).fetch(generation, identity);
                context.set_in_flight(Some(tokio::spawn(fetch)));
            }
        }
    }

    async fn trigger_loop(
        context: Arc<SyncContext>,
        mut identity_rx: watch::Receiver<Option<Identity>>,
        mut refresh_rx: mpsc::UnboundedReceiver<()>,
    ) {
        loop {
            tokio::select! {
                changed = identity_rx.changed() => {
                    if changed.is_err() {
                        tracing::debug!("[FavoritesSync] identity source closed, stopping");
                        break;
                    }
                }
                request = refresh_rx.recv() => {
                    if request.is_none() {
                        break;
                    }
                }
            }

            let identity = identity_rx.borrow_and_update().clone();
            Self::dispatch(&context, identity);
        }
    }
}

impl Drop for CacheSynchronizer {
    fn drop(&mut self) {
        self.task.abort();
        self.context.set_in_flight(None);
    }
}
