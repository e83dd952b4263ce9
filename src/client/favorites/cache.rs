//! # Membership Cache
//!
//! In-memory set of favorited comment ids with copy-on-write snapshots.
//!
//! ## Concurrency
//!
//! - **Reads** (`contains`, `current_snapshot`) load the latest snapshot
//!   through an `ArcSwap` and never wait on writers.
//! - **Mutations** (`replace`, `add`, `remove`) take one exclusive lock that
//!   covers building the new set, swapping it in and publishing it, so
//!   subscribers see mutations whole and in commit order.
//! - **Subscribers** get a `watch` channel: a new subscriber starts at the
//!   latest snapshot. A slow subscriber may skip intermediate snapshots but
//!   never sees an older one after a newer one.
//!
//! Mutations that leave the set unchanged publish nothing.
//!
//! ## Sync overlay
//!
//! While a server fetch is in flight, local `add`/`remove` calls are also
//! recorded. When the fetch result is applied, the recorded writes are replayed
//! on top of it, so a response that left the server before the user acted
//! cannot erase the user's change. Only the most recently started sync is
//! accepted.

use crate::shared::CommentId;
use arc_swap::ArcSwap;
use std::collections::HashSet;
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};
use tokio::sync::watch;
use tokio_stream::wrappers::WatchStream;

/// Immutable point-in-time copy of the favorited ids
#[derive(Debug, Clone, Default)]
pub struct MembershipSnapshot {
    ids: Arc<HashSet<CommentId>>,
    /// Number of mutations committed before this snapshot
    version: u64,
}

impl MembershipSnapshot {
    pub fn contains(&self, id: CommentId) -> bool {
        self.ids.contains(&id)
    }

    pub fn len(&self) -> usize {
        self.ids.len()
    }

    pub fn is_empty(&self) -> bool {
        self.ids.is_empty()
    }

    pub fn ids(&self) -> &HashSet<CommentId> {
        &self.ids
    }

    pub fn version(&self) -> u64 {
        self.version
    }
}

impl PartialEq for MembershipSnapshot {
    fn eq(&self, other: &Self) -> bool {
        self.version == other.version && self.ids == other.ids
    }
}

impl Eq for MembershipSnapshot {}

#[derive(Debug, Clone, Copy)]
enum LocalWrite {
    Add(CommentId),
    Remove(CommentId),
}

/// Writer-side state, only touched under the write lock
#[derive(Debug, Default)]
struct WriteState {
    /// Generation of the sync whose result is still expected
    sync_in_flight: Option<u64>,
    /// Local writes made since that sync started
    local_writes: Vec<LocalWrite>,
}

/// Favorited-id cache shared by the synchronizer and the optimistic mutator
#[derive(Debug)]
pub struct MembershipCache {
    current: ArcSwap<MembershipSnapshot>,
    publisher: watch::Sender<MembershipSnapshot>,
    write_lock: Mutex<WriteState>,
}

impl MembershipCache {
    pub fn new() -> Self {
        let initial = MembershipSnapshot::default();
        let (publisher, _rx) = watch::channel(initial.clone());
        Self {
            current: ArcSwap::from_pointee(initial),
            publisher,
            write_lock: Mutex::new(WriteState::default()),
        }
    }

    /// Check membership against the latest committed set
    pub fn contains(&self, id: CommentId) -> bool {
        self.current.load().contains(id)
    }

    pub fn current_snapshot(&self) -> MembershipSnapshot {
        MembershipSnapshot::clone(&self.current.load())
    }

    /// Stream of snapshots, starting with the current one
    pub fn subscribe(&self) -> WatchStream<MembershipSnapshot> {
        WatchStream::new(self.publisher.subscribe())
    }

    /// Raw watch receiver, already positioned at the current snapshot
    pub fn watch(&self) -> watch::Receiver<MembershipSnapshot> {
        self.publisher.subscribe()
    }

    /// Replace the whole set. Returns whether a snapshot was published.
    pub fn replace(&self, ids: HashSet<CommentId>) -> bool {
        let count = ids.len();
        let published = self.mutate(|_, current| (*current != ids).then_some(ids));
        if published {
            tracing::info!("[Favorites] updating comment cache, setting {} comments", count);
        }
        published
    }

    /// Mark sync `generation` as the one whose result is expected. Any older
    /// sync is superseded and local writes start being recorded.
    pub(crate) fn begin_sync(&self, generation: u64) {
        let mut state = self.lock_state();
        state.sync_in_flight = Some(generation);
        state.local_writes.clear();
    }

    /// Apply the result of sync `generation` with the local writes made since
    /// it started replayed on top. Returns `false` if the sync was superseded.
    pub(crate) fn complete_sync(&self, generation: u64, ids: HashSet<CommentId>) -> bool {
        let mut accepted = false;
        let mut replayed = 0;
        self.mutate(|state, current| {
            if state.sync_in_flight != Some(generation) {
                return None;
            }
            accepted = true;
            state.sync_in_flight = None;

            let mut next = ids;
            replayed = state.local_writes.len();
            for write in state.local_writes.drain(..) {
                match write {
                    LocalWrite::Add(id) => next.insert(id),
                    LocalWrite::Remove(id) => next.remove(&id),
                };
            }
            (*current != next).then_some(next)
        });

        if accepted {
            tracing::info!(
                "[Favorites] updating comment cache, replayed {} local changes",
                replayed
            );
        }
        accepted
    }

    /// Forget sync `generation` without touching the set
    pub(crate) fn abandon_sync(&self, generation: u64) {
        let mut state = self.lock_state();
        if state.sync_in_flight == Some(generation) {
            state.sync_in_flight = None;
            state.local_writes.clear();
        }
    }

    /// Returns `true` if the id was not present before
    pub fn add(&self, id: CommentId) -> bool {
        self.mutate(|state, current| {
            state.record(LocalWrite::Add(id));
            if current.contains(&id) {
                return None;
            }
            let mut next = current.clone();
            next.insert(id);
            Some(next)
        })
    }

    /// Returns `true` if the id was present before
    pub fn remove(&self, id: CommentId) -> bool {
        self.mutate(|state, current| {
            state.record(LocalWrite::Remove(id));
            if !current.contains(&id) {
                return None;
            }
            let mut next = current.clone();
            next.remove(&id);
            Some(next)
        })
    }

    fn lock_state(&self) -> MutexGuard<'_, WriteState> {
        self.write_lock.lock().unwrap_or_else(PoisonError::into_inner)
    }

    /// Build-swap-publish under the write lock. `change` returns `None` for
    /// a no-op.
    fn mutate(
        &self,
        change: impl FnOnce(&mut WriteState, &HashSet<CommentId>) -> Option<HashSet<CommentId>>,
    ) -> bool {
        let mut state = self.lock_state();

        let current = self.current.load_full();
        let Some(next) = change(&mut state, &current.ids) else {
            tracing::debug!("[Favorites] mutation left the cache unchanged");
            return false;
        };

        let snapshot = MembershipSnapshot {
            ids: Arc::new(next),
            version: current.version + 1,
        };
        self.current.store(Arc::new(snapshot.clone()));
        self.publisher.send_replace(snapshot);
        true
    }
}

impl WriteState {
    // A no-op write still counts, the fetched set may disagree with it.
    fn record(&mut self, write: LocalWrite) {
        if self.sync_in_flight.is_some() {
            self.local_writes.push(write);
        }
    }
}

impl Default for MembershipCache {
    fn default() -> Self {
        Self::new()
    }
}
