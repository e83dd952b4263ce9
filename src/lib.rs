//! favfeed - Client Core Library
//!
//! favfeed keeps a local view of server state correct and responsive under an
//! unreliable, multi-backend network and a changing login identity.
//!
//! # Overview
//!
//! This library provides two services:
//!
//! - **Favorite comments** ([`client::FavoritesService`]): an in-memory set of
//!   favorited comment ids, rebuilt from the server on every identity change,
//!   written optimistically by the user and published as a replay-latest
//!   snapshot stream
//! - **Feeds** ([`client::FeedService`]): compiles feed requests (content-type
//!   mask, tag expression, exclusive flags) and routes them to the canonical
//!   items API or the tag service, with transparent fallback
//!
//! # Module Structure
//!
//! - **`shared`** - Plain data types
//!   - Favorited comments, feed queries and pages
//!   - Client configuration
//!   - Backend error type
//!
//! - **`client`** - Stateful services
//!   - Identity signal
//!   - Favorites cache, synchronizer and optimistic mutator
//!   - Feed compiler and router
//!   - HTTP backends
//!
//! # Feature Flags
//!
//! - **`logging`** - enables [`init_tracing`], a `tracing-subscriber` set-up
//!   for binaries and tests
//!
//! # Thread Safety
//!
//! - Cache reads never block; mutations are serialised by one lock that
//!   covers mutate-and-publish
//! - All services are `Send + Sync` and meant to be shared through `Arc`
//! - Services that spawn background work must be created inside a Tokio runtime
//!
//! # Error Handling
//!
//! - Backend calls return `Result<T, shared::BackendError>`
//! - Synchronization and confirmation failures are logged, never surfaced
//! - Feed errors surface once, after any fallback has been tried

/// Shared types and data structures
pub mod shared;

/// Client-side services
pub mod client;

/// Install a global `tracing` subscriber.
///
/// `RUST_LOG` wins over `default_filter`. Returns an error if a subscriber is
/// already installed.
#[cfg(feature = "logging")]
pub fn init_tracing(default_filter: &str) -> Result<(), Box<dyn std::error::Error + Send + Sync>> {
    let env_filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new(default_filter));

    tracing_subscriber::fmt()
        .with_env_filter(env_filter)
        .try_init()
}
