//! Client Core Module
//!
//! Stateful client-side services that keep a local view of server state.
//!
//! # Architecture
//!
//! The client module is organized into focused submodules:
//!
//! - **`config`** - Runtime configuration and the feature-flag source
//! - **`identity`** - Replay-latest identity signal
//! - **`favorites`** - Favorite-comments cache, synchronizer and optimistic writer
//! - **`feed`** - Feed query compilation and backend routing
//! - **`api`** - Backend contracts and their HTTP clients
//!
//! # Module Structure
//!
//! ```text
//! client/
//! ├── mod.rs        - Module exports and documentation
//! ├── config.rs     - Configuration wrapper, env overrides
//! ├── identity.rs   - Identity signal
//! ├── favorites/    - MembershipCache, CacheSynchronizer, OptimisticMutator
//! ├── feed/         - FeedQueryCompiler, FeedBackendRouter, metrics
//! └── api/          - Backend traits, reqwest clients
//! ```

pub mod api;
pub mod config;
pub mod favorites;
pub mod feed;
pub mod identity;

// Re-export commonly used types
pub use config::{Config, FeatureFlagSource};
pub use favorites::{Confirmation, FavoritesService, MembershipSnapshot};
pub use feed::FeedService;
pub use identity::{Identity, IdentitySignal, IdentitySource};
