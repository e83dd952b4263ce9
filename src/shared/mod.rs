//! Shared Module
//!
//! This module contains the plain data types exchanged with the backends and
//! handed to callers: favorited comments, feed requests and pages, client
//! configuration and the backend error type.
//!
//! # Overview
//!
//! The shared module holds no state and performs no I/O. All wire types are
//! serde-serialisable.

/// Favorited comment records
pub mod comment;

/// Feed request and response types
pub mod feed;

/// Shared error types
pub mod error;

/// Client configuration
pub mod config;

/// Re-export commonly used types for convenience
pub use comment::{CommentId, FavedComment, InboxMessage};
pub use config::{ClientConfig, ClientConfigBuilder, ConfigError};
pub use error::BackendError;
pub use feed::{
    ContentType, ContentTypeSet, FeedFilter, FeedItem, FeedPage, FeedQuery, FeedType, Post,
};
