//! Favorited comment records
//!
//! A [`FavedComment`] is what the favorite-comments service stores per
//! identity. Its `id` is the membership key used by the cache; the rest is
//! metadata for display.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Comment identifier, stable across refreshes
pub type CommentId = u64;

const THUMBNAIL_HOST: &str = "pr0gramm.com/";

/// A favorited comment as stored by the comments service
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FavedComment {
    pub id: CommentId,
    /// Item the comment was written on
    pub item_id: u64,
    /// Author name
    pub name: String,
    /// Comment body
    pub content: String,
    pub up: i32,
    pub down: i32,
    /// Author rank
    pub mark: i32,
    #[serde(with = "chrono::serde::ts_seconds")]
    pub created: DateTime<Utc>,
    /// Thumbnail URL of the item
    pub thumb: String,
    /// Content-type flags of the item
    pub flags: u32,
}

/// Inbox-style message rendered from a favorited comment
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct InboxMessage {
    pub id: CommentId,
    pub item_id: u64,
    pub name: String,
    pub message: String,
    pub score: i32,
    pub thumb: String,
    pub created: DateTime<Utc>,
    pub mark: i32,
    pub sender_id: u64,
}

impl FavedComment {
    pub fn score(&self) -> i32 {
        self.up.saturating_sub(self.down)
    }

    /// Convert into an inbox message. The service does not store the
    /// sender, so `sender_id` is always 0.
    pub fn to_inbox_message(&self) -> InboxMessage {
        InboxMessage {
            id: self.id,
            item_id: self.item_id,
            name: self.name.clone(),
            message: self.content.clone(),
            score: self.score(),
            thumb: relative_thumbnail(&self.thumb),
            created: self.created,
            mark: self.mark,
            sender_id: 0,
        }
    }
}

/// Strip everything up to the last image host prefix, keeping the path.
fn relative_thumbnail(thumb: &str) -> String {
    match thumb.rfind(THUMBNAIL_HOST) {
        Some(pos) => format!("/{}", &thumb[pos + THUMBNAIL_HOST.len()..]),
        None => thumb.to_string(),
    }
}
