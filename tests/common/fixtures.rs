//! Fixture builders

use chrono::{TimeZone, Utc};
use favfeed::shared::{CommentId, FavedComment, FeedItem, FeedPage};
use std::time::Duration;

pub const WAIT: Duration = Duration::from_secs(2);

pub fn comment(id: CommentId) -> FavedComment {
    FavedComment {
        id,
        item_id: id * 10,
        name: format!("user{}", id),
        content: format!("comment {}", id),
        up: 5,
        down: 1,
        mark: 1,
        created: Utc.timestamp_opt(1_450_000_000 + id as i64, 0).unwrap(),
        thumb: format!("http://thumb.pr0gramm.com/2015/{}.jpg", id),
        flags: 1,
    }
}

/// A page whose items carry the given ids
pub fn page(ids: &[u64]) -> FeedPage {
    FeedPage {
        items: ids
            .iter()
            .map(|&id| FeedItem {
                id,
                ..FeedItem::default()
            })
            .collect(),
        ..FeedPage::default()
    }
}

pub fn item_ids(page: &FeedPage) -> Vec<u64> {
    page.items.iter().map(|item| item.id).collect()
}
