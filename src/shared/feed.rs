//! Feed request and response types
//!
//! Request-side types ([`FeedFilter`], [`FeedQuery`]) are built per call and
//! never mutated afterwards. Response-side types mirror the JSON returned by
//! both feed backends.

use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;
use std::fmt;

/// Content rating of an item. Each variant owns one bit of the flags mask.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum ContentType {
    Sfw,
    Nsfw,
    Nsfl,
    Nsfp,
}

/// Set of content types requested for a feed
pub type ContentTypeSet = BTreeSet<ContentType>;

impl ContentType {
    pub const ALL: [ContentType; 4] = [
        ContentType::Sfw,
        ContentType::Nsfw,
        ContentType::Nsfl,
        ContentType::Nsfp,
    ];

    /// Bit assigned to this content type
    pub fn flag(self) -> u32 {
        match self {
            ContentType::Sfw => 1,
            ContentType::Nsfw => 2,
            ContentType::Nsfl => 4,
            ContentType::Nsfp => 8,
        }
    }

    /// OR together the bits of all given content types. The empty set yields 0.
    pub fn combine<I>(types: I) -> u32
    where
        I: IntoIterator,
        I::Item: std::borrow::Borrow<ContentType>,
    {
        use std::borrow::Borrow;
        types.into_iter().fold(0, |mask, ct| mask | ct.borrow().flag())
    }

    /// Mask covering every content type
    pub fn all_flags() -> u32 {
        Self::combine(Self::ALL)
    }
}

/// Kind of feed being requested
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum FeedType {
    #[default]
    New,
    Promoted,
    Premium,
    Random,
    BestOf,
    Controversial,
    Text,
}

impl FeedType {
    pub fn name(self) -> &'static str {
        match self {
            FeedType::New => "new",
            FeedType::Promoted => "promoted",
            FeedType::Premium => "premium",
            FeedType::Random => "random",
            FeedType::BestOf => "bestof",
            FeedType::Controversial => "controversial",
            FeedType::Text => "text",
        }
    }
}

impl fmt::Display for FeedType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// What to show in a feed
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct FeedFilter {
    pub feed_type: FeedType,
    /// Raw tag expression, a leading `?` marks an advanced query
    pub tags: Option<String>,
    pub username: Option<String>,
    /// Show the items liked by this user
    pub likes: Option<String>,
}

impl FeedFilter {
    pub fn new(feed_type: FeedType) -> Self {
        Self {
            feed_type,
            ..Self::default()
        }
    }

    pub fn with_tags(mut self, tags: impl Into<String>) -> Self {
        self.tags = Some(tags.into());
        self
    }

    pub fn with_username(mut self, username: impl Into<String>) -> Self {
        self.username = Some(username.into());
        self
    }

    pub fn with_likes(mut self, likes: impl Into<String>) -> Self {
        self.likes = Some(likes.into());
        self
    }
}

/// A single feed request: filter, content types and pagination cursors
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct FeedQuery {
    pub filter: FeedFilter,
    pub content_types: ContentTypeSet,
    /// Load items newer than this id
    pub newer: Option<u64>,
    /// Load items older than this id
    pub older: Option<u64>,
    /// Load the page around this id
    pub around: Option<u64>,
}

impl FeedQuery {
    pub fn new(filter: FeedFilter, content_types: impl IntoIterator<Item = ContentType>) -> Self {
        Self {
            filter,
            content_types: content_types.into_iter().collect(),
            ..Self::default()
        }
    }

    pub fn newer(mut self, id: u64) -> Self {
        self.newer = Some(id);
        self
    }

    pub fn older(mut self, id: u64) -> Self {
        self.older = Some(id);
        self
    }

    pub fn around(mut self, id: u64) -> Self {
        self.around = Some(id);
        self
    }
}

/// One page of feed items
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct FeedPage {
    pub items: Vec<FeedItem>,
    pub at_end: bool,
    pub at_start: bool,
    pub error: Option<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct FeedItem {
    pub id: u64,
    /// Promotion id, 0 when the item is not promoted
    pub promoted: u64,
    pub up: i32,
    pub down: i32,
    /// Unix timestamp in seconds
    pub created: i64,
    pub image: String,
    pub thumb: String,
    pub fullsize: String,
    pub user: String,
    pub mark: i32,
    pub flags: u32,
}

/// Details of a single item
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Post {
    pub tags: Vec<PostTag>,
    pub comments: Vec<PostComment>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct PostTag {
    pub id: u64,
    pub confidence: f32,
    pub tag: String,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct PostComment {
    pub id: u64,
    pub parent: u64,
    pub content: String,
    pub created: i64,
    pub up: i32,
    pub down: i32,
    pub confidence: f32,
    pub name: String,
    pub mark: i32,
}
