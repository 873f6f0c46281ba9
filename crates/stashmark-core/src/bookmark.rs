//! Bookmark records

use serde::{Deserialize, Serialize};

/// A tag attached to a bookmark
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Tag {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub id: Option<u64>,
    pub name: String,
}

/// A bookmark about to be created.
///
/// This is what the share-target normalizer produces and what a
/// [`BookmarkStore`](crate::BookmarkStore) receives by value.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct NewBookmark {
    pub url: String,
    pub title: String,
    pub excerpt: String,
    pub tags: Vec<Tag>,
}

/// A stored bookmark, identity assigned by the store
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Bookmark {
    pub id: u64,
    pub url: String,
    pub title: String,
    pub excerpt: String,
    pub tags: Vec<Tag>,
    /// Unix seconds
    pub created_at: u64,
    /// Unix seconds
    pub modified_at: u64,
}

impl Bookmark {
    pub(crate) fn from_new(id: u64, new: NewBookmark, now: u64) -> Self {
        Self {
            id,
            url: new.url,
            title: new.title,
            excerpt: new.excerpt,
            tags: new.tags,
            created_at: now,
            modified_at: now,
        }
    }
}
