//! In-process bookmark store

use super::BookmarkStore;
use crate::bookmark::{Bookmark, NewBookmark};
use crate::error::StoreError;
use async_trait::async_trait;
use std::collections::HashMap;
use std::sync::{Arc, RwLock};
use std::time::{SystemTime, UNIX_EPOCH};

#[derive(Debug, Default)]
struct Inner {
    bookmarks: HashMap<u64, Bookmark>,
    last_id: u64,
}

/// Bookmarks kept in memory behind a lock; ids start at 1.
///
/// Cloning is cheap and every clone sees the same records.
#[derive(Debug, Clone, Default)]
pub struct MemoryBookmarkStore {
    inner: Arc<RwLock<Inner>>,
}

impl MemoryBookmarkStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Look up a bookmark by id
    pub fn get(&self, id: u64) -> Option<Bookmark> {
        self.inner
            .read()
            .ok()
            .and_then(|inner| inner.bookmarks.get(&id).cloned())
    }

    /// All bookmarks ordered by id
    pub fn list(&self) -> Vec<Bookmark> {
        let Ok(inner) = self.inner.read() else {
            return Vec::new();
        };
        let mut result: Vec<Bookmark> = inner.bookmarks.values().cloned().collect();
        result.sort_by_key(|b| b.id);
        result
    }

    pub fn len(&self) -> usize {
        self.inner.read().map(|inner| inner.bookmarks.len()).unwrap_or(0)
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

#[async_trait]
impl BookmarkStore for MemoryBookmarkStore {
    async fn save_bookmarks(
        &self,
        create_new: bool,
        bookmarks: Vec<NewBookmark>,
    ) -> Result<Vec<Bookmark>, StoreError> {
        if let Some(empty) = bookmarks.iter().position(|b| b.url.is_empty()) {
            return Err(StoreError::Rejected(format!(
                "bookmark #{} has an empty URL",
                empty
            )));
        }

        let mut guard = self
            .inner
            .write()
            .map_err(|e| StoreError::Unavailable(e.to_string()))?;
        let inner = &mut *guard;
        let now = unix_now();
        let mut saved = Vec::with_capacity(bookmarks.len());

        for new in bookmarks {
            let existing = if create_new {
                None
            } else {
                inner
                    .bookmarks
                    .values_mut()
                    .find(|b| b.url == new.url)
            };

            let bookmark = match existing {
                Some(stored) => {
                    stored.title = new.title;
                    stored.excerpt = new.excerpt;
                    stored.tags = new.tags;
                    stored.modified_at = now;
                    stored.clone()
                }
                None => {
                    inner.last_id += 1;
                    let bookmark = Bookmark::from_new(inner.last_id, new, now);
                    inner.bookmarks.insert(bookmark.id, bookmark.clone());
                    bookmark
                }
            };

            tracing::debug!(id = bookmark.id, url = %bookmark.url, "bookmark saved");
            saved.push(bookmark);
        }

        Ok(saved)
    }
}

fn unix_now() -> u64 {
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map(|d| d.as_secs())
        .unwrap_or(0)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn new_bookmark(url: &str, title: &str) -> NewBookmark {
        NewBookmark {
            url: url.to_string(),
            title: title.to_string(),
            ..Default::default()
        }
    }

    #[tokio::test]
    async fn test_assigns_sequential_ids() {
        let store = MemoryBookmarkStore::new();
        let saved = store
            .save_bookmarks(
                true,
                vec![
                    new_bookmark("https://example.com/1", "one"),
                    new_bookmark("https://example.com/2", "two"),
                ],
            )
            .await
            .unwrap();

        assert_eq!(saved.iter().map(|b| b.id).collect::<Vec<_>>(), vec![1, 2]);
        assert_eq!(store.len(), 2);
        assert_eq!(store.get(2).unwrap().title, "two");
    }

    #[tokio::test]
    async fn test_create_new_duplicates_urls() {
        let store = MemoryBookmarkStore::new();
        let url = "https://example.com/dup";
        store.save_bookmarks(true, vec![new_bookmark(url, "a")]).await.unwrap();
        store.save_bookmarks(true, vec![new_bookmark(url, "b")]).await.unwrap();

        assert_eq!(store.len(), 2);
    }

    #[tokio::test]
    async fn test_update_existing_url() {
        let store = MemoryBookmarkStore::new();
        let url = "https://example.com/same";
        store.save_bookmarks(true, vec![new_bookmark(url, "old")]).await.unwrap();
        let saved = store
            .save_bookmarks(false, vec![new_bookmark(url, "new")])
            .await
            .unwrap();

        assert_eq!(saved[0].id, 1);
        assert_eq!(store.len(), 1);
        assert_eq!(store.list()[0].title, "new");
    }

    #[tokio::test]
    async fn test_rejects_empty_url() {
        let store = MemoryBookmarkStore::new();
        let err = store
            .save_bookmarks(true, vec![new_bookmark("", "")])
            .await
            .unwrap_err();

        assert!(matches!(err, StoreError::Rejected(_)));
        assert!(store.is_empty());
    }

    #[tokio::test]
    async fn test_clones_share_records() {
        let store = MemoryBookmarkStore::new();
        let other = store.clone();
        store
            .save_bookmarks(true, vec![new_bookmark("https://example.com", "x")])
            .await
            .unwrap();

        assert_eq!(other.len(), 1);
    }
}
