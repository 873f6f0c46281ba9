//! Bookmark persistence contract
//!
//! The service only needs to hand freshly normalized bookmarks to some
//! store and learn what was created. Real backends live outside this
//! crate; [`MemoryBookmarkStore`] is enough for a single process and tests.

mod memory;

pub use memory::MemoryBookmarkStore;

use crate::bookmark::{Bookmark, NewBookmark};
use crate::error::StoreError;
use async_trait::async_trait;

/// Persistence backend for bookmarks.
#[async_trait]
pub trait BookmarkStore: Send + Sync {
    /// Save `bookmarks` and return the stored records.
    ///
    /// With `create_new` every entry becomes a new record. Otherwise an
    /// entry whose URL is already stored updates that record.
    async fn save_bookmarks(
        &self,
        create_new: bool,
        bookmarks: Vec<NewBookmark>,
    ) -> Result<Vec<Bookmark>, StoreError>;
}
