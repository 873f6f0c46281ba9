//! Share submission: normalize, then persist

use crate::bookmark::Bookmark;
use crate::error::{ShareError, StoreError, SubmitError};
use crate::share_target::{ShareTargetNormalizer, ShareTargetPayload};
use crate::store::BookmarkStore;
use crate::tracking::{TrackingStripper, UtmStripper};
use crate::validate::{AbsoluteUrlValidator, UrlValidator};
use std::sync::Arc;

/// Glue between the share-target route and the bookmark store.
///
/// Bad input is reported as [`SubmitError::Rejected`] before the store is
/// touched. Anything that goes wrong inside the store, including a store
/// that claims success without creating a record, is
/// [`SubmitError::Fatal`]. Nothing is retried.
pub struct ShareTargetService<V = AbsoluteUrlValidator, S = UtmStripper> {
    normalizer: ShareTargetNormalizer<V, S>,
    store: Arc<dyn BookmarkStore>,
}

impl ShareTargetService {
    /// Service using the standard normalizer
    pub fn new(store: Arc<dyn BookmarkStore>) -> Self {
        Self::with_normalizer(ShareTargetNormalizer::standard(), store)
    }
}

impl<V, S> ShareTargetService<V, S>
where
    V: UrlValidator,
    S: TrackingStripper,
{
    pub fn with_normalizer(
        normalizer: ShareTargetNormalizer<V, S>,
        store: Arc<dyn BookmarkStore>,
    ) -> Self {
        Self { normalizer, store }
    }

    /// Normalize `payload` and store it as a new bookmark.
    pub async fn submit(&self, payload: ShareTargetPayload) -> Result<Bookmark, SubmitError> {
        let bookmark = self.normalizer.normalize(payload)?;

        // The normalizer lets an all-blank share through; it is still
        // the client's mistake, not the store's.
        if bookmark.url.is_empty() {
            return Err(ShareError::MissingUrl.into());
        }

        let url = bookmark.url.clone();
        let saved = self
            .store
            .save_bookmarks(true, vec![bookmark])
            .await
            .map_err(SubmitError::Fatal)?;

        let stored = saved
            .into_iter()
            .next()
            .ok_or(SubmitError::Fatal(StoreError::NothingSaved))?;

        tracing::info!(id = stored.id, url = %url, "bookmark created from share target");
        Ok(stored)
    }
}

impl<V, S> std::fmt::Debug for ShareTargetService<V, S> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ShareTargetService").finish_non_exhaustive()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::bookmark::NewBookmark;
    use crate::store::MemoryBookmarkStore;
    use async_trait::async_trait;

    struct FailingStore(StoreError);

    #[async_trait]
    impl BookmarkStore for FailingStore {
        async fn save_bookmarks(
            &self,
            _create_new: bool,
            _bookmarks: Vec<NewBookmark>,
        ) -> Result<Vec<Bookmark>, StoreError> {
            Err(self.0.clone())
        }
    }

    struct SilentStore;

    #[async_trait]
    impl BookmarkStore for SilentStore {
        async fn save_bookmarks(
            &self,
            _create_new: bool,
            _bookmarks: Vec<NewBookmark>,
        ) -> Result<Vec<Bookmark>, StoreError> {
            Ok(Vec::new())
        }
    }

    fn shared(text: &str) -> ShareTargetPayload {
        ShareTargetPayload {
            text: text.to_string(),
            ..Default::default()
        }
    }

    #[tokio::test]
    async fn test_submit_stores_normalized_bookmark() {
        let store = MemoryBookmarkStore::new();
        let service = ShareTargetService::new(Arc::new(store.clone()));

        let saved = service
            .submit(shared("https://example.com/a?utm_source=x"))
            .await
            .unwrap();

        assert_eq!(saved.id, 1);
        assert_eq!(saved.url, "https://example.com/a");
        assert_eq!(store.get(1).unwrap().title, "https://example.com/a");
    }

    #[tokio::test]
    async fn test_invalid_input_never_reaches_store() {
        let service = ShareTargetService::new(Arc::new(FailingStore(StoreError::Unavailable(
            "should not be called".into(),
        ))));

        let err = service
            .submit(ShareTargetPayload {
                url: "not-a-url".into(),
                ..Default::default()
            })
            .await
            .unwrap_err();

        assert!(matches!(err, SubmitError::Rejected(ShareError::InvalidUrl { .. })));
    }

    #[tokio::test]
    async fn test_empty_share_is_rejected() {
        let store = MemoryBookmarkStore::new();
        let service = ShareTargetService::new(Arc::new(store.clone()));

        let err = service.submit(ShareTargetPayload::default()).await.unwrap_err();

        assert_eq!(err, SubmitError::Rejected(ShareError::MissingUrl));
        assert!(store.is_empty());
    }

    #[tokio::test]
    async fn test_store_failure_is_fatal() {
        let service = ShareTargetService::new(Arc::new(FailingStore(StoreError::Unavailable(
            "disk full".into(),
        ))));

        let err = service.submit(shared("https://example.com")).await.unwrap_err();

        assert!(err.is_fatal());
        assert_eq!(
            err,
            SubmitError::Fatal(StoreError::Unavailable("disk full".into()))
        );
    }

    #[tokio::test]
    async fn test_nothing_saved_is_fatal() {
        let service = ShareTargetService::new(Arc::new(SilentStore));

        let err = service.submit(shared("https://example.com")).await.unwrap_err();

        assert_eq!(err, SubmitError::Fatal(StoreError::NothingSaved));
    }
}
