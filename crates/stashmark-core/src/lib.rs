//! # Stashmark Core
//!
//! Domain logic behind the Stashmark bookmark service.
//!
//! The interesting part lives in [`ShareTargetNormalizer`]: browsers fill the
//! `title`/`text`/`url` fields of a web app share target inconsistently, and
//! the normalizer decides which field actually carries the link before the
//! bookmark is handed to a [`BookmarkStore`].
//!
//! ```rust
//! use stashmark_core::{ShareTargetNormalizer, ShareTargetPayload};
//!
//! let payload = ShareTargetPayload {
//!     text: "https://example.com/a?utm_source=x".to_string(),
//!     ..Default::default()
//! };
//!
//! let bookmark = ShareTargetNormalizer::standard().normalize(payload).unwrap();
//! assert_eq!(bookmark.url, "https://example.com/a");
//! assert_eq!(bookmark.title, "https://example.com/a");
//! ```

mod bookmark;
mod error;
mod service;
mod share_target;
pub mod store;
mod tracking;
mod validate;

pub use bookmark::{Bookmark, NewBookmark, Tag};
pub use error::{ShareError, StoreError, SubmitError};
pub use service::ShareTargetService;
pub use share_target::{ShareTargetNormalizer, ShareTargetPayload};
pub use store::{BookmarkStore, MemoryBookmarkStore};
pub use tracking::{TrackingStripper, UtmStripper};
pub use validate::{is_valid_url, AbsoluteUrlValidator, UrlValidator};
