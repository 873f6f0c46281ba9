//! Share-target normalization
//!
//! An installed web app can register itself as a share target, and the
//! operating system then posts a `title`/`text`/`url` trio to it. Browsers
//! disagree on which field carries the link: most put it in `text`, some in
//! `url`, a few only in `title`. [`ShareTargetNormalizer`] resolves that with
//! a fixed precedence of `url` > `text` > `title`.

use crate::bookmark::NewBookmark;
use crate::error::ShareError;
use crate::tracking::{TrackingStripper, UtmStripper};
use crate::validate::{AbsoluteUrlValidator, UrlValidator};
use serde::{Deserialize, Serialize};

/// Raw share payload as posted by the browser.
///
/// Every field is optional and defaults to an empty string; none of them is
/// trusted to hold a URL, not even `url`.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ShareTargetPayload {
    pub title: String,
    pub text: String,
    pub url: String,
}

/// Turns a [`ShareTargetPayload`] into a [`NewBookmark`].
///
/// The URL check and the tracking-parameter cleanup are injected so either
/// can be swapped out in tests.
#[derive(Debug, Clone)]
pub struct ShareTargetNormalizer<V = AbsoluteUrlValidator, S = UtmStripper> {
    validator: V,
    stripper: S,
}

impl ShareTargetNormalizer {
    /// Normalizer with the stock URL check and `utm_*` stripping
    pub fn standard() -> Self {
        Self::new(AbsoluteUrlValidator, UtmStripper::new())
    }
}

impl Default for ShareTargetNormalizer {
    fn default() -> Self {
        Self::standard()
    }
}

impl<V, S> ShareTargetNormalizer<V, S>
where
    V: UrlValidator,
    S: TrackingStripper,
{
    /// Create a normalizer from explicit strategies
    pub fn new(validator: V, stripper: S) -> Self {
        Self {
            validator,
            stripper,
        }
    }

    /// Resolve which field holds the shared link and build the bookmark.
    ///
    /// An all-blank payload is not rejected here: it yields a bookmark with
    /// an empty URL and title, and the caller decides what to do with it.
    ///
    /// # Errors
    ///
    /// Returns [`ShareError::InvalidUrl`] when the finally selected URL cannot
    /// be parsed by the tracking stripper, whichever field it came from.
    pub fn normalize(&self, payload: ShareTargetPayload) -> Result<NewBookmark, ShareError> {
        let ShareTargetPayload {
            mut title,
            mut text,
            mut url,
        } = payload;

        if !self.validator.is_valid(&url) {
            if self.validator.is_valid(&text) {
                // The text was nothing but the link
                url = std::mem::take(&mut text);
            } else if self.validator.is_valid(&title) {
                // Title keeps the link, there is nothing better to show
                url = title.clone();
            }
        }

        let title_from_url = title.trim().is_empty();

        let url = self.stripper.strip(&url)?;
        if title_from_url {
            title = url.clone();
        }

        tracing::trace!(url = %url, title = %title, "normalized share target payload");

        Ok(NewBookmark {
            url,
            title,
            excerpt: text,
            tags: Vec::new(),
        })
    }
}
