//! Error types for the share-target pipeline

use thiserror::Error;

/// Problems with what the client submitted.
///
/// These are recoverable and map to a 4xx response; nothing is retried.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ShareError {
    /// The resolved URL could not be parsed by the tracking stripper
    #[error("invalid URL {url:?}: {reason}")]
    InvalidUrl {
        /// The offending input, as it reached the stripper
        url: String,
        /// Parser message
        reason: String,
    },

    /// None of the submitted fields produced a URL
    #[error("a URL is required to create a bookmark")]
    MissingUrl,
}

impl ShareError {
    /// Create an [`ShareError::InvalidUrl`] from any displayable parse error
    pub fn invalid_url(url: impl Into<String>, reason: impl ToString) -> Self {
        Self::InvalidUrl {
            url: url.into(),
            reason: reason.to_string(),
        }
    }
}

/// Failures reported by a [`BookmarkStore`](crate::BookmarkStore).
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum StoreError {
    /// The store refused the record
    #[error("bookmark rejected: {0}")]
    Rejected(String),

    /// The store could not be reached or its state is unusable
    #[error("bookmark store unavailable: {0}")]
    Unavailable(String),

    /// The store reported success but created nothing
    #[error("bookmark store saved no records")]
    NothingSaved,
}

/// Outcome of a failed share submission.
///
/// The split is deliberate: `Rejected` is the client's fault and is
/// reported as such, `Fatal` means the storage layer misbehaved and the
/// request has to be aborted.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum SubmitError {
    /// Malformed share input
    #[error(transparent)]
    Rejected(#[from] ShareError),

    /// Persistence failed
    #[error("failed to save bookmark: {0}")]
    Fatal(#[source] StoreError),
}

impl SubmitError {
    /// Whether this error must be escalated instead of reported to the client
    pub fn is_fatal(&self) -> bool {
        matches!(self, Self::Fatal(_))
    }
}
