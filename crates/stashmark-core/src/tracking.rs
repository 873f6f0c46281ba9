//! Tracking-parameter removal

use crate::error::ShareError;
use url::Url;

/// Removes marketing/analytics parameters from a URL.
///
/// Implementations report input they cannot parse as
/// [`ShareError::InvalidUrl`]. An empty input is not a parse failure and
/// must come back empty.
pub trait TrackingStripper {
    /// Return `raw` without tracking parameters
    fn strip(&self, raw: &str) -> Result<String, ShareError>;
}

impl<F> TrackingStripper for F
where
    F: Fn(&str) -> Result<String, ShareError>,
{
    fn strip(&self, raw: &str) -> Result<String, ShareError> {
        self(raw)
    }
}

/// Strips every `utm_*` query parameter, plus any extra keys configured.
#[derive(Debug, Clone, Default)]
pub struct UtmStripper {
    extra_params: Vec<String>,
}

impl UtmStripper {
    /// Create a stripper that only removes `utm_*` parameters
    pub fn new() -> Self {
        Self::default()
    }

    /// Also remove the given exact parameter names (e.g. `fbclid`)
    pub fn with_params<I, S>(mut self, params: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.extra_params
            .extend(params.into_iter().map(|p| p.into().to_ascii_lowercase()));
        self
    }

    fn is_tracking_param(&self, key: &str) -> bool {
        let key = key.to_ascii_lowercase();
        key.starts_with("utm_") || self.extra_params.iter().any(|p| *p == key)
    }
}

impl TrackingStripper for UtmStripper {
    fn strip(&self, raw: &str) -> Result<String, ShareError> {
        if raw.is_empty() {
            return Ok(String::new());
        }

        let mut parsed = Url::parse(raw).map_err(|e| ShareError::invalid_url(raw, e))?;
        if parsed.host_str().map_or(true, str::is_empty) {
            return Err(ShareError::invalid_url(raw, "missing scheme or host"));
        }
        if parsed.query().is_none() {
            return Ok(parsed.into());
        }

        let kept: Vec<(String, String)> = parsed
            .query_pairs()
            .filter(|(key, _)| !self.is_tracking_param(key))
            .map(|(key, value)| (key.into_owned(), value.into_owned()))
            .collect();

        if kept.is_empty() {
            parsed.set_query(None);
        } else {
            parsed.query_pairs_mut().clear().extend_pairs(kept);
        }

        Ok(parsed.into())
    }
}
