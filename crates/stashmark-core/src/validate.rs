//! URL validity detection
//!
//! Decides whether a free-form string is usable as a bookmark link.

use url::Url;

/// Predicate deciding whether a string holds an absolute URL.
///
/// Plain functions and closures implement it, which keeps tests of the
/// normalizer free of any real URL parsing.
pub trait UrlValidator {
    /// Return `true` when `raw` is usable as a link
    fn is_valid(&self, raw: &str) -> bool;
}

impl<F> UrlValidator for F
where
    F: Fn(&str) -> bool,
{
    fn is_valid(&self, raw: &str) -> bool {
        self(raw)
    }
}

/// The default validator: a well-formed URI with a scheme and a host.
#[derive(Debug, Clone, Copy, Default)]
pub struct AbsoluteUrlValidator;

impl UrlValidator for AbsoluteUrlValidator {
    fn is_valid(&self, raw: &str) -> bool {
        is_valid_url(raw)
    }
}

/// Check that `raw` parses as a URI with a non-empty scheme and host.
///
/// Bare words, relative paths and host-less URIs such as `mailto:` are
/// rejected.
pub fn is_valid_url(raw: &str) -> bool {
    match Url::parse(raw) {
        Ok(parsed) => {
            !parsed.scheme().is_empty() && parsed.host_str().map_or(false, |h| !h.is_empty())
        }
        Err(_) => false,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_accepts_absolute_urls() {
        assert!(is_valid_url("https://example.com"));
        assert!(is_valid_url("https://example.com/a?utm_source=x"));
        assert!(is_valid_url("http://localhost:8080/path#frag"));
        assert!(is_valid_url("ftp://files.example.org/pub"));
    }

    #[test]
    fn test_rejects_words_and_relative_paths() {
        assert!(!is_valid_url(""));
        assert!(!is_valid_url("check this out"));
        assert!(!is_valid_url("not-a-url"));
        assert!(!is_valid_url("/relative/path"));
        assert!(!is_valid_url("example.com/path"));
    }

    #[test]
    fn test_rejects_urls_without_host() {
        assert!(!is_valid_url("mailto:someone@example.com"));
        assert!(!is_valid_url("file:///etc/hosts"));
        assert!(!is_valid_url("data:text/plain,hello"));
    }

    #[test]
    fn test_closure_validator() {
        let only_short = |raw: &str| raw.len() < 4;
        assert!(only_short.is_valid("abc"));
        assert!(!only_short.is_valid("abcd"));
        assert!(AbsoluteUrlValidator.is_valid("https://example.com"));
    }
}
