//! Embedded front-end assets
//!
//! Everything under `view/` is compiled into the binary. [`AssetServer`]
//! serves the `assets/` subdirectory under the `/assets` URL prefix; the
//! index template at the root of `view/` is rendered separately by the
//! front-end routes.

use crate::error::ApiError;
use crate::response::Response;
use bytes::Bytes;
use http::{header, HeaderMap, StatusCode};
use http_body_util::Full;
use rust_embed::RustEmbed;
use std::borrow::Cow;
use std::sync::Arc;

/// A file ready to be served
#[derive(Debug, Clone)]
pub struct Asset {
    pub data: Cow<'static, [u8]>,
    /// Quoted entity tag derived from the file contents
    pub etag: String,
    /// Seconds since the Unix epoch
    pub last_modified: Option<u64>,
}

/// Where asset bytes come from
pub trait AssetSource: Send + Sync {
    /// Look up `path`, relative to the source root
    fn open(&self, path: &str) -> Option<Asset>;
}

#[derive(RustEmbed)]
#[folder = "view/"]
struct ViewFiles;

/// Files compiled in from the crate's `view/` directory
#[derive(Debug, Clone, Copy, Default)]
pub struct EmbeddedAssets;

impl AssetSource for EmbeddedAssets {
    fn open(&self, path: &str) -> Option<Asset> {
        let file = <ViewFiles as RustEmbed>::get(path)?;
        Some(Asset {
            etag: etag_for_digest(&file.metadata.sha256_hash()),
            last_modified: file.metadata.last_modified(),
            data: file.data,
        })
    }
}

fn etag_for_digest(digest: &[u8]) -> String {
    let hex: String = digest.iter().take(16).map(|b| format!("{:02x}", b)).collect();
    format!("\"{}\"", hex)
}

#[derive(Debug, Clone)]
pub struct AssetConfig {
    /// URL prefix the assets are mounted under
    pub prefix: String,
    /// Directory inside the source that holds the assets
    pub root: String,
    /// Request paths served with caching disabled (service worker scripts)
    pub no_cache_paths: Vec<String>,
    /// Value of `Service-Worker-Allowed` for the no-cache paths
    pub service_worker_scope: String,
    /// `Cache-Control` max-age in seconds; 0 omits the header
    pub max_age: u64,
    pub etag: bool,
}

impl Default for AssetConfig {
    fn default() -> Self {
        Self {
            prefix: "/assets".to_string(),
            root: "assets".to_string(),
            no_cache_paths: vec!["/assets/js/sw.js".to_string()],
            service_worker_scope: "/".to_string(),
            max_age: 3600,
            etag: true,
        }
    }
}

impl AssetConfig {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn service_worker_scope(mut self, scope: impl Into<String>) -> Self {
        self.service_worker_scope = scope.into();
        self
    }

    pub fn max_age(mut self, seconds: u64) -> Self {
        self.max_age = seconds;
        self
    }

    pub fn etag(mut self, enabled: bool) -> Self {
        self.etag = enabled;
        self
    }
}

/// Serves files from an [`AssetSource`] according to an [`AssetConfig`]
#[derive(Clone)]
pub struct AssetServer {
    config: Arc<AssetConfig>,
    source: Arc<dyn AssetSource>,
}

impl AssetServer {
    pub fn new(config: AssetConfig, source: impl AssetSource + 'static) -> Self {
        Self {
            config: Arc::new(config),
            source: Arc::new(source),
        }
    }

    /// Serve `relative_path` (the part of the URL after the prefix)
    pub fn serve(&self, relative_path: &str, headers: &HeaderMap) -> Result<Response, ApiError> {
        let clean_path = sanitize_path(relative_path);
        let asset = if clean_path.is_empty() {
            None
        } else {
            self.source.open(&self.source_path(&clean_path))
        };

        let Some(asset) = asset else {
            tracing::error!(
                path = %relative_path,
                prefix = %self.config.prefix,
                "asset not found"
            );
            return Err(ApiError::not_found(format!(
                "File not found: {}/{}",
                self.config.prefix, clean_path
            )));
        };

        let etag = self.config.etag.then_some(asset.etag.as_str());
        if let Some(etag) = etag {
            if if_none_match(headers, etag) {
                return http::Response::builder()
                    .status(StatusCode::NOT_MODIFIED)
                    .header(header::ETAG, etag)
                    .body(Full::new(Bytes::new()))
                    .map_err(|e| ApiError::internal(format!("Failed to build response: {}", e)));
            }
        }

        let extension = clean_path.rsplit_once('.').map(|(_, ext)| ext).unwrap_or("");
        let mut builder = http::Response::builder()
            .status(StatusCode::OK)
            .header(header::CONTENT_TYPE, mime_type_for_extension(extension))
            .header(header::CONTENT_LENGTH, asset.data.len());

        if let Some(etag) = etag {
            builder = builder.header(header::ETAG, etag);
        }
        if let Some(modified) = asset.last_modified {
            builder = builder.header(header::LAST_MODIFIED, format_http_date(modified));
        }
        if self.config.max_age > 0 {
            builder = builder.header(
                header::CACHE_CONTROL,
                format!("public, max-age={}", self.config.max_age),
            );
        }

        let body = match asset.data {
            Cow::Borrowed(bytes) => Bytes::from_static(bytes),
            Cow::Owned(bytes) => Bytes::from(bytes),
        };

        builder
            .body(Full::new(body))
            .map_err(|e| ApiError::internal(format!("Failed to build response: {}", e)))
    }

    fn source_path(&self, clean_path: &str) -> String {
        let root = self.config.root.trim_matches('/');
        if root.is_empty() {
            clean_path.to_string()
        } else {
            format!("{}/{}", root, clean_path)
        }
    }
}

impl std::fmt::Debug for AssetServer {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AssetServer")
            .field("config", &self.config)
            .finish_non_exhaustive()
    }
}

fn if_none_match(headers: &HeaderMap, etag: &str) -> bool {
    headers
        .get_all(header::IF_NONE_MATCH)
        .iter()
        .filter_map(|value| value.to_str().ok())
        .flat_map(|value| value.split(','))
        .map(str::trim)
        .any(|candidate| candidate == "*" || candidate.trim_start_matches("W/") == etag)
}

/// Drop empty, `.` and `..` segments and anything containing a backslash
fn sanitize_path(path: &str) -> String {
    path.split('/')
        .filter(|part| !part.is_empty() && *part != "." && *part != ".." && !part.contains('\\'))
        .collect::<Vec<_>>()
        .join("/")
}

fn mime_type_for_extension(extension: &str) -> &'static str {
    match extension.to_ascii_lowercase().as_str() {
        "html" | "htm" => "text/html; charset=utf-8",
        "css" => "text/css; charset=utf-8",
        "js" | "mjs" => "text/javascript; charset=utf-8",
        "json" => "application/json",
        "webmanifest" => "application/manifest+json",
        "txt" => "text/plain; charset=utf-8",
        "png" => "image/png",
        "jpg" | "jpeg" => "image/jpeg",
        "gif" => "image/gif",
        "webp" => "image/webp",
        "svg" => "image/svg+xml",
        "ico" => "image/x-icon",
        "woff" => "font/woff",
        "woff2" => "font/woff2",
        "ttf" => "font/ttf",
        "wasm" => "application/wasm",
        _ => "application/octet-stream",
    }
}

/// IMF-fixdate, e.g. `Sun, 06 Nov 1994 08:49:37 GMT`
fn format_http_date(secs: u64) -> String {
    const DAYS: [&str; 7] = ["Thu", "Fri", "Sat", "Sun", "Mon", "Tue", "Wed"];
    const MONTHS: [&str; 12] = [
        "Jan", "Feb", "Mar", "Apr", "May", "Jun", "Jul", "Aug", "Sep", "Oct", "Nov", "Dec",
    ];

    let days = secs / 86_400;
    let time = secs % 86_400;
    let (year, month, day) = civil_from_days(days as i64);

    format!(
        "{}, {:02} {} {} {:02}:{:02}:{:02} GMT",
        DAYS[(days % 7) as usize],
        day,
        MONTHS[(month - 1) as usize],
        year,
        time / 3600,
        (time % 3600) / 60,
        time % 60
    )
}

/// Days since 1970-01-01 to (year, month, day), proleptic Gregorian
fn civil_from_days(days: i64) -> (i64, u32, u32) {
    let z = days + 719_468;
    let era = z.div_euclid(146_097);
    let doe = z.rem_euclid(146_097);
    let yoe = (doe - doe / 1460 + doe / 36_524 - doe / 146_096) / 365;
    let doy = doe - (365 * yoe + yoe / 4 - yoe / 100);
    let mp = (5 * doy + 2) / 153;
    let day = (doy - (153 * mp + 2) / 5 + 1) as u32;
    let month = (if mp < 10 { mp + 3 } else { mp - 9 }) as u32;
    let year = yoe + era * 400 + i64::from(month <= 2);
    (year, month, day)
}

#[cfg(test)]
mod tests {
    use super::*;
    use http::HeaderValue;
    use std::collections::HashMap;

    struct MapSource(HashMap<&'static str, &'static [u8]>);

    impl AssetSource for MapSource {
        fn open(&self, path: &str) -> Option<Asset> {
            self.0.get(path).map(|data| Asset {
                data: Cow::Borrowed(*data),
                etag: "\"abc\"".to_string(),
                last_modified: Some(784_111_777),
            })
        }
    }

    fn server(config: AssetConfig) -> AssetServer {
        AssetServer::new(
            config,
            MapSource(HashMap::from([
                ("assets/css/style.css", &b"body{}"[..]),
                ("assets/js/app.js", &b"console.log(1)"[..]),
            ])),
        )
    }

    #[test]
    fn test_sanitize_path() {
        assert_eq!(sanitize_path("css/style.css"), "css/style.css");
        assert_eq!(sanitize_path("/css//style.css"), "css/style.css");
        assert_eq!(sanitize_path("../../etc/passwd"), "etc/passwd");
        assert_eq!(sanitize_path("./js/./app.js"), "js/app.js");
        assert_eq!(sanitize_path("js/..\\..\\secret"), "js");
    }

    #[test]
    fn test_mime_types() {
        assert_eq!(mime_type_for_extension("JS"), "text/javascript; charset=utf-8");
        assert_eq!(
            mime_type_for_extension("webmanifest"),
            "application/manifest+json"
        );
        assert_eq!(mime_type_for_extension("bin"), "application/octet-stream");
    }

    #[test]
    fn test_http_date() {
        assert_eq!(format_http_date(0), "Thu, 01 Jan 1970 00:00:00 GMT");
        assert_eq!(format_http_date(784_111_777), "Sun, 06 Nov 1994 08:49:37 GMT");
        assert_eq!(format_http_date(951_782_400), "Tue, 29 Feb 2000 00:00:00 GMT");
    }

    #[test]
    fn test_serves_asset_with_cache_headers() {
        let response = server(AssetConfig::new())
            .serve("css/style.css", &HeaderMap::new())
            .unwrap();

        assert_eq!(response.status(), StatusCode::OK);
        let headers = response.headers();
        assert_eq!(headers[header::CONTENT_TYPE], "text/css; charset=utf-8");
        assert_eq!(headers[header::CONTENT_LENGTH], "6");
        assert_eq!(headers[header::ETAG], "\"abc\"");
        assert_eq!(headers[header::LAST_MODIFIED], "Sun, 06 Nov 1994 08:49:37 GMT");
        assert_eq!(headers[header::CACHE_CONTROL], "public, max-age=3600");
    }

    #[test]
    fn test_disabled_etag_and_max_age() {
        let response = server(AssetConfig::new().etag(false).max_age(0))
            .serve("js/app.js", &HeaderMap::new())
            .unwrap();

        assert!(response.headers().get(header::ETAG).is_none());
        assert!(response.headers().get(header::CACHE_CONTROL).is_none());
    }

    #[test]
    fn test_matching_etag_is_not_modified() {
        let mut headers = HeaderMap::new();
        headers.insert(header::IF_NONE_MATCH, HeaderValue::from_static("\"zzz\", \"abc\""));

        let response = server(AssetConfig::new())
            .serve("css/style.css", &headers)
            .unwrap();

        assert_eq!(response.status(), StatusCode::NOT_MODIFIED);
        assert_eq!(response.headers()[header::ETAG], "\"abc\"");
    }

    #[test]
    fn test_missing_asset_is_not_found() {
        let err = server(AssetConfig::new())
            .serve("js/missing.js", &HeaderMap::new())
            .unwrap_err();
        assert_eq!(err.status, StatusCode::NOT_FOUND);

        let err = server(AssetConfig::new())
            .serve("../", &HeaderMap::new())
            .unwrap_err();
        assert_eq!(err.status, StatusCode::NOT_FOUND);
    }

    #[test]
    fn test_embedded_service_worker_exists() {
        let asset = EmbeddedAssets.open("assets/js/sw.js").unwrap();
        assert!(!asset.data.is_empty());
        assert!(asset.etag.starts_with('"') && asset.etag.ends_with('"'));
    }

    mod sanitize_props {
        use super::super::sanitize_path;
        use proptest::prelude::*;

        proptest! {
            #[test]
            fn never_escapes_root(segments in prop::collection::vec(
                prop_oneof![Just("..".to_string()), Just(".".to_string()), Just(String::new()), "[a-z\\\\.]{1,6}"],
                0..8,
            )) {
                let cleaned = sanitize_path(&segments.join("/"));

                prop_assert!(!cleaned.starts_with('/'));
                prop_assert!(!cleaned.contains('\\'));
                for part in cleaned.split('/').filter(|p| !p.is_empty()) {
                    prop_assert!(part != ".." && part != ".");
                }
            }
        }
    }
}
