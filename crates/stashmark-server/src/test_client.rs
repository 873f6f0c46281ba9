//! In-process client for integration tests
//!
//! Requests go through the same middleware, routing and body limit as the
//! real server, without binding a socket.
//!
//! ```rust,ignore
//! let client = TestClient::new(app);
//! client
//!     .post_form("/api/v1/pwa/share-target", "url=https%3A%2F%2Fexample.com")
//!     .await
//!     .assert_status(StatusCode::CREATED);
//! ```

use crate::app::App;
use crate::error::ApiError;
use crate::response::Response;
use crate::server::Pipeline;
use bytes::Bytes;
use http::{header, HeaderMap, HeaderValue, Method, StatusCode};
use http_body_util::BodyExt;
use serde::de::DeserializeOwned;

pub struct TestClient {
    pipeline: Pipeline,
}

impl TestClient {
    pub fn new(app: App) -> Self {
        Self {
            pipeline: app.into_pipeline(),
        }
    }

    pub async fn get(&self, path: &str) -> TestResponse {
        self.request(TestRequest::get(path)).await
    }

    /// POST an already encoded `application/x-www-form-urlencoded` body
    pub async fn post_form(&self, path: &str, body: &str) -> TestResponse {
        self.request(TestRequest::post(path).form(body)).await
    }

    pub async fn request(&self, req: TestRequest) -> TestResponse {
        let mut builder = http::Request::builder().method(req.method).uri(req.path.as_str());
        if let Some(headers) = builder.headers_mut() {
            headers.extend(req.headers);
        }

        let (parts, _) = match builder.body(()) {
            Ok(request) => request.into_parts(),
            Err(e) => panic!("invalid test request for {}: {}", req.path, e),
        };

        let body = req.body.unwrap_or_default();
        let limit = self.pipeline.body_limit();
        let body = if body.len() > limit {
            Err(ApiError::payload_too_large(limit))
        } else {
            Ok(body)
        };

        TestResponse::from_response(self.pipeline.dispatch(parts, body).await).await
    }
}

#[derive(Debug, Clone)]
pub struct TestRequest {
    method: Method,
    path: String,
    headers: HeaderMap,
    body: Option<Bytes>,
}

impl TestRequest {
    pub fn new(method: Method, path: &str) -> Self {
        Self {
            method,
            path: path.to_string(),
            headers: HeaderMap::new(),
            body: None,
        }
    }

    pub fn get(path: &str) -> Self {
        Self::new(Method::GET, path)
    }

    pub fn post(path: &str) -> Self {
        Self::new(Method::POST, path)
    }

    /// Add a header; invalid names or values are ignored
    pub fn header(mut self, key: &str, value: &str) -> Self {
        if let (Ok(name), Ok(val)) = (
            key.parse::<http::header::HeaderName>(),
            HeaderValue::from_str(value),
        ) {
            self.headers.insert(name, val);
        }
        self
    }

    pub fn form(self, encoded: &str) -> Self {
        self.content_type("application/x-www-form-urlencoded")
            .body(encoded.to_string())
    }

    pub fn body(mut self, body: impl Into<Bytes>) -> Self {
        self.body = Some(body.into());
        self
    }

    pub fn content_type(self, content_type: &str) -> Self {
        self.header(header::CONTENT_TYPE.as_str(), content_type)
    }
}

#[derive(Debug)]
pub struct TestResponse {
    status: StatusCode,
    headers: HeaderMap,
    body: Bytes,
}

impl TestResponse {
    async fn from_response(response: Response) -> Self {
        let (parts, body) = response.into_parts();
        let body = body
            .collect()
            .await
            .map(|collected| collected.to_bytes())
            .unwrap_or_default();

        Self {
            status: parts.status,
            headers: parts.headers,
            body,
        }
    }

    pub fn status(&self) -> StatusCode {
        self.status
    }

    pub fn headers(&self) -> &HeaderMap {
        &self.headers
    }

    pub fn header(&self, key: &str) -> Option<&str> {
        self.headers.get(key).and_then(|v| v.to_str().ok())
    }

    pub fn body(&self) -> &Bytes {
        &self.body
    }

    pub fn text(&self) -> String {
        String::from_utf8_lossy(&self.body).to_string()
    }

    pub fn json<T: DeserializeOwned>(&self) -> Result<T, serde_json::Error> {
        serde_json::from_slice(&self.body)
    }

    pub fn assert_status(&self, expected: StatusCode) -> &Self {
        assert_eq!(
            self.status,
            expected,
            "Expected status {}, got {}. Body: {}",
            expected,
            self.status,
            self.text()
        );
        self
    }

    pub fn assert_header(&self, key: &str, expected: &str) -> &Self {
        let actual = self.header(key).unwrap_or("");
        assert_eq!(
            actual, expected,
            "Expected header '{}' to be '{}', got '{}'",
            key, expected, actual
        );
        self
    }

    pub fn assert_body_contains(&self, expected: &str) -> &Self {
        let text = self.text();
        assert!(
            text.contains(expected),
            "Expected body to contain '{}', got '{}'",
            expected,
            text
        );
        self
    }
}
