//! Request tracing middleware
//!
//! Every request gets a span carrying its method, path, a fresh request
//! id, the response status and the time taken. The id is echoed back in
//! the `x-request-id` response header.

use super::layer::{BoxedNext, MiddlewareLayer};
use crate::handler::BoxFuture;
use crate::request::Request;
use http::HeaderValue;
use std::time::Instant;
use tracing::{info_span, Instrument};
use uuid::Uuid;

pub const REQUEST_ID_HEADER: &str = "x-request-id";

/// Identifier assigned to a request by [`TracingLayer`]
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RequestId(String);

impl RequestId {
    pub fn new() -> Self {
        Self(Uuid::new_v4().to_string())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl Default for RequestId {
    fn default() -> Self {
        Self::new()
    }
}

#[derive(Clone, Default)]
pub struct TracingLayer {
    custom_fields: Vec<(&'static str, String)>,
}

impl TracingLayer {
    pub fn new() -> Self {
        Self::default()
    }

    /// Add a field logged with every completed request
    pub fn with_field(mut self, key: &'static str, value: impl Into<String>) -> Self {
        self.custom_fields.push((key, value.into()));
        self
    }
}

impl MiddlewareLayer for TracingLayer {
    fn call(&self, mut req: Request, next: BoxedNext) -> BoxFuture {
        let method = req.method().to_string();
        let path = req.path().to_string();
        let request_id = RequestId::new();
        req.extensions_mut().insert(request_id.clone());

        let fields = self
            .custom_fields
            .iter()
            .map(|(k, v)| format!("{}={}", k, v))
            .collect::<Vec<_>>()
            .join(" ");

        Box::pin(async move {
            let start = Instant::now();
            let span = info_span!(
                "http_request",
                method = %method,
                path = %path,
                request_id = %request_id.as_str(),
                status = tracing::field::Empty,
                duration_ms = tracing::field::Empty,
            );

            let mut response = next(req).instrument(span.clone()).await;

            let status = response.status();
            let duration_ms = start.elapsed().as_millis() as u64;
            span.record("status", status.as_u16());
            span.record("duration_ms", duration_ms);

            let _enter = span.enter();
            if status.is_server_error() {
                tracing::error!(status = status.as_u16(), duration_ms, fields = %fields, "Request failed");
            } else if status.is_client_error() {
                tracing::warn!(status = status.as_u16(), duration_ms, fields = %fields, "Request rejected");
            } else {
                tracing::info!(status = status.as_u16(), duration_ms, fields = %fields, "Request completed");
            }

            if let Ok(value) = HeaderValue::from_str(request_id.as_str()) {
                response.headers_mut().insert(REQUEST_ID_HEADER, value);
            }

            response
        })
    }

    fn clone_box(&self) -> Box<dyn MiddlewareLayer> {
        Box::new(self.clone())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::middleware::LayerStack;
    use crate::response::IntoResponse;
    use bytes::Bytes;
    use http::{Extensions, StatusCode};
    use std::sync::Arc;

    fn request() -> Request {
        let (parts, _) = http::Request::builder()
            .uri("/api/v1/pwa/share-target")
            .body(())
            .unwrap()
            .into_parts();
        Request::new(parts, Bytes::new(), Arc::new(Extensions::new()))
    }

    #[tokio::test]
    async fn test_request_id_is_visible_to_handler_and_client() {
        let mut stack = LayerStack::new();
        stack.push(Box::new(TracingLayer::new().with_field("service", "stashmark")));

        let handler: BoxedNext = Arc::new(|req: Request| {
            let seen = req
                .extensions()
                .get::<RequestId>()
                .map(|id| id.as_str().to_string())
                .unwrap_or_default();
            Box::pin(async move { (StatusCode::CREATED, seen).into_response() }) as BoxFuture
        });

        let response = stack.execute(request(), handler).await;

        assert_eq!(response.status(), StatusCode::CREATED);
        let header = response.headers()[REQUEST_ID_HEADER].to_str().unwrap();
        assert_eq!(header.len(), 36);
    }

    #[test]
    fn test_request_ids_are_unique() {
        assert_ne!(RequestId::new(), RequestId::new());
    }
}
