//! Response types
//!
//! Handlers return anything implementing [`IntoResponse`]:
//!
//! | Type | Status | Content-Type |
//! |------|--------|--------------|
//! | `()` | 200 | - |
//! | `&'static str` / `String` | 200 | text/plain |
//! | `StatusCode` | given | - |
//! | [`Html<T>`] | 200 | text/html |
//! | [`ApiError`] | varies | application/json |
//! | `Result<T, E>` | from `T` or `E` | varies |

use crate::error::{ApiError, ErrorResponse};
use bytes::Bytes;
use http::{header, HeaderValue, StatusCode};
use http_body_util::Full;

/// HTTP Response type
pub type Response = http::Response<Full<Bytes>>;

/// Conversion into an HTTP response
pub trait IntoResponse {
    fn into_response(self) -> Response;
}

/// Build a response with a body and an optional content type
pub(crate) fn response_with(
    status: StatusCode,
    content_type: Option<&'static str>,
    body: impl Into<Bytes>,
) -> Response {
    let mut response = http::Response::new(Full::new(body.into()));
    *response.status_mut() = status;
    if let Some(content_type) = content_type {
        response
            .headers_mut()
            .insert(header::CONTENT_TYPE, HeaderValue::from_static(content_type));
    }
    response
}

impl IntoResponse for Response {
    fn into_response(self) -> Response {
        self
    }
}

impl IntoResponse for () {
    fn into_response(self) -> Response {
        response_with(StatusCode::OK, None, Bytes::new())
    }
}

impl IntoResponse for &'static str {
    fn into_response(self) -> Response {
        response_with(StatusCode::OK, Some("text/plain; charset=utf-8"), self)
    }
}

impl IntoResponse for String {
    fn into_response(self) -> Response {
        response_with(StatusCode::OK, Some("text/plain; charset=utf-8"), self)
    }
}

impl IntoResponse for StatusCode {
    fn into_response(self) -> Response {
        response_with(self, None, Bytes::new())
    }
}

impl<R: IntoResponse> IntoResponse for (StatusCode, R) {
    fn into_response(self) -> Response {
        let mut response = self.1.into_response();
        *response.status_mut() = self.0;
        response
    }
}

impl<T: IntoResponse, E: IntoResponse> IntoResponse for Result<T, E> {
    fn into_response(self) -> Response {
        match self {
            Ok(v) => v.into_response(),
            Err(e) => e.into_response(),
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let status = self.status;
        let body = serde_json::to_vec(&ErrorResponse::from(self)).unwrap_or_else(|_| {
            br#"{"error":{"type":"internal_error","message":"Failed to serialize error"}}"#.to_vec()
        });

        response_with(status, Some("application/json"), body)
    }
}

/// HTML response
#[derive(Debug, Clone)]
pub struct Html<T>(pub T);

impl<T: Into<Bytes>> IntoResponse for Html<T> {
    fn into_response(self) -> Response {
        response_with(StatusCode::OK, Some("text/html; charset=utf-8"), self.0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use http_body_util::BodyExt;

    async fn body_text(response: Response) -> String {
        let bytes = response.into_body().collect().await.unwrap().to_bytes();
        String::from_utf8(bytes.to_vec()).unwrap()
    }

    #[tokio::test]
    async fn test_status_code_response_is_empty() {
        let response = StatusCode::CREATED.into_response();
        assert_eq!(response.status(), StatusCode::CREATED);
        assert!(response.headers().get(header::CONTENT_TYPE).is_none());
        assert_eq!(body_text(response).await, "");
    }

    #[tokio::test]
    async fn test_api_error_response() {
        let response = ApiError::bad_request("broken").into_response();
        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
        assert_eq!(
            response.headers()[header::CONTENT_TYPE],
            "application/json"
        );
        assert_eq!(
            body_text(response).await,
            r#"{"error":{"type":"bad_request","message":"broken"}}"#
        );
    }

    #[tokio::test]
    async fn test_html_response() {
        let response = Html("<p>hi</p>").into_response();
        assert_eq!(
            response.headers()[header::CONTENT_TYPE],
            "text/html; charset=utf-8"
        );
        assert_eq!(body_text(response).await, "<p>hi</p>");
    }
}
