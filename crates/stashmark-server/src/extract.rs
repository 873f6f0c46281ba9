//! Extractors
//!
//! Extractors pull typed data out of an incoming [`Request`]. Those that
//! only look at the head implement [`FromRequestParts`]; the ones that
//! consume the body implement [`FromRequest`].

use crate::error::{ApiError, Result};
use crate::request::Request;
use http::{header, HeaderMap};
use serde::de::DeserializeOwned;
use std::future::Future;
use std::ops::Deref;
use std::str::FromStr;

/// Extraction from the request head (headers, path, query, state)
pub trait FromRequestParts: Sized {
    fn from_request_parts(req: &Request) -> Result<Self>;
}

/// Extraction that may consume the request body
pub trait FromRequest: Sized {
    fn from_request(req: &mut Request) -> impl Future<Output = Result<Self>> + Send;
}

impl<T: FromRequestParts> FromRequest for T {
    async fn from_request(req: &mut Request) -> Result<Self> {
        T::from_request_parts(req)
    }
}

const FORM_CONTENT_TYPE: &str = "application/x-www-form-urlencoded";

/// URL-encoded form extractor.
///
/// Decodes an `application/x-www-form-urlencoded` body into `T`. A request
/// without a body (a share sent as `GET`, or an empty `POST`) is decoded
/// from the query string instead. A body with any other content type is
/// refused with 415.
///
/// ```rust,ignore
/// async fn share(Form(payload): Form<ShareTargetPayload>) -> StatusCode {
///     // payload.title, payload.text, payload.url
/// }
/// ```
#[derive(Debug, Clone)]
pub struct Form<T>(pub T);

impl<T: DeserializeOwned + Send> FromRequest for Form<T> {
    async fn from_request(req: &mut Request) -> Result<Self> {
        let body = req
            .take_body()
            .ok_or_else(|| ApiError::internal("Body already consumed"))?;

        if body.is_empty() {
            let query = req.query_string().unwrap_or("");
            return serde_urlencoded::from_str(query)
                .map(Form)
                .map_err(|e| ApiError::bad_request(format!("Invalid form data: {}", e)));
        }

        if !has_form_content_type(req.headers()) {
            return Err(ApiError::unsupported_media_type(format!(
                "Expected request with `Content-Type: {}`",
                FORM_CONTENT_TYPE
            )));
        }

        serde_urlencoded::from_bytes(&body)
            .map(Form)
            .map_err(|e| ApiError::bad_request(format!("Invalid form data: {}", e)))
    }
}

fn has_form_content_type(headers: &HeaderMap) -> bool {
    headers
        .get(header::CONTENT_TYPE)
        .and_then(|value| value.to_str().ok())
        .and_then(|value| value.split(';').next())
        .map(|mime| mime.trim().eq_ignore_ascii_case(FORM_CONTENT_TYPE))
        .unwrap_or(false)
}

impl<T> Deref for Form<T> {
    type Target = T;

    fn deref(&self) -> &Self::Target {
        &self.0
    }
}

/// Path parameter extractor.
///
/// Routes in this server carry at most one parameter, so the first one
/// matched is parsed into `T`.
#[derive(Debug, Clone)]
pub struct Path<T>(pub T);

impl<T: FromStr> FromRequestParts for Path<T>
where
    T::Err: std::fmt::Display,
{
    fn from_request_parts(req: &Request) -> Result<Self> {
        let (_, value) = req
            .path_params()
            .iter()
            .next()
            .ok_or_else(|| ApiError::internal("Missing path parameter"))?;

        value
            .parse::<T>()
            .map(Path)
            .map_err(|e| ApiError::bad_request(format!("Invalid path parameter: {}", e)))
    }
}

impl<T> Deref for Path<T> {
    type Target = T;

    fn deref(&self) -> &Self::Target {
        &self.0
    }
}

/// Shared application state registered with `App::state`
#[derive(Debug, Clone)]
pub struct State<T>(pub T);

impl<T: Clone + Send + Sync + 'static> FromRequestParts for State<T> {
    fn from_request_parts(req: &Request) -> Result<Self> {
        req.state().get::<T>().cloned().map(State).ok_or_else(|| {
            ApiError::internal(format!(
                "State of type `{}` not found",
                std::any::type_name::<T>()
            ))
        })
    }
}

impl<T> Deref for State<T> {
    type Target = T;

    fn deref(&self) -> &Self::Target {
        &self.0
    }
}

impl FromRequestParts for HeaderMap {
    fn from_request_parts(req: &Request) -> Result<Self> {
        Ok(req.headers().clone())
    }
}
