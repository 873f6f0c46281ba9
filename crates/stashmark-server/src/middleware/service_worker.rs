//! Cache headers for service worker scripts
//!
//! Browsers only pick up a new service worker when they refetch its
//! script, so the script must never be served from a cache. Responses for
//! the configured paths get `Cache-Control: no-store, no-cache,
//! must-revalidate, max-age=0` (replacing whatever the asset server set)
//! and a `Service-Worker-Allowed` header naming the application root.

use super::layer::{BoxedNext, MiddlewareLayer};
use crate::handler::BoxFuture;
use crate::request::Request;
use http::header::{HeaderName, InvalidHeaderValue, CACHE_CONTROL};
use http::HeaderValue;
use std::sync::Arc;

pub const NO_CACHE: &str = "no-store, no-cache, must-revalidate, max-age=0";

pub const SERVICE_WORKER_ALLOWED: HeaderName = HeaderName::from_static("service-worker-allowed");

#[derive(Clone)]
pub struct ServiceWorkerLayer {
    paths: Arc<[String]>,
    scope: HeaderValue,
}

impl ServiceWorkerLayer {
    /// Layer for the scripts at `paths` (exact request paths), allowed to
    /// control `scope`
    pub fn new<I, P>(paths: I, scope: &str) -> Result<Self, InvalidHeaderValue>
    where
        I: IntoIterator<Item = P>,
        P: Into<String>,
    {
        Ok(Self {
            paths: paths.into_iter().map(Into::into).collect(),
            scope: HeaderValue::from_str(scope)?,
        })
    }

    fn applies_to(&self, path: &str) -> bool {
        self.paths.iter().any(|p| p == path)
    }
}

impl MiddlewareLayer for ServiceWorkerLayer {
    fn call(&self, req: Request, next: BoxedNext) -> BoxFuture {
        if !self.applies_to(req.path()) {
            return next(req);
        }

        let scope = self.scope.clone();
        Box::pin(async move {
            let mut response = next(req).await;
            let headers = response.headers_mut();
            headers.insert(CACHE_CONTROL, HeaderValue::from_static(NO_CACHE));
            headers.insert(SERVICE_WORKER_ALLOWED, scope);
            response
        })
    }

    fn clone_box(&self) -> Box<dyn MiddlewareLayer> {
        Box::new(self.clone())
    }
}
