//! Application builder

use crate::middleware::{LayerStack, MiddlewareLayer};
use crate::router::{MethodRouter, Router};
use crate::server::{self, Pipeline, ServeError};
use std::future::Future;
use std::net::SocketAddr;
use tokio::net::TcpListener;

/// Default request body limit: 1 MiB
pub const DEFAULT_BODY_LIMIT: usize = 1024 * 1024;

/// Routes, shared state and middleware of a running server.
///
/// ```rust,ignore
/// App::new()
///     .state(service)
///     .layer(TracingLayer::new())
///     .route("/api/v1/pwa/share-target", post(share_target))
///     .run_with_shutdown(addr, shutdown_signal())
///     .await
/// ```
pub struct App {
    router: Router,
    layers: LayerStack,
    body_limit: usize,
}

impl App {
    pub fn new() -> Self {
        Self {
            router: Router::new(),
            layers: LayerStack::new(),
            body_limit: DEFAULT_BODY_LIMIT,
        }
    }

    pub fn route(mut self, path: &str, method_router: MethodRouter) -> Self {
        self.router = self.router.route(path, method_router);
        self
    }

    /// Share `state` with handlers through the `State<S>` extractor
    pub fn state<S>(mut self, state: S) -> Self
    where
        S: Clone + Send + Sync + 'static,
    {
        self.router = self.router.state(state);
        self
    }

    /// Add a middleware layer.
    ///
    /// The first layer added is the first to see the request and the last
    /// to see the response.
    pub fn layer<L: MiddlewareLayer>(mut self, layer: L) -> Self {
        self.layers.push(Box::new(layer));
        self
    }

    /// Larger request bodies are answered with 413 Payload Too Large
    pub fn body_limit(mut self, limit: usize) -> Self {
        self.body_limit = limit;
        self
    }

    pub(crate) fn into_pipeline(self) -> Pipeline {
        Pipeline::new(self.router, self.layers, self.body_limit)
    }

    /// Serve forever on `addr`
    pub async fn run(self, addr: SocketAddr) -> Result<(), ServeError> {
        self.run_with_shutdown(addr, std::future::pending()).await
    }

    /// Serve on `addr` until `signal` resolves
    pub async fn run_with_shutdown<F>(self, addr: SocketAddr, signal: F) -> Result<(), ServeError>
    where
        F: Future<Output = ()> + Send,
    {
        let listener = TcpListener::bind(addr).await?;
        self.serve(listener, signal).await
    }

    /// Serve on an already bound listener until `signal` resolves
    pub async fn serve<F>(self, listener: TcpListener, signal: F) -> Result<(), ServeError>
    where
        F: Future<Output = ()> + Send,
    {
        server::serve(self.into_pipeline(), listener, signal).await
    }
}

impl Default for App {
    fn default() -> Self {
        Self::new()
    }
}
