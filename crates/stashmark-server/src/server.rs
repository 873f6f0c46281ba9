//! HTTP server

use crate::error::ApiError;
use crate::handler::BoxFuture;
use crate::middleware::{BoxedNext, LayerStack};
use crate::request::Request;
use crate::response::{IntoResponse, Response};
use crate::router::{RouteMatch, Router};
use bytes::Bytes;
use http::request::Parts;
use http::{header, HeaderValue};
use http_body_util::{BodyExt, LengthLimitError, Limited};
use hyper::body::Incoming;
use hyper::server::conn::http1;
use hyper::service::service_fn;
use hyper_util::rt::TokioIo;
use std::convert::Infallible;
use std::future::Future;
use std::io;
use std::sync::Arc;
use std::time::Duration;
use tokio::net::TcpListener;
use tracing::{debug, error, info};

pub type ServeError = Box<dyn std::error::Error + Send + Sync>;

const ACCEPT_BACKOFF: Duration = Duration::from_millis(100);

/// Router, middleware and limits shared by every connection
#[derive(Clone)]
pub(crate) struct Pipeline {
    router: Arc<Router>,
    layers: Arc<LayerStack>,
    body_limit: usize,
}

impl Pipeline {
    pub(crate) fn new(router: Router, layers: LayerStack, body_limit: usize) -> Self {
        Self {
            router: Arc::new(router),
            layers: Arc::new(layers),
            body_limit,
        }
    }

    pub(crate) fn body_limit(&self) -> usize {
        self.body_limit
    }

    /// Run a request through the middleware stack and the router.
    ///
    /// Routing happens inside the innermost layer so that 404, 405 and
    /// body errors pass through the middleware like any other response.
    pub(crate) fn dispatch(&self, parts: Parts, body: Result<Bytes, ApiError>) -> BoxFuture {
        let (body, rejection) = match body {
            Ok(body) => (body, None),
            Err(e) => (Bytes::new(), Some(e)),
        };

        let request = Request::new(parts, body, self.router.state_ref());
        let router = self.router.clone();

        let final_handler: BoxedNext = Arc::new(move |req: Request| match rejection.clone() {
            Some(err) => Box::pin(async move { err.into_response() }) as BoxFuture,
            None => route_request(&router, req),
        });

        self.layers.execute(request, final_handler)
    }

    async fn handle(&self, req: hyper::Request<Incoming>) -> Response {
        let (parts, body) = req.into_parts();
        let body = collect_body(body, self.body_limit).await;
        self.dispatch(parts, body).await
    }
}

fn route_request(router: &Router, mut req: Request) -> BoxFuture {
    let method = req.method().clone();
    let path = req.path().to_string();

    match router.match_route(&path, &method) {
        RouteMatch::Found { handler, params } => {
            req.set_path_params(params);
            handler(req)
        }
        RouteMatch::NotFound => {
            let response =
                ApiError::not_found(format!("No route found for {} {}", method, path)).into_response();
            Box::pin(async move { response })
        }
        RouteMatch::MethodNotAllowed { allowed } => {
            let allowed = allowed
                .iter()
                .map(|m| m.as_str())
                .collect::<Vec<_>>()
                .join(", ");
            let mut response = ApiError::method_not_allowed(format!(
                "Method {} not allowed for {}",
                method, path
            ))
            .into_response();

            if let Ok(value) = HeaderValue::from_str(&allowed) {
                response.headers_mut().insert(header::ALLOW, value);
            }
            Box::pin(async move { response })
        }
    }
}

async fn collect_body(body: Incoming, limit: usize) -> Result<Bytes, ApiError> {
    match Limited::new(body, limit).collect().await {
        Ok(collected) => Ok(collected.to_bytes()),
        Err(e) if e.downcast_ref::<LengthLimitError>().is_some() => {
            Err(ApiError::payload_too_large(limit))
        }
        Err(e) => Err(ApiError::bad_request(format!("Failed to read request body: {}", e))),
    }
}

/// Accept connections on `listener` until `shutdown` resolves.
///
/// Connections already accepted are left to finish on their own tasks.
pub(crate) async fn serve<F>(
    pipeline: Pipeline,
    listener: TcpListener,
    shutdown: F,
) -> Result<(), ServeError>
where
    F: Future<Output = ()> + Send,
{
    info!(addr = %listener.local_addr()?, "stashmark listening");
    tokio::pin!(shutdown);

    loop {
        let accepted = tokio::select! {
            accepted = listener.accept() => accepted,
            _ = &mut shutdown => {
                info!("Shutdown signal received, no longer accepting connections");
                return Ok(());
            }
        };

        let (stream, remote_addr) = match accepted {
            Ok(accepted) => accepted,
            Err(e) if is_connection_error(&e) => {
                debug!(error = %e, "Connection dropped before accept");
                continue;
            }
            Err(e) => {
                // Resource exhaustion such as EMFILE; retry after a pause
                error!(error = %e, "Failed to accept connection");
                tokio::time::sleep(ACCEPT_BACKOFF).await;
                continue;
            }
        };

        debug!(remote = %remote_addr, "Connection accepted");
        let io = TokioIo::new(stream);
        let pipeline = pipeline.clone();

        tokio::spawn(async move {
            let service = service_fn(move |req: hyper::Request<Incoming>| {
                let pipeline = pipeline.clone();
                async move { Ok::<_, Infallible>(pipeline.handle(req).await) }
            });

            if let Err(err) = http1::Builder::new().serve_connection(io, service).await {
                error!("Connection error: {}", err);
            }
        });
    }
}

/// Errors that only concern the one peer being accepted
fn is_connection_error(e: &io::Error) -> bool {
    matches!(
        e.kind(),
        io::ErrorKind::ConnectionRefused
            | io::ErrorKind::ConnectionAborted
            | io::ErrorKind::ConnectionReset
    )
}
