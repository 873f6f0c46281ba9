//! Router backed by a radix tree (matchit)
//!
//! Paths use `{param}` for a single segment and `{*param}` for a
//! catch-all tail:
//!
//! ```rust,ignore
//! let router = Router::new()
//!     .route("/", get(index))
//!     .route("/assets/{*path}", get(serve_asset))
//!     .route("/api/v1/pwa/share-target", post(share_target));
//! ```

use crate::handler::{into_boxed_handler, BoxedHandler, Handler};
use http::{Extensions, Method};
use matchit::Router as MatchitRouter;
use std::collections::HashMap;
use std::sync::Arc;

/// Handlers for one path, keyed by method
#[derive(Clone, Default)]
pub struct MethodRouter {
    handlers: HashMap<Method, BoxedHandler>,
}

impl MethodRouter {
    pub fn new() -> Self {
        Self::default()
    }

    fn on(mut self, method: Method, handler: BoxedHandler) -> Self {
        if self.handlers.insert(method.clone(), handler).is_some() {
            panic!("Duplicate handler for method {} on the same path", method);
        }
        self
    }

    /// Add a `GET` handler
    pub fn get<H, T>(self, handler: H) -> Self
    where
        H: Handler<T>,
        T: 'static,
    {
        self.on(Method::GET, into_boxed_handler(handler))
    }

    /// Add a `POST` handler
    pub fn post<H, T>(self, handler: H) -> Self
    where
        H: Handler<T>,
        T: 'static,
    {
        self.on(Method::POST, into_boxed_handler(handler))
    }

    pub(crate) fn allowed_methods(&self) -> Vec<Method> {
        let mut methods: Vec<Method> = self.handlers.keys().cloned().collect();
        methods.sort_by(|a, b| a.as_str().cmp(b.as_str()));
        methods
    }
}

pub fn get<H, T>(handler: H) -> MethodRouter
where
    H: Handler<T>,
    T: 'static,
{
    MethodRouter::new().get(handler)
}

pub fn post<H, T>(handler: H) -> MethodRouter
where
    H: Handler<T>,
    T: 'static,
{
    MethodRouter::new().post(handler)
}

/// Outcome of matching a request against the router
pub(crate) enum RouteMatch<'a> {
    Found {
        handler: &'a BoxedHandler,
        params: HashMap<String, String>,
    },
    NotFound,
    MethodNotAllowed {
        allowed: Vec<Method>,
    },
}

pub struct Router {
    inner: MatchitRouter<MethodRouter>,
    state: Arc<Extensions>,
}

impl Router {
    pub fn new() -> Self {
        Self {
            inner: MatchitRouter::new(),
            state: Arc::new(Extensions::new()),
        }
    }

    /// Register `method_router` at `path`.
    ///
    /// # Panics
    ///
    /// When `path` conflicts with an already registered route.
    pub fn route(mut self, path: &str, method_router: MethodRouter) -> Self {
        let matchit_path = convert_path_params(path);
        if let Err(e) = self.inner.insert(matchit_path, method_router) {
            panic!("Route conflict for `{}`: {}", path, e);
        }
        self
    }

    /// Make `state` available to the [`State`](crate::State) extractor
    pub fn state<S: Clone + Send + Sync + 'static>(mut self, state: S) -> Self {
        Arc::make_mut(&mut self.state).insert(state);
        self
    }

    pub(crate) fn state_ref(&self) -> Arc<Extensions> {
        self.state.clone()
    }

    pub(crate) fn match_route(&self, path: &str, method: &Method) -> RouteMatch<'_> {
        let matched = match self.inner.at(path) {
            Ok(matched) => matched,
            Err(_) => return RouteMatch::NotFound,
        };

        let method_router = matched.value;
        // HEAD is served by the GET handler
        let handler = method_router.handlers.get(method).or_else(|| {
            (*method == Method::HEAD)
                .then(|| method_router.handlers.get(&Method::GET))
                .flatten()
        });

        match handler {
            Some(handler) => RouteMatch::Found {
                handler,
                params: matched
                    .params
                    .iter()
                    .map(|(k, v)| (k.to_string(), v.to_string()))
                    .collect(),
            },
            None => RouteMatch::MethodNotAllowed {
                allowed: method_router.allowed_methods(),
            },
        }
    }
}

impl Default for Router {
    fn default() -> Self {
        Self::new()
    }
}

/// `{id}` becomes `:id` and `{*rest}` becomes `*rest`
fn convert_path_params(path: &str) -> String {
    let mut result = String::with_capacity(path.len());
    let mut chars = path.chars().peekable();

    while let Some(ch) = chars.next() {
        match ch {
            '{' if chars.peek() == Some(&'*') => {}
            '{' => result.push(':'),
            '}' => {}
            _ => result.push(ch),
        }
    }

    result
}
