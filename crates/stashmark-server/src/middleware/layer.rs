//! Middleware chain

use crate::handler::BoxFuture;
use crate::request::Request;
use std::sync::Arc;

/// The rest of the chain, as seen from inside a middleware
pub type BoxedNext = Arc<dyn Fn(Request) -> BoxFuture + Send + Sync>;

/// Middleware that wraps every request, including unrouted ones
pub trait MiddlewareLayer: Send + Sync + 'static {
    /// Handle `req`, calling `next` to continue the chain
    fn call(&self, req: Request, next: BoxedNext) -> BoxFuture;

    fn clone_box(&self) -> Box<dyn MiddlewareLayer>;
}

impl Clone for Box<dyn MiddlewareLayer> {
    fn clone(&self) -> Self {
        self.clone_box()
    }
}

/// Ordered list of layers; the first one pushed runs outermost
#[derive(Clone, Default)]
pub struct LayerStack {
    layers: Vec<Box<dyn MiddlewareLayer>>,
}

impl LayerStack {
    pub fn new() -> Self {
        Self { layers: Vec::new() }
    }

    pub fn push(&mut self, layer: Box<dyn MiddlewareLayer>) {
        self.layers.push(layer);
    }

    pub fn is_empty(&self) -> bool {
        self.layers.is_empty()
    }

    pub fn len(&self) -> usize {
        self.layers.len()
    }

    /// Run `req` through every layer and finally `handler`
    pub fn execute(&self, req: Request, handler: BoxedNext) -> BoxFuture {
        let mut next = handler;

        for layer in self.layers.iter().rev() {
            let layer: Arc<dyn MiddlewareLayer> = Arc::from(layer.clone_box());
            let inner = next;
            next = Arc::new(move |req: Request| layer.call(req, inner.clone()));
        }

        next(req)
    }
}
