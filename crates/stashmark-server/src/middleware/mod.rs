//! Middleware applied around every request

mod layer;
mod service_worker;
mod tracing_layer;

pub use layer::{BoxedNext, LayerStack, MiddlewareLayer};
pub use service_worker::{ServiceWorkerLayer, NO_CACHE, SERVICE_WORKER_ALLOWED};
pub use tracing_layer::{RequestId, TracingLayer, REQUEST_ID_HEADER};
