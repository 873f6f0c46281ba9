//! Handler trait and its implementations for async functions

use crate::extract::FromRequest;
use crate::request::Request;
use crate::response::{IntoResponse, Response};
use std::future::Future;
use std::pin::Pin;
use std::sync::Arc;

/// Boxed response future used throughout the pipeline
pub type BoxFuture = Pin<Box<dyn Future<Output = Response> + Send + 'static>>;

/// Type-erased handler stored in the router
pub type BoxedHandler = Arc<dyn Fn(Request) -> BoxFuture + Send + Sync>;

/// An async function usable as a route handler.
///
/// Implemented for functions taking up to three extractors. Extractors
/// run left to right and the first failure short-circuits into its error
/// response.
pub trait Handler<T>: Clone + Send + Sync + Sized + 'static {
    fn call(self, req: Request) -> BoxFuture;
}

macro_rules! impl_handler {
    ($($ty:ident),*) => {
        impl<F, Fut, Res, $($ty,)*> Handler<($($ty,)*)> for F
        where
            F: FnOnce($($ty),*) -> Fut + Clone + Send + Sync + 'static,
            Fut: Future<Output = Res> + Send + 'static,
            Res: IntoResponse,
            $($ty: FromRequest + Send + 'static,)*
        {
            #[allow(non_snake_case, unused_mut, unused_variables)]
            fn call(self, mut req: Request) -> BoxFuture {
                Box::pin(async move {
                    $(
                        let $ty = match $ty::from_request(&mut req).await {
                            Ok(v) => v,
                            Err(e) => return e.into_response(),
                        };
                    )*
                    self($($ty),*).await.into_response()
                })
            }
        }
    };
}

impl_handler!();
impl_handler!(T1);
impl_handler!(T1, T2);
impl_handler!(T1, T2, T3);

pub(crate) fn into_boxed_handler<H, T>(handler: H) -> BoxedHandler
where
    H: Handler<T>,
    T: 'static,
{
    Arc::new(move |req| handler.clone().call(req))
}
