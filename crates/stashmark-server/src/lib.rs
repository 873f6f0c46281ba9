//! # Stashmark Server
//!
//! HTTP front for [`stashmark_core`]: accepts shares posted by the installed
//! web app and serves the embedded front end.
//!
//! | Route | Handler |
//! |-------|---------|
//! | `GET /` | rendered index page |
//! | `GET /assets/{*path}` | embedded static files |
//! | `POST /api/v1/pwa/share-target` | share target endpoint |
//!
//! The service worker script is always served with caching disabled so
//! that browsers pick up new versions immediately.

pub mod app;
pub mod assets;
pub mod config;
pub mod error;
pub mod extract;
pub mod handler;
pub mod logging;
pub mod middleware;
pub mod request;
pub mod response;
pub mod router;
pub mod routes;
mod server;
pub mod test_client;

pub use app::{App, DEFAULT_BODY_LIMIT};
pub use assets::{Asset, AssetConfig, AssetServer, AssetSource, EmbeddedAssets};
pub use config::{ConfigError, Environment, ServerConfig};
pub use error::{ApiError, StartupError};
pub use extract::{Form, Path, State};
pub use request::Request;
pub use response::{Html, IntoResponse, Response};
pub use router::{get, post, MethodRouter, Router};
pub use server::ServeError;
pub use test_client::{TestClient, TestRequest, TestResponse};

use middleware::{ServiceWorkerLayer, TracingLayer};
use stashmark_core::{
    AbsoluteUrlValidator, BookmarkStore, ShareTargetNormalizer, ShareTargetService, UtmStripper,
};
use std::sync::Arc;

/// Assemble the application from `config`, persisting into `store`.
///
/// The front end is read from the embedded files; see [`build_app_with`]
/// to supply another [`AssetSource`].
pub fn build_app(config: &ServerConfig, store: Arc<dyn BookmarkStore>) -> Result<App, StartupError> {
    build_app_with(config, store, EmbeddedAssets)
}

pub fn build_app_with(
    config: &ServerConfig,
    store: Arc<dyn BookmarkStore>,
    source: impl AssetSource + 'static,
) -> Result<App, StartupError> {
    let normalizer = ShareTargetNormalizer::new(
        AbsoluteUrlValidator,
        UtmStripper::new().with_params(config.tracking_params.iter().cloned()),
    );
    let service = Arc::new(ShareTargetService::with_normalizer(normalizer, store));

    let frontend = routes::Frontend::load(&source, &config.root_path)?;

    let asset_config = AssetConfig::new()
        .service_worker_scope(config.root_path.clone())
        .max_age(config.asset_max_age);
    let service_worker = ServiceWorkerLayer::new(
        asset_config.no_cache_paths.iter().cloned(),
        &asset_config.service_worker_scope,
    )
    .map_err(|_| StartupError::InvalidHeader {
        name: "Service-Worker-Allowed",
        value: asset_config.service_worker_scope.clone(),
    })?;
    let asset_route = format!("{}/{{*path}}", asset_config.prefix.trim_end_matches('/'));
    let assets = AssetServer::new(asset_config, source);

    Ok(App::new()
        .body_limit(config.body_limit)
        .state(service)
        .state(frontend)
        .state(assets)
        .layer(TracingLayer::new().with_field("version", env!("CARGO_PKG_VERSION")))
        .layer(service_worker)
        .route("/", get(routes::index))
        .route(&asset_route, get(routes::serve_asset))
        .route(routes::SHARE_TARGET_PATH, post(routes::share_target)))
}
