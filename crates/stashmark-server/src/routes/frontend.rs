//! The web front end: rendered index page and embedded assets

use crate::assets::{AssetServer, AssetSource};
use crate::error::{ApiError, StartupError};
use crate::extract::{Path, State};
use crate::response::{Html, Response};
use http::HeaderMap;
use serde::Serialize;
use std::sync::Arc;
use tera::{Context, Tera};

const INDEX_TEMPLATE: &str = "index.html";

#[derive(Serialize)]
struct IndexContext<'a> {
    root_path: &'a str,
    version: &'a str,
}

/// Index page template plus the values it is rendered with
#[derive(Clone)]
pub struct Frontend {
    templates: Arc<Tera>,
    root_path: Arc<str>,
    version: &'static str,
}

impl Frontend {
    /// Load the index template from `source`.
    ///
    /// Fails when the template is missing or does not parse, so a broken
    /// build is caught at startup rather than on the first page view.
    pub fn load(source: &dyn AssetSource, root_path: &str) -> Result<Self, StartupError> {
        let index = source
            .open(INDEX_TEMPLATE)
            .ok_or_else(|| StartupError::MissingAsset(INDEX_TEMPLATE.to_string()))?;

        let mut tera = Tera::default();
        tera.add_raw_template(INDEX_TEMPLATE, &String::from_utf8_lossy(&index.data))?;

        Ok(Self {
            templates: Arc::new(tera),
            root_path: Arc::from(root_path),
            version: env!("CARGO_PKG_VERSION"),
        })
    }

    pub fn render_index(&self) -> Result<String, tera::Error> {
        let context = Context::from_serialize(IndexContext {
            root_path: &self.root_path,
            version: self.version,
        })?;
        self.templates.render(INDEX_TEMPLATE, &context)
    }
}

/// `GET /`
pub async fn index(State(frontend): State<Frontend>) -> Result<Html<String>, ApiError> {
    frontend.render_index().map(Html).map_err(|e| {
        tracing::error!(error = %e, "failed to render index");
        ApiError::from(e)
    })
}

/// `GET /assets/{*path}`
pub async fn serve_asset(
    State(assets): State<AssetServer>,
    Path(path): Path<String>,
    headers: HeaderMap,
) -> Result<Response, ApiError> {
    assets.serve(&path, &headers)
}
