//! The rendering server: one capability set, two modes.
//!
//! A [`ViewServer`] exposes a middleware that intercepts client-asset
//! requests and a per-route terminal handler that renders through the
//! script engine. Live and static modes differ only in their asset
//! rules, their missing-asset policy, and where their capabilities come
//! from; callers depend on the capability set, never on the mode.

use std::future::Future;
use std::pin::Pin;
use std::sync::Arc;
use std::task::{Context, Poll};

use axum::{
    body::Body,
    extract::Request,
    http::{header::HeaderName, HeaderValue, StatusCode},
    response::{IntoResponse, Response},
    routing::{any, MethodRouter},
};
use tower::{Layer, Service};

use budview_core::{AssetRules, ProtocolError, RenderResponse};

use crate::{
    assets::AssetSource,
    client::DevClient,
    engine::ScriptEngine,
    error::RenderError,
    renderer::Renderer,
    serve,
};

/// What a confirmed not-found asset turns into.
///
/// Live mode distinguishes not-found (404) from other failures (500);
/// static mode reports 500 for every asset failure. The asymmetry is
/// wire-visible behavior and is kept deliberately.
#[derive(Clone, Copy, Debug)]
enum MissingAssetPolicy {
    NotFound,
    ServerError,
}

/// Serves client assets and renders routes for one mode.
pub struct ViewServer {
    assets: Arc<dyn AssetSource>,
    renderer: Renderer,
    rules: AssetRules,
    missing_asset: MissingAssetPolicy,
}

impl ViewServer {
    /// Live server: assets and evaluation both proxy to a running
    /// companion build process.
    pub fn proxy(client: Arc<DevClient>) -> Self {
        let assets: Arc<dyn AssetSource> = Arc::clone(&client) as Arc<dyn AssetSource>;
        let engine: Arc<dyn ScriptEngine> = client;
        Self {
            renderer: Renderer::new(Arc::clone(&assets), engine),
            assets,
            rules: AssetRules::live(),
            missing_asset: MissingAssetPolicy::NotFound,
        }
    }

    /// Static server: an immutable packaged asset source and a
    /// caller-supplied engine. Used during production.
    pub fn packaged(assets: Arc<dyn AssetSource>, engine: Arc<dyn ScriptEngine>) -> Self {
        Self {
            renderer: Renderer::new(Arc::clone(&assets), engine),
            assets,
            rules: AssetRules::packaged(),
            missing_asset: MissingAssetPolicy::ServerError,
        }
    }

    /// Middleware that serves client-asset requests and forwards
    /// everything else unchanged to the wrapped service.
    pub fn middleware(self: &Arc<Self>) -> AssetLayer {
        AssetLayer {
            server: Arc::clone(self),
        }
    }

    /// Terminal handler bound to one route and one props value; always
    /// attempts a render.
    pub fn handler(self: &Arc<Self>, route: &str, props: serde_json::Value) -> MethodRouter {
        let server = Arc::clone(self);
        let route = route.to_string();
        any(move || async move { server.respond(&route, &props).await })
    }

    /// Render a route directly, without the HTTP wrapping.
    pub async fn render(
        &self,
        route: &str,
        props: &serde_json::Value,
    ) -> Result<RenderResponse, RenderError> {
        self.renderer.render(route, props).await
    }

    async fn respond(&self, route: &str, props: &serde_json::Value) -> Response {
        let res = match self.renderer.render(route, props).await {
            Ok(res) => res,
            Err(e) => {
                tracing::error!(error = %e, route, "view: render error");
                return (StatusCode::INTERNAL_SERVER_ERROR, e.to_string()).into_response();
            }
        };
        match write_response(res) {
            Ok(response) => response,
            Err(e) => {
                tracing::error!(error = %e, route, "view: render error");
                (StatusCode::INTERNAL_SERVER_ERROR, e.to_string()).into_response()
            }
        }
    }

    async fn serve_asset(&self, req: Request) -> Response {
        let path = req.uri().path().to_string();
        let asset = match self.assets.open(&path).await {
            Ok(asset) => asset,
            Err(e) if e.is_not_found() && matches!(self.missing_asset, MissingAssetPolicy::NotFound) => {
                return (StatusCode::NOT_FOUND, e.to_string()).into_response();
            }
            Err(e) => {
                tracing::error!(error = %e, path, "view: open error");
                return (StatusCode::INTERNAL_SERVER_ERROR, e.to_string()).into_response();
            }
        };
        serve::content(req.headers(), self.rules.script_content_type(&path), asset)
    }
}

/// Apply a validated render response onto an HTTP response: headers
/// first (unique keys, order unspecified), then status, then body.
fn write_response(res: RenderResponse) -> Result<Response, RenderError> {
    let status = StatusCode::from_u16(res.status)
        .map_err(|_| ProtocolError::InvalidStatus(res.status as i64))?;
    let mut response = Response::new(Body::from(res.body));
    for (key, value) in &res.headers {
        let name = HeaderName::from_bytes(key.as_bytes()).map_err(|e| {
            ProtocolError::MalformedResponse(format!("bad header name {key:?}: {e}"))
        })?;
        let value = HeaderValue::from_str(value).map_err(|e| {
            ProtocolError::MalformedResponse(format!("bad header value for {key:?}: {e}"))
        })?;
        response.headers_mut().insert(name, value);
    }
    *response.status_mut() = status;
    Ok(response)
}

/// Tower layer wrapping downstream services with asset interception.
#[derive(Clone)]
pub struct AssetLayer {
    server: Arc<ViewServer>,
}

impl<S> Layer<S> for AssetLayer {
    type Service = AssetService<S>;

    fn layer(&self, inner: S) -> Self::Service {
        AssetService {
            inner,
            server: Arc::clone(&self.server),
        }
    }
}

/// Chain-of-responsibility service: client-asset paths are served from
/// the asset source; all other requests pass through untouched.
#[derive(Clone)]
pub struct AssetService<S> {
    inner: S,
    server: Arc<ViewServer>,
}

impl<S> Service<Request> for AssetService<S>
where
    S: Service<Request, Response = Response> + Send + 'static,
    S::Future: Send + 'static,
{
    type Response = Response;
    type Error = S::Error;
    type Future = Pin<Box<dyn Future<Output = Result<Response, S::Error>> + Send>>;

    fn poll_ready(&mut self, cx: &mut Context<'_>) -> Poll<Result<(), Self::Error>> {
        self.inner.poll_ready(cx)
    }

    fn call(&mut self, req: Request) -> Self::Future {
        if !self.server.rules.is_client(req.uri().path()) {
            return Box::pin(self.inner.call(req));
        }
        let server = Arc::clone(&self.server);
        Box::pin(async move { Ok(server.serve_asset(req).await) })
    }
}
