use std::sync::Arc;
use std::time::Duration;

use axum::{http::StatusCode, Router};
use tower_http::{timeout::TimeoutLayer, trace::TraceLayer};

use budview::ViewServer;

/// Create the application router: one rendered route plus the
/// client-asset middleware.
pub fn create_app(server: &Arc<ViewServer>, route: &str, props: serde_json::Value) -> Router {
    Router::new()
        .route(route, server.handler(route, props))
        .layer(server.middleware())
        .layer(TraceLayer::new_for_http())
        .layer(TimeoutLayer::with_status_code(
            StatusCode::REQUEST_TIMEOUT,
            Duration::from_secs(10),
        ))
}
