//! Server-side view rendering bridge - imperative shell.
//!
//! This crate renders routes by evaluating the SSR bundle inside an
//! injected script engine, and serves the client assets needed to
//! hydrate the result. Pure protocol logic lives in `budview_core`.
//!
//! Two modes share one capability set:
//!
//! - **Live** ([`ViewServer::proxy`]): assets and evaluation are backed
//!   by a [`DevClient`] talking to a running companion build process.
//! - **Static** ([`ViewServer::packaged`]): assets come from an
//!   immutable packaged source and the engine is caller-supplied.
//!
//! # Example
//!
//! ```ignore
//! use std::sync::Arc;
//! use axum::Router;
//! use budview::{DirAssets, ViewServer};
//! use budview_engine::DenoEngine;
//!
//! let assets = Arc::new(DirAssets::new("dist"));
//! let engine = Arc::new(DenoEngine::spawn());
//! let server = Arc::new(ViewServer::packaged(assets, engine));
//!
//! let app = Router::new()
//!     .route("/", server.handler("/", serde_json::json!({})))
//!     .layer(server.middleware());
//! ```

mod assets;
mod client;
mod engine;
mod error;
mod renderer;
mod serve;
mod server;

pub use assets::{Asset, AssetError, AssetSource, DirAssets};
pub use client::DevClient;
pub use engine::{EngineError, ScriptEngine};
pub use error::RenderError;
pub use renderer::Renderer;
pub use server::{AssetLayer, AssetService, ViewServer};

// Re-export core types for convenience
pub use budview_core::{AssetRules, ProtocolError, RenderResponse};
