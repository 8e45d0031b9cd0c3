//! Render errors including I/O operations.

use budview_core::ProtocolError;
use thiserror::Error;

use crate::{assets::AssetError, engine::EngineError};

/// Everything that can go wrong along one render call. Each failure is
/// terminal for the current request and reported once.
#[derive(Error, Debug)]
pub enum RenderError {
    /// The caller-supplied props could not be serialized to JSON.
    #[error("view: unserializable props: {0}")]
    Serialize(String),

    /// The SSR bundle is absent from the asset source.
    #[error("view: missing ssr bundle at {path}")]
    MissingBundle { path: String },

    /// The SSR bundle exists but could not be read.
    #[error(transparent)]
    Asset(#[from] AssetError),

    /// The script engine failed to evaluate the bundle.
    #[error(transparent)]
    Engine(#[from] EngineError),

    /// The engine result violated the response protocol.
    #[error(transparent)]
    Protocol(#[from] ProtocolError),
}
