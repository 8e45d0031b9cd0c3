//! The asset source capability and the packaged directory source.

use std::io::ErrorKind;
use std::path::{Component, Path, PathBuf};
use std::time::SystemTime;

use async_trait::async_trait;
use bytes::Bytes;
use thiserror::Error;

/// A named, byte-addressable, timestamped resource.
///
/// Opened per request and dropped before the handler returns; this
/// crate never caches assets across requests.
#[derive(Clone, Debug)]
pub struct Asset {
    /// Logical path the asset was opened under.
    pub path: String,
    /// Modification time, when the source knows one. Drives
    /// conditional-GET serving.
    pub modified: Option<SystemTime>,
    pub bytes: Bytes,
}

/// Asset retrieval failures.
#[derive(Error, Debug)]
pub enum AssetError {
    #[error("view: {path} does not exist")]
    NotFound { path: String },

    #[error("view: failed to open {path}: {reason}")]
    Open { path: String, reason: String },

    #[error("view: failed to stat {path}: {reason}")]
    Stat { path: String, reason: String },

    #[error("view: upstream returned {status} for {path}")]
    Upstream { path: String, status: u16 },
}

impl AssetError {
    /// Whether this is a confirmed not-found, as opposed to any other
    /// retrieval failure.
    pub fn is_not_found(&self) -> bool {
        matches!(self, AssetError::NotFound { .. })
    }
}

/// Something assets can be opened from: a remote dev client in live
/// mode, a packaged read-only filesystem in static mode.
#[async_trait]
pub trait AssetSource: Send + Sync {
    /// Open the asset at a logical path (leading slash optional).
    async fn open(&self, path: &str) -> Result<Asset, AssetError>;
}

/// A packaged, read-only directory of assets on the local filesystem.
#[derive(Clone, Debug)]
pub struct DirAssets {
    root: PathBuf,
}

impl DirAssets {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    /// Resolve a logical path under the root, rejecting traversal.
    fn resolve(&self, path: &str) -> Option<PathBuf> {
        let rel = Path::new(path.trim_start_matches('/'));
        if rel
            .components()
            .any(|c| !matches!(c, Component::Normal(_)))
        {
            return None;
        }
        Some(self.root.join(rel))
    }
}

#[async_trait]
impl AssetSource for DirAssets {
    async fn open(&self, path: &str) -> Result<Asset, AssetError> {
        let full = self.resolve(path).ok_or_else(|| AssetError::NotFound {
            path: path.to_string(),
        })?;
        let bytes = match tokio::fs::read(&full).await {
            Ok(bytes) => Bytes::from(bytes),
            Err(e) if e.kind() == ErrorKind::NotFound => {
                return Err(AssetError::NotFound {
                    path: path.to_string(),
                })
            }
            Err(e) => {
                return Err(AssetError::Open {
                    path: path.to_string(),
                    reason: e.to_string(),
                })
            }
        };
        let meta = tokio::fs::metadata(&full)
            .await
            .map_err(|e| AssetError::Stat {
                path: path.to_string(),
                reason: e.to_string(),
            })?;
        Ok(Asset {
            path: path.to_string(),
            modified: meta.modified().ok(),
            bytes,
        })
    }
}
