//! Remote dev client: the live-mode asset source and engine.
//!
//! In live mode both capabilities are backed by the companion build
//! process: assets are fetched over HTTP, and evaluation requests are
//! POSTed to its eval endpoint so the bundle runs next to the files it
//! was built from.

use async_trait::async_trait;
use reqwest::{header, StatusCode};
use url::Url;

use crate::{
    assets::{Asset, AssetError, AssetSource},
    engine::{EngineError, ScriptEngine},
};

/// Path on the companion process that evaluates scripts.
const EVAL_PATH: &str = "bud/eval";

/// Client for a running companion build process.
#[derive(Clone, Debug)]
pub struct DevClient {
    base: Url,
    http: reqwest::Client,
}

impl DevClient {
    /// The base URL is the root of the companion process, e.g.
    /// `http://127.0.0.1:35729/`.
    pub fn new(base: Url) -> Self {
        Self {
            base,
            http: reqwest::Client::new(),
        }
    }
}

#[async_trait]
impl AssetSource for DevClient {
    async fn open(&self, path: &str) -> Result<Asset, AssetError> {
        let url = self
            .base
            .join(path.trim_start_matches('/'))
            .map_err(|e| AssetError::Open {
                path: path.to_string(),
                reason: e.to_string(),
            })?;
        let res = self.http.get(url).send().await.map_err(|e| AssetError::Open {
            path: path.to_string(),
            reason: e.to_string(),
        })?;
        if res.status() == StatusCode::NOT_FOUND {
            return Err(AssetError::NotFound {
                path: path.to_string(),
            });
        }
        if !res.status().is_success() {
            return Err(AssetError::Upstream {
                path: path.to_string(),
                status: res.status().as_u16(),
            });
        }
        let modified = res
            .headers()
            .get(header::LAST_MODIFIED)
            .and_then(|v| v.to_str().ok())
            .and_then(|v| httpdate::parse_http_date(v).ok());
        let bytes = res.bytes().await.map_err(|e| AssetError::Open {
            path: path.to_string(),
            reason: e.to_string(),
        })?;
        Ok(Asset {
            path: path.to_string(),
            modified,
            bytes,
        })
    }
}

#[async_trait]
impl ScriptEngine for DevClient {
    async fn eval(&self, name: &str, source: &str) -> Result<String, EngineError> {
        let url = self
            .base
            .join(EVAL_PATH)
            .map_err(|e| EngineError::Unavailable(e.to_string()))?;
        let res = self
            .http
            .post(url)
            .json(&serde_json::json!({ "name": name, "source": source }))
            .send()
            .await
            .map_err(|e| EngineError::Unavailable(e.to_string()))?;
        let status = res.status();
        let text = res
            .text()
            .await
            .map_err(|e| EngineError::Unavailable(e.to_string()))?;
        if !status.is_success() {
            return Err(EngineError::Eval(text));
        }
        Ok(text)
    }
}
