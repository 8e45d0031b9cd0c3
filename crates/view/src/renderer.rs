//! The render pipeline: serialize, fetch bundle, evaluate, validate.

use std::sync::Arc;

use serde::Serialize;

use budview_core::{parse_response, render_expr, RenderResponse, SSR_BUNDLE_PATH, SSR_UNIT_NAME};

use crate::{
    assets::AssetSource,
    engine::ScriptEngine,
    error::RenderError,
};

/// Renders one route at a time against an asset source and a script
/// engine. Holds no per-request state and no caches: every render
/// re-reads the bundle and re-invokes the engine, trading latency for
/// always-fresh behavior in dev and simplicity in prod.
#[derive(Clone)]
pub struct Renderer {
    assets: Arc<dyn AssetSource>,
    engine: Arc<dyn ScriptEngine>,
}

impl Renderer {
    pub fn new(assets: Arc<dyn AssetSource>, engine: Arc<dyn ScriptEngine>) -> Self {
        Self { assets, engine }
    }

    /// Render a route with the given props.
    ///
    /// Strictly sequential: serialize props, read the bundle at
    /// [`SSR_BUNDLE_PATH`], evaluate the bundle plus one invocation of
    /// its entry point, then parse and validate the result.
    pub async fn render<T>(&self, route: &str, props: &T) -> Result<RenderResponse, RenderError>
    where
        T: Serialize + ?Sized,
    {
        let props_json =
            serde_json::to_string(props).map_err(|e| RenderError::Serialize(e.to_string()))?;
        let bundle = self.assets.open(SSR_BUNDLE_PATH).await.map_err(|e| {
            if e.is_not_found() {
                RenderError::MissingBundle {
                    path: SSR_BUNDLE_PATH.to_string(),
                }
            } else {
                RenderError::Asset(e)
            }
        })?;
        let source = String::from_utf8_lossy(&bundle.bytes);
        let expr = render_expr(&source, route, &props_json);
        let result = self.engine.eval(SSR_UNIT_NAME, &expr).await?;
        Ok(parse_response(&result)?)
    }
}

#[cfg(test)]
mod tests {
    use std::collections::HashMap;
    use std::sync::Mutex;

    use async_trait::async_trait;
    use bytes::Bytes;

    use budview_core::ProtocolError;

    use crate::assets::{Asset, AssetError};
    use crate::engine::EngineError;

    use super::*;

    /// In-memory asset source.
    struct MapAssets(HashMap<String, Bytes>);

    #[async_trait]
    impl AssetSource for MapAssets {
        async fn open(&self, path: &str) -> Result<Asset, AssetError> {
            let key = path.trim_start_matches('/');
            match self.0.get(key) {
                Some(bytes) => Ok(Asset {
                    path: path.to_string(),
                    modified: None,
                    bytes: bytes.clone(),
                }),
                None => Err(AssetError::NotFound {
                    path: path.to_string(),
                }),
            }
        }
    }

    /// Engine that returns a canned result and records the expression
    /// it was asked to evaluate.
    struct MockEngine {
        result: String,
        seen: Mutex<Option<String>>,
    }

    impl MockEngine {
        fn returning(result: &str) -> Self {
            Self {
                result: result.to_string(),
                seen: Mutex::new(None),
            }
        }
    }

    #[async_trait]
    impl ScriptEngine for MockEngine {
        async fn eval(&self, _name: &str, source: &str) -> Result<String, EngineError> {
            *self.seen.lock().unwrap() = Some(source.to_string());
            Ok(self.result.clone())
        }
    }

    fn renderer_with(engine: Arc<MockEngine>) -> Renderer {
        let assets = MapAssets(HashMap::from([(
            SSR_BUNDLE_PATH.to_string(),
            Bytes::from_static(b"var bud = {}"),
        )]));
        Renderer::new(Arc::new(assets), engine)
    }

    #[tokio::test]
    async fn test_render_returns_engine_triple() {
        let engine = Arc::new(MockEngine::returning(
            r#"{"status":200,"headers":{"Content-Type":"text/html"},"body":"<h1>world</h1>"}"#,
        ));
        let renderer = renderer_with(Arc::clone(&engine));

        let res = renderer
            .render("/", &serde_json::json!({"name": "world"}))
            .await
            .unwrap();

        assert_eq!(res.status, 200);
        assert_eq!(res.headers["Content-Type"], "text/html");
        assert_eq!(res.body, "<h1>world</h1>");

        // The evaluation unit carries the bundle, the quoted route, and
        // the props JSON verbatim.
        let seen = engine.seen.lock().unwrap().clone().unwrap();
        assert_eq!(seen, r#"var bud = {}; bud.render("/", {"name":"world"})"#);
    }

    #[tokio::test]
    async fn test_render_escapes_hostile_routes() {
        let engine = Arc::new(MockEngine::returning(r#"{"status":200,"headers":{},"body":""}"#));
        let renderer = renderer_with(Arc::clone(&engine));

        renderer
            .render(r#"/a"b\c"#, &serde_json::json!({}))
            .await
            .unwrap();

        let seen = engine.seen.lock().unwrap().clone().unwrap();
        assert!(seen.ends_with(r#"bud.render("/a\"b\\c", {})"#), "{seen}");
    }

    #[tokio::test]
    async fn test_render_rejects_out_of_range_statuses() {
        for status in [0i64, 99, 1000, -1] {
            let engine = Arc::new(MockEngine::returning(&format!(
                r#"{{"status":{status},"headers":{{}},"body":""}}"#
            )));
            let renderer = renderer_with(engine);
            let err = renderer.render("/", &serde_json::json!({})).await.unwrap_err();
            match err {
                RenderError::Protocol(ProtocolError::InvalidStatus(n)) => assert_eq!(n, status),
                other => panic!("expected protocol error, got {other}"),
            }
        }
    }

    #[tokio::test]
    async fn test_render_rejects_malformed_results() {
        let engine = Arc::new(MockEngine::returning("undefined"));
        let renderer = renderer_with(engine);
        let err = renderer.render("/", &serde_json::json!({})).await.unwrap_err();
        assert!(matches!(
            err,
            RenderError::Protocol(ProtocolError::MalformedResponse(_))
        ));
    }

    #[tokio::test]
    async fn test_render_missing_bundle() {
        let assets = MapAssets(HashMap::new());
        let engine = Arc::new(MockEngine::returning("{}"));
        let renderer = Renderer::new(Arc::new(assets), engine);
        let err = renderer.render("/", &serde_json::json!({})).await.unwrap_err();
        assert!(matches!(err, RenderError::MissingBundle { .. }));
    }
}
