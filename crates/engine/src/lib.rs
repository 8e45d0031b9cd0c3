//! deno_core-backed [`ScriptEngine`] for server-side view rendering.
//!
//! `JsRuntime` is not `Send`, so the engine owns one dedicated OS
//! thread with a single-threaded tokio runtime and feeds it evaluation
//! requests over a bounded channel. That structure also answers the
//! concurrency contract: calls are serialized by the engine itself, and
//! callers may invoke [`ScriptEngine::eval`] concurrently without
//! locking.
//!
//! Every evaluation runs in a fresh `JsRuntime`; no state survives a
//! call, matching the one-shot wire protocol.

use async_trait::async_trait;
use deno_core::{JsRuntime, RuntimeOptions};
use tokio::sync::{mpsc, oneshot};

use budview::{EngineError, ScriptEngine};
use budview_core::SSR_UNIT_NAME;

/// Requests queued ahead of the worker before `eval` callers block on
/// channel capacity.
const MAX_PENDING: usize = 64;

struct EvalRequest {
    name: String,
    source: String,
    reply: oneshot::Sender<Result<String, EngineError>>,
}

/// A script engine evaluating on a dedicated worker thread.
pub struct DenoEngine {
    request_tx: mpsc::Sender<EvalRequest>,
}

impl DenoEngine {
    /// Spawn the worker thread and return a handle to it.
    ///
    /// The worker exits when the last handle is dropped.
    pub fn spawn() -> Self {
        let (request_tx, mut request_rx) = mpsc::channel::<EvalRequest>(MAX_PENDING);

        std::thread::spawn(move || {
            let rt = tokio::runtime::Builder::new_current_thread()
                .enable_all()
                .build()
                .expect("failed to create tokio runtime for script engine worker");

            rt.block_on(async move {
                tracing::debug!("script engine worker started");

                while let Some(req) = request_rx.recv().await {
                    let result = eval_once(&req.name, req.source).await;
                    // Receiver may have given up; nothing to do then
                    let _ = req.reply.send(result);
                }

                tracing::debug!("script engine worker shutting down");
            });
        });

        Self { request_tx }
    }
}

impl Default for DenoEngine {
    fn default() -> Self {
        Self::spawn()
    }
}

#[async_trait]
impl ScriptEngine for DenoEngine {
    async fn eval(&self, name: &str, source: &str) -> Result<String, EngineError> {
        let (reply_tx, reply_rx) = oneshot::channel();
        self.request_tx
            .send(EvalRequest {
                name: name.to_string(),
                source: source.to_string(),
                reply: reply_tx,
            })
            .await
            .map_err(|_| EngineError::Unavailable("worker channel closed".to_string()))?;
        reply_rx
            .await
            .map_err(|_| EngineError::Unavailable("worker channel closed".to_string()))?
    }
}

/// Evaluate one script in a fresh runtime and stringify its completion
/// value.
async fn eval_once(name: &str, source: String) -> Result<String, EngineError> {
    let mut runtime = JsRuntime::new(RuntimeOptions::default());

    // execute_script wants a 'static unit name; the protocol only ever
    // uses the fixed SSR unit name.
    let unit: &'static str = if name == SSR_UNIT_NAME {
        SSR_UNIT_NAME
    } else {
        "<eval>"
    };

    let global = runtime
        .execute_script(unit, source)
        .map_err(|e| EngineError::Eval(e.to_string()))?;

    // Drain the event loop so pending microtasks settle before the
    // completion value is read.
    runtime
        .run_event_loop(Default::default())
        .await
        .map_err(|e| EngineError::Eval(e.to_string()))?;

    let scope = &mut runtime.handle_scope();
    let local = deno_core::v8::Local::new(scope, global);
    Ok(local.to_rust_string_lossy(scope))
}
