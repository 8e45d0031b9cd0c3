//! The script engine capability consumed by the renderer.

use async_trait::async_trait;
use thiserror::Error;

/// An embedded script evaluator: one call in, one textual result out.
///
/// No streaming, no session state across calls. Implementations must be
/// safe for concurrent use; an engine that cannot evaluate concurrently
/// is responsible for serializing its own calls (the renderer issues
/// them without additional locking).
#[async_trait]
pub trait ScriptEngine: Send + Sync {
    /// Evaluate `source` under the given unit name and return the
    /// stringified completion value.
    async fn eval(&self, name: &str, source: &str) -> Result<String, EngineError>;
}

/// Script evaluation failures. Propagated as-is, never retried.
#[derive(Error, Debug)]
pub enum EngineError {
    /// The engine ran but the script threw or failed to compile.
    #[error("view: script evaluation failed: {0}")]
    Eval(String),

    /// The engine could not be reached at all.
    #[error("view: script engine unavailable: {0}")]
    Unavailable(String),
}
