//! Protocol error types (pure - no I/O variants).

use thiserror::Error;

/// Violations of the SSR wire protocol: the engine's result either
/// failed to parse or parsed into an invalid response.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ProtocolError {
    #[error("view: malformed render response: {0}")]
    MalformedResponse(String),

    #[error("view: invalid status code {0}")]
    InvalidStatus(i64),
}

pub type Result<T> = std::result::Result<T, ProtocolError>;
