//! The structured response returned by the SSR bundle.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use crate::error::{ProtocolError, Result};

/// A validated render response: status line, headers, and body as
/// produced by the bundle's render entry point.
///
/// Header keys are unique; the HTTP layer applies them with
/// last-write-wins semantics and unspecified order.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct RenderResponse {
    pub status: u16,
    #[serde(default)]
    pub headers: BTreeMap<String, String>,
    #[serde(default)]
    pub body: String,
}

/// Raw wire shape. Status is parsed as i64 so out-of-range values
/// (including negatives) report `InvalidStatus` instead of a type error.
#[derive(Deserialize)]
struct RawResponse {
    status: i64,
    #[serde(default)]
    headers: BTreeMap<String, String>,
    #[serde(default)]
    body: String,
}

/// Parse and validate an engine result as a [`RenderResponse`].
///
/// Malformed JSON yields `ProtocolError::MalformedResponse`; a status
/// outside `100..=999` yields `ProtocolError::InvalidStatus` naming the
/// offending value.
pub fn parse_response(result: &str) -> Result<RenderResponse> {
    let raw: RawResponse = serde_json::from_str(result)
        .map_err(|e| ProtocolError::MalformedResponse(e.to_string()))?;
    if !(100..=999).contains(&raw.status) {
        return Err(ProtocolError::InvalidStatus(raw.status));
    }
    Ok(RenderResponse {
        status: raw.status as u16,
        headers: raw.headers,
        body: raw.body,
    })
}
