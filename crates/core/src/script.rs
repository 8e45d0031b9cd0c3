//! Evaluation-expression construction for the SSR wire protocol.
//!
//! The evaluation unit handed to the script engine is the bundle source
//! followed by one invocation of its exported entry point:
//!
//! ```text
//! <bundle>; bud.render("<route>", <props JSON>)
//! ```
//!
//! The route is embedded as a JS string literal; the props JSON is
//! already valid JS expression syntax and is inserted verbatim, never
//! re-escaped.

/// Logical path of the SSR bundle within an asset source.
pub const SSR_BUNDLE_PATH: &str = "bud/view/_ssr.js";

/// Fixed unit name passed to the script engine for every evaluation.
pub const SSR_UNIT_NAME: &str = "_ssr.js";

/// Entry point exported by the bundle.
const ENTRY_POINT: &str = "bud.render";

/// Encode a route as a JS string literal.
///
/// JSON string encoding is a strict subset of JS string literal syntax,
/// so quotes, backslashes, control characters, and non-BMP text all
/// come out escaped and cannot break out of the invocation.
pub fn js_string(route: &str) -> String {
    // Strings always encode; infallible for &str
    serde_json::to_string(route).unwrap_or_default()
}

/// Build the full evaluation unit for one render call.
pub fn render_expr(bundle: &str, route: &str, props_json: &str) -> String {
    format!(
        "{bundle}; {ENTRY_POINT}({route}, {props_json})",
        route = js_string(route)
    )
}
