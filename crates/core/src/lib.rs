//! Pure view-rendering protocol logic - no I/O, no async, no side effects.
//!
//! This crate provides:
//! - The render response type with status validation
//! - Evaluation-expression construction with exact route escaping
//! - The parameterized client-asset classifier shared by both server modes
//! - Protocol error types
//!
//! # Example
//!
//! ```
//! use budview_core::{parse_response, render_expr, AssetRules};
//!
//! // Build the evaluation unit sent to the script engine
//! let expr = render_expr("var bud = {render(r, p) {}}", "/posts", r#"{"id":1}"#);
//! assert!(expr.ends_with(r#"; bud.render("/posts", {"id":1})"#));
//!
//! // Parse and validate an engine result
//! let res = parse_response(r#"{"status":200,"headers":{},"body":"ok"}"#).unwrap();
//! assert_eq!(res.status, 200);
//!
//! // Classify request paths
//! let rules = AssetRules::live();
//! assert!(rules.is_client("/bud/view/index.svelte"));
//! assert!(!rules.is_client("/about"));
//! ```

mod error;
mod response;
mod rules;
mod script;

pub use error::{ProtocolError, Result};
pub use response::{parse_response, RenderResponse};
pub use rules::AssetRules;
pub use script::{js_string, render_expr, SSR_BUNDLE_PATH, SSR_UNIT_NAME};
