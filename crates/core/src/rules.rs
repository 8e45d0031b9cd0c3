//! Client-asset classification rules.
//!
//! Both server modes decide "is this request a client asset?" and
//! "does it need a forced script content type?" from one parameterized
//! rule set, so the two modes' behavior stays auditable in one place.

/// Prefix under which node-module shims are served.
const NODE_MODULES_PREFIX: &str = "/bud/node_modules/";

/// Prefix under which view sources are served.
const VIEW_PREFIX: &str = "/bud/view/";

/// Mode-specific classification and content-type override rules.
#[derive(Clone, Debug)]
pub struct AssetRules {
    /// A path matching any of these prefixes is a client asset.
    client_prefixes: &'static [&'static str],
    /// Paths matching these prefixes get the forced script content type.
    script_prefixes: &'static [&'static str],
    /// Paths matching these suffixes get the forced script content type.
    script_suffixes: &'static [&'static str],
    /// The content type forced onto matched script paths. Overrides any
    /// extension-based guess, since these files may lack a recognized
    /// extension or must run as scripts regardless of sniffed type.
    content_type: &'static str,
}

impl AssetRules {
    /// Rules for the live (dev-proxy) server.
    ///
    /// View sources such as `.svelte` files are served raw and must be
    /// interpreted as scripts by the browser.
    pub fn live() -> Self {
        Self {
            client_prefixes: &[NODE_MODULES_PREFIX, VIEW_PREFIX],
            script_prefixes: &[NODE_MODULES_PREFIX],
            script_suffixes: &[".svelte"],
            content_type: "application/javascript",
        }
    }

    /// Rules for the static (packaged) server.
    ///
    /// Packaged bundles are pre-resolved, so only the node-module shims
    /// need the override. The MIME string differs from live mode and is
    /// preserved exactly for compatibility.
    pub fn packaged() -> Self {
        Self {
            client_prefixes: &[NODE_MODULES_PREFIX, VIEW_PREFIX],
            script_prefixes: &[NODE_MODULES_PREFIX],
            script_suffixes: &[],
            content_type: "text/javascript",
        }
    }

    /// Whether a request path should be served as a client asset rather
    /// than forwarded down the middleware chain.
    pub fn is_client(&self, path: &str) -> bool {
        self.client_prefixes.iter().any(|p| path.starts_with(p))
    }

    /// The forced script content type for a path, if any.
    pub fn script_content_type(&self, path: &str) -> Option<&'static str> {
        let matched = self.script_prefixes.iter().any(|p| path.starts_with(p))
            || self.script_suffixes.iter().any(|s| path.ends_with(s));
        matched.then_some(self.content_type)
    }
}
