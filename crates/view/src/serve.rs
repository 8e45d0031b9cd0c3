//! Conditional-GET and byte-range serving of a single asset.
//!
//! Covers the slice of RFC 9110 the asset middleware needs:
//! `Last-Modified` / `If-Modified-Since` and single byte ranges.

use std::time::{Duration, SystemTime, UNIX_EPOCH};

use axum::{
    body::Body,
    http::{header, HeaderMap, StatusCode},
    response::Response,
};

use crate::assets::Asset;

/// Serve an asset with conditional-GET and single-range support.
///
/// `content_type` overrides the extension-based guess when present.
pub fn content(req_headers: &HeaderMap, content_type: Option<&'static str>, asset: Asset) -> Response {
    let content_type = content_type.unwrap_or_else(|| guess_content_type(&asset.path));

    if let Some(modified) = asset.modified {
        if not_modified(req_headers, modified) {
            return response(StatusCode::NOT_MODIFIED, content_type, Some(modified), Body::empty());
        }
    }

    let len = asset.bytes.len() as u64;
    let range = req_headers
        .get(header::RANGE)
        .and_then(|v| v.to_str().ok())
        .and_then(|v| parse_range(v, len));
    match range {
        Some(ByteRange::Satisfiable(start, end)) => {
            let body = asset.bytes.slice(start as usize..=end as usize);
            let mut res = response(
                StatusCode::PARTIAL_CONTENT,
                content_type,
                asset.modified,
                Body::from(body),
            );
            res.headers_mut().insert(
                header::CONTENT_RANGE,
                format!("bytes {start}-{end}/{len}").parse().unwrap(),
            );
            res
        }
        Some(ByteRange::Unsatisfiable) => {
            let mut res = response(
                StatusCode::RANGE_NOT_SATISFIABLE,
                content_type,
                asset.modified,
                Body::empty(),
            );
            res.headers_mut().insert(
                header::CONTENT_RANGE,
                format!("bytes */{len}").parse().unwrap(),
            );
            res
        }
        None => response(StatusCode::OK, content_type, asset.modified, Body::from(asset.bytes)),
    }
}

fn response(
    status: StatusCode,
    content_type: &'static str,
    modified: Option<SystemTime>,
    body: Body,
) -> Response {
    let mut builder = Response::builder()
        .status(status)
        .header(header::CONTENT_TYPE, content_type)
        .header(header::ACCEPT_RANGES, "bytes");
    if let Some(modified) = modified {
        builder = builder.header(header::LAST_MODIFIED, httpdate::fmt_http_date(modified));
    }
    builder.body(body).unwrap()
}

/// `If-Modified-Since` comparison at second precision (HTTP dates carry
/// no sub-second component).
fn not_modified(req_headers: &HeaderMap, modified: SystemTime) -> bool {
    let Some(since) = req_headers
        .get(header::IF_MODIFIED_SINCE)
        .and_then(|v| v.to_str().ok())
        .and_then(|v| httpdate::parse_http_date(v).ok())
    else {
        return false;
    };
    let truncated = modified
        .duration_since(UNIX_EPOCH)
        .map(|d| UNIX_EPOCH + Duration::from_secs(d.as_secs()))
        .unwrap_or(modified);
    truncated <= since
}

enum ByteRange {
    /// Inclusive start..=end within the asset.
    Satisfiable(u64, u64),
    Unsatisfiable,
}

/// Parse a single-range `Range` header against a known length.
///
/// Returns `None` for absent, malformed, or multi-range headers, which
/// are all served whole.
fn parse_range(value: &str, len: u64) -> Option<ByteRange> {
    let ranges = value.strip_prefix("bytes=")?;
    if ranges.contains(',') {
        return None;
    }
    let (start, end) = ranges.split_once('-')?;
    match (start.is_empty(), end.is_empty()) {
        // "-n": final n bytes
        (true, false) => {
            let n: u64 = end.parse().ok()?;
            if n == 0 || len == 0 {
                return Some(ByteRange::Unsatisfiable);
            }
            Some(ByteRange::Satisfiable(len.saturating_sub(n), len - 1))
        }
        // "a-": from a to the end
        (false, true) => {
            let start: u64 = start.parse().ok()?;
            if start >= len {
                return Some(ByteRange::Unsatisfiable);
            }
            Some(ByteRange::Satisfiable(start, len - 1))
        }
        // "a-b"
        (false, false) => {
            let start: u64 = start.parse().ok()?;
            let end: u64 = end.parse().ok()?;
            if start > end {
                return None;
            }
            if start >= len {
                return Some(ByteRange::Unsatisfiable);
            }
            Some(ByteRange::Satisfiable(start, end.min(len - 1)))
        }
        (true, true) => None,
    }
}

/// Extension-based fallback when no override applies.
fn guess_content_type(path: &str) -> &'static str {
    if path.ends_with(".js") || path.ends_with(".mjs") {
        "application/javascript; charset=utf-8"
    } else if path.ends_with(".css") {
        "text/css; charset=utf-8"
    } else if path.ends_with(".html") {
        "text/html; charset=utf-8"
    } else if path.ends_with(".json") || path.ends_with(".map") {
        "application/json"
    } else if path.ends_with(".svg") {
        "image/svg+xml"
    } else if path.ends_with(".wasm") {
        "application/wasm"
    } else {
        "application/octet-stream"
    }
}

#[cfg(test)]
mod tests {
    use bytes::Bytes;

    use super::*;

    fn asset(bytes: &'static [u8], modified: Option<SystemTime>) -> Asset {
        Asset {
            path: "/bud/view/app.js".to_string(),
            modified,
            bytes: Bytes::from_static(bytes),
        }
    }

    #[test]
    fn test_full_response() {
        let res = content(&HeaderMap::new(), None, asset(b"abcdef", None));
        assert_eq!(res.status(), StatusCode::OK);
        assert_eq!(
            res.headers()[header::CONTENT_TYPE],
            "application/javascript; charset=utf-8"
        );
        assert_eq!(res.headers()[header::ACCEPT_RANGES], "bytes");
    }

    #[test]
    fn test_override_beats_extension_guess() {
        let res = content(&HeaderMap::new(), Some("text/javascript"), asset(b"x", None));
        assert_eq!(res.headers()[header::CONTENT_TYPE], "text/javascript");
    }

    #[test]
    fn test_if_modified_since_yields_304() {
        let modified = UNIX_EPOCH + Duration::from_secs(1_700_000_000);
        let mut headers = HeaderMap::new();
        headers.insert(
            header::IF_MODIFIED_SINCE,
            httpdate::fmt_http_date(modified).parse().unwrap(),
        );
        let res = content(&headers, None, asset(b"abc", Some(modified)));
        assert_eq!(res.status(), StatusCode::NOT_MODIFIED);
    }

    #[test]
    fn test_stale_if_modified_since_serves_fresh() {
        let modified = UNIX_EPOCH + Duration::from_secs(1_700_000_000);
        let mut headers = HeaderMap::new();
        headers.insert(
            header::IF_MODIFIED_SINCE,
            httpdate::fmt_http_date(modified - Duration::from_secs(60))
                .parse()
                .unwrap(),
        );
        let res = content(&headers, None, asset(b"abc", Some(modified)));
        assert_eq!(res.status(), StatusCode::OK);
    }

    #[test]
    fn test_closed_range_yields_206() {
        let mut headers = HeaderMap::new();
        headers.insert(header::RANGE, "bytes=1-3".parse().unwrap());
        let res = content(&headers, None, asset(b"abcdef", None));
        assert_eq!(res.status(), StatusCode::PARTIAL_CONTENT);
        assert_eq!(res.headers()[header::CONTENT_RANGE], "bytes 1-3/6");
    }

    #[test]
    fn test_suffix_range() {
        let mut headers = HeaderMap::new();
        headers.insert(header::RANGE, "bytes=-2".parse().unwrap());
        let res = content(&headers, None, asset(b"abcdef", None));
        assert_eq!(res.status(), StatusCode::PARTIAL_CONTENT);
        assert_eq!(res.headers()[header::CONTENT_RANGE], "bytes 4-5/6");
    }

    #[test]
    fn test_out_of_bounds_range_yields_416() {
        let mut headers = HeaderMap::new();
        headers.insert(header::RANGE, "bytes=10-".parse().unwrap());
        let res = content(&headers, None, asset(b"abc", None));
        assert_eq!(res.status(), StatusCode::RANGE_NOT_SATISFIABLE);
        assert_eq!(res.headers()[header::CONTENT_RANGE], "bytes */3");
    }

    #[test]
    fn test_multi_range_served_whole() {
        let mut headers = HeaderMap::new();
        headers.insert(header::RANGE, "bytes=0-1,3-4".parse().unwrap());
        let res = content(&headers, None, asset(b"abcdef", None));
        assert_eq!(res.status(), StatusCode::OK);
    }
}
