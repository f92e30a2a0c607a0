use may_minihttp::Request;
use smallvec::SmallVec;
use std::io::Read;
use std::sync::Arc;
use tracing::{debug, info, warn};

/// Maximum inline headers before heap allocation
pub const MAX_INLINE_HEADERS: usize = 16;

/// Header storage for the request path; names are lowercased.
pub type HeaderVec = SmallVec<[(Arc<str>, String); MAX_INLINE_HEADERS]>;

/// Parsed HTTP request data used by `SurveyService`.
///
/// The body is kept as raw bytes. Whether it is valid JSON is part of the
/// submission contract and decided by the handler, not here.
#[derive(Debug, PartialEq)]
pub struct ParsedRequest {
    /// HTTP method (GET, POST, etc.)
    pub method: String,
    /// Request path without the query string
    pub path: String,
    /// HTTP headers (lowercase names)
    pub headers: HeaderVec,
    /// Raw request body
    pub body: Vec<u8>,
}

impl ParsedRequest {
    /// Get a header by name (case-insensitive per RFC 7230)
    #[inline]
    #[must_use]
    pub fn get_header(&self, name: &str) -> Option<&str> {
        self.headers
            .iter()
            .find(|(k, _)| k.eq_ignore_ascii_case(name))
            .map(|(_, v)| v.as_str())
    }
}

/// Strip the query string from a request target.
#[must_use]
pub fn route_path(raw_path: &str) -> &str {
    raw_path.split('?').next().unwrap_or("/")
}

/// Parse an incoming HTTP request into a ParsedRequest
///
/// Extracts method, path and headers first; the body reader consumes the
/// request so it is read last.
pub fn parse_request(req: Request) -> ParsedRequest {
    let method = req.method().to_string();
    let path = route_path(req.path()).to_string();

    let headers: HeaderVec = req
        .headers()
        .iter()
        .map(|h| {
            (
                Arc::from(h.name.to_ascii_lowercase()),
                String::from_utf8_lossy(h.value).to_string(),
            )
        })
        .collect();

    debug!(
        header_count = headers.len(),
        header_names = ?headers.iter().map(|(k, _)| k.as_ref()).take(20).collect::<Vec<_>>(),
        "Headers extracted"
    );

    let mut body = Vec::new();
    if let Err(e) = req.body().read_to_end(&mut body) {
        // A truncated body is reported to the caller as malformed JSON.
        warn!(error = %e, bytes_read = body.len(), "Request body read failed");
    }

    info!(
        method = %method,
        path = %path,
        headers_count = headers.len(),
        body_size_bytes = body.len(),
        "HTTP request parsed"
    );

    ParsedRequest {
        method,
        path,
        headers,
        body,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_route_path_strips_query() {
        assert_eq!(route_path("/api/submit-survey?x=1"), "/api/submit-survey");
        assert_eq!(route_path("/health"), "/health");
        assert_eq!(route_path(""), "");
    }

    #[test]
    fn test_get_header_case_insensitive() {
        let mut headers = HeaderVec::new();
        headers.push((Arc::from("x-request-id"), "abc".to_string()));
        let req = ParsedRequest {
            method: "POST".into(),
            path: "/".into(),
            headers,
            body: Vec::new(),
        };
        assert_eq!(req.get_header("X-Request-Id"), Some("abc"));
        assert_eq!(req.get_header("content-type"), None);
    }
}
