//! Minimal CGI glue: request detection, header emission, and query
//! parameter extraction for the feed endpoint.

/// A detected CGI invocation of the feed endpoint.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CgiRequest {
    /// Optional exact module filter from the `Module` query parameter.
    pub module: Option<String>,
}

/// Detect a CGI invocation. The web server sets `REQUEST_URI` for CGI
/// children; its presence selects feed mode.
pub fn detect() -> Option<CgiRequest> {
    std::env::var_os("REQUEST_URI")?;
    let query = std::env::var("QUERY_STRING").unwrap_or_default();
    Some(CgiRequest {
        module: param(&query, "Module"),
    })
}

/// The response header for the RSS feed, terminated by the blank line
/// that separates headers from the body.
pub fn send_rss_header() {
    print!("Content-type: application/rss+xml\n\n");
}

fn param(query: &str, name: &str) -> Option<String> {
    for pair in query.split('&') {
        let mut kv = pair.splitn(2, '=');
        if kv.next() == Some(name) {
            let raw = kv.next().unwrap_or("");
            return Some(
                urlencoding::decode(raw)
                    .map(|v| v.into_owned())
                    .unwrap_or_else(|_| raw.to_string()),
            );
        }
    }
    None
}
