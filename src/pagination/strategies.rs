//! Pagination strategy implementations
//!
//! Each strategy handles a specific pagination pattern.

use super::types::{NextPage, Paginator};
use crate::decode::extract_path;
use reqwest::header::HeaderMap;
use serde_json::Value;

/// Query parameter name for a token read from `field`
fn param_name(field: &str) -> &str {
    let last = field.rsplit('.').next().unwrap_or(field);
    last.split('[').next().unwrap_or(last)
}

// ============================================================================
// Response Header Pagination
// ============================================================================

/// Next-page token in a response header
///
/// Common patterns:
/// - `X-Next-Page: https://api.example.com/items?page=2`
/// - `X-Next-Cursor: abc123` (sent back as `?X-Next-Cursor=abc123`)
#[derive(Debug, Clone)]
pub struct ResponseHeaderPaginator {
    /// Header holding the token
    pub header: String,
}

impl ResponseHeaderPaginator {
    /// Create a new response header paginator
    pub fn new(header: impl Into<String>) -> Self {
        Self {
            header: header.into(),
        }
    }
}

impl Paginator for ResponseHeaderPaginator {
    fn next_page(&self, headers: &HeaderMap, _body: Option<&Value>) -> NextPage {
        match headers
            .get(self.header.as_str())
            .and_then(|v| v.to_str().ok())
            .map(str::trim)
        {
            Some(token) if !token.is_empty() => NextPage::from_token(&self.header, token),
            _ => NextPage::Done,
        }
    }
}

// ============================================================================
// Response Body Pagination
// ============================================================================

/// Next-page token in a response body field
///
/// Common patterns:
/// - `{ "next": "https://api.example.com/items?page=2" }`
/// - `{ "meta": { "next_cursor": "abc123" } }` (sent as `?next_cursor=abc123`)
#[derive(Debug, Clone)]
pub struct ResponseBodyPaginator {
    /// Dotted path to the token
    pub path: String,
}

impl ResponseBodyPaginator {
    /// Create a new response body paginator
    pub fn new(path: impl Into<String>) -> Self {
        Self { path: path.into() }
    }
}

impl Paginator for ResponseBodyPaginator {
    fn needs_body(&self) -> bool {
        true
    }

    fn next_page(&self, _headers: &HeaderMap, body: Option<&Value>) -> NextPage {
        let token = body
            .and_then(|body| extract_path(body, &self.path).ok().flatten())
            .and_then(|value| match value {
                Value::String(s) => Some(s.trim().to_string()),
                Value::Number(n) => Some(n.to_string()),
                _ => None,
            });

        match token {
            Some(token) if !token.is_empty() => {
                NextPage::from_token(param_name(&self.path), &token)
            }
            _ => NextPage::Done,
        }
    }
}

// ============================================================================
// Link Header Pagination
// ============================================================================

/// Link header pagination (RFC 8288)
///
/// Extracts next page URL from the Link header.
/// Common in GitHub, GitLab APIs.
/// Format: `Link: <https://api.github.com/...?page=2>; rel="next", ...`
#[derive(Debug, Clone)]
pub struct LinkHeaderPaginator {
    /// Rel value to follow (default: "next")
    pub rel: String,
    /// Rel naming the current page; a next link equal to it ends the walk
    pub current_rel: Option<String>,
}

impl Default for LinkHeaderPaginator {
    fn default() -> Self {
        Self {
            rel: "next".to_string(),
            current_rel: None,
        }
    }
}

impl LinkHeaderPaginator {
    /// Create a new link header paginator
    pub fn new(rel: impl Into<String>, current_rel: Option<String>) -> Self {
        Self {
            rel: rel.into(),
            current_rel,
        }
    }
}

impl Paginator for LinkHeaderPaginator {
    fn next_page(&self, headers: &HeaderMap, _body: Option<&Value>) -> NextPage {
        let links: Vec<(String, Vec<String>)> = headers
            .get_all("link")
            .iter()
            .filter_map(|v| v.to_str().ok())
            .flat_map(parse_link_header)
            .collect();

        let find = |target: &str| {
            links
                .iter()
                .find(|(_, rels)| rels.iter().any(|r| r.eq_ignore_ascii_case(target)))
                .map(|(url, _)| url.clone())
        };

        let Some(next_url) = find(&self.rel) else {
            return NextPage::Done;
        };

        if let Some(current) = self.current_rel.as_deref().and_then(find) {
            if current == next_url {
                return NextPage::Done;
            }
        }

        NextPage::with_url(next_url)
    }
}

/// Parse a Link header into `(url, rels)` entries
pub(crate) fn parse_link_header(header: &str) -> Vec<(String, Vec<String>)> {
    // Link header format: <url>; rel="next", <url>; rel="prev"
    let mut links = Vec::new();
    for part in split_link_values(header) {
        let Some(rest) = part.trim().strip_prefix('<') else {
            continue;
        };
        let Some((url, params)) = rest.split_once('>') else {
            continue;
        };

        let mut rels = Vec::new();
        for param in params.split(';') {
            let Some((name, value)) = param.split_once('=') else {
                continue;
            };
            if name.trim().eq_ignore_ascii_case("rel") {
                let rel_value = value.trim().trim_matches('"').trim_matches('\'');
                rels.extend(rel_value.split_whitespace().map(str::to_string));
            }
        }

        if !rels.is_empty() {
            links.push((url.to_string(), rels));
        }
    }

    links
}

/// Split on commas that sit outside `<...>`; URLs may contain commas
fn split_link_values(header: &str) -> Vec<&str> {
    let mut values = Vec::new();
    let mut in_url = false;
    let mut start = 0;
    for (i, c) in header.char_indices() {
        match c {
            '<' => in_url = true,
            '>' => in_url = false,
            ',' if !in_url => {
                values.push(&header[start..i]);
                start = i + 1;
            }
            _ => {}
        }
    }
    values.push(&header[start..]);
    values
}

// ============================================================================
// No Pagination
// ============================================================================

/// No pagination - single request
#[derive(Debug, Clone, Default)]
pub struct NoPaginator;

impl Paginator for NoPaginator {
    fn next_page(&self, _headers: &HeaderMap, _body: Option<&Value>) -> NextPage {
        NextPage::Done
    }
}
