//! Pagination types and traits
//!
//! Defines the core pagination abstractions used by all strategies.

use super::strategies::{
    LinkHeaderPaginator, NoPaginator, ResponseBodyPaginator, ResponseHeaderPaginator,
};
use reqwest::header::HeaderMap;
use serde_json::Value;
use std::collections::HashMap;
use std::sync::atomic::{AtomicU32, Ordering};
use std::sync::Arc;

/// Result of the next page computation
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum NextPage {
    /// More pages available with these parameters
    Continue {
        /// Query parameters to add/replace
        query_params: HashMap<String, String>,
        /// Optional new URL, absolute or relative to the current page
        url: Option<String>,
    },
    /// No more pages
    Done,
}

impl NextPage {
    /// Create a continuation with a single parameter
    pub fn with_param(key: impl Into<String>, value: impl Into<String>) -> Self {
        let mut params = HashMap::new();
        params.insert(key.into(), value.into());
        Self::Continue {
            query_params: params,
            url: None,
        }
    }

    /// Create a continuation with a new URL
    pub fn with_url(url: impl Into<String>) -> Self {
        Self::Continue {
            query_params: HashMap::new(),
            url: Some(url.into()),
        }
    }

    /// Continuation from a next-page token
    ///
    /// Absolute URLs and absolute paths are followed directly; anything else
    /// is sent as the `param` query parameter.
    pub fn from_token(param: &str, token: &str) -> Self {
        if token.starts_with("http://") || token.starts_with("https://") || token.starts_with('/')
        {
            Self::with_url(token)
        } else {
            Self::with_param(param, token)
        }
    }

    /// Check if this is a done result
    pub fn is_done(&self) -> bool {
        matches!(self, Self::Done)
    }

    /// Check if this is a continue result
    pub fn is_continue(&self) -> bool {
        matches!(self, Self::Continue { .. })
    }
}

/// Pagination descriptor attached to collect requests
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub enum PaginationConfig {
    /// No pagination
    #[default]
    None,

    /// Next-page token carried in a response header
    ResponseHeader {
        /// Header holding the token
        next_page_field: String,
        /// Hard page limit, 0 for unlimited
        max_pages: u32,
    },

    /// Next-page token carried in a response body field
    ResponseBody {
        /// Dotted path of the body field holding the token
        next_page_field: String,
        /// Hard page limit, 0 for unlimited
        max_pages: u32,
    },

    /// Link header pagination (RFC 8288)
    LinkHeader {
        /// Rel to follow (usually `next`)
        next_relation: String,
        /// Rel naming the current page (usually `self`)
        current_relation: Option<String>,
        /// Hard page limit, 0 for unlimited
        max_pages: u32,
    },
}

impl PaginationConfig {
    /// Create response header pagination config
    pub fn response_header(next_page_field: impl Into<String>, max_pages: u32) -> Self {
        Self::ResponseHeader {
            next_page_field: next_page_field.into(),
            max_pages,
        }
    }

    /// Create response body pagination config
    pub fn response_body(next_page_field: impl Into<String>, max_pages: u32) -> Self {
        Self::ResponseBody {
            next_page_field: next_page_field.into(),
            max_pages,
        }
    }

    /// Create link header pagination config
    pub fn link_header(
        next_relation: impl Into<String>,
        current_relation: Option<String>,
        max_pages: u32,
    ) -> Self {
        Self::LinkHeader {
            next_relation: next_relation.into(),
            current_relation,
            max_pages,
        }
    }

    /// Whether pagination is disabled
    pub fn is_none(&self) -> bool {
        matches!(self, Self::None)
    }

    /// Configured page limit (0 for unlimited or no pagination)
    pub fn max_pages(&self) -> u32 {
        match self {
            Self::None => 0,
            Self::ResponseHeader { max_pages, .. }
            | Self::ResponseBody { max_pages, .. }
            | Self::LinkHeader { max_pages, .. } => *max_pages,
        }
    }

    /// Config name as used in settings files
    pub fn kind(&self) -> &'static str {
        match self {
            Self::None => "none",
            Self::ResponseHeader { .. } => "response_header",
            Self::ResponseBody { .. } => "response_body",
            Self::LinkHeader { .. } => "response_header_link",
        }
    }

    /// Build the strategy for this descriptor
    pub fn paginator(&self) -> Box<dyn Paginator> {
        match self {
            Self::None => Box::new(NoPaginator),
            Self::ResponseHeader {
                next_page_field, ..
            } => Box::new(ResponseHeaderPaginator::new(next_page_field)),
            Self::ResponseBody {
                next_page_field, ..
            } => Box::new(ResponseBodyPaginator::new(next_page_field)),
            Self::LinkHeader {
                next_relation,
                current_relation,
                ..
            } => Box::new(LinkHeaderPaginator::new(
                next_relation,
                current_relation.clone(),
            )),
        }
    }
}

/// Tracks pagination state during iteration
#[derive(Debug, Clone, Default)]
pub struct PaginationState {
    /// Number of the page most recently fetched
    pub page: u32,
    /// Hard page limit, 0 for unlimited
    pub max_pages: u32,
    /// Is pagination complete?
    pub done: bool,
}

impl PaginationState {
    /// State for a walk whose first page is `page`
    pub fn new(page: u32, max_pages: u32) -> Self {
        Self {
            page,
            max_pages,
            done: false,
        }
    }

    /// Whether the page limit has been reached
    pub fn at_limit(&self) -> bool {
        self.max_pages > 0 && self.page >= self.max_pages
    }

    /// Mark pagination as complete
    pub fn mark_done(&mut self) {
        self.done = true;
    }

    /// Increment page number
    pub fn next_page(&mut self) {
        self.page += 1;
    }
}

/// Page counter shared between a work item and the request walking its pages
#[derive(Debug, Clone, Default)]
pub struct PageCounter(Arc<AtomicU32>);

impl PageCounter {
    /// Counter starting at `page`
    pub fn new(page: u32) -> Self {
        Self(Arc::new(AtomicU32::new(page)))
    }

    /// Current page number
    pub fn get(&self) -> u32 {
        self.0.load(Ordering::Relaxed)
    }

    /// Record the page now being fetched
    pub fn set(&self, page: u32) {
        self.0.store(page, Ordering::Relaxed);
    }
}

/// Core trait for pagination strategies
pub trait Paginator: Send + Sync {
    /// Whether [`Paginator::process_response`] needs the parsed page body
    fn needs_body(&self) -> bool {
        false
    }

    /// Process a response and determine if there's a next page
    ///
    /// The page limit is enforced here: once it is reached the result is
    /// [`NextPage::Done`] whatever the response says.
    fn process_response(
        &self,
        headers: &HeaderMap,
        body: Option<&Value>,
        state: &mut PaginationState,
    ) -> NextPage {
        if state.done || state.at_limit() {
            state.mark_done();
            return NextPage::Done;
        }
        let next = self.next_page(headers, body);
        if next.is_continue() {
            state.next_page();
        } else {
            state.mark_done();
        }
        next
    }

    /// Strategy-specific next page decision
    fn next_page(&self, headers: &HeaderMap, body: Option<&Value>) -> NextPage;
}
