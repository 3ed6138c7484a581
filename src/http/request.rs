//! Request templates and rendered request descriptors

use crate::error::Result;
use crate::pagination::{PageCounter, PaginationConfig};
use crate::template::{render, render_pairs, TemplateContext};
use crate::types::RequestMethod;
use std::fmt;
use std::time::Duration;

/// A configured request whose url, params, headers and body may contain
/// `{{ name }}` placeholders
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RequestTemplate {
    /// URL template
    pub url: String,
    /// How params and body are sent
    pub method: RequestMethod,
    /// Ordered, trimmed query or form parameters
    pub params: Vec<(String, String)>,
    /// Ordered, trimmed headers
    pub headers: Vec<(String, String)>,
    /// Body template, only sent for [`RequestMethod::PostWithBody`]
    pub body: Option<String>,
}

impl RequestTemplate {
    /// Create a template with no params, headers or body
    pub fn new(url: impl Into<String>, method: RequestMethod) -> Self {
        Self {
            url: url.into(),
            method,
            ..Default::default()
        }
    }

    /// Set the parameters
    #[must_use]
    pub fn with_params(mut self, params: Vec<(String, String)>) -> Self {
        self.params = params;
        self
    }

    /// Set the headers
    #[must_use]
    pub fn with_headers(mut self, headers: Vec<(String, String)>) -> Self {
        self.headers = headers;
        self
    }

    /// Set the body template
    #[must_use]
    pub fn with_body(mut self, body: impl Into<String>) -> Self {
        self.body = Some(body.into());
        self
    }

    /// Render every templated part against `ctx`
    pub fn render(&self, ctx: &TemplateContext, timeout: Duration) -> Result<RequestDescriptor> {
        let body = match (&self.body, self.method) {
            (Some(body), RequestMethod::PostWithBody) => Some(render(body, ctx)?),
            _ => None,
        };

        Ok(RequestDescriptor {
            url: render(&self.url, ctx)?,
            method: self.method,
            headers: render_pairs(&self.headers, ctx)?,
            params: render_pairs(&self.params, ctx)?,
            body,
            basic_auth: None,
            timeout,
            pagination: None,
            stream: false,
        })
    }
}

/// Username and password sent as HTTP basic auth
#[derive(Clone, PartialEq, Eq)]
pub struct BasicCredentials {
    /// Username
    pub username: String,
    /// Password
    pub password: String,
}

impl fmt::Debug for BasicCredentials {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("BasicCredentials")
            .field("username", &self.username)
            .field("password", &"***")
            .finish()
    }
}

/// Pagination attached to a request, with the counter it advances
#[derive(Debug, Clone)]
pub struct ActivePagination {
    /// Strategy descriptor
    pub config: PaginationConfig,
    /// Page counter of the work item
    pub counter: PageCounter,
}

/// A fully rendered request, ready for an [`HttpExecutor`](super::HttpExecutor)
#[derive(Debug, Clone)]
pub struct RequestDescriptor {
    /// Absolute URL
    pub url: String,
    /// How params and body are sent
    pub method: RequestMethod,
    /// Headers in order
    pub headers: Vec<(String, String)>,
    /// Query or form parameters in order
    pub params: Vec<(String, String)>,
    /// Raw body
    pub body: Option<String>,
    /// Basic credentials
    pub basic_auth: Option<BasicCredentials>,
    /// Per-request timeout
    pub timeout: Duration,
    /// Pages to walk after the first response
    pub pagination: Option<ActivePagination>,
    /// Deliver the body as a stream instead of buffering it
    pub stream: bool,
}

impl RequestDescriptor {
    /// Create a bare descriptor
    pub fn new(url: impl Into<String>, method: RequestMethod, timeout: Duration) -> Self {
        Self {
            url: url.into(),
            method,
            headers: Vec::new(),
            params: Vec::new(),
            body: None,
            basic_auth: None,
            timeout,
            pagination: None,
            stream: false,
        }
    }

    /// Header value by case-insensitive name
    pub fn header(&self, name: &str) -> Option<&str> {
        self.headers
            .iter()
            .find(|(n, _)| n.eq_ignore_ascii_case(name))
            .map(|(_, v)| v.as_str())
    }

    /// Set a header, replacing any existing value with the same name
    pub fn set_header(&mut self, name: impl Into<String>, value: impl Into<String>) {
        let name = name.into();
        self.headers.retain(|(n, _)| !n.eq_ignore_ascii_case(&name));
        self.headers.push((name, value.into()));
    }

    /// Set a parameter, replacing any existing value with the same name
    pub fn set_param(&mut self, name: impl Into<String>, value: impl Into<String>) {
        let name = name.into();
        let value = value.into();
        match self.params.iter_mut().find(|(n, _)| *n == name) {
            Some(existing) => existing.1 = value,
            None => self.params.push((name, value)),
        }
    }

    /// Move to another page URL
    ///
    /// Query parameters are dropped since the new URL carries its own; form
    /// parameters of a plain POST are kept.
    pub fn follow_url(&mut self, url: impl Into<String>) {
        self.url = url.into();
        if self.method.params_in_query() {
            self.params.clear();
        }
    }
}
