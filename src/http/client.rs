//! HTTP executor and its reqwest implementation
//!
//! [`HttpClient`] issues a [`RequestDescriptor`]:
//! - GET sends params as the query string
//! - POST sends params as a form-encoded body
//! - POST with body sends params as the query string and the rendered body
//! - Pages are walked in a background task when pagination is attached
//!
//! There are no retries at this layer.

use super::rate_limit::{RateLimiter, RateLimiterConfig};
use super::request::RequestDescriptor;
use super::response::{BodyStream, HttpResponse, RequestTarget};
use crate::error::{Error, Result};
use crate::pagination::{NextPage, PaginationState};
use crate::types::RequestMethod;
use async_trait::async_trait;
use bytes::Bytes;
use futures::{stream, StreamExt, TryStreamExt};
use reqwest::header::CONTENT_TYPE;
use reqwest::{Client, Response};
use std::time::Duration;
use tokio::sync::mpsc;
use tracing::{debug, warn};
use url::Url;

/// Pages buffered between the page walker and the consumer
const PAGE_CHANNEL_CAPACITY: usize = 16;

/// Executes rendered requests
///
/// The collector only talks to HTTP through this trait, so tests and hosts
/// can substitute their own transport.
#[async_trait]
pub trait HttpExecutor: Send + Sync {
    /// Issue the request and return the first response
    ///
    /// When the descriptor asks for streaming and carries pagination, the
    /// returned body spans every page.
    async fn execute(&self, request: RequestDescriptor) -> Result<HttpResponse>;
}

/// Configuration for the HTTP client
#[derive(Debug, Clone)]
pub struct HttpClientConfig {
    /// Connect timeout
    pub connect_timeout: Duration,
    /// Rate limiter configuration
    pub rate_limit: Option<RateLimiterConfig>,
    /// User agent string
    pub user_agent: String,
}

impl Default for HttpClientConfig {
    fn default() -> Self {
        Self {
            connect_timeout: Duration::from_secs(10),
            rate_limit: None,
            user_agent: format!("rest-collector/{}", env!("CARGO_PKG_VERSION")),
        }
    }
}

impl HttpClientConfig {
    /// Create a new config builder
    pub fn builder() -> HttpClientConfigBuilder {
        HttpClientConfigBuilder::default()
    }
}

/// Builder for HTTP client config
#[derive(Default)]
pub struct HttpClientConfigBuilder {
    config: HttpClientConfig,
}

impl HttpClientConfigBuilder {
    /// Set the connect timeout
    pub fn connect_timeout(mut self, timeout: Duration) -> Self {
        self.config.connect_timeout = timeout;
        self
    }

    /// Set rate limiter
    pub fn rate_limit(mut self, config: RateLimiterConfig) -> Self {
        self.config.rate_limit = Some(config);
        self
    }

    /// Set user agent
    pub fn user_agent(mut self, agent: impl Into<String>) -> Self {
        self.config.user_agent = agent.into();
        self
    }

    /// Build the config
    pub fn build(self) -> HttpClientConfig {
        self.config
    }
}

/// reqwest-backed [`HttpExecutor`] with optional rate limiting
#[derive(Clone)]
pub struct HttpClient {
    client: Client,
    config: HttpClientConfig,
    rate_limiter: Option<RateLimiter>,
}

impl HttpClient {
    /// Create a new HTTP client with default configuration
    pub fn new() -> Result<Self> {
        Self::with_config(HttpClientConfig::default())
    }

    /// Create a new HTTP client with custom configuration
    pub fn with_config(config: HttpClientConfig) -> Result<Self> {
        let client = Client::builder()
            .connect_timeout(config.connect_timeout)
            .user_agent(&config.user_agent)
            .build()?;

        let rate_limiter = config.rate_limit.as_ref().map(RateLimiter::new);

        Ok(Self {
            client,
            config,
            rate_limiter,
        })
    }

    /// Check if rate limiting is enabled
    pub fn has_rate_limiter(&self) -> bool {
        self.rate_limiter.is_some()
    }

    /// Send one request, returning the raw response and its target
    async fn send(&self, request: &RequestDescriptor) -> Result<(Response, RequestTarget)> {
        let url = Url::parse(&request.url)?;
        let verb = request.method.verb();
        let target = RequestTarget::from_url(&url, verb);

        // Wait for rate limiter
        if let Some(ref limiter) = self.rate_limiter {
            limiter.wait().await;
        }

        let mut req = self
            .client
            .request(verb.into(), url)
            .timeout(request.timeout);

        for (key, value) in &request.headers {
            req = req.header(key.as_str(), value.as_str());
        }

        match request.method {
            RequestMethod::Get => {
                if !request.params.is_empty() {
                    req = req.query(&request.params);
                }
            }
            RequestMethod::Post => {
                if !request.params.is_empty() {
                    req = req.form(&request.params);
                }
            }
            RequestMethod::PostWithBody => {
                if !request.params.is_empty() {
                    req = req.query(&request.params);
                }
                if request.header(CONTENT_TYPE.as_str()).is_none() {
                    req = req.header(CONTENT_TYPE, "application/json");
                }
                req = req.body(request.body.clone().unwrap_or_default());
            }
        }

        if let Some(ref basic) = request.basic_auth {
            req = req.basic_auth(&basic.username, Some(&basic.password));
        }

        debug!(request = %target, params = request.params.len(), "sending request");
        let response = req
            .send()
            .await
            .map_err(|e| transport_error(e, request.timeout))?;
        debug!(request = %target, status = response.status().as_u16(), "received response");

        Ok((response, target))
    }
}

#[async_trait]
impl HttpExecutor for HttpClient {
    async fn execute(&self, request: RequestDescriptor) -> Result<HttpResponse> {
        let (response, target) = self.send(&request).await?;
        let status = response.status().as_u16();
        let headers = response.headers().clone();

        let body: BodyStream = if request.pagination.is_some() {
            let (tx, rx) = mpsc::channel(PAGE_CHANNEL_CAPACITY);
            tokio::spawn(walk_pages(self.clone(), request.clone(), response, tx));
            Box::pin(stream::unfold(rx, |mut rx| async move {
                rx.recv().await.map(|item| (item, rx))
            }))
        } else {
            let timeout = request.timeout;
            Box::pin(
                response
                    .bytes_stream()
                    .map_err(move |e| transport_error(e, timeout)),
            )
        };

        let response = HttpResponse::streaming(status, headers, target, body);
        if request.stream {
            Ok(response)
        } else {
            let status = response.status();
            let headers = response.headers().clone();
            let target = response.target().clone();
            let bytes = response.read_body().await?;
            Ok(HttpResponse::buffered(status, headers, target, bytes))
        }
    }
}

impl std::fmt::Debug for HttpClient {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("HttpClient")
            .field("config", &self.config)
            .field("has_rate_limiter", &self.rate_limiter.is_some())
            .finish_non_exhaustive()
    }
}

/// Map a reqwest failure, separating timeouts
fn transport_error(e: reqwest::Error, timeout: Duration) -> Error {
    if e.is_timeout() {
        Error::Timeout {
            timeout_ms: timeout.as_millis() as u64,
        }
    } else {
        Error::Transport(e)
    }
}

/// Forward every page of a paginated request into `tx`
///
/// The first page is forwarded whatever its status (the caller sees that
/// status on the response); a failed later page becomes an error item. The
/// walk ends when pagination is done, the consumer goes away or a request
/// fails.
async fn walk_pages(
    client: HttpClient,
    mut request: RequestDescriptor,
    first: Response,
    tx: mpsc::Sender<Result<Bytes>>,
) {
    let Some(active) = request.pagination.take() else {
        return;
    };
    let paginator = active.config.paginator();
    let mut state = PaginationState::new(active.counter.get(), active.config.max_pages());
    let mut response = first;
    let mut first_page = true;

    loop {
        let status = response.status();
        if !first_page && !status.is_success() {
            let target = match Url::parse(&request.url) {
                Ok(url) => RequestTarget::from_url(&url, request.method.verb()),
                Err(e) => {
                    let _ = tx.send(Err(e.into())).await;
                    return;
                }
            };
            let _ = tx
                .send(Err(Error::http_status(status.as_u16(), target)))
                .await;
            return;
        }

        let headers = response.headers().clone();
        let next = if paginator.needs_body() {
            let bytes = match response.bytes().await {
                Ok(bytes) => bytes,
                Err(e) => {
                    let _ = tx.send(Err(transport_error(e, request.timeout))).await;
                    return;
                }
            };
            let body: Option<serde_json::Value> = serde_json::from_slice(&bytes).ok();
            if tx.send(Ok(bytes)).await.is_err() {
                return;
            }
            if !status.is_success() {
                return;
            }
            paginator.process_response(&headers, body.as_ref(), &mut state)
        } else {
            let next = if status.is_success() {
                paginator.process_response(&headers, None, &mut state)
            } else {
                NextPage::Done
            };
            let mut chunks = Box::pin(response.bytes_stream());
            while let Some(chunk) = chunks.next().await {
                let item = chunk.map_err(|e| transport_error(e, request.timeout));
                let failed = item.is_err();
                if tx.send(item).await.is_err() || failed {
                    return;
                }
            }
            next
        };

        let NextPage::Continue { query_params, url } = next else {
            debug!(pages = state.page, url = %request.url, "pagination complete");
            return;
        };

        if let Some(next_url) = url {
            match Url::parse(&request.url).and_then(|current| current.join(&next_url)) {
                Ok(joined) => request.follow_url(joined.as_str()),
                Err(e) => {
                    warn!(next = %next_url, error = %e, "invalid next page URL");
                    let _ = tx.send(Err(e.into())).await;
                    return;
                }
            }
        }
        for (name, value) in query_params {
            request.set_param(name, value);
        }
        active.counter.set(state.page);
        first_page = false;

        response = match client.send(&request).await {
            Ok((response, _)) => response,
            Err(e) => {
                let _ = tx.send(Err(e)).await;
                return;
            }
        };
    }
}
