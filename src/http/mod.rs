//! HTTP client module
//!
//! Provides the [`HttpExecutor`] seam and its reqwest implementation.
//!
//! # Features
//!
//! - **Request templates**: `{{ name }}` rendering of url, params, headers and body
//! - **Streaming**: bodies delivered chunk by chunk
//! - **Page walking**: pagination followed in a background task
//! - **Rate Limiting**: Token bucket rate limiter using governor

mod client;
mod rate_limit;
mod request;
mod response;

pub use client::{HttpClient, HttpClientConfig, HttpClientConfigBuilder, HttpExecutor};
pub use rate_limit::{RateLimiter, RateLimiterConfig};
pub use request::{ActivePagination, BasicCredentials, RequestDescriptor, RequestTemplate};
pub use response::{BodyStream, HttpResponse, RequestTarget};

pub(crate) use response::preview;
