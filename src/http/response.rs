//! Responses returned by an [`HttpExecutor`](super::HttpExecutor)

use crate::decode::extract_path;
use crate::error::{Error, Result};
use crate::types::Method;
use bytes::{Bytes, BytesMut};
use futures::stream::{self, Stream, StreamExt};
use reqwest::header::{HeaderMap, CONTENT_TYPE};
use serde_json::Value;
use std::fmt;
use std::pin::Pin;
use url::Url;

/// Streamed response body
pub type BodyStream = Pin<Box<dyn Stream<Item = Result<Bytes>> + Send>>;

/// Where a request went, for error reports
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RequestTarget {
    /// Host name
    pub host: String,
    /// Port, the scheme default when not explicit
    pub port: u16,
    /// URL path
    pub path: String,
    /// HTTP verb
    pub method: Method,
}

impl RequestTarget {
    /// Target of a request to `url`
    pub fn from_url(url: &Url, method: Method) -> Self {
        Self {
            host: url.host_str().unwrap_or_default().to_string(),
            port: url.port_or_known_default().unwrap_or_default(),
            path: url.path().to_string(),
            method,
        }
    }
}

impl fmt::Display for RequestTarget {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} {}:{}{}", self.method, self.host, self.port, self.path)
    }
}

enum Body {
    Buffered(Bytes),
    Streaming(BodyStream),
}

/// Status, headers and body of the first response of a request
pub struct HttpResponse {
    status: u16,
    headers: HeaderMap,
    target: RequestTarget,
    body: Body,
}

impl HttpResponse {
    /// Response whose body is already in memory
    pub fn buffered(
        status: u16,
        headers: HeaderMap,
        target: RequestTarget,
        body: impl Into<Bytes>,
    ) -> Self {
        Self {
            status,
            headers,
            target,
            body: Body::Buffered(body.into()),
        }
    }

    /// Response whose body arrives as a stream
    pub fn streaming(
        status: u16,
        headers: HeaderMap,
        target: RequestTarget,
        body: BodyStream,
    ) -> Self {
        Self {
            status,
            headers,
            target,
            body: Body::Streaming(body),
        }
    }

    /// HTTP status code
    pub fn status(&self) -> u16 {
        self.status
    }

    /// Whether the status is 2xx
    pub fn is_success(&self) -> bool {
        (200..300).contains(&self.status)
    }

    /// Response headers
    pub fn headers(&self) -> &HeaderMap {
        &self.headers
    }

    /// Where the request went
    pub fn target(&self) -> &RequestTarget {
        &self.target
    }

    /// `Content-Type` header, if present and valid UTF-8
    pub fn content_type(&self) -> Option<&str> {
        self.headers
            .get(CONTENT_TYPE)
            .and_then(|v| v.to_str().ok())
    }

    /// Error describing this response's status
    pub fn status_error(&self) -> Error {
        Error::http_status(self.status, self.target.clone())
    }

    /// Read the whole body
    pub async fn read_body(self) -> Result<Bytes> {
        match self.body {
            Body::Buffered(bytes) => Ok(bytes),
            Body::Streaming(mut stream) => {
                let mut buf = BytesMut::new();
                while let Some(chunk) = stream.next().await {
                    buf.extend_from_slice(&chunk?);
                }
                Ok(buf.freeze())
            }
        }
    }

    /// Read the body as UTF-8 text
    pub async fn text(self) -> Result<String> {
        let bytes = self.read_body().await?;
        String::from_utf8(bytes.to_vec())
            .map_err(|e| Error::parse(format!("response body is not UTF-8: {e}")))
    }

    /// Parse the body as JSON and extract a field by path
    pub async fn extract_field(self, path: &str) -> Result<Option<Value>> {
        let bytes = self.read_body().await?;
        let value: Value = serde_json::from_slice(&bytes)?;
        extract_path(&value, path)
    }

    /// Turn the body into a stream
    pub fn into_stream(self) -> BodyStream {
        match self.body {
            Body::Buffered(bytes) if bytes.is_empty() => Box::pin(stream::empty()),
            Body::Buffered(bytes) => Box::pin(stream::once(async move { Ok(bytes) })),
            Body::Streaming(stream) => stream,
        }
    }
}

impl fmt::Debug for HttpResponse {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("HttpResponse")
            .field("status", &self.status)
            .field("target", &self.target)
            .field("streaming", &matches!(self.body, Body::Streaming(_)))
            .finish_non_exhaustive()
    }
}

/// Lossy UTF-8 preview of a payload for log lines
pub(crate) fn preview(bytes: &[u8], max: usize) -> String {
    let text = String::from_utf8_lossy(bytes);
    match text.char_indices().nth(max) {
        Some((idx, _)) => format!("{}...", &text[..idx]),
        None => text.into_owned(),
    }
}
