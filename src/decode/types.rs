//! Decoder types and traits
//!
//! Defines the payload format detection and the decoder abstraction.

use crate::error::Result;
use serde_json::Value;

/// Format of a discovery payload
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PayloadFormat {
    /// JSON document
    Json,
    /// XML document
    Xml,
}

impl PayloadFormat {
    /// Format declared by a `Content-Type` header, if recognised
    pub fn from_content_type(content_type: &str) -> Option<Self> {
        let mime = content_type
            .split(';')
            .next()
            .unwrap_or_default()
            .trim()
            .to_ascii_lowercase();
        match mime.as_str() {
            "application/json" | "text/json" => Some(Self::Json),
            "application/xml" | "text/xml" => Some(Self::Xml),
            m if m.ends_with("+json") => Some(Self::Json),
            m if m.ends_with("+xml") => Some(Self::Xml),
            _ => None,
        }
    }
}

/// Trait for decoding a response body into a JSON value
pub trait PayloadDecoder: Send + Sync {
    /// Decode the whole body
    fn decode(&self, body: &str) -> Result<Value>;
}
