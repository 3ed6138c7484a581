//! Common types used throughout the REST collector
//!
//! This module contains shared type definitions, type aliases,
//! and utility types used across multiple modules.

use chrono::{DateTime, TimeZone, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

// ============================================================================
// Type Aliases
// ============================================================================

/// JSON value type (re-exported from serde_json)
pub type JsonValue = serde_json::Value;

/// JSON object type
pub type JsonObject = serde_json::Map<String, JsonValue>;

// ============================================================================
// HTTP Types
// ============================================================================

/// HTTP verb supported by the collector
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum Method {
    #[default]
    Get,
    Post,
}

impl fmt::Display for Method {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Method::Get => f.write_str("GET"),
            Method::Post => f.write_str("POST"),
        }
    }
}

impl From<Method> for reqwest::Method {
    fn from(method: Method) -> Self {
        match method {
            Method::Get => reqwest::Method::GET,
            Method::Post => reqwest::Method::POST,
        }
    }
}

/// How a configured request sends its parameters and body.
///
/// Accepted config spellings are `get`, `post` and `post_with_body`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum RequestMethod {
    /// GET, params in the query string
    #[default]
    Get,
    /// POST, params sent as a form-encoded body
    Post,
    /// POST with an explicit body template, params in the query string
    PostWithBody,
}

impl RequestMethod {
    /// The HTTP verb on the wire
    pub fn verb(self) -> Method {
        match self {
            RequestMethod::Get => Method::Get,
            RequestMethod::Post | RequestMethod::PostWithBody => Method::Post,
        }
    }

    /// Whether params travel in the query string
    pub fn params_in_query(self) -> bool {
        !matches!(self, RequestMethod::Post)
    }
}

impl FromStr for RequestMethod {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "get" => Ok(RequestMethod::Get),
            "post" => Ok(RequestMethod::Post),
            "post_with_body" => Ok(RequestMethod::PostWithBody),
            other => Err(format!(
                "method '{other}' must be one of: get, post, post_with_body"
            )),
        }
    }
}

/// A `{name, value}` pair as found in param and header lists
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct NameValue {
    /// Parameter or header name
    #[serde(default)]
    pub name: Option<String>,
    /// Value (may contain `{{ }}` templates)
    #[serde(default)]
    pub value: Option<String>,
}

impl NameValue {
    /// Create a new pair
    pub fn new(name: impl Into<String>, value: impl Into<String>) -> Self {
        Self {
            name: Some(name.into()),
            value: Some(value.into()),
        }
    }
}

/// Trim names and values, dropping entries where either ends up empty
pub fn trimmed_pairs(pairs: &[NameValue]) -> Vec<(String, String)> {
    pairs
        .iter()
        .filter_map(|pair| {
            let name = pair.name.as_deref().map(str::trim).unwrap_or_default();
            let value = pair.value.as_deref().map(str::trim).unwrap_or_default();
            if name.is_empty() || value.is_empty() {
                None
            } else {
                Some((name.to_string(), value.to_string()))
            }
        })
        .collect()
}

// ============================================================================
// Time Range
// ============================================================================

/// Earliest/latest bounds of a collection run
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct TimeRange {
    /// Lower bound (inclusive)
    pub earliest: Option<DateTime<Utc>>,
    /// Upper bound (exclusive)
    pub latest: Option<DateTime<Utc>>,
}

impl TimeRange {
    /// Create a range from epoch seconds
    pub fn from_epoch(earliest: Option<i64>, latest: Option<i64>) -> Self {
        Self {
            earliest: earliest.and_then(|s| Utc.timestamp_opt(s, 0).single()),
            latest: latest.and_then(|s| Utc.timestamp_opt(s, 0).single()),
        }
    }

    /// Earliest as epoch seconds
    pub fn earliest_epoch(&self) -> Option<i64> {
        self.earliest.map(|t| t.timestamp())
    }

    /// Latest as epoch seconds
    pub fn latest_epoch(&self) -> Option<i64> {
        self.latest.map(|t| t.timestamp())
    }
}

/// Parse a time bound given as epoch seconds or RFC 3339
pub fn parse_time_bound(s: &str) -> Result<DateTime<Utc>, String> {
    let s = s.trim();
    if let Ok(secs) = s.parse::<i64>() {
        return Utc
            .timestamp_opt(secs, 0)
            .single()
            .ok_or_else(|| format!("epoch seconds out of range: {secs}"));
    }
    DateTime::parse_from_rfc3339(s)
        .map(|t| t.with_timezone(&Utc))
        .map_err(|e| format!("invalid time '{s}': {e}"))
}

// ============================================================================
// Work Items
// ============================================================================

/// Field holding the item's page counter when serialized
pub const PAGE_NUM_FIELD: &str = "__pageNum";

/// A discovered work item handed from discovery to collect
///
/// Conventional fields are `host`, `source` and `urlOverride`; any other
/// field is available to collect templates by name.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Collectible {
    /// Item fields
    #[serde(flatten)]
    pub fields: JsonObject,
    /// Starting page for collect; unset means 1. Collect never writes it back
    #[serde(rename = "__pageNum", default, skip_serializing_if = "Option::is_none")]
    pub page_num: Option<u32>,
}

impl Collectible {
    /// Item with the given fields
    pub fn new(fields: JsonObject) -> Self {
        Self {
            fields,
            page_num: None,
        }
    }

    /// Item from a discovered record; scalars become `{ "id": value }`
    pub fn from_value(value: JsonValue) -> Self {
        match value {
            JsonValue::Object(mut fields) => {
                let page_num = fields
                    .remove(PAGE_NUM_FIELD)
                    .and_then(|v| v.as_u64())
                    .and_then(|n| u32::try_from(n).ok());
                Self { fields, page_num }
            }
            other => {
                let mut fields = JsonObject::new();
                fields.insert("id".to_string(), other);
                Self::new(fields)
            }
        }
    }

    /// Placeholder item emitted when discovery is disabled
    pub fn fake_discover() -> Self {
        let mut fields = JsonObject::new();
        fields.insert("fakeDiscover".to_string(), JsonValue::Bool(true));
        Self::new(fields)
    }

    /// Whether this is the placeholder item
    pub fn is_fake_discover(&self) -> bool {
        self.fields.get("fakeDiscover") == Some(&JsonValue::Bool(true))
    }

    /// Field by name
    pub fn get(&self, name: &str) -> Option<&JsonValue> {
        self.fields.get(name)
    }

    fn non_empty_str(&self, name: &str) -> Option<&str> {
        self.fields
            .get(name)
            .and_then(JsonValue::as_str)
            .filter(|s| !s.is_empty())
    }

    /// `host` field
    pub fn host(&self) -> Option<&str> {
        self.non_empty_str("host")
    }

    /// `source` field
    pub fn source(&self) -> Option<&str> {
        self.non_empty_str("source")
    }

    /// `urlOverride` field; replaces the collect URL when set
    pub fn url_override(&self) -> Option<&str> {
        self.non_empty_str("urlOverride")
    }

    /// Set `source` unless it already holds a truthy value
    pub fn set_default_source(&mut self, source: &str) {
        let has_source = self.fields.get("source").is_some_and(|v| match v {
            JsonValue::Null | JsonValue::Bool(false) => false,
            JsonValue::String(s) => !s.is_empty(),
            _ => true,
        });
        if !has_source {
            self.fields
                .insert("source".to_string(), JsonValue::String(source.to_string()));
        }
    }

    /// Serialize to a JSON object, including the page counter when set
    pub fn to_value(&self) -> JsonValue {
        let mut fields = self.fields.clone();
        if let Some(page) = self.page_num {
            fields.insert(PAGE_NUM_FIELD.to_string(), JsonValue::from(page));
        }
        JsonValue::Object(fields)
    }
}
