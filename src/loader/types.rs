//! Loader types
//!
//! Declarative collector settings as read from YAML or JSON. Fields are kept
//! loose here (optional strings); the validator in [`crate::config`] turns them
//! into typed configuration and reports what is missing.

use crate::types::NameValue;
use serde::{Deserialize, Serialize};
use serde_json::Value;

// ============================================================================
// Collector Definition
// ============================================================================

/// Top-level collector settings
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub struct CollectorDefinition {
    /// `none`, `basic` or `login` (a `Secret` suffix is accepted)
    #[serde(default = "default_none")]
    pub authentication: String,
    /// Username for basic or login auth
    #[serde(default)]
    pub username: Option<String>,
    /// Password for basic or login auth
    #[serde(default)]
    pub password: Option<String>,
    /// Login endpoint
    #[serde(default)]
    pub login_url: Option<String>,
    /// Login method (`get` or `post`)
    #[serde(default)]
    pub login_method: Option<String>,
    /// Login body template
    #[serde(default)]
    pub login_body: Option<String>,
    /// Path of the token in the login response
    #[serde(default)]
    pub token_resp_attribute: Option<String>,
    /// Expression building the `Authorization` header from `token`
    #[serde(default)]
    pub auth_header_expr: Option<String>,

    /// Discovery settings
    #[serde(default)]
    pub discovery: DiscoveryDefinition,

    /// Collect URL template
    #[serde(default)]
    pub collect_url: Option<String>,
    /// Collect method
    #[serde(default = "default_get")]
    pub collect_method: String,
    /// Collect body template (`post_with_body` only)
    #[serde(default)]
    pub collect_body: Option<String>,
    /// Collect parameters
    #[serde(default)]
    pub collect_request_params: Vec<NameValue>,
    /// Collect headers
    #[serde(default)]
    pub collect_request_headers: Vec<NameValue>,

    /// Pagination settings
    #[serde(default)]
    pub pagination: PaginationDefinition,

    /// Discovery filter expression
    #[serde(default)]
    pub filter: Option<String>,
    /// Discovered items per `add_results` batch
    #[serde(default = "default_max_batch_size")]
    pub max_batch_size: usize,
    /// Lower time bound (epoch seconds or RFC 3339)
    #[serde(default)]
    pub earliest: Option<TimeBound>,
    /// Upper time bound (epoch seconds or RFC 3339)
    #[serde(default)]
    pub latest: Option<TimeBound>,
    /// Per-request timeout in seconds
    #[serde(default = "default_timeout")]
    pub timeout: u64,
    /// Client-side request rate limit
    #[serde(default)]
    pub rate_limit_rps: Option<u32>,
    /// User agent override
    #[serde(default)]
    pub user_agent: Option<String>,
}

impl Default for CollectorDefinition {
    fn default() -> Self {
        Self {
            authentication: default_none(),
            username: None,
            password: None,
            login_url: None,
            login_method: None,
            login_body: None,
            token_resp_attribute: None,
            auth_header_expr: None,
            discovery: DiscoveryDefinition::default(),
            collect_url: None,
            collect_method: default_get(),
            collect_body: None,
            collect_request_params: Vec::new(),
            collect_request_headers: Vec::new(),
            pagination: PaginationDefinition::default(),
            filter: None,
            max_batch_size: default_max_batch_size(),
            earliest: None,
            latest: None,
            timeout: default_timeout(),
            rate_limit_rps: None,
            user_agent: None,
        }
    }
}

/// A time bound written either as epoch seconds or as text
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum TimeBound {
    /// Epoch seconds
    Epoch(i64),
    /// RFC 3339 timestamp or epoch seconds as a string
    Text(String),
}

fn default_none() -> String {
    "none".to_string()
}

fn default_get() -> String {
    "get".to_string()
}

fn default_max_batch_size() -> usize {
    10
}

fn default_timeout() -> u64 {
    30
}

// ============================================================================
// Discovery Definition
// ============================================================================

/// Discovery settings
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub struct DiscoveryDefinition {
    /// `none`, `http`, `json` or `list`
    #[serde(default = "default_none")]
    pub discover_type: String,
    /// Discovery URL template (`http`)
    #[serde(default)]
    pub discover_url: Option<String>,
    /// Discovery method (`http`)
    #[serde(default = "default_get")]
    pub discover_method: String,
    /// Discovery body template (`http` with `post_with_body`)
    #[serde(default)]
    pub discover_body: Option<String>,
    /// Path of the item list inside the payload
    #[serde(default)]
    pub discover_data_field: Option<String>,
    /// Literal payload (`json`); a string is used as-is, anything else is serialized
    #[serde(default)]
    pub manual_discover_result: Option<Value>,
    /// Item identifiers (`list`)
    #[serde(default)]
    pub item_list: Option<Vec<String>>,
    /// Discovery parameters
    #[serde(default)]
    pub discover_request_params: Vec<NameValue>,
    /// Discovery headers
    #[serde(default)]
    pub discover_request_headers: Vec<NameValue>,
}

impl Default for DiscoveryDefinition {
    fn default() -> Self {
        Self {
            discover_type: default_none(),
            discover_url: None,
            discover_method: default_get(),
            discover_body: None,
            discover_data_field: None,
            manual_discover_result: None,
            item_list: None,
            discover_request_params: Vec::new(),
            discover_request_headers: Vec::new(),
        }
    }
}

// ============================================================================
// Pagination Definition
// ============================================================================

/// Pagination settings
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub struct PaginationDefinition {
    /// `none`, `response_header`, `response_body` or `response_header_link`
    #[serde(rename = "type", default = "default_none")]
    pub kind: String,
    /// Header or body field holding the next-page token
    #[serde(default)]
    pub attribute: Option<String>,
    /// Hard page limit (0 for unlimited)
    #[serde(default)]
    pub max_pages: Option<u32>,
    /// Link rel to follow
    #[serde(default)]
    pub next_relation_attribute: Option<String>,
    /// Link rel of the current page
    #[serde(default)]
    pub cur_relation_attribute: Option<String>,
}

impl Default for PaginationDefinition {
    fn default() -> Self {
        Self {
            kind: default_none(),
            attribute: None,
            max_pages: None,
            next_relation_attribute: None,
            cur_relation_attribute: None,
        }
    }
}
