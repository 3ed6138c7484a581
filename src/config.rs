//! Validated collector configuration
//!
//! [`CollectorConfig::from_definition`] turns loose settings from the
//! [`loader`](crate::loader) into typed, immutable configuration. Every check
//! runs here, before any network I/O, and the first failure names the field.

use crate::auth::{AuthConfig, LoginConfig};
use crate::discovery::DiscoveryConfig;
use crate::error::{Error, Result};
use crate::expr::Expression;
use crate::http::{HttpClientConfig, RateLimiterConfig, RequestTemplate};
use crate::loader::{CollectorDefinition, DiscoveryDefinition, PaginationDefinition, TimeBound};
use crate::pagination::PaginationConfig;
use crate::types::{parse_time_bound, trimmed_pairs, RequestMethod, TimeRange};
use chrono::{DateTime, Utc};
use std::time::Duration;

/// Batch size used when none (or zero) is configured
pub const DEFAULT_BATCH_SIZE: usize = 10;

/// Per-request timeout used when none is configured
pub const DEFAULT_TIMEOUT: Duration = Duration::from_secs(30);

/// Link rel followed when none is configured
pub const DEFAULT_NEXT_RELATION: &str = "next";

// ============================================================================
// Collector Config
// ============================================================================

/// Immutable configuration of one collector
#[derive(Debug, Clone)]
pub struct CollectorConfig {
    /// Active auth strategy
    pub auth: AuthConfig,
    /// Discovery descriptor
    pub discovery: DiscoveryConfig,
    /// Collect request
    pub collect: RequestTemplate,
    /// Collect pagination
    pub pagination: PaginationConfig,
    /// Discovery filter
    pub filter: Expression,
    /// Discovered items per batch
    pub batch_size: usize,
    /// Time bounds bound as `earliest`/`latest` in templates
    pub time_range: TimeRange,
    /// Per-request timeout
    pub timeout: Duration,
    /// HTTP client settings
    pub http: HttpClientConfig,
}

impl CollectorConfig {
    /// Config collecting with `collect` and defaults for everything else
    pub fn new(collect: RequestTemplate) -> Self {
        Self {
            auth: AuthConfig::None,
            discovery: DiscoveryConfig::none(),
            collect,
            pagination: PaginationConfig::None,
            filter: Expression::always_true(),
            batch_size: DEFAULT_BATCH_SIZE,
            time_range: TimeRange::default(),
            timeout: DEFAULT_TIMEOUT,
            http: HttpClientConfig::default(),
        }
    }

    /// Set the auth strategy
    #[must_use]
    pub fn with_auth(mut self, auth: AuthConfig) -> Self {
        self.auth = auth;
        self
    }

    /// Set the discovery descriptor
    #[must_use]
    pub fn with_discovery(mut self, discovery: DiscoveryConfig) -> Self {
        self.discovery = discovery;
        self
    }

    /// Set the pagination descriptor
    #[must_use]
    pub fn with_pagination(mut self, pagination: PaginationConfig) -> Self {
        self.pagination = pagination;
        self
    }

    /// Set the discovery filter
    #[must_use]
    pub fn with_filter(mut self, filter: Expression) -> Self {
        self.filter = filter;
        self
    }

    /// Set the batch size; zero falls back to the default
    #[must_use]
    pub fn with_batch_size(mut self, batch_size: usize) -> Self {
        self.batch_size = if batch_size == 0 {
            DEFAULT_BATCH_SIZE
        } else {
            batch_size
        };
        self
    }

    /// Set the time bounds
    #[must_use]
    pub fn with_time_range(mut self, time_range: TimeRange) -> Self {
        self.time_range = time_range;
        self
    }

    /// Set the per-request timeout
    #[must_use]
    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    /// Set the HTTP client settings
    #[must_use]
    pub fn with_http(mut self, http: HttpClientConfig) -> Self {
        self.http = http;
        self
    }

    /// Validate settings and build the config
    pub fn from_definition(def: &CollectorDefinition) -> Result<Self> {
        let auth = build_auth(def)?;
        let collect = build_collect(def)?;
        let pagination = build_pagination(&def.pagination)?;
        let discovery = build_discovery(&def.discovery)?;

        let filter = match non_empty(def.filter.as_deref()) {
            Some(source) => Expression::parse(source)
                .map_err(|e| Error::invalid_value("filter", e.to_string()))?,
            None => Expression::always_true(),
        };

        let earliest = time_bound("earliest", def.earliest.as_ref())?;
        let latest = time_bound("latest", def.latest.as_ref())?;
        if let (Some(earliest), Some(latest)) = (earliest, latest) {
            if latest < earliest {
                return Err(Error::invalid_value(
                    "latest",
                    "must not be before earliest",
                ));
            }
        }

        if def.timeout == 0 {
            return Err(Error::invalid_value("timeout", "must be at least 1 second"));
        }

        let mut http = HttpClientConfig::default();
        match def.rate_limit_rps {
            Some(0) => {
                return Err(Error::invalid_value(
                    "rate_limit_rps",
                    "must be greater than 0",
                ))
            }
            Some(rps) => http.rate_limit = Some(RateLimiterConfig::per_second(rps)),
            None => {}
        }
        if let Some(agent) = non_empty(def.user_agent.as_deref()) {
            http.user_agent = agent.to_string();
        }

        Ok(Self::new(collect)
            .with_auth(auth)
            .with_discovery(discovery)
            .with_pagination(pagination)
            .with_filter(filter)
            .with_batch_size(def.max_batch_size)
            .with_time_range(TimeRange { earliest, latest })
            .with_timeout(Duration::from_secs(def.timeout))
            .with_http(http))
    }
}

// ============================================================================
// Section builders
// ============================================================================

fn non_empty(value: Option<&str>) -> Option<&str> {
    value.map(str::trim).filter(|v| !v.is_empty())
}

fn required<'a>(field: &str, value: Option<&'a str>) -> Result<&'a str> {
    non_empty(value).ok_or_else(|| Error::missing_field(field))
}

fn parse_method(field: &str, value: &str) -> Result<RequestMethod> {
    value
        .parse()
        .map_err(|message: String| Error::invalid_value(field, message))
}

fn build_auth(def: &CollectorDefinition) -> Result<AuthConfig> {
    let kind = def.authentication.replace("Secret", "");
    match kind.trim().to_ascii_lowercase().as_str() {
        "" | "none" => Ok(AuthConfig::None),
        "basic" => AuthConfig::basic(
            def.username.clone().unwrap_or_default(),
            def.password.clone().unwrap_or_default(),
        ),
        "login" => {
            let username = required("username", def.username.as_deref())?;
            let password = def
                .password
                .as_deref()
                .filter(|p| !p.is_empty())
                .ok_or_else(|| Error::missing_field("password"))?;
            let url = required("login_url", def.login_url.as_deref())?;
            // login requests default to POST with the rendered body
            let method = match non_empty(def.login_method.as_deref())
                .unwrap_or("post")
                .to_ascii_lowercase()
                .as_str()
            {
                "get" => RequestMethod::Get,
                "post" | "post_with_body" => RequestMethod::PostWithBody,
                other => {
                    return Err(Error::invalid_value(
                        "login_method",
                        format!("method '{other}' must be one of: get, post"),
                    ))
                }
            };
            let body = required("login_body", def.login_body.as_deref())?;
            let token_field = required("token_resp_attribute", def.token_resp_attribute.as_deref())?;
            let token_expr = Expression::parse(required(
                "auth_header_expr",
                def.auth_header_expr.as_deref(),
            )?)
            .map_err(|e| Error::invalid_value("auth_header_expr", e.to_string()))?;

            Ok(AuthConfig::Login(LoginConfig {
                request: RequestTemplate::new(url, method).with_body(body),
                username: username.to_string(),
                password: password.to_string(),
                token_field: token_field.to_string(),
                token_expr,
            }))
        }
        _ => Err(Error::invalid_value(
            "authentication",
            format!(
                "'{}' must be one of: none, basic, login",
                def.authentication
            ),
        )),
    }
}

fn build_collect(def: &CollectorDefinition) -> Result<RequestTemplate> {
    let url = required("collect_url", def.collect_url.as_deref())?;
    let method = parse_method("collect_method", &def.collect_method)?;
    let mut request = RequestTemplate::new(url, method)
        .with_params(trimmed_pairs(&def.collect_request_params))
        .with_headers(trimmed_pairs(&def.collect_request_headers));
    if method == RequestMethod::PostWithBody {
        request = request.with_body(required("collect_body", def.collect_body.as_deref())?);
    }
    Ok(request)
}

fn build_pagination(def: &PaginationDefinition) -> Result<PaginationConfig> {
    let max_pages = || {
        def.max_pages
            .ok_or_else(|| Error::missing_field("pagination.max_pages"))
    };
    match def.kind.trim() {
        "" | "none" => Ok(PaginationConfig::None),
        "response_header" => Ok(PaginationConfig::response_header(
            required("pagination.attribute", def.attribute.as_deref())?,
            max_pages()?,
        )),
        "response_body" => Ok(PaginationConfig::response_body(
            required("pagination.attribute", def.attribute.as_deref())?,
            max_pages()?,
        )),
        "response_header_link" => Ok(PaginationConfig::link_header(
            non_empty(def.next_relation_attribute.as_deref()).unwrap_or(DEFAULT_NEXT_RELATION),
            non_empty(def.cur_relation_attribute.as_deref()).map(str::to_string),
            max_pages()?,
        )),
        other => Err(Error::invalid_value(
            "pagination.type",
            format!(
                "'{other}' must be one of: none, response_header, response_body, response_header_link"
            ),
        )),
    }
}

fn build_discovery(def: &DiscoveryDefinition) -> Result<DiscoveryConfig> {
    let data_field = non_empty(def.discover_data_field.as_deref()).map(str::to_string);
    let source_url = non_empty(def.discover_url.as_deref()).map(str::to_string);

    match def.discover_type.trim() {
        "" | "none" => Ok(DiscoveryConfig::none()),
        "http" => {
            let url = required("discovery.discover_url", def.discover_url.as_deref())?;
            let method = parse_method("discovery.discover_method", &def.discover_method)?;
            let mut request = RequestTemplate::new(url, method)
                .with_params(trimmed_pairs(&def.discover_request_params))
                .with_headers(trimmed_pairs(&def.discover_request_headers));
            if method == RequestMethod::PostWithBody {
                request = request.with_body(required(
                    "discovery.discover_body",
                    def.discover_body.as_deref(),
                )?);
            }
            Ok(DiscoveryConfig::http(request, data_field).with_source_url(source_url))
        }
        "json" => {
            let payload = match &def.manual_discover_result {
                None | Some(serde_json::Value::Null) => {
                    return Err(Error::missing_field("discovery.manual_discover_result"))
                }
                Some(serde_json::Value::String(text)) => {
                    required("discovery.manual_discover_result", Some(text.as_str()))?.to_string()
                }
                Some(value) => value.to_string(),
            };
            Ok(DiscoveryConfig::inline_json(payload, data_field).with_source_url(source_url))
        }
        "list" => {
            let items = def
                .item_list
                .clone()
                .ok_or_else(|| Error::missing_field("discovery.item_list"))?;
            Ok(DiscoveryConfig::inline_list(items).with_source_url(source_url))
        }
        other => Err(Error::invalid_value(
            "discovery.discover_type",
            format!("'{other}' must be one of: none, http, json, list"),
        )),
    }
}

fn time_bound(field: &str, bound: Option<&TimeBound>) -> Result<Option<DateTime<Utc>>> {
    let parsed = match bound {
        None => return Ok(None),
        Some(TimeBound::Epoch(secs)) => parse_time_bound(&secs.to_string()),
        Some(TimeBound::Text(text)) if text.trim().is_empty() => return Ok(None),
        Some(TimeBound::Text(text)) => parse_time_bound(text),
    };
    parsed
        .map(Some)
        .map_err(|message| Error::invalid_value(field, message))
}

// ============================================================================
// Tests
// ============================================================================
