//! Error types for the REST collector
//!
//! This module defines the error hierarchy for the entire crate.
//! All public APIs return `Result<T, Error>` where Error is defined here.

use crate::http::RequestTarget;
use thiserror::Error;

/// The main error type for the REST collector
#[derive(Error, Debug)]
pub enum Error {
    // ============================================================================
    // Configuration Errors
    // ============================================================================
    #[error("Configuration error: {message}")]
    Config { message: String },

    #[error("Missing required config field: {field}")]
    MissingConfigField { field: String },

    #[error("Invalid config value for '{field}': {message}")]
    InvalidConfigValue { field: String, message: String },

    #[error("Failed to parse YAML: {0}")]
    YamlParse(#[from] serde_yaml::Error),

    #[error("Failed to parse JSON: {0}")]
    JsonParse(#[from] serde_json::Error),

    // ============================================================================
    // Authentication Errors
    // ============================================================================
    #[error("Authentication failed: {message}")]
    Auth { message: String },

    // ============================================================================
    // HTTP Errors
    // ============================================================================
    #[error("HTTP request failed: {0}")]
    Transport(#[from] reqwest::Error),

    #[error("HTTP {status} from {target}")]
    HttpStatus { status: u16, target: RequestTarget },

    #[error("Request timeout after {timeout_ms}ms")]
    Timeout { timeout_ms: u64 },

    #[error("Invalid URL: {0}")]
    InvalidUrl(#[from] url::ParseError),

    // ============================================================================
    // Data Processing Errors
    // ============================================================================
    #[error("Failed to parse payload: {message}")]
    Parse { message: String },

    #[error("JSONPath error: {message}")]
    JsonPath { message: String },

    #[error("Expression error: {message}")]
    Expression { message: String },

    // ============================================================================
    // Template Errors
    // ============================================================================
    #[error("Template error: {message}")]
    Template { message: String },

    #[error("Undefined variable in template: {variable}")]
    UndefinedVariable { variable: String },

    // ============================================================================
    // Job Errors
    // ============================================================================
    #[error("Failed to hand results to job: {message}")]
    Sink { message: String },

    // ============================================================================
    // I/O Errors
    // ============================================================================
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    // ============================================================================
    // Generic Errors
    // ============================================================================
    #[error("{0}")]
    Other(String),

    #[error(transparent)]
    Anyhow(#[from] anyhow::Error),
}

impl Error {
    /// Create a config error
    pub fn config(message: impl Into<String>) -> Self {
        Self::Config {
            message: message.into(),
        }
    }

    /// Create a missing field error
    pub fn missing_field(field: impl Into<String>) -> Self {
        Self::MissingConfigField {
            field: field.into(),
        }
    }

    /// Create an invalid value error
    pub fn invalid_value(field: impl Into<String>, message: impl Into<String>) -> Self {
        Self::InvalidConfigValue {
            field: field.into(),
            message: message.into(),
        }
    }

    /// Create an auth error
    pub fn auth(message: impl Into<String>) -> Self {
        Self::Auth {
            message: message.into(),
        }
    }

    /// Create an HTTP status error
    pub fn http_status(status: u16, target: RequestTarget) -> Self {
        Self::HttpStatus { status, target }
    }

    /// Create a payload parse error
    pub fn parse(message: impl Into<String>) -> Self {
        Self::Parse {
            message: message.into(),
        }
    }

    /// Create a JSONPath error
    pub fn json_path(message: impl Into<String>) -> Self {
        Self::JsonPath {
            message: message.into(),
        }
    }

    /// Create an expression error
    pub fn expression(message: impl Into<String>) -> Self {
        Self::Expression {
            message: message.into(),
        }
    }

    /// Create a template error
    pub fn template(message: impl Into<String>) -> Self {
        Self::Template {
            message: message.into(),
        }
    }

    /// Create an undefined variable error
    pub fn undefined_var(variable: impl Into<String>) -> Self {
        Self::UndefinedVariable {
            variable: variable.into(),
        }
    }

    /// Create a sink error
    pub fn sink(message: impl Into<String>) -> Self {
        Self::Sink {
            message: message.into(),
        }
    }

    /// Errors raised while validating configuration, before any I/O
    pub fn is_config(&self) -> bool {
        matches!(
            self,
            Error::Config { .. } | Error::MissingConfigField { .. } | Error::InvalidConfigValue { .. }
        )
    }

    /// Network-level failures (connection, timeout)
    pub fn is_transport(&self) -> bool {
        matches!(self, Error::Transport(_) | Error::Timeout { .. })
    }

    /// Status code of an HTTP status error
    pub fn status(&self) -> Option<u16> {
        match self {
            Error::HttpStatus { status, .. } => Some(*status),
            _ => None,
        }
    }

    /// Copy of this error for an error channel
    ///
    /// Variants wrapping foreign error types keep only their message.
    pub fn report_copy(&self) -> Error {
        match self {
            Error::Config { message } => Error::config(message.clone()),
            Error::MissingConfigField { field } => Error::missing_field(field.clone()),
            Error::InvalidConfigValue { field, message } => {
                Error::invalid_value(field.clone(), message.clone())
            }
            Error::Auth { message } => Error::auth(message.clone()),
            Error::HttpStatus { status, target } => Error::http_status(*status, target.clone()),
            Error::Timeout { timeout_ms } => Error::Timeout {
                timeout_ms: *timeout_ms,
            },
            Error::InvalidUrl(e) => Error::InvalidUrl(*e),
            Error::Parse { message } => Error::parse(message.clone()),
            Error::JsonPath { message } => Error::json_path(message.clone()),
            Error::Expression { message } => Error::expression(message.clone()),
            Error::Template { message } => Error::template(message.clone()),
            Error::UndefinedVariable { variable } => Error::undefined_var(variable.clone()),
            Error::Sink { message } => Error::sink(message.clone()),
            other => Error::Other(other.to_string()),
        }
    }
}

/// Result type alias for the REST collector
pub type Result<T> = std::result::Result<T, Error>;

/// Extension trait for adding context to errors
pub trait ResultExt<T> {
    /// Add context to an error
    fn context(self, message: impl Into<String>) -> Result<T>;

    /// Add context with a closure (lazy evaluation)
    fn with_context<F: FnOnce() -> String>(self, f: F) -> Result<T>;
}

impl<T, E: Into<Error>> ResultExt<T> for std::result::Result<T, E> {
    fn context(self, message: impl Into<String>) -> Result<T> {
        self.map_err(|e| {
            let inner = e.into();
            Error::Other(format!("{}: {}", message.into(), inner))
        })
    }

    fn with_context<F: FnOnce() -> String>(self, f: F) -> Result<T> {
        self.map_err(|e| {
            let inner = e.into();
            Error::Other(format!("{}: {}", f(), inner))
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::Method;

    fn target() -> RequestTarget {
        RequestTarget {
            host: "api.example.com".to_string(),
            port: 443,
            path: "/v1/items".to_string(),
            method: Method::Get,
        }
    }

    #[test]
    fn test_error_display() {
        let err = Error::config("test message");
        assert_eq!(err.to_string(), "Configuration error: test message");

        let err = Error::missing_field("collect_url");
        assert_eq!(err.to_string(), "Missing required config field: collect_url");

        let err = Error::http_status(500, target());
        assert_eq!(
            err.to_string(),
            "HTTP 500 from GET api.example.com:443/v1/items"
        );
    }

    #[test]
    fn test_classification() {
        assert!(Error::missing_field("x").is_config());
        assert!(Error::invalid_value("x", "bad").is_config());
        assert!(!Error::auth("nope").is_config());

        assert!(Error::Timeout { timeout_ms: 1000 }.is_transport());
        assert!(!Error::http_status(404, target()).is_transport());

        assert_eq!(Error::http_status(404, target()).status(), Some(404));
        assert_eq!(Error::parse("x").status(), None);
    }

    #[test]
    fn test_result_context() {
        let result: Result<()> = Err(Error::config("inner"));
        let with_context = result.context("outer");
        assert!(with_context
            .unwrap_err()
            .to_string()
            .contains("outer: Configuration error: inner"));
    }

    #[test]
    fn test_report_copy() {
        let err = Error::http_status(502, target());
        assert!(matches!(
            err.report_copy(),
            Error::HttpStatus { status: 502, ref target } if target.path == "/v1/items"
        ));

        let io = Error::Io(std::io::Error::new(std::io::ErrorKind::Other, "disk gone"));
        assert!(matches!(io.report_copy(), Error::Other(ref m) if m.contains("disk gone")));
    }
}
