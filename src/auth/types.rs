//! Auth configuration types
//!
//! Exactly one strategy is active per collector; the variants carry only the
//! fields their strategy uses.

use crate::error::{Error, Result};
use crate::expr::Expression;
use crate::http::RequestTemplate;
use std::fmt;

/// Authentication configuration
#[derive(Clone, Default, PartialEq)]
pub enum AuthConfig {
    /// No authentication required
    #[default]
    None,

    /// HTTP Basic authentication
    Basic {
        /// Username
        username: String,
        /// Password
        password: String,
    },

    /// Log in once and send the resulting token as the `Authorization` header
    Login(LoginConfig),
}

impl AuthConfig {
    /// Basic authentication; both credentials must be non-empty
    pub fn basic(username: impl Into<String>, password: impl Into<String>) -> Result<Self> {
        let username = username.into();
        let password = password.into();
        if username.trim().is_empty() {
            return Err(Error::missing_field("username"));
        }
        if password.is_empty() {
            return Err(Error::missing_field("password"));
        }
        Ok(Self::Basic { username, password })
    }

    /// Strategy name as used in settings files
    pub fn kind(&self) -> &'static str {
        match self {
            Self::None => "none",
            Self::Basic { .. } => "basic",
            Self::Login(_) => "login",
        }
    }
}

impl fmt::Debug for AuthConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::None => f.write_str("None"),
            Self::Basic { username, .. } => f
                .debug_struct("Basic")
                .field("username", username)
                .field("password", &"***")
                .finish(),
            Self::Login(login) => f.debug_tuple("Login").field(login).finish(),
        }
    }
}

/// Login request and how to turn its response into a token
#[derive(Clone, PartialEq)]
pub struct LoginConfig {
    /// Login request; its body may reference `{{ username }}` and `{{ password }}`
    pub request: RequestTemplate,
    /// Username
    pub username: String,
    /// Password
    pub password: String,
    /// Path of the response field holding the raw token
    pub token_field: String,
    /// Expression producing the header value, with `token` bound
    pub token_expr: Expression,
}

impl fmt::Debug for LoginConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("LoginConfig")
            .field("url", &self.request.url)
            .field("method", &self.request.method)
            .field("username", &self.username)
            .field("token_field", &self.token_field)
            .field("token_expr", &self.token_expr)
            .finish_non_exhaustive()
    }
}
