//! Authenticator implementation
//!
//! Handles applying authentication to requests and caching the login token.

use super::types::{AuthConfig, LoginConfig};
use crate::error::{Error, Result};
use crate::expr::to_display;
use crate::http::{preview, BasicCredentials, HttpExecutor, RequestDescriptor};
use crate::template::TemplateContext;
use crate::types::JsonObject;
use serde_json::Value;
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::{OnceCell, RwLock};
use tracing::{debug, error, info};

/// Authenticator handles applying authentication to HTTP requests
///
/// The login token is fetched at most once: concurrent callers wait on the
/// same in-flight login and share its result. A failed login leaves the
/// cache empty so a later call tries again.
pub struct Authenticator {
    /// Auth configuration
    config: AuthConfig,
    /// Cached token for login auth
    cached_token: RwLock<Arc<OnceCell<String>>>,
    /// Executor for login requests
    executor: Arc<dyn HttpExecutor>,
    /// Login request timeout
    timeout: Duration,
}

impl Authenticator {
    /// Create a new authenticator with the given config
    pub fn new(config: AuthConfig, executor: Arc<dyn HttpExecutor>, timeout: Duration) -> Self {
        Self {
            config,
            cached_token: RwLock::new(Arc::new(OnceCell::new())),
            executor,
            timeout,
        }
    }

    /// Make sure credentials are available
    ///
    /// A no-op unless the strategy is login, in which case the first call
    /// logs in and every later call reuses the cached token.
    pub async fn authenticate(&self) -> Result<()> {
        self.token().await.map(|_| ())
    }

    /// The cached token, logging in first if needed
    ///
    /// `None` for strategies without a token.
    pub async fn token(&self) -> Result<Option<String>> {
        let AuthConfig::Login(login) = &self.config else {
            return Ok(None);
        };

        let cell = self.cached_token.read().await.clone();
        let token = cell.get_or_try_init(|| self.login(login)).await?;
        Ok(Some(token.clone()))
    }

    /// Attach credentials to a request
    ///
    /// Login auth needs a token; it is fetched here if no call has cached
    /// one yet.
    pub async fn apply(&self, request: &mut RequestDescriptor) -> Result<()> {
        match &self.config {
            AuthConfig::None => {}
            AuthConfig::Basic { username, password } => {
                request.basic_auth = Some(BasicCredentials {
                    username: username.clone(),
                    password: password.clone(),
                });
            }
            AuthConfig::Login(_) => {
                if let Some(token) = self.token().await? {
                    request.set_header("Authorization", token);
                }
            }
        }
        Ok(())
    }

    /// Send the login request and build the token from its response
    async fn login(&self, login: &LoginConfig) -> Result<String> {
        let mut ctx = TemplateContext::new();
        ctx.insert("username", login.username.as_str())
            .insert("password", login.password.as_str());

        let request = login
            .request
            .render(&ctx, self.timeout)
            .map_err(|e| Error::auth(format!("failed to render login request: {e}")))?;

        info!(url = %request.url, "logging in");
        let response = self.executor.execute(request).await.map_err(|e| {
            error!(error = %e, "login request failed");
            Error::auth(format!("login request failed: {e}"))
        })?;

        let status = response.status();
        let target = response.target().clone();
        let body = response
            .read_body()
            .await
            .map_err(|e| Error::auth(format!("failed to read login response: {e}")))?;

        if !(200..300).contains(&status) {
            error!(status, request = %target, "login rejected");
            return Err(Error::auth(format!(
                "login failed with status {status} from {target}"
            )));
        }

        debug!(response = %preview(&body, 350), "login response");
        let payload: Value = serde_json::from_slice(&body)
            .map_err(|e| Error::auth(format!("login response is not JSON: {e}")))?;

        let raw = extract_token(&payload, &login.token_field).ok_or_else(|| {
            Error::auth(format!(
                "login response has no token field '{}'",
                login.token_field
            ))
        })?;

        let mut scope = JsonObject::new();
        scope.insert("token".to_string(), Value::String(raw));
        let value = login
            .token_expr
            .eval(&scope)
            .map_err(|e| Error::auth(format!("failed to evaluate token expression: {e}")))?;

        info!("login succeeded, token cached");
        Ok(to_display(&value))
    }

    /// Drop the cached token so the next call logs in again
    pub async fn clear_cache(&self) {
        let mut cached = self.cached_token.write().await;
        *cached = Arc::new(OnceCell::new());
    }

    /// Whether a token is cached
    pub async fn is_authenticated(&self) -> bool {
        self.cached_token.read().await.initialized()
    }

    /// Get the current auth config
    pub fn config(&self) -> &AuthConfig {
        &self.config
    }
}

impl std::fmt::Debug for Authenticator {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Authenticator")
            .field("config", &self.config)
            .field("timeout", &self.timeout)
            .finish_non_exhaustive()
    }
}

/// Extract a scalar token from a response by dotted path
fn extract_token(value: &Value, path: &str) -> Option<String> {
    match crate::decode::extract_path(value, path).ok().flatten()? {
        Value::String(s) if !s.is_empty() => Some(s),
        Value::Number(n) => Some(n.to_string()),
        Value::Bool(b) => Some(b.to_string()),
        _ => None,
    }
}
