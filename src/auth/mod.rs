//! Authentication module
//!
//! Supports: None, Basic, Login (bearer-style token from a login request)
//!
//! The `Authenticator` handles all auth types and caches the login token
//! so discovery and every collect share a single login.

mod authenticator;
mod types;

pub use authenticator::Authenticator;
pub use types::{AuthConfig, LoginConfig};
