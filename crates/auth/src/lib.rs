//! Authentication Module
//!
//! Credential checking, role resolution and signed API tokens:
//! - Pluggable authenticator backends
//! - Explicit role strategies
//! - HS256 JWT issuance and validation

mod authenticator;
mod config;
mod login;
mod role;
mod token;

pub use authenticator::{Authenticator, StaticAuthenticator};
pub use config::{AuthConfig, RoleStrategy, UserEntry};
pub use login::{AuthToken, LoginService};
pub use role::{FixedRoleResolver, MappedRoleResolver, Role, RoleResolver};
pub use token::{Claims, TokenIssuer, DEFAULT_TOKEN_TTL_SECS};

use thiserror::Error;

/// Authentication error types
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum AuthError {
    #[error("Invalid login request")]
    InvalidRequest,

    #[error("Login failed")]
    LoginFailed,

    #[error("Authentication backend error: {0}")]
    Backend(String),

    #[error("Token expired")]
    Expired,

    #[error("Invalid token: {0}")]
    InvalidToken(String),
}
