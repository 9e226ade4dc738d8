//! Login flow

use crate::authenticator::Authenticator;
use crate::role::RoleResolver;
use crate::token::{Claims, TokenIssuer};
use crate::AuthError;
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use tracing::{info, warn};

/// Body returned by a successful login
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AuthToken {
    pub token: String,
}

/// Authenticates a user, resolves their role and issues a token
pub struct LoginService {
    authenticator: Arc<dyn Authenticator>,
    roles: Arc<dyn RoleResolver>,
    issuer: TokenIssuer,
}

impl LoginService {
    pub fn new(
        authenticator: Arc<dyn Authenticator>,
        roles: Arc<dyn RoleResolver>,
        issuer: TokenIssuer,
    ) -> Self {
        Self {
            authenticator,
            roles,
            issuer,
        }
    }

    pub async fn login(&self, username: &str, password: &str) -> Result<AuthToken, AuthError> {
        if username.is_empty() || password.is_empty() {
            return Err(AuthError::InvalidRequest);
        }

        match self.authenticator.authenticate(username, password).await {
            Ok(true) => {}
            Ok(false) => {
                warn!("Login failed for {}", username);
                return Err(AuthError::LoginFailed);
            }
            Err(e) => {
                warn!(error = %e, "Authentication backend failed for {}", username);
                return Err(AuthError::LoginFailed);
            }
        }

        let role = self.roles.role_for(username);
        let token = self.issuer.issue(username, role)?;
        info!("User {} logged in as {}", username, role);
        Ok(AuthToken { token })
    }

    /// Validate a bearer token presented on a request
    pub fn verify(&self, token: &str) -> Result<Claims, AuthError> {
        self.issuer.validate(token)
    }
}
