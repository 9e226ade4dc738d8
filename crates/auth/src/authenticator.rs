//! Credential backends

use crate::AuthError;
use async_trait::async_trait;
use std::collections::HashMap;
use tracing::debug;

/// Checks a username/password pair against some directory.
///
/// `Ok(false)` means the credentials were rejected; `Err` means the backend
/// itself could not answer.
#[async_trait]
pub trait Authenticator: Send + Sync {
    async fn authenticate(&self, username: &str, password: &str) -> Result<bool, AuthError>;
}

/// Fixed table of users, loaded from configuration
#[derive(Debug, Default)]
pub struct StaticAuthenticator {
    users: HashMap<String, String>,
}

impl StaticAuthenticator {
    pub fn new() -> Self {
        Self::default()
    }

    /// Add or replace a user
    pub fn with_user(mut self, username: &str, password: &str) -> Self {
        self.users.insert(username.to_string(), password.to_string());
        self
    }

    pub fn user_count(&self) -> usize {
        self.users.len()
    }
}

#[async_trait]
impl Authenticator for StaticAuthenticator {
    async fn authenticate(&self, username: &str, password: &str) -> Result<bool, AuthError> {
        let ok = self
            .users
            .get(username)
            .map(|expected| expected == password)
            .unwrap_or(false);
        if !ok {
            debug!("Rejected credentials for {}", username);
        }
        Ok(ok)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_static_table() {
        let auth = StaticAuthenticator::new()
            .with_user("alice", "s3cret")
            .with_user("bob", "hunter2");
        assert_eq!(auth.user_count(), 2);

        assert!(auth.authenticate("alice", "s3cret").await.unwrap());
        assert!(!auth.authenticate("alice", "hunter2").await.unwrap());
        assert!(!auth.authenticate("mallory", "s3cret").await.unwrap());
    }
}
