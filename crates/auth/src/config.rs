//! Auth configuration

use crate::authenticator::StaticAuthenticator;
use crate::role::{FixedRoleResolver, MappedRoleResolver, Role, RoleResolver};
use crate::token::{TokenIssuer, DEFAULT_TOKEN_TTL_SECS};
use serde::{Deserialize, Serialize};
use std::sync::Arc;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct UserEntry {
    pub username: String,
    pub password: String,
}

/// How roles are assigned at login
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "strategy", rename_all = "lowercase")]
pub enum RoleStrategy {
    Fixed {
        role: Role,
    },
    Mapped {
        #[serde(default)]
        admins: Vec<String>,
        default_role: Role,
    },
}

impl Default for RoleStrategy {
    fn default() -> Self {
        RoleStrategy::Mapped {
            admins: Vec::new(),
            default_role: Role::User,
        }
    }
}

impl RoleStrategy {
    pub fn build(&self) -> Arc<dyn RoleResolver> {
        match self {
            RoleStrategy::Fixed { role } => Arc::new(FixedRoleResolver::new(*role)),
            RoleStrategy::Mapped {
                admins,
                default_role,
            } => Arc::new(MappedRoleResolver::new(admins.iter().cloned(), *default_role)),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct AuthConfig {
    /// When false, alert routes are open and login is not mounted
    pub enabled: bool,
    pub signing_key: String,
    pub issuer: String,
    pub token_ttl_secs: u64,
    pub users: Vec<UserEntry>,
    pub roles: RoleStrategy,
}

impl Default for AuthConfig {
    fn default() -> Self {
        Self {
            enabled: false,
            signing_key: String::new(),
            issuer: "correlator".to_string(),
            token_ttl_secs: DEFAULT_TOKEN_TTL_SECS,
            users: Vec::new(),
            roles: RoleStrategy::default(),
        }
    }
}

impl AuthConfig {
    pub fn authenticator(&self) -> StaticAuthenticator {
        self.users
            .iter()
            .fold(StaticAuthenticator::new(), |auth, user| {
                auth.with_user(&user.username, &user.password)
            })
    }

    pub fn token_issuer(&self) -> TokenIssuer {
        TokenIssuer::new(&self.signing_key, &self.issuer, self.token_ttl_secs)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let config = AuthConfig::default();
        assert!(!config.enabled);
        assert_eq!(config.token_ttl_secs, 48 * 3600);
        assert_eq!(config.roles.build().role_for("anyone"), Role::User);
    }

    #[test]
    fn test_role_strategy_from_json() {
        let fixed: RoleStrategy =
            serde_json::from_str(r#"{"strategy": "fixed", "role": "admin"}"#).unwrap();
        assert_eq!(fixed, RoleStrategy::Fixed { role: Role::Admin });

        let mapped: RoleStrategy = serde_json::from_str(
            r#"{"strategy": "mapped", "admins": ["ops"], "default_role": "user"}"#,
        )
        .unwrap();
        let resolver = mapped.build();
        assert_eq!(resolver.role_for("ops"), Role::Admin);
        assert_eq!(resolver.role_for("dev"), Role::User);
    }
}
