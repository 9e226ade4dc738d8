//! Role resolution

use serde::{Deserialize, Serialize};
use std::collections::HashSet;
use std::fmt;

/// Role carried in issued tokens
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    Admin,
    User,
}

impl Role {
    /// Get string representation
    pub fn as_str(&self) -> &'static str {
        match self {
            Role::Admin => "admin",
            Role::User => "user",
        }
    }
}

impl fmt::Display for Role {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Decides the role of an authenticated user
pub trait RoleResolver: Send + Sync {
    fn role_for(&self, username: &str) -> Role;
}

/// Same role for everyone
#[derive(Debug, Clone)]
pub struct FixedRoleResolver {
    role: Role,
}

impl FixedRoleResolver {
    pub fn new(role: Role) -> Self {
        Self { role }
    }
}

impl RoleResolver for FixedRoleResolver {
    fn role_for(&self, _username: &str) -> Role {
        self.role
    }
}

/// Named admins; everybody else gets `default_role`
#[derive(Debug, Clone)]
pub struct MappedRoleResolver {
    admins: HashSet<String>,
    default_role: Role,
}

impl MappedRoleResolver {
    pub fn new<I, S>(admins: I, default_role: Role) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            admins: admins.into_iter().map(Into::into).collect(),
            default_role,
        }
    }
}

impl RoleResolver for MappedRoleResolver {
    fn role_for(&self, username: &str) -> Role {
        if self.admins.contains(username) {
            Role::Admin
        } else {
            self.default_role
        }
    }
}
