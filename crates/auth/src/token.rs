//! API tokens

use crate::role::Role;
use crate::AuthError;
use chrono::{DateTime, Utc};
use jsonwebtoken::errors::ErrorKind;
use jsonwebtoken::{decode, encode, Algorithm, DecodingKey, EncodingKey, Header, Validation};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// 48 hours
pub const DEFAULT_TOKEN_TTL_SECS: u64 = 48 * 60 * 60;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Claims {
    pub jti: String,
    pub iss: String,
    pub iat: i64,
    pub exp: i64,
    pub name: String,
    pub role: Role,
}

/// Signs and validates HS256 tokens with a shared key
pub struct TokenIssuer {
    issuer: String,
    ttl_secs: u64,
    encoding: EncodingKey,
    decoding: DecodingKey,
}

impl TokenIssuer {
    pub fn new(signing_key: &str, issuer: &str, ttl_secs: u64) -> Self {
        Self {
            issuer: issuer.to_string(),
            ttl_secs,
            encoding: EncodingKey::from_secret(signing_key.as_bytes()),
            decoding: DecodingKey::from_secret(signing_key.as_bytes()),
        }
    }

    pub fn issue(&self, name: &str, role: Role) -> Result<String, AuthError> {
        self.issue_at(name, role, Utc::now())
    }

    /// Issue a token as if the current time were `now`
    pub fn issue_at(&self, name: &str, role: Role, now: DateTime<Utc>) -> Result<String, AuthError> {
        let iat = now.timestamp();
        let claims = Claims {
            jti: Uuid::new_v4().to_string(),
            iss: self.issuer.clone(),
            iat,
            exp: iat + self.ttl_secs as i64,
            name: name.to_string(),
            role,
        };
        encode(&Header::new(Algorithm::HS256), &claims, &self.encoding)
            .map_err(|e| AuthError::Backend(e.to_string()))
    }

    /// Check signature, issuer and expiry
    pub fn validate(&self, token: &str) -> Result<Claims, AuthError> {
        let mut validation = Validation::new(Algorithm::HS256);
        validation.set_issuer(&[self.issuer.as_str()]);

        decode::<Claims>(token, &self.decoding, &validation)
            .map(|data| data.claims)
            .map_err(|e| match e.kind() {
                ErrorKind::ExpiredSignature => AuthError::Expired,
                _ => AuthError::InvalidToken(e.to_string()),
            })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Duration;

    fn issuer() -> TokenIssuer {
        TokenIssuer::new("test-signing-key", "correlator", DEFAULT_TOKEN_TTL_SECS)
    }

    #[test]
    fn test_issue_and_validate() {
        let issuer = issuer();
        let token = issuer.issue("alice", Role::Admin).unwrap();
        let claims = issuer.validate(&token).unwrap();

        assert_eq!(claims.name, "alice");
        assert_eq!(claims.role, Role::Admin);
        assert_eq!(claims.iss, "correlator");
        assert_eq!(claims.exp - claims.iat, 48 * 3600);
        assert!(!claims.jti.is_empty());
    }

    #[test]
    fn test_fresh_jti_per_token() {
        let issuer = issuer();
        let a = issuer.validate(&issuer.issue("alice", Role::User).unwrap()).unwrap();
        let b = issuer.validate(&issuer.issue("alice", Role::User).unwrap()).unwrap();
        assert_ne!(a.jti, b.jti);
    }

    #[test]
    fn test_expired_rejected() {
        let issuer = issuer();
        let token = issuer
            .issue_at("alice", Role::User, Utc::now() - Duration::hours(72))
            .unwrap();
        assert_eq!(issuer.validate(&token), Err(AuthError::Expired));
    }

    #[test]
    fn test_wrong_key_rejected() {
        let other = TokenIssuer::new("another-key", "correlator", DEFAULT_TOKEN_TTL_SECS);
        let token = other.issue("alice", Role::Admin).unwrap();
        assert!(matches!(issuer().validate(&token), Err(AuthError::InvalidToken(_))));
    }

    #[test]
    fn test_wrong_issuer_rejected() {
        let other = TokenIssuer::new("test-signing-key", "ldap", DEFAULT_TOKEN_TTL_SECS);
        let token = other.issue("alice", Role::Admin).unwrap();
        assert!(matches!(issuer().validate(&token), Err(AuthError::InvalidToken(_))));
    }

    #[test]
    fn test_garbage_rejected() {
        assert!(matches!(
            issuer().validate("not.a.token"),
            Err(AuthError::InvalidToken(_))
        ));
    }
}
