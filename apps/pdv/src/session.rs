//! Session tokens.
//!
//! A successful sign-in yields an HS256 token the screen keeps and hands
//! back to `restore_session` on the next start.

use chrono::{Duration, Utc};
use jsonwebtoken::{decode, encode, DecodingKey, EncodingKey, Header, Validation};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::error::{ApiError, ApiResult};
use raiz_core::User;

/// JWT claims of a session.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Claims {
    /// User id
    pub sub: String,

    pub email: String,

    /// Issued at (Unix timestamp)
    pub iat: i64,

    /// Expiration (Unix timestamp)
    pub exp: i64,

    /// Token id
    pub jti: String,
}

/// Issues and checks session tokens.
#[derive(Clone)]
pub struct SessionManager {
    encoding: EncodingKey,
    decoding: DecodingKey,
    lifetime_secs: i64,
}

impl std::fmt::Debug for SessionManager {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SessionManager")
            .field("lifetime_secs", &self.lifetime_secs)
            .finish_non_exhaustive()
    }
}

impl SessionManager {
    pub fn new(secret: &str, lifetime_secs: i64) -> Self {
        SessionManager {
            encoding: EncodingKey::from_secret(secret.as_bytes()),
            decoding: DecodingKey::from_secret(secret.as_bytes()),
            lifetime_secs,
        }
    }

    pub fn issue(&self, user: &User) -> ApiResult<String> {
        let now = Utc::now();
        let exp = now + Duration::seconds(self.lifetime_secs);

        let claims = Claims {
            sub: user.id.clone(),
            email: user.email.clone(),
            iat: now.timestamp(),
            exp: exp.timestamp(),
            jti: Uuid::new_v4().to_string(),
        };

        encode(&Header::default(), &claims, &self.encoding)
            .map_err(|e| ApiError::internal(format!("Failed to generate token: {}", e)))
    }

    /// Validates signature and expiry.
    pub fn validate(&self, token: &str) -> ApiResult<Claims> {
        decode::<Claims>(token, &self.decoding, &Validation::default())
            .map(|data| data.claims)
            .map_err(|e| ApiError::auth(format!("Invalid session token: {}", e)))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::ErrorCode;

    fn user() -> User {
        User {
            id: "user-1".to_string(),
            email: "ana@example.com".to_string(),
            password_hash: String::new(),
            created_at: Utc::now(),
        }
    }

    #[test]
    fn test_issue_and_validate() {
        let manager = SessionManager::new("test-secret", 3600);
        let token = manager.issue(&user()).unwrap();

        let claims = manager.validate(&token).unwrap();
        assert_eq!(claims.sub, "user-1");
        assert_eq!(claims.email, "ana@example.com");
        assert!(claims.exp > claims.iat);
    }

    #[test]
    fn test_wrong_secret_is_rejected() {
        let token = SessionManager::new("secret-a", 3600).issue(&user()).unwrap();
        let err = SessionManager::new("secret-b", 3600)
            .validate(&token)
            .unwrap_err();
        assert_eq!(err.code, ErrorCode::AuthError);
    }

    #[test]
    fn test_expired_token_is_rejected() {
        // Past the default 60s leeway
        let manager = SessionManager::new("test-secret", -120);
        let token = manager.issue(&user()).unwrap();
        assert!(manager.validate(&token).is_err());
    }

    #[test]
    fn test_garbage_token() {
        let manager = SessionManager::new("test-secret", 3600);
        assert!(manager.validate("not.a.token").is_err());
    }
}
