//! Session provider boundary.
//!
//! Identity is owned by an external provider that mints HS256 tokens. This
//! module only verifies them and projects the result onto a read-only
//! [`Session`] carrying a status and the user's email.

use jsonwebtoken::{decode, encode, DecodingKey, EncodingKey, Header, Validation};
use serde::{Deserialize, Serialize};

use crate::config::SessionConfig;
use crate::{CloudError, Result};

/// Session status as reported by the provider.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SessionStatus {
    /// The user is signed in.
    Authenticated,
    /// No valid session.
    Unauthenticated,
    /// The provider has not answered yet.
    Loading,
}

/// Read-only projection of the provider's session.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Session {
    /// Current status.
    pub status: SessionStatus,
    /// Email of the signed-in user, present only when authenticated.
    pub email: Option<String>,
}

impl Session {
    /// An authenticated session for `email`.
    pub fn authenticated(email: impl Into<String>) -> Self {
        Self {
            status: SessionStatus::Authenticated,
            email: Some(email.into()),
        }
    }

    /// A session with no signed-in user.
    pub fn unauthenticated() -> Self {
        Self {
            status: SessionStatus::Unauthenticated,
            email: None,
        }
    }

    /// A session whose status is still being resolved.
    pub fn loading() -> Self {
        Self {
            status: SessionStatus::Loading,
            email: None,
        }
    }

    /// Whether a user is signed in.
    pub fn is_authenticated(&self) -> bool {
        self.status == SessionStatus::Authenticated
    }

    /// The owner email, or `AuthExpired` when not signed in.
    pub fn require_email(&self) -> Result<&str> {
        match (&self.status, &self.email) {
            (SessionStatus::Authenticated, Some(email)) => Ok(email),
            _ => Err(CloudError::AuthExpired),
        }
    }
}

/// Claims carried by a session token.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SessionClaims {
    /// Subject (user email).
    pub sub: String,
    /// Issued at timestamp.
    pub iat: u64,
    /// Expiration timestamp.
    pub exp: u64,
    /// Token ID.
    pub jti: String,
}

/// Verifies session tokens.
#[derive(Clone)]
pub struct SessionProvider {
    encoding_key: EncodingKey,
    decoding_key: DecodingKey,
    validation: Validation,
    token_expiry_secs: u64,
}

impl SessionProvider {
    /// Create a provider from a shared secret.
    pub fn new(secret: &str, token_expiry_secs: u64) -> Self {
        let mut validation = Validation::default();
        validation.validate_exp = true;

        Self {
            encoding_key: EncodingKey::from_secret(secret.as_bytes()),
            decoding_key: DecodingKey::from_secret(secret.as_bytes()),
            validation,
            token_expiry_secs,
        }
    }

    /// Create a provider from configuration.
    pub fn from_config(config: &SessionConfig) -> Self {
        Self::new(&config.jwt_secret, config.token_expiry_secs)
    }

    /// Mint a token for `email`.
    ///
    /// Production tokens come from the external provider; this exists for
    /// tooling and tests that need to act as a signed-in user.
    pub fn issue(&self, email: &str) -> Result<String> {
        let now = chrono::Utc::now().timestamp() as u64;
        let claims = SessionClaims {
            sub: email.to_string(),
            iat: now,
            exp: now + self.token_expiry_secs,
            jti: uuid::Uuid::new_v4().to_string(),
        };

        encode(&Header::default(), &claims, &self.encoding_key)
            .map_err(|e| CloudError::Config(format!("failed to encode session token: {e}")))
    }

    /// Verify a token and return its claims.
    pub fn verify(&self, token: &str) -> Result<SessionClaims> {
        decode::<SessionClaims>(token, &self.decoding_key, &self.validation)
            .map(|data| data.claims)
            .map_err(|e| {
                tracing::debug!("Session token rejected: {}", e);
                CloudError::AuthExpired
            })
    }

    /// Resolve an optional token into a session projection.
    ///
    /// Missing, malformed or expired tokens all resolve to `unauthenticated`.
    pub fn resolve(&self, token: Option<&str>) -> Session {
        match token.map(|t| self.verify(t)) {
            Some(Ok(claims)) if !claims.sub.is_empty() => Session::authenticated(claims.sub),
            _ => Session::unauthenticated(),
        }
    }
}

impl std::fmt::Debug for SessionProvider {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SessionProvider")
            .field("token_expiry_secs", &self.token_expiry_secs)
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn expired_token(secret: &str, email: &str) -> String {
        let now = chrono::Utc::now().timestamp() as u64;
        let claims = SessionClaims {
            sub: email.to_string(),
            iat: now - 7200,
            exp: now - 3600,
            jti: "old".to_string(),
        };
        encode(
            &Header::default(),
            &claims,
            &EncodingKey::from_secret(secret.as_bytes()),
        )
        .unwrap()
    }

    #[test]
    fn test_issue_and_resolve() {
        let provider = SessionProvider::new("test-secret", 3600);
        let token = provider.issue("ada@example.com").unwrap();

        let session = provider.resolve(Some(&token));
        assert!(session.is_authenticated());
        assert_eq!(session.email.as_deref(), Some("ada@example.com"));
        assert_eq!(session.require_email().unwrap(), "ada@example.com");
    }

    #[test]
    fn test_missing_token_is_unauthenticated() {
        let provider = SessionProvider::new("test-secret", 3600);
        assert_eq!(provider.resolve(None), Session::unauthenticated());
    }

    #[test]
    fn test_expired_token_is_unauthenticated() {
        let provider = SessionProvider::new("test-secret", 3600);
        let token = expired_token("test-secret", "ada@example.com");

        assert_eq!(provider.resolve(Some(&token)).status, SessionStatus::Unauthenticated);
        assert!(matches!(provider.verify(&token), Err(CloudError::AuthExpired)));
    }

    #[test]
    fn test_wrong_secret_is_unauthenticated() {
        let issuer = SessionProvider::new("secret1", 3600);
        let verifier = SessionProvider::new("secret2", 3600);
        let token = issuer.issue("ada@example.com").unwrap();

        assert!(!verifier.resolve(Some(&token)).is_authenticated());
    }

    #[test]
    fn test_require_email_when_not_signed_in() {
        assert!(matches!(
            Session::loading().require_email(),
            Err(CloudError::AuthExpired)
        ));
        assert!(matches!(
            Session::unauthenticated().require_email(),
            Err(CloudError::AuthExpired)
        ));
    }

    #[test]
    fn test_status_serializes_lowercase() {
        let json = serde_json::to_string(&Session::loading()).unwrap();
        assert!(json.contains("\"loading\""));
    }
}
