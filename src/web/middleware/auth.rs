//! Session authentication middleware.
//!
//! The session token is read from `Authorization: Bearer` first, then from
//! the session cookie. Verification is delegated to [`SessionProvider`].

use axum::{
    async_trait,
    body::Body,
    extract::FromRequestParts,
    http::{header::AUTHORIZATION, request::Parts, HeaderMap, Request},
    middleware::Next,
    response::Response,
};
use axum_extra::extract::cookie::CookieJar;
use std::sync::Arc;

use crate::session::{Session, SessionProvider};
use crate::web::error::ApiError;

/// Session verification state shared with the extractors.
#[derive(Debug, Clone)]
pub struct SessionState {
    /// Token verifier.
    pub provider: SessionProvider,
    /// Name of the session cookie.
    pub cookie_name: String,
}

impl SessionState {
    /// Create a new session state.
    pub fn new(provider: SessionProvider, cookie_name: impl Into<String>) -> Self {
        Self {
            provider,
            cookie_name: cookie_name.into(),
        }
    }

    /// Pull the raw token out of request headers.
    pub fn token_from_headers(&self, headers: &HeaderMap) -> Option<String> {
        let bearer = headers
            .get(AUTHORIZATION)
            .and_then(|value| value.to_str().ok())
            .and_then(|value| value.strip_prefix("Bearer "))
            .map(|t| t.trim().to_string())
            .filter(|t| !t.is_empty());

        bearer.or_else(|| {
            CookieJar::from_headers(headers)
                .get(&self.cookie_name)
                .map(|cookie| cookie.value().to_string())
        })
    }

    /// Resolve the session for a request.
    pub fn resolve(&self, headers: &HeaderMap) -> Session {
        self.provider
            .resolve(self.token_from_headers(headers).as_deref())
    }
}

fn session_state(parts: &Parts) -> Result<&Arc<SessionState>, ApiError> {
    parts
        .extensions
        .get::<Arc<SessionState>>()
        .ok_or_else(|| ApiError::internal("Session state not configured"))
}

/// The request's session, authenticated or not.
///
/// Pages use this to decide between rendering and redirecting.
#[derive(Debug, Clone)]
pub struct CurrentSession(pub Session);

#[async_trait]
impl<S> FromRequestParts<S> for CurrentSession
where
    S: Send + Sync,
{
    type Rejection = ApiError;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        let state = session_state(parts)?;
        Ok(CurrentSession(state.resolve(&parts.headers)))
    }
}

/// Extractor for authenticated users. Carries the owner email.
///
/// Missing, invalid or expired sessions are rejected with 401.
#[derive(Debug, Clone)]
pub struct AuthUser(pub String);

#[async_trait]
impl<S> FromRequestParts<S> for AuthUser
where
    S: Send + Sync,
{
    type Rejection = ApiError;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        let state = session_state(parts)?;
        let token = state
            .token_from_headers(&parts.headers)
            .ok_or_else(|| ApiError::unauthorized("Missing session"))?;

        let claims = state
            .provider
            .verify(&token)
            .map_err(|_| ApiError::unauthorized("Invalid or expired session"))?;

        if claims.sub.is_empty() {
            return Err(ApiError::unauthorized("Invalid or expired session"));
        }
        Ok(AuthUser(claims.sub))
    }
}

/// Middleware function to inject session state into request extensions.
pub async fn session_auth(
    session_state: Arc<SessionState>,
    mut request: Request<Body>,
    next: Next,
) -> Response {
    request.extensions_mut().insert(session_state);
    next.run(request).await
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::http::{header::COOKIE, HeaderValue};

    fn state() -> SessionState {
        SessionState::new(SessionProvider::new("test-secret", 3600), "cloudnest_session")
    }

    #[test]
    fn test_bearer_token() {
        let state = state();
        let token = state.provider.issue("ada@example.com").unwrap();

        let mut headers = HeaderMap::new();
        headers.insert(
            AUTHORIZATION,
            HeaderValue::from_str(&format!("Bearer {token}")).unwrap(),
        );

        let session = state.resolve(&headers);
        assert_eq!(session.email.as_deref(), Some("ada@example.com"));
    }

    #[test]
    fn test_cookie_token() {
        let state = state();
        let token = state.provider.issue("ada@example.com").unwrap();

        let mut headers = HeaderMap::new();
        headers.insert(
            COOKIE,
            HeaderValue::from_str(&format!("theme=dark; cloudnest_session={token}")).unwrap(),
        );

        assert_eq!(state.token_from_headers(&headers), Some(token));
        assert!(state.resolve(&headers).is_authenticated());
    }

    #[test]
    fn test_no_token_is_unauthenticated() {
        let state = state();
        let headers = HeaderMap::new();

        assert_eq!(state.token_from_headers(&headers), None);
        assert!(!state.resolve(&headers).is_authenticated());
    }

    #[test]
    fn test_garbage_token_is_unauthenticated() {
        let state = state();
        let mut headers = HeaderMap::new();
        headers.insert(AUTHORIZATION, HeaderValue::from_static("Bearer not-a-jwt"));

        assert!(!state.resolve(&headers).is_authenticated());
    }
}
