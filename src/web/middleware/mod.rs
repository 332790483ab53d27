//! Middleware for Web API.

pub mod auth;
pub mod cors;

pub use auth::{session_auth, AuthUser, CurrentSession, SessionState};
pub use cors::create_cors_layer;
