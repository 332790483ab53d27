//! HTTP surface.
//!
//! Page routes render the list views as JSON (redirecting to the login
//! route without a session); `/api` exposes the folder and file services.

pub mod dto;
pub mod error;
pub mod handlers;
pub mod middleware;
pub mod router;
pub mod server;

pub use error::ApiError;
pub use handlers::AppState;
pub use router::{create_router, ApiDoc};
pub use server::WebServer;
