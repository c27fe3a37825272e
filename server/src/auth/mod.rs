//! Authentication Service
//!
//! Handles account registration, login, and the authorization gate that
//! every `/api` route passes through.

mod error;
pub mod gate;
pub(crate) mod handlers;
pub mod jwt;
mod middleware;
mod password;

use axum::{
    routing::{get, post},
    Router,
};

use crate::api::AppState;

pub use error::{AuthError, AuthResult, ErrorResponse};
pub use gate::Access;
pub use middleware::{authorize, with_access, AuthUser};
pub use password::{hash_password, verify_password};

/// Create the public authentication router.
///
/// - POST /register - Register a new account
/// - POST /login - Login with email/password
pub fn public_router() -> Router<AppState> {
    Router::new()
        .route("/register", post(handlers::register))
        .route("/login", post(handlers::login))
}

/// Create the authenticated authentication router.
///
/// - GET /me - Get current account
pub fn router() -> Router<AppState> {
    Router::new().route("/me", get(handlers::me))
}
