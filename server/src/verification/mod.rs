//! Verification Workflow
//!
//! Users ask to be verified; administrators approve or reject. Every
//! transition is mirrored onto the user's `verification_status`.

pub mod handlers;
pub mod types;

use axum::{
    routing::{get, post, put},
    Router,
};

use crate::api::AppState;

pub use types::{VerificationError, VerificationRequest, VerificationRequestStatus};

/// Routes available to any signed-in user.
pub fn router() -> Router<AppState> {
    Router::new()
        .route("/verification/request", post(handlers::create_request))
        .route("/verification/user/{user_id}", get(handlers::list_for_user))
}

/// Routes that require the admin flag.
pub fn admin_router() -> Router<AppState> {
    Router::new()
        .route("/verification/requests", get(handlers::list_pending))
        .route("/verification/approve/{id}", put(handlers::approve_request))
        .route("/verification/reject/{id}", put(handlers::reject_request))
}
