//! Posts
//!
//! User posts with likes, the friends newsfeed, and admin archival.

pub mod handlers;
pub mod types;

use axum::{
    routing::{get, put},
    Router,
};

use crate::api::AppState;

pub use types::{Post, PostError};

/// Routes available to any signed-in user.
pub fn router() -> Router<AppState> {
    Router::new()
        .route("/posts", get(handlers::list_posts).post(handlers::create_post))
        .route("/posts/newsfeed", get(handlers::newsfeed))
        .route("/posts/{id}", get(handlers::get_post).put(handlers::update_post))
        .route("/posts/{id}/like", put(handlers::toggle_like))
}

/// Routes that require the admin flag.
pub fn admin_router() -> Router<AppState> {
    Router::new()
        .route("/posts/{id}/archive", put(handlers::archive_post))
        .route("/posts/{id}/unarchive", put(handlers::unarchive_post))
}
