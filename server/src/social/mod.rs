//! Friend Graph
//!
//! Directional friend requests and the symmetric friendships they turn into.

pub mod friends;
pub mod types;

use axum::{
    routing::{delete, get, post, put},
    Router,
};

use crate::api::AppState;

/// Create the social router with friend management endpoints
pub fn router() -> Router<AppState> {
    Router::new()
        // Friend requests
        .route("/friends/requests", post(friends::send_friend_request))
        .route("/friends/requests/sent", get(friends::list_sent_requests))
        .route("/friends/requests/received", get(friends::list_received_requests))
        .route("/friends/requests/{id}", delete(friends::delete_friend_request))
        .route("/friends/requests/{id}/accept", put(friends::accept_friend_request))
        // Friendships
        .route(
            "/friends/{user_id}",
            get(friends::list_friends).delete(friends::remove_friend),
        )
}
