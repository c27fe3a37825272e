//! Notifications
//!
//! One-way notices addressed to a user. Feature modules write them through
//! [`notify`] and [`notify_friends`]; users read them through the router.

pub mod handlers;
mod sink;
pub mod types;

use axum::{
    routing::{get, put},
    Router,
};

use crate::api::AppState;

pub use sink::{notify, notify_friends};
pub use types::{Notification, NotificationError, NotificationKind, NotificationPage};

/// Create the notifications router
pub fn router() -> Router<AppState> {
    Router::new()
        .route("/notifications", get(handlers::list_notifications))
        .route("/notifications/{id}/seen", put(handlers::mark_seen))
}
