//! OpenAPI document assembled from the handler annotations.

use axum::Json;
use utoipa::openapi::security::{HttpAuthScheme, HttpBuilder, SecurityScheme};
use utoipa::{Modify, OpenApi};

use crate::{auth, notifications, posts, social, users, verification};

#[derive(OpenApi)]
#[openapi(
    info(title = "Circle API", description = "Social network backend"),
    paths(
        super::health_check,
        auth::handlers::register,
        auth::handlers::login,
        auth::handlers::me,
        users::get_user,
        users::archive_user,
        users::unarchive_user,
        social::friends::send_friend_request,
        social::friends::delete_friend_request,
        social::friends::accept_friend_request,
        social::friends::remove_friend,
        social::friends::list_friends,
        social::friends::list_sent_requests,
        social::friends::list_received_requests,
        notifications::handlers::list_notifications,
        notifications::handlers::mark_seen,
        posts::handlers::create_post,
        posts::handlers::newsfeed,
        posts::handlers::list_posts,
        posts::handlers::get_post,
        posts::handlers::update_post,
        posts::handlers::toggle_like,
        posts::handlers::archive_post,
        posts::handlers::unarchive_post,
        verification::handlers::create_request,
        verification::handlers::list_pending,
        verification::handlers::list_for_user,
        verification::handlers::approve_request,
        verification::handlers::reject_request,
    ),
    modifiers(&BearerAuth),
    tags(
        (name = "auth", description = "Registration and login"),
        (name = "users", description = "User directory"),
        (name = "friends", description = "Friend requests and friendships"),
        (name = "notifications", description = "User notifications"),
        (name = "posts", description = "Posts, likes and the newsfeed"),
        (name = "verification", description = "Account verification workflow"),
    )
)]
struct ApiDoc;

/// Registers the `bearer_auth` scheme the handlers reference.
struct BearerAuth;

impl Modify for BearerAuth {
    fn modify(&self, openapi: &mut utoipa::openapi::OpenApi) {
        let components = openapi.components.get_or_insert_with(Default::default);
        components.add_security_scheme(
            "bearer_auth",
            SecurityScheme::Http(
                HttpBuilder::new()
                    .scheme(HttpAuthScheme::Bearer)
                    .bearer_format("JWT")
                    .build(),
            ),
        );
    }
}

/// GET /api/docs/openapi.json
pub async fn openapi_json() -> Json<utoipa::openapi::OpenApi> {
    Json(ApiDoc::openapi())
}
