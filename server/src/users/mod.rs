//! User Directory
//!
//! Public profiles and admin archival. Archived users are turned away by
//! the authorization gate on their next request.

use axum::{
    extract::State,
    routing::{get, put},
    Json, Router,
};
use uuid::Uuid;

use crate::api::extract::ApiPath;
use crate::api::AppState;
use crate::db::{find_user_by_id, set_user_archived, UserProfile, UserSummary};

/// Error types for user directory operations
#[derive(Debug, thiserror::Error)]
pub enum UserError {
    #[error("Database error: {0}")]
    Database(#[from] sqlx::Error),

    #[error("User not found")]
    NotFound,

    #[error("This action cannot be performed for the admin")]
    AdminProtected,
}

impl axum::response::IntoResponse for UserError {
    fn into_response(self) -> axum::response::Response {
        use axum::http::StatusCode;
        use serde_json::json;

        let (status, code, message) = match &self {
            Self::Database(err) => {
                tracing::error!("Database error: {}", err);
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    "INTERNAL_ERROR",
                    "Database error".to_string(),
                )
            }
            Self::NotFound => (StatusCode::NOT_FOUND, "USER_NOT_FOUND", self.to_string()),
            Self::AdminProtected => (StatusCode::BAD_REQUEST, "ADMIN_PROTECTED", self.to_string()),
        };

        (status, Json(json!({ "error": code, "message": message }))).into_response()
    }
}

/// Routes available to any signed-in user.
pub fn router() -> Router<AppState> {
    Router::new().route("/users/{id}", get(get_user))
}

/// Routes that require the admin flag.
pub fn admin_router() -> Router<AppState> {
    Router::new()
        .route("/users/{id}/archive", put(archive_user))
        .route("/users/{id}/unarchive", put(unarchive_user))
}

/// GET /api/users/{id}
/// Public profile of a user
#[utoipa::path(
    get,
    path = "/api/users/{id}",
    tag = "users",
    params(("id" = Uuid, Path, description = "User ID")),
    responses(
        (status = 200, description = "Profile", body = UserSummary),
        (status = 404, description = "User not found"),
    ),
    security(("bearer_auth" = [])),
)]
pub async fn get_user(
    State(state): State<AppState>,
    ApiPath(user_id): ApiPath<Uuid>,
) -> Result<Json<UserSummary>, UserError> {
    let user = find_user_by_id(&state.db, user_id)
        .await?
        .ok_or(UserError::NotFound)?;

    Ok(Json(UserSummary::from(&user)))
}

/// PUT /api/users/{id}/archive
/// Ban a user (admin only)
#[utoipa::path(
    put,
    path = "/api/users/{id}/archive",
    tag = "users",
    params(("id" = Uuid, Path, description = "User ID")),
    responses(
        (status = 200, description = "Archived user", body = UserProfile),
        (status = 400, description = "Target is the protected administrator"),
        (status = 404, description = "User not found"),
    ),
    security(("bearer_auth" = [])),
)]
#[tracing::instrument(skip(state))]
pub async fn archive_user(
    State(state): State<AppState>,
    ApiPath(user_id): ApiPath<Uuid>,
) -> Result<Json<UserProfile>, UserError> {
    if state.config.is_protected_admin(user_id) {
        return Err(UserError::AdminProtected);
    }

    let user = set_user_archived(&state.db, user_id, true)
        .await?
        .ok_or(UserError::NotFound)?;

    tracing::info!(%user_id, "User archived");

    Ok(Json(user.into()))
}

/// PUT /api/users/{id}/unarchive
/// Lift a ban (admin only)
#[utoipa::path(
    put,
    path = "/api/users/{id}/unarchive",
    tag = "users",
    params(("id" = Uuid, Path, description = "User ID")),
    responses(
        (status = 200, description = "Restored user", body = UserProfile),
        (status = 404, description = "User not found"),
    ),
    security(("bearer_auth" = [])),
)]
#[tracing::instrument(skip(state))]
pub async fn unarchive_user(
    State(state): State<AppState>,
    ApiPath(user_id): ApiPath<Uuid>,
) -> Result<Json<UserProfile>, UserError> {
    let user = set_user_archived(&state.db, user_id, false)
        .await?
        .ok_or(UserError::NotFound)?;

    tracing::info!(%user_id, "User unarchived");

    Ok(Json(user.into()))
}
