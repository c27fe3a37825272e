use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use uuid::Uuid;
use validator::Validate;

use crate::db::{UserSummary, VerificationStatus};

/// Post as returned by the API, with its author and likers.
#[derive(Debug, Clone, Serialize, utoipa::ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct Post {
    pub id: Uuid,
    pub user: UserSummary,
    pub description: String,
    pub photo_url: Option<String>,
    pub archived: bool,
    /// IDs of users who liked the post, oldest like first.
    pub likes: Vec<Uuid>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// Post row joined with its author and aggregated likes.
#[derive(Debug, FromRow)]
pub(crate) struct PostRow {
    pub id: Uuid,
    pub user_id: Uuid,
    pub description: String,
    pub photo_url: Option<String>,
    pub archived: bool,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
    pub author_full_name: String,
    pub author_photo_url: Option<String>,
    pub author_job_title: String,
    pub author_verification_status: VerificationStatus,
    pub likes: Vec<Uuid>,
}

impl From<PostRow> for Post {
    fn from(row: PostRow) -> Self {
        Self {
            id: row.id,
            user: UserSummary {
                id: row.user_id,
                full_name: row.author_full_name,
                photo_url: row.author_photo_url,
                job_title: row.author_job_title,
                verification_status: row.author_verification_status,
            },
            description: row.description,
            photo_url: row.photo_url,
            archived: row.archived,
            likes: row.likes,
            created_at: row.created_at,
            updated_at: row.updated_at,
        }
    }
}

/// Ownership and visibility of a post, enough to authorize an action.
#[derive(Debug, Clone, Copy, FromRow)]
pub struct PostAccess {
    pub id: Uuid,
    pub user_id: Uuid,
    pub archived: bool,
}

impl PostAccess {
    /// Archived posts are visible to admins only.
    #[must_use]
    pub const fn visible_to(&self, is_admin: bool) -> bool {
        is_admin || !self.archived
    }

    /// Authors and admins may edit.
    #[must_use]
    pub fn editable_by(&self, user_id: Uuid, is_admin: bool) -> bool {
        is_admin || self.user_id == user_id
    }
}

/// Create post request
#[derive(Debug, Deserialize, Validate, utoipa::ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct CreatePostRequest {
    #[validate(length(max = 5000))]
    #[serde(default)]
    pub description: String,
    #[validate(url)]
    pub photo_url: Option<String>,
}

impl CreatePostRequest {
    /// A post needs text or a photo.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.description.trim().is_empty() && self.photo_url.is_none()
    }
}

/// Update post request. Absent fields are left unchanged.
#[derive(Debug, Deserialize, Validate, utoipa::ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct UpdatePostRequest {
    #[validate(length(max = 5000))]
    pub description: Option<String>,
    #[validate(url)]
    pub photo_url: Option<String>,
}

/// `GET /api/posts?user=` filter.
#[derive(Debug, Default, Deserialize, utoipa::IntoParams)]
#[into_params(parameter_in = Query)]
pub struct ListPostsQuery {
    /// Author to list (defaults to the caller).
    pub user: Option<Uuid>,
}

/// Error types for post operations
#[derive(Debug, thiserror::Error)]
pub enum PostError {
    #[error("Database error: {0}")]
    Database(#[from] sqlx::Error),

    #[error("Post not found")]
    NotFound,

    #[error("Unauthorized")]
    Unauthorized,

    #[error("Validation error: {0}")]
    Validation(String),
}

impl axum::response::IntoResponse for PostError {
    fn into_response(self) -> axum::response::Response {
        use axum::http::StatusCode;
        use axum::Json;
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
            Self::NotFound => (StatusCode::NOT_FOUND, "POST_NOT_FOUND", self.to_string()),
            Self::Unauthorized => (StatusCode::UNAUTHORIZED, "UNAUTHORIZED", self.to_string()),
            Self::Validation(msg) => (StatusCode::BAD_REQUEST, "VALIDATION_ERROR", msg.clone()),
        };

        (status, Json(json!({ "error": code, "message": message }))).into_response()
    }
}
