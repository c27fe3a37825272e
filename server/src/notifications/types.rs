use chrono::{DateTime, Utc};
use serde::Serialize;
use sqlx::FromRow;
use uuid::Uuid;

use crate::api::pagination::Paginated;
use crate::db::{UserSummary, VerificationStatus};

/// What triggered a notification.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Serialize, sqlx::Type, utoipa::ToSchema,
)]
#[sqlx(type_name = "notification_kind", rename_all = "snake_case")]
#[serde(rename_all = "camelCase")]
pub enum NotificationKind {
    /// Someone sent the recipient a friend request. References the request.
    FriendRequest,
    /// The recipient's friend request was accepted. References the friendship.
    FriendRequestAccepted,
    /// Someone liked the recipient's post. References the post.
    PostLike,
    /// A friend published a post. References the post.
    NewPost,
}

/// Notification with sender and recipient populated.
#[derive(Debug, Clone, Serialize, utoipa::ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct Notification {
    pub id: Uuid,
    pub to: UserSummary,
    pub from: UserSummary,
    #[serde(rename = "type")]
    pub kind: NotificationKind,
    /// The entity that triggered the notification.
    pub reference: Uuid,
    pub seen: bool,
    pub created_at: DateTime<Utc>,
}

/// Joined notification row.
#[derive(Debug, FromRow)]
pub(crate) struct NotificationRow {
    pub id: Uuid,
    pub kind: NotificationKind,
    pub reference_id: Uuid,
    pub seen: bool,
    pub created_at: DateTime<Utc>,
    pub from_id: Uuid,
    pub from_full_name: String,
    pub from_photo_url: Option<String>,
    pub from_job_title: String,
    pub from_verification_status: VerificationStatus,
    pub to_id: Uuid,
    pub to_full_name: String,
    pub to_photo_url: Option<String>,
    pub to_job_title: String,
    pub to_verification_status: VerificationStatus,
}

impl From<NotificationRow> for Notification {
    fn from(row: NotificationRow) -> Self {
        Self {
            id: row.id,
            to: UserSummary {
                id: row.to_id,
                full_name: row.to_full_name,
                photo_url: row.to_photo_url,
                job_title: row.to_job_title,
                verification_status: row.to_verification_status,
            },
            from: UserSummary {
                id: row.from_id,
                full_name: row.from_full_name,
                photo_url: row.from_photo_url,
                job_title: row.from_job_title,
                verification_status: row.from_verification_status,
            },
            kind: row.kind,
            reference: row.reference_id,
            seen: row.seen,
            created_at: row.created_at,
        }
    }
}

/// A page of notifications plus the caller's unseen count.
#[derive(Debug, Serialize, utoipa::ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct NotificationPage {
    #[serde(flatten)]
    pub page: Paginated<Notification>,
    pub total_unseen: i64,
}

/// Error types for notification operations
#[derive(Debug, thiserror::Error)]
pub enum NotificationError {
    #[error("Database error: {0}")]
    Database(#[from] sqlx::Error),
}

impl axum::response::IntoResponse for NotificationError {
    fn into_response(self) -> axum::response::Response {
        use axum::http::StatusCode;
        use axum::Json;
        use serde_json::json;

        let Self::Database(err) = &self;
        tracing::error!("Database error: {}", err);

        (
            StatusCode::INTERNAL_SERVER_ERROR,
            Json(json!({ "error": "INTERNAL_ERROR", "message": "Database error" })),
        )
            .into_response()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_kind_serializes_camel_case() {
        assert_eq!(
            serde_json::to_value(NotificationKind::FriendRequestAccepted).unwrap(),
            "friendRequestAccepted"
        );
        assert_eq!(serde_json::to_value(NotificationKind::PostLike).unwrap(), "postLike");
    }
}
