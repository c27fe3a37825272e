use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use uuid::Uuid;

use crate::db::{UserSummary, VerificationStatus};

/// Pending, directional friendship proposal.
#[derive(Debug, Clone, FromRow)]
pub struct FriendRequestRow {
    pub id: Uuid,
    pub from_user_id: Uuid,
    pub to_user_id: Uuid,
    pub created_at: DateTime<Utc>,
}

impl FriendRequestRow {
    /// Sender or recipient.
    #[must_use]
    pub fn is_participant(&self, user_id: Uuid) -> bool {
        self.from_user_id == user_id || self.to_user_id == user_id
    }

    /// Only the recipient may accept.
    #[must_use]
    pub fn is_recipient(&self, user_id: Uuid) -> bool {
        self.to_user_id == user_id
    }
}

/// Friend request as returned by the API.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, utoipa::ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct FriendRequest {
    pub id: Uuid,
    pub from: Uuid,
    pub to: Uuid,
    pub created_at: DateTime<Utc>,
}

impl From<FriendRequestRow> for FriendRequest {
    fn from(row: FriendRequestRow) -> Self {
        Self {
            id: row.id,
            from: row.from_user_id,
            to: row.to_user_id,
            created_at: row.created_at,
        }
    }
}

/// Friend request listed with the other party's details.
#[derive(Debug, Clone, Serialize, utoipa::ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct FriendRequestView {
    #[serde(flatten)]
    pub request: FriendRequest,
    /// The recipient for sent requests, the sender for received ones.
    pub user: UserSummary,
}

/// Request row joined with the counterpart user.
#[derive(Debug, FromRow)]
pub(crate) struct FriendRequestViewRow {
    pub id: Uuid,
    pub from_user_id: Uuid,
    pub to_user_id: Uuid,
    pub created_at: DateTime<Utc>,
    pub user_id: Uuid,
    pub full_name: String,
    pub photo_url: Option<String>,
    pub job_title: String,
    pub verification_status: VerificationStatus,
}

impl From<FriendRequestViewRow> for FriendRequestView {
    fn from(row: FriendRequestViewRow) -> Self {
        Self {
            request: FriendRequest {
                id: row.id,
                from: row.from_user_id,
                to: row.to_user_id,
                created_at: row.created_at,
            },
            user: UserSummary {
                id: row.user_id,
                full_name: row.full_name,
                photo_url: row.photo_url,
                job_title: row.job_title,
                verification_status: row.verification_status,
            },
        }
    }
}

/// Friendship record from database
#[derive(Debug, Clone, FromRow)]
pub struct FriendshipRow {
    pub id: Uuid,
    pub first_user_id: Uuid,
    pub second_user_id: Uuid,
    pub created_at: DateTime<Utc>,
}

/// Confirmed friendship. `users` keeps acceptance order: sender first.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, utoipa::ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct Friendship {
    pub id: Uuid,
    pub users: [Uuid; 2],
    pub created_at: DateTime<Utc>,
}

impl From<FriendshipRow> for Friendship {
    fn from(row: FriendshipRow) -> Self {
        Self {
            id: row.id,
            users: [row.first_user_id, row.second_user_id],
            created_at: row.created_at,
        }
    }
}

/// Friend user information (enriched with user details)
#[derive(Debug, Clone, FromRow, Serialize, utoipa::ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct Friend {
    pub id: Uuid,
    pub full_name: String,
    pub photo_url: Option<String>,
    pub job_title: String,
    pub verification_status: VerificationStatus,
    pub friendship_id: Uuid,
    /// When the friendship was created.
    pub since: DateTime<Utc>,
}

/// Request to send a friend request
#[derive(Debug, Deserialize, utoipa::ToSchema)]
pub struct SendFriendRequestBody {
    /// ID of the user to befriend
    pub to: Uuid,
}

/// Confirmation message for deletions.
#[derive(Debug, Serialize, utoipa::ToSchema)]
pub struct MessageResponse {
    pub message: String,
}

impl MessageResponse {
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
        }
    }
}

/// Reject self-requests before touching the store.
pub fn check_distinct(from: Uuid, to: Uuid) -> Result<(), SocialError> {
    if from == to {
        return Err(SocialError::SameUser);
    }
    Ok(())
}

/// Friendships that involve the protected administrator cannot be removed.
pub fn check_not_admin(admin_id: Option<Uuid>, caller: Uuid, other: Uuid) -> Result<(), SocialError> {
    match admin_id {
        Some(admin) if admin == caller || admin == other => Err(SocialError::AdminProtected),
        _ => Ok(()),
    }
}

/// Error types for social operations
#[derive(Debug, thiserror::Error)]
pub enum SocialError {
    #[error("Database error: {0}")]
    Database(#[from] sqlx::Error),

    #[error("User not found")]
    UserNotFound,

    #[error("The 2 ids are the same")]
    SameUser,

    #[error("Request already sent")]
    RequestAlreadySent,

    #[error("This user is already in your friend list")]
    AlreadyFriends,

    #[error("Request not found")]
    RequestNotFound,

    #[error("Friendship not found")]
    FriendshipNotFound,

    #[error("This action cannot be performed for the admin")]
    AdminProtected,

    #[error("Unauthorized")]
    Unauthorized,
}

impl axum::response::IntoResponse for SocialError {
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
            Self::UserNotFound => (StatusCode::NOT_FOUND, "USER_NOT_FOUND", self.to_string()),
            Self::SameUser => (StatusCode::BAD_REQUEST, "SAME_USER", self.to_string()),
            Self::RequestAlreadySent => {
                (StatusCode::BAD_REQUEST, "REQUEST_EXISTS", self.to_string())
            }
            Self::AlreadyFriends => (StatusCode::BAD_REQUEST, "ALREADY_FRIENDS", self.to_string()),
            Self::RequestNotFound => {
                (StatusCode::NOT_FOUND, "REQUEST_NOT_FOUND", self.to_string())
            }
            Self::FriendshipNotFound => (
                StatusCode::NOT_FOUND,
                "FRIENDSHIP_NOT_FOUND",
                self.to_string(),
            ),
            Self::AdminProtected => {
                (StatusCode::BAD_REQUEST, "ADMIN_PROTECTED", self.to_string())
            }
            Self::Unauthorized => (StatusCode::UNAUTHORIZED, "UNAUTHORIZED", self.to_string()),
        };

        (status, Json(json!({ "error": code, "message": message }))).into_response()
    }
}

#[cfg(test)]
mod tests {
    use axum::http::StatusCode;
    use axum::response::IntoResponse;

    use super::*;

    fn request(from: Uuid, to: Uuid) -> FriendRequestRow {
        FriendRequestRow {
            id: Uuid::now_v7(),
            from_user_id: from,
            to_user_id: to,
            created_at: Utc::now(),
        }
    }

    #[test]
    fn test_self_request_rejected() {
        let id = Uuid::now_v7();
        assert!(matches!(check_distinct(id, id), Err(SocialError::SameUser)));
        assert!(check_distinct(id, Uuid::now_v7()).is_ok());
    }

    #[test]
    fn test_only_recipient_may_accept() {
        let (sender, recipient, outsider) = (Uuid::now_v7(), Uuid::now_v7(), Uuid::now_v7());
        let req = request(sender, recipient);

        assert!(req.is_recipient(recipient));
        assert!(!req.is_recipient(sender));
        assert!(!req.is_recipient(outsider));
    }

    #[test]
    fn test_either_party_may_delete_request() {
        let (sender, recipient, outsider) = (Uuid::now_v7(), Uuid::now_v7(), Uuid::now_v7());
        let req = request(sender, recipient);

        assert!(req.is_participant(sender));
        assert!(req.is_participant(recipient));
        assert!(!req.is_participant(outsider));
    }

    #[test]
    fn test_admin_friendship_protected_both_ways() {
        let (admin, user) = (Uuid::now_v7(), Uuid::now_v7());

        assert!(matches!(
            check_not_admin(Some(admin), user, admin),
            Err(SocialError::AdminProtected)
        ));
        assert!(matches!(
            check_not_admin(Some(admin), admin, user),
            Err(SocialError::AdminProtected)
        ));
        assert!(check_not_admin(Some(admin), user, Uuid::now_v7()).is_ok());
        assert!(check_not_admin(None, user, admin).is_ok());
    }

    #[test]
    fn test_serialized_shapes() {
        let (a, b) = (Uuid::now_v7(), Uuid::now_v7());
        let req = FriendRequest::from(request(a, b));
        let json = serde_json::to_value(&req).unwrap();
        assert_eq!(json["from"], a.to_string());
        assert_eq!(json["to"], b.to_string());
        assert!(json.get("createdAt").is_some());

        let friendship = Friendship::from(FriendshipRow {
            id: Uuid::now_v7(),
            first_user_id: a,
            second_user_id: b,
            created_at: Utc::now(),
        });
        let json = serde_json::to_value(&friendship).unwrap();
        assert_eq!(json["users"], serde_json::json!([a, b]));
    }

    #[test]
    fn test_error_statuses() {
        assert_eq!(
            SocialError::SameUser.into_response().status(),
            StatusCode::BAD_REQUEST
        );
        assert_eq!(
            SocialError::AdminProtected.into_response().status(),
            StatusCode::BAD_REQUEST
        );
        assert_eq!(
            SocialError::Unauthorized.into_response().status(),
            StatusCode::UNAUTHORIZED
        );
        assert_eq!(
            SocialError::RequestNotFound.into_response().status(),
            StatusCode::NOT_FOUND
        );
    }
}
