use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use uuid::Uuid;
use validator::Validate;

use crate::db::{UserSummary, VerificationStatus};

/// Lifecycle of a single verification request.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, sqlx::Type, utoipa::ToSchema,
)]
#[sqlx(type_name = "verification_request_status", rename_all = "lowercase")]
#[serde(rename_all = "lowercase")]
pub enum VerificationRequestStatus {
    Pending,
    Approved,
    Rejected,
}

impl VerificationRequestStatus {
    /// The user-level status mirrored when a request reaches this state.
    #[must_use]
    pub const fn user_status(self) -> VerificationStatus {
        match self {
            Self::Pending => VerificationStatus::Pending,
            Self::Approved => VerificationStatus::Verified,
            Self::Rejected => VerificationStatus::Rejected,
        }
    }
}

/// Verification request record from database
#[derive(Debug, Clone, FromRow, Serialize, utoipa::ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct VerificationRequest {
    pub id: Uuid,
    #[serde(rename = "user")]
    pub user_id: Uuid,
    pub message: String,
    pub status: VerificationRequestStatus,
    pub admin_response: Option<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// Pending request with the requesting user populated.
#[derive(Debug, Clone, Serialize, utoipa::ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct PendingVerificationRequest {
    pub id: Uuid,
    pub user: UserSummary,
    pub email: String,
    pub message: String,
    pub status: VerificationRequestStatus,
    pub created_at: DateTime<Utc>,
}

#[derive(Debug, FromRow)]
pub(crate) struct PendingRow {
    pub id: Uuid,
    pub message: String,
    pub status: VerificationRequestStatus,
    pub created_at: DateTime<Utc>,
    pub user_id: Uuid,
    pub full_name: String,
    pub email: String,
    pub photo_url: Option<String>,
    pub job_title: String,
    pub verification_status: VerificationStatus,
}

impl From<PendingRow> for PendingVerificationRequest {
    fn from(row: PendingRow) -> Self {
        Self {
            id: row.id,
            user: UserSummary {
                id: row.user_id,
                full_name: row.full_name,
                photo_url: row.photo_url,
                job_title: row.job_title,
                verification_status: row.verification_status,
            },
            email: row.email,
            message: row.message,
            status: row.status,
            created_at: row.created_at,
        }
    }
}

/// Create verification request body
#[derive(Debug, Deserialize, Validate, utoipa::ToSchema)]
pub struct CreateVerificationBody {
    /// Why the account should be verified
    #[validate(length(min = 1, max = 2000))]
    pub message: String,
}

/// Admin decision body
#[derive(Debug, Default, Deserialize, utoipa::ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct AdminResponseBody {
    pub admin_response: Option<String>,
}

impl AdminResponseBody {
    /// The response with surrounding whitespace removed, if anything remains.
    #[must_use]
    pub fn response(&self) -> Option<&str> {
        self.admin_response
            .as_deref()
            .map(str::trim)
            .filter(|s| !s.is_empty())
    }
}

/// A user may open a request only without an open one and while unverified.
pub fn check_can_request(
    has_open_request: bool,
    status: VerificationStatus,
) -> Result<(), VerificationError> {
    if has_open_request {
        return Err(VerificationError::AlreadyRequested);
    }
    if status == VerificationStatus::Verified {
        return Err(VerificationError::AlreadyVerified);
    }
    Ok(())
}

/// Rejections must explain themselves.
pub fn require_admin_response(body: &AdminResponseBody) -> Result<&str, VerificationError> {
    body.response()
        .ok_or(VerificationError::AdminResponseRequired)
}

/// Only pending requests can be decided.
pub fn check_pending(status: VerificationRequestStatus) -> Result<(), VerificationError> {
    if status == VerificationRequestStatus::Pending {
        Ok(())
    } else {
        Err(VerificationError::NotPending)
    }
}

/// Users see their own requests; admins see everyone's.
#[must_use]
pub fn can_view(requester: Uuid, is_admin: bool, target: Uuid) -> bool {
    is_admin || requester == target
}

/// Error types for verification operations
#[derive(Debug, thiserror::Error)]
pub enum VerificationError {
    #[error("Database error: {0}")]
    Database(#[from] sqlx::Error),

    #[error("You already have a pending or approved verification request")]
    AlreadyRequested,

    #[error("Your account is already verified")]
    AlreadyVerified,

    #[error("Admin response is required for rejection")]
    AdminResponseRequired,

    #[error("Verification request not found")]
    NotFound,

    #[error("Verification request has already been processed")]
    NotPending,

    #[error("Unauthorized")]
    Unauthorized,

    #[error("Validation error: {0}")]
    Validation(String),
}

impl axum::response::IntoResponse for VerificationError {
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
            Self::AlreadyRequested => {
                (StatusCode::BAD_REQUEST, "ALREADY_REQUESTED", self.to_string())
            }
            Self::AlreadyVerified => (StatusCode::BAD_REQUEST, "ALREADY_VERIFIED", self.to_string()),
            Self::AdminResponseRequired => (
                StatusCode::BAD_REQUEST,
                "ADMIN_RESPONSE_REQUIRED",
                self.to_string(),
            ),
            Self::NotFound => (StatusCode::NOT_FOUND, "REQUEST_NOT_FOUND", self.to_string()),
            Self::NotPending => (StatusCode::BAD_REQUEST, "NOT_PENDING", self.to_string()),
            Self::Unauthorized => (StatusCode::UNAUTHORIZED, "UNAUTHORIZED", self.to_string()),
            Self::Validation(msg) => (StatusCode::BAD_REQUEST, "VALIDATION_ERROR", msg.clone()),
        };

        (status, Json(json!({ "error": code, "message": message }))).into_response()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_open_request_blocks_new_one() {
        for status in [
            VerificationStatus::Unverified,
            VerificationStatus::Pending,
            VerificationStatus::Rejected,
        ] {
            assert!(matches!(
                check_can_request(true, status),
                Err(VerificationError::AlreadyRequested)
            ));
        }
    }

    #[test]
    fn test_verified_user_cannot_request() {
        assert!(matches!(
            check_can_request(false, VerificationStatus::Verified),
            Err(VerificationError::AlreadyVerified)
        ));
        assert!(check_can_request(false, VerificationStatus::Unverified).is_ok());
        assert!(check_can_request(false, VerificationStatus::Rejected).is_ok());
    }

    #[test]
    fn test_rejection_needs_response() {
        let missing = AdminResponseBody::default();
        let blank = AdminResponseBody {
            admin_response: Some("  ".into()),
        };
        let given = AdminResponseBody {
            admin_response: Some(" blurry photo ".into()),
        };

        assert!(matches!(
            require_admin_response(&missing),
            Err(VerificationError::AdminResponseRequired)
        ));
        assert!(matches!(
            require_admin_response(&blank),
            Err(VerificationError::AdminResponseRequired)
        ));
        assert_eq!(require_admin_response(&given).unwrap(), "blurry photo");
    }

    #[test]
    fn test_only_pending_transitions() {
        assert!(check_pending(VerificationRequestStatus::Pending).is_ok());
        assert!(check_pending(VerificationRequestStatus::Approved).is_err());
        assert!(check_pending(VerificationRequestStatus::Rejected).is_err());
    }

    #[test]
    fn test_status_mirrors_onto_user() {
        assert_eq!(
            VerificationRequestStatus::Approved.user_status(),
            VerificationStatus::Verified
        );
        assert_eq!(
            VerificationRequestStatus::Rejected.user_status(),
            VerificationStatus::Rejected
        );
    }

    #[test]
    fn test_view_rules() {
        let (me, other) = (Uuid::now_v7(), Uuid::now_v7());
        assert!(can_view(me, false, me));
        assert!(!can_view(me, false, other));
        assert!(can_view(me, true, other));
    }
}
