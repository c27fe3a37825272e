//! Database Models

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use uuid::Uuid;

/// User model.
#[derive(Debug, Clone, FromRow)]
pub struct User {
    pub id: Uuid,
    pub full_name: String,
    pub email: String,
    pub password_hash: String,
    pub photo_url: Option<String>,
    pub job_title: String,
    pub is_active: bool,
    pub is_admin: bool,
    pub archived: bool,
    pub verification_status: VerificationStatus,
    pub last_active: DateTime<Utc>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// Per-user identity verification classification.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, sqlx::Type, utoipa::ToSchema,
)]
#[sqlx(type_name = "verification_status", rename_all = "lowercase")]
#[serde(rename_all = "lowercase")]
pub enum VerificationStatus {
    Unverified,
    Pending,
    Verified,
    Rejected,
}

/// Full account view returned to the account owner and to admins.
///
/// Never carries the password hash.
#[derive(Debug, Clone, Serialize, utoipa::ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct UserProfile {
    pub id: Uuid,
    pub full_name: String,
    pub email: String,
    pub photo_url: Option<String>,
    pub job_title: String,
    pub is_active: bool,
    pub is_admin: bool,
    pub archived: bool,
    pub verification_status: VerificationStatus,
    pub last_active: DateTime<Utc>,
    pub created_at: DateTime<Utc>,
}

impl From<User> for UserProfile {
    fn from(user: User) -> Self {
        Self {
            id: user.id,
            full_name: user.full_name,
            email: user.email,
            photo_url: user.photo_url,
            job_title: user.job_title,
            is_active: user.is_active,
            is_admin: user.is_admin,
            archived: user.archived,
            verification_status: user.verification_status,
            last_active: user.last_active,
            created_at: user.created_at,
        }
    }
}

/// Public user information embedded in friends, requests, posts and
/// notifications.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, utoipa::ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct UserSummary {
    pub id: Uuid,
    pub full_name: String,
    pub photo_url: Option<String>,
    pub job_title: String,
    pub verification_status: VerificationStatus,
}

impl From<&User> for UserSummary {
    fn from(user: &User) -> Self {
        Self {
            id: user.id,
            full_name: user.full_name.clone(),
            photo_url: user.photo_url.clone(),
            job_title: user.job_title.clone(),
            verification_status: user.verification_status,
        }
    }
}
