//! Authentication HTTP Handlers

use axum::{extract::State, Json};
use serde::{Deserialize, Serialize};
use validator::Validate;

use super::error::{AuthError, AuthResult};
use super::jwt::generate_access_token;
use super::middleware::AuthUser;
use super::password::{hash_password, verify_password};
use crate::api::extract::ApiJson;
use crate::api::AppState;
use crate::db::{
    self, create_user, ensure_friendship, find_user_by_email, find_user_by_id,
    is_unique_violation, touch_last_active, UserProfile,
};

// ============================================================================
// Request/Response Types
// ============================================================================

/// Registration request.
#[derive(Debug, Deserialize, Validate, utoipa::ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct RegisterRequest {
    /// Full name (1-128 characters).
    #[validate(length(min = 1, max = 128))]
    pub full_name: String,
    /// Email address.
    #[validate(email)]
    pub email: String,
    /// Password (6-128 characters).
    #[validate(length(min = 6, max = 128))]
    pub password: String,
}

/// Login request.
#[derive(Debug, Deserialize, Validate, utoipa::ToSchema)]
pub struct LoginRequest {
    /// Email address.
    #[validate(email)]
    pub email: String,
    /// Password.
    #[validate(length(min = 1))]
    pub password: String,
}

/// Authentication response with token and account.
#[derive(Debug, Serialize, utoipa::ToSchema)]
pub struct AuthResponse {
    /// Bearer access token.
    pub token: String,
    /// The authenticated account.
    pub user: UserProfile,
}

// ============================================================================
// Handlers
// ============================================================================

/// Register a new account.
///
/// When an administrator is configured the new account is befriended with
/// it in the same transaction.
///
/// POST /api/auth/register
#[utoipa::path(
    post,
    path = "/api/auth/register",
    tag = "auth",
    request_body = RegisterRequest,
    responses(
        (status = 200, description = "Account created", body = AuthResponse),
        (status = 400, description = "Invalid input"),
        (status = 409, description = "Email already registered"),
    ),
)]
#[tracing::instrument(skip(state, body), fields(email = %body.email))]
pub async fn register(
    State(state): State<AppState>,
    ApiJson(body): ApiJson<RegisterRequest>,
) -> AuthResult<Json<AuthResponse>> {
    body.validate()
        .map_err(|e| AuthError::Validation(e.to_string()))?;

    let password_hash = hash_password(&body.password).map_err(|_| AuthError::PasswordHash)?;

    let mut tx = state.db.begin().await?;

    let user = create_user(&mut *tx, body.full_name.trim(), &body.email, &password_hash)
        .await
        .map_err(|e| {
            if is_unique_violation(&e) {
                AuthError::UserAlreadyExists
            } else {
                AuthError::Database(e)
            }
        })?;

    if let Some(admin_id) = state.config.admin_id {
        if db::user_exists(&mut *tx, admin_id).await? {
            ensure_friendship(&mut *tx, admin_id, user.id).await?;
        } else {
            tracing::warn!(%admin_id, "Configured ADMIN_ID does not exist, skipping admin friendship");
        }
    }

    tx.commit().await?;

    let token = generate_access_token(user.id, &state.config.jwt_secret, state.config.jwt_expiry)?;

    tracing::info!(user_id = %user.id, "User registered");

    Ok(Json(AuthResponse {
        token,
        user: user.into(),
    }))
}

/// Login with email/password.
///
/// POST /api/auth/login
#[utoipa::path(
    post,
    path = "/api/auth/login",
    tag = "auth",
    request_body = LoginRequest,
    responses(
        (status = 200, description = "Logged in", body = AuthResponse),
        (status = 401, description = "Invalid credentials or archived account"),
    ),
)]
#[tracing::instrument(skip(state, body), fields(email = %body.email))]
pub async fn login(
    State(state): State<AppState>,
    ApiJson(body): ApiJson<LoginRequest>,
) -> AuthResult<Json<AuthResponse>> {
    body.validate()
        .map_err(|e| AuthError::Validation(e.to_string()))?;

    let user = find_user_by_email(&state.db, &body.email)
        .await?
        .ok_or(AuthError::InvalidCredentials)?;

    let valid =
        verify_password(&body.password, &user.password_hash).map_err(|_| AuthError::PasswordHash)?;

    if !valid {
        return Err(AuthError::InvalidCredentials);
    }

    if user.archived {
        return Err(AuthError::AccountArchived);
    }

    let user = touch_last_active(&state.db, user.id)
        .await?
        .ok_or(AuthError::InvalidCredentials)?;

    let token = generate_access_token(user.id, &state.config.jwt_secret, state.config.jwt_expiry)?;

    tracing::info!(user_id = %user.id, "User logged in");

    Ok(Json(AuthResponse {
        token,
        user: user.into(),
    }))
}

/// Get the current user's account.
///
/// GET /api/auth/me
#[utoipa::path(
    get,
    path = "/api/auth/me",
    tag = "auth",
    responses(
        (status = 200, description = "Current account", body = UserProfile),
        (status = 401, description = "Not authenticated"),
    ),
    security(("bearer_auth" = [])),
)]
pub async fn me(State(state): State<AppState>, auth: AuthUser) -> AuthResult<Json<UserProfile>> {
    let user = find_user_by_id(&state.db, auth.id)
        .await?
        .ok_or(AuthError::UserNotFound)?;

    Ok(Json(user.into()))
}
