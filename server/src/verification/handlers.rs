use axum::{
    extract::State,
    Json,
};
use sqlx::PgPool;
use uuid::Uuid;
use validator::Validate;

use super::types::{
    can_view, check_can_request, check_pending, require_admin_response, AdminResponseBody,
    CreateVerificationBody, PendingRow, PendingVerificationRequest, VerificationError,
    VerificationRequest, VerificationRequestStatus,
};
use crate::api::extract::{ApiJson, ApiPath};
use crate::api::AppState;
use crate::auth::AuthUser;
use crate::db::{db_error, find_user_for_update, is_unique_violation, set_verification_status};

const REQUEST_COLUMNS: &str =
    "id, user_id, message, status, admin_response, created_at, updated_at";

/// POST /api/verification/request
/// Ask an administrator to verify the caller's account
#[utoipa::path(
    post,
    path = "/api/verification/request",
    tag = "verification",
    request_body = CreateVerificationBody,
    responses(
        (status = 200, description = "Request created", body = VerificationRequest),
        (status = 400, description = "Open request exists or already verified"),
    ),
    security(("bearer_auth" = [])),
)]
#[tracing::instrument(skip(state, auth, body), fields(user_id = %auth.id))]
pub async fn create_request(
    State(state): State<AppState>,
    auth: AuthUser,
    ApiJson(body): ApiJson<CreateVerificationBody>,
) -> Result<Json<VerificationRequest>, VerificationError> {
    body.validate()
        .map_err(|e| VerificationError::Validation(e.to_string()))?;

    let message = body.message.trim();
    if message.is_empty() {
        return Err(VerificationError::Validation("message: must not be blank".to_string()));
    }

    let mut tx = state.db.begin().await?;

    // Lock the user row so concurrent requests serialize here
    let user = find_user_for_update(&mut *tx, auth.id)
        .await?
        .ok_or(VerificationError::Unauthorized)?;

    let has_open: bool = sqlx::query_scalar(
        r"SELECT EXISTS(
            SELECT 1 FROM verification_requests
            WHERE user_id = $1 AND status IN ('pending', 'approved'))",
    )
    .bind(auth.id)
    .fetch_one(&mut *tx)
    .await?;

    check_can_request(has_open, user.verification_status)?;

    let sql = format!(
        r"INSERT INTO verification_requests (id, user_id, message)
           VALUES ($1, $2, $3)
           RETURNING {REQUEST_COLUMNS}"
    );
    let request = sqlx::query_as::<_, VerificationRequest>(&sql)
        .bind(Uuid::now_v7())
        .bind(auth.id)
        .bind(message)
        .fetch_one(&mut *tx)
        .await
        .map_err(|e| {
            if is_unique_violation(&e) {
                VerificationError::AlreadyRequested
            } else {
                VerificationError::Database(e)
            }
        })?;

    set_verification_status(&mut *tx, auth.id, VerificationRequestStatus::Pending.user_status())
        .await?;

    tx.commit().await?;

    tracing::info!(request_id = %request.id, "Verification requested");

    Ok(Json(request))
}

/// GET /api/verification/requests
/// All pending requests, newest first (admin only)
#[utoipa::path(
    get,
    path = "/api/verification/requests",
    tag = "verification",
    responses((status = 200, description = "Pending requests", body = Vec<PendingVerificationRequest>)),
    security(("bearer_auth" = [])),
)]
pub async fn list_pending(
    State(state): State<AppState>,
) -> Result<Json<Vec<PendingVerificationRequest>>, VerificationError> {
    let rows = sqlx::query_as::<_, PendingRow>(
        r"SELECT
            r.id, r.message, r.status, r.created_at,
            u.id AS user_id, u.full_name, u.email, u.photo_url, u.job_title, u.verification_status
           FROM verification_requests r
           JOIN users u ON u.id = r.user_id
           WHERE r.status = 'pending'
           ORDER BY r.created_at DESC",
    )
    .fetch_all(&state.db)
    .await
    .map_err(db_error!("list_pending_verifications"))?;

    Ok(Json(rows.into_iter().map(Into::into).collect()))
}

/// GET /api/verification/user/{user_id}
/// A user's verification history, newest first
#[utoipa::path(
    get,
    path = "/api/verification/user/{user_id}",
    tag = "verification",
    params(("user_id" = Uuid, Path, description = "User ID")),
    responses(
        (status = 200, description = "Requests", body = Vec<VerificationRequest>),
        (status = 401, description = "Neither the user nor an admin"),
    ),
    security(("bearer_auth" = [])),
)]
pub async fn list_for_user(
    State(state): State<AppState>,
    auth: AuthUser,
    ApiPath(user_id): ApiPath<Uuid>,
) -> Result<Json<Vec<VerificationRequest>>, VerificationError> {
    if !can_view(auth.id, auth.is_admin, user_id) {
        return Err(VerificationError::Unauthorized);
    }

    let sql = format!(
        r"SELECT {REQUEST_COLUMNS}
           FROM verification_requests
           WHERE user_id = $1
           ORDER BY created_at DESC"
    );
    let requests = sqlx::query_as::<_, VerificationRequest>(&sql)
        .bind(user_id)
        .fetch_all(&state.db)
        .await
        .map_err(db_error!("list_user_verifications", user_id = %user_id))?;

    Ok(Json(requests))
}

/// PUT /api/verification/approve/{id}
/// Approve a pending request and mark the user verified (admin only)
#[utoipa::path(
    put,
    path = "/api/verification/approve/{id}",
    tag = "verification",
    params(("id" = Uuid, Path, description = "Verification request ID")),
    request_body(content = AdminResponseBody, description = "Optional note for the user"),
    responses(
        (status = 200, description = "Approved", body = VerificationRequest),
        (status = 400, description = "Request is not pending"),
        (status = 404, description = "Request not found"),
    ),
    security(("bearer_auth" = [])),
)]
#[tracing::instrument(skip(state, auth, body), fields(admin_id = %auth.id))]
pub async fn approve_request(
    State(state): State<AppState>,
    auth: AuthUser,
    ApiPath(request_id): ApiPath<Uuid>,
    body: Option<ApiJson<AdminResponseBody>>,
) -> Result<Json<VerificationRequest>, VerificationError> {
    let body = body.map(|ApiJson(b)| b).unwrap_or_default();

    decide(
        &state.db,
        request_id,
        VerificationRequestStatus::Approved,
        body.response(),
    )
    .await
    .map(Json)
}

/// PUT /api/verification/reject/{id}
/// Reject a pending request; an explanation is mandatory (admin only)
#[utoipa::path(
    put,
    path = "/api/verification/reject/{id}",
    tag = "verification",
    params(("id" = Uuid, Path, description = "Verification request ID")),
    request_body = AdminResponseBody,
    responses(
        (status = 200, description = "Rejected", body = VerificationRequest),
        (status = 400, description = "Missing response or request is not pending"),
        (status = 404, description = "Request not found"),
    ),
    security(("bearer_auth" = [])),
)]
#[tracing::instrument(skip(state, auth, body), fields(admin_id = %auth.id))]
pub async fn reject_request(
    State(state): State<AppState>,
    auth: AuthUser,
    ApiPath(request_id): ApiPath<Uuid>,
    body: Option<ApiJson<AdminResponseBody>>,
) -> Result<Json<VerificationRequest>, VerificationError> {
    let body = body.map(|ApiJson(b)| b).unwrap_or_default();
    let response = require_admin_response(&body)?;

    decide(
        &state.db,
        request_id,
        VerificationRequestStatus::Rejected,
        Some(response),
    )
    .await
    .map(Json)
}

/// Move a pending request to `outcome` and mirror it onto the user, atomically.
async fn decide(
    pool: &PgPool,
    request_id: Uuid,
    outcome: VerificationRequestStatus,
    admin_response: Option<&str>,
) -> Result<VerificationRequest, VerificationError> {
    let mut tx = pool.begin().await?;

    let sql = format!("SELECT {REQUEST_COLUMNS} FROM verification_requests WHERE id = $1 FOR UPDATE");
    let current = sqlx::query_as::<_, VerificationRequest>(&sql)
        .bind(request_id)
        .fetch_optional(&mut *tx)
        .await?
        .ok_or(VerificationError::NotFound)?;

    check_pending(current.status)?;

    let sql = format!(
        r"UPDATE verification_requests
           SET status = $2,
               admin_response = COALESCE($3, admin_response),
               updated_at = NOW()
           WHERE id = $1
           RETURNING {REQUEST_COLUMNS}"
    );
    let updated = sqlx::query_as::<_, VerificationRequest>(&sql)
        .bind(request_id)
        .bind(outcome)
        .bind(admin_response)
        .fetch_one(&mut *tx)
        .await
        .map_err(db_error!("decide_verification", request_id = %request_id, outcome = ?outcome))?;

    set_verification_status(&mut *tx, updated.user_id, outcome.user_status()).await?;

    tx.commit().await?;

    tracing::info!(%request_id, user_id = %updated.user_id, ?outcome, "Verification request decided");

    Ok(updated)
}
