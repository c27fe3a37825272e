use axum::{
    extract::State,
    Json,
};
use uuid::Uuid;

use super::types::{
    check_distinct, check_not_admin, Friend, FriendRequest, FriendRequestRow, FriendRequestView,
    FriendRequestViewRow, Friendship, FriendshipRow, MessageResponse, SendFriendRequestBody,
    SocialError,
};
use crate::api::extract::{ApiJson, ApiPath};
use crate::api::AppState;
use crate::auth::AuthUser;
use crate::db::{db_error, is_unique_violation, user_exists};
use crate::notifications::{notify, NotificationKind};

/// POST /api/friends/requests
/// Send a friend request to another user
#[utoipa::path(
    post,
    path = "/api/friends/requests",
    tag = "friends",
    request_body = SendFriendRequestBody,
    responses(
        (status = 200, description = "Request sent", body = FriendRequest),
        (status = 400, description = "Same user, duplicate request or already friends"),
        (status = 404, description = "Target user not found"),
    ),
    security(("bearer_auth" = [])),
)]
#[tracing::instrument(skip(state, auth, body), fields(from = %auth.id, to = %body.to))]
pub async fn send_friend_request(
    State(state): State<AppState>,
    auth: AuthUser,
    ApiJson(body): ApiJson<SendFriendRequestBody>,
) -> Result<Json<FriendRequest>, SocialError> {
    check_distinct(auth.id, body.to)?;

    let mut tx = state.db.begin().await?;

    if !user_exists(&mut *tx, body.to).await? {
        return Err(SocialError::UserNotFound);
    }

    // Pending request in either direction
    let pending: bool = sqlx::query_scalar(
        r"SELECT EXISTS(
            SELECT 1 FROM friend_requests
            WHERE (from_user_id = $1 AND to_user_id = $2)
               OR (from_user_id = $2 AND to_user_id = $1))",
    )
    .bind(auth.id)
    .bind(body.to)
    .fetch_one(&mut *tx)
    .await?;

    if pending {
        return Err(SocialError::RequestAlreadySent);
    }

    if are_friends(&mut tx, auth.id, body.to).await? {
        return Err(SocialError::AlreadyFriends);
    }

    let request = sqlx::query_as::<_, FriendRequestRow>(
        r"INSERT INTO friend_requests (id, from_user_id, to_user_id)
           VALUES ($1, $2, $3)
           RETURNING id, from_user_id, to_user_id, created_at",
    )
    .bind(Uuid::now_v7())
    .bind(auth.id)
    .bind(body.to)
    .fetch_one(&mut *tx)
    .await
    .map_err(|e| {
        if is_unique_violation(&e) {
            SocialError::RequestAlreadySent
        } else {
            SocialError::Database(e)
        }
    })?;

    notify(
        &mut *tx,
        request.to_user_id,
        request.from_user_id,
        NotificationKind::FriendRequest,
        request.id,
    )
    .await?;

    tx.commit().await?;

    tracing::info!(request_id = %request.id, "Friend request sent");

    Ok(Json(request.into()))
}

/// DELETE /api/friends/requests/{id}
/// Cancel (sender) or reject (recipient) a friend request
#[utoipa::path(
    delete,
    path = "/api/friends/requests/{id}",
    tag = "friends",
    params(("id" = Uuid, Path, description = "Friend request ID")),
    responses(
        (status = 200, description = "Request deleted", body = MessageResponse),
        (status = 401, description = "Caller is not a party to the request"),
        (status = 404, description = "Request not found"),
    ),
    security(("bearer_auth" = [])),
)]
#[tracing::instrument(skip(state, auth), fields(user_id = %auth.id))]
pub async fn delete_friend_request(
    State(state): State<AppState>,
    auth: AuthUser,
    ApiPath(request_id): ApiPath<Uuid>,
) -> Result<Json<MessageResponse>, SocialError> {
    let request = find_request(&state.db, request_id)
        .await?
        .ok_or(SocialError::RequestNotFound)?;

    if !request.is_participant(auth.id) {
        return Err(SocialError::Unauthorized);
    }

    sqlx::query("DELETE FROM friend_requests WHERE id = $1")
        .bind(request_id)
        .execute(&state.db)
        .await
        .map_err(db_error!("delete_friend_request", request_id = %request_id))?;

    tracing::info!(%request_id, "Friend request deleted");

    Ok(Json(MessageResponse::new("Request deleted successfully")))
}

/// PUT /api/friends/requests/{id}/accept
/// Accept a friend request
///
/// Creates the friendship, notifies the sender and removes the request in a
/// single transaction with the request row locked.
#[utoipa::path(
    put,
    path = "/api/friends/requests/{id}/accept",
    tag = "friends",
    params(("id" = Uuid, Path, description = "Friend request ID")),
    responses(
        (status = 200, description = "Friendship created", body = Friendship),
        (status = 401, description = "Caller is not the recipient"),
        (status = 404, description = "Request not found"),
    ),
    security(("bearer_auth" = [])),
)]
#[tracing::instrument(skip(state, auth), fields(user_id = %auth.id))]
pub async fn accept_friend_request(
    State(state): State<AppState>,
    auth: AuthUser,
    ApiPath(request_id): ApiPath<Uuid>,
) -> Result<Json<Friendship>, SocialError> {
    let mut tx = state.db.begin().await?;

    let request = sqlx::query_as::<_, FriendRequestRow>(
        r"SELECT id, from_user_id, to_user_id, created_at
           FROM friend_requests
           WHERE id = $1
           FOR UPDATE",
    )
    .bind(request_id)
    .fetch_optional(&mut *tx)
    .await?
    .ok_or(SocialError::RequestNotFound)?;

    // Only the recipient can accept
    if !request.is_recipient(auth.id) {
        return Err(SocialError::Unauthorized);
    }

    let friendship = sqlx::query_as::<_, FriendshipRow>(
        r"INSERT INTO friendships (id, first_user_id, second_user_id)
           VALUES ($1, $2, $3)
           RETURNING id, first_user_id, second_user_id, created_at",
    )
    .bind(Uuid::now_v7())
    .bind(request.from_user_id)
    .bind(request.to_user_id)
    .fetch_one(&mut *tx)
    .await
    .map_err(|e| {
        if is_unique_violation(&e) {
            SocialError::AlreadyFriends
        } else {
            SocialError::Database(e)
        }
    })?;

    notify(
        &mut *tx,
        request.from_user_id,
        request.to_user_id,
        NotificationKind::FriendRequestAccepted,
        friendship.id,
    )
    .await?;

    sqlx::query("DELETE FROM friend_requests WHERE id = $1")
        .bind(request.id)
        .execute(&mut *tx)
        .await?;

    tx.commit().await?;

    tracing::info!(%request_id, friendship_id = %friendship.id, "Friend request accepted");

    Ok(Json(friendship.into()))
}

/// DELETE /api/friends/{user_id}
/// Remove a friend
#[utoipa::path(
    delete,
    path = "/api/friends/{user_id}",
    tag = "friends",
    params(("user_id" = Uuid, Path, description = "The friend to remove")),
    responses(
        (status = 200, description = "Friend removed", body = MessageResponse),
        (status = 400, description = "Friendship with the administrator"),
        (status = 404, description = "Not friends"),
    ),
    security(("bearer_auth" = [])),
)]
#[tracing::instrument(skip(state, auth), fields(user_id = %auth.id))]
pub async fn remove_friend(
    State(state): State<AppState>,
    auth: AuthUser,
    ApiPath(other_id): ApiPath<Uuid>,
) -> Result<Json<MessageResponse>, SocialError> {
    check_not_admin(state.config.admin_id, auth.id, other_id)?;

    let result = sqlx::query(
        r"DELETE FROM friendships
           WHERE (first_user_id = $1 AND second_user_id = $2)
              OR (first_user_id = $2 AND second_user_id = $1)",
    )
    .bind(auth.id)
    .bind(other_id)
    .execute(&state.db)
    .await
    .map_err(db_error!("remove_friend", user_id = %auth.id, other_id = %other_id))?;

    if result.rows_affected() == 0 {
        return Err(SocialError::FriendshipNotFound);
    }

    tracing::info!(%other_id, "Friend removed");

    Ok(Json(MessageResponse::new("Friend deleted successfully")))
}

/// GET /api/friends/{user_id}
/// List a user's friends
#[utoipa::path(
    get,
    path = "/api/friends/{user_id}",
    tag = "friends",
    params(("user_id" = Uuid, Path, description = "User whose friends to list")),
    responses(
        (status = 200, description = "Friends", body = Vec<Friend>),
        (status = 404, description = "User not found"),
    ),
    security(("bearer_auth" = [])),
)]
pub async fn list_friends(
    State(state): State<AppState>,
    ApiPath(user_id): ApiPath<Uuid>,
) -> Result<Json<Vec<Friend>>, SocialError> {
    if !user_exists(&state.db, user_id).await? {
        return Err(SocialError::UserNotFound);
    }

    let friends = sqlx::query_as::<_, Friend>(
        r"SELECT
            u.id, u.full_name, u.photo_url, u.job_title, u.verification_status,
            f.id AS friendship_id,
            f.created_at AS since
           FROM friendships f
           JOIN users u ON u.id = CASE
               WHEN f.first_user_id = $1 THEN f.second_user_id
               ELSE f.first_user_id
           END
           WHERE f.first_user_id = $1 OR f.second_user_id = $1
           ORDER BY u.full_name ASC",
    )
    .bind(user_id)
    .fetch_all(&state.db)
    .await
    .map_err(db_error!("list_friends", user_id = %user_id))?;

    Ok(Json(friends))
}

/// GET /api/friends/requests/sent
/// List friend requests the caller has sent
#[utoipa::path(
    get,
    path = "/api/friends/requests/sent",
    tag = "friends",
    responses((status = 200, description = "Sent requests", body = Vec<FriendRequestView>)),
    security(("bearer_auth" = [])),
)]
pub async fn list_sent_requests(
    State(state): State<AppState>,
    auth: AuthUser,
) -> Result<Json<Vec<FriendRequestView>>, SocialError> {
    let rows = sqlx::query_as::<_, FriendRequestViewRow>(
        r"SELECT
            r.id, r.from_user_id, r.to_user_id, r.created_at,
            u.id AS user_id, u.full_name, u.photo_url, u.job_title, u.verification_status
           FROM friend_requests r
           JOIN users u ON u.id = r.to_user_id
           WHERE r.from_user_id = $1
           ORDER BY r.created_at DESC",
    )
    .bind(auth.id)
    .fetch_all(&state.db)
    .await
    .map_err(db_error!("list_sent_requests", user_id = %auth.id))?;

    Ok(Json(rows.into_iter().map(Into::into).collect()))
}

/// GET /api/friends/requests/received
/// List friend requests awaiting the caller's decision
#[utoipa::path(
    get,
    path = "/api/friends/requests/received",
    tag = "friends",
    responses((status = 200, description = "Received requests", body = Vec<FriendRequestView>)),
    security(("bearer_auth" = [])),
)]
pub async fn list_received_requests(
    State(state): State<AppState>,
    auth: AuthUser,
) -> Result<Json<Vec<FriendRequestView>>, SocialError> {
    let rows = sqlx::query_as::<_, FriendRequestViewRow>(
        r"SELECT
            r.id, r.from_user_id, r.to_user_id, r.created_at,
            u.id AS user_id, u.full_name, u.photo_url, u.job_title, u.verification_status
           FROM friend_requests r
           JOIN users u ON u.id = r.from_user_id
           WHERE r.to_user_id = $1
           ORDER BY r.created_at DESC",
    )
    .bind(auth.id)
    .fetch_all(&state.db)
    .await
    .map_err(db_error!("list_received_requests", user_id = %auth.id))?;

    Ok(Json(rows.into_iter().map(Into::into).collect()))
}

async fn find_request(
    pool: &sqlx::PgPool,
    request_id: Uuid,
) -> sqlx::Result<Option<FriendRequestRow>> {
    sqlx::query_as::<_, FriendRequestRow>(
        "SELECT id, from_user_id, to_user_id, created_at FROM friend_requests WHERE id = $1",
    )
    .bind(request_id)
    .fetch_optional(pool)
    .await
    .map_err(db_error!("find_friend_request", request_id = %request_id))
}

async fn are_friends(
    tx: &mut sqlx::Transaction<'_, sqlx::Postgres>,
    a: Uuid,
    b: Uuid,
) -> sqlx::Result<bool> {
    sqlx::query_scalar(
        r"SELECT EXISTS(
            SELECT 1 FROM friendships
            WHERE (first_user_id = $1 AND second_user_id = $2)
               OR (first_user_id = $2 AND second_user_id = $1))",
    )
    .bind(a)
    .bind(b)
    .fetch_one(&mut **tx)
    .await
}
