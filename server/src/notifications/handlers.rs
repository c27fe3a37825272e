use axum::{
    extract::State,
    Json,
};
use uuid::Uuid;

use super::types::{Notification, NotificationError, NotificationPage, NotificationRow};
use crate::api::extract::{ApiPath, ApiQuery};
use crate::api::pagination::{PageQuery, Paginated};
use crate::api::AppState;
use crate::auth::AuthUser;
use crate::db::db_error;

/// GET /api/notifications
/// List the caller's notifications, newest first
#[utoipa::path(
    get,
    path = "/api/notifications",
    tag = "notifications",
    params(PageQuery),
    responses(
        (status = 200, description = "A page of notifications", body = NotificationPage),
    ),
    security(("bearer_auth" = [])),
)]
#[tracing::instrument(skip(state, auth), fields(user_id = %auth.id))]
pub async fn list_notifications(
    State(state): State<AppState>,
    auth: AuthUser,
    ApiQuery(query): ApiQuery<PageQuery>,
) -> Result<Json<NotificationPage>, NotificationError> {
    let page = query.resolve();

    let rows = sqlx::query_as::<_, NotificationRow>(
        r"SELECT
            n.id, n.kind, n.reference_id, n.seen, n.created_at,
            f.id AS from_id, f.full_name AS from_full_name, f.photo_url AS from_photo_url,
            f.job_title AS from_job_title, f.verification_status AS from_verification_status,
            t.id AS to_id, t.full_name AS to_full_name, t.photo_url AS to_photo_url,
            t.job_title AS to_job_title, t.verification_status AS to_verification_status
           FROM notifications n
           JOIN users f ON f.id = n.from_user_id
           JOIN users t ON t.id = n.to_user_id
           WHERE n.to_user_id = $1
           ORDER BY n.created_at DESC, n.id DESC
           LIMIT $2 OFFSET $3",
    )
    .bind(auth.id)
    .bind(page.limit)
    .bind(page.offset())
    .fetch_all(&state.db)
    .await
    .map_err(db_error!("list_notifications", user_id = %auth.id))?;

    let (total, total_unseen): (i64, i64) = sqlx::query_as(
        r"SELECT COUNT(*), COUNT(*) FILTER (WHERE NOT seen)
           FROM notifications
           WHERE to_user_id = $1",
    )
    .bind(auth.id)
    .fetch_one(&state.db)
    .await
    .map_err(db_error!("count_notifications", user_id = %auth.id))?;

    let results: Vec<Notification> = rows.into_iter().map(Notification::from).collect();

    Ok(Json(NotificationPage {
        page: Paginated::new(results, page, total),
        total_unseen,
    }))
}

/// PUT /api/notifications/{id}/seen
/// Mark one of the caller's notifications as seen
///
/// Unknown IDs and other users' notifications are ignored.
#[utoipa::path(
    put,
    path = "/api/notifications/{id}/seen",
    tag = "notifications",
    params(("id" = Uuid, Path, description = "Notification ID")),
    responses((status = 200, description = "Marked as seen")),
    security(("bearer_auth" = [])),
)]
#[tracing::instrument(skip(state, auth), fields(user_id = %auth.id))]
pub async fn mark_seen(
    State(state): State<AppState>,
    auth: AuthUser,
    ApiPath(id): ApiPath<Uuid>,
) -> Result<Json<()>, NotificationError> {
    let result = sqlx::query("UPDATE notifications SET seen = TRUE WHERE id = $1 AND to_user_id = $2")
        .bind(id)
        .bind(auth.id)
        .execute(&state.db)
        .await
        .map_err(db_error!("mark_seen", notification_id = %id))?;

    if result.rows_affected() == 0 {
        tracing::debug!(notification_id = %id, "No notification to mark as seen");
    }

    Ok(Json(()))
}
