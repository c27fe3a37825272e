//! Notification writers used by the other feature modules.
//!
//! `notify` takes any executor so callers can write the notification inside
//! the same transaction as the change that triggered it.

use sqlx::{PgExecutor, PgPool};
use uuid::Uuid;

use super::types::NotificationKind;
use crate::db::{db_error, friend_ids};

/// Record a notification for `to`. Users are never notified about their own
/// actions; returns the new notification ID, or `None` when skipped.
pub async fn notify<'e, E>(
    executor: E,
    to: Uuid,
    from: Uuid,
    kind: NotificationKind,
    reference: Uuid,
) -> sqlx::Result<Option<Uuid>>
where
    E: PgExecutor<'e>,
{
    if to == from {
        return Ok(None);
    }

    let id = Uuid::now_v7();
    sqlx::query(
        r"INSERT INTO notifications (id, to_user_id, from_user_id, kind, reference_id)
           VALUES ($1, $2, $3, $4, $5)",
    )
    .bind(id)
    .bind(to)
    .bind(from)
    .bind(kind)
    .bind(reference)
    .execute(executor)
    .await
    .map_err(db_error!("notify", to = %to, from = %from, kind = ?kind))?;

    Ok(Some(id))
}

/// Notify every friend of `from`. Returns the number of notifications written.
pub async fn notify_friends(
    pool: &PgPool,
    from: Uuid,
    kind: NotificationKind,
    reference: Uuid,
) -> sqlx::Result<u64> {
    let recipients = friend_ids(pool, from).await?;
    if recipients.is_empty() {
        return Ok(0);
    }

    let ids: Vec<Uuid> = recipients.iter().map(|_| Uuid::now_v7()).collect();

    let result = sqlx::query(
        r"INSERT INTO notifications (id, to_user_id, from_user_id, kind, reference_id)
           SELECT t.id, t.to_id, $3, $4, $5
           FROM UNNEST($1::uuid[], $2::uuid[]) AS t(id, to_id)",
    )
    .bind(&ids)
    .bind(&recipients)
    .bind(from)
    .bind(kind)
    .bind(reference)
    .execute(pool)
    .await
    .map_err(db_error!("notify_friends", from = %from, kind = ?kind))?;

    Ok(result.rows_affected())
}
