//! Database Queries
//!
//! Runtime queries (no compile-time `DATABASE_URL` required).
//!
//! User queries shared by the auth gate and the feature modules. Functions
//! that may run inside a transaction take any `PgExecutor`.

use sqlx::{PgExecutor, PgPool};
use uuid::Uuid;

use super::db_error;
use super::models::{User, VerificationStatus};

// ============================================================================
// Error Helpers
// ============================================================================

/// `PostgreSQL` SQLSTATE for `unique_violation`.
const UNIQUE_VIOLATION: &str = "23505";

/// Whether a query failed on a unique constraint or unique index.
#[must_use]
pub fn is_unique_violation(err: &sqlx::Error) -> bool {
    match err {
        sqlx::Error::Database(db_err) => db_err.code().as_deref() == Some(UNIQUE_VIOLATION),
        _ => false,
    }
}

// ============================================================================
// User Queries
// ============================================================================

/// Find user by ID.
pub async fn find_user_by_id<'e, E>(executor: E, id: Uuid) -> sqlx::Result<Option<User>>
where
    E: PgExecutor<'e>,
{
    sqlx::query_as::<_, User>("SELECT * FROM users WHERE id = $1")
        .bind(id)
        .fetch_optional(executor)
        .await
        .map_err(db_error!("find_user_by_id", user_id = %id))
}

/// Find user by ID and lock the row for the rest of the transaction.
pub async fn find_user_for_update<'e, E>(executor: E, id: Uuid) -> sqlx::Result<Option<User>>
where
    E: PgExecutor<'e>,
{
    sqlx::query_as::<_, User>("SELECT * FROM users WHERE id = $1 FOR UPDATE")
        .bind(id)
        .fetch_optional(executor)
        .await
        .map_err(db_error!("find_user_for_update", user_id = %id))
}

/// Find user by email (case-insensitive).
pub async fn find_user_by_email(pool: &PgPool, email: &str) -> sqlx::Result<Option<User>> {
    sqlx::query_as::<_, User>("SELECT * FROM users WHERE lower(email) = lower($1)")
        .bind(email)
        .fetch_optional(pool)
        .await
        .map_err(db_error!("find_user_by_email", email = %email))
}

/// Check whether a user exists.
pub async fn user_exists<'e, E>(executor: E, id: Uuid) -> sqlx::Result<bool>
where
    E: PgExecutor<'e>,
{
    let result: (bool,) = sqlx::query_as("SELECT EXISTS(SELECT 1 FROM users WHERE id = $1)")
        .bind(id)
        .fetch_one(executor)
        .await
        .map_err(db_error!("user_exists", user_id = %id))?;

    Ok(result.0)
}

/// Create a new user. The email is stored lowercased.
pub async fn create_user<'e, E>(
    executor: E,
    full_name: &str,
    email: &str,
    password_hash: &str,
) -> sqlx::Result<User>
where
    E: PgExecutor<'e>,
{
    sqlx::query_as::<_, User>(
        r"
        INSERT INTO users (id, full_name, email, password_hash)
        VALUES ($1, $2, lower($3), $4)
        RETURNING *
        ",
    )
    .bind(Uuid::now_v7())
    .bind(full_name)
    .bind(email)
    .bind(password_hash)
    .fetch_one(executor)
    .await
}

/// Record activity for a user and return the refreshed row.
pub async fn touch_last_active(pool: &PgPool, user_id: Uuid) -> sqlx::Result<Option<User>> {
    sqlx::query_as::<_, User>(
        "UPDATE users SET last_active = NOW(), is_active = TRUE WHERE id = $1 RETURNING *",
    )
    .bind(user_id)
    .fetch_optional(pool)
    .await
    .map_err(db_error!("touch_last_active", user_id = %user_id))
}

/// Set or clear the archived flag. Returns `None` if the user does not exist.
pub async fn set_user_archived(
    pool: &PgPool,
    user_id: Uuid,
    archived: bool,
) -> sqlx::Result<Option<User>> {
    sqlx::query_as::<_, User>(
        "UPDATE users SET archived = $1, updated_at = NOW() WHERE id = $2 RETURNING *",
    )
    .bind(archived)
    .bind(user_id)
    .fetch_optional(pool)
    .await
    .map_err(db_error!("set_user_archived", user_id = %user_id, archived = archived))
}

/// Mirror a verification outcome onto the user record.
pub async fn set_verification_status<'e, E>(
    executor: E,
    user_id: Uuid,
    status: VerificationStatus,
) -> sqlx::Result<()>
where
    E: PgExecutor<'e>,
{
    sqlx::query("UPDATE users SET verification_status = $1, updated_at = NOW() WHERE id = $2")
        .bind(status)
        .bind(user_id)
        .execute(executor)
        .await
        .map_err(db_error!("set_verification_status", user_id = %user_id, status = ?status))?;

    Ok(())
}

// ============================================================================
// Friendship Queries
// ============================================================================

/// Create a friendship between two users unless one already exists.
///
/// Used at registration to connect new accounts with the administrator.
/// Returns `true` if a row was inserted.
pub async fn ensure_friendship<'e, E>(executor: E, first: Uuid, second: Uuid) -> sqlx::Result<bool>
where
    E: PgExecutor<'e>,
{
    let result = sqlx::query(
        r"
        INSERT INTO friendships (id, first_user_id, second_user_id)
        VALUES ($1, $2, $3)
        ON CONFLICT DO NOTHING
        ",
    )
    .bind(Uuid::now_v7())
    .bind(first)
    .bind(second)
    .execute(executor)
    .await
    .map_err(db_error!("ensure_friendship", first = %first, second = %second))?;

    Ok(result.rows_affected() > 0)
}

/// IDs of every user befriended with `user_id`.
pub async fn friend_ids<'e, E>(executor: E, user_id: Uuid) -> sqlx::Result<Vec<Uuid>>
where
    E: PgExecutor<'e>,
{
    sqlx::query_scalar::<_, Uuid>(
        r"
        SELECT CASE WHEN first_user_id = $1 THEN second_user_id ELSE first_user_id END
        FROM friendships
        WHERE first_user_id = $1 OR second_user_id = $1
        ",
    )
    .bind(user_id)
    .fetch_all(executor)
    .await
    .map_err(db_error!("friend_ids", user_id = %user_id))
}
