use axum::{
    extract::State,
    Json,
};
use sqlx::PgPool;
use uuid::Uuid;
use validator::Validate;

use super::types::{
    CreatePostRequest, ListPostsQuery, Post, PostAccess, PostError, PostRow, UpdatePostRequest,
};
use crate::api::extract::{ApiJson, ApiPath, ApiQuery};
use crate::api::pagination::{PageQuery, Paginated};
use crate::api::AppState;
use crate::auth::AuthUser;
use crate::db::{db_error, friend_ids};
use crate::notifications::{notify, notify_friends, NotificationKind};

/// Columns of a post joined with its author (`u`) and likes.
const POST_COLUMNS: &str = r"
    p.id, p.user_id, p.description, p.photo_url, p.archived, p.created_at, p.updated_at,
    u.full_name AS author_full_name, u.photo_url AS author_photo_url,
    u.job_title AS author_job_title, u.verification_status AS author_verification_status,
    ARRAY(SELECT l.user_id FROM post_likes l WHERE l.post_id = p.id ORDER BY l.created_at) AS likes";

/// POST /api/posts
/// Publish a post and tell the author's friends about it
#[utoipa::path(
    post,
    path = "/api/posts",
    tag = "posts",
    request_body = CreatePostRequest,
    responses(
        (status = 200, description = "Post created", body = Post),
        (status = 400, description = "Invalid input"),
    ),
    security(("bearer_auth" = [])),
)]
#[tracing::instrument(skip(state, auth, body), fields(user_id = %auth.id))]
pub async fn create_post(
    State(state): State<AppState>,
    auth: AuthUser,
    ApiJson(body): ApiJson<CreatePostRequest>,
) -> Result<Json<Post>, PostError> {
    body.validate()
        .map_err(|e| PostError::Validation(e.to_string()))?;

    if body.is_empty() {
        return Err(PostError::Validation(
            "A post needs a description or a photo".to_string(),
        ));
    }

    let post_id: Uuid = sqlx::query_scalar(
        r"INSERT INTO posts (id, user_id, description, photo_url)
           VALUES ($1, $2, $3, $4)
           RETURNING id",
    )
    .bind(Uuid::now_v7())
    .bind(auth.id)
    .bind(body.description.trim())
    .bind(&body.photo_url)
    .fetch_one(&state.db)
    .await
    .map_err(db_error!("create_post", user_id = %auth.id))?;

    match notify_friends(&state.db, auth.id, NotificationKind::NewPost, post_id).await {
        Ok(count) => tracing::debug!(%post_id, count, "Notified friends of new post"),
        Err(e) => tracing::warn!(%post_id, error = %e, "Failed to notify friends of new post"),
    }

    tracing::info!(%post_id, "Post created");

    fetch_post(&state.db, post_id)
        .await?
        .map(Json)
        .ok_or(PostError::NotFound)
}

/// GET /api/posts/newsfeed
/// Posts by the caller and the caller's friends, newest first
#[utoipa::path(
    get,
    path = "/api/posts/newsfeed",
    tag = "posts",
    params(PageQuery),
    responses((status = 200, description = "A page of posts", body = Paginated<Post>)),
    security(("bearer_auth" = [])),
)]
#[tracing::instrument(skip(state, auth), fields(user_id = %auth.id))]
pub async fn newsfeed(
    State(state): State<AppState>,
    auth: AuthUser,
    ApiQuery(query): ApiQuery<PageQuery>,
) -> Result<Json<Paginated<Post>>, PostError> {
    let page = query.resolve();

    let mut authors = friend_ids(&state.db, auth.id).await?;
    authors.push(auth.id);

    let sql = format!(
        r"SELECT {POST_COLUMNS}
           FROM posts p
           JOIN users u ON u.id = p.user_id
           WHERE p.user_id = ANY($1) AND ($2 OR NOT p.archived)
           ORDER BY p.created_at DESC, p.id DESC
           LIMIT $3 OFFSET $4"
    );
    let rows = sqlx::query_as::<_, PostRow>(&sql)
        .bind(&authors)
        .bind(auth.is_admin)
        .bind(page.limit)
        .bind(page.offset())
        .fetch_all(&state.db)
        .await
        .map_err(db_error!("newsfeed", user_id = %auth.id))?;

    let total: i64 = sqlx::query_scalar(
        "SELECT COUNT(*) FROM posts p WHERE p.user_id = ANY($1) AND ($2 OR NOT p.archived)",
    )
    .bind(&authors)
    .bind(auth.is_admin)
    .fetch_one(&state.db)
    .await
    .map_err(db_error!("newsfeed_count", user_id = %auth.id))?;

    let results = rows.into_iter().map(Post::from).collect();

    Ok(Json(Paginated::new(results, page, total)))
}

/// GET /api/posts
/// All posts of one user (default: the caller), newest first
#[utoipa::path(
    get,
    path = "/api/posts",
    tag = "posts",
    params(ListPostsQuery),
    responses((status = 200, description = "Posts", body = Vec<Post>)),
    security(("bearer_auth" = [])),
)]
pub async fn list_posts(
    State(state): State<AppState>,
    auth: AuthUser,
    ApiQuery(query): ApiQuery<ListPostsQuery>,
) -> Result<Json<Vec<Post>>, PostError> {
    let author = query.user.unwrap_or(auth.id);

    let sql = format!(
        r"SELECT {POST_COLUMNS}
           FROM posts p
           JOIN users u ON u.id = p.user_id
           WHERE p.user_id = $1 AND ($2 OR NOT p.archived)
           ORDER BY p.created_at DESC, p.id DESC"
    );
    let rows = sqlx::query_as::<_, PostRow>(&sql)
        .bind(author)
        .bind(auth.is_admin)
        .fetch_all(&state.db)
        .await
        .map_err(db_error!("list_posts", author = %author))?;

    Ok(Json(rows.into_iter().map(Post::from).collect()))
}

/// GET /api/posts/{id}
/// Get a single post
#[utoipa::path(
    get,
    path = "/api/posts/{id}",
    tag = "posts",
    params(("id" = Uuid, Path, description = "Post ID")),
    responses(
        (status = 200, description = "Post", body = Post),
        (status = 404, description = "Post not found"),
    ),
    security(("bearer_auth" = [])),
)]
pub async fn get_post(
    State(state): State<AppState>,
    auth: AuthUser,
    ApiPath(post_id): ApiPath<Uuid>,
) -> Result<Json<Post>, PostError> {
    let post = fetch_post(&state.db, post_id)
        .await?
        .ok_or(PostError::NotFound)?;

    if post.archived && !auth.is_admin {
        return Err(PostError::NotFound);
    }

    Ok(Json(post))
}

/// PUT /api/posts/{id}
/// Edit a post (author or admin)
#[utoipa::path(
    put,
    path = "/api/posts/{id}",
    tag = "posts",
    params(("id" = Uuid, Path, description = "Post ID")),
    request_body = UpdatePostRequest,
    responses(
        (status = 200, description = "Updated post", body = Post),
        (status = 401, description = "Not the author"),
        (status = 404, description = "Post not found"),
    ),
    security(("bearer_auth" = [])),
)]
#[tracing::instrument(skip(state, auth, body), fields(user_id = %auth.id))]
pub async fn update_post(
    State(state): State<AppState>,
    auth: AuthUser,
    ApiPath(post_id): ApiPath<Uuid>,
    ApiJson(body): ApiJson<UpdatePostRequest>,
) -> Result<Json<Post>, PostError> {
    body.validate()
        .map_err(|e| PostError::Validation(e.to_string()))?;

    let access = visible_post(&state.db, post_id, auth.is_admin).await?;

    if !access.editable_by(auth.id, auth.is_admin) {
        return Err(PostError::Unauthorized);
    }

    sqlx::query(
        r"UPDATE posts
           SET description = COALESCE($2, description),
               photo_url = COALESCE($3, photo_url),
               updated_at = NOW()
           WHERE id = $1",
    )
    .bind(post_id)
    .bind(body.description.as_deref().map(str::trim))
    .bind(&body.photo_url)
    .execute(&state.db)
    .await
    .map_err(db_error!("update_post", post_id = %post_id))?;

    tracing::info!(%post_id, "Post updated");

    fetch_post(&state.db, post_id)
        .await?
        .map(Json)
        .ok_or(PostError::NotFound)
}

/// PUT /api/posts/{id}/like
/// Like the post, or remove the caller's like if already present
#[utoipa::path(
    put,
    path = "/api/posts/{id}/like",
    tag = "posts",
    params(("id" = Uuid, Path, description = "Post ID")),
    responses(
        (status = 200, description = "Post with updated likes", body = Post),
        (status = 404, description = "Post not found"),
    ),
    security(("bearer_auth" = [])),
)]
#[tracing::instrument(skip(state, auth), fields(user_id = %auth.id))]
pub async fn toggle_like(
    State(state): State<AppState>,
    auth: AuthUser,
    ApiPath(post_id): ApiPath<Uuid>,
) -> Result<Json<Post>, PostError> {
    let access = visible_post(&state.db, post_id, auth.is_admin).await?;

    let removed = sqlx::query("DELETE FROM post_likes WHERE post_id = $1 AND user_id = $2")
        .bind(post_id)
        .bind(auth.id)
        .execute(&state.db)
        .await
        .map_err(db_error!("unlike_post", post_id = %post_id))?
        .rows_affected()
        > 0;

    if !removed {
        let inserted = sqlx::query(
            r"INSERT INTO post_likes (post_id, user_id)
               VALUES ($1, $2)
               ON CONFLICT DO NOTHING",
        )
        .bind(post_id)
        .bind(auth.id)
        .execute(&state.db)
        .await
        .map_err(db_error!("like_post", post_id = %post_id))?
        .rows_affected()
            > 0;

        if inserted {
            if let Err(e) = notify(
                &state.db,
                access.user_id,
                auth.id,
                NotificationKind::PostLike,
                post_id,
            )
            .await
            {
                tracing::warn!(%post_id, error = %e, "Failed to send like notification");
            }
        }
    }

    fetch_post(&state.db, post_id)
        .await?
        .map(Json)
        .ok_or(PostError::NotFound)
}

/// PUT /api/posts/{id}/archive
/// Hide a post from non-admins (admin only)
#[utoipa::path(
    put,
    path = "/api/posts/{id}/archive",
    tag = "posts",
    params(("id" = Uuid, Path, description = "Post ID")),
    responses(
        (status = 200, description = "Archived post", body = Post),
        (status = 404, description = "Post not found"),
    ),
    security(("bearer_auth" = [])),
)]
pub async fn archive_post(
    State(state): State<AppState>,
    ApiPath(post_id): ApiPath<Uuid>,
) -> Result<Json<Post>, PostError> {
    set_archived(&state.db, post_id, true).await.map(Json)
}

/// PUT /api/posts/{id}/unarchive
/// Restore an archived post (admin only)
#[utoipa::path(
    put,
    path = "/api/posts/{id}/unarchive",
    tag = "posts",
    params(("id" = Uuid, Path, description = "Post ID")),
    responses(
        (status = 200, description = "Restored post", body = Post),
        (status = 404, description = "Post not found"),
    ),
    security(("bearer_auth" = [])),
)]
pub async fn unarchive_post(
    State(state): State<AppState>,
    ApiPath(post_id): ApiPath<Uuid>,
) -> Result<Json<Post>, PostError> {
    set_archived(&state.db, post_id, false).await.map(Json)
}

// ============================================================================
// Helpers
// ============================================================================

async fn fetch_post(pool: &PgPool, post_id: Uuid) -> Result<Option<Post>, PostError> {
    let sql = format!(
        r"SELECT {POST_COLUMNS}
           FROM posts p
           JOIN users u ON u.id = p.user_id
           WHERE p.id = $1"
    );
    let row = sqlx::query_as::<_, PostRow>(&sql)
        .bind(post_id)
        .fetch_optional(pool)
        .await
        .map_err(db_error!("fetch_post", post_id = %post_id))?;

    Ok(row.map(Post::from))
}

/// Load ownership info, treating posts the caller cannot see as missing.
async fn visible_post(pool: &PgPool, post_id: Uuid, is_admin: bool) -> Result<PostAccess, PostError> {
    let access = sqlx::query_as::<_, PostAccess>(
        "SELECT id, user_id, archived FROM posts WHERE id = $1",
    )
    .bind(post_id)
    .fetch_optional(pool)
    .await
    .map_err(db_error!("find_post", post_id = %post_id))?
    .ok_or(PostError::NotFound)?;

    if !access.visible_to(is_admin) {
        return Err(PostError::NotFound);
    }

    Ok(access)
}

async fn set_archived(pool: &PgPool, post_id: Uuid, archived: bool) -> Result<Post, PostError> {
    let result = sqlx::query("UPDATE posts SET archived = $2, updated_at = NOW() WHERE id = $1")
        .bind(post_id)
        .bind(archived)
        .execute(pool)
        .await
        .map_err(db_error!("set_post_archived", post_id = %post_id, archived = archived))?;

    if result.rows_affected() == 0 {
        return Err(PostError::NotFound);
    }

    tracing::info!(%post_id, archived, "Post archive flag changed");

    fetch_post(pool, post_id).await?.ok_or(PostError::NotFound)
}
