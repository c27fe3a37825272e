//! Reusable test helpers for HTTP integration tests.
//!
//! Provides `TestApp` for building and sending requests through the full axum router,
//! plus utilities for user creation, admin grants, and JWT generation.
//!
//! These tests need the PostgreSQL container described on
//! `Config::default_for_test` with migrations applied.
//!
//! ## Cleanup Guards
//!
//! Use [`CleanupGuard`] for RAII-based cleanup that runs even if a test panics.
#![allow(dead_code)]

use std::future::Future;
use std::pin::Pin;
use std::sync::Arc;

use axum::body::Body;
use axum::http::{self, Method, Request, Response};
use axum::Router;
use circle_server::api::{create_router, AppState};
use circle_server::auth::{hash_password, jwt};
use circle_server::config::Config;
use circle_server::db;
use http_body_util::BodyExt;
use sqlx::PgPool;
use tokio::sync::OnceCell;
use tower::ServiceExt;
use uuid::Uuid;

// ============================================================================
// Shared resources
// ============================================================================

/// Shared database pool across all tests in the same binary.
static SHARED_POOL: OnceCell<PgPool> = OnceCell::const_new();

/// Password every helper-created user logs in with.
pub const TEST_PASSWORD: &str = "password123";

/// Get or create a shared database pool.
pub async fn shared_pool() -> &'static PgPool {
    SHARED_POOL
        .get_or_init(|| async {
            let config = Config::default_for_test();
            db::create_pool(&config.database_url)
                .await
                .expect("Failed to connect to test DB")
        })
        .await
}

// ============================================================================
// Cleanup Guard
// ============================================================================

/// Async cleanup action type.
type CleanupAction = Box<dyn FnOnce(PgPool) -> Pin<Box<dyn Future<Output = ()> + Send>> + Send>;

/// RAII guard that runs cleanup actions on drop, even if the test panics.
///
/// ```ignore
/// let mut guard = app.cleanup_guard();
/// guard.delete_user(user_id);
/// assert_eq!(resp.status(), 200);
/// // guard dropped here → cleanup runs
/// ```
pub struct CleanupGuard {
    pool: PgPool,
    actions: Vec<CleanupAction>,
}

impl CleanupGuard {
    /// Create a new cleanup guard for the given pool.
    pub fn new(pool: PgPool) -> Self {
        Self {
            pool,
            actions: Vec::new(),
        }
    }

    /// Register a generic async cleanup action.
    pub fn add<F, Fut>(&mut self, action: F)
    where
        F: FnOnce(PgPool) -> Fut + Send + 'static,
        Fut: Future<Output = ()> + Send + 'static,
    {
        self.actions
            .push(Box::new(move |pool| Box::pin(action(pool))));
    }

    /// Register cleanup to delete a user by ID (cascades to everything they own).
    pub fn delete_user(&mut self, user_id: Uuid) {
        self.add(move |pool| async move {
            let _ = sqlx::query("DELETE FROM users WHERE id = $1")
                .bind(user_id)
                .execute(&pool)
                .await;
        });
    }

    /// Register cleanup to delete a user by email, for users created over HTTP.
    pub fn delete_user_by_email(&mut self, email: String) {
        self.add(move |pool| async move {
            let _ = sqlx::query("DELETE FROM users WHERE email = lower($1)")
                .bind(email)
                .execute(&pool)
                .await;
        });
    }
}

impl Drop for CleanupGuard {
    fn drop(&mut self) {
        let actions = std::mem::take(&mut self.actions);
        if actions.is_empty() {
            return;
        }

        let pool = self.pool.clone();
        let handle = tokio::runtime::Handle::current();

        // Spawn a blocking thread to run async cleanup.
        // This works regardless of tokio runtime flavor.
        std::thread::spawn(move || {
            handle.block_on(async move {
                for action in actions {
                    action(pool.clone()).await;
                }
            });
        })
        .join()
        .expect("Cleanup thread panicked");
    }
}

// ============================================================================
// Test App
// ============================================================================

/// A test application wrapping the full axum router.
pub struct TestApp {
    pub router: Router,
    pub pool: PgPool,
    pub config: Arc<Config>,
}

impl TestApp {
    /// Create a new test app with the default test config.
    pub async fn new() -> Self {
        Self::with_config(Config::default_for_test()).await
    }

    /// Create a test app with a custom config (e.g. a protected admin).
    pub async fn with_config(config: Config) -> Self {
        let pool = shared_pool().await.clone();
        let state = AppState::new(pool.clone(), config.clone());
        let router = create_router(state);

        Self {
            router,
            pool,
            config: Arc::new(config),
        }
    }

    /// Build an HTTP request with the given method and URI.
    pub fn request(method: Method, uri: &str) -> http::request::Builder {
        Request::builder().method(method).uri(uri)
    }

    /// Build an authenticated request.
    pub fn authed(&self, method: Method, uri: &str, user_id: Uuid) -> http::request::Builder {
        let token = generate_access_token(&self.config, user_id);
        Self::request(method, uri).header("Authorization", format!("Bearer {token}"))
    }

    /// Send a request through the router via `tower::ServiceExt::oneshot`.
    pub async fn oneshot(&self, request: Request<Body>) -> Response<Body> {
        self.router
            .clone()
            .oneshot(request)
            .await
            .expect("oneshot request failed")
    }

    /// Create a [`CleanupGuard`] for this app's pool.
    pub fn cleanup_guard(&self) -> CleanupGuard {
        CleanupGuard::new(self.pool.clone())
    }
}

// ============================================================================
// User & Auth helpers
// ============================================================================

/// Create a test user and return `(user_id, email)`.
pub async fn create_test_user(pool: &PgPool) -> (Uuid, String) {
    let test_id = Uuid::new_v4().to_string()[..8].to_string();
    let email = format!("httptest_{test_id}@example.com");
    let hash = hash_password(TEST_PASSWORD).expect("Failed to hash password");

    let user = db::create_user(pool, "HTTP Test User", &email, &hash)
        .await
        .expect("Failed to create test user");

    (user.id, email)
}

/// Grant the admin flag to a user.
pub async fn make_admin(pool: &PgPool, user_id: Uuid) {
    sqlx::query("UPDATE users SET is_admin = TRUE WHERE id = $1")
        .bind(user_id)
        .execute(pool)
        .await
        .expect("Failed to grant admin");
}

/// Archive a user directly in the database.
pub async fn archive_user(pool: &PgPool, user_id: Uuid) {
    db::set_user_archived(pool, user_id, true)
        .await
        .expect("Failed to archive user");
}

/// Generate an access token for the given user.
pub fn generate_access_token(config: &Config, user_id: Uuid) -> String {
    jwt::generate_access_token(user_id, &config.jwt_secret, config.jwt_expiry)
        .expect("Failed to generate token")
}

/// Create a friendship between two users.
pub async fn create_friendship(pool: &PgPool, user_a: Uuid, user_b: Uuid) {
    db::ensure_friendship(pool, user_a, user_b)
        .await
        .expect("Failed to create friendship");
}

/// Count notifications of a kind addressed to a user.
pub async fn count_notifications(pool: &PgPool, to: Uuid, kind: &str) -> i64 {
    sqlx::query_scalar(
        "SELECT COUNT(*) FROM notifications WHERE to_user_id = $1 AND kind::text = $2",
    )
    .bind(to)
    .bind(kind)
    .fetch_one(pool)
    .await
    .expect("Failed to count notifications")
}

/// Read the full response body as JSON.
pub async fn body_to_json(response: Response<Body>) -> serde_json::Value {
    let bytes = response
        .into_body()
        .collect()
        .await
        .expect("Failed to read body")
        .to_bytes();
    serde_json::from_slice(&bytes).expect("Body is not JSON")
}

/// Build a JSON request body.
pub fn json_body(value: &serde_json::Value) -> Body {
    Body::from(value.to_string())
}
