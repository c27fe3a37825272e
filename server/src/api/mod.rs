//! API Router and Application State
//!
//! Central routing configuration and shared state. Every route group is
//! tagged with the [`Access`] level the authorization gate enforces.

mod docs;
pub mod extract;
pub mod pagination;

use std::sync::Arc;
use std::time::Instant;

use axum::{
    extract::State,
    middleware::{from_fn, from_fn_with_state},
    routing::get,
    Json, Router,
};
use chrono::{DateTime, Utc};
use serde::Serialize;
use sqlx::PgPool;
use tower_http::{
    cors::{Any, CorsLayer},
    trace::TraceLayer,
};

use crate::auth::{self, Access};
use crate::config::Config;
use crate::{notifications, posts, social, users, verification};

/// Shared application state.
#[derive(Clone)]
pub struct AppState {
    /// Database connection pool
    pub db: PgPool,
    /// Server configuration
    pub config: Arc<Config>,
    /// Process start, reported as uptime by the health check
    pub started_at: Instant,
}

impl AppState {
    /// Create new application state.
    #[must_use]
    pub fn new(db: PgPool, config: Config) -> Self {
        Self {
            db,
            config: Arc::new(config),
            started_at: Instant::now(),
        }
    }
}

/// Put a route group behind the authorization gate at the given level.
///
/// `with_access` runs first and tags the request; `authorize` reads the tag.
fn gated(routes: Router<AppState>, state: &AppState, access: Access) -> Router<AppState> {
    routes
        .route_layer(from_fn_with_state(state.clone(), auth::authorize))
        .route_layer(from_fn(auth::with_access(access)))
}

/// Create the main application router.
pub fn create_router(state: AppState) -> Router {
    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods(Any)
        .allow_headers(Any);

    let public_routes = gated(
        Router::new()
            .nest("/api/auth", auth::public_router())
            .route("/api/docs/openapi.json", get(docs::openapi_json))
            .route("/health", get(health_check)),
        &state,
        Access::Public,
    );

    let user_routes = gated(
        Router::new()
            .nest("/auth", auth::router())
            .merge(social::router())
            .merge(notifications::router())
            .merge(posts::router())
            .merge(verification::router())
            .merge(users::router()),
        &state,
        Access::Authenticated,
    );

    let admin_routes = gated(
        Router::new()
            .merge(posts::admin_router())
            .merge(verification::admin_router())
            .merge(users::admin_router()),
        &state,
        Access::Admin,
    );

    Router::new()
        .merge(public_routes)
        .nest("/api", user_routes.merge(admin_routes))
        // Middleware
        .layer(TraceLayer::new_for_http())
        .layer(cors)
        // State
        .with_state(state)
}

/// Health check response.
#[derive(Serialize, utoipa::ToSchema)]
pub struct HealthResponse {
    /// Service status
    status: &'static str,
    /// Current server time
    timestamp: DateTime<Utc>,
    /// Seconds since the process started
    uptime: u64,
    /// Deployment environment
    environment: String,
}

/// Health check endpoint.
#[utoipa::path(
    get,
    path = "/health",
    tag = "health",
    responses((status = 200, description = "Service is up", body = HealthResponse)),
)]
pub async fn health_check(State(state): State<AppState>) -> Json<HealthResponse> {
    Json(HealthResponse {
        status: "ok",
        timestamp: Utc::now(),
        uptime: state.started_at.elapsed().as_secs(),
        environment: state.config.environment.clone(),
    })
}
