//! Authentication Middleware

use axum::{
    extract::{Request, State},
    http::header::AUTHORIZATION,
    middleware::Next,
    response::Response,
};
use uuid::Uuid;

use crate::api::AppState;
use crate::db::{find_user_by_id, User, VerificationStatus};

use super::error::AuthError;
use super::gate::{admit, parse_bearer, Access};
use super::jwt::validate_access_token;

/// Authenticated user injected into request extensions.
///
/// This is a minimal struct containing only safe-to-expose user data.
/// Use this in handlers to access the current user.
#[derive(Debug, Clone)]
pub struct AuthUser {
    /// User ID.
    pub id: Uuid,
    /// Full name.
    pub full_name: String,
    /// Email.
    pub email: String,
    /// Whether the user carries the admin claim.
    pub is_admin: bool,
    /// Verification status at the time the request was admitted.
    pub verification_status: VerificationStatus,
}

impl From<User> for AuthUser {
    fn from(user: User) -> Self {
        Self {
            id: user.id,
            full_name: user.full_name,
            email: user.email,
            is_admin: user.is_admin,
            verification_status: user.verification_status,
        }
    }
}

/// Tag the routes of a layer with the access level the gate should enforce.
///
/// Apply as the outer layer of [`authorize`]:
/// ```ignore
/// Router::new()
///     .route("/requests", get(handler))
///     .route_layer(from_fn_with_state(state, authorize))
///     .route_layer(from_fn(with_access(Access::Admin)))
/// ```
pub fn with_access(
    access: Access,
) -> impl Fn(Request, Next) -> std::pin::Pin<Box<dyn std::future::Future<Output = Response> + Send>>
       + Clone
       + Send
       + 'static {
    move |mut request: Request, next: Next| {
        request.extensions_mut().insert(access);
        Box::pin(async move { next.run(request).await })
    }
}

/// The authorization gate.
///
/// Reads the [`Access`] tag (default: authenticated), extracts the Bearer
/// token from the Authorization header, validates the JWT, loads the user,
/// applies the archived/admin checks and injects `AuthUser` into request
/// extensions.
pub async fn authorize(
    State(state): State<AppState>,
    mut request: Request,
    next: Next,
) -> Result<Response, AuthError> {
    let access = request
        .extensions()
        .get::<Access>()
        .copied()
        .unwrap_or_default();

    if access.is_public() {
        return Ok(next.run(request).await);
    }

    let auth_header = request
        .headers()
        .get(AUTHORIZATION)
        .and_then(|h| h.to_str().ok())
        .ok_or(AuthError::MissingAuthHeader)?;

    let token = parse_bearer(auth_header)?;

    let claims = validate_access_token(token, &state.config.jwt_secret)?;
    let user_id = claims.user_id()?;

    let user = find_user_by_id(&state.db, user_id)
        .await?
        .ok_or(AuthError::UserNotFound)?;

    if let Err(e) = admit(access, &user) {
        tracing::debug!(user_id = %user.id, ?access, reason = %e, "Request rejected by gate");
        return Err(e);
    }

    request.extensions_mut().insert(AuthUser::from(user));

    Ok(next.run(request).await)
}

/// Extractor for authenticated user in handlers.
///
/// Use this to get the current user in protected endpoints:
///
/// ```ignore
/// async fn protected_handler(auth_user: AuthUser) -> impl IntoResponse {
///     format!("Hello, {}!", auth_user.full_name)
/// }
/// ```
impl<S> axum::extract::FromRequestParts<S> for AuthUser
where
    S: Send + Sync,
{
    type Rejection = AuthError;

    async fn from_request_parts(
        parts: &mut axum::http::request::Parts,
        _state: &S,
    ) -> Result<Self, Self::Rejection> {
        parts
            .extensions
            .get::<Self>()
            .cloned()
            .ok_or(AuthError::MissingAuthHeader)
    }
}
