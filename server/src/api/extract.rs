//! Request extractors that reject malformed input with the API error body.
//!
//! Axum's stock `Json`, `Path` and `Query` rejections answer with plain text
//! (and 422 for JSON that parses but has the wrong shape). These wrappers turn
//! every rejection into a 400 `VALIDATION_ERROR` with `{error, message}`.

use axum::{
    extract::{
        rejection::{JsonRejection, PathRejection, QueryRejection},
        FromRequest, FromRequestParts, OptionalFromRequest, Path, Query, Request,
    },
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde::de::DeserializeOwned;

use crate::auth::ErrorResponse;

/// Body, path or query string could not be decoded.
#[derive(Debug, thiserror::Error)]
pub enum InputError {
    #[error(transparent)]
    Json(#[from] JsonRejection),
    #[error(transparent)]
    Path(#[from] PathRejection),
    #[error(transparent)]
    Query(#[from] QueryRejection),
}

impl InputError {
    fn detail(&self) -> String {
        match self {
            Self::Json(r) => r.body_text(),
            Self::Path(r) => r.body_text(),
            Self::Query(r) => r.body_text(),
        }
    }
}

impl IntoResponse for InputError {
    fn into_response(self) -> Response {
        let body = Json(ErrorResponse {
            error: "VALIDATION_ERROR".to_string(),
            message: self.detail(),
        });

        (StatusCode::BAD_REQUEST, body).into_response()
    }
}

/// JSON request body.
#[derive(Debug, FromRequest)]
#[from_request(via(Json), rejection(InputError))]
pub struct ApiJson<T>(pub T);

/// An absent body (no JSON content type) yields `None`; a malformed one is
/// still rejected.
impl<T, S> OptionalFromRequest<S> for ApiJson<T>
where
    T: DeserializeOwned,
    S: Send + Sync,
{
    type Rejection = InputError;

    async fn from_request(req: Request, state: &S) -> Result<Option<Self>, Self::Rejection> {
        let body = <Json<T> as OptionalFromRequest<S>>::from_request(req, state).await?;
        Ok(body.map(|Json(value)| Self(value)))
    }
}

/// Path parameters.
#[derive(Debug, FromRequestParts)]
#[from_request(via(Path), rejection(InputError))]
pub struct ApiPath<T>(pub T);

/// Query string parameters.
#[derive(Debug, FromRequestParts)]
#[from_request(via(Query), rejection(InputError))]
pub struct ApiQuery<T>(pub T);
