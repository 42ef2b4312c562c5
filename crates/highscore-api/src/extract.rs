//! Request extractors that reject with the JSON error envelope.
//!
//! Axum's stock `Json` and `Path` extractors answer failures with plain
//! text. These wrappers turn every rejection into an [`ApiError`] carrying
//! [`BAD_REQUEST`] so clients always receive `{errorCode, errorMessage}`.

use axum::Json;
use axum::extract::{FromRequest, FromRequestParts, Path, Request};
use axum::http::request::Parts;
use highscore_types::BAD_REQUEST;
use serde::de::DeserializeOwned;

use crate::error::ApiError;

/// A JSON request body.
#[derive(Debug, Clone)]
pub struct JsonBody<T>(pub T);

impl<S, T> FromRequest<S> for JsonBody<T>
where
    T: DeserializeOwned,
    S: Send + Sync,
{
    type Rejection = ApiError;

    async fn from_request(req: Request, state: &S) -> Result<Self, Self::Rejection> {
        match Json::<T>::from_request(req, state).await {
            Ok(Json(value)) => Ok(Self(value)),
            Err(rejection) => Err(ApiError(
                BAD_REQUEST
                    .with_message("Invalid JSON format")
                    .with_internal(rejection.body_text()),
            )),
        }
    }
}

/// The `{id}` path segment naming a user.
///
/// Surrounding whitespace is trimmed. An empty id never reaches storage.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UserId(pub String);

impl UserId {
    /// The id as a string slice.
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl<S> FromRequestParts<S> for UserId
where
    S: Send + Sync,
{
    type Rejection = ApiError;

    async fn from_request_parts(parts: &mut Parts, state: &S) -> Result<Self, Self::Rejection> {
        let Path(raw) = Path::<String>::from_request_parts(parts, state)
            .await
            .map_err(|rejection| {
                ApiError(
                    BAD_REQUEST
                        .with_message("Missing user id")
                        .with_internal(rejection.body_text()),
                )
            })?;

        let id = raw.trim();
        if id.is_empty() {
            return Err(ApiError(BAD_REQUEST.with_message("Missing user id")));
        }
        Ok(Self(id.to_owned()))
    }
}
