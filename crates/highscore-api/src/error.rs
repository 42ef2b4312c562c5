//! Error envelope for the HTTP layer.
//!
//! [`ApiError`] wraps an [`AppError`] and converts it into an Axum HTTP
//! response via its [`IntoResponse`] implementation:
//!
//! ```json
//! {"errorCode": "D002", "errorMessage": "Invalid UserID"}
//! ```
//!
//! The response status is the error's declared status, or 500 when none
//! was set. Every rendered error is logged once with its structured
//! fields. If the envelope itself cannot be produced, only a warning is
//! logged and a bare 500 is returned.

use axum::http::{StatusCode, header};
use axum::response::{IntoResponse, Response};
use highscore_types::{AppError, INTERNAL};

/// Status given to storage errors that carry a code but no status.
const STORE_ERROR_STATUS: u16 = 400;

/// The JSON error envelope.
#[derive(Debug, Clone, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ErrorResponse {
    /// Stable machine-readable code.
    pub error_code: String,
    /// Human-readable message.
    pub error_message: String,
}

/// An [`AppError`] on its way to becoming an HTTP response.
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
#[error(transparent)]
pub struct ApiError(pub AppError);

impl ApiError {
    /// Translate a datastore failure for clients.
    ///
    /// Coded storage errors (`ENTRY_EXISTS`, `INVALID_KEY`, ...) without a
    /// status of their own are the client's fault and become 400. Uncoded
    /// wrapped failures keep their unset status and therefore render as
    /// 500.
    pub fn from_store(err: AppError) -> Self {
        if err.code().is_some() && err.status().is_none() {
            Self(err.with_status(STORE_ERROR_STATUS))
        } else {
            Self(err)
        }
    }

    /// The wrapped error.
    pub const fn inner(&self) -> &AppError {
        &self.0
    }

    fn status(&self) -> StatusCode {
        self.0
            .status()
            .and_then(|status| StatusCode::from_u16(status).ok())
            .unwrap_or(StatusCode::INTERNAL_SERVER_ERROR)
    }
}

impl From<AppError> for ApiError {
    fn from(err: AppError) -> Self {
        Self(err)
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let status = self.status();
        let envelope = ErrorResponse {
            error_code: self.0.code().unwrap_or(INTERNAL.code()).to_owned(),
            error_message: self.0.message().to_owned(),
        };

        match serde_json::to_vec(&envelope) {
            Ok(body) => {
                self.0.log();
                (
                    status,
                    [(header::CONTENT_TYPE, "application/json")],
                    body,
                )
                    .into_response()
            }
            Err(e) => {
                tracing::warn!(error = %e, "failed to write error response");
                StatusCode::INTERNAL_SERVER_ERROR.into_response()
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use highscore_types::{BAD_REQUEST, ENTRY_EXISTS, INVALID_KEY};

    use super::*;

    #[test]
    fn coded_store_errors_become_bad_request() {
        let err = ApiError::from_store(INVALID_KEY.with_message("Invalid UserID"));
        assert_eq!(err.status(), StatusCode::BAD_REQUEST);
        assert!(err.inner().is(&INVALID_KEY));
    }

    #[test]
    fn declared_status_is_kept() {
        let err = ApiError::from_store(ENTRY_EXISTS.error().with_status(409));
        assert_eq!(err.status(), StatusCode::CONFLICT);
    }

    #[test]
    fn uncoded_failures_default_to_500() {
        let io = std::io::Error::other("pool timed out");
        let err = ApiError::from_store(AppError::wrap(&io));
        assert_eq!(err.status(), StatusCode::INTERNAL_SERVER_ERROR);

        let response = err.into_response();
        assert_eq!(response.status(), StatusCode::INTERNAL_SERVER_ERROR);
    }

    #[test]
    fn template_status_drives_the_response() {
        let response = ApiError(BAD_REQUEST.error()).into_response();
        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
        assert_eq!(
            response
                .headers()
                .get(header::CONTENT_TYPE)
                .and_then(|v| v.to_str().ok()),
            Some("application/json")
        );
    }

    #[test]
    fn nonsense_status_falls_back_to_500() {
        let err = ApiError(AppError::coded("X1", "odd").with_status(1));
        assert_eq!(err.status(), StatusCode::INTERNAL_SERVER_ERROR);
    }
}
