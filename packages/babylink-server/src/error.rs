//! HTTP mapping for core errors.
//!
//! Every failure leaves the server as `{ "message": "..." }`. Storage and
//! internal failures are logged in full and returned as opaque text.

use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use babylink_core::{Error, ErrorKind};
use serde::Serialize;

/// Body of every error response.
#[derive(Debug, Serialize)]
pub struct ErrorBody {
    pub message: String,
}

/// Wrapper that turns a [`babylink_core::Error`] into a response.
#[derive(Debug)]
pub struct ApiError(pub Error);

impl ApiError {
    pub fn status(&self) -> StatusCode {
        match self.0.kind() {
            ErrorKind::InvalidInput => StatusCode::BAD_REQUEST,
            ErrorKind::NotFound => StatusCode::NOT_FOUND,
            ErrorKind::Unauthorized => StatusCode::UNAUTHORIZED,
            ErrorKind::Internal => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

impl From<Error> for ApiError {
    fn from(err: Error) -> Self {
        Self(err)
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let status = self.status();

        if status.is_server_error() {
            tracing::error!(code = self.0.code(), error = %self.0, "Request failed");
        } else {
            tracing::debug!(code = self.0.code(), error = %self.0, "Request rejected");
        }

        (
            status,
            Json(ErrorBody {
                message: self.0.public_message(),
            }),
        )
            .into_response()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_status_mapping() {
        assert_eq!(ApiError(Error::EmptyMessage).status(), StatusCode::BAD_REQUEST);
        assert_eq!(
            ApiError(Error::UserNotFound("x".into())).status(),
            StatusCode::NOT_FOUND
        );
        assert_eq!(ApiError(Error::Unauthorized).status(), StatusCode::UNAUTHORIZED);
        assert_eq!(
            ApiError(Error::DatabaseError("disk I/O error".into())).status(),
            StatusCode::INTERNAL_SERVER_ERROR
        );
    }

    #[test]
    fn test_internal_error_body_is_opaque() {
        let body = serde_json::to_value(ErrorBody {
            message: Error::DatabaseError("disk I/O error".into()).public_message(),
        })
        .unwrap();
        assert_eq!(body["message"], "Internal server error");
    }
}
