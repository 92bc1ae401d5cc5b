use axum::{extract::rejection::JsonRejection, http::StatusCode, response::IntoResponse, Json};
use serde::Serialize;
use tracing::error;

use crate::{data::DataError, password::PasswordError, session::SessionError};

/// An error returned to the client as `{ "msg": ... }`.
#[derive(Debug, Serialize)]
pub struct ErrorResponse {
    #[serde(skip_serializing)]
    status_code: Option<StatusCode>,
    pub msg: String,
}

impl ErrorResponse {
    pub fn status_code(&self) -> StatusCode {
        self.status_code.unwrap_or(StatusCode::INTERNAL_SERVER_ERROR)
    }

    pub fn with_status(status: StatusCode, msg: impl Into<String>) -> Self {
        Self {
            status_code: Some(status),
            msg: msg.into(),
        }
    }

    pub fn bad_request(msg: impl Into<String>) -> Self {
        Self::with_status(StatusCode::BAD_REQUEST, msg)
    }

    pub fn unauthorized(msg: impl Into<String>) -> Self {
        Self::with_status(StatusCode::UNAUTHORIZED, msg)
    }

    pub fn forbidden(msg: impl Into<String>) -> Self {
        Self::with_status(StatusCode::FORBIDDEN, msg)
    }

    pub fn not_found(msg: impl Into<String>) -> Self {
        Self::with_status(StatusCode::NOT_FOUND, msg)
    }

    /// The details are logged, never sent.
    pub fn internal(details: impl std::fmt::Display) -> Self {
        error!(error = %details, "Internal server error");
        Self::with_status(StatusCode::INTERNAL_SERVER_ERROR, "Internal server error")
    }
}

impl IntoResponse for ErrorResponse {
    fn into_response(self) -> axum::response::Response {
        (self.status_code(), Json(self)).into_response()
    }
}

impl From<DataError> for ErrorResponse {
    fn from(err: DataError) -> Self {
        match err {
            DataError::UserExists(_) => Self::bad_request("User already exists"),
            DataError::UserNotFound(_) => Self::not_found("User not found"),
            other => Self::internal(other),
        }
    }
}

impl From<PasswordError> for ErrorResponse {
    fn from(err: PasswordError) -> Self {
        Self::internal(err)
    }
}

impl From<SessionError> for ErrorResponse {
    fn from(err: SessionError) -> Self {
        Self::internal(err)
    }
}

impl From<JsonRejection> for ErrorResponse {
    fn from(rejection: JsonRejection) -> Self {
        Self::bad_request(rejection.body_text())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_data_errors_map_to_statuses() {
        let exists = ErrorResponse::from(DataError::UserExists("ana".into()));
        assert_eq!(exists.status_code(), StatusCode::BAD_REQUEST);
        assert_eq!(exists.msg, "User already exists");

        let missing = ErrorResponse::from(DataError::UserNotFound("ana".into()));
        assert_eq!(missing.status_code(), StatusCode::NOT_FOUND);
    }

    #[test]
    fn test_internal_hides_details() {
        let err = ErrorResponse::internal("connection refused");
        assert_eq!(err.status_code(), StatusCode::INTERNAL_SERVER_ERROR);
        assert_eq!(err.msg, "Internal server error");
    }
}
