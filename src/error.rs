//! Typed errors and HTTP mapping.

use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use thiserror::Error;

use crate::response::ErrorBody;

#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("invalid {var}: {reason}")]
    Invalid { var: &'static str, reason: String },
    #[error("unknown store backend: {0} (expected postgres or memory)")]
    UnknownStore(String),
}

/// Which uniqueness rule a booking write violated.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum UniqueViolation {
    /// The (non-admin) user already holds a booking.
    UserBooking,
    /// The dentist already has a booking at that date.
    DentistSchedule,
}

#[derive(Error, Debug)]
pub enum AppError {
    #[error(transparent)]
    Config(#[from] ConfigError),
    #[error("{0}")]
    NotFound(String),
    #[error("{0}")]
    Validation(String),
    #[error("{0}")]
    BadRequest(String),
    #[error("{0}")]
    Conflict(String),
    #[error("duplicate booking: {0:?}")]
    Duplicate(UniqueViolation),
    #[error("{0}")]
    Unauthorized(String),
    #[error("{0}")]
    Forbidden(String),
    #[error("Request body is too large")]
    PayloadTooLarge,
    #[error("database: {0}")]
    Db(#[from] sqlx::Error),
}

impl AppError {
    pub fn status(&self) -> StatusCode {
        match self {
            AppError::NotFound(_) => StatusCode::NOT_FOUND,
            AppError::Validation(_) | AppError::BadRequest(_) => StatusCode::BAD_REQUEST,
            AppError::Conflict(_) | AppError::Duplicate(_) => StatusCode::CONFLICT,
            AppError::Unauthorized(_) => StatusCode::UNAUTHORIZED,
            AppError::Forbidden(_) => StatusCode::FORBIDDEN,
            AppError::PayloadTooLarge => StatusCode::PAYLOAD_TOO_LARGE,
            AppError::Config(_) | AppError::Db(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    /// True for failures of the backing store rather than of the request.
    pub fn is_internal(&self) -> bool {
        matches!(self, AppError::Config(_) | AppError::Db(_))
    }

    /// Message shown to clients. Store internals stay in the logs.
    pub fn public_message(&self) -> String {
        match self {
            AppError::Config(_) | AppError::Db(_) => "Internal server error".into(),
            other => other.to_string(),
        }
    }
}

fn render(status: StatusCode, err: &AppError) -> Response {
    if err.is_internal() {
        tracing::error!(error = %err, "request failed");
    } else {
        tracing::warn!(status = status.as_u16(), error = %err, "request rejected");
    }
    (status, Json(ErrorBody::new(err.public_message()))).into_response()
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        render(self.status(), &self)
    }
}

/// Error wrapper for dentist routes: every failure except a store failure or an oversized
/// body is reported as 400.
#[derive(Debug)]
pub struct DentistFailure(pub AppError);

impl From<AppError> for DentistFailure {
    fn from(err: AppError) -> Self {
        DentistFailure(err)
    }
}

impl IntoResponse for DentistFailure {
    fn into_response(self) -> Response {
        let status = match &self.0 {
            err if err.is_internal() => StatusCode::INTERNAL_SERVER_ERROR,
            AppError::PayloadTooLarge => StatusCode::PAYLOAD_TOO_LARGE,
            _ => StatusCode::BAD_REQUEST,
        };
        render(status, &self.0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn booking_errors_keep_their_status() {
        assert_eq!(AppError::NotFound("x".into()).status(), StatusCode::NOT_FOUND);
        assert_eq!(AppError::Unauthorized("x".into()).status(), StatusCode::UNAUTHORIZED);
        assert_eq!(
            AppError::Duplicate(UniqueViolation::UserBooking).status(),
            StatusCode::CONFLICT
        );
    }

    #[test]
    fn dentist_failures_collapse_to_bad_request() {
        let resp = DentistFailure(AppError::NotFound("gone".into())).into_response();
        assert_eq!(resp.status(), StatusCode::BAD_REQUEST);
        let resp = DentistFailure(AppError::Db(sqlx::Error::PoolClosed)).into_response();
        assert_eq!(resp.status(), StatusCode::INTERNAL_SERVER_ERROR);
        let resp = DentistFailure(AppError::PayloadTooLarge).into_response();
        assert_eq!(resp.status(), StatusCode::PAYLOAD_TOO_LARGE);
    }

    #[test]
    fn store_details_are_not_exposed() {
        let err = AppError::Db(sqlx::Error::PoolTimedOut);
        assert_eq!(err.public_message(), "Internal server error");
    }
}
