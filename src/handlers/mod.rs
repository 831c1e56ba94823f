//! HTTP handlers for dentists and bookings.

pub mod bookings;
pub mod dentists;
pub use bookings::*;
pub use dentists::*;

use axum::extract::rejection::JsonRejection;
use axum::http::StatusCode;
use axum::Json;
use serde_json::Value;

use crate::error::AppError;

/// Unwrap a JSON body, reporting malformed or oversized input in the standard envelope.
fn json_body(payload: Result<Json<Value>, JsonRejection>) -> Result<Value, AppError> {
    payload.map(|Json(v)| v).map_err(|e| {
        if e.status() == StatusCode::PAYLOAD_TOO_LARGE {
            AppError::PayloadTooLarge
        } else {
            AppError::BadRequest(e.body_text())
        }
    })
}
