//! Booking handlers. Every route requires an identity.

use axum::extract::rejection::JsonRejection;
use axum::{
    extract::{Path, State},
    response::IntoResponse,
    Json,
};
use serde_json::Value;

use super::json_body;
use crate::error::AppError;
use crate::extractors::CurrentUser;
use crate::response::{success_empty, success_many, success_one, success_one_ok};
use crate::service::BookingService;
use crate::state::AppState;

pub async fn list_bookings(
    State(state): State<AppState>,
    CurrentUser(user): CurrentUser,
) -> Result<impl IntoResponse, AppError> {
    let bookings = BookingService::list(state.store.as_ref(), &user, None).await?;
    Ok(success_many(bookings))
}

pub async fn list_dentist_bookings(
    State(state): State<AppState>,
    CurrentUser(user): CurrentUser,
    Path(dentist_id): Path<String>,
) -> Result<impl IntoResponse, AppError> {
    let bookings = BookingService::list(state.store.as_ref(), &user, Some(dentist_id.as_str())).await?;
    Ok(success_many(bookings))
}

pub async fn get_booking(
    State(state): State<AppState>,
    CurrentUser(_user): CurrentUser,
    Path(id): Path<String>,
) -> Result<impl IntoResponse, AppError> {
    let booking = BookingService::read(state.store.as_ref(), &id).await?;
    Ok(success_one_ok(booking))
}

pub async fn create_booking(
    State(state): State<AppState>,
    CurrentUser(user): CurrentUser,
    Path(dentist_id): Path<String>,
    payload: Result<Json<Value>, JsonRejection>,
) -> Result<impl IntoResponse, AppError> {
    let body = json_body(payload)?;
    let booking = BookingService::create(state.store.as_ref(), &user, &dentist_id, body).await?;
    Ok(success_one(booking))
}

pub async fn update_booking(
    State(state): State<AppState>,
    CurrentUser(user): CurrentUser,
    Path(id): Path<String>,
    payload: Result<Json<Value>, JsonRejection>,
) -> Result<impl IntoResponse, AppError> {
    let body = json_body(payload)?;
    let booking = BookingService::update(state.store.as_ref(), &user, &id, body).await?;
    Ok(success_one_ok(booking))
}

pub async fn delete_booking(
    State(state): State<AppState>,
    CurrentUser(user): CurrentUser,
    Path(id): Path<String>,
) -> Result<impl IntoResponse, AppError> {
    BookingService::delete(state.store.as_ref(), &user, &id).await?;
    Ok(success_empty())
}
