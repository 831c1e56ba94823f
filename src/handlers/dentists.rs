//! Dentist handlers. Failures are reported through [`DentistFailure`].

use axum::extract::rejection::JsonRejection;
use axum::{
    extract::{Path, Query, State},
    response::IntoResponse,
    Json,
};
use serde_json::Value;

use super::json_body;
use crate::error::DentistFailure;
use crate::extractors::AdminUser;
use crate::query::ListQuery;
use crate::response::{success_empty, success_one, success_one_ok, success_page};
use crate::service::DentistService;
use crate::state::AppState;

pub async fn list_dentists(
    State(state): State<AppState>,
    Query(params): Query<Vec<(String, String)>>,
) -> Result<impl IntoResponse, DentistFailure> {
    let query = ListQuery::from_params(&params)?;
    let page = DentistService::list(state.store.as_ref(), &query).await?;
    Ok(success_page(page.data, page.pagination))
}

pub async fn get_dentist(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Result<impl IntoResponse, DentistFailure> {
    let dentist = DentistService::read(state.store.as_ref(), &id).await?;
    Ok(success_one_ok(dentist))
}

pub async fn create_dentist(
    State(state): State<AppState>,
    AdminUser(_admin): AdminUser,
    payload: Result<Json<Value>, JsonRejection>,
) -> Result<impl IntoResponse, DentistFailure> {
    let body = json_body(payload)?;
    let dentist = DentistService::create(state.store.as_ref(), body).await?;
    Ok(success_one(dentist))
}

pub async fn update_dentist(
    State(state): State<AppState>,
    AdminUser(_admin): AdminUser,
    Path(id): Path<String>,
    payload: Result<Json<Value>, JsonRejection>,
) -> Result<impl IntoResponse, DentistFailure> {
    let body = json_body(payload)?;
    let dentist = DentistService::update(state.store.as_ref(), &id, body).await?;
    Ok(success_one_ok(dentist))
}

pub async fn delete_dentist(
    State(state): State<AppState>,
    AdminUser(_admin): AdminUser,
    Path(id): Path<String>,
) -> Result<impl IntoResponse, DentistFailure> {
    DentistService::delete(state.store.as_ref(), &id).await?;
    Ok(success_empty())
}
