//! Dentist operations: paged listing with bookings populated, and admin CRUD.

use serde_json::{Map, Value};
use std::collections::HashMap;
use uuid::Uuid;

use super::{parse_id, RequestValidator};
use crate::error::AppError;
use crate::model::{Booking, Dentist, DentistPatch, NewDentist, DENTIST_SCHEMA};
use crate::query::ListQuery;
use crate::response::Pagination;
use crate::store::EntityStore;

/// One page of the dentist listing, ready to render.
#[derive(Debug)]
pub struct DentistPage {
    pub data: Vec<Value>,
    pub pagination: Pagination,
}

pub struct DentistService;

impl DentistService {
    pub async fn list(store: &dyn EntityStore, query: &ListQuery) -> Result<DentistPage, AppError> {
        let total = store.count_dentists(&query.filters).await?;
        let dentists = store.find_dentists(query).await?;
        let ids: Vec<Uuid> = dentists.iter().map(|d| d.id).collect();
        let mut by_dentist: HashMap<Uuid, Vec<Booking>> = HashMap::new();
        for b in store.bookings_for_dentists(&ids).await? {
            by_dentist.entry(b.dentist).or_default().push(b);
        }
        let mut data = Vec::with_capacity(dentists.len());
        for d in dentists {
            let bookings = by_dentist.remove(&d.id).unwrap_or_default();
            let mut record = with_bookings(&d, &bookings)?;
            query.project(&mut record);
            data.push(Value::Object(record));
        }
        tracing::debug!(total, returned = data.len(), page = query.page, "listed dentists");
        Ok(DentistPage {
            data,
            pagination: query.pagination(total),
        })
    }

    /// One dentist with its bookings.
    pub async fn read(store: &dyn EntityStore, id: &str) -> Result<Value, AppError> {
        let dentist = Self::find(store, id).await?;
        let bookings = store.bookings_for_dentists(&[dentist.id]).await?;
        Ok(Value::Object(with_bookings(&dentist, &bookings)?))
    }

    pub async fn create(store: &dyn EntityStore, body: Value) -> Result<Dentist, AppError> {
        let new: NewDentist = RequestValidator::parse(body, DENTIST_SCHEMA, false)?;
        let dentist = store.insert_dentist(new).await?;
        tracing::info!(dentist = %dentist.id, "dentist created");
        Ok(dentist)
    }

    pub async fn update(store: &dyn EntityStore, id: &str, body: Value) -> Result<Dentist, AppError> {
        let patch: DentistPatch = RequestValidator::parse(body, DENTIST_SCHEMA, true)?;
        let dentist_id = parse_id(id).ok_or_else(|| dentist_not_found(id))?;
        store
            .update_dentist(dentist_id, patch)
            .await?
            .ok_or_else(|| dentist_not_found(id))
    }

    /// Remove the dentist's bookings, then the dentist.
    pub async fn delete(store: &dyn EntityStore, id: &str) -> Result<(), AppError> {
        let dentist = Self::find(store, id).await?;
        let removed = store.delete_bookings_for_dentist(dentist.id).await?;
        if !store.delete_dentist(dentist.id).await? {
            return Err(dentist_not_found(id));
        }
        tracing::info!(dentist = %dentist.id, bookings = removed, "dentist deleted");
        Ok(())
    }

    pub async fn find(store: &dyn EntityStore, id: &str) -> Result<Dentist, AppError> {
        let Some(dentist_id) = parse_id(id) else {
            return Err(dentist_not_found(id));
        };
        store
            .get_dentist(dentist_id)
            .await?
            .ok_or_else(|| dentist_not_found(id))
    }
}

pub(crate) fn dentist_not_found(id: &str) -> AppError {
    AppError::NotFound(format!("No dentist with the id of {}", id))
}

fn with_bookings(dentist: &Dentist, bookings: &[Booking]) -> Result<Map<String, Value>, AppError> {
    let mut record = match serde_json::to_value(dentist) {
        Ok(Value::Object(m)) => m,
        Ok(_) => Map::new(),
        Err(e) => return Err(AppError::BadRequest(e.to_string())),
    };
    let bookings = serde_json::to_value(bookings).map_err(|e| AppError::BadRequest(e.to_string()))?;
    record.insert("bookings".into(), bookings);
    Ok(record)
}
