//! Booking operations: scoped listing, ownership checks, and conflict reporting.

use serde_json::Value;
use std::collections::HashMap;
use uuid::Uuid;

use super::dentists::dentist_not_found;
use super::{parse_id, DentistService, RequestValidator};
use crate::error::{AppError, UniqueViolation};
use crate::model::{
    Booking, BookingInput, BookingPatch, BookingScope, BookingView, Dentist, NewBooking, User, BOOKING_SCHEMA,
};
use crate::store::EntityStore;

pub struct BookingService;

impl BookingService {
    /// Bookings visible to `user`. Non-admins only ever see their own; an admin may
    /// narrow the listing to one dentist.
    pub async fn list(
        store: &dyn EntityStore,
        user: &User,
        dentist: Option<&str>,
    ) -> Result<Vec<BookingView>, AppError> {
        let scope = if !user.is_admin() {
            BookingScope::ForUser(user.id.clone())
        } else {
            match dentist {
                None => BookingScope::All,
                Some(raw) => match parse_id(raw) {
                    Some(id) => BookingScope::ForDentist(id),
                    None => return Ok(Vec::new()),
                },
            }
        };
        let bookings = store.find_bookings(&scope).await?;
        populate(store, bookings).await
    }

    pub async fn read(store: &dyn EntityStore, id: &str) -> Result<BookingView, AppError> {
        let booking = Self::find(store, id).await?;
        let dentist = store.get_dentist(booking.dentist).await?;
        Ok(BookingView::new(booking, dentist.as_ref()))
    }

    pub async fn create(
        store: &dyn EntityStore,
        user: &User,
        dentist_id: &str,
        body: Value,
    ) -> Result<Booking, AppError> {
        let dentist = DentistService::find(store, dentist_id).await?;
        let input: BookingInput = RequestValidator::parse(body, BOOKING_SCHEMA, false)?;
        let new = NewBooking {
            book_date: input.book_date,
            user: user.id.clone(),
            dentist: dentist.id,
            exclusive: !user.is_admin(),
        };
        let booking = store
            .insert_booking(new)
            .await
            .map_err(|e| conflict_message(e, user, &dentist, input.book_date))?;
        tracing::info!(booking = %booking.id, dentist = %dentist.id, user = %user.id, "booking created");
        Ok(booking)
    }

    pub async fn update(
        store: &dyn EntityStore,
        user: &User,
        id: &str,
        body: Value,
    ) -> Result<BookingView, AppError> {
        let booking = Self::find(store, id).await?;
        if !user.may_modify(&booking.user) {
            return Err(AppError::Unauthorized(format!(
                "User {} is not authorized to update this booking",
                user.id
            )));
        }
        let patch: BookingPatch = RequestValidator::parse(body, BOOKING_SCHEMA, true)?;
        let target_id = patch.dentist.unwrap_or(booking.dentist);
        let dentist = store
            .get_dentist(target_id)
            .await?
            .ok_or_else(|| dentist_not_found(&target_id.to_string()))?;
        let date = patch.book_date.unwrap_or(booking.book_date);
        let updated = store
            .update_booking(booking.id, patch)
            .await
            .map_err(|e| conflict_message(e, user, &dentist, date))?
            .ok_or_else(|| booking_not_found(id))?;
        Ok(BookingView::new(updated, Some(&dentist)))
    }

    pub async fn delete(store: &dyn EntityStore, user: &User, id: &str) -> Result<(), AppError> {
        let booking = Self::find(store, id).await?;
        if !user.may_modify(&booking.user) {
            return Err(AppError::Unauthorized(format!(
                "User {} is not authorized to delete this booking",
                user.id
            )));
        }
        if !store.delete_booking(booking.id).await? {
            return Err(booking_not_found(id));
        }
        tracing::info!(booking = %booking.id, user = %user.id, "booking deleted");
        Ok(())
    }

    async fn find(store: &dyn EntityStore, id: &str) -> Result<Booking, AppError> {
        let Some(booking_id) = parse_id(id) else {
            return Err(booking_not_found(id));
        };
        store
            .get_booking(booking_id)
            .await?
            .ok_or_else(|| booking_not_found(id))
    }
}

fn booking_not_found(id: &str) -> AppError {
    AppError::NotFound(format!("No booking with the id of {}", id))
}

/// Turn a store uniqueness violation into the client-facing conflict.
fn conflict_message(err: AppError, user: &User, dentist: &Dentist, date: chrono::DateTime<chrono::Utc>) -> AppError {
    match err {
        AppError::Duplicate(UniqueViolation::UserBooking) => {
            AppError::Conflict(format!("The user with ID {} has already made 1 booking", user.id))
        }
        AppError::Duplicate(UniqueViolation::DentistSchedule) => AppError::Conflict(format!(
            "The dentist {} is already booked on {}. Please choose other.",
            dentist.name,
            date.to_rfc3339()
        )),
        other => other,
    }
}

/// Attach each booking's dentist, fetched in one batch.
async fn populate(store: &dyn EntityStore, bookings: Vec<Booking>) -> Result<Vec<BookingView>, AppError> {
    let mut ids: Vec<Uuid> = bookings.iter().map(|b| b.dentist).collect();
    ids.sort_unstable();
    ids.dedup();
    let dentists: HashMap<Uuid, Dentist> = store
        .get_dentists(&ids)
        .await?
        .into_iter()
        .map(|d| (d.id, d))
        .collect();
    Ok(bookings
        .into_iter()
        .map(|b| {
            let dentist = dentists.get(&b.dentist);
            BookingView::new(b, dentist)
        })
        .collect())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::{NewDentist, Role};
    use crate::store::MemoryStore;
    use serde_json::json;

    fn user(id: &str, role: Role) -> User {
        User { id: id.into(), role }
    }

    async fn seed(store: &MemoryStore) -> Dentist {
        store
            .insert_dentist(NewDentist {
                name: "Dr. Park".into(),
                years_of_experience: 12,
                area_of_expertise: vec!["endodontics".into()],
            })
            .await
            .unwrap()
    }

    #[tokio::test]
    async fn conflicts_carry_readable_messages() {
        let store = MemoryStore::new();
        let d = seed(&store).await;
        let id = d.id.to_string();
        let alice = user("alice", Role::User);
        BookingService::create(&store, &alice, &id, json!({"bookDate": "2026-05-01"}))
            .await
            .unwrap();

        let err = BookingService::create(&store, &alice, &id, json!({"bookDate": "2026-05-02"}))
            .await
            .unwrap_err();
        assert_eq!(err.to_string(), "The user with ID alice has already made 1 booking");

        let bob = user("bob", Role::User);
        let err = BookingService::create(&store, &bob, &id, json!({"bookDate": "2026-05-01"}))
            .await
            .unwrap_err();
        assert!(err.to_string().starts_with("The dentist Dr. Park is already booked on 2026-05-01"));
    }

    #[tokio::test]
    async fn second_booking_on_a_taken_slot_reports_the_user_rule() {
        let store = MemoryStore::new();
        let d = seed(&store).await;
        let id = d.id.to_string();
        let alice = user("alice", Role::User);
        BookingService::create(&store, &alice, &id, json!({"bookDate": "2026-05-01"}))
            .await
            .unwrap();
        BookingService::create(&store, &user("bob", Role::User), &id, json!({"bookDate": "2026-05-02"}))
            .await
            .unwrap();
        let err = BookingService::create(&store, &alice, &id, json!({"bookDate": "2026-05-02"}))
            .await
            .unwrap_err();
        assert_eq!(err.to_string(), "The user with ID alice has already made 1 booking");
    }

    #[tokio::test]
    async fn non_admins_only_list_their_own() {
        let store = MemoryStore::new();
        let d = seed(&store).await;
        let id = d.id.to_string();
        let admin = user("root", Role::Admin);
        BookingService::create(&store, &user("a", Role::User), &id, json!({"bookDate": "2026-05-01"}))
            .await
            .unwrap();
        BookingService::create(&store, &user("b", Role::User), &id, json!({"bookDate": "2026-05-02"}))
            .await
            .unwrap();

        let mine = BookingService::list(&store, &user("a", Role::User), Some(id.as_str())).await.unwrap();
        assert_eq!(mine.len(), 1);
        assert_eq!(BookingService::list(&store, &admin, None).await.unwrap().len(), 2);
        assert!(BookingService::list(&store, &admin, Some("bogus")).await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn missing_dentist_is_reported_before_validation() {
        let store = MemoryStore::new();
        let err = BookingService::create(&store, &user("a", Role::User), &Uuid::new_v4().to_string(), json!({}))
            .await
            .unwrap_err();
        assert!(matches!(err, AppError::NotFound(_)));
    }
}
