//! In-process store backend.
//!
//! Collections live behind one async read-write lock. Every write, including the
//! uniqueness checks of a booking insert, runs under a single write guard, so the
//! check and the insert cannot interleave with another request.

use async_trait::async_trait;
use std::collections::HashMap;
use std::sync::Arc;
use tokio::sync::RwLock;
use uuid::Uuid;

use super::evaluator;
use super::EntityStore;
use crate::error::{AppError, UniqueViolation};
use crate::model::{Booking, BookingPatch, BookingScope, Dentist, DentistPatch, NewBooking, NewDentist};
use crate::query::{FieldFilter, ListQuery};

#[derive(Debug, Default)]
struct Collections {
    dentists: HashMap<Uuid, Dentist>,
    bookings: HashMap<Uuid, Booking>,
}

impl Collections {
    /// Reject `candidate` if it would break a booking uniqueness rule. The record itself is skipped.
    /// The per-user rule is reported ahead of the schedule rule when both are broken.
    fn check_unique(&self, candidate: &Booking) -> Result<(), AppError> {
        let others: Vec<&Booking> = self.bookings.values().filter(|b| b.id != candidate.id).collect();
        if candidate.exclusive && others.iter().any(|b| b.exclusive && b.user == candidate.user) {
            return Err(AppError::Duplicate(UniqueViolation::UserBooking));
        }
        if others
            .iter()
            .any(|b| b.dentist == candidate.dentist && b.book_date == candidate.book_date)
        {
            return Err(AppError::Duplicate(UniqueViolation::DentistSchedule));
        }
        Ok(())
    }

    fn sorted_bookings(&self, keep: impl Fn(&Booking) -> bool) -> Vec<Booking> {
        let mut out: Vec<Booking> = self.bookings.values().filter(|b| keep(b)).cloned().collect();
        out.sort_by(|a, b| a.book_date.cmp(&b.book_date).then(a.id.cmp(&b.id)));
        out
    }
}

/// Thread-safe in-memory store. Clones share the same data.
#[derive(Clone, Debug, Default)]
pub struct MemoryStore {
    inner: Arc<RwLock<Collections>>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl EntityStore for MemoryStore {
    async fn ping(&self) -> Result<(), AppError> {
        Ok(())
    }

    async fn close(&self) {
        tracing::debug!("memory store closed");
    }

    async fn find_dentists(&self, query: &ListQuery) -> Result<Vec<Dentist>, AppError> {
        let guard = self.inner.read().await;
        let mut matched: Vec<&Dentist> = guard
            .dentists
            .values()
            .filter(|d| evaluator::matches(d, &query.filters))
            .collect();
        matched.sort_by(|a, b| evaluator::compare(a, b, &query.sort));
        Ok(matched
            .into_iter()
            .skip(query.skip() as usize)
            .take(query.limit as usize)
            .cloned()
            .collect())
    }

    async fn count_dentists(&self, filters: &[FieldFilter]) -> Result<u64, AppError> {
        let guard = self.inner.read().await;
        Ok(guard.dentists.values().filter(|d| evaluator::matches(d, filters)).count() as u64)
    }

    async fn get_dentist(&self, id: Uuid) -> Result<Option<Dentist>, AppError> {
        Ok(self.inner.read().await.dentists.get(&id).cloned())
    }

    async fn get_dentists(&self, ids: &[Uuid]) -> Result<Vec<Dentist>, AppError> {
        let guard = self.inner.read().await;
        Ok(ids.iter().filter_map(|id| guard.dentists.get(id).cloned()).collect())
    }

    async fn insert_dentist(&self, new: NewDentist) -> Result<Dentist, AppError> {
        let dentist = new.into_dentist();
        self.inner.write().await.dentists.insert(dentist.id, dentist.clone());
        Ok(dentist)
    }

    async fn update_dentist(&self, id: Uuid, patch: DentistPatch) -> Result<Option<Dentist>, AppError> {
        let mut guard = self.inner.write().await;
        Ok(guard.dentists.get_mut(&id).map(|d| {
            patch.apply(d);
            d.clone()
        }))
    }

    async fn delete_dentist(&self, id: Uuid) -> Result<bool, AppError> {
        Ok(self.inner.write().await.dentists.remove(&id).is_some())
    }

    async fn find_bookings(&self, scope: &BookingScope) -> Result<Vec<Booking>, AppError> {
        Ok(self.inner.read().await.sorted_bookings(|b| scope.admits(b)))
    }

    async fn bookings_for_dentists(&self, dentist_ids: &[Uuid]) -> Result<Vec<Booking>, AppError> {
        Ok(self
            .inner
            .read()
            .await
            .sorted_bookings(|b| dentist_ids.contains(&b.dentist)))
    }

    async fn get_booking(&self, id: Uuid) -> Result<Option<Booking>, AppError> {
        Ok(self.inner.read().await.bookings.get(&id).cloned())
    }

    async fn insert_booking(&self, new: NewBooking) -> Result<Booking, AppError> {
        let booking = new.into_booking();
        let mut guard = self.inner.write().await;
        guard.check_unique(&booking)?;
        guard.bookings.insert(booking.id, booking.clone());
        Ok(booking)
    }

    async fn update_booking(&self, id: Uuid, patch: BookingPatch) -> Result<Option<Booking>, AppError> {
        let mut guard = self.inner.write().await;
        let Some(mut updated) = guard.bookings.get(&id).cloned() else {
            return Ok(None);
        };
        patch.apply(&mut updated);
        guard.check_unique(&updated)?;
        guard.bookings.insert(id, updated.clone());
        Ok(Some(updated))
    }

    async fn delete_booking(&self, id: Uuid) -> Result<bool, AppError> {
        Ok(self.inner.write().await.bookings.remove(&id).is_some())
    }

    async fn delete_bookings_for_dentist(&self, dentist_id: Uuid) -> Result<u64, AppError> {
        let mut guard = self.inner.write().await;
        let before = guard.bookings.len();
        guard.bookings.retain(|_, b| b.dentist != dentist_id);
        Ok((before - guard.bookings.len()) as u64)
    }
}
