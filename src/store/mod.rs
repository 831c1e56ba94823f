//! Entity store abstraction and its backends.
//!
//! Handlers never see a connection: they receive an `Arc<dyn EntityStore>` through
//! [`AppState`](crate::state::AppState), opened at startup and closed on shutdown.
//! Booking writes enforce the per-user and per-(dentist, date) uniqueness rules
//! atomically and report a violation as [`AppError::Duplicate`].

mod evaluator;
mod memory;
mod postgres;

pub use memory::MemoryStore;
pub use postgres::{ensure_database_exists, PgStore};

use async_trait::async_trait;
use uuid::Uuid;

use crate::error::AppError;
use crate::model::{Booking, BookingPatch, BookingScope, Dentist, DentistPatch, NewBooking, NewDentist};
use crate::query::{FieldFilter, ListQuery};

#[async_trait]
pub trait EntityStore: Send + Sync + std::fmt::Debug {
    /// Cheap round trip used by the readiness probe.
    async fn ping(&self) -> Result<(), AppError>;

    /// Release connections. Called once after the server has stopped.
    async fn close(&self);

    /// One page of dentists matching the query's filters, in its sort order.
    async fn find_dentists(&self, query: &ListQuery) -> Result<Vec<Dentist>, AppError>;

    /// Number of dentists matching `filters`, ignoring paging.
    async fn count_dentists(&self, filters: &[FieldFilter]) -> Result<u64, AppError>;

    async fn get_dentist(&self, id: Uuid) -> Result<Option<Dentist>, AppError>;

    /// Batch lookup for populating bookings. Missing ids are skipped.
    async fn get_dentists(&self, ids: &[Uuid]) -> Result<Vec<Dentist>, AppError>;

    async fn insert_dentist(&self, new: NewDentist) -> Result<Dentist, AppError>;

    async fn update_dentist(&self, id: Uuid, patch: DentistPatch) -> Result<Option<Dentist>, AppError>;

    /// Returns whether a record was removed.
    async fn delete_dentist(&self, id: Uuid) -> Result<bool, AppError>;

    /// Bookings visible under `scope`, ordered by booking date.
    async fn find_bookings(&self, scope: &BookingScope) -> Result<Vec<Booking>, AppError>;

    /// Bookings referencing any of `dentist_ids`, ordered by booking date.
    async fn bookings_for_dentists(&self, dentist_ids: &[Uuid]) -> Result<Vec<Booking>, AppError>;

    async fn get_booking(&self, id: Uuid) -> Result<Option<Booking>, AppError>;

    /// Conditional insert: fails with [`AppError::Duplicate`] when the slot is taken or an
    /// exclusive booking already exists for the user.
    async fn insert_booking(&self, new: NewBooking) -> Result<Booking, AppError>;

    /// Conditional update with the same uniqueness guarantees as insert.
    async fn update_booking(&self, id: Uuid, patch: BookingPatch) -> Result<Option<Booking>, AppError>;

    async fn delete_booking(&self, id: Uuid) -> Result<bool, AppError>;

    /// Returns the number of bookings removed.
    async fn delete_bookings_for_dentist(&self, dentist_id: Uuid) -> Result<u64, AppError>;
}
