//! Business operations over an [`EntityStore`](crate::store::EntityStore).

mod bookings;
mod dentists;
mod validation;
pub use bookings::BookingService;
pub use dentists::{DentistPage, DentistService};
pub use validation::{body_to_map, RequestValidator};

use uuid::Uuid;

/// Path ids that are not UUIDs can never match a record.
pub(crate) fn parse_id(raw: &str) -> Option<Uuid> {
    Uuid::parse_str(raw.trim()).ok()
}
