//! Booking routes.

use crate::handlers::{delete_booking, get_booking, list_bookings, update_booking};
use crate::state::AppState;
use axum::{routing::get, Router};

pub fn booking_routes(state: AppState) -> Router {
    Router::new()
        .route("/bookings", get(list_bookings))
        .route(
            "/bookings/:id",
            get(get_booking).put(update_booking).delete(delete_booking),
        )
        .with_state(state)
}
