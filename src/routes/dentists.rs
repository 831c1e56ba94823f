//! Dentist routes, plus the dentist-scoped booking collection.

use crate::handlers::{
    create_booking, create_dentist, delete_dentist, get_dentist, list_dentist_bookings, list_dentists,
    update_dentist,
};
use crate::state::AppState;
use axum::{routing::get, Router};

pub fn dentist_routes(state: AppState) -> Router {
    Router::new()
        .route("/dentists", get(list_dentists).post(create_dentist))
        .route(
            "/dentists/:id",
            get(get_dentist).put(update_dentist).delete(delete_dentist),
        )
        // Same parameter name as above: sibling captures must agree.
        .route("/dentists/:id/bookings", get(list_dentist_bookings).post(create_booking))
        .with_state(state)
}
