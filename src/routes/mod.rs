//! Route tables and the assembled application router.

mod bookings;
mod common;
mod dentists;

pub use bookings::booking_routes;
pub use common::common_routes;
pub use dentists::dentist_routes;

use axum::http::{header, StatusCode};
use axum::middleware;
use axum::response::{IntoResponse, Response};
use axum::Router;
use tower_http::limit::RequestBodyLimitLayer;
use tower_http::trace::{DefaultMakeSpan, DefaultOnResponse, TraceLayer};
use tracing::Level;

use crate::error::AppError;
use crate::state::AppState;

/// Every route, with request tracing and a request body size limit.
pub fn build_router(state: AppState, body_limit: usize) -> Router {
    Router::new()
        .merge(common_routes(state.clone()))
        .merge(dentist_routes(state.clone()))
        .merge(booking_routes(state))
        .layer(RequestBodyLimitLayer::new(body_limit))
        .layer(middleware::map_response(envelope_body_limit))
        .layer(
            TraceLayer::new_for_http()
                .make_span_with(DefaultMakeSpan::new().level(Level::INFO))
                .on_response(DefaultOnResponse::new().level(Level::INFO)),
        )
}

/// The limit layer answers oversized bodies in plain text; rewrap them in the error envelope.
async fn envelope_body_limit(resp: Response) -> Response {
    let is_json = resp
        .headers()
        .get(header::CONTENT_TYPE)
        .and_then(|v| v.to_str().ok())
        .is_some_and(|v| v.starts_with("application/json"));
    if resp.status() == StatusCode::PAYLOAD_TOO_LARGE && !is_json {
        return AppError::PayloadTooLarge.into_response();
    }
    resp
}
