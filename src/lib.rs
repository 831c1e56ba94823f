//! Dental bookings: REST backend for dentists and their appointment bookings.

pub mod config;
pub mod error;
pub mod extractors;
pub mod handlers;
pub mod migration;
pub mod model;
pub mod query;
pub mod response;
pub mod routes;
pub mod service;
pub mod sql;
pub mod state;
pub mod store;

pub use config::{AppConfig, StoreKind};
pub use error::{AppError, ConfigError};
pub use migration::apply_migrations;
pub use routes::build_router;
pub use state::AppState;
pub use store::{ensure_database_exists, EntityStore, MemoryStore, PgStore};
