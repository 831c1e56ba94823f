//! Process configuration from environment variables (optionally seeded from `.env`).

pub mod loader;
pub mod types;

pub use loader::*;
pub use types::*;
