//! List-query pipeline: filter, projection, sort, and pagination for dentist listings.

mod builder;
pub mod params;
pub use builder::*;
pub use params::*;
