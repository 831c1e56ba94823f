//! Request extractors.

mod user;
pub use user::{AdminUser, CurrentUser, USER_ID_HEADER, USER_ROLE_HEADER};
