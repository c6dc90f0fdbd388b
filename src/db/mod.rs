//! Data access layer for Moviebase accounts.
//!
//! The auth flows only ever see the [`UserStore`] trait; the Postgres
//! implementation lives in `operations`.

pub mod models;
pub mod operations;

pub use models::{AuthUser, User};
pub use operations::{PgUserStore, UserStore};
