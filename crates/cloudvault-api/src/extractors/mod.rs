//! Custom Axum extractors.

pub mod auth;
pub mod share_session;

pub use auth::AuthUser;
pub use share_session::{SHARE_SESSION_COOKIE, ShareSession};
