//! Request middleware and extractors.

pub mod auth;

pub use auth::{AdminUser, CurrentUser, SESSION_COOKIE, expired_session_cookie, session_cookie};
