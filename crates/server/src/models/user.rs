//! User domain types.

use chrono::{DateTime, Utc};

use proshop_core::{Email, UserId};

/// A registered user (domain type).
///
/// The password hash never leaves the repository layer; this type is safe
/// to hand to response mapping.
#[derive(Debug, Clone)]
pub struct User {
    /// Unique user id.
    pub id: UserId,
    /// Display name.
    pub name: String,
    /// Email address (unique across the store).
    pub email: Email,
    /// Whether the user may access admin-gated operations.
    pub is_admin: bool,
    /// When the user was created.
    pub created_at: DateTime<Utc>,
    /// When the user was last updated.
    pub updated_at: DateTime<Utc>,
}
