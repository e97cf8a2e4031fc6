//! Domain models.
//!
//! These types represent validated domain objects, separate from database
//! row types and from the request/response contracts at the HTTP boundary.

pub mod order;
pub mod product;
pub mod user;

pub use order::{Order, OrderItem, PaymentResult};
pub use product::{Product, Review};
pub use user::User;
