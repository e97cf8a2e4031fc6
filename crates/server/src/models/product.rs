//! Product domain types.

use chrono::{DateTime, Utc};
use serde::Serialize;

use proshop_core::{ProductId, ReviewId, UserId};

/// A catalog product.
///
/// `rating` is the arithmetic mean of the product's review ratings and
/// `num_reviews` their count; both are maintained by the repository in the
/// same transaction as every review insert.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Product {
    pub id: ProductId,
    /// Admin who created the product.
    pub user_id: UserId,
    pub name: String,
    pub image: String,
    pub description: String,
    pub brand: String,
    pub category: String,
    pub price: f64,
    pub count_in_stock: i64,
    pub rating: f64,
    pub num_reviews: i64,
    /// Populated on detail reads; empty in list responses.
    pub reviews: Vec<Review>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// A product review.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Review {
    pub id: ReviewId,
    pub user_id: UserId,
    /// Author display name, snapshotted at review time.
    pub name: String,
    /// 1 to 5 stars.
    pub rating: i64,
    pub comment: String,
    pub created_at: DateTime<Utc>,
}
