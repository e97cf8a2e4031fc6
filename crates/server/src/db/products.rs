//! Product repository.
//!
//! Catalog reads are public; writes are admin-gated at the route layer.
//! The review aggregate (`rating`, `num_reviews`) is recomputed inside the
//! same transaction as every review insert, so the mean-of-reviews
//! invariant holds at any read.

use chrono::{DateTime, Utc};
use sqlx::SqlitePool;

use proshop_core::{ProductId, ReviewId, UserId};

use super::RepositoryError;
use crate::models::{Product, Review};

/// Optional-overwrite fields for a product update.
#[derive(Debug, Default)]
pub struct ProductPatch {
    pub name: Option<String>,
    pub image: Option<String>,
    pub description: Option<String>,
    pub brand: Option<String>,
    pub category: Option<String>,
    pub price: Option<f64>,
    pub count_in_stock: Option<i64>,
}

/// One page of catalog results.
#[derive(Debug)]
pub struct ProductPage {
    pub products: Vec<Product>,
    pub page: i64,
    pub pages: i64,
}

#[derive(sqlx::FromRow)]
struct ProductRow {
    id: i64,
    user_id: i64,
    name: String,
    image: String,
    description: String,
    brand: String,
    category: String,
    price: f64,
    count_in_stock: i64,
    rating: f64,
    num_reviews: i64,
    created_at: DateTime<Utc>,
    updated_at: DateTime<Utc>,
}

impl ProductRow {
    fn into_product(self, reviews: Vec<Review>) -> Product {
        Product {
            id: ProductId::new(self.id),
            user_id: UserId::new(self.user_id),
            name: self.name,
            image: self.image,
            description: self.description,
            brand: self.brand,
            category: self.category,
            price: self.price,
            count_in_stock: self.count_in_stock,
            rating: self.rating,
            num_reviews: self.num_reviews,
            reviews,
            created_at: self.created_at,
            updated_at: self.updated_at,
        }
    }
}

#[derive(sqlx::FromRow)]
struct ReviewRow {
    id: i64,
    user_id: i64,
    name: String,
    rating: i64,
    comment: String,
    created_at: DateTime<Utc>,
}

impl ReviewRow {
    fn into_review(self) -> Review {
        Review {
            id: ReviewId::new(self.id),
            user_id: UserId::new(self.user_id),
            name: self.name,
            rating: self.rating,
            comment: self.comment,
            created_at: self.created_at,
        }
    }
}

/// Total pages for `total` rows at `page_size` rows per page, rounding up.
const fn page_count(total: i64, page_size: i64) -> i64 {
    (total + page_size - 1) / page_size
}

/// Repository for product database operations.
pub struct ProductRepository<'a> {
    pool: &'a SqlitePool,
}

impl<'a> ProductRepository<'a> {
    /// Create a new product repository.
    #[must_use]
    pub const fn new(pool: &'a SqlitePool) -> Self {
        Self { pool }
    }

    /// List one page of products, optionally filtered by a case-insensitive
    /// name keyword.
    ///
    /// `page` is 1-based; `pages` in the result is the total page count for
    /// the same filter.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if a query fails.
    pub async fn list(
        &self,
        keyword: Option<&str>,
        page: i64,
        page_size: i64,
    ) -> Result<ProductPage, RepositoryError> {
        let page = page.max(1);
        let pattern = keyword
            .filter(|k| !k.trim().is_empty())
            .map(|k| format!("%{}%", k.trim()));

        let total: i64 = sqlx::query_scalar(
            "SELECT COUNT(*) FROM products WHERE (?1 IS NULL OR name LIKE ?1)",
        )
        .bind(pattern.as_deref())
        .fetch_one(self.pool)
        .await?;

        let rows = sqlx::query_as::<_, ProductRow>(
            "SELECT * FROM products
             WHERE (?1 IS NULL OR name LIKE ?1)
             ORDER BY id
             LIMIT ?2 OFFSET ?3",
        )
        .bind(pattern.as_deref())
        .bind(page_size)
        .bind((page - 1) * page_size)
        .fetch_all(self.pool)
        .await?;

        let products = rows
            .into_iter()
            .map(|r| r.into_product(Vec::new()))
            .collect();

        Ok(ProductPage {
            products,
            page,
            pages: page_count(total, page_size),
        })
    }

    /// Get a product by id, with its reviews.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if a query fails.
    pub async fn get(&self, id: ProductId) -> Result<Option<Product>, RepositoryError> {
        let row = sqlx::query_as::<_, ProductRow>("SELECT * FROM products WHERE id = ?1")
            .bind(id)
            .fetch_optional(self.pool)
            .await?;

        let Some(row) = row else {
            return Ok(None);
        };

        let reviews = sqlx::query_as::<_, ReviewRow>(
            "SELECT id, user_id, name, rating, comment, created_at
             FROM reviews WHERE product_id = ?1 ORDER BY id",
        )
        .bind(id)
        .fetch_all(self.pool)
        .await?;

        Ok(Some(
            row.into_product(reviews.into_iter().map(ReviewRow::into_review).collect()),
        ))
    }

    /// Create a product with placeholder defaults, owned by `user_id`.
    ///
    /// The admin then fills in the real fields via [`Self::update`].
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the insert fails.
    pub async fn create_sample(&self, user_id: UserId) -> Result<Product, RepositoryError> {
        let now = Utc::now();
        let row = sqlx::query_as::<_, ProductRow>(
            "INSERT INTO products
                 (user_id, name, image, description, brand, category,
                  price, count_in_stock, rating, num_reviews, created_at, updated_at)
             VALUES (?1, 'Sample name', '/images/sample.jpg', 'Sample description',
                     'Sample brand', 'Sample category', 0, 0, 0, 0, ?2, ?2)
             RETURNING *",
        )
        .bind(user_id)
        .bind(now)
        .fetch_one(self.pool)
        .await?;

        Ok(row.into_product(Vec::new()))
    }

    /// Update a product in place, leaving `None` fields untouched.
    ///
    /// Returns `None` if no product with the given id exists.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the update fails.
    pub async fn update(
        &self,
        id: ProductId,
        patch: ProductPatch,
    ) -> Result<Option<Product>, RepositoryError> {
        let row = sqlx::query_as::<_, ProductRow>(
            "UPDATE products SET
                 name = COALESCE(?1, name),
                 image = COALESCE(?2, image),
                 description = COALESCE(?3, description),
                 brand = COALESCE(?4, brand),
                 category = COALESCE(?5, category),
                 price = COALESCE(?6, price),
                 count_in_stock = COALESCE(?7, count_in_stock),
                 updated_at = ?8
             WHERE id = ?9
             RETURNING *",
        )
        .bind(patch.name)
        .bind(patch.image)
        .bind(patch.description)
        .bind(patch.brand)
        .bind(patch.category)
        .bind(patch.price)
        .bind(patch.count_in_stock)
        .bind(Utc::now())
        .bind(id)
        .fetch_optional(self.pool)
        .await?;

        Ok(row.map(|r| r.into_product(Vec::new())))
    }

    /// Add a review and recompute the product's rating aggregate.
    ///
    /// Returns `None` if no product with the given id exists.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Conflict` if the user has already
    /// reviewed this product, or `Database` for other failures.
    pub async fn add_review(
        &self,
        product_id: ProductId,
        user_id: UserId,
        author_name: &str,
        rating: i64,
        comment: &str,
    ) -> Result<Option<()>, RepositoryError> {
        let mut tx = self.pool.begin().await?;

        let exists: Option<i64> = sqlx::query_scalar("SELECT id FROM products WHERE id = ?1")
            .bind(product_id)
            .fetch_optional(&mut *tx)
            .await?;
        if exists.is_none() {
            return Ok(None);
        }

        sqlx::query(
            "INSERT INTO reviews (product_id, user_id, name, rating, comment, created_at)
             VALUES (?1, ?2, ?3, ?4, ?5, ?6)",
        )
        .bind(product_id)
        .bind(user_id)
        .bind(author_name)
        .bind(rating)
        .bind(comment)
        .bind(Utc::now())
        .execute(&mut *tx)
        .await
        .map_err(|e| {
            if let sqlx::Error::Database(ref db_err) = e
                && db_err.is_unique_violation()
            {
                return RepositoryError::Conflict("product already reviewed".to_owned());
            }
            RepositoryError::Database(e)
        })?;

        // Keep rating = mean(review ratings) and num_reviews = count in the
        // same transaction as the insert.
        sqlx::query(
            "UPDATE products SET
                 rating = (SELECT AVG(rating) FROM reviews WHERE product_id = ?1),
                 num_reviews = (SELECT COUNT(*) FROM reviews WHERE product_id = ?1),
                 updated_at = ?2
             WHERE id = ?1",
        )
        .bind(product_id)
        .bind(Utc::now())
        .execute(&mut *tx)
        .await?;

        tx.commit().await?;
        Ok(Some(()))
    }
}
