//! Order repository.
//!
//! Orders are insert-once: the line items and price breakdown written at
//! creation are never recomputed. The only updates are the paid and
//! delivered transitions, each guarded so it can happen at most once.

use chrono::{DateTime, Utc};
use sqlx::SqlitePool;

use proshop_core::cart::ShippingAddress;
use proshop_core::{OrderId, ProductId, UserId};

use super::RepositoryError;
use crate::models::{Order, OrderItem, PaymentResult};

/// A line-item snapshot to be written at order creation.
#[derive(Debug, Clone)]
pub struct OrderItemDraft {
    pub product_id: ProductId,
    pub name: String,
    pub image: String,
    pub price: f64,
    pub qty: i64,
}

/// The price breakdown to freeze onto a new order.
#[derive(Debug, Clone, Copy)]
pub struct OrderPrices {
    pub items_price: f64,
    pub shipping_price: f64,
    pub tax_price: f64,
    pub total_price: f64,
}

#[derive(sqlx::FromRow)]
struct OrderRow {
    id: i64,
    user_id: i64,
    address: String,
    city: String,
    postal_code: String,
    country: String,
    payment_method: String,
    items_price: f64,
    shipping_price: f64,
    tax_price: f64,
    total_price: f64,
    is_paid: bool,
    paid_at: Option<DateTime<Utc>>,
    payment_id: Option<String>,
    payment_status: Option<String>,
    payment_email: Option<String>,
    is_delivered: bool,
    delivered_at: Option<DateTime<Utc>>,
    created_at: DateTime<Utc>,
}

impl OrderRow {
    fn into_order(self, order_items: Vec<OrderItem>) -> Order {
        let payment_result = match (self.payment_id, self.payment_status, self.payment_email) {
            (Some(id), Some(status), Some(email_address)) => Some(PaymentResult {
                id,
                status,
                email_address,
            }),
            _ => None,
        };

        Order {
            id: OrderId::new(self.id),
            user_id: UserId::new(self.user_id),
            order_items,
            shipping_address: ShippingAddress {
                address: self.address,
                city: self.city,
                postal_code: self.postal_code,
                country: self.country,
            },
            payment_method: self.payment_method,
            items_price: self.items_price,
            shipping_price: self.shipping_price,
            tax_price: self.tax_price,
            total_price: self.total_price,
            is_paid: self.is_paid,
            paid_at: self.paid_at,
            payment_result,
            is_delivered: self.is_delivered,
            delivered_at: self.delivered_at,
            created_at: self.created_at,
        }
    }
}

#[derive(sqlx::FromRow)]
struct OrderItemRow {
    product_id: i64,
    name: String,
    image: String,
    price: f64,
    qty: i64,
}

/// Repository for order database operations.
pub struct OrderRepository<'a> {
    pool: &'a SqlitePool,
}

impl<'a> OrderRepository<'a> {
    /// Create a new order repository.
    #[must_use]
    pub const fn new(pool: &'a SqlitePool) -> Self {
        Self { pool }
    }

    /// Create an order with its line-item snapshots in one transaction.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if any insert fails.
    pub async fn create(
        &self,
        user_id: UserId,
        items: &[OrderItemDraft],
        shipping: &ShippingAddress,
        payment_method: &str,
        prices: OrderPrices,
    ) -> Result<Order, RepositoryError> {
        let mut tx = self.pool.begin().await?;

        let row = sqlx::query_as::<_, OrderRow>(
            "INSERT INTO orders
                 (user_id, address, city, postal_code, country, payment_method,
                  items_price, shipping_price, tax_price, total_price, created_at)
             VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10, ?11)
             RETURNING *",
        )
        .bind(user_id)
        .bind(&shipping.address)
        .bind(&shipping.city)
        .bind(&shipping.postal_code)
        .bind(&shipping.country)
        .bind(payment_method)
        .bind(prices.items_price)
        .bind(prices.shipping_price)
        .bind(prices.tax_price)
        .bind(prices.total_price)
        .bind(Utc::now())
        .fetch_one(&mut *tx)
        .await?;

        let mut order_items = Vec::with_capacity(items.len());
        for item in items {
            sqlx::query(
                "INSERT INTO order_items (order_id, product_id, name, image, price, qty)
                 VALUES (?1, ?2, ?3, ?4, ?5, ?6)",
            )
            .bind(row.id)
            .bind(item.product_id)
            .bind(&item.name)
            .bind(&item.image)
            .bind(item.price)
            .bind(item.qty)
            .execute(&mut *tx)
            .await?;

            order_items.push(OrderItem {
                product_id: item.product_id,
                name: item.name.clone(),
                image: item.image.clone(),
                price: item.price,
                qty: item.qty,
            });
        }

        tx.commit().await?;
        Ok(row.into_order(order_items))
    }

    /// Get an order by id, with its line items.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if a query fails.
    pub async fn get(&self, id: OrderId) -> Result<Option<Order>, RepositoryError> {
        let row = sqlx::query_as::<_, OrderRow>("SELECT * FROM orders WHERE id = ?1")
            .bind(id)
            .fetch_optional(self.pool)
            .await?;

        let Some(row) = row else {
            return Ok(None);
        };

        let items = self.items_for(&[row.id]).await?;
        Ok(Some(row.into_order(items)))
    }

    /// List a user's orders, oldest first, with line items.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if a query fails.
    pub async fn list_by_user(&self, user_id: UserId) -> Result<Vec<Order>, RepositoryError> {
        let rows =
            sqlx::query_as::<_, OrderRow>("SELECT * FROM orders WHERE user_id = ?1 ORDER BY id")
                .bind(user_id)
                .fetch_all(self.pool)
                .await?;

        self.assemble(rows).await
    }

    /// List all orders, oldest first, with line items.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if a query fails.
    pub async fn list_all(&self) -> Result<Vec<Order>, RepositoryError> {
        let rows = sqlx::query_as::<_, OrderRow>("SELECT * FROM orders ORDER BY id")
            .fetch_all(self.pool)
            .await?;

        self.assemble(rows).await
    }

    /// Transition an order to paid, storing the payment confirmation.
    ///
    /// Returns `None` if the order does not exist.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Conflict` if the order is already paid.
    pub async fn mark_paid(
        &self,
        id: OrderId,
        payment: &PaymentResult,
    ) -> Result<Option<Order>, RepositoryError> {
        let result = sqlx::query(
            "UPDATE orders SET
                 is_paid = TRUE, paid_at = ?1,
                 payment_id = ?2, payment_status = ?3, payment_email = ?4
             WHERE id = ?5 AND is_paid = FALSE",
        )
        .bind(Utc::now())
        .bind(&payment.id)
        .bind(&payment.status)
        .bind(&payment.email_address)
        .bind(id)
        .execute(self.pool)
        .await?;

        if result.rows_affected() == 0 {
            // Either missing or already paid; look again to tell them apart.
            return match self.get(id).await? {
                Some(_) => Err(RepositoryError::Conflict("order already paid".to_owned())),
                None => Ok(None),
            };
        }

        self.get(id).await
    }

    /// Transition an order to delivered.
    ///
    /// Returns `None` if the order does not exist.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Conflict` if the order is already
    /// delivered.
    pub async fn mark_delivered(&self, id: OrderId) -> Result<Option<Order>, RepositoryError> {
        let result = sqlx::query(
            "UPDATE orders SET is_delivered = TRUE, delivered_at = ?1
             WHERE id = ?2 AND is_delivered = FALSE",
        )
        .bind(Utc::now())
        .bind(id)
        .execute(self.pool)
        .await?;

        if result.rows_affected() == 0 {
            return match self.get(id).await? {
                Some(_) => Err(RepositoryError::Conflict(
                    "order already delivered".to_owned(),
                )),
                None => Ok(None),
            };
        }

        self.get(id).await
    }

    async fn items_for(&self, order_ids: &[i64]) -> Result<Vec<OrderItem>, RepositoryError> {
        let mut items = Vec::new();
        for order_id in order_ids {
            let rows = sqlx::query_as::<_, OrderItemRow>(
                "SELECT product_id, name, image, price, qty
                 FROM order_items WHERE order_id = ?1 ORDER BY id",
            )
            .bind(order_id)
            .fetch_all(self.pool)
            .await?;

            items.extend(rows.into_iter().map(|r| OrderItem {
                product_id: ProductId::new(r.product_id),
                name: r.name,
                image: r.image,
                price: r.price,
                qty: r.qty,
            }));
        }
        Ok(items)
    }

    async fn assemble(&self, rows: Vec<OrderRow>) -> Result<Vec<Order>, RepositoryError> {
        let mut orders = Vec::with_capacity(rows.len());
        for row in rows {
            let items = self.items_for(&[row.id]).await?;
            orders.push(row.into_order(items));
        }
        Ok(orders)
    }
}
