//! Order domain types.

use chrono::{DateTime, Utc};
use serde::Serialize;

use proshop_core::cart::ShippingAddress;
use proshop_core::{OrderId, ProductId, UserId};

/// A placed order.
///
/// Line items and the price breakdown are frozen at creation time; later
/// catalog changes never alter a historical order. The only mutations are
/// the one-directional unpaid -> paid and undelivered -> delivered
/// transitions.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Order {
    pub id: OrderId,
    pub user_id: UserId,
    pub order_items: Vec<OrderItem>,
    pub shipping_address: ShippingAddress,
    pub payment_method: String,
    pub items_price: f64,
    pub shipping_price: f64,
    pub tax_price: f64,
    pub total_price: f64,
    pub is_paid: bool,
    pub paid_at: Option<DateTime<Utc>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub payment_result: Option<PaymentResult>,
    pub is_delivered: bool,
    pub delivered_at: Option<DateTime<Utc>>,
    pub created_at: DateTime<Utc>,
}

/// A purchased line item: a snapshot of the product at checkout time.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct OrderItem {
    pub product_id: ProductId,
    pub name: String,
    pub image: String,
    pub price: f64,
    pub qty: i64,
}

/// Payment-provider confirmation payload stored on the paid transition.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct PaymentResult {
    pub id: String,
    pub status: String,
    pub email_address: String,
}
