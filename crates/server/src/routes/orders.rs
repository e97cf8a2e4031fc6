//! Order routes.
//!
//! Order creation re-prices every line item from the catalog and derives
//! the price breakdown server-side, so client-submitted prices are never
//! trusted. Orders are readable by their owner or an admin; the paid and
//! delivered transitions are one-directional.

use axum::{
    Json, Router,
    extract::{Path, State},
    http::StatusCode,
    response::IntoResponse,
    routing::{get, post, put},
};
use rust_decimal::Decimal;
use rust_decimal::prelude::ToPrimitive;
use serde::Deserialize;

use proshop_core::cart::{CartItem, ShippingAddress, price_breakdown};
use proshop_core::{OrderId, ProductId};

use crate::db::orders::{OrderItemDraft, OrderPrices, OrderRepository};
use crate::db::products::ProductRepository;
use crate::error::{AppError, Result};
use crate::middleware::{AdminUser, CurrentUser};
use crate::models::{Order, PaymentResult, User};
use crate::state::AppState;

pub fn routes() -> Router<AppState> {
    Router::new()
        .route("/", post(create).get(list))
        .route("/myorders", get(my_orders))
        .route("/{id}", get(get_order))
        .route("/{id}/pay", put(pay))
        .route("/{id}/deliver", put(deliver))
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct CreateOrderRequest {
    order_items: Vec<OrderItemRequest>,
    shipping_address: ShippingAddress,
    payment_method: String,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct OrderItemRequest {
    product_id: i64,
    qty: i64,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct PaymentRequest {
    id: String,
    status: String,
    email_address: String,
}

/// `POST /api/orders` - place an order from the submitted cart.
async fn create(
    State(state): State<AppState>,
    CurrentUser(user): CurrentUser,
    Json(body): Json<CreateOrderRequest>,
) -> Result<impl IntoResponse> {
    if body.order_items.is_empty() {
        return Err(AppError::BadRequest("No order items".to_owned()));
    }

    let products = ProductRepository::new(state.pool());

    // Re-price every line from the catalog; the request only names
    // products and quantities.
    let mut cart_items = Vec::with_capacity(body.order_items.len());
    let mut drafts = Vec::with_capacity(body.order_items.len());
    for item in &body.order_items {
        let qty = u32::try_from(item.qty)
            .ok()
            .filter(|q| *q >= 1)
            .ok_or_else(|| AppError::Validation {
                field: "qty",
                message: "qty must be a positive integer".to_owned(),
            })?;

        let product = products
            .get(ProductId::new(item.product_id))
            .await?
            .ok_or_else(|| {
                AppError::NotFound(format!("Product not found: {}", item.product_id))
            })?;

        let price = Decimal::try_from(product.price).map_err(|_| {
            AppError::Internal(format!("unrepresentable price on product {}", product.id))
        })?;

        cart_items.push(CartItem {
            id: product.id,
            name: product.name.clone(),
            image: product.image.clone(),
            price,
            count_in_stock: product.count_in_stock,
            qty,
        });
        drafts.push(OrderItemDraft {
            product_id: product.id,
            name: product.name,
            image: product.image,
            price: product.price,
            qty: i64::from(qty),
        });
    }

    let breakdown = price_breakdown(&cart_items);
    let prices = OrderPrices {
        items_price: to_f64(breakdown.items_price)?,
        shipping_price: to_f64(breakdown.shipping_price)?,
        tax_price: to_f64(breakdown.tax_price)?,
        total_price: to_f64(breakdown.total_price)?,
    };

    let order = OrderRepository::new(state.pool())
        .create(
            user.id,
            &drafts,
            &body.shipping_address,
            &body.payment_method,
            prices,
        )
        .await?;

    Ok((StatusCode::CREATED, Json(order)))
}

/// `GET /api/orders/myorders` - the authenticated user's orders.
async fn my_orders(
    State(state): State<AppState>,
    CurrentUser(user): CurrentUser,
) -> Result<Json<Vec<Order>>> {
    let orders = OrderRepository::new(state.pool())
        .list_by_user(user.id)
        .await?;

    Ok(Json(orders))
}

/// `GET /api/orders/{id}` - one order, visible to its owner or an admin.
async fn get_order(
    State(state): State<AppState>,
    CurrentUser(user): CurrentUser,
    Path(id): Path<String>,
) -> Result<Json<Order>> {
    let id = OrderId::new(super::parse_id(&id)?);

    let order = fetch_visible(&state, &user, id).await?;
    Ok(Json(order))
}

/// `PUT /api/orders/{id}/pay` - record a payment confirmation.
async fn pay(
    State(state): State<AppState>,
    CurrentUser(user): CurrentUser,
    Path(id): Path<String>,
    Json(body): Json<PaymentRequest>,
) -> Result<Json<Order>> {
    let id = OrderId::new(super::parse_id(&id)?);

    // Visibility check first; a stranger probing an order id gets the
    // same 404 a missing order would produce.
    fetch_visible(&state, &user, id).await?;

    let payment = PaymentResult {
        id: body.id,
        status: body.status,
        email_address: body.email_address,
    };

    let order = OrderRepository::new(state.pool())
        .mark_paid(id, &payment)
        .await?
        .ok_or_else(|| AppError::NotFound("Order not found".to_owned()))?;

    Ok(Json(order))
}

/// `PUT /api/orders/{id}/deliver` - mark an order delivered (admin).
async fn deliver(
    State(state): State<AppState>,
    _: AdminUser,
    Path(id): Path<String>,
) -> Result<Json<Order>> {
    let id = OrderId::new(super::parse_id(&id)?);

    let order = OrderRepository::new(state.pool())
        .mark_delivered(id)
        .await?
        .ok_or_else(|| AppError::NotFound("Order not found".to_owned()))?;

    Ok(Json(order))
}

/// `GET /api/orders` - all orders (admin).
async fn list(State(state): State<AppState>, _: AdminUser) -> Result<Json<Vec<Order>>> {
    let orders = OrderRepository::new(state.pool()).list_all().await?;
    Ok(Json(orders))
}

/// Load an order if the user is its owner or an admin.
///
/// Someone else's order reads as missing, so order ids cannot be probed
/// for existence.
async fn fetch_visible(state: &AppState, user: &User, id: OrderId) -> Result<Order> {
    let order = OrderRepository::new(state.pool())
        .get(id)
        .await?
        .ok_or_else(|| AppError::NotFound("Order not found".to_owned()))?;

    if order.user_id != user.id && !user.is_admin {
        return Err(AppError::NotFound("Order not found".to_owned()));
    }

    Ok(order)
}

fn to_f64(value: Decimal) -> Result<f64> {
    value
        .to_f64()
        .ok_or_else(|| AppError::Internal(format!("unrepresentable price: {value}")))
}
