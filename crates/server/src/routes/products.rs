//! Catalog routes.
//!
//! Reads are public; catalog writes are admin-only. Reviews are the one
//! write any signed-in user may make, limited to one per product.

use axum::{
    Json, Router,
    extract::{Path, Query, State},
    http::StatusCode,
    response::IntoResponse,
    routing::{get, post},
};
use serde::{Deserialize, Serialize};
use serde_json::json;

use proshop_core::ProductId;

use crate::db::products::{ProductPatch, ProductRepository};
use crate::error::{AppError, Result};
use crate::middleware::{AdminUser, CurrentUser};
use crate::models::Product;
use crate::state::AppState;

/// Products per catalog page.
const PAGE_SIZE: i64 = 8;

pub fn routes() -> Router<AppState> {
    Router::new()
        .route("/", get(list).post(create))
        .route("/{id}", get(get_product).put(update))
        .route("/{id}/reviews", post(create_review))
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct ListQuery {
    keyword: Option<String>,
    page_number: Option<i64>,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct ProductPageResponse {
    products: Vec<Product>,
    page: i64,
    pages: i64,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct UpdateProductRequest {
    name: Option<String>,
    image: Option<String>,
    description: Option<String>,
    brand: Option<String>,
    category: Option<String>,
    price: Option<f64>,
    count_in_stock: Option<i64>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct CreateReviewRequest {
    rating: i64,
    comment: String,
}

/// `GET /api/products?keyword=&pageNumber=` - one page of the catalog.
async fn list(
    State(state): State<AppState>,
    Query(query): Query<ListQuery>,
) -> Result<Json<ProductPageResponse>> {
    let page = ProductRepository::new(state.pool())
        .list(
            query.keyword.as_deref(),
            query.page_number.unwrap_or(1),
            PAGE_SIZE,
        )
        .await?;

    Ok(Json(ProductPageResponse {
        products: page.products,
        page: page.page,
        pages: page.pages,
    }))
}

/// `GET /api/products/{id}` - one product with its reviews.
async fn get_product(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Result<Json<Product>> {
    let id = ProductId::new(super::parse_id(&id)?);

    let product = ProductRepository::new(state.pool())
        .get(id)
        .await?
        .ok_or_else(|| AppError::NotFound("Product not found".to_owned()))?;

    Ok(Json(product))
}

/// `POST /api/products` - create a placeholder product to edit (admin).
async fn create(
    State(state): State<AppState>,
    AdminUser(admin): AdminUser,
) -> Result<impl IntoResponse> {
    let product = ProductRepository::new(state.pool())
        .create_sample(admin.id)
        .await?;

    Ok((StatusCode::CREATED, Json(product)))
}

/// `PUT /api/products/{id}` - update a product (admin).
async fn update(
    State(state): State<AppState>,
    _: AdminUser,
    Path(id): Path<String>,
    Json(body): Json<UpdateProductRequest>,
) -> Result<Json<Product>> {
    let id = ProductId::new(super::parse_id(&id)?);

    if body.price.is_some_and(|p| p < 0.0 || !p.is_finite()) {
        return Err(AppError::Validation {
            field: "price",
            message: "price must be a non-negative number".to_owned(),
        });
    }
    if body.count_in_stock.is_some_and(|c| c < 0) {
        return Err(AppError::Validation {
            field: "countInStock",
            message: "countInStock must not be negative".to_owned(),
        });
    }

    let patch = ProductPatch {
        name: body.name,
        image: body.image,
        description: body.description,
        brand: body.brand,
        category: body.category,
        price: body.price,
        count_in_stock: body.count_in_stock,
    };

    let product = ProductRepository::new(state.pool())
        .update(id, patch)
        .await?
        .ok_or_else(|| AppError::NotFound("Product not found".to_owned()))?;

    Ok(Json(product))
}

/// `POST /api/products/{id}/reviews` - review a product, once per user.
async fn create_review(
    State(state): State<AppState>,
    CurrentUser(user): CurrentUser,
    Path(id): Path<String>,
    Json(body): Json<CreateReviewRequest>,
) -> Result<impl IntoResponse> {
    let id = ProductId::new(super::parse_id(&id)?);

    if !(1..=5).contains(&body.rating) {
        return Err(AppError::Validation {
            field: "rating",
            message: "rating must be between 1 and 5".to_owned(),
        });
    }
    if body.comment.trim().is_empty() {
        return Err(AppError::Validation {
            field: "comment",
            message: "comment must not be empty".to_owned(),
        });
    }

    ProductRepository::new(state.pool())
        .add_review(id, user.id, &user.name, body.rating, body.comment.trim())
        .await?
        .ok_or_else(|| AppError::NotFound("Product not found".to_owned()))?;

    Ok((StatusCode::CREATED, Json(json!({ "message": "Review added" }))))
}
