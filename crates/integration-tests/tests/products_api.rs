//! Integration tests for catalog routes.

use axum::http::StatusCode;
use serde_json::json;

use proshop_integration_tests::TestApp;

#[tokio::test]
async fn empty_catalog_lists_as_an_empty_page() {
    let app = TestApp::spawn().await;

    let response = app.get("/api/products", None).await;

    assert_eq!(response.status, StatusCode::OK);
    assert_eq!(response.body["products"], json!([]));
    assert_eq!(response.body["page"], 1);
    assert_eq!(response.body["pages"], 0);
}

#[tokio::test]
async fn catalog_pages_hold_eight_products() {
    let app = TestApp::spawn().await;
    for i in 1..=9 {
        app.insert_product(&format!("Product {i}"), 10.0, 5).await;
    }

    let first = app.get("/api/products", None).await;
    assert_eq!(first.status, StatusCode::OK);
    assert_eq!(first.body["products"].as_array().map(Vec::len), Some(8));
    assert_eq!(first.body["page"], 1);
    assert_eq!(first.body["pages"], 2);

    let second = app.get("/api/products?pageNumber=2", None).await;
    assert_eq!(second.body["products"].as_array().map(Vec::len), Some(1));
    assert_eq!(second.body["page"], 2);
}

#[tokio::test]
async fn keyword_filters_by_name() {
    let app = TestApp::spawn().await;
    app.insert_product("Airpods Wireless Bluetooth Headphones", 89.99, 10)
        .await;
    app.insert_product("Sony Playstation 4 Pro", 399.99, 11).await;

    let response = app.get("/api/products?keyword=airpods", None).await;

    assert_eq!(response.status, StatusCode::OK);
    let products = response.body["products"].as_array().expect("array");
    assert_eq!(products.len(), 1);
    assert_eq!(
        products[0]["name"],
        "Airpods Wireless Bluetooth Headphones"
    );
}

#[tokio::test]
async fn product_detail_includes_reviews() {
    let app = TestApp::spawn().await;
    let id = app.insert_product("Airpods", 89.99, 10).await;

    let response = app.get(&format!("/api/products/{id}"), None).await;

    assert_eq!(response.status, StatusCode::OK);
    assert_eq!(response.body["name"], "Airpods");
    assert_eq!(response.body["price"], 89.99);
    assert_eq!(response.body["reviews"], json!([]));
}

#[tokio::test]
async fn unknown_and_malformed_product_ids_are_not_found() {
    let app = TestApp::spawn().await;

    let unknown = app.get("/api/products/9999", None).await;
    assert_eq!(unknown.status, StatusCode::NOT_FOUND);
    assert_eq!(unknown.message(), "Product not found");

    let malformed = app.get("/api/products/abc", None).await;
    assert_eq!(malformed.status, StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn catalog_writes_are_admin_only() {
    let app = TestApp::spawn().await;
    let user = app.register("John Doe", "john@example.com").await;

    let create = app.request("POST", "/api/products", Some(&user), None).await;
    assert_eq!(create.status, StatusCode::FORBIDDEN);

    let id = app.insert_product("Airpods", 89.99, 10).await;
    let update = app
        .request(
            "PUT",
            &format!("/api/products/{id}"),
            Some(&user),
            Some(json!({ "price": 1.0 })),
        )
        .await;
    assert_eq!(update.status, StatusCode::FORBIDDEN);
}

#[tokio::test]
async fn admin_creates_a_placeholder_then_edits_it() {
    let app = TestApp::spawn().await;
    let admin = app.register_admin("Admin", "admin@example.com").await;

    let create = app
        .request("POST", "/api/products", Some(&admin), None)
        .await;
    assert_eq!(create.status, StatusCode::CREATED);
    assert_eq!(create.body["name"], "Sample name");
    let id = create.body["id"].as_i64().expect("id");

    let update = app
        .request(
            "PUT",
            &format!("/api/products/{id}"),
            Some(&admin),
            Some(json!({
                "name": "Airpods Wireless Bluetooth Headphones",
                "price": 89.99,
                "countInStock": 10,
            })),
        )
        .await;
    assert_eq!(update.status, StatusCode::OK);
    assert_eq!(update.body["name"], "Airpods Wireless Bluetooth Headphones");
    assert_eq!(update.body["price"], 89.99);
    assert_eq!(update.body["countInStock"], 10);
}

#[tokio::test]
async fn product_update_rejects_negative_values() {
    let app = TestApp::spawn().await;
    let admin = app.register_admin("Admin", "admin@example.com").await;
    let id = app.insert_product("Airpods", 89.99, 10).await;

    let negative_price = app
        .request(
            "PUT",
            &format!("/api/products/{id}"),
            Some(&admin),
            Some(json!({ "price": -1.0 })),
        )
        .await;
    assert_eq!(negative_price.status, StatusCode::BAD_REQUEST);

    let negative_stock = app
        .request(
            "PUT",
            &format!("/api/products/{id}"),
            Some(&admin),
            Some(json!({ "countInStock": -1 })),
        )
        .await;
    assert_eq!(negative_stock.status, StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn reviews_update_the_rating_aggregate() {
    let app = TestApp::spawn().await;
    let id = app.insert_product("Airpods", 89.99, 10).await;
    let alice = app.register("Alice", "alice@example.com").await;
    let bob = app.register("Bob", "bob@example.com").await;

    let first = app
        .request(
            "POST",
            &format!("/api/products/{id}/reviews"),
            Some(&alice),
            Some(json!({ "rating": 5, "comment": "Great sound" })),
        )
        .await;
    assert_eq!(first.status, StatusCode::CREATED);
    assert_eq!(first.message(), "Review added");

    let second = app
        .request(
            "POST",
            &format!("/api/products/{id}/reviews"),
            Some(&bob),
            Some(json!({ "rating": 2, "comment": "Battery died fast" })),
        )
        .await;
    assert_eq!(second.status, StatusCode::CREATED);

    let detail = app.get(&format!("/api/products/{id}"), None).await;
    assert_eq!(detail.body["numReviews"], 2);
    assert_eq!(detail.body["rating"], 3.5);
    assert_eq!(detail.body["reviews"].as_array().map(Vec::len), Some(2));
}

#[tokio::test]
async fn one_review_per_user_per_product() {
    let app = TestApp::spawn().await;
    let id = app.insert_product("Airpods", 89.99, 10).await;
    let alice = app.register("Alice", "alice@example.com").await;

    app.request(
        "POST",
        &format!("/api/products/{id}/reviews"),
        Some(&alice),
        Some(json!({ "rating": 5, "comment": "Great" })),
    )
    .await;

    let again = app
        .request(
            "POST",
            &format!("/api/products/{id}/reviews"),
            Some(&alice),
            Some(json!({ "rating": 1, "comment": "Changed my mind" })),
        )
        .await;

    assert_eq!(again.status, StatusCode::BAD_REQUEST);
    assert_eq!(again.message(), "Product already reviewed");
}

#[tokio::test]
async fn reviews_validate_rating_and_session() {
    let app = TestApp::spawn().await;
    let id = app.insert_product("Airpods", 89.99, 10).await;
    let alice = app.register("Alice", "alice@example.com").await;

    let out_of_range = app
        .request(
            "POST",
            &format!("/api/products/{id}/reviews"),
            Some(&alice),
            Some(json!({ "rating": 6, "comment": "!" })),
        )
        .await;
    assert_eq!(out_of_range.status, StatusCode::BAD_REQUEST);

    let anonymous = app
        .request(
            "POST",
            &format!("/api/products/{id}/reviews"),
            None,
            Some(json!({ "rating": 5, "comment": "!" })),
        )
        .await;
    assert_eq!(anonymous.status, StatusCode::UNAUTHORIZED);
}
