//! Integration tests for account and session routes.

use axum::http::StatusCode;
use serde_json::json;

use proshop_integration_tests::TestApp;

#[tokio::test]
async fn register_creates_account_and_opens_session() {
    let app = TestApp::spawn().await;

    let response = app
        .request(
            "POST",
            "/api/users",
            None,
            Some(json!({
                "name": "John Doe",
                "email": "john@example.com",
                "password": "123456",
            })),
        )
        .await;

    assert_eq!(response.status, StatusCode::CREATED);
    assert_eq!(response.body["name"], "John Doe");
    assert_eq!(response.body["email"], "john@example.com");
    assert_eq!(response.body["isAdmin"], false);

    let cookie = response.set_cookie.as_deref().expect("no session cookie");
    assert!(cookie.starts_with("jwt="));
    assert!(cookie.contains("HttpOnly"));
    assert!(cookie.contains("SameSite=Strict"));
    // Not production, so the cookie must work over plain HTTP.
    assert!(!cookie.contains("Secure"));
}

#[tokio::test]
async fn register_rejects_duplicate_email() {
    let app = TestApp::spawn().await;
    app.register("John Doe", "john@example.com").await;

    let response = app
        .request(
            "POST",
            "/api/users",
            None,
            Some(json!({
                "name": "Impostor",
                "email": "john@example.com",
                "password": "123456",
            })),
        )
        .await;

    assert_eq!(response.status, StatusCode::BAD_REQUEST);
    assert_eq!(response.message(), "User already exists");
}

#[tokio::test]
async fn register_rejects_invalid_input() {
    let app = TestApp::spawn().await;

    let bad_email = app
        .request(
            "POST",
            "/api/users",
            None,
            Some(json!({ "name": "A", "email": "not-an-email", "password": "123456" })),
        )
        .await;
    assert_eq!(bad_email.status, StatusCode::BAD_REQUEST);

    let short_password = app
        .request(
            "POST",
            "/api/users",
            None,
            Some(json!({ "name": "A", "email": "a@example.com", "password": "12345" })),
        )
        .await;
    assert_eq!(short_password.status, StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn login_succeeds_with_correct_credentials() {
    let app = TestApp::spawn().await;
    app.register("John Doe", "john@example.com").await;

    let response = app
        .request(
            "POST",
            "/api/users/auth",
            None,
            Some(json!({ "email": "john@example.com", "password": "123456" })),
        )
        .await;

    assert_eq!(response.status, StatusCode::OK);
    assert_eq!(response.body["email"], "john@example.com");
    assert!(response.set_cookie.is_some());
}

#[tokio::test]
async fn login_failures_are_indistinguishable() {
    let app = TestApp::spawn().await;
    app.register("John Doe", "john@example.com").await;

    let wrong_password = app
        .request(
            "POST",
            "/api/users/auth",
            None,
            Some(json!({ "email": "john@example.com", "password": "wrong!" })),
        )
        .await;
    let unknown_email = app
        .request(
            "POST",
            "/api/users/auth",
            None,
            Some(json!({ "email": "nobody@example.com", "password": "123456" })),
        )
        .await;

    assert_eq!(wrong_password.status, StatusCode::UNAUTHORIZED);
    assert_eq!(unknown_email.status, StatusCode::UNAUTHORIZED);
    assert_eq!(wrong_password.message(), "Invalid email or password");
    assert_eq!(unknown_email.message(), wrong_password.message());
}

#[tokio::test]
async fn profile_requires_a_session() {
    let app = TestApp::spawn().await;

    let no_cookie = app.get("/api/users/profile", None).await;
    assert_eq!(no_cookie.status, StatusCode::UNAUTHORIZED);
    assert_eq!(no_cookie.message(), "Not authorized, no token");

    let bad_cookie = app.get("/api/users/profile", Some("jwt=garbage")).await;
    assert_eq!(bad_cookie.status, StatusCode::UNAUTHORIZED);
    assert_eq!(bad_cookie.message(), "Not authorized, token failed");
}

#[tokio::test]
async fn profile_returns_the_session_owner() {
    let app = TestApp::spawn().await;
    let cookie = app.register("John Doe", "john@example.com").await;

    let response = app.get("/api/users/profile", Some(&cookie)).await;

    assert_eq!(response.status, StatusCode::OK);
    assert_eq!(response.body["email"], "john@example.com");
}

#[tokio::test]
async fn profile_update_changes_password_only_when_given() {
    let app = TestApp::spawn().await;
    let cookie = app.register("John Doe", "john@example.com").await;

    // Name-only update leaves the password usable.
    let rename = app
        .request(
            "PUT",
            "/api/users/profile",
            Some(&cookie),
            Some(json!({ "name": "Johnny" })),
        )
        .await;
    assert_eq!(rename.status, StatusCode::OK);
    assert_eq!(rename.body["name"], "Johnny");

    let old_password = app
        .request(
            "POST",
            "/api/users/auth",
            None,
            Some(json!({ "email": "john@example.com", "password": "123456" })),
        )
        .await;
    assert_eq!(old_password.status, StatusCode::OK);

    // Password update invalidates the old one.
    let change = app
        .request(
            "PUT",
            "/api/users/profile",
            Some(&cookie),
            Some(json!({ "password": "654321" })),
        )
        .await;
    assert_eq!(change.status, StatusCode::OK);

    let old_again = app
        .request(
            "POST",
            "/api/users/auth",
            None,
            Some(json!({ "email": "john@example.com", "password": "123456" })),
        )
        .await;
    assert_eq!(old_again.status, StatusCode::UNAUTHORIZED);

    let new_password = app
        .request(
            "POST",
            "/api/users/auth",
            None,
            Some(json!({ "email": "john@example.com", "password": "654321" })),
        )
        .await;
    assert_eq!(new_password.status, StatusCode::OK);
}

#[tokio::test]
async fn logout_expires_the_session_cookie() {
    let app = TestApp::spawn().await;

    let response = app.request("POST", "/api/users/logout", None, None).await;

    assert_eq!(response.status, StatusCode::OK);
    assert_eq!(response.message(), "Logged out successfully");

    let cookie = response.set_cookie.as_deref().expect("no clearing cookie");
    assert!(cookie.starts_with("jwt=;"));
    assert!(cookie.contains("1970"));
}

#[tokio::test]
async fn user_admin_routes_require_the_admin_flag() {
    let app = TestApp::spawn().await;
    let cookie = app.register("John Doe", "john@example.com").await;

    let response = app.get("/api/users", Some(&cookie)).await;

    assert_eq!(response.status, StatusCode::FORBIDDEN);
    assert_eq!(response.message(), "Not authorized as an admin");
}

#[tokio::test]
async fn admin_can_list_and_update_users() {
    let app = TestApp::spawn().await;
    let admin = app.register_admin("Admin", "admin@example.com").await;
    app.register("John Doe", "john@example.com").await;

    let list = app.get("/api/users", Some(&admin)).await;
    assert_eq!(list.status, StatusCode::OK);
    let users = list.body.as_array().expect("expected an array");
    assert_eq!(users.len(), 2);

    let john_id = users
        .iter()
        .find(|u| u["email"] == "john@example.com")
        .expect("john missing")["id"]
        .as_i64()
        .expect("id not a number");

    let promote = app
        .request(
            "PUT",
            &format!("/api/users/{john_id}"),
            Some(&admin),
            Some(json!({ "isAdmin": true })),
        )
        .await;
    assert_eq!(promote.status, StatusCode::OK);
    assert_eq!(promote.body["isAdmin"], true);
}

#[tokio::test]
async fn admin_cannot_delete_an_admin_account() {
    let app = TestApp::spawn().await;
    let admin = app.register_admin("Admin", "admin@example.com").await;
    app.register("John Doe", "john@example.com").await;

    let list = app.get("/api/users", Some(&admin)).await;
    let users = list.body.as_array().expect("expected an array");
    let id_of = |email: &str| {
        users
            .iter()
            .find(|u| u["email"] == email)
            .expect("user missing")["id"]
            .as_i64()
            .expect("id not a number")
    };

    let delete_admin = app
        .request(
            "DELETE",
            &format!("/api/users/{}", id_of("admin@example.com")),
            Some(&admin),
            None,
        )
        .await;
    assert_eq!(delete_admin.status, StatusCode::BAD_REQUEST);
    assert_eq!(delete_admin.message(), "Cannot delete admin user");

    let delete_john = app
        .request(
            "DELETE",
            &format!("/api/users/{}", id_of("john@example.com")),
            Some(&admin),
            None,
        )
        .await;
    assert_eq!(delete_john.status, StatusCode::OK);
    assert_eq!(delete_john.message(), "User removed");
}

#[tokio::test]
async fn deleting_a_buyer_cascades_their_orders_and_reviews() {
    let app = TestApp::spawn().await;
    let admin = app.register_admin("Admin", "admin@example.com").await;
    let product = app.insert_product("Airpods", 89.99, 10).await;
    let buyer = app.register("John Doe", "john@example.com").await;

    // The buyer leaves a trail: one order and one review.
    let order = app
        .request(
            "POST",
            "/api/orders",
            Some(&buyer),
            Some(json!({
                "orderItems": [{ "productId": product, "qty": 1 }],
                "shippingAddress": {
                    "address": "1 Main St", "city": "Springfield",
                    "postalCode": "12345", "country": "USA",
                },
                "paymentMethod": "PayPal",
            })),
        )
        .await;
    assert_eq!(order.status, StatusCode::CREATED);

    let review = app
        .request(
            "POST",
            &format!("/api/products/{product}/reviews"),
            Some(&buyer),
            Some(json!({ "rating": 4, "comment": "Solid" })),
        )
        .await;
    assert_eq!(review.status, StatusCode::CREATED);

    let list = app.get("/api/users", Some(&admin)).await;
    let buyer_id = list.body.as_array().expect("array")
        .iter()
        .find(|u| u["email"] == "john@example.com")
        .expect("buyer missing")["id"]
        .as_i64()
        .expect("id");

    let delete = app
        .request(
            "DELETE",
            &format!("/api/users/{buyer_id}"),
            Some(&admin),
            None,
        )
        .await;
    assert_eq!(delete.status, StatusCode::OK);
    assert_eq!(delete.message(), "User removed");

    // The order went with the account and the rating aggregate was reset.
    let orders = app.get("/api/orders", Some(&admin)).await;
    assert_eq!(orders.body.as_array().map(Vec::len), Some(0));

    let detail = app.get(&format!("/api/products/{product}"), None).await;
    assert_eq!(detail.body["numReviews"], 0);
    assert_eq!(detail.body["rating"], 0.0);
    assert_eq!(detail.body["reviews"].as_array().map(Vec::len), Some(0));
}

#[tokio::test]
async fn malformed_user_ids_read_as_not_found() {
    let app = TestApp::spawn().await;
    let admin = app.register_admin("Admin", "admin@example.com").await;

    let response = app.get("/api/users/not-a-number", Some(&admin)).await;
    assert_eq!(response.status, StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn deleted_account_invalidates_its_outstanding_sessions() {
    let app = TestApp::spawn().await;
    let admin = app.register_admin("Admin", "admin@example.com").await;
    let john = app.register("John Doe", "john@example.com").await;

    let list = app.get("/api/users", Some(&admin)).await;
    let john_id = list.body.as_array().expect("array")
        .iter()
        .find(|u| u["email"] == "john@example.com")
        .expect("john missing")["id"]
        .as_i64()
        .expect("id");

    app.request(
        "DELETE",
        &format!("/api/users/{john_id}"),
        Some(&admin),
        None,
    )
    .await;

    // John's still-valid token now refers to nobody.
    let response = app.get("/api/users/profile", Some(&john)).await;
    assert_eq!(response.status, StatusCode::UNAUTHORIZED);
    assert_eq!(response.message(), "Not authorized, token failed");
}
