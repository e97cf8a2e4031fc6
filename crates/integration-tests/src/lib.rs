//! Integration test harness for ProShop.
//!
//! Drives the full router in process against an in-memory `SQLite`
//! database, so tests are hermetic and need no running server. Each
//! [`TestApp`] owns its own database; tests cannot observe each other.

use std::net::{IpAddr, Ipv4Addr};
use std::str::FromStr;

use axum::Router;
use axum::body::Body;
use axum::http::{Request, StatusCode, header};
use http_body_util::BodyExt;
use secrecy::SecretString;
use serde_json::Value;
use sqlx::SqlitePool;
use sqlx::sqlite::{SqliteConnectOptions, SqlitePoolOptions};
use tower::ServiceExt;

use proshop_server::config::{Environment, ServerConfig};
use proshop_server::state::AppState;
use proshop_server::{app, db};

/// An in-process application instance backed by a fresh database.
pub struct TestApp {
    router: Router,
    pool: SqlitePool,
}

/// A collected response: status, session cookie (if set), and JSON body.
pub struct TestResponse {
    pub status: StatusCode,
    pub set_cookie: Option<String>,
    pub body: Value,
}

impl TestResponse {
    /// The `message` field of the JSON body, for error assertions.
    #[must_use]
    pub fn message(&self) -> &str {
        self.body["message"].as_str().unwrap_or_default()
    }

    /// The `jwt=<value>` pair from the `Set-Cookie` header, for replay in
    /// a `Cookie` header.
    #[must_use]
    pub fn session_cookie(&self) -> String {
        let raw = self
            .set_cookie
            .as_deref()
            .expect("response set no session cookie");
        raw.split(';')
            .next()
            .expect("empty Set-Cookie header")
            .to_owned()
    }
}

impl TestApp {
    /// Start a fresh application over a new in-memory database.
    ///
    /// # Panics
    ///
    /// Panics if the database cannot be created or migrated.
    pub async fn spawn() -> Self {
        // A single connection with no recycling: every connection to
        // `sqlite::memory:` is its own database, so the pool must never
        // open a second one or drop the first. Foreign keys are enforced
        // exactly as in the production pool.
        let options = SqliteConnectOptions::from_str("sqlite::memory:")
            .expect("invalid connection string")
            .foreign_keys(true);

        let pool = SqlitePoolOptions::new()
            .max_connections(1)
            .idle_timeout(None)
            .max_lifetime(None)
            .connect_with(options)
            .await
            .expect("failed to open in-memory database");

        db::MIGRATOR
            .run(&pool)
            .await
            .expect("failed to run migrations");

        let config = ServerConfig {
            database_url: SecretString::from("sqlite::memory:"),
            host: IpAddr::V4(Ipv4Addr::LOCALHOST),
            port: 0,
            jwt_secret: SecretString::from("integration-test-signing-secret-0123456789"),
            environment: Environment::Test,
            sentry_dsn: None,
        };

        let state = AppState::new(config, pool.clone());

        Self {
            router: app(state),
            pool,
        }
    }

    /// Direct database handle for test setup and assertions.
    #[must_use]
    pub const fn pool(&self) -> &SqlitePool {
        &self.pool
    }

    /// Send a request with optional session cookie and JSON body.
    ///
    /// # Panics
    ///
    /// Panics if the request cannot be built or the response body is not
    /// readable.
    pub async fn request(
        &self,
        method: &str,
        uri: &str,
        cookie: Option<&str>,
        body: Option<Value>,
    ) -> TestResponse {
        let mut builder = Request::builder().method(method).uri(uri);

        if let Some(cookie) = cookie {
            builder = builder.header(header::COOKIE, cookie);
        }

        let request = match body {
            Some(json) => builder
                .header(header::CONTENT_TYPE, "application/json")
                .body(Body::from(json.to_string())),
            None => builder.body(Body::empty()),
        }
        .expect("failed to build request");

        let response = self
            .router
            .clone()
            .oneshot(request)
            .await
            .expect("router error");

        let status = response.status();
        let set_cookie = response
            .headers()
            .get(header::SET_COOKIE)
            .map(|v| v.to_str().expect("non-utf8 Set-Cookie").to_owned());

        let bytes = response
            .into_body()
            .collect()
            .await
            .expect("failed to read body")
            .to_bytes();
        let body = if bytes.is_empty() {
            Value::Null
        } else {
            serde_json::from_slice(&bytes).unwrap_or(Value::Null)
        };

        TestResponse {
            status,
            set_cookie,
            body,
        }
    }

    /// Shorthand for a GET request.
    pub async fn get(&self, uri: &str, cookie: Option<&str>) -> TestResponse {
        self.request("GET", uri, cookie, None).await
    }

    /// Register an account and return its session cookie.
    ///
    /// # Panics
    ///
    /// Panics if registration does not succeed.
    pub async fn register(&self, name: &str, email: &str) -> String {
        let response = self
            .request(
                "POST",
                "/api/users",
                None,
                Some(serde_json::json!({
                    "name": name,
                    "email": email,
                    "password": "123456",
                })),
            )
            .await;

        assert_eq!(response.status, StatusCode::CREATED, "registration failed");
        response.session_cookie()
    }

    /// Register an account, promote it to admin, and return a session
    /// cookie opened *after* the promotion.
    ///
    /// # Panics
    ///
    /// Panics if any step fails.
    pub async fn register_admin(&self, name: &str, email: &str) -> String {
        self.register(name, email).await;

        sqlx::query("UPDATE users SET is_admin = TRUE WHERE email = ?1")
            .bind(email)
            .execute(&self.pool)
            .await
            .expect("failed to promote user");

        let response = self
            .request(
                "POST",
                "/api/users/auth",
                None,
                Some(serde_json::json!({
                    "email": email,
                    "password": "123456",
                })),
            )
            .await;

        assert_eq!(response.status, StatusCode::OK, "admin login failed");
        response.session_cookie()
    }

    /// Insert a product directly and return its id.
    ///
    /// # Panics
    ///
    /// Panics if the insert fails.
    pub async fn insert_product(&self, name: &str, price: f64, count_in_stock: i64) -> i64 {
        // Products need an owner; reuse an existing user or make one.
        let owner: Option<i64> = sqlx::query_scalar("SELECT id FROM users ORDER BY id LIMIT 1")
            .fetch_optional(&self.pool)
            .await
            .expect("failed to look up owner");

        let owner = match owner {
            Some(id) => id,
            None => {
                self.register("Catalog Owner", "catalog-owner@example.com")
                    .await;
                sqlx::query_scalar("SELECT id FROM users ORDER BY id LIMIT 1")
                    .fetch_one(&self.pool)
                    .await
                    .expect("owner vanished")
            }
        };

        sqlx::query_scalar(
            "INSERT INTO products
                 (user_id, name, image, description, brand, category,
                  price, count_in_stock, rating, num_reviews, created_at, updated_at)
             VALUES (?1, ?2, '/images/sample.jpg', 'desc', 'brand', 'category',
                     ?3, ?4, 0, 0, datetime('now'), datetime('now'))
             RETURNING id",
        )
        .bind(owner)
        .bind(name)
        .bind(price)
        .bind(count_in_stock)
        .fetch_one(&self.pool)
        .await
        .expect("failed to insert product")
    }
}
