//! HTTP route handlers.
//!
//! Route table:
//!
//! | Method | Path                          | Access        |
//! |--------|-------------------------------|---------------|
//! | GET    | /health                       | public        |
//! | GET    | /health/ready                 | public        |
//! | POST   | /api/users                    | public        |
//! | POST   | /api/users/auth               | public        |
//! | POST   | /api/users/logout             | public        |
//! | GET    | /api/users/profile            | session       |
//! | PUT    | /api/users/profile            | session       |
//! | GET    | /api/users                    | admin         |
//! | GET    | /api/users/{id}               | admin         |
//! | PUT    | /api/users/{id}               | admin         |
//! | DELETE | /api/users/{id}               | admin         |
//! | GET    | /api/products                 | public        |
//! | POST   | /api/products                 | admin         |
//! | GET    | /api/products/{id}            | public        |
//! | PUT    | /api/products/{id}            | admin         |
//! | POST   | /api/products/{id}/reviews    | session       |
//! | POST   | /api/orders                   | session       |
//! | GET    | /api/orders                   | admin         |
//! | GET    | /api/orders/myorders          | session       |
//! | GET    | /api/orders/{id}              | owner / admin |
//! | PUT    | /api/orders/{id}/pay          | owner / admin |
//! | PUT    | /api/orders/{id}/deliver      | admin         |

pub mod orders;
pub mod products;
pub mod users;

use axum::{Json, Router, extract::State, http::StatusCode, routing::get};
use serde_json::json;
use tower_http::trace::TraceLayer;

use crate::error::AppError;
use crate::state::AppState;

/// Build the application router.
pub fn app(state: AppState) -> Router {
    Router::new()
        .route("/health", get(health))
        .route("/health/ready", get(readiness))
        .nest("/api/users", users::routes())
        .nest("/api/products", products::routes())
        .nest("/api/orders", orders::routes())
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}

/// Liveness probe.
async fn health() -> Json<serde_json::Value> {
    Json(json!({ "status": "ok" }))
}

/// Readiness probe: checks database connectivity.
async fn readiness(State(state): State<AppState>) -> Result<Json<serde_json::Value>, StatusCode> {
    sqlx::query_scalar::<_, i64>("SELECT 1")
        .fetch_one(state.pool())
        .await
        .map_err(|err| {
            tracing::error!(error = %err, "Readiness check failed");
            StatusCode::SERVICE_UNAVAILABLE
        })?;

    Ok(Json(json!({ "status": "ready" })))
}

/// Parse a path segment as a numeric id.
///
/// Malformed ids behave like ids that reference nothing, so probing with
/// garbage yields the same 404 as probing with an unused number.
fn parse_id(raw: &str) -> Result<i64, AppError> {
    raw.parse()
        .map_err(|_| AppError::NotFound(format!("Invalid id: {raw}")))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn numeric_ids_parse() {
        assert_eq!(parse_id("42").unwrap(), 42);
    }

    #[test]
    fn malformed_ids_read_as_not_found() {
        assert!(matches!(
            parse_id("not-a-number"),
            Err(AppError::NotFound(_))
        ));
        assert!(matches!(parse_id(""), Err(AppError::NotFound(_))));
    }
}
