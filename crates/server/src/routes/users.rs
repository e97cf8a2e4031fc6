//! User account and session routes.

use axum::{
    Json, Router,
    extract::{Path, State},
    http::StatusCode,
    response::IntoResponse,
    routing::{get, post},
};
use axum_extra::extract::CookieJar;
use serde::{Deserialize, Serialize};
use serde_json::json;

use proshop_core::{Email, UserId};

use crate::db::users::{UserPatch, UserRepository};
use crate::error::{AppError, Result};
use crate::middleware::{AdminUser, CurrentUser, expired_session_cookie, session_cookie};
use crate::models::User;
use crate::services::auth::{AuthService, ProfileUpdate, token};
use crate::state::AppState;

pub fn routes() -> Router<AppState> {
    Router::new()
        .route("/", post(register).get(list))
        .route("/auth", post(login))
        .route("/logout", post(logout))
        .route("/profile", get(get_profile).put(update_profile))
        .route("/{id}", get(get_user).put(update_user).delete(delete_user))
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct RegisterRequest {
    name: String,
    email: String,
    password: String,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct LoginRequest {
    email: String,
    password: String,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct UpdateProfileRequest {
    name: Option<String>,
    email: Option<String>,
    password: Option<String>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct UpdateUserRequest {
    name: Option<String>,
    email: Option<String>,
    is_admin: Option<bool>,
}

/// Account shape returned to clients. The password hash never leaves the
/// repository, so this is just the public fields.
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct UserResponse {
    id: UserId,
    name: String,
    email: String,
    is_admin: bool,
}

impl From<User> for UserResponse {
    fn from(user: User) -> Self {
        Self {
            id: user.id,
            name: user.name,
            email: user.email.into_inner(),
            is_admin: user.is_admin,
        }
    }
}

/// `POST /api/users` - register a new account and open a session.
async fn register(
    State(state): State<AppState>,
    jar: CookieJar,
    Json(body): Json<RegisterRequest>,
) -> Result<impl IntoResponse> {
    if body.name.trim().is_empty() {
        return Err(AppError::Validation {
            field: "name",
            message: "name must not be empty".to_owned(),
        });
    }

    let user = AuthService::new(state.pool())
        .register(body.name.trim(), &body.email, &body.password)
        .await?;

    let token = token::issue(user.id, &state.config().jwt_secret)?;
    let jar = jar.add(session_cookie(token, state.config().cookie_secure()));

    Ok((StatusCode::CREATED, jar, Json(UserResponse::from(user))))
}

/// `POST /api/users/auth` - authenticate and open a session.
async fn login(
    State(state): State<AppState>,
    jar: CookieJar,
    Json(body): Json<LoginRequest>,
) -> Result<impl IntoResponse> {
    let user = AuthService::new(state.pool())
        .login(&body.email, &body.password)
        .await?;

    let token = token::issue(user.id, &state.config().jwt_secret)?;
    let jar = jar.add(session_cookie(token, state.config().cookie_secure()));

    Ok((jar, Json(UserResponse::from(user))))
}

/// `POST /api/users/logout` - clear the session cookie.
///
/// Deliberately public: logging out with no session is a no-op, not an
/// error.
async fn logout(State(state): State<AppState>, jar: CookieJar) -> impl IntoResponse {
    let jar = jar.add(expired_session_cookie(state.config().cookie_secure()));
    (jar, Json(json!({ "message": "Logged out successfully" })))
}

/// `GET /api/users/profile` - the authenticated user's own account.
async fn get_profile(CurrentUser(user): CurrentUser) -> Json<UserResponse> {
    Json(UserResponse::from(user))
}

/// `PUT /api/users/profile` - update the authenticated user's own account.
async fn update_profile(
    State(state): State<AppState>,
    CurrentUser(user): CurrentUser,
    Json(body): Json<UpdateProfileRequest>,
) -> Result<Json<UserResponse>> {
    let updated = AuthService::new(state.pool())
        .update_profile(
            &user,
            ProfileUpdate {
                name: body.name,
                email: body.email,
                password: body.password,
            },
        )
        .await?;

    Ok(Json(UserResponse::from(updated)))
}

/// `GET /api/users` - list all accounts (admin).
async fn list(State(state): State<AppState>, _: AdminUser) -> Result<Json<Vec<UserResponse>>> {
    let users = UserRepository::new(state.pool()).list().await?;
    Ok(Json(users.into_iter().map(UserResponse::from).collect()))
}

/// `GET /api/users/{id}` - one account (admin).
async fn get_user(
    State(state): State<AppState>,
    _: AdminUser,
    Path(id): Path<String>,
) -> Result<Json<UserResponse>> {
    let id = UserId::new(super::parse_id(&id)?);

    let user = UserRepository::new(state.pool())
        .get_by_id(id)
        .await?
        .ok_or_else(|| AppError::NotFound("User not found".to_owned()))?;

    Ok(Json(UserResponse::from(user)))
}

/// `PUT /api/users/{id}` - update an account, including its admin flag
/// (admin).
async fn update_user(
    State(state): State<AppState>,
    _: AdminUser,
    Path(id): Path<String>,
    Json(body): Json<UpdateUserRequest>,
) -> Result<Json<UserResponse>> {
    let id = UserId::new(super::parse_id(&id)?);

    let email = body
        .email
        .as_deref()
        .map(Email::parse)
        .transpose()
        .map_err(|e| AppError::Validation {
            field: "email",
            message: e.to_string(),
        })?;

    let patch = UserPatch {
        name: body.name,
        email,
        password_hash: None,
        is_admin: body.is_admin,
    };

    let user = UserRepository::new(state.pool())
        .update(id, patch)
        .await?
        .ok_or_else(|| AppError::NotFound("User not found".to_owned()))?;

    Ok(Json(UserResponse::from(user)))
}

/// `DELETE /api/users/{id}` - delete an account (admin).
///
/// Admin accounts cannot be deleted, not even by themselves.
async fn delete_user(
    State(state): State<AppState>,
    _: AdminUser,
    Path(id): Path<String>,
) -> Result<Json<serde_json::Value>> {
    let id = UserId::new(super::parse_id(&id)?);
    let repo = UserRepository::new(state.pool());

    let target = repo
        .get_by_id(id)
        .await?
        .ok_or_else(|| AppError::NotFound("User not found".to_owned()))?;

    if target.is_admin {
        return Err(AppError::BadRequest("Cannot delete admin user".to_owned()));
    }

    repo.delete(id).await?;
    Ok(Json(json!({ "message": "User removed" })))
}
