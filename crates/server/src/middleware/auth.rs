//! Session cookie handling and authentication extractors.
//!
//! Sessions ride in an `HttpOnly` cookie named `jwt` rather than an
//! `Authorization` header, so browser clients carry them automatically
//! and scripts cannot read them. [`CurrentUser`] rejects requests
//! without a valid session; [`AdminUser`] additionally requires the
//! admin flag.

use axum::extract::FromRequestParts;
use axum::http::request::Parts;
use axum_extra::extract::cookie::{Cookie, CookieJar, SameSite};

use crate::error::AppError;
use crate::models::User;
use crate::services::auth::{AuthError, token};
use crate::state::AppState;

/// Name of the session cookie.
pub const SESSION_COOKIE: &str = "jwt";

/// Build the session cookie carrying a freshly issued token.
///
/// `Secure` is only set when the server runs in production, so local
/// development over plain HTTP still works.
#[must_use]
pub fn session_cookie(token: String, secure: bool) -> Cookie<'static> {
    Cookie::build((SESSION_COOKIE, token))
        .path("/")
        .http_only(true)
        .same_site(SameSite::Strict)
        .secure(secure)
        .max_age(time::Duration::hours(token::TOKEN_TTL_HOURS))
        .build()
}

/// Build a cookie that clears the session.
///
/// Same attributes as [`session_cookie`] so browsers treat it as the
/// same cookie, but empty and expired at the epoch.
#[must_use]
pub fn expired_session_cookie(secure: bool) -> Cookie<'static> {
    Cookie::build((SESSION_COOKIE, ""))
        .path("/")
        .http_only(true)
        .same_site(SameSite::Strict)
        .secure(secure)
        .expires(time::OffsetDateTime::UNIX_EPOCH)
        .build()
}

/// Extractor for the authenticated user of the current request.
///
/// Rejects with 401 when the session cookie is absent, invalid, or
/// refers to a user that no longer exists.
#[derive(Debug, Clone)]
pub struct CurrentUser(pub User);

impl FromRequestParts<AppState> for CurrentUser {
    type Rejection = AppError;

    async fn from_request_parts(
        parts: &mut Parts,
        state: &AppState,
    ) -> Result<Self, Self::Rejection> {
        let jar = CookieJar::from_headers(&parts.headers);

        let token = jar
            .get(SESSION_COOKIE)
            .map(Cookie::value)
            .ok_or(AuthError::NoToken)?;

        let user_id = token::verify(token, &state.config().jwt_secret)?;

        let user = crate::db::UserRepository::new(state.pool())
            .get_by_id(user_id)
            .await
            .map_err(AuthError::from)?
            // A valid signature over a vanished user means the account
            // was deleted after the token was issued.
            .ok_or(AuthError::InvalidToken)?;

        Ok(Self(user))
    }
}

/// Extractor for admin-only routes. Rejects with 403 when the session
/// is valid but the user is not an admin.
#[derive(Debug, Clone)]
pub struct AdminUser(pub User);

impl FromRequestParts<AppState> for AdminUser {
    type Rejection = AppError;

    async fn from_request_parts(
        parts: &mut Parts,
        state: &AppState,
    ) -> Result<Self, Self::Rejection> {
        let CurrentUser(user) = CurrentUser::from_request_parts(parts, state).await?;

        if !user.is_admin {
            return Err(AppError::Forbidden);
        }

        Ok(Self(user))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn session_cookie_is_http_only_and_strict() {
        let cookie = session_cookie("abc".to_owned(), false);

        assert_eq!(cookie.name(), "jwt");
        assert_eq!(cookie.value(), "abc");
        assert_eq!(cookie.http_only(), Some(true));
        assert_eq!(cookie.same_site(), Some(SameSite::Strict));
        assert_eq!(cookie.path(), Some("/"));
        assert_eq!(cookie.secure(), Some(false));
        assert_eq!(cookie.max_age(), Some(time::Duration::hours(24)));
    }

    #[test]
    fn secure_flag_follows_environment() {
        assert_eq!(session_cookie("abc".to_owned(), true).secure(), Some(true));
    }

    #[test]
    fn expired_cookie_clears_the_session() {
        let cookie = expired_session_cookie(false);

        assert_eq!(cookie.name(), "jwt");
        assert_eq!(cookie.value(), "");
        assert_eq!(
            cookie.expires(),
            Some(time::OffsetDateTime::UNIX_EPOCH.into())
        );
    }
}
