//! Session token signing and verification.
//!
//! The session token is a JWT bound to the user's id with a fixed 24-hour
//! validity window, signed with HMAC-SHA256 using the configured secret.
//! Invalidation is stateless: there is no revocation list, only expiry.

use chrono::{Duration, Utc};
use jsonwebtoken::{DecodingKey, EncodingKey, Header, Validation, decode, encode};
use secrecy::{ExposeSecret, SecretString};
use serde::{Deserialize, Serialize};

use proshop_core::UserId;

use super::AuthError;

/// Session validity window.
pub const TOKEN_TTL_HOURS: i64 = 24;

/// JWT claims embedded in session tokens.
#[derive(Debug, Serialize, Deserialize)]
struct Claims {
    /// Subject - user id.
    sub: i64,
    /// Issued at (unix timestamp).
    iat: i64,
    /// Expiry (unix timestamp).
    exp: i64,
}

/// Sign a session token for a user.
///
/// # Errors
///
/// Returns `AuthError::TokenIssue` if signing fails.
pub fn issue(user_id: UserId, secret: &SecretString) -> Result<String, AuthError> {
    let now = Utc::now();
    let claims = Claims {
        sub: user_id.as_i64(),
        iat: now.timestamp(),
        exp: (now + Duration::hours(TOKEN_TTL_HOURS)).timestamp(),
    };

    encode(
        &Header::default(),
        &claims,
        &EncodingKey::from_secret(secret.expose_secret().as_bytes()),
    )
    .map_err(|_| AuthError::TokenIssue)
}

/// Verify a session token and extract the user id it is bound to.
///
/// # Errors
///
/// Returns `AuthError::InvalidToken` if the token is expired, tampered,
/// or unparseable. The caller maps an *absent* token to
/// `AuthError::NoToken` before reaching this function.
pub fn verify(token: &str, secret: &SecretString) -> Result<UserId, AuthError> {
    let data = decode::<Claims>(
        token,
        &DecodingKey::from_secret(secret.expose_secret().as_bytes()),
        &Validation::default(),
    )
    .map_err(|_| AuthError::InvalidToken)?;

    Ok(UserId::new(data.claims.sub))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn secret() -> SecretString {
        SecretString::from("0123456789abcdef0123456789abcdef")
    }

    #[test]
    fn issued_tokens_verify_to_the_same_user() {
        let token = issue(UserId::new(42), &secret()).unwrap();
        assert_eq!(verify(&token, &secret()).unwrap(), UserId::new(42));
    }

    #[test]
    fn tampered_tokens_are_rejected() {
        let mut token = issue(UserId::new(1), &secret()).unwrap();
        token.push('x');
        assert!(matches!(
            verify(&token, &secret()),
            Err(AuthError::InvalidToken)
        ));
    }

    #[test]
    fn tokens_signed_with_a_different_secret_are_rejected() {
        let other = SecretString::from("fedcba9876543210fedcba9876543210");
        let token = issue(UserId::new(1), &other).unwrap();
        assert!(matches!(
            verify(&token, &secret()),
            Err(AuthError::InvalidToken)
        ));
    }

    #[test]
    fn expired_tokens_are_rejected() {
        // Hand-roll claims two days in the past, beyond default leeway.
        let now = Utc::now();
        let claims = Claims {
            sub: 1,
            iat: (now - Duration::hours(48)).timestamp(),
            exp: (now - Duration::hours(24)).timestamp(),
        };
        let token = encode(
            &Header::default(),
            &claims,
            &EncodingKey::from_secret(secret().expose_secret().as_bytes()),
        )
        .unwrap();

        assert!(matches!(
            verify(&token, &secret()),
            Err(AuthError::InvalidToken)
        ));
    }
}
