//! Authentication service.
//!
//! Verifies credentials against the credential store and manages password
//! hashing. Passwords are hashed with Argon2id and a per-record random
//! salt, so re-hashing the same plaintext yields a different stored hash
//! while both verify against the original. Session tokens live in
//! [`token`].

mod error;
pub mod token;

pub use error::AuthError;

use argon2::{
    Argon2,
    password_hash::{PasswordHash, PasswordHasher, PasswordVerifier, SaltString, rand_core::OsRng},
};
use sqlx::SqlitePool;

use proshop_core::Email;

use crate::db::RepositoryError;
use crate::db::users::{UserPatch, UserRepository};
use crate::models::User;

/// Minimum password length.
const MIN_PASSWORD_LENGTH: usize = 6;

/// Optional-overwrite profile update. A present `password` is re-hashed
/// with a fresh salt; an absent one leaves the stored hash untouched.
#[derive(Debug, Default)]
pub struct ProfileUpdate {
    pub name: Option<String>,
    pub email: Option<String>,
    pub password: Option<String>,
}

/// Authentication service.
pub struct AuthService<'a> {
    users: UserRepository<'a>,
}

impl<'a> AuthService<'a> {
    /// Create a new authentication service.
    #[must_use]
    pub const fn new(pool: &'a SqlitePool) -> Self {
        Self {
            users: UserRepository::new(pool),
        }
    }

    /// Register a new user with name, email, and password.
    ///
    /// # Errors
    ///
    /// Returns `AuthError::InvalidEmail` if the email format is invalid,
    /// `WeakPassword` if the password is too short, or
    /// `UserAlreadyExists` if the email is already registered.
    pub async fn register(
        &self,
        name: &str,
        email: &str,
        password: &str,
    ) -> Result<User, AuthError> {
        let email = Email::parse(email)?;
        validate_password(password)?;

        let password_hash = hash_password(password)?;

        let user = self
            .users
            .create(name, &email, &password_hash, false)
            .await
            .map_err(|e| match e {
                RepositoryError::Conflict(_) => AuthError::UserAlreadyExists,
                other => AuthError::Repository(other),
            })?;

        Ok(user)
    }

    /// Authenticate with email and password.
    ///
    /// # Errors
    ///
    /// Returns `AuthError::InvalidCredentials` whether the email is
    /// unknown or the password is wrong; the caller cannot tell which.
    pub async fn login(&self, email: &str, password: &str) -> Result<User, AuthError> {
        let Ok(email) = Email::parse(email) else {
            // A structurally invalid email can never match a stored user.
            return Err(AuthError::InvalidCredentials);
        };

        let (user, password_hash) = self
            .users
            .get_with_password(&email)
            .await?
            .ok_or(AuthError::InvalidCredentials)?;

        verify_password(password, &password_hash)?;

        Ok(user)
    }

    /// Apply a profile update for the given user.
    ///
    /// # Errors
    ///
    /// Returns `AuthError::InvalidEmail` / `WeakPassword` on validation
    /// failure, `UserAlreadyExists` if the new email is taken, or
    /// `InvalidCredentials` if the user row has vanished.
    pub async fn update_profile(
        &self,
        user: &User,
        update: ProfileUpdate,
    ) -> Result<User, AuthError> {
        let email = update.email.as_deref().map(Email::parse).transpose()?;

        let password_hash = match update.password.as_deref() {
            Some(password) => {
                validate_password(password)?;
                Some(hash_password(password)?)
            }
            None => None,
        };

        let patch = UserPatch {
            name: update.name,
            email,
            password_hash,
            is_admin: None,
        };

        let updated = self
            .users
            .update(user.id, patch)
            .await
            .map_err(|e| match e {
                RepositoryError::Conflict(_) => AuthError::UserAlreadyExists,
                other => AuthError::Repository(other),
            })?
            .ok_or(AuthError::InvalidCredentials)?;

        Ok(updated)
    }
}

/// Validate password meets requirements.
fn validate_password(password: &str) -> Result<(), AuthError> {
    if password.len() < MIN_PASSWORD_LENGTH {
        return Err(AuthError::WeakPassword(format!(
            "password must be at least {MIN_PASSWORD_LENGTH} characters"
        )));
    }

    Ok(())
}

/// Hash a password with Argon2id and a fresh random salt.
///
/// # Errors
///
/// Returns `AuthError::PasswordHash` if hashing fails.
pub fn hash_password(password: &str) -> Result<String, AuthError> {
    let salt = SaltString::generate(&mut OsRng);
    let argon2 = Argon2::default();

    argon2
        .hash_password(password.as_bytes(), &salt)
        .map(|hash| hash.to_string())
        .map_err(|_| AuthError::PasswordHash)
}

/// Verify a password against a stored hash.
fn verify_password(password: &str, hash: &str) -> Result<(), AuthError> {
    let parsed_hash = PasswordHash::new(hash).map_err(|_| AuthError::InvalidCredentials)?;
    let argon2 = Argon2::default();

    argon2
        .verify_password(password.as_bytes(), &parsed_hash)
        .map_err(|_| AuthError::InvalidCredentials)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn fresh_salts_produce_distinct_hashes_that_both_verify() {
        let first = hash_password("123456").unwrap();
        let second = hash_password("123456").unwrap();

        assert_ne!(first, second);
        assert!(verify_password("123456", &first).is_ok());
        assert!(verify_password("123456", &second).is_ok());
    }

    #[test]
    fn wrong_password_fails_verification() {
        let hash = hash_password("123456").unwrap();
        assert!(matches!(
            verify_password("654321", &hash),
            Err(AuthError::InvalidCredentials)
        ));
    }

    #[test]
    fn short_passwords_are_rejected() {
        assert!(matches!(
            validate_password("12345"),
            Err(AuthError::WeakPassword(_))
        ));
        assert!(validate_password("123456").is_ok());
    }
}
