//! Domain service for authentication and account management.
//!
//! Handles registration, login, staff creation and the two-step password
//! reset flow. Capability checks stay at the request boundary; this layer
//! owns uniqueness rules and credential verification.

use thiserror::Error;

use crate::db::User;
use crate::services::notify::ClientInfo;

/// Errors specific to authentication operations.
#[derive(Debug, Error)]
pub enum AuthError {
    /// Deliberately generic: covers unknown username and wrong password
    #[error("Invalid username or password")]
    InvalidCredentials,

    #[error("This username is already taken")]
    UsernameTaken,

    #[error("This email address is already in use")]
    EmailTaken,

    #[error("Invalid or expired password reset link")]
    InvalidToken,

    #[error("Validation failed: {0}")]
    Validation(String),

    #[error("Database error: {0}")]
    Database(String),

    #[error("Internal error: {0}")]
    Internal(String),
}

impl From<sea_orm::DbErr> for AuthError {
    fn from(err: sea_orm::DbErr) -> Self {
        Self::Database(err.to_string())
    }
}

impl From<anyhow::Error> for AuthError {
    fn from(err: anyhow::Error) -> Self {
        Self::Internal(err.to_string())
    }
}

/// Domain service trait for authentication.
#[async_trait::async_trait]
pub trait AuthService: Send + Sync {
    /// Creates a new CUSTOMER account. Fires welcome email and Slack
    /// notification on success.
    ///
    /// # Errors
    ///
    /// Returns [`AuthError::UsernameTaken`] / [`AuthError::EmailTaken`] on
    /// uniqueness violations.
    async fn register(
        &self,
        username: &str,
        email: &str,
        password: &str,
        client: &ClientInfo,
    ) -> Result<User, AuthError>;

    /// Verifies credentials and returns the user.
    ///
    /// # Errors
    ///
    /// Returns [`AuthError::InvalidCredentials`] for every failure mode so
    /// callers cannot enumerate accounts.
    async fn login(
        &self,
        username: &str,
        password: &str,
        client: &ClientInfo,
    ) -> Result<User, AuthError>;

    /// Creates a STAFF account on behalf of `actor` (capability-checked at
    /// the boundary).
    async fn create_staff(
        &self,
        actor: &User,
        username: &str,
        email: &str,
        password: &str,
        client: &ClientInfo,
    ) -> Result<User, AuthError>;

    /// Starts the reset flow for an email address. Always succeeds from the
    /// caller's point of view, whether or not the address exists.
    async fn forgot_password(&self, email: &str, base_url: &str) -> Result<(), AuthError>;

    /// Reports whether a reset token is currently valid.
    async fn check_reset_token(&self, token: &str) -> Result<bool, AuthError>;

    /// Completes the reset flow: validates the token, updates the bound
    /// user's password, and burns the token.
    ///
    /// # Errors
    ///
    /// Returns [`AuthError::InvalidToken`] when the token is unknown, used
    /// or expired.
    async fn reset_password(&self, token: &str, new_password: &str) -> Result<(), AuthError>;
}
