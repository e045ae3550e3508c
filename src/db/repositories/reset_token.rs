use anyhow::{Context, Result};
use chrono::{Duration, Utc};
use sea_orm::{
    ActiveModelTrait, ColumnTrait, DatabaseConnection, EntityTrait, QueryFilter, Set,
    sea_query::Expr,
};

use crate::entities::{password_reset_token, prelude::*};

/// Reset tokens are valid for 24 hours from issue
const TOKEN_TTL_HOURS: i64 = 24;

pub struct ResetTokenRepository {
    conn: DatabaseConnection,
}

impl ResetTokenRepository {
    #[must_use]
    pub const fn new(conn: DatabaseConnection) -> Self {
        Self { conn }
    }

    /// Mint a fresh token for a user
    pub async fn mint(&self, user_id: i32) -> Result<password_reset_token::Model> {
        let now = Utc::now();

        let active = password_reset_token::ActiveModel {
            token: Set(generate_token()),
            user_id: Set(user_id),
            expires_at: Set((now + Duration::hours(TOKEN_TTL_HOURS)).to_rfc3339()),
            used: Set(false),
            created_at: Set(now.to_rfc3339()),
            updated_at: Set(now.to_rfc3339()),
            ..Default::default()
        };

        let model = active
            .insert(&self.conn)
            .await
            .context("Failed to insert password reset token")?;

        Ok(model)
    }

    /// Look up an unused token by its string. Expiry is the caller's
    /// concern, via `Model::is_valid`.
    pub async fn find_unused(&self, token: &str) -> Result<Option<password_reset_token::Model>> {
        let row = PasswordResetToken::find()
            .filter(password_reset_token::Column::Token.eq(token))
            .filter(password_reset_token::Column::Used.eq(false))
            .one(&self.conn)
            .await
            .context("Failed to query password reset token")?;

        Ok(row)
    }

    pub async fn mark_used(&self, token: password_reset_token::Model) -> Result<()> {
        let mut active: password_reset_token::ActiveModel = token.into();
        active.used = Set(true);
        active.updated_at = Set(Utc::now().to_rfc3339());
        active
            .update(&self.conn)
            .await
            .context("Failed to mark password reset token as used")?;

        Ok(())
    }

    /// Best-effort bulk invalidation of every outstanding token for a user
    pub async fn invalidate_for_user(&self, user_id: i32) -> Result<u64> {
        let result = PasswordResetToken::update_many()
            .col_expr(password_reset_token::Column::Used, Expr::value(true))
            .col_expr(
                password_reset_token::Column::UpdatedAt,
                Expr::value(Utc::now().to_rfc3339()),
            )
            .filter(password_reset_token::Column::UserId.eq(user_id))
            .filter(password_reset_token::Column::Used.eq(false))
            .exec(&self.conn)
            .await
            .context("Failed to invalidate password reset tokens")?;

        Ok(result.rows_affected)
    }

    /// Purge tokens past their expiry. RFC 3339 strings in a fixed offset
    /// compare lexicographically in chronological order.
    pub async fn delete_expired(&self) -> Result<u64> {
        let now = Utc::now().to_rfc3339();

        let result = PasswordResetToken::delete_many()
            .filter(password_reset_token::Column::ExpiresAt.lt(now))
            .exec(&self.conn)
            .await
            .context("Failed to delete expired password reset tokens")?;

        Ok(result.rows_affected)
    }
}

/// Generate an opaque random token (64 character hex string)
#[must_use]
pub fn generate_token() -> String {
    use rand::Rng;

    let mut rng = rand::rng();
    let bytes: [u8; 32] = rng.random();

    bytes.iter().fold(String::with_capacity(64), |mut acc, b| {
        use std::fmt::Write;
        let _ = write!(acc, "{b:02x}");
        acc
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_generate_token_shape() {
        let token = generate_token();
        assert_eq!(token.len(), 64);
        assert!(token.chars().all(|c| c.is_ascii_hexdigit()));
    }

    #[test]
    fn test_generate_token_is_not_constant() {
        assert_ne!(generate_token(), generate_token());
    }
}
