//! `SeaORM` implementation of the `AuthService` trait.

use std::sync::Arc;

use async_trait::async_trait;
use tracing::warn;

use crate::db::{Store, User};
use crate::domain::Role;
use crate::services::auth_service::{AuthError, AuthService};
use crate::services::notify::{ClientInfo, Notifier};

pub struct SeaOrmAuthService {
    store: Store,
    notifier: Arc<Notifier>,
}

impl SeaOrmAuthService {
    #[must_use]
    pub const fn new(store: Store, notifier: Arc<Notifier>) -> Self {
        Self { store, notifier }
    }

    async fn check_uniqueness(&self, username: &str, email: &str) -> Result<(), AuthError> {
        if self.store.user_exists_by_username(username).await? {
            return Err(AuthError::UsernameTaken);
        }
        if self.store.user_exists_by_email(email).await? {
            return Err(AuthError::EmailTaken);
        }
        Ok(())
    }
}

#[async_trait]
impl AuthService for SeaOrmAuthService {
    async fn register(
        &self,
        username: &str,
        email: &str,
        password: &str,
        client: &ClientInfo,
    ) -> Result<User, AuthError> {
        self.check_uniqueness(username, email).await?;

        let user = self
            .store
            .insert_user(username, email, password, Role::Customer)
            .await?;

        self.notifier.user_registered(&user, client);

        Ok(user)
    }

    async fn login(
        &self,
        username: &str,
        password: &str,
        client: &ClientInfo,
    ) -> Result<User, AuthError> {
        let is_valid = self.store.verify_user_password(username, password).await?;

        if !is_valid {
            return Err(AuthError::InvalidCredentials);
        }

        let user = self
            .store
            .get_user_by_username(username)
            .await?
            .ok_or(AuthError::InvalidCredentials)?;

        self.notifier.user_logged_in(&user, client);

        Ok(user)
    }

    async fn create_staff(
        &self,
        actor: &User,
        username: &str,
        email: &str,
        password: &str,
        client: &ClientInfo,
    ) -> Result<User, AuthError> {
        self.check_uniqueness(username, email).await?;

        let user = self
            .store
            .insert_user(username, email, password, Role::Staff)
            .await?;

        self.notifier.staff_created(actor, &user, client);

        Ok(user)
    }

    async fn forgot_password(&self, email: &str, base_url: &str) -> Result<(), AuthError> {
        // Unknown addresses take the same path outward as known ones
        let Some(user) = self.store.get_user_by_email(email).await? else {
            return Ok(());
        };

        self.store.invalidate_reset_tokens_for_user(user.id).await?;

        let token = self.store.mint_reset_token(user.id).await?;

        // Opportunistic cleanup; a failure here must not break the flow
        if let Err(e) = self.store.delete_expired_reset_tokens().await {
            warn!(error = %e, "Failed to purge expired reset tokens");
        }

        self.notifier
            .password_reset_requested(&user, &token.token, base_url);

        Ok(())
    }

    async fn check_reset_token(&self, token: &str) -> Result<bool, AuthError> {
        let row = self.store.find_unused_reset_token(token).await?;
        Ok(row.is_some_and(|row| row.is_valid()))
    }

    async fn reset_password(&self, token: &str, new_password: &str) -> Result<(), AuthError> {
        let row = self
            .store
            .find_unused_reset_token(token)
            .await?
            .ok_or(AuthError::InvalidToken)?;

        if !row.is_valid() {
            return Err(AuthError::InvalidToken);
        }

        self.store
            .update_user_password(row.user_id, new_password)
            .await?;

        self.store.mark_reset_token_used(row).await?;

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::{SlackConfig, SmtpConfig};
    use crate::services::email::EmailService;
    use crate::services::slack::SlackService;

    async fn test_service() -> SeaOrmAuthService {
        let store = Store::new("sqlite::memory:").await.expect("store");
        let notifier = Arc::new(Notifier::new(
            Arc::new(EmailService::new(SmtpConfig::default())),
            Arc::new(SlackService::new(SlackConfig::default())),
            16,
        ));
        SeaOrmAuthService::new(store, notifier)
    }

    #[tokio::test]
    async fn test_register_then_login() {
        let service = test_service().await;
        let client = ClientInfo::unknown();

        let user = service
            .register("alice", "alice@example.com", "secret123", &client)
            .await
            .expect("register");
        assert_eq!(user.role, Role::Customer);

        let logged_in = service
            .login("alice", "secret123", &client)
            .await
            .expect("login");
        assert_eq!(logged_in.id, user.id);
    }

    #[tokio::test]
    async fn test_login_failures_are_indistinguishable() {
        let service = test_service().await;
        let client = ClientInfo::unknown();

        service
            .register("alice", "alice@example.com", "secret123", &client)
            .await
            .expect("register");

        let wrong_password = service.login("alice", "wrong", &client).await;
        let unknown_user = service.login("nobody", "secret123", &client).await;

        assert!(matches!(wrong_password, Err(AuthError::InvalidCredentials)));
        assert!(matches!(unknown_user, Err(AuthError::InvalidCredentials)));
    }

    #[tokio::test]
    async fn test_duplicate_username_and_email_rejected() {
        let service = test_service().await;
        let client = ClientInfo::unknown();

        service
            .register("alice", "alice@example.com", "secret123", &client)
            .await
            .expect("register");

        let dup_username = service
            .register("alice", "other@example.com", "secret123", &client)
            .await;
        assert!(matches!(dup_username, Err(AuthError::UsernameTaken)));

        let dup_email = service
            .register("bob", "alice@example.com", "secret123", &client)
            .await;
        assert!(matches!(dup_email, Err(AuthError::EmailTaken)));
    }

    #[tokio::test]
    async fn test_password_reset_flow() {
        let service = test_service().await;
        let client = ClientInfo::unknown();

        let user = service
            .register("alice", "alice@example.com", "secret123", &client)
            .await
            .expect("register");

        // Unknown email must look exactly like a known one
        service
            .forgot_password("nobody@example.com", "http://localhost")
            .await
            .expect("forgot for unknown email");

        service
            .forgot_password("alice@example.com", "http://localhost")
            .await
            .expect("forgot for known email");

        let token = service
            .store
            .mint_reset_token(user.id)
            .await
            .expect("mint token");

        assert!(service
            .check_reset_token(&token.token)
            .await
            .expect("check"));

        service
            .reset_password(&token.token, "newsecret456")
            .await
            .expect("reset");

        // Token burned: second use fails, and the new password logs in
        let reuse = service.reset_password(&token.token, "again").await;
        assert!(matches!(reuse, Err(AuthError::InvalidToken)));

        service
            .login("alice", "newsecret456", &client)
            .await
            .expect("login with new password");

        let old = service.login("alice", "secret123", &client).await;
        assert!(matches!(old, Err(AuthError::InvalidCredentials)));
    }

    #[tokio::test]
    async fn test_new_token_invalidates_prior_tokens() {
        let service = test_service().await;
        let client = ClientInfo::unknown();

        let user = service
            .register("alice", "alice@example.com", "secret123", &client)
            .await
            .expect("register");

        let first = service.store.mint_reset_token(user.id).await.expect("mint");

        // The forgot flow invalidates outstanding tokens before minting
        service
            .forgot_password("alice@example.com", "http://localhost")
            .await
            .expect("forgot");

        assert!(!service
            .check_reset_token(&first.token)
            .await
            .expect("check"));
    }
}
