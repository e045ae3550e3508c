//! Slack webhook notifications.
//!
//! Posts `{"text": "..."}` to the configured incoming webhook. A missing
//! webhook URL turns every send into a success-shaped no-op; HTTP failures
//! and non-200 responses are reported as outcomes, never as errors.

use std::time::Duration;

use crate::config::SlackConfig;
use crate::db::User;
use crate::services::notify::{ClientInfo, NotifyOutcome};

const CHANNEL: &str = "slack";

pub struct SlackService {
    client: reqwest::Client,
    config: SlackConfig,
}

impl SlackService {
    #[must_use]
    pub fn new(config: SlackConfig) -> Self {
        let client = reqwest::Client::builder()
            .timeout(Duration::from_secs(10))
            .user_agent(concat!("deskhub/", env!("CARGO_PKG_VERSION")))
            .build()
            .unwrap_or_default();

        Self { client, config }
    }

    #[must_use]
    pub fn is_enabled(&self) -> bool {
        self.config.is_enabled()
    }

    pub async fn notify_registration(&self, user: &User, client: &ClientInfo) -> NotifyOutcome {
        let text = format!(
            "New user registration\nUsername: {}\nEmail: {}\nIP address: {}\nUser agent: {}",
            user.username, user.email, client.ip, client.user_agent
        );
        self.post("user-registration", text).await
    }

    pub async fn notify_login(&self, user: &User, client: &ClientInfo) -> NotifyOutcome {
        let text = format!(
            "User login\nUsername: {}\nIP address: {}\nUser agent: {}",
            user.username, client.ip, client.user_agent
        );
        self.post("user-login", text).await
    }

    pub async fn notify_user_update(
        &self,
        actor: &User,
        target: &User,
        action: &str,
        client: &ClientInfo,
    ) -> NotifyOutcome {
        let text = format!(
            "User account update\nAction: {}\nTarget user: {}\nPerformed by: {}\nIP address: {}\nUser agent: {}",
            action, target.username, actor.username, client.ip, client.user_agent
        );
        self.post("user-update", text).await
    }

    pub async fn notify_equipment(
        &self,
        actor: &User,
        equipment_name: &str,
        action: &str,
        client: &ClientInfo,
    ) -> NotifyOutcome {
        let text = format!(
            "Equipment operation\nAction: {}\nEquipment: {}\nUser: {}\nIP address: {}\nUser agent: {}",
            action, equipment_name, actor.username, client.ip, client.user_agent
        );
        self.post("equipment-operation", text).await
    }

    pub async fn notify_reservation(
        &self,
        actor: &User,
        equipment_name: &str,
        date: &str,
        client: &ClientInfo,
    ) -> NotifyOutcome {
        let text = format!(
            "Equipment reservation\nEquipment: {}\nDate: {}\nUser: {}\nIP address: {}\nUser agent: {}",
            equipment_name, date, actor.username, client.ip, client.user_agent
        );
        self.post("equipment-reservation", text).await
    }

    async fn post(&self, event: &'static str, text: String) -> NotifyOutcome {
        if !self.is_enabled() {
            return NotifyOutcome::Skipped {
                channel: CHANNEL,
                event: event.to_string(),
            };
        }

        let payload = serde_json::json!({ "text": text });

        match self
            .client
            .post(self.config.webhook_url.trim())
            .json(&payload)
            .send()
            .await
        {
            Ok(response) if response.status().is_success() => NotifyOutcome::Delivered {
                channel: CHANNEL,
                event: event.to_string(),
            },
            Ok(response) => NotifyOutcome::Failed {
                channel: CHANNEL,
                event: event.to_string(),
                error: format!("Webhook returned {}", response.status()),
            },
            Err(e) => NotifyOutcome::Failed {
                channel: CHANNEL,
                event: event.to_string(),
                error: e.to_string(),
            },
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::Role;

    fn test_user() -> User {
        User {
            id: 1,
            username: "alice".to_string(),
            email: "alice@example.com".to_string(),
            role: Role::Customer,
            created_at: String::new(),
            updated_at: String::new(),
        }
    }

    #[tokio::test]
    async fn test_unconfigured_webhook_skips() {
        let service = SlackService::new(SlackConfig::default());
        assert!(!service.is_enabled());

        let outcome = service
            .notify_login(&test_user(), &ClientInfo::unknown())
            .await;
        assert!(matches!(outcome, NotifyOutcome::Skipped { .. }));
    }

    #[tokio::test]
    async fn test_unreachable_webhook_reports_failure() {
        let service = SlackService::new(SlackConfig {
            webhook_url: "http://127.0.0.1:9/hook".to_string(),
        });

        let outcome = service
            .notify_login(&test_user(), &ClientInfo::unknown())
            .await;
        assert!(matches!(outcome, NotifyOutcome::Failed { .. }));
    }
}
