//! Best-effort outbound notifications.
//!
//! Every delivery runs in a spawned task; the caller never awaits it and a
//! failure can never fail the request that triggered it. Each attempt
//! publishes a [`NotifyOutcome`] on an internal broadcast channel that a
//! logging listener drains.

use std::sync::Arc;

use serde::Serialize;
use tokio::sync::broadcast;
use tracing::{debug, warn};

use crate::db::User;
use crate::services::email::EmailService;
use crate::services::slack::SlackService;

/// Client details carried into notification payloads
#[derive(Debug, Clone)]
pub struct ClientInfo {
    pub ip: String,
    pub user_agent: String,
}

impl ClientInfo {
    #[must_use]
    pub fn unknown() -> Self {
        Self {
            ip: "unknown".to_string(),
            user_agent: "Unknown".to_string(),
        }
    }
}

/// Terminal state of one delivery attempt
#[derive(Debug, Clone, Serialize)]
#[serde(tag = "outcome")]
pub enum NotifyOutcome {
    /// The channel accepted the message
    Delivered { channel: &'static str, event: String },
    /// The channel is not configured; success-shaped no-op
    Skipped { channel: &'static str, event: String },
    /// Delivery failed; logged, never surfaced
    Failed {
        channel: &'static str,
        event: String,
        error: String,
    },
}

pub struct Notifier {
    email: Arc<EmailService>,
    slack: Arc<SlackService>,
    outcomes: broadcast::Sender<NotifyOutcome>,
}

impl Notifier {
    #[must_use]
    pub fn new(email: Arc<EmailService>, slack: Arc<SlackService>, buffer: usize) -> Self {
        let (outcomes, _) = broadcast::channel(buffer.max(1));
        Self {
            email,
            slack,
            outcomes,
        }
    }

    #[must_use]
    pub fn subscribe(&self) -> broadcast::Receiver<NotifyOutcome> {
        self.outcomes.subscribe()
    }

    /// Drain the outcome channel into the log. Failures surface at warn
    /// level; everything else is debug noise.
    pub fn start_outcome_logger(&self) {
        let mut rx = self.outcomes.subscribe();

        tokio::spawn(async move {
            loop {
                match rx.recv().await {
                    Ok(NotifyOutcome::Failed {
                        channel,
                        event,
                        error,
                    }) => {
                        warn!(channel, event, error, "Notification delivery failed");
                    }
                    Ok(NotifyOutcome::Delivered { channel, event }) => {
                        debug!(channel, event, "Notification delivered");
                    }
                    Ok(NotifyOutcome::Skipped { channel, event }) => {
                        debug!(channel, event, "Notification skipped (not configured)");
                    }
                    Err(broadcast::error::RecvError::Lagged(count)) => {
                        warn!(count, "Notification outcome logger lagged");
                    }
                    Err(broadcast::error::RecvError::Closed) => break,
                }
            }
        });
    }

    fn publish(outcomes: &broadcast::Sender<NotifyOutcome>, outcome: NotifyOutcome) {
        // No subscribers is fine; outcomes are advisory
        let _ = outcomes.send(outcome);
    }

    pub fn user_registered(&self, user: &User, client: &ClientInfo) {
        let slack = self.slack.clone();
        let email = self.email.clone();
        let outcomes = self.outcomes.clone();
        let user = user.clone();
        let client = client.clone();

        tokio::spawn(async move {
            let outcome = slack.notify_registration(&user, &client).await;
            Self::publish(&outcomes, outcome);

            let outcome = email.send_welcome(&user).await;
            Self::publish(&outcomes, outcome);
        });
    }

    pub fn user_logged_in(&self, user: &User, client: &ClientInfo) {
        let slack = self.slack.clone();
        let outcomes = self.outcomes.clone();
        let user = user.clone();
        let client = client.clone();

        tokio::spawn(async move {
            let outcome = slack.notify_login(&user, &client).await;
            Self::publish(&outcomes, outcome);
        });
    }

    pub fn staff_created(&self, actor: &User, target: &User, client: &ClientInfo) {
        let slack = self.slack.clone();
        let outcomes = self.outcomes.clone();
        let actor = actor.clone();
        let target = target.clone();
        let client = client.clone();

        tokio::spawn(async move {
            let outcome = slack
                .notify_user_update(&actor, &target, "Staff user created", &client)
                .await;
            Self::publish(&outcomes, outcome);
        });
    }

    pub fn equipment_operation(
        &self,
        actor: &User,
        equipment_name: &str,
        action: &str,
        client: &ClientInfo,
    ) {
        let slack = self.slack.clone();
        let outcomes = self.outcomes.clone();
        let actor = actor.clone();
        let equipment_name = equipment_name.to_string();
        let action = action.to_string();
        let client = client.clone();

        tokio::spawn(async move {
            let outcome = slack
                .notify_equipment(&actor, &equipment_name, &action, &client)
                .await;
            Self::publish(&outcomes, outcome);
        });
    }

    pub fn equipment_reserved(
        &self,
        actor: &User,
        equipment_name: &str,
        date: &str,
        client: &ClientInfo,
    ) {
        let slack = self.slack.clone();
        let outcomes = self.outcomes.clone();
        let actor = actor.clone();
        let equipment_name = equipment_name.to_string();
        let date = date.to_string();
        let client = client.clone();

        tokio::spawn(async move {
            let outcome = slack
                .notify_reservation(&actor, &equipment_name, &date, &client)
                .await;
            Self::publish(&outcomes, outcome);
        });
    }

    pub fn password_reset_requested(&self, user: &User, token: &str, base_url: &str) {
        let email = self.email.clone();
        let outcomes = self.outcomes.clone();
        let user = user.clone();
        let token = token.to_string();
        let base_url = base_url.to_string();

        tokio::spawn(async move {
            let outcome = email.send_password_reset(&user, &token, &base_url).await;
            Self::publish(&outcomes, outcome);
        });
    }
}
