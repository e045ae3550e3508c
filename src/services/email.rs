//! SMTP email delivery.
//!
//! Uses a blocking lettre transport driven from `spawn_blocking` so SMTP
//! round-trips never occupy a runtime worker. Until host, username and
//! password are all configured, every send is a success-shaped no-op.

use anyhow::{Context, Result};
use lettre::message::Mailbox;
use lettre::transport::smtp::authentication::Credentials;
use lettre::{Address, Message, SmtpTransport, Transport};
use tokio::task;
use tracing::info;

use crate::config::SmtpConfig;
use crate::db::User;
use crate::services::notify::NotifyOutcome;

const CHANNEL: &str = "email";

pub struct EmailService {
    config: SmtpConfig,
}

impl EmailService {
    #[must_use]
    pub const fn new(config: SmtpConfig) -> Self {
        Self { config }
    }

    #[must_use]
    pub fn is_configured(&self) -> bool {
        self.config.is_configured()
    }

    /// Welcome mail for a newly registered member
    pub async fn send_welcome(&self, user: &User) -> NotifyOutcome {
        let subject = "Welcome to the Coworking Space Portal";
        let body = format!(
            "Hello {},\n\n\
             Your member registration is complete.\n\n\
             Username: {}\n\
             Email: {}\n\n\
             Log in to the portal to reserve and manage equipment.\n\n\
             If you have any questions, feel free to get in touch.\n\n\
             Coworking Space Portal",
            user.username, user.username, user.email
        );

        self.send("welcome-email", &user.email, subject, &body)
            .await
    }

    /// Password reset link mail
    pub async fn send_password_reset(
        &self,
        user: &User,
        token: &str,
        base_url: &str,
    ) -> NotifyOutcome {
        let reset_url = format!("{base_url}/reset-password?token={token}");
        let subject = "Password reset instructions";
        let body = format!(
            "Hello {},\n\n\
             We received a request to reset your password.\n\n\
             Click the link below to choose a new password.\n\
             The link expires in 24 hours.\n\n\
             {}\n\n\
             If you did not request this, you can safely ignore this email.\n\n\
             Coworking Space Portal",
            user.username, reset_url
        );

        self.send("password-reset-email", &user.email, subject, &body)
            .await
    }

    async fn send(
        &self,
        event: &'static str,
        to: &str,
        subject: &str,
        body: &str,
    ) -> NotifyOutcome {
        if !self.is_configured() {
            info!(to, event, "Email service not configured, skipping send");
            return NotifyOutcome::Skipped {
                channel: CHANNEL,
                event: event.to_string(),
            };
        }

        let config = self.config.clone();
        let to = to.to_string();
        let subject = subject.to_string();
        let body = body.to_string();

        let result = task::spawn_blocking(move || send_blocking(&config, &to, &subject, &body))
            .await
            .unwrap_or_else(|e| Err(anyhow::anyhow!("Email task panicked: {e}")));

        match result {
            Ok(()) => NotifyOutcome::Delivered {
                channel: CHANNEL,
                event: event.to_string(),
            },
            Err(e) => NotifyOutcome::Failed {
                channel: CHANNEL,
                event: event.to_string(),
                error: e.to_string(),
            },
        }
    }
}

/// One blocking SMTP round-trip
fn send_blocking(config: &SmtpConfig, to: &str, subject: &str, body: &str) -> Result<()> {
    let from_address: Address = config
        .from_email
        .parse()
        .context("Invalid from_email address")?;
    let to_address: Address = to.parse().context("Invalid recipient address")?;

    let message = Message::builder()
        .from(Mailbox::new(
            Some(config.from_name.clone()),
            from_address,
        ))
        .to(Mailbox::new(None, to_address))
        .subject(subject)
        .body(body.to_string())
        .context("Failed to build email message")?;

    let mut builder = if config.starttls {
        SmtpTransport::starttls_relay(&config.host).context("Failed to create SMTP transport")?
    } else {
        SmtpTransport::builder_dangerous(&config.host)
    };

    builder = builder.port(config.port);

    if config.auth {
        builder = builder.credentials(Credentials::new(
            config.username.clone(),
            config.password.clone(),
        ));
    }

    let mailer = builder.build();
    mailer.send(&message).context("SMTP send failed")?;

    Ok(())
}
