use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use tracing::info;

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    pub general: GeneralConfig,

    pub server: ServerConfig,

    pub smtp: SmtpConfig,

    pub slack: SlackConfig,

    pub legal: LegalConfig,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct GeneralConfig {
    pub database_path: String,

    pub log_level: String,

    /// Number of tokio worker threads (default: 2)
    /// Set to 0 to use the number of CPU cores
    pub worker_threads: usize,

    /// Maximum database connections (default: 5)
    pub max_db_connections: u32,

    /// Minimum database connections (default: 1)
    pub min_db_connections: u32,

    /// Notification outcome channel buffer size (default: 100)
    pub notify_buffer_size: usize,
}

impl Default for GeneralConfig {
    fn default() -> Self {
        Self {
            database_path: "sqlite:data/deskhub.db".to_string(),
            log_level: "info".to_string(),
            worker_threads: 2,
            max_db_connections: 5,
            min_db_connections: 1,
            notify_buffer_size: 100,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ServerConfig {
    pub port: u16,

    pub cors_allowed_origins: Vec<String>,

    /// Whether to set the Secure flag on session cookies.
    /// Set to true when serving behind HTTPS.
    pub secure_cookies: bool,

    /// Session inactivity expiry in minutes
    pub session_ttl_minutes: i64,

    /// External base URL used in password reset links. When unset, the
    /// Host header of the requesting client is used instead.
    pub public_url: Option<String>,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            port: 8080,
            cors_allowed_origins: vec![
                "http://localhost:8080".to_string(),
                "http://127.0.0.1:8080".to_string(),
            ],
            secure_cookies: false,
            session_ttl_minutes: 60,
            public_url: None,
        }
    }
}

/// Outbound SMTP settings. The service is considered unconfigured (and all
/// sends become no-ops) until host, username and password are all present.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct SmtpConfig {
    pub host: String,

    pub port: u16,

    pub username: String,

    pub password: String,

    pub from_email: String,

    pub from_name: String,

    pub auth: bool,

    pub starttls: bool,
}

impl Default for SmtpConfig {
    fn default() -> Self {
        Self {
            host: String::new(),
            port: 587,
            username: String::new(),
            password: String::new(),
            from_email: "noreply@coworkingspace.local".to_string(),
            from_name: "Coworking Space Portal".to_string(),
            auth: true,
            starttls: true,
        }
    }
}

impl SmtpConfig {
    #[must_use]
    pub fn is_configured(&self) -> bool {
        !self.host.trim().is_empty()
            && !self.username.trim().is_empty()
            && !self.password.trim().is_empty()
    }
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct SlackConfig {
    /// Incoming webhook URL; empty disables Slack notifications
    pub webhook_url: String,
}

impl SlackConfig {
    #[must_use]
    pub fn is_enabled(&self) -> bool {
        !self.webhook_url.trim().is_empty()
    }
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct LegalConfig {
    pub terms_of_service_url: Option<String>,

    pub privacy_policy_url: Option<String>,
}

impl LegalConfig {
    #[must_use]
    pub fn has_terms_of_service_url(&self) -> bool {
        self.terms_of_service_url.is_some()
    }

    #[must_use]
    pub fn has_privacy_policy_url(&self) -> bool {
        self.privacy_policy_url.is_some()
    }
}

impl Config {
    /// Load config from the first config.toml found, then apply environment
    /// overrides. Services receive the resulting struct by value and never
    /// read the process environment themselves.
    pub fn load() -> Result<Self> {
        dotenvy::dotenv().ok();

        let paths = Self::config_paths();

        for path in &paths {
            if path.exists() {
                info!("Loading config from: {}", path.display());
                let mut config = Self::load_from_path(path)?;
                config.apply_overrides(|name| std::env::var(name).ok());
                return Ok(config);
            }
        }

        info!("No config file found, using defaults");
        let mut config = Self::default();
        config.apply_overrides(|name| std::env::var(name).ok());
        Ok(config)
    }

    pub fn load_from_path(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read config file: {}", path.display()))?;

        let config: Self = toml::from_str(&content)
            .with_context(|| format!("Failed to parse config file: {}", path.display()))?;

        Ok(config)
    }

    /// Apply the documented environment variables on top of file values.
    /// The lookup is injected so tests never mutate the process environment.
    pub fn apply_overrides(&mut self, lookup: impl Fn(&str) -> Option<String>) {
        let get = |name: &str| {
            lookup(name)
                .map(|v| v.trim().to_string())
                .filter(|v| !v.is_empty())
        };

        if let Some(v) = get("SMTP_HOST") {
            self.smtp.host = v;
        }
        if let Some(v) = get("SMTP_PORT").and_then(|v| v.parse().ok()) {
            self.smtp.port = v;
        }
        if let Some(v) = get("SMTP_USERNAME") {
            self.smtp.username = v;
        }
        if let Some(v) = get("SMTP_PASSWORD") {
            self.smtp.password = v;
        }
        if let Some(v) = get("FROM_EMAIL") {
            self.smtp.from_email = v;
        }
        if let Some(v) = get("FROM_NAME") {
            self.smtp.from_name = v;
        }
        if let Some(v) = get("SMTP_AUTH") {
            self.smtp.auth = v.eq_ignore_ascii_case("true");
        }
        if let Some(v) = get("SMTP_STARTTLS") {
            self.smtp.starttls = v.eq_ignore_ascii_case("true");
        }
        if let Some(v) = get("SLACK_WEBHOOK_URL") {
            self.slack.webhook_url = v;
        }
        if let Some(v) = get("TERMS_OF_SERVICE_URL") {
            self.legal.terms_of_service_url = Some(v);
        }
        if let Some(v) = get("PRIVACY_POLICY_URL") {
            self.legal.privacy_policy_url = Some(v);
        }
    }

    fn config_paths() -> Vec<PathBuf> {
        let mut paths = vec![];

        paths.push(PathBuf::from("config.toml"));

        if let Some(config_dir) = dirs::config_dir() {
            paths.push(config_dir.join("deskhub").join("config.toml"));
        }

        if let Some(home) = dirs::home_dir() {
            paths.push(home.join(".deskhub").join("config.toml"));
        }

        paths
    }

    pub fn validate(&self) -> Result<()> {
        if self.server.port == 0 {
            anyhow::bail!("Server port must be set");
        }

        if self.general.min_db_connections > self.general.max_db_connections {
            anyhow::bail!("min_db_connections cannot exceed max_db_connections");
        }

        if self.server.session_ttl_minutes <= 0 {
            anyhow::bail!("Session TTL must be positive");
        }

        Ok(())
    }
}
