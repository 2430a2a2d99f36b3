use std::env;

use chrono::Duration;
use config::Config as ConfigBuilder;
use config::ConfigError;
use config::Environment;
use config::File;
use serde::Deserialize;

use crate::domain::user::service::UserServiceSettings;

#[derive(Debug, Deserialize, Clone)]
pub struct Config {
    pub database: DatabaseConfig,
    pub server: ServerConfig,
    pub jwt: JwtConfig,
    pub password_reset: PasswordResetConfig,
    pub smtp: SmtpConfig,
    /// Seeds the first administrator at startup when present.
    #[serde(default)]
    pub bootstrap_admin: Option<BootstrapAdminConfig>,
}

#[derive(Debug, Deserialize, Clone)]
pub struct DatabaseConfig {
    pub url: String,
    #[serde(default = "default_max_connections")]
    pub max_connections: u32,
}

#[derive(Debug, Deserialize, Clone)]
pub struct ServerConfig {
    pub http_port: u16,
}

#[derive(Debug, Deserialize, Clone)]
pub struct JwtConfig {
    /// HS256 signing secret, at least 32 bytes. Read once at startup.
    pub secret: String,
    pub expiration_hours: i64,
}

#[derive(Debug, Deserialize, Clone)]
pub struct PasswordResetConfig {
    pub expiration_minutes: i64,
    /// Front-end page that receives `?token=...`
    pub link_base_url: String,
}

#[derive(Debug, Deserialize, Clone)]
pub struct SmtpConfig {
    pub host: String,
    pub port: u16,
    #[serde(default = "default_starttls")]
    pub starttls: bool,
    pub from_address: String,
    #[serde(default)]
    pub username: Option<String>,
    #[serde(default)]
    pub password: Option<String>,
}

#[derive(Debug, Deserialize, Clone)]
pub struct BootstrapAdminConfig {
    pub first_name: String,
    pub last_name: String,
    pub email: String,
    pub password: String,
}

/// One year.
pub const MAX_ACCESS_TOKEN_HOURS: i64 = 24 * 365;
/// One week.
pub const MAX_RESET_TOKEN_MINUTES: i64 = 7 * 24 * 60;

fn default_max_connections() -> u32 {
    5
}

fn default_starttls() -> bool {
    true
}

impl Config {
    /// Load configuration from files with environment variable overrides
    ///
    /// Priority (highest to lowest):
    /// 1. Environment variables (JWT__SECRET, SMTP__HOST, etc.)
    /// 2. Environment-specific config file (config/{environment}.toml)
    /// 3. Default config file (config/default.toml)
    pub fn load() -> Result<Self, ConfigError> {
        let run_mode = env::var("RUN_MODE").unwrap_or_else(|_| "development".to_string());

        let configuration = ConfigBuilder::builder()
            // Start with default configuration
            .add_source(File::with_name("config/default").required(false))
            // Layer on environment-specific configuration
            .add_source(File::with_name(&format!("config/{}", run_mode)).required(false))
            // Layer on environment variables (with __ as separator)
            // Example: JWT__SECRET=... overrides jwt.secret
            .add_source(Environment::default().separator("__"))
            .build()?;

        let config: Config = configuration.try_deserialize()?;
        config.validate()?;

        Ok(config)
    }

    /// Reject values that would only fail later, per request.
    ///
    /// The signing secret length itself is enforced when the token codec is
    /// built, which also happens before the server starts listening.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if !(1..=MAX_ACCESS_TOKEN_HOURS).contains(&self.jwt.expiration_hours) {
            return Err(ConfigError::Message(format!(
                "jwt.expiration_hours must be between 1 and {}",
                MAX_ACCESS_TOKEN_HOURS
            )));
        }

        if !(1..=MAX_RESET_TOKEN_MINUTES).contains(&self.password_reset.expiration_minutes) {
            return Err(ConfigError::Message(format!(
                "password_reset.expiration_minutes must be between 1 and {}",
                MAX_RESET_TOKEN_MINUTES
            )));
        }

        if self.password_reset.link_base_url.trim().is_empty() {
            return Err(ConfigError::Message(
                "password_reset.link_base_url must be set".to_string(),
            ));
        }

        Ok(())
    }

    pub fn service_settings(&self) -> UserServiceSettings {
        UserServiceSettings {
            access_token_ttl: Duration::hours(self.jwt.expiration_hours),
            reset_token_ttl: Duration::minutes(self.password_reset.expiration_minutes),
            reset_link_base_url: self.password_reset.link_base_url.clone(),
        }
    }
}
