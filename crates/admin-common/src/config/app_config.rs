//! Application configuration structs
//!
//! Loads configuration from environment variables (and a `.env` file when present).

use serde::Deserialize;
use std::env;
use std::path::PathBuf;
use std::str::FromStr;

/// Gateway endpoint used for local development builds
pub const DEVELOPMENT_ENDPOINT: &str = "ws://localhost:8001/admin/ws";

/// Gateway endpoint used for production builds
pub const PRODUCTION_ENDPOINT: &str = "wss://195.35.6.222/admin-api/admin/ws";

/// Main application configuration
#[derive(Debug, Clone, Deserialize)]
pub struct AppConfig {
    pub app: AppSettings,
    pub client: ClientConfig,
    pub auth: AuthConfig,
    pub log: LogConfig,
}

/// General application settings
#[derive(Debug, Clone, Deserialize)]
pub struct AppSettings {
    #[serde(default = "default_app_name")]
    pub name: String,
    #[serde(default)]
    pub env: Environment,
}

/// Build mode; selects the gateway endpoint
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum Environment {
    #[default]
    Development,
    Production,
}

impl Environment {
    #[must_use]
    pub fn is_production(&self) -> bool {
        matches!(self, Self::Production)
    }

    #[must_use]
    pub fn is_development(&self) -> bool {
        matches!(self, Self::Development)
    }

    /// Default gateway endpoint for this build mode
    #[must_use]
    pub const fn endpoint(self) -> &'static str {
        match self {
            Self::Development => DEVELOPMENT_ENDPOINT,
            Self::Production => PRODUCTION_ENDPOINT,
        }
    }

    fn parse(value: &str) -> Option<Self> {
        match value.to_lowercase().as_str() {
            "production" | "prod" => Some(Self::Production),
            "development" | "dev" => Some(Self::Development),
            _ => None,
        }
    }
}

/// Message client configuration
#[derive(Debug, Clone, Deserialize)]
pub struct ClientConfig {
    pub url: String,
    #[serde(default = "default_reconnect_max_attempts")]
    pub reconnect_max_attempts: u32,
    #[serde(default = "default_reconnect_delay_ms")]
    pub reconnect_delay_ms: u64,
}

/// Authentication configuration
#[derive(Debug, Clone, Deserialize)]
pub struct AuthConfig {
    #[serde(default = "default_token_store_path")]
    pub token_store_path: PathBuf,
    #[serde(default = "default_rate_limit_attempts")]
    pub rate_limit_attempts: usize,
    #[serde(default = "default_rate_limit_window_ms")]
    pub rate_limit_window_ms: u64,
    /// Token to authenticate with on startup
    #[serde(default)]
    pub admin_token: Option<String>,
    #[serde(default)]
    pub admin_email: Option<String>,
    #[serde(default)]
    pub admin_password: Option<String>,
}

/// Log output format
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum LogFormat {
    #[default]
    Pretty,
    Json,
}

/// Logging configuration
#[derive(Debug, Clone, Deserialize)]
pub struct LogConfig {
    #[serde(default)]
    pub format: LogFormat,
}

// Default value functions
fn default_app_name() -> String {
    "admin-console".to_string()
}

fn default_reconnect_max_attempts() -> u32 {
    3
}

fn default_reconnect_delay_ms() -> u64 {
    3000
}

fn default_token_store_path() -> PathBuf {
    PathBuf::from(".admin_session.json")
}

fn default_rate_limit_attempts() -> usize {
    5
}

fn default_rate_limit_window_ms() -> u64 {
    60_000
}

impl AppConfig {
    /// Load configuration from environment variables
    ///
    /// # Errors
    /// Returns an error if a variable is present but cannot be parsed
    pub fn from_env() -> Result<Self, ConfigError> {
        // Load .env file if present (ignore errors if not found)
        let _ = dotenvy::dotenv();

        Self::from_lookup(|key| env::var(key).ok())
    }

    /// Build the configuration from an arbitrary variable source
    pub fn from_lookup<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let env = match lookup("APP_ENV") {
            Some(raw) => Environment::parse(&raw).ok_or(ConfigError::InvalidValue("APP_ENV", raw))?,
            None => Environment::default(),
        };

        let url = lookup("ADMIN_WS_URL").unwrap_or_else(|| env.endpoint().to_string());
        if !(url.starts_with("ws://") || url.starts_with("wss://")) {
            return Err(ConfigError::InvalidValue("ADMIN_WS_URL", url));
        }

        let log_format = match lookup("LOG_FORMAT") {
            Some(raw) => match raw.to_lowercase().as_str() {
                "json" => LogFormat::Json,
                "pretty" | "text" => LogFormat::Pretty,
                _ => return Err(ConfigError::InvalidValue("LOG_FORMAT", raw)),
            },
            None if env.is_production() => LogFormat::Json,
            None => LogFormat::Pretty,
        };

        Ok(Self {
            app: AppSettings {
                name: lookup("APP_NAME").unwrap_or_else(default_app_name),
                env,
            },
            client: ClientConfig {
                url,
                reconnect_max_attempts: parse_var(
                    &lookup,
                    "RECONNECT_MAX_ATTEMPTS",
                    default_reconnect_max_attempts(),
                )?,
                reconnect_delay_ms: parse_var(
                    &lookup,
                    "RECONNECT_DELAY_MS",
                    default_reconnect_delay_ms(),
                )?,
            },
            auth: AuthConfig {
                token_store_path: lookup("TOKEN_STORE_PATH")
                    .map_or_else(default_token_store_path, PathBuf::from),
                rate_limit_attempts: parse_var(
                    &lookup,
                    "AUTH_RATE_LIMIT_ATTEMPTS",
                    default_rate_limit_attempts(),
                )?,
                rate_limit_window_ms: parse_var(
                    &lookup,
                    "AUTH_RATE_LIMIT_WINDOW_MS",
                    default_rate_limit_window_ms(),
                )?,
                admin_token: lookup("ADMIN_TOKEN").filter(|s| !s.is_empty()),
                admin_email: lookup("ADMIN_EMAIL").filter(|s| !s.is_empty()),
                admin_password: lookup("ADMIN_PASSWORD").filter(|s| !s.is_empty()),
            },
            log: LogConfig { format: log_format },
        })
    }
}

fn parse_var<F, T>(lookup: &F, key: &'static str, default: T) -> Result<T, ConfigError>
where
    F: Fn(&str) -> Option<String>,
    T: FromStr,
{
    match lookup(key) {
        Some(raw) => raw
            .trim()
            .parse()
            .map_err(|_| ConfigError::InvalidValue(key, raw)),
        None => Ok(default),
    }
}

/// Configuration errors
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("Invalid value for {0}: {1}")]
    InvalidValue(&'static str, String),
}
