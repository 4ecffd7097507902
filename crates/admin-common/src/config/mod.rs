//! Configuration structs

mod app_config;

pub use app_config::{
    AppConfig, AppSettings, AuthConfig, ClientConfig, ConfigError, Environment, LogConfig,
    LogFormat, DEVELOPMENT_ENDPOINT, PRODUCTION_ENDPOINT,
};
