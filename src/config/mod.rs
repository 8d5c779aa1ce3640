//! Application configuration

mod app_config;

pub use app_config::{
    AdminKeyOutput, AppConfig, AuthConfig, LogFormat, LoggingConfig, ServerConfig, StorageConfig,
};
