// Centralized configuration management
// All environment variables are loaded ONCE at startup

use once_cell::sync::Lazy;
use serde::{Deserialize, Serialize};
use std::env;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("Missing required environment variable: {0}")]
    MissingVar(String),
    #[error("Invalid value for {0}: {1}")]
    InvalidValue(String, String),
}

/// Global application configuration loaded once at startup
pub static CONFIG: Lazy<AppConfig> = Lazy::new(|| {
    #[cfg(test)]
    dotenv::dotenv().ok();

    AppConfig::from_env().expect("Failed to load configuration")
});

/// Environment type
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub enum Environment {
    Development,
    Test,
    Staging,
    Production,
}

impl From<String> for Environment {
    fn from(s: String) -> Self {
        match s.to_lowercase().as_str() {
            "development" | "dev" => Environment::Development,
            "test" => Environment::Test,
            "staging" | "stage" => Environment::Staging,
            "production" | "prod" => Environment::Production,
            _ => Environment::Development,
        }
    }
}

/// Complete application configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AppConfig {
    // Server
    pub bind_address: String,
    pub environment: Environment,

    // Database
    pub database_url: String,
    pub database_max_connections: u32,
    pub database_min_connections: u32,
    pub database_connect_timeout: u64,
    pub database_idle_timeout: u64,
    pub database_max_lifetime: u64,

    // JWT
    pub jwt_secret: String,
    pub jwt_expiry: u64,

    // CORS
    pub frontend_url: Option<String>,

    // Outbound dispatch (OTP email / SMS)
    pub email: EmailConfig,
    pub sms: SmsConfig,

    // Security
    pub bcrypt_cost: u32,

    // Migrations
    pub run_migrations: bool,
}

/// Email provider configuration (Resend-compatible HTTP API)
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EmailConfig {
    pub api_url: String,
    pub api_key: String,
    pub from_address: String,
}

/// SMS gateway configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SmsConfig {
    pub api_url: String,
    pub api_key: String,
    pub sender_id: String,
}

impl AppConfig {
    pub fn from_env() -> Result<Self, ConfigError> {
        Ok(Self {
            bind_address: env_or("BIND_ADDRESS", "0.0.0.0:3001"),
            environment: Environment::from(env_or("ENVIRONMENT", "development")),

            database_url: required("DATABASE_URL")?,
            database_max_connections: parse_or("DATABASE_MAX_CONNECTIONS", 10)?,
            database_min_connections: parse_or("DATABASE_MIN_CONNECTIONS", 1)?,
            database_connect_timeout: parse_or("DATABASE_CONNECT_TIMEOUT", 30)?,
            database_idle_timeout: parse_or("DATABASE_IDLE_TIMEOUT", 600)?,
            database_max_lifetime: parse_or("DATABASE_MAX_LIFETIME", 1800)?,

            jwt_secret: required("JWT_SECRET")?,
            jwt_expiry: parse_or("JWT_EXPIRY", 86400)?,

            frontend_url: env::var("FRONTEND_URL").ok(),

            email: EmailConfig {
                api_url: env_or("EMAIL_API_URL", "https://api.resend.com/emails"),
                api_key: env_or("EMAIL_API_KEY", ""),
                from_address: env_or("EMAIL_FROM", "no-reply@estia.example"),
            },
            sms: SmsConfig {
                api_url: env_or("SMS_API_URL", ""),
                api_key: env_or("SMS_API_KEY", ""),
                sender_id: env_or("SMS_SENDER_ID", "ESTIA"),
            },

            bcrypt_cost: parse_or("BCRYPT_COST", 12)?,

            run_migrations: env_or("RUN_MIGRATIONS", "true") == "true",
        })
    }
}

fn env_or(key: &str, default: &str) -> String {
    env::var(key).unwrap_or_else(|_| default.to_string())
}

fn required(key: &str) -> Result<String, ConfigError> {
    env::var(key).map_err(|_| ConfigError::MissingVar(key.to_string()))
}

fn parse_or<T: std::str::FromStr>(key: &str, default: T) -> Result<T, ConfigError> {
    match env::var(key) {
        Ok(v) => v
            .parse::<T>()
            .map_err(|_| ConfigError::InvalidValue(key.to_string(), v)),
        Err(_) => Ok(default),
    }
}

/// Accessor for the global configuration
pub fn config() -> &'static AppConfig {
    &CONFIG
}
