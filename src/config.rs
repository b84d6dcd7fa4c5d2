use std::path::PathBuf;
use std::time::Duration;

use thiserror::Error;

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("missing required environment variable: {0}")]
    MissingEnvVar(String),
    #[error("invalid value for {name}: {message}")]
    InvalidValue { name: String, message: String },
    #[error("failed to parse {name} as integer: {source}")]
    ParseInt {
        name: String,
        #[source]
        source: std::num::ParseIntError,
    },
}

/// Application configuration loaded from environment variables.
#[derive(Debug, Clone)]
pub struct Config {
    // Database
    pub database_path: PathBuf,

    // Web Server
    pub web_host: String,
    pub web_port: u16,

    // Background jobs
    pub hit_flush_interval: Duration,
    pub deadline_sweep_interval: Duration,

    // S3 Storage (board/spec/profile photos)
    pub s3_bucket: String,
    pub s3_region: String,
    pub s3_endpoint: Option<String>,
    pub s3_prefix: String,

    // Mail relay
    pub mail_relay_url: String,
    pub mail_from: String,
    pub mail_api_key: Option<String>,
    pub mail_question_inbox: String,

    // Sessions / password reset
    pub session_ttl: Duration,
    pub password_reset_ttl: Duration,

    // FAQ response cache
    pub faq_cache_ttl: Duration,
}

impl Config {
    /// Load configuration from environment variables.
    ///
    /// # Errors
    ///
    /// Returns an error if required environment variables are missing or invalid.
    pub fn from_env() -> Result<Self, ConfigError> {
        Ok(Self {
            // Database
            database_path: PathBuf::from(env_or_default("DATABASE_PATH", "./data/market.sqlite")),

            // Web Server
            web_host: env_or_default("WEB_HOST", "0.0.0.0"),
            web_port: parse_env_u16("WEB_PORT", 8080)?,

            // Background jobs
            hit_flush_interval: Duration::from_secs(parse_env_u64("HIT_FLUSH_INTERVAL_SECS", 60)?),
            deadline_sweep_interval: Duration::from_secs(parse_env_u64(
                "DEADLINE_SWEEP_INTERVAL_SECS",
                60,
            )?),

            // S3 Storage
            s3_bucket: required_env("S3_BUCKET")?,
            s3_region: env_or_default("S3_REGION", "ap-northeast-2"),
            s3_endpoint: optional_env("S3_ENDPOINT"),
            s3_prefix: env_or_default("S3_PREFIX", "photos/"),

            // Mail relay
            mail_relay_url: required_env("MAIL_RELAY_URL")?,
            mail_from: env_or_default("MAIL_FROM", "no-reply@campus.market"),
            mail_api_key: optional_env("MAIL_API_KEY"),
            mail_question_inbox: env_or_default("MAIL_QUESTION_INBOX", "support@campus.market"),

            // Sessions / password reset
            session_ttl: Duration::from_secs(parse_env_u64("SESSION_TTL_SECS", 2_592_000)?),
            password_reset_ttl: Duration::from_secs(parse_env_u64(
                "PASSWORD_RESET_TTL_SECS",
                3600,
            )?),

            // FAQ response cache
            faq_cache_ttl: Duration::from_secs(parse_env_u64("FAQ_CACHE_TTL_SECS", 300)?),
        })
    }

    /// Validate that the configuration is usable.
    ///
    /// # Errors
    ///
    /// Returns an error if the configuration is invalid.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.s3_bucket.is_empty() {
            return Err(ConfigError::InvalidValue {
                name: "S3_BUCKET".to_string(),
                message: "cannot be empty".to_string(),
            });
        }
        if self.mail_relay_url.is_empty() {
            return Err(ConfigError::InvalidValue {
                name: "MAIL_RELAY_URL".to_string(),
                message: "cannot be empty".to_string(),
            });
        }
        if self.hit_flush_interval.is_zero() {
            return Err(ConfigError::InvalidValue {
                name: "HIT_FLUSH_INTERVAL_SECS".to_string(),
                message: "must be at least 1".to_string(),
            });
        }
        if self.deadline_sweep_interval.is_zero() {
            return Err(ConfigError::InvalidValue {
                name: "DEADLINE_SWEEP_INTERVAL_SECS".to_string(),
                message: "must be at least 1".to_string(),
            });
        }
        Ok(())
    }
}

fn required_env(name: &str) -> Result<String, ConfigError> {
    std::env::var(name).map_err(|_| ConfigError::MissingEnvVar(name.to_string()))
}

fn optional_env(name: &str) -> Option<String> {
    std::env::var(name).ok().filter(|s| !s.is_empty())
}

fn env_or_default(name: &str, default: &str) -> String {
    std::env::var(name)
        .ok()
        .filter(|s| !s.is_empty())
        .unwrap_or_else(|| default.to_string())
}

fn parse_env_u64(name: &str, default: u64) -> Result<u64, ConfigError> {
    match std::env::var(name) {
        Ok(val) if !val.is_empty() => val.parse().map_err(|e| ConfigError::ParseInt {
            name: name.to_string(),
            source: e,
        }),
        _ => Ok(default),
    }
}

fn parse_env_u16(name: &str, default: u16) -> Result<u16, ConfigError> {
    match std::env::var(name) {
        Ok(val) if !val.is_empty() => val.parse().map_err(|e| ConfigError::ParseInt {
            name: name.to_string(),
            source: e,
        }),
        _ => Ok(default),
    }
}
