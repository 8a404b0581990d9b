use std::{env, fmt::Display, path::PathBuf, str::FromStr};

use thiserror::Error;
use tracing::{info, warn};

/// One year; `chrono::Duration` arithmetic on token expiry must not overflow.
const MAX_TOKEN_TTL_HOURS: i64 = 24 * 365;

/// Placeholder JWT secrets that MUST NOT be used.
const PLACEHOLDER_SECRETS: &[&str] = &["change-me-to-a-random-string", "dev-secret-change-me"];

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("AGORA_JWT_SECRET is unset or still a placeholder")]
    MissingSecret,

    #[error("invalid {key} value '{value}': {reason}")]
    Invalid {
        key: &'static str,
        value: String,
        reason: String,
    },
}

pub struct Config {
    pub host: String,
    pub port: u16,
    pub db_path: PathBuf,
    pub jwt_secret: String,
    pub token_ttl_hours: i64,
    pub upload_dir: PathBuf,
    pub public_url: String,
    pub max_upload_mb: usize,
}

impl Config {
    pub fn load() -> Result<Self, ConfigError> {
        let jwt_secret = env::var("AGORA_JWT_SECRET").unwrap_or_default();
        if jwt_secret.trim().is_empty() || PLACEHOLDER_SECRETS.contains(&jwt_secret.as_str()) {
            return Err(ConfigError::MissingSecret);
        }

        Ok(Self {
            host: try_load("AGORA_HOST", "0.0.0.0")?,
            port: try_load("AGORA_PORT", "8082")?,
            db_path: try_load("AGORA_DB_PATH", "agora.db")?,
            jwt_secret,
            token_ttl_hours: at_most(
                positive(try_load("AGORA_TOKEN_TTL_HOURS", "24")?, "AGORA_TOKEN_TTL_HOURS")?,
                MAX_TOKEN_TTL_HOURS,
                "AGORA_TOKEN_TTL_HOURS",
            )?,
            upload_dir: try_load("AGORA_UPLOAD_DIR", "./uploads")?,
            public_url: try_load("AGORA_PUBLIC_URL", "http://localhost:8082")?,
            max_upload_mb: positive(try_load("AGORA_MAX_UPLOAD_MB", "20")?, "AGORA_MAX_UPLOAD_MB")?,
        })
    }

    pub fn upload_limit_bytes(&self) -> usize {
        self.max_upload_mb.saturating_mul(1024 * 1024)
    }
}

fn try_load<T: FromStr>(key: &'static str, default: &str) -> Result<T, ConfigError>
where
    T::Err: Display,
{
    let value = env::var(key).unwrap_or_else(|_| {
        info!("{key} not set, using default: {default}");
        default.to_string()
    });
    value.parse().map_err(|e: T::Err| {
        warn!("Invalid {key} value: {e}");
        ConfigError::Invalid {
            key,
            reason: e.to_string(),
            value,
        }
    })
}

fn positive<T: PartialOrd + Default + Display>(value: T, key: &'static str) -> Result<T, ConfigError> {
    if value > T::default() {
        Ok(value)
    } else {
        Err(ConfigError::Invalid {
            key,
            value: value.to_string(),
            reason: "must be greater than zero".into(),
        })
    }
}

fn at_most<T: PartialOrd + Display>(value: T, max: T, key: &'static str) -> Result<T, ConfigError> {
    if value <= max {
        Ok(value)
    } else {
        Err(ConfigError::Invalid {
            key,
            value: value.to_string(),
            reason: format!("must be at most {max}"),
        })
    }
}
