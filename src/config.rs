//! Process configuration loaded from the environment.

use std::env;

use crate::error::ConfigError;

pub const DEFAULT_PORT: u16 = 8080;
pub const DEFAULT_TELEGRAM_API_URL: &str = "https://api.telegram.org";

/// Deployment environment name (`APP_ENV`), defaults to `sandbox`.
pub fn get_environment() -> String {
    env::var("APP_ENV").unwrap_or_else(|_| "sandbox".to_string())
}

/// Process level configuration. Runtime settings (thresholds, pairs, ...)
/// live in [`crate::models::Settings`] and can change while running.
#[derive(Debug, Clone)]
pub struct AppConfig {
    pub port: u16,
    pub telegram_token: Option<String>,
    pub telegram_chat_id: Option<String>,
    pub telegram_api_url: String,
    pub signal_interval_secs: Option<u64>,
    pub autostart: bool,
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            port: DEFAULT_PORT,
            telegram_token: None,
            telegram_chat_id: None,
            telegram_api_url: DEFAULT_TELEGRAM_API_URL.to_string(),
            signal_interval_secs: None,
            autostart: false,
        }
    }
}

impl AppConfig {
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|key| env::var(key).ok())
    }

    /// Build the config from an arbitrary key lookup.
    pub fn from_lookup<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let defaults = Self::default();
        let non_empty = |key: &str| lookup(key).filter(|v| !v.trim().is_empty());

        let port = match non_empty("PORT") {
            Some(raw) => parse_field("PORT", &raw)?,
            None => defaults.port,
        };

        let signal_interval_secs = match non_empty("SIGNAL_INTERVAL_SECONDS") {
            Some(raw) => Some(parse_field("SIGNAL_INTERVAL_SECONDS", &raw)?),
            None => None,
        };

        let autostart = match non_empty("AUTOSTART") {
            Some(raw) => parse_bool("AUTOSTART", &raw)?,
            None => defaults.autostart,
        };

        Ok(Self {
            port,
            telegram_token: non_empty("TELEGRAM_TOKEN"),
            telegram_chat_id: non_empty("TELEGRAM_CHAT_ID"),
            telegram_api_url: non_empty("TELEGRAM_API_URL").unwrap_or(defaults.telegram_api_url),
            signal_interval_secs,
            autostart,
        })
    }
}

fn parse_field<T: std::str::FromStr>(field: &str, raw: &str) -> Result<T, ConfigError> {
    raw.trim().parse().map_err(|_| ConfigError::InvalidField {
        field: field.to_string(),
        value: raw.to_string(),
    })
}

pub(crate) fn parse_bool(field: &str, raw: &str) -> Result<bool, ConfigError> {
    match raw.trim().to_ascii_lowercase().as_str() {
        "1" | "true" | "yes" | "on" => Ok(true),
        "0" | "false" | "no" | "off" => Ok(false),
        _ => Err(ConfigError::InvalidField {
            field: field.to_string(),
            value: raw.to_string(),
        }),
    }
}
