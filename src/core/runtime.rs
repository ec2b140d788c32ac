//! Wires the engine together from process configuration

use std::sync::Arc;

use tracing::{info, warn};

use crate::config::AppConfig;
use crate::core::engine::{BotEngine, EngineConfig};
use crate::core::settings::SettingsStore;
use crate::error::ConfigError;
use crate::metrics::Metrics;
use crate::models::settings::Settings;
use crate::services::notifications::TelegramTransport;

/// Default settings with the environment overrides applied.
pub fn initial_settings(config: &AppConfig) -> Settings {
    let mut settings = Settings::default();
    if let Some(chat_id) = &config.telegram_chat_id {
        settings.notification_target = Some(chat_id.clone());
    }
    if let Some(interval) = config.signal_interval_secs {
        settings.interval_secs = interval;
    }
    settings
}

/// Build an engine that notifies through Telegram.
pub fn build_engine(
    config: &AppConfig,
    metrics: Option<Arc<Metrics>>,
) -> Result<BotEngine, ConfigError> {
    let settings = SettingsStore::new(initial_settings(config))?;

    if config.telegram_token.is_none() {
        warn!("TELEGRAM_TOKEN not set - notifications will fail until it is configured");
    }
    let transport = Arc::new(TelegramTransport::with_base_url(
        config.telegram_api_url.clone(),
        config.telegram_token.clone(),
    ));

    let mut builder = BotEngine::builder(settings, transport).with_config(EngineConfig::default());
    if let Some(metrics) = metrics {
        builder = builder.with_metrics(metrics);
    }

    info!(
        notifications = config.telegram_chat_id.is_some(),
        "Runtime: signal engine built"
    );
    Ok(builder.build())
}
