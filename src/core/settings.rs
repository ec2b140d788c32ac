//! Shared, lock-guarded settings.

use std::sync::Arc;

use tokio::sync::RwLock;
use tracing::info;

use crate::error::ConfigError;
use crate::models::settings::{Settings, SettingsPatch};

/// Settings shared between the engine loop and control callers. Every
/// operation is atomic on its own; nothing is held across I/O.
#[derive(Clone)]
pub struct SettingsStore {
    inner: Arc<RwLock<Settings>>,
}

impl SettingsStore {
    pub fn new(settings: Settings) -> Result<Self, ConfigError> {
        settings.validate()?;
        Ok(Self {
            inner: Arc::new(RwLock::new(settings)),
        })
    }

    /// Snapshot of the current settings.
    pub async fn get(&self) -> Settings {
        self.inner.read().await.clone()
    }

    /// Merge `patch` into the current settings. Nothing changes when the
    /// merged result is invalid.
    pub async fn update(&self, patch: &SettingsPatch) -> Result<Settings, ConfigError> {
        let mut current = self.inner.write().await;
        let next = current.merged(patch);
        next.validate()?;
        *current = next.clone();
        drop(current);

        info!(
            interval = next.interval_secs,
            selected = ?next.selected_instruments,
            "SettingsStore: settings updated"
        );
        Ok(next)
    }

    /// Replace the settings wholesale.
    pub async fn replace(&self, settings: Settings) -> Result<(), ConfigError> {
        settings.validate()?;
        *self.inner.write().await = settings;
        Ok(())
    }
}

impl Default for SettingsStore {
    fn default() -> Self {
        Self {
            inner: Arc::new(RwLock::new(Settings::default())),
        }
    }
}
