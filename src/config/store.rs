//! In-memory settings mirror with change notification.
//!
//! Settings are loaded once at startup, updated last-write-wins, persisted
//! back to the config file, and pushed to listeners over a watch channel.

use crate::config::schema::{Config, ServiceConfig, Settings, SettingsPatch};
use crate::config::storage;
use crate::error::Result;
use std::path::PathBuf;
use tokio::sync::watch;

pub struct SettingsStore {
    /// Config file path; `None` keeps the store purely in memory.
    path: Option<PathBuf>,
    service: ServiceConfig,
    tx: watch::Sender<Settings>,
}

impl SettingsStore {
    /// Open the store backed by the default platform config file.
    pub fn open() -> Result<Self> {
        let path = storage::get_config_path();
        let config = storage::load_config_from(&path)?;
        Ok(Self::with_config(Some(path), config))
    }

    /// Build a store from an already-loaded config.
    pub fn with_config(path: Option<PathBuf>, config: Config) -> Self {
        let (tx, _) = watch::channel(config.settings);
        Self {
            path,
            service: config.service,
            tx,
        }
    }

    /// In-memory store with the given settings, nothing persisted.
    pub fn in_memory(settings: Settings) -> Self {
        let (tx, _) = watch::channel(settings);
        Self {
            path: None,
            service: ServiceConfig::default(),
            tx,
        }
    }

    /// Snapshot of the current settings.
    pub fn current(&self) -> Settings {
        self.tx.borrow().clone()
    }

    /// Subscribe to settings changes.
    pub fn subscribe(&self) -> watch::Receiver<Settings> {
        self.tx.subscribe()
    }

    pub fn service(&self) -> &ServiceConfig {
        &self.service
    }

    /// Apply a partial update, persist, and notify listeners.
    pub fn update(&self, patch: SettingsPatch) -> Result<Settings> {
        let mut settings = self.tx.borrow().clone();
        settings.apply(patch);

        if let Some(path) = &self.path {
            let config = Config {
                settings: settings.clone(),
                service: self.service.clone(),
            };
            storage::save_config_to(path, &config)?;
        }

        self.tx.send_replace(settings.clone());
        Ok(settings)
    }
}
