//! Configuration loading, persistence, and change notification.

pub mod schema;
pub mod storage;
pub mod store;

pub use schema::{Config, ServiceConfig, Settings, SettingsPatch};
pub use storage::{get_config_path, load_config};
pub use store::SettingsStore;
