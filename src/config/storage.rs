use crate::config::schema::Config;
use crate::error::{Result, TabscribeError};
use std::fs;
use std::path::{Path, PathBuf};

/// Get the configuration file path based on platform.
pub fn get_config_path() -> PathBuf {
    let config_dir = dirs::config_dir()
        .map(|p| p.join("tabscribe"))
        .unwrap_or_else(|| PathBuf::from("."));

    config_dir.join("config.toml")
}

/// Load configuration from a file, creating a default one if not present.
pub fn load_config_from(path: &Path) -> Result<Config> {
    if !path.exists() {
        tracing::info!("Config file not found at {:?}, creating default", path);
        let config = Config::default();
        save_config_to(path, &config)?;
        return Ok(config);
    }

    let content = fs::read_to_string(path).map_err(|e| {
        TabscribeError::Config(format!("Failed to read config from {:?}: {}", path, e))
    })?;

    let config: Config = toml::from_str(&content)?;

    tracing::info!("Loaded config from {:?}", path);
    Ok(config)
}

/// Load configuration from the default platform location.
pub fn load_config() -> Result<Config> {
    load_config_from(&get_config_path())
}

/// Save configuration to a file.
pub fn save_config_to(path: &Path, config: &Config) -> Result<()> {
    if let Some(parent) = path.parent() {
        fs::create_dir_all(parent).map_err(|e| {
            TabscribeError::Config(format!(
                "Failed to create config directory {:?}: {}",
                parent, e
            ))
        })?;
    }

    let content = toml::to_string_pretty(config)?;

    fs::write(path, content).map_err(|e| {
        TabscribeError::Config(format!("Failed to write config to {:?}: {}", path, e))
    })?;

    tracing::debug!("Saved config to {:?}", path);
    Ok(())
}
