pub mod station;

pub use station::{Config, SubagentSettings, ToolSettings};

use anyhow::{Context, Result};
use std::fs;
use std::path::{Path, PathBuf};

/// Get the configuration file path
pub fn config_path() -> Result<PathBuf> {
    let config_dir = dirs::config_dir()
        .context("Failed to get config directory")?
        .join("fleet");

    fs::create_dir_all(&config_dir).context("Failed to create config directory")?;

    Ok(config_dir.join("config.toml"))
}

/// Load configuration from file, or create default if not exists
pub fn load_or_create_config() -> Result<Config> {
    let path = config_path()?;

    if path.exists() {
        load_config_from(&path)
    } else {
        let config = Config::default();
        save_config_to(&config, &path)?;

        println!("Created default config at: {}", path.display());
        println!("Please edit this file to add your API credentials.");

        Ok(config)
    }
}

/// Load configuration from an explicit path
pub fn load_config_from(path: &Path) -> Result<Config> {
    let content = fs::read_to_string(path)
        .with_context(|| format!("Failed to read config file: {}", path.display()))?;
    let config: Config = toml::from_str(&content)
        .with_context(|| format!("Failed to parse config file: {}", path.display()))?;
    Ok(config)
}

/// Save configuration to an explicit path
pub fn save_config_to(config: &Config, path: &Path) -> Result<()> {
    let content = toml::to_string_pretty(config).context("Failed to serialize config")?;
    fs::write(path, content)
        .with_context(|| format!("Failed to write config file: {}", path.display()))?;
    Ok(())
}
