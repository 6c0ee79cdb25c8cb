use std::path::{Path, PathBuf};

use bhojan_bridge::config::Config;
use directories::ProjectDirs;
use tokio::{
    fs::{OpenOptions, create_dir_all, read_to_string},
    io::AsyncWriteExt,
};

/// Errors that can occur while loading or resolving application configuration.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    /// Failed to determine the user's configuration directory. This usually
    /// occurs when required environment variables are missing (e.g., `$HOME`
    /// on Unix or `%APPDATA%` on Windows).
    #[error("failed to obtain user's directories")]
    DirectoriesNotFound,
    /// An I/O error occurred while reading or writing the configuration file.
    #[error("failed to read config: {0}")]
    IoError(#[from] std::io::Error),
    /// The configuration file contains invalid TOML or does not match the expected structure.
    #[error("failed to deserialize config: {0}")]
    DeserializeError(#[from] toml::de::Error),
    /// Failed to serialize the configuration to TOML (e.g., when saving changes).
    #[error("failed to serialize config: {0}")]
    SerializeError(#[from] toml::ser::Error),
}

/// Default location of `config.toml` in the user's configuration directory.
pub fn default_config_path() -> Result<PathBuf, ConfigError> {
    match ProjectDirs::from("com", "bhojanxpress", "bhojan-notify") {
        Some(path) => Ok(path.config_dir().join("config.toml")),
        None => Err(ConfigError::DirectoriesNotFound),
    }
}

/// Loads the configuration from `config_path`. When the file does not exist
/// yet, the defaults are written there and returned.
pub async fn load_config(config_path: &Path) -> Result<Config, ConfigError> {
    log::info!("Loading configuration from {config_path:?}");
    if config_path.exists() {
        let contents = read_to_string(config_path).await?;
        let config: Config = toml::from_str(&contents)?;
        return Ok(config);
    }

    let config = Config::default();
    if let Some(parent) = config_path.parent() {
        create_dir_all(parent).await?;
    }

    let contents = toml::to_string_pretty(&config)?;
    let mut file = OpenOptions::new()
        .write(true)
        .create_new(true)
        .open(config_path)
        .await?;
    file.write_all(contents.as_bytes()).await?;
    file.sync_all().await?;

    Ok(config)
}

/// Saves the configuration to `config_path`. This function serializes the
/// provided `Config` to pretty-printed TOML, overwriting any existing file.
pub async fn save_config(config_path: &Path, config: &Config) -> Result<(), ConfigError> {
    if let Some(parent) = config_path.parent() {
        create_dir_all(parent).await?;
    }

    let mut file = OpenOptions::new()
        .write(true)
        .create(true)
        .truncate(true)
        .open(config_path)
        .await?;

    let contents = toml::to_string_pretty(&config)?;
    file.write_all(contents.as_bytes()).await?;
    file.sync_all().await?;

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use bhojan_bridge::feed::Role;
    use tempfile::tempdir;

    #[tokio::test]
    async fn missing_file_is_created_with_defaults() {
        let temp_dir = tempdir().unwrap();
        let config_path = temp_dir.path().join("nested").join("config.toml");

        let config = load_config(&config_path).await.unwrap();
        assert!(config_path.exists());
        assert!(!config.sound.muted);
        assert_eq!(config.server.role, Role::Customer);
    }

    #[tokio::test]
    async fn saved_preferences_survive_reload() {
        let temp_dir = tempdir().unwrap();
        let config_path = temp_dir.path().join("config.toml");

        let mut config = load_config(&config_path).await.unwrap();
        config.sound.muted = true;
        config.server.role = Role::Delivery;
        save_config(&config_path, &config).await.unwrap();

        let reloaded = load_config(&config_path).await.unwrap();
        assert!(reloaded.sound.muted);
        assert_eq!(reloaded.server.role, Role::Delivery);
    }

    #[tokio::test]
    async fn partial_file_falls_back_to_defaults() {
        let temp_dir = tempdir().unwrap();
        let config_path = temp_dir.path().join("config.toml");
        tokio::fs::write(&config_path, "[server]\nrole = \"admin\"\n")
            .await
            .unwrap();

        let config = load_config(&config_path).await.unwrap();
        assert_eq!(config.server.role, Role::Admin);
        assert_eq!(config.dropdown.body_max_chars, 80);
        assert_eq!(config.sound.assets_path, "static/sounds/");
    }
}
