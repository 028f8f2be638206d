use std::{
    env, fs,
    path::{Path, PathBuf},
};

use color_eyre::Result;
use dirs::config_dir;
use serde::{Deserialize, Serialize};
use strongbox_core::config::{parse_flag, ConfigResolver, ENV_APPLY_ENCRYPTION, ENV_SECRET_KEY};

/// User-level configuration loaded from `~/.config/strongbox/config.toml` (platform-specific).
#[derive(Debug, Clone, Deserialize, Serialize, Default, PartialEq, Eq)]
pub struct Config {
    /// Override for the data directory holding stored records.
    pub data_dir: Option<PathBuf>,
    #[serde(default)]
    pub encryption: EncryptionConfig,
}

#[derive(Debug, Clone, Deserialize, Serialize, Default, PartialEq, Eq)]
pub struct EncryptionConfig {
    #[serde(default)]
    pub enabled: bool,
    /// Passphrase kept in the file. Prefer the keyring or the environment.
    pub secret: Option<String>,
    /// Read the passphrase from the OS keyring instead of the file or environment.
    #[serde(default)]
    pub use_keyring: bool,
}

/// File settings overlaid by `APPLY_ENCRYPTION` / `SECRET_KEY`, re-read on every call.
/// A variable that is set wins over the file, even when it disables encryption.
#[derive(Debug, Clone)]
pub struct LayeredResolver {
    file: EncryptionConfig,
    enabled_var: String,
    secret_var: String,
}

impl LayeredResolver {
    pub fn new(file: EncryptionConfig) -> Self {
        Self::with_vars(file, ENV_APPLY_ENCRYPTION, ENV_SECRET_KEY)
    }

    pub fn with_vars(
        file: EncryptionConfig,
        enabled_var: impl Into<String>,
        secret_var: impl Into<String>,
    ) -> Self {
        Self {
            file,
            enabled_var: enabled_var.into(),
            secret_var: secret_var.into(),
        }
    }
}

impl ConfigResolver for LayeredResolver {
    fn encryption_enabled(&self) -> bool {
        env::var(&self.enabled_var)
            .map(|raw| parse_flag(&raw))
            .unwrap_or(self.file.enabled)
    }

    fn secret(&self) -> String {
        env::var(&self.secret_var)
            .ok()
            .or_else(|| self.file.secret.clone())
            .unwrap_or_default()
    }
}

/// Load config from the default path; if missing, return defaults.
pub fn load() -> Result<Config> {
    let path = default_path()?;
    load_from_path(path)
}

/// Load config from a given path; if missing or empty, return defaults.
pub fn load_from_path(path: impl AsRef<Path>) -> Result<Config> {
    let path = path.as_ref();
    if !path.exists() {
        return Ok(Config::default());
    }
    let contents = fs::read_to_string(path)?;
    if contents.trim().is_empty() {
        return Ok(Config::default());
    }
    let cfg: Config = toml::from_str(&contents)?;
    Ok(cfg)
}

/// Resolve the default config path (platform aware).
pub fn default_path() -> Result<PathBuf> {
    let base = config_dir().ok_or_else(|| color_eyre::eyre::eyre!("no config dir available"))?;
    Ok(base.join("strongbox").join("config.toml"))
}

/// Write the config to the default path unless a file is already there.
pub fn write_default_if_missing(config: &Config) -> Result<PathBuf> {
    write_if_missing(config, &default_path()?)
}

fn write_if_missing(config: &Config, path: &Path) -> Result<PathBuf> {
    if path.exists() {
        return Ok(path.to_path_buf());
    }
    if let Some(parent) = path.parent() {
        fs::create_dir_all(parent)?;
    }
    let body = toml::to_string_pretty(config)?;
    fs::write(path, body)?;
    Ok(path.to_path_buf())
}
