use std::path::PathBuf;

use crate::config::{Config, LayeredResolver};
use color_eyre::Result;
use dirs::data_dir;
use strongbox_core::config::ConfigResolver;
use strongbox_storage::{
    file_store::FileKeyValueStore, keyring_resolver::KeyringResolver, EncryptedStore,
};
use tracing::debug;

pub const KEYRING_SERVICE: &str = "strongbox";
pub const KEYRING_ACCOUNT: &str = "passphrase";

/// Resolver chosen from the config file.
#[derive(Debug, Clone)]
pub enum CliResolver {
    Layered(LayeredResolver),
    Keyring(KeyringResolver),
}

impl ConfigResolver for CliResolver {
    fn encryption_enabled(&self) -> bool {
        match self {
            CliResolver::Layered(inner) => inner.encryption_enabled(),
            CliResolver::Keyring(inner) => inner.encryption_enabled(),
        }
    }

    fn secret(&self) -> String {
        match self {
            CliResolver::Layered(inner) => inner.secret(),
            CliResolver::Keyring(inner) => inner.secret(),
        }
    }
}

pub type CliStore = EncryptedStore<FileKeyValueStore, CliResolver>;

/// Resolve the default data directory for Strongbox.
pub fn default_data_dir() -> Result<PathBuf> {
    let base = data_dir().ok_or_else(|| color_eyre::eyre::eyre!("no data dir available"))?;
    Ok(base.join("strongbox"))
}

pub fn resolver_from_config(config: &Config) -> Result<CliResolver> {
    if config.encryption.use_keyring {
        Ok(CliResolver::Keyring(keyring_resolver(config.encryption.enabled)?))
    } else {
        Ok(CliResolver::Layered(LayeredResolver::new(
            config.encryption.clone(),
        )))
    }
}

/// Resolver for the CLI's own keyring entry.
pub fn keyring_resolver(enabled: bool) -> Result<KeyringResolver> {
    KeyringResolver::new(enabled, KEYRING_SERVICE, KEYRING_ACCOUNT)
        .map_err(|e| color_eyre::eyre::eyre!(e.to_string()))
}

/// Build the file-backed store, honoring a `data_dir` override.
pub fn store_from_config(config: &Config) -> Result<CliStore> {
    let root = match &config.data_dir {
        Some(root) => root.clone(),
        None => default_data_dir()?,
    };
    debug!(?root, keyring = config.encryption.use_keyring, "initializing store");
    Ok(EncryptedStore::new(
        FileKeyValueStore::new(root),
        resolver_from_config(config)?,
    ))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::EncryptionConfig;

    #[test]
    fn keyring_flag_selects_keyring_resolver() {
        let config = Config {
            data_dir: None,
            encryption: EncryptionConfig {
                enabled: true,
                secret: None,
                use_keyring: true,
            },
        };
        keyring::set_default_credential_builder(keyring::mock::default_credential_builder());
        assert!(matches!(
            resolver_from_config(&config).expect("resolver"),
            CliResolver::Keyring(_)
        ));
        assert!(matches!(
            resolver_from_config(&Config::default()).expect("resolver"),
            CliResolver::Layered(_)
        ));
    }

    #[test]
    fn data_dir_override_is_used() {
        let dir = tempfile::tempdir().expect("tempdir");
        let config = Config {
            data_dir: Some(dir.path().to_path_buf()),
            encryption: EncryptionConfig::default(),
        };
        let store = store_from_config(&config).expect("store");
        assert_eq!(store.backend().root(), dir.path());
    }
}
