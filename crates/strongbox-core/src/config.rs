use std::{
    env, fmt,
    sync::{Arc, PoisonError, RwLock},
};

use serde::{Deserialize, Serialize};

/// Default environment variable holding the encryption flag.
pub const ENV_APPLY_ENCRYPTION: &str = "APPLY_ENCRYPTION";
/// Default environment variable holding the passphrase.
pub const ENV_SECRET_KEY: &str = "SECRET_KEY";

/// Point-in-time view of the encryption configuration, taken once per store call.
#[derive(Clone, Default, PartialEq, Eq, Deserialize, Serialize)]
pub struct EncryptionSettings {
    pub enabled: bool,
    pub secret: String,
}

impl EncryptionSettings {
    pub fn new(enabled: bool, secret: impl Into<String>) -> Self {
        Self {
            enabled,
            secret: secret.into(),
        }
    }

    /// Settings that always store plain text.
    pub fn disabled() -> Self {
        Self::default()
    }

    /// Encryption applies only when the flag is on and a secret is present.
    pub fn is_active(&self) -> bool {
        self.enabled && !self.secret.is_empty()
    }
}

impl fmt::Debug for EncryptionSettings {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("EncryptionSettings")
            .field("enabled", &self.enabled)
            .field("secret", &"<redacted>")
            .finish()
    }
}

/// Supplies live encryption configuration. Read on every store call; never cached.
pub trait ConfigResolver: Send + Sync {
    fn encryption_enabled(&self) -> bool;

    fn secret(&self) -> String;

    fn snapshot(&self) -> EncryptionSettings {
        EncryptionSettings {
            enabled: self.encryption_enabled(),
            secret: self.secret(),
        }
    }
}

/// Resolver backed by shared settings that can be changed at runtime.
/// Clones observe each other's updates.
#[derive(Debug, Default, Clone)]
pub struct StaticResolver {
    inner: Arc<RwLock<EncryptionSettings>>,
}

impl StaticResolver {
    pub fn new(settings: EncryptionSettings) -> Self {
        Self {
            inner: Arc::new(RwLock::new(settings)),
        }
    }

    // Settings are replaced field by field, so a poisoned lock still holds a valid value.
    pub fn set_enabled(&self, enabled: bool) {
        let mut guard = self.inner.write().unwrap_or_else(PoisonError::into_inner);
        guard.enabled = enabled;
    }

    pub fn set_secret(&self, secret: impl Into<String>) {
        let mut guard = self.inner.write().unwrap_or_else(PoisonError::into_inner);
        guard.secret = secret.into();
    }
}

impl ConfigResolver for StaticResolver {
    fn encryption_enabled(&self) -> bool {
        self.snapshot().enabled
    }

    fn secret(&self) -> String {
        self.snapshot().secret
    }

    fn snapshot(&self) -> EncryptionSettings {
        self.inner
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .clone()
    }
}

/// Resolver that reads the process environment on every call.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EnvResolver {
    enabled_var: String,
    secret_var: String,
}

impl Default for EnvResolver {
    fn default() -> Self {
        Self::with_vars(ENV_APPLY_ENCRYPTION, ENV_SECRET_KEY)
    }
}

impl EnvResolver {
    pub fn new() -> Self {
        Self::default()
    }

    /// Use custom variable names (e.g. an application-specific prefix).
    pub fn with_vars(enabled_var: impl Into<String>, secret_var: impl Into<String>) -> Self {
        Self {
            enabled_var: enabled_var.into(),
            secret_var: secret_var.into(),
        }
    }
}

impl ConfigResolver for EnvResolver {
    fn encryption_enabled(&self) -> bool {
        env::var(&self.enabled_var)
            .map(|raw| parse_flag(&raw))
            .unwrap_or(false)
    }

    fn secret(&self) -> String {
        env::var(&self.secret_var).unwrap_or_default()
    }
}

/// `true` and `1` enable (case-insensitive); everything else disables.
pub fn parse_flag(raw: &str) -> bool {
    let raw = raw.trim();
    raw.eq_ignore_ascii_case("true") || raw == "1"
}
