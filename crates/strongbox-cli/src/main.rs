mod cli;
mod config;
mod storage;

use crate::cli::{Command, ConfigCommand, SecretCommand};
use clap::Parser;
use color_eyre::Result;
use strongbox_core::{config::ConfigResolver, storage::KeyValueStore, value::StoredValue};
use strongbox_storage::{EncryptedStore, Lookup};
use tracing::{info, warn};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

#[tokio::main]
async fn main() -> Result<()> {
    color_eyre::install()?;
    init_tracing();

    let cli = cli::Cli::parse();
    let config = config::load()?;
    match cli.command {
        Command::Get { key, strict } => run_get(&config, &key, strict).await?,
        Command::Set { key, value } => run_set(&config, &key, &value).await?,
        Command::Remove { keys } => run_remove(&config, &keys).await?,
        Command::Version => print_version(),
        Command::Health => run_health_check(&config).await?,
        Command::Config(ConfigCommand::Init) => init_config(&config)?,
        Command::Secret(SecretCommand::Set { value }) => set_secret(&value)?,
    }

    Ok(())
}

fn init_tracing() {
    // Logs go to stderr so `get` output stays pipeable.
    let env_filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    let fmt_layer = tracing_subscriber::fmt::layer()
        .with_target(false)
        .with_writer(std::io::stderr);
    tracing_subscriber::registry()
        .with(env_filter)
        .with(fmt_layer)
        .init();
}

fn print_version() {
    println!("strongbox {}", env!("CARGO_PKG_VERSION"));
}

async fn run_get(config: &config::Config, key: &str, strict: bool) -> Result<()> {
    let store = storage::store_from_config(config)?;
    let lookup = store.get(key).await;
    if let Some(rendered) = render_lookup(lookup, strict)? {
        println!("{rendered}");
    }
    Ok(())
}

/// Text to print for a lookup; `None` prints nothing (the empty sentinel).
fn render_lookup(lookup: Lookup, strict: bool) -> Result<Option<String>> {
    match lookup {
        Lookup::Found(StoredValue::Json(value)) => Ok(Some(serde_json::to_string_pretty(&value)?)),
        Lookup::Found(StoredValue::Text(text)) => Ok(Some(text)),
        other if strict => color_eyre::eyre::bail!("value {}", other.label()),
        other => {
            if other != Lookup::NotFound {
                warn!(outcome = other.label(), "value could not be read");
            }
            Ok(None)
        }
    }
}

async fn run_set(config: &config::Config, key: &str, value: &str) -> Result<()> {
    let store = storage::store_from_config(config)?;
    if !store.resolver().snapshot().is_active() {
        info!("encryption inactive; storing plain text");
    }
    store
        .set(key, value)
        .await
        .map_err(|e| color_eyre::eyre::eyre!(e.to_string()))
}

async fn run_remove(config: &config::Config, keys: &[String]) -> Result<()> {
    let store = storage::store_from_config(config)?;
    store
        .remove_many(keys)
        .await
        .map_err(|e| color_eyre::eyre::eyre!(e.to_string()))
}

/// Runs a quick round trip through the configured store.
async fn run_health_check(config: &config::Config) -> Result<()> {
    let store = storage::store_from_config(config)?;
    run_store_health(&store).await?;
    let mode = if store.resolver().snapshot().is_active() {
        "encrypted"
    } else {
        "plain"
    };
    println!("Storage: ok ({mode})");
    Ok(())
}

async fn run_store_health<B: KeyValueStore, R: ConfigResolver>(
    store: &EncryptedStore<B, R>,
) -> Result<()> {
    let probe_key = "health/probe";
    let payload = "ok";
    store
        .set(probe_key, payload)
        .await
        .map_err(|e| color_eyre::eyre::eyre!(e.to_string()))?;
    let round_trip = store.get(probe_key).await;
    store
        .remove(probe_key)
        .await
        .map_err(|e| color_eyre::eyre::eyre!(e.to_string()))?;

    match round_trip {
        Lookup::Found(value) if value.to_string() == payload => Ok(()),
        other => color_eyre::eyre::bail!("storage round-trip failed: {}", other.label()),
    }
}

fn init_config(config: &config::Config) -> Result<()> {
    let path = config::write_default_if_missing(config)?;
    println!("Config initialized at {}", path.display());
    Ok(())
}

fn set_secret(value: &str) -> Result<()> {
    storage::keyring_resolver(true)?
        .store_secret(value)
        .map_err(|e| color_eyre::eyre::eyre!(e.to_string()))?;
    println!("Passphrase stored in the OS keyring. Set `use_keyring = true` under [encryption] to use it.");
    Ok(())
}

#[cfg(test)]
mod tests {
    use serde_json::json;
    use strongbox_core::config::{EncryptionSettings, StaticResolver};
    use strongbox_storage::file_store::FileKeyValueStore;

    use super::*;

    #[tokio::test]
    async fn health_check_succeeds_in_both_modes() {
        for settings in [
            EncryptionSettings::new(true, "s3cr3t"),
            EncryptionSettings::disabled(),
        ] {
            let dir = tempfile::tempdir().expect("tempdir");
            let store = EncryptedStore::new(
                FileKeyValueStore::new(dir.path()),
                StaticResolver::new(settings),
            );
            run_store_health(&store)
                .await
                .expect("health check should succeed");
            assert_eq!(store.backend().get("health/probe").await.expect("get"), None);
        }
    }

    #[test]
    fn renders_json_pretty_and_text_verbatim() {
        let rendered = render_lookup(Lookup::Found(StoredValue::Json(json!({"id": 1}))), false)
            .expect("render");
        assert_eq!(rendered.as_deref(), Some("{\n  \"id\": 1\n}"));

        let rendered =
            render_lookup(Lookup::Found(StoredValue::Text("plain text".into())), true).expect("render");
        assert_eq!(rendered.as_deref(), Some("plain text"));
    }

    #[test]
    fn pretty_output_keeps_stored_key_order() {
        let value = StoredValue::parse(r#"{"title":"Welcome","id":1}"#);
        let rendered = render_lookup(Lookup::Found(value), false).expect("render");
        assert_eq!(
            rendered.as_deref(),
            Some("{\n  \"title\": \"Welcome\",\n  \"id\": 1\n}")
        );
    }

    #[test]
    fn strict_mode_reports_outcome() {
        let err = render_lookup(Lookup::DecryptionFailed, true).expect_err("strict should fail");
        assert!(err.to_string().contains("decryption failed"));
        assert_eq!(render_lookup(Lookup::NotFound, false).expect("lenient"), None);
    }
}
