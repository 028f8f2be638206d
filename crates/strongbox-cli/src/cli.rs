use clap::{Parser, Subcommand};

/// CLI surface definition.
#[derive(Parser, Debug)]
#[command(
    name = "strongbox",
    about = "Encrypted local key-value store",
    version,
    propagate_version = true
)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Command,
}

#[derive(Subcommand, Debug, Clone, PartialEq, Eq)]
pub enum Command {
    /// Read a value and print it (JSON is pretty-printed).
    Get {
        key: String,
        /// Fail instead of printing nothing when the value is missing or unreadable.
        #[arg(long)]
        strict: bool,
    },
    /// Write a value, encrypting it when encryption is enabled.
    Set { key: String, value: String },
    /// Remove one or more keys (missing keys are ignored).
    Remove {
        #[arg(required = true)]
        keys: Vec<String>,
    },
    /// Print version and exit.
    Version,
    /// Run a write/read/remove round trip against the configured store.
    Health,
    /// Manage CLI configuration.
    #[command(subcommand)]
    Config(ConfigCommand),
    /// Manage the passphrase kept in the OS keyring.
    #[command(subcommand)]
    Secret(SecretCommand),
}

#[derive(Subcommand, Debug, Clone, PartialEq, Eq)]
pub enum ConfigCommand {
    /// Create a default config file if one does not exist.
    Init,
}

#[derive(Subcommand, Debug, Clone, PartialEq, Eq)]
pub enum SecretCommand {
    /// Store the passphrase in the OS keyring.
    Set { value: String },
}
