//! Global configuration parsing, validation, and credential loading.

use std::env;
use std::fs;
use std::path::{Path, PathBuf};

use serde::Deserialize;
use tracing::warn;

use crate::{AppError, Result};

/// Keychain service under which credentials are looked up.
pub const KEYRING_SERVICE: &str = "survey-bot";

/// HTTP listener settings for the webhook receiver.
#[derive(Debug, Clone, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub struct ServerConfig {
    /// Interface to bind.
    #[serde(default = "default_host")]
    pub host: String,
    /// Port to bind; `0` asks the OS for an ephemeral port.
    #[serde(default = "default_port")]
    pub port: u16,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: default_host(),
            port: default_port(),
        }
    }
}

/// Slack settings.
///
/// The bot token is loaded at runtime via OS keychain or environment
/// variable, never from the TOML file.
#[derive(Debug, Clone, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub struct SlackConfig {
    /// Channel that receives a summary of every submission.
    pub notify_channel_id: String,
    /// Web API root the client calls, `https://slack.com/api` by default.
    #[serde(default = "default_slack_api_url")]
    pub api_url: String,
    /// Bot user token used for posting messages (populated at runtime).
    #[serde(skip)]
    pub bot_token: String,
}

/// Bin-storage (`JSONBin`) settings.
#[derive(Debug, Clone, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub struct StorageConfig {
    /// API root; bins are created with `POST {base_url}/b`.
    #[serde(default = "default_storage_url")]
    pub base_url: String,
    /// Collection that new bins are filed under.
    #[serde(default)]
    pub collection_id: Option<String>,
    /// Master key sent as `X-Master-Key` (populated at runtime).
    #[serde(skip)]
    pub api_key: String,
}

impl Default for StorageConfig {
    fn default() -> Self {
        Self {
            base_url: default_storage_url(),
            collection_id: None,
            api_key: String::new(),
        }
    }
}

/// Outbound campaign settings.
#[derive(Debug, Clone, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub struct SenderConfig {
    /// File with one recipient user ID per line.
    #[serde(default = "default_recipients_file")]
    pub recipients_file: PathBuf,
    /// Ledger of users already sent the survey; defaults to `<log_dir>/sent.log`.
    #[serde(default)]
    pub ledger_file: Option<PathBuf>,
    /// Pause between consecutive sends, in milliseconds.
    #[serde(default = "default_delay_ms")]
    pub delay_ms: u64,
}

impl Default for SenderConfig {
    fn default() -> Self {
        Self {
            recipients_file: default_recipients_file(),
            ledger_file: None,
            delay_ms: default_delay_ms(),
        }
    }
}

fn default_host() -> String {
    "0.0.0.0".into()
}

fn default_port() -> u16 {
    9340
}

fn default_slack_api_url() -> String {
    "https://slack.com/api".into()
}

fn default_storage_url() -> String {
    "https://api.jsonbin.io/v3".into()
}

fn default_recipients_file() -> PathBuf {
    PathBuf::from("recipients.txt")
}

fn default_delay_ms() -> u64 {
    1200
}

fn default_log_dir() -> PathBuf {
    PathBuf::from("./logs")
}

/// Global configuration parsed from `config.toml`.
#[derive(Debug, Clone, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub struct GlobalConfig {
    /// Directory holding the flat-file response records.
    #[serde(default = "default_log_dir")]
    pub log_dir: PathBuf,
    /// Webhook listener settings.
    #[serde(default)]
    pub server: ServerConfig,
    /// Slack connectivity settings.
    pub slack: SlackConfig,
    /// Bin-storage settings.
    #[serde(default)]
    pub storage: StorageConfig,
    /// Sender pacing and ledger settings.
    #[serde(default)]
    pub sender: SenderConfig,
}

impl GlobalConfig {
    /// Load and validate configuration from a TOML file path.
    ///
    /// # Errors
    ///
    /// Returns `AppError::Config` if the file cannot be read or contains
    /// invalid TOML, or if validation fails.
    pub fn load_from_path(path: impl AsRef<Path>) -> Result<Self> {
        let raw = fs::read_to_string(path)
            .map_err(|err| AppError::Config(format!("failed to read config: {err}")))?;
        Self::from_toml_str(&raw)
    }

    /// Parse configuration from a TOML string.
    ///
    /// # Errors
    ///
    /// Returns `AppError::Config` if parsing or validation fails.
    pub fn from_toml_str(raw: &str) -> Result<Self> {
        let config: Self = toml::from_str(raw)?;
        config.validate()?;
        Ok(config)
    }

    /// Load the Slack bot token from OS keychain with env-var fallback.
    ///
    /// # Errors
    ///
    /// Returns `AppError::Config` if neither keychain nor `SLACK_BOT_TOKEN`
    /// provides a token.
    pub async fn load_slack_credentials(&mut self) -> Result<()> {
        self.slack.bot_token = load_credential("slack_bot_token", "SLACK_BOT_TOKEN").await?;
        Ok(())
    }

    /// Load the storage API key from OS keychain with env-var fallback.
    ///
    /// # Errors
    ///
    /// Returns `AppError::Config` if neither keychain nor `JSONBIN_API_KEY`
    /// provides a key.
    pub async fn load_storage_credentials(&mut self) -> Result<()> {
        self.storage.api_key = load_credential("jsonbin_api_key", "JSONBIN_API_KEY").await?;
        Ok(())
    }

    /// Path of the "already sent" ledger.
    #[must_use]
    pub fn ledger_path(&self) -> PathBuf {
        self.sender
            .ledger_file
            .clone()
            .unwrap_or_else(|| self.log_dir.join("sent.log"))
    }

    fn validate(&self) -> Result<()> {
        if self.slack.notify_channel_id.trim().is_empty() {
            return Err(AppError::Config(
                "slack.notify_channel_id must not be empty".into(),
            ));
        }

        if self.slack.api_url.trim().is_empty() {
            return Err(AppError::Config("slack.api_url must not be empty".into()));
        }

        if self.storage.base_url.trim().is_empty() {
            return Err(AppError::Config("storage.base_url must not be empty".into()));
        }

        Ok(())
    }
}

/// Load a single credential from OS keychain with env-var fallback.
async fn load_credential(keyring_key: &str, env_key: &str) -> Result<String> {
    let key = keyring_key.to_owned();

    // keyring is synchronous I/O.
    let keychain_result = tokio::task::spawn_blocking(move || {
        keyring::Entry::new(KEYRING_SERVICE, &key).and_then(|entry| entry.get_password())
    })
    .await
    .map_err(|err| AppError::Config(format!("keychain task panicked: {err}")))?;

    match keychain_result {
        Ok(value) if !value.is_empty() => return Ok(value),
        Ok(_) => {
            warn!(key = keyring_key, "keychain entry is empty, trying env var");
        }
        Err(err) => {
            warn!(
                key = keyring_key,
                ?err,
                "keychain lookup failed, trying env var"
            );
        }
    }

    match env::var(env_key) {
        Ok(value) if !value.trim().is_empty() => Ok(value),
        _ => Err(AppError::Config(format!(
            "credential {keyring_key} not found in keychain or {env_key} env var"
        ))),
    }
}
