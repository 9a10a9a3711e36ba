use std::{fs, path::PathBuf};

use serde::{Deserialize, Serialize};

use common::types::IdentityId;
use common::vault::{FsKeyVault, VaultError};

use crate::contacts::DEFAULT_MAX_CONTACTS;
use crate::notify::DEFAULT_LIVE_BUFFER;

pub const APP_NAME: &str = "tiletalk";
pub const CONFIG_FILE_NAME: &str = "config.toml";
pub const DB_FILE_NAME: &str = "db.sqlite";
pub const VAULT_DIR_NAME: &str = "vault";

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AppConfig {
    /// Port for the API server
    #[serde(default = "default_api_port")]
    pub api_port: u16,
    /// Cap on authorized contacts per identity
    #[serde(default = "default_max_contacts")]
    pub max_contacts: i64,
    /// Undelivered live hints kept per connection before dropping
    #[serde(default = "default_live_buffer")]
    pub live_buffer: usize,
    /// Timeout applied to API requests, both served and sent
    #[serde(default = "default_request_timeout_secs")]
    pub request_timeout_secs: u64,
    /// Default log level for the daemon
    #[serde(default = "default_log_level")]
    pub log_level: String,
    /// Local identity this CLI acts as, once registered
    #[serde(default)]
    pub identity_id: Option<IdentityId>,
    /// Local identity name, also the vault entry holding its key pair
    #[serde(default)]
    pub username: Option<String>,
}

fn default_api_port() -> u16 {
    5001
}

fn default_max_contacts() -> i64 {
    DEFAULT_MAX_CONTACTS
}

fn default_live_buffer() -> usize {
    DEFAULT_LIVE_BUFFER
}

fn default_request_timeout_secs() -> u64 {
    30
}

fn default_log_level() -> String {
    "info".to_string()
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            api_port: default_api_port(),
            max_contacts: default_max_contacts(),
            live_buffer: default_live_buffer(),
            request_timeout_secs: default_request_timeout_secs(),
            log_level: default_log_level(),
            identity_id: None,
            username: None,
        }
    }
}

impl AppConfig {
    /// Parsed log level, falling back to INFO on anything unrecognized
    pub fn tracing_level(&self) -> tracing::Level {
        self.log_level.parse().unwrap_or(tracing::Level::INFO)
    }
}

#[derive(Debug, Clone)]
pub struct AppState {
    /// Path to the state directory (~/.tiletalk)
    pub tiletalk_dir: PathBuf,
    /// Path to the SQLite database
    pub db_path: PathBuf,
    /// Path to the encrypted key vault
    pub vault_path: PathBuf,
    /// Path to the config file
    pub config_path: PathBuf,
    /// Loaded configuration
    pub config: AppConfig,
}

impl AppState {
    /// Get the state directory path (custom or default ~/.tiletalk)
    pub fn tiletalk_dir(custom_path: Option<PathBuf>) -> Result<PathBuf, StateError> {
        if let Some(path) = custom_path {
            return Ok(path);
        }

        let home = dirs::home_dir().ok_or(StateError::NoHomeDirectory)?;
        Ok(home.join(format!(".{}", APP_NAME)))
    }

    /// Initialize a new state directory
    pub fn init(
        custom_path: Option<PathBuf>,
        config: Option<AppConfig>,
    ) -> Result<Self, StateError> {
        let tiletalk_dir = Self::tiletalk_dir(custom_path)?;

        if tiletalk_dir.exists() {
            return Err(StateError::AlreadyInitialized);
        }

        fs::create_dir_all(&tiletalk_dir)?;

        // Creating the vault also creates its master secret
        let vault_path = tiletalk_dir.join(VAULT_DIR_NAME);
        FsKeyVault::open(&vault_path)?;

        let config = config.unwrap_or_default();
        let config_path = tiletalk_dir.join(CONFIG_FILE_NAME);
        let config_toml = toml::to_string_pretty(&config)?;
        fs::write(&config_path, config_toml)?;

        // Empty database file, migrated when the daemon first starts
        let db_path = tiletalk_dir.join(DB_FILE_NAME);
        fs::write(&db_path, "")?;

        Ok(Self {
            tiletalk_dir,
            db_path,
            vault_path,
            config_path,
            config,
        })
    }

    /// Load existing state from the state directory
    pub fn load(custom_path: Option<PathBuf>) -> Result<Self, StateError> {
        let tiletalk_dir = Self::tiletalk_dir(custom_path)?;

        if !tiletalk_dir.exists() {
            return Err(StateError::NotInitialized);
        }

        let db_path = tiletalk_dir.join(DB_FILE_NAME);
        let vault_path = tiletalk_dir.join(VAULT_DIR_NAME);
        let config_path = tiletalk_dir.join(CONFIG_FILE_NAME);

        if !db_path.exists() {
            return Err(StateError::MissingFile(DB_FILE_NAME.to_string()));
        }
        if !vault_path.exists() {
            return Err(StateError::MissingFile(format!("{}/", VAULT_DIR_NAME)));
        }
        if !config_path.exists() {
            return Err(StateError::MissingFile(CONFIG_FILE_NAME.to_string()));
        }

        let config_toml = fs::read_to_string(&config_path)?;
        let config: AppConfig = toml::from_str(&config_toml)?;

        Ok(Self {
            tiletalk_dir,
            db_path,
            vault_path,
            config_path,
            config,
        })
    }

    /// Write the current config back to config.toml
    pub fn save_config(&self) -> Result<(), StateError> {
        let config_toml = toml::to_string_pretty(&self.config)?;
        fs::write(&self.config_path, config_toml)?;
        Ok(())
    }

    pub fn vault(&self) -> Result<FsKeyVault, StateError> {
        Ok(FsKeyVault::open(&self.vault_path)?)
    }

    /// The configured local identity name
    pub fn username(&self) -> Result<&str, StateError> {
        self.config
            .username
            .as_deref()
            .ok_or(StateError::NoLocalIdentity("username"))
    }

    /// The registered local identity id
    pub fn identity_id(&self) -> Result<IdentityId, StateError> {
        self.config
            .identity_id
            .ok_or(StateError::NoLocalIdentity("identity id"))
    }
}

#[derive(Debug, thiserror::Error)]
pub enum StateError {
    #[error("tiletalk directory not initialized. Run 'tiletalk init' first")]
    NotInitialized,

    #[error("tiletalk directory already initialized")]
    AlreadyInitialized,

    #[error("no home directory found")]
    NoHomeDirectory,

    #[error("missing required file: {0}")]
    MissingFile(String),

    #[error("no local {0} configured. Run 'tiletalk identity register' first")]
    NoLocalIdentity(&'static str),

    #[error("vault error: {0}")]
    Vault(#[from] VaultError),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("TOML serialization error: {0}")]
    TomlSer(#[from] toml::ser::Error),

    #[error("TOML deserialization error: {0}")]
    TomlDe(#[from] toml::de::Error),
}
