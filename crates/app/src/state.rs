use std::{fs, path::PathBuf, time::Duration};

use chrono::Utc;
use serde::{Deserialize, Serialize};

use common::content::FsConfig;
use common::remote::RecordSet;

pub const APP_NAME: &str = "contentfs";
pub const CONFIG_FILE_NAME: &str = "config.toml";
pub const RECORDS_FILE_NAME: &str = "records.json";
pub const SESSION_FILE_NAME: &str = "session.json";

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AppConfig {
    /// How long a cached file body stays fresh
    #[serde(default = "default_cache_ttl_secs")]
    pub cache_ttl_secs: u64,
    /// Upper bound on cached file bodies
    #[serde(default = "default_cache_max_entries")]
    pub cache_max_entries: u64,
    /// Lifetime of an elevation token installed without an explicit expiry
    #[serde(default = "default_elevation_ttl_secs")]
    pub elevation_ttl_secs: u64,
    /// Mirror the elevation token into session.json
    #[serde(default = "default_persist_elevation")]
    pub persist_elevation: bool,
    /// Tokens the local store accepts for writes
    #[serde(default)]
    pub write_tokens: Vec<String>,
}

fn default_cache_ttl_secs() -> u64 {
    5 * 60
}

fn default_cache_max_entries() -> u64 {
    10_000
}

fn default_elevation_ttl_secs() -> u64 {
    10 * 60
}

fn default_persist_elevation() -> bool {
    true
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            cache_ttl_secs: default_cache_ttl_secs(),
            cache_max_entries: default_cache_max_entries(),
            elevation_ttl_secs: default_elevation_ttl_secs(),
            persist_elevation: default_persist_elevation(),
            write_tokens: Vec::new(),
        }
    }
}

impl AppConfig {
    pub fn fs_config(&self) -> FsConfig {
        FsConfig {
            cache_ttl: Duration::from_secs(self.cache_ttl_secs),
            cache_max_entries: self.cache_max_entries,
            elevation_ttl: Duration::from_secs(self.elevation_ttl_secs),
        }
    }
}

#[derive(Debug, Clone)]
pub struct AppState {
    /// Path to the state directory (~/.contentfs)
    pub state_dir: PathBuf,
    /// Path to the config file
    pub config_path: PathBuf,
    /// Path to the local record store
    pub records_path: PathBuf,
    /// Path to the persisted elevation token
    pub session_path: PathBuf,
    /// Loaded configuration
    pub config: AppConfig,
}

impl AppState {
    /// Get the state directory path (custom or default ~/.contentfs)
    pub fn state_dir(custom_path: Option<PathBuf>) -> Result<PathBuf, StateError> {
        if let Some(path) = custom_path {
            return Ok(path);
        }

        let home = dirs::home_dir().ok_or(StateError::NoHomeDirectory)?;
        Ok(home.join(format!(".{}", APP_NAME)))
    }

    fn at(state_dir: PathBuf, config: AppConfig) -> Self {
        Self {
            config_path: state_dir.join(CONFIG_FILE_NAME),
            records_path: state_dir.join(RECORDS_FILE_NAME),
            session_path: state_dir.join(SESSION_FILE_NAME),
            state_dir,
            config,
        }
    }

    /// Initialize a new state directory with a config and a record store
    ///  holding only the root directory
    pub fn init(
        custom_path: Option<PathBuf>,
        config: Option<AppConfig>,
    ) -> Result<Self, StateError> {
        let state_dir = Self::state_dir(custom_path)?;
        if state_dir.join(CONFIG_FILE_NAME).exists() {
            return Err(StateError::AlreadyInitialized);
        }
        fs::create_dir_all(&state_dir)?;

        let state = Self::at(state_dir, config.unwrap_or_default());

        let config_toml = toml::to_string_pretty(&state.config)?;
        fs::write(&state.config_path, config_toml)?;

        let records = RecordSet::with_root(Utc::now());
        fs::write(&state.records_path, serde_json::to_string_pretty(&records)?)?;

        Ok(state)
    }

    /// Load existing state from the state directory
    pub fn load(custom_path: Option<PathBuf>) -> Result<Self, StateError> {
        let state_dir = Self::state_dir(custom_path)?;
        if !state_dir.exists() {
            return Err(StateError::NotInitialized);
        }

        let config_path = state_dir.join(CONFIG_FILE_NAME);
        if !config_path.exists() {
            return Err(StateError::MissingFile(CONFIG_FILE_NAME.to_string()));
        }
        if !state_dir.join(RECORDS_FILE_NAME).exists() {
            return Err(StateError::MissingFile(RECORDS_FILE_NAME.to_string()));
        }

        let config_toml = fs::read_to_string(&config_path)?;
        let config: AppConfig = toml::from_str(&config_toml)?;

        Ok(Self::at(state_dir, config))
    }
}

#[derive(Debug, thiserror::Error)]
pub enum StateError {
    #[error("contentfs directory not initialized. Run 'cfs init' first")]
    NotInitialized,

    #[error("contentfs directory already initialized")]
    AlreadyInitialized,

    #[error("no home directory found")]
    NoHomeDirectory,

    #[error("missing required file: {0}")]
    MissingFile(String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("TOML serialization error: {0}")]
    TomlSer(#[from] toml::ser::Error),

    #[error("TOML deserialization error: {0}")]
    TomlDe(#[from] toml::de::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}
