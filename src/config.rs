//! Configuration management for horse.
//!
//! Every knob has a default matching the stock site layout, so a config
//! file is optional. Lookup order: `--config` path, then a `horse.*` file
//! found by `prefer` (working directory, then the user and system config
//! directories), then built-in defaults. Environment variables override
//! file values.

use std::path::{Path, PathBuf};
use std::time::Duration;

use serde::{Deserialize, Serialize};

/// Config name searched for by discovery (`horse.toml`, `horse.json`, ...).
pub const CONFIG_NAME: &str = "horse";

/// Default storage filename inside the data directory.
pub const DEFAULT_STORAGE_FILENAME: &str = "horse.db";

/// Default request timeout in seconds for fragment and cursor requests.
pub const DEFAULT_FETCH_TIMEOUT_SECS: u64 = 10;

/// Errors loading a configuration file.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("failed to read config file {}: {source}", .path.display())]
    Read {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("failed to parse TOML config {}: {source}", .path.display())]
    Toml {
        path: PathBuf,
        #[source]
        source: toml::de::Error,
    },
    #[error("failed to parse JSON config {}: {source}", .path.display())]
    Json {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },
}

/// Component include settings.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ComponentsConfig {
    /// Directory holding fragments, relative to the site root.
    pub dir: String,
    /// Fragment file extension, including the dot.
    pub extension: String,
    /// Path segment marking pages that live one level below the root.
    pub subdir_marker: String,
}

impl Default for ComponentsConfig {
    fn default() -> Self {
        Self {
            dir: "components".to_string(),
            extension: ".html".to_string(),
            subdir_marker: "/pages/".to_string(),
        }
    }
}

/// Visitor counter settings.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct CounterConfig {
    /// Storage key for the count.
    pub key: String,
    /// Lowest seed value.
    pub seed_base: u64,
    /// Number of possible seed values starting at `seed_base`.
    pub seed_span: u64,
    /// Zero-padded display width.
    pub width: usize,
}

impl Default for CounterConfig {
    fn default() -> Self {
        Self {
            key: "horse_visitors".to_string(),
            seed_base: 4827,
            seed_span: 200,
            width: 7,
        }
    }
}

/// Custom cursor settings.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct CursorConfig {
    /// Cursor file, relative to the site root.
    pub asset: String,
}

impl Default for CursorConfig {
    fn default() -> Self {
        Self {
            asset: "assets/cursors/default.cur".to_string(),
        }
    }
}

/// Network settings.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct FetchConfig {
    /// Per-request timeout in seconds.
    pub timeout_secs: u64,
    /// User agent: unset for the default, `"browser"`, or a custom string.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub user_agent: Option<String>,
}

impl Default for FetchConfig {
    fn default() -> Self {
        Self {
            timeout_secs: DEFAULT_FETCH_TIMEOUT_SECS,
            user_agent: None,
        }
    }
}

impl FetchConfig {
    /// Request timeout. Zero is not a usable bound and means the default.
    pub fn timeout(&self) -> Duration {
        match self.timeout_secs {
            0 => Duration::from_secs(DEFAULT_FETCH_TIMEOUT_SECS),
            secs => Duration::from_secs(secs),
        }
    }
}

/// Configuration file structure.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    pub components: ComponentsConfig,
    pub counter: CounterConfig,
    pub cursor: CursorConfig,
    pub fetch: FetchConfig,
    /// Path to the visitor counter database.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub storage: Option<String>,
    /// Path to the config file this was loaded from (not serialized).
    #[serde(skip)]
    pub source_path: Option<PathBuf>,
}

impl Config {
    /// Load configuration from a specific file path.
    /// `.json` files are parsed as JSON, anything else as TOML.
    pub fn load_from_path(path: &Path) -> Result<Self, ConfigError> {
        let contents = std::fs::read_to_string(path).map_err(|source| ConfigError::Read {
            path: path.to_path_buf(),
            source,
        })?;

        let mut config: Config = match path.extension().and_then(|e| e.to_str()) {
            Some("json") => serde_json::from_str(&contents).map_err(|source| ConfigError::Json {
                path: path.to_path_buf(),
                source,
            })?,
            _ => toml::from_str(&contents).map_err(|source| ConfigError::Toml {
                path: path.to_path_buf(),
                source,
            })?,
        };

        config.source_path = Some(path.to_path_buf());
        Ok(config)
    }

    /// Find and load the active configuration.
    ///
    /// An explicit path must exist and parse. Otherwise `prefer` searches
    /// its standard locations for a `horse` config file; if none is found,
    /// or the one found cannot be parsed, defaults are used.
    pub async fn discover(explicit: Option<&Path>) -> Result<Self, ConfigError> {
        let mut config = match explicit {
            Some(path) => Self::load_from_path(path)?,
            None => match prefer::load(CONFIG_NAME).await {
                Ok(found) => Self::load_discovered(found.source_path().map(|p| p.as_path())),
                Err(prefer::Error::FileNotFound(_)) => {
                    tracing::debug!("No config file found, using defaults");
                    Self::default()
                }
                Err(e) => {
                    tracing::warn!("Ignoring unreadable config file: {}", e);
                    Self::default()
                }
            },
        };
        config.apply_env_overrides(|name| std::env::var(name).ok());
        Ok(config)
    }

    /// Load a file found by discovery, falling back to defaults.
    fn load_discovered(path: Option<&Path>) -> Self {
        let Some(path) = path else {
            return Self::default();
        };
        match Self::load_from_path(path) {
            Ok(config) => {
                tracing::debug!("Loaded config from {}", path.display());
                config
            }
            Err(e) => {
                tracing::warn!("{}, using defaults", e);
                Self::default()
            }
        }
    }

    /// Apply `HORSE_*` overrides. `lookup` is `std::env::var` in production.
    pub fn apply_env_overrides<F>(&mut self, lookup: F)
    where
        F: Fn(&str) -> Option<String>,
    {
        let lookup = |name: &str| lookup(name).filter(|v| !v.is_empty());

        if let Some(storage) = lookup("HORSE_STORAGE") {
            tracing::debug!("Using HORSE_STORAGE from environment: {}", storage);
            self.storage = Some(storage);
        }
        if let Some(agent) = lookup("HORSE_USER_AGENT") {
            self.fetch.user_agent = Some(agent);
        }
        if let Some(timeout) = lookup("HORSE_FETCH_TIMEOUT") {
            match timeout.parse::<u64>() {
                Ok(secs) if secs > 0 => self.fetch.timeout_secs = secs,
                _ => tracing::warn!("Ignoring invalid HORSE_FETCH_TIMEOUT: {}", timeout),
            }
        }
    }

    /// Directory relative paths in this config are resolved against.
    pub fn base_dir(&self) -> Option<PathBuf> {
        self.source_path
            .as_ref()
            .and_then(|p| p.parent().map(|p| p.to_path_buf()))
    }
}

/// Resolved runtime settings.
#[derive(Debug, Clone)]
pub struct Settings {
    /// Visitor counter database.
    pub storage_path: PathBuf,
    pub fetch_timeout: Duration,
    pub user_agent: Option<String>,
}

impl Settings {
    pub fn from_config(config: &Config) -> Self {
        let storage_path = match &config.storage {
            Some(path) => {
                let path = PathBuf::from(path);
                match config.base_dir() {
                    Some(base) if path.is_relative() => base.join(path),
                    _ => path,
                }
            }
            None => default_data_dir().join(DEFAULT_STORAGE_FILENAME),
        };

        Self {
            storage_path,
            fetch_timeout: config.fetch.timeout(),
            user_agent: config.fetch.user_agent.clone(),
        }
    }
}

/// Default data directory: platform data dir, falling back to home, then cwd.
fn default_data_dir() -> PathBuf {
    dirs::data_dir()
        .or_else(dirs::home_dir)
        .unwrap_or_else(|| PathBuf::from("."))
        .join("horse")
}
