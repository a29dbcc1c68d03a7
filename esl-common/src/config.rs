//! Bootstrap configuration and root folder resolution
//!
//! Settings are resolved with the priority order:
//! 1. Command-line argument (highest priority)
//! 2. Environment variable
//! 3. TOML config file
//! 4. OS-dependent compiled default (fallback)
//!
//! A missing TOML file is not an error: the service logs a warning and
//! starts with defaults.

use crate::{Error, Result};
use serde::Deserialize;
use std::path::{Path, PathBuf};
use tracing::{info, warn};

/// Environment variable overriding the root folder
pub const ROOT_FOLDER_ENV: &str = "ESL_ROOT_FOLDER";

/// Environment variable overriding the HTTP bind address
pub const BIND_ADDR_ENV: &str = "ESL_BIND_ADDR";

/// Default HTTP bind address
pub const DEFAULT_BIND_ADDR: &str = "127.0.0.1:5740";

/// Database file name inside the root folder
pub const DATABASE_FILE: &str = "esl.db";

/// Bootstrap configuration loaded from TOML
///
/// Every field is optional; unset values fall through to environment
/// variables or compiled defaults.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct TomlConfig {
    /// Data folder holding the SQLite database
    #[serde(default)]
    pub root_folder: Option<PathBuf>,

    /// HTTP bind address (`host:port`)
    #[serde(default)]
    pub bind_addr: Option<String>,

    #[serde(default)]
    pub logging: LoggingConfig,

    #[serde(default)]
    pub recommendation: RecommendationConfig,
}

/// Logging configuration
#[derive(Debug, Clone, Deserialize)]
pub struct LoggingConfig {
    /// Default tracing directive (trace, debug, info, warn, error)
    #[serde(default = "default_log_level")]
    pub level: String,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: default_log_level(),
        }
    }
}

fn default_log_level() -> String {
    "info".to_string()
}

/// Quotas for the practice recommendation batch
///
/// Defaults: 10 sentences per batch, up to 7 never-practiced sentences and
/// up to 3 reinforcement sentences (practiced 1 to 3 times).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
#[serde(default)]
pub struct RecommendationConfig {
    pub batch_size: usize,
    pub fresh_quota: usize,
    pub reinforce_quota: usize,
    pub reinforce_min_count: i64,
    pub reinforce_max_count: i64,
}

impl Default for RecommendationConfig {
    fn default() -> Self {
        Self {
            batch_size: 10,
            fresh_quota: 7,
            reinforce_quota: 3,
            reinforce_min_count: 1,
            reinforce_max_count: 3,
        }
    }
}

impl RecommendationConfig {
    /// Reject quota combinations the selector cannot honor
    pub fn validate(&self) -> Result<()> {
        if self.batch_size == 0 {
            return Err(Error::Config("recommendation.batch_size must be > 0".to_string()));
        }
        if self.reinforce_min_count < 1 {
            return Err(Error::Config(
                "recommendation.reinforce_min_count must be >= 1".to_string(),
            ));
        }
        if self.reinforce_min_count > self.reinforce_max_count {
            return Err(Error::Config(format!(
                "recommendation.reinforce_min_count ({}) exceeds reinforce_max_count ({})",
                self.reinforce_min_count, self.reinforce_max_count
            )));
        }
        Ok(())
    }

    /// True if a sentence practiced `count` times is due for reinforcement
    pub fn is_reinforcement(&self, count: i64) -> bool {
        (self.reinforce_min_count..=self.reinforce_max_count).contains(&count)
    }
}

impl TomlConfig {
    /// Parse configuration from TOML text
    pub fn from_toml_str(content: &str) -> Result<Self> {
        let config: TomlConfig = toml::from_str(content)
            .map_err(|e| Error::Config(format!("Failed to parse TOML: {}", e)))?;
        config.recommendation.validate()?;
        Ok(config)
    }

    /// Load configuration
    ///
    /// An explicitly given path must exist and parse. Without one, the
    /// platform config locations are tried and a missing file yields defaults.
    pub fn load(explicit_path: Option<&Path>) -> Result<Self> {
        let path = match explicit_path {
            Some(path) => path.to_path_buf(),
            None => match find_config_file() {
                Some(path) => path,
                None => {
                    warn!("No config file found, using built-in defaults");
                    return Ok(Self::default());
                }
            },
        };

        let content = std::fs::read_to_string(&path).map_err(|e| {
            Error::Config(format!("Failed to read config file {}: {}", path.display(), e))
        })?;
        let config = Self::from_toml_str(&content)?;
        info!("Loaded configuration from {}", path.display());
        Ok(config)
    }
}

/// Resolve the root folder: CLI > `ESL_ROOT_FOLDER` > TOML > OS default
pub fn resolve_root_folder(cli_arg: Option<&Path>, toml: &TomlConfig) -> PathBuf {
    if let Some(path) = cli_arg {
        return path.to_path_buf();
    }

    if let Ok(path) = std::env::var(ROOT_FOLDER_ENV) {
        if !path.trim().is_empty() {
            return PathBuf::from(path);
        }
    }

    if let Some(path) = &toml.root_folder {
        return path.clone();
    }

    get_default_root_folder()
}

/// Resolve the bind address: CLI > `ESL_BIND_ADDR` > TOML > default
pub fn resolve_bind_addr(cli_arg: Option<&str>, toml: &TomlConfig) -> String {
    if let Some(addr) = cli_arg {
        return addr.to_string();
    }

    if let Ok(addr) = std::env::var(BIND_ADDR_ENV) {
        if !addr.trim().is_empty() {
            return addr;
        }
    }

    toml.bind_addr
        .clone()
        .unwrap_or_else(|| DEFAULT_BIND_ADDR.to_string())
}

/// Database file path inside a root folder
pub fn database_path(root_folder: &Path) -> PathBuf {
    root_folder.join(DATABASE_FILE)
}

/// Create the root folder if it does not exist yet
pub fn ensure_directory_exists(root_folder: &Path) -> Result<()> {
    if !root_folder.exists() {
        std::fs::create_dir_all(root_folder)?;
        info!("Created root folder: {}", root_folder.display());
    }
    Ok(())
}

/// First existing config file for the platform, if any
fn find_config_file() -> Option<PathBuf> {
    let user_config = dirs::config_dir().map(|d| d.join("esl").join("config.toml"));
    if let Some(path) = user_config {
        if path.exists() {
            return Some(path);
        }
    }

    if cfg!(target_os = "linux") {
        let system_config = PathBuf::from("/etc/esl/config.toml");
        if system_config.exists() {
            return Some(system_config);
        }
    }

    None
}

/// Get OS-dependent default root folder path
pub fn get_default_root_folder() -> PathBuf {
    if cfg!(target_os = "linux") {
        // ~/.local/share/esl (or /var/lib/esl for system-wide)
        dirs::data_local_dir()
            .map(|d| d.join("esl"))
            .unwrap_or_else(|| PathBuf::from("/var/lib/esl"))
    } else if cfg!(target_os = "macos") {
        // ~/Library/Application Support/esl
        dirs::data_dir()
            .map(|d| d.join("esl"))
            .unwrap_or_else(|| PathBuf::from("/Library/Application Support/esl"))
    } else if cfg!(target_os = "windows") {
        // %LOCALAPPDATA%\esl
        dirs::data_local_dir()
            .map(|d| d.join("esl"))
            .unwrap_or_else(|| PathBuf::from("C:\\ProgramData\\esl"))
    } else {
        PathBuf::from("./esl_data")
    }
}
