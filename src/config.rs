use serde::Deserialize;
use std::path::{Path, PathBuf};

// =============================================================================
// Time-related constants
// =============================================================================

/// Smallest notification period a category may be armed with (seconds)
pub const MIN_NOTIFICATION_PERIOD_SECS: u64 = 5;

/// Largest notification period a category may be armed with (one year)
pub const MAX_NOTIFICATION_PERIOD_SECS: u64 = 365 * 24 * 60 * 60;

/// Delay between starting each registry lookup within one pass (10ms)
pub const FETCH_STAGGER_DELAY_MS: u64 = 10;

/// Default npm registry base URL
pub const DEFAULT_NPM_REGISTRY_URL: &str = "https://registry.npmjs.org";

/// Default GitHub REST API base URL
pub const DEFAULT_GITHUB_API_URL: &str = "https://api.github.com";

/// Environment variable holding the token used for the releases API
pub const GITHUB_TOKEN_ENV: &str = "GITHUB_TOKEN";

/// Monitor configuration structure
#[derive(Debug, Clone, Deserialize, Default, PartialEq)]
#[serde(default, rename_all = "camelCase")]
pub struct MonitorConfig {
    pub registry: RegistryConfig,
    pub audit: AuditConfig,
    pub notifications: NotificationConfig,
}

/// Registry endpoints
#[derive(Debug, Clone, Deserialize, PartialEq)]
#[serde(default, rename_all = "camelCase")]
pub struct RegistryConfig {
    pub npm_url: String,
    pub github_api_url: String,
}

impl Default for RegistryConfig {
    fn default() -> Self {
        Self {
            npm_url: DEFAULT_NPM_REGISTRY_URL.to_string(),
            github_api_url: DEFAULT_GITHUB_API_URL.to_string(),
        }
    }
}

/// Security-audit tool invocation
#[derive(Debug, Clone, Deserialize, PartialEq)]
#[serde(default)]
pub struct AuditConfig {
    pub program: String,
    pub args: Vec<String>,
}

impl Default for AuditConfig {
    fn default() -> Self {
        Self {
            program: "yarn".to_string(),
            args: vec!["audit".to_string(), "--json".to_string()],
        }
    }
}

/// Desktop notification appearance
#[derive(Debug, Clone, Deserialize, Default, PartialEq)]
#[serde(default)]
pub struct NotificationConfig {
    pub icon: Option<PathBuf>,
}

#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("Failed to read config {path:?}: {source}")]
    Read {
        path: PathBuf,
        source: std::io::Error,
    },

    #[error("Invalid config {path:?}: {source}")]
    Invalid {
        path: PathBuf,
        source: serde_json::Error,
    },
}

impl MonitorConfig {
    /// Loads the config file, using defaults when it does not exist
    pub fn load(path: &Path) -> Result<Self, ConfigError> {
        let content = match std::fs::read_to_string(path) {
            Ok(content) => content,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => return Ok(Self::default()),
            Err(source) => {
                return Err(ConfigError::Read {
                    path: path.to_path_buf(),
                    source,
                });
            }
        };

        serde_json::from_str(&content).map_err(|source| ConfigError::Invalid {
            path: path.to_path_buf(),
            source,
        })
    }
}

/// Token for the GitHub releases API, if one is set and non-empty
pub fn github_token() -> Option<String> {
    std::env::var(GITHUB_TOKEN_ENV)
        .ok()
        .filter(|token| !token.is_empty())
}

/// Returns the path to the data directory for package-monitor.
/// Uses $XDG_DATA_HOME/package-monitor if XDG_DATA_HOME is set,
/// otherwise falls back to ~/.local/share/package-monitor,
/// or ./package-monitor if neither is available.
pub fn data_dir() -> PathBuf {
    data_dir_with_env(std::env::var("XDG_DATA_HOME").ok(), dirs::home_dir())
}

/// Returns the path to the project database.
pub fn db_path() -> PathBuf {
    data_dir().join("projects.db")
}

/// Returns the path to the log file.
pub fn log_path() -> PathBuf {
    data_dir().join("package-monitor.log")
}

/// Returns the path to the optional config file.
pub fn config_path() -> PathBuf {
    data_dir().join("config.json")
}

fn data_dir_with_env(xdg_data_home: Option<String>, home_dir: Option<PathBuf>) -> PathBuf {
    let data_dir = xdg_data_home
        .map(PathBuf::from)
        .or_else(|| home_dir.map(|home| home.join(".local/share")))
        .unwrap_or_else(|| PathBuf::from("."));

    data_dir.join("package-monitor")
}
