use serde::Deserialize;
use std::path::PathBuf;
use std::time::Duration;

// =============================================================================
// Time-related constants
// =============================================================================

/// Default lifetime of a cached manifest in seconds (5 minutes)
pub const DEFAULT_CACHE_TTL_SECS: u64 = 5 * 60;

/// Timeout for release API requests in seconds
pub const DEFAULT_FETCH_TIMEOUT_SECS: u64 = 15;

/// User agent sent with every provider request
pub const DEFAULT_USER_AGENT: &str = "UpdateSync";

/// Prefix of every cache key
pub const CACHE_KEY_NAMESPACE: &str = "updatesync_";

/// Engine configuration structure
#[derive(Debug, Clone, Deserialize, Default, PartialEq)]
#[serde(default, rename_all = "camelCase")]
pub struct EngineConfig {
    pub cache: CacheConfig,
    pub fetch: FetchConfig,
    pub install: InstallConfig,
    pub providers: ProvidersConfig,
}

/// Cache-related configuration
#[derive(Debug, Clone, Deserialize, PartialEq)]
#[serde(default, rename_all = "camelCase")]
pub struct CacheConfig {
    /// Lifetime of a cached manifest in seconds
    pub ttl_seconds: u64,
}

impl CacheConfig {
    pub fn ttl(&self) -> Duration {
        Duration::from_secs(self.ttl_seconds)
    }
}

impl Default for CacheConfig {
    fn default() -> Self {
        Self {
            ttl_seconds: DEFAULT_CACHE_TTL_SECS,
        }
    }
}

/// Outbound request configuration
#[derive(Debug, Clone, Deserialize, PartialEq)]
#[serde(default, rename_all = "camelCase")]
pub struct FetchConfig {
    pub timeout_seconds: u64,
    pub user_agent: String,
}

impl FetchConfig {
    pub fn timeout(&self) -> Duration {
        Duration::from_secs(self.timeout_seconds)
    }
}

impl Default for FetchConfig {
    fn default() -> Self {
        Self {
            timeout_seconds: DEFAULT_FETCH_TIMEOUT_SECS,
            user_agent: DEFAULT_USER_AGENT.to_string(),
        }
    }
}

/// Install-time configuration
#[derive(Debug, Clone, Deserialize, PartialEq)]
#[serde(default, rename_all = "camelCase")]
pub struct InstallConfig {
    /// Treat paths that differ only by case as the same directory when remapping
    pub case_insensitive_paths: bool,
}

impl Default for InstallConfig {
    fn default() -> Self {
        Self {
            case_insensitive_paths: true,
        }
    }
}

/// Provider-specific configuration
#[derive(Debug, Clone, Deserialize, Default, PartialEq)]
#[serde(default)]
pub struct ProvidersConfig {
    pub github: ProviderConfig,
    pub gitlab: ProviderConfig,
}

/// Individual provider configuration
#[derive(Debug, Clone, Deserialize, Default, PartialEq)]
#[serde(default, rename_all = "camelCase")]
pub struct ProviderConfig {
    /// Overrides the API base derived from the update source host
    pub api_base_url: Option<String>,
    /// Token sent with API requests and package downloads.
    ///
    /// The token is copied into each manifest's `authHeader` and therefore
    /// stored in plaintext in the cache database (`db_path()`).
    pub access_token: Option<String>,
}

/// Returns the path to the data directory for update-sync.
/// Uses the platform data directory if available,
/// or ./update-sync otherwise.
pub fn data_dir() -> PathBuf {
    data_dir_with_base(dirs::data_dir())
}

/// Returns the path to the cache database file.
pub fn db_path() -> PathBuf {
    data_dir().join("cache.db")
}

/// Returns the path to the log file.
pub fn log_path() -> PathBuf {
    data_dir().join("update-sync.log")
}

fn data_dir_with_base(base: Option<PathBuf>) -> PathBuf {
    base.unwrap_or_else(|| PathBuf::from(".")).join("update-sync")
}
