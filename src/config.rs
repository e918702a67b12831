//! Configuration system using TOML files.
//!
//! Config is stored in the OS-standard config directory:
//! - Windows: %APPDATA%\propgeo\config.toml
//! - macOS: ~/Library/Application Support/propgeo/config.toml
//! - Linux: ~/.config/propgeo/config.toml
//!
//! The config file is human-readable and editable. Every value has a
//! default, so a partial file (e.g., credentials only) is enough to run.
//! The engine never writes config on its own; the surrounding pipeline
//! supplies these values and may persist them with [`save`].

use serde::{Deserialize, Serialize};
use std::path::PathBuf;
use std::time::Duration;

/// Engine configuration
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    /// Geocoding provider credentials and endpoints
    pub providers: ProvidersConfig,

    /// Response cache settings
    pub cache: CacheConfig,

    /// Resolver scheduling settings
    pub resolver: ResolverConfig,

    /// Proximity feature settings
    pub features: FeatureConfig,
}

/// Per-provider settings
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct ProvidersConfig {
    /// SGIS OpenAPI (primary, token-authenticated)
    pub sgis: SgisConfig,

    /// Kakao Local API (secondary, static REST key)
    pub kakao: KakaoConfig,
}

/// SGIS OpenAPI settings
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct SgisConfig {
    /// Consumer key issued by the SGIS portal
    pub service_id: Option<String>,

    /// Consumer secret paired with the key
    pub security_key: Option<String>,

    /// API base URL (overridable for tests)
    pub base_url: String,

    /// Minimum delay between calls, shared by all workers
    pub min_interval_ms: u64,

    /// Per-request deadline
    pub timeout_ms: u64,

    /// Refresh the access token this long before its embedded expiry
    pub token_margin_secs: i64,
}

impl Default for SgisConfig {
    fn default() -> Self {
        Self {
            service_id: None,
            security_key: None,
            base_url: "https://sgisapi.kostat.go.kr/OpenAPI3".to_string(),
            min_interval_ms: 100,
            timeout_ms: 5000,
            token_margin_secs: 60,
        }
    }
}

/// Kakao Local API settings
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct KakaoConfig {
    /// REST API key (sent as `Authorization: KakaoAK ...`)
    pub rest_api_key: Option<String>,

    /// API base URL (overridable for tests)
    pub base_url: String,

    /// Minimum delay between calls, shared by all workers
    pub min_interval_ms: u64,

    /// Per-request deadline
    pub timeout_ms: u64,
}

impl Default for KakaoConfig {
    fn default() -> Self {
        Self {
            rest_api_key: None,
            base_url: "https://dapi.kakao.com".to_string(),
            min_interval_ms: 100,
            timeout_ms: 5000,
        }
    }
}

/// Response cache settings
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct CacheConfig {
    /// How long a cached resolution stays valid
    pub ttl_secs: u64,
}

impl Default for CacheConfig {
    fn default() -> Self {
        Self { ttl_secs: 86_400 }
    }
}

impl CacheConfig {
    /// TTL as a [`Duration`].
    pub fn ttl(&self) -> Duration {
        Duration::from_secs(self.ttl_secs)
    }
}

/// Resolver scheduling settings
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ResolverConfig {
    /// Concurrent geocoding workers for batch resolution
    pub pool_size: usize,

    /// How many token refreshes to attempt after an auth failure
    pub auth_retries: u32,
}

impl Default for ResolverConfig {
    fn default() -> Self {
        Self {
            pool_size: 4,
            auth_retries: 1,
        }
    }
}

/// Proximity feature settings
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct FeatureConfig {
    /// Radius bands for amenity counts, in meters, ascending
    pub radii_m: [f64; 3],

    /// Distance decay constant for the composite accessibility score, in meters
    pub score_decay_m: f64,
}

impl Default for FeatureConfig {
    fn default() -> Self {
        Self {
            radii_m: [500.0, 1000.0, 2000.0],
            score_decay_m: 500.0,
        }
    }
}

// ============================================================================
// Config File Operations
// ============================================================================

/// Get the config directory path
pub fn config_dir() -> Option<PathBuf> {
    dirs::config_dir().map(|d| d.join("propgeo"))
}

/// Get the full path to the config file
pub fn config_path() -> Option<PathBuf> {
    config_dir().map(|d| d.join("config.toml"))
}

/// Load configuration from disk
///
/// Returns default config if file doesn't exist or can't be parsed.
/// Logs warnings but doesn't fail - we always return a usable config.
pub fn load() -> Config {
    let Some(path) = config_path() else {
        tracing::warn!("Could not determine config directory, using defaults");
        return Config::default();
    };

    if !path.exists() {
        tracing::info!("No config file found at {:?}, using defaults", path);
        return Config::default();
    }

    load_from(&path).unwrap_or_else(|e| {
        tracing::error!("Failed to load config file {:?}: {}", path, e);
        tracing::warn!("Using default configuration");
        Config::default()
    })
}

/// Load configuration from an explicit path
pub fn load_from(path: &std::path::Path) -> Result<Config, ConfigError> {
    let contents =
        std::fs::read_to_string(path).map_err(|e| ConfigError::Read(path.to_path_buf(), e))?;
    toml::from_str(&contents).map_err(ConfigError::Parse)
}

/// Save configuration to disk
///
/// Creates the config directory if it doesn't exist.
pub fn save(config: &Config) -> Result<(), ConfigError> {
    let dir = config_dir().ok_or(ConfigError::NoConfigDir)?;
    let path = dir.join("config.toml");

    // Ensure directory exists
    std::fs::create_dir_all(&dir).map_err(|e| ConfigError::CreateDir(dir.clone(), e))?;

    // Serialize to pretty TOML
    let contents = toml::to_string_pretty(config).map_err(ConfigError::Serialize)?;

    // Write atomically (write to temp, then rename)
    let temp_path = path.with_extension("toml.tmp");
    std::fs::write(&temp_path, &contents).map_err(|e| ConfigError::Write(temp_path.clone(), e))?;
    std::fs::rename(&temp_path, &path)
        .map_err(|e| ConfigError::Rename(temp_path, path.clone(), e))?;

    tracing::info!("Saved config to {:?}", path);
    Ok(())
}

// ============================================================================
// Error Types
// ============================================================================

/// Configuration errors
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("Could not determine config directory")]
    NoConfigDir,

    #[error("Failed to create config directory {0}: {1}")]
    CreateDir(PathBuf, std::io::Error),

    #[error("Failed to read config from {0}: {1}")]
    Read(PathBuf, std::io::Error),

    #[error("Failed to parse config: {0}")]
    Parse(toml::de::Error),

    #[error("Failed to serialize config: {0}")]
    Serialize(toml::ser::Error),

    #[error("Failed to write config to {0}: {1}")]
    Write(PathBuf, std::io::Error),

    #[error("Failed to rename temp file {0} to {1}: {2}")]
    Rename(PathBuf, PathBuf, std::io::Error),
}

// ============================================================================
// Tests
// ============================================================================
