//! Configuration system using TOML files.
//!
//! Config is stored in the OS-standard config directory:
//! - Windows: %APPDATA%\album-links\config.toml
//! - macOS: ~/Library/Application Support/album-links/config.toml
//! - Linux: ~/.config/album-links/config.toml
//!
//! Every section has defaults, so a partial file (or no file at all) is a
//! usable configuration. Credentials can also come from the command line.

use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use std::time::Duration;

use crate::enrichment::domain::ProviderId;

/// Application configuration
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    /// API credentials
    pub credentials: Credentials,

    /// Fuzzy-match acceptance thresholds
    pub matching: MatchingConfig,

    /// Backoff for 429 / 5xx / timeouts
    pub retry: RetryConfig,

    /// HTTP client settings
    pub http: HttpConfig,

    /// Per-provider settings
    pub providers: ProvidersConfig,

    /// Batch settings
    pub batch: BatchConfig,
}

/// API credentials
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct Credentials {
    pub spotify_client_id: Option<String>,
    pub spotify_client_secret: Option<String>,
    pub discogs_api_token: Option<String>,
}

/// Fuzzy matching thresholds and weights.
///
/// The thresholds were picked empirically, so they live here instead of
/// being baked into the matcher.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct MatchingConfig {
    /// Minimum confidence for an album hit
    pub album_threshold: f64,
    /// Minimum confidence for a track hit
    pub track_threshold: f64,
    /// Minimum artist-name similarity for an artist hit
    pub artist_threshold: f64,
    /// Below this artist similarity a candidate is rejected outright
    pub artist_floor: f64,
    /// Weight of title similarity in the combined confidence
    pub title_weight: f64,
    /// Weight of artist similarity in the combined confidence
    pub artist_weight: f64,
    /// Similarity granted when the query appears verbatim inside the candidate
    pub containment_score: f64,
}

impl Default for MatchingConfig {
    fn default() -> Self {
        Self {
            album_threshold: 0.85,
            track_threshold: 0.85,
            artist_threshold: 0.85,
            artist_floor: 0.6,
            title_weight: 0.7,
            artist_weight: 0.3,
            containment_score: 0.9,
        }
    }
}

/// Exponential backoff settings
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct RetryConfig {
    /// Total attempts including the first one
    pub max_attempts: u32,
    pub base_delay_ms: u64,
    pub multiplier: f64,
    pub max_delay_ms: u64,
}

impl Default for RetryConfig {
    fn default() -> Self {
        Self {
            max_attempts: 4,
            base_delay_ms: 500,
            multiplier: 2.0,
            max_delay_ms: 8_000,
        }
    }
}

/// HTTP client settings shared by every provider
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct HttpConfig {
    pub request_timeout_secs: u64,
    pub connect_timeout_secs: u64,
    /// MusicBrainz and Discogs reject requests without a descriptive User-Agent
    pub user_agent: String,
}

impl HttpConfig {
    pub fn request_timeout(&self) -> Duration {
        Duration::from_secs(self.request_timeout_secs)
    }

    pub fn connect_timeout(&self) -> Duration {
        Duration::from_secs(self.connect_timeout_secs)
    }
}

impl Default for HttpConfig {
    fn default() -> Self {
        Self {
            request_timeout_secs: 15,
            connect_timeout_secs: 5,
            user_agent: concat!(
                "AlbumLinks/",
                env!("CARGO_PKG_VERSION"),
                " (https://github.com/album-links)"
            )
            .to_string(),
        }
    }
}

/// Settings for one provider
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ProviderSettings {
    pub enabled: bool,
    /// Requests allowed per window
    pub requests: u32,
    /// Window length in seconds
    pub per_secs: u64,
    /// Override the API base URL (testing, proxies)
    pub base_url: Option<String>,
}

impl ProviderSettings {
    fn with_rate(requests: u32, per_secs: u64) -> Self {
        Self {
            enabled: true,
            requests,
            per_secs,
            base_url: None,
        }
    }

    pub fn window(&self) -> Duration {
        Duration::from_secs(self.per_secs)
    }
}

impl Default for ProviderSettings {
    fn default() -> Self {
        Self::with_rate(1, 1)
    }
}

/// Spotify-specific settings
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct SpotifySettings {
    #[serde(flatten)]
    pub common: ProviderSettings,
    /// Market code passed to search (e.g. "DE")
    pub market: Option<String>,
    pub token_url: Option<String>,
}

impl Default for SpotifySettings {
    fn default() -> Self {
        Self {
            common: ProviderSettings::with_rate(10, 1),
            market: None,
            token_url: None,
        }
    }
}

/// All provider settings
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ProvidersConfig {
    /// Priority order for merging (first preview wins)
    pub order: Vec<ProviderId>,
    pub spotify: SpotifySettings,
    pub deezer: ProviderSettings,
    pub discogs: ProviderSettings,
    pub musicbrainz: ProviderSettings,
}

impl ProvidersConfig {
    /// Common settings for a provider
    pub fn settings(&self, provider: ProviderId) -> &ProviderSettings {
        match provider {
            ProviderId::Spotify => &self.spotify.common,
            ProviderId::Deezer => &self.deezer,
            ProviderId::Discogs => &self.discogs,
            ProviderId::MusicBrainz => &self.musicbrainz,
        }
    }

    /// Priority order with duplicates removed and missing providers appended.
    ///
    /// Every provider must appear exactly once so each record gets exactly
    /// one result per provider.
    pub fn normalized_order(&self) -> Vec<ProviderId> {
        let mut order = Vec::with_capacity(ProviderId::ALL.len());
        for provider in self.order.iter().chain(ProviderId::ALL.iter()) {
            if !order.contains(provider) {
                order.push(*provider);
            }
        }
        order
    }
}

impl Default for ProvidersConfig {
    fn default() -> Self {
        Self {
            order: ProviderId::ALL.to_vec(),
            spotify: SpotifySettings::default(),
            deezer: ProviderSettings::with_rate(50, 5),
            discogs: ProviderSettings::with_rate(1, 1),
            // MusicBrainz usage policy: at most one request per second
            musicbrainz: ProviderSettings::with_rate(1, 1),
        }
    }
}

/// Batch run settings
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct BatchConfig {
    /// Records resolved concurrently
    pub concurrency: usize,
}

impl Default for BatchConfig {
    fn default() -> Self {
        Self { concurrency: 2 }
    }
}

// ============================================================================
// Config File Operations
// ============================================================================

/// Get the config directory path
pub fn config_dir() -> Option<PathBuf> {
    dirs::config_dir().map(|d| d.join("album-links"))
}

/// Get the full path to the config file
pub fn config_path() -> Option<PathBuf> {
    config_dir().map(|d| d.join("config.toml"))
}

/// Load configuration from the default location
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

    match load_from(&path) {
        Ok(config) => config,
        Err(e) => {
            tracing::error!("{}", e);
            tracing::warn!("Using default configuration");
            Config::default()
        }
    }
}

/// Load configuration from an explicit path
///
/// Unlike [`load`], a broken file is an error: the user asked for it.
pub fn load_from(path: &Path) -> Result<Config, ConfigError> {
    let contents =
        std::fs::read_to_string(path).map_err(|e| ConfigError::Read(path.to_path_buf(), e))?;
    let config =
        toml::from_str(&contents).map_err(|e| ConfigError::Parse(path.to_path_buf(), e))?;
    tracing::info!("Loaded config from {:?}", path);
    Ok(config)
}

/// Save configuration to a path
///
/// Creates the parent directory if it doesn't exist.
pub fn save_to(config: &Config, path: &Path) -> Result<(), ConfigError> {
    if let Some(dir) = path.parent() {
        std::fs::create_dir_all(dir).map_err(|e| ConfigError::CreateDir(dir.to_path_buf(), e))?;
    }

    let contents = toml::to_string_pretty(config).map_err(ConfigError::Serialize)?;

    // Write atomically (write to temp, then rename)
    let temp_path = path.with_extension("toml.tmp");
    std::fs::write(&temp_path, &contents).map_err(|e| ConfigError::Write(temp_path.clone(), e))?;
    std::fs::rename(&temp_path, path)
        .map_err(|e| ConfigError::Rename(temp_path, path.to_path_buf(), e))?;

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

    #[error("Failed to read config file {0}: {1}")]
    Read(PathBuf, std::io::Error),

    #[error("Failed to parse config file {0}: {1}")]
    Parse(PathBuf, toml::de::Error),

    #[error("Failed to create config directory {0}: {1}")]
    CreateDir(PathBuf, std::io::Error),

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
