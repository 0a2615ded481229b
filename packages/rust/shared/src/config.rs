//! Application configuration for the daily brief generator.
//!
//! User config lives at `~/.dailybrief/dailybrief.toml`.
//! CLI flags override config file values, which override defaults.

use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};
use url::Url;

use crate::error::{DailyBriefError, Result};

/// Default configuration file name.
const CONFIG_FILE_NAME: &str = "dailybrief.toml";

/// Default config directory name under the user's home.
const CONFIG_DIR_NAME: &str = ".dailybrief";

// ---------------------------------------------------------------------------
// Config structs (matching dailybrief.toml schema)
// ---------------------------------------------------------------------------

/// Top-level application config, deserialized from TOML.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct AppConfig {
    /// Global defaults.
    #[serde(default)]
    pub defaults: DefaultsConfig,

    /// Weather location settings.
    #[serde(default)]
    pub location: LocationConfig,

    /// News and security feed sources.
    #[serde(default)]
    pub feeds: FeedsConfig,

    /// Trending repository query settings.
    #[serde(default)]
    pub trending: TrendingConfig,
}

/// `[defaults]` section.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DefaultsConfig {
    /// Directory receiving per-agent content and status artifacts.
    #[serde(default = "default_output_dir")]
    pub output_dir: String,

    /// Directory receiving dated archive entries.
    #[serde(default = "default_archive_dir")]
    pub archive_dir: String,

    /// Host document the brief is patched into.
    #[serde(default = "default_host_path")]
    pub host_path: String,

    /// Maximum agents in flight at once.
    #[serde(default = "default_pool_size")]
    pub pool_size: usize,

    /// Per-request network timeout in seconds.
    #[serde(default = "default_timeout_secs")]
    pub timeout_secs: u64,

    /// Maximum stories/headlines/repos kept per agent.
    #[serde(default = "default_max_items")]
    pub max_items: usize,
}

impl Default for DefaultsConfig {
    fn default() -> Self {
        Self {
            output_dir: default_output_dir(),
            archive_dir: default_archive_dir(),
            host_path: default_host_path(),
            pool_size: default_pool_size(),
            timeout_secs: default_timeout_secs(),
            max_items: default_max_items(),
        }
    }
}

fn default_output_dir() -> String {
    "agents/output".into()
}
fn default_archive_dir() -> String {
    "daily".into()
}
fn default_host_path() -> String {
    "README.md".into()
}
fn default_pool_size() -> usize {
    5
}
fn default_timeout_secs() -> u64 {
    15
}
fn default_max_items() -> usize {
    3
}

/// `[location]` section — coordinates for the terrestrial weather fetch.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LocationConfig {
    /// Human-readable place name shown in the weather section.
    #[serde(default = "default_location_name")]
    pub name: String,

    #[serde(default = "default_latitude")]
    pub latitude: f64,

    #[serde(default = "default_longitude")]
    pub longitude: f64,

    /// IANA timezone passed to the forecast API.
    #[serde(default = "default_timezone")]
    pub timezone: String,
}

impl Default for LocationConfig {
    fn default() -> Self {
        Self {
            name: default_location_name(),
            latitude: default_latitude(),
            longitude: default_longitude(),
            timezone: default_timezone(),
        }
    }
}

fn default_location_name() -> String {
    "San Juan, Puerto Rico".into()
}
fn default_latitude() -> f64 {
    18.4655
}
fn default_longitude() -> f64 {
    -66.1057
}
fn default_timezone() -> String {
    "America/Puerto_Rico".into()
}

/// A single RSS/Atom feed source.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FeedSource {
    /// Source name for attribution.
    pub name: String,
    /// Feed URL.
    pub url: Url,
    /// Favicon shown next to headlines (security feeds).
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub favicon: Option<Url>,
}

/// `[feeds]` section.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FeedsConfig {
    /// World-news feeds consumed by the Intel agent.
    #[serde(default = "default_news_feeds")]
    pub news: Vec<FeedSource>,

    /// Security feeds consumed by the CyberPulse agent.
    #[serde(default = "default_cyber_feeds")]
    pub cyber: Vec<FeedSource>,
}

impl Default for FeedsConfig {
    fn default() -> Self {
        Self {
            news: default_news_feeds(),
            cyber: default_cyber_feeds(),
        }
    }
}

fn feed(name: &str, url: &str, favicon: Option<&str>) -> FeedSource {
    FeedSource {
        name: name.into(),
        url: Url::parse(url).expect("valid default feed url"),
        favicon: favicon.map(|f| Url::parse(f).expect("valid default favicon url")),
    }
}

fn default_news_feeds() -> Vec<FeedSource> {
    vec![
        feed(
            "Reuters World",
            "https://feeds.reuters.com/reuters/worldNews",
            None,
        ),
        feed(
            "AP World News",
            "https://feeds.apnews.com/rss/apf-topnews",
            None,
        ),
        feed(
            "BBC News",
            "https://feeds.bbci.co.uk/news/world/rss.xml",
            None,
        ),
    ]
}

fn default_cyber_feeds() -> Vec<FeedSource> {
    vec![
        feed(
            "BleepingComputer",
            "https://www.bleepingcomputer.com/feed/",
            Some("https://www.bleepingcomputer.com/favicon.ico"),
        ),
        feed(
            "KrebsOnSecurity",
            "https://krebsonsecurity.com/feed/",
            Some("https://krebsonsecurity.com/favicon.ico"),
        ),
        feed(
            "The Hacker News",
            "https://feeds.feedburner.com/TheHackersNews",
            Some("https://thehackernews.com/favicon.ico"),
        ),
    ]
}

/// `[trending]` section.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TrendingConfig {
    /// How far back the "created since" search window reaches.
    #[serde(default = "default_lookback_days")]
    pub lookback_days: i64,

    /// Page size requested from the search API.
    #[serde(default = "default_per_page")]
    pub per_page: usize,
}

impl Default for TrendingConfig {
    fn default() -> Self {
        Self {
            lookback_days: default_lookback_days(),
            per_page: default_per_page(),
        }
    }
}

fn default_lookback_days() -> i64 {
    7
}
fn default_per_page() -> usize {
    10
}

// ---------------------------------------------------------------------------
// Brief config (runtime, merged from config + CLI flags)
// ---------------------------------------------------------------------------

/// Runtime run configuration — merged from config file + CLI flags.
#[derive(Debug, Clone)]
pub struct BriefConfig {
    /// Directory receiving per-agent artifacts and the brief/run files.
    pub output_dir: PathBuf,
    /// Directory receiving dated archive entries.
    pub archive_dir: PathBuf,
    /// Host document path.
    pub host_path: PathBuf,
    /// Maximum agents in flight at once.
    pub pool_size: usize,
    /// Per-request network timeout in seconds.
    pub timeout_secs: u64,
    /// Maximum stories/headlines/repos kept per agent.
    pub max_items: usize,
}

impl From<&AppConfig> for BriefConfig {
    fn from(config: &AppConfig) -> Self {
        Self {
            output_dir: PathBuf::from(&config.defaults.output_dir),
            archive_dir: PathBuf::from(&config.defaults.archive_dir),
            host_path: PathBuf::from(&config.defaults.host_path),
            pool_size: config.defaults.pool_size,
            timeout_secs: config.defaults.timeout_secs,
            max_items: config.defaults.max_items,
        }
    }
}

// ---------------------------------------------------------------------------
// Config loading
// ---------------------------------------------------------------------------

/// Get the path to the config directory (`~/.dailybrief/`).
pub fn config_dir() -> Result<PathBuf> {
    let home = dirs::home_dir()
        .ok_or_else(|| DailyBriefError::config("could not determine home directory"))?;
    Ok(home.join(CONFIG_DIR_NAME))
}

/// Get the path to the config file (`~/.dailybrief/dailybrief.toml`).
pub fn config_file_path() -> Result<PathBuf> {
    Ok(config_dir()?.join(CONFIG_FILE_NAME))
}

/// Load the application config from disk. Returns defaults if the file does not exist.
pub fn load_config() -> Result<AppConfig> {
    let path = config_file_path()?;

    if !path.exists() {
        tracing::debug!(?path, "config file not found, using defaults");
        return Ok(AppConfig::default());
    }

    load_config_from(&path)
}

/// Load the application config from a specific file path.
pub fn load_config_from(path: &Path) -> Result<AppConfig> {
    let content = std::fs::read_to_string(path).map_err(|e| DailyBriefError::io(path, e))?;

    toml::from_str(&content).map_err(|e| {
        DailyBriefError::config(format!("failed to parse {}: {e}", path.display()))
    })
}

/// Create the config directory and write a default config file.
/// Returns the path to the created file.
pub fn init_config() -> Result<PathBuf> {
    let dir = config_dir()?;
    std::fs::create_dir_all(&dir).map_err(|e| DailyBriefError::io(&dir, e))?;

    let path = dir.join(CONFIG_FILE_NAME);
    let config = AppConfig::default();
    let content =
        toml::to_string_pretty(&config).map_err(|e| DailyBriefError::config(e.to_string()))?;

    std::fs::write(&path, content).map_err(|e| DailyBriefError::io(&path, e))?;
    tracing::info!(?path, "created default config file");

    Ok(path)
}
