//! Application configuration for the franchise service.
//!
//! User config lives at `~/.franchise/franchise.toml`.
//! CLI flags (and `PORT`) override config file values, which override defaults.

use std::path::{Path, PathBuf};
use std::time::Duration;

use serde::{Deserialize, Serialize};
use url::Url;

use crate::error::{FranchiseError, Result};

/// Default configuration file name.
const CONFIG_FILE_NAME: &str = "franchise.toml";

/// Default config directory name under the user's home.
const CONFIG_DIR_NAME: &str = ".franchise";

// ---------------------------------------------------------------------------
// Config structs (matching franchise.toml schema)
// ---------------------------------------------------------------------------

/// Top-level application config, deserialized from TOML.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct AppConfig {
    /// HTTP listener settings.
    #[serde(default)]
    pub server: ServerConfig,

    /// Upstream site settings.
    #[serde(default)]
    pub source: SourceConfig,

    /// Crawl tuning.
    #[serde(default)]
    pub crawl: CrawlSection,
}

/// `[server]` section.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ServerConfig {
    /// Interface to bind.
    #[serde(default = "default_host")]
    pub host: String,

    /// TCP port to bind.
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

fn default_host() -> String {
    "0.0.0.0".into()
}
fn default_port() -> u16 {
    5000
}

/// `[source]` section.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SourceConfig {
    /// Origin that relative links and search requests resolve against.
    #[serde(default = "default_base_url")]
    pub base_url: String,

    /// User-Agent sent with every upstream request.
    #[serde(default = "default_user_agent")]
    pub user_agent: String,
}

impl Default for SourceConfig {
    fn default() -> Self {
        Self {
            base_url: default_base_url(),
            user_agent: default_user_agent(),
        }
    }
}

fn default_base_url() -> String {
    "https://hdrezka.ag".into()
}
fn default_user_agent() -> String {
    "Mozilla/5.0 (Windows NT 10.0; Win64; x64) AppleWebKit/537.36 \
     (KHTML, like Gecko) Chrome/107.0.0.0 Safari/537.36"
        .into()
}

/// `[crawl]` section.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CrawlSection {
    /// Number of concurrent crawl workers.
    #[serde(default = "default_workers")]
    pub workers: usize,

    /// Per-page fetch timeout in seconds.
    #[serde(default = "default_fetch_timeout")]
    pub fetch_timeout_secs: u64,

    /// Timeout for the search request in seconds.
    #[serde(default = "default_search_timeout")]
    pub search_timeout_secs: u64,
}

impl Default for CrawlSection {
    fn default() -> Self {
        Self {
            workers: default_workers(),
            fetch_timeout_secs: default_fetch_timeout(),
            search_timeout_secs: default_search_timeout(),
        }
    }
}

fn default_workers() -> usize {
    8
}
fn default_fetch_timeout() -> u64 {
    10
}
fn default_search_timeout() -> u64 {
    15
}

// ---------------------------------------------------------------------------
// Runtime configs (derived from AppConfig + CLI flags)
// ---------------------------------------------------------------------------

/// Runtime crawl configuration.
#[derive(Debug, Clone)]
pub struct CrawlConfig {
    /// Origin for relative link resolution and session bootstrap.
    pub base_url: Url,
    /// User-Agent header value.
    pub user_agent: String,
    /// Worker pool size.
    pub workers: usize,
    /// Per-request timeout.
    pub fetch_timeout: Duration,
}

impl CrawlConfig {
    /// Reject settings the crawler cannot run with.
    pub fn validate(&self) -> Result<()> {
        if self.workers == 0 {
            return Err(FranchiseError::config("crawl.workers must be greater than zero"));
        }
        if self.fetch_timeout.is_zero() {
            return Err(FranchiseError::config(
                "crawl.fetch_timeout_secs must be greater than zero",
            ));
        }
        Ok(())
    }
}

impl TryFrom<&AppConfig> for CrawlConfig {
    type Error = FranchiseError;

    fn try_from(config: &AppConfig) -> Result<Self> {
        let crawl = Self {
            base_url: parse_base_url(&config.source.base_url)?,
            user_agent: config.source.user_agent.clone(),
            workers: config.crawl.workers,
            fetch_timeout: Duration::from_secs(config.crawl.fetch_timeout_secs),
        };
        crawl.validate()?;
        Ok(crawl)
    }
}

/// Runtime options for the seed search request.
#[derive(Debug, Clone)]
pub struct SearchOptions {
    /// Origin hosting the search page.
    pub base_url: Url,
    /// Timeout for the search request.
    pub timeout: Duration,
}

impl TryFrom<&AppConfig> for SearchOptions {
    type Error = FranchiseError;

    fn try_from(config: &AppConfig) -> Result<Self> {
        Ok(Self {
            base_url: parse_base_url(&config.source.base_url)?,
            timeout: Duration::from_secs(config.crawl.search_timeout_secs),
        })
    }
}

fn parse_base_url(raw: &str) -> Result<Url> {
    let url = Url::parse(raw)
        .map_err(|e| FranchiseError::config(format!("invalid source.base_url '{raw}': {e}")))?;
    match url.scheme() {
        "http" | "https" => Ok(url),
        other => Err(FranchiseError::config(format!(
            "source.base_url must be http or https, got '{other}'"
        ))),
    }
}

// ---------------------------------------------------------------------------
// Config loading
// ---------------------------------------------------------------------------

/// Get the path to the config directory (`~/.franchise/`).
pub fn config_dir() -> Result<PathBuf> {
    let home = dirs::home_dir()
        .ok_or_else(|| FranchiseError::config("could not determine home directory"))?;
    Ok(home.join(CONFIG_DIR_NAME))
}

/// Get the path to the config file (`~/.franchise/franchise.toml`).
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
    let content = std::fs::read_to_string(path).map_err(|e| FranchiseError::io(path, e))?;

    toml::from_str(&content).map_err(|e| {
        FranchiseError::config(format!("failed to parse {}: {e}", path.display()))
    })
}

/// Create the config directory and write a default config file.
/// Returns the path to the created file.
pub fn init_config() -> Result<PathBuf> {
    let dir = config_dir()?;
    std::fs::create_dir_all(&dir).map_err(|e| FranchiseError::io(&dir, e))?;

    let path = dir.join(CONFIG_FILE_NAME);
    let config = AppConfig::default();
    let content =
        toml::to_string_pretty(&config).map_err(|e| FranchiseError::config(e.to_string()))?;

    std::fs::write(&path, content).map_err(|e| FranchiseError::io(&path, e))?;
    tracing::info!(?path, "created default config file");

    Ok(path)
}
