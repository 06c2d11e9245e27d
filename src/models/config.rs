//! Application configuration structures.

use std::collections::BTreeMap;
use std::fs;
use std::path::{Path, PathBuf};

use reqwest::header::{HeaderName, HeaderValue};
use serde::{Deserialize, Serialize};
use url::Url;

use crate::error::{AppError, Result};

/// Environment variable carrying a single relay that overrides `proxy.url`.
pub const PROXY_ENV: &str = "PROXY_URL";

/// Root application configuration.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Config {
    /// Target site and fixed posting attributes
    #[serde(default)]
    pub site: SiteConfig,

    /// HTTP, retry and header settings
    #[serde(default)]
    pub crawler: CrawlerConfig,

    /// Relay settings
    #[serde(default)]
    pub proxy: ProxyConfig,

    /// Output locations
    #[serde(default)]
    pub paths: PathsConfig,
}

impl Config {
    /// Load configuration from a TOML file.
    pub fn load(path: impl AsRef<Path>) -> Result<Self> {
        let content = fs::read_to_string(path)?;
        Ok(toml::from_str(&content)?)
    }

    /// Load configuration or return default if loading fails.
    pub fn load_or_default(path: impl AsRef<Path>) -> Self {
        Self::load(&path).unwrap_or_else(|e| {
            log::warn!(
                "Config load failed from {:?}: {}. Using defaults.",
                path.as_ref(),
                e
            );
            Self::default()
        })
    }

    /// Apply the `PROXY_URL` environment override, if set.
    pub fn apply_env(&mut self) {
        if let Ok(value) = std::env::var(PROXY_ENV) {
            self.proxy.override_url(&value);
        }
    }

    /// Validate configuration values for basic sanity.
    pub fn validate(&self) -> Result<()> {
        if self.crawler.user_agent.trim().is_empty() {
            return Err(AppError::validation("crawler.user_agent is empty"));
        }
        if self.crawler.timeout_secs == 0 {
            return Err(AppError::validation("crawler.timeout_secs must be > 0"));
        }
        if self.crawler.run_timeout_secs == 0 {
            return Err(AppError::validation("crawler.run_timeout_secs must be > 0"));
        }
        for (name, value) in &self.crawler.headers {
            HeaderName::from_bytes(name.as_bytes())
                .map_err(|e| AppError::validation(format!("Invalid header name '{name}': {e}")))?;
            HeaderValue::from_str(value).map_err(|e| {
                AppError::validation(format!("Invalid value for header '{name}': {e}"))
            })?;
        }
        self.site.target()?;
        if self.site.department.trim().is_empty() {
            return Err(AppError::validation("site.department is empty"));
        }
        if self.site.location.trim().is_empty() {
            return Err(AppError::validation("site.location is empty"));
        }
        if self.proxy.scheme.trim().is_empty() {
            return Err(AppError::validation("proxy.scheme is empty"));
        }
        Ok(())
    }
}

/// The single site this crawler harvests.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SiteConfig {
    /// Listing page to fetch
    #[serde(default = "defaults::target_url")]
    pub target_url: String,

    /// Department stamped on every posting
    #[serde(default = "defaults::department")]
    pub department: String,

    /// Location stamped on every posting
    #[serde(default = "defaults::location")]
    pub location: String,
}

impl SiteConfig {
    /// Parse the target, accepting only schemes a fetcher can serve.
    pub fn target(&self) -> Result<Url> {
        let url = Url::parse(self.target_url.trim())?;
        match url.scheme() {
            "http" | "https" | "file" => Ok(url),
            other => Err(AppError::validation(format!(
                "Unsupported target scheme '{other}' in {}",
                self.target_url
            ))),
        }
    }
}

impl Default for SiteConfig {
    fn default() -> Self {
        Self {
            target_url: defaults::target_url(),
            department: defaults::department(),
            location: defaults::location(),
        }
    }
}

/// HTTP client and retry settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CrawlerConfig {
    /// User-Agent header for HTTP requests
    #[serde(default = "defaults::user_agent")]
    pub user_agent: String,

    /// Per-request timeout in seconds
    #[serde(default = "defaults::timeout")]
    pub timeout_secs: u64,

    /// Upper bound for the whole fetch, retries included
    #[serde(default = "defaults::run_timeout")]
    pub run_timeout_secs: u64,

    /// Retries after the initial attempt
    #[serde(default = "defaults::max_retries")]
    pub max_retries: u32,

    /// Fixed sleep between attempts in milliseconds
    #[serde(default = "defaults::retry_backoff")]
    pub retry_backoff_ms: u64,

    /// Accept header
    #[serde(default = "defaults::accept")]
    pub accept: String,

    /// Accept-Language header
    #[serde(default = "defaults::accept_language")]
    pub accept_language: String,

    /// Referer header, omitted when unset
    #[serde(default)]
    pub referer: Option<String>,

    /// Extra request headers
    #[serde(default)]
    pub headers: BTreeMap<String, String>,
}

impl Default for CrawlerConfig {
    fn default() -> Self {
        Self {
            user_agent: defaults::user_agent(),
            timeout_secs: defaults::timeout(),
            run_timeout_secs: defaults::run_timeout(),
            max_retries: defaults::max_retries(),
            retry_backoff_ms: defaults::retry_backoff(),
            accept: defaults::accept(),
            accept_language: defaults::accept_language(),
            referer: None,
            headers: BTreeMap::new(),
        }
    }
}

/// Relay settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ProxyConfig {
    /// Single relay used for every request
    #[serde(default)]
    pub url: Option<String>,

    /// Endpoint returning newline-separated `host:port` entries
    #[serde(default)]
    pub list_url: Option<String>,

    /// Scheme prefixed to bare list entries
    #[serde(default = "defaults::proxy_scheme")]
    pub scheme: String,
}

impl ProxyConfig {
    /// Replace the static relay; blank values are ignored.
    pub fn override_url(&mut self, value: &str) {
        let value = value.trim();
        if !value.is_empty() {
            self.url = Some(value.to_string());
        }
    }

    /// Static relay, if a non-blank one is configured.
    pub fn static_relay(&self) -> Option<&str> {
        self.url.as_deref().map(str::trim).filter(|s| !s.is_empty())
    }
}

impl Default for ProxyConfig {
    fn default() -> Self {
        Self {
            url: None,
            list_url: None,
            scheme: defaults::proxy_scheme(),
        }
    }
}

/// Output locations, relative to the storage directory unless absolute.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PathsConfig {
    #[serde(default = "defaults::database")]
    pub database: String,

    #[serde(default = "defaults::metadata")]
    pub metadata: String,

    #[serde(default = "defaults::jobs_json")]
    pub jobs_json: String,

    /// Write the raw run output alongside the metadata
    #[serde(default = "defaults::export_jobs")]
    pub export_jobs: bool,
}

impl PathsConfig {
    pub fn database_path(&self, root: &Path) -> PathBuf {
        root.join(&self.database)
    }

    pub fn metadata_path(&self, root: &Path) -> PathBuf {
        root.join(&self.metadata)
    }

    pub fn jobs_json_path(&self, root: &Path) -> PathBuf {
        root.join(&self.jobs_json)
    }
}

impl Default for PathsConfig {
    fn default() -> Self {
        Self {
            database: defaults::database(),
            metadata: defaults::metadata(),
            jobs_json: defaults::jobs_json(),
            export_jobs: defaults::export_jobs(),
        }
    }
}

mod defaults {
    // Site defaults
    pub fn target_url() -> String {
        "https://recruitment.nic.in/index_new.php".into()
    }
    pub fn department() -> String {
        "NIC".into()
    }
    pub fn location() -> String {
        "All India".into()
    }

    // Crawler defaults
    pub fn user_agent() -> String {
        "Mozilla/5.0 (Windows NT 10.0; Win64; x64) AppleWebKit/537.36 (KHTML, like Gecko) Chrome/120.0.0.0 Safari/537.36".into()
    }
    pub fn timeout() -> u64 {
        30
    }
    pub fn run_timeout() -> u64 {
        60
    }
    pub fn max_retries() -> u32 {
        3
    }
    pub fn retry_backoff() -> u64 {
        2000
    }
    pub fn accept() -> String {
        "text/html,application/xhtml+xml,application/xml;q=0.9,*/*;q=0.8".into()
    }
    pub fn accept_language() -> String {
        "en-US,en;q=0.9".into()
    }

    // Proxy defaults
    pub fn proxy_scheme() -> String {
        "http".into()
    }

    // Path defaults
    pub fn database() -> String {
        "jobs.db".into()
    }
    pub fn metadata() -> String {
        "metadata.json".into()
    }
    pub fn jobs_json() -> String {
        "data/jobs.json".into()
    }
    pub fn export_jobs() -> bool {
        true
    }
}
