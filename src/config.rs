//! Configuration management
//!
//! Loads configuration from:
//! 1. Default values
//! 2. Configuration file (`sitecontent.toml`, or an explicit path)
//! 3. Environment variables (`SITECONTENT__*`, override)
//!
//! The cache time-to-live has no default and must be provided.

use std::path::{Path, PathBuf};
use std::time::Duration;

use serde::Deserialize;
use url::Url;

use crate::error::{ContentError, Result};
use crate::fetcher::LocalSource;
use crate::retry::RetryPolicy;

/// Short TTL used while content is being edited: 30 seconds.
pub const TTL_FAST: Duration = Duration::from_secs(30);

/// TTL for a quiet production site: 5 minutes.
pub const TTL_STANDARD: Duration = Duration::from_secs(5 * 60);

pub const DEFAULT_API_BASE: &str = "https://api.github.com";

/// Main configuration
#[derive(Debug, Clone, Deserialize)]
pub struct SiteConfig {
    pub remote: RemoteSettings,
    pub cache: CacheSettings,
    #[serde(default)]
    pub local: LocalSettings,
    pub retry: RetrySettings,
    pub assets: AssetSettings,
}

/// Remote repository settings
#[derive(Debug, Clone, Deserialize)]
pub struct RemoteSettings {
    pub owner: String,
    pub repo: String,
    pub branch: String,
    /// Base URL of the contents API (overridden in tests)
    pub api_base: String,
    /// Write token; falls back to `GITHUB_TOKEN` and the token store
    #[serde(default)]
    pub token: Option<String>,
}

impl RemoteSettings {
    pub fn target(&self) -> RemoteTarget {
        RemoteTarget::new(&self.owner, &self.repo, &self.branch)
    }
}

/// Cache settings
#[derive(Debug, Clone, Deserialize)]
pub struct CacheSettings {
    /// Seconds a remote read stays fresh
    pub ttl_secs: u64,
}

impl CacheSettings {
    pub fn ttl(&self) -> Duration {
        Duration::from_secs(self.ttl_secs)
    }
}

/// Where the bundled fallback copies live
#[derive(Debug, Clone, Default, Deserialize)]
pub struct LocalSettings {
    /// Static site root on disk (e.g. `./public`)
    pub root: Option<PathBuf>,
    /// Origin serving the static site (e.g. `https://example.cz`)
    pub base_url: Option<Url>,
}

impl LocalSettings {
    /// Directory wins over HTTP origin when both are set.
    pub fn source(&self) -> Option<LocalSource> {
        match (&self.root, &self.base_url) {
            (Some(root), _) => Some(LocalSource::Directory(root.clone())),
            (None, Some(base)) => Some(LocalSource::Http(base.clone())),
            (None, None) => None,
        }
    }
}

/// Write retry settings
#[derive(Debug, Clone, Deserialize)]
pub struct RetrySettings {
    pub max_attempts: u32,
    pub base_delay_ms: u64,
}

impl RetrySettings {
    pub fn policy(&self) -> RetryPolicy {
        RetryPolicy::new(self.max_attempts, Duration::from_millis(self.base_delay_ms))
    }
}

/// Upload settings
#[derive(Debug, Clone, Deserialize)]
pub struct AssetSettings {
    pub url_strategy: AssetUrlStrategy,
}

/// How the public URL of an uploaded asset is built.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AssetUrlStrategy {
    /// `/content/uploads/...`, served by the site from its static root
    #[default]
    SiteRelative,
    /// `https://raw.githubusercontent.com/<owner>/<repo>/<branch>/...`
    RawRemote,
}

/// Identifies a remote repository and branch.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct RemoteTarget {
    pub owner: String,
    pub repo: String,
    pub branch: String,
}

impl RemoteTarget {
    pub fn new(owner: &str, repo: &str, branch: &str) -> Self {
        Self {
            owner: owner.to_string(),
            repo: repo.to_string(),
            branch: branch.to_string(),
        }
    }
}

impl Default for RemoteTarget {
    fn default() -> Self {
        Self::new("janik-technika", "janik-tech-spark", "main")
    }
}

/// Remote target plus write credentials, owned by an admin session.
#[derive(Debug, Clone)]
pub struct RepositoryConfig {
    pub target: RemoteTarget,
    pub token: String,
}

impl RepositoryConfig {
    /// Build a write configuration; an empty or missing token is rejected.
    pub fn new(target: RemoteTarget, token: Option<&str>) -> Result<Self> {
        let token = token.map(str::trim).unwrap_or_default();
        if token.is_empty() {
            return Err(ContentError::MissingConfig(
                "a repository token is required for writes".to_string(),
            ));
        }
        for (name, value) in [
            ("owner", &target.owner),
            ("repo", &target.repo),
            ("branch", &target.branch),
        ] {
            if value.trim().is_empty() {
                return Err(ContentError::MissingConfig(format!("remote {} is empty", name)));
            }
        }
        Ok(Self {
            target,
            token: token.to_string(),
        })
    }
}

impl SiteConfig {
    /// Load configuration from defaults, an optional file and the environment.
    pub fn load(path: Option<&Path>) -> Result<Self> {
        use ::config::{Config, Environment, File};

        let defaults = RemoteTarget::default();
        let mut builder = Config::builder()
            .set_default("remote.owner", defaults.owner)?
            .set_default("remote.repo", defaults.repo)?
            .set_default("remote.branch", defaults.branch)?
            .set_default("remote.api_base", DEFAULT_API_BASE)?
            .set_default("retry.max_attempts", 3)?
            .set_default("retry.base_delay_ms", 500)?
            .set_default("assets.url_strategy", "site_relative")?;

        builder = match path {
            Some(path) => builder.add_source(File::from(path).required(true)),
            None => builder.add_source(File::with_name("sitecontent").required(false)),
        };

        let config = builder
            .add_source(
                Environment::with_prefix("SITECONTENT")
                    .separator("__")
                    .try_parsing(true),
            )
            .build()?;

        let site: Self = config.try_deserialize()?;
        site.validate()?;
        Ok(site)
    }

    /// Validate loaded values.
    pub fn validate(&self) -> Result<()> {
        if self.cache.ttl_secs == 0 {
            return Err(ContentError::MissingConfig(
                "cache.ttl_secs must be greater than zero".to_string(),
            ));
        }
        if self.retry.max_attempts == 0 {
            return Err(ContentError::MissingConfig(
                "retry.max_attempts must be at least 1".to_string(),
            ));
        }
        if self.retry.base_delay_ms == 0 {
            return Err(ContentError::MissingConfig(
                "retry.base_delay_ms must be greater than zero".to_string(),
            ));
        }
        Url::parse(&self.remote.api_base)
            .map_err(|e| ContentError::MissingConfig(format!("remote.api_base: {}", e)))?;
        Ok(())
    }

    /// Resolve the write token: config, then `GITHUB_TOKEN`.
    pub fn token(&self) -> Option<String> {
        self.remote
            .token
            .clone()
            .filter(|t| !t.trim().is_empty())
            .or_else(|| std::env::var("GITHUB_TOKEN").ok())
            .filter(|t| !t.trim().is_empty())
    }
}
