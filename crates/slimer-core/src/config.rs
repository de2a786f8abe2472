use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::PathBuf;
use std::time::Duration;

use crate::download_spec::DEFAULT_CDN_URL;

const APP_PREFIX: &str = "slimer-install";

/// Download retry parameters (optional `[retry]` section in config.toml).
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RetryConfig {
    /// Maximum number of attempts (including the first).
    pub max_attempts: u32,
    /// Base delay in seconds for exponential backoff (e.g. 0.5 = 500ms).
    pub base_delay_secs: f64,
    /// Maximum backoff delay in seconds.
    pub max_delay_secs: u64,
}

impl Default for RetryConfig {
    fn default() -> Self {
        Self {
            max_attempts: 4,
            base_delay_secs: 0.5,
            max_delay_secs: 10,
        }
    }
}

/// Global configuration loaded from `~/.config/slimer-install/config.toml`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ResolverConfig {
    /// Release host root. The CDN environment variables (see `download_spec`) win over this.
    pub cdn_url: String,
    /// Where archives are downloaded and extracted, and where `location.toml`
    /// lives. Defaults to the XDG data dir.
    #[serde(default)]
    pub install_dir: Option<PathBuf>,
    /// Upper bound for `slimerjs --version` during verification.
    pub version_timeout_secs: u64,
    /// Upper bound for archive extraction.
    pub extract_timeout_secs: u64,
    /// TCP/TLS connect timeout for the archive download.
    pub connect_timeout_secs: u64,
    /// Optional retry policy; built-in defaults are used when missing.
    #[serde(default)]
    pub retry: Option<RetryConfig>,
}

impl Default for ResolverConfig {
    fn default() -> Self {
        Self {
            cdn_url: DEFAULT_CDN_URL.to_string(),
            install_dir: None,
            version_timeout_secs: 30,
            extract_timeout_secs: 300,
            connect_timeout_secs: 30,
            retry: None,
        }
    }
}

impl ResolverConfig {
    pub fn version_timeout(&self) -> Duration {
        Duration::from_secs(self.version_timeout_secs)
    }

    pub fn extract_timeout(&self) -> Duration {
        Duration::from_secs(self.extract_timeout_secs)
    }

    pub fn connect_timeout(&self) -> Duration {
        Duration::from_secs(self.connect_timeout_secs)
    }

    pub fn retry_config(&self) -> RetryConfig {
        self.retry.clone().unwrap_or_default()
    }

    /// Configured install dir, or `~/.local/share/slimer-install`.
    pub fn resolved_install_dir(&self) -> Result<PathBuf> {
        match &self.install_dir {
            Some(dir) => Ok(dir.clone()),
            None => default_install_dir(),
        }
    }
}

pub fn default_install_dir() -> Result<PathBuf> {
    let xdg_dirs = xdg::BaseDirectories::with_prefix(APP_PREFIX)?;
    Ok(xdg_dirs.get_data_home())
}

pub fn config_path() -> Result<PathBuf> {
    let xdg_dirs = xdg::BaseDirectories::with_prefix(APP_PREFIX)?;
    Ok(xdg_dirs.place_config_file("config.toml")?)
}

/// Load configuration from disk, creating a default file if none exists.
pub fn load_or_init() -> Result<ResolverConfig> {
    let path = config_path()?;
    if !path.exists() {
        let default_cfg = ResolverConfig::default();
        let toml = toml::to_string_pretty(&default_cfg)?;
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent)?;
        }
        fs::write(&path, toml).with_context(|| format!("write config: {}", path.display()))?;
        tracing::info!("created default config at {}", path.display());
        return Ok(default_cfg);
    }

    let data = fs::read_to_string(&path).with_context(|| format!("read config: {}", path.display()))?;
    let cfg: ResolverConfig = toml::from_str(&data).with_context(|| format!("parse config: {}", path.display()))?;
    Ok(cfg)
}
