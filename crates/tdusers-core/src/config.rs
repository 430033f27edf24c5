use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};
use std::time::Duration;

use crate::error::ConfigError;
use crate::scanner::ScanOptions;
use crate::workflow::PollOptions;

/// Environment variable consulted for the API key.
pub const API_KEY_ENV: &str = "TD_API_KEY";

/// Endpoints, credentials and transport timeouts (`[api]` in config.toml).
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ApiConfig {
    /// Base URL of the REST API (roster and job history).
    pub endpoint: String,
    /// Base URL of the workflow API.
    pub workflow_endpoint: String,
    /// API key; `TD_API_KEY` takes precedence when set.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub api_key: Option<String>,
    /// Hard timeout for a single request, in seconds.
    pub request_timeout_secs: u64,
    /// Connect timeout for a single request, in seconds.
    pub connect_timeout_secs: u64,
}

impl Default for ApiConfig {
    fn default() -> Self {
        Self {
            endpoint: "https://api.treasuredata.com".to_string(),
            workflow_endpoint: "https://api-workflow.treasuredata.com/api".to_string(),
            api_key: None,
            request_timeout_secs: 180,
            connect_timeout_secs: 15,
        }
    }
}

impl ApiConfig {
    pub fn request_timeout(&self) -> Duration {
        Duration::from_secs(self.request_timeout_secs)
    }

    pub fn connect_timeout(&self) -> Duration {
        Duration::from_secs(self.connect_timeout_secs)
    }

    /// Resolve the API key: explicit value, then `TD_API_KEY`, then the file.
    pub fn resolve_api_key(&self, explicit: Option<&str>) -> Result<String, ConfigError> {
        resolve_api_key(
            explicit,
            std::env::var(API_KEY_ENV).ok().as_deref(),
            self.api_key.as_deref(),
        )
    }
}

/// Precedence rules for the API key, independent of the process environment.
pub fn resolve_api_key(
    explicit: Option<&str>,
    env: Option<&str>,
    file: Option<&str>,
) -> Result<String, ConfigError> {
    [explicit, env, file]
        .into_iter()
        .flatten()
        .map(str::trim)
        .find(|k| !k.is_empty())
        .map(str::to_string)
        .ok_or(ConfigError::MissingApiKey)
}

/// Defaults for the active-user scan (`[scan]` in config.toml).
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ScanConfig {
    /// Jobs requested per page.
    pub page_size: usize,
    /// Pages requested at once.
    pub concurrency: usize,
    /// Upper bound on job offsets scanned.
    pub limit: usize,
    /// A user is active if they ran a job within this many days.
    pub interval_days: u32,
}

impl Default for ScanConfig {
    fn default() -> Self {
        Self {
            page_size: 200,
            concurrency: 5,
            limit: 300_000,
            interval_days: 30,
        }
    }
}

impl ScanConfig {
    /// Validated scan parameters.
    pub fn options(&self) -> Result<ScanOptions, ConfigError> {
        ScanOptions::new(self.page_size, self.concurrency, self.limit)
    }
}

/// Workflow polling defaults (`[workflow]` in config.toml).
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct WorkflowConfig {
    pub poll_interval_secs: u64,
    /// Give up waiting for a session after this long.
    pub poll_timeout_secs: u64,
    /// UTC offset used for `sessionTime` when starting an attempt (JST by default).
    pub timezone_offset_hours: i32,
}

impl Default for WorkflowConfig {
    fn default() -> Self {
        Self {
            poll_interval_secs: 60,
            poll_timeout_secs: 6 * 60 * 60,
            timezone_offset_hours: 9,
        }
    }
}

impl WorkflowConfig {
    pub fn poll_options(&self) -> Result<PollOptions, ConfigError> {
        PollOptions::new(
            Duration::from_secs(self.poll_interval_secs),
            Duration::from_secs(self.poll_timeout_secs),
        )
    }
}

/// Configuration loaded from `~/.config/tdusers/config.toml`.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct TdConfig {
    #[serde(default)]
    pub api: ApiConfig,
    #[serde(default)]
    pub scan: ScanConfig,
    #[serde(default)]
    pub workflow: WorkflowConfig,
}

pub fn config_path() -> Result<PathBuf, ConfigError> {
    let xdg_dirs = xdg::BaseDirectories::with_prefix("tdusers")?;
    Ok(xdg_dirs.place_config_file("config.toml")?)
}

/// Load configuration from the default location, creating a default file if none exists.
pub fn load_or_init() -> Result<TdConfig, ConfigError> {
    load_or_init_at(&config_path()?)
}

/// Like [`load_or_init`] for an explicit path.
pub fn load_or_init_at(path: &Path) -> Result<TdConfig, ConfigError> {
    if !path.exists() {
        let default_cfg = TdConfig::default();
        let toml = toml::to_string_pretty(&default_cfg)?;
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent)?;
        }
        fs::write(path, toml)?;
        tracing::info!("created default config at {}", path.display());
        return Ok(default_cfg);
    }

    let data = fs::read_to_string(path)?;
    let cfg: TdConfig = toml::from_str(&data)?;
    Ok(cfg)
}
