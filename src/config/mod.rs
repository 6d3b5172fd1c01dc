mod file_config;

pub use file_config::FileConfig;

use crate::crm::{CredentialProvider, EnvToken, FileToken, StaticToken, DEFAULT_TOKEN_ENV_VAR};
use crate::server::RequestsLoggingLevel;
use crate::staging::DEFAULT_STAGING_DIR;
use anyhow::{bail, Result};
use clap::ValueEnum;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::time::Duration;

pub const DEFAULT_POLL_INTERVAL_MS: u64 = 3_000;
pub const DEFAULT_STAGING_INTERVAL_MS: u64 = 5_000;

/// CLI arguments that can be used for config resolution.
/// This struct mirrors the CLI arguments that can be overridden by TOML config.
#[derive(Debug, Clone)]
pub struct CliConfig {
    pub crm_url: String,
    pub port: u16,
    pub logging_level: RequestsLoggingLevel,
    pub poll_interval_ms: u64,
    pub staging_interval_ms: u64,
    pub staging_dir: PathBuf,
    pub request_timeout_sec: Option<u64>,
    pub bearer_token_env: String,
    pub bearer_token_file: Option<PathBuf>,
}

impl Default for CliConfig {
    fn default() -> Self {
        Self {
            crm_url: "http://localhost:5001".to_string(),
            port: 5002,
            logging_level: RequestsLoggingLevel::Path,
            poll_interval_ms: DEFAULT_POLL_INTERVAL_MS,
            staging_interval_ms: DEFAULT_STAGING_INTERVAL_MS,
            staging_dir: PathBuf::from(DEFAULT_STAGING_DIR),
            request_timeout_sec: None,
            bearer_token_env: DEFAULT_TOKEN_ENV_VAR.to_string(),
            bearer_token_file: None,
        }
    }
}

/// Where the CRM bearer token comes from.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CredentialSource {
    /// Literal token from the config file.
    Static(String),
    Env(String),
    File(PathBuf),
}

impl CredentialSource {
    pub fn provider(&self) -> Arc<dyn CredentialProvider> {
        match self {
            CredentialSource::Static(token) => Arc::new(StaticToken::new(token.clone())),
            CredentialSource::Env(var) => Arc::new(EnvToken::new(var.clone())),
            CredentialSource::File(path) => Arc::new(FileToken::new(path.clone())),
        }
    }
}

#[derive(Debug, Clone)]
pub struct AppConfig {
    pub crm_url: String,
    pub port: u16,
    pub logging_level: RequestsLoggingLevel,
    pub poll_interval: Duration,
    pub staging_interval: Duration,
    pub staging_dir: PathBuf,
    /// None keeps the transport default.
    pub request_timeout: Option<Duration>,
    pub credentials: CredentialSource,
}

impl AppConfig {
    /// Resolve configuration from CLI arguments and optional TOML file config.
    /// TOML values override CLI values where present.
    pub fn resolve(cli: &CliConfig, file_config: Option<FileConfig>) -> Result<Self> {
        let file = file_config.unwrap_or_default();

        let crm_url = file.crm_url.clone().unwrap_or_else(|| cli.crm_url.clone());
        if !(crm_url.starts_with("http://") || crm_url.starts_with("https://")) {
            bail!("crm_url must be an http(s) URL, got {:?}", crm_url);
        }

        let port = file.port.unwrap_or(cli.port);

        let logging_level = file
            .logging_level
            .as_deref()
            .and_then(|s| parse_logging_level(s))
            .unwrap_or_else(|| cli.logging_level.clone());

        let poll_interval_ms = file.poll_interval_ms.unwrap_or(cli.poll_interval_ms);
        if poll_interval_ms == 0 {
            bail!("poll_interval_ms must be greater than zero");
        }
        let staging_interval_ms = file.staging_interval_ms.unwrap_or(cli.staging_interval_ms);
        if staging_interval_ms == 0 {
            bail!("staging_interval_ms must be greater than zero");
        }

        let staging_dir = resolve_staging_dir(&cli.staging_dir, Some(&file));
        if staging_dir.exists() && !staging_dir.is_dir() {
            bail!("staging_dir is not a directory: {:?}", staging_dir);
        }

        let request_timeout = file
            .request_timeout_sec
            .or(cli.request_timeout_sec)
            .map(Duration::from_secs);

        // A token file wins over a literal token, which wins over the env var.
        let credentials = if let Some(path) = file
            .bearer_token_file
            .map(PathBuf::from)
            .or_else(|| cli.bearer_token_file.clone())
        {
            CredentialSource::File(path)
        } else if let Some(token) = file.bearer_token.filter(|t| !t.trim().is_empty()) {
            CredentialSource::Static(token)
        } else {
            CredentialSource::Env(
                file.bearer_token_env
                    .unwrap_or_else(|| cli.bearer_token_env.clone()),
            )
        };

        Ok(Self {
            crm_url,
            port,
            logging_level,
            poll_interval: Duration::from_millis(poll_interval_ms),
            staging_interval: Duration::from_millis(staging_interval_ms),
            staging_dir,
            request_timeout,
            credentials,
        })
    }
}

/// Staging directory from the TOML file if set, from the CLI otherwise.
pub fn resolve_staging_dir(cli_dir: &Path, file_config: Option<&FileConfig>) -> PathBuf {
    file_config
        .and_then(|file| file.staging_dir.as_deref())
        .map(PathBuf::from)
        .unwrap_or_else(|| cli_dir.to_path_buf())
}

fn parse_logging_level(s: &str) -> Option<RequestsLoggingLevel> {
    RequestsLoggingLevel::from_str(s, true).ok()
}
