use anyhow::{Context, Result};
use serde::Deserialize;
use std::path::Path;

#[derive(Debug, Deserialize, Default)]
#[serde(default)]
pub struct FileConfig {
    pub crm_url: Option<String>,
    pub port: Option<u16>,
    pub logging_level: Option<String>,
    pub poll_interval_ms: Option<u64>,
    pub staging_interval_ms: Option<u64>,
    pub staging_dir: Option<String>,
    pub request_timeout_sec: Option<u64>,

    // Credentials, see CredentialSource for precedence
    pub bearer_token: Option<String>,
    pub bearer_token_env: Option<String>,
    pub bearer_token_file: Option<String>,
}

impl FileConfig {
    pub fn load(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read config file: {:?}", path))?;
        toml::from_str(&content).with_context(|| format!("Failed to parse config file: {:?}", path))
    }
}
