//! Bearer credential providers for the CRM API.

use std::path::PathBuf;

use super::CrmClientError;

pub const DEFAULT_TOKEN_ENV_VAR: &str = "CRM_BEARER_TOKEN";

/// Supplies the bearer token attached to every CRM request.
///
/// Looked up on each call so that rotated tokens are picked up without a restart.
pub trait CredentialProvider: Send + Sync {
    fn bearer_token(&self) -> Result<String, CrmClientError>;

    /// Short description for logs. Must never contain the secret.
    fn describe(&self) -> String;
}

/// A token fixed at startup, e.g. from the config file.
pub struct StaticToken(String);

impl StaticToken {
    pub fn new(token: impl Into<String>) -> Self {
        Self(token.into())
    }
}

impl CredentialProvider for StaticToken {
    fn bearer_token(&self) -> Result<String, CrmClientError> {
        Ok(self.0.clone())
    }

    fn describe(&self) -> String {
        "static token".to_string()
    }
}

/// Reads the token from an environment variable.
pub struct EnvToken {
    var: String,
}

impl EnvToken {
    pub fn new(var: impl Into<String>) -> Self {
        Self { var: var.into() }
    }
}

impl Default for EnvToken {
    fn default() -> Self {
        Self::new(DEFAULT_TOKEN_ENV_VAR)
    }
}

impl CredentialProvider for EnvToken {
    fn bearer_token(&self) -> Result<String, CrmClientError> {
        match std::env::var(&self.var) {
            Ok(token) if !token.trim().is_empty() => Ok(token.trim().to_string()),
            _ => Err(CrmClientError::Credentials(format!(
                "environment variable {} is not set",
                self.var
            ))),
        }
    }

    fn describe(&self) -> String {
        format!("env var {}", self.var)
    }
}

/// Reads the token from the first line of a file.
pub struct FileToken {
    path: PathBuf,
}

impl FileToken {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }
}

impl CredentialProvider for FileToken {
    fn bearer_token(&self) -> Result<String, CrmClientError> {
        let content = std::fs::read_to_string(&self.path).map_err(|e| {
            CrmClientError::Credentials(format!("failed to read {:?}: {}", self.path, e))
        })?;
        let token = content.lines().next().unwrap_or_default().trim();
        if token.is_empty() {
            return Err(CrmClientError::Credentials(format!(
                "token file {:?} is empty",
                self.path
            )));
        }
        Ok(token.to_string())
    }

    fn describe(&self) -> String {
        format!("token file {:?}", self.path)
    }
}
