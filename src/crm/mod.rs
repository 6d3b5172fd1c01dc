//! Client side of the CRM notification service.

mod client;
mod credentials;

pub use client::CrmClient;
pub use credentials::{CredentialProvider, EnvToken, FileToken, StaticToken, DEFAULT_TOKEN_ENV_VAR};

use async_trait::async_trait;
use reqwest::StatusCode;
use thiserror::Error;

use crate::notifications::NotificationRecord;

#[derive(Debug, Error)]
pub enum CrmClientError {
    #[error("missing CRM credentials: {0}")]
    Credentials(String),
    #[error("request to CRM failed: {0}")]
    Transport(#[from] reqwest::Error),
    #[error("CRM responded with status {0}")]
    Status(StatusCode),
    #[error("failed to decode CRM response: {0}")]
    Decode(String),
}

/// Remote operations the panel needs from the CRM.
#[async_trait]
pub trait NotificationsApi: Send + Sync {
    /// Full current notification set, as the server sees it.
    async fn fetch_notifications(&self) -> Result<Vec<NotificationRecord>, CrmClientError>;

    /// Ask the server to flag one notification as processed.
    async fn mark_processed(&self, id: i64) -> Result<(), CrmClientError>;
}
