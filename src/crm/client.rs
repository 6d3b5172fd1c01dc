//! HTTP client for the CRM notification service.

use async_trait::async_trait;
use reqwest::StatusCode;
use std::sync::Arc;
use std::time::Duration;

use super::credentials::CredentialProvider;
use super::{CrmClientError, NotificationsApi};
use crate::notifications::NotificationRecord;

/// HTTP client for communicating with the CRM service.
pub struct CrmClient {
    client: reqwest::Client,
    base_url: String,
    credentials: Arc<dyn CredentialProvider>,
}

impl CrmClient {
    /// Create a new CRM client.
    ///
    /// # Arguments
    /// * `base_url` - Base URL of the CRM service (e.g., "http://localhost:5001")
    /// * `credentials` - Source of the bearer token sent with every request
    /// * `timeout` - Request timeout, `None` keeps the transport default
    pub fn new(
        base_url: String,
        credentials: Arc<dyn CredentialProvider>,
        timeout: Option<Duration>,
    ) -> Result<Self, CrmClientError> {
        let mut builder = reqwest::Client::builder();
        if let Some(timeout) = timeout {
            builder = builder.timeout(timeout);
        }
        let client = builder.build().map_err(CrmClientError::Transport)?;

        // Ensure base_url doesn't have trailing slash
        let base_url = base_url.trim_end_matches('/').to_string();

        Ok(Self {
            client,
            base_url,
            credentials,
        })
    }

    /// Check if the CRM service is healthy.
    pub async fn health_check(&self) -> Result<(), CrmClientError> {
        let url = format!("{}/health", self.base_url);
        let response = self.client.get(&url).send().await?;

        if response.status().is_success() {
            Ok(())
        } else {
            Err(CrmClientError::Status(response.status()))
        }
    }

    fn authorization(&self) -> Result<String, CrmClientError> {
        Ok(format!("Bearer {}", self.credentials.bearer_token()?))
    }

    /// Get the base URL of the CRM service.
    pub fn base_url(&self) -> &str {
        &self.base_url
    }
}

fn ensure_success(status: StatusCode) -> Result<(), CrmClientError> {
    if status.is_success() {
        Ok(())
    } else {
        Err(CrmClientError::Status(status))
    }
}

#[async_trait]
impl NotificationsApi for CrmClient {
    async fn fetch_notifications(&self) -> Result<Vec<NotificationRecord>, CrmClientError> {
        let url = format!("{}/notifications", self.base_url);
        let response = self
            .client
            .get(&url)
            .header(reqwest::header::AUTHORIZATION, self.authorization()?)
            .send()
            .await?;

        ensure_success(response.status())?;

        response
            .json()
            .await
            .map_err(|e| CrmClientError::Decode(e.to_string()))
    }

    async fn mark_processed(&self, id: i64) -> Result<(), CrmClientError> {
        let url = format!("{}/notifications/{}/process", self.base_url, id);
        let response = self
            .client
            .post(&url)
            .header(reqwest::header::AUTHORIZATION, self.authorization()?)
            .send()
            .await?;

        ensure_success(response.status())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::crm::StaticToken;

    fn client(base_url: &str) -> CrmClient {
        CrmClient::new(
            base_url.to_string(),
            Arc::new(StaticToken::new("secret")),
            None,
        )
        .unwrap()
    }

    #[test]
    fn test_client_creation() {
        let client = client("http://localhost:5001");
        assert_eq!(client.base_url(), "http://localhost:5001");
    }

    #[test]
    fn test_trailing_slash_removal() {
        let client = client("http://localhost:5001/");
        assert_eq!(client.base_url(), "http://localhost:5001");
    }

    #[test]
    fn test_authorization_header_value() {
        let client = client("http://localhost:5001");
        assert_eq!(client.authorization().unwrap(), "Bearer secret");
    }

    #[test]
    fn test_non_success_status_is_an_error() {
        assert!(ensure_success(StatusCode::OK).is_ok());
        assert!(ensure_success(StatusCode::NO_CONTENT).is_ok());
        assert!(matches!(
            ensure_success(StatusCode::UNAUTHORIZED),
            Err(CrmClientError::Status(StatusCode::UNAUTHORIZED))
        ));
    }
}
