//! Zukii backend HTTP API client

use std::time::Duration;

use async_trait::async_trait;
use reqwest::{Client, Response};
use serde::de::DeserializeOwned;
use tracing::{debug, info};

use super::provider::WebsiteApi;
use super::types::{ApiError, ApiWebsite, CreateWebsiteRequest};

pub const DEFAULT_API_BASE: &str = "https://zukii-backend.onrender.com/api";

/// Zukii API client
pub struct ZukiiClient {
    client: Client,
    base_url: String,
}

impl ZukiiClient {
    /// Create a new client with default timeouts
    pub fn new(base_url: impl Into<String>) -> Self {
        Self::with_timeouts(base_url, Duration::from_secs(30), Duration::from_secs(5))
    }

    pub fn with_timeouts(
        base_url: impl Into<String>,
        timeout: Duration,
        connect_timeout: Duration,
    ) -> Self {
        let client = Client::builder()
            .timeout(timeout)
            .connect_timeout(connect_timeout)
            .build()
            .unwrap_or_else(|_| Client::new()); // Fallback if config fails

        let base_url = base_url.into().trim_end_matches('/').to_string();

        Self { client, base_url }
    }

    fn url(&self, path: &str) -> String {
        format!("{}{}", self.base_url, path)
    }

    /// Reject non-2xx responses. The body is captured when present but is
    /// never required.
    async fn check(response: Response) -> Result<Response, ApiError> {
        let status = response.status();
        if status.is_success() {
            return Ok(response);
        }

        let body = response
            .text()
            .await
            .ok()
            .filter(|body| !body.trim().is_empty());

        Err(ApiError::Status {
            status: status.as_u16(),
            body,
        })
    }

    async fn decode<T: DeserializeOwned>(response: Response) -> Result<T, ApiError> {
        let response = Self::check(response).await?;
        response
            .json::<T>()
            .await
            .map_err(|e| ApiError::Decode(e.to_string()))
    }
}

#[async_trait]
impl WebsiteApi for ZukiiClient {
    async fn list_websites(&self) -> Result<Vec<ApiWebsite>, ApiError> {
        let url = self.url("/websites");
        debug!("Fetching websites from {}", url);

        let response = self
            .client
            .get(&url)
            .send()
            .await
            .map_err(|e| ApiError::Request(e.to_string()))?;

        Self::decode(response).await
    }

    async fn create_website(&self, url: &str, name: &str) -> Result<ApiWebsite, ApiError> {
        let endpoint = self.url("/websites");
        let request = CreateWebsiteRequest { url, name };

        debug!("Creating website: {:?}", request);

        let response = self
            .client
            .post(&endpoint)
            .json(&request)
            .send()
            .await
            .map_err(|e| ApiError::Request(e.to_string()))?;

        let website: ApiWebsite = Self::decode(response).await?;
        info!("Created website: {} ({})", website.id, website.url);

        Ok(website)
    }

    async fn get_website(&self, id: &str) -> Result<ApiWebsite, ApiError> {
        let url = self.url(&format!("/websites/{}", id));

        let response = self
            .client
            .get(&url)
            .send()
            .await
            .map_err(|e| ApiError::Request(e.to_string()))?;

        Self::decode(response).await
    }

    async fn delete_website(&self, id: &str) -> Result<(), ApiError> {
        let url = self.url(&format!("/websites/{}", id));

        let response = self
            .client
            .delete(&url)
            .send()
            .await
            .map_err(|e| ApiError::Request(e.to_string()))?;

        Self::check(response).await?;
        info!("Deleted website: {}", id);

        Ok(())
    }
}

impl Default for ZukiiClient {
    fn default() -> Self {
        Self::new(DEFAULT_API_BASE)
    }
}
